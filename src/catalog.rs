//! Discovery of installed Apple dictionaries.
//!
//! macOS stages dictionary bundles under a mobile-asset directory:
//! ```text
//! <base>/<asset dir>/AssetData/<Name>.dictionary/Contents/Resources/
//! ```
//! The resources of interest live next to each other in that directory:
//! `Body.data` (the entry container), `KeyText.data`, `EntryID.data`, the
//! matching `.index` files and `DefaultStyle.css`, plus `.lproj`
//! localization bundles that carry no dictionary content.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::error::Result;

/// Default root of the macOS dictionary assets.
pub const DEFAULT_ASSET_BASE: &str =
    "/System/Library/AssetsV2/com_apple_MobileAsset_DictionaryServices_dictionaryOSX/";

/// File name of the entry container inside a dictionary bundle.
pub const BODY_DATA: &str = "Body.data";

/// Extension of localization bundles, excluded from resource listings.
const LPROJ_EXT: &str = "lproj";

/// One dictionary bundle found under the asset base.
#[derive(Debug, Clone)]
pub struct InstalledDictionary {
    /// Bundle name, e.g. `Oxford Dictionary of English`.
    pub name: String,
    /// Resource files of the bundle, sorted by file name, `.lproj`
    /// localization entries excluded.
    pub resources: Vec<PathBuf>,
}

impl InstalledDictionary {
    /// Returns the path of the bundle's `Body.data` container, if present.
    pub fn body_data(&self) -> Option<&Path> {
        self.resources
            .iter()
            .find(|p| p.file_name().is_some_and(|n| n == BODY_DATA))
            .map(PathBuf::as_path)
    }
}

/// Lists the dictionaries installed under `base`, sorted by name.
///
/// Bundles without any resources are dropped. Asset directories that do not
/// follow the expected layout are skipped with a warning rather than
/// aborting the walk.
///
/// # Errors
/// Returns an error if `base` itself cannot be read.
pub fn discover(base: &Path) -> Result<Vec<InstalledDictionary>> {
    info!("Scanning dictionary assets under {}", base.display());

    let mut found = Vec::new();
    for asset in fs::read_dir(base)? {
        let asset = asset?;
        if !asset.file_type()?.is_dir() {
            continue;
        }

        let asset_data = asset.path().join("AssetData");
        let bundles = match fs::read_dir(&asset_data) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Skipping asset without AssetData: {} ({})", asset_data.display(), e);
                continue;
            }
        };

        for bundle in bundles {
            let bundle = bundle?;
            let Some(dictionary) = list_bundle(&bundle.path())? else {
                continue;
            };
            debug!(
                "Found dictionary {:?} with {} resources",
                dictionary.name,
                dictionary.resources.len()
            );
            found.push(dictionary);
        }
    }

    found.sort_by(|a, b| a.name.cmp(&b.name));
    info!("Discovered {} dictionaries", found.len());
    Ok(found)
}

/// Reads a single `<Name>.dictionary` bundle, or `None` when it has no
/// usable resources.
fn list_bundle(bundle: &Path) -> Result<Option<InstalledDictionary>> {
    let Some(name) = bundle.file_stem().and_then(|s| s.to_str()) else {
        warn!("Skipping bundle with unreadable name: {}", bundle.display());
        return Ok(None);
    };

    let resources_dir = bundle.join("Contents").join("Resources");
    let entries = match fs::read_dir(&resources_dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                "Skipping bundle without Contents/Resources: {} ({})",
                bundle.display(),
                e
            );
            return Ok(None);
        }
    };

    let mut resources = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == LPROJ_EXT) {
            continue;
        }
        resources.push(path);
    }
    if resources.is_empty() {
        return Ok(None);
    }
    resources.sort();

    Ok(Some(InstalledDictionary {
        name: name.to_string(),
        resources,
    }))
}
