use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::debug;
use tracing_subscriber::filter::LevelFilter;

use apple_peeler::{body::BodyData, catalog, document, PeelError};

/// Extract XML from Apple Dictionary files.
#[derive(Parser)]
#[command(name = "apple-peeler")]
#[command(about = "Extract XML from Apple Dictionary files")]
struct Cli {
    /// The root directory of the OS X dictionaries
    #[arg(long, env = "DICT_BASE", default_value = catalog::DEFAULT_ASSET_BASE)]
    base: PathBuf,

    /// The path to place extracted XML files (defaults to stdout)
    #[arg(long)]
    out: Option<PathBuf>,

    /// The dictionary to extract, or "all" (accepts multiple)
    #[arg(short = 'd', long = "dictionary", default_value = "all")]
    dictionary: Vec<String>,

    /// Format the XML files
    #[arg(long, overrides_with = "no_format_xml")]
    format_xml: bool,

    /// Do not format the XML files (default)
    #[arg(long, overrides_with = "format_xml")]
    no_format_xml: bool,

    /// Output debug information to STDERR
    #[arg(long)]
    debug: bool,
}

impl Cli {
    /// The formatting flags override each other; the last one on the
    /// command line wins, default off.
    fn format_xml(&self) -> bool {
        self.format_xml && !self.no_format_xml
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    if !cli.base.is_dir() {
        bail!("base directory does not exist: {}", cli.base.display());
    }
    if let Some(out) = &cli.out {
        if !out.is_dir() {
            bail!("output directory does not exist: {}", out.display());
        }
    }

    let dictionaries = catalog::discover(&cli.base)
        .with_context(|| format!("scanning {}", cli.base.display()))?;
    let selected = select(&dictionaries, &cli.dictionary)?;

    let total = selected.len();
    for (idx, dictionary) in selected.iter().enumerate() {
        let Some(body_path) = dictionary.body_data() else {
            debug!("Skipping {}: no {} resource", dictionary.name, catalog::BODY_DATA);
            continue;
        };

        debug!("Processing file: {}/{}", dictionary.name, catalog::BODY_DATA);
        extract(&dictionary.name, body_path, cli.out.as_deref(), cli.format_xml())
            .with_context(|| format!("extracting {}", dictionary.name))?;
        debug!("Processed {}: {}/{}", dictionary.name, idx + 1, total);
    }

    Ok(())
}

/// Restricts the catalog to the names requested on the command line.
///
/// `all` selects everything; any other name must match a discovered
/// dictionary exactly.
fn select<'a>(
    dictionaries: &'a [catalog::InstalledDictionary],
    requested: &[String],
) -> Result<Vec<&'a catalog::InstalledDictionary>> {
    if requested.iter().any(|name| name == "all") {
        return Ok(dictionaries.iter().collect());
    }

    for name in requested {
        if !dictionaries.iter().any(|d| &d.name == name) {
            let available: Vec<&str> = dictionaries.iter().map(|d| d.name.as_str()).collect();
            return Err(PeelError::UnknownDictionary(name.clone()))
                .with_context(|| format!("available dictionaries: {}", available.join(", ")));
        }
    }

    Ok(dictionaries
        .iter()
        .filter(|d| requested.iter().any(|name| name == &d.name))
        .collect())
}

/// Extracts one dictionary and writes the document to `out` or stdout.
fn extract(name: &str, body_path: &Path, out: Option<&Path>, format_xml: bool) -> Result<()> {
    let body = BodyData::open(body_path)?;
    let entries = body
        .entries()
        .collect::<Result<Vec<String>, PeelError>>()?;

    let mut text = document::assemble(&entries);
    if format_xml {
        debug!("Prettifying XML for {}", name);
        text = document::prettify(&text)?;
    }

    match out {
        Some(dir) => {
            let out_file = dir.join(format!("{}.xml", name));
            debug!("Writing XML to {}: Found {} entries", out_file.display(), entries.len());
            std::fs::write(&out_file, text)
                .with_context(|| format!("writing {}", out_file.display()))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(text.as_bytes())?;
            handle.write_all(b"\n")?;
        }
    }

    Ok(())
}
