//! # apple-peeler
//!
//! Find and extract Apple Dictionary files.
//!
//! macOS ships its dictionaries as binary `Body.data` containers staged
//! under a mobile-asset directory. This crate parses the chunked,
//! zlib-compressed container format (recovered through reverse
//! engineering) and reconstructs each dictionary's source XML document.
//!
//! - [`catalog`]: locate installed dictionary bundles under the asset base
//! - [`body`]: parse a `Body.data` container and iterate its entries
//! - [`document`]: reassemble and optionally pretty-print the XML document

pub mod body;
pub mod catalog;
pub mod document;
pub mod error;

// Re-export the main types for convenience
pub use body::models::{BodyHeader, ChunkMeta};
pub use body::BodyData;
pub use catalog::InstalledDictionary;
pub use error::{PeelError, Result};
