//! Custom error types for the apple-peeler crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum PeelError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input ended before a structure could be read in full.
    #[error("Truncated input while reading {context}: needed {needed} bytes, {available} available")]
    Truncated {
        context: &'static str,
        needed: u64,
        available: u64,
    },

    /// A declared size does not match what was actually found.
    #[error("Size mismatch for {context}: expected {expected} bytes, found {found} bytes")]
    SizeMismatch {
        context: &'static str,
        expected: u64,
        found: u64,
    },

    /// A zlib stream ended before its enclosing blob did.
    #[error("Trailing data after {context}: {trailing} undecoded bytes")]
    TrailingData {
        context: &'static str,
        trailing: u64,
    },

    /// A region that must be zero-filled contains other bytes.
    #[error("Dirty padding in {region}: non-zero byte at offset {offset}")]
    DirtyPadding { region: &'static str, offset: u64 },

    /// An error occurred during decompression, often due to corrupted data.
    #[error("Decompression failed: {0}")]
    Decompression(String),

    /// A dictionary entry is not valid UTF-8.
    #[error("Invalid UTF-8 in dictionary entry: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// The file is structurally invalid for the Body.data layout.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// The reassembled document could not be parsed as XML.
    #[error("XML error: {0}")]
    Xml(String),

    /// A requested dictionary name is not present under the asset base.
    #[error("Unknown dictionary: {0:?}")]
    UnknownDictionary(String),

    /// No zlib stream could be located anywhere in the scanned input.
    #[error("No zlib stream found in {scanned} bytes")]
    NoZlibStream { scanned: u64 },
}

/// A convenience `Result` type alias using the crate's `PeelError` type.
pub type Result<T> = std::result::Result<T, PeelError>;
