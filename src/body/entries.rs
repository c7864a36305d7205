//! Entry splitting (dictionary content inside a decompressed chunk).

use log::trace;

use super::utils::{read_u32, take};
use crate::error::Result;

/// Splits a decompressed chunk into its XML entry fragments.
///
/// A chunk's content is a dense sequence of length-prefixed records:
/// ```text
/// [4 bytes] entry length (u32 LE)
/// [entry length bytes] UTF-8 XML fragment
/// ...repeated until the content is exhausted
/// ```
///
/// A zero-length record is legal and yields an empty string. Entries never
/// straddle chunks, so the content must divide exactly into records.
///
/// # Errors
/// Returns an error if a record is cut short by the end of the content or
/// if the fragment bytes are not valid UTF-8.
pub fn split_entries(content: &[u8]) -> Result<Vec<String>> {
    let mut entries = Vec::new();
    let mut reader = content;

    while !reader.is_empty() {
        let length = read_u32(&mut reader, "entry length")?;
        let bytes = take(&mut reader, length as usize, "entry text")?;
        entries.push(String::from_utf8(bytes.to_vec())?);
    }

    trace!("Split {} entries from {} content bytes", entries.len(), content.len());
    Ok(entries)
}
