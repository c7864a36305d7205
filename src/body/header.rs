//! Body.data preamble parsing.
//!
//! Every container opens with a fixed 96-byte preamble. Apart from a run of
//! leading zero padding, it holds three meaningful little-endian words,
//! interleaved with `0xFFFFFFFF` separator words whose placement varies
//! between files.

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace};

use super::models::BodyHeader;
use crate::error::{PeelError, Result};

/// Fixed size of the Body.data preamble, in bytes.
pub const PREAMBLE_LEN: usize = 96;

/// Separator word between preamble fields.
const FIELD_SEP: u32 = 0xFFFF_FFFF;

/// How many non-separator words the scan must yield to cover the content
/// size (the 5th surviving value, see [`parse`]).
const REQUIRED_FIELDS: usize = 5;

/// Parses the 96-byte Body.data preamble.
///
/// # Preamble structure
/// ```text
/// [96 - header_size bytes] zero padding
/// [header_size bytes]      field words, e.g.:
///     content size  (u32)
///     0xFFFFFFFF separator
///     reserved      (u32)
///     header size   (u32)
///     reserved      (u32)
///     chunk count   (u32)
///     0xFFFFFFFF separator, twice
/// ```
///
/// Separator placement is not fixed, so fields are located by scanning the
/// 24 words from the end of the preamble backwards and skipping every
/// `0xFFFFFFFF` word. Of the surviving values, in scan order, the 1st is
/// the chunk count, the 3rd the header size and the 5th the content size;
/// the 2nd and 4th are reserved and ignored.
///
/// # Errors
/// Returns an error if fewer than five non-separator words survive, if the
/// header size exceeds the preamble, or if the padding run in front of the
/// meaningful tail contains non-zero bytes.
pub fn parse(preamble: &[u8; PREAMBLE_LEN]) -> Result<BodyHeader> {
    let mut fields = [0u32; REQUIRED_FIELDS];
    let mut found = 0;
    for word in preamble.chunks_exact(4).rev() {
        let value = LittleEndian::read_u32(word);
        if value == FIELD_SEP {
            continue;
        }
        fields[found] = value;
        found += 1;
        if found == REQUIRED_FIELDS {
            break;
        }
    }
    if found < REQUIRED_FIELDS {
        return Err(PeelError::InvalidFormat(format!(
            "preamble holds {} field words, {} required",
            found, REQUIRED_FIELDS
        )));
    }

    let chunk_count = fields[0];
    let header_size = fields[2];
    let content_size = fields[4];
    trace!(
        "Preamble scan: chunk_count={}, header_size={}, content_size={} (reserved: {:#x}, {:#x})",
        chunk_count, header_size, content_size, fields[1], fields[3]
    );

    if header_size as usize > PREAMBLE_LEN {
        return Err(PeelError::InvalidFormat(format!(
            "preamble header size {} exceeds the {}-byte preamble",
            header_size, PREAMBLE_LEN
        )));
    }

    // Everything in front of the meaningful tail must be zero filled.
    let padding = &preamble[..PREAMBLE_LEN - header_size as usize];
    if let Some(offset) = padding.iter().position(|&b| b != 0) {
        return Err(PeelError::DirtyPadding {
            region: "preamble",
            offset: offset as u64,
        });
    }

    debug!(
        "Preamble parsed: {} chunks, content size {} bytes, header size {} bytes",
        chunk_count, content_size, header_size
    );

    Ok(BodyHeader {
        content_size,
        header_size,
        chunk_count,
    })
}
