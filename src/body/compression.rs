//! Zlib decompression for chunk blobs.
//!
//! Every chunk blob opens with a 4-byte declared decompressed size; the
//! remainder is a single zlib stream. Both strict checks from the format's
//! reverse engineering are always on: the stream must account for the whole
//! blob, and the inflated length must match the declaration.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};
use flate2::read::ZlibDecoder;
use log::{debug, trace};

use crate::error::{PeelError, Result};

/// Inflates a chunk blob (declared-size word followed by a zlib stream).
///
/// # Errors
/// - [`PeelError::Truncated`] if the blob is shorter than the size word.
/// - [`PeelError::Decompression`] if the zlib stream is corrupt.
/// - [`PeelError::TrailingData`] if bytes remain in the blob after the
///   stream's final block.
/// - [`PeelError::SizeMismatch`] if the inflated length differs from the
///   declared size.
pub fn inflate_chunk(blob: &[u8]) -> Result<Vec<u8>> {
    if blob.len() < 4 {
        return Err(PeelError::Truncated {
            context: "chunk declared size",
            needed: 4,
            available: blob.len() as u64,
        });
    }
    let declared = LittleEndian::read_u32(&blob[..4]);
    let stream = &blob[4..];
    trace!(
        "Inflating chunk: {} compressed bytes, {} declared",
        stream.len(),
        declared
    );

    let mut decoder = ZlibDecoder::new(stream);
    let mut inflated = Vec::with_capacity(declared as usize);
    decoder
        .read_to_end(&mut inflated)
        .map_err(|e| PeelError::Decompression(format!("zlib inflate failed: {}", e)))?;

    // The blob must hold exactly one stream; leftover bytes mean the frame
    // sizes and the stream disagree.
    let consumed = decoder.total_in();
    if consumed < stream.len() as u64 {
        return Err(PeelError::TrailingData {
            context: "chunk zlib stream",
            trailing: stream.len() as u64 - consumed,
        });
    }

    if inflated.len() as u64 != u64::from(declared) {
        return Err(PeelError::SizeMismatch {
            context: "inflated chunk",
            expected: u64::from(declared),
            found: inflated.len() as u64,
        });
    }

    Ok(inflated)
}

/// Scans `data` for an embedded zlib stream at an unknown offset.
///
/// Exploratory helper for poking at undocumented asset files: bytes are
/// stripped from the front one at a time until a complete stream inflates.
/// The skipped prefix is logged as hex at debug level. Returns the inflated
/// bytes and the unconsumed remainder after the stream.
///
/// # Errors
/// [`PeelError::NoZlibStream`] if no offset yields a complete stream.
pub fn scan_for_zlib(data: &[u8]) -> Result<(Vec<u8>, &[u8])> {
    for skipped in 0..data.len() {
        let candidate = &data[skipped..];
        if !plausible_zlib_start(candidate) {
            continue;
        }
        let mut decoder = ZlibDecoder::new(candidate);
        let mut inflated = Vec::new();
        if decoder.read_to_end(&mut inflated).is_err() {
            continue;
        }
        if skipped > 0 {
            debug!("The discarded bytes were: {}", hex::encode(&data[..skipped]));
        }
        let consumed = decoder.total_in() as usize;
        return Ok((inflated, &candidate[consumed..]));
    }
    Err(PeelError::NoZlibStream {
        scanned: data.len() as u64,
    })
}

/// Cheap zlib header test: compression method must be deflate (CM = 8) and
/// the two header bytes must satisfy the FCHECK divisibility rule. Offsets
/// failing this could never inflate, so the scanner skips them unattempted.
fn plausible_zlib_start(data: &[u8]) -> bool {
    if data.len() < 2 {
        return false;
    }
    let cmf = u16::from(data[0]);
    let flg = u16::from(data[1]);
    (cmf & 0x0F) == 8 && (cmf * 256 + flg) % 31 == 0
}
