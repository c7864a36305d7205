//! Chunk table parsing (the framed compressed payloads).

use log::{debug, trace};

use super::models::ChunkMeta;
use super::utils::{read_u32, take};
use crate::error::{PeelError, Result};

/// Byte length of the two size words framing every chunk blob.
pub(super) const FRAME_LEN: u32 = 8;

/// Walks the chunk stream that follows the preamble.
///
/// # Chunk frame structure
/// ```text
/// [4 bytes] outer size (blob size + 4; the size is stored twice)
/// [4 bytes] inner size (blob size)
/// [inner size bytes] chunk blob:
///     [4 bytes] declared decompressed size
///     [inner size - 4 bytes] zlib stream
/// ```
///
/// The outer word duplicates the inner one and is never trusted; only the
/// inner size drives the walk. `base_offset` is the absolute position of
/// `body` within the container and is baked into each
/// [`ChunkMeta::file_offset`].
///
/// Returns the chunk table and the framed span: the total number of bytes
/// consumed by all frames, which the caller checks against the declared
/// content size.
pub fn parse_table(
    body: &[u8],
    base_offset: u64,
    chunk_count: u32,
) -> Result<(Vec<ChunkMeta>, u64)> {
    let mut reader = body;
    let mut chunks = Vec::with_capacity(chunk_count as usize);
    let mut span = 0u64;

    for index in 0..chunk_count {
        let outer_size = read_u32(&mut reader, "chunk outer size")?;
        let inner_size = read_u32(&mut reader, "chunk inner size")?;
        trace!(
            "Chunk {}/{}: outer={} bytes, inner={} bytes",
            index + 1,
            chunk_count,
            outer_size,
            inner_size
        );

        let blob = take(&mut reader, inner_size as usize, "chunk blob")?;
        if blob.len() < 4 {
            return Err(PeelError::Truncated {
                context: "chunk declared size",
                needed: 4,
                available: blob.len() as u64,
            });
        }
        let mut size_reader = blob;
        let decompressed_size = read_u32(&mut size_reader, "chunk declared size")?;

        let blob_start = span + u64::from(FRAME_LEN);
        chunks.push(ChunkMeta {
            file_offset: base_offset + blob_start,
            compressed_size: inner_size - 4,
            decompressed_size,
        });
        span += u64::from(FRAME_LEN) + u64::from(inner_size);
    }

    debug!("Chunk table parsed: {} chunks spanning {} bytes", chunks.len(), span);
    Ok((chunks, span))
}
