//! Body.data container parsing.
//!
//! A `Body.data` file bundles every entry of one Apple dictionary:
//! a fixed 96-byte preamble, a stream of framed zlib chunks, and a
//! zero-filled trailer. Each inflated chunk holds a run of length-prefixed
//! UTF-8 XML fragments, one per dictionary entry.

pub mod compression;
pub mod entries;
pub mod header;
pub mod models;

mod chunks;
mod utils;

use std::fs;
use std::path::Path;
use std::vec::IntoIter;

use log::{debug, info};

use crate::error::{PeelError, Result};
use models::{BodyHeader, ChunkMeta};

/// A parsed Body.data container.
///
/// Parsing validates the full framing up front (preamble, chunk table,
/// trailer padding, declared content size) but inflates nothing; chunks are
/// decompressed on demand through [`read_chunk`](Self::read_chunk) or the
/// [`entries`](Self::entries) iterator.
#[derive(Debug)]
pub struct BodyData {
    bytes: Vec<u8>,
    header: BodyHeader,
    chunks: Vec<ChunkMeta>,
}

impl BodyData {
    /// Read and parse a Body.data file from the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening Body.data file: {}", path.display());
        Self::from_bytes(fs::read(path)?)
    }

    /// Parse a Body.data container from its raw bytes.
    ///
    /// # Errors
    /// Returns an error if:
    /// - the file is shorter than the 96-byte preamble
    /// - the preamble fields or padding are invalid
    /// - the chunk table is truncated
    /// - the trailer holds non-zero bytes
    /// - the framed span disagrees with the declared content size
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < header::PREAMBLE_LEN {
            return Err(PeelError::Truncated {
                context: "Body.data preamble",
                needed: header::PREAMBLE_LEN as u64,
                available: bytes.len() as u64,
            });
        }

        let preamble: &[u8; header::PREAMBLE_LEN] = bytes[..header::PREAMBLE_LEN]
            .try_into()
            .expect("slice length checked above");
        let body_header = header::parse(preamble)?;

        let body = &bytes[header::PREAMBLE_LEN..];
        let (chunk_table, span) =
            chunks::parse_table(body, header::PREAMBLE_LEN as u64, body_header.chunk_count)?;

        // Past the last frame the file must be zero filled to EOF.
        let trailer = &body[span as usize..];
        if let Some(offset) = trailer.iter().position(|&b| b != 0) {
            return Err(PeelError::DirtyPadding {
                region: "trailer",
                offset: header::PREAMBLE_LEN as u64 + span + offset as u64,
            });
        }

        // The preamble declares the content size as the meaningful header
        // tail plus every chunk frame.
        let content_size = u64::from(body_header.header_size) + span;
        if content_size != u64::from(body_header.content_size) {
            return Err(PeelError::SizeMismatch {
                context: "declared content size",
                expected: u64::from(body_header.content_size),
                found: content_size,
            });
        }

        info!(
            "Body.data parsed: {} chunks, {} content bytes",
            chunk_table.len(),
            body_header.content_size
        );

        Ok(Self {
            bytes,
            header: body_header,
            chunks: chunk_table,
        })
    }

    /// Returns the parsed preamble fields.
    pub fn header(&self) -> &BodyHeader {
        &self.header
    }

    /// Returns the per-chunk metadata table.
    pub fn chunks(&self) -> &[ChunkMeta] {
        &self.chunks
    }

    /// Returns the number of chunks in the container.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Inflates a single chunk, returning its raw entry-stream content.
    pub fn read_chunk(&self, index: usize) -> Result<Vec<u8>> {
        let meta = self.chunks.get(index).ok_or_else(|| {
            PeelError::InvalidFormat(format!("invalid chunk index: {}", index))
        })?;
        let start = meta.file_offset as usize;
        let end = start + 4 + meta.compressed_size as usize;
        compression::inflate_chunk(&self.bytes[start..end])
    }

    /// Inflates a single chunk and splits it into XML entry fragments.
    pub fn chunk_entries(&self, index: usize) -> Result<Vec<String>> {
        let content = self.read_chunk(index)?;
        let parsed = entries::split_entries(&content)?;
        debug!(
            "Chunk {}/{}: {} entries",
            index + 1,
            self.chunks.len(),
            parsed.len()
        );
        Ok(parsed)
    }

    /// Returns an iterator over every entry in the container.
    ///
    /// Memory efficient: inflates one chunk at a time, in file order.
    pub fn entries(&self) -> EntriesIter<'_> {
        EntriesIter::new(self)
    }
}

/// Iterator over the XML entry fragments of a [`BodyData`] container.
///
/// Yields `Result<String>` so a corrupt chunk surfaces at the entry that
/// needed it rather than up front. Created by [`BodyData::entries`].
pub struct EntriesIter<'a> {
    body: &'a BodyData,
    chunk_idx: usize,
    current: IntoIter<String>,
}

impl<'a> EntriesIter<'a> {
    fn new(body: &'a BodyData) -> Self {
        Self {
            body,
            chunk_idx: 0,
            current: Vec::new().into_iter(),
        }
    }
}

impl<'a> Iterator for EntriesIter<'a> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Drain the chunk decoded last.
            if let Some(entry) = self.current.next() {
                return Some(Ok(entry));
            }

            // All chunks exhausted?
            if self.chunk_idx >= self.body.chunk_count() {
                return None;
            }

            // Inflate and split the next chunk.
            match self.body.chunk_entries(self.chunk_idx) {
                Ok(parsed) => {
                    self.current = parsed.into_iter();
                    self.chunk_idx += 1;
                }
                Err(e) => {
                    // A failed chunk ends the iteration.
                    self.chunk_idx = self.body.chunk_count();
                    return Some(Err(e));
                }
            }
        }
    }
}
