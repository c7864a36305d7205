//! Data structures representing Body.data container components.

/// The meaningful fields of the 96-byte Body.data preamble.
///
/// The preamble opens every container: a run of zero padding followed by a
/// short tail of little-endian words interleaved with `0xFFFFFFFF`
/// separators. See [`header::parse`](super::header::parse) for the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyHeader {
    /// Declared content size: `header_size` plus the framed chunk span.
    pub content_size: u32,
    /// Length of the meaningful preamble tail, in bytes (at most 96).
    pub header_size: u32,
    /// Number of framed chunks following the preamble.
    pub chunk_count: u32,
}

/// Metadata describing a single compressed chunk.
///
/// A chunk blob carries a 4-byte declared decompressed size followed by one
/// zlib stream. Chunks can be independently inflated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkMeta {
    /// Absolute byte offset of the chunk blob (its declared-size word)
    /// within the container.
    pub file_offset: u64,
    /// Size of the zlib stream as stored in the file (blob size minus the
    /// declared-size word).
    pub compressed_size: u32,
    /// Declared size of the chunk after inflation.
    pub decompressed_size: u32,
}
