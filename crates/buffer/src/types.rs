// Chunk: docs/chunks/chunk_chain - Chunk chain byte buffer with offset addressing

use std::fmt;
use std::ops::Range;

/// Stable handle of a chunk slot inside the buffer's arena.
///
/// Handles are only meaningful to the buffer that issued them and only until the
/// next mutating call: a pruned chunk's slot is recycled for the next chunk created.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkId(u32);

impl ChunkId {
    pub(crate) fn new(slot: u32) -> Self {
        Self(slot)
    }

    /// Returns the raw slot number.
    pub fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkId({})", self.0)
    }
}

/// A detached snapshot of one chunk's position in the chain.
///
/// Unlike a `&Chunk`, a `ChunkInfo` can be held across mutating calls; it simply
/// describes the chain as it was when the snapshot was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkInfo {
    /// Position in the chain, 0-based.
    pub index: usize,
    /// Absolute offset of the chunk's first byte.
    pub start_offset: usize,
    /// Absolute offset one past the chunk's last byte.
    pub end_offset: usize,
    /// Number of valid bytes held.
    pub size: usize,
}

impl ChunkInfo {
    /// The half-open byte span `[start_offset, end_offset)` covered by the chunk.
    pub fn span(&self) -> Range<usize> {
        self.start_offset..self.end_offset
    }
}
