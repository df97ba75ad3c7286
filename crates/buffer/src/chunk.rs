// Chunk: docs/chunks/chunk_chain - Chunk chain byte buffer with offset addressing

//! A single fixed-capacity segment of buffer content.
//!
//! A chunk owns `capacity` bytes of storage of which the first `size` are valid.
//! Its `index` and offset fields are caches maintained by the owning buffer's
//! recalculation pass; they are only trustworthy between public operations.

use std::fmt;
use std::ops::Range;

use crate::types::{ChunkId, ChunkInfo};

/// One link of the chunk chain.
#[derive(Debug)]
pub struct Chunk {
    pub(crate) index: usize,
    pub(crate) size: usize,
    pub(crate) start_offset: usize,
    pub(crate) end_offset: usize,
    /// Fixed storage; its length is the chunk's capacity.
    pub(crate) data: Box<[u8]>,
    /// The chain's only forward link.
    pub(crate) next: Option<ChunkId>,
}

impl Chunk {
    /// Allocates a chunk of `capacity` bytes holding a copy of `bytes`.
    ///
    /// The chunk is unlinked and has stale index/offset fields until the owning
    /// buffer links it and recalculates.
    pub(crate) fn new(bytes: &[u8], capacity: usize) -> Self {
        debug_assert!(
            bytes.len() <= capacity,
            "chunk payload of {} bytes exceeds capacity {}",
            bytes.len(),
            capacity
        );
        let mut data = vec![0u8; capacity].into_boxed_slice();
        data[..bytes.len()].copy_from_slice(bytes);
        Self {
            index: 0,
            size: bytes.len(),
            start_offset: 0,
            end_offset: bytes.len(),
            data,
            next: None,
        }
    }

    /// Position of this chunk in the chain.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of valid bytes held.
    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Maximum number of bytes this chunk can hold.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Bytes that can still be written in place.
    pub fn spare_capacity(&self) -> usize {
        self.capacity() - self.size
    }

    pub fn is_full(&self) -> bool {
        self.size == self.capacity()
    }

    /// Absolute offset of the first byte.
    pub fn start_offset(&self) -> usize {
        self.start_offset
    }

    /// Absolute offset one past the last byte.
    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    /// The half-open byte span covered by this chunk.
    pub fn span(&self) -> Range<usize> {
        self.start_offset..self.end_offset
    }

    /// Returns true if `offset` falls within `[start_offset, end_offset)`.
    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start_offset <= offset && offset < self.end_offset
    }

    /// The valid bytes of this chunk.
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.size]
    }

    /// Detached snapshot of this chunk's position.
    pub fn info(&self) -> ChunkInfo {
        ChunkInfo {
            index: self.index,
            start_offset: self.start_offset,
            end_offset: self.end_offset,
            size: self.size,
        }
    }

    /// Writes `byte` at the end of the valid region.
    ///
    /// Only the chunk's own size and end offset move; the caller owns the
    /// buffer-level totals.
    pub(crate) fn push(&mut self, byte: u8) {
        debug_assert!(!self.is_full());
        self.data[self.size] = byte;
        self.size += 1;
        self.end_offset += 1;
    }

    /// Removes `len` bytes starting at relative position `at`, shifting the
    /// trailing bytes left over the gap.
    pub(crate) fn erase(&mut self, at: usize, len: usize) {
        debug_assert!(at + len <= self.size);
        self.data.copy_within(at + len..self.size, at);
        self.size -= len;
    }

    /// Overwrites bytes starting at relative position `at`.
    pub(crate) fn overwrite(&mut self, at: usize, bytes: &[u8]) {
        debug_assert!(at + bytes.len() <= self.size);
        self.data[at..at + bytes.len()].copy_from_slice(bytes);
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.bytes()))
    }
}
