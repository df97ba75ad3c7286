// Chunk: docs/chunks/chunk_chain - Chunk chain byte buffer with offset addressing

//! ChunkBuffer is the main public API for offset-addressed editing.
//!
//! Content lives in a singly linked chain of fixed-capacity chunks. Every chunk
//! caches its chain index and absolute `[start_offset, end_offset)` span; the
//! buffer caches the chunk count, the total size and the tail chunk.
//!
//! Those caches are re-derived by [`ChunkBuffer::recalculate`], an explicit
//! O(chunk_count) pass that also prunes chunks that shrank to zero bytes. Every
//! mutating operation ends with that pass, except [`ChunkBuffer::append_byte`]
//! when the tail chunk has room, which updates the caches in place.

use std::fmt;

use crate::chunk::Chunk;
use crate::chunk_arena::ChunkArena;
use crate::config::BufferConfig;
use crate::error::{BufferError, Result};
use crate::observer::ChainObserver;
use crate::types::{ChunkId, ChunkInfo};

/// A mutable byte buffer stored as a chain of fixed-capacity chunks.
///
/// All positions are absolute byte offsets into `[0, len()]`. The buffer is
/// byte-oriented: offsets may fall inside a multi-byte UTF-8 sequence.
pub struct ChunkBuffer {
    chunks: ChunkArena,
    head: Option<ChunkId>,
    tail: Option<ChunkId>,
    chunk_count: usize,
    total_size: usize,
    config: BufferConfig,
    observer: Option<Box<dyn ChainObserver>>,
}

/// In-order iterator over the chunks of a [`ChunkBuffer`].
pub struct Chunks<'a> {
    arena: &'a ChunkArena,
    next: Option<ChunkId>,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a Chunk;

    fn next(&mut self) -> Option<&'a Chunk> {
        let chunk = self.arena.get(self.next?)?;
        self.next = chunk.next;
        Some(chunk)
    }
}

impl ChunkBuffer {
    /// Creates an empty buffer with the default chunk capacity.
    pub fn new() -> Self {
        Self::with_config(BufferConfig::default())
    }

    /// Creates an empty buffer using `config`.
    pub fn with_config(config: BufferConfig) -> Self {
        Self {
            chunks: ChunkArena::new(),
            head: None,
            tail: None,
            chunk_count: 0,
            total_size: 0,
            config,
            observer: None,
        }
    }

    /// Creates an empty buffer whose chunks hold at most `capacity` bytes.
    ///
    /// Returns `BufferError::InvalidCapacity` when `capacity` is zero.
    pub fn with_chunk_capacity(capacity: usize) -> Result<Self> {
        Ok(Self::with_config(BufferConfig::with_chunk_capacity(capacity)?))
    }

    /// Creates a buffer with the default chunk capacity holding `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut buffer = Self::new();
        buffer.load_from_bytes(bytes);
        buffer
    }

    /// Creates a buffer with the default chunk capacity holding `text`.
    ///
    /// Note: We don't implement `FromStr` because it requires returning `Result`,
    /// but loading a string into a ChunkBuffer cannot fail.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }

    /// Installs a hook that is told about pruned and released chunks.
    pub fn set_observer(&mut self, observer: Box<dyn ChainObserver>) {
        self.observer = Some(observer);
    }

    /// Removes and returns the installed observer, if any.
    pub fn take_observer(&mut self) -> Option<Box<dyn ChainObserver>> {
        self.observer.take()
    }

    // ==================== Accessors ====================

    /// Total number of bytes held.
    pub fn len(&self) -> usize {
        self.total_size
    }

    pub fn is_empty(&self) -> bool {
        self.total_size == 0
    }

    /// Number of chunks in the chain.
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Capacity given to newly created chunks.
    pub fn chunk_capacity(&self) -> usize {
        self.config.chunk_capacity()
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Iterates over the chunks in chain order.
    pub fn chunks(&self) -> Chunks<'_> {
        Chunks {
            arena: &self.chunks,
            next: self.head,
        }
    }

    /// Snapshot of every chunk's index, span and size, in chain order.
    pub fn chunk_infos(&self) -> Vec<ChunkInfo> {
        self.chunks().map(Chunk::info).collect()
    }

    // ==================== Recalculation ====================

    /// Re-derives every chunk's index and offsets from the head of the chain and
    /// prunes chunks holding zero bytes.
    ///
    /// This walks the whole chain: O(chunk_count). It is idempotent, so calling
    /// it on a consistent chain changes nothing.
    pub fn recalculate(&mut self) {
        let mut prev: Option<ChunkId> = None;
        let mut cursor = self.head;
        let mut count = 0;
        let mut offset = 0;

        while let Some(id) = cursor {
            let (next, size) = {
                let chunk = &self.chunks[id];
                (chunk.next, chunk.size)
            };

            if size == 0 {
                match prev {
                    Some(p) => self.chunks[p].next = next,
                    None => self.head = next,
                }
                self.chunks.remove(id);
                log::trace!("pruned empty chunk at index {}", count);
                self.notify_released(ChunkInfo {
                    index: count,
                    start_offset: offset,
                    end_offset: offset,
                    size: 0,
                });
                cursor = next;
                continue;
            }

            let chunk = &mut self.chunks[id];
            chunk.index = count;
            chunk.start_offset = offset;
            chunk.end_offset = offset + size;
            offset = chunk.end_offset;

            count += 1;
            prev = Some(id);
            cursor = next;
        }

        self.chunk_count = count;
        self.total_size = offset;
        self.tail = prev;
    }

    // ==================== Lookup ====================

    fn id_at_index(&self, index: usize) -> Option<ChunkId> {
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let chunk = &self.chunks[id];
            if chunk.index == index {
                return Some(id);
            }
            cursor = chunk.next;
        }
        None
    }

    fn id_at_offset(&self, offset: usize) -> Option<ChunkId> {
        let mut cursor = self.head;
        while let Some(id) = cursor {
            let chunk = &self.chunks[id];
            if chunk.contains_offset(offset) {
                return Some(id);
            }
            cursor = chunk.next;
        }
        None
    }

    /// Returns the chunk at position `index` in the chain.
    pub fn chunk_at_index(&self, index: usize) -> Option<&Chunk> {
        self.id_at_index(index).map(|id| &self.chunks[id])
    }

    /// Returns the chunk whose span contains `offset`.
    ///
    /// Spans are end-exclusive, so `offset == len()` is never found; callers that
    /// want the append position must check for it themselves.
    pub fn chunk_at_offset(&self, offset: usize) -> Option<&Chunk> {
        self.id_at_offset(offset).map(|id| &self.chunks[id])
    }

    /// Returns the index of the chunk containing `offset`, or `None` when no
    /// chunk contains it.
    pub fn index_at_offset(&self, offset: usize) -> Option<usize> {
        self.chunk_at_offset(offset).map(Chunk::index)
    }

    /// Resolves `[offset, offset + len)` to the chunk holding its first byte.
    ///
    /// Both the first and the last byte must be covered. An empty range resolves
    /// to `None` when `offset` is at most `len()`.
    fn resolve_range(&self, offset: usize, len: usize) -> Result<Option<ChunkId>> {
        let out_of_bounds = || BufferError::out_of_bounds(offset, len, self.total_size);

        let end = offset.checked_add(len).ok_or_else(out_of_bounds)?;
        if len == 0 {
            return if offset <= self.total_size {
                Ok(None)
            } else {
                Err(out_of_bounds())
            };
        }

        let first = self.id_at_offset(offset).ok_or_else(out_of_bounds)?;
        self.id_at_offset(end - 1).ok_or_else(out_of_bounds)?;
        Ok(Some(first))
    }

    // ==================== Linking ====================

    /// Links the already chained run `first..=last` so that `first` ends up at
    /// position `index`. `index` must be at most `chunk_count`.
    fn link_before_index(&mut self, index: usize, first: ChunkId, last: ChunkId) {
        let pred = match index {
            0 => None,
            _ => self.id_at_index(index - 1),
        };
        let successor = match pred {
            Some(p) => self.chunks[p].next,
            None => self.head,
        };

        self.chunks[last].next = successor;
        match pred {
            Some(p) => self.chunks[p].next = Some(first),
            None => self.head = Some(first),
        }
    }

    /// Cuts `bytes` into capacity-sized chunks and links them, in order, before
    /// the chunk at `index`. Recalculates once the whole run is linked.
    fn link_new_chunks(&mut self, index: usize, bytes: &[u8]) {
        let capacity = self.chunk_capacity();
        let mut first = None;
        let mut last: Option<ChunkId> = None;

        for piece in bytes.chunks(capacity) {
            let id = self.chunks.insert(Chunk::new(piece, capacity));
            match last {
                Some(prev) => self.chunks[prev].next = Some(id),
                None => first = Some(id),
            }
            last = Some(id);
        }

        if let (Some(first), Some(last)) = (first, last) {
            self.link_before_index(index, first, last);
            self.recalculate();
        }
        self.assert_chain_consistent();
    }

    // ==================== Splitting ====================

    /// Splits chunk `id` so that `offset` becomes the start of a chunk.
    ///
    /// The bytes before `offset` move into a new chunk linked just before `id`;
    /// `id` keeps the rest. Requires `start_offset < offset < end_offset`.
    fn split_chunk(&mut self, id: ChunkId, offset: usize) {
        let chunk = &self.chunks[id];
        debug_assert!(
            chunk.start_offset < offset && offset < chunk.end_offset,
            "split offset {} is not strictly inside {:?}",
            offset,
            chunk.span()
        );
        let cut = offset - chunk.start_offset;
        let index = chunk.index;
        let front = Chunk::new(&chunk.data[..cut], self.chunk_capacity());

        let front_id = self.chunks.insert(front);
        self.link_before_index(index, front_id, front_id);
        self.chunks[id].erase(0, cut);
        self.recalculate();
    }

    /// Splits the chunk containing `offset` so that `offset` starts a chunk.
    ///
    /// Does nothing if `offset` already is a chunk boundary. Fails with
    /// `OutOfBounds` when no chunk contains `offset`.
    pub fn split_at_offset(&mut self, offset: usize) -> Result<()> {
        let id = self
            .id_at_offset(offset)
            .ok_or_else(|| BufferError::out_of_bounds(offset, 0, self.total_size))?;
        if self.chunks[id].start_offset == offset {
            return Ok(());
        }
        self.split_chunk(id, offset);
        self.assert_chain_consistent();
        Ok(())
    }

    // ==================== Validation ====================

    /// Debug assertion: verifies the cached chain metadata against a fresh walk.
    ///
    /// Checks contiguous indices and offsets, the absence of empty or overfull
    /// chunks, and the buffer-level caches. Compiled out in release builds.
    #[cfg(debug_assertions)]
    fn assert_chain_consistent(&self) {
        let mut expected_index = 0;
        let mut expected_offset = 0;
        let mut last = None;

        for chunk in self.chunks() {
            assert_eq!(chunk.index, expected_index, "chunk index gap");
            assert_eq!(
                chunk.start_offset, expected_offset,
                "chunk #{} does not start where its predecessor ends",
                chunk.index
            );
            assert_eq!(chunk.end_offset, chunk.start_offset + chunk.size);
            assert!(chunk.size > 0, "empty chunk #{} left in chain", chunk.index);
            assert!(chunk.size <= chunk.capacity());
            expected_index += 1;
            expected_offset = chunk.end_offset;
            last = Some(chunk.index);
        }

        assert_eq!(self.chunk_count, expected_index, "stale chunk count");
        assert_eq!(self.chunks.len(), expected_index, "unreachable chunks in arena");
        assert_eq!(self.total_size, expected_offset, "stale total size");
        assert_eq!(
            self.tail.map(|id| self.chunks[id].index),
            last,
            "stale tail chunk"
        );
    }

    #[cfg(not(debug_assertions))]
    fn assert_chain_consistent(&self) {}

    // ==================== Mutations ====================

    /// Appends a single byte.
    ///
    /// When the last chunk has spare capacity the byte is written in place and the
    /// cached sizes are bumped directly, without a recalculation pass. Otherwise a
    /// new trailing chunk is created.
    pub fn append_byte(&mut self, byte: u8) {
        if let Some(tail) = self.tail {
            let chunk = &mut self.chunks[tail];
            if !chunk.is_full() {
                chunk.push(byte);
                self.total_size += 1;
                self.assert_chain_consistent();
                return;
            }
        }
        self.link_new_chunks(self.chunk_count, &[byte]);
    }

    /// Appends `bytes` as new chunks after the last chunk.
    pub fn append(&mut self, bytes: &[u8]) {
        self.link_new_chunks(self.chunk_count, bytes);
    }

    /// Inserts `bytes` as new chunks before the first chunk.
    pub fn prepend(&mut self, bytes: &[u8]) {
        self.link_new_chunks(0, bytes);
    }

    /// Inserts `bytes` as `ceil(len / capacity)` new chunks linked, in order,
    /// before the chunk currently at `index`, or after the last chunk when
    /// `index == chunk_count()`.
    ///
    /// Existing chunks are never filled up; the new bytes always get fresh chunks.
    pub fn insert_at_index(&mut self, index: usize, bytes: &[u8]) -> Result<()> {
        if index > self.chunk_count {
            return Err(BufferError::IndexOutOfRange {
                index,
                chunk_count: self.chunk_count,
            });
        }
        self.link_new_chunks(index, bytes);
        Ok(())
    }

    /// Inserts `bytes` so that they start at `offset`.
    ///
    /// `offset == len()` appends. An offset inside a chunk splits that chunk first
    /// so the insertion point is a chunk boundary.
    pub fn insert_at_offset(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let Some(id) = self.id_at_offset(offset) else {
            if offset == self.total_size {
                self.link_new_chunks(self.chunk_count, bytes);
                return Ok(());
            }
            return Err(BufferError::out_of_bounds(
                offset,
                bytes.len(),
                self.total_size,
            ));
        };

        if bytes.is_empty() {
            return Ok(());
        }

        if offset > self.chunks[id].start_offset {
            self.split_chunk(id, offset);
        }
        // After a split `id` holds the tail half and starts exactly at `offset`.
        let index = self.chunks[id].index;
        self.link_new_chunks(index, bytes);
        Ok(())
    }

    /// Removes the `len` bytes starting at `offset`.
    ///
    /// Both the first and the last byte of the range must exist, otherwise the
    /// call fails with `OutOfBounds` before anything is touched. Chunks emptied
    /// by the removal are pruned.
    pub fn delete_range(&mut self, offset: usize, len: usize) -> Result<()> {
        let Some(first) = self.resolve_range(offset, len)? else {
            return Ok(());
        };

        let mut cursor = Some(first);
        let mut at = offset - self.chunks[first].start_offset;
        let mut remaining = len;

        while remaining > 0 {
            let Some(id) = cursor else {
                break;
            };
            let chunk = &mut self.chunks[id];
            let take = (chunk.size - at).min(remaining);
            chunk.erase(at, take);

            remaining -= take;
            cursor = chunk.next;
            at = 0;
        }

        self.recalculate();
        self.assert_chain_consistent();
        Ok(())
    }

    /// Overwrites the bytes starting at `offset` with `bytes`.
    ///
    /// Never changes the chunk layout or the buffer length: the whole range
    /// `[offset, offset + bytes.len())` must already exist.
    pub fn replace_range(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let Some(first) = self.resolve_range(offset, bytes.len())? else {
            return Ok(());
        };

        let mut cursor = Some(first);
        let mut at = offset - self.chunks[first].start_offset;
        let mut done = 0;

        while done < bytes.len() {
            let Some(id) = cursor else {
                break;
            };
            let chunk = &mut self.chunks[id];
            let take = (chunk.size - at).min(bytes.len() - done);
            chunk.overwrite(at, &bytes[done..done + take]);

            done += take;
            cursor = chunk.next;
            at = 0;
        }

        self.assert_chain_consistent();
        Ok(())
    }

    // ==================== Reads ====================

    /// Copies `destination.len()` bytes starting at `offset` into `destination`.
    pub fn read_range(&self, offset: usize, destination: &mut [u8]) -> Result<()> {
        let Some(first) = self.resolve_range(offset, destination.len())? else {
            return Ok(());
        };

        let mut cursor = Some(first);
        let mut at = offset - self.chunks[first].start_offset;
        let mut done = 0;

        while done < destination.len() {
            let Some(id) = cursor else {
                break;
            };
            let chunk = &self.chunks[id];
            let take = (chunk.size - at).min(destination.len() - done);
            destination[done..done + take].copy_from_slice(&chunk.bytes()[at..at + take]);

            done += take;
            cursor = chunk.next;
            at = 0;
        }

        Ok(())
    }

    /// Reads `len` bytes starting at `offset` into a new vector.
    pub fn read_to_vec(&self, offset: usize, len: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; len];
        self.read_range(offset, &mut out)?;
        Ok(out)
    }

    // ==================== Teardown ====================

    /// Releases every chunk. The buffer stays usable with its configuration.
    pub fn clear(&mut self) {
        self.release_all();
    }

    fn release_all(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            let mut cursor = self.head;
            while let Some(id) = cursor {
                let chunk = &self.chunks[id];
                observer.chunk_released(chunk.info());
                cursor = chunk.next;
            }
            observer.buffer_released(self.total_size, self.chunk_count);
        }

        self.chunks.clear();
        self.head = None;
        self.tail = None;
        self.chunk_count = 0;
        self.total_size = 0;
    }

    fn notify_released(&mut self, info: ChunkInfo) {
        if let Some(observer) = self.observer.as_mut() {
            observer.chunk_released(info);
        }
    }
}

impl Default for ChunkBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ChunkBuffer {
    fn drop(&mut self) {
        if self.observer.is_some() {
            self.release_all();
        }
    }
}

impl fmt::Debug for ChunkBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkBuffer")
            .field("chunk_count", &self.chunk_count)
            .field("total_size", &self.total_size)
            .field("chunk_capacity", &self.chunk_capacity())
            .field("chunks", &self.chunk_infos())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn buffer(capacity: usize) -> ChunkBuffer {
        ChunkBuffer::with_chunk_capacity(capacity).unwrap()
    }

    fn sizes(buf: &ChunkBuffer) -> Vec<usize> {
        buf.chunks().map(Chunk::len).collect()
    }

    fn spans(buf: &ChunkBuffer) -> Vec<std::ops::Range<usize>> {
        buf.chunks().map(Chunk::span).collect()
    }

    fn content(buf: &ChunkBuffer) -> Vec<u8> {
        buf.chunks().flat_map(|c| c.bytes().to_vec()).collect()
    }

    /// Observer that records released chunk sizes into shared state.
    #[derive(Default, Clone)]
    struct Recorder {
        released: Rc<RefCell<Vec<usize>>>,
        buffers: Rc<RefCell<Vec<(usize, usize)>>>,
    }

    impl ChainObserver for Recorder {
        fn chunk_released(&mut self, info: ChunkInfo) {
            self.released.borrow_mut().push(info.size);
        }

        fn buffer_released(&mut self, total_size: usize, chunk_count: usize) {
            self.buffers.borrow_mut().push((total_size, chunk_count));
        }
    }

    // ==================== Basic Tests ====================

    #[test]
    fn test_new_empty() {
        let buf = ChunkBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.chunk_count(), 0);
        assert_eq!(buf.chunk_capacity(), crate::config::DEFAULT_CHUNK_CAPACITY);
        assert!(buf.chunks().next().is_none());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            ChunkBuffer::with_chunk_capacity(0),
            Err(BufferError::InvalidCapacity)
        ));
    }

    #[test]
    fn test_from_str_default_capacity() {
        let buf = ChunkBuffer::from_str("hello");
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.chunk_count(), 1);
        assert_eq!(content(&buf), b"hello");
    }

    // ==================== Insert Tests ====================

    #[test]
    fn test_insert_into_empty_splits_by_capacity() {
        let mut buf = buffer(4);
        buf.insert_at_offset(0, b"AAABBBCCC").unwrap();

        assert_eq!(sizes(&buf), vec![4, 4, 1]);
        assert_eq!(spans(&buf), vec![0..4, 4..8, 8..9]);
        assert_eq!(buf.len(), 9);
        assert_eq!(buf.chunk_count(), 3);
    }

    #[test]
    fn test_insert_at_chunk_boundary_does_not_split() {
        let mut buf = buffer(4);
        buf.insert_at_offset(0, b"AAAABBBB").unwrap();
        buf.insert_at_offset(4, b"xy").unwrap();

        assert_eq!(content(&buf), b"AAAAxyBBBB");
        assert_eq!(sizes(&buf), vec![4, 2, 4]);
    }

    #[test]
    fn test_insert_inside_chunk_splits_first() {
        let mut buf = buffer(4);
        buf.insert_at_offset(0, b"abcd").unwrap();
        buf.insert_at_offset(1, b"XYZ").unwrap();

        assert_eq!(content(&buf), b"aXYZbcd");
        assert_eq!(sizes(&buf), vec![1, 3, 3]);
        assert_eq!(spans(&buf), vec![0..1, 1..4, 4..7]);
    }

    #[test]
    fn test_insert_at_start() {
        let mut buf = buffer(4);
        buf.insert_at_offset(0, b"world").unwrap();
        buf.insert_at_offset(0, b"hello ").unwrap();
        assert_eq!(content(&buf), b"hello world");
    }

    #[test]
    fn test_insert_at_end_appends() {
        let mut buf = buffer(4);
        buf.insert_at_offset(0, b"abc").unwrap();
        buf.insert_at_offset(3, b"def").unwrap();
        assert_eq!(content(&buf), b"abcdef");
        assert_eq!(sizes(&buf), vec![3, 3]);
    }

    #[test]
    fn test_insert_past_end_fails() {
        let mut buf = buffer(4);
        buf.insert_at_offset(0, b"abc").unwrap();
        let err = buf.insert_at_offset(4, b"x").unwrap_err();
        assert!(matches!(err, BufferError::OutOfBounds { offset: 4, .. }));
        assert_eq!(content(&buf), b"abc");
    }

    #[test]
    fn test_insert_empty_is_noop() {
        let mut buf = buffer(4);
        buf.insert_at_offset(0, b"abcd").unwrap();
        buf.insert_at_offset(2, b"").unwrap();
        assert_eq!(sizes(&buf), vec![4]);
    }

    #[test]
    fn test_insert_at_index() {
        let mut buf = buffer(4);
        buf.append(b"aaaabbbb");
        buf.insert_at_index(1, b"XY").unwrap();
        assert_eq!(content(&buf), b"aaaaXYbbbb");
        assert_eq!(buf.chunk_at_index(1).unwrap().bytes(), b"XY");
    }

    #[test]
    fn test_insert_at_index_equal_to_count_appends() {
        let mut buf = buffer(4);
        buf.append(b"ab");
        buf.insert_at_index(1, b"cd").unwrap();
        assert_eq!(content(&buf), b"abcd");
        assert_eq!(buf.chunk_count(), 2);
    }

    #[test]
    fn test_insert_at_index_out_of_range() {
        let mut buf = buffer(4);
        buf.append(b"ab");
        let err = buf.insert_at_index(2, b"x").unwrap_err();
        assert!(matches!(
            err,
            BufferError::IndexOutOfRange {
                index: 2,
                chunk_count: 1
            }
        ));
    }

    #[test]
    fn test_prepend() {
        let mut buf = buffer(4);
        buf.append(b"world");
        buf.prepend(b"hi ");
        assert_eq!(content(&buf), b"hi world");
        assert_eq!(buf.chunk_at_index(0).unwrap().bytes(), b"hi ");
    }

    // ==================== Append Byte Tests ====================

    #[test]
    fn test_append_byte_fills_tail_in_place() {
        let mut buf = buffer(4);
        buf.insert_at_offset(0, b"AAABBBCCC").unwrap();

        for _ in 0..3 {
            buf.append_byte(b'f');
        }
        assert_eq!(sizes(&buf), vec![4, 4, 4]);
        assert_eq!(buf.len(), 12);

        buf.append_byte(b'f');
        buf.append_byte(b'f');
        assert_eq!(sizes(&buf), vec![4, 4, 4, 2]);
        assert_eq!(buf.len(), 14);
        assert_eq!(buf.chunk_at_index(3).unwrap().span(), 12..14);
        assert_eq!(content(&buf), b"AAABBBCCCfffff");
    }

    #[test]
    fn test_append_byte_on_empty_buffer() {
        let mut buf = buffer(2);
        buf.append_byte(b'a');
        buf.append_byte(b'b');
        buf.append_byte(b'c');
        assert_eq!(sizes(&buf), vec![2, 1]);
        assert_eq!(content(&buf), b"abc");
    }

    // ==================== Lookup Tests ====================

    #[test]
    fn test_chunk_at_offset_end_exclusive() {
        let mut buf = buffer(4);
        buf.append(b"abcdef");
        assert_eq!(buf.chunk_at_offset(3).unwrap().index(), 0);
        assert_eq!(buf.chunk_at_offset(4).unwrap().index(), 1);
        assert!(buf.chunk_at_offset(6).is_none());
        assert!(buf.chunk_at_offset(100).is_none());
    }

    #[test]
    fn test_index_at_offset_distinguishes_not_found() {
        let mut buf = buffer(4);
        assert_eq!(buf.index_at_offset(0), None);
        buf.append(b"abcdef");
        assert_eq!(buf.index_at_offset(0), Some(0));
        assert_eq!(buf.index_at_offset(5), Some(1));
        assert_eq!(buf.index_at_offset(6), None);
    }

    #[test]
    fn test_chunk_at_index() {
        let mut buf = buffer(4);
        buf.append(b"abcdefghi");
        assert_eq!(buf.chunk_at_index(2).unwrap().bytes(), b"i");
        assert!(buf.chunk_at_index(3).is_none());
    }

    // ==================== Split Tests ====================

    #[test]
    fn test_split_at_offset() {
        let mut buf = buffer(4);
        buf.append(b"abcd");
        buf.split_at_offset(3).unwrap();
        assert_eq!(sizes(&buf), vec![3, 1]);
        assert_eq!(spans(&buf), vec![0..3, 3..4]);
        assert_eq!(content(&buf), b"abcd");
    }

    #[test]
    fn test_split_at_boundary_is_noop() {
        let mut buf = buffer(4);
        buf.append(b"abcdefgh");
        buf.split_at_offset(4).unwrap();
        buf.split_at_offset(0).unwrap();
        assert_eq!(sizes(&buf), vec![4, 4]);
    }

    #[test]
    fn test_split_uncovered_offset_fails() {
        let mut buf = buffer(4);
        buf.append(b"ab");
        assert!(buf.split_at_offset(2).is_err());
    }

    // ==================== Delete Tests ====================

    #[test]
    fn test_delete_within_chunk() {
        let mut buf = buffer(4);
        buf.append(b"abcdefgh");
        buf.delete_range(1, 2).unwrap();
        assert_eq!(content(&buf), b"adefgh");
        assert_eq!(sizes(&buf), vec![2, 4]);
        assert_eq!(spans(&buf), vec![0..2, 2..6]);
    }

    #[test]
    fn test_delete_spanning_chunks() {
        let mut buf = buffer(4);
        buf.append(b"abcdefghij");
        buf.delete_range(2, 5).unwrap();
        assert_eq!(content(&buf), b"abhij");
        assert_eq!(sizes(&buf), vec![2, 1, 2]);
    }

    #[test]
    fn test_delete_whole_chunk_prunes_it() {
        let mut buf = buffer(4);
        buf.append(b"abcdefghij");
        buf.delete_range(4, 4).unwrap();
        assert_eq!(content(&buf), b"abcdij");
        assert_eq!(sizes(&buf), vec![4, 2]);
        assert_eq!(buf.chunk_count(), 2);
    }

    #[test]
    fn test_delete_everything() {
        let mut buf = buffer(4);
        buf.append(b"abcdefghij");
        buf.delete_range(0, 10).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.chunk_count(), 0);
        assert!(buf.chunks().next().is_none());

        buf.append_byte(b'z');
        assert_eq!(content(&buf), b"z");
    }

    #[test]
    fn test_delete_out_of_bounds_leaves_buffer_untouched() {
        let mut buf = buffer(4);
        buf.append(b"abcdef");
        let err = buf.delete_range(4, 3).unwrap_err();
        assert!(matches!(err, BufferError::OutOfBounds { .. }));
        assert_eq!(content(&buf), b"abcdef");
        assert_eq!(sizes(&buf), vec![4, 2]);
    }

    #[test]
    fn test_delete_overflowing_range() {
        let mut buf = buffer(4);
        buf.append(b"abc");
        assert!(buf.delete_range(1, usize::MAX).is_err());
    }

    #[test]
    fn test_delete_zero_length() {
        let mut buf = buffer(4);
        buf.append(b"abc");
        buf.delete_range(3, 0).unwrap();
        assert_eq!(content(&buf), b"abc");
        assert!(buf.delete_range(4, 0).is_err());
    }

    // ==================== Replace Tests ====================

    #[test]
    fn test_replace_spanning_chunks_keeps_layout() {
        let mut buf = buffer(4);
        buf.append(b"abcdefghij");
        let before = buf.chunk_infos();

        buf.replace_range(2, b"XXXXX").unwrap();
        assert_eq!(content(&buf), b"abXXXXXhij");
        assert_eq!(buf.chunk_infos(), before);
    }

    #[test]
    fn test_replace_cannot_grow() {
        let mut buf = buffer(4);
        buf.append(b"abc");
        let err = buf.replace_range(1, b"XYZ").unwrap_err();
        assert!(matches!(err, BufferError::OutOfBounds { .. }));
        assert_eq!(content(&buf), b"abc");
    }

    // ==================== Read Tests ====================

    #[test]
    fn test_read_range_spanning_chunks() {
        let mut buf = buffer(4);
        buf.append(b"abcdefghij");
        let mut out = [0u8; 6];
        buf.read_range(3, &mut out).unwrap();
        assert_eq!(&out, b"defghi");
    }

    #[test]
    fn test_read_to_vec_out_of_bounds() {
        let mut buf = buffer(4);
        buf.append(b"abc");
        assert!(buf.read_to_vec(2, 2).is_err());
        assert_eq!(buf.read_to_vec(2, 1).unwrap(), b"c");
        assert_eq!(buf.read_to_vec(3, 0).unwrap(), b"");
    }

    // ==================== Recalculation Tests ====================

    #[test]
    fn test_recalculate_idempotent() {
        let mut buf = buffer(3);
        buf.append(b"abcdefgh");
        buf.delete_range(3, 2).unwrap();
        let once = buf.chunk_infos();
        buf.recalculate();
        assert_eq!(buf.chunk_infos(), once);
        buf.recalculate();
        assert_eq!(buf.chunk_infos(), once);
    }

    #[test]
    fn test_recalculate_prunes_and_reuses_slots() {
        let mut buf = buffer(2);
        buf.append(b"aabbcc");
        buf.delete_range(2, 2).unwrap();
        assert_eq!(buf.chunks.len(), 2);

        buf.append(b"dd");
        assert_eq!(buf.chunks.len(), 3);
        assert_eq!(content(&buf), b"aaccdd");
    }

    // ==================== Observer Tests ====================

    #[test]
    fn test_observer_sees_pruned_chunks() {
        let recorder = Recorder::default();
        let mut buf = buffer(2);
        buf.set_observer(Box::new(recorder.clone()));
        buf.append(b"aabbcc");
        buf.delete_range(1, 4).unwrap();

        // "bb" is pruned; "aa" and "cc" only shrink.
        assert_eq!(*recorder.released.borrow(), vec![0]);
        assert_eq!(content(&buf), b"ac");
    }

    #[test]
    fn test_observer_sees_clear_and_drop() {
        let recorder = Recorder::default();
        {
            let mut buf = buffer(2);
            buf.set_observer(Box::new(recorder.clone()));
            buf.append(b"aabbc");
            buf.clear();
            assert!(buf.is_empty());
            assert_eq!(buf.chunk_capacity(), 2);

            buf.append(b"xyz");
        }
        assert_eq!(*recorder.released.borrow(), vec![2, 2, 1, 2, 1]);
        assert_eq!(*recorder.buffers.borrow(), vec![(5, 3), (3, 2)]);
    }

    #[test]
    fn test_take_observer() {
        let recorder = Recorder::default();
        let mut buf = buffer(2);
        buf.set_observer(Box::new(recorder.clone()));
        assert!(buf.take_observer().is_some());
        buf.append(b"ab");
        buf.clear();
        assert!(recorder.buffers.borrow().is_empty());
    }

    #[test]
    fn test_debug_lists_chunks() {
        let mut buf = buffer(4);
        buf.append(b"abcde");
        let debug = format!("{:?}", buf);
        assert!(debug.contains("chunk_count: 2"));
        assert!(debug.contains("total_size: 5"));
    }
}
