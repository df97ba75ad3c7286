// Chunk: docs/chunks/chunk_chain - Chunk chain byte buffer with offset addressing

//! chunk-buffer: an offset-addressed byte buffer for editor backends.
//!
//! Content is stored as a chain of fixed-capacity chunks, so an edit only moves
//! the bytes of the chunks it touches instead of the whole content.
//!
//! # Overview
//!
//! The main type is [`ChunkBuffer`], which provides:
//! - Insertion, deletion, replacement and reads at absolute byte offsets
//! - O(1) single-byte appends while the last chunk has room
//! - Whole-content load/store against bytes, strings, readers, writers and files
//! - A debug dump with a one-line size summary
//!
//! # Example
//!
//! ```
//! use chunk_buffer::ChunkBuffer;
//!
//! let mut buffer = ChunkBuffer::with_chunk_capacity(4).unwrap();
//!
//! buffer.insert_at_offset(0, b"AAABBBCCC").unwrap();
//! assert_eq!(buffer.chunk_count(), 3);
//! assert_eq!(buffer.len(), 9);
//!
//! buffer.replace_range(3, b"bbb").unwrap();
//! buffer.delete_range(0, 3).unwrap();
//! assert_eq!(buffer.to_bytes(), b"bbbCCC");
//! assert_eq!(buffer.summary(), "Total buffer size: 6 bytes, 3 chunks.");
//! ```
//!
//! # Chain Invariants
//!
//! After every public operation returns:
//!
//! - chunk indices are exactly `0..chunk_count()` in chain order
//! - the first chunk starts at offset 0 and every other chunk starts where its
//!   predecessor ends
//! - no chunk is empty and no chunk exceeds its capacity
//! - `len()` equals the end offset of the last chunk (0 when empty)
//!
//! Operations that fail leave the chain untouched.

mod bulk_io;
mod chunk;
mod chunk_arena;
mod chunk_buffer;
mod config;
mod error;
mod observer;
mod types;

pub use chunk::Chunk;
pub use chunk_buffer::{ChunkBuffer, Chunks};
pub use config::{BufferConfig, DEFAULT_CHUNK_CAPACITY};
pub use error::{BufferError, Result};
pub use observer::{ChainObserver, LogObserver};
pub use types::ChunkInfo;
