// Chunk: docs/chunks/chunk_errors - Typed errors for editing and bulk I/O

use std::io;

use thiserror::Error;

pub type Result<T, E = BufferError> = std::result::Result<T, E>;

/// Failures surfaced by buffer operations.
///
/// Every editing operation validates its range up front, so receiving one of
/// these means the chain was not touched.
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("range at offset {offset} with length {len} is outside the buffer ({total_size} bytes)")]
    OutOfBounds {
        offset: usize,
        len: usize,
        total_size: usize,
    },

    #[error("chunk index {index} is out of range ({chunk_count} chunks)")]
    IndexOutOfRange { index: usize, chunk_count: usize },

    #[error("IO error for '{context}': {source}")]
    Io { context: String, source: io::Error },

    #[error("short read from '{context}': expected {expected} bytes, got {actual}")]
    ShortRead {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("chunk capacity must be at least one byte")]
    InvalidCapacity,

    #[error("invalid buffer configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl BufferError {
    pub(crate) fn out_of_bounds(offset: usize, len: usize, total_size: usize) -> Self {
        BufferError::OutOfBounds {
            offset,
            len,
            total_size,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        BufferError::Io {
            context: context.into(),
            source,
        }
    }

    /// True for open, read and write failures, including short reads.
    pub fn is_io(&self) -> bool {
        matches!(self, BufferError::Io { .. } | BufferError::ShortRead { .. })
    }
}
