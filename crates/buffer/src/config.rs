// Chunk: docs/chunks/buffer_config - Runtime chunk capacity configuration
//!
//! Construction-time configuration for a [`ChunkBuffer`](crate::ChunkBuffer).
//!
//! The configuration is plain serde data so an embedding editor can keep it in
//! its own settings file:
//!
//! ```json
//! { "chunk_capacity": 4096 }
//! ```
//!
//! Missing fields fall back to their defaults; a capacity of zero is rejected.

use std::fs;
use std::num::NonZeroUsize;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BufferError, Result};

/// Chunk capacity used when none is configured.
pub const DEFAULT_CHUNK_CAPACITY: usize = 4096;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(DEFAULT_CHUNK_CAPACITY) {
    Some(capacity) => capacity,
    None => panic!("DEFAULT_CHUNK_CAPACITY must be non-zero"),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// Maximum number of bytes held by a single chunk.
    pub chunk_capacity: NonZeroUsize,
}

impl BufferConfig {
    /// Configuration with the given chunk capacity.
    ///
    /// Returns `BufferError::InvalidCapacity` for a capacity of zero.
    pub fn with_chunk_capacity(capacity: usize) -> Result<Self> {
        let chunk_capacity = NonZeroUsize::new(capacity).ok_or(BufferError::InvalidCapacity)?;
        Ok(Self { chunk_capacity })
    }

    /// Parses a configuration from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a JSON configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).map_err(|e| BufferError::io(path.display().to_string(), e))?;
        Self::from_json(&text)
    }

    /// Serializes this configuration as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn chunk_capacity(&self) -> usize {
        self.chunk_capacity.get()
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            chunk_capacity: DEFAULT_CAPACITY,
        }
    }
}
