// Chunk: docs/chunks/chunk_observer - Diagnostics facade for prune/teardown events
//!
//! Hooks for watching chunk lifetimes.
//!
//! The buffer never prints. Callers that want to see chunks being pruned or torn
//! down install a [`ChainObserver`]; [`LogObserver`] forwards the events to the
//! `log` facade at debug level.

use crate::types::ChunkInfo;

/// Receives chunk lifetime events from a [`ChunkBuffer`](crate::ChunkBuffer).
///
/// Both methods default to doing nothing.
pub trait ChainObserver {
    /// A chunk left the chain, either pruned after shrinking to zero bytes or
    /// released during `clear`/drop. `info` is the chunk's last known position.
    fn chunk_released(&mut self, info: ChunkInfo) {
        let _ = info;
    }

    /// The whole chain was released by `clear` or by dropping the buffer.
    fn buffer_released(&mut self, total_size: usize, chunk_count: usize) {
        let _ = (total_size, chunk_count);
    }
}

/// Observer that reports chunk lifetime events through `log`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl ChainObserver for LogObserver {
    fn chunk_released(&mut self, info: ChunkInfo) {
        log::debug!("chunk #{} freed ({} bytes)", info.index, info.size);
    }

    fn buffer_released(&mut self, total_size: usize, chunk_count: usize) {
        log::debug!(
            "freed {} byte buffer ({} chunks)",
            total_size,
            chunk_count
        );
    }
}
