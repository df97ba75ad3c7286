// Chunk: docs/chunks/chunk_bulk_io - Whole-buffer load/store against bytes, strings and files

//! Bulk transfer between a chunk chain and contiguous bytes.
//!
//! Loads replace the whole content: the chain is cleared and the new bytes are
//! inserted at offset 0. Stores concatenate every chunk in chain order. The file
//! variants verify that the number of bytes moved matches the expected size and
//! read the whole source before touching the chain, so a failed load leaves the
//! buffer as it was.

use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use crate::chunk_buffer::ChunkBuffer;
use crate::error::{BufferError, Result};

impl ChunkBuffer {
    // ==================== Store ====================

    /// Concatenates every chunk's bytes into one vector of exactly `len()` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for chunk in self.chunks() {
            out.extend_from_slice(chunk.bytes());
        }
        out
    }

    /// The content as text, with invalid UTF-8 replaced.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.to_bytes()).into_owned()
    }

    /// Writes the content to `writer` chunk by chunk and returns the byte count.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<usize> {
        self.write_chunks(writer, "writer")
    }

    /// Writes the content to `path`, creating or truncating the file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let context = path.display().to_string();

        let file = File::create(path).map_err(|e| BufferError::io(&context, e))?;
        let written = self.write_chunks(BufWriter::new(file), &context)?;
        log::debug!("wrote {} bytes to {}", written, context);
        Ok(())
    }

    fn write_chunks<W: Write>(&self, mut writer: W, context: &str) -> Result<usize> {
        let mut written = 0;
        for chunk in self.chunks() {
            writer
                .write_all(chunk.bytes())
                .map_err(|e| BufferError::io(context, e))?;
            written += chunk.len();
        }
        writer.flush().map_err(|e| BufferError::io(context, e))?;

        debug_assert_eq!(written, self.len(), "chunk sizes disagree with total size");
        Ok(written)
    }

    // ==================== Load ====================

    /// Replaces the whole content with `bytes`.
    pub fn load_from_bytes(&mut self, bytes: &[u8]) {
        self.clear();
        self.append(bytes);
        log::debug!(
            "loaded {} bytes into {} chunks",
            self.len(),
            self.chunk_count()
        );
    }

    /// Replaces the whole content with the UTF-8 bytes of `text`.
    pub fn load_from_str(&mut self, text: &str) {
        self.load_from_bytes(text.as_bytes());
    }

    /// Replaces the whole content with the bytes of a NUL-terminated string.
    ///
    /// Only the bytes before the first NUL are loaded; a slice without a NUL is
    /// loaded whole.
    pub fn load_from_nul_terminated(&mut self, bytes: &[u8]) {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        self.load_from_bytes(&bytes[..end]);
    }

    /// Reads `reader` to the end and replaces the content with what was read.
    ///
    /// Returns the number of bytes loaded. On error the buffer is unchanged.
    pub fn load_from_reader<R: Read>(&mut self, mut reader: R) -> Result<usize> {
        let mut data = Vec::new();
        let read = reader
            .read_to_end(&mut data)
            .map_err(|e| BufferError::io("reader", e))?;
        self.load_from_bytes(&data);
        Ok(read)
    }

    /// Replaces the content with the whole file at `path`.
    ///
    /// Fails with `Io` if the file cannot be opened or read, and with `ShortRead`
    /// if fewer bytes arrive than the file's size. On error the buffer is unchanged.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let context = path.display().to_string();

        let file = File::open(path).map_err(|e| BufferError::io(&context, e))?;
        let file_len = file
            .metadata()
            .map_err(|e| BufferError::io(&context, e))?
            .len();
        let expected = in_memory_len(file_len, &context)?;

        self.load_exact(file, expected, context)?;
        log::debug!("loaded {} bytes from disk", expected);
        Ok(())
    }

    /// Loads exactly `expected` bytes from `reader`, failing with `ShortRead` if
    /// the source runs dry first. Bytes past `expected` are left unread and the
    /// chain is only replaced once the whole content has arrived.
    fn load_exact<R: Read>(&mut self, reader: R, expected: usize, context: String) -> Result<()> {
        let mut data = Vec::with_capacity(expected);
        let actual = reader
            .take(expected as u64)
            .read_to_end(&mut data)
            .map_err(|e| BufferError::io(&context, e))?;
        if actual != expected {
            return Err(BufferError::ShortRead {
                context,
                expected,
                actual,
            });
        }

        self.load_from_bytes(&data);
        Ok(())
    }

    // ==================== Debug Dump ====================

    /// One-line size summary: `Total buffer size: <N> bytes, <M> chunks.`
    pub fn summary(&self) -> String {
        format!(
            "Total buffer size: {} bytes, {} chunks.",
            self.len(),
            self.chunk_count()
        )
    }

    /// The content as text followed by a newline and the [`summary`](Self::summary).
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

/// Converts an on-disk length to an in-memory one, failing with `Io` when the
/// file is larger than the address space.
fn in_memory_len(file_len: u64, context: &str) -> Result<usize> {
    usize::try_from(file_len).map_err(|_| {
        BufferError::io(
            context,
            io::Error::other(format!("{} byte file does not fit in memory", file_len)),
        )
    })
}

impl fmt::Display for ChunkBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.to_string_lossy(), self.summary())
    }
}
