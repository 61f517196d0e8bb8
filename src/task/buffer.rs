// src/task/buffer.rs

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Ordered, append-only sequence of byte chunks read from one stream.
///
/// Cloning shares the underlying buffer. Only the drainer for the stream
/// appends; everyone else reads.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    chunks: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<Vec<u8>>> {
        self.chunks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, chunk: Vec<u8>) {
        self.guard().push(chunk);
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// Most recently appended chunk.
    pub fn last(&self) -> Option<Vec<u8>> {
        self.guard().last().cloned()
    }

    /// Copy of all chunks in append order.
    pub fn snapshot(&self) -> Vec<Vec<u8>> {
        self.guard().clone()
    }

    /// Total number of bytes across all chunks.
    pub fn byte_len(&self) -> usize {
        self.guard().iter().map(Vec::len).sum()
    }

    /// All chunks concatenated in order and decoded as UTF-8 (lossy).
    ///
    /// Bytes are joined before decoding so a multi-byte character split
    /// across a chunk boundary survives.
    pub fn decoded_concat(&self) -> String {
        let bytes: Vec<u8> = self.guard().concat();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}
