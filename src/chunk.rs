//! Accumulation of input bytes into fixed-size chunks

use crate::BLOCK_SIZE;

/// Buffer for the chunk currently being filled.
///
/// A full buffer is only handed off once more input shows up, because a
/// stream ending exactly on a chunk boundary is finalized differently
/// depending on the boundary mode.
#[derive(Debug, Default, Clone)]
pub(crate) struct ChunkBuffer {
    buf: Vec<u8>,
}

impl ChunkBuffer {
    /// Copy as much of `data` as still fits into the chunk.
    ///
    /// Returns the number of bytes consumed.
    pub(crate) fn fill(&mut self, data: &[u8]) -> usize {
        if self.buf.capacity() < BLOCK_SIZE {
            self.buf.reserve_exact(BLOCK_SIZE - self.buf.len());
        }
        let count = data.len().min(self.free());
        self.buf.extend_from_slice(&data[..count]);
        count
    }

    pub(crate) fn free(&self) -> usize {
        BLOCK_SIZE - self.buf.len()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.buf.len() == BLOCK_SIZE
    }

    pub(crate) fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Move the filled chunk out, leaving a fresh buffer behind.
    pub(crate) fn take(&mut self) -> Vec<u8> {
        std::mem::replace(&mut self.buf, Vec::with_capacity(BLOCK_SIZE))
    }

    /// Forget the buffered bytes but keep the allocation.
    pub(crate) fn clear(&mut self) {
        self.buf.clear();
    }

    /// Forget the buffered bytes and release the allocation.
    pub(crate) fn release(&mut self) {
        self.buf = Vec::new();
    }
}
