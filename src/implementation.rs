//! Implementation details

use std::io;

use digest::{
    typenum::U16, FixedOutput, FixedOutputReset, HashMarker, OutputSizeUser, Reset, Update,
};

use crate::chunk::ChunkBuffer;
use crate::finalize::finalize;
use crate::scheduler::{ChunkScheduler, ThreadedScheduler};
use crate::{Ed2kOutput, BLOCK_SIZE, SIZE};

/// How inputs ending exactly on a chunk boundary are finalized.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryMode {
    /// The old, "buggy" ED2K hashing algorithm. Appends the hash of an
    /// empty chunk to the chunk list.
    Legacy,
    /// The new, "fixed" ED2K hashing algorithm.
    #[default]
    Current,
}

impl BoundaryMode {
    /// `true` picks the red method that ends the chunk list with an empty
    /// chunk, `false` the blue one.
    pub fn from_null_chunk(end_with_null_chunk: bool) -> Self {
        if end_with_null_chunk {
            BoundaryMode::Legacy
        } else {
            BoundaryMode::Current
        }
    }

    /// Whether this is the red method.
    pub fn ends_with_null_chunk(self) -> bool {
        self == BoundaryMode::Legacy
    }
}

/// Abstraction over the ED2K hash flavor
pub trait Ed2kColor: Default {
    /// Boundary mode the hash is finalized with
    fn mode(&self) -> BoundaryMode;
}

/// The old, "buggy" ED2K hashing algorithm. See crate docs for more details.
#[derive(Default, Debug, Clone, Copy)]
pub struct Red;

/// The new, "fixed" ED2K hashing algorithm. See crate docs for more details.
#[derive(Default, Debug, Clone, Copy)]
pub struct Blue;

impl Ed2kColor for Red {
    fn mode(&self) -> BoundaryMode {
        BoundaryMode::Legacy
    }
}

impl Ed2kColor for Blue {
    fn mode(&self) -> BoundaryMode {
        BoundaryMode::Current
    }
}

/// Flavor picked at runtime.
impl Ed2kColor for BoundaryMode {
    fn mode(&self) -> BoundaryMode {
        *self
    }
}

/// ED2K hash algorithm implementation. This implements all the relevant
/// traits from the `digest` crate to be usable as a hasher.
///
/// The concrete ED2K hash this produces depends on the type parameter `C`,
/// and the way full chunks get hashed on the scheduler `S`. It can be
/// cloned partway through a stream when the scheduler can, as
/// [`InlineScheduler`](crate::InlineScheduler) does.
#[derive(Debug, Clone)]
pub struct Ed2kImpl<C, S = ThreadedScheduler> {
    color: C,
    chunk: ChunkBuffer,
    scheduler: S,
    closed: bool,
}

impl Ed2kImpl<BoundaryMode, ThreadedScheduler> {
    /// Create a hasher hashing full chunks in the background.
    ///
    /// `end_with_null_chunk` chooses the old (`true`, red) or new
    /// (`false`, blue) chunk list finishing algorithm.
    pub fn new(end_with_null_chunk: bool) -> Self {
        Self::with_scheduler(
            BoundaryMode::from_null_chunk(end_with_null_chunk),
            ThreadedScheduler::new(),
        )
    }
}

impl<C, S> Ed2kImpl<C, S>
where
    C: Ed2kColor,
    S: ChunkScheduler,
{
    /// Create a hasher of flavor `color` handing full chunks to `scheduler`.
    pub fn with_scheduler(color: C, scheduler: S) -> Self {
        Self {
            color,
            chunk: ChunkBuffer::default(),
            scheduler,
            closed: false,
        }
    }

    /// Boundary mode the hash is finalized with.
    pub fn mode(&self) -> BoundaryMode {
        self.color.mode()
    }

    /// The size of the hash in bytes.
    pub fn size(&self) -> usize {
        SIZE
    }

    /// The size of each chunk in bytes.
    pub fn block_size(&self) -> usize {
        BLOCK_SIZE
    }

    /// Feed `data` into the hash. Always consumes all of it.
    ///
    /// Blocks while too many chunks are being hashed.
    pub fn write(&mut self, mut data: &[u8]) -> usize {
        self.assert_open();
        let written = data.len();
        while !data.is_empty() {
            // only hand the chunk off once there is data for the next one
            if self.chunk.is_full() {
                self.scheduler.submit(self.chunk.take());
            }
            let count = self.chunk.fill(data);
            data = &data[count..];
        }
        written
    }

    /// Compute the hash of everything written so far, with `suffix`
    /// hashed last.
    ///
    /// Waits for all chunks still being hashed. The state is left as is,
    /// so writing can continue afterwards.
    pub fn sum(&mut self, suffix: &[u8]) -> Ed2kOutput {
        self.assert_open();
        let mode = self.color.mode();
        let hashes = self.scheduler.collect_all();
        finalize(mode, hashes, self.chunk.as_slice(), suffix)
    }

    /// Lowercase hex of [`sum`](Self::sum) without suffix.
    pub fn hex_digest(&mut self) -> String {
        format!("{:x}", self.sum(&[]))
    }

    /// Start over with an empty input. Chunks still being hashed are
    /// abandoned.
    pub fn reset(&mut self) {
        self.scheduler.reset();
        self.chunk.clear();
        self.closed = false;
    }

    /// Stop background hashing and release all chunk memory.
    ///
    /// The hasher can be used again after [`reset`](Self::reset).
    pub fn close(&mut self) {
        if !self.closed {
            log::debug!("closing ed2k hasher");
            self.scheduler.close();
            self.chunk.release();
            self.closed = true;
        }
    }

    fn assert_open(&self) {
        assert!(!self.closed, "ed2k hasher used after close() without reset()");
    }
}

impl<C, S> Default for Ed2kImpl<C, S>
where
    C: Ed2kColor,
    S: ChunkScheduler + Default,
{
    fn default() -> Self {
        Self::with_scheduler(C::default(), S::default())
    }
}

impl<C, S> io::Write for Ed2kImpl<C, S>
where
    C: Ed2kColor,
    S: ChunkScheduler,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(Ed2kImpl::write(self, buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<C, S> Update for Ed2kImpl<C, S>
where
    C: Ed2kColor,
    S: ChunkScheduler,
{
    fn update(&mut self, data: &[u8]) {
        Ed2kImpl::write(self, data);
    }
}

impl<C, S> FixedOutput for Ed2kImpl<C, S>
where
    C: Ed2kColor,
    S: ChunkScheduler,
{
    fn finalize_into(mut self, out: &mut Ed2kOutput) {
        *out = self.sum(&[]);
    }
}

impl<C, S> OutputSizeUser for Ed2kImpl<C, S>
where
    C: Ed2kColor,
    S: ChunkScheduler,
{
    type OutputSize = U16;
}

impl<C, S> HashMarker for Ed2kImpl<C, S>
where
    C: Ed2kColor,
    S: ChunkScheduler,
{
}

impl<C, S> Reset for Ed2kImpl<C, S>
where
    C: Ed2kColor,
    S: ChunkScheduler,
{
    fn reset(&mut self) {
        Ed2kImpl::reset(self);
    }
}

impl<C, S> FixedOutputReset for Ed2kImpl<C, S>
where
    C: Ed2kColor,
    S: ChunkScheduler,
{
    fn finalize_into_reset(&mut self, out: &mut Ed2kOutput) {
        *out = self.sum(&[]);
        Ed2kImpl::reset(self);
    }
}
