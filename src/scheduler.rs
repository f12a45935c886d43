//! Scheduling of per-chunk hashing

use std::collections::VecDeque;
use std::panic;
use std::sync::mpsc::{self, Receiver, RecvError};
use std::thread;

use crate::finalize::md4_digest;
use crate::Ed2kOutput;

/// Function computing the hash of one full chunk.
pub type ChunkHashFn = fn(&[u8]) -> Ed2kOutput;

/// Turns full chunks into an ordered list of chunk hashes.
///
/// Implementations may hash chunks in the background, but
/// [`collect_all`](ChunkScheduler::collect_all) must always return the
/// hashes in the order the chunks were submitted.
pub trait ChunkScheduler {
    /// Take ownership of a full chunk and start hashing it.
    ///
    /// May block until earlier chunks are done to keep memory use bounded.
    fn submit(&mut self, chunk: Vec<u8>);

    /// Wait for all submitted chunks and return their hashes in order.
    fn collect_all(&mut self) -> &[Ed2kOutput];

    /// Forget all chunks and hashes. Hashing already in progress is
    /// allowed to finish, but its result is dropped.
    fn reset(&mut self);

    /// Stop all background work and release memory.
    fn close(&mut self) {
        self.reset();
    }
}

/// Hashes every chunk right away on the calling thread.
#[derive(Debug, Clone)]
pub struct InlineScheduler {
    hash_fn: ChunkHashFn,
    hashes: Vec<Ed2kOutput>,
}

impl InlineScheduler {
    /// Scheduler hashing chunks with MD4.
    pub fn new() -> Self {
        Self::with_chunk_hasher(md4_digest)
    }

    /// Scheduler hashing chunks with `hash_fn` instead of MD4.
    pub fn with_chunk_hasher(hash_fn: ChunkHashFn) -> Self {
        Self {
            hash_fn,
            hashes: Vec::new(),
        }
    }
}

impl Default for InlineScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkScheduler for InlineScheduler {
    fn submit(&mut self, chunk: Vec<u8>) {
        self.hashes.push((self.hash_fn)(&chunk));
    }

    fn collect_all(&mut self) -> &[Ed2kOutput] {
        &self.hashes
    }

    fn reset(&mut self) {
        self.hashes.clear();
    }

    fn close(&mut self) {
        self.hashes = Vec::new();
    }
}

/// A chunk hash still being computed on the rayon pool.
#[derive(Debug)]
struct PendingHash {
    index: usize,
    result: Receiver<thread::Result<Ed2kOutput>>,
}

impl PendingHash {
    fn wait(self) -> Ed2kOutput {
        match self.result.recv() {
            Ok(Ok(hash)) => hash,
            Ok(Err(payload)) => panic::resume_unwind(payload),
            Err(RecvError) => panic!("hashing task for chunk {} went away", self.index),
        }
    }
}

/// Hashes each chunk as its own task on the rayon thread pool.
///
/// At most `max_in_flight` chunks are hashed at the same time. Once that
/// many are pending, [`submit`](ChunkScheduler::submit) waits for the
/// oldest one, so a fast writer is throttled to hashing speed and no more
/// than `max_in_flight` chunk buffers are alive. Hashes are retired
/// strictly from the oldest chunk on, which keeps the list in stream order
/// even when a later chunk finishes first.
#[derive(Debug)]
pub struct ThreadedScheduler {
    hash_fn: ChunkHashFn,
    max_in_flight: usize,
    in_flight: VecDeque<PendingHash>,
    hashes: Vec<Ed2kOutput>,
}

impl ThreadedScheduler {
    /// Scheduler allowing twice the rayon pool size in flight.
    pub fn new() -> Self {
        Self::with_max_in_flight(2 * rayon::current_num_threads())
    }

    /// Scheduler hashing with MD4 and allowing `max_in_flight` pending
    /// chunks, at least one.
    pub fn with_max_in_flight(max_in_flight: usize) -> Self {
        Self::with_chunk_hasher(max_in_flight, md4_digest)
    }

    /// Scheduler hashing chunks with `hash_fn` instead of MD4.
    pub fn with_chunk_hasher(max_in_flight: usize, hash_fn: ChunkHashFn) -> Self {
        let max_in_flight = max_in_flight.max(1);
        log::debug!("chunk scheduler allows {max_in_flight} chunks in flight");
        Self {
            hash_fn,
            max_in_flight,
            in_flight: VecDeque::with_capacity(max_in_flight),
            hashes: Vec::new(),
        }
    }

    /// Maximum number of chunks pending at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight
    }

    /// Number of chunks submitted but not retired yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn retire_oldest(&mut self) -> bool {
        match self.in_flight.pop_front() {
            Some(pending) => {
                self.hashes.push(pending.wait());
                log::trace!("retired chunk {}", self.hashes.len() - 1);
                true
            }
            None => false,
        }
    }

    fn spawn(&self, chunk: Vec<u8>) -> PendingHash {
        let hash_fn = self.hash_fn;
        let index = self.hashes.len() + self.in_flight.len();
        let (tx, rx) = mpsc::sync_channel(1);
        rayon::spawn(move || {
            // a panic must not take down the pool, the owner re-raises it
            let result = panic::catch_unwind(move || hash_fn(&chunk));
            // the receiver is gone after a reset
            let _ = tx.send(result);
        });
        PendingHash { index, result: rx }
    }

    /// Drop interest in all pending chunks. Their tasks finish on the
    /// pool and the results are thrown away.
    fn abandon(&mut self) {
        if !self.in_flight.is_empty() {
            log::debug!("abandoning {} chunks in flight", self.in_flight.len());
        }
        self.in_flight.clear();
    }
}

impl Default for ThreadedScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkScheduler for ThreadedScheduler {
    fn submit(&mut self, chunk: Vec<u8>) {
        if self.in_flight.len() >= self.max_in_flight {
            log::debug!(
                "{} chunks in flight, waiting for chunk {}",
                self.in_flight.len(),
                self.hashes.len()
            );
            self.retire_oldest();
        }
        let pending = self.spawn(chunk);
        log::trace!(
            "submitted chunk {}",
            self.hashes.len() + self.in_flight.len()
        );
        self.in_flight.push_back(pending);
    }

    fn collect_all(&mut self) -> &[Ed2kOutput] {
        while self.retire_oldest() {}
        &self.hashes
    }

    fn reset(&mut self) {
        self.abandon();
        self.hashes.clear();
    }

    fn close(&mut self) {
        self.abandon();
        self.in_flight = VecDeque::new();
        self.hashes = Vec::new();
    }
}
