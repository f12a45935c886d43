//! Folding of the chunk hash list into the final hash

use digest::Digest;
use md4::Md4;

use crate::{BoundaryMode, Ed2kOutput, BLOCK_SIZE};

/// MD4 of a single byte slice.
pub fn md4_digest(data: &[u8]) -> Ed2kOutput {
    Md4::digest(data)
}

/// Compute the final hash from a snapshot of the engine state.
///
/// `chunks` are the hashes of all handed off chunks in stream order, `tail`
/// is the chunk still being filled (possibly exactly full) and `suffix` is
/// fed to the final MD4 after everything else. Nothing is modified, so the
/// result can be recomputed for the same snapshot at will.
pub(crate) fn finalize(
    mode: BoundaryMode,
    chunks: &[Ed2kOutput],
    tail: &[u8],
    suffix: &[u8],
) -> Ed2kOutput {
    let mut list = Md4::new();
    for hash in chunks {
        list.update(hash);
    }
    let mut tail = tail;
    let mut listed = chunks.len();

    // red: a full pending chunk always ends up in the list, and the
    // (now empty) tail gets appended below as well.
    // state: |####|..|####>|
    if mode == BoundaryMode::Legacy && tail.len() == BLOCK_SIZE {
        list.update(md4_digest(tail));
        listed += 1;
        tail = &[];
    }

    // simple case: input data fits into a single chunk.
    // state: |##> |
    if listed == 0 {
        let mut single = Md4::new();
        single.update(tail);
        single.update(suffix);
        return single.finalize();
    }

    // state: |####|..|##> |
    // blue skips an empty tail, red always hashes it.
    if mode == BoundaryMode::Legacy || !tail.is_empty() {
        list.update(md4_digest(tail));
    }

    list.update(suffix);
    list.finalize()
}
