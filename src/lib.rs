#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

use crate::implementation::{Blue, Red};

/// The "official" ED2K hashing algorithm. Identical to Ed2kBlue.
pub type Ed2k = Ed2kBlue;
/// The old, "buggy" ED2K hashing algorithm. See crate docs for more details.
pub type Ed2kRed = Ed2kImpl<Red>;
/// The new, "fixed" ED2K hashing algorithm. See crate docs for more details.
pub type Ed2kBlue = Ed2kImpl<Blue>;
/// ED2K hasher with the flavor chosen at runtime.
pub type Ed2kHasher = Ed2kImpl<BoundaryMode>;

/// Raw ED2K hash.
pub type Ed2kOutput = digest::Output<md4::Md4>;

/// The size of the ed2k checksum in bytes.
pub const SIZE: usize = 16;

/// The size of each chunk in bytes.
pub const BLOCK_SIZE: usize = 9_728_000;

pub use digest;
pub use finalize::md4_digest;
pub use implementation::{BoundaryMode, Ed2kColor, Ed2kImpl};
pub use scheduler::{ChunkHashFn, ChunkScheduler, InlineScheduler, ThreadedScheduler};

mod chunk;
mod finalize;
pub mod implementation;
pub mod scheduler;

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! define_cases {
        ($($name:ident { $value:expr, $blue:expr, $red:expr })*) => {
            $(
                mod $name {
                    use super::*;
                    use digest::Digest;

                    mod blue {
                        use super::*;

                        #[test]
                        fn test() {
                            let hash = Ed2kBlue::digest(&$value);
                            assert_eq!(format!("{hash:x}"), $blue);
                        }

                        #[test]
                        fn inline() {
                            let mut hasher = Ed2kImpl::with_scheduler(
                                BoundaryMode::Current,
                                InlineScheduler::new(),
                            );
                            hasher.write(&$value);
                            assert_eq!(hasher.hex_digest(), $blue);
                        }
                    }
                    mod red {
                        use super::*;

                        #[test]
                        fn test() {
                            let hash = Ed2kRed::digest(&$value);
                            assert_eq!(format!("{hash:x}"), $red);
                        }

                        #[test]
                        fn inline() {
                            let mut hasher = Ed2kImpl::with_scheduler(
                                BoundaryMode::Legacy,
                                InlineScheduler::new(),
                            );
                            hasher.write(&$value);
                            assert_eq!(hasher.hex_digest(), $red);
                        }
                    }
                }
            )*
            mod all_reset {
                use super::{Ed2kBlue, Ed2kHasher, Ed2kRed};
                use digest::Digest;

                #[test]
                fn blue() {
                    let mut hasher = Ed2kBlue::default();
                    $(
                        hasher.update(&$value);
                        let $name = hasher.finalize_reset();
                        assert_eq!(format!("{:x}", $name), $blue);
                    )*
                }

                #[test]
                fn red() {
                    let mut hasher = Ed2kRed::default();
                    $(
                        hasher.update(&$value);
                        let $name = hasher.finalize_reset();
                        assert_eq!(format!("{:x}", $name), $red);
                    )*
                }

                #[test]
                fn runtime_mode() {
                    let mut blue = Ed2kHasher::new(false);
                    let mut red = Ed2kHasher::new(true);
                    $(
                        blue.write(&$value);
                        red.write(&$value);
                        assert_eq!(blue.hex_digest(), $blue);
                        assert_eq!(red.hex_digest(), $red);
                        blue.reset();
                        red.reset();
                    )*
                }
            }
        }
    }

    define_cases! {
        empty {
            vec![0; 0],
            "31d6cfe0d16ae931b73c59d7e0c089c0",
            "31d6cfe0d16ae931b73c59d7e0c089c0"
        }
        small_example {
            b"small example".to_vec(),
            "3e01197bc54364cb86a41738b06ae679",
            "3e01197bc54364cb86a41738b06ae679"
        }
        sub_zeroed_chunk {
            vec![0; 412],
            "a89605d61bb80c73ead447285c05f588",
            "a89605d61bb80c73ead447285c05f588"
        }
        sub_pattern_chunk {
            vec![0x55; 412],
            "41dfbddfe5a4b05236a0d932dd445a74",
            "41dfbddfe5a4b05236a0d932dd445a74"
        }
        one_zeroed_chunk {
            vec![0; 9728000],
            "d7def262a127cd79096a108e7a9fc138",
            "fc21d9af828f92a8df64beac3357425d"
        }
        one_pattern_chunk {
            vec![0x55; 9728000],
            "4127a47867b6110f0f86f2d9845fb374",
            "49e80f377b7e4e706dbd3ecc89f39306"
        }
        super_one_zeroed_chunk {
            vec![0; 9728412],
            "9828f449478a35b909e86ba9bdbce24b",
            "9828f449478a35b909e86ba9bdbce24b"
        }
        super_one_pattern_chunk {
            vec![0x55; 9728412],
            "ac4fd3e805f05d29e3e119f0f3e61bf0",
            "ac4fd3e805f05d29e3e119f0f3e61bf0"
        }
        two_zeroed_chunks {
            vec![0; 19456000],
            "194ee9e4fa79b2ee9f8829284c466051",
            "114b21c63a74b6ca922291a11177dd5c"
        }
        two_pattern_chunks {
            vec![0x55; 19456000],
            "322b445351fab0a78970a6a083693b5a",
            "54fc1e8d35b382c0aa7e73e54297c582"
        }
        super_two_zeroed_chunks {
            vec![0; 19456412],
            "38ce731644eed021ba5c14c980fd6a32",
            "38ce731644eed021ba5c14c980fd6a32"
        }
        super_two_pattern_chunks {
            vec![0x55; 19456412],
            "0171e3f247bdd948d299a5178d9295e7",
            "0171e3f247bdd948d299a5178d9295e7"
        }
    }

    mod streaming {
        use super::*;
        use std::io::{self, Read};

        const ONE_ZEROED_BLUE: &str = "d7def262a127cd79096a108e7a9fc138";
        const ONE_ZEROED_RED: &str = "fc21d9af828f92a8df64beac3357425d";
        const TWO_ZEROED_BLUE: &str = "194ee9e4fa79b2ee9f8829284c466051";
        const TWO_ZEROED_RED: &str = "114b21c63a74b6ca922291a11177dd5c";
        const SUPER_TWO_ZEROED: &str = "38ce731644eed021ba5c14c980fd6a32";

        #[test]
        fn constants() {
            let hasher = Ed2kHasher::new(false);
            assert_eq!(hasher.size(), 16);
            assert_eq!(hasher.block_size(), 9728000);
            assert_eq!(hasher.mode(), BoundaryMode::Current);
            assert_eq!(Ed2kHasher::new(true).mode(), BoundaryMode::Legacy);
        }

        #[test]
        fn write_consumes_everything() {
            let mut hasher = Ed2kHasher::new(false);
            assert_eq!(hasher.write(&vec![0; BLOCK_SIZE + 1]), BLOCK_SIZE + 1);
            assert_eq!(hasher.write(&[]), 0);
        }

        #[test]
        fn boundary_across_writes() {
            // the chunk is full after the first write, but only handed
            // off once the next write brings more data
            for (end_with_null_chunk, one, two) in [
                (false, ONE_ZEROED_BLUE, TWO_ZEROED_BLUE),
                (true, ONE_ZEROED_RED, TWO_ZEROED_RED),
            ] {
                let mut hasher = Ed2kHasher::new(end_with_null_chunk);
                hasher.write(&vec![0; BLOCK_SIZE]);
                assert_eq!(hasher.hex_digest(), one);
                hasher.write(&vec![0; BLOCK_SIZE]);
                assert_eq!(hasher.hex_digest(), two);
                hasher.write(&[0; 412]);
                assert_eq!(hasher.hex_digest(), SUPER_TWO_ZEROED);
            }
        }

        #[test]
        fn small_writes() {
            let mut hasher = Ed2kHasher::new(false);
            let piece = vec![0; 1_000_003];
            let mut left = 2 * BLOCK_SIZE + 412;
            while left > 0 {
                let count = left.min(piece.len());
                hasher.write(&piece[..count]);
                left -= count;
            }
            assert_eq!(hasher.hex_digest(), SUPER_TWO_ZEROED);
        }

        #[test]
        fn sum_is_repeatable() {
            for end_with_null_chunk in [false, true] {
                let mut hasher = Ed2kHasher::new(end_with_null_chunk);
                hasher.write(&vec![0x55; BLOCK_SIZE]);
                let first = hasher.sum(&[]);
                assert_eq!(hasher.sum(&[]), first);
            }
        }

        #[test]
        fn sum_with_suffix() {
            let mut hasher = Ed2kHasher::new(false);
            hasher.write(b"small ");
            assert_eq!(hasher.sum(b"example"), md4_digest(b"small example"));

            let mut hasher = Ed2kHasher::new(false);
            hasher.write(&vec![0; BLOCK_SIZE + 412]);
            let chunk = md4_digest(&vec![0; BLOCK_SIZE]);
            let tail = md4_digest(&[0; 412]);
            let expected = md4_digest(&[&chunk[..], &tail[..], &b"xyz"[..]].concat());
            assert_eq!(hasher.sum(b"xyz"), expected);
        }

        #[test]
        fn reset_discards_input() {
            let mut hasher = Ed2kHasher::new(true);
            hasher.write(&vec![0x55; 3 * BLOCK_SIZE + 7]);
            hasher.reset();
            hasher.write(&vec![0; 2 * BLOCK_SIZE]);
            assert_eq!(hasher.hex_digest(), TWO_ZEROED_RED);
            assert_eq!(hasher.mode(), BoundaryMode::Legacy);
        }

        #[test]
        fn close_then_reset() {
            let mut hasher = Ed2kHasher::new(false);
            hasher.write(&vec![0; BLOCK_SIZE + 1]);
            hasher.close();
            hasher.close();
            hasher.reset();
            hasher.write(b"small example");
            assert_eq!(hasher.hex_digest(), "3e01197bc54364cb86a41738b06ae679");
        }

        #[test]
        #[should_panic(expected = "used after close()")]
        fn write_after_close() {
            let mut hasher = Ed2kHasher::new(false);
            hasher.close();
            hasher.write(b"data");
        }

        #[test]
        fn backpressure() {
            let mut hasher = Ed2kImpl::with_scheduler(
                BoundaryMode::Current,
                ThreadedScheduler::with_max_in_flight(1),
            );
            for _ in 0..4 {
                hasher.write(&vec![0x55; BLOCK_SIZE]);
            }
            let mut reference = Ed2kImpl::with_scheduler(
                BoundaryMode::Current,
                InlineScheduler::new(),
            );
            reference.write(&vec![0x55; 4 * BLOCK_SIZE]);
            assert_eq!(hasher.sum(&[]), reference.sum(&[]));
        }

        #[test]
        fn clone_forks_the_stream() {
            let mut hasher = Ed2kImpl::with_scheduler(
                BoundaryMode::Legacy,
                InlineScheduler::new(),
            );
            hasher.write(&vec![0; BLOCK_SIZE]);
            let mut fork = hasher.clone();
            assert_eq!(fork.hex_digest(), ONE_ZEROED_RED);

            hasher.write(&vec![0; BLOCK_SIZE]);
            assert_eq!(hasher.hex_digest(), TWO_ZEROED_RED);
            assert_eq!(fork.hex_digest(), ONE_ZEROED_RED);

            fork.write(&vec![0; BLOCK_SIZE + 412]);
            assert_eq!(fork.hex_digest(), SUPER_TWO_ZEROED);
        }

        #[test]
        fn copy_from_reader() {
            let mut hasher = Ed2kHasher::new(false);
            let mut reader = io::repeat(0).take(2 * BLOCK_SIZE as u64 + 412);
            let copied = io::copy(&mut reader, &mut hasher).unwrap();
            assert_eq!(copied, 2 * BLOCK_SIZE as u64 + 412);
            assert_eq!(hasher.hex_digest(), SUPER_TWO_ZEROED);
        }
    }
}
