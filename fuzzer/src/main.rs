#[macro_use]
extern crate afl;
extern crate ed2k_stream;

use ed2k_stream::digest::Digest;
use ed2k_stream::{BoundaryMode, Ed2kBlue, Ed2kImpl, Ed2kRed, InlineScheduler, ThreadedScheduler};

fn main() {
    fuzz!(|data: &[u8]| {
        let blue = Ed2kBlue::digest(data);
        let red = Ed2kRed::digest(data);

        // first byte picks how the rest is split into writes
        let Some((&split, rest)) = data.split_first() else {
            return;
        };
        let step = usize::from(split).max(1);
        for (mode, expected) in [(BoundaryMode::Current, blue), (BoundaryMode::Legacy, red)] {
            let mut inline = Ed2kImpl::with_scheduler(mode, InlineScheduler::new());
            let mut threaded = Ed2kImpl::with_scheduler(mode, ThreadedScheduler::with_max_in_flight(2));
            for piece in data.chunks(step) {
                inline.write(piece);
                threaded.write(piece);
            }
            assert_eq!(inline.sum(&[]), expected);
            assert_eq!(threaded.sum(&[]), expected);
            assert_eq!(inline.sum(rest), threaded.sum(rest));
        }
    });
}
