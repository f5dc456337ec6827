//! Fuzz target: `LineDecoder::feed`
//!
//! Drives arbitrary byte sequences into the streaming line decoder, split
//! at a fuzzer-chosen point, and asserts that every yielded line is
//! bounded and terminator-free.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use sericulture::remote::codec::{LineDecoder, MAX_LINE_LEN};

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let cut = usize::from(split).min(rest.len());

    let mut decoder = LineDecoder::new();
    let mut check = |line: &[u8]| {
        assert!(!line.is_empty(), "decoder must not yield empty lines");
        assert!(line.len() <= MAX_LINE_LEN, "line exceeds MAX_LINE_LEN");
        assert!(!line.contains(&b'\n'));
    };
    decoder.feed(&rest[..cut], &mut check);
    decoder.feed(&rest[cut..], &mut check);

    // After a reset the decoder must accept bytes cleanly again.
    decoder.reset();
    decoder.feed(rest, &mut check);
});
