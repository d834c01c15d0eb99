//! Fuzz target for linked-mode asset file names.
//!
//! Names must respect the length limit and contain no path separators.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tr_report::codec::asset_filename;

#[derive(Debug, Arbitrary)]
struct Input {
    test_id: String,
    extra_index: u16,
    attempt: u32,
    extension: String,
    max_len: u16,
}

fuzz_target!(|input: Input| {
    if input.max_len == 0 || input.extension.contains(['/', '\\']) {
        return;
    }
    let name = asset_filename(
        &input.test_id,
        usize::from(input.extra_index),
        input.attempt,
        &input.extension,
        usize::from(input.max_len),
    );
    assert!(name.chars().count() <= usize::from(input.max_len));
    assert!(!name.contains('/'));
});
