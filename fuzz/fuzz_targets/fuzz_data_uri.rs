//! Fuzz target for data URI decoding.
//!
//! Decoding arbitrary input must never panic, and decoding what the codec
//! produced must give the original text back.

#![no_main]

use libfuzzer_sys::fuzz_target;
use tr_report::codec::{decode_data_uri, text_data_uri};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let _ = decode_data_uri(text);

    let encoded = text_data_uri("text/plain", text);
    let decoded = decode_data_uri(&encoded).expect("codec output decodes");
    assert_eq!(decoded.text(), Some(text));
});
