//! Fuzz target for community mapping parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rc_core::ingest::parse_communities;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_communities(text);
    }
});
