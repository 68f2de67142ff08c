//! Fuzz target for event table parsing.
//!
//! Event files come from arbitrary exports; parsing must only ever return
//! an error, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rc_config::ColumnMap;
use rc_core::ingest::parse_events;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parse_events(text, &ColumnMap::default());
    }
});
