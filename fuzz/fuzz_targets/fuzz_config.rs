//! Fuzz target for recurrence.json parsing and validation.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rc_config::{validate_config, RecurrenceConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(config) = RecurrenceConfig::from_json_str(text) {
            let _ = validate_config(&config);
        }
    }
});
