//! Fuzz target for granularity strings.
//!
//! Any string that parses must round-trip through its display form.

#![no_main]

use libfuzzer_sys::fuzz_target;
use rc_config::Granularity;

fuzz_target!(|text: &str| {
    if let Ok(g) = text.parse::<Granularity>() {
        let again: Granularity = g.to_string().parse().expect("display form parses");
        assert_eq!(g.seconds(), again.seconds());
        assert!(g.seconds() > 0);
    }
});
