//! Fuzz target for the burst state solver.
//!
//! The optimal path must never cost more than staying at baseline.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use rc_config::SolverParams;
use rc_core::BurstStateSolver;

#[derive(Debug, Arbitrary)]
struct Input {
    counts: Vec<u16>,
    s_tenths: u8,
    gamma_hundredths: u8,
}

fuzz_target!(|input: Input| {
    let params = SolverParams {
        s: 1.0 + (input.s_tenths.max(1) as f64) / 10.0,
        gamma: (input.gamma_hundredths.max(1) as f64) / 100.0,
    };
    let Ok(solver) = BurstStateSolver::new(params) else {
        return;
    };
    let counts: Vec<u64> = input.counts.iter().take(2_000).map(|&c| c as u64).collect();
    if let Ok(path) = solver.solve(&counts) {
        let flat = solver.path_cost(&counts, &vec![0; counts.len()]);
        assert!(path.cost <= flat + 1e-9 * flat.abs().max(1.0));
    }
});
