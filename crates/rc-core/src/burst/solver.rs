//! Burst state solver.
//!
//! Assigns every epoch a non-negative burst level by minimizing a total cost
//! over a chain of hidden levels (Kleinberg-style two-term cost).
//!
//! # Model
//!
//! - Epoch `i` has `r[i]` events out of a background total `d = Σr`.
//! - Baseline proportion `p₀ = Σr / (n · d) = 1/n`.
//! - Level `j` expects proportion `pⱼ = min(p₀ · sʲ, 1 − 1e-5)`.
//! - Emission cost: `−ln[C(d, r) · pⱼ^r · (1 − pⱼ)^(d − r)]`.
//! - Transition cost from level `i` to `j`: `|j − i| · γ · ln n`, paid in both
//!   directions. The chain starts at level 0 before the first epoch.
//!
//! # Level bound
//!
//! Levels run over `0..=K` with `K = max(1, ⌈log_s(max r / mean r)⌉)`,
//! the smallest level whose expected count reaches the largest observed
//! count. A level above `K` only costs more for every epoch, so the bound
//! never cuts off the optimum. Since `max r / mean r ≤ n`, `K ≤ ⌈log_s n⌉`.
//!
//! The backpointer table holds `n · (K + 1)` cells. A series whose table
//! would exceed [`MAX_PATH_CELLS`] is rejected with
//! [`SolverError::StateSpaceTooLarge`] rather than solved on a truncated
//! level range.
//!
//! # Determinism
//!
//! Forward DP with backpointers; ties always resolve to the lowest level,
//! both per step and at the final argmin.

use rc_config::SolverParams;
use rc_math::binomial::{clamp_proportion, neg_log_likelihood};
use serde::Serialize;
use thiserror::Error;

/// Largest backpointer table (epochs × levels) one solve may allocate.
pub const MAX_PATH_CELLS: usize = 1 << 25;

/// A solver parameter outside its domain.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid solver parameter {name}: {message}")]
pub struct InvalidSolverParam {
    pub name: &'static str,
    pub message: String,
}

impl From<InvalidSolverParam> for rc_common::Error {
    fn from(err: InvalidSolverParam) -> Self {
        rc_common::Error::InvalidParameter {
            name: format!("solver.{}", err.name),
            message: err.message,
        }
    }
}

/// Per-series solve failures. These stay with the entity being solved.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("burst detection needs at least 2 epochs, got {0}")]
    TooFewEpochs(usize),
    #[error("{epochs} epochs x {levels} levels exceeds the solver table limit of {limit} cells")]
    StateSpaceTooLarge {
        epochs: usize,
        levels: usize,
        limit: usize,
    },
    #[error("non-finite path cost at epoch {0}")]
    NonFiniteCost(usize),
}

/// Least-cost level assignment for a count series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatePath {
    /// Level per epoch.
    pub states: Vec<usize>,
    /// Total cost of `states` under the model.
    pub cost: f64,
    /// Number of levels the solver considered (`K + 1`).
    pub levels: usize,
}

impl StatePath {
    /// True when no epoch is above baseline.
    pub fn is_flat(&self) -> bool {
        self.states.iter().all(|&s| s == 0)
    }

    pub fn max_level(&self) -> usize {
        self.states.iter().copied().max().unwrap_or(0)
    }
}

/// Cost model for one count series.
#[derive(Debug, Clone)]
struct CostModel {
    base: f64,
    s: f64,
    total: u64,
    transition_unit: f64,
    levels: usize,
}

impl CostModel {
    fn new(counts: &[u64], s: f64, gamma: f64) -> Self {
        let n = counts.len();
        let total: u64 = counts.iter().sum();
        let max = counts.iter().copied().max().unwrap_or(0);
        let mean = total as f64 / n as f64;

        let mut top = 1usize;
        if mean > 0.0 && max as f64 > mean {
            let needed = ((max as f64 / mean).ln() / s.ln()).ceil();
            if needed.is_finite() && needed > 1.0 {
                // saturates on absurd values; the table check rejects those
                top = needed as usize;
            }
        }

        CostModel {
            base: 1.0 / n as f64,
            s,
            total,
            transition_unit: gamma * (n as f64).ln(),
            levels: top + 1,
        }
    }

    fn proportion(&self, level: usize) -> f64 {
        clamp_proportion(self.base * self.s.powi(level.min(i32::MAX as usize) as i32))
    }

    fn emission(&self, count: u64, level: usize) -> f64 {
        neg_log_likelihood(count, self.total, self.proportion(level))
    }

    fn transition(&self, from: usize, to: usize) -> f64 {
        from.abs_diff(to) as f64 * self.transition_unit
    }

    fn path_cost(&self, counts: &[u64], states: &[usize]) -> f64 {
        let mut prev = 0usize;
        let mut cost = 0.0;
        for (&r, &level) in counts.iter().zip(states) {
            cost += self.transition(prev, level) + self.emission(r, level);
            prev = level;
        }
        cost
    }
}

/// Multi-level burst state solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurstStateSolver {
    s: f64,
    gamma: f64,
}

impl Default for BurstStateSolver {
    fn default() -> Self {
        BurstStateSolver { s: 2.0, gamma: 0.3 }
    }
}

impl BurstStateSolver {
    /// Create a solver; `s` must exceed 1 and `gamma` must be positive.
    pub fn new(params: SolverParams) -> Result<Self, InvalidSolverParam> {
        if !params.s.is_finite() || params.s <= 1.0 {
            return Err(InvalidSolverParam {
                name: "s",
                message: format!("must be finite and > 1, got {}", params.s),
            });
        }
        if !params.gamma.is_finite() || params.gamma <= 0.0 {
            return Err(InvalidSolverParam {
                name: "gamma",
                message: format!("must be finite and > 0, got {}", params.gamma),
            });
        }
        Ok(BurstStateSolver {
            s: params.s,
            gamma: params.gamma,
        })
    }

    pub fn params(&self) -> SolverParams {
        SolverParams {
            s: self.s,
            gamma: self.gamma,
        }
    }

    /// Compute the least-cost level path for `counts`.
    pub fn solve(&self, counts: &[u64]) -> Result<StatePath, SolverError> {
        let n = counts.len();
        if n < 2 {
            return Err(SolverError::TooFewEpochs(n));
        }
        if counts.iter().all(|&c| c == 0) {
            return Ok(StatePath {
                states: vec![0; n],
                cost: 0.0,
                levels: 1,
            });
        }

        let model = CostModel::new(counts, self.s, self.gamma);
        let k = model.levels;
        let cells = n.checked_mul(k).filter(|&c| c <= MAX_PATH_CELLS);
        let Some(cells) = cells else {
            return Err(SolverError::StateSpaceTooLarge {
                epochs: n,
                levels: k,
                limit: MAX_PATH_CELLS,
            });
        };

        let mut back = vec![0u32; cells];
        let mut prev: Vec<f64> = (0..k)
            .map(|j| model.transition(0, j) + model.emission(counts[0], j))
            .collect();
        let mut cur = vec![0.0; k];

        for (t, &r) in counts.iter().enumerate().skip(1) {
            for j in 0..k {
                let mut best = f64::INFINITY;
                let mut arg = 0u32;
                for (i, &c) in (0u32..).zip(prev.iter()) {
                    let total = c + model.transition(i as usize, j);
                    if total < best {
                        best = total;
                        arg = i;
                    }
                }
                cur[j] = best + model.emission(r, j);
                back[t * k + j] = arg;
            }
            std::mem::swap(&mut prev, &mut cur);
        }

        let mut last = 0;
        for j in 1..k {
            if prev[j] < prev[last] {
                last = j;
            }
        }
        let cost = prev[last];
        if !cost.is_finite() {
            return Err(SolverError::NonFiniteCost(n - 1));
        }

        let mut states = vec![0usize; n];
        states[n - 1] = last;
        for t in (1..n).rev() {
            states[t - 1] = back[t * k + states[t]] as usize;
        }

        Ok(StatePath {
            states,
            cost,
            levels: k,
        })
    }

    /// Cost of an arbitrary level path under the same model as [`solve`].
    ///
    /// Levels above the solver's bound are priced with the same formula.
    /// Returns 0 for an all-zero series.
    ///
    /// [`solve`]: BurstStateSolver::solve
    pub fn path_cost(&self, counts: &[u64], states: &[usize]) -> f64 {
        if counts.is_empty() || counts.iter().all(|&c| c == 0) {
            return 0.0;
        }
        CostModel::new(counts, self.s, self.gamma).path_cost(counts, states)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solver() -> BurstStateSolver {
        BurstStateSolver::default()
    }

    #[test]
    fn rejects_invalid_params() {
        assert!(BurstStateSolver::new(SolverParams { s: 1.0, gamma: 0.3 }).is_err());
        assert!(BurstStateSolver::new(SolverParams { s: 2.0, gamma: 0.0 }).is_err());
        assert!(BurstStateSolver::new(SolverParams {
            s: f64::NAN,
            gamma: 0.3
        })
        .is_err());
        assert!(BurstStateSolver::new(SolverParams::default()).is_ok());
    }

    #[test]
    fn too_few_epochs() {
        assert_eq!(solver().solve(&[]), Err(SolverError::TooFewEpochs(0)));
        assert_eq!(solver().solve(&[5]), Err(SolverError::TooFewEpochs(1)));
    }

    #[test]
    fn all_zero_is_flat() {
        let path = solver().solve(&[0, 0, 0, 0]).unwrap();
        assert!(path.is_flat());
        assert_eq!(path.cost, 0.0);
    }

    #[test]
    fn constant_series_is_flat() {
        let path = solver().solve(&[7; 30]).unwrap();
        assert!(path.is_flat());
    }

    #[test]
    fn single_elevated_run_is_found() {
        let counts = [1, 1, 1, 20, 22, 19, 1, 1, 1];
        let path = solver().solve(&counts).unwrap();
        let bursting: Vec<bool> = path.states.iter().map(|&s| s >= 1).collect();
        assert_eq!(
            bursting,
            vec![false, false, false, true, true, true, false, false, false]
        );
    }

    #[test]
    fn chosen_cost_matches_path_cost() {
        let counts = [3, 0, 9, 14, 2, 2, 30, 1];
        let s = solver();
        let path = s.solve(&counts).unwrap();
        let recomputed = s.path_cost(&counts, &path.states);
        assert!((path.cost - recomputed).abs() < 1e-9 * path.cost.abs().max(1.0));
    }

    #[test]
    fn chosen_cost_beats_flat_path() {
        let counts = [3, 0, 9, 14, 2, 2, 30, 1];
        let s = solver();
        let path = s.solve(&counts).unwrap();
        let flat = s.path_cost(&counts, &vec![0; counts.len()]);
        assert!(path.cost <= flat + 1e-9);
    }

    #[test]
    fn level_bound_covers_peak() {
        // mean = 8, max = 48: log2(6) rounds up to 3
        let mut counts = vec![0u64; 8];
        counts[0] = 48;
        counts[1] = 16;
        let model = CostModel::new(&counts, 2.0, 0.3);
        assert_eq!(model.levels, 4);
        assert!(model.proportion(model.levels - 1) * model.total as f64 >= 48.0);
    }

    #[test]
    fn fine_spacing_reaches_high_levels() {
        // max / mean = 1000 / 10.99, so K = 93 at s = 1.05
        let mut counts = vec![1u64; 200];
        counts[100] = 1000;
        counts[101] = 1000;
        let solver = BurstStateSolver::new(SolverParams { s: 1.05, gamma: 0.3 }).unwrap();
        let path = solver.solve(&counts).unwrap();
        assert_eq!(path.levels, 94);
        assert!(path.max_level() > 64);
        let bursting: Vec<usize> = (0..counts.len()).filter(|&i| path.states[i] > 0).collect();
        assert_eq!(bursting, vec![100, 101]);
    }

    #[test]
    fn oversized_table_is_rejected() {
        let solver = BurstStateSolver::new(SolverParams {
            s: 1.0 + 1e-9,
            gamma: 0.3,
        })
        .unwrap();
        match solver.solve(&[0, 0, 0, 100]) {
            Err(SolverError::StateSpaceTooLarge { epochs, levels, limit }) => {
                assert_eq!(epochs, 4);
                assert!(levels > limit / epochs);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn invalid_param_maps_to_unified_error() {
        let err = BurstStateSolver::new(SolverParams { s: 2.0, gamma: -1.0 }).unwrap_err();
        assert_eq!(err.name, "gamma");
        let unified: rc_common::Error = err.into();
        assert_eq!(unified.code(), 11);
    }

    #[test]
    fn higher_gamma_suppresses_short_blips() {
        let counts = [5, 5, 5, 5, 9, 5, 5, 5, 5, 5];
        let lenient = BurstStateSolver::new(SolverParams { s: 1.5, gamma: 0.01 }).unwrap();
        let strict = BurstStateSolver::new(SolverParams { s: 1.5, gamma: 5.0 }).unwrap();
        let strict_path = strict.solve(&counts).unwrap();
        assert!(strict_path.is_flat());
        let lenient_path = lenient.solve(&counts).unwrap();
        assert!(lenient_path.max_level() >= strict_path.max_level());
    }

    #[test]
    fn solve_is_deterministic() {
        let counts = [2, 8, 8, 1, 0, 0, 15, 16, 3, 1, 1, 9];
        let a = solver().solve(&counts).unwrap();
        let b = solver().solve(&counts).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cost.to_bits(), b.cost.to_bits());
    }
}
