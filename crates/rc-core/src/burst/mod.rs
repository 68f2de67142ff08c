//! Per-entity burst pipeline: epochs → levels → intervals → groups → statistics.

pub mod attribution;
pub mod epoch;
pub mod interval;
pub mod metric;
pub mod solver;
pub mod stats;

pub use attribution::{attribute, locate, Attribution};
pub use epoch::{aggregate, EpochBucket, EpochError, EpochSeries, MAX_EPOCHS};
pub use interval::{build_intervals, BurstInterval};
pub use metric::Metric;
pub use solver::{BurstStateSolver, InvalidSolverParam, SolverError, StatePath, MAX_PATH_CELLS};
pub use stats::{gap_days, BurstStatistics};
