//! Content recurrence core library.
//!
//! Detects recurring bursts of activity per content entity and measures
//! them at entity, population and community scale.
//!
//! ```ignore
//! use rc_core::{RecurrenceAnalyzer, Metric};
//!
//! let analyzer = RecurrenceAnalyzer::from_config(events, &config)?;
//! let table = analyzer.population(Metric::BurstCount, None);
//! ```

pub mod analyzer;
pub mod burst;
pub mod exit_codes;
pub mod ingest;
pub mod logging;
pub mod output;
pub mod series;

pub use analyzer::{
    CommunityMap, CommunityTables, PopulationRow, PopulationTable, RecurrenceAnalyzer, Scale,
    ScaleResult,
};
pub use burst::{BurstInterval, BurstStateSolver, BurstStatistics, Metric, StatePath};
pub use series::{BurstDetail, BurstSummary, ContentSeries, Detection};
