//! Stable event names and pipeline stages for structured logs.

use serde::{Deserialize, Serialize};

/// Processing stages in the recurrence pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Startup and configuration.
    Init,
    /// Reading events and community mappings.
    Load,
    /// Bucketing events into epochs.
    Aggregate,
    /// Solving burst levels and building intervals.
    Detect,
    /// Assigning events to bursts.
    Attribute,
    /// Computing burst statistics.
    Measure,
    /// Rendering results.
    Report,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Init => "init",
            Stage::Load => "load",
            Stage::Aggregate => "aggregate",
            Stage::Detect => "detect",
            Stage::Attribute => "attribute",
            Stage::Measure => "measure",
            Stage::Report => "report",
        };
        write!(f, "{}", s)
    }
}

/// Standard event names used in logging.
pub mod event_names {
    // Run lifecycle
    pub const RUN_STARTED: &str = "run.started";
    pub const RUN_FINISHED: &str = "run.finished";

    // Config
    pub const CONFIG_LOADED: &str = "config.loaded";
    pub const CONFIG_DEFAULT_USED: &str = "config.default_used";

    // Load stage
    pub const EVENTS_LOADED: &str = "load.events";
    pub const COMMUNITIES_LOADED: &str = "load.communities";

    // Per-entity pipeline
    pub const SERIES_DETECTED: &str = "detect.series";
    pub const SERIES_INSUFFICIENT: &str = "detect.insufficient";
    pub const SERIES_FAILED: &str = "detect.failed";
    pub const SERIES_ATTRIBUTED: &str = "attribute.series";

    // Aggregation
    pub const SELECTION_UNKNOWN_ID: &str = "measure.unknown_id";
    pub const COMMUNITY_MAPPING_MISSING: &str = "measure.mapping_missing";
}

/// Correlation fields shared by every event of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogContext {
    pub run_id: String,
}

impl LogContext {
    pub fn new(run_id: impl Into<String>) -> Self {
        LogContext {
            run_id: run_id.into(),
        }
    }
}
