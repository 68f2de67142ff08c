//! Error types for content recurrence analysis.
//!
//! This module provides structured error handling with:
//! - Stable error codes for machine parsing
//! - Category classification for error grouping
//! - Recoverability hints for automation
//! - Remediation suggestions for humans
//!
//! # Human-Facing Output
//!
//! ```text
//! ✗ Unknown Metric
//!   Reason: unknown metric: burst_sizes
//!   Fix: Run 'rc-core metrics' to list the available metric names.
//! ```
//!
//! # Machine-Facing Output
//!
//! ```json
//! {
//!   "code": 31,
//!   "category": "analysis",
//!   "message": "unknown metric: burst_sizes",
//!   "recoverable": false,
//!   "context": { "metric": "burst_sizes" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for recurrence operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Configuration and parameter errors.
    Config,
    /// Event table ingestion errors.
    Input,
    /// Burst detection and measurement errors.
    Analysis,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Config => write!(f, "config"),
            ErrorCategory::Input => write!(f, "input"),
            ErrorCategory::Analysis => write!(f, "analysis"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for recurrence analysis.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    #[error("invalid time granularity: {0}")]
    InvalidGranularity(String),

    #[error("config validation failed: {0}")]
    Validation(String),

    // Input errors (20-29)
    #[error("row {row}: {message}")]
    Ingest { row: usize, message: String },

    #[error("row {row}: missing column '{column}'")]
    MissingColumn { row: usize, column: String },

    #[error("row {row}: unparseable timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },

    // Analysis errors (30-39)
    #[error("insufficient data for {content_id}: {events} event(s), need at least 2")]
    InsufficientData { content_id: String, events: usize },

    #[error("unknown metric: {0}")]
    UnknownMetric(String),

    #[error("no community mapping provided")]
    MissingCommunityMapping,

    #[error("unknown content id: {0}")]
    UnknownContent(String),

    #[error("numerical instability detected: {0}")]
    NumericalInstability(String),

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    ///
    /// Error codes are stable and grouped by category:
    /// - 10-19: Configuration errors
    /// - 20-29: Input errors
    /// - 30-39: Analysis errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidParameter { .. } => 11,
            Error::InvalidGranularity(_) => 12,
            Error::Validation(_) => 13,
            Error::Ingest { .. } => 20,
            Error::MissingColumn { .. } => 21,
            Error::InvalidTimestamp { .. } => 22,
            Error::InsufficientData { .. } => 30,
            Error::UnknownMetric(_) => 31,
            Error::MissingCommunityMapping => 32,
            Error::UnknownContent(_) => 33,
            Error::NumericalInstability(_) => 34,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }

    /// Returns the error category for grouping and filtering.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config(_)
            | Error::InvalidParameter { .. }
            | Error::InvalidGranularity(_)
            | Error::Validation(_) => ErrorCategory::Config,

            Error::Ingest { .. } | Error::MissingColumn { .. } | Error::InvalidTimestamp { .. } => {
                ErrorCategory::Input
            }

            Error::InsufficientData { .. }
            | Error::UnknownMetric(_)
            | Error::MissingCommunityMapping
            | Error::UnknownContent(_)
            | Error::NumericalInstability(_) => ErrorCategory::Analysis,

            Error::Io(_) | Error::Json(_) => ErrorCategory::Io,
        }
    }

    /// Returns whether this error is potentially recoverable.
    ///
    /// Insufficient data and a missing community mapping degrade to
    /// "no result" instead of aborting a batch.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::InvalidParameter { .. } => true,
            Error::InvalidGranularity(_) => true,
            Error::Validation(_) => true,

            Error::Ingest { .. } => false,
            Error::MissingColumn { .. } => true, // fix the column map
            Error::InvalidTimestamp { .. } => false,

            Error::InsufficientData { .. } => true,
            Error::UnknownMetric(_) => false,
            Error::MissingCommunityMapping => true,
            Error::UnknownContent(_) => true,
            Error::NumericalInstability(_) => false,

            Error::Io(_) => true,
            Error::Json(_) => false,
        }
    }

    /// Returns a human-readable remediation hint.
    pub fn remediation(&self) -> &'static str {
        match self {
            Error::Config(_) => {
                "Run 'rc-core check' to validate configuration, or check syntax in recurrence.json."
            }
            Error::InvalidParameter { .. } => {
                "Solver parameters must satisfy s > 1 and gamma > 0."
            }
            Error::InvalidGranularity(_) => {
                "Use a unit such as S, Min, H, D or W with an optional multiplier (e.g. 30Min, 2H)."
            }
            Error::Validation(_) => "Fix the reported field in recurrence.json and rerun 'rc-core check'.",

            Error::Ingest { .. } => "Check that every row is a JSON object with the configured columns.",
            Error::MissingColumn { .. } => {
                "Map the column name in the 'columns' section of recurrence.json."
            }
            Error::InvalidTimestamp { .. } => {
                "Timestamps must be RFC 3339, 'YYYY-MM-DD HH:MM:SS', 'YYYY-MM-DD' or Unix seconds."
            }

            Error::InsufficientData { .. } => {
                "Burst detection needs at least two events per content id; the entity reports no values."
            }
            Error::UnknownMetric(_) => "Run 'rc-core metrics' to list the available metric names.",
            Error::MissingCommunityMapping => {
                "Pass a community mapping file with '--communities <file>'."
            }
            Error::UnknownContent(_) => "Check the content id against the ids present in the event file.",
            Error::NumericalInstability(_) => {
                "Internal numerical issue. Report with the input file and configuration snapshot."
            }

            Error::Io(_) => "Check that the file exists and is readable. Retry the operation.",
            Error::Json(_) => "Invalid JSON in file. Check syntax with 'jq . <file>'.",
        }
    }

    /// Returns a short headline for human-readable output.
    pub fn headline(&self) -> &'static str {
        match self {
            Error::Config(_) => "Configuration Error",
            Error::InvalidParameter { .. } => "Invalid Solver Parameter",
            Error::InvalidGranularity(_) => "Invalid Time Granularity",
            Error::Validation(_) => "Config Validation Failed",

            Error::Ingest { .. } => "Malformed Event Row",
            Error::MissingColumn { .. } => "Missing Event Column",
            Error::InvalidTimestamp { .. } => "Invalid Timestamp",

            Error::InsufficientData { .. } => "Insufficient Data",
            Error::UnknownMetric(_) => "Unknown Metric",
            Error::MissingCommunityMapping => "Missing Community Mapping",
            Error::UnknownContent(_) => "Unknown Content",
            Error::NumericalInstability(_) => "Numerical Instability",

            Error::Io(_) => "I/O Error",
            Error::Json(_) => "JSON Parse Error",
        }
    }
}

/// Structured error response for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Stable error code.
    pub code: u32,

    /// Error category for grouping.
    pub category: ErrorCategory,

    /// Human-readable error message.
    pub message: String,

    /// Whether the error is potentially recoverable.
    pub recoverable: bool,

    /// Additional structured context (e.g., row number, metric name).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, serde_json::Value>,
}

impl From<&Error> for ErrorReport {
    fn from(err: &Error) -> Self {
        let mut context = HashMap::new();

        match err {
            Error::Ingest { row, .. } | Error::InvalidTimestamp { row, .. } => {
                context.insert("row".to_string(), serde_json::json!(row));
            }
            Error::MissingColumn { row, column } => {
                context.insert("row".to_string(), serde_json::json!(row));
                context.insert("column".to_string(), serde_json::json!(column));
            }
            Error::InsufficientData { content_id, events } => {
                context.insert("content_id".to_string(), serde_json::json!(content_id));
                context.insert("events".to_string(), serde_json::json!(events));
            }
            Error::UnknownMetric(name) => {
                context.insert("metric".to_string(), serde_json::json!(name));
            }
            Error::UnknownContent(id) => {
                context.insert("content_id".to_string(), serde_json::json!(id));
            }
            Error::InvalidParameter { name, .. } => {
                context.insert("parameter".to_string(), serde_json::json!(name));
            }
            _ => {}
        }

        ErrorReport {
            code: err.code(),
            category: err.category(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
            context,
        }
    }
}

impl ErrorReport {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":{},"error":"serialization_failed"}}"#, self.code)
        })
    }
}

/// Format an error for human-readable stderr output.
///
/// Output format:
/// ```text
/// ✗ [Headline]
///   Reason: [Error message]
///   Fix: [Remediation hint]
/// ```
pub fn format_error_human(err: &Error, use_color: bool) -> String {
    let (red, cyan, reset) = if use_color {
        ("\x1b[31m", "\x1b[36m", "\x1b[0m")
    } else {
        ("", "", "")
    };

    format!(
        "{red}✗{reset} {headline}\n  Reason: {message}\n  {cyan}Fix:{reset} {remediation}",
        red = red,
        cyan = cyan,
        reset = reset,
        headline = err.headline(),
        message = err,
        remediation = err.remediation()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(Error::Config("test".into()).code(), 10);
        assert_eq!(Error::UnknownMetric("x".into()).code(), 31);
        assert_eq!(Error::MissingCommunityMapping.code(), 32);
        assert_eq!(
            Error::InsufficientData {
                content_id: "c".into(),
                events: 1
            }
            .code(),
            30
        );
    }

    #[test]
    fn test_error_category() {
        assert_eq!(Error::Config("test".into()).category(), ErrorCategory::Config);
        assert_eq!(
            Error::MissingColumn {
                row: 3,
                column: "nodeTime".into()
            }
            .category(),
            ErrorCategory::Input
        );
        assert_eq!(Error::MissingCommunityMapping.category(), ErrorCategory::Analysis);
    }

    #[test]
    fn test_error_recoverable() {
        assert!(Error::MissingCommunityMapping.is_recoverable());
        assert!(!Error::UnknownMetric("x".into()).is_recoverable());
        assert!(Error::InsufficientData {
            content_id: "c".into(),
            events: 0
        }
        .is_recoverable());
    }

    #[test]
    fn test_error_report_context() {
        let err = Error::MissingColumn {
            row: 7,
            column: "nodeUserID".into(),
        };
        let report = ErrorReport::from(&err);

        assert_eq!(report.code, 21);
        assert_eq!(report.category, ErrorCategory::Input);
        assert_eq!(report.context.get("row"), Some(&serde_json::json!(7)));
        assert_eq!(
            report.context.get("column"),
            Some(&serde_json::json!("nodeUserID"))
        );
    }

    #[test]
    fn test_error_report_json() {
        let report = ErrorReport::from(&Error::UnknownMetric("burst_sizes".into()));
        let json = report.to_json();

        assert!(json.contains(r#""code":31"#));
        assert!(json.contains(r#""category":"analysis""#));
        assert!(json.contains(r#""recoverable":false"#));
        assert!(json.contains(r#""metric":"burst_sizes""#));
    }

    #[test]
    fn test_format_error_human() {
        let formatted = format_error_human(&Error::MissingCommunityMapping, false);

        assert!(formatted.contains("Missing Community Mapping"));
        assert!(formatted.contains("no community mapping provided"));
        assert!(formatted.contains("--communities"));
    }

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::Config.to_string(), "config");
        assert_eq!(ErrorCategory::Analysis.to_string(), "analysis");
    }
}
