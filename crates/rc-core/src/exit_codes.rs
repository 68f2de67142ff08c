//! Exit codes for the rc-core CLI.
//!
//! Exit code ranges:
//! - 0-1: Operational outcomes (parse outcome from code, not output)
//! - 10-19: User/input errors (recoverable by user action)
//! - 20-29: Internal and I/O errors

use rc_common::Error;

/// Exit codes for rc-core operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    // ========================================================================
    // Operational Outcomes (0-1)
    // ========================================================================
    /// Success: at least one burst found, or a command with no burst outcome
    Clean = 0,

    /// Analysis ran but no entity has a burst
    NoBursts = 1,

    // ========================================================================
    // User / Input Errors (10-19)
    // ========================================================================
    /// Invalid arguments or configuration
    ArgsError = 10,

    /// Requested metric name is not known
    UnknownMetric = 11,

    /// Community view requested without a mapping
    MissingMapping = 12,

    // ========================================================================
    // Internal Errors (20-29)
    // ========================================================================
    /// Internal error (bug - please report)
    InternalError = 20,

    /// I/O or input parsing error
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Codes 0-1.
    pub fn is_operational(self) -> bool {
        (self as i32) < 10
    }

    /// Codes 10-19.
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Name for JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK",
            ExitCode::NoBursts => "OK_NO_BURSTS",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::UnknownMetric => "ERR_UNKNOWN_METRIC",
            ExitCode::MissingMapping => "ERR_MISSING_MAPPING",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Config(_)
            | Error::InvalidParameter { .. }
            | Error::InvalidGranularity(_)
            | Error::Validation(_)
            | Error::UnknownContent(_) => ExitCode::ArgsError,
            Error::UnknownMetric(_) => ExitCode::UnknownMetric,
            Error::MissingCommunityMapping => ExitCode::MissingMapping,
            Error::Ingest { .. }
            | Error::MissingColumn { .. }
            | Error::InvalidTimestamp { .. }
            | Error::Io(_)
            | Error::Json(_) => ExitCode::IoError,
            Error::InsufficientData { .. } | Error::NumericalInstability(_) => {
                ExitCode::InternalError
            }
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
