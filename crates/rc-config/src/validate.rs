//! Configuration validation errors and semantic validation.

use std::collections::HashSet;
use thiserror::Error;

use crate::config::{RecurrenceConfig, SolverParams};

/// Validation result type.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Configuration validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Duplicate column name '{column}' used for {first} and {second}")]
    DuplicateColumn {
        column: String,
        first: String,
        second: String,
    },

    #[error("Version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },
}

impl ValidationError {
    /// Error code for structured error reporting.
    pub fn code(&self) -> u32 {
        match self {
            ValidationError::InvalidValue { .. } => 65,
            ValidationError::DuplicateColumn { .. } => 66,
            ValidationError::VersionMismatch { .. } => 67,
        }
    }
}

impl From<ValidationError> for rc_common::Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidValue { field, message } if field.starts_with("solver.") => {
                rc_common::Error::InvalidParameter {
                    name: field,
                    message,
                }
            }
            other => rc_common::Error::Validation(other.to_string()),
        }
    }
}

/// Validate solver tuning parameters.
pub fn validate_solver(params: &SolverParams) -> ValidationResult<()> {
    if !params.s.is_finite() || params.s <= 1.0 {
        return Err(ValidationError::InvalidValue {
            field: "solver.s".to_string(),
            message: format!("Must be finite and > 1, got {}", params.s),
        });
    }
    if !params.gamma.is_finite() || params.gamma <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: "solver.gamma".to_string(),
            message: format!("Must be finite and > 0, got {}", params.gamma),
        });
    }
    Ok(())
}

/// Validate a whole configuration semantically.
///
/// Granularity is already checked when the document is parsed.
pub fn validate_config(config: &RecurrenceConfig) -> ValidationResult<()> {
    if config.schema_version != crate::CONFIG_SCHEMA_VERSION {
        return Err(ValidationError::VersionMismatch {
            expected: crate::CONFIG_SCHEMA_VERSION.to_string(),
            actual: config.schema_version.clone(),
        });
    }

    validate_solver(&config.solver)?;

    let mut seen: Vec<(&str, &str)> = Vec::new();
    for (field, column) in config.columns.entries() {
        if column.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("columns.{}", field),
                message: "Column name must not be empty".to_string(),
            });
        }
        if let Some((first, _)) = seen.iter().find(|(_, c)| *c == column) {
            return Err(ValidationError::DuplicateColumn {
                column: column.to_string(),
                first: first.to_string(),
                second: field.to_string(),
            });
        }
        seen.push((field, column));
    }

    for (field, selection) in [
        ("selected_content", &config.selected_content),
        ("selected_communities", &config.selected_communities),
    ] {
        if let Some(ids) = selection {
            let unique: HashSet<&String> = ids.iter().collect();
            if unique.len() != ids.len() {
                return Err(ValidationError::InvalidValue {
                    field: field.to_string(),
                    message: "Selection contains duplicate ids".to_string(),
                });
            }
        }
    }

    Ok(())
}
