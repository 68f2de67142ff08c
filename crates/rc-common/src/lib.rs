//! Content recurrence common types and errors.
//!
//! This crate provides foundational types shared across rc-core modules:
//! - The event record analyzed for bursts
//! - Common error types with stable codes
//! - Output format specifications

pub mod error;
pub mod event;
pub mod output;

pub use error::{Error, ErrorCategory, ErrorReport, Result};
pub use event::{ContentId, Event};
pub use output::OutputFormat;
