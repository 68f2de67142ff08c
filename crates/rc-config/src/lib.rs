//! Content recurrence configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for recurrence.json
//! - Time granularity parsing and epoch alignment
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation
//! - Config snapshots for reproducible runs
//! - Three-tier selection resolution (explicit → instance default → all)

pub mod config;
pub mod granularity;
pub mod resolve;
pub mod selection;
pub mod snapshot;
pub mod validate;

pub use config::{ColumnMap, RecurrenceConfig, SolverParams};
pub use granularity::{Granularity, GranularityError, TimeUnit};
pub use resolve::{load_config, read_config, resolve_config_path, ConfigSource, LoadedConfig};
pub use selection::resolve;
pub use snapshot::ConfigSnapshot;
pub use validate::{validate_config, ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
