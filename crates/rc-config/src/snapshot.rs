//! Configuration snapshots for reproducible runs.
//!
//! A snapshot captures the effective configuration at the start of a run so
//! that reported burst metrics can be tied back to the exact parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::RecurrenceConfig;
use crate::resolve::LoadedConfig;

/// A frozen snapshot of configuration state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// When this snapshot was taken.
    pub timestamp: DateTime<Utc>,

    /// Schema version of the configuration.
    pub schema_version: String,

    /// Source of the configuration.
    pub source: String,

    /// Path the configuration was loaded from.
    #[serde(default)]
    pub path: Option<String>,

    /// SHA-256 of the canonical JSON form of `config`.
    pub config_hash: String,

    /// The effective configuration.
    pub config: RecurrenceConfig,
}

impl ConfigSnapshot {
    /// Create a snapshot of an effective configuration.
    ///
    /// The hash covers the parsed configuration, not the file bytes, so
    /// whitespace or field order in the file do not change it.
    pub fn new(loaded: &LoadedConfig) -> Self {
        ConfigSnapshot {
            timestamp: Utc::now(),
            schema_version: loaded.config.schema_version.clone(),
            source: loaded.source.to_string(),
            path: loaded.path.as_ref().map(|p| p.display().to_string()),
            config_hash: config_hash(&loaded.config),
            config: loaded.config.clone(),
        }
    }

    /// Check if the configuration differs from another snapshot.
    pub fn differs_from(&self, other: &ConfigSnapshot) -> bool {
        self.config_hash != other.config_hash
    }
}

/// SHA-256 hex digest of the canonical JSON form of a configuration.
pub fn config_hash(config: &RecurrenceConfig) -> String {
    let canonical = serde_json::to_string(config).unwrap_or_default();
    hash_content(&canonical)
}

/// Compute SHA-256 hash of content.
fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
