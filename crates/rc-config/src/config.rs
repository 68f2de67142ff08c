//! Typed configuration for recurrence.json.

use serde::{Deserialize, Serialize};

use crate::granularity::Granularity;

/// Names of the event table columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    /// Post identifier column.
    pub id: String,
    /// Post time column.
    pub timestamp: String,
    /// Actor identifier column.
    pub user_id: String,
    /// Platform label column.
    pub platform: String,
    /// Content grouping key column.
    pub content: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        ColumnMap {
            id: "nodeID".to_string(),
            timestamp: "nodeTime".to_string(),
            user_id: "nodeUserID".to_string(),
            platform: "platform".to_string(),
            content: "informationID".to_string(),
        }
    }
}

impl ColumnMap {
    /// (field, column name) pairs, in declaration order.
    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("id", &self.id),
            ("timestamp", &self.timestamp),
            ("user_id", &self.user_id),
            ("platform", &self.platform),
            ("content", &self.content),
        ]
    }
}

/// Burst state solver tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    /// Multiplicative distance between successive burst levels (> 1).
    pub s: f64,
    /// Difficulty of moving between levels (> 0).
    pub gamma: f64,
}

impl Default for SolverParams {
    fn default() -> Self {
        SolverParams { s: 2.0, gamma: 0.3 }
    }
}

/// Complete recurrence analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecurrenceConfig {
    pub schema_version: String,
    pub columns: ColumnMap,
    /// Epoch width.
    pub granularity: Granularity,
    pub solver: SolverParams,
    /// Content ids measured when a call names none.
    pub selected_content: Option<Vec<String>>,
    /// Communities measured when a call names none.
    pub selected_communities: Option<Vec<String>>,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        RecurrenceConfig {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            columns: ColumnMap::default(),
            granularity: Granularity::daily(),
            solver: SolverParams::default(),
            selected_content: None,
            selected_communities: None,
        }
    }
}

impl RecurrenceConfig {
    /// Parse a configuration document. Missing fields take their defaults.
    /// Syntax errors and bad field values (an unknown granularity unit,
    /// say) are configuration errors, not I/O errors.
    pub fn from_json_str(json: &str) -> rc_common::Result<Self> {
        serde_json::from_str(json).map_err(|e| rc_common::Error::Config(e.to_string()))
    }

    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn with_solver(mut self, solver: SolverParams) -> Self {
        self.solver = solver;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = RecurrenceConfig::default();
        assert_eq!(config.solver.s, 2.0);
        assert_eq!(config.solver.gamma, 0.3);
        assert_eq!(config.granularity.to_string(), "D");
        assert_eq!(config.columns.timestamp, "nodeTime");
        assert!(config.selected_content.is_none());
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config = RecurrenceConfig::from_json_str(
            r#"{"granularity": "H", "columns": {"timestamp": "created_at"}, "solver": {"gamma": 1.0}}"#,
        )
        .unwrap();
        assert_eq!(config.granularity.seconds(), 3_600);
        assert_eq!(config.columns.timestamp, "created_at");
        assert_eq!(config.columns.user_id, "nodeUserID");
        assert_eq!(config.solver.gamma, 1.0);
        assert_eq!(config.solver.s, 2.0);
    }

    #[test]
    fn bad_granularity_is_a_config_error() {
        let err = RecurrenceConfig::from_json_str(r#"{"granularity": "fortnight"}"#).unwrap_err();
        assert!(matches!(err, rc_common::Error::Config(_)));
        assert_eq!(err.code(), 10);
        assert!(err.to_string().contains("fortnight"));
    }
}
