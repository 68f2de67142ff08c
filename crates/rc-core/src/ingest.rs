//! Loading event tables and community mappings from JSON sources.
//!
//! Events come as a JSON array of row objects or as JSON lines, one row
//! object per line. Column names come from the config [`ColumnMap`].

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use rc_common::{ContentId, Event};
use rc_config::ColumnMap;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::analyzer::CommunityMap;
use crate::logging::{event_names, Stage};

/// Errors while reading tabular input. Rows are 1-based.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("row {row}: malformed JSON: {source}")]
    Malformed {
        row: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("row {row}: expected a JSON object")]
    NotAnObject { row: usize },
    #[error("row {row}: missing column '{column}'")]
    MissingColumn { row: usize, column: String },
    #[error("row {row}: column '{column}' must be a string or number")]
    InvalidValue { row: usize, column: String },
    #[error("row {row}: unparseable timestamp '{value}'")]
    InvalidTimestamp { row: usize, value: String },
    #[error("community mapping: {0}")]
    Communities(String),
}

impl From<IngestError> for rc_common::Error {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::MissingColumn { row, column } => {
                rc_common::Error::MissingColumn { row, column }
            }
            IngestError::InvalidTimestamp { row, value } => {
                rc_common::Error::InvalidTimestamp { row, value }
            }
            IngestError::Malformed { row, .. }
            | IngestError::NotAnObject { row }
            | IngestError::InvalidValue { row, .. } => rc_common::Error::Ingest {
                row,
                message: err.to_string(),
            },
            IngestError::Communities(_) => rc_common::Error::Ingest {
                row: 0,
                message: err.to_string(),
            },
        }
    }
}

/// Parse a timestamp in any accepted form.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DDTHH:MM:SS` (UTC),
/// `YYYY-MM-DD` (midnight UTC) and integer Unix seconds.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    s.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

fn timestamp_value(row: usize, column: &str, value: &Value) -> Result<DateTime<Utc>, IngestError> {
    let parsed = match value {
        Value::String(s) => parse_timestamp(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| {
                n.as_f64().and_then(|f| {
                    let millis = (f * 1000.0).round();
                    if millis.is_finite() && millis.abs() < i64::MAX as f64 {
                        DateTime::from_timestamp_millis(millis as i64)
                    } else {
                        None
                    }
                })
            }),
        Value::Null => {
            return Err(IngestError::MissingColumn {
                row,
                column: column.to_string(),
            })
        }
        _ => None,
    };
    parsed.ok_or_else(|| IngestError::InvalidTimestamp {
        row,
        value: value.to_string(),
    })
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required_text(row: usize, obj: &Map<String, Value>, column: &str) -> Result<String, IngestError> {
    match obj.get(column) {
        None | Some(Value::Null) => Err(IngestError::MissingColumn {
            row,
            column: column.to_string(),
        }),
        Some(v) => text_value(v).ok_or_else(|| IngestError::InvalidValue {
            row,
            column: column.to_string(),
        }),
    }
}

fn event_from_row(row: usize, value: &Value, columns: &ColumnMap) -> Result<Event, IngestError> {
    let obj = value.as_object().ok_or(IngestError::NotAnObject { row })?;

    let ts_value = obj
        .get(&columns.timestamp)
        .ok_or_else(|| IngestError::MissingColumn {
            row,
            column: columns.timestamp.clone(),
        })?;
    let timestamp = timestamp_value(row, &columns.timestamp, ts_value)?;
    let id = required_text(row, obj, &columns.id)?;
    let user_id = required_text(row, obj, &columns.user_id)?;
    let content = required_text(row, obj, &columns.content)?;
    let platform = obj
        .get(&columns.platform)
        .and_then(text_value)
        .unwrap_or_default();

    Ok(Event::new(id, timestamp, user_id, platform, content))
}

/// Parse events from JSON array or JSON lines text.
pub fn parse_events(text: &str, columns: &ColumnMap) -> Result<Vec<Event>, IngestError> {
    if text.trim_start().starts_with('[') {
        let rows: Vec<Value> =
            serde_json::from_str(text).map_err(|source| IngestError::Malformed { row: 0, source })?;
        return rows
            .iter()
            .enumerate()
            .map(|(i, v)| event_from_row(i + 1, v, columns))
            .collect();
    }

    let mut events = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let row = i + 1;
        let value: Value = serde_json::from_str(line)
            .map_err(|source| IngestError::Malformed { row, source })?;
        events.push(event_from_row(row, &value, columns)?);
    }
    Ok(events)
}

/// Read events from a file.
pub fn load_events(path: &Path, columns: &ColumnMap) -> rc_common::Result<Vec<Event>> {
    let text = std::fs::read_to_string(path)?;
    let events = parse_events(&text, columns)?;
    tracing::info!(
        event = event_names::EVENTS_LOADED,
        stage = %Stage::Load,
        path = %path.display(),
        rows = events.len(),
        "loaded events"
    );
    Ok(events)
}

/// Parse a `{community: [content ids]}` object.
pub fn parse_communities(text: &str) -> Result<CommunityMap, IngestError> {
    let raw: BTreeMap<String, Vec<Value>> =
        serde_json::from_str(text).map_err(|e| IngestError::Communities(e.to_string()))?;
    raw.into_iter()
        .map(|(community, ids)| {
            let ids = ids
                .iter()
                .map(|v| {
                    text_value(v).map(ContentId::new).ok_or_else(|| {
                        IngestError::Communities(format!(
                            "community '{community}' has a non-scalar content id {v}"
                        ))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok((community, ids))
        })
        .collect()
}

/// Read a community mapping from a file.
pub fn load_communities(path: &Path) -> rc_common::Result<CommunityMap> {
    let text = std::fs::read_to_string(path)?;
    let map = parse_communities(&text)?;
    tracing::info!(
        event = event_names::COMMUNITIES_LOADED,
        stage = %Stage::Load,
        path = %path.display(),
        communities = map.len(),
        "loaded community mapping"
    );
    Ok(map)
}
