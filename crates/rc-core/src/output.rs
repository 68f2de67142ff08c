//! Rendering command payloads for stdout.

use rc_common::{OutputFormat, Result};
use serde::Serialize;
use serde_json::Value;

use crate::analyzer::{CommunityTables, PopulationTable};
use crate::burst::Metric;
use crate::series::{BurstDetail, BurstSummary};

/// A payload renderable in every [`OutputFormat`].
pub trait Render: Serialize {
    /// One JSON value per line in `jsonl` mode.
    fn rows(&self) -> Result<Vec<Value>>;
    fn markdown(&self) -> String;
    /// Single-line digest.
    fn summary(&self) -> String;
}

pub fn render<T: Render>(payload: &T, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(payload)?,
        OutputFormat::Jsonl => {
            let mut out = String::new();
            for row in payload.rows()? {
                out.push_str(&serde_json::to_string(&row)?);
                out.push('\n');
            }
            out.truncate(out.trim_end().len());
            out
        }
        OutputFormat::Md => payload.markdown(),
        OutputFormat::Summary => payload.summary(),
    })
}

fn cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => format!("{:.3}", v),
        None => "n/a".to_string(),
    }
}

fn to_rows<T: Serialize>(items: &[T]) -> Result<Vec<Value>> {
    let rows = items
        .iter()
        .map(serde_json::to_value)
        .collect::<serde_json::Result<Vec<_>>>()?;
    Ok(rows)
}

/// Per-entity summaries from `analyze`.
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub entities: Vec<BurstSummary>,
}

impl Render for SummaryReport {
    fn rows(&self) -> Result<Vec<Value>> {
        to_rows(&self.entities)
    }

    fn markdown(&self) -> String {
        let mut out = String::from(
            "| content | status | events | bursts | mean size | mean gap (days) | burstiness | lifetime (min) |\n\
             |---|---|---|---|---|---|---|---|\n",
        );
        for s in &self.entities {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
                s.content_id,
                s.status,
                s.events,
                cell(s.burst_count.map(|c| c as f64)),
                cell(s.mean_burst_size),
                cell(s.mean_gap_days),
                cell(s.burstiness_coefficient),
                cell(s.mean_burst_lifetime_minutes),
            ));
        }
        out
    }

    fn summary(&self) -> String {
        let bursting = self
            .entities
            .iter()
            .filter(|s| s.burst_count.unwrap_or(0) > 0)
            .count();
        let bursts: usize = self.entities.iter().filter_map(|s| s.burst_count).sum();
        let insufficient = self
            .entities
            .iter()
            .filter(|s| s.status != "detected")
            .count();
        format!(
            "{} entities, {} with bursts, {} bursts total, {} without enough data",
            self.entities.len(),
            bursting,
            bursts,
            insufficient
        )
    }
}

/// Bursts of one entity from `bursts`.
#[derive(Debug, Serialize)]
pub struct BurstReport {
    pub content_id: String,
    pub status: &'static str,
    pub bursts: Vec<BurstDetail>,
}

impl Render for BurstReport {
    fn rows(&self) -> Result<Vec<Value>> {
        to_rows(&self.bursts)
    }

    fn markdown(&self) -> String {
        let mut out = format!(
            "## {}\n\n| # | begin | end | lifetime (min) | events | users | peak level |\n|---|---|---|---|---|---|---|\n",
            self.content_id
        );
        for b in &self.bursts {
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                b.index,
                b.begin.to_rfc3339(),
                b.end.to_rfc3339(),
                cell(Some(b.lifetime_minutes)),
                b.events,
                b.unique_users,
                b.peak_level
            ));
        }
        out
    }

    fn summary(&self) -> String {
        let events: usize = self.bursts.iter().map(|b| b.events).sum();
        format!(
            "{}: {} ({} bursts, {} events in bursts)",
            self.content_id,
            self.status,
            self.bursts.len(),
            events
        )
    }
}

impl Render for PopulationTable {
    fn rows(&self) -> Result<Vec<Value>> {
        Ok(self
            .rows
            .iter()
            .map(|r| {
                serde_json::json!({
                    "content_id": r.content_id,
                    "metric": self.metric,
                    "value": r.value,
                })
            })
            .collect())
    }

    fn markdown(&self) -> String {
        let mut out = format!("| content | {} |\n|---|---|\n", self.metric);
        for r in &self.rows {
            out.push_str(&format!("| {} | {} |\n", r.content_id, cell(r.value)));
        }
        out
    }

    fn summary(&self) -> String {
        let defined = self.defined_values();
        format!(
            "{}: {} entities, {} with a value, mean {}",
            self.metric,
            self.rows.len(),
            defined.len(),
            cell(rc_math::mean(&defined))
        )
    }
}

impl Render for CommunityTables {
    fn rows(&self) -> Result<Vec<Value>> {
        Ok(self
            .communities
            .iter()
            .flat_map(|(community, table)| {
                table.rows.iter().map(move |r| {
                    serde_json::json!({
                        "community": community,
                        "content_id": r.content_id,
                        "metric": self.metric,
                        "value": r.value,
                    })
                })
            })
            .collect())
    }

    fn markdown(&self) -> String {
        let mut out = format!("| community | content | {} |\n|---|---|---|\n", self.metric);
        for (community, table) in &self.communities {
            for r in &table.rows {
                out.push_str(&format!(
                    "| {} | {} | {} |\n",
                    community,
                    r.content_id,
                    cell(r.value)
                ));
            }
        }
        out
    }

    fn summary(&self) -> String {
        let parts: Vec<String> = self
            .communities
            .iter()
            .map(|(community, table)| {
                format!(
                    "{}={}",
                    community,
                    cell(rc_math::mean(&table.defined_values()))
                )
            })
            .collect();
        format!("{} by community (mean): {}", self.metric, parts.join(", "))
    }
}

#[derive(Debug, Serialize)]
pub struct MetricInfo {
    pub name: &'static str,
    pub alias: &'static str,
    pub description: &'static str,
}

/// Metric catalogue from `metrics`.
#[derive(Debug, Serialize)]
pub struct MetricCatalogue {
    pub metrics: Vec<MetricInfo>,
}

impl MetricCatalogue {
    pub fn new() -> Self {
        MetricCatalogue {
            metrics: Metric::ALL
                .iter()
                .map(|m| MetricInfo {
                    name: m.name(),
                    alias: m.alias(),
                    description: m.description(),
                })
                .collect(),
        }
    }
}

impl Default for MetricCatalogue {
    fn default() -> Self {
        Self::new()
    }
}

impl Render for MetricCatalogue {
    fn rows(&self) -> Result<Vec<Value>> {
        to_rows(&self.metrics)
    }

    fn markdown(&self) -> String {
        let mut out = String::from("| metric | alias | description |\n|---|---|---|\n");
        for m in &self.metrics {
            out.push_str(&format!("| {} | {} | {} |\n", m.name, m.alias, m.description));
        }
        out
    }

    fn summary(&self) -> String {
        self.metrics
            .iter()
            .map(|m| m.name)
            .collect::<Vec<_>>()
            .join(" ")
    }
}
