//! One content entity's burst analysis, computed once at construction.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use rc_common::{ContentId, Event};
use rc_config::Granularity;
use serde::Serialize;

use crate::burst::{
    aggregate, attribute, build_intervals, gap_days, Attribution, BurstInterval, BurstStateSolver,
    BurstStatistics, EpochError, EpochSeries, Metric, StatePath,
};
use crate::logging::{event_names, Stage};

/// Outcome of running the burst pipeline for one entity.
#[derive(Debug, Clone)]
pub enum Detection {
    /// Too little data to detect bursts; every statistic is "no value".
    Insufficient { events: usize, epochs: usize },
    /// The pipeline failed for this entity only.
    Failed { reason: String },
    Detected {
        path: StatePath,
        intervals: Vec<BurstInterval>,
        attribution: Attribution,
    },
}

impl Detection {
    pub fn status(&self) -> &'static str {
        match self {
            Detection::Insufficient { .. } => "insufficient",
            Detection::Failed { .. } => "failed",
            Detection::Detected { .. } => "detected",
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, Detection::Detected { .. })
    }
}

/// Every statistic for one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurstSummary {
    pub content_id: ContentId,
    pub status: &'static str,
    pub events: usize,
    pub epochs: usize,
    pub burst_count: Option<usize>,
    pub mean_gap_days: Option<f64>,
    pub mean_burst_size: Option<f64>,
    pub mean_unique_users_per_burst: Option<f64>,
    pub burstiness_coefficient: Option<f64>,
    pub mean_new_users_per_burst: Option<f64>,
    pub mean_burst_lifetime_minutes: Option<f64>,
    pub mean_top_platform_share: Option<f64>,
    pub unassigned_events: usize,
}

/// One burst with its group-level figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurstDetail {
    pub index: usize,
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub lifetime_minutes: f64,
    pub events: usize,
    pub unique_users: usize,
    /// Highest solver level among the burst's epochs.
    pub peak_level: usize,
}

/// Events, epochs, intervals and event grouping of one content entity.
#[derive(Debug)]
pub struct ContentSeries {
    content_id: ContentId,
    events: Vec<Event>,
    epochs: Option<EpochSeries>,
    detection: Detection,
    gaps: OnceLock<Vec<f64>>,
}

impl ContentSeries {
    /// Run the full pipeline for `events`.
    ///
    /// Never fails: entities without enough data, or whose pipeline errors,
    /// degrade to a non-detected state so that one entity cannot abort a batch.
    pub fn new(
        content_id: ContentId,
        events: Vec<Event>,
        granularity: Granularity,
        solver: &BurstStateSolver,
    ) -> Self {
        let epochs = match aggregate(&events, granularity) {
            Ok(series) => series,
            Err(EpochError::InsufficientEvents { events: n }) => {
                tracing::warn!(
                    event = event_names::SERIES_INSUFFICIENT,
                    stage = %Stage::Aggregate,
                    content_id = %content_id,
                    events = n,
                    "not enough events for burst detection"
                );
                return Self::degraded(
                    content_id,
                    events,
                    None,
                    Detection::Insufficient {
                        events: n,
                        epochs: 0,
                    },
                );
            }
            Err(err) => {
                let reason = err.to_string();
                tracing::warn!(
                    event = event_names::SERIES_FAILED,
                    stage = %Stage::Aggregate,
                    content_id = %content_id,
                    reason = %reason,
                    "epoch aggregation failed"
                );
                return Self::degraded(content_id, events, None, Detection::Failed { reason });
            }
        };

        if epochs.len() < 2 {
            tracing::warn!(
                event = event_names::SERIES_INSUFFICIENT,
                stage = %Stage::Aggregate,
                content_id = %content_id,
                events = events.len(),
                epochs = epochs.len(),
                "all events fall in a single epoch"
            );
            let detection = Detection::Insufficient {
                events: events.len(),
                epochs: epochs.len(),
            };
            return Self::degraded(content_id, events, Some(epochs), detection);
        }

        let path = match solver.solve(&epochs.event_counts()) {
            Ok(path) => path,
            Err(err) => {
                let reason = err.to_string();
                tracing::warn!(
                    event = event_names::SERIES_FAILED,
                    stage = %Stage::Detect,
                    content_id = %content_id,
                    reason = %reason,
                    "burst state solve failed"
                );
                return Self::degraded(content_id, events, Some(epochs), Detection::Failed { reason });
            }
        };

        let intervals = build_intervals(&path.states, &epochs.starts(), epochs.width());
        tracing::debug!(
            event = event_names::SERIES_DETECTED,
            stage = %Stage::Detect,
            content_id = %content_id,
            epochs = epochs.len(),
            levels = path.levels,
            peak = path.max_level(),
            bursts = intervals.len(),
            "burst detection complete"
        );

        let attribution = attribute(events.iter().map(|e| e.timestamp), &intervals);
        tracing::trace!(
            event = event_names::SERIES_ATTRIBUTED,
            stage = %Stage::Attribute,
            content_id = %content_id,
            events = events.len(),
            unassigned = attribution.unassigned.len(),
            "events attributed to bursts"
        );

        ContentSeries {
            content_id,
            events,
            epochs: Some(epochs),
            detection: Detection::Detected {
                path,
                intervals,
                attribution,
            },
            gaps: OnceLock::new(),
        }
    }

    fn degraded(
        content_id: ContentId,
        events: Vec<Event>,
        epochs: Option<EpochSeries>,
        detection: Detection,
    ) -> Self {
        ContentSeries {
            content_id,
            events,
            epochs,
            detection,
            gaps: OnceLock::new(),
        }
    }

    pub fn content_id(&self) -> &ContentId {
        &self.content_id
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn epochs(&self) -> Option<&EpochSeries> {
        self.epochs.as_ref()
    }

    pub fn detection(&self) -> &Detection {
        &self.detection
    }

    /// Burst intervals, empty unless detected.
    pub fn intervals(&self) -> &[BurstInterval] {
        match &self.detection {
            Detection::Detected { intervals, .. } => intervals,
            _ => &[],
        }
    }

    /// Events grouped per burst.
    pub fn burst_groups(&self) -> Vec<Vec<&Event>> {
        match &self.detection {
            Detection::Detected { attribution, .. } => attribution
                .groups
                .iter()
                .map(|g| g.iter().map(|&i| &self.events[i]).collect())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Events outside every burst. Every event when not detected.
    pub fn unassigned_events(&self) -> Vec<&Event> {
        match &self.detection {
            Detection::Detected { attribution, .. } => attribution
                .unassigned
                .iter()
                .map(|&i| &self.events[i])
                .collect(),
            _ => self.events.iter().collect(),
        }
    }

    /// Burst index of the event at `position`, as given at construction.
    pub fn burst_index(&self, position: usize) -> Option<usize> {
        match &self.detection {
            Detection::Detected { attribution, .. } => {
                attribution.assignments.get(position).copied().flatten()
            }
            _ => None,
        }
    }

    /// Days between consecutive bursts, computed on first use.
    pub fn gap_distribution(&self) -> &[f64] {
        self.gaps.get_or_init(|| gap_days(self.intervals()))
    }

    /// Statistics view; `None` unless detected.
    pub fn statistics(&self) -> Option<BurstStatistics<'_>> {
        match &self.detection {
            Detection::Detected {
                intervals,
                attribution,
                ..
            } => Some(BurstStatistics::new(
                intervals,
                self.gap_distribution(),
                &attribution.groups,
                &self.events,
            )),
            _ => None,
        }
    }

    /// Value of one statistic; `None` means "no value".
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.statistics().and_then(|s| metric.evaluate(&s))
    }

    pub fn summary(&self) -> BurstSummary {
        let stats = self.statistics();
        let get = |m: Metric| stats.as_ref().and_then(|s| m.evaluate(s));
        BurstSummary {
            content_id: self.content_id.clone(),
            status: self.detection.status(),
            events: self.events.len(),
            epochs: self.epochs.as_ref().map_or(0, EpochSeries::len),
            burst_count: stats.as_ref().map(|s| s.burst_count()),
            mean_gap_days: get(Metric::MeanGapDays),
            mean_burst_size: get(Metric::MeanBurstSize),
            mean_unique_users_per_burst: get(Metric::MeanUniqueUsersPerBurst),
            burstiness_coefficient: get(Metric::BurstinessCoefficient),
            mean_new_users_per_burst: get(Metric::MeanNewUsersPerBurst),
            mean_burst_lifetime_minutes: get(Metric::MeanBurstLifetimeMinutes),
            mean_top_platform_share: get(Metric::MeanTopPlatformShare),
            unassigned_events: self.unassigned_events().len(),
        }
    }

    /// Per-burst figures in chronological order.
    pub fn burst_details(&self) -> Vec<BurstDetail> {
        let (path, intervals, attribution) = match &self.detection {
            Detection::Detected {
                path,
                intervals,
                attribution,
            } => (path, intervals, attribution),
            _ => return Vec::new(),
        };
        let starts = self.epochs.as_ref().map(EpochSeries::starts).unwrap_or_default();

        intervals
            .iter()
            .zip(&attribution.groups)
            .enumerate()
            .map(|(index, (iv, group))| {
                let peak_level = starts
                    .iter()
                    .zip(&path.states)
                    .filter(|(start, _)| iv.contains(**start))
                    .map(|(_, &level)| level)
                    .max()
                    .unwrap_or(0);
                let unique_users = group
                    .iter()
                    .map(|&i| self.events[i].user_id.as_str())
                    .collect::<std::collections::HashSet<_>>()
                    .len();
                BurstDetail {
                    index,
                    begin: iv.begin,
                    end: iv.end,
                    lifetime_minutes: iv.lifetime_minutes(),
                    events: group.len(),
                    unique_users,
                    peak_level,
                }
            })
            .collect()
    }
}
