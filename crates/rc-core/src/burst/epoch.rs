//! Epoch aggregation: events → contiguous fixed-width count buckets.

use chrono::{DateTime, Duration, Utc};
use rc_common::Event;
use rc_config::Granularity;
use serde::Serialize;
use thiserror::Error;

/// Upper bound on the number of epochs in one series.
///
/// About 11.5 days at one-second granularity or 1.9 years at one minute.
/// Longer spans need a coarser granularity.
pub const MAX_EPOCHS: usize = 1_000_000;

/// Errors from epoch aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EpochError {
    #[error("need at least 2 events to bucket, got {events}")]
    InsufficientEvents { events: usize },
    #[error("event span needs {epochs} epochs at {granularity}, limit is {}", MAX_EPOCHS)]
    TooManyEpochs { epochs: u64, granularity: String },
}

/// One fixed-width time bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpochBucket {
    /// 0-based position in the series.
    pub index: usize,
    /// Inclusive start of the bucket.
    pub start: DateTime<Utc>,
    /// Distinct event ids in the bucket.
    pub event_count: u64,
    /// Distinct user ids in the bucket.
    pub unique_user_count: u64,
}

/// Contiguous, equal-width epochs covering every event.
#[derive(Debug, Clone, Serialize)]
pub struct EpochSeries {
    granularity: Granularity,
    buckets: Vec<EpochBucket>,
}

impl EpochSeries {
    pub fn buckets(&self) -> &[EpochBucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Epoch width.
    pub fn width(&self) -> Duration {
        self.granularity.width()
    }

    /// Event count per epoch, the solver input.
    pub fn event_counts(&self) -> Vec<u64> {
        self.buckets.iter().map(|b| b.event_count).collect()
    }

    /// Start timestamp of every epoch.
    pub fn starts(&self) -> Vec<DateTime<Utc>> {
        self.buckets.iter().map(|b| b.start).collect()
    }
}

/// Bucket events into epochs of the given width.
///
/// Epochs run from the aligned start of the earliest event through the
/// epoch holding the latest one; empty epochs are kept with zero counts.
pub fn aggregate(events: &[Event], granularity: Granularity) -> Result<EpochSeries, EpochError> {
    if events.len() < 2 {
        return Err(EpochError::InsufficientEvents {
            events: events.len(),
        });
    }

    let first = events.iter().map(|e| e.timestamp).min().unwrap_or_default();
    let last = events.iter().map(|e| e.timestamp).max().unwrap_or_default();
    let start = granularity.align_start(first);
    let width = granularity.seconds();

    let span_epochs = (last - start).num_seconds().div_euclid(width) as u64 + 1;
    if span_epochs > MAX_EPOCHS as u64 {
        return Err(EpochError::TooManyEpochs {
            epochs: span_epochs,
            granularity: granularity.to_string(),
        });
    }
    let n = span_epochs as usize;

    let epoch_of = |e: &Event| (e.timestamp - start).num_seconds().div_euclid(width) as usize;
    let event_counts = distinct_per_epoch(n, events.iter().map(|e| (epoch_of(e), e.id.as_str())));
    let user_counts =
        distinct_per_epoch(n, events.iter().map(|e| (epoch_of(e), e.user_id.as_str())));

    let buckets = event_counts
        .into_iter()
        .zip(user_counts)
        .enumerate()
        .map(|(index, (event_count, unique_user_count))| EpochBucket {
            index,
            start: start + Duration::seconds(index as i64 * width),
            event_count,
            unique_user_count,
        })
        .collect();

    Ok(EpochSeries {
        granularity,
        buckets,
    })
}

/// Number of distinct keys per epoch, from a sorted pass over `(epoch, key)`.
///
/// Memory is linear in the number of pairs, not in epochs times keys.
fn distinct_per_epoch<'a>(n: usize, pairs: impl Iterator<Item = (usize, &'a str)>) -> Vec<u64> {
    let mut pairs: Vec<(usize, &str)> = pairs.collect();
    pairs.sort_unstable();
    pairs.dedup();
    let mut counts = vec![0u64; n];
    for (epoch, _) in pairs {
        counts[epoch] += 1;
    }
    counts
}
