//! Burst intervals: maximal runs of elevated epochs as half-open time spans.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// A half-open `[begin, end)` span of elevated activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct BurstInterval {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BurstInterval {
    pub fn new(begin: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        BurstInterval { begin, end }
    }

    /// Inclusive at `begin`, exclusive at `end`.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.begin <= ts && ts < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.begin
    }

    pub fn lifetime_minutes(&self) -> f64 {
        duration_seconds(self.duration()) / 60.0
    }

    /// Days from the end of `self` to the beginning of `next`.
    pub fn gap_days_to(&self, next: &BurstInterval) -> f64 {
        duration_seconds(next.begin - self.end) / SECONDS_PER_DAY
    }
}

/// Fractional seconds of a chrono duration.
pub(crate) fn duration_seconds(d: Duration) -> f64 {
    d.num_milliseconds() as f64 / 1000.0
}

/// Collapse runs of `state >= 1` into intervals.
///
/// `starts` holds one epoch start per state. A run ending mid-series ends
/// at the next epoch's start; a run reaching the end of the series ends at
/// the last start plus `width`.
pub fn build_intervals(
    states: &[usize],
    starts: &[DateTime<Utc>],
    width: Duration,
) -> Vec<BurstInterval> {
    let n = states.len().min(starts.len());
    let mut intervals = Vec::new();
    let mut run_start: Option<usize> = None;

    for i in 0..n {
        match (states[i] >= 1, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(begin)) => {
                intervals.push(BurstInterval::new(starts[begin], starts[i]));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(begin) = run_start {
        intervals.push(BurstInterval::new(starts[begin], starts[n - 1] + width));
    }
    intervals
}
