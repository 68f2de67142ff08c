//! Event → burst attribution.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::interval::BurstInterval;

/// Grouping of events by the burst interval containing them.
///
/// Indices refer to positions in the event slice passed to [`attribute`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Attribution {
    /// Burst index per event, `None` when outside every interval.
    pub assignments: Vec<Option<usize>>,
    /// Event indices per burst, in input order. One group per interval.
    pub groups: Vec<Vec<usize>>,
    /// Event indices outside every interval, in input order.
    pub unassigned: Vec<usize>,
}

/// Index of the interval containing `ts`, if any.
///
/// `intervals` must be sorted and non-overlapping.
pub fn locate(intervals: &[BurstInterval], ts: DateTime<Utc>) -> Option<usize> {
    // first interval whose end is strictly after ts
    let idx = intervals.partition_point(|iv| iv.end <= ts);
    intervals
        .get(idx)
        .filter(|iv| iv.contains(ts))
        .map(|_| idx)
}

/// Attribute every timestamp to at most one interval.
pub fn attribute<I>(timestamps: I, intervals: &[BurstInterval]) -> Attribution
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut out = Attribution {
        assignments: Vec::new(),
        groups: vec![Vec::new(); intervals.len()],
        unassigned: Vec::new(),
    };
    for (i, ts) in timestamps.into_iter().enumerate() {
        let slot = locate(intervals, ts);
        match slot {
            Some(b) => out.groups[b].push(i),
            None => out.unassigned.push(i),
        }
        out.assignments.push(slot);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() + Duration::hours(h)
    }

    fn intervals() -> Vec<BurstInterval> {
        vec![
            BurstInterval::new(t(10), t(20)),
            BurstInterval::new(t(30), t(40)),
        ]
    }

    #[test]
    fn boundaries_are_inclusive_then_exclusive() {
        let ivs = intervals();
        assert_eq!(locate(&ivs, t(10)), Some(0));
        assert_eq!(locate(&ivs, t(20)), None);
        assert_eq!(locate(&ivs, t(30)), Some(1));
        assert_eq!(locate(&ivs, t(40)), None);
        assert_eq!(locate(&ivs, t(5)), None);
        assert_eq!(locate(&ivs, t(25)), None);
    }

    #[test]
    fn adjacent_intervals_share_no_event() {
        let ivs = vec![
            BurstInterval::new(t(0), t(5)),
            BurstInterval::new(t(5), t(9)),
        ];
        assert_eq!(locate(&ivs, t(5)), Some(1));
    }

    #[test]
    fn groups_preserve_input_order() {
        let ts = vec![t(35), t(11), t(50), t(12), t(31), t(0)];
        let a = attribute(ts, &intervals());
        assert_eq!(a.groups, vec![vec![1, 3], vec![0, 4]]);
        assert_eq!(a.unassigned, vec![2, 5]);
        assert_eq!(
            a.assignments,
            vec![Some(1), Some(0), None, Some(0), Some(1), None]
        );
    }

    #[test]
    fn no_intervals_means_all_unassigned() {
        let a = attribute(vec![t(1), t(2)], &[]);
        assert!(a.groups.is_empty());
        assert_eq!(a.unassigned, vec![0, 1]);
        assert!(a.assignments.iter().all(Option::is_none));
    }
}
