//! Burst-level statistics over intervals and their event groups.
//!
//! Every statistic except [`BurstStatistics::burst_count`] returns `None`
//! when it has nothing to average over. Means over burst groups skip empty
//! groups, so an interval whose epochs held no attributable event does not
//! drag a size or share toward zero.

use std::collections::{HashMap, HashSet};

use rc_common::Event;
use rc_math::{burstiness, mean};

use super::interval::BurstInterval;

/// Gaps in days between consecutive intervals.
pub fn gap_days(intervals: &[BurstInterval]) -> Vec<f64> {
    intervals
        .windows(2)
        .map(|pair| pair[0].gap_days_to(&pair[1]))
        .collect()
}

/// Read-only statistics view.
#[derive(Debug, Clone, Copy)]
pub struct BurstStatistics<'a> {
    intervals: &'a [BurstInterval],
    gaps: &'a [f64],
    groups: &'a [Vec<usize>],
    events: &'a [Event],
}

impl<'a> BurstStatistics<'a> {
    /// `groups` index into `events`, one group per interval; `gaps` is
    /// [`gap_days`] of `intervals`.
    pub fn new(
        intervals: &'a [BurstInterval],
        gaps: &'a [f64],
        groups: &'a [Vec<usize>],
        events: &'a [Event],
    ) -> Self {
        BurstStatistics {
            intervals,
            gaps,
            groups,
            events,
        }
    }

    fn filled_groups(&self) -> impl Iterator<Item = &'a [usize]> {
        self.groups
            .iter()
            .filter(|g| !g.is_empty())
            .map(Vec::as_slice)
    }

    fn per_group<F>(&self, f: F) -> Option<f64>
    where
        F: Fn(&'a [usize]) -> f64,
    {
        let values: Vec<f64> = self.filled_groups().map(f).collect();
        mean(&values)
    }

    pub fn burst_count(&self) -> usize {
        self.intervals.len()
    }

    pub fn mean_gap_days(&self) -> Option<f64> {
        mean(self.gaps)
    }

    pub fn mean_burst_size(&self) -> Option<f64> {
        self.per_group(|g| g.len() as f64)
    }

    pub fn mean_unique_users_per_burst(&self) -> Option<f64> {
        self.per_group(|g| {
            g.iter()
                .map(|&i| self.events[i].user_id.as_str())
                .collect::<HashSet<_>>()
                .len() as f64
        })
    }

    /// `(σ − μ) / (σ + μ)` of the gaps; `None` with fewer than two bursts.
    pub fn burstiness_coefficient(&self) -> Option<f64> {
        burstiness(self.gaps)
    }

    /// Mean count of users first seen in each burst, in burst order.
    pub fn mean_new_users_per_burst(&self) -> Option<f64> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut fresh = Vec::new();
        for group in self.filled_groups() {
            let mut count = 0usize;
            for &i in group {
                if seen.insert(self.events[i].user_id.as_str()) {
                    count += 1;
                }
            }
            fresh.push(count as f64);
        }
        mean(&fresh)
    }

    pub fn mean_burst_lifetime_minutes(&self) -> Option<f64> {
        let lifetimes: Vec<f64> = self
            .intervals
            .iter()
            .map(BurstInterval::lifetime_minutes)
            .collect();
        mean(&lifetimes)
    }

    /// Mean share of each burst taken by its most frequent platform.
    pub fn mean_top_platform_share(&self) -> Option<f64> {
        self.per_group(|g| {
            let mut counts: HashMap<&str, usize> = HashMap::new();
            for &i in g {
                *counts.entry(self.events[i].platform.as_str()).or_default() += 1;
            }
            let top = counts.values().copied().max().unwrap_or(0);
            top as f64 / g.len() as f64
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day)
    }

    fn ev(id: &str, day: i64, user: &str, platform: &str) -> Event {
        Event::new(id, t(day), user, platform, "x")
    }

    struct Fixture {
        intervals: Vec<BurstInterval>,
        gaps: Vec<f64>,
        groups: Vec<Vec<usize>>,
        events: Vec<Event>,
    }

    impl Fixture {
        fn new(intervals: Vec<BurstInterval>, groups: Vec<Vec<usize>>, events: Vec<Event>) -> Self {
            let gaps = gap_days(&intervals);
            Fixture {
                intervals,
                gaps,
                groups,
                events,
            }
        }

        fn stats(&self) -> BurstStatistics<'_> {
            BurstStatistics::new(&self.intervals, &self.gaps, &self.groups, &self.events)
        }
    }

    fn two_bursts() -> Fixture {
        let events = vec![
            ev("1", 1, "A", "twitter"),
            ev("2", 1, "B", "twitter"),
            ev("3", 5, "B", "reddit"),
            ev("4", 5, "C", "twitter"),
            ev("5", 6, "D", "reddit"),
            ev("6", 6, "D", "reddit"),
        ];
        Fixture::new(
            vec![
                BurstInterval::new(t(1), t(2)),
                BurstInterval::new(t(5), t(7)),
            ],
            vec![vec![0, 1], vec![2, 3, 4, 5]],
            events,
        )
    }

    #[test]
    fn empty_interval_list_has_no_values() {
        let f = Fixture::new(vec![], vec![], vec![ev("1", 0, "A", "x")]);
        let s = f.stats();
        assert_eq!(s.burst_count(), 0);
        assert_eq!(s.mean_gap_days(), None);
        assert_eq!(s.mean_burst_size(), None);
        assert_eq!(s.mean_unique_users_per_burst(), None);
        assert_eq!(s.burstiness_coefficient(), None);
        assert_eq!(s.mean_new_users_per_burst(), None);
        assert_eq!(s.mean_burst_lifetime_minutes(), None);
        assert_eq!(s.mean_top_platform_share(), None);
    }

    #[test]
    fn new_users_counts_first_appearance() {
        let f = two_bursts();
        // {A,B} then {B,C,D}: 2 new, then 2 new
        assert_eq!(f.stats().mean_new_users_per_burst(), Some(2.0));
    }

    #[test]
    fn sizes_and_reach() {
        let f = two_bursts();
        let s = f.stats();
        assert_eq!(s.burst_count(), 2);
        assert_eq!(s.mean_burst_size(), Some(3.0));
        assert_eq!(s.mean_unique_users_per_burst(), Some(2.5));
    }

    #[test]
    fn timing() {
        let f = two_bursts();
        let s = f.stats();
        assert_eq!(s.mean_gap_days(), Some(3.0));
        assert_eq!(s.mean_burst_lifetime_minutes(), Some((1440.0 + 2880.0) / 2.0));
        // single gap: σ = 0
        assert_eq!(s.burstiness_coefficient(), Some(-1.0));
    }

    #[test]
    fn top_platform_share() {
        let f = two_bursts();
        // burst 1: 2/2 twitter; burst 2: 3/4 reddit
        assert_eq!(f.stats().mean_top_platform_share(), Some((1.0 + 0.75) / 2.0));
    }

    #[test]
    fn empty_groups_are_skipped_in_group_means() {
        let events = vec![ev("1", 1, "A", "p"), ev("2", 1, "B", "p")];
        let f = Fixture::new(
            vec![
                BurstInterval::new(t(1), t(2)),
                BurstInterval::new(t(4), t(5)),
            ],
            vec![vec![0, 1], vec![]],
            events,
        );
        let s = f.stats();
        assert_eq!(s.burst_count(), 2);
        assert_eq!(s.mean_burst_size(), Some(2.0));
        assert_eq!(s.mean_burst_lifetime_minutes(), Some(1440.0));
    }

    #[test]
    fn irregular_gaps_are_bursty() {
        let intervals = vec![
            BurstInterval::new(t(0), t(1)),
            BurstInterval::new(t(1), t(2)),
            BurstInterval::new(t(2), t(3)),
            BurstInterval::new(t(40), t(41)),
        ];
        let f = Fixture::new(intervals, vec![vec![], vec![], vec![], vec![]], vec![]);
        let b = f.stats().burstiness_coefficient().unwrap();
        assert!(b > 0.0 && b <= 1.0);
    }
}
