//! Property-based tests for the burst pipeline.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rc_common::{ContentId, Event};
use rc_config::{Granularity, SolverParams};
use rc_core::burst::{attribute, build_intervals, BurstInterval, BurstStateSolver};
use rc_core::{ContentSeries, Metric};

fn origin() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn daily_starts(n: usize) -> Vec<DateTime<Utc>> {
    (0..n).map(|i| origin() + Duration::days(i as i64)).collect()
}

fn counts_strategy() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..60, 2..40)
}

fn params_strategy() -> impl Strategy<Value = SolverParams> {
    (1.1f64..4.0, 0.05f64..2.0).prop_map(|(s, gamma)| SolverParams { s, gamma })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn chosen_path_never_costs_more_than_flat(counts in counts_strategy(), params in params_strategy()) {
        let solver = BurstStateSolver::new(params).unwrap();
        let path = solver.solve(&counts).unwrap();
        let flat = solver.path_cost(&counts, &vec![0; counts.len()]);
        prop_assert!(path.cost <= flat + 1e-9 * flat.abs().max(1.0));
        prop_assert_eq!(path.states.len(), counts.len());
    }

    #[test]
    fn solve_is_bit_identical_across_runs(counts in counts_strategy(), params in params_strategy()) {
        let solver = BurstStateSolver::new(params).unwrap();
        let a = solver.solve(&counts).unwrap();
        let b = solver.solve(&counts).unwrap();
        prop_assert_eq!(&a.states, &b.states);
        prop_assert_eq!(a.cost.to_bits(), b.cost.to_bits());
    }

    #[test]
    fn constant_series_has_no_bursts(value in 0u64..100, n in 2usize..50) {
        let path = BurstStateSolver::default().solve(&vec![value; n]).unwrap();
        prop_assert!(path.is_flat());
    }

    #[test]
    fn intervals_are_sorted_and_disjoint(states in prop::collection::vec(0usize..4, 1..60)) {
        let starts = daily_starts(states.len());
        let intervals = build_intervals(&states, &starts, Duration::days(1));
        for iv in &intervals {
            prop_assert!(iv.begin < iv.end);
        }
        for pair in intervals.windows(2) {
            prop_assert!(pair[0].end <= pair[1].begin);
            prop_assert!(pair[0].begin < pair[1].begin);
        }
        let runs = states
            .iter()
            .enumerate()
            .filter(|&(i, &s)| s >= 1 && (i == 0 || states[i - 1] == 0))
            .count();
        prop_assert_eq!(intervals.len(), runs);
    }

    #[test]
    fn attribution_partitions_events(
        states in prop::collection::vec(0usize..3, 2..30),
        offsets in prop::collection::vec(0i64..(30 * 86_400), 0..200),
    ) {
        let starts = daily_starts(states.len());
        let intervals = build_intervals(&states, &starts, Duration::days(1));
        let timestamps: Vec<DateTime<Utc>> =
            offsets.iter().map(|&s| origin() + Duration::seconds(s)).collect();
        let attribution = attribute(timestamps.iter().copied(), &intervals);

        let mut seen = vec![0usize; timestamps.len()];
        for (b, group) in attribution.groups.iter().enumerate() {
            prop_assert!(group.windows(2).all(|w| w[0] < w[1]));
            for &i in group {
                prop_assert!(intervals[b].contains(timestamps[i]));
                seen[i] += 1;
            }
        }
        for &i in &attribution.unassigned {
            prop_assert!(intervals.iter().all(|iv| !iv.contains(timestamps[i])));
            seen[i] += 1;
        }
        prop_assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn statistics_stay_in_range(counts in prop::collection::vec(0u64..30, 2..25)) {
        let mut events = Vec::new();
        for (d, &n) in counts.iter().enumerate() {
            for k in 0..n {
                events.push(Event::new(
                    format!("{d}-{k}"),
                    origin() + Duration::days(d as i64) + Duration::minutes(k as i64),
                    format!("u{}", k % 5),
                    if k % 2 == 0 { "a" } else { "b" },
                    "c",
                ));
            }
        }
        let series = ContentSeries::new(
            ContentId::new("c"),
            events,
            Granularity::daily(),
            &BurstStateSolver::default(),
        );
        if let Some(b) = series.metric(Metric::BurstinessCoefficient) {
            prop_assert!((-1.0..=1.0).contains(&b));
        }
        if let Some(share) = series.metric(Metric::MeanTopPlatformShare) {
            prop_assert!(share >= 0.5 && share <= 1.0);
        }
        if let Some(gap) = series.metric(Metric::MeanGapDays) {
            prop_assert!(gap >= 1.0);
        }
        if let (Some(new), Some(users)) = (
            series.metric(Metric::MeanNewUsersPerBurst),
            series.metric(Metric::MeanUniqueUsersPerBurst),
        ) {
            prop_assert!(new <= users + 1e-12);
        }
    }
}

#[test]
fn event_at_begin_is_in_and_event_at_end_is_out() {
    let starts = daily_starts(5);
    let intervals = build_intervals(&[0, 1, 1, 0, 0], &starts, Duration::days(1));
    assert_eq!(intervals, vec![BurstInterval::new(starts[1], starts[3])]);

    let stamps = vec![
        starts[1],
        starts[3],
        starts[3] - Duration::milliseconds(1),
        starts[1] - Duration::milliseconds(1),
    ];
    let a = attribute(stamps, &intervals);
    assert_eq!(a.assignments, vec![Some(0), None, Some(0), None]);
}

#[test]
fn boundary_convention_affects_burst_size() {
    // one event sits exactly on the end of the burst and is excluded
    let mut events = Vec::new();
    let counts = [1, 1, 1, 20, 22, 19, 0, 1, 1];
    for (d, &n) in counts.iter().enumerate() {
        for k in 0..n {
            events.push(Event::new(
                format!("{d}-{k}"),
                origin() + Duration::days(d as i64) + Duration::hours(1 + k as i64 % 20),
                format!("u{k}"),
                "p",
                "c",
            ));
        }
    }
    events.push(Event::new("edge", origin() + Duration::days(6), "edge-user", "p", "c"));
    let series = ContentSeries::new(
        ContentId::new("c"),
        events,
        Granularity::daily(),
        &BurstStateSolver::default(),
    );
    assert_eq!(
        series.intervals(),
        &[BurstInterval::new(origin() + Duration::days(3), origin() + Duration::days(6))]
    );
    assert_eq!(series.metric(Metric::MeanBurstSize), Some(61.0));
    let last = series.events().len() - 1;
    assert_eq!(series.burst_index(last), None);
}
