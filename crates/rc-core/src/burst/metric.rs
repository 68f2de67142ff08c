//! Named burst statistics.

use std::fmt;
use std::str::FromStr;

use rc_common::Error;
use serde::{Deserialize, Serialize};

use super::stats::BurstStatistics;

/// A statistic selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    BurstCount,
    MeanGapDays,
    MeanBurstSize,
    MeanUniqueUsersPerBurst,
    BurstinessCoefficient,
    MeanNewUsersPerBurst,
    MeanBurstLifetimeMinutes,
    MeanTopPlatformShare,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::BurstCount,
        Metric::MeanGapDays,
        Metric::MeanBurstSize,
        Metric::MeanUniqueUsersPerBurst,
        Metric::BurstinessCoefficient,
        Metric::MeanNewUsersPerBurst,
        Metric::MeanBurstLifetimeMinutes,
        Metric::MeanTopPlatformShare,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::BurstCount => "burst_count",
            Metric::MeanGapDays => "mean_gap_days",
            Metric::MeanBurstSize => "mean_burst_size",
            Metric::MeanUniqueUsersPerBurst => "mean_unique_users_per_burst",
            Metric::BurstinessCoefficient => "burstiness_coefficient",
            Metric::MeanNewUsersPerBurst => "mean_new_users_per_burst",
            Metric::MeanBurstLifetimeMinutes => "mean_burst_lifetime_minutes",
            Metric::MeanTopPlatformShare => "mean_top_platform_share",
        }
    }

    /// Name used by the older measurement suite.
    pub fn alias(&self) -> &'static str {
        match self {
            Metric::BurstCount => "number_of_bursts",
            Metric::MeanGapDays => "time_between_bursts",
            Metric::MeanBurstSize => "average_size_of_each_burst",
            Metric::MeanUniqueUsersPerBurst => "average_number_of_users_per_burst",
            Metric::BurstinessCoefficient => "burstiness_of_burst_timing",
            Metric::MeanNewUsersPerBurst => "new_users_per_burst",
            Metric::MeanBurstLifetimeMinutes => "lifetime_of_each_burst",
            Metric::MeanTopPlatformShare => "average_proportion_of_top_platform_per_burst",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Metric::BurstCount => "number of detected bursts",
            Metric::MeanGapDays => "mean days between the end of a burst and the start of the next",
            Metric::MeanBurstSize => "mean events per burst",
            Metric::MeanUniqueUsersPerBurst => "mean distinct users per burst",
            Metric::BurstinessCoefficient => "(std - mean) / (std + mean) of inter-burst gaps",
            Metric::MeanNewUsersPerBurst => "mean users per burst not seen in an earlier burst",
            Metric::MeanBurstLifetimeMinutes => "mean burst duration in minutes",
            Metric::MeanTopPlatformShare => "mean share of each burst taken by its top platform",
        }
    }

    /// Evaluate against a statistics view.
    pub fn evaluate(&self, stats: &BurstStatistics<'_>) -> Option<f64> {
        match self {
            Metric::BurstCount => Some(stats.burst_count() as f64),
            Metric::MeanGapDays => stats.mean_gap_days(),
            Metric::MeanBurstSize => stats.mean_burst_size(),
            Metric::MeanUniqueUsersPerBurst => stats.mean_unique_users_per_burst(),
            Metric::BurstinessCoefficient => stats.burstiness_coefficient(),
            Metric::MeanNewUsersPerBurst => stats.mean_new_users_per_burst(),
            Metric::MeanBurstLifetimeMinutes => stats.mean_burst_lifetime_minutes(),
            Metric::MeanTopPlatformShare => stats.mean_top_platform_share(),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.name() == key || m.alias() == key)
            .ok_or_else(|| Error::UnknownMetric(s.to_string()))
    }
}
