//! Epoch width parsing and alignment.
//!
//! Accepts dataframe-style frequency aliases (`S`, `T`/`Min`, `H`, `D`, `W`)
//! and plain unit names, each with an optional positive multiplier:
//! `D`, `30Min`, `10min`, `2H`, `hours`.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Base unit of an epoch width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
}

impl TimeUnit {
    /// Length of one unit in seconds.
    pub fn seconds(&self) -> i64 {
        match self {
            TimeUnit::Second => 1,
            TimeUnit::Minute => 60,
            TimeUnit::Hour => 3_600,
            TimeUnit::Day => 86_400,
            TimeUnit::Week => 604_800,
        }
    }

    /// Canonical alias used when printing a granularity.
    pub fn alias(&self) -> &'static str {
        match self {
            TimeUnit::Second => "S",
            TimeUnit::Minute => "Min",
            TimeUnit::Hour => "H",
            TimeUnit::Day => "D",
            TimeUnit::Week => "W",
        }
    }

    fn parse_token(token: &str) -> Option<Self> {
        match token.to_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Some(TimeUnit::Second),
            "t" | "min" | "mins" | "minute" | "minutes" => Some(TimeUnit::Minute),
            "h" | "hr" | "hrs" | "hour" | "hours" => Some(TimeUnit::Hour),
            "d" | "day" | "days" => Some(TimeUnit::Day),
            "w" | "week" | "weeks" => Some(TimeUnit::Week),
            _ => None,
        }
    }
}

/// Errors from granularity parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GranularityError {
    #[error("empty granularity")]
    Empty,
    #[error("granularity multiplier must be positive, got {0}")]
    ZeroMultiplier(String),
    #[error("unknown time unit '{0}'")]
    UnknownUnit(String),
    #[error("granularity multiplier out of range: {0}")]
    Overflow(String),
}

impl From<GranularityError> for rc_common::Error {
    fn from(err: GranularityError) -> Self {
        rc_common::Error::InvalidGranularity(err.to_string())
    }
}

/// Fixed epoch width, e.g. one day or thirty minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Granularity {
    multiplier: u32,
    unit: TimeUnit,
}

impl Granularity {
    /// Largest supported width (ten years of days), keeps nanosecond
    /// arithmetic inside `i64`.
    const MAX_SECONDS: i64 = 3_650 * 86_400;

    pub fn new(multiplier: u32, unit: TimeUnit) -> Result<Self, GranularityError> {
        if multiplier == 0 {
            return Err(GranularityError::ZeroMultiplier(format!("0{}", unit.alias())));
        }
        if multiplier as i64 * unit.seconds() > Self::MAX_SECONDS {
            return Err(GranularityError::Overflow(format!(
                "{}{}",
                multiplier,
                unit.alias()
            )));
        }
        Ok(Granularity { multiplier, unit })
    }

    /// One day, the default epoch width.
    pub fn daily() -> Self {
        Granularity {
            multiplier: 1,
            unit: TimeUnit::Day,
        }
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    /// Width of one epoch in seconds.
    pub fn seconds(&self) -> i64 {
        self.multiplier as i64 * self.unit.seconds()
    }

    /// Width of one epoch.
    pub fn width(&self) -> Duration {
        Duration::seconds(self.seconds())
    }

    /// Start of the epoch containing `first`, with epochs laid out from
    /// midnight UTC of `first`'s day.
    ///
    /// All later epochs are `start + k · width`; they are not re-aligned
    /// to later midnights.
    pub fn align_start(&self, first: DateTime<Utc>) -> DateTime<Utc> {
        let midnight = Utc.from_utc_datetime(&first.date_naive().and_time(NaiveTime::MIN));
        let width = self.seconds();
        let offset = (first - midnight).num_seconds();
        midnight + Duration::seconds(offset.div_euclid(width) * width)
    }
}

impl Default for Granularity {
    fn default() -> Self {
        Self::daily()
    }
}

impl FromStr for Granularity {
    type Err = GranularityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(GranularityError::Empty);
        }
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, token) = s.split_at(split);
        let token = token.trim();
        let unit = TimeUnit::parse_token(token)
            .ok_or_else(|| GranularityError::UnknownUnit(token.to_string()))?;
        let multiplier = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|_| GranularityError::Overflow(s.to_string()))?
        };
        if multiplier == 0 {
            return Err(GranularityError::ZeroMultiplier(s.to_string()));
        }
        Granularity::new(multiplier, unit)
    }
}

impl TryFrom<String> for Granularity {
    type Error = GranularityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Granularity> for String {
    fn from(g: Granularity) -> Self {
        g.to_string()
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multiplier == 1 {
            write!(f, "{}", self.unit.alias())
        } else {
            write!(f, "{}{}", self.multiplier, self.unit.alias())
        }
    }
}
