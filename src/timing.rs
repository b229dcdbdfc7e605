//! Step durations
//!
//! A [`TimeSpan`] is a non-negative span of time. Documents may give it as a
//! bare number of seconds or as a string with a unit (`"250 ms"`, `"5 min"`).
//! All comparisons happen on the exact nanosecond value, so steps authored in
//! different units still line up.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SynthError};

/// `<number> [unit]`, unit optional (seconds)
static SPAN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)\s*([A-Za-z]*)\s*$").unwrap()
});

/// Non-negative span of time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TimeSpan(Duration);

impl TimeSpan {
    pub fn from_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    /// Build from fractional seconds; rejects negative, NaN and overflowing values
    pub fn from_secs_f64(secs: f64) -> Result<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return Err(SynthError::NegativeDuration { seconds: secs });
        }
        Duration::try_from_secs_f64(secs)
            .map(Self)
            .map_err(|_| SynthError::InvalidDuration {
                input: secs.to_string(),
            })
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0.as_secs_f64()
    }

    /// Signed delta for timestamp arithmetic, saturating at `TimeDelta::MAX`
    pub fn as_time_delta(&self) -> TimeDelta {
        TimeDelta::from_std(self.0).unwrap_or(TimeDelta::MAX)
    }
}

impl From<Duration> for TimeSpan {
    fn from(d: Duration) -> Self {
        Self(d)
    }
}

/// Seconds per unit
fn unit_factor(unit: &str) -> Option<f64> {
    let factor = match unit {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => 1.0,
        "ms" | "millisecond" | "milliseconds" => 1e-3,
        "us" | "microsecond" | "microseconds" => 1e-6,
        "min" | "mins" | "minute" | "minutes" => 60.0,
        "h" | "hr" | "hrs" | "hour" | "hours" => 3_600.0,
        "d" | "day" | "days" => 86_400.0,
        _ => return None,
    };
    Some(factor)
}

impl FromStr for TimeSpan {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SynthError::InvalidDuration {
            input: s.to_string(),
        };
        let caps = SPAN_PATTERN.captures(s).ok_or_else(invalid)?;
        let value: f64 = caps[1].parse().map_err(|_| invalid())?;
        let factor = unit_factor(&caps[2].to_ascii_lowercase()).ok_or_else(invalid)?;
        Self::from_secs_f64(value * factor)
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} s", self.as_secs_f64())
    }
}

impl Serialize for TimeSpan {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_secs_f64())
    }
}

/// Handles number OR string for durations
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSpan {
    Seconds(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for TimeSpan {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match RawSpan::deserialize(deserializer)? {
            RawSpan::Seconds(secs) => TimeSpan::from_secs_f64(secs),
            RawSpan::Text(text) => text.parse(),
        }
        .map_err(serde::de::Error::custom)
    }
}
