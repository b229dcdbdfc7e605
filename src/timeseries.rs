//! Process-data time series recorded during a step

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Set points and observed values over process time (seconds)
///
/// An empty `set_time` is allowed with one set value (set at step start) or
/// two (linear ramp across the step).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_value: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub set_time: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value: Vec<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub time: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesIssue {
    #[error("{values} set values but {times} set times")]
    SetLengthMismatch { values: usize, times: usize },

    #[error("{values} set values need explicit set times")]
    SetTimesRequired { values: usize },

    #[error("{values} observed values but {times} observation times")]
    ValueLengthMismatch { values: usize, times: usize },

    #[error("{field} is not monotonically increasing")]
    TimeNotIncreasing { field: &'static str },
}

impl TimeSeries {
    /// Consistency problems, in field order
    pub fn issues(&self) -> Vec<SeriesIssue> {
        let mut issues = Vec::new();

        if self.set_time.is_empty() {
            if self.set_value.len() > 2 {
                issues.push(SeriesIssue::SetTimesRequired {
                    values: self.set_value.len(),
                });
            }
        } else if self.set_time.len() != self.set_value.len() {
            issues.push(SeriesIssue::SetLengthMismatch {
                values: self.set_value.len(),
                times: self.set_time.len(),
            });
        }

        if !self.time.is_empty() && self.time.len() != self.value.len() {
            issues.push(SeriesIssue::ValueLengthMismatch {
                values: self.value.len(),
                times: self.time.len(),
            });
        }

        for (field, times) in [("set_time", &self.set_time), ("time", &self.time)] {
            if times.windows(2).any(|w| w[1] < w[0]) {
                issues.push(SeriesIssue::TimeNotIncreasing { field });
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_set_value_needs_no_time() {
        let series = TimeSeries {
            set_value: vec![873.0],
            ..Default::default()
        };
        assert!(series.issues().is_empty());
    }

    #[test]
    fn ramp_needs_no_time() {
        let series = TimeSeries {
            set_value: vec![300.0, 873.0],
            ..Default::default()
        };
        assert!(series.issues().is_empty());
    }

    #[test]
    fn three_set_values_need_times() {
        let series = TimeSeries {
            set_value: vec![300.0, 873.0, 300.0],
            ..Default::default()
        };
        assert_eq!(series.issues(), vec![SeriesIssue::SetTimesRequired { values: 3 }]);
    }

    #[test]
    fn mismatched_lengths() {
        let series = TimeSeries {
            set_value: vec![1.0, 2.0],
            set_time: vec![0.0],
            value: vec![1.0, 1.1, 1.2],
            time: vec![0.0, 1.0],
        };
        assert_eq!(
            series.issues(),
            vec![
                SeriesIssue::SetLengthMismatch { values: 2, times: 1 },
                SeriesIssue::ValueLengthMismatch { values: 3, times: 2 },
            ]
        );
    }

    #[test]
    fn decreasing_time_flagged() {
        let series = TimeSeries {
            value: vec![1.0, 2.0],
            time: vec![5.0, 1.0],
            ..Default::default()
        };
        assert_eq!(
            series.issues(),
            vec![SeriesIssue::TimeNotIncreasing { field: "time" }]
        );
    }
}
