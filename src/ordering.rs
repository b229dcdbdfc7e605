//! Temporal ordering - decides whether steps run strictly one after another
//!
//! Steps are serial when every step has a start time and a duration and no
//! step starts before its predecessor has ended. Back-to-back steps (zero
//! gap) are serial. Missing timing is never assumed to be serial.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::error::{Result, SynthError};
use crate::step::StepRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingField {
    StartTime,
    Duration,
}

impl fmt::Display for TimingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingField::StartTime => write!(f, "start_time"),
            TimingField::Duration => write!(f, "duration"),
        }
    }
}

/// Outcome of the ordering check, first offending position only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum SerialCheck {
    Serial,
    MissingTiming {
        index: usize,
        step: String,
        field: TimingField,
    },
    /// `next` starts `overlap` before `step` ends
    Overlap {
        index: usize,
        step: String,
        next: String,
        #[serde(serialize_with = "serialize_delta")]
        overlap: TimeDelta,
    },
}

fn serialize_delta<S: serde::Serializer>(
    delta: &TimeDelta,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    let secs = delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) * 1e-9;
    serializer.serialize_f64(secs)
}

impl SerialCheck {
    pub fn is_serial(&self) -> bool {
        matches!(self, SerialCheck::Serial)
    }

    pub fn hint(&self) -> &'static str {
        match self {
            SerialCheck::Serial => "Steps are serial",
            SerialCheck::MissingTiming { .. } => "Set start_time and duration on every step",
            SerialCheck::Overlap { .. } => {
                "Move the later step's start_time to after the previous step ends"
            }
        }
    }
}

impl fmt::Display for SerialCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialCheck::Serial => write!(f, "serial"),
            SerialCheck::MissingTiming { index, step, field } => {
                write!(f, "step #{index} '{step}' has no {field}")
            }
            SerialCheck::Overlap {
                index,
                step,
                next,
                overlap,
            } => write!(
                f,
                "step #{} '{}' starts {:.3} s before step #{} '{}' ends",
                index + 1,
                next,
                overlap.num_milliseconds() as f64 / 1_000.0,
                index,
                step
            ),
        }
    }
}

/// Diagnostic ordering check over the steps in declared order
pub fn check_serial<S: StepRecord>(steps: &[S]) -> SerialCheck {
    let mut windows: Vec<(DateTime<Utc>, DateTime<Utc>)> = Vec::with_capacity(steps.len());

    for (index, step) in steps.iter().enumerate() {
        let missing = |field| SerialCheck::MissingTiming {
            index,
            step: step.name().to_string(),
            field,
        };
        let Some(start) = step.start_time() else {
            return missing(TimingField::StartTime);
        };
        let Some(duration) = step.duration() else {
            return missing(TimingField::Duration);
        };
        let end = start
            .checked_add_signed(duration.as_time_delta())
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        windows.push((start, end));
    }

    for (index, pair) in windows.windows(2).enumerate() {
        let (_, end) = pair[0];
        let (next_start, _) = pair[1];
        let gap = next_start - end;
        if gap < TimeDelta::zero() {
            return SerialCheck::Overlap {
                index,
                step: steps[index].name().to_string(),
                next: steps[index + 1].name().to_string(),
                overlap: -gap,
            };
        }
    }

    SerialCheck::Serial
}

/// True when the steps form a strictly non-overlapping timeline
pub fn is_serial<S: StepRecord>(steps: &[S]) -> bool {
    check_serial(steps).is_serial()
}

/// Steps proven serial; the only input synthesis accepts
#[derive(Debug, Clone, Copy)]
pub struct SerialSteps<'a, S> {
    steps: &'a [S],
}

impl<'a, S: StepRecord> SerialSteps<'a, S> {
    /// Check the steps and wrap them, or fail with `NotSerial`
    pub fn try_new(steps: &'a [S]) -> Result<Self> {
        Self::check(steps).map_err(|check| SynthError::NotSerial { check })
    }

    /// Like `try_new`, handing back the failed check itself
    pub fn check(steps: &'a [S]) -> std::result::Result<Self, SerialCheck> {
        match check_serial(steps) {
            SerialCheck::Serial => Ok(Self { steps }),
            check => Err(check),
        }
    }

    pub fn steps(&self) -> &'a [S] {
        self.steps
    }
}
