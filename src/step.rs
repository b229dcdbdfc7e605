//! Process steps
//!
//! [`StepRecord`] is everything ordering and synthesis need from a step.
//! [`ProcessStep`] is the concrete step read from archives; its kind is
//! detected from the keyword it carries:
//!
//! ```yaml
//! steps:
//!   - name: clean
//!     start_time: 2024-03-01T09:00:00Z
//!     duration: 10 min
//!   - name: grow
//!     start_time: 2024-03-01T09:10:00Z
//!     duration: 1.5 h
//!     deposit:
//!       source: target-zno
//!       layer: film-zno
//! ```

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::system::SystemRef;
use crate::task::{Link, TaskNode};
use crate::timeseries::TimeSeries;
use crate::timing::TimeSpan;

/// Timed step as seen by the validator and the synthesizer
pub trait StepRecord {
    fn name(&self) -> &str;

    fn start_time(&self) -> Option<DateTime<Utc>>;

    fn duration(&self) -> Option<TimeSpan>;

    /// Task node for this step, with any step-specific links
    fn to_task(&self) -> TaskNode {
        TaskNode::named(self.name())
    }
}

impl<T: StepRecord + ?Sized> StepRecord for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn start_time(&self) -> Option<DateTime<Utc>> {
        (**self).start_time()
    }

    fn duration(&self) -> Option<TimeSpan> {
        (**self).duration()
    }

    fn to_task(&self) -> TaskNode {
        (**self).to_task()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessStep {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<TimeSpan>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Step kind - serde detects it from the keyword
    #[serde(flatten)]
    pub kind: StepKind,
}

impl ProcessStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start_time: None,
            duration: None,
            comment: None,
            kind: StepKind::Generic {},
        }
    }

    pub fn starting_at(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn lasting(mut self, duration: TimeSpan) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Time series attached to this step, labelled by quantity
    pub fn series(&self) -> Vec<(&'static str, &TimeSeries)> {
        let mut out = Vec::new();
        match &self.kind {
            StepKind::Deposit { deposit } => {
                out.extend(deposit.temperature.as_ref().map(|s| ("temperature", s)));
                out.extend(deposit.pressure.as_ref().map(|s| ("pressure", s)));
            }
            StepKind::Anneal { anneal } => {
                out.extend(anneal.temperature.as_ref().map(|s| ("temperature", s)));
            }
            StepKind::Generic {} => {}
        }
        out
    }
}

impl StepRecord for ProcessStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn start_time(&self) -> Option<DateTime<Utc>> {
        self.start_time
    }

    fn duration(&self) -> Option<TimeSpan> {
        self.duration
    }

    fn to_task(&self) -> TaskNode {
        let mut task = TaskNode::named(&self.name);
        if let StepKind::Deposit { deposit } = &self.kind {
            if let Some(source) = &deposit.source {
                task.inputs.push(Link::system("source", source.clone()));
            }
            if let Some(layer) = &deposit.layer {
                task.outputs.push(Link::system("layer", layer.clone()));
            }
        }
        task
    }
}

/// Step kinds - keyword based, generic when no keyword is present
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepKind {
    /// deposit: material transfer onto the sample
    Deposit { deposit: DepositDef },

    /// anneal: thermal treatment
    Anneal { anneal: AnnealDef },

    Generic {},
}

/// Keywords a step may carry; a malformed block is an error, never generic
#[derive(Deserialize)]
struct StepKeywords {
    #[serde(default)]
    deposit: Option<DepositDef>,
    #[serde(default)]
    anneal: Option<AnnealDef>,
}

impl<'de> Deserialize<'de> for StepKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keywords = StepKeywords::deserialize(deserializer)?;
        match (keywords.deposit, keywords.anneal) {
            (Some(deposit), None) => Ok(StepKind::Deposit { deposit }),
            (None, Some(anneal)) => Ok(StepKind::Anneal { anneal }),
            (None, None) => Ok(StepKind::Generic {}),
            (Some(_), Some(_)) => Err(D::Error::custom(
                "a step takes exactly one of deposit: or anneal:",
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepositDef {
    /// Source material (target, precursor)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SystemRef>,

    /// Layer produced by this step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<SystemRef>,

    /// Kelvin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<TimeSeries>,

    /// Pascal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<TimeSeries>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnealDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atmosphere: Option<String>,

    /// Kelvin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<TimeSeries>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::LinkTarget;

    #[test]
    fn parse_generic_step() {
        let step: ProcessStep = serde_yaml::from_str(
            r#"
name: clean
start_time: 2024-03-01T09:00:00Z
duration: 10 min
"#,
        )
        .unwrap();
        assert_eq!(step.kind, StepKind::Generic {});
        assert_eq!(step.duration, Some(TimeSpan::from_secs(600)));
        assert!(step.start_time.is_some());
        assert_eq!(step.to_task(), TaskNode::named("clean"));
    }

    #[test]
    fn parse_step_without_timing() {
        let step: ProcessStep = serde_yaml::from_str("name: prep").unwrap();
        assert!(step.start_time.is_none());
        assert!(step.duration.is_none());
    }

    #[test]
    fn deposit_step_links_source_and_layer() {
        let step: ProcessStep = serde_yaml::from_str(
            r#"
name: grow
duration: 3600
deposit:
  source: target-zno
  layer: film-zno
  temperature:
    set_value: [873]
"#,
        )
        .unwrap();
        assert!(matches!(step.kind, StepKind::Deposit { .. }));

        let task = step.to_task();
        assert_eq!(task.name, "grow");
        assert_eq!(task.inputs.len(), 1);
        assert_eq!(task.inputs[0].name, "source");
        assert_eq!(
            task.inputs[0].target,
            LinkTarget::System(SystemRef::new("target-zno"))
        );
        assert_eq!(task.outputs[0].name, "layer");
        assert_eq!(step.series().len(), 1);
    }

    #[test]
    fn malformed_deposit_block_is_an_error() {
        let result = serde_yaml::from_str::<ProcessStep>(
            r#"
name: grow
duration: 10
deposit:
  source: target-zno
  layer: film-zno
  temperature:
    set_value: hot
"#,
        );
        assert!(result.is_err(), "parsed as {:?}", result.map(|s| s.kind));
    }

    #[test]
    fn malformed_anneal_block_is_an_error() {
        let result = serde_yaml::from_str::<ProcessStep>("name: anneal\nanneal: oxygen\n");
        assert!(result.is_err());
    }

    #[test]
    fn deposit_and_anneal_together_are_rejected() {
        let err = serde_yaml::from_str::<ProcessStep>(
            r#"
name: both
deposit:
  layer: film-zno
anneal:
  atmosphere: O2
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("exactly one of"), "{err}");
    }

    #[test]
    fn anneal_step_has_no_extra_links() {
        let step: ProcessStep = serde_yaml::from_str(
            r#"
name: anneal
anneal:
  atmosphere: O2
"#,
        )
        .unwrap();
        let StepKind::Anneal { anneal } = &step.kind else {
            panic!("expected anneal step");
        };
        assert_eq!(anneal.atmosphere.as_deref(), Some("O2"));
        assert_eq!(step.to_task(), TaskNode::named("anneal"));
    }

    #[test]
    fn builder_sets_timing() {
        let start = DateTime::<Utc>::from_timestamp(0, 0).unwrap();
        let step = ProcessStep::new("a")
            .starting_at(start)
            .lasting(TimeSpan::from_secs(10));
        assert_eq!(StepRecord::start_time(&step), Some(start));
        assert_eq!(StepRecord::duration(&step), Some(TimeSpan::from_secs(10)));
    }
}
