//! Synthesis processes - ordered steps plus the decision to publish tasks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, SynthError};
use crate::ordering::{SerialCheck, SerialSteps};
use crate::stack::ThinFilmStackReference;
use crate::step::ProcessStep;
use crate::synthesis::synthesize;
use crate::system::{ReferenceResolver, SystemRef};
use crate::task::{TaskNode, Workflow};

/// Sample deposition or any other multi-step synthesis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<String>,
    /// Free-form method label (e.g. "pulsed laser deposition")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTime<Utc>>,
    /// Declared execution order; never reordered
    #[serde(default)]
    pub steps: Vec<ProcessStep>,
    /// Stacks this process produced
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<ThinFilmStackReference>,
}

/// Result of normalizing one process
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub check: SerialCheck,
    /// Present only when the steps are serial
    pub tasks: Option<Vec<TaskNode>>,
}

impl Normalized {
    /// Publish the tasks into a fresh workflow; non-serial steps are an error
    pub fn into_workflow(self, name: &str) -> Result<Workflow> {
        let tasks = self.tasks.ok_or(SynthError::NotSerial { check: self.check })?;
        let mut workflow = Workflow::new(name);
        workflow.publish(tasks);
        Ok(workflow)
    }
}

impl Process {
    /// Validate ordering and synthesize the task chain when serial
    pub fn normalize(&self) -> Normalized {
        self.report_series();

        match SerialSteps::check(&self.steps) {
            Ok(serial) => {
                let tasks = synthesize(serial);
                info!(process = %self.name, tasks = tasks.len(), "process is serial");
                Normalized {
                    check: SerialCheck::Serial,
                    tasks: Some(tasks),
                }
            }
            Err(check) => {
                debug!(process = %self.name, %check, "process is not serial, no tasks published");
                Normalized { check, tasks: None }
            }
        }
    }

    /// Normalize and publish into a fresh workflow named after the process
    pub fn to_workflow(&self) -> Result<Workflow> {
        self.normalize().into_workflow(&self.name)
    }

    /// Sample references that resolve; unset or dangling ones are skipped
    pub fn resolve_samples<R>(&self, resolver: &R) -> Vec<SystemRef>
    where
        R: ReferenceResolver + ?Sized,
    {
        self.samples
            .iter()
            .filter_map(|sample| {
                let reference = sample.reference.as_ref()?;
                if resolver.resolves(reference) {
                    Some(reference.clone())
                } else {
                    warn!(process = %self.name, reference = %reference, "skipping dangling sample");
                    None
                }
            })
            .collect()
    }

    fn report_series(&self) {
        for step in &self.steps {
            for (quantity, series) in step.series() {
                for issue in series.issues() {
                    warn!(process = %self.name, step = %step.name, quantity, %issue, "inconsistent time series");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::AnyReference;
    use crate::task::{LinkTarget, StepRef};

    const SERIAL: &str = r#"
name: pld-042
method: pulsed laser deposition
steps:
  - name: A
    start_time: 2024-03-01T09:00:00Z
    duration: 10
  - name: B
    start_time: 2024-03-01T09:00:10Z
    duration: 5 s
  - name: C
    start_time: 2024-03-01T09:00:15Z
    duration: 0
"#;

    #[test]
    fn serial_process_publishes_chain() {
        let process: Process = serde_yaml::from_str(SERIAL).unwrap();
        let normalized = process.normalize();
        assert!(normalized.check.is_serial());

        let tasks = normalized.tasks.unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[1].inputs[0].name, "A");
        assert_eq!(tasks[1].inputs[0].target, LinkTarget::Step(StepRef(0)));
        assert_eq!(tasks[1].outputs[0].name, "B");
        assert_eq!(tasks[1].outputs[0].target, LinkTarget::Step(StepRef(1)));
    }

    #[test]
    fn missing_start_time_publishes_nothing() {
        let process: Process = serde_yaml::from_str(
            r#"
name: pld-043
steps:
  - name: A
    start_time: 2024-03-01T09:00:00Z
    duration: 10
  - name: B
    duration: 5
"#,
        )
        .unwrap();
        let normalized = process.normalize();
        assert!(!normalized.check.is_serial());
        assert!(normalized.tasks.is_none());
        assert!(matches!(normalized.check, SerialCheck::MissingTiming { index: 1, .. }));
        assert!(matches!(
            process.to_workflow(),
            Err(SynthError::NotSerial {
                check: SerialCheck::MissingTiming { index: 1, .. }
            })
        ));
    }

    #[test]
    fn to_workflow_is_deterministic() {
        let process: Process = serde_yaml::from_str(SERIAL).unwrap();
        let first = process.to_workflow().unwrap();
        let second = process.to_workflow().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.name, "pld-042");
    }

    #[test]
    fn process_without_steps_is_serial() {
        let process = Process {
            name: "empty".into(),
            ..Default::default()
        };
        assert_eq!(process.normalize().tasks, Some(Vec::new()));
    }

    #[test]
    fn samples_skip_unset_and_dangling() {
        let process: Process = serde_yaml::from_str(
            r#"
name: pld-044
samples:
  - reference: stack-a
  - lab_id: S-7
  - reference: "  "
"#,
        )
        .unwrap();
        assert_eq!(process.samples.len(), 3);
        assert_eq!(process.resolve_samples(&AnyReference), vec![SystemRef::new("stack-a")]);
    }
}
