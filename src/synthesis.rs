//! Task-graph synthesis - turns serial steps into a linear provenance chain
//!
//! Task *i* produces step *i*'s output and consumes step *i-1*'s output:
//!
//! ```text
//! [A] --A--> [B] --B--> [C] --C-->
//! ```

use tracing::debug;

use crate::error::Result;
use crate::ordering::SerialSteps;
use crate::step::StepRecord;
use crate::task::{Link, TaskNode};

/// Build one task per step, in step order
pub fn synthesize<S: StepRecord>(serial: SerialSteps<'_, S>) -> Vec<TaskNode> {
    let steps = serial.steps();
    let mut tasks = Vec::with_capacity(steps.len());
    let mut previous: Option<(usize, &S)> = None;

    for (index, step) in steps.iter().enumerate() {
        let mut task = step.to_task();
        task.outputs.push(Link::step(step.name(), index));
        if let Some((prev_index, prev)) = previous {
            task.inputs.push(Link::step(prev.name(), prev_index));
        }
        tasks.push(task);
        previous = Some((index, step));
    }

    debug!(tasks = tasks.len(), "synthesized task chain");
    tasks
}

/// Check ordering, then synthesize; `NotSerial` when the steps overlap or lack timing
pub fn synthesize_tasks<S: StepRecord>(steps: &[S]) -> Result<Vec<TaskNode>> {
    SerialSteps::try_new(steps).map(synthesize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SynthError;
    use crate::step::ProcessStep;
    use crate::task::LinkTarget;
    use crate::timing::TimeSpan;
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    fn step(name: &str, start: i64, dur: u64) -> ProcessStep {
        ProcessStep::new(name)
            .starting_at(DateTime::<Utc>::from_timestamp(start, 0).unwrap())
            .lasting(TimeSpan::from_secs(dur))
    }

    #[test]
    fn chain_of_three() {
        let steps = [step("A", 0, 10), step("B", 10, 5), step("C", 15, 0)];
        let tasks = synthesize_tasks(&steps).unwrap();

        assert_eq!(tasks.len(), 3);
        assert!(tasks[0].inputs.is_empty());
        assert_eq!(tasks[0].outputs, vec![Link::step("A", 0)]);
        assert_eq!(tasks[1].inputs, vec![Link::step("A", 0)]);
        assert_eq!(tasks[1].outputs, vec![Link::step("B", 1)]);
        assert_eq!(tasks[2].inputs, vec![Link::step("B", 1)]);
        assert_eq!(tasks[2].outputs, vec![Link::step("C", 2)]);
    }

    #[test]
    fn empty_input_gives_empty_chain() {
        assert!(synthesize_tasks::<ProcessStep>(&[]).unwrap().is_empty());
    }

    #[test]
    fn refuses_overlapping_steps() {
        let steps = [step("A", 0, 10), step("B", 5, 5)];
        assert!(matches!(
            synthesize_tasks(&steps),
            Err(SynthError::NotSerial { .. })
        ));
    }

    #[test]
    fn keeps_step_specific_links_first() {
        let grow: ProcessStep = serde_yaml::from_str(
            r#"
name: grow
start_time: 1970-01-01T00:00:10Z
duration: 30
deposit:
  source: target-zno
  layer: film-zno
"#,
        )
        .unwrap();
        let steps = [step("clean", 0, 10), grow];
        let tasks = synthesize_tasks(&steps).unwrap();

        let names: Vec<_> = tasks[1].inputs.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["source", "clean"]);
        let names: Vec<_> = tasks[1].outputs.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["layer", "grow"]);
        assert_eq!(
            tasks[1].inputs[1].target,
            LinkTarget::Step(crate::task::StepRef(0))
        );
        assert_eq!(
            tasks[1].outputs[1].target,
            LinkTarget::Step(crate::task::StepRef(1))
        );
    }

    #[test]
    fn works_over_borrowed_steps() {
        let owned = [step("A", 0, 1), step("B", 1, 1)];
        let borrowed: Vec<&ProcessStep> = owned.iter().collect();
        let tasks = synthesize_tasks(&borrowed).unwrap();
        assert_eq!(tasks[1].inputs, vec![Link::step("A", 0)]);
    }
}
