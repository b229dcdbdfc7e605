//! Task nodes and links
//!
//! A [`TaskNode`] is the provenance unit handed to a [`Workflow`]. Its links
//! name what the task consumed and produced; link targets are plain
//! positions or reference strings and never own what they point at.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::system::SystemRef;

/// Position of a step within its owning process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepRef(pub usize);

impl fmt::Display for StepRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#/steps/{}", self.0)
    }
}

/// What a link points at
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkTarget {
    /// A step of the same process
    Step(StepRef),
    /// A catalogued system (substrate, thin film, source material)
    System(SystemRef),
}

/// Named, non-owning reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    pub name: String,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub target: LinkTarget,
}

impl Link {
    pub fn step(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            target: LinkTarget::Step(StepRef(index)),
        }
    }

    pub fn system(name: impl Into<String>, reference: SystemRef) -> Self {
        Self {
            name: name.into(),
            target: LinkTarget::System(reference),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<Link>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outputs: Vec<Link>,
}

impl TaskNode {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Workflow container that receives a published task sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    #[serde(default)]
    pub tasks: Vec<TaskNode>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tasks: Vec::new(),
        }
    }

    /// Replace the task list wholesale
    pub fn publish(&mut self, tasks: Vec<TaskNode>) {
        self.tasks = tasks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_replaces_previous_tasks() {
        let mut wf = Workflow::new("run-1");
        wf.publish(vec![TaskNode::named("a"), TaskNode::named("b")]);
        wf.publish(vec![TaskNode::named("c")]);
        assert_eq!(wf.tasks, vec![TaskNode::named("c")]);
    }

    #[test]
    fn link_constructors_pick_target() {
        let source = Link::system("source", SystemRef::new("target-zno"));
        assert_eq!(source.target, LinkTarget::System(SystemRef::new("target-zno")));
        let clean = Link::step("clean", 0);
        assert_eq!(clean.target, LinkTarget::Step(StepRef(0)));
        assert_eq!(clean.name, "clean");
    }

    #[test]
    fn links_serialize_with_tagged_target() {
        let yaml = serde_yaml::to_string(&Link::step("clean", 2)).unwrap();
        assert!(yaml.contains("step: 2"), "{yaml}");

        let yaml = serde_yaml::to_string(&Link::system("layer", SystemRef::new("film-1"))).unwrap();
        assert!(yaml.contains("system: film-1"), "{yaml}");
    }
}
