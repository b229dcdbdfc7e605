//! Archive documents - systems, stacks and processes in one file
//!
//! ```yaml
//! systems:
//!   sub-1: { type: substrate, lab_id: SUB-1 }
//!   film-1: { type: thin_film }
//! stacks:
//!   - name: stack-a
//!     layers: [{ reference: film-1 }]
//!     substrate: { reference: sub-1 }
//! processes:
//!   - name: pld-042
//!     steps: [...]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, SynthError};
use crate::ordering::SerialCheck;
use crate::process::Process;
use crate::stack::{SystemComponent, ThinFilmStack};
use crate::system::{AnyReference, System, SystemRef, SystemRegistry};
use crate::task::Workflow;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Archive {
    #[serde(default)]
    pub systems: BTreeMap<String, System>,
    #[serde(default)]
    pub stacks: Vec<ThinFilmStack>,
    #[serde(default)]
    pub processes: Vec<Process>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessReport {
    pub name: String,
    pub steps: usize,
    pub check: SerialCheck,
    /// Resolved sample stacks
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<SystemRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackReport {
    pub name: String,
    pub components: Vec<SystemComponent>,
}

/// Everything one normalization pass produced
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArchiveReport {
    pub processes: Vec<ProcessReport>,
    pub stacks: Vec<StackReport>,
    /// One per serial process, in process order
    pub workflows: Vec<Workflow>,
}

impl ArchiveReport {
    pub fn all_serial(&self) -> bool {
        self.processes.iter().all(|p| p.check.is_serial())
    }
}

impl Archive {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load by extension: `.yaml`/`.yml` or `.json`
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let content = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), "loading archive");

        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&content),
            "json" => Self::from_json(&content),
            _ => Err(SynthError::UnsupportedFormat { extension }),
        }
    }

    pub fn process(&self, name: &str) -> Result<&Process> {
        self.processes
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| SynthError::ProcessNotFound {
                name: name.to_string(),
            })
    }

    pub fn stack(&self, name: &str) -> Result<&ThinFilmStack> {
        self.stacks
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SynthError::StackNotFound {
                name: name.to_string(),
            })
    }

    /// Flatten every stack (resolver chosen by config)
    pub fn normalize_stacks(&mut self, config: &Config) {
        if config.references.require_registered {
            let registry = SystemRegistry::new(&self.systems);
            for stack in &mut self.stacks {
                stack.normalize(&registry);
            }
        } else {
            for stack in &mut self.stacks {
                stack.normalize(&AnyReference);
            }
        }
    }

    /// Flatten every stack and normalize every process
    pub fn normalize(&mut self, config: &Config) -> ArchiveReport {
        self.normalize_stacks(config);

        let mut report = ArchiveReport {
            stacks: self
                .stacks
                .iter()
                .map(|s| StackReport {
                    name: s.name.clone(),
                    components: s.components.clone(),
                })
                .collect(),
            ..Default::default()
        };

        for process in &self.processes {
            let normalized = process.normalize();
            let check = normalized.check.clone();
            if let Ok(workflow) = normalized.into_workflow(&process.name) {
                report.workflows.push(workflow);
            }
            report.processes.push(ProcessReport {
                name: process.name.clone(),
                steps: process.steps.len(),
                check,
                samples: process.resolve_samples(&self.stacks[..]),
            });
        }

        report
    }
}
