//! synthflow - provenance workflows for multi-step material synthesis
//!
//! Checks that a process's steps run strictly one after another, turns serial
//! steps into a linear chain of linked task nodes, and flattens thin-film
//! stacks into their component systems.

pub mod archive;
pub mod config;
pub mod error;
pub mod ordering;
pub mod output;
pub mod process;
pub mod stack;
pub mod step;
pub mod synthesis;
pub mod system;
pub mod task;
pub mod timeseries;
pub mod timing;

pub use archive::{Archive, ArchiveReport, ProcessReport, StackReport};
pub use config::Config;
pub use error::{FixSuggestion, Result, SynthError};
pub use ordering::{check_serial, is_serial, SerialCheck, SerialSteps, TimingField};
pub use output::OutputFormat;
pub use process::{Normalized, Process};
pub use stack::{
    flatten_components, SubstrateReference, SystemComponent, ThinFilmReference, ThinFilmStack,
    ThinFilmStackReference,
};
pub use step::{ProcessStep, StepKind, StepRecord};
pub use synthesis::{synthesize, synthesize_tasks};
pub use system::{AnyReference, ReferenceResolver, System, SystemRef, SystemRegistry};
pub use task::{Link, LinkTarget, StepRef, TaskNode, Workflow};
pub use timing::TimeSpan;
