//! Thin-film stacks and component flattening
//!
//! A stack's `components` list is derived: every resolvable layer in layer
//! order, then the substrate last. Consumers rely on the last component being
//! the foundation the stack sits on.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::system::{ReferenceResolver, SystemRef};

/// Layer entry of a stack
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThinFilmReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<SystemRef>,
}

impl ThinFilmReference {
    pub fn to(reference: impl Into<String>) -> Self {
        Self {
            lab_id: None,
            reference: Some(SystemRef::new(reference)),
        }
    }
}

/// Substrate the layers are deposited on
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubstrateReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<SystemRef>,
}

impl SubstrateReference {
    pub fn to(reference: impl Into<String>) -> Self {
        Self {
            lab_id: None,
            reference: Some(SystemRef::new(reference)),
        }
    }
}

/// Whole stack a process produced, resolved against stack names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThinFilmStackReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<SystemRef>,
}

impl ThinFilmStackReference {
    pub fn to(reference: impl Into<String>) -> Self {
        Self {
            lab_id: None,
            reference: Some(SystemRef::new(reference)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemComponent {
    pub system: SystemRef,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThinFilmStack {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab_id: Option<String>,
    /// Ordered starting at the substrate
    #[serde(default)]
    pub layers: Vec<ThinFilmReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub substrate: Option<SubstrateReference>,
    /// Derived by `normalize`; authored values are discarded
    #[serde(default)]
    pub components: Vec<SystemComponent>,
}

impl ThinFilmStack {
    /// Recompute `components` from layers and substrate
    pub fn normalize<R: ReferenceResolver>(&mut self, resolver: &R) {
        self.components = flatten_components(
            &self.name,
            &self.layers,
            self.substrate.as_ref(),
            resolver,
        );
        debug!(stack = %self.name, components = self.components.len(), "flattened stack");
    }
}

/// Stack references resolve against the names of known stacks
impl ReferenceResolver for [ThinFilmStack] {
    fn resolves(&self, reference: &SystemRef) -> bool {
        !reference.is_blank() && self.iter().any(|s| s.name == reference.as_str())
    }
}

/// Layers in order, then the substrate; unset or dangling references are skipped
pub fn flatten_components<R: ReferenceResolver>(
    stack: &str,
    layers: &[ThinFilmReference],
    substrate: Option<&SubstrateReference>,
    resolver: &R,
) -> Vec<SystemComponent> {
    let layer_refs = layers.iter().map(|l| ("layer", l.reference.as_ref()));
    let base_ref = substrate.map(|s| ("substrate", s.reference.as_ref()));

    layer_refs
        .chain(base_ref)
        .filter_map(|(role, reference)| {
            let reference = reference?;
            if resolver.resolves(reference) {
                Some(SystemComponent {
                    system: reference.clone(),
                })
            } else {
                warn!(stack, role, reference = %reference, "skipping dangling reference");
                None
            }
        })
        .collect()
}
