//! Workflows: ordered group sequences, optionally derived from a root
//!
//! A workflow is identified by its name *together with* its specifier (for
//! example the same name once per care channel). A derived workflow tracks a
//! root workflow: when the root's sequence changes, derived sequences are
//! rebuilt to retain only codes the root still carries.

use crate::name::{GroupCode, WorkflowName};
use im::Vector;
use serde::{Deserialize, Serialize};

/// A process workflow over page groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    /// Workflow name (unique together with `specifier`)
    pub name: WorkflowName,
    /// Distinguishes same-named workflows
    pub specifier: String,
    /// Ordered group codes
    pub sequence: Vector<GroupCode>,
    /// Root workflow this one is derived from, if any
    pub derived_from: Option<WorkflowName>,
}

impl Workflow {
    /// Workflow with an empty sequence
    #[must_use]
    pub fn new(name: WorkflowName, specifier: impl Into<String>) -> Self {
        Self {
            name,
            specifier: specifier.into(),
            sequence: Vector::new(),
            derived_from: None,
        }
    }

    /// Identity pair
    #[inline]
    #[must_use]
    pub fn key(&self) -> (&WorkflowName, &str) {
        (&self.name, &self.specifier)
    }

    /// Whether this workflow is a root (not derived)
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.derived_from.is_none()
    }

    /// Position of a group code in the sequence
    #[must_use]
    pub fn step_position(&self, code: &GroupCode) -> Option<usize> {
        self.sequence.iter().position(|c| c == code)
    }

    /// Rebuild this sequence against a root's new sequence, keeping only
    /// codes the root still carries (in this workflow's own order)
    #[must_use]
    pub fn retained_against(&self, root_sequence: &Vector<GroupCode>) -> Vector<GroupCode> {
        self.sequence
            .iter()
            .filter(|code| root_sequence.contains(code))
            .cloned()
            .collect()
    }
}
