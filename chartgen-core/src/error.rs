//! Error types for tree manipulation and diagram transformation.

use thiserror::Error;

use crate::model::NodeId;

/// Violations of the tree-integrity invariants of the statechart arena.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The child is still attached elsewhere; it has to be detached first.
    #[error("node {child} already has a parent ({parent})")]
    AlreadyParented { child: NodeId, parent: NodeId },
    #[error("node {parent} already has child {child}")]
    DuplicateChild { parent: NodeId, child: NodeId },
    /// Attaching would make a node its own ancestor.
    #[error("node {0} cannot be attached below itself")]
    WouldCycle(NodeId),
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("node {0} is not a state container")]
    NotAContainer(NodeId),
    #[error("node {0} is not a state")]
    NotAState(NodeId),
}

/// Fatal errors raised while transforming a diagram into a statechart.
///
/// Any of these aborts the whole transformation; no partial statechart is
/// handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("unknown pseudostate type `{0}`")]
    UnknownPseudostate(String),
    #[error("history reference names unknown state `{0}`")]
    UnknownHistoryOwner(String),
    #[error("state `{0}` has no region to hold a history pseudostate")]
    HistoryWithoutRegion(String),
    #[error("history of state `{state}` is ambiguous: it owns {regions} regions")]
    AmbiguousHistory { state: String, regions: usize },
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl BuildError {
    /// Returns `true` when an endpoint or declaration could not be resolved to
    /// a known node kind, as opposed to a broken tree invariant.
    #[must_use]
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            BuildError::UnknownPseudostate(_)
                | BuildError::UnknownHistoryOwner(_)
                | BuildError::HistoryWithoutRegion(_)
        )
    }
}
