//! # Safe Props Adapter
//!
//! Memoized stripping of a component's props.
//!
//! The sanitized copy is recomputed only when the props identity changes.
//! Identity is the pair of graph and node id. Mutating a props object in
//! place without changing its identity does not trigger a recompute.

use crate::graph::{GraphId, ValueGraph};
use crate::sanitized::Sanitized;
use crate::stripper::remove_circular_references;
use crate::{NodeId, Value};

/// Per-component props cache keyed by props identity.
#[derive(Debug, Clone, Default)]
pub struct SafeProps {
    memo: Option<(GraphId, NodeId, Sanitized)>,
    computations: u64,
}

impl SafeProps {
    /// Create an empty adapter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitized props for `props`, recomputed only on identity change.
    pub fn resolve(&mut self, graph: &ValueGraph, props: NodeId) -> &Sanitized {
        let key = (graph.id(), props);
        if !matches!(&self.memo, Some((g, id, _)) if (*g, *id) == key) {
            self.memo = None;
        }
        let computations = &mut self.computations;
        let (_, _, tree) = self.memo.get_or_insert_with(|| {
            *computations = computations.saturating_add(1);
            tracing::trace!(props = props.0, "recomputing sanitized props");
            (key.0, key.1, remove_circular_references(graph, &Value::Object(props)))
        });
        tree
    }

    /// The last sanitized props, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Sanitized> {
        self.memo.as_ref().map(|(_, _, tree)| tree)
    }

    /// How many times the props were actually stripped.
    #[must_use]
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
