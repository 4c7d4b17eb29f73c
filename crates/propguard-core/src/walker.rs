//! # Cycle-Safe Walker
//!
//! Recursive traversal of a value graph with identity-based cycle detection.
//!
//! The walker classifies each value into a [`Step`] and hands it to a
//! [`NodeAction`]. The action decides what to compute and which children to
//! descend into, calling back into [`Walker::walk`] for each of them.
//!
//! ## Visited discipline
//!
//! - An object id is inserted into the [`VisitedSet`] *before* its children
//!   are visited.
//! - By default the set only grows during a call, so a second visit to the
//!   same id, from any branch, is reported as [`Step::Circular`].
//! - An action may call [`Walker::leave`] once an object's children are
//!   done. The set then holds only the current path, and only true back
//!   edges are reported.
//! - Each public entry point creates a fresh set, so calls never share state.
//!
//! ## Failure policy
//!
//! Nothing here panics. A dangling id becomes [`Step::Unresolved`]. A chain
//! deeper than [`MAX_WALK_DEPTH`], or a walk that has entered more than
//! [`MAX_WALK_STEPS`] objects, yields [`Step::LimitReached`]. Actions turn
//! both into placeholders.

use crate::graph::ValueGraph;
use crate::primitives::{MAX_WALK_DEPTH, MAX_WALK_STEPS};
use crate::{Node, NodeId, Value};
use std::collections::BTreeSet;

// =============================================================================
// VISITED SET
// =============================================================================

/// Object identities seen during one traversal.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    ids: BTreeSet<NodeId>,
}

impl VisitedSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check membership by identity.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.ids.contains(&id)
    }

    /// Mark an identity as visited. Returns `false` if it already was.
    pub fn insert(&mut self, id: NodeId) -> bool {
        self.ids.insert(id)
    }

    /// Forget an identity. Returns `false` if it was not visited.
    pub fn remove(&mut self, id: NodeId) -> bool {
        self.ids.remove(&id)
    }

    /// Number of identities visited so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing has been visited yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

// =============================================================================
// STEP
// =============================================================================

/// Classification of one value during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step<'a> {
    /// A non-object value.
    Leaf(&'a Value),
    /// An object whose identity was already visited.
    Circular(NodeId),
    /// A sequence, now marked visited.
    Sequence(NodeId, &'a [Value]),
    /// A mapping, now marked visited.
    Mapping(NodeId, &'a [(String, Value)]),
    /// A date, now marked visited.
    Date(NodeId, i64),
    /// An opaque platform object, now marked visited.
    Opaque(NodeId, &'a str),
    /// An id that does not resolve in the graph.
    Unresolved(NodeId),
    /// The depth or step bound was reached before this object.
    LimitReached,
}

/// Per-node computation driven by the walker.
pub trait NodeAction<'a> {
    type Output;

    /// Combine one step into a result, recursing through `walker`.
    fn visit(&mut self, walker: &mut Walker<'a, '_>, step: Step<'a>) -> Self::Output;
}

// =============================================================================
// WALKER
// =============================================================================

/// A traversal over one graph with a caller-owned visited set.
#[derive(Debug)]
pub struct Walker<'a, 'v> {
    graph: &'a ValueGraph,
    visited: &'v mut VisitedSet,
    depth: usize,
    max_depth: usize,
    steps: usize,
}

impl<'a, 'v> Walker<'a, 'v> {
    /// Create a walker bounded by [`MAX_WALK_DEPTH`].
    pub fn new(graph: &'a ValueGraph, visited: &'v mut VisitedSet) -> Self {
        Self::with_max_depth(graph, visited, MAX_WALK_DEPTH)
    }

    /// Create a walker with a custom depth bound (clamped to
    /// [`MAX_WALK_DEPTH`]).
    pub fn with_max_depth(
        graph: &'a ValueGraph,
        visited: &'v mut VisitedSet,
        max_depth: usize,
    ) -> Self {
        Self {
            graph,
            visited,
            depth: 0,
            max_depth: max_depth.min(MAX_WALK_DEPTH),
            steps: 0,
        }
    }

    /// The graph being walked.
    #[must_use]
    pub fn graph(&self) -> &'a ValueGraph {
        self.graph
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Number of objects entered so far.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Drop `id` from the visited set after its children are done.
    pub fn leave(&mut self, id: NodeId) {
        self.visited.remove(id);
    }

    /// Classify a value, marking object identities as visited.
    pub fn enter(&mut self, value: &'a Value) -> Step<'a> {
        let Value::Object(id) = value else {
            return Step::Leaf(value);
        };
        let id = *id;

        if self.visited.contains(id) {
            return Step::Circular(id);
        }
        if self.depth >= self.max_depth || self.steps >= MAX_WALK_STEPS {
            return Step::LimitReached;
        }

        self.steps += 1;
        self.visited.insert(id);

        match self.graph.node(id) {
            None => Step::Unresolved(id),
            Some(Node::Sequence(items)) => Step::Sequence(id, items),
            Some(Node::Mapping(entries)) => Step::Mapping(id, entries),
            Some(Node::Date(millis)) => Step::Date(id, *millis),
            Some(Node::Opaque(kind)) => Step::Opaque(id, kind),
        }
    }

    /// Visit `value` with `action`, one level deeper than the caller.
    pub fn walk<A>(&mut self, value: &'a Value, action: &mut A) -> A::Output
    where
        A: NodeAction<'a>,
    {
        let step = self.enter(value);
        self.depth = self.depth.saturating_add(1);
        let output = action.visit(self, step);
        self.depth = self.depth.saturating_sub(1);
        output
    }
}

/// Walk `value` with `action`, threading a caller-owned visited set.
pub fn walk<'a, A>(
    graph: &'a ValueGraph,
    value: &'a Value,
    visited: &mut VisitedSet,
    action: &mut A,
) -> A::Output
where
    A: NodeAction<'a>,
{
    Walker::new(graph, visited).walk(value, action)
}

// =============================================================================
// TESTS
// =============================================================================
