//! # Circular Reference Detector
//!
//! Boolean predicate over a value graph: does a depth-first walk revisit an
//! object identity?

use crate::graph::ValueGraph;
use crate::walker::{NodeAction, Step, VisitedSet, Walker, walk};
use crate::Value;

struct Detect;

impl<'a> NodeAction<'a> for Detect {
    type Output = bool;

    fn visit(&mut self, walker: &mut Walker<'a, '_>, step: Step<'a>) -> bool {
        match step {
            Step::Circular(_) => true,
            Step::Sequence(_, items) => items.iter().any(|item| walker.walk(item, self)),
            Step::Mapping(_, entries) => entries.iter().any(|(_, value)| walker.walk(value, self)),
            Step::Leaf(_)
            | Step::Date(..)
            | Step::Opaque(..)
            | Step::Unresolved(_)
            | Step::LimitReached => false,
        }
    }
}

/// Check whether `value` revisits an object identity.
///
/// Non-object values always yield `false`. Stops at the first revisit.
#[must_use]
pub fn has_circular_references(graph: &ValueGraph, value: &Value) -> bool {
    has_circular_references_with(graph, value, &mut VisitedSet::new())
}

/// Same as [`has_circular_references`], threading a caller-supplied set.
pub fn has_circular_references_with(
    graph: &ValueGraph,
    value: &Value,
    visited: &mut VisitedSet,
) -> bool {
    walk(graph, value, visited, &mut Detect)
}

// =============================================================================
// TESTS
// =============================================================================
