//! # Circular Reference Stripper
//!
//! Structure-preserving copy of a value graph into an owned [`Sanitized`]
//! tree. Every edge that would revisit an already visited identity becomes
//! the `"[Circular]"` string; everything else is copied exactly.

use crate::graph::ValueGraph;
use crate::primitives::OBJECT_FALLBACK;
use crate::sanitized::Sanitized;
use crate::walker::{NodeAction, Step, VisitedSet, Walker, walk};
use crate::Value;

struct Strip;

impl<'a> NodeAction<'a> for Strip {
    type Output = Sanitized;

    fn visit(&mut self, walker: &mut Walker<'a, '_>, step: Step<'a>) -> Sanitized {
        match step {
            Step::Leaf(value) => leaf_copy(value),
            Step::Circular(_) => Sanitized::circular(),
            Step::Sequence(_, items) => Sanitized::Sequence(
                items.iter().map(|item| walker.walk(item, self)).collect(),
            ),
            Step::Mapping(_, entries) => Sanitized::Mapping(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), walker.walk(value, self)))
                    .collect(),
            ),
            Step::Date(_, millis) => Sanitized::Date(millis),
            Step::Opaque(_, kind) => Sanitized::Opaque(kind.to_string()),
            Step::Unresolved(_) | Step::LimitReached => {
                Sanitized::String(OBJECT_FALLBACK.to_string())
            }
        }
    }
}

fn leaf_copy(value: &Value) -> Sanitized {
    match value {
        Value::Undefined => Sanitized::Undefined,
        Value::Null => Sanitized::Null,
        Value::Bool(b) => Sanitized::Bool(*b),
        Value::Number(n) => Sanitized::Number(n.clone()),
        Value::String(s) => Sanitized::String(s.clone()),
        Value::Function(src) => Sanitized::Function(src.clone()),
        Value::Symbol(desc) => Sanitized::Symbol(desc.clone()),
        Value::Object(_) => Sanitized::String(OBJECT_FALLBACK.to_string()),
    }
}

/// Create a safe, acyclic copy of `value`.
#[must_use]
pub fn remove_circular_references(graph: &ValueGraph, value: &Value) -> Sanitized {
    remove_circular_references_with(graph, value, &mut VisitedSet::new())
}

/// Same as [`remove_circular_references`], threading a caller-supplied set.
pub fn remove_circular_references_with(
    graph: &ValueGraph,
    value: &Value,
    visited: &mut VisitedSet,
) -> Sanitized {
    walk(graph, value, visited, &mut Strip)
}

// =============================================================================
// TESTS
// =============================================================================
