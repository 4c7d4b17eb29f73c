//! # Debug Stringify
//!
//! Pretty, log-oriented JSON text for any value.
//!
//! The value is first stripped of circular references, then projected with
//! the debug replacer rules ([`JsonStyle::Debug`]) and printed with a
//! two-space indent.

use crate::graph::ValueGraph;
use crate::primitives::UNSTRINGIFIABLE;
use crate::sanitized::{JsonStyle, Sanitized};
use crate::stripper::remove_circular_references;
use crate::Value;

/// Stringify `value` for a log line. Never fails.
#[must_use]
pub fn safe_stringify(graph: &ValueGraph, value: &Value) -> String {
    stringify_sanitized(&remove_circular_references(graph, value))
}

/// Stringify an already sanitized tree.
///
/// A top-level value with no JSON form prints as `undefined`.
#[must_use]
pub fn stringify_sanitized(tree: &Sanitized) -> String {
    let Some(json) = tree.to_json_with(JsonStyle::Debug) else {
        return "undefined".to_string();
    };
    serde_json::to_string_pretty(&json).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "failed to stringify value");
        UNSTRINGIFIABLE.to_string()
    })
}
