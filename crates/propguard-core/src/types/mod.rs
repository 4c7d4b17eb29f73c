//! # Core Type Definitions
//!
//! This module contains the core types of the propguard value graph:
//! - Identity tokens (`NodeId`)
//! - Handle-level values (`Value`) and arena payloads (`Node`)
//! - Error types (`PropguardError`, `RenderError`)
//!
//! ## Identity
//!
//! A `Value::Object` never owns its payload. It carries a `NodeId` that
//! resolves inside a [`ValueGraph`](crate::ValueGraph). Two structurally equal
//! objects with different ids are different objects; this is what makes
//! cycles and shared references expressible at all.

use serde::{Deserialize, Serialize};
use serde_json::Number;
use thiserror::Error;

// =============================================================================
// IDENTITY
// =============================================================================

/// Stable identity of an object inside a value graph.
///
/// Visited sets are keyed by this token, never by structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

// =============================================================================
// VALUE
// =============================================================================

/// A handle-level datum.
///
/// Everything except `Object` is a non-object value: it terminates traversal
/// immediately and can never take part in a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// Absent value (`undefined`).
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// A callable. Carries its source text, which is also its string form.
    Function(String),
    /// A symbol with its description.
    Symbol(String),
    /// Reference to an object stored in the graph arena.
    Object(NodeId),
}

impl Value {
    /// Build a number value from a float.
    ///
    /// Returns `None` for NaN and infinities, which have no JSON form.
    #[must_use]
    pub fn float(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Self::Number)
    }

    /// The object identity, if this value is an object reference.
    #[must_use]
    pub const fn object_id(&self) -> Option<NodeId> {
        match self {
            Self::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Functions and symbols are dropped from serialized mappings.
    #[must_use]
    pub const fn is_callable_or_symbol(&self) -> bool {
        matches!(self, Self::Function(_) | Self::Symbol(_))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Self::Object(id)
    }
}

/// Textual form of a number, as the host runtime would print it.
///
/// - Integral floats print without a fractional part (`1.0` → `"1"`).
/// - Negative zero prints as `"0"`.
/// - Magnitudes of `1e21` and above, or below `1e-6`, use the shortest
///   exponent form with an explicit sign (`1e+21`, `1.5e-7`).
#[must_use]
pub fn number_text(number: &Number) -> String {
    if number.is_i64() || number.is_u64() {
        return number.to_string();
    }
    match number.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.abs() >= 1e21 || f.abs() < 1e-6 => {
            let text = format!("{:e}", f);
            match text.split_once('e') {
                Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                    format!("{}e+{}", mantissa, exponent)
                }
                _ => text,
            }
        }
        Some(f) => format!("{}", f),
        None => number.to_string(),
    }
}

// =============================================================================
// NODE
// =============================================================================

/// Object payload stored in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Ordered sequence (array).
    Sequence(Vec<Value>),
    /// Key/value mapping. Keys are unique and keep insertion order.
    Mapping(Vec<(String, Value)>),
    /// Date as milliseconds since the Unix epoch.
    Date(i64),
    /// Platform object with no enumerable content, named by its kind
    /// (`Window`, `Element`, `RegExp`, ...).
    Opaque(String),
}

impl Node {
    /// Whether this node holds child values.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Self::Sequence(_) | Self::Mapping(_))
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the fallible construction APIs.
///
/// The traversal operations themselves (`to_primitive`,
/// `has_circular_references`, `remove_circular_references`) never return
/// errors; failures there degrade to sentinel values.
#[derive(Debug, Error)]
pub enum PropguardError {
    /// The node does not exist in the graph.
    #[error("Node not found: {0:?}")]
    UnknownNode(NodeId),

    /// The node exists but cannot hold children.
    #[error("Node is not a container: {0:?}")]
    NotAContainer(NodeId),

    /// A sequence slot outside `0..=len` was addressed.
    #[error("Index {index} out of bounds for sequence {node:?} of length {len}")]
    IndexOutOfBounds {
        node: NodeId,
        index: usize,
        len: usize,
    },

    /// A graph document is malformed.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// A `$ref` pointer does not name a container in the document.
    #[error("Unresolved reference: {0}")]
    UnresolvedReference(String),

    /// A graph document exceeds the node limit.
    #[error("Document has more than {limit} values")]
    DocumentTooLarge { limit: usize },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Failure raised by rendering code inside an error boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct RenderError {
    /// Human-readable message, shown in the fallback view.
    pub message: String,
    /// Component that raised the error, when known.
    pub component: Option<String>,
}

impl RenderError {
    /// Create a render error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            component: None,
        }
    }

    /// Attribute the error to a component.
    #[must_use]
    pub fn in_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_text_matches_runtime_form() {
        assert_eq!(number_text(&Number::from(123)), "123");
        assert_eq!(number_text(&Number::from(-7)), "-7");
        assert_eq!(number_text(&Number::from_f64(1.5).expect("finite")), "1.5");
        assert_eq!(number_text(&Number::from_f64(2.0).expect("finite")), "2");
        assert_eq!(number_text(&Number::from_f64(-0.0).expect("finite")), "0");
    }

    #[test]
    fn number_text_switches_to_exponent_form() {
        let text = |f: f64| number_text(&Number::from_f64(f).expect("finite"));
        assert_eq!(text(1e21), "1e+21");
        assert_eq!(text(-2.5e30), "-2.5e+30");
        assert_eq!(text(1e-7), "1e-7");
        assert_eq!(text(1.5e-7), "1.5e-7");
        assert_eq!(text(1e20), "100000000000000000000");
        assert_eq!(text(0.000001), "0.000001");
        assert_eq!(text(123456.789), "123456.789");
    }

    #[test]
    fn float_rejects_non_finite() {
        assert!(Value::float(f64::NAN).is_none());
        assert!(Value::float(f64::INFINITY).is_none());
        assert_eq!(Value::float(0.25), Some(Value::Number(Number::from_f64(0.25).expect("finite"))));
    }

    #[test]
    fn object_id_only_for_objects() {
        assert_eq!(Value::Object(NodeId(3)).object_id(), Some(NodeId(3)));
        assert_eq!(Value::from("x").object_id(), None);
        assert_eq!(Value::Null.object_id(), None);
    }

    #[test]
    fn render_error_displays_message() {
        let err = RenderError::new("boom").in_component("RevenueChart");
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.component.as_deref(), Some("RevenueChart"));
    }
}
