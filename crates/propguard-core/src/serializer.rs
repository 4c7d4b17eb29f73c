//! # Serializer
//!
//! Converts any value to a human/log-safe string.
//!
//! - `undefined` / `null` → `""`
//! - scalars → their textual form
//! - dates → ISO-8601
//! - sequences → JSON array of serialized elements
//! - mappings → JSON object of serialized values; function and symbol
//!   entries are omitted
//!
//! Only objects on the current path count as visited, so a shared object is
//! serialized at every place it appears. An edge back to an ancestor is
//! pruned from its parent: the entry or element simply does not appear.
//! Any other failure degrades that value to `"[Object]"`, including
//! composites whose text grows past `MAX_PRIMITIVE_LENGTH` and walks past
//! the step bound.

use crate::graph::ValueGraph;
use crate::primitives::{MAX_PRIMITIVE_LENGTH, MAX_SERIALIZED_BYTES, OBJECT_FALLBACK};
use crate::sanitized::iso_timestamp;
use crate::types::number_text;
use crate::walker::{NodeAction, Step, VisitedSet, Walker, walk};
use crate::{NodeId, Value};

/// Serializer action. `None` marks a pruned (circular) value.
#[derive(Default)]
struct ToPrimitive {
    /// Bytes of text produced so far.
    produced: usize,
}

impl ToPrimitive {
    fn account(&mut self, text: String) -> Option<String> {
        self.produced = self.produced.saturating_add(text.len());
        Some(text)
    }

    /// Build the text of object `id` unless the output budget is spent,
    /// then take `id` off the current path.
    fn object<'a, F>(
        &mut self,
        walker: &mut Walker<'a, '_>,
        id: NodeId,
        build: F,
    ) -> Option<String>
    where
        F: for<'w> FnOnce(&mut Self, &mut Walker<'a, 'w>) -> String,
    {
        let text = if self.produced > MAX_SERIALIZED_BYTES {
            tracing::debug!(produced = self.produced, "output budget spent, using fallback");
            OBJECT_FALLBACK.to_string()
        } else {
            build(self, walker)
        };
        walker.leave(id);
        self.account(text)
    }
}

impl<'a> NodeAction<'a> for ToPrimitive {
    type Output = Option<String>;

    fn visit(&mut self, walker: &mut Walker<'a, '_>, step: Step<'a>) -> Option<String> {
        match step {
            Step::Leaf(value) => self.account(leaf_text(value)),
            Step::Circular(_) => None,
            Step::Date(id, millis) => self.object(walker, id, |_, _| {
                iso_timestamp(millis).unwrap_or_else(|| {
                    tracing::debug!(millis, "date out of range, using fallback");
                    OBJECT_FALLBACK.to_string()
                })
            }),
            // Platform objects expose no enumerable entries.
            Step::Opaque(id, _) => self.object(walker, id, |_, _| "{}".to_string()),
            Step::Sequence(id, items) => self.object(walker, id, |this, walker| {
                let parts: Vec<String> = items
                    .iter()
                    .filter_map(|item| walker.walk(item, this))
                    .collect();
                encode(&parts)
            }),
            Step::Mapping(id, entries) => self.object(walker, id, |this, walker| {
                let mut map = serde_json::Map::new();
                for (key, value) in entries {
                    if value.is_callable_or_symbol() {
                        continue;
                    }
                    if let Some(text) = walker.walk(value, this) {
                        map.insert(key.clone(), serde_json::Value::String(text));
                    }
                }
                encode(&map)
            }),
            Step::Unresolved(id) => {
                tracing::debug!(node = id.0, "unresolved node, using fallback");
                Some(OBJECT_FALLBACK.to_string())
            }
            Step::LimitReached => {
                tracing::debug!(
                    depth = walker.depth(),
                    steps = walker.steps(),
                    "walk limit reached, using fallback"
                );
                Some(OBJECT_FALLBACK.to_string())
            }
        }
    }
}

fn leaf_text(value: &Value) -> String {
    match value {
        Value::Undefined | Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::String(s) | Value::Function(s) => s.clone(),
        Value::Symbol(desc) => format!("Symbol({})", desc),
        // Objects never reach a leaf step.
        Value::Object(_) => OBJECT_FALLBACK.to_string(),
    }
}

fn encode<T: serde::Serialize + ?Sized>(payload: &T) -> String {
    match serde_json::to_string(payload) {
        Ok(text) if text.len() <= MAX_PRIMITIVE_LENGTH => text,
        Ok(text) => {
            tracing::debug!(len = text.len(), "serialized composite too long, using fallback");
            OBJECT_FALLBACK.to_string()
        }
        Err(e) => {
            tracing::debug!(error = %e, "error converting object to primitive");
            OBJECT_FALLBACK.to_string()
        }
    }
}

/// Convert any value to a plain string. Never fails.
#[must_use]
pub fn to_primitive(graph: &ValueGraph, value: &Value) -> String {
    walk(graph, value, &mut VisitedSet::new(), &mut ToPrimitive::default())
        .unwrap_or_else(|| OBJECT_FALLBACK.to_string())
}

// =============================================================================
// TESTS
// =============================================================================
