//! # Graph Documents
//!
//! JSON text describing a possibly cyclic value graph.
//!
//! Plain JSON scalars, arrays and objects map to the obvious values. A few
//! single-key objects are special forms:
//!
//! | Form                         | Value                                  |
//! |------------------------------|----------------------------------------|
//! | `{"$ref": "#/a/0"}`          | reference to a container (JSON pointer)|
//! | `{"$date": 0}`               | date from epoch millis or RFC 3339     |
//! | `{"$function": "() => 1"}`   | callable with its source text          |
//! | `{"$symbol": "id"}`          | symbol with its description            |
//! | `{"$undefined": true}`       | `undefined`                            |
//! | `{"$opaque": "Window"}`      | platform object                        |
//!
//! References are resolved after the whole tree is built, so they may point
//! forward, backward or at an ancestor (which is how cycles are written).
//!
//! ## Limits
//!
//! - Input text is bounded by [`MAX_DOCUMENT_BYTES`], checked before parsing.
//! - The number of values is bounded by [`MAX_DOCUMENT_NODES`].

use crate::graph::ValueGraph;
use crate::primitives::MAX_DOCUMENT_NODES;
use crate::{Node, NodeId, PropguardError, Value};
use chrono::DateTime;
use std::collections::BTreeMap;

/// Maximum accepted document size in bytes.
pub const MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024; // 16 MB

/// A parsed document: the arena plus its root value.
#[derive(Debug, Clone)]
pub struct Document {
    pub graph: ValueGraph,
    pub root: Value,
}

impl Document {
    /// Root object id, if the root is an object.
    #[must_use]
    pub fn root_id(&self) -> Option<NodeId> {
        self.root.object_id()
    }
}

/// A reference waiting for its target to exist. `index` is the position
/// of the slot inside `parent`.
struct PendingRef {
    parent: NodeId,
    index: usize,
    target: String,
}

struct Builder {
    graph: ValueGraph,
    pointers: BTreeMap<String, NodeId>,
    pending: Vec<PendingRef>,
    values: usize,
}

impl Builder {
    fn new() -> Self {
        Self {
            graph: ValueGraph::new(),
            pointers: BTreeMap::new(),
            pending: Vec::new(),
            values: 0,
        }
    }

    fn count(&mut self) -> Result<(), PropguardError> {
        self.values = self.values.saturating_add(1);
        if self.values > MAX_DOCUMENT_NODES {
            return Err(PropguardError::DocumentTooLarge {
                limit: MAX_DOCUMENT_NODES,
            });
        }
        Ok(())
    }

    /// Build one JSON value. `slot` is the container and position it lands
    /// in; `None` for the root.
    ///
    /// A container is allocated before its children so references to it
    /// resolve, then filled in one pass.
    fn build(
        &mut self,
        json: &serde_json::Value,
        pointer: &str,
        slot: Option<(NodeId, usize)>,
    ) -> Result<Value, PropguardError> {
        self.count()?;

        match json {
            serde_json::Value::Null => Ok(Value::Null),
            serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
            serde_json::Value::Number(n) => Ok(Value::Number(n.clone())),
            serde_json::Value::String(s) => Ok(Value::String(s.clone())),
            serde_json::Value::Array(items) => {
                let id = self.graph.sequence(Vec::new());
                self.pointers.insert(pointer.to_string(), id);
                let mut values = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let child = format!("{}/{}", pointer, index);
                    values.push(self.build(item, &child, Some((id, index)))?);
                }
                self.graph.replace(id, Node::Sequence(values))?;
                Ok(Value::Object(id))
            }
            serde_json::Value::Object(map) => {
                if let Some(special) = self.special_form(map, pointer, slot)? {
                    return Ok(special);
                }
                let id = self.graph.mapping(Vec::<(String, Value)>::new());
                self.pointers.insert(pointer.to_string(), id);
                // JSON object keys are already unique.
                let mut entries = Vec::with_capacity(map.len());
                for (index, (key, item)) in map.iter().enumerate() {
                    let child = format!("{}/{}", pointer, escape_token(key));
                    let value = self.build(item, &child, Some((id, index)))?;
                    entries.push((key.clone(), value));
                }
                self.graph.replace(id, Node::Mapping(entries))?;
                Ok(Value::Object(id))
            }
        }
    }

    fn special_form(
        &mut self,
        map: &serde_json::Map<String, serde_json::Value>,
        pointer: &str,
        slot: Option<(NodeId, usize)>,
    ) -> Result<Option<Value>, PropguardError> {
        if map.len() != 1 {
            return Ok(None);
        }
        let Some((tag, payload)) = map.iter().next() else {
            return Ok(None);
        };

        let value = match tag.as_str() {
            "$ref" => {
                let target = payload
                    .as_str()
                    .ok_or_else(|| invalid(pointer, "$ref must be a string"))?;
                let (parent, index) = slot.ok_or_else(|| {
                    PropguardError::UnresolvedReference(format!("root cannot be a reference: {}", target))
                })?;
                self.pending.push(PendingRef {
                    parent,
                    index,
                    target: normalize_pointer(target),
                });
                // Replaced once every container exists.
                Value::Undefined
            }
            "$date" => {
                let millis = date_millis(payload).ok_or_else(|| {
                    invalid(pointer, "$date must be epoch millis or an RFC 3339 string")
                })?;
                Value::Object(self.graph.date(millis))
            }
            "$opaque" => {
                let kind = payload
                    .as_str()
                    .ok_or_else(|| invalid(pointer, "$opaque must be a string"))?;
                Value::Object(self.graph.opaque(kind))
            }
            "$function" => Value::Function(
                payload
                    .as_str()
                    .ok_or_else(|| invalid(pointer, "$function must be a string"))?
                    .to_string(),
            ),
            "$symbol" => Value::Symbol(
                payload
                    .as_str()
                    .ok_or_else(|| invalid(pointer, "$symbol must be a string"))?
                    .to_string(),
            ),
            "$undefined" => Value::Undefined,
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    fn resolve(mut self, root: Value) -> Result<Document, PropguardError> {
        for pending in std::mem::take(&mut self.pending) {
            let target = self.pointers.get(&pending.target).copied().ok_or_else(|| {
                PropguardError::UnresolvedReference(format!("#{}", pending.target))
            })?;
            self.graph
                .set_index(pending.parent, pending.index, Value::Object(target))?;
        }
        Ok(Document {
            graph: self.graph,
            root,
        })
    }
}

fn invalid(pointer: &str, message: &str) -> PropguardError {
    PropguardError::InvalidDocument(format!("at #{}: {}", pointer, message))
}

/// Escape a key as a JSON pointer token.
fn escape_token(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// `"#/a/0"` and `"/a/0"` both become `"/a/0"`; `"#"` becomes `""`.
fn normalize_pointer(pointer: &str) -> String {
    pointer.strip_prefix('#').unwrap_or(pointer).to_string()
}

fn date_millis(payload: &serde_json::Value) -> Option<i64> {
    match payload {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.timestamp_millis()),
        _ => None,
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Build a graph from an already parsed JSON document.
pub fn parse_document(json: &serde_json::Value) -> Result<Document, PropguardError> {
    let mut builder = Builder::new();
    let root = builder.build(json, "", None)?;
    builder.resolve(root)
}

/// Parse document text.
pub fn document_from_str(text: &str) -> Result<Document, PropguardError> {
    document_from_slice(text.as_bytes())
}

/// Parse document bytes. The size limit is checked before parsing.
pub fn document_from_slice(bytes: &[u8]) -> Result<Document, PropguardError> {
    if bytes.len() > MAX_DOCUMENT_BYTES {
        return Err(PropguardError::InvalidDocument(format!(
            "document is {} bytes, limit is {}",
            bytes.len(),
            MAX_DOCUMENT_BYTES
        )));
    }
    let json: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| PropguardError::SerializationError(e.to_string()))?;
    parse_document(&json)
}

// =============================================================================
// TESTS
// =============================================================================
