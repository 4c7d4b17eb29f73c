//! # Value Graph
//!
//! Arena storage for object payloads.
//!
//! Objects live in a `BTreeMap<NodeId, Node>` and refer to each other through
//! `Value::Object(NodeId)` handles, so self references and shared references
//! are plain data. Ids are handed out monotonically and never reused.
//!
//! Node ids are only unique within one graph. Every graph (including a
//! clone) carries its own [`GraphId`], so caches can tell two graphs apart
//! even when their node ids coincide.

use crate::sanitized::Sanitized;
use crate::{Node, NodeId, PropguardError, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

/// Process-unique identity of one graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GraphId(u64);

impl GraphId {
    fn fresh() -> Self {
        Self(NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed))
    }
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// Arena of object nodes.
///
/// Uses `BTreeMap` for deterministic iteration order.
#[derive(Debug)]
pub struct ValueGraph {
    /// Arena identity
    id: GraphId,

    /// Node storage: NodeId -> Node
    nodes: BTreeMap<NodeId, Node>,

    /// Next available NodeId
    next_node_id: u64,
}

impl Default for ValueGraph {
    fn default() -> Self {
        Self {
            id: GraphId::fresh(),
            nodes: BTreeMap::new(),
            next_node_id: 0,
        }
    }
}

impl Clone for ValueGraph {
    /// A clone holds equal payloads under a new arena identity.
    fn clone(&self) -> Self {
        Self {
            id: GraphId::fresh(),
            nodes: self.nodes.clone(),
            next_node_id: self.next_node_id,
        }
    }
}

impl ValueGraph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// This arena's identity.
    #[must_use]
    pub fn id(&self) -> GraphId {
        self.id
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id = self.next_node_id.saturating_add(1);
        self.nodes.insert(id, node);
        id
    }

    /// Allocate a sequence node.
    pub fn sequence(&mut self, items: Vec<Value>) -> NodeId {
        self.alloc(Node::Sequence(items))
    }

    /// Allocate a mapping node.
    ///
    /// A repeated key replaces the earlier value but keeps its position.
    pub fn mapping<K, I>(&mut self, entries: I) -> NodeId
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut slots: Vec<(String, Value)> = Vec::new();
        let mut positions: BTreeMap<String, usize> = BTreeMap::new();
        for (key, value) in entries {
            let key = key.into();
            match positions.get(&key).and_then(|&at| slots.get_mut(at)) {
                Some(slot) => slot.1 = value,
                None => {
                    positions.insert(key.clone(), slots.len());
                    slots.push((key, value));
                }
            }
        }
        self.alloc(Node::Mapping(slots))
    }

    /// Allocate a date node from milliseconds since the epoch.
    pub fn date(&mut self, millis: i64) -> NodeId {
        self.alloc(Node::Date(millis))
    }

    /// Allocate an opaque platform object.
    pub fn opaque(&mut self, kind: impl Into<String>) -> NodeId {
        self.alloc(Node::Opaque(kind.into()))
    }

    /// Resolve a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Check if the graph contains a node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get the total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Assign `value` to `key` on a container node.
    ///
    /// On a mapping the entry is inserted or replaced. On a sequence the key
    /// is an index: `0..len` replaces, `len` appends.
    pub fn set(&mut self, id: NodeId, key: &str, value: Value) -> Result<(), PropguardError> {
        match self.nodes.get_mut(&id) {
            None => Err(PropguardError::UnknownNode(id)),
            Some(Node::Mapping(entries)) => {
                upsert(entries, key.to_string(), value);
                Ok(())
            }
            Some(Node::Sequence(items)) => {
                let len = items.len();
                let index: usize = key.parse().map_err(|_| {
                    PropguardError::InvalidDocument(format!("'{}' is not a sequence index", key))
                })?;
                if index < len {
                    items[index] = value;
                    Ok(())
                } else if index == len {
                    items.push(value);
                    Ok(())
                } else {
                    Err(PropguardError::IndexOutOfBounds {
                        node: id,
                        index,
                        len,
                    })
                }
            }
            Some(Node::Date(_) | Node::Opaque(_)) => Err(PropguardError::NotAContainer(id)),
        }
    }

    /// Replace the payload of an existing node, keeping its id.
    pub(crate) fn replace(&mut self, id: NodeId, node: Node) -> Result<(), PropguardError> {
        let slot = self
            .nodes
            .get_mut(&id)
            .ok_or(PropguardError::UnknownNode(id))?;
        *slot = node;
        Ok(())
    }

    /// Assign the value at position `index` of a container: a sequence
    /// element or the value of the `index`-th mapping entry.
    pub(crate) fn set_index(
        &mut self,
        id: NodeId,
        index: usize,
        value: Value,
    ) -> Result<(), PropguardError> {
        let (slot, len) = match self.nodes.get_mut(&id) {
            None => return Err(PropguardError::UnknownNode(id)),
            Some(Node::Sequence(items)) => {
                let len = items.len();
                (items.get_mut(index), len)
            }
            Some(Node::Mapping(entries)) => {
                let len = entries.len();
                (entries.get_mut(index).map(|(_, v)| v), len)
            }
            Some(Node::Date(_) | Node::Opaque(_)) => return Err(PropguardError::NotAContainer(id)),
        };
        let slot = slot.ok_or(PropguardError::IndexOutOfBounds {
            node: id,
            index,
            len,
        })?;
        *slot = value;
        Ok(())
    }

    /// Append a value to a sequence node.
    pub fn push(&mut self, id: NodeId, value: Value) -> Result<(), PropguardError> {
        match self.nodes.get_mut(&id) {
            None => Err(PropguardError::UnknownNode(id)),
            Some(Node::Sequence(items)) => {
                items.push(value);
                Ok(())
            }
            Some(_) => Err(PropguardError::NotAContainer(id)),
        }
    }

    /// Load a JSON tree into the arena. Every array and object becomes a
    /// fresh node, so the result is acyclic and unshared.
    pub fn insert_json(&mut self, json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.clone()),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                let values = items.iter().map(|item| self.insert_json(item)).collect();
                Value::Object(self.sequence(values))
            }
            serde_json::Value::Object(map) => {
                let entries: Vec<(String, Value)> = map
                    .iter()
                    .map(|(k, v)| (k.clone(), self.insert_json(v)))
                    .collect();
                Value::Object(self.mapping(entries))
            }
        }
    }

    /// Load a sanitized tree back into the arena.
    pub fn insert_sanitized(&mut self, tree: &Sanitized) -> Value {
        match tree {
            Sanitized::Undefined => Value::Undefined,
            Sanitized::Null => Value::Null,
            Sanitized::Bool(b) => Value::Bool(*b),
            Sanitized::Number(n) => Value::Number(n.clone()),
            Sanitized::String(s) => Value::String(s.clone()),
            Sanitized::Function(src) => Value::Function(src.clone()),
            Sanitized::Symbol(desc) => Value::Symbol(desc.clone()),
            Sanitized::Date(millis) => Value::Object(self.date(*millis)),
            Sanitized::Opaque(kind) => Value::Object(self.opaque(kind.clone())),
            Sanitized::Sequence(items) => {
                let values = items.iter().map(|item| self.insert_sanitized(item)).collect();
                Value::Object(self.sequence(values))
            }
            Sanitized::Mapping(entries) => {
                let values: Vec<(String, Value)> = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), self.insert_sanitized(v)))
                    .collect();
                Value::Object(self.mapping(values))
            }
        }
    }
}

/// Insert or replace a mapping entry, keeping the original position.
fn upsert(entries: &mut Vec<(String, Value)>, key: String, value: Value) {
    if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
        slot.1 = value;
    } else {
        entries.push((key, value));
    }
}

// =============================================================================
// TESTS
// =============================================================================
