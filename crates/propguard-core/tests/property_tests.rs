//! # Property-Based Tests
//!
//! Invariants of the walker-derived operations over generated JSON trees,
//! trees with a back edge, and documents with arbitrary `$ref` edges.

use proptest::collection::{btree_map, vec};
use proptest::prelude::*;
use propguard_core::primitives::OBJECT_FALLBACK;
use propguard_core::{
    Sanitized, Value, ValueGraph, has_circular_references, parse_document,
    remove_circular_references, safe_stringify, to_primitive,
};
use serde_json::json;

// =============================================================================
// STRATEGIES
// =============================================================================

/// Arbitrary JSON without floats (integers, strings, bools, null, nesting).
fn json_tree() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z ]{0,12}".prop_map(serde_json::Value::String),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
            btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
        ]
    })
}

/// A JSON object root.
fn json_object() -> impl Strategy<Value = serde_json::Value> {
    btree_map("[a-z]{1,6}", json_tree(), 0..6)
        .prop_map(|m| serde_json::Value::Object(m.into_iter().collect()))
}

/// One slot of a generated node: a scalar or a reference to node `k`.
#[derive(Debug, Clone)]
enum Slot {
    Scalar(serde_json::Value),
    Ref(usize),
}

/// A document `{"n0": .., "n1": .., ...}` whose nodes hold scalars and
/// `$ref`s to any node, so self loops, shared nodes and nested cycles all
/// occur. Even nodes are objects, odd nodes are arrays.
fn graph_document() -> impl Strategy<Value = (usize, serde_json::Value)> {
    (1usize..6).prop_flat_map(|n| {
        let slot = prop_oneof![
            prop_oneof![
                Just(serde_json::Value::Null),
                any::<i32>().prop_map(|v| json!(v)),
                "[a-z]{0,6}".prop_map(serde_json::Value::String),
            ]
            .prop_map(Slot::Scalar),
            (0..n).prop_map(Slot::Ref),
        ];
        vec(vec(slot, 0..4), n).prop_map(move |nodes| (n, document_of(&nodes)))
    })
}

fn document_of(nodes: &[Vec<Slot>]) -> serde_json::Value {
    let mut root = serde_json::Map::new();
    for (i, slots) in nodes.iter().enumerate() {
        let values: Vec<serde_json::Value> = slots
            .iter()
            .map(|slot| match slot {
                Slot::Scalar(v) => v.clone(),
                Slot::Ref(k) => json!({ "$ref": format!("#/n{}", k) }),
            })
            .collect();
        let node = if i % 2 == 0 {
            serde_json::Value::Object(
                values
                    .into_iter()
                    .enumerate()
                    .map(|(j, v)| (format!("c{}", j), v))
                    .collect(),
            )
        } else {
            serde_json::Value::Array(values)
        };
        root.insert(format!("n{}", i), node);
    }
    serde_json::Value::Object(root)
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Acyclic input survives stripping unchanged.
    #[test]
    fn strip_round_trips_acyclic_trees(json in json_tree()) {
        let mut graph = ValueGraph::new();
        let root = graph.insert_json(&json);

        let stripped = remove_circular_references(&graph, &root);
        prop_assert_eq!(&stripped, &Sanitized::from(&json));
        prop_assert_eq!(stripped.to_json(), json);
    }

    /// Freshly inserted JSON never has cycles.
    #[test]
    fn inserted_json_is_acyclic(json in json_tree()) {
        let mut graph = ValueGraph::new();
        let root = graph.insert_json(&json);
        prop_assert!(!has_circular_references(&graph, &root));
    }

    /// Adding a back edge to the root is always detected and replaced.
    #[test]
    fn back_edge_is_detected_and_stripped(json in json_object(), key in "[A-Z]{1,4}") {
        let mut graph = ValueGraph::new();
        let root = graph.insert_json(&json);
        let id = root.object_id().expect("object root");
        graph.set(id, &key, Value::Object(id)).expect("set");

        prop_assert!(has_circular_references(&graph, &root));

        let stripped = remove_circular_references(&graph, &root);
        prop_assert!(stripped.get(&key).is_some_and(Sanitized::is_circular_marker));
        prop_assert!(stripped.circular_count() >= 1);
    }

    /// Stripping twice equals stripping once.
    #[test]
    fn strip_is_idempotent(json in json_object(), key in "[A-Z]{1,4}") {
        let mut graph = ValueGraph::new();
        let root = graph.insert_json(&json);
        let id = root.object_id().expect("object root");
        graph.set(id, &key, Value::Object(id)).expect("set");

        let once = remove_circular_references(&graph, &root);
        let reloaded = graph.insert_sanitized(&once);
        let twice = remove_circular_references(&graph, &reloaded);

        prop_assert_eq!(once, twice);
        prop_assert!(!has_circular_references(&graph, &reloaded));
    }

    /// The serializer and the stringifier are total, even on cyclic graphs.
    #[test]
    fn text_operations_are_total(json in json_object(), key in "[A-Z]{1,4}") {
        let mut graph = ValueGraph::new();
        let root = graph.insert_json(&json);
        let id = root.object_id().expect("object root");
        graph.set(id, &key, Value::Object(id)).expect("set");

        let text = to_primitive(&graph, &root);
        prop_assert!(serde_json::from_str::<serde_json::Value>(&text).is_ok());

        let pretty = safe_stringify(&graph, &root);
        prop_assert!(serde_json::from_str::<serde_json::Value>(&pretty).is_ok());
    }

    /// The cyclic entry is pruned from the serialized mapping.
    #[test]
    fn serializer_prunes_back_edge(json in json_object(), key in "[A-Z]{1,4}") {
        let mut graph = ValueGraph::new();
        let root = graph.insert_json(&json);
        let id = root.object_id().expect("object root");
        graph.set(id, &key, Value::Object(id)).expect("set");

        let text = to_primitive(&graph, &root);
        let parsed: serde_json::Value = serde_json::from_str(&text).expect("json");
        prop_assert!(parsed.get(&key).is_none());
    }

    /// Strings serialize to themselves.
    #[test]
    fn strings_are_their_own_primitive(s in ".{0,40}") {
        let graph = ValueGraph::new();
        prop_assert_eq!(to_primitive(&graph, &Value::from(s.as_str())), s);
    }

    /// Plain JSON documents parse to the same tree.
    #[test]
    fn plain_documents_round_trip(json in json_tree()) {
        let doc = parse_document(&json).expect("parse");
        prop_assert_eq!(remove_circular_references(&doc.graph, &doc.root).to_json(), json);
    }

    /// Detection agrees with the stripper on arbitrary reference graphs.
    #[test]
    fn detector_agrees_with_stripper((_, doc) in graph_document()) {
        let doc = parse_document(&doc).expect("parse");
        let stripped = remove_circular_references(&doc.graph, &doc.root);
        prop_assert_eq!(
            has_circular_references(&doc.graph, &doc.root),
            stripped.circular_count() > 0
        );
    }

    /// Stripped output is acyclic and a fixed point on arbitrary graphs.
    #[test]
    fn stripping_reference_graphs_is_idempotent((_, doc) in graph_document()) {
        let mut doc = parse_document(&doc).expect("parse");
        let once = remove_circular_references(&doc.graph, &doc.root);
        let reloaded = doc.graph.insert_sanitized(&once);

        prop_assert!(!has_circular_references(&doc.graph, &reloaded));
        prop_assert_eq!(remove_circular_references(&doc.graph, &reloaded), once);
    }

    /// The serializer keeps every top-level node, shared or not, and the
    /// text operations stay total.
    #[test]
    fn text_operations_on_reference_graphs((n, doc) in graph_document()) {
        let doc = parse_document(&doc).expect("parse");

        let text = to_primitive(&doc.graph, &doc.root);
        if text != OBJECT_FALLBACK {
            let parsed: serde_json::Value = serde_json::from_str(&text).expect("json");
            prop_assert_eq!(parsed.as_object().map(serde_json::Map::len), Some(n));
        }

        let pretty = safe_stringify(&doc.graph, &doc.root);
        prop_assert!(serde_json::from_str::<serde_json::Value>(&pretty).is_ok());
    }
}
