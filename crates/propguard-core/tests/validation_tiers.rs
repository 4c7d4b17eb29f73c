//! # Validation Tier Tests (T0-T3)
//!
//! If ANY tier fails, the system is INVALID.
//!
//! ## Tiers
//! - T0: Graph Integrity
//! - T1: Cycle Detection
//! - T2: Safe Serialization
//! - T3: Render Pipeline

use propguard_core::{
    Channel, ComponentHost, Diagnostics, DiagnosticsConfig, ErrorBoundary, MemorySink, Node,
    NodeId, PropguardError, RenderError, Rendered, Sanitized, Value, ValueGraph,
    document_from_str, has_circular_references, primitive_child, remove_circular_references,
    safe_stringify, to_primitive,
};
use serde_json::json;
use std::sync::Arc;

/// `{name: "test", self: <self>}`
fn self_referencing(graph: &mut ValueGraph) -> NodeId {
    let obj = graph.mapping([("name", Value::from("test"))]);
    graph.set(obj, "self", Value::Object(obj)).expect("set");
    obj
}

// =============================================================================
// TIER T0: GRAPH INTEGRITY
// =============================================================================

mod t0_graph_integrity {
    use super::*;

    /// T0.1: Object identity is the node id, not the structure.
    #[test]
    fn identity_is_not_structural() {
        let mut graph = ValueGraph::new();
        let a = graph.mapping([("v", Value::from(1i64))]);
        let b = graph.mapping([("v", Value::from(1i64))]);

        assert_ne!(a, b);
        assert_eq!(graph.node(a), graph.node(b));
    }

    /// T0.2: Assigning through a missing id fails cleanly.
    #[test]
    fn unknown_node_rejected() {
        let mut graph = ValueGraph::new();
        let result = graph.set(NodeId(42), "x", Value::Null);
        assert!(matches!(result, Err(PropguardError::UnknownNode(NodeId(42)))));
    }

    /// T0.3: Documents write cycles with `$ref`.
    #[test]
    fn document_cycle_matches_built_cycle() {
        let doc = document_from_str(r##"{"name": "test", "self": {"$ref": "#"}}"##)
            .expect("parse");
        let id = doc.root_id().expect("object root");

        let mut graph = ValueGraph::new();
        let built = self_referencing(&mut graph);

        let Some(Node::Mapping(parsed)) = doc.graph.node(id) else {
            unreachable!("mapping expected");
        };
        let Some(Node::Mapping(expected)) = graph.node(built) else {
            unreachable!("mapping expected");
        };
        assert_eq!(parsed.len(), expected.len());
        assert_eq!(parsed[1].1, Value::Object(id));
    }
}

// =============================================================================
// TIER T1: CYCLE DETECTION
// =============================================================================

mod t1_cycle_detection {
    use super::*;

    /// T1.1: A self reference is detected.
    #[test]
    fn self_reference_detected() {
        let mut graph = ValueGraph::new();
        let obj = self_referencing(&mut graph);
        assert!(has_circular_references(&graph, &Value::Object(obj)));
    }

    /// T1.2: A nested acyclic object is clean.
    #[test]
    fn acyclic_object_clean() {
        let mut graph = ValueGraph::new();
        let root = graph.insert_json(&json!({"name": "test", "nested": {"value": 123}}));
        assert!(!has_circular_references(&graph, &root));
    }

    /// T1.3: A long indirect cycle is detected.
    #[test]
    fn long_cycle_detected() {
        let mut graph = ValueGraph::new();
        let first = graph.mapping(Vec::<(String, Value)>::new());
        let mut current = first;
        for _ in 0..100 {
            let next = graph.mapping(Vec::<(String, Value)>::new());
            graph.set(current, "next", Value::Object(next)).expect("set");
            current = next;
        }
        assert!(!has_circular_references(&graph, &Value::Object(first)));

        graph.set(current, "next", Value::Object(first)).expect("close");
        assert!(has_circular_references(&graph, &Value::Object(first)));
    }
}

// =============================================================================
// TIER T2: SAFE SERIALIZATION
// =============================================================================

mod t2_safe_serialization {
    use super::*;

    /// T2.1: Null serializes to the empty string.
    #[test]
    fn null_is_empty() {
        let graph = ValueGraph::new();
        assert_eq!(to_primitive(&graph, &Value::Null), "");
    }

    /// T2.2: Numbers serialize to their text.
    #[test]
    fn number_text() {
        let graph = ValueGraph::new();
        assert_eq!(to_primitive(&graph, &Value::from(123i64)), "123");
    }

    /// T2.3: Mapping values are serialized recursively.
    #[test]
    fn mapping_values_are_strings() {
        let mut graph = ValueGraph::new();
        let root = graph.insert_json(&json!({"name": "test", "value": 123}));
        assert_eq!(to_primitive(&graph, &root), r#"{"name":"test","value":"123"}"#);
    }

    /// T2.4: The serializer prunes the cyclic entry.
    #[test]
    fn cyclic_entry_pruned() {
        let mut graph = ValueGraph::new();
        let obj = self_referencing(&mut graph);
        assert_eq!(to_primitive(&graph, &Value::Object(obj)), r#"{"name":"test"}"#);
    }

    /// T2.5: The stripper replaces the cyclic entry.
    #[test]
    fn cyclic_entry_replaced() {
        let mut graph = ValueGraph::new();
        let obj = self_referencing(&mut graph);
        let result = remove_circular_references(&graph, &Value::Object(obj));
        assert_eq!(result.to_json(), json!({"name": "test", "self": "[Circular]"}));
    }

    /// T2.6: Acyclic input comes back unchanged.
    #[test]
    fn acyclic_round_trip() {
        let json = json!({"name": "test", "nested": {"value": 123}});
        let mut graph = ValueGraph::new();
        let root = graph.insert_json(&json);
        assert_eq!(remove_circular_references(&graph, &root), Sanitized::from(&json));
    }

    /// T2.7: Debug stringify never fails on cycles.
    #[test]
    fn debug_stringify_handles_cycles() {
        let mut graph = ValueGraph::new();
        let obj = self_referencing(&mut graph);
        let text = safe_stringify(&graph, &Value::Object(obj));
        let parsed: serde_json::Value = serde_json::from_str(&text).expect("json");
        assert_eq!(parsed, json!({"name": "test", "self": "[Circular]"}));
    }
}

// =============================================================================
// TIER T3: RENDER PIPELINE
// =============================================================================

mod t3_render_pipeline {
    use super::*;

    fn recording() -> (Diagnostics, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (Diagnostics::new(DiagnosticsConfig::enabled(), sink.clone()), sink)
    }

    /// T3.1: A failing child is caught, reported and shown as fallback.
    #[test]
    fn boom_scenario() {
        let graph = ValueGraph::new();
        let (diagnostics, sink) = recording();
        let mut boundary = ErrorBoundary::new("X");

        let out = boundary.render(&graph, &Value::Null, &diagnostics, || {
            Err::<(), _>(RenderError::new("boom"))
        });
        let Rendered::Fallback(view) = out else {
            unreachable!("fallback expected");
        };
        assert_eq!(view.title, "Error in X");
        assert_eq!(view.message, "boom");
        assert_eq!(sink.on_channel(Channel::Error).len(), 1);

        boundary.on_retry();
        let retried = boundary.render(&graph, &Value::Null, &diagnostics, || Ok(()));
        assert_eq!(retried, Rendered::Children(()));
    }

    /// T3.2: Diagnostics are silent when disabled.
    #[test]
    fn disabled_diagnostics_are_silent() {
        let sink = Arc::new(MemorySink::new());
        let mut host = ComponentHost::new(Diagnostics::new(DiagnosticsConfig::default(), sink.clone()));
        let mut graph = ValueGraph::new();
        let obj = self_referencing(&mut graph);

        let out = host.render("Card", &graph, &Value::Object(obj), |_, _, _| {
            Err::<String, _>(RenderError::new("boom"))
        });
        assert!(out.output.is_fallback());
        assert!(sink.is_empty());
    }

    /// T3.3: The host renders cyclic props safely and memoizes them.
    #[test]
    fn host_renders_cyclic_props() {
        let (diagnostics, sink) = recording();
        let mut host = ComponentHost::new(diagnostics);
        let mut graph = ValueGraph::new();
        let obj = self_referencing(&mut graph);
        let props = Value::Object(obj);

        let first = host.render("Card", &graph, &props, primitive_child);
        let second = host.render("Card", &graph, &props, primitive_child);

        assert_eq!(first.output, Rendered::Children(r#"{"name":"test"}"#.to_string()));
        assert_eq!(second.render_count, 2);
        assert_eq!(second.props.circular_count(), 1);
        assert_eq!(host.mount("Card").map(|m| m.props.computations()), Some(1));
        assert_eq!(sink.on_channel(Channel::Component).len(), 2);
    }
}
