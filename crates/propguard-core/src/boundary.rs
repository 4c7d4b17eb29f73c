//! # Error Boundary
//!
//! Failure interceptor around a component subtree.
//!
//! A boundary is a small state machine:
//!
//! ```text
//! Healthy --(child render fails)--> Failed(error)
//! Failed  --(retry)--------------> Healthy
//! ```
//!
//! While `Failed`, the children are never invoked; the boundary renders a
//! fallback panel instead. A named boundary reports each caught error on the
//! `error` channel with the component name, the message and the props
//! converted by [`to_primitive`].

use crate::diagnostics::Diagnostics;
use crate::graph::ValueGraph;
use crate::serializer::to_primitive;
use crate::{RenderError, Value};
use serde::{Deserialize, Serialize};

/// Title of the fallback panel of an unnamed boundary.
pub const DEFAULT_FALLBACK_TITLE: &str = "Something went wrong";

/// Label of the retry control on a named boundary's panel.
pub const RETRY_LABEL: &str = "Try again";

/// Boundary state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum BoundaryState {
    #[default]
    Healthy,
    Failed(RenderError),
}

impl BoundaryState {
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// The panel shown in place of a failed subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackView {
    pub title: String,
    pub message: String,
    /// Present when the panel offers a retry control.
    pub retry_label: Option<String>,
}

/// Result of rendering through a boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "output", rename_all = "lowercase")]
pub enum Rendered<T> {
    /// The children rendered normally.
    Children(T),
    /// The boundary is showing its fallback.
    Fallback(FallbackView),
}

impl<T> Rendered<T> {
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Error boundary around one component subtree.
#[derive(Debug, Clone, Default)]
pub struct ErrorBoundary {
    name: Option<String>,
    fallback: Option<FallbackView>,
    state: BoundaryState,
    errors_caught: u64,
}

impl ErrorBoundary {
    /// A named boundary: reports errors and offers a retry control.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// An unnamed boundary with the generic fallback panel.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Replace the built-in fallback panel.
    #[must_use]
    pub fn with_fallback(mut self, fallback: FallbackView) -> Self {
        self.fallback = Some(fallback);
        self
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> &BoundaryState {
        &self.state
    }

    /// Number of errors captured so far.
    #[must_use]
    pub fn errors_caught(&self) -> u64 {
        self.errors_caught
    }

    /// Render the subtree, or the fallback when failed.
    ///
    /// `children` runs only in the `Healthy` state. An error it returns is
    /// captured once through [`on_error`](Self::on_error) and the fallback
    /// is rendered in the same pass.
    pub fn render<T, F>(
        &mut self,
        graph: &ValueGraph,
        props: &Value,
        diagnostics: &Diagnostics,
        children: F,
    ) -> Rendered<T>
    where
        F: FnOnce() -> Result<T, RenderError>,
    {
        if let BoundaryState::Failed(error) = &self.state {
            return Rendered::Fallback(self.fallback_view(error));
        }

        match children() {
            Ok(output) => Rendered::Children(output),
            Err(error) => {
                let view = self.fallback_view(&error);
                self.on_error(error, graph, props, diagnostics);
                Rendered::Fallback(view)
            }
        }
    }

    /// Capture an error raised by the subtree.
    pub fn on_error(
        &mut self,
        error: RenderError,
        graph: &ValueGraph,
        props: &Value,
        diagnostics: &Diagnostics,
    ) {
        self.errors_caught = self.errors_caught.saturating_add(1);
        match &self.name {
            Some(name) => {
                let context = to_primitive(graph, props);
                diagnostics.debug_component_error(name, &error, Some(&context));
            }
            None => {
                tracing::error!(error = %error, component = ?error.component, "component error");
            }
        }
        self.state = BoundaryState::Failed(error);
    }

    /// Clear the failure; the next render re-attempts the children.
    pub fn on_retry(&mut self) {
        if self.state.is_failed() {
            tracing::debug!(boundary = ?self.name, "boundary reset");
        }
        self.state = BoundaryState::Healthy;
    }

    fn fallback_view(&self, error: &RenderError) -> FallbackView {
        if let Some(custom) = &self.fallback {
            return custom.clone();
        }
        match &self.name {
            Some(name) => FallbackView {
                title: format!("Error in {}", name),
                message: error.message.clone(),
                retry_label: Some(RETRY_LABEL.to_string()),
            },
            None => FallbackView {
                title: DEFAULT_FALLBACK_TITLE.to_string(),
                message: error.message.clone(),
                retry_label: None,
            },
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Channel, DiagnosticsConfig, MemorySink};
    use std::cell::Cell;
    use std::sync::Arc;

    fn recording() -> (Diagnostics, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        (Diagnostics::new(DiagnosticsConfig::enabled(), sink.clone()), sink)
    }

    #[test]
    fn healthy_boundary_renders_children() {
        let graph = ValueGraph::new();
        let mut boundary = ErrorBoundary::new("Card");
        let out = boundary.render(&graph, &Value::Null, &Diagnostics::disabled(), || {
            Ok::<_, RenderError>("content")
        });
        assert_eq!(out, Rendered::Children("content"));
        assert_eq!(boundary.state(), &BoundaryState::Healthy);
    }

    #[test]
    fn boom_is_caught_reported_and_retried() {
        let mut graph = ValueGraph::new();
        let props = Value::Object(graph.mapping([("title", Value::from("Sales"))]));
        let (diagnostics, sink) = recording();
        let mut boundary = ErrorBoundary::new("X");

        let out = boundary.render(&graph, &props, &diagnostics, || {
            Err::<(), _>(RenderError::new("boom"))
        });
        assert_eq!(
            out,
            Rendered::Fallback(FallbackView {
                title: "Error in X".into(),
                message: "boom".into(),
                retry_label: Some("Try again".into()),
            })
        );

        let reports = sink.on_channel(Channel::Error);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].args[0], "X");
        assert_eq!(reports[0].args[1], "boom");
        assert_eq!(reports[0].args[2], r#"{"title":"Sales"}"#);

        // Failed boundaries never touch their children.
        let calls = Cell::new(0);
        let again = boundary.render(&graph, &props, &diagnostics, || {
            calls.set(calls.get() + 1);
            Ok(())
        });
        assert!(again.is_fallback());
        assert_eq!(calls.get(), 0);
        assert_eq!(boundary.errors_caught(), 1);

        boundary.on_retry();
        let recovered = boundary.render(&graph, &props, &diagnostics, || Ok(()));
        assert_eq!(recovered, Rendered::Children(()));
    }

    #[test]
    fn anonymous_boundary_uses_generic_panel() {
        let graph = ValueGraph::new();
        let (diagnostics, sink) = recording();
        let mut boundary = ErrorBoundary::anonymous();

        let out = boundary.render(&graph, &Value::Null, &diagnostics, || {
            Err::<(), _>(RenderError::new("bad data"))
        });
        let Rendered::Fallback(view) = out else {
            unreachable!("fallback expected");
        };
        assert_eq!(view.title, DEFAULT_FALLBACK_TITLE);
        assert_eq!(view.message, "bad data");
        assert_eq!(view.retry_label, None);
        assert!(sink.is_empty());
    }

    #[test]
    fn custom_fallback_wins() {
        let graph = ValueGraph::new();
        let custom = FallbackView {
            title: "Chart unavailable".into(),
            message: String::new(),
            retry_label: None,
        };
        let mut boundary = ErrorBoundary::new("Chart").with_fallback(custom.clone());
        let out = boundary.render(&graph, &Value::Null, &Diagnostics::disabled(), || {
            Err::<(), _>(RenderError::new("x"))
        });
        assert_eq!(out, Rendered::Fallback(custom));
    }

    #[test]
    fn nested_boundary_contains_failure() {
        let graph = ValueGraph::new();
        let diagnostics = Diagnostics::disabled();
        let mut outer = ErrorBoundary::new("Outer");
        let mut inner = ErrorBoundary::new("Inner");

        let out = outer.render(&graph, &Value::Null, &diagnostics, || {
            Ok(inner.render(&graph, &Value::Null, &diagnostics, || {
                Err::<(), _>(RenderError::new("inner failure"))
            }))
        });

        assert!(matches!(out, Rendered::Children(Rendered::Fallback(_))));
        assert_eq!(outer.state(), &BoundaryState::Healthy);
        assert!(inner.state().is_failed());
    }

    #[test]
    fn props_with_cycles_are_reported_safely() {
        let mut graph = ValueGraph::new();
        let obj = graph.mapping([("name", Value::from("test"))]);
        graph.set(obj, "self", Value::Object(obj)).expect("set");
        let (diagnostics, sink) = recording();

        let mut boundary = ErrorBoundary::new("Loop");
        boundary.render(&graph, &Value::Object(obj), &diagnostics, || {
            Err::<(), _>(RenderError::new("boom"))
        });

        assert_eq!(sink.reports()[0].args[2], r#"{"name":"test"}"#);
    }
}
