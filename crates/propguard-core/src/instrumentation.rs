//! # Render Instrumentation
//!
//! Per-component render counter. Each render bumps the count and reports
//! the component name with its sanitized props on the `component` channel.

use crate::diagnostics::{DiagnosticSnapshot, Diagnostics};
use crate::sanitized::Sanitized;
use crate::stringify::stringify_sanitized;

/// Render counter for one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderDebug {
    component_name: String,
    render_count: u64,
}

impl RenderDebug {
    /// Create a counter for `component_name`, starting at zero.
    #[must_use]
    pub fn new(component_name: impl Into<String>) -> Self {
        Self {
            component_name: component_name.into(),
            render_count: 0,
        }
    }

    #[must_use]
    pub fn component_name(&self) -> &str {
        &self.component_name
    }

    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.render_count
    }

    /// Record one render and report it. Returns the new count.
    pub fn on_render(&mut self, diagnostics: &Diagnostics, props: &Sanitized) -> u64 {
        self.render_count = self.render_count.saturating_add(1);
        let snapshot = self.snapshot(props);
        diagnostics.debug_render(&snapshot);
        self.render_count
    }

    /// Snapshot for the current count; the payload is
    /// `{"renderCount": n, "props": ...}`.
    #[must_use]
    pub fn snapshot(&self, props: &Sanitized) -> DiagnosticSnapshot {
        let payload = Sanitized::Mapping(vec![
            (
                "renderCount".to_string(),
                Sanitized::Number(self.render_count.into()),
            ),
            ("props".to_string(), props.clone()),
        ]);
        DiagnosticSnapshot {
            component_name: self.component_name.clone(),
            render_count: Some(self.render_count),
            sanitized_props: stringify_sanitized(&payload),
        }
    }
}
