//! # Component Host
//!
//! Keeps the per-component state that survives between renders: the render
//! counter, the error boundary and the memoized props.
//!
//! Rendering a component through the host:
//! 1. sanitizes the props through the component's [`SafeProps`] and reports
//!    them on `app:props` when they were recomputed,
//! 2. bumps and reports the render count,
//! 3. runs the child inside the component's [`ErrorBoundary`].
//!
//! At most `max_mounts` components stay mounted (default
//! [`MAX_MOUNTED_COMPONENTS`]); mounting one more evicts the component
//! rendered least recently.

use crate::adapter::SafeProps;
use crate::boundary::{BoundaryState, ErrorBoundary, Rendered};
use crate::diagnostics::{Channel, Diagnostics};
use crate::graph::ValueGraph;
use crate::instrumentation::RenderDebug;
use crate::primitives::MAX_MOUNTED_COMPONENTS;
use crate::sanitized::Sanitized;
use crate::serializer::to_primitive;
use crate::stringify::stringify_sanitized;
use crate::stripper::remove_circular_references;
use crate::{RenderError, Value};
use serde::Serialize;
use std::collections::BTreeMap;

/// State mounted for one component name.
#[derive(Debug, Clone)]
pub struct Mount {
    pub debug: RenderDebug,
    pub boundary: ErrorBoundary,
    pub props: SafeProps,
    last_used: u64,
}

impl Mount {
    fn new(name: &str) -> Self {
        Self {
            debug: RenderDebug::new(name),
            boundary: ErrorBoundary::new(name),
            props: SafeProps::new(),
            last_used: 0,
        }
    }
}

/// Outcome of one host render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostRender<T> {
    pub component: String,
    pub render_count: u64,
    pub props: Sanitized,
    pub output: Rendered<T>,
}

/// Registry of mounted components.
#[derive(Debug)]
pub struct ComponentHost {
    mounts: BTreeMap<String, Mount>,
    diagnostics: Diagnostics,
    max_mounts: usize,
    clock: u64,
}

impl Default for ComponentHost {
    fn default() -> Self {
        Self::new(Diagnostics::default())
    }
}

impl ComponentHost {
    /// Create an empty host reporting through `diagnostics`.
    #[must_use]
    pub fn new(diagnostics: Diagnostics) -> Self {
        Self {
            mounts: BTreeMap::new(),
            diagnostics,
            max_mounts: MAX_MOUNTED_COMPONENTS,
            clock: 0,
        }
    }

    /// Keep at most `max` components mounted (at least one).
    #[must_use]
    pub fn with_max_mounts(mut self, max: usize) -> Self {
        self.max_mounts = max.max(1);
        self
    }

    #[must_use]
    pub fn max_mounts(&self) -> usize {
        self.max_mounts
    }

    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Render `name` with `props`, mounting it on first use.
    ///
    /// `child` receives the graph, the raw props and the sanitized props.
    pub fn render<T, F>(
        &mut self,
        name: &str,
        graph: &ValueGraph,
        props: &Value,
        child: F,
    ) -> HostRender<T>
    where
        F: FnOnce(&ValueGraph, &Value, &Sanitized) -> Result<T, RenderError>,
    {
        if !self.mounts.contains_key(name) {
            self.evict_to(self.max_mounts.saturating_sub(1));
        }
        self.clock = self.clock.saturating_add(1);
        let mount = self
            .mounts
            .entry(name.to_string())
            .or_insert_with(|| Mount::new(name));
        mount.last_used = self.clock;

        let (safe, recomputed) = match props.object_id() {
            Some(id) => {
                let before = mount.props.computations();
                let safe = mount.props.resolve(graph, id).clone();
                (safe, mount.props.computations() != before)
            }
            None => (remove_circular_references(graph, props), true),
        };
        if recomputed && self.diagnostics.config().is_channel_enabled(Channel::Props) {
            self.diagnostics.debug_props(name, &stringify_sanitized(&safe));
        }
        let render_count = mount.debug.on_render(&self.diagnostics, &safe);
        let output = mount
            .boundary
            .render(graph, props, &self.diagnostics, || child(graph, props, &safe));

        HostRender {
            component: name.to_string(),
            render_count,
            props: safe,
            output,
        }
    }

    /// Unmount least recently rendered components until at most `keep`
    /// remain.
    fn evict_to(&mut self, keep: usize) {
        while self.mounts.len() > keep {
            let Some(oldest) = self
                .mounts
                .iter()
                .min_by_key(|(_, mount)| mount.last_used)
                .map(|(name, _)| name.clone())
            else {
                return;
            };
            tracing::debug!(component = %oldest, "unmounting least recently rendered component");
            self.mounts.remove(&oldest);
        }
    }

    /// Clear the failure of `name`. Returns `false` when nothing is mounted
    /// under that name.
    pub fn retry(&mut self, name: &str) -> bool {
        match self.mounts.get_mut(name) {
            Some(mount) => {
                mount.boundary.on_retry();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn mount(&self, name: &str) -> Option<&Mount> {
        self.mounts.get(name)
    }

    /// Boundary state of `name`, if mounted.
    #[must_use]
    pub fn state(&self, name: &str) -> Option<&BoundaryState> {
        self.mounts.get(name).map(|m| m.boundary.state())
    }

    /// Mounted component names, sorted.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.mounts.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}

/// Built-in child: renders the props through [`to_primitive`].
pub fn primitive_child(
    graph: &ValueGraph,
    props: &Value,
    _safe: &Sanitized,
) -> Result<String, RenderError> {
    Ok(to_primitive(graph, props))
}
