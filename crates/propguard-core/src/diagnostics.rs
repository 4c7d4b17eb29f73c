//! # Diagnostics
//!
//! Namespaced diagnostic channels and the sink seam.
//!
//! Three channels exist: `app:component`, `app:props` and `app:error`.
//! Whether a channel is forwarded is decided by an injected
//! [`DiagnosticsConfig`]: an enable flag plus a namespace filter in the
//! style of the `DEBUG` environment variable (`app:*`, `app:*,-app:props`).
//!
//! Sinks receive the format string and already sanitized arguments. The
//! core never waits on a sink and never reads anything back from it.

use crate::primitives::DIAGNOSTIC_NAMESPACE_PREFIX;
use crate::RenderError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

// =============================================================================
// CHANNELS
// =============================================================================

/// A diagnostic channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Component,
    Props,
    Error,
}

impl Channel {
    /// All channels, in declaration order.
    pub const ALL: [Self; 3] = [Self::Component, Self::Props, Self::Error];

    /// Short channel name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Component => "component",
            Self::Props => "props",
            Self::Error => "error",
        }
    }

    /// Full namespace (`app:component`, ...).
    #[must_use]
    pub fn namespace(self) -> String {
        format!("{}:{}", DIAGNOSTIC_NAMESPACE_PREFIX, self.name())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.namespace())
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Injected diagnostics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Master switch. Nothing reaches the sink while this is `false`.
    pub enabled: bool,
    /// Namespace filter: comma or space separated patterns, `*` wildcards,
    /// `-` prefix to exclude.
    pub namespaces: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            namespaces: format!("{}:*", DIAGNOSTIC_NAMESPACE_PREFIX),
        }
    }
}

impl DiagnosticsConfig {
    /// All channels enabled.
    #[must_use]
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Enabled with an explicit namespace filter.
    #[must_use]
    pub fn with_namespaces(namespaces: impl Into<String>) -> Self {
        Self {
            enabled: true,
            namespaces: namespaces.into(),
        }
    }

    /// Whether reports on `channel` are forwarded.
    #[must_use]
    pub fn is_channel_enabled(&self, channel: Channel) -> bool {
        self.enabled && namespace_matches(&self.namespaces, &channel.namespace())
    }
}

/// Evaluate a namespace filter against one namespace.
///
/// Exclusions win over inclusions.
#[must_use]
pub fn namespace_matches(filter: &str, namespace: &str) -> bool {
    let patterns = filter
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());

    let mut included = false;
    for pattern in patterns {
        if let Some(excluded) = pattern.strip_prefix('-') {
            if wildcard_match(excluded, namespace) {
                return false;
            }
        } else if wildcard_match(pattern, namespace) {
            included = true;
        }
    }
    included
}

/// Glob match where `*` stands for any run of characters.
fn wildcard_match(pattern: &str, text: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return text.is_empty();
    };
    let Some(mut rest) = text.strip_prefix(first) else {
        return false;
    };

    let tail: Vec<&str> = parts.collect();
    let Some((last, middle)) = tail.split_last() else {
        // No wildcard at all.
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(pos) => rest = &rest[pos.saturating_add(part.len())..],
            None => return false,
        }
    }
    rest.ends_with(last)
}

// =============================================================================
// SINK
// =============================================================================

/// External consumer of diagnostic reports.
///
/// Reports are fire-and-forget: implementations must not block and nothing
/// is returned to the caller.
pub trait DiagnosticSink: Send + Sync {
    /// Receive one report.
    fn report(&self, channel: Channel, format: &str, args: &[String]);
}

/// Sink forwarding reports as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, channel: Channel, format: &str, args: &[String]) {
        let message = format_message(format, args);
        match channel {
            Channel::Error => {
                tracing::warn!(namespace = %channel, "{}", message);
            }
            Channel::Component | Channel::Props => {
                tracing::debug!(namespace = %channel, "{}", message);
            }
        }
    }
}

/// One recorded report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub channel: Channel,
    pub format: String,
    pub args: Vec<String>,
    /// The formatted message.
    pub message: String,
}

/// Sink that records reports in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<Report>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }

    /// Reports recorded on one channel.
    #[must_use]
    pub fn on_channel(&self, channel: Channel) -> Vec<Report> {
        self.reports()
            .into_iter()
            .filter(|r| r.channel == channel)
            .collect()
    }

    /// Number of recorded reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, channel: Channel, format: &str, args: &[String]) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(Report {
                channel,
                format: format.to_string(),
                args: args.to_vec(),
                message: format_message(format, args),
            });
        }
    }
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Substitute `%s`, `%O`, `%o`, `%d`, `%i` and `%j` placeholders in order.
///
/// `%%` is a literal percent sign. Placeholders without a matching argument
/// are left as written; surplus arguments are appended, space separated.
#[must_use]
pub fn format_message(format: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut args_iter = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(spec @ ('s' | 'O' | 'o' | 'd' | 'i' | 'j')) => {
                chars.next();
                match args_iter.next() {
                    Some(arg) => out.push_str(arg),
                    None => {
                        out.push('%');
                        out.push(spec);
                    }
                }
            }
            _ => out.push('%'),
        }
    }

    for extra in args_iter {
        out.push(' ');
        out.push_str(extra);
    }
    out
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// Sanitized view of one component at one moment.
///
/// Built on demand, passed to the sink, then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticSnapshot {
    pub component_name: String,
    pub render_count: Option<u64>,
    pub sanitized_props: String,
}

// =============================================================================
// DIAGNOSTICS HANDLE
// =============================================================================

/// Configuration plus sink; the only way reports leave the core.
#[derive(Clone)]
pub struct Diagnostics {
    config: DiagnosticsConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("config", &self.config)
            .finish()
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::disabled()
    }
}

impl Diagnostics {
    /// Create a handle for `sink` gated by `config`.
    #[must_use]
    pub fn new(config: DiagnosticsConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { config, sink }
    }

    /// A handle that forwards nothing.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(DiagnosticsConfig::default(), Arc::new(TracingSink))
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }

    /// Forward a report if its channel is enabled.
    pub fn report(&self, channel: Channel, format: &str, args: &[String]) {
        if self.config.is_channel_enabled(channel) {
            self.sink.report(channel, format, args);
        }
    }

    /// Report a component render.
    pub fn debug_render(&self, snapshot: &DiagnosticSnapshot) {
        self.report(
            Channel::Component,
            "Rendering %s with props: %O",
            &[
                snapshot.component_name.clone(),
                snapshot.sanitized_props.clone(),
            ],
        );
    }

    /// Report freshly sanitized props. The host calls this whenever a
    /// component's props are recomputed.
    pub fn debug_props(&self, component: &str, sanitized_props: &str) {
        self.report(
            Channel::Props,
            "Props for %s: %O",
            &[component.to_string(), sanitized_props.to_string()],
        );
    }

    /// Report an error caught for a component, with optional context.
    pub fn debug_component_error(&self, component: &str, error: &RenderError, context: Option<&str>) {
        self.report(
            Channel::Error,
            "Error in %s:\nError: %O\nContext: %O",
            &[
                component.to_string(),
                error.to_string(),
                context.unwrap_or("No context").to_string(),
            ],
        );
    }
}

// =============================================================================
// TESTS
// =============================================================================
