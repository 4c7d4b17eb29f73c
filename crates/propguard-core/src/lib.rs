//! # propguard-core
//!
//! Cycle-safe inspection and serialization of object graphs - THE LOGIC.
//!
//! This crate owns everything that touches props: the arena holding object
//! payloads, the depth-first walker with its visited set, and the three
//! operations derived from it:
//! - `to_primitive` renders any value as a log-safe string,
//! - `has_circular_references` reports whether a walk revisits an object,
//! - `remove_circular_references` builds an owned acyclic copy.
//!
//! On top of those sit the render-side pieces: memoized safe props, render
//! instrumentation, error boundaries and the host that ties them together.
//!
//! ## Architectural Constraints
//!
//! - Core operations are total: they never return errors and never panic.
//!   Failures degrade to in-band sentinels (`"[Circular]"`, `"[Object]"`).
//! - No global configuration: the diagnostics switch is injected.
//! - No async, no network dependencies.

// =============================================================================
// MODULES
// =============================================================================

pub mod adapter;
pub mod boundary;
pub mod detector;
pub mod diagnostics;
pub mod formats;
pub mod graph;
pub mod host;
pub mod instrumentation;
pub mod primitives;
pub mod sanitized;
pub mod serializer;
pub mod stringify;
pub mod stripper;
pub mod types;
pub mod walker;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Node, NodeId, PropguardError, RenderError, Value, number_text};

// =============================================================================
// RE-EXPORTS: Value Graph and Walker
// =============================================================================

pub use graph::{GraphId, ValueGraph};
pub use sanitized::{JsonStyle, Sanitized, iso_timestamp};
pub use walker::{NodeAction, Step, VisitedSet, Walker, walk};

// =============================================================================
// RE-EXPORTS: Operations
// =============================================================================

pub use detector::{has_circular_references, has_circular_references_with};
pub use serializer::to_primitive;
pub use stringify::{safe_stringify, stringify_sanitized};
pub use stripper::{remove_circular_references, remove_circular_references_with};

// =============================================================================
// RE-EXPORTS: Rendering
// =============================================================================

pub use adapter::SafeProps;
pub use boundary::{BoundaryState, ErrorBoundary, FallbackView, Rendered};
pub use diagnostics::{
    Channel, DiagnosticSink, DiagnosticSnapshot, Diagnostics, DiagnosticsConfig, MemorySink,
    Report, TracingSink, format_message,
};
pub use host::{ComponentHost, HostRender, Mount, primitive_child};
pub use instrumentation::RenderDebug;

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{Document, document_from_slice, document_from_str, parse_document};
