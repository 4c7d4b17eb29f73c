//! # Sentinels and Limits
//!
//! Fixed placeholders and computational bounds for the propguard core.
//!
//! These values are compiled in and immutable at runtime. The sentinels are
//! part of the observable output format: log sinks and tests match on them.

/// Substituted for an edge that would revisit an already visited object.
pub const CIRCULAR_SENTINEL: &str = "[Circular]";

/// Returned by the serializer when a value cannot be converted.
pub const OBJECT_FALLBACK: &str = "[Object]";

/// Returned by the debug stringifier when JSON encoding fails.
pub const UNSTRINGIFIABLE: &str = "[Unable to stringify]";

/// Maximum nesting depth followed by the walker.
///
/// - Cycles are already cut by the visited set; this bounds very deep
///   acyclic chains so recursion can never exhaust the stack.
/// - Branches below this depth degrade to a placeholder.
pub const MAX_WALK_DEPTH: usize = 512;

/// Maximum number of object visits in one walk.
///
/// The serializer only tracks objects on the current path, so an acyclic
/// graph with heavy sharing is expanded once per path. Visits past this
/// bound degrade to a placeholder.
pub const MAX_WALK_STEPS: usize = 1_000_000;

/// Maximum number of components a host keeps mounted.
///
/// Mounting one more evicts the component rendered least recently.
pub const MAX_MOUNTED_COMPONENTS: usize = 1024;

/// Maximum length of one serialized composite.
///
/// Every nesting level re-escapes its children, so text length can double
/// per level. A composite whose text exceeds this bound degrades to
/// [`OBJECT_FALLBACK`].
pub const MAX_PRIMITIVE_LENGTH: usize = 1024 * 1024;

/// Maximum total text produced by one serializer call.
///
/// Counts every leaf and composite string built along the way. Once spent,
/// the remaining objects degrade to [`OBJECT_FALLBACK`].
pub const MAX_SERIALIZED_BYTES: usize = 16 * 1024 * 1024;

/// Maximum number of values in a single graph document.
///
/// Documents larger than this are rejected before any node is built
/// past the limit.
pub const MAX_DOCUMENT_NODES: usize = 100_000;

/// Namespace prefix shared by all diagnostic channels.
pub const DIAGNOSTIC_NAMESPACE_PREFIX: &str = "app";
