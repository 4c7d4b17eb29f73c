//! # Sanitized Trees
//!
//! Owned, acyclic projection of a value graph.
//!
//! A `Sanitized` tree is what the stripper hands to JSON encoders and log
//! sinks. It owns its children, so it is finite and cycle-free by
//! construction; revisited identities have already been replaced by the
//! `"[Circular]"` string.
//!
//! Two JSON projections are provided:
//! - [`JsonStyle::Plain`] follows standard JSON encoding rules: undefined,
//!   functions and symbols vanish from objects and become `null` in arrays.
//! - [`JsonStyle::Debug`] follows the debug replacer: functions print as
//!   `"[Function]"`, symbols as `"Symbol(desc)"`, windows and elements as
//!   `"[Window]"` / `"[Element]"`.

use crate::primitives::CIRCULAR_SENTINEL;
use chrono::{DateTime, SecondsFormat};
use serde::{Serialize, Serializer};
use serde_json::Number;

/// Owned, acyclic copy of a value graph.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Sanitized {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Function(String),
    Symbol(String),
    /// Milliseconds since the Unix epoch.
    Date(i64),
    /// Platform object kind.
    Opaque(String),
    Sequence(Vec<Sanitized>),
    Mapping(Vec<(String, Sanitized)>),
}

/// JSON projection rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStyle {
    /// Standard encoding rules.
    Plain,
    /// Debug replacer rules.
    Debug,
}

impl Sanitized {
    /// The sentinel that replaces a circular edge.
    #[must_use]
    pub fn circular() -> Self {
        Self::String(CIRCULAR_SENTINEL.to_string())
    }

    /// Whether this is the circular sentinel.
    #[must_use]
    pub fn is_circular_marker(&self) -> bool {
        matches!(self, Self::String(s) if s == CIRCULAR_SENTINEL)
    }

    /// Look up a mapping entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Sanitized> {
        match self {
            Self::Mapping(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Number of circular sentinels anywhere in the tree.
    #[must_use]
    pub fn circular_count(&self) -> usize {
        match self {
            Self::Sequence(items) => items.iter().map(Self::circular_count).sum(),
            Self::Mapping(entries) => entries.iter().map(|(_, v)| v.circular_count()).sum(),
            other => usize::from(other.is_circular_marker()),
        }
    }

    /// Standard JSON projection. A top-level value with no JSON form
    /// projects to `null`.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        self.to_json_with(JsonStyle::Plain)
            .unwrap_or(serde_json::Value::Null)
    }

    /// Compact standard JSON text.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    /// JSON projection under the given rules.
    ///
    /// `None` means the value has no JSON form (it is omitted from objects
    /// and written as `null` inside arrays).
    #[must_use]
    pub fn to_json_with(&self, style: JsonStyle) -> Option<serde_json::Value> {
        use serde_json::Value as Json;

        match self {
            Self::Undefined => None,
            Self::Null => Some(Json::Null),
            Self::Bool(b) => Some(Json::Bool(*b)),
            Self::Number(n) => Some(Json::Number(n.clone())),
            Self::String(s) => Some(Json::String(s.clone())),
            Self::Function(_) => match style {
                JsonStyle::Plain => None,
                JsonStyle::Debug => Some(Json::String("[Function]".to_string())),
            },
            Self::Symbol(desc) => match style {
                JsonStyle::Plain => None,
                JsonStyle::Debug => Some(Json::String(format!("Symbol({})", desc))),
            },
            // Invalid dates encode as null.
            Self::Date(millis) => Some(
                iso_timestamp(*millis)
                    .map(Json::String)
                    .unwrap_or(Json::Null),
            ),
            Self::Opaque(kind) => match style {
                JsonStyle::Debug if kind == "Window" => Some(Json::String("[Window]".to_string())),
                JsonStyle::Debug if kind.ends_with("Element") => {
                    Some(Json::String("[Element]".to_string()))
                }
                _ => Some(Json::Object(serde_json::Map::new())),
            },
            Self::Sequence(items) => Some(Json::Array(
                items
                    .iter()
                    .map(|item| item.to_json_with(style).unwrap_or(Json::Null))
                    .collect(),
            )),
            Self::Mapping(entries) => {
                let mut map = serde_json::Map::new();
                for (key, value) in entries {
                    if let Some(json) = value.to_json_with(style) {
                        map.insert(key.clone(), json);
                    }
                }
                Some(Json::Object(map))
            }
        }
    }
}

impl Serialize for Sanitized {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<&serde_json::Value> for Sanitized {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => Self::Number(n.clone()),
            serde_json::Value::String(s) => Self::String(s.clone()),
            serde_json::Value::Array(items) => Self::Sequence(items.iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => Self::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

/// ISO-8601 UTC timestamp with millisecond precision
/// (`2024-03-01T12:00:00.000Z`). `None` when out of range.
#[must_use]
pub fn iso_timestamp(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn iso_timestamp_has_millis_and_zulu() {
        assert_eq!(
            iso_timestamp(1_709_294_400_000).as_deref(),
            Some("2024-03-01T12:00:00.000Z")
        );
        assert_eq!(iso_timestamp(i64::MAX), None);
    }

    #[test]
    fn plain_json_drops_non_json_members() {
        let tree = Sanitized::Mapping(vec![
            ("a".into(), Sanitized::Undefined),
            ("f".into(), Sanitized::Function("() => 1".into())),
            ("s".into(), Sanitized::Symbol("tag".into())),
            ("n".into(), Sanitized::Null),
            (
                "list".into(),
                Sanitized::Sequence(vec![Sanitized::Undefined, Sanitized::Bool(true)]),
            ),
        ]);
        assert_eq!(tree.to_json(), json!({"n": null, "list": [null, true]}));
    }

    #[test]
    fn debug_json_names_opaque_members() {
        let tree = Sanitized::Mapping(vec![
            ("f".into(), Sanitized::Function("fn".into())),
            ("s".into(), Sanitized::Symbol("id".into())),
            ("w".into(), Sanitized::Opaque("Window".into())),
            ("e".into(), Sanitized::Opaque("HTMLDivElement".into())),
            ("r".into(), Sanitized::Opaque("RegExp".into())),
        ]);
        assert_eq!(
            tree.to_json_with(JsonStyle::Debug),
            Some(json!({
                "f": "[Function]",
                "s": "Symbol(id)",
                "w": "[Window]",
                "e": "[Element]",
                "r": {}
            }))
        );
    }

    #[test]
    fn from_json_keeps_structure() {
        let json = json!({"name": "test", "nested": {"value": 123}, "list": [1, "x"]});
        let tree = Sanitized::from(&json);
        assert_eq!(tree.to_json(), json);
        assert_eq!(tree.get("name"), Some(&Sanitized::String("test".into())));
    }

    #[test]
    fn circular_count_walks_tree() {
        let tree = Sanitized::Sequence(vec![
            Sanitized::circular(),
            Sanitized::Mapping(vec![("x".into(), Sanitized::circular())]),
            Sanitized::String("plain".into()),
        ]);
        assert_eq!(tree.circular_count(), 2);
    }

    #[test]
    fn serialize_matches_plain_projection() {
        let tree = Sanitized::Mapping(vec![("d".into(), Sanitized::Date(0))]);
        let text = serde_json::to_string(&tree).expect("serialize");
        assert_eq!(text, r#"{"d":"1970-01-01T00:00:00.000Z"}"#);
    }
}
