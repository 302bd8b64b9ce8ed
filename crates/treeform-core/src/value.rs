//! # Raw Value Helpers
//!
//! Submitted data arrives as already-parsed `serde_json::Value` trees.
//! These helpers define the engine-wide notions of "empty" and of lenient
//! string comparison used by the choice and entity-reference validators,
//! where `1` and `"1"` denote the same selection.

use serde_json::Value;

/// Whether a raw value counts as empty for required checks.
///
/// `Null`, the empty string, the empty array, and the empty object are
/// empty. `false` and `0` are real values.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Lenient string form of a scalar value, used for choice comparison.
///
/// Strings are taken as-is; numbers and booleans use their canonical
/// textual form; `Null` is the empty string. Arrays and objects have no
/// lenient form and yield `None`.
pub fn lenient_str(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// The identifier carried by a raw entity value.
///
/// An entity may be submitted either as a bare identifier or as an object
/// exposing an `"id"` member; both resolve to the same identifier.
pub fn entity_identifier(value: &Value) -> &Value {
    match value {
        Value::Object(map) => map.get("id").unwrap_or(value),
        other => other,
    }
}
