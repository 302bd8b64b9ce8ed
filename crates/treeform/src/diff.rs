//! # Change Tracking
//!
//! Each validation pass diffs the cleaned values against the prior
//! snapshot. The resulting [`ChangeSet`] mirrors the shape of the
//! cleaned data: scalar fields record a `(from, to)` pair, nested-tree
//! fields record one child change set per input element, positionally
//! aligned even when a child changed nothing.
//!
//! A field appears here iff its cleaning succeeded and the cleaned value
//! differs from the prior one under the field's equality rule.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// The change recorded for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldChange {
    /// A scalar field changed from `from` to `to` (the cleaned value).
    Value {
        /// The prior snapshot's raw value.
        from: Value,
        /// The cleaned new value.
        to: Value,
    },
    /// A nested-tree field: one change set per child node, in input
    /// order. Entries for unchanged children are empty sets, preserving
    /// positional alignment with the input sequence.
    Children(Vec<ChangeSet>),
}

/// Ordered mapping from field name to its change, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChangeSet {
    entries: IndexMap<String, FieldChange>,
}

impl ChangeSet {
    /// An empty change set.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no field recorded a change.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of changed fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The change recorded for a field, if any.
    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.entries.get(field)
    }

    /// Iterate changes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldChange)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Record a scalar change.
    pub fn record(&mut self, field: &str, from: Value, to: Value) {
        self.entries
            .insert(field.to_string(), FieldChange::Value { from, to });
    }

    /// Record a nested-tree field's per-child change sets.
    pub fn record_children(&mut self, field: &str, children: Vec<ChangeSet>) {
        self.entries
            .insert(field.to_string(), FieldChange::Children(children));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_change_serializes_as_pair_object() {
        let mut changes = ChangeSet::new();
        changes.record("age", json!(40), json!(41));
        let value = serde_json::to_value(&changes).unwrap();
        assert_eq!(value, json!({"age": {"from": 40, "to": 41}}));
    }

    #[test]
    fn test_children_preserve_positional_alignment() {
        let mut first = ChangeSet::new();
        first.record("name", json!("Ada"), json!("Ada L."));
        let mut changes = ChangeSet::new();
        changes.record_children("contacts", vec![first, ChangeSet::new()]);
        let value = serde_json::to_value(&changes).unwrap();
        assert_eq!(
            value,
            json!({"contacts": [{"name": {"from": "Ada", "to": "Ada L."}}, {}]})
        );
    }

    #[test]
    fn test_is_empty() {
        let mut changes = ChangeSet::new();
        assert!(changes.is_empty());
        changes.record("a", json!(1), json!(2));
        assert!(!changes.is_empty());
    }
}
