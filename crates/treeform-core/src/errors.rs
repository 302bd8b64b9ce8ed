//! # Error Structures — Errors as Data
//!
//! Validation failures in this engine are collected, never raised: a node
//! surfaces them as an ordered [`ErrorMap`] and exposes validity as a
//! boolean. The `Result`-returning [`TreeFormError`] enum exists only for
//! API misuse, which is a programming error rather than a validation
//! outcome.
//!
//! ## Shape
//!
//! A plain field's errors are an ordered list of message strings. A
//! nested-tree field's errors carry two buckets:
//!
//! - `self` — messages about the field itself ("input was not a
//!   sequence"), and
//! - `children` — one error map per child node, positionally aligned with
//!   the input sequence.
//!
//! This distinguishes "the whole list is malformed" from "element 3 of
//! the list is malformed".
//!
//! Stored messages are locale-independent; [`ErrorMap::localized`] is the
//! projection that applies a translator, mirroring how labels and help
//! texts are translated only at display time.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::translate::Translate;

/// Error for API misuse. Validation failures never take this path.
#[derive(Error, Debug)]
pub enum TreeFormError {
    /// A refinement hook was registered for a field name the schema does
    /// not declare.
    #[error("refinement hook references unknown field '{0}'")]
    UnknownHookField(String),

    /// A node was constructed from a JSON value that is not an object.
    #[error("form node input must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Errors recorded against a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldErrors {
    /// A plain field: ordered list of human-readable messages.
    Plain(Vec<String>),

    /// A nested-tree field: messages about the field itself plus one
    /// error map per child node, positionally aligned with the input.
    Tree {
        /// Messages about the field itself (shape errors, hook errors).
        #[serde(rename = "self")]
        own: Vec<String>,
        /// Each child node's error map, in input order. Entries for
        /// error-free children are empty maps, preserving alignment.
        children: Vec<ErrorMap>,
    },
}

impl FieldErrors {
    /// True when no message is recorded here or in any child.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldErrors::Plain(messages) => messages.is_empty(),
            FieldErrors::Tree { own, children } => {
                own.is_empty() && children.iter().all(ErrorMap::is_empty)
            }
        }
    }

    fn localized(&self, translator: &dyn Translate) -> FieldErrors {
        match self {
            FieldErrors::Plain(messages) => FieldErrors::Plain(
                messages.iter().map(|m| translator.translate(m)).collect(),
            ),
            FieldErrors::Tree { own, children } => FieldErrors::Tree {
                own: own.iter().map(|m| translator.translate(m)).collect(),
                children: children.iter().map(|c| c.localized(translator)).collect(),
            },
        }
    }
}

/// Ordered mapping from field name to that field's errors.
///
/// Insertion order is the schema's declaration order: messages accumulate
/// in the order fields are processed, and consumers must not rely on the
/// order being alphabetical.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorMap {
    entries: IndexMap<String, FieldErrors>,
}

impl ErrorMap {
    /// An empty error map.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no field has any recorded message, recursively.
    pub fn is_empty(&self) -> bool {
        self.entries.values().all(FieldErrors::is_empty)
    }

    /// Number of fields with at least one entry (including empty tree
    /// buckets).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Errors recorded for a field, if any.
    pub fn get(&self, field: &str) -> Option<&FieldErrors> {
        self.entries.get(field)
    }

    /// Iterate entries in accumulation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldErrors)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Append a message to a plain field's error list, creating the list
    /// on first use. For a field already holding tree buckets, the
    /// message lands in the `self` bucket.
    pub fn push_message(&mut self, field: &str, message: impl Into<String>) {
        match self
            .entries
            .entry(field.to_string())
            .or_insert_with(|| FieldErrors::Plain(Vec::new()))
        {
            FieldErrors::Plain(messages) => messages.push(message.into()),
            FieldErrors::Tree { own, .. } => own.push(message.into()),
        }
    }

    /// Append a message to a tree field's `self` bucket, creating the
    /// two-bucket structure on first use. A plain list already recorded
    /// under this name is promoted into the `self` bucket.
    pub fn push_tree_message(&mut self, field: &str, message: impl Into<String>) {
        let slot = self.tree_slot(field);
        if let FieldErrors::Tree { own, .. } = slot {
            own.push(message.into());
        }
    }

    /// Record the per-child error maps for a tree field, preserving
    /// positional alignment with the input sequence.
    pub fn set_children(&mut self, field: &str, child_errors: Vec<ErrorMap>) {
        let slot = self.tree_slot(field);
        if let FieldErrors::Tree { children, .. } = slot {
            *children = child_errors;
        }
    }

    fn tree_slot(&mut self, field: &str) -> &mut FieldErrors {
        let slot = self.entries.entry(field.to_string()).or_insert_with(|| {
            FieldErrors::Tree { own: Vec::new(), children: Vec::new() }
        });
        if let FieldErrors::Plain(messages) = slot {
            let own = std::mem::take(messages);
            *slot = FieldErrors::Tree { own, children: Vec::new() };
        }
        slot
    }

    /// Project this map through a translator, leaving the stored map
    /// untouched. Translation happens only here, never at accumulation
    /// time, so stored messages stay locale-independent.
    pub fn localized(&self, translator: &dyn Translate) -> ErrorMap {
        ErrorMap {
            entries: self
                .entries
                .iter()
                .map(|(name, errors)| (name.clone(), errors.localized(translator)))
                .collect(),
        }
    }
}

impl std::fmt::Display for ErrorMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (name, errors) in &self.entries {
            match errors {
                FieldErrors::Plain(messages) => {
                    for message in messages {
                        if !first {
                            writeln!(f)?;
                        }
                        first = false;
                        write!(f, "  {name}: {message}")?;
                    }
                }
                FieldErrors::Tree { own, children } => {
                    for message in own {
                        if !first {
                            writeln!(f)?;
                        }
                        first = false;
                        write!(f, "  {name}: {message}")?;
                    }
                    for (index, child) in children.iter().enumerate() {
                        if child.is_empty() {
                            continue;
                        }
                        if !first {
                            writeln!(f)?;
                        }
                        first = false;
                        write!(f, "  {name}[{index}]:")?;
                        for line in child.to_string().lines() {
                            writeln!(f)?;
                            write!(f, "  {line}")?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::IdentityTranslator;
    use serde_json::json;

    #[test]
    fn test_empty_map_is_empty() {
        assert!(ErrorMap::new().is_empty());
    }

    #[test]
    fn test_push_message_accumulates_in_order() {
        let mut errors = ErrorMap::new();
        errors.push_message("name", "This field is required.");
        errors.push_message("name", "Enter a valid value.");
        match errors.get("name").unwrap() {
            FieldErrors::Plain(messages) => {
                assert_eq!(messages.len(), 2);
                assert_eq!(messages[0], "This field is required.");
            }
            other => panic!("expected plain errors, got {other:?}"),
        }
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_tree_buckets_serialize_with_reserved_names() {
        let mut errors = ErrorMap::new();
        errors.push_tree_message("contacts", "Should be a list.");
        errors.set_children("contacts", vec![ErrorMap::new()]);
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            value,
            json!({"contacts": {"self": ["Should be a list."], "children": [{}]}})
        );
    }

    #[test]
    fn test_emptiness_recurses_into_children() {
        let mut child = ErrorMap::new();
        child.push_message("age", "Enter a whole number.");
        let mut errors = ErrorMap::new();
        errors.set_children("contacts", vec![ErrorMap::new(), child]);
        assert!(!errors.is_empty());
    }

    #[test]
    fn test_children_only_entry_with_clean_children_is_empty() {
        let mut errors = ErrorMap::new();
        errors.set_children("contacts", vec![ErrorMap::new(), ErrorMap::new()]);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_localized_uppercases_without_mutating_source() {
        let mut errors = ErrorMap::new();
        errors.push_message("name", "required");
        let loud = errors.localized(&|s: &str| s.to_uppercase());
        match loud.get("name").unwrap() {
            FieldErrors::Plain(messages) => assert_eq!(messages[0], "REQUIRED"),
            other => panic!("expected plain errors, got {other:?}"),
        }
        match errors.get("name").unwrap() {
            FieldErrors::Plain(messages) => assert_eq!(messages[0], "required"),
            other => panic!("expected plain errors, got {other:?}"),
        }
        let same = errors.localized(&IdentityTranslator);
        assert_eq!(same, errors);
    }

    #[test]
    fn test_display_flattens_messages() {
        let mut errors = ErrorMap::new();
        errors.push_message("email", "Enter a valid email address.");
        let rendered = errors.to_string();
        assert!(rendered.contains("email: Enter a valid email address."));
    }
}
