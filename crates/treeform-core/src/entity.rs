//! # Entity Collaborator
//!
//! Entity-reference fields validate against a queryable collection of
//! referenced entities. The engine needs nothing beyond iteration
//! producing `(identifier, display string)` pairs; persistence of the
//! underlying entities is out of scope.

use serde_json::Value;

use crate::value::{entity_identifier, lenient_str};

/// A queryable collection of referenced entities.
///
/// Implementations enumerate `(identifier, display string)` pairs in
/// whatever order the collection defines; the engine preserves that order
/// in choice lists. Enumeration happens lazily: the engine only calls
/// [`entries`](EntitySource::entries) when a value must be resolved or a
/// choice list projected.
///
/// Sources are shared behind `Arc` by every node validated against a
/// schema, so implementations must be `Send + Sync`.
pub trait EntitySource: Send + Sync {
    /// Enumerate the collection as `(identifier, display string)` pairs.
    fn entries(&self) -> Vec<(Value, String)>;

    /// Resolve a raw submitted value to the canonical identifier of the
    /// entity it references, if any.
    ///
    /// The raw value may be a bare identifier or an entity object with an
    /// `"id"` member; comparison is lenient, so `1` and `"1"` reference
    /// the same entity.
    fn resolve(&self, raw: &Value) -> Option<Value> {
        let wanted = lenient_str(entity_identifier(raw))?;
        self.entries()
            .into_iter()
            .find(|(id, _)| lenient_str(id).as_deref() == Some(wanted.as_str()))
            .map(|(id, _)| id)
    }
}

/// An in-memory entity collection, mainly for tests and small fixed sets.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEntitySource {
    entries: Vec<(Value, String)>,
}

impl InMemoryEntitySource {
    /// Build a source from `(identifier, display string)` pairs.
    pub fn new(entries: Vec<(Value, String)>) -> Self {
        Self { entries }
    }
}

impl EntitySource for InMemoryEntitySource {
    fn entries(&self) -> Vec<(Value, String)> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn people() -> InMemoryEntitySource {
        InMemoryEntitySource::new(vec![
            (json!(1), "Ada Lovelace".to_string()),
            (json!(2), "Alan Turing".to_string()),
        ])
    }

    #[test]
    fn test_resolve_bare_identifier() {
        assert_eq!(people().resolve(&json!(2)), Some(json!(2)));
        assert_eq!(people().resolve(&json!("2")), Some(json!(2)));
        assert_eq!(people().resolve(&json!(3)), None);
    }

    #[test]
    fn test_resolve_entity_object() {
        let raw = json!({"id": 1, "name": "Ada Lovelace"});
        assert_eq!(people().resolve(&raw), Some(json!(1)));
    }
}
