//! # Refinement Hooks
//!
//! A schema may attach two kinds of refinement, supplied as data rather
//! than looked up by name convention:
//!
//! - a **per-field hook**, invoked after a field cleans without error;
//!   its return value replaces the field's cleaned value, and it may
//!   append further errors through the context. This is the only point
//!   after initial coercion where a value is transformed.
//! - a **whole-node hook**, invoked once after every field is processed;
//!   it receives the full cleaned mapping and returns a possibly
//!   modified one. This is the node's only opportunity for cross-field
//!   validation and derivation.
//!
//! Hooks run at most once per node: evaluation is memoized, so a hook
//! with side effects (appending errors) is never invoked twice.

use serde_json::{Map, Value};

use treeform_core::ErrorMap;

use crate::node::NodeScope;

/// Per-field refinement. The returned value replaces the cleaned value.
pub type FieldHook = dyn Fn(&mut HookContext<'_>) -> Value + Send + Sync;

/// Whole-node refinement. Receives the full cleaned mapping, returns the
/// mapping to adopt. The default is identity.
pub type NodeHook =
    dyn Fn(&mut HookContext<'_>, Map<String, Value>) -> Map<String, Value> + Send + Sync;

/// The node context visible to a refinement hook.
///
/// Exposes the values cleaned so far, the raw inputs, the error sink,
/// and the parent scope chain for nested nodes. The parent link is an
/// upward-visibility relation only; a hook may inspect ancestor input
/// but never owns or mutates it.
pub struct HookContext<'a> {
    field: Option<&'a str>,
    tree_field: bool,
    cleaned: &'a Map<String, Value>,
    scope: &'a NodeScope,
    errors: &'a mut ErrorMap,
}

impl<'a> HookContext<'a> {
    pub(crate) fn for_field(
        field: &'a str,
        tree_field: bool,
        cleaned: &'a Map<String, Value>,
        scope: &'a NodeScope,
        errors: &'a mut ErrorMap,
    ) -> Self {
        Self { field: Some(field), tree_field, cleaned, scope, errors }
    }

    pub(crate) fn for_node(
        cleaned: &'a Map<String, Value>,
        scope: &'a NodeScope,
        errors: &'a mut ErrorMap,
    ) -> Self {
        Self { field: None, tree_field: false, cleaned, scope, errors }
    }

    /// The field being refined; `None` inside the whole-node hook.
    pub fn field(&self) -> Option<&str> {
        self.field
    }

    /// A cleaned value, by name. In a per-field hook, fields later in
    /// declaration order have not been cleaned yet; in the whole-node
    /// hook this reads a snapshot of the full mapping, so mutations of
    /// the argument mapping are not reflected here.
    pub fn cleaned(&self, name: &str) -> Option<&Value> {
        self.cleaned.get(name)
    }

    /// The raw submitted value for a field, absent when the submission
    /// omitted it.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.scope.raw(name)
    }

    /// The prior snapshot value for a field.
    pub fn initial(&self, name: &str) -> Option<&Value> {
        self.scope.initial(name)
    }

    /// The parent node's scope, when this node is an element of a
    /// nested-tree field.
    pub fn parent(&self) -> Option<&NodeScope> {
        self.scope.parent()
    }

    /// Append an error to the current field's list. The whole-node hook
    /// has no current field; it must use
    /// [`add_field_error`](Self::add_field_error). Calling this there
    /// panics in debug builds and does nothing in release builds.
    pub fn add_error(&mut self, message: impl Into<String>) {
        debug_assert!(
            self.field.is_some(),
            "add_error called with no current field; use add_field_error"
        );
        let Some(field) = self.field else { return };
        if self.tree_field {
            self.errors.push_tree_message(field, message);
        } else {
            self.errors.push_message(field, message);
        }
    }

    /// Append an error to a named field's list.
    pub fn add_field_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push_message(field, message);
    }
}
