//! # Schema — the Field Registry
//!
//! A [`Schema`] is an ordered mapping from field name to [`FieldSpec`]
//! plus the hook tables. It is built once per schema type by
//! [`SchemaBuilder`], immutable thereafter, and shared by every node via
//! `Arc` — per-request error state lives on the node, never on the
//! schema, so specs need no copying.
//!
//! ## Ordering and inheritance
//!
//! Declaration order is builder insertion order. Inheritance is explicit:
//! [`SchemaBuilder::extend`] merges a parent schema's entries before the
//! child's own declarations (call it once per ancestor, most distant
//! first). Re-declaring a name removes the earlier entry and appends at
//! the current position, so the more specific declaration wins both
//! identity and position: a base declaring `a` and a child declaring
//! `b`, `a` yields the final order `[b, a]`.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use treeform_core::TreeFormError;

use crate::field::FieldSpec;
use crate::hooks::{FieldHook, HookContext, NodeHook};

/// An immutable, ordered field registry with its refinement hooks.
pub struct Schema {
    fields: IndexMap<String, FieldSpec>,
    field_hooks: IndexMap<String, Arc<FieldHook>>,
    node_hook: Option<Arc<NodeHook>>,
}

impl Schema {
    /// Start building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Iterate fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True for a schema with no fields (valid, yields empty output).
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The per-field refinement hook for a field, if registered.
    pub fn field_hook(&self, name: &str) -> Option<&Arc<FieldHook>> {
        self.field_hooks.get(name)
    }

    /// The whole-node refinement hook, if registered.
    pub fn node_hook(&self) -> Option<&Arc<NodeHook>> {
        self.node_hook.as_ref()
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("field_hooks", &self.field_hooks.keys().collect::<Vec<_>>())
            .field("node_hook", &self.node_hook.is_some())
            .finish()
    }
}

/// Builder for [`Schema`]. Insertion order is declaration order.
#[derive(Default)]
pub struct SchemaBuilder {
    fields: IndexMap<String, FieldSpec>,
    field_hooks: IndexMap<String, Arc<FieldHook>>,
    node_hook: Option<Arc<NodeHook>>,
}

impl SchemaBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a parent schema's fields and hooks. Call before declaring
    /// the child's own fields, once per ancestor, most distant first.
    pub fn extend(mut self, parent: &Schema) -> Self {
        for (name, spec) in &parent.fields {
            self = self.field(name.clone(), spec.clone());
        }
        for (name, hook) in &parent.field_hooks {
            self.field_hooks.insert(name.clone(), Arc::clone(hook));
        }
        if self.node_hook.is_none() {
            self.node_hook = parent.node_hook.as_ref().map(Arc::clone);
        }
        self
    }

    /// Declare a field, assigning it this name. Re-declaring a name
    /// drops the earlier entry: the new declaration takes both the
    /// field's identity and its position.
    pub fn field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        let name = name.into();
        self.fields.shift_remove(&name);
        self.fields.insert(name, spec);
        self
    }

    /// Register a per-field refinement hook. Registering again for the
    /// same field replaces the earlier hook.
    pub fn field_hook<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&mut HookContext<'_>) -> Value + Send + Sync + 'static,
    {
        self.field_hooks.insert(name.into(), Arc::new(hook));
        self
    }

    /// Register the whole-node refinement hook, replacing any inherited
    /// one.
    pub fn node_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut HookContext<'_>, Map<String, Value>) -> Map<String, Value>
            + Send
            + Sync
            + 'static,
    {
        self.node_hook = Some(Arc::new(hook));
        self
    }

    /// Finish the schema.
    ///
    /// # Errors
    ///
    /// Returns [`TreeFormError::UnknownHookField`] when a per-field hook
    /// references a name the schema does not declare.
    pub fn build(self) -> Result<Schema, TreeFormError> {
        for name in self.field_hooks.keys() {
            if !self.fields.contains_key(name) {
                return Err(TreeFormError::UnknownHookField(name.clone()));
            }
        }
        Ok(Schema {
            fields: self.fields,
            field_hooks: self.field_hooks,
            node_hook: self.node_hook,
        })
    }
}
