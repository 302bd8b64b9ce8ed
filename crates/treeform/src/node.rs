//! # Form Node — the Recursive Engine
//!
//! A [`FormNode`] is one validation pass over one `(data, initial)` pair
//! against one shared [`Schema`]. It resolves each field's effective
//! state, drives the per-field clean step in declaration order, recurses
//! into child nodes for nested-tree fields, and aggregates cleaned
//! values, changes, and errors.
//!
//! ## Laziness
//!
//! Evaluation runs on first access to `errors()`, `cleaned_data()`,
//! `changed()`, or `is_valid()`, and is memoized for the node's
//! lifetime: repeated access returns the cached result and refinement
//! hooks are never invoked twice. Nodes are single-threaded values; no
//! shared mutable state exists between sibling nodes, since per-request
//! error state lives here and never on the schema.
//!
//! ## Depth guard
//!
//! Input nesting is the only realistic resource-exhaustion vector, so
//! recursion stops at [`MAX_NESTING_DEPTH`]: a tree field at the limit
//! reports a `self` error instead of constructing children.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use treeform_core::{messages, ErrorMap, FieldState, Translate, TreeFormError};

use crate::diff::ChangeSet;
use crate::display::{project_field, DisplayTree};
use crate::field::{FieldKind, FieldSpec};
use crate::hooks::HookContext;
use crate::schema::Schema;

/// Maximum nesting depth for tree-typed fields. Deeper input is
/// rejected with a `self` error on the offending field.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Second `self` message recorded when a tree field receives a
/// non-sequence.
pub const SHOULD_BE_LIST: &str = "Should be a list.";

/// `self` message recorded when input nests beyond
/// [`MAX_NESTING_DEPTH`].
pub const DEPTH_EXCEEDED: &str = "Maximum nesting depth exceeded.";

/// One node's input scope, linked upward to its parent for nested
/// nodes.
///
/// The parent link gives refinement hooks visibility into ancestor
/// input; it is never an ownership relation.
#[derive(Debug)]
pub struct NodeScope {
    data: Map<String, Value>,
    initial: Map<String, Value>,
    parent: Option<Rc<NodeScope>>,
}

impl NodeScope {
    /// The raw submitted value for a field, absent when omitted.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// The prior snapshot value for a field, absent when omitted.
    pub fn initial(&self, name: &str) -> Option<&Value> {
        self.initial.get(name)
    }

    /// The raw submitted mapping.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The prior snapshot mapping.
    pub fn initial_data(&self) -> &Map<String, Value> {
        &self.initial
    }

    /// The parent node's scope, when nested.
    pub fn parent(&self) -> Option<&NodeScope> {
        self.parent.as_deref()
    }
}

struct Evaluation {
    cleaned: Map<String, Value>,
    changed: ChangeSet,
    errors: ErrorMap,
}

/// One validation pass over one `(data, initial)` pair.
pub struct FormNode {
    schema: Arc<Schema>,
    scope: Rc<NodeScope>,
    state_overrides: HashMap<String, FieldState>,
    depth: usize,
    outcome: OnceCell<Evaluation>,
}

impl FormNode {
    /// Create a root node over already-parsed input mappings.
    pub fn new(schema: Arc<Schema>, data: Map<String, Value>, initial: Map<String, Value>) -> Self {
        Self::with_scope(schema, data, initial, None, 0)
    }

    /// Create a root node from JSON values. `Null` counts as an empty
    /// mapping.
    ///
    /// # Errors
    ///
    /// Returns [`TreeFormError::NotAnObject`] when either value is
    /// neither an object nor `Null`.
    pub fn from_values(
        schema: Arc<Schema>,
        data: Value,
        initial: Value,
    ) -> Result<Self, TreeFormError> {
        Ok(Self::new(schema, require_object(data)?, require_object(initial)?))
    }

    /// Override resolved field states for this node only, e.g. to
    /// demote a normally editable field to readonly for a restricted
    /// caller. States resolve once; this consumes the node before any
    /// evaluation, so the resolution is fixed for its lifetime.
    pub fn with_state_overrides(mut self, overrides: HashMap<String, FieldState>) -> Self {
        self.state_overrides = overrides;
        self
    }

    fn with_scope(
        schema: Arc<Schema>,
        data: Map<String, Value>,
        initial: Map<String, Value>,
        parent: Option<Rc<NodeScope>>,
        depth: usize,
    ) -> Self {
        Self {
            schema,
            scope: Rc::new(NodeScope { data, initial, parent }),
            state_overrides: HashMap::new(),
            depth,
            outcome: OnceCell::new(),
        }
    }

    /// The schema this node validates against.
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// This node's input scope.
    pub fn scope(&self) -> &NodeScope {
        &self.scope
    }

    /// The effective state of a field on this node: the per-node
    /// override when present, else the declared state.
    pub fn field_state(&self, name: &str) -> Option<FieldState> {
        let spec = self.schema.field(name)?;
        Some(
            self.state_overrides
                .get(name)
                .copied()
                .unwrap_or_else(|| spec.declared_state()),
        )
    }

    /// The error structure, computed on first access and cached.
    pub fn errors(&self) -> &ErrorMap {
        &self.evaluation().errors
    }

    /// True iff the error structure is empty, recursively.
    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }

    /// The cleaned values, keyed by field name in declaration order.
    pub fn cleaned_data(&self) -> &Map<String, Value> {
        &self.evaluation().cleaned
    }

    /// The change structure, mirroring the cleaned-data shape.
    pub fn changed(&self) -> &ChangeSet {
        &self.evaluation().changed
    }

    fn evaluation(&self) -> &Evaluation {
        self.outcome.get_or_init(|| self.evaluate())
    }

    fn resolved_state(&self, name: &str) -> FieldState {
        self.state_overrides
            .get(name)
            .copied()
            .unwrap_or_else(|| {
                self.schema
                    .field(name)
                    .map(FieldSpec::declared_state)
                    .unwrap_or_default()
            })
    }

    fn evaluate(&self) -> Evaluation {
        trace!(fields = self.schema.len(), depth = self.depth, "evaluating form node");
        let schema = Arc::clone(&self.schema);
        let mut cleaned: Map<String, Value> = Map::new();
        let mut changed = ChangeSet::new();
        let mut errors = ErrorMap::new();

        for (name, spec) in schema.fields() {
            let state = self.resolved_state(name);
            let old = self
                .scope
                .initial(name)
                .cloned()
                .unwrap_or_else(|| spec.default().clone());

            // Readonly short-circuits cleaning entirely: prior value
            // adopted verbatim, no validator, no change, no hook.
            if state.is_readonly() {
                cleaned.insert(name.to_string(), old);
                continue;
            }

            let new = self
                .scope
                .raw(name)
                .cloned()
                .unwrap_or_else(|| spec.default().clone());

            let had_error = match spec.kind() {
                FieldKind::Tree { schema: nested } => {
                    let (value, had_error) =
                        self.clean_tree(name, nested, &new, &old, &mut errors, &mut changed);
                    cleaned.insert(name.to_string(), value);
                    had_error
                }
                _ => {
                    let outcome = spec.clean(&new, &old, state.is_required());
                    let had_error = !outcome.errors.is_empty();
                    if had_error {
                        debug!(field = name, reasons = outcome.errors.len(), "coercion failed");
                        for message in outcome.errors {
                            errors.push_message(name, message);
                        }
                    } else if let Some((from, to)) = outcome.change {
                        changed.record(name, from, to);
                    }
                    cleaned.insert(name.to_string(), outcome.value);
                    had_error
                }
            };

            if !had_error {
                if let Some(hook) = schema.field_hook(name) {
                    let is_tree = matches!(spec.kind(), FieldKind::Tree { .. });
                    let replacement = {
                        let mut ctx =
                            HookContext::for_field(name, is_tree, &cleaned, &self.scope, &mut errors);
                        (**hook)(&mut ctx)
                    };
                    cleaned.insert(name.to_string(), replacement);
                }
            }
        }

        let cleaned = match schema.node_hook() {
            Some(hook) => {
                // The context reads a snapshot; the argument mapping is
                // the one the hook owns and returns.
                let snapshot = cleaned.clone();
                let mut ctx = HookContext::for_node(&snapshot, &self.scope, &mut errors);
                (**hook)(&mut ctx, cleaned)
            }
            None => cleaned,
        };

        Evaluation { cleaned, changed, errors }
    }

    /// Clean one nested-tree field: pair each new element with the
    /// same-index prior element, validate each pair as a child node, and
    /// aggregate. Returns the cleaned value and whether the field
    /// errored.
    fn clean_tree(
        &self,
        name: &str,
        nested: &Arc<Schema>,
        new: &Value,
        old: &Value,
        errors: &mut ErrorMap,
        changed: &mut ChangeSet,
    ) -> (Value, bool) {
        if self.depth + 1 > MAX_NESTING_DEPTH {
            debug!(field = name, depth = self.depth, "nesting depth limit reached");
            errors.push_tree_message(name, DEPTH_EXCEEDED);
            errors.set_children(name, Vec::new());
            return (Value::Array(Vec::new()), true);
        }

        let Some(new_items) = new.as_array() else {
            debug!(field = name, "tree field received a non-sequence");
            errors.push_tree_message(name, messages::INVALID_VALUE);
            errors.push_tree_message(name, SHOULD_BE_LIST);
            errors.set_children(name, Vec::new());
            return (Value::Array(Vec::new()), true);
        };

        let old_items: &[Value] = old.as_array().map(Vec::as_slice).unwrap_or(&[]);

        let children: Vec<FormNode> = new_items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                // Extra prior elements are discarded; missing ones pair
                // with an empty mapping.
                let initial = old_items.get(index).map(as_object_or_empty).unwrap_or_default();
                FormNode::with_scope(
                    Arc::clone(nested),
                    as_object_or_empty(item),
                    initial,
                    Some(Rc::clone(&self.scope)),
                    self.depth + 1,
                )
            })
            .collect();

        let has_error = children.iter().any(|child| !child.is_valid());
        if has_error {
            errors.set_children(
                name,
                children.iter().map(|child| child.errors().clone()).collect(),
            );
        }

        let cleaned = Value::Array(
            children
                .iter()
                .map(|child| Value::Object(child.cleaned_data().clone()))
                .collect(),
        );

        if !has_error && !children.is_empty() {
            changed.record_children(
                name,
                children.iter().map(|child| child.changed().clone()).collect(),
            );
        }

        (cleaned, has_error)
    }

    /// Project this node for display: one record per field, in
    /// declaration order, built from the *prior* snapshot values (never
    /// the newly submitted ones). Labels, help texts, and choice names
    /// run through the translator here and only here.
    pub fn display_tree(&self, translator: &dyn Translate) -> DisplayTree {
        let mut tree = DisplayTree::new();
        for (name, spec) in self.schema.fields() {
            let state = self.resolved_state(name);
            let value = self
                .scope
                .initial(name)
                .cloned()
                .unwrap_or_else(|| spec.default().clone());
            let mut record = project_field(name, spec, value, state, translator);

            if let FieldKind::Tree { schema: nested } = spec.kind() {
                let items = match &record.value {
                    Value::Array(items) if self.depth + 1 <= MAX_NESTING_DEPTH => items.clone(),
                    _ => Vec::new(),
                };
                record.value = Value::Array(
                    items
                        .iter()
                        .map(|item| {
                            let child = FormNode::with_scope(
                                Arc::clone(nested),
                                Map::new(),
                                as_object_or_empty(item),
                                Some(Rc::clone(&self.scope)),
                                self.depth + 1,
                            );
                            serde_json::to_value(child.display_tree(translator))
                                .unwrap_or_default()
                        })
                        .collect(),
                );
            }

            tree.insert(name.to_string(), record);
        }
        tree
    }
}

impl std::fmt::Debug for FormNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormNode")
            .field("schema", &self.schema)
            .field("depth", &self.depth)
            .field("evaluated", &self.outcome.get().is_some())
            .finish()
    }
}

fn require_object(value: Value) -> Result<Map<String, Value>, TreeFormError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(TreeFormError::NotAnObject(json_type_name(&other))),
    }
}

fn as_object_or_empty(value: &Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
