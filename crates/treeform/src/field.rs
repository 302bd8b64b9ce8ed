//! # Field Declarations
//!
//! A [`FieldSpec`] is one declared field: its kind, label, declared
//! state, default value, optional empty-choice label, and help text. The
//! name is assigned when the spec is inserted into a schema, not at
//! declaration.
//!
//! The spec also carries the per-field clean step: build a one-shot
//! validator configured with the resolved required-ness, attempt
//! coercion, and on success decide whether the value changed against the
//! prior snapshot under the kind's equality rule. Old value and
//! required-ness are per-call inputs rather than field-intrinsic, because
//! required-ness depends on the per-instance state (readonly is never
//! required) and the old value comes from the prior snapshot, not the
//! field definition.

use std::sync::Arc;

use serde_json::Value;

use treeform_core::{
    entity_identifier, lenient_str, messages, BooleanValidator, ChoiceValidator, DateValidator,
    EmailValidator, EntityRefValidator, EntitySource, FieldState, IntegerValidator, TextValidator,
    Validator,
};

use crate::schema::Schema;

/// Empty-choice label offered by choice-like fields unless overridden.
pub const DEFAULT_EMPTY_CHOICE_LABEL: &str = "---------";

/// The value kind a field validates.
#[derive(Clone)]
pub enum FieldKind {
    /// Free text; scalars coerce via string conversion.
    Text,
    /// Whole numbers, accepted as numbers or integer-formatted strings.
    Integer,
    /// Calendar dates, normalized to ISO `YYYY-MM-DD`.
    Date,
    /// Text with a structural email check.
    Email,
    /// Check-box boolean.
    Boolean,
    /// One of a fixed, ordered list of `(value, display name)` pairs.
    Choice {
        /// The configured choices, in display order.
        choices: Vec<(Value, String)>,
    },
    /// A reference into a queryable entity collection.
    EntityRef {
        /// The collection the reference resolves against.
        source: Arc<dyn EntitySource>,
    },
    /// An ordered sequence of nested sub-trees, one child node per
    /// element, validated against the nested schema.
    Tree {
        /// The nested schema each element is validated against.
        schema: Arc<Schema>,
    },
}

impl FieldKind {
    /// The type tag used in display projections.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Date => "date",
            FieldKind::Email => "email",
            FieldKind::Boolean => "boolean",
            FieldKind::Choice { .. } => "choice",
            FieldKind::EntityRef { .. } => "entity_ref",
            FieldKind::Tree { .. } => "tree",
        }
    }
}

impl std::fmt::Debug for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Outcome of one per-field clean step.
#[derive(Debug, Clone)]
pub struct CleanOutcome {
    /// The cleaned value; `Null` when coercion failed (the raw input is
    /// discarded, never stored).
    pub value: Value,
    /// Ordered human-readable reasons; empty on success.
    pub errors: Vec<String>,
    /// `(old value, cleaned value)` when the value changed against the
    /// prior snapshot under the field's equality rule.
    pub change: Option<(Value, Value)>,
}

/// One declared field of a schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    kind: FieldKind,
    label: String,
    state: FieldState,
    default: Value,
    empty_choice_label: Option<String>,
    help_text: String,
}

impl FieldSpec {
    fn of_kind(kind: FieldKind, default: Value) -> Self {
        Self {
            kind,
            label: String::new(),
            state: FieldState::Normal,
            default,
            empty_choice_label: Some(DEFAULT_EMPTY_CHOICE_LABEL.to_string()),
            help_text: String::new(),
        }
    }

    /// A free-text field, defaulting to `""`.
    pub fn text() -> Self {
        Self::of_kind(FieldKind::Text, Value::String(String::new()))
    }

    /// A whole-number field, defaulting to `Null`.
    pub fn integer() -> Self {
        Self::of_kind(FieldKind::Integer, Value::Null)
    }

    /// A calendar-date field, defaulting to `Null`.
    pub fn date() -> Self {
        Self::of_kind(FieldKind::Date, Value::Null)
    }

    /// An email field, defaulting to `""`.
    pub fn email() -> Self {
        Self::of_kind(FieldKind::Email, Value::String(String::new()))
    }

    /// A check-box boolean field, defaulting to `false`.
    pub fn boolean() -> Self {
        Self::of_kind(FieldKind::Boolean, Value::Bool(false))
    }

    /// A fixed-choice field over `(value, display name)` pairs,
    /// defaulting to `""`.
    pub fn choice(choices: Vec<(Value, String)>) -> Self {
        Self::of_kind(FieldKind::Choice { choices }, Value::String(String::new()))
    }

    /// An entity-reference field over the given source, defaulting to
    /// `Null`.
    pub fn entity_ref(source: Arc<dyn EntitySource>) -> Self {
        Self::of_kind(FieldKind::EntityRef { source }, Value::Null)
    }

    /// A nested-tree field over the given schema, defaulting to `[]`.
    pub fn tree(schema: Arc<Schema>) -> Self {
        Self::of_kind(FieldKind::Tree { schema }, Value::Array(Vec::new()))
    }

    /// Set the display label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the declared state.
    pub fn state(mut self, state: FieldState) -> Self {
        self.state = state;
        self
    }

    /// Declare the field required.
    pub fn required(self) -> Self {
        self.state(FieldState::Required)
    }

    /// Declare the field readonly.
    pub fn readonly(self) -> Self {
        self.state(FieldState::Readonly)
    }

    /// Set the default used when the field is absent from an input
    /// mapping. Only absence triggers the default; an explicitly
    /// submitted value equal to the default is real input.
    pub fn default_value(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    /// Set the help text.
    pub fn help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = help_text.into();
        self
    }

    /// Set the label of the empty-choice entry offered by choice-like
    /// fields.
    pub fn empty_choice_label(mut self, label: impl Into<String>) -> Self {
        self.empty_choice_label = Some(label.into());
        self
    }

    /// Offer no empty-choice entry at all.
    pub fn no_empty_choice(mut self) -> Self {
        self.empty_choice_label = None;
        self
    }

    /// The field's kind.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// The display label (untranslated).
    pub fn label_text(&self) -> &str {
        &self.label
    }

    /// The declared state, before any per-node override.
    pub fn declared_state(&self) -> FieldState {
        self.state
    }

    /// The default used when the field is absent from an input mapping.
    pub fn default(&self) -> &Value {
        &self.default
    }

    /// The help text (untranslated).
    pub fn help(&self) -> &str {
        &self.help_text
    }

    /// The empty-choice label, `None` when no empty choice is offered.
    pub fn empty_choice(&self) -> Option<&str> {
        self.empty_choice_label.as_deref()
    }

    /// Build a one-shot validator configured with the resolved
    /// required-ness. `None` for nested-tree fields, whose cleaning is
    /// driven by the node rather than a primitive validator.
    pub fn validator(&self, required: bool) -> Option<Box<dyn Validator>> {
        match &self.kind {
            FieldKind::Text => Some(Box::new(TextValidator::new(required))),
            FieldKind::Integer => Some(Box::new(IntegerValidator::new(required))),
            FieldKind::Date => Some(Box::new(DateValidator::new(required))),
            FieldKind::Email => Some(Box::new(EmailValidator::new(required))),
            FieldKind::Boolean => Some(Box::new(BooleanValidator::new(required))),
            FieldKind::Choice { choices } => Some(Box::new(ChoiceValidator::new(
                required,
                choices.iter().map(|(value, _)| value.clone()).collect(),
            ))),
            FieldKind::EntityRef { source } => {
                Some(Box::new(EntityRefValidator::new(required, Arc::clone(source))))
            }
            FieldKind::Tree { .. } => None,
        }
    }

    /// Whether a cleaned value counts as changed against the prior one.
    ///
    /// Structural equality, except entity references: there an entity
    /// object and its bare identifier are equal, and identifiers compare
    /// leniently (`1` equals `"1"`).
    pub fn value_changed(&self, new: &Value, old: &Value) -> bool {
        match &self.kind {
            FieldKind::EntityRef { .. } => {
                let new_id = lenient_str(entity_identifier(new));
                let old_id = lenient_str(entity_identifier(old));
                match (new_id, old_id) {
                    (Some(a), Some(b)) => a != b,
                    _ => new != old,
                }
            }
            _ => new != old,
        }
    }

    /// The per-field clean step for scalar kinds: coerce the new value,
    /// then detect a change against the old one.
    pub fn clean(&self, new: &Value, old: &Value, required: bool) -> CleanOutcome {
        let Some(validator) = self.validator(required) else {
            // Nested-tree fields never take this path; the node pairs
            // child inputs positionally and recurses instead.
            return CleanOutcome {
                value: Value::Null,
                errors: vec![messages::INVALID_VALUE.to_string()],
                change: None,
            };
        };
        match validator.validate(new) {
            Ok(value) => {
                let change = if self.value_changed(&value, old) {
                    Some((old.clone(), value.clone()))
                } else {
                    None
                };
                CleanOutcome { value, errors: Vec::new(), change }
            }
            Err(errors) => CleanOutcome { value: Value::Null, errors, change: None },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use treeform_core::InMemoryEntitySource;

    #[test]
    fn test_clean_success_records_change() {
        let spec = FieldSpec::integer().label("Age");
        let outcome = spec.clean(&json!("41"), &json!(40), false);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.value, json!(41));
        assert_eq!(outcome.change, Some((json!(40), json!(41))));
    }

    #[test]
    fn test_clean_equal_after_coercion_is_unchanged() {
        let spec = FieldSpec::integer();
        let outcome = spec.clean(&json!("40"), &json!(40), false);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.change, None);
    }

    #[test]
    fn test_clean_failure_discards_raw_value() {
        let spec = FieldSpec::integer();
        let outcome = spec.clean(&json!("forty"), &json!(40), false);
        assert_eq!(outcome.value, Value::Null);
        assert_eq!(outcome.errors, vec![messages::INVALID_INTEGER.to_string()]);
        assert_eq!(outcome.change, None);
    }

    #[test]
    fn test_entity_object_equals_its_identifier() {
        let source = Arc::new(InMemoryEntitySource::new(vec![(json!(7), "Ada".into())]));
        let spec = FieldSpec::entity_ref(source);
        assert!(!spec.value_changed(&json!(7), &json!({"id": 7, "name": "Ada"})));
        assert!(!spec.value_changed(&json!(7), &json!("7")));
        assert!(spec.value_changed(&json!(7), &json!(8)));
    }

    #[test]
    fn test_boolean_defaults_to_false() {
        assert_eq!(FieldSpec::boolean().default(), &json!(false));
    }

    #[test]
    fn test_empty_choice_label_defaults_and_clears() {
        let spec = FieldSpec::choice(vec![(json!("a"), "A".into())]);
        assert_eq!(spec.empty_choice(), Some(DEFAULT_EMPTY_CHOICE_LABEL));
        assert_eq!(spec.no_empty_choice().empty_choice(), None);
    }
}
