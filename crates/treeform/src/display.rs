//! # Display Projection
//!
//! A thin derived view over a node: one serializable record per field,
//! in declaration order, built from the prior snapshot (never from newly
//! submitted data). This is where localization happens — labels, help
//! texts, and choice names run through the [`Translate`] collaborator at
//! projection time only.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use treeform_core::{entity_identifier, FieldState, Translate};

use crate::field::{FieldKind, FieldSpec};

/// One selectable choice in a display record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceEntry {
    /// The submittable value.
    pub value: Value,
    /// The display name, translated.
    pub name: String,
}

/// The display record for one field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDisplay {
    /// Translated label.
    pub label: String,
    /// Field name within the schema.
    pub name: String,
    /// Current value from the prior snapshot. For tree fields this is
    /// the ordered list of child display trees; for entity references
    /// the referenced entity's identifier.
    pub value: Value,
    /// Translated help text.
    pub help_text: String,
    /// Whether the resolved state is required.
    pub required: bool,
    /// Whether the resolved state is readonly.
    pub readonly: bool,
    /// The field kind's type tag.
    #[serde(rename = "type")]
    pub type_name: &'static str,
    /// Selectable choices, present for choice-like kinds only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<ChoiceEntry>>,
}

/// Ordered mapping from field name to its display record.
pub type DisplayTree = IndexMap<String, FieldDisplay>;

/// Build the display record for one field. Tree-field child recursion is
/// handled by the node, which owns the schema walk.
pub(crate) fn project_field(
    name: &str,
    spec: &FieldSpec,
    value: Value,
    state: FieldState,
    translator: &dyn Translate,
) -> FieldDisplay {
    let translate_nonempty = |text: &str| {
        if text.is_empty() {
            String::new()
        } else {
            translator.translate(text)
        }
    };

    let mut record = FieldDisplay {
        label: translate_nonempty(spec.label_text()),
        name: name.to_string(),
        value,
        help_text: translate_nonempty(spec.help()),
        required: state.is_required(),
        readonly: state.is_readonly(),
        type_name: spec.kind().type_name(),
        choices: None,
    };

    match spec.kind() {
        FieldKind::Choice { choices } => {
            let mut entries = Vec::with_capacity(choices.len() + 1);
            if let Some(label) = spec.empty_choice() {
                entries.push(ChoiceEntry {
                    value: Value::String(String::new()),
                    name: translator.translate(label),
                });
            }
            entries.extend(choices.iter().map(|(value, display)| ChoiceEntry {
                value: value.clone(),
                name: translator.translate(display),
            }));
            record.choices = Some(entries);
        }
        FieldKind::EntityRef { source } => {
            let mut entries = Vec::new();
            if let Some(label) = spec.empty_choice() {
                entries.push(ChoiceEntry {
                    value: Value::String(String::new()),
                    name: translator.translate(label),
                });
            }
            // Entity display strings come from the collection as-is;
            // only the empty-choice label is a translatable resource.
            entries.extend(
                source
                    .entries()
                    .into_iter()
                    .map(|(value, display)| ChoiceEntry { value, name: display }),
            );
            record.choices = Some(entries);
            record.value = entity_identifier(&record.value).clone();
        }
        _ => {}
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use treeform_core::{IdentityTranslator, InMemoryEntitySource};

    #[test]
    fn test_base_record_flags_follow_state() {
        let spec = FieldSpec::text().label("Name").help_text("Full name");
        let record = project_field(
            "name",
            &spec,
            json!("Ada"),
            FieldState::Required,
            &IdentityTranslator,
        );
        assert_eq!(record.label, "Name");
        assert_eq!(record.name, "name");
        assert_eq!(record.value, json!("Ada"));
        assert!(record.required);
        assert!(!record.readonly);
        assert_eq!(record.type_name, "text");
        assert!(record.choices.is_none());
    }

    #[test]
    fn test_choice_injects_empty_entry_at_front() {
        let spec = FieldSpec::choice(vec![
            (json!("s"), "Small".to_string()),
            (json!("l"), "Large".to_string()),
        ]);
        let record =
            project_field("size", &spec, json!("s"), FieldState::Normal, &IdentityTranslator);
        let choices = record.choices.unwrap();
        assert_eq!(choices[0].value, json!(""));
        assert_eq!(choices[0].name, "---------");
        assert_eq!(choices[1].name, "Small");
        assert_eq!(choices.len(), 3);
    }

    #[test]
    fn test_no_empty_choice_suppresses_entry() {
        let spec = FieldSpec::choice(vec![(json!("s"), "Small".to_string())]).no_empty_choice();
        let record =
            project_field("size", &spec, json!("s"), FieldState::Normal, &IdentityTranslator);
        assert_eq!(record.choices.unwrap().len(), 1);
    }

    #[test]
    fn test_labels_and_choice_names_are_translated() {
        let spec = FieldSpec::choice(vec![(json!("s"), "Small".to_string())]).label("Size");
        let upper = |s: &str| s.to_uppercase();
        let record = project_field("size", &spec, json!(""), FieldState::Normal, &upper);
        assert_eq!(record.label, "SIZE");
        let choices = record.choices.unwrap();
        assert_eq!(choices[0].name, "---------");
        assert_eq!(choices[1].name, "SMALL");
    }

    #[test]
    fn test_entity_value_resolves_to_identifier() {
        let source = Arc::new(InMemoryEntitySource::new(vec![
            (json!(1), "Ada".to_string()),
            (json!(2), "Alan".to_string()),
        ]));
        let spec = FieldSpec::entity_ref(source);
        let record = project_field(
            "person",
            &spec,
            json!({"id": 2, "name": "Alan"}),
            FieldState::Normal,
            &IdentityTranslator,
        );
        assert_eq!(record.value, json!(2));
        let choices = record.choices.unwrap();
        assert_eq!(choices.len(), 3);
        assert_eq!(choices[1].name, "Ada");
    }

    #[test]
    fn test_serialized_record_uses_type_key() {
        let record = project_field(
            "name",
            &FieldSpec::text(),
            json!(""),
            FieldState::Readonly,
            &IdentityTranslator,
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], json!("text"));
        assert_eq!(value["readonly"], json!(true));
        assert!(value.get("choices").is_none());
    }
}
