//! # Primitive Validators
//!
//! One-shot coercion/validation routines for the scalar field kinds. Each
//! validator attempts to coerce a raw submitted value into a typed value
//! or fails with an ordered list of human-readable reasons. The engine
//! builds a fresh validator per clean call, configured with the
//! required-ness resolved from the field's per-instance state.
//!
//! ## Empty-value contract
//!
//! Every validator shares the same first step: an empty raw value (see
//! [`is_empty_value`]) fails with [`messages::REQUIRED`] when the
//! validator is required, and otherwise cleans to the kind's empty result
//! (`""` for text-like kinds, `Null` for date/integer/entity, `false` for
//! boolean). Required-ness is enforced here, not by
//! presence-in-the-input-mapping: an absent field resolves to its default
//! before the validator ever runs.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;

use crate::entity::EntitySource;
use crate::value::{is_empty_value, lenient_str};

/// Stored, locale-independent validation messages. Translation is applied
/// only when errors are projected for display.
pub mod messages {
    /// An empty value reached a required validator.
    pub const REQUIRED: &str = "This field is required.";
    /// A value could not be coerced to the expected shape at all.
    pub const INVALID_VALUE: &str = "Enter a valid value.";
    /// A value could not be parsed as a calendar date.
    pub const INVALID_DATE: &str = "Enter a valid date.";
    /// A value failed the email structure check.
    pub const INVALID_EMAIL: &str = "Enter a valid email address.";
    /// A value could not be parsed as a whole number.
    pub const INVALID_INTEGER: &str = "Enter a whole number.";
    /// A value referenced an entity not present in the source.
    pub const INVALID_ENTITY_CHOICE: &str =
        "Select a valid choice. That choice is not one of the available choices.";

    /// Message for a value outside a choice field's configured choices.
    pub fn invalid_choice(value: &str) -> String {
        format!("Select a valid choice. {value} is not one of the available choices.")
    }
}

/// A one-shot coercion/validation routine.
///
/// `Ok` carries the typed (cleaned) value; `Err` carries one or more
/// human-readable reasons, in the order they were detected.
pub trait Validator {
    /// Attempt to coerce `raw` into a typed value.
    fn validate(&self, raw: &Value) -> Result<Value, Vec<String>>;
}

/// Shared required/empty preamble. `Ok(Some(v))` short-circuits with the
/// kind's empty result; `Ok(None)` means the value is non-empty and the
/// kind's own coercion should run.
fn check_empty(
    raw: &Value,
    required: bool,
    empty_result: Value,
) -> Result<Option<Value>, Vec<String>> {
    if is_empty_value(raw) {
        if required {
            Err(vec![messages::REQUIRED.to_string()])
        } else {
            Ok(Some(empty_result))
        }
    } else {
        Ok(None)
    }
}

/// Coerces scalars to strings; rejects arrays and objects.
#[derive(Debug, Clone, Copy)]
pub struct TextValidator {
    required: bool,
}

impl TextValidator {
    /// Build a text validator with the given required-ness.
    pub fn new(required: bool) -> Self {
        Self { required }
    }
}

impl Validator for TextValidator {
    fn validate(&self, raw: &Value) -> Result<Value, Vec<String>> {
        if let Some(empty) = check_empty(raw, self.required, Value::String(String::new()))? {
            return Ok(empty);
        }
        match lenient_str(raw) {
            Some(text) => Ok(Value::String(text)),
            None => Err(vec![messages::INVALID_VALUE.to_string()]),
        }
    }
}

/// Coerces integral numbers and integer-formatted strings to whole
/// numbers.
#[derive(Debug, Clone, Copy)]
pub struct IntegerValidator {
    required: bool,
}

impl IntegerValidator {
    /// Build an integer validator with the given required-ness.
    pub fn new(required: bool) -> Self {
        Self { required }
    }
}

impl Validator for IntegerValidator {
    fn validate(&self, raw: &Value) -> Result<Value, Vec<String>> {
        if let Some(empty) = check_empty(raw, self.required, Value::Null)? {
            return Ok(empty);
        }
        let reject = || vec![messages::INVALID_INTEGER.to_string()];
        match raw {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Number(i.into()))
                } else if let Some(f) = n.as_f64() {
                    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                        Ok(Value::Number((f as i64).into()))
                    } else {
                        Err(reject())
                    }
                } else {
                    Err(reject())
                }
            }
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(|i| Value::Number(i.into()))
                .map_err(|_| reject()),
            _ => Err(reject()),
        }
    }
}

/// Input formats accepted by [`DateValidator`], tried in order.
const DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

/// Parses calendar dates and normalizes them to ISO `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy)]
pub struct DateValidator {
    required: bool,
}

impl DateValidator {
    /// Build a date validator with the given required-ness.
    pub fn new(required: bool) -> Self {
        Self { required }
    }
}

impl Validator for DateValidator {
    fn validate(&self, raw: &Value) -> Result<Value, Vec<String>> {
        if let Some(empty) = check_empty(raw, self.required, Value::Null)? {
            return Ok(empty);
        }
        let Value::String(text) = raw else {
            return Err(vec![messages::INVALID_DATE.to_string()]);
        };
        let text = text.trim();
        for format in DATE_INPUT_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Ok(Value::String(date.format("%Y-%m-%d").to_string()));
            }
        }
        Err(vec![messages::INVALID_DATE.to_string()])
    }
}

/// Text coercion followed by a structural email check.
#[derive(Debug, Clone, Copy)]
pub struct EmailValidator {
    required: bool,
}

impl EmailValidator {
    /// Build an email validator with the given required-ness.
    pub fn new(required: bool) -> Self {
        Self { required }
    }
}

/// Structural check: one `@`, non-empty local part, dotted domain that
/// neither starts nor ends with a dot, no whitespace anywhere.
fn is_well_formed_email(text: &str) -> bool {
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = text.splitn(2, '@');
    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

impl Validator for EmailValidator {
    fn validate(&self, raw: &Value) -> Result<Value, Vec<String>> {
        if let Some(empty) = check_empty(raw, self.required, Value::String(String::new()))? {
            return Ok(empty);
        }
        let text = match lenient_str(raw) {
            Some(text) => text,
            None => return Err(vec![messages::INVALID_EMAIL.to_string()]),
        };
        if is_well_formed_email(&text) {
            Ok(Value::String(text))
        } else {
            Err(vec![messages::INVALID_EMAIL.to_string()])
        }
    }
}

/// Check-box style boolean coercion.
///
/// `false`, `0`, `"false"`, `"0"`, and empty values coerce to `false`;
/// any other scalar coerces to `true`. A *required* boolean must coerce
/// to `true` — the field models a box that must be ticked.
#[derive(Debug, Clone, Copy)]
pub struct BooleanValidator {
    required: bool,
}

impl BooleanValidator {
    /// Build a boolean validator with the given required-ness.
    pub fn new(required: bool) -> Self {
        Self { required }
    }
}

impl Validator for BooleanValidator {
    fn validate(&self, raw: &Value) -> Result<Value, Vec<String>> {
        if let Some(empty) = check_empty(raw, self.required, Value::Bool(false))? {
            return Ok(empty);
        }
        let coerced = match raw {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64() != Some(0.0),
            Value::String(s) => {
                let lowered = s.trim().to_ascii_lowercase();
                !(lowered.is_empty() || lowered == "false" || lowered == "0")
            }
            _ => return Err(vec![messages::INVALID_VALUE.to_string()]),
        };
        if self.required && !coerced {
            return Err(vec![messages::REQUIRED.to_string()]);
        }
        Ok(Value::Bool(coerced))
    }
}

/// Membership check against a fixed choice list, with lenient string
/// comparison so `1` and `"1"` denote the same choice. The cleaned value
/// is the configured choice value, not the raw input.
#[derive(Debug, Clone)]
pub struct ChoiceValidator {
    required: bool,
    choices: Vec<Value>,
}

impl ChoiceValidator {
    /// Build a choice validator over the configured choice values.
    pub fn new(required: bool, choices: Vec<Value>) -> Self {
        Self { required, choices }
    }
}

impl Validator for ChoiceValidator {
    fn validate(&self, raw: &Value) -> Result<Value, Vec<String>> {
        if let Some(empty) = check_empty(raw, self.required, Value::String(String::new()))? {
            return Ok(empty);
        }
        let wanted = lenient_str(raw);
        if let Some(wanted) = &wanted {
            for choice in &self.choices {
                if lenient_str(choice).as_deref() == Some(wanted.as_str()) {
                    return Ok(choice.clone());
                }
            }
        }
        let shown = wanted.unwrap_or_else(|| raw.to_string());
        Err(vec![messages::invalid_choice(&shown)])
    }
}

/// Membership check against an [`EntitySource`]. The cleaned value is the
/// source's canonical identifier for the referenced entity.
#[derive(Clone)]
pub struct EntityRefValidator {
    required: bool,
    source: Arc<dyn EntitySource>,
}

impl EntityRefValidator {
    /// Build an entity-reference validator over the given source.
    pub fn new(required: bool, source: Arc<dyn EntitySource>) -> Self {
        Self { required, source }
    }
}

impl Validator for EntityRefValidator {
    fn validate(&self, raw: &Value) -> Result<Value, Vec<String>> {
        if let Some(empty) = check_empty(raw, self.required, Value::Null)? {
            return Ok(empty);
        }
        match self.source.resolve(raw) {
            Some(id) => Ok(id),
            None => Err(vec![messages::INVALID_ENTITY_CHOICE.to_string()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::InMemoryEntitySource;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_required_text_rejects_empty_string() {
        let errors = TextValidator::new(true).validate(&json!("")).unwrap_err();
        assert_eq!(errors, vec![messages::REQUIRED.to_string()]);
    }

    #[test]
    fn test_optional_text_cleans_empty_to_empty_string() {
        assert_eq!(TextValidator::new(false).validate(&Value::Null).unwrap(), json!(""));
    }

    #[test]
    fn test_text_coerces_scalars() {
        assert_eq!(TextValidator::new(false).validate(&json!(41)).unwrap(), json!("41"));
        assert_eq!(TextValidator::new(false).validate(&json!(true)).unwrap(), json!("true"));
    }

    #[test]
    fn test_text_rejects_composites() {
        let errors = TextValidator::new(false).validate(&json!(["a"])).unwrap_err();
        assert_eq!(errors, vec![messages::INVALID_VALUE.to_string()]);
    }

    #[test]
    fn test_integer_parses_strings_and_numbers() {
        let v = IntegerValidator::new(false);
        assert_eq!(v.validate(&json!("41")).unwrap(), json!(41));
        assert_eq!(v.validate(&json!(" 41 ")).unwrap(), json!(41));
        assert_eq!(v.validate(&json!(41)).unwrap(), json!(41));
        assert_eq!(v.validate(&json!(41.0)).unwrap(), json!(41));
    }

    #[test]
    fn test_integer_rejects_non_integers() {
        let v = IntegerValidator::new(false);
        assert!(v.validate(&json!("forty-one")).is_err());
        assert!(v.validate(&json!(41.5)).is_err());
        assert!(v.validate(&json!(true)).is_err());
    }

    #[test]
    fn test_date_normalizes_formats() {
        let v = DateValidator::new(false);
        assert_eq!(v.validate(&json!("2026-08-28")).unwrap(), json!("2026-08-28"));
        assert_eq!(v.validate(&json!("08/28/2026")).unwrap(), json!("2026-08-28"));
        assert_eq!(v.validate(&json!("08/28/26")).unwrap(), json!("2026-08-28"));
    }

    #[test]
    fn test_date_rejects_garbage() {
        let v = DateValidator::new(false);
        assert_eq!(
            v.validate(&json!("2026-13-01")).unwrap_err(),
            vec![messages::INVALID_DATE.to_string()]
        );
        assert!(v.validate(&json!(20260828)).is_err());
    }

    #[test]
    fn test_email_structure() {
        let v = EmailValidator::new(false);
        assert_eq!(v.validate(&json!("ada@example.org")).unwrap(), json!("ada@example.org"));
        assert!(v.validate(&json!("ada@example")).is_err());
        assert!(v.validate(&json!("@example.org")).is_err());
        assert!(v.validate(&json!("ada example@x.org")).is_err());
        assert!(v.validate(&json!("ada@ex@ample.org")).is_err());
    }

    #[test]
    fn test_boolean_coercions() {
        let v = BooleanValidator::new(false);
        assert_eq!(v.validate(&json!("false")).unwrap(), json!(false));
        assert_eq!(v.validate(&json!("0")).unwrap(), json!(false));
        assert_eq!(v.validate(&json!("")).unwrap(), json!(false));
        assert_eq!(v.validate(&Value::Null).unwrap(), json!(false));
        assert_eq!(v.validate(&json!("yes")).unwrap(), json!(true));
        assert_eq!(v.validate(&json!(1)).unwrap(), json!(true));
    }

    #[test]
    fn test_required_boolean_must_be_ticked() {
        let v = BooleanValidator::new(true);
        assert_eq!(v.validate(&json!(false)).unwrap_err(), vec![messages::REQUIRED.to_string()]);
        assert_eq!(v.validate(&json!(true)).unwrap(), json!(true));
    }

    #[test]
    fn test_boolean_empty_composites_clean_to_false() {
        let v = BooleanValidator::new(false);
        assert_eq!(v.validate(&json!([])).unwrap(), json!(false));
        assert_eq!(v.validate(&json!({})).unwrap(), json!(false));
    }

    #[test]
    fn test_required_boolean_empty_composite_is_required_error() {
        let v = BooleanValidator::new(true);
        assert_eq!(v.validate(&json!([])).unwrap_err(), vec![messages::REQUIRED.to_string()]);
        assert_eq!(v.validate(&json!({})).unwrap_err(), vec![messages::REQUIRED.to_string()]);
    }

    #[test]
    fn test_boolean_rejects_nonempty_composites() {
        let v = BooleanValidator::new(false);
        assert_eq!(
            v.validate(&json!([1])).unwrap_err(),
            vec![messages::INVALID_VALUE.to_string()]
        );
        assert_eq!(
            v.validate(&json!({"on": true})).unwrap_err(),
            vec![messages::INVALID_VALUE.to_string()]
        );
    }

    #[test]
    fn test_choice_membership_is_lenient() {
        let v = ChoiceValidator::new(false, vec![json!(1), json!(2)]);
        assert_eq!(v.validate(&json!("1")).unwrap(), json!(1));
        assert_eq!(v.validate(&json!(2)).unwrap(), json!(2));
        let errors = v.validate(&json!("3")).unwrap_err();
        assert_eq!(errors, vec![messages::invalid_choice("3")]);
    }

    #[test]
    fn test_entity_ref_resolves_to_canonical_id() {
        let source = Arc::new(InMemoryEntitySource::new(vec![
            (json!(1), "Ada".to_string()),
            (json!(2), "Alan".to_string()),
        ]));
        let v = EntityRefValidator::new(false, source);
        assert_eq!(v.validate(&json!({"id": "2"})).unwrap(), json!(2));
        assert_eq!(
            v.validate(&json!(9)).unwrap_err(),
            vec![messages::INVALID_ENTITY_CHOICE.to_string()]
        );
    }

    proptest! {
        #[test]
        fn prop_integer_string_round_trip(n in any::<i64>()) {
            let cleaned = IntegerValidator::new(true)
                .validate(&json!(n.to_string()))
                .unwrap();
            prop_assert_eq!(cleaned, json!(n));
        }

        #[test]
        fn prop_nonempty_text_is_identity(s in "[a-zA-Z0-9 ]{1,40}") {
            let cleaned = TextValidator::new(true).validate(&json!(s.clone())).unwrap();
            prop_assert_eq!(cleaned, json!(s));
        }

        #[test]
        fn prop_required_never_accepts_empty(required in any::<bool>()) {
            let outcome = TextValidator::new(required).validate(&Value::Null);
            prop_assert_eq!(outcome.is_err(), required);
        }
    }
}
