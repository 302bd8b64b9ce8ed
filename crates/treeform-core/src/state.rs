//! # Field States
//!
//! The three-valued per-field state that drives the cleaning engine.
//!
//! ## Semantics
//!
//! - `Required` — the field's validator runs with its required check armed.
//! - `Normal` — the validator runs, but an empty value cleans to the kind's
//!   empty result instead of erroring.
//! - `Readonly` — cleaning is short-circuited entirely: the prior snapshot
//!   value is adopted verbatim, no validator runs, no change is recorded,
//!   and no refinement hook fires. Readonly fields can never produce
//!   errors; callers must not route untrusted input through the prior
//!   snapshot for such fields.

use serde::{Deserialize, Serialize};

/// Per-field validation state.
///
/// A field declares a state in its spec; a node may override it per
/// instance at construction time. The resolved state is fixed for the
/// node's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldState {
    /// Validator runs with the required check armed.
    Required,
    /// Validator runs; empty values clean to the kind's empty result.
    Normal,
    /// Cleaning short-circuits to the prior snapshot value.
    Readonly,
}

impl FieldState {
    /// Whether this state arms the validator's required check.
    pub fn is_required(self) -> bool {
        matches!(self, FieldState::Required)
    }

    /// Whether this state bypasses validation entirely.
    pub fn is_readonly(self) -> bool {
        matches!(self, FieldState::Readonly)
    }
}

impl Default for FieldState {
    fn default() -> Self {
        FieldState::Normal
    }
}

impl std::fmt::Display for FieldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldState::Required => "required",
            FieldState::Normal => "normal",
            FieldState::Readonly => "readonly",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_flags() {
        assert!(FieldState::Required.is_required());
        assert!(!FieldState::Normal.is_required());
        assert!(!FieldState::Readonly.is_required());
        assert!(FieldState::Readonly.is_readonly());
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&FieldState::Readonly).unwrap();
        assert_eq!(json, r#""readonly""#);
        let back: FieldState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, FieldState::Readonly);
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldState::Normal.to_string(), "normal");
    }
}
