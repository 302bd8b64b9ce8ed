//! # Localization Seam
//!
//! Labels, help texts, and error messages are stored untranslated and run
//! through a [`Translate`] implementation only when projected for display.
//! Keeping translation out of the validation path means stored error keys
//! stay locale-independent and a single validation pass can be projected
//! into any number of locales.

/// Translates a display string into the consumer's locale.
pub trait Translate {
    /// Translate one message. Unknown messages should be returned
    /// unchanged rather than erroring.
    fn translate(&self, message: &str) -> String;
}

/// The no-op translator: every message maps to itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

impl Translate for IdentityTranslator {
    fn translate(&self, message: &str) -> String {
        message.to_string()
    }
}

impl<F> Translate for F
where
    F: Fn(&str) -> String,
{
    fn translate(&self, message: &str) -> String {
        self(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_translator() {
        assert_eq!(IdentityTranslator.translate("hello"), "hello");
    }

    #[test]
    fn test_closure_translator() {
        let reverse = |s: &str| s.chars().rev().collect::<String>();
        let translator: &dyn Translate = &reverse;
        assert_eq!(translator.translate("abc"), "cba");
    }
}
