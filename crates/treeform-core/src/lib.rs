//! # treeform-core — Foundational Types for the Treeform Engine
//!
//! This crate is the leaf of the workspace: the engine crate depends on
//! it, and it depends on nothing internal. It defines the pieces of the
//! validation engine that are independent of schemas and nodes:
//!
//! - [`FieldState`] — the three-valued per-field state.
//! - [`ErrorMap`] / [`FieldErrors`] — errors-as-data, with the
//!   `self`/`children` bucket structure for nested-tree fields.
//! - [`Validator`] and the concrete primitive validators — one-shot
//!   coercion routines that either produce a typed value or fail with an
//!   ordered list of human-readable reasons.
//! - [`EntitySource`] — the queryable-collection seam for
//!   entity-reference fields.
//! - [`Translate`] — the localization seam, applied at projection time
//!   only.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `treeform-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Validation failures are data ([`ErrorMap`]), never `Err`s;
//!   [`TreeFormError`] covers API misuse only.

pub mod entity;
pub mod errors;
pub mod state;
pub mod translate;
pub mod validate;
pub mod value;

pub use entity::{EntitySource, InMemoryEntitySource};
pub use errors::{ErrorMap, FieldErrors, TreeFormError};
pub use state::FieldState;
pub use translate::{IdentityTranslator, Translate};
pub use validate::{
    messages, BooleanValidator, ChoiceValidator, DateValidator, EmailValidator,
    EntityRefValidator, IntegerValidator, TextValidator, Validator,
};
pub use value::{entity_identifier, is_empty_value, lenient_str};
