//! # treeform — Declarative Tree-Form Validation & Change Tracking
//!
//! A schema declares named fields in order, including nested sub-schemas
//! to arbitrary (bounded) depth. Each validation pass binds one schema
//! to one `(data, initial)` pair of already-parsed JSON mappings and
//! produces three projections:
//!
//! 1. **cleaned data** — coerced, typed values keyed by field name;
//! 2. **changes** — a diff against the prior snapshot, mirroring the
//!    cleaned-data shape;
//! 3. **errors** — a structured tree with `self`/`children` buckets for
//!    nested fields, surfaced as data rather than failures.
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use treeform::{FieldSpec, FormNode, Schema};
//!
//! let contact = Arc::new(
//!     Schema::builder()
//!         .field("email", FieldSpec::email().label("Email").required())
//!         .build()
//!         .unwrap(),
//! );
//! let schema = Arc::new(
//!     Schema::builder()
//!         .field("name", FieldSpec::text().label("Name").required())
//!         .field("contacts", FieldSpec::tree(contact).label("Contacts"))
//!         .build()
//!         .unwrap(),
//! );
//!
//! let node = FormNode::from_values(
//!     schema,
//!     json!({"name": "Ada", "contacts": [{"email": "ada@example.org"}]}),
//!     json!({"name": "Ada", "contacts": []}),
//! )
//! .unwrap();
//!
//! assert!(node.is_valid());
//! assert_eq!(node.cleaned_data()["contacts"][0]["email"], json!("ada@example.org"));
//! ```
//!
//! ## Crate Policy
//!
//! - Schemas are immutable and shared (`Arc`); per-request state lives
//!   on the node.
//! - Validation failures are data in the error tree; `Result` is
//!   reserved for API misuse.
//! - No `unsafe` code; no `panic!()` or `.unwrap()` outside tests and
//!   doc examples.

pub mod diff;
pub mod display;
pub mod field;
pub mod hooks;
pub mod node;
pub mod schema;

pub use diff::{ChangeSet, FieldChange};
pub use display::{ChoiceEntry, DisplayTree, FieldDisplay};
pub use field::{CleanOutcome, FieldKind, FieldSpec, DEFAULT_EMPTY_CHOICE_LABEL};
pub use hooks::{FieldHook, HookContext, NodeHook};
pub use node::{FormNode, NodeScope, DEPTH_EXCEEDED, MAX_NESTING_DEPTH, SHOULD_BE_LIST};
pub use schema::{Schema, SchemaBuilder};

// Re-export the core seams so downstream code needs only this crate.
pub use treeform_core::{
    messages, EntitySource, ErrorMap, FieldErrors, FieldState, IdentityTranslator,
    InMemoryEntitySource, Translate, TreeFormError,
};
