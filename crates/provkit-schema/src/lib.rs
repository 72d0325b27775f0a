//! # provkit-schema — Schema Definitions
//!
//! The schema model a provider uses to describe its configuration, and the
//! machinery that checks and navigates it.
//!
//! ## Definitions (`attribute`, `nested`, `block`, `schema`)
//!
//! A [`Schema`] holds root [`Attribute`]s and [`Block`]s. Attributes are
//! typed by a [`provkit_core::DeclaredType`] or nest a
//! [`NestedAttributeObject`] under a [`NestingMode`]; blocks nest a
//! [`NestedBlockObject`] under a [`BlockNestingMode`].
//!
//! ## Path Lookup
//!
//! Every position in the tree is a [`SchemaEntity`] implementing the core
//! stepping protocol. [`Schema::type_at_path`] and
//! [`Schema::attribute_at_path`] resolve a [`provkit_core::Path`] and report
//! failures as `Invalid Schema Path` diagnostics.
//!
//! ## Validation (`validate`, `config`)
//!
//! - [`Schema::validate_implementation`] audits the definition once, before
//!   serving, and aggregates every problem it finds.
//! - [`Schema::validate_config`] checks a configuration value against the
//!   definition and runs provider-supplied [`AttributeValidator`]s.
//!
//! ## Crate Policy
//!
//! - Depends only on `provkit-core` internally.
//! - Definitions are plain data. They are validated after construction,
//!   never during it, and are read-only afterwards.

pub mod attribute;
pub mod block;
pub mod config;
pub mod nested;
pub mod schema;
pub mod validate;

pub use attribute::{Attribute, AttributeKind};
pub use block::{Block, BlockNestingMode, NestedBlockObject};
pub use config::{AttributeValidator, ValidateRequest};
pub use nested::{NestedAttributeObject, NestingMode};
pub use schema::{Schema, SchemaEntity, SchemaKind};
pub use validate::{is_valid_name, reserved_root_names};
