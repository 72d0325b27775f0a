//! # provkit-core — Foundational Types for provkit
//!
//! This crate defines the type/value/path model every other provkit crate
//! builds on. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Paths are pure addresses.** A `Path` is an immutable sequence of
//!    `Step`s. Derivations always copy; nothing aliases a parent's steps.
//!
//! 2. **Closed kinds, one open seam.** `Step`, `Type`, `WireType` and the
//!    value states are closed enums matched exhaustively. Provider-defined
//!    semantics enter only through the `CustomType` trait, which wraps a
//!    built-in base type.
//!
//! 3. **Tri-state values.** Null, unknown, and known are distinct in both
//!    `WireValue` and `Value`, and every conversion preserves the state.
//!
//! 4. **One stepping protocol.** Types, nested schema objects, and schemas
//!    resolve paths through the same `ApplyStep` trait and `walk_path`.
//!
//! 5. **Aggregate, don't fail fast, at definition time.** Definition
//!    problems are collected into `Diagnostics`; lookups and conversions
//!    fail fast with typed errors.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `provkit-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types are `Send + Sync`.

pub mod convert;
pub mod declared;
pub mod diag;
pub mod error;
pub mod path;
pub mod step;
pub mod types;
pub mod value;
pub mod wire;

// Re-export primary types for ergonomic imports.
pub use convert::convert;
pub use declared::DeclaredType;
pub use diag::{Diagnostic, Diagnostics, Severity};
pub use error::{ConversionError, PathParseError, PathResolutionError, StepError};
pub use path::{Path, Step, StepKind};
pub use step::{walk_path, ApplyStep};
pub use types::{CustomType, Type};
pub use value::{KnownValue, Value, ValueState};
pub use wire::{WireData, WireType, WireValue};
