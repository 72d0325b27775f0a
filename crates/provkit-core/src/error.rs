//! # Error Types
//!
//! Structured errors for path stepping, path resolution, path parsing and
//! value conversion. All errors use `thiserror` for derive-based `Display`
//! and `Error` implementations.
//!
//! ## Design
//!
//! - Stepping errors name the step kind and the entity kind it could not be
//!   applied to. Callers and tests match on the literal message text.
//! - Resolution errors carry the failed step, the unconsumed remainder, and
//!   the full original path.
//! - Conversion errors carry the structural position of the mismatch.

use thiserror::Error;

use crate::path::{Path, Step, StepKind};
use crate::wire::WireType;

/// Renders a position for error messages; the empty path is `(root)`.
pub(crate) fn display_position(path: &Path) -> String {
    if path.is_empty() {
        "(root)".to_string()
    } else {
        path.to_string()
    }
}

/// Failure to apply a single path step to an entity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    /// A leaf entity (primitive type, schema, nested object) does not accept
    /// this kind of step.
    #[error("cannot apply AttributePathStep {step} to {target}")]
    Unsupported {
        /// Kind of the rejected step.
        step: StepKind,
        /// Entity the step was applied to.
        target: String,
    },

    /// A container entity (collection type, nested attribute or block) does
    /// not accept this kind of step.
    #[error("cannot apply step {step} to {target}")]
    Inapplicable {
        /// Kind of the rejected step.
        step: StepKind,
        /// Entity the step was applied to.
        target: String,
    },

    /// Object type has no attribute with this name.
    #[error("undefined attribute name {name} in ObjectType")]
    UndefinedAttribute {
        /// Requested attribute name.
        name: String,
    },

    /// Nested attribute object has no attribute with this name.
    #[error("no attribute \"{name}\" on {target}")]
    NoAttribute {
        /// Requested attribute name.
        name: String,
        /// Entity that was searched.
        target: String,
    },

    /// Nested block object has no attribute or block with this name.
    #[error("no attribute or block \"{name}\" on {target}")]
    NoAttributeOrBlock {
        /// Requested attribute or block name.
        name: String,
        /// Entity that was searched.
        target: String,
    },

    /// The schema root has no attribute or block with this name.
    #[error("could not find attribute or block \"{name}\" in schema")]
    NotInSchema {
        /// Requested attribute or block name.
        name: String,
    },

    /// Tuple element index is negative or past the end.
    #[error("element index {index} out of range for {target}")]
    IndexOutOfRange {
        /// Requested index.
        index: i64,
        /// Tuple type that was indexed.
        target: String,
    },

    /// The entity declares no resolvable type.
    #[error("{target} is missing its type")]
    MissingType {
        /// Entity without a type.
        target: String,
    },
}

/// A path could not be resolved against a steppable entity tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} still remains in the path: {source}", unresolved(.step, .remaining))]
pub struct PathResolutionError {
    /// The step that could not be applied.
    pub step: Step,
    /// Steps after the failed one that were never consumed.
    pub remaining: Path,
    /// The full path that was being resolved.
    pub path: Path,
    /// Why the step was rejected.
    pub source: StepError,
}

fn unresolved(step: &Step, remaining: &Path) -> String {
    let mut out = format!("{step:?}");
    for rest in remaining.steps() {
        out.push('.');
        out.push_str(&format!("{rest:?}"));
    }
    out
}

/// Failure to parse the textual form of a path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid path {input:?} at offset {offset}: {reason}")]
pub struct PathParseError {
    /// The text that was parsed.
    pub input: String,
    /// Byte offset of the offending character.
    pub offset: usize,
    /// What was expected at that offset.
    pub reason: String,
}

/// Failure while moving a value across the wire boundary or between types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// Serializing a value to its wire form failed.
    #[error("{}: unable to serialize value: {reason}", display_position(.position))]
    Serialization {
        /// Position of the value that failed.
        position: Path,
        /// Underlying reason.
        reason: String,
    },

    /// A wire value's type cannot stand in for the expected type.
    #[error("{}: can't use {actual} as value of {expected}", display_position(.position))]
    TypeMismatch {
        /// Position of the mismatching value.
        position: Path,
        /// Wire type that was required.
        expected: WireType,
        /// Wire type that was found.
        actual: WireType,
    },

    /// Raw data does not match the kind its type declares.
    #[error("{}: can't use {found} data as value of {expected}", display_position(.position))]
    DataMismatch {
        /// Position of the mismatching value.
        position: Path,
        /// Wire type that was required.
        expected: WireType,
        /// Kind of data that was found.
        found: &'static str,
    },

    /// Elements of a dynamically typed collection disagree on their type.
    #[error("{}: collection elements must share one type, found {actual} after {expected}", display_position(.position))]
    MixedElements {
        /// Position of the first disagreeing element.
        position: Path,
        /// Type of the earlier elements.
        expected: WireType,
        /// Type of the disagreeing element.
        actual: WireType,
    },

    /// An object value lacks an attribute its type declares.
    #[error("{}: missing attribute {name:?}", display_position(.position))]
    MissingAttribute {
        /// Position of the object.
        position: Path,
        /// Declared attribute with no value.
        name: String,
    },

    /// An object value holds an attribute its type does not declare.
    #[error("{}: unexpected attribute {name:?}", display_position(.position))]
    UnexpectedAttribute {
        /// Position of the object.
        position: Path,
        /// Undeclared attribute name.
        name: String,
    },

    /// A tuple value has the wrong number of elements.
    #[error("{}: expected {expected} tuple elements, found {actual}", display_position(.position))]
    LengthMismatch {
        /// Position of the tuple.
        position: Path,
        /// Declared element count.
        expected: usize,
        /// Element count found.
        actual: usize,
    },

    /// A known value typed only as dynamic carries no concrete type.
    #[error("{}: ambiguous known value for DynamicPseudoType", display_position(.position))]
    AmbiguousDynamic {
        /// Position of the value.
        position: Path,
    },

    /// A framework value does not have the type its container requires.
    #[error("{}: expected value of {expected}, found {actual}", display_position(.position))]
    ValueType {
        /// Position of the value.
        position: Path,
        /// Required framework type.
        expected: String,
        /// Framework type found.
        actual: String,
    },
}

impl ConversionError {
    /// Structural position where the conversion failed.
    pub fn position(&self) -> &Path {
        match self {
            Self::Serialization { position, .. }
            | Self::TypeMismatch { position, .. }
            | Self::DataMismatch { position, .. }
            | Self::MixedElements { position, .. }
            | Self::MissingAttribute { position, .. }
            | Self::UnexpectedAttribute { position, .. }
            | Self::LengthMismatch { position, .. }
            | Self::AmbiguousDynamic { position }
            | Self::ValueType { position, .. } => position,
        }
    }
}
