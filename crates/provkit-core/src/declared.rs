//! # Declared Types
//!
//! How a provider declares the type of an attribute, parameter, or return
//! value. Unlike [`Type`], a declaration may leave a collection's element
//! type or an object's attribute types unset. Definition-time validation
//! reports those gaps as diagnostics instead of letting them fail deep
//! inside request handling.

use std::collections::BTreeMap;

use crate::types::Type;

/// A possibly incomplete type declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DeclaredType {
    /// String.
    String,
    /// Boolean.
    Bool,
    /// Number.
    Number,
    /// Dynamic.
    Dynamic,
    /// List with an optional element type.
    List {
        /// Element type, if declared.
        element_type: Option<Type>,
    },
    /// Set with an optional element type.
    Set {
        /// Element type, if declared.
        element_type: Option<Type>,
    },
    /// Map with an optional element type.
    Map {
        /// Element type, if declared.
        element_type: Option<Type>,
    },
    /// Object with optional attribute types.
    Object {
        /// Attribute types, if declared.
        attribute_types: Option<BTreeMap<String, Type>>,
    },
}

impl DeclaredType {
    /// A list of `element`.
    pub fn list(element: Type) -> Self {
        Self::List {
            element_type: Some(element),
        }
    }

    /// A set of `element`.
    pub fn set(element: Type) -> Self {
        Self::Set {
            element_type: Some(element),
        }
    }

    /// A map of `element`.
    pub fn map(element: Type) -> Self {
        Self::Map {
            element_type: Some(element),
        }
    }

    /// An object with the given attribute types.
    pub fn object<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (S, Type)>,
        S: Into<String>,
    {
        Self::Object {
            attribute_types: Some(
                attributes
                    .into_iter()
                    .map(|(name, ty)| (name.into(), ty))
                    .collect(),
            ),
        }
    }

    /// The complete type, or `None` when an underlying type is missing.
    pub fn to_type(&self) -> Option<Type> {
        match self {
            Self::String => Some(Type::String),
            Self::Bool => Some(Type::Bool),
            Self::Number => Some(Type::Number),
            Self::Dynamic => Some(Type::Dynamic),
            Self::List { element_type } => element_type.clone().map(Type::list),
            Self::Set { element_type } => element_type.clone().map(Type::set),
            Self::Map { element_type } => element_type.clone().map(Type::map),
            Self::Object { attribute_types } => attribute_types.clone().map(Type::Object),
        }
    }

    /// True when the element type or attribute types are unset.
    pub fn missing_underlying_type(&self) -> bool {
        match self {
            Self::List { element_type } | Self::Set { element_type } | Self::Map { element_type } => {
                element_type.is_none()
            }
            Self::Object { attribute_types } => attribute_types.is_none(),
            _ => false,
        }
    }

    /// True for list, set and map declarations.
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::List { .. } | Self::Set { .. } | Self::Map { .. })
    }

    /// True for object declarations.
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object { .. })
    }

    /// True for primitive and dynamic declarations.
    pub fn is_leaf(&self) -> bool {
        !self.is_collection() && !self.is_object()
    }
}
