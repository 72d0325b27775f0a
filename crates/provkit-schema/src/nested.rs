//! # Nested Attributes
//!
//! A nested attribute holds one [`NestedAttributeObject`] under a
//! [`NestingMode`]. The mode decides both the resulting type (the object
//! itself, or a list, set or map of it) and which path step descends into
//! the element object.

use std::collections::BTreeMap;

use provkit_core::{Step, StepError, Type};

use crate::attribute::Attribute;
use crate::schema::SchemaEntity;

/// How a nested attribute holds its element object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NestingMode {
    /// Exactly one object; descended into by attribute name.
    Single,
    /// Ordered objects; descended into by integer index.
    List,
    /// Unordered objects; descended into by element value.
    Set,
    /// String-keyed objects; descended into by map key.
    Map,
}

impl NestingMode {
    /// Name of the nested attribute kind that uses this mode.
    pub fn attribute_kind_name(self) -> &'static str {
        match self {
            Self::Single => "SingleNestedAttribute",
            Self::List => "ListNestedAttribute",
            Self::Set => "SetNestedAttribute",
            Self::Map => "MapNestedAttribute",
        }
    }

    /// True for every mode except [`NestingMode::Single`].
    pub fn is_collection(self) -> bool {
        !matches!(self, Self::Single)
    }

    /// The attribute type for an element object of type `object`.
    pub fn wrap(self, object: Type) -> Type {
        match self {
            Self::Single => object,
            Self::List => Type::list(object),
            Self::Set => Type::set(object),
            Self::Map => Type::map(object),
        }
    }

    /// Whether `step` selects an element object under this mode.
    pub(crate) fn selects_element(self, step: &Step) -> bool {
        matches!(
            (self, step),
            (Self::List, Step::ElementKeyInt(_))
                | (Self::Set, Step::ElementKeyValue(_))
                | (Self::Map, Step::ElementKeyString(_))
        )
    }
}

/// The named attributes of one nested element.
#[derive(Debug, Clone, Default)]
pub struct NestedAttributeObject {
    /// Member attributes by name.
    pub attributes: BTreeMap<String, Attribute>,
    /// Provider-defined object type replacing the derived one.
    pub custom_type: Option<Type>,
}

impl NestedAttributeObject {
    /// An object with the given members. A repeated name keeps its last
    /// attribute; callers own name uniqueness.
    pub fn new<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (S, Attribute)>,
        S: Into<String>,
    {
        Self {
            attributes: attributes
                .into_iter()
                .map(|(name, attribute)| (name.into(), attribute))
                .collect(),
            custom_type: None,
        }
    }

    /// Add or replace one member.
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Use a provider-defined object type.
    pub fn with_custom_type(mut self, ty: Type) -> Self {
        self.custom_type = Some(ty);
        self
    }

    /// Look up a member by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// The custom type if set, otherwise the object type over every member.
    /// `None` when a member's type is incomplete.
    pub fn object_type(&self) -> Option<Type> {
        if let Some(custom) = &self.custom_type {
            return Some(custom.clone());
        }
        self.attributes
            .iter()
            .map(|(name, attribute)| attribute.get_type().map(|ty| (name.clone(), ty)))
            .collect::<Option<BTreeMap<_, _>>>()
            .map(Type::Object)
    }

    /// True when any member, at any depth, is typed dynamic.
    pub fn contains_dynamic(&self) -> bool {
        self.attributes.values().any(Attribute::contains_dynamic)
    }

    /// Attribute names select members; every other step is rejected.
    pub fn apply_step(&self, step: &Step) -> Result<SchemaEntity<'_>, StepError> {
        match step {
            Step::AttributeName(name) => self
                .attributes
                .get(name)
                .map(SchemaEntity::Attribute)
                .ok_or_else(|| StepError::NoAttribute {
                    name: name.clone(),
                    target: "NestedAttributeObject".to_string(),
                }),
            _ => Err(StepError::Unsupported {
                step: step.kind(),
                target: "NestedAttributeObject".to_string(),
            }),
        }
    }
}
