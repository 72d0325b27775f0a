//! # Attributes
//!
//! An [`Attribute`] is either typed directly by a [`DeclaredType`] or
//! nested, holding a [`NestedAttributeObject`] under a [`NestingMode`].
//! Attributes are plain data built with consuming builder methods:
//!
//! ```
//! use provkit_schema::{Attribute, NestedAttributeObject};
//!
//! let tags = Attribute::list_nested(NestedAttributeObject::new([
//!     ("key", Attribute::string().required()),
//!     ("value", Attribute::string().optional()),
//! ]))
//! .optional()
//! .with_description("Resource tags.");
//! assert!(tags.is_nested());
//! ```

use std::sync::Arc;

use provkit_core::{ApplyStep, DeclaredType, Step, StepError, Type, Value};

use crate::config::AttributeValidator;
use crate::nested::{NestedAttributeObject, NestingMode};
use crate::schema::SchemaEntity;

/// What an attribute is made of.
#[derive(Debug, Clone)]
pub enum AttributeKind {
    /// A primitive, collection, object or dynamic declaration.
    Typed(DeclaredType),
    /// An object, or a collection of objects, with its own attributes.
    Nested {
        /// How the element object is held.
        mode: NestingMode,
        /// The element object.
        object: NestedAttributeObject,
    },
}

/// One schema attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    /// Type declaration or nested object.
    pub kind: AttributeKind,
    /// Must be set in configuration.
    pub required: bool,
    /// May be set in configuration.
    pub optional: bool,
    /// May be set by the provider.
    pub computed: bool,
    /// Value is redacted in output.
    pub sensitive: bool,
    /// Practitioner-facing description.
    pub description: String,
    /// Non-empty when the attribute is deprecated.
    pub deprecation_message: String,
    /// Value used when configuration leaves the attribute unset.
    pub default: Option<Value>,
    /// Provider-defined type replacing the declared one.
    pub custom_type: Option<Type>,
    /// Configuration validators, run in order.
    pub validators: Vec<Arc<dyn AttributeValidator>>,
}

impl Attribute {
    /// An attribute of the given declared type.
    pub fn typed(declared: DeclaredType) -> Self {
        Self::with_kind(AttributeKind::Typed(declared))
    }

    /// A nested attribute.
    pub fn nested(mode: NestingMode, object: NestedAttributeObject) -> Self {
        Self::with_kind(AttributeKind::Nested { mode, object })
    }

    fn with_kind(kind: AttributeKind) -> Self {
        Self {
            kind,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            description: String::new(),
            deprecation_message: String::new(),
            default: None,
            custom_type: None,
            validators: Vec::new(),
        }
    }

    /// A string attribute.
    pub fn string() -> Self {
        Self::typed(DeclaredType::String)
    }

    /// A boolean attribute.
    pub fn bool() -> Self {
        Self::typed(DeclaredType::Bool)
    }

    /// A number attribute.
    pub fn number() -> Self {
        Self::typed(DeclaredType::Number)
    }

    /// A dynamic attribute.
    pub fn dynamic() -> Self {
        Self::typed(DeclaredType::Dynamic)
    }

    /// A list attribute of `element`.
    pub fn list(element: Type) -> Self {
        Self::typed(DeclaredType::list(element))
    }

    /// A set attribute of `element`.
    pub fn set(element: Type) -> Self {
        Self::typed(DeclaredType::set(element))
    }

    /// A map attribute of `element`.
    pub fn map(element: Type) -> Self {
        Self::typed(DeclaredType::map(element))
    }

    /// An object attribute with the given attribute types.
    pub fn object<I, S>(attributes: I) -> Self
    where
        I: IntoIterator<Item = (S, Type)>,
        S: Into<String>,
    {
        Self::typed(DeclaredType::object(attributes))
    }

    /// A single nested object.
    pub fn single_nested(object: NestedAttributeObject) -> Self {
        Self::nested(NestingMode::Single, object)
    }

    /// A list of nested objects.
    pub fn list_nested(object: NestedAttributeObject) -> Self {
        Self::nested(NestingMode::List, object)
    }

    /// A set of nested objects.
    pub fn set_nested(object: NestedAttributeObject) -> Self {
        Self::nested(NestingMode::Set, object)
    }

    /// A map of nested objects.
    pub fn map_nested(object: NestedAttributeObject) -> Self {
        Self::nested(NestingMode::Map, object)
    }

    /// Must be set in configuration.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// May be set in configuration.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// May be set by the provider.
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    /// Redact the value in output.
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Set the practitioner-facing description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the attribute deprecated.
    pub fn with_deprecation_message(mut self, message: impl Into<String>) -> Self {
        self.deprecation_message = message.into();
        self
    }

    /// Value used when configuration leaves the attribute unset.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Replace the declared type with a provider-defined one.
    pub fn with_custom_type(mut self, ty: Type) -> Self {
        self.custom_type = Some(ty);
        self
    }

    /// Append a configuration validator.
    pub fn with_validator(mut self, validator: impl AttributeValidator + 'static) -> Self {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Kind name used in messages, e.g. `ListNestedAttribute`.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            AttributeKind::Typed(declared) => match declared {
                DeclaredType::String => "StringAttribute",
                DeclaredType::Bool => "BoolAttribute",
                DeclaredType::Number => "NumberAttribute",
                DeclaredType::Dynamic => "DynamicAttribute",
                DeclaredType::List { .. } => "ListAttribute",
                DeclaredType::Set { .. } => "SetAttribute",
                DeclaredType::Map { .. } => "MapAttribute",
                DeclaredType::Object { .. } => "ObjectAttribute",
            },
            AttributeKind::Nested { mode, .. } => mode.attribute_kind_name(),
        }
    }

    /// True for nested attributes.
    pub fn is_nested(&self) -> bool {
        matches!(self.kind, AttributeKind::Nested { .. })
    }

    /// The element object of a nested attribute.
    pub fn nested_object(&self) -> Option<&NestedAttributeObject> {
        match &self.kind {
            AttributeKind::Nested { object, .. } => Some(object),
            AttributeKind::Typed(_) => None,
        }
    }

    /// Settable only by the provider.
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }

    /// The attribute's type: the custom type if set, otherwise the declared
    /// or derived one. `None` when the declaration is incomplete.
    pub fn get_type(&self) -> Option<Type> {
        if let Some(custom) = &self.custom_type {
            return Some(custom.clone());
        }
        match &self.kind {
            AttributeKind::Typed(declared) => declared.to_type(),
            AttributeKind::Nested { mode, object } => object.object_type().map(|ty| mode.wrap(ty)),
        }
    }

    /// True when a dynamic type appears anywhere in this attribute.
    pub fn contains_dynamic(&self) -> bool {
        match &self.kind {
            AttributeKind::Nested { object, .. } if self.custom_type.is_none() => {
                object.contains_dynamic()
            }
            _ => self.get_type().is_some_and(|ty| ty.contains_dynamic()),
        }
    }

    /// Descend one step.
    ///
    /// Nested attributes accept the step their mode selects. Dynamic
    /// attributes accept none. Every other attribute delegates to its type.
    pub fn apply_step(&self, step: &Step) -> Result<SchemaEntity<'_>, StepError> {
        match &self.kind {
            AttributeKind::Nested { mode, object } => {
                if mode.selects_element(step) {
                    return Ok(SchemaEntity::NestedAttributeObject(object));
                }
                match (mode, step) {
                    (NestingMode::Single, Step::AttributeName(name)) => object
                        .attribute(name)
                        .map(SchemaEntity::Attribute)
                        .ok_or_else(|| StepError::NoAttribute {
                            name: name.clone(),
                            target: self.kind_name().to_string(),
                        }),
                    _ => Err(StepError::Inapplicable {
                        step: step.kind(),
                        target: self.kind_name().to_string(),
                    }),
                }
            }
            AttributeKind::Typed(DeclaredType::Dynamic) if self.custom_type.is_none() => {
                Err(StepError::Unsupported {
                    step: step.kind(),
                    target: Type::Dynamic.to_string(),
                })
            }
            AttributeKind::Typed(_) => {
                let ty = self.get_type().ok_or_else(|| StepError::MissingType {
                    target: self.kind_name().to_string(),
                })?;
                ty.apply_step(step).map(SchemaEntity::Type)
            }
        }
    }
}
