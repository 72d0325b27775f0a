//! # Blocks
//!
//! Blocks are nested structures that carry their own attributes and
//! further blocks. Unlike nested attributes they have no requiredness of
//! their own and no map mode.

use std::collections::BTreeMap;

use provkit_core::{Step, StepError, Type};

use crate::attribute::Attribute;
use crate::schema::SchemaEntity;

/// How a block holds its element object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockNestingMode {
    /// Ordered elements, descended into by integer index.
    List,
    /// Unordered elements, descended into by element value.
    Set,
    /// One element, descended into by attribute or block name.
    Single,
}

impl BlockNestingMode {
    /// Name of the block kind that uses this mode.
    pub fn kind_name(self) -> &'static str {
        match self {
            Self::List => "ListNestedBlock",
            Self::Set => "SetNestedBlock",
            Self::Single => "SingleNestedBlock",
        }
    }

    /// The block type for an element object of type `object`.
    pub fn wrap(self, object: Type) -> Type {
        match self {
            Self::List => Type::list(object),
            Self::Set => Type::set(object),
            Self::Single => object,
        }
    }
}

/// Attributes and blocks of one block element.
#[derive(Debug, Clone, Default)]
pub struct NestedBlockObject {
    /// Member attributes by name.
    pub attributes: BTreeMap<String, Attribute>,
    /// Member blocks by name.
    pub blocks: BTreeMap<String, Block>,
    /// Provider-defined object type replacing the derived one.
    pub custom_type: Option<Type>,
}

impl NestedBlockObject {
    /// An object with no members.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace one member attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Add or replace one member block.
    pub fn with_block(mut self, name: impl Into<String>, block: Block) -> Self {
        self.blocks.insert(name.into(), block);
        self
    }

    /// Use a provider-defined type.
    pub fn with_custom_type(mut self, ty: Type) -> Self {
        self.custom_type = Some(ty);
        self
    }

    /// Object type over attributes and blocks, or the custom type.
    pub fn object_type(&self) -> Option<Type> {
        if let Some(custom) = &self.custom_type {
            return Some(custom.clone());
        }
        object_type_of(&self.attributes, &self.blocks)
    }

    /// Select an attribute or, failing that, a block by name.
    pub fn apply_step(&self, step: &Step) -> Result<SchemaEntity<'_>, StepError> {
        match step {
            Step::AttributeName(name) => {
                select_member(&self.attributes, &self.blocks, name).ok_or_else(|| {
                    StepError::NoAttributeOrBlock {
                        name: name.clone(),
                        target: "NestedBlockObject".to_string(),
                    }
                })
            }
            _ => Err(StepError::Unsupported {
                step: step.kind(),
                target: "NestedBlockObject".to_string(),
            }),
        }
    }
}

/// One block definition.
#[derive(Debug, Clone)]
pub struct Block {
    /// How the element object is held.
    pub mode: BlockNestingMode,
    /// The element object.
    pub object: NestedBlockObject,
    /// Practitioner-facing description.
    pub description: String,
    /// Non-empty when the block is deprecated.
    pub deprecation_message: String,
    /// Provider-defined type replacing the derived one.
    pub custom_type: Option<Type>,
}

impl Block {
    /// A block holding `object` under `mode`.
    pub fn new(mode: BlockNestingMode, object: NestedBlockObject) -> Self {
        Self {
            mode,
            object,
            description: String::new(),
            deprecation_message: String::new(),
            custom_type: None,
        }
    }

    /// A list block.
    pub fn list(object: NestedBlockObject) -> Self {
        Self::new(BlockNestingMode::List, object)
    }

    /// A set block.
    pub fn set(object: NestedBlockObject) -> Self {
        Self::new(BlockNestingMode::Set, object)
    }

    /// A single block.
    pub fn single(object: NestedBlockObject) -> Self {
        Self::new(BlockNestingMode::Single, object)
    }

    /// Set the practitioner-facing description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark the block deprecated.
    pub fn with_deprecation_message(mut self, message: impl Into<String>) -> Self {
        self.deprecation_message = message.into();
        self
    }

    /// Use a provider-defined type.
    pub fn with_custom_type(mut self, ty: Type) -> Self {
        self.custom_type = Some(ty);
        self
    }

    /// Kind name used in messages, e.g. `ListNestedBlock`.
    pub fn kind_name(&self) -> &'static str {
        self.mode.kind_name()
    }

    /// The block's type, or `None` when a member type is incomplete.
    pub fn get_type(&self) -> Option<Type> {
        if let Some(custom) = &self.custom_type {
            return Some(custom.clone());
        }
        self.object.object_type().map(|ty| self.mode.wrap(ty))
    }

    /// List blocks take an index, set blocks an element value, and single
    /// blocks a member name.
    pub fn apply_step(&self, step: &Step) -> Result<SchemaEntity<'_>, StepError> {
        match (self.mode, step) {
            (BlockNestingMode::List, Step::ElementKeyInt(_))
            | (BlockNestingMode::Set, Step::ElementKeyValue(_)) => {
                Ok(SchemaEntity::NestedBlockObject(&self.object))
            }
            (BlockNestingMode::Single, Step::AttributeName(name)) => {
                select_member(&self.object.attributes, &self.object.blocks, name).ok_or_else(
                    || StepError::NoAttributeOrBlock {
                        name: name.clone(),
                        target: self.kind_name().to_string(),
                    },
                )
            }
            _ => Err(StepError::Inapplicable {
                step: step.kind(),
                target: self.kind_name().to_string(),
            }),
        }
    }
}

/// Object type over the types of `attributes` and `blocks`.
///
/// A name used by both an attribute and a block is an implementation error
/// reported by [`crate::Schema::validate_implementation`]. Until it is fixed
/// the attribute wins here, as it does in [`select_member`].
pub(crate) fn object_type_of(
    attributes: &BTreeMap<String, Attribute>,
    blocks: &BTreeMap<String, Block>,
) -> Option<Type> {
    let block_types = blocks
        .iter()
        .map(|(name, block)| block.get_type().map(|ty| (name.clone(), ty)));
    let attribute_types = attributes
        .iter()
        .map(|(name, attribute)| attribute.get_type().map(|ty| (name.clone(), ty)));
    block_types
        .chain(attribute_types)
        .collect::<Option<BTreeMap<_, _>>>()
        .map(Type::Object)
}

/// Member by name, checking attributes before blocks.
pub(crate) fn select_member<'a>(
    attributes: &'a BTreeMap<String, Attribute>,
    blocks: &'a BTreeMap<String, Block>,
    name: &str,
) -> Option<SchemaEntity<'a>> {
    attributes
        .get(name)
        .map(SchemaEntity::Attribute)
        .or_else(|| blocks.get(name).map(SchemaEntity::Block))
}
