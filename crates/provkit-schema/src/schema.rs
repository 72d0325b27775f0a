//! # Schemas and Path Lookup
//!
//! A [`Schema`] is the root of an attribute and block tree. Request handling
//! locates parts of it by [`Path`]: [`Schema::type_at_path`] answers with the
//! framework type at a position, [`Schema::attribute_at_path`] with the
//! attribute definition. Both walk the tree with the stepping protocol over
//! [`SchemaEntity`] and turn any failure into an `Invalid Schema Path`
//! diagnostic that names the path and the underlying error.

use std::collections::BTreeMap;
use std::fmt;

use provkit_core::{walk_path, ApplyStep, Diagnostic, Path, Step, StepError, Type};

use crate::attribute::Attribute;
use crate::block::{object_type_of, select_member, Block, NestedBlockObject};
use crate::nested::NestedAttributeObject;

/// Which kind of provider entity a schema describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// Provider configuration.
    Provider,
    /// A managed resource.
    Resource,
    /// A data source.
    DataSource,
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Provider => "provider",
            Self::Resource => "resource",
            Self::DataSource => "data source",
        })
    }
}

/// Root attribute and block definitions.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Kind of entity described.
    pub kind: SchemaKind,
    /// Root attributes by name.
    pub attributes: BTreeMap<String, Attribute>,
    /// Root blocks by name.
    pub blocks: BTreeMap<String, Block>,
    /// Practitioner-facing description.
    pub description: String,
    /// Schema version, for state upgrades.
    pub version: i64,
    /// Non-empty when the entity is deprecated.
    pub deprecation_message: String,
}

impl Schema {
    /// An empty schema of the given kind.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            attributes: BTreeMap::new(),
            blocks: BTreeMap::new(),
            description: String::new(),
            version: 0,
            deprecation_message: String::new(),
        }
    }

    /// An empty provider schema.
    pub fn provider() -> Self {
        Self::new(SchemaKind::Provider)
    }

    /// An empty resource schema.
    pub fn resource() -> Self {
        Self::new(SchemaKind::Resource)
    }

    /// An empty data source schema.
    pub fn data_source() -> Self {
        Self::new(SchemaKind::DataSource)
    }

    /// Add or replace one root attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Add or replace one root block.
    pub fn with_block(mut self, name: impl Into<String>, block: Block) -> Self {
        self.blocks.insert(name.into(), block);
        self
    }

    /// Set the practitioner-facing description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the schema version.
    pub fn with_version(mut self, version: i64) -> Self {
        self.version = version;
        self
    }

    /// Mark the entity deprecated.
    pub fn with_deprecation_message(mut self, message: impl Into<String>) -> Self {
        self.deprecation_message = message.into();
        self
    }

    /// Root attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Root block by name.
    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.get(name)
    }

    /// Object type over every root attribute and block, or `None` when a
    /// member's type is incomplete.
    pub fn schema_type(&self) -> Option<Type> {
        object_type_of(&self.attributes, &self.blocks)
    }

    /// Root attributes and blocks are selected by name; element steps are
    /// rejected.
    pub fn apply_step(&self, step: &Step) -> Result<SchemaEntity<'_>, StepError> {
        match step {
            Step::AttributeName(name) => select_member(&self.attributes, &self.blocks, name)
                .ok_or_else(|| StepError::NotInSchema { name: name.clone() }),
            _ => Err(StepError::Unsupported {
                step: step.kind(),
                target: "schema".to_string(),
            }),
        }
    }

    /// The framework type at `path`. The empty path gives the schema type.
    pub fn type_at_path(&self, path: &Path) -> Result<Type, Diagnostic> {
        let entity = walk_path(SchemaEntity::Schema(self), path)
            .map_err(|err| invalid_schema_path("framework type", path, &err))?;
        entity.entity_type().ok_or_else(|| {
            let err = StepError::MissingType {
                target: entity.kind_name().to_string(),
            };
            invalid_schema_path("framework type", path, &err)
        })
    }

    /// The attribute definition at `path`.
    ///
    /// Fails when the path leads to the schema root, a block, a nested
    /// object, or a position below an attribute that is not nested.
    pub fn attribute_at_path(&self, path: &Path) -> Result<&Attribute, Diagnostic> {
        const ORIGIN: &str = "framework attribute";
        let entity = walk_path(SchemaEntity::Schema(self), path)
            .map_err(|err| invalid_schema_path(ORIGIN, path, &err))?;
        match entity {
            SchemaEntity::Attribute(attribute) => Ok(attribute),
            SchemaEntity::Block(_) => Err(invalid_schema_path(
                ORIGIN,
                path,
                &"path leads to block, not an attribute",
            )),
            SchemaEntity::Type(_) => Err(invalid_schema_path(
                ORIGIN,
                path,
                &"path leads to element or attribute of a schema.Attribute that has no schema associated with it",
            )),
            other => Err(invalid_schema_path(
                ORIGIN,
                path,
                &format!("got unexpected type {}", other.kind_name()),
            )),
        }
    }
}

fn invalid_schema_path(origin: &str, path: &Path, err: &dyn fmt::Display) -> Diagnostic {
    Diagnostic::error(
        "Invalid Schema Path",
        format!(
            "When attempting to get the {origin} associated with a schema path, an unexpected \
             error was returned. This is always an issue with the provider. Please report this \
             to the provider developers.\n\nPath: {path}\nOriginal Error: {err}"
        ),
    )
    .with_path(path.clone())
}

/// Any position in a schema tree reachable by stepping.
#[derive(Debug, Clone)]
pub enum SchemaEntity<'a> {
    /// The schema root.
    Schema(&'a Schema),
    /// An attribute definition.
    Attribute(&'a Attribute),
    /// The element object of a nested attribute.
    NestedAttributeObject(&'a NestedAttributeObject),
    /// A block definition.
    Block(&'a Block),
    /// The element object of a block.
    NestedBlockObject(&'a NestedBlockObject),
    /// A position below a non-nested attribute, known only by its type.
    Type(Type),
}

impl SchemaEntity<'_> {
    /// Kind name used in messages.
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Schema(_) => "Schema",
            Self::Attribute(attribute) => attribute.kind_name(),
            Self::NestedAttributeObject(_) => "NestedAttributeObject",
            Self::Block(block) => block.kind_name(),
            Self::NestedBlockObject(_) => "NestedBlockObject",
            Self::Type(ty) => ty.kind_name(),
        }
    }

    /// The framework type of this position.
    pub fn entity_type(&self) -> Option<Type> {
        match self {
            Self::Schema(schema) => schema.schema_type(),
            Self::Attribute(attribute) => attribute.get_type(),
            Self::NestedAttributeObject(object) => object.object_type(),
            Self::Block(block) => block.get_type(),
            Self::NestedBlockObject(object) => object.object_type(),
            Self::Type(ty) => Some(ty.clone()),
        }
    }
}

impl<'a> ApplyStep for SchemaEntity<'a> {
    type Output = SchemaEntity<'a>;

    fn apply_step(&self, step: &Step) -> Result<SchemaEntity<'a>, StepError> {
        match *self {
            Self::Schema(schema) => schema.apply_step(step),
            Self::Attribute(attribute) => attribute.apply_step(step),
            Self::NestedAttributeObject(object) => object.apply_step(step),
            Self::Block(block) => block.apply_step(step),
            Self::NestedBlockObject(object) => object.apply_step(step),
            Self::Type(ref ty) => ty.apply_step(step).map(SchemaEntity::Type),
        }
    }
}
