//! # Definition Documents
//!
//! YAML or JSON files describing schemas and functions. The serde structs
//! here mirror the document layout; [`Document::schema`] and
//! [`Document::function`] map them onto the domain types.
//!
//! ```yaml
//! schemas:
//!   server:
//!     kind: resource
//!     attributes:
//!       name: { type: string, required: true }
//!       tags: { type: { set: string }, optional: true }
//!       disks:
//!         nested: map
//!         optional: true
//!         attributes:
//!           size: { type: number, required: true }
//!     blocks:
//!       network:
//!         nesting: list
//!         attributes:
//!           vlan: { type: number, optional: true }
//! functions:
//!   join:
//!     parameters:
//!       - { name: separator, type: string }
//!     variadic_parameter: { type: string }
//!     return: string
//! ```
//!
//! Type names are `string`, `bool`, `number` and `dynamic`. Composite types
//! are single-key maps: `{ list: T }`, `{ set: T }`, `{ map: T }`,
//! `{ object: { name: T } }` and `{ tuple: [T, ...] }`. At the top level of
//! an attribute, parameter or return, a bare `list`, `set`, `map` or
//! `object` declares the collection without its element type.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use provkit_core::{DeclaredType, Type, Value};
use provkit_function::{FunctionDefinition, Parameter, Return};
use provkit_schema::{
    Attribute, Block, BlockNestingMode, NestedAttributeObject, NestedBlockObject, NestingMode,
    Schema, SchemaKind,
};
use serde::Deserialize;
use thiserror::Error;

/// Errors loading a document or mapping it onto domain types.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension is not `.yaml`, `.yml` or `.json`.
    #[error("unsupported document format: {} (expected .yaml, .yml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),

    /// YAML syntax or structure error.
    #[error("invalid YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON syntax or structure error.
    #[error("invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// A type name that is not one of the built-in kinds.
    #[error("{at}: unknown type {name:?}")]
    UnknownType { at: String, name: String },

    /// A bare collection name used where a complete type is required.
    #[error("{at}: type {name:?} needs an element type here")]
    IncompleteType { at: String, name: String },

    /// A composite type map with zero or several keys.
    #[error("{at}: a composite type must have exactly one of list, set, map, object or tuple")]
    MalformedType { at: String },

    /// An attribute with both `type` and `nested`.
    #[error("{at}: an attribute cannot have both type and nested")]
    AmbiguousAttribute { at: String },

    /// An attribute with neither `type` nor `nested`.
    #[error("{at}: an attribute needs either type or nested")]
    MissingAttributeType { at: String },

    /// A default value that cannot be built.
    #[error("{at}: invalid default value: {reason}")]
    InvalidDefault { at: String, reason: String },

    /// No schema of the requested name.
    #[error("no schema named {0:?} in document")]
    UnknownSchema(String),
}

/// Top-level definition document.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(default)]
    pub schemas: BTreeMap<String, SchemaDoc>,
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionDoc>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKindDoc {
    Provider,
    Resource,
    DataSource,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDoc {
    pub kind: SchemaKindDoc,
    #[serde(default)]
    pub version: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deprecation_message: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeDoc>,
    #[serde(default)]
    pub blocks: BTreeMap<String, BlockDoc>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NestingDoc {
    Single,
    List,
    Set,
    Map,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeDoc {
    #[serde(rename = "type")]
    pub ty: Option<TypeDoc>,
    pub nested: Option<NestingDoc>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeDoc>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deprecation_message: String,
    pub default: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockNestingDoc {
    List,
    Set,
    Single,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockDoc {
    pub nesting: BlockNestingDoc,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deprecation_message: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeDoc>,
    #[serde(default)]
    pub blocks: BTreeMap<String, BlockDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionDoc {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub deprecation_message: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDoc>,
    pub variadic_parameter: Option<ParameterDoc>,
    #[serde(rename = "return")]
    pub returns: Option<TypeDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDoc {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDoc,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub allow_null_value: bool,
    #[serde(default)]
    pub allow_unknown_values: bool,
}

/// A type expression: a name, or a single-key composite map.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeDoc {
    Name(String),
    Composite(CompositeTypeDoc),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompositeTypeDoc {
    pub list: Option<Box<TypeDoc>>,
    pub set: Option<Box<TypeDoc>>,
    pub map: Option<Box<TypeDoc>>,
    pub object: Option<BTreeMap<String, TypeDoc>>,
    pub tuple: Option<Vec<TypeDoc>>,
}

impl Document {
    /// Read and parse a document, choosing the format by file extension.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, DocumentError> = match format.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml,
            Some("json") => Self::from_json,
            _ => return Err(DocumentError::UnsupportedFormat(path.to_path_buf())),
        };
        let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let document = parse(&text)?;
        tracing::debug!(
            path = %path.display(),
            schemas = document.schemas.len(),
            functions = document.functions.len(),
            "loaded definition document"
        );
        Ok(document)
    }

    pub fn from_yaml(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the named schema.
    pub fn schema(&self, name: &str) -> Result<Schema, DocumentError> {
        let doc = self
            .schemas
            .get(name)
            .ok_or_else(|| DocumentError::UnknownSchema(name.to_string()))?;
        doc.to_schema(name)
    }

    /// Build the named function's definition, if it exists.
    pub fn function(&self, name: &str) -> Option<Result<FunctionDefinition, DocumentError>> {
        self.functions.get(name).map(|doc| doc.to_definition(name))
    }
}

impl SchemaDoc {
    pub fn to_schema(&self, name: &str) -> Result<Schema, DocumentError> {
        let kind = match self.kind {
            SchemaKindDoc::Provider => SchemaKind::Provider,
            SchemaKindDoc::Resource => SchemaKind::Resource,
            SchemaKindDoc::DataSource => SchemaKind::DataSource,
        };
        let mut schema = Schema::new(kind)
            .with_version(self.version)
            .with_description(self.description.clone())
            .with_deprecation_message(self.deprecation_message.clone());
        for (attr_name, attr) in &self.attributes {
            let at = format!("{name}.{attr_name}");
            schema = schema.with_attribute(attr_name.clone(), attr.to_attribute(&at)?);
        }
        for (block_name, block) in &self.blocks {
            let at = format!("{name}.{block_name}");
            schema = schema.with_block(block_name.clone(), block.to_block(&at)?);
        }
        Ok(schema)
    }
}

impl AttributeDoc {
    fn to_attribute(&self, at: &str) -> Result<Attribute, DocumentError> {
        let mut attribute = match (&self.ty, self.nested) {
            (Some(_), Some(_)) => {
                return Err(DocumentError::AmbiguousAttribute { at: at.to_string() })
            }
            (None, None) => return Err(DocumentError::MissingAttributeType { at: at.to_string() }),
            (Some(ty), None) => {
                if !self.attributes.is_empty() {
                    return Err(DocumentError::AmbiguousAttribute { at: at.to_string() });
                }
                Attribute::typed(ty.to_declared(at)?)
            }
            (None, Some(nesting)) => {
                let mut object = NestedAttributeObject::default();
                for (name, member) in &self.attributes {
                    let member = member.to_attribute(&format!("{at}.{name}"))?;
                    object = object.with_attribute(name.clone(), member);
                }
                let mode = match nesting {
                    NestingDoc::Single => NestingMode::Single,
                    NestingDoc::List => NestingMode::List,
                    NestingDoc::Set => NestingMode::Set,
                    NestingDoc::Map => NestingMode::Map,
                };
                Attribute::nested(mode, object)
            }
        };
        attribute.required = self.required;
        attribute.optional = self.optional;
        attribute.computed = self.computed;
        attribute.sensitive = self.sensitive;
        attribute.description = self.description.clone();
        attribute.deprecation_message = self.deprecation_message.clone();
        if let Some(default) = &self.default {
            let value = default_value(default, attribute.get_type().as_ref()).map_err(|reason| {
                DocumentError::InvalidDefault {
                    at: at.to_string(),
                    reason,
                }
            })?;
            attribute.default = Some(value);
        }
        Ok(attribute)
    }
}

impl BlockDoc {
    fn to_block(&self, at: &str) -> Result<Block, DocumentError> {
        let mut object = NestedBlockObject::new();
        for (name, attr) in &self.attributes {
            let attribute = attr.to_attribute(&format!("{at}.{name}"))?;
            object = object.with_attribute(name.clone(), attribute);
        }
        for (name, block) in &self.blocks {
            let block = block.to_block(&format!("{at}.{name}"))?;
            object = object.with_block(name.clone(), block);
        }
        let mode = match self.nesting {
            BlockNestingDoc::List => BlockNestingMode::List,
            BlockNestingDoc::Set => BlockNestingMode::Set,
            BlockNestingDoc::Single => BlockNestingMode::Single,
        };
        Ok(Block::new(mode, object)
            .with_description(self.description.clone())
            .with_deprecation_message(self.deprecation_message.clone()))
    }
}

impl FunctionDoc {
    pub fn to_definition(&self, name: &str) -> Result<FunctionDefinition, DocumentError> {
        let mut definition = FunctionDefinition::new()
            .with_summary(self.summary.clone())
            .with_description(self.description.clone())
            .with_deprecation_message(self.deprecation_message.clone());
        for (position, param) in self.parameters.iter().enumerate() {
            let parameter = param.to_parameter(&format!("{name}.parameters[{position}]"))?;
            definition = definition.with_parameter(parameter);
        }
        if let Some(param) = &self.variadic_parameter {
            let parameter = param.to_parameter(&format!("{name}.variadic_parameter"))?;
            definition = definition.with_variadic_parameter(parameter);
        }
        if let Some(returns) = &self.returns {
            let declared = returns.to_declared(&format!("{name}.return"))?;
            definition = definition.with_return(Return::new(declared));
        }
        Ok(definition)
    }
}

impl ParameterDoc {
    fn to_parameter(&self, at: &str) -> Result<Parameter, DocumentError> {
        let mut parameter = Parameter::new(self.ty.to_declared(at)?)
            .named(self.name.clone())
            .with_description(self.description.clone());
        parameter.allow_null_value = self.allow_null_value;
        parameter.allow_unknown_values = self.allow_unknown_values;
        Ok(parameter)
    }
}

impl TypeDoc {
    /// Map onto a declared type; bare collection names leave the element
    /// type missing.
    pub fn to_declared(&self, at: &str) -> Result<DeclaredType, DocumentError> {
        match self {
            Self::Name(name) => match name.as_str() {
                "list" => Ok(DeclaredType::List { element_type: None }),
                "set" => Ok(DeclaredType::Set { element_type: None }),
                "map" => Ok(DeclaredType::Map { element_type: None }),
                "object" => Ok(DeclaredType::Object {
                    attribute_types: None,
                }),
                _ => Ok(match self.to_type(at)? {
                    Type::String => DeclaredType::String,
                    Type::Bool => DeclaredType::Bool,
                    Type::Number => DeclaredType::Number,
                    _ => DeclaredType::Dynamic,
                }),
            },
            Self::Composite(composite) => Ok(match composite.single(at)? {
                Composite::List(elem) => DeclaredType::list(elem.to_type(at)?),
                Composite::Set(elem) => DeclaredType::set(elem.to_type(at)?),
                Composite::Map(elem) => DeclaredType::map(elem.to_type(at)?),
                Composite::Object(attrs) => DeclaredType::object(object_types(attrs, at)?),
                Composite::Tuple(_) => {
                    return Err(DocumentError::UnknownType {
                        at: at.to_string(),
                        name: "tuple".to_string(),
                    })
                }
            }),
        }
    }

    /// Map onto a complete type.
    pub fn to_type(&self, at: &str) -> Result<Type, DocumentError> {
        match self {
            Self::Name(name) => match name.as_str() {
                "string" => Ok(Type::String),
                "bool" => Ok(Type::Bool),
                "number" => Ok(Type::Number),
                "dynamic" => Ok(Type::Dynamic),
                "list" | "set" | "map" | "object" | "tuple" => Err(DocumentError::IncompleteType {
                    at: at.to_string(),
                    name: name.clone(),
                }),
                _ => Err(DocumentError::UnknownType {
                    at: at.to_string(),
                    name: name.clone(),
                }),
            },
            Self::Composite(composite) => Ok(match composite.single(at)? {
                Composite::List(elem) => Type::list(elem.to_type(at)?),
                Composite::Set(elem) => Type::set(elem.to_type(at)?),
                Composite::Map(elem) => Type::map(elem.to_type(at)?),
                Composite::Object(attrs) => Type::object(object_types(attrs, at)?),
                Composite::Tuple(elems) => Type::Tuple(
                    elems
                        .iter()
                        .map(|elem| elem.to_type(at))
                        .collect::<Result<_, _>>()?,
                ),
            }),
        }
    }
}

enum Composite<'a> {
    List(&'a TypeDoc),
    Set(&'a TypeDoc),
    Map(&'a TypeDoc),
    Object(&'a BTreeMap<String, TypeDoc>),
    Tuple(&'a [TypeDoc]),
}

impl CompositeTypeDoc {
    fn single(&self, at: &str) -> Result<Composite<'_>, DocumentError> {
        let mut found = Vec::with_capacity(1);
        if let Some(elem) = &self.list {
            found.push(Composite::List(elem));
        }
        if let Some(elem) = &self.set {
            found.push(Composite::Set(elem));
        }
        if let Some(elem) = &self.map {
            found.push(Composite::Map(elem));
        }
        if let Some(attrs) = &self.object {
            found.push(Composite::Object(attrs));
        }
        if let Some(elems) = &self.tuple {
            found.push(Composite::Tuple(elems));
        }
        match (found.pop(), found.is_empty()) {
            (Some(composite), true) => Ok(composite),
            _ => Err(DocumentError::MalformedType { at: at.to_string() }),
        }
    }
}

fn object_types(
    attrs: &BTreeMap<String, TypeDoc>,
    at: &str,
) -> Result<Vec<(String, Type)>, DocumentError> {
    attrs
        .iter()
        .map(|(name, ty)| Ok((name.clone(), ty.to_type(&format!("{at}.{name}"))?)))
        .collect()
}

/// Build a default value from JSON.
///
/// Scalars keep the kind the JSON gives them, so a mismatched default
/// reaches definition validation instead of being rejected here.
/// Collections are built against the attribute's type.
fn default_value(json: &serde_json::Value, ty: Option<&Type>) -> Result<Value, String> {
    use serde_json::Value as Json;

    let collection_type = || {
        ty.cloned()
            .ok_or_else(|| "attribute has no complete type".to_string())
    };
    match json {
        Json::Null => Ok(Value::null(collection_type()?)),
        Json::String(s) => Ok(Value::string(s.clone())),
        Json::Bool(b) => Ok(Value::bool(*b)),
        Json::Number(n) => Ok(Value::number(n.clone())),
        Json::Array(items) => match collection_type()? {
            Type::List(elem) => {
                let values = elements(items, &elem)?;
                Value::list(*elem, values).map_err(|err| err.to_string())
            }
            Type::Set(elem) => {
                let values = elements(items, &elem)?;
                Value::set(*elem, values).map_err(|err| err.to_string())
            }
            other => Err(format!("a list of values does not fit {other}")),
        },
        Json::Object(entries) => match collection_type()? {
            Type::Map(elem) => {
                let values = entries
                    .iter()
                    .map(|(key, item)| Ok((key.clone(), default_value(item, Some(&*elem))?)))
                    .collect::<Result<_, String>>()?;
                Value::map(*elem, values).map_err(|err| err.to_string())
            }
            Type::Object(types) => {
                let mut values = BTreeMap::new();
                for (name, attr_type) in &types {
                    let item = entries.get(name).unwrap_or(&Json::Null);
                    values.insert(name.clone(), default_value(item, Some(attr_type))?);
                }
                Value::object(types, values).map_err(|err| err.to_string())
            }
            other => Err(format!("a map of values does not fit {other}")),
        },
    }
}

fn elements(items: &[serde_json::Value], elem: &Type) -> Result<Vec<Value>, String> {
    items.iter().map(|item| default_value(item, Some(elem))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER: &str = r#"
schemas:
  server:
    kind: resource
    version: 2
    attributes:
      name: { type: string, required: true }
      tags: { type: { set: string }, optional: true }
      port: { type: number, optional: true, computed: true, default: 8080 }
      disks:
        nested: map
        optional: true
        attributes:
          size: { type: number, required: true }
    blocks:
      network:
        nesting: list
        attributes:
          vlan: { type: number, optional: true }
functions:
  join:
    parameters:
      - { name: separator, type: string }
    variadic_parameter: { type: string }
    return: string
"#;

    #[test]
    fn test_yaml_document_maps_to_schema() {
        let doc = Document::from_yaml(SERVER).unwrap();
        let schema = doc.schema("server").unwrap();
        assert_eq!(schema.version, 2);
        assert!(schema.validate_implementation().is_empty());
        let port = schema.attribute("port").unwrap();
        let default = port.default.as_ref().and_then(Value::as_number);
        assert_eq!(default.map(ToString::to_string).as_deref(), Some("8080"));
        assert_eq!(schema.attribute("disks").unwrap().kind_name(), "MapNestedAttribute");
        assert!(schema.block("network").is_some());
    }

    #[test]
    fn test_yaml_document_maps_to_function() {
        let doc = Document::from_yaml(SERVER).unwrap();
        let def = doc.function("join").unwrap().unwrap();
        assert_eq!(def.parameters.len(), 1);
        assert_eq!(def.parameters[0].name, "separator");
        assert!(def.variadic_parameter.is_some());
        assert!(def.validate_implementation().is_empty());
        assert!(doc.function("split").is_none());
    }

    #[test]
    fn test_json_document() {
        let doc = Document::from_json(
            r#"{"schemas": {"p": {"kind": "provider", "attributes": {"region": {"type": "string", "optional": true}}}}}"#,
        )
        .unwrap();
        assert_eq!(doc.schema("p").unwrap().kind, SchemaKind::Provider);
    }

    #[test]
    fn test_unknown_type_name() {
        let doc = Document::from_yaml(
            "schemas:\n  s:\n    kind: resource\n    attributes:\n      a: { type: text, optional: true }\n",
        )
        .unwrap();
        let err = doc.schema("s").unwrap_err();
        assert!(matches!(err, DocumentError::UnknownType { ref name, .. } if name == "text"));
        assert_eq!(err.to_string(), "s.a: unknown type \"text\"");
    }

    #[test]
    fn test_bare_collection_declares_missing_element() {
        let bare = TypeDoc::Name("list".to_string());
        assert_eq!(bare.to_declared("x").unwrap().to_type(), None);
        assert!(matches!(
            bare.to_type("x"),
            Err(DocumentError::IncompleteType { .. })
        ));
    }

    #[test]
    fn test_composite_needs_one_key() {
        let doc: TypeDoc = serde_yaml::from_str("{ list: string, set: string }").unwrap();
        assert!(matches!(doc.to_type("x"), Err(DocumentError::MalformedType { .. })));
        let nested: TypeDoc = serde_yaml::from_str("{ map: { list: number } }").unwrap();
        assert_eq!(nested.to_type("x").unwrap(), Type::map(Type::list(Type::Number)));
    }

    #[test]
    fn test_attribute_needs_exactly_one_shape() {
        let both: AttributeDoc = serde_yaml::from_str("{ type: string, nested: single }").unwrap();
        assert!(matches!(both.to_attribute("a"), Err(DocumentError::AmbiguousAttribute { .. })));
        let neither: AttributeDoc = serde_yaml::from_str("{ optional: true }").unwrap();
        assert!(matches!(
            neither.to_attribute("a"),
            Err(DocumentError::MissingAttributeType { .. })
        ));
    }

    #[test]
    fn test_collection_default() {
        let attr: AttributeDoc =
            serde_yaml::from_str("{ type: { list: string }, computed: true, default: [a, b] }").unwrap();
        let attribute = attr.to_attribute("a").unwrap();
        let default = attribute.default.unwrap();
        assert_eq!(default.ty(), &Type::list(Type::String));
        assert_eq!(default.elements().map(<[Value]>::len), Some(2));

        let bad: AttributeDoc =
            serde_yaml::from_str("{ type: string, computed: true, default: [a] }").unwrap();
        assert!(matches!(bad.to_attribute("a"), Err(DocumentError::InvalidDefault { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Document::load(Path::new("defs.toml")).unwrap_err();
        assert!(matches!(err, DocumentError::UnsupportedFormat(_)));
    }
}
