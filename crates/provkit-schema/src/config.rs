//! # Configuration Validation
//!
//! Checks a configuration value against a schema: requiredness, read-only
//! attributes, type-level validation of custom types, and the attribute
//! validators a provider attaches. Nested attributes and blocks are walked
//! element by element so every diagnostic carries the precise path of the
//! offending value.

use std::collections::BTreeMap;
use std::fmt;

use provkit_core::{Diagnostics, Path, Value};

use crate::attribute::{Attribute, AttributeKind};
use crate::block::{Block, BlockNestingMode, NestedBlockObject};
use crate::nested::NestingMode;
use crate::schema::Schema;

/// A provider-supplied check on one attribute's configured value.
///
/// Validators only see known values; null and unknown values are skipped.
pub trait AttributeValidator: fmt::Debug + Send + Sync {
    /// Plain-text description of what the validator enforces.
    fn description(&self) -> String;

    /// Check one value.
    fn validate(&self, request: &ValidateRequest<'_>) -> Diagnostics;
}

/// Input to an [`AttributeValidator`].
#[derive(Debug, Clone, Copy)]
pub struct ValidateRequest<'a> {
    /// Position of the value in the configuration.
    pub path: &'a Path,
    /// The configured value.
    pub value: &'a Value,
}

impl Schema {
    /// Validate a configuration object against this schema.
    pub fn validate_config(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if config.is_unknown() {
            return diags;
        }
        let empty = BTreeMap::new();
        let entries = config.entries().unwrap_or(&empty);
        let root = Path::empty();
        validate_attributes(&self.attributes, entries, &root, &mut diags);
        validate_blocks(&self.blocks, entries, &root, &mut diags);
        tracing::debug!(
            kind = %self.kind,
            diagnostics = diags.len(),
            "validated configuration"
        );
        diags
    }
}

fn validate_attributes(
    attributes: &BTreeMap<String, Attribute>,
    entries: &BTreeMap<String, Value>,
    parent: &Path,
    diags: &mut Diagnostics,
) {
    for (name, attribute) in attributes {
        validate_attribute(
            attribute,
            entries.get(name),
            &parent.attribute(name.clone()),
            diags,
        );
    }
}

fn validate_attribute(
    attribute: &Attribute,
    value: Option<&Value>,
    path: &Path,
    diags: &mut Diagnostics,
) {
    let is_null = value.map_or(true, Value::is_null);
    if attribute.required && is_null {
        diags.add_attribute_error(
            path.clone(),
            "Missing Configuration for Required Attribute",
            format!(
                "Must set a configuration value for the {path} attribute as the provider has \
                 marked it as required.\n\nRefer to the provider documentation or contact the \
                 provider developers for additional information about configurable attributes \
                 that are required."
            ),
        );
    }
    if attribute.is_read_only() && !is_null {
        diags.add_attribute_error(
            path.clone(),
            "Invalid Configuration for Read-Only Attribute",
            "Cannot set value for this attribute as the provider has marked it as read-only. \
             Remove the configuration line setting the value.\n\nRefer to the provider \
             documentation or contact the provider developers for additional information about \
             configurable and read-only attributes that are supported.",
        );
    }

    let Some(value) = value.filter(|v| v.is_known()) else {
        return;
    };

    // Nested members are validated one by one below, unless a custom type
    // takes over the whole value.
    let typed = !attribute.is_nested() || attribute.custom_type.is_some();
    if let Some(ty) = attribute.get_type().filter(|_| typed) {
        match value.to_wire() {
            Ok(wire) => diags.append(ty.validate(&wire, path)),
            Err(err) => diags.add_attribute_error(
                path.clone(),
                "Value Conversion Error",
                format!(
                    "An unexpected error was encountered converting the configured value to its \
                     wire form. This is always an error in the provider.\n\nError: {err}"
                ),
            ),
        }
    }

    let request = ValidateRequest { path, value };
    for validator in &attribute.validators {
        diags.append(validator.validate(&request));
    }

    if let AttributeKind::Nested { mode, object } = &attribute.kind {
        let nested = |element: &Value, element_path: Path, diags: &mut Diagnostics| {
            if let Some(entries) = element.entries() {
                validate_attributes(&object.attributes, entries, &element_path, diags);
            }
        };
        match mode {
            NestingMode::Single => nested(value, path.clone(), diags),
            NestingMode::List => {
                for (index, element) in value.elements().unwrap_or_default().iter().enumerate() {
                    nested(element, path.at_list_index(index_as_i64(index)), diags);
                }
            }
            NestingMode::Set => {
                for element in value.elements().unwrap_or_default() {
                    if let Some(element_path) = set_element_path(path, element, diags) {
                        nested(element, element_path, diags);
                    }
                }
            }
            NestingMode::Map => {
                for (key, element) in value.entries().into_iter().flatten() {
                    nested(element, path.at_map_key(key.clone()), diags);
                }
            }
        }
    }
}

fn validate_blocks(
    blocks: &BTreeMap<String, Block>,
    entries: &BTreeMap<String, Value>,
    parent: &Path,
    diags: &mut Diagnostics,
) {
    for (name, block) in blocks {
        let Some(value) = entries.get(name).filter(|v| v.is_known()) else {
            continue;
        };
        let path = parent.attribute(name.clone());
        match block.mode {
            BlockNestingMode::Single => validate_block_element(&block.object, value, path, diags),
            BlockNestingMode::List => {
                for (index, element) in value.elements().unwrap_or_default().iter().enumerate() {
                    validate_block_element(
                        &block.object,
                        element,
                        path.at_list_index(index_as_i64(index)),
                        diags,
                    );
                }
            }
            BlockNestingMode::Set => {
                for element in value.elements().unwrap_or_default() {
                    if let Some(element_path) = set_element_path(&path, element, diags) {
                        validate_block_element(&block.object, element, element_path, diags);
                    }
                }
            }
        }
    }
}

fn validate_block_element(
    object: &NestedBlockObject,
    element: &Value,
    path: Path,
    diags: &mut Diagnostics,
) {
    if let Some(entries) = element.entries() {
        validate_attributes(&object.attributes, entries, &path, diags);
        validate_blocks(&object.blocks, entries, &path, diags);
    }
}

fn set_element_path(parent: &Path, element: &Value, diags: &mut Diagnostics) -> Option<Path> {
    match element.to_wire() {
        Ok(wire) => Some(parent.at_set_value(wire)),
        Err(err) => {
            diags.add_attribute_error(
                parent.clone(),
                "Value Conversion Error",
                format!(
                    "An unexpected error was encountered converting a set element to its wire \
                     form. This is always an error in the provider.\n\nError: {err}"
                ),
            );
            None
        }
    }
}

fn index_as_i64(index: usize) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}
