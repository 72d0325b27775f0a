//! # Definition-Time Validation
//!
//! [`Schema::validate_implementation`] audits a schema once, before it serves
//! any request, and reports every implementation mistake it finds:
//!
//! - invalid or reserved attribute and block names,
//! - an attribute and a block sharing one name,
//! - attributes that are neither required, optional nor computed,
//! - defaults on non-computed attributes, or of the wrong type,
//! - collection and object declarations missing their underlying types,
//! - dynamic types nested inside collections.
//!
//! Attributes are checked before blocks, each in name order, and nested
//! objects are descended into with dotted attribute-name paths. The walk is
//! a pure function of the schema.

use std::collections::BTreeMap;

use provkit_core::{DeclaredType, Diagnostics, Path};

use crate::attribute::{Attribute, AttributeKind};
use crate::block::Block;
use crate::schema::{Schema, SchemaKind};

const IMPLEMENTATION_PREFIX: &str = "When validating the schema, an implementation issue was \
    found. This is always an issue with the provider and should be reported to the provider \
    developers.\n\n";

const DYNAMIC_UNSUPPORTED: &str =
    "Dynamic types inside of collections are not currently supported in provkit.";

const PROVIDER_RESERVED: &[&str] = &["alias", "version"];

const RESOURCE_RESERVED: &[&str] = &[
    "connection",
    "count",
    "depends_on",
    "for_each",
    "lifecycle",
    "provider",
    "provisioner",
];

/// True if `name` matches `^[a-z_][a-z0-9_]*$`.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Root attribute and block names a schema of `kind` may not use.
pub fn reserved_root_names(kind: SchemaKind) -> &'static [&'static str] {
    match kind {
        SchemaKind::Provider => PROVIDER_RESERVED,
        SchemaKind::Resource | SchemaKind::DataSource => RESOURCE_RESERVED,
    }
}

impl Schema {
    /// Audit the whole schema tree.
    pub fn validate_implementation(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let root = Path::empty();
        for name in self.attributes.keys().chain(self.blocks.keys()) {
            self.check_reserved(name, &mut diags);
        }
        validate_members(&self.attributes, &self.blocks, &root, &mut diags);
        tracing::debug!(
            kind = %self.kind,
            attributes = self.attributes.len(),
            blocks = self.blocks.len(),
            diagnostics = diags.len(),
            "validated schema implementation"
        );
        diags
    }

    fn check_reserved(&self, name: &str, diags: &mut Diagnostics) {
        if !reserved_root_names(self.kind).contains(&name) {
            return;
        }
        let scope = match self.kind {
            SchemaKind::Provider => "provider",
            SchemaKind::Resource | SchemaKind::DataSource => "resource or data source",
        };
        diags.add_error(
            "Reserved Root Attribute/Block Name",
            format!(
                "When validating the {scope} schema, an implementation issue was found. \
                 This is always an issue with the provider and should be reported to the \
                 provider developers.\n\n\"{name}\" is a reserved root attribute/block name. \
                 This is to prevent practitioners from needing special configuration syntax."
            ),
        );
    }
}

fn validate_members(
    attributes: &BTreeMap<String, Attribute>,
    blocks: &BTreeMap<String, Block>,
    parent: &Path,
    diags: &mut Diagnostics,
) {
    for (name, attribute) in attributes {
        let path = parent.attribute(name.clone());
        if blocks.contains_key(name) {
            diags.add_error(
                "Invalid Schema Implementation",
                format!(
                    "{IMPLEMENTATION_PREFIX}\"{path}\" is defined as both an attribute and a \
                     block. Attribute and block names must be unique within one object."
                ),
            );
        }
        validate_attribute(name, attribute, &path, diags);
    }
    for (name, block) in blocks {
        let path = parent.attribute(name.clone());
        check_name(name, &path, diags);
        validate_members(&block.object.attributes, &block.object.blocks, &path, diags);
    }
}

fn check_name(name: &str, path: &Path, diags: &mut Diagnostics) {
    if is_valid_name(name) {
        return;
    }
    let rule = if name.starts_with(|c: char| c.is_ascii_digit()) {
        "Names must begin with a lowercase alphabet character (a-z) or underscore (_) and \
         must only contain lowercase alphanumeric characters (a-z, 0-9) and underscores (_)."
    } else {
        "Names must only contain lowercase alphanumeric characters (a-z, 0-9) and \
         underscores (_)."
    };
    diags.add_error(
        "Invalid Attribute/Block Name",
        format!(
            "{IMPLEMENTATION_PREFIX}\"{name}\" at schema path \"{path}\" is an invalid \
             attribute/block name. {rule}"
        ),
    );
}

fn validate_attribute(name: &str, attribute: &Attribute, path: &Path, diags: &mut Diagnostics) {
    check_name(name, path, diags);

    if !attribute.required && !attribute.optional && !attribute.computed {
        diags.add_attribute_error(
            path.clone(),
            "Invalid Attribute Definition",
            "Attribute missing Required, Optional, or Computed definition. This is always a \
             problem with the provider and should be reported to the provider developer.",
        );
    } else if attribute.required && (attribute.optional || attribute.computed) {
        diags.add_attribute_error(
            path.clone(),
            "Invalid Attribute Definition",
            "Attribute cannot combine Required with Optional or Computed. This is always a \
             problem with the provider and should be reported to the provider developer.",
        );
    }

    if let Some(default) = &attribute.default {
        if !attribute.computed {
            diags.add_error(
                "Schema Using Attribute Default For Non-Computed Attribute",
                format!(
                    "Attribute \"{path}\" must be computed when using default. This is an issue \
                     with the provider and should be reported to the provider developers."
                ),
            );
        }
        if let Some(ty) = attribute.get_type() {
            if default.ty() != &ty {
                diags.add_error(
                    "Invalid Attribute Implementation",
                    format!(
                        "{IMPLEMENTATION_PREFIX}\"{path}\" has a default value of type \"{}\", \
                         but the schema expects a type of \"{ty}\". The default value must \
                         match the type of the schema.",
                        default.ty()
                    ),
                );
            }
        }
    }

    match &attribute.kind {
        AttributeKind::Typed(declared) => validate_typed(declared, attribute, path, diags),
        AttributeKind::Nested { mode, object } => {
            if mode.is_collection() && attribute.custom_type.is_none() && object.contains_dynamic()
            {
                diags.add_error("Invalid Schema Implementation", nested_dynamic_detail(path));
            }
            validate_members(&object.attributes, &BTreeMap::new(), path, diags);
        }
    }
}

fn validate_typed(declared: &DeclaredType, attribute: &Attribute, path: &Path, diags: &mut Diagnostics) {
    if attribute.custom_type.is_none() && declared.missing_underlying_type() {
        let detail = if declared.is_object() {
            format!(
                "{IMPLEMENTATION_PREFIX}\"{path}\" is missing the AttributeTypes or CustomType \
                 field on an object Attribute. One of these fields is required to prevent other \
                 unexpected errors or panics."
            )
        } else {
            format!(
                "{IMPLEMENTATION_PREFIX}\"{path}\" is missing the CustomType or ElementType \
                 field on a collection Attribute. One of these fields is required to prevent \
                 other unexpected errors or panics."
            )
        };
        diags.add_error("Invalid Attribute Implementation", detail);
        return;
    }

    let Some(ty) = attribute.get_type() else {
        return;
    };
    if !ty.contains_collection_with_dynamic() {
        return;
    }
    let detail = if declared.is_collection() {
        format!("{IMPLEMENTATION_PREFIX}\"{path}\" is a collection type that contains a dynamic type. {DYNAMIC_UNSUPPORTED}")
    } else {
        nested_dynamic_detail(path)
    };
    diags.add_error("Invalid Schema Implementation", detail);
}

fn nested_dynamic_detail(path: &Path) -> String {
    format!(
        "{IMPLEMENTATION_PREFIX}\"{path}\" is an attribute that contains a collection type with \
         a nested dynamic type.\n\n{DYNAMIC_UNSUPPORTED} If underlying dynamic values are \
         required, replace the \"{path}\" attribute definition with DynamicAttribute instead."
    )
}
