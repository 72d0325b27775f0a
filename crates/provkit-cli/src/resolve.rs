//! # Resolve Subcommand
//!
//! Prints the type found at a path in one schema of a document, and the
//! attribute kind when the path ends on an attribute.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use provkit_core::{Diagnostic, Path};
use provkit_schema::Schema;
use serde::Serialize;

use crate::document::Document;
use crate::{OutputFormat, EXIT_DIAGNOSTICS, EXIT_OK};

/// Arguments for the resolve subcommand.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Definition document (.yaml, .yml or .json).
    pub file: PathBuf,

    /// Name of the schema in the document.
    #[arg(long)]
    pub schema: String,

    /// Attribute path, e.g. `disks["root"].size`. Empty for the root.
    #[arg(long, default_value = "")]
    pub path: String,
}

/// Outcome of resolving one path.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Resolution {
    Found {
        path: String,
        #[serde(rename = "type")]
        ty: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        attribute: Option<&'static str>,
    },
    Failed {
        path: String,
        diagnostic: Diagnostic,
    },
}

/// Resolve `path` in `schema`.
pub fn resolve(schema: &Schema, path: &Path) -> Resolution {
    match schema.type_at_path(path) {
        Ok(ty) => Resolution::Found {
            path: path.to_string(),
            ty: ty.to_string(),
            attribute: schema.attribute_at_path(path).ok().map(|attr| attr.kind_name()),
        },
        Err(diagnostic) => Resolution::Failed {
            path: path.to_string(),
            diagnostic,
        },
    }
}

/// Execute the resolve subcommand.
pub fn run_resolve(args: &ResolveArgs, format: OutputFormat) -> Result<u8> {
    let document = Document::load(&args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;
    let schema = document
        .schema(&args.schema)
        .with_context(|| format!("cannot build schema {:?}", args.schema))?;
    let path: Path = args
        .path
        .parse()
        .with_context(|| format!("invalid path {:?}", args.path))?;

    let resolution = resolve(&schema, &path);
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&resolution).context("failed to serialize resolution")?
        ),
        OutputFormat::Text => match &resolution {
            Resolution::Found {
                path,
                ty,
                attribute: Some(kind),
            } => println!("{path}: {ty} ({kind})"),
            Resolution::Found { path, ty, .. } => println!("{path}: {ty}"),
            Resolution::Failed { diagnostic, .. } => println!("{diagnostic}"),
        },
    }

    Ok(match resolution {
        Resolution::Found { .. } => EXIT_OK,
        Resolution::Failed { .. } => EXIT_DIAGNOSTICS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Document::from_yaml(
            r#"
schemas:
  server:
    kind: resource
    attributes:
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
"#,
        )
        .unwrap()
        .schema("server")
        .unwrap()
    }

    #[test]
    fn test_resolves_attribute() {
        let path: Path = "disks[\"root\"].size".parse().unwrap();
        match resolve(&schema(), &path) {
            Resolution::Found { ty, attribute, .. } => {
                assert_eq!(ty, "NumberType");
                assert_eq!(attribute, Some("NumberAttribute"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_block_has_no_attribute_kind() {
        let path = Path::empty().attribute("network");
        match resolve(&schema(), &path) {
            Resolution::Found { attribute, .. } => assert_eq!(attribute, None),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_wrong_step_fails() {
        let path = Path::empty().attribute("disks").at_list_index(0);
        let resolution = resolve(&schema(), &path);
        let json = serde_json::to_value(&resolution).unwrap();
        assert_eq!(json["path"], "disks[0]");
        assert_eq!(json["diagnostic"]["summary"], "Invalid Schema Path");
    }
}
