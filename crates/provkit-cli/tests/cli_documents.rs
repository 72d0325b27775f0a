//! Integration test: run the subcommand handlers against documents on disk.

use std::path::{Path, PathBuf};

use provkit_cli::document::{Document, DocumentError};
use provkit_cli::lint::{lint_document, run_lint, LintArgs};
use provkit_cli::resolve::{run_resolve, ResolveArgs};
use provkit_cli::{OutputFormat, EXIT_DIAGNOSTICS, EXIT_OK};

const VALID: &str = r#"
schemas:
  server:
    kind: resource
    attributes:
      id: { type: string, computed: true }
      name: { type: string, required: true }
      addresses:
        nested: set
        optional: true
        attributes:
          ip: { type: string, required: true }
    blocks:
      network:
        nesting: list
        attributes:
          vlan: { type: number, optional: true }
functions:
  join:
    parameters:
      - { name: separator, type: string }
    variadic_parameter: { name: parts, type: string }
    return: string
"#;

const INVALID: &str = r#"
schemas:
  server:
    kind: resource
    attributes:
      tags: { type: list, optional: true }
      blobs:
        nested: list
        optional: true
        attributes:
          payload: { type: dynamic, optional: true }
functions:
  broken:
    parameters:
      - { type: string }
      - { name: param1, type: number }
"#;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_lint_valid_document_exits_ok() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "defs.yaml", VALID);
    assert_eq!(run_lint(&LintArgs { file }, OutputFormat::Text).unwrap(), EXIT_OK);
}

#[test]
fn test_lint_invalid_document_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "defs.yml", INVALID);
    assert_eq!(
        run_lint(&LintArgs { file }, OutputFormat::Json).unwrap(),
        EXIT_DIAGNOSTICS
    );
}

#[test]
fn test_lint_invalid_document_details() {
    let report = lint_document(&Document::from_yaml(INVALID).unwrap()).unwrap();
    let schema = &report.entries[0];
    let summaries: Vec<&str> = schema
        .diagnostics
        .iter()
        .map(|d| d.summary.as_str())
        .collect();
    assert_eq!(
        summaries,
        ["Invalid Schema Implementation", "Invalid Attribute Implementation"]
    );
    let details: Vec<&str> = schema.diagnostics.iter().map(|d| d.detail.as_str()).collect();
    assert!(details[0].contains("\"blobs\""), "{}", details[0]);
    assert!(details[1].contains("\"tags\""), "{}", details[1]);

    let function = &report.entries[1];
    let details: Vec<&str> = function.diagnostics.iter().map(|d| d.detail.as_str()).collect();
    assert_eq!(details.len(), 2);
    assert!(details[0].ends_with("Definition Return field is undefined"));
    assert!(details[1].ends_with(
        "Parameters at position 0 and 1 have the same name \"param1\""
    ));
}

#[test]
fn test_lint_json_document() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(
        dir.path(),
        "defs.json",
        r#"{"functions": {"id": {"parameters": [{"type": "dynamic"}], "return": "dynamic"}}}"#,
    );
    assert_eq!(run_lint(&LintArgs { file }, OutputFormat::Text).unwrap(), EXIT_OK);
}

#[test]
fn test_lint_missing_file_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("absent.yaml");
    let err = run_lint(&LintArgs { file }, OutputFormat::Text).unwrap_err();
    assert!(err
        .chain()
        .any(|e| matches!(e.downcast_ref::<DocumentError>(), Some(DocumentError::Io { .. }))));
}

#[test]
fn test_resolve_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "defs.yaml", VALID);
    let args = |path: &str| ResolveArgs {
        file: file.clone(),
        schema: "server".to_string(),
        path: path.to_string(),
    };
    assert_eq!(run_resolve(&args("network[0].vlan"), OutputFormat::Text).unwrap(), EXIT_OK);
    assert_eq!(run_resolve(&args(""), OutputFormat::Json).unwrap(), EXIT_OK);
    assert_eq!(
        run_resolve(&args("name[0]"), OutputFormat::Text).unwrap(),
        EXIT_DIAGNOSTICS
    );
}

#[test]
fn test_resolve_unknown_schema_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let file = write(dir.path(), "defs.yaml", VALID);
    let args = ResolveArgs {
        file,
        schema: "client".to_string(),
        path: String::new(),
    };
    assert!(run_resolve(&args, OutputFormat::Text).is_err());
}
