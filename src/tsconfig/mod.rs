//! tsconfig resolution.
//!
//! The graph builder only needs two things from a tsconfig: the files it owns
//! and the configs it references. [`ConfigResolver`] is that boundary;
//! [`TsConfigResolver`] implements it against the local filesystem with the
//! subset of tsconfig semantics that affects those two lists:
//! - JSONC text (comments, trailing commas)
//! - `extends` chains, including `node_modules` packages and arrays
//! - `files` / `include` / `exclude` expansion with supported extensions
//! - `references` resolution

mod extends;
pub mod jsonc;
mod matcher;

use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// A problem found while parsing or expanding a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    /// File the problem was found in, when known.
    pub file: Option<PathBuf>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            file: None,
        }
    }

    pub fn in_file(message: impl Into<String>, file: &Path) -> Self {
        Self {
            message: message.into(),
            file: Some(file.to_path_buf()),
        }
    }

    pub(crate) fn root_not_object(file: &Path) -> Self {
        Self::in_file(
            "The root value of a tsconfig file must be an object.",
            file,
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// A project reference as written, resolved against the config's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectReference {
    pub path: PathBuf,
}

/// Output of expanding one config.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedConfig {
    /// Absolute paths of owned files.
    pub file_names: Vec<PathBuf>,
    pub project_references: Vec<ProjectReference>,
    pub errors: Vec<Diagnostic>,
}

/// Resolves config text into owned files and references.
///
/// Both calls are synchronous and may touch the filesystem (`extends`
/// targets, wildcard expansion).
pub trait ConfigResolver: Send + Sync {
    /// Parse raw text into a config object.
    fn parse_config_text(&self, path: &Path, text: &str) -> Result<Value, Diagnostic>;

    /// Expand a parsed config relative to `dir`, the directory of `path`.
    fn expand_config(&self, config: &Value, dir: &Path, path: &Path) -> ParsedConfig;
}

/// Turn a reference into the config file it points at.
///
/// Paths ending in `.json` name the file; anything else is a directory
/// containing `tsconfig.json`.
pub fn resolve_project_reference_path(reference: &ProjectReference) -> PathBuf {
    let is_json = reference
        .path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        reference.path.clone()
    } else {
        reference.path.join("tsconfig.json")
    }
}

/// Filesystem-backed [`ConfigResolver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TsConfigResolver;

impl TsConfigResolver {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigResolver for TsConfigResolver {
    fn parse_config_text(&self, path: &Path, text: &str) -> Result<Value, Diagnostic> {
        match jsonc::parse(text) {
            Ok(value) if value.is_object() => Ok(value),
            Ok(_) => Err(Diagnostic::root_not_object(path)),
            Err(e) => Err(Diagnostic::in_file(e.to_string(), path)),
        }
    }

    fn expand_config(&self, config: &Value, dir: &Path, path: &Path) -> ParsedConfig {
        let mut errors = Vec::new();

        let layer = extends::resolve_layers(config, dir, path, &mut errors);
        let project_references = parse_references(config, dir, path, &mut errors);

        let has_references = config.get("references").is_some_and(|r| !r.is_null());
        let zero_references = config
            .get("references")
            .and_then(Value::as_array)
            .is_none_or(|items| items.is_empty());
        let can_report_no_inputs = config.get("files").is_none() && !has_references;
        let report_empty_files = zero_references && config.get("extends").is_none();
        let file_names = matcher::expand_file_names(
            &layer,
            dir,
            path,
            can_report_no_inputs,
            report_empty_files,
            &mut errors,
        );

        ParsedConfig {
            file_names,
            project_references,
            errors,
        }
    }
}

/// `references` belong to the file that declares them and are not inherited.
fn parse_references(
    config: &Value,
    dir: &Path,
    path: &Path,
    errors: &mut Vec<Diagnostic>,
) -> Vec<ProjectReference> {
    let items = match config.get("references") {
        None | Some(Value::Null) => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            errors.push(Diagnostic::in_file(
                "Compiler option 'references' requires a value of type Array.",
                path,
            ));
            return Vec::new();
        }
    };

    let mut references = Vec::with_capacity(items.len());
    for item in items {
        match item.get("path").and_then(Value::as_str) {
            Some(reference) => references.push(ProjectReference {
                path: crate::paths::absolutize(Path::new(reference), dir),
            }),
            None => errors.push(Diagnostic::in_file(
                "Compiler option 'path' requires a value of type string.",
                path,
            )),
        }
    }
    references
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_to_directory() {
        let reference = ProjectReference {
            path: PathBuf::from("/repo/packages/core"),
        };
        assert_eq!(
            resolve_project_reference_path(&reference),
            PathBuf::from("/repo/packages/core/tsconfig.json")
        );
    }

    #[test]
    fn test_reference_to_json_file() {
        let reference = ProjectReference {
            path: PathBuf::from("/repo/packages/core/tsconfig.build.json"),
        };
        assert_eq!(
            resolve_project_reference_path(&reference),
            PathBuf::from("/repo/packages/core/tsconfig.build.json")
        );
    }

    #[test]
    fn test_parse_rejects_non_object_root() {
        let resolver = TsConfigResolver::new();
        let err = resolver
            .parse_config_text(Path::new("/repo/tsconfig.json"), "[1, 2]")
            .unwrap_err();
        assert_eq!(
            err.message,
            "The root value of a tsconfig file must be an object."
        );
    }

    #[test]
    fn test_parse_accepts_comments() {
        let resolver = TsConfigResolver::new();
        let value = resolver
            .parse_config_text(
                Path::new("/repo/tsconfig.json"),
                "{ // comment\n \"files\": [], }",
            )
            .unwrap();
        assert_eq!(value, json!({"files": []}));
    }

    #[test]
    fn test_references_resolve_against_config_dir() {
        let mut errors = Vec::new();
        let refs = parse_references(
            &json!({"references": [{"path": "../core"}, {"path": "./tsconfig.test.json"}]}),
            Path::new("/repo/app"),
            Path::new("/repo/app/tsconfig.json"),
            &mut errors,
        );
        assert!(errors.is_empty());
        assert_eq!(
            refs,
            vec![
                ProjectReference {
                    path: PathBuf::from("/repo/core")
                },
                ProjectReference {
                    path: PathBuf::from("/repo/app/tsconfig.test.json")
                },
            ]
        );
    }

    #[test]
    fn test_malformed_references_reported() {
        let mut errors = Vec::new();
        let refs = parse_references(
            &json!({"references": [{"prepend": true}, "core"]}),
            Path::new("/repo"),
            Path::new("/repo/tsconfig.json"),
            &mut errors,
        );
        assert!(refs.is_empty());
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_references_must_be_array() {
        let mut errors = Vec::new();
        parse_references(
            &json!({"references": {"path": "core"}}),
            Path::new("/repo"),
            Path::new("/repo/tsconfig.json"),
            &mut errors,
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_empty_files_needs_references_or_extends() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path();
        let path = dir.join("tsconfig.json");
        let resolver = TsConfigResolver::new();

        let parsed = resolver.expand_config(&json!({"files": [], "references": []}), dir, &path);
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0].message.contains("'files' list"));

        let parsed = resolver.expand_config(
            &json!({"files": [], "references": [{"path": "./core"}]}),
            dir,
            &path,
        );
        assert!(parsed.errors.is_empty());
        assert_eq!(parsed.project_references.len(), 1);
    }

    #[test]
    fn test_empty_include_with_references_is_a_leaf() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path();
        let parsed = TsConfigResolver::new().expand_config(
            &json!({"include": [], "references": []}),
            dir,
            &dir.join("tsconfig.json"),
        );
        assert!(parsed.errors.is_empty());
        assert!(parsed.file_names.is_empty());
        assert!(parsed.project_references.is_empty());
    }

    #[test]
    fn test_no_inputs_reported() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = temp.path();
        let parsed = TsConfigResolver::new().expand_config(&json!({}), dir, &dir.join("tsconfig.json"));
        assert_eq!(parsed.errors.len(), 1);
        assert!(parsed.errors[0].message.starts_with("No inputs were found"));
    }
}
