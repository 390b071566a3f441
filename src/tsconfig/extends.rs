//! `extends` chain resolution.
//!
//! Each config file contributes a [`Layer`]. Base layers are merged first,
//! in `extends` array order, and the extending file's own layer last.
//! `compilerOptions` merge key by key; `files`, `include` and `exclude` are
//! replaced wholesale and stay relative to the file that declared them.

use super::Diagnostic;
use super::jsonc;
use crate::paths::absolutize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Compiler options whose values are paths relative to the declaring file.
const PATH_OPTIONS: &[&str] = &["outDir", "declarationDir", "rootDir", "baseUrl"];

/// A list of path specs together with the directory they resolve against.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SpecList {
    pub specs: Vec<String>,
    pub base_dir: PathBuf,
}

/// Settings contributed by one config file, or the merge of several.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Layer {
    pub compiler_options: Map<String, Value>,
    pub files: Option<SpecList>,
    pub include: Option<SpecList>,
    pub exclude: Option<SpecList>,
}

impl Layer {
    /// Overlay `other` on top of `self`.
    fn merge(mut self, other: Layer) -> Layer {
        for (key, value) in other.compiler_options {
            self.compiler_options.insert(key, value);
        }
        Layer {
            compiler_options: self.compiler_options,
            files: other.files.or(self.files),
            include: other.include.or(self.include),
            exclude: other.exclude.or(self.exclude),
        }
    }

    pub fn bool_option(&self, name: &str) -> bool {
        self.compiler_options
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn path_option(&self, name: &str) -> Option<PathBuf> {
        self.compiler_options
            .get(name)
            .and_then(Value::as_str)
            .map(PathBuf::from)
    }
}

/// Resolve the effective settings of `config`, following `extends`.
pub(crate) fn resolve_layers(
    config: &Value,
    dir: &Path,
    path: &Path,
    errors: &mut Vec<Diagnostic>,
) -> Layer {
    let mut stack = vec![absolutize(path, dir)];
    load_layer(config, dir, path, &mut stack, errors)
}

fn load_layer(
    config: &Value,
    dir: &Path,
    path: &Path,
    stack: &mut Vec<PathBuf>,
    errors: &mut Vec<Diagnostic>,
) -> Layer {
    let own = own_layer(config, dir, path, errors);

    let specs = match config.get("extends") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(spec)) => vec![spec.clone()],
        Some(Value::Array(items)) => {
            let mut specs = Vec::new();
            for item in items {
                match item.as_str() {
                    Some(spec) => specs.push(spec.to_string()),
                    None => errors.push(type_error(path, "extends", "string")),
                }
            }
            specs
        }
        Some(_) => {
            errors.push(type_error(path, "extends", "string or Array"));
            Vec::new()
        }
    };

    let mut merged = Layer::default();
    for spec in specs {
        let Some(base_path) = resolve_extends_path(&spec, dir) else {
            errors.push(Diagnostic::in_file(format!("File '{}' not found.", spec), path));
            continue;
        };

        if stack.contains(&base_path) {
            let chain = stack
                .iter()
                .chain(std::iter::once(&base_path))
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(" -> ");
            errors.push(Diagnostic::in_file(
                format!("Circularity detected while resolving configuration: {}", chain),
                path,
            ));
            continue;
        }

        let text = match std::fs::read_to_string(&base_path) {
            Ok(text) => text,
            Err(_) => {
                errors.push(Diagnostic::in_file(
                    format!("Cannot read file '{}'.", base_path.display()),
                    path,
                ));
                continue;
            }
        };

        let base_config = match jsonc::parse(&text) {
            Ok(value) if value.is_object() => value,
            Ok(_) => {
                errors.push(Diagnostic::root_not_object(&base_path));
                continue;
            }
            Err(e) => {
                errors.push(Diagnostic::in_file(
                    format!("Failed to parse '{}': {}", base_path.display(), e),
                    path,
                ));
                continue;
            }
        };

        debug!(base = %base_path.display(), from = %path.display(), "Resolved extends");

        let base_dir = base_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| dir.to_path_buf());
        stack.push(base_path.clone());
        let base_layer = load_layer(&base_config, &base_dir, &base_path, stack, errors);
        stack.pop();

        merged = merged.merge(base_layer);
    }

    merged.merge(own)
}

/// Settings declared directly in one file (no inheritance).
fn own_layer(config: &Value, dir: &Path, path: &Path, errors: &mut Vec<Diagnostic>) -> Layer {
    let mut compiler_options = Map::new();
    match config.get("compilerOptions") {
        None | Some(Value::Null) => {}
        Some(Value::Object(options)) => {
            for (key, value) in options {
                let value = match (PATH_OPTIONS.contains(&key.as_str()), value) {
                    (true, Value::String(relative)) => Value::String(
                        absolutize(Path::new(relative), dir)
                            .to_string_lossy()
                            .into_owned(),
                    ),
                    _ => value.clone(),
                };
                compiler_options.insert(key.clone(), value);
            }
        }
        Some(_) => errors.push(type_error(path, "compilerOptions", "object")),
    }

    Layer {
        compiler_options,
        files: spec_list(config, "files", dir, path, errors),
        include: spec_list(config, "include", dir, path, errors),
        exclude: spec_list(config, "exclude", dir, path, errors),
    }
}

fn spec_list(
    config: &Value,
    key: &str,
    dir: &Path,
    path: &Path,
    errors: &mut Vec<Diagnostic>,
) -> Option<SpecList> {
    match config.get(key)? {
        Value::Null => None,
        Value::Array(items) => {
            let mut specs = Vec::with_capacity(items.len());
            for item in items {
                match item.as_str() {
                    Some(spec) => specs.push(spec.to_string()),
                    None => errors.push(type_error(path, key, "string")),
                }
            }
            Some(SpecList {
                specs,
                base_dir: dir.to_path_buf(),
            })
        }
        _ => {
            errors.push(type_error(path, key, "Array"));
            None
        }
    }
}

fn type_error(path: &Path, option: &str, expected: &str) -> Diagnostic {
    Diagnostic::in_file(
        format!("Compiler option '{}' requires a value of type {}.", option, expected),
        path,
    )
}

/// Locate the file named by an `extends` specifier.
///
/// Relative and absolute specifiers resolve against `dir` (appending `.json`
/// when the bare path is missing). Anything else is looked up in the
/// `node_modules` directories of `dir` and its ancestors.
pub(crate) fn resolve_extends_path(spec: &str, dir: &Path) -> Option<PathBuf> {
    let spec_path = Path::new(spec);
    let is_relative = spec.starts_with("./")
        || spec.starts_with("../")
        || spec.starts_with(".\\")
        || spec.starts_with("..\\")
        || spec == "."
        || spec == "..";

    if spec_path.is_absolute() || is_relative {
        let candidate = absolutize(spec_path, dir);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !spec.ends_with(".json") {
            let with_json = PathBuf::from(format!("{}.json", candidate.display()));
            if with_json.is_file() {
                return Some(with_json);
            }
        }
        return None;
    }

    dir.ancestors()
        .map(|ancestor| ancestor.join("node_modules").join(spec_path))
        .find_map(|base| package_config(&base))
}

fn package_config(base: &Path) -> Option<PathBuf> {
    if base.is_file() {
        return Some(base.to_path_buf());
    }
    let with_json = PathBuf::from(format!("{}.json", base.display()));
    if with_json.is_file() {
        return Some(with_json);
    }
    if base.is_dir() {
        if let Some(field) = package_tsconfig_field(base) {
            let candidate = absolutize(Path::new(&field), base);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        let candidate = base.join("tsconfig.json");
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// The `tsconfig` field of a package's `package.json`, if any.
fn package_tsconfig_field(package_dir: &Path) -> Option<String> {
    let text = std::fs::read_to_string(package_dir.join("package.json")).ok()?;
    let manifest: Value = serde_json::from_str(&text).ok()?;
    manifest.get("tsconfig")?.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_merge_overlays_options_and_replaces_lists() {
        let base = Layer {
            compiler_options: json!({"strict": true, "target": "es2017"})
                .as_object()
                .unwrap()
                .clone(),
            include: Some(SpecList {
                specs: vec!["src".into()],
                base_dir: PathBuf::from("/base"),
            }),
            ..Default::default()
        };
        let own = Layer {
            compiler_options: json!({"target": "es2022"}).as_object().unwrap().clone(),
            exclude: Some(SpecList {
                specs: vec!["dist".into()],
                base_dir: PathBuf::from("/own"),
            }),
            ..Default::default()
        };

        let merged = base.merge(own);
        assert_eq!(merged.compiler_options["strict"], json!(true));
        assert_eq!(merged.compiler_options["target"], json!("es2022"));
        assert_eq!(merged.include.unwrap().base_dir, PathBuf::from("/base"));
        assert_eq!(merged.exclude.unwrap().base_dir, PathBuf::from("/own"));
    }

    #[test]
    fn test_relative_extends_appends_json() {
        let temp = TempDir::new().unwrap();
        let base = write(temp.path(), "tsconfig.base.json", "{}");
        let resolved = resolve_extends_path("./tsconfig.base", temp.path()).unwrap();
        assert_eq!(resolved, base);
    }

    #[test]
    fn test_package_extends_found_in_ancestor_node_modules() {
        let temp = TempDir::new().unwrap();
        let config = write(temp.path(), "node_modules/@tsconfig/node20/tsconfig.json", "{}");
        let nested = temp.path().join("packages/app");
        fs::create_dir_all(&nested).unwrap();

        let resolved = resolve_extends_path("@tsconfig/node20/tsconfig.json", &nested).unwrap();
        assert_eq!(resolved, config);

        let resolved = resolve_extends_path("@tsconfig/node20", &nested).unwrap();
        assert_eq!(resolved, config);
    }

    #[test]
    fn test_package_tsconfig_field() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "node_modules/shared-config/package.json",
            r#"{"name": "shared-config", "tsconfig": "./configs/base.json"}"#,
        );
        let config = write(temp.path(), "node_modules/shared-config/configs/base.json", "{}");

        let resolved = resolve_extends_path("shared-config", temp.path()).unwrap();
        assert_eq!(resolved, config);
    }

    #[test]
    fn test_missing_extends_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tsconfig.json");
        let mut errors = Vec::new();
        resolve_layers(&json!({"extends": "./nope.json"}), temp.path(), &path, &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "File './nope.json' not found.");
    }

    #[test]
    fn test_inherited_include_resolves_against_base_dir() {
        let temp = TempDir::new().unwrap();
        write(
            temp.path(),
            "configs/base.json",
            r#"{ "include": ["src"], "compilerOptions": { "outDir": "../out", "strict": true } }"#,
        );
        let path = temp.path().join("app/tsconfig.json");
        let dir = temp.path().join("app");

        let mut errors = Vec::new();
        let layer = resolve_layers(
            &json!({"extends": "../configs/base.json", "compilerOptions": {"strict": false}}),
            &dir,
            &path,
            &mut errors,
        );

        assert!(errors.is_empty(), "{:?}", errors);
        let include = layer.include.as_ref().unwrap();
        assert_eq!(include.specs, vec!["src"]);
        assert_eq!(include.base_dir, temp.path().join("configs"));
        assert!(!layer.bool_option("strict"));
        assert_eq!(layer.path_option("outDir"), Some(temp.path().join("out")));
    }

    #[test]
    fn test_extends_array_later_entries_win() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.json", r#"{ "compilerOptions": { "allowJs": true, "target": "es5" } }"#);
        write(temp.path(), "b.json", r#"{ "compilerOptions": { "target": "es2020" } }"#);
        let path = temp.path().join("tsconfig.json");

        let mut errors = Vec::new();
        let layer = resolve_layers(
            &json!({"extends": ["./a.json", "./b.json"]}),
            temp.path(),
            &path,
            &mut errors,
        );
        assert!(errors.is_empty());
        assert!(layer.bool_option("allowJs"));
        assert_eq!(layer.compiler_options["target"], json!("es2020"));
    }

    #[test]
    fn test_circular_extends_detected() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "a.json", r#"{ "extends": "./b.json" }"#);
        write(temp.path(), "b.json", r#"{ "extends": "./a.json" }"#);
        let path = temp.path().join("a.json");

        let mut errors = Vec::new();
        resolve_layers(&json!({"extends": "./b.json"}), temp.path(), &path, &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("Circularity detected"));
    }

    #[test]
    fn test_wrong_types_reported() {
        let path = PathBuf::from("/repo/tsconfig.json");
        let mut errors = Vec::new();
        let layer = resolve_layers(
            &json!({"include": "src", "compilerOptions": []}),
            Path::new("/repo"),
            &path,
            &mut errors,
        );
        assert_eq!(errors.len(), 2);
        assert!(layer.include.is_none());
    }
}
