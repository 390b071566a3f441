//! `files` / `include` / `exclude` expansion.
//!
//! Literal `files` entries are taken as-is. Wildcard `include` specs are
//! expanded by walking the filesystem; `exclude` only filters wildcard
//! matches. Only `*`, `?` and `**` are wildcards.

use super::Diagnostic;
use super::extends::{Layer, SpecList};
use crate::paths::{absolutize, path_to_forward_slashes};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Directories never entered by a `**` or `*` expansion unless named literally.
const IMPLICIT_EXCLUDE_DIRS: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

const DEFAULT_INCLUDE: &str = "**/*";

/// Extension groups, highest priority first within each group.
const TS_EXTENSION_GROUPS: &[&[&str]] = &[
    &[".ts", ".tsx", ".d.ts"],
    &[".cts", ".d.cts"],
    &[".mts", ".d.mts"],
];

const TS_JS_EXTENSION_GROUPS: &[&[&str]] = &[
    &[".ts", ".tsx", ".d.ts", ".js", ".jsx"],
    &[".cts", ".d.cts", ".cjs"],
    &[".mts", ".d.mts", ".mjs"],
];

/// Expand the merged settings into the list of owned files.
pub(crate) fn expand_file_names(
    layer: &Layer,
    config_dir: &Path,
    config_path: &Path,
    can_report_no_inputs: bool,
    report_empty_files: bool,
    errors: &mut Vec<Diagnostic>,
) -> Vec<PathBuf> {
    let allow_js = layer.bool_option("allowJs");
    let resolve_json = layer.bool_option("resolveJsonModule");
    let groups = if allow_js {
        TS_JS_EXTENSION_GROUPS
    } else {
        TS_EXTENSION_GROUPS
    };

    if let Some(files) = &layer.files {
        if files.specs.is_empty() && report_empty_files {
            errors.push(Diagnostic::in_file(
                format!(
                    "The 'files' list in config file '{}' is empty.",
                    config_path.display()
                ),
                config_path,
            ));
        }
    }

    let literal_files: Vec<PathBuf> = layer
        .files
        .iter()
        .flat_map(|list| list.specs.iter().map(|spec| absolutize(Path::new(spec), &list.base_dir)))
        .collect();
    let literal_keys: HashSet<PathBuf> = literal_files.iter().cloned().collect();

    let include = match (&layer.include, &layer.files) {
        (Some(include), _) => Some(include.clone()),
        (None, None) => Some(SpecList {
            specs: vec![DEFAULT_INCLUDE.to_string()],
            base_dir: config_dir.to_path_buf(),
        }),
        (None, Some(_)) => None,
    };

    let exclude = match &layer.exclude {
        Some(exclude) => exclude.clone(),
        None => SpecList {
            specs: ["outDir", "declarationDir"]
                .iter()
                .filter_map(|name| layer.path_option(name))
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            base_dir: config_dir.to_path_buf(),
        },
    };
    let exclude_set = compile_excludes(&exclude, config_path, errors);

    let mut wildcard_files: BTreeSet<PathBuf> = BTreeSet::new();
    let mut json_files: BTreeSet<PathBuf> = BTreeSet::new();

    if let Some(include) = &include {
        for spec in &include.specs {
            if let Some(message) = invalid_spec_message(spec, true) {
                errors.push(Diagnostic::in_file(message, config_path));
                continue;
            }

            let pattern = implicit_glob(&absolute_spec(spec, &include.base_dir));
            let json_spec = spec.ends_with(".json");

            for file in walk_spec(&pattern, config_path, errors) {
                if literal_keys.contains(&file) || exclude_set.is_match(&path_to_forward_slashes(&file)) {
                    continue;
                }
                let name = path_to_forward_slashes(&file);
                if name.ends_with(".json") {
                    if json_spec && resolve_json {
                        json_files.insert(file);
                    }
                    continue;
                }
                let Some(group) = extension_group(&name, groups) else {
                    continue;
                };
                if has_higher_priority_extension(&name, group, &literal_keys, &wildcard_files) {
                    continue;
                }
                remove_lower_priority_extensions(&name, group, &mut wildcard_files);
                wildcard_files.insert(file);
            }
        }
    }

    let mut file_names = literal_files;
    file_names.extend(wildcard_files);
    file_names.extend(json_files);

    // Dedupe literal entries listed twice, keeping first occurrence
    let mut seen = HashSet::new();
    file_names.retain(|f| seen.insert(f.clone()));

    if file_names.is_empty() && can_report_no_inputs {
        let include_specs = include.map(|i| i.specs).unwrap_or_default();
        errors.push(Diagnostic::in_file(
            format!(
                "No inputs were found in config file '{}'. Specified 'include' paths were '{}' and 'exclude' paths were '{}'.",
                config_path.display(),
                serde_json::to_string(&include_specs).unwrap_or_default(),
                serde_json::to_string(&exclude.specs).unwrap_or_default(),
            ),
            config_path,
        ));
    }

    file_names
}

/// Validate a spec, returning the diagnostic text if it is unusable.
fn invalid_spec_message(spec: &str, is_include: bool) -> Option<String> {
    let components: Vec<&str> = spec.split(['/', '\\']).collect();
    if is_include && components.last() == Some(&"**") {
        return Some(format!(
            "File specification cannot end in a recursive directory wildcard ('**'): '{}'.",
            spec
        ));
    }
    if let Some(pos) = components.iter().position(|c| *c == "**") {
        if components[pos + 1..].contains(&"..") {
            return Some(format!(
                "File specification cannot contain a parent directory ('..') that appears after a recursive directory wildcard ('**'): '{}'.",
                spec
            ));
        }
    }
    None
}

fn absolute_spec(spec: &str, base_dir: &Path) -> String {
    path_to_forward_slashes(&absolutize(Path::new(spec), base_dir))
}

/// A last component without `.`, `*` or `?` names a directory: match everything under it.
fn implicit_glob(pattern: &str) -> String {
    let last = pattern.rsplit('/').next().unwrap_or("");
    if last.contains(['.', '*', '?']) {
        pattern.to_string()
    } else {
        format!("{}/**/*", pattern.trim_end_matches('/'))
    }
}

fn has_wildcard(component: &str) -> bool {
    component.contains(['*', '?'])
}

/// Escape glob metacharacters other than `*` and `?`.
fn escape_literal(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for ch in pattern.chars() {
        match ch {
            '[' | ']' | '{' | '}' => {
                out.push('[');
                out.push(ch);
                out.push(']');
            }
            _ => out.push(ch),
        }
    }
    out
}

fn compile_glob(pattern: &str) -> Result<globset::Glob, globset::Error> {
    GlobBuilder::new(&escape_literal(pattern))
        .literal_separator(true)
        .build()
}

fn compile_excludes(exclude: &SpecList, config_path: &Path, errors: &mut Vec<Diagnostic>) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for spec in &exclude.specs {
        if let Some(message) = invalid_spec_message(spec, false) {
            errors.push(Diagnostic::in_file(message, config_path));
            continue;
        }
        let pattern = absolute_spec(spec, &exclude.base_dir);
        let pattern = pattern.trim_end_matches('/');
        for candidate in [pattern.to_string(), format!("{}/**", pattern)] {
            match compile_glob(&candidate) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(e) => errors.push(Diagnostic::in_file(
                    format!("Invalid exclude pattern '{}': {}", spec, e),
                    config_path,
                )),
            }
        }
    }
    builder.build().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to build exclude set");
        GlobSet::empty()
    })
}

/// Walk the filesystem for regular files matching an absolute `/`-separated pattern.
fn walk_spec(pattern: &str, config_path: &Path, errors: &mut Vec<Diagnostic>) -> Vec<PathBuf> {
    let glob = match compile_glob(pattern) {
        Ok(glob) => glob.compile_matcher(),
        Err(e) => {
            errors.push(Diagnostic::in_file(
                format!("Invalid include pattern '{}': {}", pattern, e),
                config_path,
            ));
            return Vec::new();
        }
    };

    // Longest wildcard-free directory prefix
    let components: Vec<&str> = pattern.split('/').collect();
    let literal_len = components
        .iter()
        .position(|c| has_wildcard(c))
        .unwrap_or(components.len().saturating_sub(1));
    let literal_len = literal_len.min(components.len().saturating_sub(1));
    let base = if literal_len == 0 {
        PathBuf::from("/")
    } else {
        let joined = components[..literal_len].join("/");
        PathBuf::from(if joined.is_empty() { "/".to_string() } else { joined })
    };
    if !base.is_dir() {
        return Vec::new();
    }

    let remaining = &components[literal_len..];
    let max_depth = if remaining.contains(&"**") {
        None
    } else {
        Some(remaining.len())
    };
    let literal_names: HashSet<String> = remaining
        .iter()
        .filter(|c| !has_wildcard(c))
        .map(|c| c.to_string())
        .collect();

    let mut builder = WalkBuilder::new(&base);
    builder
        .standard_filters(false)
        .follow_links(true)
        .max_depth(max_depth)
        .filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if literal_names.contains(name.as_ref()) {
                return true;
            }
            if name.starts_with('.') {
                return false;
            }
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            !(is_dir && IMPLICIT_EXCLUDE_DIRS.contains(&name.as_ref()))
        });

    let mut matched = Vec::new();
    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Walker error: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if glob.is_match(path_to_forward_slashes(entry.path())) {
            matched.push(entry.into_path());
        }
    }
    matched.sort();
    matched
}

/// The extension group containing `name`'s extension, if supported.
fn extension_group<'a>(name: &str, groups: &'a [&'a [&'a str]]) -> Option<&'a [&'a str]> {
    groups
        .iter()
        .copied()
        .find(|group| group.iter().any(|ext| name.ends_with(ext)))
}

/// Longest extension of the group that `name` ends with.
fn own_extension<'a>(name: &str, group: &[&'a str]) -> Option<&'a str> {
    group
        .iter()
        .copied()
        .filter(|ext| name.ends_with(ext))
        .max_by_key(|ext| ext.len())
}

fn with_extension(name: &str, own: &str, ext: &str) -> PathBuf {
    PathBuf::from(format!("{}{}", &name[..name.len() - own.len()], ext))
}

fn has_higher_priority_extension(
    name: &str,
    group: &[&str],
    literal: &HashSet<PathBuf>,
    wildcard: &BTreeSet<PathBuf>,
) -> bool {
    let Some(own) = own_extension(name, group) else {
        return false;
    };
    for ext in group {
        if *ext == own {
            return false;
        }
        let candidate = with_extension(name, own, ext);
        if literal.contains(&candidate) || wildcard.contains(&candidate) {
            // A declaration file does not shadow its JavaScript source
            if *ext == ".d.ts" && (own == ".js" || own == ".jsx") {
                continue;
            }
            return true;
        }
    }
    false
}

fn remove_lower_priority_extensions(name: &str, group: &[&str], wildcard: &mut BTreeSet<PathBuf>) {
    let Some(own) = own_extension(name, group) else {
        return;
    };
    for ext in group.iter().rev() {
        if *ext == own {
            return;
        }
        wildcard.remove(&with_extension(name, own, ext));
    }
}
