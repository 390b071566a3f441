//! Path normalization.
//!
//! Converts filesystem paths into the canonical form stored in the graph:
//! relative to the base directory, `/`-separated, with `.` and `..` folded.
//! Pure string manipulation, no filesystem I/O.

use std::path::{Component, Path, PathBuf};

/// Normalize `path` to a `/`-separated path relative to `base_dir`.
///
/// Relative inputs are taken as already relative to `base_dir`. A path equal
/// to `base_dir` yields the empty string; paths outside it yield leading `../`
/// segments. Normalizing an already-canonical path returns it unchanged.
pub fn normalize_file_name(path: &Path, base_dir: &Path) -> String {
    let target = absolutize(path, base_dir);
    let base = normalize_path_components(base_dir);

    match relative_components(&target, &base) {
        Some(parts) => parts.join("/"),
        // Different roots (e.g. another drive), nothing to be relative to.
        None => path_to_forward_slashes(&target),
    }
}

/// Join `path` onto `base_dir` when relative, then fold `.` and `..`.
pub fn absolutize(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path_components(path)
    } else {
        normalize_path_components(&base_dir.join(path))
    }
}

/// Compute the component list of `target` relative to `base`, or `None` when
/// the two do not share a root.
fn relative_components(target: &Path, base: &Path) -> Option<Vec<String>> {
    let target: Vec<Component<'_>> = target.components().collect();
    let base: Vec<Component<'_>> = base.components().collect();

    let roots_match = target
        .iter()
        .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
        .eq(base
            .iter()
            .take_while(|c| matches!(c, Component::Prefix(_) | Component::RootDir)));
    if !roots_match {
        return None;
    }

    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for component in &base[common..] {
        if let Component::Normal(_) = component {
            parts.push("..".to_string());
        }
    }
    for component in &target[common..] {
        match component {
            Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
            Component::ParentDir => parts.push("..".to_string()),
            _ => {}
        }
    }

    Some(parts)
}

/// Normalize path components without requiring the file to exist.
/// Handles `.` and `..` components.
pub(crate) fn normalize_path_components(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                components.push(component);
            }
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                // `..` above the root stays at the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => components.push(Component::ParentDir),
            },
        }
    }

    components.iter().collect()
}

/// Convert path to string using forward slashes.
pub(crate) fn path_to_forward_slashes(path: &Path) -> String {
    let text = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        text.into_owned()
    } else {
        text.replace(std::path::MAIN_SEPARATOR, "/")
    }
}
