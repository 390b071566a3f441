//! Glob discovery of tsconfig files.
//!
//! Walks the base directory with the `ignore` walker and matches each regular
//! file's `/`-separated relative path against a `globset`. Patterns prefixed
//! with `!` exclude matches.

use crate::error::{GraphError, GraphResult};
use crate::paths::{normalize_file_name, path_to_forward_slashes};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Default pattern used when none is given.
pub const DEFAULT_PATTERN: &str = "**/tsconfig*.json";

/// Flags passed through to the walker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoverOptions {
    /// Match and descend into entries whose name begins with `.`.
    pub dot: bool,
    /// Honour `.gitignore` files found under the root.
    pub gitignore: bool,
}

/// Compiled include/exclude pattern sets.
#[derive(Debug, Clone)]
pub struct PatternSet {
    include: GlobSet,
    exclude: GlobSet,
    /// Dotted segments written out in an include pattern, e.g. `.config`.
    literal_dot_names: HashSet<String>,
}

impl PatternSet {
    /// Compile patterns relative to `base_dir`.
    ///
    /// Absolute patterns are rewritten relative to `base_dir`; a leading `./`
    /// is dropped.
    pub fn new<S: AsRef<str>>(patterns: &[S], base_dir: &Path) -> GraphResult<Self> {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();
        let mut literal_dot_names = HashSet::new();

        for raw in patterns {
            let raw = raw.as_ref();
            let (negated, pattern) = match raw.strip_prefix('!') {
                Some(rest) => (true, rest),
                None => (false, raw),
            };
            let pattern = relative_pattern(pattern, base_dir);

            let glob = GlobBuilder::new(&pattern)
                .literal_separator(true)
                .build()
                .map_err(|source| GraphError::InvalidPattern {
                    pattern: raw.to_string(),
                    source,
                })?;

            if negated {
                exclude.add(glob);
            } else {
                literal_dot_names.extend(
                    pattern
                        .split('/')
                        .filter(|segment| is_literal_dot_segment(segment))
                        .map(String::from),
                );
                include.add(glob);
            }
        }

        let build = |builder: GlobSetBuilder| {
            builder.build().map_err(|source| GraphError::InvalidPattern {
                pattern: patterns
                    .iter()
                    .map(|p| p.as_ref())
                    .collect::<Vec<_>>()
                    .join(", "),
                source,
            })
        };

        Ok(Self {
            include: build(include)?,
            exclude: build(exclude)?,
            literal_dot_names,
        })
    }

    /// Whether a `/`-separated relative path is selected.
    pub fn is_match(&self, relative: &str) -> bool {
        self.include.is_match(relative) && !self.exclude.is_match(relative)
    }

    /// Whether an include pattern spells out the dotted `name`.
    pub fn names_literally(&self, name: &str) -> bool {
        self.literal_dot_names.contains(name)
    }
}

fn is_literal_dot_segment(segment: &str) -> bool {
    segment.starts_with('.')
        && segment != "."
        && segment != ".."
        && !segment.contains(['*', '?', '[', '{'])
}

fn relative_pattern(pattern: &str, base_dir: &Path) -> String {
    let path = Path::new(pattern);
    if path.is_absolute() {
        return normalize_file_name(path, base_dir);
    }
    let mut pattern = pattern;
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest;
    }
    pattern.to_string()
}

/// Find regular files under `base_dir` matching `patterns`.
///
/// Returns absolute paths, sorted.
pub fn discover<S: AsRef<str>>(
    base_dir: &Path,
    patterns: &[S],
    options: DiscoverOptions,
) -> GraphResult<Vec<PathBuf>> {
    let metadata = std::fs::metadata(base_dir).map_err(|e| GraphError::io(base_dir, e))?;
    if !metadata.is_dir() {
        return Err(GraphError::io(
            base_dir,
            std::io::Error::new(std::io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }

    let pattern_set = PatternSet::new(patterns, base_dir)?;

    let mut builder = WalkBuilder::new(base_dir);
    builder
        .standard_filters(false)
        .hidden(false)
        .git_ignore(options.gitignore)
        .git_exclude(options.gitignore)
        .require_git(false)
        .follow_links(true);

    // Without `dot`, wildcards skip dotted entries; a dotted name written
    // out in a pattern is still entered.
    if !options.dot {
        let literal = pattern_set.clone();
        builder.filter_entry(move |entry| {
            if entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !name.starts_with('.') || literal.names_literally(&name)
        });
    }

    let mut found = Vec::new();
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

        let path = entry.path();
        let relative = match path.strip_prefix(base_dir) {
            Ok(relative) => path_to_forward_slashes(relative),
            Err(_) => continue,
        };

        if pattern_set.is_match(&relative) {
            found.push(path.to_path_buf());
        }
    }

    found.sort();
    debug!(
        root = %base_dir.display(),
        matched = found.len(),
        "Discovered tsconfig candidates"
    );
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    fn relative_names(root: &Path, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| normalize_file_name(p, root))
            .collect()
    }

    #[test]
    fn test_default_pattern_matches_nested_configs() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "tsconfig.json");
        touch(temp.path(), "a/tsconfig.build.json");
        touch(temp.path(), "a/b/tsconfig.json");
        touch(temp.path(), "a/package.json");

        let found = discover(temp.path(), &[DEFAULT_PATTERN], DiscoverOptions::default()).unwrap();
        assert!(found.iter().all(|p| p.is_absolute()));
        assert_eq!(
            relative_names(temp.path(), &found),
            vec!["a/b/tsconfig.json", "a/tsconfig.build.json", "tsconfig.json"]
        );
    }

    #[test]
    fn test_hidden_directories_need_dot() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), ".config/tsconfig.json");
        touch(temp.path(), "app/tsconfig.json");

        let found = discover(temp.path(), &[DEFAULT_PATTERN], DiscoverOptions::default()).unwrap();
        assert_eq!(relative_names(temp.path(), &found), vec!["app/tsconfig.json"]);

        let options = DiscoverOptions {
            dot: true,
            ..Default::default()
        };
        let found = discover(temp.path(), &[DEFAULT_PATTERN], options).unwrap();
        assert_eq!(
            relative_names(temp.path(), &found),
            vec![".config/tsconfig.json", "app/tsconfig.json"]
        );
    }

    #[test]
    fn test_dotted_segment_named_in_pattern_is_found_without_dot() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), ".config/tsconfig.json");
        touch(temp.path(), ".config/.cache/tsconfig.json");
        touch(temp.path(), ".other/tsconfig.json");

        let found = discover(
            temp.path(),
            &[".config/tsconfig.json"],
            DiscoverOptions::default(),
        )
        .unwrap();
        assert_eq!(relative_names(temp.path(), &found), vec![".config/tsconfig.json"]);

        // Wildcards below the literal segment still skip dotted names
        let found = discover(
            temp.path(),
            &[".config/**/tsconfig.json"],
            DiscoverOptions::default(),
        )
        .unwrap();
        assert_eq!(relative_names(temp.path(), &found), vec![".config/tsconfig.json"]);
    }

    #[test]
    fn test_gitignore_only_when_requested() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".gitignore"), "generated/\n").unwrap();
        touch(temp.path(), "generated/tsconfig.json");
        touch(temp.path(), "src/tsconfig.json");

        let found = discover(temp.path(), &[DEFAULT_PATTERN], DiscoverOptions::default()).unwrap();
        assert_eq!(found.len(), 2);

        let options = DiscoverOptions {
            gitignore: true,
            ..Default::default()
        };
        let found = discover(temp.path(), &[DEFAULT_PATTERN], options).unwrap();
        assert_eq!(relative_names(temp.path(), &found), vec!["src/tsconfig.json"]);
    }

    #[test]
    fn test_negated_pattern_excludes() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a/tsconfig.json");
        touch(temp.path(), "legacy/tsconfig.json");

        let found = discover(
            temp.path(),
            &["**/tsconfig.json", "!legacy/**"],
            DiscoverOptions::default(),
        )
        .unwrap();
        assert_eq!(relative_names(temp.path(), &found), vec!["a/tsconfig.json"]);
    }

    #[test]
    fn test_star_does_not_cross_directories() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "tsconfig.json");
        touch(temp.path(), "a/tsconfig.json");

        let found = discover(temp.path(), &["*.json"], DiscoverOptions::default()).unwrap();
        assert_eq!(relative_names(temp.path(), &found), vec!["tsconfig.json"]);
    }

    #[test]
    fn test_literal_and_dot_slash_patterns() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "a/tsconfig.json");
        touch(temp.path(), "b/tsconfig.json");

        let found = discover(temp.path(), &["./a/tsconfig.json"], DiscoverOptions::default()).unwrap();
        assert_eq!(relative_names(temp.path(), &found), vec!["a/tsconfig.json"]);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let temp = TempDir::new().unwrap();
        let err = discover(temp.path(), &["a/[b"], DiscoverOptions::default()).unwrap_err();
        assert!(matches!(err, GraphError::InvalidPattern { .. }));
    }

    #[test]
    fn test_missing_root_is_io_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope");
        let err = discover(&missing, &[DEFAULT_PATTERN], DiscoverOptions::default()).unwrap_err();
        assert!(matches!(err, GraphError::Io { .. }));
    }
}
