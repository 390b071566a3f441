//! Core graph types.
//!
//! All keys and values are paths relative to the build's base directory,
//! using `/` as the separator regardless of platform.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Path to a tsconfig file (relative to the base directory, POSIX separators).
pub type ConfigFileName = String;

/// Path to a file (relative to the base directory, POSIX separators).
pub type FileName = String;

/// One tsconfig file's resolved contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TsConfigGraphNode {
    /// Files owned by the config, unique and sorted ascending.
    pub files: Vec<FileName>,
    /// Configs referenced by the config, unique and sorted ascending.
    pub references: Vec<ConfigFileName>,
}

impl TsConfigGraphNode {
    /// Create a node, deduplicating and sorting both lists.
    pub fn new(files: Vec<FileName>, references: Vec<ConfigFileName>) -> Self {
        Self {
            files: unique_sort(files),
            references: unique_sort(references),
        }
    }

    /// True when the config owns no files and references nothing.
    pub fn is_leaf(&self) -> bool {
        self.files.is_empty() && self.references.is_empty()
    }
}

/// Graph of tsconfigs to owned files and references.
///
/// Key order carries no meaning; `BTreeMap` keeps serialized output stable.
pub type TsConfigGraph = BTreeMap<ConfigFileName, TsConfigGraphNode>;

/// Mapping of files to the tsconfigs that own them.
pub type FilesToConfigs = BTreeMap<FileName, Vec<ConfigFileName>>;

/// Mapping of referenced tsconfigs to the tsconfigs that reference them.
pub type ReferencesToConfigs = BTreeMap<ConfigFileName, Vec<ConfigFileName>>;

/// Deduplicate and sort ascending.
pub fn unique_sort(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
