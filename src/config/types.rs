//! Settings types.

use crate::discovery::DEFAULT_PATTERN;
use crate::graph::{BuildOptions, DEFAULT_CONCURRENCY};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Glob patterns used to discover tsconfig files.
    pub patterns: Vec<String>,

    /// Maximum number of tsconfig files resolved at once.
    pub concurrency: usize,

    /// Allow patterns to match entries that begin with a period.
    pub dot: bool,

    /// Respect `.gitignore` files during discovery.
    pub gitignore: bool,

    /// Pretty-print JSON output.
    pub pretty: bool,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            patterns: vec![DEFAULT_PATTERN.to_string()],
            concurrency: DEFAULT_CONCURRENCY,
            dot: false,
            gitignore: false,
            pretty: false,
        }
    }
}

impl GraphSettings {
    /// Turn settings into build options for one invocation.
    pub fn to_build_options(
        &self,
        base_dir: Option<PathBuf>,
        config_files: Vec<PathBuf>,
    ) -> BuildOptions {
        BuildOptions {
            base_dir,
            patterns: self.patterns.clone(),
            config_files,
            concurrency: self.concurrency,
            dot: self.dot,
            gitignore: self.gitignore,
        }
    }
}
