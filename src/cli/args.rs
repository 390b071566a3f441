//! Arguments shared by the graph subcommands.

use crate::config::GraphSettings;
use clap::Args;
use std::path::PathBuf;

/// Arguments for build, map-files and map-references
#[derive(Args, Debug, Default)]
pub struct GraphArgs {
    /// Glob patterns for tsconfig discovery (default: **/tsconfig*.json)
    ///
    /// Prefix a pattern with `!` to exclude matches.
    #[arg(value_name = "PATTERNS")]
    pub patterns: Vec<String>,

    /// Base directory for discovery and output paths (default: current dir)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Explicit tsconfig file to map; repeat for several (disables discovery)
    #[arg(long = "tsconfig", value_name = "FILE")]
    pub tsconfig_files: Vec<PathBuf>,

    /// Let patterns match entries that begin with a period
    #[arg(long)]
    pub dot: bool,

    /// Skip files ignored by .gitignore
    #[arg(long)]
    pub gitignore: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Maximum number of tsconfig files resolved at once
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Settings file (replaces user and project settings files)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl GraphArgs {
    /// Layer command-line values over loaded settings.
    ///
    /// Boolean flags can only switch an option on.
    pub fn apply(&self, settings: &mut GraphSettings) {
        if !self.patterns.is_empty() {
            settings.patterns = self.patterns.clone();
        }
        if let Some(concurrency) = self.concurrency {
            settings.concurrency = concurrency;
        }
        settings.dot |= self.dot;
        settings.gitignore |= self.gitignore;
        settings.pretty |= self.pretty;
    }
}
