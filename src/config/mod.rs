//! Tool settings.
//!
//! Settings are merged field-by-field from several YAML tiers, lowest first:
//! 1. **Defaults** - `GraphSettings::default()`
//! 2. **User** - `<config dir>/tsconfig-graph/config.yaml`
//! 3. **Project** - `<base dir>/.tsconfig-graph.yaml`
//! 4. **Environment** - `TSCONFIG_GRAPH_*` variables
//!
//! Command-line flags are applied on top by the binary.
//!
//! ## Environment Variables
//! - `TSCONFIG_GRAPH_CONFIG_PATH` - Explicit settings file (replaces user and project tiers)
//! - `TSCONFIG_GRAPH_USER_DIR` - User settings dir (default: `<config dir>/tsconfig-graph`)
//! - `TSCONFIG_GRAPH_CONCURRENCY` - Maximum tsconfig files resolved at once
//! - `TSCONFIG_GRAPH_PATTERNS` - Comma-separated discovery globs
//! - `TSCONFIG_GRAPH_DOT` / `TSCONFIG_GRAPH_GITIGNORE` / `TSCONFIG_GRAPH_PRETTY` - Booleans

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier, PROJECT_CONFIG_FILE, USER_CONFIG_FILE};
pub use merge::{deep_merge, deep_merge_all};
pub use types::GraphSettings;
