//! Map TypeScript projects to their files and project references.
//!
//! [`build_graph`] discovers `tsconfig*.json` files under a base directory,
//! resolves each one concurrently and returns a [`TsConfigGraph`] keyed by
//! normalized config path. [`map_files`] and [`map_references`] invert it.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod index;
pub mod output;
pub mod paths;
pub mod tsconfig;
pub mod types;

pub use error::{ConfigResolutionError, GraphError, GraphResult};
pub use graph::{BuildOptions, ConfigSource, FsSource, GraphBuilder, build_graph};
pub use index::{map_files, map_references};
pub use paths::normalize_file_name;
pub use tsconfig::{ConfigResolver, Diagnostic, ParsedConfig, TsConfigResolver};
pub use types::{
    ConfigFileName, FileName, FilesToConfigs, ReferencesToConfigs, TsConfigGraph,
    TsConfigGraphNode,
};
