//! Error types for graph building.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by graph building and discovery.
#[derive(Debug, Error)]
pub enum GraphError {
    /// One or more tsconfig files failed to parse or validate.
    #[error(transparent)]
    ConfigResolution(#[from] ConfigResolutionError),

    /// A discovery glob could not be compiled.
    #[error("Invalid glob pattern '{pattern}'")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// Concurrency must admit at least one task.
    #[error("Concurrency must be at least 1 (got {0})")]
    InvalidConcurrency(usize),

    /// A blocking discovery task panicked or was cancelled.
    #[error("Background task failed")]
    Task(#[from] tokio::task::JoinError),

    #[error("I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GraphError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Aggregate of every per-file failure recorded during one build.
///
/// Entries appear in the order they were recorded, which follows task
/// completion order and is not stable across runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigResolutionError {
    pub errors: Vec<String>,
}

impl ConfigResolutionError {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }
}

impl fmt::Display for ConfigResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Found {} tsconfig error(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n- {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigResolutionError {}

/// Result type for graph operations.
pub type GraphResult<T> = std::result::Result<T, GraphError>;
