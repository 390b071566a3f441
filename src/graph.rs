//! Graph building.
//!
//! Discovers tsconfig files, resolves each one under a bounded number of
//! in-flight tasks, and assembles the graph. Any per-file failure fails the
//! whole build; no partial graph is returned.
//!
//! Tasks never touch shared state. Each yields an [`Outcome`] and a single
//! collector loop folds outcomes into the graph and the error list.

use crate::discovery::{DEFAULT_PATTERN, DiscoverOptions, discover};
use crate::error::{ConfigResolutionError, GraphError, GraphResult};
use crate::paths::{absolutize, normalize_file_name};
use crate::tsconfig::{ConfigResolver, TsConfigResolver, resolve_project_reference_path};
use crate::types::{ConfigFileName, TsConfigGraph, TsConfigGraphNode};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Default number of tsconfig files resolved at once.
pub const DEFAULT_CONCURRENCY: usize = 50;

/// Options for [`build_graph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Root for discovery and for relative output paths (default: current directory).
    pub base_dir: Option<PathBuf>,
    /// Glob patterns used to discover tsconfig files.
    pub patterns: Vec<String>,
    /// Explicit tsconfig files. When non-empty, takes precedence over `patterns`.
    pub config_files: Vec<PathBuf>,
    /// Maximum number of tsconfig files resolved at once.
    pub concurrency: usize,
    /// Allow patterns to match entries that begin with a period.
    pub dot: bool,
    /// Respect `.gitignore` files during discovery.
    pub gitignore: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            base_dir: None,
            patterns: vec![DEFAULT_PATTERN.to_string()],
            config_files: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
            dot: false,
            gitignore: false,
        }
    }
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn with_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_config_files<I, P>(mut self, config_files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.config_files = config_files.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_dot(mut self, dot: bool) -> Self {
        self.dot = dot;
        self
    }

    pub fn with_gitignore(mut self, gitignore: bool) -> Self {
        self.gitignore = gitignore;
        self
    }
}

/// Reads tsconfig text for the builder.
#[async_trait]
pub trait ConfigSource: Send + Sync {
    /// Read a config file. `None` when it is missing, unreadable, or empty.
    async fn read(&self, path: &Path) -> Option<String>;
}

/// Reads from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

#[async_trait]
impl ConfigSource for FsSource {
    async fn read(&self, path: &Path) -> Option<String> {
        tokio::fs::read_to_string(path)
            .await
            .ok()
            .filter(|text| !text.is_empty())
    }
}

/// Result of resolving one candidate.
#[derive(Debug)]
enum Outcome {
    Skipped(PathBuf),
    Node(ConfigFileName, TsConfigGraphNode),
    Failed(String),
}

/// Builds a [`TsConfigGraph`] with a pluggable resolver and source.
#[derive(Clone)]
pub struct GraphBuilder {
    options: BuildOptions,
    resolver: Arc<dyn ConfigResolver>,
    source: Arc<dyn ConfigSource>,
}

impl GraphBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self {
            options,
            resolver: Arc::new(TsConfigResolver::new()),
            source: Arc::new(FsSource),
        }
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ConfigResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_source(mut self, source: Arc<dyn ConfigSource>) -> Self {
        self.source = source;
        self
    }

    /// Discover, resolve, and assemble the graph.
    pub async fn build(&self) -> GraphResult<TsConfigGraph> {
        let concurrency = self.options.concurrency;
        if concurrency == 0 {
            return Err(GraphError::InvalidConcurrency(concurrency));
        }

        let start = Instant::now();
        let base_dir = self.resolve_base_dir()?;
        let candidates = self.candidates(&base_dir).await?;

        info!(
            base_dir = %base_dir.display(),
            candidates = candidates.len(),
            concurrency,
            "Building tsconfig graph"
        );

        let mut graph = TsConfigGraph::new();
        let mut errors: Vec<String> = Vec::new();
        let mut skipped = 0usize;

        let mut outcomes = stream::iter(
            candidates
                .into_iter()
                .map(|path| self.resolve_candidate(path, &base_dir)),
        )
        .buffer_unordered(concurrency);

        while let Some(outcome) = outcomes.next().await {
            match outcome {
                Outcome::Skipped(path) => {
                    skipped += 1;
                    debug!(path = %path.display(), "Skipped tsconfig with no content");
                }
                Outcome::Node(name, node) => {
                    debug!(
                        config = %name,
                        files = node.files.len(),
                        references = node.references.len(),
                        "Resolved tsconfig"
                    );
                    graph.insert(name, node);
                }
                Outcome::Failed(message) => {
                    debug!(error = %message, "Failed to resolve tsconfig");
                    errors.push(message);
                }
            }
        }

        let elapsed = start.elapsed();
        if !errors.is_empty() {
            info!(
                errors = errors.len(),
                duration_ms = elapsed.as_millis() as u64,
                "tsconfig graph build failed"
            );
            return Err(ConfigResolutionError::new(errors).into());
        }

        info!(
            configs = graph.len(),
            skipped,
            duration_ms = elapsed.as_millis() as u64,
            "Built tsconfig graph"
        );
        Ok(graph)
    }

    fn resolve_base_dir(&self) -> GraphResult<PathBuf> {
        let cwd = std::env::current_dir().map_err(|e| GraphError::io(".", e))?;
        Ok(match &self.options.base_dir {
            Some(dir) => absolutize(dir, &cwd),
            None => cwd,
        })
    }

    /// Explicit files resolved against the base directory, or glob discovery.
    async fn candidates(&self, base_dir: &Path) -> GraphResult<Vec<PathBuf>> {
        if !self.options.config_files.is_empty() {
            return Ok(self
                .options
                .config_files
                .iter()
                .map(|file| absolutize(file, base_dir))
                .collect());
        }

        let patterns = if self.options.patterns.is_empty() {
            vec![DEFAULT_PATTERN.to_string()]
        } else {
            self.options.patterns.clone()
        };
        let discover_options = DiscoverOptions {
            dot: self.options.dot,
            gitignore: self.options.gitignore,
        };
        let root = base_dir.to_path_buf();

        tokio::task::spawn_blocking(move || discover(&root, &patterns, discover_options)).await?
    }

    async fn resolve_candidate(&self, path: PathBuf, base_dir: &Path) -> Outcome {
        let Some(text) = self.source.read(&path).await else {
            return Outcome::Skipped(path);
        };

        let resolver = Arc::clone(&self.resolver);
        let base_dir = base_dir.to_path_buf();
        let task_path = path.clone();
        let resolved = tokio::task::spawn_blocking(move || {
            resolve_config(resolver.as_ref(), &task_path, &text, &base_dir)
        })
        .await;

        match resolved {
            Ok(outcome) => outcome,
            Err(e) => Outcome::Failed(format!("Errors parsing {}: {}", path.display(), e)),
        }
    }
}

/// Parse and expand one config, normalizing its lists against `base_dir`.
fn resolve_config(
    resolver: &dyn ConfigResolver,
    path: &Path,
    text: &str,
    base_dir: &Path,
) -> Outcome {
    let config = match resolver.parse_config_text(path, text) {
        Ok(config) => config,
        Err(diagnostic) => {
            return Outcome::Failed(format!(
                "Failed to read {}: {}",
                path.display(),
                diagnostic.message
            ));
        }
    };

    let dir = path.parent().unwrap_or(base_dir);
    let parsed = resolver.expand_config(&config, dir, path);

    if !parsed.errors.is_empty() {
        let messages: Vec<String> = parsed
            .errors
            .iter()
            .map(|d| match &d.file {
                // Found while reading an extended base config
                Some(file) if file != path => format!("{}: {}", file.display(), d.message),
                _ => d.message.clone(),
            })
            .collect();
        return Outcome::Failed(format!(
            "Errors parsing {}: {}",
            path.display(),
            messages.join("; ")
        ));
    }

    let files = parsed
        .file_names
        .iter()
        .map(|file| normalize_file_name(file, base_dir))
        .collect();

    let references = parsed
        .project_references
        .iter()
        .map(|reference| normalize_file_name(&resolve_project_reference_path(reference), base_dir))
        .filter(|name| !name.is_empty())
        .collect();

    Outcome::Node(
        normalize_file_name(path, base_dir),
        TsConfigGraphNode::new(files, references),
    )
}

/// Build a graph with the filesystem resolver.
pub async fn build_graph(options: &BuildOptions) -> GraphResult<TsConfigGraph> {
    GraphBuilder::new(options.clone()).build().await
}
