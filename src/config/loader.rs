//! Settings loader with tier-based merging.
//!
//! Loads settings from multiple tiers and merges them field-by-field.

use super::merge::deep_merge_all;
use super::types::GraphSettings;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the user-level settings file inside the user dir.
pub const USER_CONFIG_FILE: &str = "config.yaml";

/// File name of the project-level settings file inside the base dir.
pub const PROJECT_CONFIG_FILE: &str = ".tsconfig-graph.yaml";

/// Settings tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    /// Built-in defaults (lowest priority)
    Defaults = 0,
    /// User-level file
    User = 1,
    /// Project-level file in the base dir
    Project = 2,
    /// A single file named by `--config` or `TSCONFIG_GRAPH_CONFIG_PATH`
    Explicit = 3,
    /// Environment variables (highest priority)
    Environment = 4,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Defaults => write!(f, "defaults"),
            ConfigTier::User => write!(f, "user"),
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::Explicit => write!(f, "explicit"),
            ConfigTier::Environment => write!(f, "environment"),
        }
    }
}

/// Settings file locations for the file tiers.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// User-level settings file
    pub user_file: Option<PathBuf>,
    /// Project-level settings file
    pub project_file: Option<PathBuf>,
}

impl ConfigPaths {
    /// Discover settings files for a base directory.
    pub fn discover(base_dir: &Path) -> Self {
        // User dir: TSCONFIG_GRAPH_USER_DIR or <config dir>/tsconfig-graph
        let user_file = std::env::var("TSCONFIG_GRAPH_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|d| d.join("tsconfig-graph")))
            .map(|dir| dir.join(USER_CONFIG_FILE));

        Self {
            user_file,
            project_file: Some(base_dir.join(PROJECT_CONFIG_FILE)),
        }
    }

    /// Create paths with explicit files.
    pub fn with_files(user_file: Option<PathBuf>, project_file: Option<PathBuf>) -> Self {
        Self {
            user_file,
            project_file,
        }
    }
}

/// Settings loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    settings: GraphSettings,
    /// Tiers that contributed, in merge order
    sources: Vec<(ConfigTier, Option<PathBuf>)>,
}

impl ConfigLoader {
    /// Load settings for a base directory.
    ///
    /// `TSCONFIG_GRAPH_CONFIG_PATH` replaces the user and project files.
    pub fn load(base_dir: &Path) -> Result<Self> {
        if let Ok(explicit_path) = std::env::var("TSCONFIG_GRAPH_CONFIG_PATH") {
            return Self::load_explicit(Path::new(&explicit_path));
        }
        Self::load_with_paths(ConfigPaths::discover(base_dir))
    }

    /// Load defaults plus one explicit file, then environment overrides.
    ///
    /// A missing or unparseable explicit file is an error.
    pub fn load_explicit(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let overlay: Value = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;

        let defaults = serde_json::to_value(GraphSettings::default())?;
        let merged = deep_merge_all([defaults, overlay]);
        let settings: GraphSettings = serde_json::from_value(merged)
            .with_context(|| format!("Invalid settings in {}", path.display()))?;

        let mut loader = Self {
            settings,
            sources: vec![
                (ConfigTier::Defaults, None),
                (ConfigTier::Explicit, Some(path.to_path_buf())),
            ],
        };
        loader.apply_env_overrides();
        Ok(loader)
    }

    /// Load settings from the given file tiers.
    ///
    /// Tier files that are missing are skipped silently; files that fail to
    /// parse are warned about and skipped.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        let mut layers: Vec<Value> = vec![serde_json::to_value(GraphSettings::default())?];
        let mut sources = vec![(ConfigTier::Defaults, None)];

        let tiers = [
            (ConfigTier::User, paths.user_file),
            (ConfigTier::Project, paths.project_file),
        ];
        for (tier, file) in tiers {
            let Some(file) = file else { continue };
            if let Some(value) = read_tier_file(tier, &file) {
                layers.push(value);
                sources.push((tier, Some(file)));
            }
        }

        let merged = deep_merge_all(layers);
        let settings: GraphSettings = match serde_json::from_value(merged) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring settings files with invalid values: {}", e);
                sources.truncate(1);
                GraphSettings::default()
            }
        };

        let mut loader = Self { settings, sources };
        loader.apply_env_overrides();
        Ok(loader)
    }

    fn apply_env_overrides(&mut self) {
        if apply_overrides_from(&mut self.settings, |key| std::env::var(key).ok()) {
            self.sources.push((ConfigTier::Environment, None));
        }
    }

    /// Get the loaded settings.
    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    /// Get mutable access to the settings.
    pub fn settings_mut(&mut self) -> &mut GraphSettings {
        &mut self.settings
    }

    /// Consume the loader and return the settings.
    pub fn into_settings(self) -> GraphSettings {
        self.settings
    }

    /// Tiers that contributed to the settings, lowest first.
    pub fn sources(&self) -> &[(ConfigTier, Option<PathBuf>)] {
        &self.sources
    }
}

fn read_tier_file(tier: ConfigTier, file: &Path) -> Option<Value> {
    if !file.is_file() {
        return None;
    }
    let content = match std::fs::read_to_string(file) {
        Ok(content) => content,
        Err(e) => {
            warn!("Skipping {} settings {}: {}", tier, file.display(), e);
            return None;
        }
    };
    match serde_yaml::from_str::<Value>(&content) {
        Ok(value) => {
            debug!("Loaded {} settings from {}", tier, file.display());
            Some(value)
        }
        Err(e) => {
            warn!("Skipping {} settings {}: {}", tier, file.display(), e);
            None
        }
    }
}

/// Apply `TSCONFIG_GRAPH_*` overrides read through `lookup`.
///
/// Returns true when at least one variable was applied.
fn apply_overrides_from<F>(settings: &mut GraphSettings, lookup: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = false;

    if let Some(raw) = lookup("TSCONFIG_GRAPH_CONCURRENCY") {
        match raw.trim().parse::<usize>() {
            Ok(n) => {
                settings.concurrency = n;
                applied = true;
            }
            Err(e) => warn!("Ignoring TSCONFIG_GRAPH_CONCURRENCY={:?}: {}", raw, e),
        }
    }

    if let Some(raw) = lookup("TSCONFIG_GRAPH_PATTERNS") {
        let patterns: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();
        if !patterns.is_empty() {
            settings.patterns = patterns;
            applied = true;
        }
    }

    let flags: [(&str, &mut bool); 3] = [
        ("TSCONFIG_GRAPH_DOT", &mut settings.dot),
        ("TSCONFIG_GRAPH_GITIGNORE", &mut settings.gitignore),
        ("TSCONFIG_GRAPH_PRETTY", &mut settings.pretty),
    ];
    for (key, slot) in flags {
        let Some(raw) = lookup(key) else { continue };
        match parse_bool(&raw) {
            Some(value) => {
                *slot = value;
                applied = true;
            }
            None => warn!("Ignoring {}={:?}: expected a boolean", key, raw),
        }
    }

    applied
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
