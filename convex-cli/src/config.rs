//! Configuration loading and validation for the Convex CLI.
//!
//! This module implements the `convex-cli.yaml` schema and provides
//! utilities for loading, validating, and expanding paths in the configuration.
//!
//! # Configuration File
//!
//! The file is optional. `convex-cli.yaml` in the current directory is used
//! when present; `CONVEX_CLI_CONFIG` names a different file, which must exist.
//!
//! # Environment Variable Overrides
//!
//! - `CONVEX_CLI_BACKEND_DIR`: Override the backend source directory
//! - `CONVEX_CLI_CACHE_DIR`: Override the discovery cache directory
//! - `CONVEX_CLI_NO_CACHE`: Disable the discovery cache
//! - `CONVEX_CLI_REFRESH`: Clear the discovery cache before discovering

use convex_schema::FunctionDefinition;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "convex-cli.yaml";

/// Deployment URL used when nothing else is configured.
pub const LOCAL_URL: &str = "http://localhost:3210";

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to read the configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse the YAML configuration.
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root configuration structure for `convex-cli.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Program name shown in help output.
    #[serde(default = "default_name")]
    pub name: String,

    /// Enables `--version` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Deployment URL; takes precedence over every other source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Cloud deployment name, e.g. `happy-otter-123`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_name: Option<String>,

    /// Directory holding the backend source and its `_generated` output.
    #[serde(default = "default_backend_dir")]
    pub backend_dir: PathBuf,

    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// Whether discovery results are cached between runs.
    #[serde(default = "default_true")]
    pub cache: bool,

    /// Clear the cache before discovering.
    #[serde(default)]
    pub refresh: bool,

    /// Request timeout for remote calls.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Glob patterns over function paths (`todos.*`, `*.internal*`) hidden from the CLI.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Manually registered functions; when non-empty, discovery is skipped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDefinition>,

    /// JSON file describing the nested API handle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_manifest: Option<PathBuf>,
}

fn default_name() -> String {
    "convex-cli".to_string()
}

fn default_backend_dir() -> PathBuf {
    PathBuf::from("./convex")
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("node_modules/.cache/convex-cli")
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: None,
            description: None,
            url: None,
            deployment_name: None,
            backend_dir: default_backend_dir(),
            cache_dir: default_cache_dir(),
            cache: true,
            refresh: false,
            timeout_secs: default_timeout_secs(),
            exclude: vec![],
            functions: vec![],
            api_manifest: None,
        }
    }
}

impl CliConfig {
    /// Load configuration from `CONVEX_CLI_CONFIG` or `./convex-cli.yaml`.
    ///
    /// A missing default file yields the default configuration; a missing
    /// file named by `CONVEX_CLI_CONFIG` is an error.
    pub fn load_default() -> Result<Self, ConfigError> {
        match env::var("CONVEX_CLI_CONFIG") {
            Ok(path) => Self::load_from_path(Path::new(&path)),
            Err(_) => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load_from_path(path)
                } else {
                    let mut config = Self::default();
                    config.finish(|key| env::var(key).ok())?;
                    Ok(config)
                }
            }
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        config.finish(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Parse configuration text without applying overrides.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        // An empty document is an empty mapping, not an error
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply environment overrides, expand paths and validate.
    fn finish(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        self.apply_env_overrides(lookup);
        self.expand_paths()?;
        self.validate()
    }

    /// Apply environment variable overrides read through `lookup`.
    ///
    /// Variables follow the pattern: `CONVEX_CLI_{KEY}`
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("CONVEX_CLI_BACKEND_DIR") {
            self.backend_dir = PathBuf::from(dir);
        }

        if let Some(dir) = lookup("CONVEX_CLI_CACHE_DIR") {
            self.cache_dir = PathBuf::from(dir);
        }

        if lookup("CONVEX_CLI_NO_CACHE").is_some_and(|v| is_truthy(&v)) {
            self.cache = false;
        }

        if lookup("CONVEX_CLI_REFRESH").is_some_and(|v| is_truthy(&v)) {
            self.refresh = true;
        }
    }

    /// Expand `~` in paths to the home directory.
    fn expand_paths(&mut self) -> Result<(), ConfigError> {
        let needs_home = [
            Some(&self.backend_dir),
            Some(&self.cache_dir),
            self.api_manifest.as_ref(),
        ]
        .into_iter()
        .flatten()
        .any(|p| p.starts_with("~"));
        if !needs_home {
            return Ok(());
        }

        let home = dirs::home_dir().ok_or_else(|| {
            ConfigError::ValidationError("Cannot determine home directory".into())
        })?;

        self.backend_dir = expand_home(&self.backend_dir, &home);
        self.cache_dir = expand_home(&self.cache_dir, &home);
        if let Some(manifest) = &self.api_manifest {
            self.api_manifest = Some(expand_home(manifest, &home));
        }
        Ok(())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        for pattern in &self.exclude {
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid exclude pattern '{}': {}",
                    pattern, e
                )));
            }
        }

        for function in &self.functions {
            if function.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "Registered functions must have a non-empty name".into(),
                ));
            }
        }

        Ok(())
    }

    /// Check if a function path should be hidden based on configured patterns.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.exclude.iter().any(|pattern| {
            glob::Pattern::new(pattern)
                .map(|p| p.matches(path))
                .unwrap_or(false)
        })
    }

    /// Resolve the deployment URL.
    ///
    /// Priority: `url`, `deployment_name`, `CONVEX_URL`, `CONVEX_DEPLOYMENT`,
    /// then the local development server.
    pub fn resolve_url(&self, lookup: impl Fn(&str) -> Option<String>) -> String {
        if let Some(url) = non_empty(self.url.clone()) {
            return url;
        }
        if let Some(name) = non_empty(self.deployment_name.clone()) {
            return cloud_url(&name);
        }
        if let Some(url) = non_empty(lookup("CONVEX_URL")) {
            return url;
        }
        if let Some(deployment) = non_empty(lookup("CONVEX_DEPLOYMENT")) {
            return cloud_url(&deployment);
        }
        LOCAL_URL.to_string()
    }
}

fn cloud_url(deployment: &str) -> String {
    format!("https://{}.convex.cloud", deployment)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn expand_home(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}
