//! Configuration for the knowledge graph services.
//!
//! Values come from, in order of priority:
//! 1. Environment variables (`KG_*`)
//! 2. A TOML file passed to [`Config::from_file`]
//! 3. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub query: QueryConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Defaults with environment overrides applied.
    pub fn load() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Load from a TOML file, then apply environment overrides and validate.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_file_with(path, |key| std::env::var(key).ok())
    }

    /// Like [`from_file`](Self::from_file), with overrides taken from `lookup`
    /// instead of the process environment.
    pub fn from_file_with<F>(path: impl AsRef<Path>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        config.apply_overrides(lookup);
        config.validate()?;

        Ok(config)
    }

    /// Apply `KG_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Unparseable numbers are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(uri) = lookup("KG_STORE_URI") {
            self.store.uri = uri;
        }
        if let Some(user) = lookup("KG_STORE_USER") {
            self.store.user = user;
        }
        if let Some(password) = lookup("KG_STORE_PASSWORD") {
            self.store.password = password;
        }
        if let Some(database) = lookup("KG_STORE_DATABASE") {
            self.store.database = Some(database);
        }

        if let Some(n) = lookup("KG_DEFAULT_PAGE_SIZE").and_then(|v| v.parse().ok()) {
            self.query.default_page_size = n;
        }
        if let Some(n) = lookup("KG_MAX_PAGE_SIZE").and_then(|v| v.parse().ok()) {
            self.query.max_page_size = n;
        }
        if let Some(n) = lookup("KG_LEARNING_PATH_DEPTH").and_then(|v| v.parse().ok()) {
            self.query.learning_path_depth = n;
        }

        if let Some(level) = lookup("KG_LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.uri.trim().is_empty() {
            return Err(ConfigError::Invalid("store.uri must not be empty".to_string()));
        }
        if self.query.default_page_size == 0 {
            return Err(ConfigError::Invalid(
                "query.default_page_size must be at least 1".to_string(),
            ));
        }
        if self.query.max_page_size < self.query.default_page_size {
            return Err(ConfigError::Invalid(format!(
                "query.max_page_size ({}) is smaller than query.default_page_size ({})",
                self.query.max_page_size, self.query.default_page_size
            )));
        }
        if !self
            .query
            .supported_languages
            .contains(&self.query.default_language)
        {
            return Err(ConfigError::Invalid(format!(
                "query.default_language '{}' is not a supported language",
                self.query.default_language
            )));
        }
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown logging.level '{}'",
                self.logging.level
            )));
        }
        Ok(())
    }

    /// Default config rendered as TOML.
    pub fn default_config_string() -> String {
        toml::to_string_pretty(&Config::default()).unwrap_or_default()
    }
}

/// Connection settings for the persistent store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub uri: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    /// Database name; the server default when unset.
    pub database: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_STORE_URI.to_string(),
            user: DEFAULT_STORE_USER.to_string(),
            password: DEFAULT_STORE_PASSWORD.to_string(),
            database: None,
        }
    }
}

/// Limits and defaults for queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub learning_path_depth: usize,
    pub default_language: String,
    pub supported_languages: Vec<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
            learning_path_depth: DEFAULT_LEARNING_PATH_DEPTH,
            default_language: DEFAULT_LANGUAGE.to_string(),
            supported_languages: SUPPORTED_LANGUAGES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl QueryConfig {
    /// Resolve a caller-supplied limit: the default when absent, capped at the maximum.
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size)
    }

    pub fn is_supported_language(&self, language: &str) -> bool {
        self.supported_languages.iter().any(|l| l == language)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}
