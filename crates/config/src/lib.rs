//! Configuration loading and validation for lexrag.
//!
//! Loads configuration from `~/.lexrag/config.toml` (or `LEXRAG_CONFIG`)
//! with environment variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.lexrag/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file holding conversations and the corpus
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Gemini API key; usually supplied via `GEMINI_API_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Generation model
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding model
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Generation API base URL
    #[serde(default = "default_generation_base_url")]
    pub generation_base_url: String,

    /// How many articles are retrieved per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Longest accepted query, in characters
    #[serde(default = "default_max_query_chars")]
    pub max_query_chars: usize,

    /// Owner id used when the CLI is run without `--owner`
    #[serde(default = "default_owner")]
    pub default_owner: String,
}

fn default_database_path() -> String {
    AppConfig::config_dir()
        .join("lexrag.db")
        .to_string_lossy()
        .into_owned()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_embedding_model() -> String {
    "text-embedding-004".into()
}
fn default_generation_base_url() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_top_k() -> usize {
    5
}
fn default_max_query_chars() -> usize {
    1000
}
fn default_owner() -> String {
    "local".into()
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_path", &self.database_path)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("generation_base_url", &self.generation_base_url)
            .field("top_k", &self.top_k)
            .field("max_query_chars", &self.max_query_chars)
            .field("default_owner", &self.default_owner)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path, honoring `LEXRAG_CONFIG`.
    ///
    /// Environment variables take priority over the file:
    /// - `GEMINI_API_KEY` / `LEXRAG_API_KEY` — API key
    /// - `LEXRAG_DB` — database path
    /// - `LEXRAG_MODEL` — generation model
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = match std::env::var("LEXRAG_CONFIG") {
            Ok(path) => PathBuf::from(path),
            Err(_) => Self::config_dir().join("config.toml"),
        };
        let mut config = Self::load_from(&config_path)?;

        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.api_key = Some(key);
        } else if let Ok(key) = std::env::var("LEXRAG_API_KEY") {
            config.api_key = Some(key);
        }

        if let Ok(path) = std::env::var("LEXRAG_DB") {
            config.database_path = path;
        }

        if let Ok(model) = std::env::var("LEXRAG_MODEL") {
            config.model = model;
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".lexrag")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::ValidationError("top_k must be at least 1".into()));
        }

        if self.max_query_chars == 0 {
            return Err(ConfigError::ValidationError(
                "max_query_chars must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            api_key: None,
            model: default_model(),
            embedding_model: default_embedding_model(),
            generation_base_url: default_generation_base_url(),
            top_k: default_top_k(),
            max_query_chars: default_max_query_chars(),
            default_owner: default_owner(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
