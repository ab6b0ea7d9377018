//! Configuration loading and validation for Reverie.
//!
//! Loads configuration from `~/.reverie/config.toml` with environment
//! variable overrides. Validates all settings before use. Missing file
//! means defaults, never an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.reverie/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Context assembly settings
    #[serde(default)]
    pub context: ContextConfig,

    /// Digest aggregation settings
    #[serde(default)]
    pub digest: DigestConfig,
}

/// Settings for the context assembler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Max recent messages pulled from thread history
    #[serde(default = "default_max_recent_messages")]
    pub max_recent_messages: usize,

    /// Max fragments pulled from semantic search
    #[serde(default = "default_max_semantic_memories")]
    pub max_semantic_memories: usize,

    /// Minimum cosine similarity for a fragment to be included (0.0–1.0)
    #[serde(default = "default_semantic_similarity_threshold")]
    pub semantic_similarity_threshold: f32,

    /// Whether system-role messages survive into the packet
    #[serde(default)]
    pub include_system_messages: bool,

    /// Whether the environment source is consulted at all
    #[serde(default = "default_true")]
    pub include_sensor_data: bool,

    /// Wall-clock bound on the whole parallel fetch, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
}

fn default_max_recent_messages() -> usize {
    5
}
fn default_max_semantic_memories() -> usize {
    5
}
fn default_semantic_similarity_threshold() -> f32 {
    0.5
}
fn default_true() -> bool {
    true
}
fn default_timeout_secs() -> f64 {
    10.0
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_recent_messages: default_max_recent_messages(),
            max_semantic_memories: default_max_semantic_memories(),
            semantic_similarity_threshold: default_semantic_similarity_threshold(),
            include_system_messages: false,
            include_sensor_data: true,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Settings for the reflection aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Delegate summarization to the external text generator when one
    /// is wired in. Without a generator this flag has no effect.
    #[serde(default)]
    pub use_llm_for_summarization: bool,

    /// Model identifier recorded into digest lineage
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    "rule-based".into()
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            use_llm_for_summarization: false,
            model: default_model(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.reverie/config.toml),
    /// then apply environment variable overrides:
    /// - `REVERIE_CONTEXT_TIMEOUT_SECS`
    /// - `REVERIE_DIGEST_USE_LLM`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides();
        config.validate()?;
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

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError {
                path: PathBuf::from("<inline>"),
                reason: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".reverie")
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(raw) = std::env::var("REVERIE_CONTEXT_TIMEOUT_SECS") {
            if let Ok(secs) = raw.parse::<f64>() {
                self.context.timeout_secs = secs;
            }
        }
        if let Ok(raw) = std::env::var("REVERIE_DIGEST_USE_LLM") {
            self.digest.use_llm_for_summarization =
                matches!(raw.as_str(), "1" | "true" | "yes");
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let threshold = self.context.semantic_similarity_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::ValidationError(format!(
                "semantic_similarity_threshold must be in 0.0–1.0, got {threshold}"
            )));
        }

        if self.context.timeout_secs <= 0.0 || !self.context.timeout_secs.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "timeout_secs must be a positive number, got {}",
                self.context.timeout_secs
            )));
        }

        if self.context.max_recent_messages == 0 && self.context.max_semantic_memories == 0 {
            return Err(ConfigError::ValidationError(
                "at least one of max_recent_messages / max_semantic_memories must be nonzero"
                    .into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
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

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}
