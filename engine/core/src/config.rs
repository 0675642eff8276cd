//! Session Configuration
//!
//! Timings, validation limits and canned content for a [`Session`](crate::Session),
//! loaded from layered sources.
//!
//! # Configuration Priority
//!
//! Values are resolved with the following priority (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables (`LITES_*`)
//! 3. TOML configuration file
//! 4. Default values (the reference prototype's behavior)
//!
//! The file lives at `$XDG_CONFIG_HOME/lites/session.toml`
//! (typically `~/.config/lites/session.toml`).
//!
//! # Example Configuration
//!
//! ```toml
//! [pipeline]
//! delivered_ms = 500
//! typing_ms = 1000
//! reply_ms = 3000
//!
//! [validation]
//! min_phone_len = 10
//! max_message_len = 4096
//!
//! [content]
//! reply_text = "Привет! Это автоответ 👋"
//! seed_peer = "Привет!"
//! seed_self = "Как дела?"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::ValidationRules;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Offsets of the reply pipeline, measured from the moment a message is submitted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTimings {
    /// pending -> delivered (default: 500ms)
    pub delivered_ms: u64,
    /// Typing indicator on (default: 1000ms)
    pub typing_ms: u64,
    /// Typing off and reply appended (default: 3000ms)
    pub reply_ms: u64,
}

impl Default for PipelineTimings {
    fn default() -> Self {
        Self {
            delivered_ms: 500,
            typing_ms: 1000,
            reply_ms: 3000,
        }
    }
}

/// Upper bound for any pipeline offset (24 hours)
pub const MAX_PIPELINE_MS: u64 = 24 * 60 * 60 * 1000;

/// History shown when a conversation is opened
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedMessages {
    /// Text of the peer's seed message
    pub peer: String,
    /// Text of the user's seed message
    pub own: String,
}

impl Default for SeedMessages {
    fn default() -> Self {
        Self {
            peer: "Привет!".to_string(),
            own: "Как дела?".to_string(),
        }
    }
}

/// Fully resolved session configuration
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Reply pipeline offsets
    pub timings: PipelineTimings,
    /// Input validation limits
    pub rules: ValidationRules,
    /// Text of the simulated peer reply
    pub reply_text: String,
    /// Seed history
    pub seed: SeedMessages,
    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,
    /// Source of configuration values
    source: ConfigSource,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timings: PipelineTimings::default(),
            rules: ValidationRules::default(),
            reply_text: "Привет! Это автоответ 👋".to_string(),
            seed: SeedMessages::default(),
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl SessionConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] when the pipeline offsets are
    /// not strictly increasing, exceed [`MAX_PIPELINE_MS`], or a limit is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timings;
        if !(t.delivered_ms < t.typing_ms && t.typing_ms < t.reply_ms) {
            return Err(ConfigError::ValidationError(format!(
                "pipeline offsets must increase: delivered={} typing={} reply={}",
                t.delivered_ms, t.typing_ms, t.reply_ms
            )));
        }
        if t.reply_ms > MAX_PIPELINE_MS {
            return Err(ConfigError::ValidationError(format!(
                "reply_ms must be at most {MAX_PIPELINE_MS}, got {}",
                t.reply_ms
            )));
        }
        if self.rules.max_message_len == 0 {
            return Err(ConfigError::ValidationError(
                "max_message_len must be positive".to_string(),
            ));
        }
        if self.reply_text.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "reply_text must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[pipeline]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineToml {
    /// pending -> delivered offset in milliseconds
    pub delivered_ms: Option<u64>,
    /// Typing indicator offset in milliseconds
    pub typing_ms: Option<u64>,
    /// Reply offset in milliseconds
    pub reply_ms: Option<u64>,
}

/// `[validation]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationToml {
    /// Minimum phone length in characters
    pub min_phone_len: Option<usize>,
    /// Maximum message size in bytes
    pub max_message_len: Option<usize>,
}

/// `[content]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentToml {
    /// Simulated reply text
    pub reply_text: Option<String>,
    /// Seed message from the peer
    pub seed_peer: Option<String>,
    /// Seed message from the user
    pub seed_self: Option<String>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionToml {
    /// Pipeline section
    pub pipeline: PipelineToml,
    /// Validation section
    pub validation: ValidationToml,
    /// Content section
    pub content: ContentToml,
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/lites/session.toml` or
/// `~/.config/lites/session.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lites").join("session.toml"))
}

/// Load configuration from the default path, the environment and defaults
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or the
/// resulting values are inconsistent. A missing file is not an error.
pub fn load_config() -> Result<SessionConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or the resulting values are inconsistent.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<SessionConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration, resolving environment variables through `env`
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<SessionConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = SessionConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: SessionToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut SessionConfig, toml: &SessionToml) {
    if let Some(ms) = toml.pipeline.delivered_ms {
        config.timings.delivered_ms = ms;
    }
    if let Some(ms) = toml.pipeline.typing_ms {
        config.timings.typing_ms = ms;
    }
    if let Some(ms) = toml.pipeline.reply_ms {
        config.timings.reply_ms = ms;
    }

    if let Some(len) = toml.validation.min_phone_len {
        config.rules.min_phone_len = len;
    }
    if let Some(len) = toml.validation.max_message_len {
        config.rules.max_message_len = len;
    }

    if let Some(ref text) = toml.content.reply_text {
        config.reply_text = text.clone();
    }
    if let Some(ref text) = toml.content.seed_peer {
        config.seed.peer = text.clone();
    }
    if let Some(ref text) = toml.content.seed_self {
        config.seed.own = text.clone();
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut SessionConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let parse_u64 = |key: &str| env(key).and_then(|v| v.parse::<u64>().ok());
    let parse_usize = |key: &str| env(key).and_then(|v| v.parse::<usize>().ok());

    if let Some(ms) = parse_u64("LITES_DELIVERED_MS") {
        config.timings.delivered_ms = ms;
        config.source = ConfigSource::Env;
    }
    if let Some(ms) = parse_u64("LITES_TYPING_MS") {
        config.timings.typing_ms = ms;
        config.source = ConfigSource::Env;
    }
    if let Some(ms) = parse_u64("LITES_REPLY_MS") {
        config.timings.reply_ms = ms;
        config.source = ConfigSource::Env;
    }
    if let Some(len) = parse_usize("LITES_MIN_PHONE_LEN") {
        config.rules.min_phone_len = len;
        config.source = ConfigSource::Env;
    }
    if let Some(len) = parse_usize("LITES_MAX_MESSAGE_LEN") {
        config.rules.max_message_len = len;
        config.source = ConfigSource::Env;
    }
    if let Some(text) = env("LITES_REPLY_TEXT") {
        config.reply_text = text;
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`], then call [`SessionConfig::validate`].
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Delivered offset override (ms)
    pub delivered_ms: Option<u64>,
    /// Typing offset override (ms)
    pub typing_ms: Option<u64>,
    /// Reply offset override (ms)
    pub reply_ms: Option<u64>,
    /// Reply text override
    pub reply_text: Option<String>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set delivered offset override
    #[must_use]
    pub fn with_delivered_ms(mut self, ms: u64) -> Self {
        self.delivered_ms = Some(ms);
        self
    }

    /// Set typing offset override
    #[must_use]
    pub fn with_typing_ms(mut self, ms: u64) -> Self {
        self.typing_ms = Some(ms);
        self
    }

    /// Set reply offset override
    #[must_use]
    pub fn with_reply_ms(mut self, ms: u64) -> Self {
        self.reply_ms = Some(ms);
        self
    }

    /// Set reply text override
    #[must_use]
    pub fn with_reply_text(mut self, text: String) -> Self {
        self.reply_text = Some(text);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut SessionConfig) {
        if self.delivered_ms.is_some()
            || self.typing_ms.is_some()
            || self.reply_ms.is_some()
            || self.reply_text.is_some()
        {
            config.source = ConfigSource::Cli;
        }

        if let Some(ms) = self.delivered_ms {
            config.timings.delivered_ms = ms;
        }
        if let Some(ms) = self.typing_ms {
            config.timings.typing_ms = ms;
        }
        if let Some(ms) = self.reply_ms {
            config.timings.reply_ms = ms;
        }
        if let Some(ref text) = self.reply_text {
            config.reply_text = text.clone();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
