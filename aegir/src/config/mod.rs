//! Configuration for hosts embedding the agent.
//!
//! Settings are layered:
//! 1. Default values
//! 2. Config file (`~/.aegir/config.toml`, or an explicit path)
//! 3. Environment variables (see [`AegirConfig::with_env`])

mod schema;

pub use schema::{
    AegirConfig, AgentSection, ChainSection, ConfigIssue, IssueLevel, LlmProviderKind,
    LlmSection, PriceSection,
};

use std::path::{Path, PathBuf};

use tracing::{debug, info};

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// Missing required field.
    #[error("missing required config: {0}")]
    MissingField(String),
    /// Invalid value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Default config directory, `~/.aegir`.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".aegir")
}

/// Default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration from the default path.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load_config() -> ConfigResult<AegirConfig> {
    load_config_from(&config_path()).await
}

/// Load configuration from `path`, falling back to defaults when it does not
/// exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub async fn load_config_from(path: &Path) -> ConfigResult<AegirConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(AegirConfig::default());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: AegirConfig = toml::from_str(&content)?;
    debug!(path = %path.display(), "loaded config file");

    Ok(config)
}

/// Save configuration to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub async fn save_config_to(config: &AegirConfig, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = toml::to_string_pretty(config)?;
    tokio::fs::write(path, content).await?;
    info!(path = %path.display(), "saved config file");

    Ok(())
}

/// Write a default config to `path` unless one exists (or `force` is set),
/// then load it.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written or read.
pub async fn init_config(path: &Path, force: bool) -> ConfigResult<AegirConfig> {
    if force || !path.exists() {
        save_config_to(&AegirConfig::default(), path).await?;
        info!(path = %path.display(), "created default config");
    }
    load_config_from(path).await
}
