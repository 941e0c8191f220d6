//! Configuration management for shellext
//!
//! This module handles loading, parsing, and managing configuration from various sources:
//! - Configuration files (TOML format)
//! - Environment variables
//! - Command-line arguments (applied by the CLI)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::adapter::DEFAULT_COMPLETION_TIMEOUT;
use crate::error::{ConfigError, Result};

/// Environment variable overriding `completion.timeout_ms`
pub const ENV_COMPLETION_TIMEOUT: &str = "SHELLEXT_COMPLETION_TIMEOUT_MS";

/// Environment variable overriding `logging.level`
pub const ENV_LOG_LEVEL: &str = "SHELLEXT_LOG_LEVEL";

/// Upper bound for the completion time box
const MAX_COMPLETION_TIMEOUT_MS: u64 = 60_000;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Completion configuration
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Completion adapter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Time box for one completion request, in milliseconds
    #[serde(default = "default_completion_timeout_ms")]
    pub timeout_ms: u64,

    /// Cancel completion on Ctrl+C
    ///
    /// Off by default. The first listener installs a SIGINT handler for the
    /// whole process and it is never removed, so Ctrl+C stops terminating
    /// the host even after every completion has returned. Enable only when
    /// the host does not rely on the default SIGINT behavior.
    #[serde(default = "default_listen_for_interrupt")]
    pub listen_for_interrupt: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_completion_timeout_ms() -> u64 {
    DEFAULT_COMPLETION_TIMEOUT.as_millis() as u64
}

fn default_listen_for_interrupt() -> bool {
    false
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_completion_timeout_ms(),
            listen_for_interrupt: default_listen_for_interrupt(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Load configuration with file and environment precedence
    ///
    /// An explicit `path` must exist. Without one, the default path is used
    /// if present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `SHELLEXT_*` environment overrides
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(
            std::env::var(ENV_COMPLETION_TIMEOUT).ok().as_deref(),
            std::env::var(ENV_LOG_LEVEL).ok().as_deref(),
        )
    }

    fn apply_overrides(&mut self, timeout_ms: Option<&str>, level: Option<&str>) -> Result<()> {
        if let Some(value) = timeout_ms {
            self.completion.timeout_ms =
                value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    field: ENV_COMPLETION_TIMEOUT.to_string(),
                    value: value.to_string(),
                })?;
        }

        if let Some(value) = level {
            self.logging.level =
                LogLevel::parse(value).ok_or_else(|| ConfigError::InvalidValue {
                    field: ENV_LOG_LEVEL.to_string(),
                    value: value.to_string(),
                })?;
        }

        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - Path to default configuration file
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".shellext")
            .join("config.toml")
    }

    /// Save configuration to a file
    ///
    /// # Arguments
    /// * `path` - Path where to save the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Serialize to TOML text
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        let timeout = self.completion.timeout_ms;
        if timeout == 0 || timeout > MAX_COMPLETION_TIMEOUT_MS {
            return Err(ConfigError::InvalidValue {
                field: "completion.timeout_ms".to_string(),
                value: timeout.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl CompletionConfig {
    /// Get completion time box as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl LogLevel {
    /// Parse a level name, case-insensitively
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" | "warning" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
