//! Configuration management for handbook.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "handbook";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "handbook.db";

/// Default log file name (used while the terminal reader owns stdout).
const LOG_FILE_NAME: &str = "handbook.log";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `HANDBOOK_`, `__` between sections)
/// 2. TOML config file at `~/.config/handbook/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Page navigation configuration.
    pub navigation: NavigationConfig,
    /// Cosmetic feedback configuration.
    pub feedback: FeedbackConfig,
    /// Print configuration.
    pub print: PrintConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/handbook/handbook.db`
    pub database_path: Option<PathBuf>,
}

/// Navigation-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// How long the outgoing page keeps its "previous" tag, in milliseconds.
    pub settle_ms: u64,
    /// Minimum horizontal drag distance (in cells) recognised as a swipe.
    pub swipe_threshold: u16,
}

/// Cosmetic feedback configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Play the page-turn cue.
    pub sound_enabled: bool,
    /// Label shown in place of a copy field after a successful copy.
    pub copied_label: String,
    /// How long the copied label stays up, in milliseconds.
    pub copied_label_ms: u64,
    /// How long the checkmark glyph stays beside a checked entry, in milliseconds.
    pub checkmark_ms: u64,
}

/// Print configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    /// Command that receives the plain-text handbook on stdin.
    pub command: String,
    /// Extra arguments passed to the print command.
    pub args: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file used by the terminal reader.
    /// Defaults to `~/.local/share/handbook/handbook.log`
    pub file: Option<PathBuf>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            settle_ms: 600,
            swipe_threshold: 50,
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            copied_label: "Copied!".to_string(),
            copied_label_ms: 1500,
            checkmark_ms: 2000,
        }
    }
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            command: "lp".to_string(),
            args: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("HANDBOOK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("navigation.settle_ms", self.navigation.settle_ms),
            ("feedback.copied_label_ms", self.feedback.copied_label_ms),
            ("feedback.checkmark_ms", self.feedback.checkmark_ms),
        ];
        for (name, value) in durations {
            if value == 0 {
                return Err(Error::ConfigValidation {
                    message: format!("{name} must be greater than 0"),
                });
            }
        }

        if self.navigation.swipe_threshold == 0 {
            return Err(Error::ConfigValidation {
                message: "navigation.swipe_threshold must be greater than 0".to_string(),
            });
        }

        if self.feedback.copied_label.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "feedback.copied_label cannot be empty".to_string(),
            });
        }

        if self.print.command.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "print.command cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the log file path, resolving defaults if not set.
    #[must_use]
    pub fn log_file_path(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(LOG_FILE_NAME))
    }

    /// Get the page settle window as a Duration.
    #[must_use]
    pub fn settle_duration(&self) -> Duration {
        Duration::from_millis(self.navigation.settle_ms)
    }

    /// Get the copied-label window as a Duration.
    #[must_use]
    pub fn copied_label_duration(&self) -> Duration {
        Duration::from_millis(self.feedback.copied_label_ms)
    }

    /// Get the checkmark glyph lifetime as a Duration.
    #[must_use]
    pub fn checkmark_duration(&self) -> Duration {
        Duration::from_millis(self.feedback.checkmark_ms)
    }
}
