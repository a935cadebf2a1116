use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::caption::{Millis, WarningLimits};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Language code used when a command needs one and none is given (ISO)
    #[serde(default = "default_language")]
    pub default_language: String,

    /// Editing behaviour
    #[serde(default)]
    pub editor: EditorConfig,

    /// Limits used for caption warnings
    #[serde(default)]
    pub warnings: WarningLimits,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Editing behaviour of the caption timeline
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EditorConfig {
    /// Duration given to a caption inserted in front of a synced caption, in ms
    #[serde(default = "default_caption_duration_ms")]
    pub default_caption_duration_ms: Millis,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_caption_duration_ms: default_caption_duration_ms(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching filter for the `log` facade
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_language() -> String {
    "en".to_string()
}

fn default_caption_duration_ms() -> Millis {
    3000.0
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.default_language)
            .context("Invalid default language")?;

        let duration = self.editor.default_caption_duration_ms;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(anyhow!(
                "Default caption duration must be positive, got {}",
                duration
            ));
        }

        let limits = &self.warnings;
        if limits.max_lines == 0 || limits.max_line_length == 0 {
            return Err(anyhow!("Line limits must be greater than zero"));
        }
        if limits.max_characters_per_second <= 0.0 || limits.min_duration_ms <= 0.0 {
            return Err(anyhow!("Rate and duration limits must be greater than zero"));
        }

        Ok(())
    }

    /// Read a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Write the configuration as pretty JSON
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path.as_ref(), config_json)
            .with_context(|| format!("Failed to write config to file: {:?}", path.as_ref()))
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            default_language: default_language(),
            editor: EditorConfig::default(),
            warnings: WarningLimits::default(),
            log_level: LogLevel::default(),
        }
    }
}
