//! Configuration loading and typed config structures for the pet care
//! simulator.
//!
//! The configuration lives in `petcare-config.yaml` in the working
//! directory. This module defines strongly-typed structs that mirror the
//! YAML structure and a loader that reads the file. Every field has a
//! default, so an empty or missing file yields a runnable simulator.

use std::path::Path;

use petcare_pets::CareConfig;
use petcare_types::{Item, Species};
use serde::Deserialize;
use tracing::warn;

use crate::catalog;

/// Environment variable that overrides `care.decay_interval_ms`.
pub const DECAY_INTERVAL_ENV: &str = "PETCARE_DECAY_INTERVAL_MS";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulator configuration.
///
/// Mirrors the structure of `petcare-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulatorConfig {
    /// Stat and decay tuning.
    #[serde(default)]
    pub care: CareSection,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Pets adopted when the engine starts.
    #[serde(default)]
    pub pets: Vec<SeedPet>,

    /// The item catalog offered to the caretaker.
    #[serde(default = "catalog::default_items")]
    pub items: Vec<Item>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            care: CareSection::default(),
            logging: LoggingConfig::default(),
            pets: Vec::new(),
            items: catalog::default_items(),
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `PETCARE_DECAY_INTERVAL_MS` overrides `care.decay_interval_ms` when
    /// set to a valid integer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file) when the file exists.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            return Self::from_file(path);
        }
        warn!(path = %path.display(), "Config file not found, using defaults");
        let mut config = Self::default();
        config.care.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.care.apply_env_overrides();
        Ok(config)
    }
}

/// The `care` section: stat and decay tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CareSection {
    /// Value every stat starts at (0-100).
    #[serde(default = "default_initial_stat_value")]
    pub initial_stat_value: u32,

    /// Points removed from every stat per tick.
    #[serde(default = "default_decay_amount")]
    pub decay_amount: u32,

    /// Real-time milliseconds between ticks.
    #[serde(default = "default_decay_interval_ms")]
    pub decay_interval_ms: u64,
}

impl Default for CareSection {
    fn default() -> Self {
        Self {
            initial_stat_value: default_initial_stat_value(),
            decay_amount: default_decay_amount(),
            decay_interval_ms: default_decay_interval_ms(),
        }
    }
}

impl CareSection {
    /// Apply `PETCARE_DECAY_INTERVAL_MS` when it holds a valid integer.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(DECAY_INTERVAL_ENV) {
            match val.trim().parse::<u64>() {
                Ok(ms) => self.decay_interval_ms = ms,
                Err(_) => warn!(value = %val, "Ignoring invalid {DECAY_INTERVAL_ENV}"),
            }
        }
    }
}

impl From<&CareSection> for CareConfig {
    fn from(section: &CareSection) -> Self {
        Self {
            initial_stat_value: section.initial_stat_value,
            decay_amount: section.decay_amount,
            decay_interval_ms: section.decay_interval_ms,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// A pet adopted at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedPet {
    /// The pet's name. Blank names are skipped by the engine.
    pub name: String,
    /// The pet's species, in any case.
    pub species: Species,
    /// Catalog item given right after adoption, looked up by name.
    #[serde(default)]
    pub welcome_item: Option<String>,
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_initial_stat_value() -> u32 {
    50
}

const fn default_decay_amount() -> u32 {
    1
}

const fn default_decay_interval_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    "info".to_owned()
}
