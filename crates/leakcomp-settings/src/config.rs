//! Configuration for LeakComp
//!
//! Provides configuration file handling and validation.
//! Supports JSON and TOML files; every key is optional and falls back to its
//! default.
//!
//! Configuration is organized into sections:
//! - Compensation settings (leak coefficient, on/off)
//! - Output settings (file name suffix, decimal places)

use leakcomp_core::{DEFAULT_LEAK_COEFFICIENT, DEFAULT_PRECISION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{SettingsError, SettingsResult};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "LEAKCOMP_CONFIG";

/// Config file name inside the platform config directory
const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name inside the platform config directory
const APP_DIR_NAME: &str = "leakcomp";

/// Largest supported number of decimal places
pub const MAX_PRECISION: usize = 6;

/// Leak compensation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompensationSettings {
    /// Whether extrude blocks are compensated at all
    pub enabled: bool,
    /// Leak coefficient `C` (leaked volume per unit of mean speed)
    pub leak_coefficient: f64,
}

impl Default for CompensationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            leak_coefficient: DEFAULT_LEAK_COEFFICIENT,
        }
    }
}

impl CompensationSettings {
    /// Coefficient actually applied (zero when disabled)
    pub fn effective_coefficient(&self) -> f64 {
        if self.enabled {
            self.leak_coefficient
        } else {
            0.0
        }
    }
}

/// Output file settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Inserted before the first `.` of the input file name
    pub suffix: String,
    /// Decimal places for every field value
    pub precision: usize,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            suffix: "_parsed".to_string(),
            precision: DEFAULT_PRECISION,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Compensation settings
    pub compensation: CompensationSettings,
    /// Output settings
    pub output: OutputSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SettingsError::LoadError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                return Err(SettingsError::UnsupportedFormat(format!(
                    "{} (config file must be .json or .toml)",
                    path.display()
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)?,
            _ => {
                return Err(SettingsError::UnsupportedFormat(format!(
                    "{} (config file must be .json or .toml)",
                    path.display()
                )))
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config file location for this platform
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Find and load the active configuration
    ///
    /// `LEAKCOMP_CONFIG` wins over the platform config directory. Defaults are
    /// used when neither names an existing file.
    pub fn discover() -> SettingsResult<Self> {
        let from_env = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        Self::discover_from(from_env, Self::default_path())
    }

    /// [`Config::discover`] with explicit candidate paths
    pub fn discover_from(
        explicit: Option<PathBuf>,
        fallback: Option<PathBuf>,
    ) -> SettingsResult<Self> {
        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "Loading config from {}", CONFIG_ENV_VAR);
            return Self::load_from_file(&path);
        }

        match fallback {
            Some(path) if path.is_file() => {
                tracing::debug!(path = %path.display(), "Loading config");
                Self::load_from_file(&path)
            }
            _ => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let coefficient = self.compensation.leak_coefficient;
        if !coefficient.is_finite() || coefficient < 0.0 {
            return Err(SettingsError::invalid(
                "compensation.leak_coefficient",
                format!("must be a finite value >= 0, got {}", coefficient),
            ));
        }

        if self.output.suffix.is_empty() {
            return Err(SettingsError::invalid(
                "output.suffix",
                "must not be empty",
            ));
        }

        if self.output.precision > MAX_PRECISION {
            return Err(SettingsError::invalid(
                "output.precision",
                format!("must be at most {}, got {}", MAX_PRECISION, self.output.precision),
            ));
        }

        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}
