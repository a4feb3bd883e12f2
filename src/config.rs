//! Mechanics configuration module
//!
//! Handles loading and parsing of mechanics configuration from files and
//! environment variables.

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::game::executor::STEP_TIME_MS;

/// Mechanics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MechanicsConfig {
    /// Path to the configuration file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Tick cadence in milliseconds
    #[serde(default = "default_step_time")]
    pub step_time_ms: u64,

    /// Width of a freshly created tactical map
    #[serde(default = "default_map_width")]
    pub map_width: u32,

    /// Height of a freshly created tactical map
    #[serde(default = "default_map_height")]
    pub map_height: u32,

    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,
}

fn default_step_time() -> u64 {
    STEP_TIME_MS
}

fn default_map_width() -> u32 {
    10
}

fn default_map_height() -> u32 {
    10
}

impl Default for MechanicsConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("config/mechanics.toml"),
            step_time_ms: default_step_time(),
            map_width: default_map_width(),
            map_height: default_map_height(),
            debug: false,
        }
    }
}

impl MechanicsConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        // Determine config path from environment or use default
        let config_path = env::var("TACTICA_MECHANICS_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/mechanics.toml"));

        // Try to load from file
        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;

            toml::from_str(&content).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            Self::default()
        };

        config.config_path = config_path;

        // Override with environment variables
        config.apply_env_overrides();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("TACTICA_STEP_TIME_MS") {
            if let Ok(step) = val.parse() {
                self.step_time_ms = step;
            }
        }
        if let Ok(val) = env::var("TACTICA_MAP_WIDTH") {
            if let Ok(width) = val.parse() {
                self.map_width = width;
            }
        }
        if let Ok(val) = env::var("TACTICA_MAP_HEIGHT") {
            if let Ok(height) = val.parse() {
                self.map_height = height;
            }
        }
        if let Ok(val) = env::var("TACTICA_DEBUG") {
            self.debug = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Validate the configuration values
    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.step_time_ms > 0, "step_time_ms must be positive");
        anyhow::ensure!(
            self.map_width > 0 && self.map_height > 0,
            "map dimensions must be positive"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MechanicsConfig::default();
        assert_eq!(config.step_time_ms, STEP_TIME_MS);
        assert_eq!(config.map_width, 10);
        assert_eq!(config.map_height, 10);
        assert!(!config.debug);
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: MechanicsConfig = toml::from_str("step_time_ms = 100").unwrap();
        assert_eq!(config.step_time_ms, 100);
        // Unspecified fields fall back to defaults
        assert_eq!(config.map_width, 10);
        assert_eq!(config.map_height, 10);
    }

    #[test]
    fn test_env_overrides() {
        // No other test reads these variables, so no serialization of
        // tests is needed
        env::set_var("TACTICA_STEP_TIME_MS", "75");
        env::set_var("TACTICA_MAP_WIDTH", "not-a-number");
        env::set_var("TACTICA_DEBUG", "1");

        let mut config = MechanicsConfig::default();
        config.apply_env_overrides();

        env::remove_var("TACTICA_STEP_TIME_MS");
        env::remove_var("TACTICA_MAP_WIDTH");
        env::remove_var("TACTICA_DEBUG");

        assert_eq!(config.step_time_ms, 75);
        // A value that does not parse is ignored; the default stands
        assert_eq!(config.map_width, 10);
        assert!(config.debug);
    }

    #[test]
    fn test_validate_rejects_zero_step() {
        let config = MechanicsConfig {
            step_time_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
