//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! tide-panel.toml file: which NOAA station to chart and how the slideshow
//! host should rotate the image.
//!
//! Unlike a standalone tool, a slideshow component with a wrong station id
//! or a zero rotation period fails in confusing ways hours later, so every
//! field is required and validated up front. A missing or malformed value
//! is a construction-time [`ConfigError`], never a silent default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Errors raised while loading or validating the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("config IO: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML or is missing required fields
    #[error("config parse: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field parsed but holds a useless value
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Application configuration loaded from tide-panel.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// NOAA station to fetch predictions for
    pub station: StationConfig,
    /// How the slideshow host should schedule this component
    pub rotation: RotationConfig,
}

/// NOAA tide station configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StationConfig {
    /// NOAA station ID (e.g., "8447270" for Onset, MA)
    pub id: String,
    /// Title drawn on the chart and reported to the host
    pub friendly_name: String,
}

/// Slideshow rotation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RotationConfig {
    /// How often the host should call update(), in minutes
    pub expiration_period_mins: u64,
    /// How long the host should keep the chart on screen, in seconds
    pub display_duration_secs: u64,
}

impl Config {
    /// Load and validate configuration from the given path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&contents)?;
        info!(
            station = %config.station.id,
            name = %config.station.friendly_name,
            "loaded tide panel configuration"
        );
        Ok(config)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.station.id.trim().is_empty() {
            return Err(ConfigError::Invalid("station.id must not be empty"));
        }
        if self.station.friendly_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "station.friendly_name must not be empty",
            ));
        }
        if self.rotation.expiration_period_mins == 0 {
            return Err(ConfigError::Invalid(
                "rotation.expiration_period_mins must be greater than zero",
            ));
        }
        if self.rotation.display_duration_secs == 0 {
            return Err(ConfigError::Invalid(
                "rotation.display_duration_secs must be greater than zero",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID: &str = r#"
[station]
id = "8447270"
friendly_name = "Onset, MA"

[rotation]
expiration_period_mins = 60
display_duration_secs = 10
"#;

    #[test]
    fn test_valid_config_parses() {
        let config = Config::from_toml_str(VALID).unwrap();
        assert_eq!(config.station.id, "8447270");
        assert_eq!(config.station.friendly_name, "Onset, MA");
        assert_eq!(config.rotation.expiration_period_mins, 60);
        assert_eq!(config.rotation.display_duration_secs, 10);
    }

    #[test]
    fn test_missing_field_is_an_error() {
        // No rotation table at all
        let contents = r#"
[station]
id = "8447270"
friendly_name = "Onset, MA"
"#;
        assert!(matches!(
            Config::from_toml_str(contents),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_empty_station_id_is_an_error() {
        let contents = VALID.replace("\"8447270\"", "\"  \"");
        assert!(matches!(
            Config::from_toml_str(&contents),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_zero_duration_is_an_error() {
        let contents = VALID.replace("display_duration_secs = 10", "display_duration_secs = 0");
        assert!(matches!(
            Config::from_toml_str(&contents),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(VALID.as_bytes()).unwrap();

        let config = Config::load_from_path(file.path()).unwrap();
        assert_eq!(config.station.id, "8447270");
    }

    #[test]
    fn test_load_nonexistent_file_is_an_error() {
        assert!(matches!(
            Config::load_from_path("/nonexistent/tide-panel.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::from_toml_str(VALID).unwrap();
        let toml_str = toml::to_string(&config).unwrap();
        let parsed = Config::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed.station.id, config.station.id);
        assert_eq!(
            parsed.rotation.display_duration_secs,
            config.rotation.display_duration_secs
        );
    }
}
