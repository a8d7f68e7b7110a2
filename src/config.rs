//! # Run Settings
//!
//! Optional TOML settings controlling where results go and how verbose the run is.
//! Workspace geometry and the command schedule live in the scene file instead
//! (see [`crate::scene`]).
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [output]
//! directory = "results"
//! precision = 4
//! write_positions = true
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! ## Example: Rust Usage
//!
//! ```rust
//! use spidercam_rs::config::Settings;
//! let settings: Settings = toml::from_str("[output]\nprecision = 4").unwrap();
//! assert_eq!(settings.output.precision, Some(4));
//! assert_eq!(settings.logging.level, "info");
//! assert!(settings.validate().is_ok());
//! ```

// src/config.rs - Settings file and configuration errors
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Top-level settings for a run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where and how the output tables are written.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputSettings {
    /// Target directory; next to the scene file when unset
    #[serde(default)]
    pub directory: Option<PathBuf>,
    /// Fixed number of decimals; shortest round-trip formatting when unset
    #[serde(default)]
    pub precision: Option<usize>,
    #[serde(default = "default_write_positions")]
    pub write_positions: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: None,
            precision: None,
            write_positions: default_write_positions(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingSettings {
    pub fn max_level(&self) -> Result<tracing::Level, ConfigError> {
        self.level
            .parse::<tracing::Level>()
            .map_err(|_| ConfigError::Invalid(format!("unknown log level '{}'", self.level)))
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logging.max_level()?;
        if let Some(precision) = self.output.precision {
            if precision > 17 {
                return Err(ConfigError::Invalid(format!(
                    "output precision {} exceeds 17 digits",
                    precision
                )));
            }
        }
        Ok(())
    }
}

fn default_write_positions() -> bool { true }
fn default_log_level() -> String { "info".to_string() }

/// Load settings from a TOML file at the given path.
pub fn load_config(path: &str) -> Result<Settings, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<Settings>(&contents) {
            Ok(settings) => {
                settings.validate()?;
                Ok(settings)
            }
            Err(e) => {
                tracing::error!("Failed to parse settings TOML: {}", e);
                Err(ConfigError::Toml(e))
            }
        },
        Err(e) => {
            tracing::error!("Failed to read settings file '{}': {}", path, e);
            Err(ConfigError::Io(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.output.directory, None);
        assert_eq!(settings.output.precision, None);
        assert!(settings.output.write_positions);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.logging.max_level().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn test_load_config_success() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("settings.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "[output]\ndirectory = 'out'\nprecision = 3\n[logging]\nlevel = 'debug'").unwrap();
        file.flush().unwrap();
        let settings = load_config(file_path.to_str().unwrap()).unwrap();
        assert_eq!(settings.output.directory, Some(PathBuf::from("out")));
        assert_eq!(settings.output.precision, Some(3));
        // Defaults for missing fields
        assert!(settings.output.write_positions);
        assert_eq!(settings.logging.max_level().unwrap(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("nonexistent_settings.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("bad.toml");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "not a valid toml").unwrap();
        file.flush().unwrap();
        let result = load_config(file_path.to_str().unwrap());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_unknown_log_level_is_rejected() {
        let settings: Settings = toml::from_str("[logging]\nlevel = 'chatty'").unwrap();
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }
}
