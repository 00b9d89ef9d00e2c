//! Application configuration.
//!
//! Loaded from `config.toml` in the platform data directory. A missing file
//! means defaults; missing keys fall back to their defaults too.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::storage::settings::{MAX_FTP, MIN_FTP};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application version that last wrote the file
    pub version: String,
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// SQLite file name, relative to the data directory
    pub database_file: String,
    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_level: String,
    /// Training defaults
    pub training: TrainingSettings,
    /// Workout execution settings
    pub execution: ExecutionSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            data_dir: PathBuf::new(),
            database_file: "spinlab.db".to_string(),
            log_level: "info".to_string(),
            training: TrainingSettings::default(),
            execution: ExecutionSettings::default(),
        }
    }
}

impl AppConfig {
    /// Full path of the database file.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_file)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_FTP..=MAX_FTP).contains(&self.training.default_ftp) {
            return Err(ConfigError::Invalid(format!(
                "training.default_ftp must be between {} and {} watts",
                MIN_FTP, MAX_FTP
            )));
        }
        if self.training.default_max_hr == 0 {
            return Err(ConfigError::Invalid(
                "training.default_max_hr must be positive".to_string(),
            ));
        }
        if self.execution.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "execution.tick_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Defaults used until the rider stores their own values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingSettings {
    /// FTP in watts
    pub default_ftp: u16,
    /// Maximum heart rate in bpm
    pub default_max_hr: u16,
    /// First day of a training week for weekly trends
    pub week_start: Weekday,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            default_ftp: 200,
            default_max_hr: 185,
            week_start: Weekday::Mon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    /// Wall-clock milliseconds per workout second
    pub tick_interval_ms: u64,
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
        }
    }
}

impl ExecutionSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "spinlab", "Spinlab")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load configuration from `path`; the data directory is the file's parent.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let data_dir = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig {
            data_dir,
            ..Default::default()
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    config.data_dir = data_dir;
    config.validate()?;

    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Save application configuration to the default location.
pub fn save_config(config: &AppConfig) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_path())
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
    }

    let content =
        toml::to_string_pretty(config).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

    std::fs::write(path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

    Ok(())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = load_config_from(&path).unwrap();

        assert_eq!(config.training.default_ftp, 200);
        assert_eq!(config.training.week_start, Weekday::Mon);
        assert_eq!(config.execution.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.database_path(), dir.path().join("spinlab.db"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = AppConfig::default();
        config.training.default_ftp = 275;
        config.training.week_start = Weekday::Sun;
        config.log_level = "debug".to_string();
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.training, config.training);
        assert_eq!(loaded.log_level, "debug");
        assert_eq!(loaded.data_dir, dir.path().join("nested"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[execution]\ntick_interval_ms = 50\n").unwrap();

        let config = load_config_from(&path).unwrap();

        assert_eq!(config.execution.tick_interval_ms, 50);
        assert_eq!(config.training.default_max_hr, 185);
        assert_eq!(config.database_file, "spinlab.db");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[training]\ndefault_ftp = 20\n").unwrap();

        assert!(matches!(
            load_config_from(&path),
            Err(ConfigError::Invalid(_))
        ));

        std::fs::write(&path, "log_level = [").unwrap();
        assert!(matches!(
            load_config_from(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
