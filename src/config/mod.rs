/// Host settings and the configuration section abstraction used to read
/// sound configuration.
pub mod section;

pub use section::ConfigSection;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const APP_DIR_NAME: &str = "RegionSounds";
pub const SETTINGS_FILE: &str = "config.json";
pub const SOUNDS_FILE: &str = "sounds.json";
pub const REGIONS_DIR: &str = "regions";

fn default_data_folder() -> String {
    "data".to_string()
}

fn default_tick_ms() -> u64 {
    50
}

fn default_log_filter() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Folder holding sounds.json, criteria files and the regions folder.
    /// Relative paths are resolved against the settings directory.
    #[serde(default = "default_data_folder")]
    pub data_folder: String,

    /// Length of one scheduler tick in milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Tracing filter used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_folder: default_data_folder(),
            tick_ms: default_tick_ms(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Load settings from `dir/config.json`, creating it with defaults if absent.
    pub fn load_from(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(SETTINGS_FILE);

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
                path: path.display().to_string(),
                source: Box::new(e),
            })?;
            let settings: Settings =
                serde_json::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.display().to_string(),
                    source: Box::new(e),
                })?;
            settings.validate()?;

            tracing::info!("Loaded settings from: {}", path.display());
            Ok(settings)
        } else {
            let settings = Settings::default();
            settings.save_to(dir)?;
            tracing::info!("Created default settings at: {}", path.display());
            Ok(settings)
        }
    }

    /// Save settings to `dir/config.json`
    pub fn save_to(&self, dir: &Path) -> Result<(), ConfigError> {
        fs::create_dir_all(dir).map_err(|e| ConfigError::DirectoryCreationFailed {
            path: dir.display().to_string(),
            source: e,
        })?;

        let path = dir.join(SETTINGS_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;
        fs::write(&path, json).map_err(|e| ConfigError::SaveFailed {
            path: path.display().to_string(),
            source: Box::new(e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be greater than 0".to_string()));
        }
        if self.data_folder.trim().is_empty() {
            return Err(ConfigError::Invalid("data_folder must not be empty".to_string()));
        }
        Ok(())
    }

    /// `<platform config dir>/RegionSounds`
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or_else(|| ConfigError::Invalid("Could not determine config directory".to_string()))
    }

    /// Resolve the data folder against the settings directory.
    pub fn data_path(&self, settings_dir: &Path) -> PathBuf {
        let folder = Path::new(&self.data_folder);
        if folder.is_absolute() {
            folder.to_path_buf()
        } else {
            settings_dir.join(folder)
        }
    }

    pub fn regions_path(&self, settings_dir: &Path) -> PathBuf {
        self.data_path(settings_dir).join(REGIONS_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.data_folder, "data");
        assert_eq!(settings.tick_ms, 50);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "tick_ms": 20 }"#).unwrap();
        assert_eq!(settings.tick_ms, 20);
        assert_eq!(settings.data_folder, "data");
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(dir.path()).unwrap();

        assert_eq!(settings, Settings::default());
        assert!(dir.path().join(SETTINGS_FILE).exists());

        let again = Settings::load_from(dir.path()).unwrap();
        assert_eq!(again, settings);
    }

    #[test]
    fn test_zero_tick_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), r#"{ "tick_ms": 0 }"#).unwrap();
        assert!(matches!(
            Settings::load_from(dir.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_data_path_resolution() {
        let base = Path::new("/srv/sounds");
        let settings = Settings::default();
        assert_eq!(settings.data_path(base), base.join("data"));
        assert_eq!(settings.regions_path(base), base.join("data").join("regions"));

        let absolute = Settings {
            data_folder: "/var/lib/region-sounds".to_string(),
            ..Settings::default()
        };
        assert_eq!(absolute.data_path(base), PathBuf::from("/var/lib/region-sounds"));
    }
}
