// Configuration loading
//
// A Config is constructed once at startup and passed into the store
// constructor. There is no global configuration state.

use crate::error::{Result, StoreError};
use crate::task::Priority;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Startup configuration, loaded from a YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the tasks JSON document.
    pub data_file: PathBuf,
    /// Priority assigned when `add` is given none.
    pub default_priority: Priority,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            default_priority: Priority::Medium,
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to
    /// defaults when no config file exists.
    pub fn load() -> Result<Self> {
        match default_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path. A missing file yields the
    /// defaults; an unreadable or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| StoreError::Persistence {
            action: "read",
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = serde_yaml::from_str(&contents)
            .map_err(|e| StoreError::Validation(format!("malformed config file: {e}")))?;

        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}

fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("taskman").join("config.yaml"))
}

fn default_data_file() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskman")
        .join("tasks.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("nope.yaml")).unwrap();
        assert_eq!(config.default_priority, Priority::Medium);
        assert!(config.data_file.ends_with("taskman/tasks.json"));
    }

    #[test]
    fn test_load_config_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(
            &path,
            "data_file: /tmp/mytasks.json\ndefault_priority: high\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.data_file, PathBuf::from("/tmp/mytasks.json"));
        assert_eq!(config.default_priority, Priority::High);
    }

    #[test]
    fn test_partial_config_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "default_priority: low\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_priority, Priority::Low);
        assert!(config.data_file.ends_with("taskman/tasks.json"));
    }

    #[test]
    fn test_malformed_config_is_a_validation_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "default_priority: [not, a, priority]\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }
}
