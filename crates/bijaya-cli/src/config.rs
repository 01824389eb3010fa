//! Persistent CLI configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "cli-config.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    /// Database file used when neither `--db-path` nor `BIJAYA_DB_PATH` is set
    #[serde(default)]
    pub db_path: Option<String>,
    /// Directory holding the remote `bijaya-notes.json`
    #[serde(default)]
    pub remote_folder: Option<String>,
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| panic!("Failed to resolve CLI config directory"))
        .join("bijaya")
        .join(CONFIG_FILE_NAME)
}

/// `BIJAYA_CONFIG` wins over the platform config directory
pub fn resolve_config_path() -> PathBuf {
    std::env::var_os("BIJAYA_CONFIG").map_or_else(default_config_path, PathBuf::from)
}

pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    bijaya_core::util::normalize_text_option(value)
}

impl CliConfig {
    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    pub fn db_path(&self) -> Option<PathBuf> {
        normalize_text_option(self.db_path.clone()).map(PathBuf::from)
    }

    pub fn remote_folder(&self) -> Option<PathBuf> {
        normalize_text_option(self.remote_folder.clone()).map(PathBuf::from)
    }

    pub fn set_remote_folder(&mut self, folder: Option<&Path>) {
        self.remote_folder = folder.map(|folder| folder.display().to_string());
    }

    fn normalize(&mut self) {
        self.db_path = normalize_text_option(self.db_path.clone());
        self.remote_folder = normalize_text_option(self.remote_folder.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_config_path() -> PathBuf {
        std::env::temp_dir().join(format!(
            "bijaya-cli-config-test-{}-{}.json",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_or(0, |duration| duration.as_nanos())
        ))
    }

    #[test]
    fn missing_config_loads_defaults() {
        let config = CliConfig::load_from_path(&unique_config_path()).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.remote_folder(), None);
    }

    #[test]
    fn config_roundtrip_trims_values() {
        let path = unique_config_path();
        let config = CliConfig {
            version: 1,
            db_path: Some("   ".to_string()),
            remote_folder: Some(" /mnt/drive/bijaya ".to_string()),
        };

        config.save_to_path(&path).unwrap();
        let loaded = CliConfig::load_from_path(&path).unwrap();

        assert_eq!(loaded.db_path, None);
        assert_eq!(
            loaded.remote_folder(),
            Some(PathBuf::from("/mnt/drive/bijaya"))
        );

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn malformed_config_is_reported() {
        let path = unique_config_path();
        std::fs::write(&path, "{ nope").unwrap();

        let error = CliConfig::load_from_path(&path).unwrap_err();
        assert!(error.starts_with("Failed to parse config"));

        let _ = std::fs::remove_file(path);
    }
}
