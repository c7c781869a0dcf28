use super::{StorageError, StorageType};
use crate::config::{Config, ConfigManager};
use std::path::{Path, PathBuf};

/// Where and how session payloads are kept, resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub storage_type: StorageType,
    pub storage_path: PathBuf,
}

impl StorageConfig {
    pub fn from_config_manager(manager: &ConfigManager) -> Self {
        Self {
            storage_type: manager.effective_storage_type(),
            storage_path: manager.storage_path(),
        }
    }
}

/// Reads and writes the configuration file itself.
#[derive(Debug)]
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn save(&self, config: &Config) -> Result<(), StorageError> {
        // Create parent directories if they don't exist
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, json)?;

        // Verify the write was successful by reading back
        let contents = std::fs::read_to_string(&self.path)?;
        let _: Config = serde_json::from_str(&contents)?;

        Ok(())
    }

    pub fn load(&self) -> Result<Config, StorageError> {
        if !self.path.exists() {
            return Ok(Config::default());
        }

        let contents = std::fs::read_to_string(&self.path)?;

        // If the file is empty, return default config
        if contents.trim().is_empty() {
            return Ok(Config::default());
        }

        Ok(serde_json::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::create_test_config_manager;

    #[test]
    fn test_storage_config_from_manager() {
        let (manager, temp_dir) = create_test_config_manager();
        let config = StorageConfig::from_config_manager(&manager);
        assert_eq!(config.storage_type, StorageType::Json);
        assert_eq!(config.storage_path, temp_dir.path().join("sessions"));
    }

    #[test]
    fn test_storage_config_from_manager_with_custom_type() {
        let (mut manager, temp_dir) = create_test_config_manager();
        manager.unset("storage.path").unwrap();
        manager.set("storage.type", "sqlite").unwrap();
        let config = StorageConfig::from_config_manager(&manager);
        assert_eq!(config.storage_type, StorageType::Sqlite);
        assert_eq!(config.storage_path, temp_dir.path().join("sessions.db"));
    }

    #[test]
    fn test_storage_config_from_manager_with_invalid_type() {
        let (manager, temp_dir) = create_test_config_manager();

        // Hand-edited file bypassing validation
        let storage = ConfigStorage::new(manager.path());
        let mut config = storage.load().unwrap();
        config.storage_type = Some("invalid".to_string());
        storage.save(&config).unwrap();

        let manager = ConfigManager::new(Some(manager.path())).unwrap();
        let config = StorageConfig::from_config_manager(&manager);
        assert_eq!(config.storage_type, StorageType::Json); // Should default to Json
        assert_eq!(config.storage_path, temp_dir.path().join("sessions"));
    }

    #[test]
    fn test_config_storage_missing_and_empty_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.json");
        let storage = ConfigStorage::new(&path);
        assert!(!storage.exists());
        assert!(storage.load().unwrap().storage_type.is_none());

        std::fs::write(&path, "\n").unwrap();
        assert!(storage.load().unwrap().storage_path.is_none());
    }
}
