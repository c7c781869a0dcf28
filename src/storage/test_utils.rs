use crate::config::ConfigManager;
use crate::session::SessionManager;
use crate::storage::MemoryStorage;
use tempfile::TempDir;

/// Creates a configuration manager whose config file and session directory both
/// live in a temporary directory, so tests never touch the user's real setup.
pub fn create_test_config_manager() -> (ConfigManager, TempDir) {
    let temp_dir = tempfile::Builder::new()
        .prefix("todo_sessions_test")
        .tempdir()
        .expect("Failed to create temporary directory");

    let config_path = temp_dir.path().join("config.json");
    let mut config_manager =
        ConfigManager::new(Some(config_path.as_path())).expect("Failed to create config manager");

    let storage_path = temp_dir.path().join("sessions");
    config_manager
        .set("storage.type", "json")
        .expect("Failed to set storage.type");
    config_manager
        .set("storage.path", storage_path.to_str().expect("utf-8 temp path"))
        .expect("Failed to set storage.path");

    (config_manager, temp_dir)
}

/// A session manager over in-memory storage with the default seeding enabled.
pub fn create_test_session_manager() -> SessionManager {
    SessionManager::new(Box::new(MemoryStorage::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::config::StorageConfig;
    use crate::storage::create_storage;

    #[test]
    fn test_config_manager_points_into_temp_dir() {
        let (config_manager, temp_dir) = create_test_config_manager();

        let storage_path = config_manager
            .get("storage.path")
            .unwrap()
            .expect("Storage path not set");
        assert!(storage_path.contains("todo_sessions_test"));

        // Verify we can get the storage
        let storage_config = StorageConfig::from_config_manager(&config_manager);
        let storage =
            create_storage(storage_config.storage_type, &storage_config.storage_path).unwrap();
        assert!(storage.session_ids().unwrap().is_empty());
        assert!(temp_dir.path().join("config.json").exists());
    }
}
