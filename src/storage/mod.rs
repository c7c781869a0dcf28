use crate::models::{SessionData, StorageError};
use std::path::Path;
use uuid::Uuid;

pub mod config;
pub mod json;
pub mod memory;
pub mod sqlite;

#[cfg(test)]
pub(crate) mod test_utils;

pub use json::JsonStorage;
pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    Json,
    Sqlite,
    Memory,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "json" => Some(StorageType::Json),
            "sqlite" => Some(StorageType::Sqlite),
            "memory" => Some(StorageType::Memory),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StorageType::Json => "json",
            StorageType::Sqlite => "sqlite",
            StorageType::Memory => "memory",
        }
    }
}

/// Keeps session payloads for as long as their session lives.
pub trait Storage: Send + Sync {
    fn load(&self, id: Uuid) -> Result<Option<SessionData>, StorageError>;
    fn save(&self, id: Uuid, data: &SessionData) -> Result<(), StorageError>;
    /// Returns whether a session was actually removed.
    fn remove(&self, id: Uuid) -> Result<bool, StorageError>;
    fn session_ids(&self) -> Result<Vec<Uuid>, StorageError>;
}

pub fn create_storage(
    storage_type: StorageType,
    path: &Path,
) -> Result<Box<dyn Storage>, StorageError> {
    match storage_type {
        StorageType::Json => Ok(Box::new(JsonStorage::new(path)?)),
        StorageType::Sqlite => Ok(Box::new(SqliteStorage::new(path)?)),
        StorageType::Memory => Ok(Box::new(MemoryStorage::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TodoList;

    fn sample_data() -> SessionData {
        let mut data = SessionData::seeded();
        let mut list = TodoList::new(2, "Errands");
        list.add_todo("Post office").unwrap();
        list.toggle_todo(1, true).unwrap();
        data.lists.push(list);
        data.flash.set_success("The list has been created.");
        data
    }

    fn exercise(storage: &dyn Storage) {
        let id = Uuid::new_v4();
        assert!(storage.load(id).unwrap().is_none());

        let data = sample_data();
        storage.save(id, &data).unwrap();

        let loaded = storage.load(id).unwrap().expect("session should exist");
        assert_eq!(loaded.lists, data.lists);
        assert_eq!(loaded.flash, data.flash);
        assert_eq!(storage.session_ids().unwrap(), vec![id]);

        assert!(storage.remove(id).unwrap());
        assert!(!storage.remove(id).unwrap());
        assert!(storage.load(id).unwrap().is_none());
    }

    #[test]
    fn test_storage_factory() {
        let temp_dir = tempfile::tempdir().unwrap();

        let storage = create_storage(StorageType::Json, &temp_dir.path().join("sessions")).unwrap();
        exercise(&*storage);

        let db_path = temp_dir.path().join("sessions.db");
        let storage = create_storage(StorageType::Sqlite, &db_path).unwrap();
        exercise(&*storage);

        let storage = create_storage(StorageType::Memory, temp_dir.path()).unwrap();
        exercise(&*storage);
    }

    #[test]
    fn test_storage_type_names() {
        for storage_type in [StorageType::Json, StorageType::Sqlite, StorageType::Memory] {
            assert_eq!(StorageType::from_str(storage_type.as_str()), Some(storage_type));
        }
        assert_eq!(StorageType::from_str("redis"), None);
    }
}
