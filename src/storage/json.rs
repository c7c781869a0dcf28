use super::{Storage, StorageError};
use crate::models::SessionData;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One pretty-printed `<session id>.json` file per session.
pub struct JsonStorage {
    dir: PathBuf,
}

impl JsonStorage {
    pub fn new(dir: &Path) -> Result<Self, StorageError> {
        let dir = PathBuf::from(shellexpand::tilde(&dir.to_string_lossy()).to_string());
        if dir.exists() && !dir.is_dir() {
            return Err(StorageError::Storage(format!(
                "Session directory is a file: {}",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    fn session_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }
}

impl Storage for JsonStorage {
    fn load(&self, id: Uuid) -> Result<Option<SessionData>, StorageError> {
        let path = self.session_path(id);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)?;
        if contents.trim().is_empty() {
            return Ok(None);
        }

        let data: SessionData = serde_json::from_str(&contents)?;
        data.validate()?;
        Ok(Some(data))
    }

    fn save(&self, id: Uuid, data: &SessionData) -> Result<(), StorageError> {
        // Validate data before saving
        data.validate()?;

        std::fs::create_dir_all(&self.dir)?;

        let path = self.session_path(id);
        let json = serde_json::to_string_pretty(data)?;
        std::fs::write(&path, json)?;

        // Verify the write was successful by reading back
        let contents = std::fs::read_to_string(&path)?;
        let read_data: SessionData = serde_json::from_str(&contents)?;
        if read_data.lists.len() != data.lists.len() {
            return Err(StorageError::Storage(
                "Data integrity check failed".to_string(),
            ));
        }

        Ok(())
    }

    fn remove(&self, id: Uuid) -> Result<bool, StorageError> {
        let path = self.session_path(id);
        if !path.exists() {
            return Ok(false);
        }
        std::fs::remove_file(path)?;
        Ok(true)
    }

    fn session_ids(&self) -> Result<Vec<Uuid>, StorageError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| Uuid::parse_str(s).ok())
            {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TodoList;

    #[test]
    fn test_json_storage_creates_directory_on_save() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("nested").join("sessions");
        let storage = JsonStorage::new(&dir).unwrap();

        let id = Uuid::new_v4();
        storage.save(id, &SessionData::seeded()).unwrap();
        assert!(dir.join(format!("{id}.json")).exists());
    }

    #[test]
    fn test_json_storage_ignores_foreign_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), "hello").unwrap();
        std::fs::write(temp_dir.path().join("not-a-uuid.json"), "{}").unwrap();

        let storage = JsonStorage::new(temp_dir.path()).unwrap();
        assert!(storage.session_ids().unwrap().is_empty());
    }

    #[test]
    fn test_json_storage_empty_file_is_absent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let id = Uuid::new_v4();
        std::fs::write(temp_dir.path().join(format!("{id}.json")), "  ").unwrap();

        let storage = JsonStorage::new(temp_dir.path()).unwrap();
        assert!(storage.load(id).unwrap().is_none());
    }

    #[test]
    fn test_json_storage_rejects_file_path() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        assert!(JsonStorage::new(temp_file.path()).is_err());
    }

    #[test]
    fn test_json_storage_rejects_invalid_payload() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(temp_dir.path()).unwrap();

        let mut data = SessionData::seeded();
        data.lists.push(data.lists[0].clone());
        assert!(storage.save(Uuid::new_v4(), &data).is_err());
    }

    #[test]
    fn test_json_storage_rejects_out_of_range_ids() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = JsonStorage::new(temp_dir.path()).unwrap();

        let mut data = SessionData::new();
        data.lists.push(TodoList::new(u64::MAX, "Last"));
        data.lists.push(TodoList::new(0, "Zero"));
        let id = Uuid::new_v4();
        assert!(matches!(storage.save(id, &data), Err(StorageError::InvalidData(_))));

        // A hand-edited file never reaches the store
        let json = serde_json::to_string(&data).unwrap();
        std::fs::write(temp_dir.path().join(format!("{id}.json")), json).unwrap();
        assert!(matches!(storage.load(id), Err(StorageError::InvalidData(_))));
    }
}
