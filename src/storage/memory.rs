use super::{Storage, StorageError};
use crate::models::SessionData;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Sessions that live only as long as the process.
#[derive(Default)]
pub struct MemoryStorage {
    sessions: Mutex<HashMap<Uuid, SessionData>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, SessionData>>, StorageError> {
        self.sessions
            .lock()
            .map_err(|e| StorageError::Storage(format!("Failed to lock sessions: {}", e)))
    }
}

impl Storage for MemoryStorage {
    fn load(&self, id: Uuid) -> Result<Option<SessionData>, StorageError> {
        Ok(self.sessions()?.get(&id).cloned())
    }

    fn save(&self, id: Uuid, data: &SessionData) -> Result<(), StorageError> {
        data.validate()?;
        self.sessions()?.insert(id, data.clone());
        Ok(())
    }

    fn remove(&self, id: Uuid) -> Result<bool, StorageError> {
        Ok(self.sessions()?.remove(&id).is_some())
    }

    fn session_ids(&self) -> Result<Vec<Uuid>, StorageError> {
        let mut ids: Vec<Uuid> = self.sessions()?.keys().copied().collect();
        ids.sort();
        Ok(ids)
    }
}
