//! Per-session context: the list collection and flash notices of one visitor.
//!
//! A session is created on first access, saved after every request and
//! discarded when it ends, either explicitly or by outliving the configured
//! lifespan.

use crate::config::ConfigManager;
use crate::models::{SessionData, StorageError};
use crate::storage::config::StorageConfig;
use crate::storage::{create_storage, Storage};
use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Session not found: {0}")]
    NotFound(Uuid),
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub data: SessionData,
    /// Whether this request started the session.
    pub is_new: bool,
}

pub struct SessionManager {
    storage: Box<dyn Storage>,
    lifespan: Option<Duration>,
    seed_default_list: bool,
}

impl SessionManager {
    pub fn new(storage: Box<dyn Storage>) -> Self {
        Self {
            storage,
            lifespan: None,
            seed_default_list: true,
        }
    }

    /// Builds the manager for the storage backend and lifespan in `config`.
    pub fn from_config(config: &ConfigManager) -> Result<Self, SessionError> {
        let storage_config = StorageConfig::from_config_manager(config);
        debug!(
            storage_type = storage_config.storage_type.as_str(),
            path = %storage_config.storage_path.display(),
            "opening session storage"
        );
        let storage = create_storage(storage_config.storage_type, &storage_config.storage_path)?;
        Ok(Self::new(storage)
            .with_lifespan(config.session_lifespan())
            .with_seed_default_list(config.seed_default_list()))
    }

    pub fn with_lifespan(mut self, lifespan: Option<Duration>) -> Self {
        self.lifespan = lifespan;
        self
    }

    pub fn with_seed_default_list(mut self, seed: bool) -> Self {
        self.seed_default_list = seed;
        self
    }

    fn is_expired(&self, data: &SessionData) -> bool {
        self.lifespan
            .is_some_and(|lifespan| Utc::now() - data.last_access > lifespan)
    }

    fn fresh(&self) -> Session {
        let data = if self.seed_default_list {
            SessionData::seeded()
        } else {
            SessionData::new()
        };
        let id = Uuid::new_v4();
        info!(session = %id, "session started");
        Session {
            id,
            data,
            is_new: true,
        }
    }

    /// Loads the session with `id`, or starts a new one when there is no id,
    /// no such session, or the stored session has expired.
    pub fn open(&self, id: Option<Uuid>) -> Result<Session, SessionError> {
        let Some(id) = id else {
            return Ok(self.fresh());
        };

        match self.storage.load(id)? {
            Some(data) if self.is_expired(&data) => {
                info!(session = %id, "session expired");
                self.storage.remove(id)?;
                Ok(self.fresh())
            }
            Some(data) => {
                debug!(session = %id, lists = data.lists.len(), "session loaded");
                Ok(Session {
                    id,
                    data,
                    is_new: false,
                })
            }
            None => Ok(self.fresh()),
        }
    }

    /// Like [`open`](Self::open) but never starts a new session.
    pub fn existing(&self, id: Uuid) -> Result<Session, SessionError> {
        match self.storage.load(id)? {
            Some(data) if !self.is_expired(&data) => Ok(Session {
                id,
                data,
                is_new: false,
            }),
            _ => Err(SessionError::NotFound(id)),
        }
    }

    pub fn commit(&self, session: &mut Session) -> Result<(), SessionError> {
        session.data.touch();
        self.storage.save(session.id, &session.data)?;
        session.is_new = false;
        debug!(session = %session.id, "session saved");
        Ok(())
    }

    pub fn end(&self, id: Uuid) -> Result<(), SessionError> {
        if !self.storage.remove(id)? {
            return Err(SessionError::NotFound(id));
        }
        info!(session = %id, "session ended");
        Ok(())
    }

    /// Removes every expired session and returns how many were dropped.
    pub fn prune(&self) -> Result<usize, SessionError> {
        if self.lifespan.is_none() {
            return Ok(0);
        }

        let mut removed = 0;
        for id in self.storage.session_ids()? {
            if let Some(data) = self.storage.load(id)? {
                if self.is_expired(&data) && self.storage.remove(id)? {
                    removed += 1;
                }
            }
        }
        info!(removed, "expired sessions pruned");
        Ok(removed)
    }
}
