use super::{Storage, StorageError};
use crate::models::{Flash, SessionData, TodoItem, TodoList};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

const SCHEMA_VERSION: i32 = 1;

const INIT_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    version INTEGER NOT NULL,
    flash_success TEXT,
    flash_error TEXT,
    created_at TEXT NOT NULL,
    last_access TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS lists (
    session_id TEXT NOT NULL,
    id INTEGER NOT NULL,
    name TEXT NOT NULL,
    position INTEGER NOT NULL,
    PRIMARY KEY (session_id, id),
    FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS todos (
    session_id TEXT NOT NULL,
    list_id INTEGER NOT NULL,
    id INTEGER NOT NULL,
    name TEXT NOT NULL,
    completed BOOLEAN NOT NULL DEFAULT 0,
    position INTEGER NOT NULL,
    PRIMARY KEY (session_id, list_id, id),
    FOREIGN KEY (session_id, list_id) REFERENCES lists(session_id, id) ON DELETE CASCADE
);
"#;

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn new(path: &Path) -> Result<Self, StorageError> {
        let path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).to_string());
        if path.is_dir() {
            return Err(StorageError::Storage(format!(
                "Session database path is a directory: {}",
                path.display()
            )));
        }
        let conn = Connection::open(&path)
            .map_err(|e| StorageError::Storage(format!("Failed to open database: {}", e)))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn get_connection(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StorageError> {
        self.conn
            .lock()
            .map_err(|e| StorageError::Storage(format!("Failed to lock connection: {}", e)))
    }

    fn init_schema(conn: &Connection) -> Result<(), StorageError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(INIT_SCHEMA)
            .map_err(|e| StorageError::Storage(format!("Failed to create tables: {}", e)))?;

        let version: Option<i32> = conn
            .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
            .optional()?;
        match version {
            None => {
                conn.execute(
                    "INSERT INTO schema_version (version) VALUES (?1)",
                    params![SCHEMA_VERSION],
                )?;
            }
            Some(v) if v > SCHEMA_VERSION => {
                return Err(StorageError::Storage(format!(
                    "Database schema version {} is newer than supported version {}",
                    v, SCHEMA_VERSION
                )));
            }
            Some(_) => {}
        }
        Ok(())
    }

    fn parse_timestamp(idx: usize, value: String) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            })
    }

    fn load_lists(conn: &Connection, session_id: &str) -> Result<Vec<TodoList>, StorageError> {
        let mut stmt = conn
            .prepare("SELECT id, name FROM lists WHERE session_id = ?1 ORDER BY position")
            .map_err(|e| StorageError::Storage(format!("Failed to prepare lists query: {}", e)))?;

        let list_iter = stmt
            .query_map(params![session_id], |row| {
                Ok(TodoList::new(row.get(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| StorageError::Storage(format!("Failed to query lists: {}", e)))?;

        let mut lists = Vec::new();
        for list in list_iter {
            let mut list =
                list.map_err(|e| StorageError::Storage(format!("Failed to read list: {}", e)))?;
            list.todos = Self::load_todos(conn, session_id, list.id)?;
            lists.push(list);
        }

        Ok(lists)
    }

    fn load_todos(
        conn: &Connection,
        session_id: &str,
        list_id: u64,
    ) -> Result<Vec<TodoItem>, StorageError> {
        let mut stmt = conn
            .prepare(
                "SELECT id, name, completed FROM todos \
                 WHERE session_id = ?1 AND list_id = ?2 ORDER BY position",
            )
            .map_err(|e| StorageError::Storage(format!("Failed to prepare todos query: {}", e)))?;

        let todo_iter = stmt
            .query_map(params![session_id, list_id], |row| {
                Ok(TodoItem {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    completed: row.get(2)?,
                })
            })
            .map_err(|e| StorageError::Storage(format!("Failed to query todos: {}", e)))?;

        let mut todos = Vec::new();
        for todo in todo_iter {
            let todo =
                todo.map_err(|e| StorageError::Storage(format!("Failed to read todo: {}", e)))?;
            todos.push(todo);
        }

        Ok(todos)
    }
}

impl Storage for SqliteStorage {
    fn load(&self, id: Uuid) -> Result<Option<SessionData>, StorageError> {
        let conn = self.get_connection()?;
        let session_id = id.to_string();

        let row = conn
            .query_row(
                "SELECT version, flash_success, flash_error, created_at, last_access \
                 FROM sessions WHERE id = ?1",
                params![session_id],
                |row| {
                    Ok((
                        row.get::<_, u32>(0)?,
                        Flash {
                            success: row.get(1)?,
                            error: row.get(2)?,
                        },
                        Self::parse_timestamp(3, row.get(3)?)?,
                        Self::parse_timestamp(4, row.get(4)?)?,
                    ))
                },
            )
            .optional()?;

        let Some((version, flash, created_at, last_access)) = row else {
            return Ok(None);
        };

        let data = SessionData {
            version,
            lists: Self::load_lists(&conn, &session_id)?,
            flash,
            created_at,
            last_access,
        };
        data.validate()?;
        Ok(Some(data))
    }

    fn save(&self, id: Uuid, data: &SessionData) -> Result<(), StorageError> {
        data.validate()?;

        let mut conn = self.get_connection()?;
        let session_id = id.to_string();
        let tx = conn.transaction()?;

        // Replace the whole session; the cascade clears lists and todos
        tx.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
        tx.execute(
            "INSERT INTO sessions (id, version, flash_success, flash_error, created_at, last_access) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session_id,
                data.version,
                data.flash.success,
                data.flash.error,
                data.created_at.to_rfc3339(),
                data.last_access.to_rfc3339(),
            ],
        )?;

        for (list_pos, list) in data.lists.iter().enumerate() {
            tx.execute(
                "INSERT INTO lists (session_id, id, name, position) VALUES (?1, ?2, ?3, ?4)",
                params![session_id, list.id, list.name, list_pos],
            )?;
            for (todo_pos, todo) in list.todos.iter().enumerate() {
                tx.execute(
                    "INSERT INTO todos (session_id, list_id, id, name, completed, position) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![session_id, list.id, todo.id, todo.name, todo.completed, todo_pos],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn remove(&self, id: Uuid) -> Result<bool, StorageError> {
        let conn = self.get_connection()?;
        let removed = conn.execute("DELETE FROM sessions WHERE id = ?1", params![id.to_string()])?;
        Ok(removed > 0)
    }

    fn session_ids(&self) -> Result<Vec<Uuid>, StorageError> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare("SELECT id FROM sessions ORDER BY id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut ids = Vec::new();
        for row in rows {
            let raw = row?;
            let id = Uuid::parse_str(&raw)
                .map_err(|e| StorageError::InvalidData(format!("Bad session id {}: {}", raw, e)))?;
            ids.push(id);
        }
        ids.sort();
        Ok(ids)
    }
}
