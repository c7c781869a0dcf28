use crate::validation::{todo_name_error, validate_length};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Anything that carries a collection-scoped identifier.
pub trait HasId {
    fn id(&self) -> u64;
}

/// Next identifier for a collection: one past the largest id currently held.
///
/// Recomputed on every insertion, so ids of deleted trailing entries may be
/// handed out again but an id still in use never is.
pub fn next_id<T: HasId>(items: &[T]) -> Result<u64, TodoError> {
    match items.iter().map(HasId::id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(TodoError::IdsExhausted),
    }
}

/// Ids are positive, and `u64::MAX` is kept free so `next_id` always has room.
fn is_valid_id(id: u64) -> bool {
    id != 0 && id != u64::MAX
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TodoItem {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub completed: bool,
}

impl TodoItem {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            completed: false,
        }
    }
}

impl HasId for TodoItem {
    fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TodoList {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub todos: Vec<TodoItem>,
}

impl HasId for TodoList {
    fn id(&self) -> u64 {
        self.id
    }
}

impl TodoList {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            todos: Vec::new(),
        }
    }

    pub fn todo(&self, todo_id: u64) -> Option<&TodoItem> {
        self.todos.iter().find(|t| t.id == todo_id)
    }

    /// Appends a new incomplete todo and returns its id.
    pub fn add_todo(&mut self, name: &str) -> Result<u64, TodoError> {
        if let Some(message) = todo_name_error(name) {
            return Err(TodoError::Validation(message));
        }
        let id = next_id(&self.todos)?;
        self.todos.push(TodoItem::new(id, name));
        Ok(id)
    }

    pub fn toggle_todo(&mut self, todo_id: u64, completed: bool) -> Result<(), TodoError> {
        let list_id = self.id;
        let todo = self
            .todos
            .iter_mut()
            .find(|t| t.id == todo_id)
            .ok_or(TodoError::TodoNotFound { list_id, todo_id })?;
        todo.completed = completed;
        Ok(())
    }

    /// Marks every todo completed. Never clears a flag.
    pub fn toggle_all(&mut self) {
        for todo in self.todos.iter_mut() {
            todo.completed = true;
        }
    }

    /// Removes a todo, handing it back to the caller.
    pub fn delete_todo(&mut self, todo_id: u64) -> Result<TodoItem, TodoError> {
        let position = self
            .todos
            .iter()
            .position(|t| t.id == todo_id)
            .ok_or(TodoError::TodoNotFound {
                list_id: self.id,
                todo_id,
            })?;
        Ok(self.todos.remove(position))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TodoError {
    #[error("{0}")]
    Validation(String),
    #[error("The specified list was not found.")]
    ListNotFound(u64),
    #[error("The specified todo was not found.")]
    TodoNotFound { list_id: u64, todo_id: u64 },
    #[error("No more ids are available in this collection.")]
    IdsExhausted,
}

impl TodoError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            TodoError::ListNotFound(_) | TodoError::TodoNotFound { .. }
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A one-shot message for the next rendered page.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Holds at most one success and one error notice between requests.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl Flash {
    pub fn set_success(&mut self, message: impl Into<String>) {
        self.success = Some(message.into());
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn push(&mut self, notice: Notice) {
        match notice.kind {
            NoticeKind::Success => self.set_success(notice.message),
            NoticeKind::Error => self.set_error(notice.message),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.success.is_none() && self.error.is_none()
    }

    /// Returns the pending notices and clears both slots.
    pub fn take(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        if let Some(message) = self.error.take() {
            notices.push(Notice::error(message));
        }
        if let Some(message) = self.success.take() {
            notices.push(Notice::success(message));
        }
        notices
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionData {
    pub version: u32, // Payload version for future migrations
    #[serde(default)]
    pub lists: Vec<TodoList>,
    #[serde(default)]
    pub flash: Flash,
    pub created_at: DateTime<Utc>,
    pub last_access: DateTime<Utc>,
}

impl Default for SessionData {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionData {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            version: 1,
            lists: Vec::new(),
            flash: Flash::default(),
            created_at: now,
            last_access: now,
        }
    }

    /// The collection every new session starts with.
    pub fn seeded() -> Self {
        let mut today = TodoList::new(1, "Today");
        for (id, name) in (1..).zip(["Run away", "Dance on a dragon", "Fly into the kraken"]) {
            today.todos.push(TodoItem::new(id, name));
        }
        Self {
            lists: vec![today],
            ..Self::new()
        }
    }

    pub fn touch(&mut self) {
        self.last_access = Utc::now();
    }

    pub fn validate(&self) -> Result<(), StorageError> {
        let mut names = HashSet::new();
        let mut list_ids = HashSet::new();
        for list in &self.lists {
            if !is_valid_id(list.id) {
                return Err(StorageError::InvalidData(format!("invalid list id {}", list.id)));
            }
            if !list_ids.insert(list.id) {
                return Err(StorageError::InvalidData(format!(
                    "duplicate list id {}",
                    list.id
                )));
            }
            if !names.insert(list.name.as_str()) {
                return Err(StorageError::DuplicateList(list.name.clone()));
            }
            if !validate_length(&list.name) {
                return Err(StorageError::InvalidData(format!(
                    "list {} has an invalid name length",
                    list.id
                )));
            }

            let mut todo_ids = HashSet::new();
            for todo in &list.todos {
                if !is_valid_id(todo.id) {
                    return Err(StorageError::InvalidData(format!(
                        "invalid todo id {} in list {}",
                        todo.id, list.id
                    )));
                }
                if !todo_ids.insert(todo.id) {
                    return Err(StorageError::InvalidData(format!(
                        "duplicate todo id {} in list {}",
                        todo.id, list.id
                    )));
                }
                if !validate_length(&todo.name) {
                    return Err(StorageError::InvalidData(format!(
                        "todo {} in list {} has an invalid name length",
                        todo.id, list.id
                    )));
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Duplicate list name: {0}")]
    DuplicateList(String),
}
