//! Session-backed todo lists: named lists of todos kept per visitor session,
//! with the validation, id allocation and display-ordering rules the request
//! handlers rely on.

pub mod cli;
pub mod config;
pub mod handlers;
pub mod models;
pub mod ordering;
pub mod session;
pub mod storage;
pub mod todo_store;
pub mod validation;
pub mod views;

pub use models::{Flash, Notice, SessionData, TodoError, TodoItem, TodoList};
pub use todo_store::{load_list, TodoStore};
