//! Request handlers: one function per route of the web front end.
//!
//! A handler reads the session's collection, runs one TodoStore operation,
//! leaves a notice in the flash and answers with either a page to render or
//! a location to redirect to.

use crate::models::{SessionData, TodoError};
use crate::todo_store::{load_list, TodoStore};
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Home,
    Lists,
    NewList,
    CreateList { name: String },
    ShowList { id: u64 },
    EditList { id: u64 },
    RenameList { id: u64, name: String },
    DeleteList { id: u64 },
    AddTodo { list_id: u64, name: String },
    ToggleTodo { list_id: u64, todo_id: u64, completed: bool },
    DeleteTodo { list_id: u64, todo_id: u64 },
    CompleteAll { list_id: u64 },
}

impl Request {
    pub fn method(&self) -> &'static str {
        match self {
            Request::Home
            | Request::Lists
            | Request::NewList
            | Request::ShowList { .. }
            | Request::EditList { .. } => "GET",
            _ => "POST",
        }
    }

    pub fn path(&self) -> String {
        match self {
            Request::Home => "/".to_string(),
            Request::Lists | Request::CreateList { .. } => "/lists".to_string(),
            Request::NewList => "/lists/new".to_string(),
            Request::ShowList { id } => format!("/lists/{id}"),
            Request::EditList { id } | Request::RenameList { id, .. } => {
                format!("/lists/{id}/edit")
            }
            Request::DeleteList { id } => format!("/lists/{id}/delete"),
            Request::AddTodo { list_id, .. } => format!("/lists/{list_id}/todos"),
            Request::ToggleTodo { list_id, todo_id, .. } => {
                format!("/lists/{list_id}/todos/{todo_id}")
            }
            Request::DeleteTodo { list_id, todo_id } => {
                format!("/lists/{list_id}/todos/{todo_id}/delete")
            }
            Request::CompleteAll { list_id } => format!("/lists/{list_id}/complete_all"),
        }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Lists,
    List(u64),
}

impl Location {
    pub fn path(self) -> String {
        match self {
            Location::Lists => "/lists".to_string(),
            Location::List(id) => format!("/lists/{id}"),
        }
    }

    /// The GET request a client issues when following this redirect.
    pub fn into_request(self) -> Request {
        match self {
            Location::Lists => Request::Lists,
            Location::List(id) => Request::ShowList { id },
        }
    }
}

/// A page to render. Form pages carry the submitted input so it survives a
/// failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Lists,
    NewList { name: String },
    List { list_id: u64, todo_name: String },
    EditList { list_id: u64, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Render(Page),
    Redirect(Location),
}

/// Runs one request against the session and answers it.
pub fn dispatch(request: Request, session: &mut SessionData) -> Response {
    info!(request = %request, "handling request");

    match request {
        Request::Home => Response::Redirect(Location::Lists),
        Request::Lists => Response::Render(Page::Lists),
        Request::NewList => Response::Render(Page::NewList {
            name: String::new(),
        }),
        Request::CreateList { name } => create_list(session, &name),
        Request::ShowList { id } => with_list(session, id, |_| {
            Response::Render(Page::List {
                list_id: id,
                todo_name: String::new(),
            })
        }),
        Request::EditList { id } => with_list(session, id, |session| {
            let name = load_list(&session.lists, id)
                .map(|l| l.name.clone())
                .unwrap_or_default();
            Response::Render(Page::EditList { list_id: id, name })
        }),
        Request::RenameList { id, name } => rename_list(session, id, &name),
        Request::DeleteList { id } => {
            let result = TodoStore::new(&mut session.lists).delete_list(id);
            finish(session, result, Location::Lists, Location::Lists)
        }
        Request::AddTodo { list_id, name } => add_todo(session, list_id, &name),
        Request::ToggleTodo {
            list_id,
            todo_id,
            completed,
        } => {
            let result =
                TodoStore::new(&mut session.lists).toggle_todo(list_id, todo_id, completed);
            finish(session, result, Location::List(list_id), Location::List(list_id))
        }
        Request::DeleteTodo { list_id, todo_id } => {
            let result = TodoStore::new(&mut session.lists).delete_todo(list_id, todo_id);
            finish(session, result, Location::List(list_id), Location::List(list_id))
        }
        Request::CompleteAll { list_id } => {
            let result = TodoStore::new(&mut session.lists).toggle_all(list_id);
            finish(session, result, Location::List(list_id), Location::List(list_id))
        }
    }
}

/// Dispatches a request and follows redirects until there is a page to render.
pub fn handle(request: Request, session: &mut SessionData) -> Page {
    let mut response = dispatch(request, session);
    loop {
        match response {
            Response::Render(page) => return page,
            Response::Redirect(location) => {
                info!(location = %location.path(), "redirect");
                response = dispatch(location.into_request(), session);
            }
        }
    }
}

fn with_list<F>(session: &mut SessionData, id: u64, render: F) -> Response
where
    F: FnOnce(&SessionData) -> Response,
{
    match load_list(&session.lists, id) {
        Ok(_) => render(session),
        Err(err) => not_found(session, &err, Location::Lists),
    }
}

fn not_found(session: &mut SessionData, err: &TodoError, fallback: Location) -> Response {
    warn!(error = %err, fallback = %fallback.path(), "missing entity");
    session.flash.set_error(err.to_string());
    Response::Redirect(fallback)
}

/// Turns a TodoStore result for a redirect-only route into a response.
fn finish(
    session: &mut SessionData,
    result: Result<crate::models::Notice, TodoError>,
    success: Location,
    todo_fallback: Location,
) -> Response {
    match result {
        Ok(notice) => {
            session.flash.push(notice);
            Response::Redirect(success)
        }
        Err(err @ TodoError::TodoNotFound { .. }) => not_found(session, &err, todo_fallback),
        Err(err @ TodoError::ListNotFound(_)) => not_found(session, &err, Location::Lists),
        Err(TodoError::Validation(message)) => {
            warn!(%message, "rejected input");
            session.flash.set_error(message);
            Response::Redirect(success)
        }
        Err(err @ TodoError::IdsExhausted) => {
            warn!(error = %err, "rejected insertion");
            session.flash.set_error(err.to_string());
            Response::Redirect(success)
        }
    }
}

fn create_list(session: &mut SessionData, name: &str) -> Response {
    let name = name.trim();
    match TodoStore::new(&mut session.lists).create_list(name) {
        Ok(notice) => {
            session.flash.push(notice);
            Response::Redirect(Location::Lists)
        }
        Err(err @ (TodoError::Validation(_) | TodoError::IdsExhausted)) => {
            let message = err.to_string();
            warn!(%message, "rejected list name");
            session.flash.set_error(message);
            Response::Render(Page::NewList {
                name: name.to_string(),
            })
        }
        Err(err) => not_found(session, &err, Location::Lists),
    }
}

fn rename_list(session: &mut SessionData, id: u64, name: &str) -> Response {
    let name = name.trim();
    match TodoStore::new(&mut session.lists).rename_list(id, name) {
        Ok(notice) => {
            session.flash.push(notice);
            Response::Redirect(Location::List(id))
        }
        Err(TodoError::Validation(message)) => {
            warn!(%message, list_id = id, "rejected list name");
            session.flash.set_error(message);
            Response::Render(Page::EditList {
                list_id: id,
                name: name.to_string(),
            })
        }
        Err(err) => not_found(session, &err, Location::Lists),
    }
}

fn add_todo(session: &mut SessionData, list_id: u64, name: &str) -> Response {
    let name = name.trim();
    match TodoStore::new(&mut session.lists).add_todo(list_id, name) {
        Ok(notice) => {
            session.flash.push(notice);
            Response::Redirect(Location::List(list_id))
        }
        Err(err @ (TodoError::Validation(_) | TodoError::IdsExhausted)) => {
            let message = err.to_string();
            warn!(%message, list_id, "rejected todo name");
            session.flash.set_error(message);
            Response::Render(Page::List {
                list_id,
                todo_name: name.to_string(),
            })
        }
        Err(err) => not_found(session, &err, Location::Lists),
    }
}
