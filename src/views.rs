//! Plain-text rendering of pages.

use crate::handlers::Page;
use crate::models::{Flash, NoticeKind, SessionData, TodoList};
use crate::ordering::{is_list_completed, sort_lists, sort_todos, todos_remaining_count};
use crate::todo_store::load_list;
use std::fmt::Write;

/// Renders `page` and consumes any pending notices.
pub fn render(page: &Page, session: &mut SessionData) -> String {
    let mut out = String::new();
    render_flash(&mut out, &mut session.flash);

    match page {
        Page::Lists => render_lists(&mut out, &session.lists),
        Page::NewList { name } => render_form(&mut out, "Enter the name for your new list:", name),
        Page::List { list_id, todo_name } => match load_list(&session.lists, *list_id) {
            Ok(list) => render_list(&mut out, list, todo_name),
            Err(err) => {
                let _ = writeln!(out, "{err}");
            }
        },
        Page::EditList { list_id, name } => {
            let heading = match load_list(&session.lists, *list_id) {
                Ok(list) => format!("Editing '{}'", list.name),
                Err(_) => "Editing list".to_string(),
            };
            render_form(&mut out, &heading, name);
        }
    }

    out
}

fn render_flash(out: &mut String, flash: &mut Flash) {
    for notice in flash.take() {
        let label = match notice.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
        };
        let _ = writeln!(out, "[{label}] {}", notice.message);
    }
}

fn render_lists(out: &mut String, lists: &[TodoList]) {
    if lists.is_empty() {
        let _ = writeln!(out, "No lists yet.");
        return;
    }

    for (list, _index) in sort_lists(lists) {
        let marker = if is_list_completed(list) { " [done]" } else { "" };
        let _ = writeln!(
            out,
            "{:>3}  {}  ({}/{}){}",
            list.id,
            list.name,
            todos_remaining_count(list),
            list.todos.len(),
            marker
        );
    }
}

fn render_list(out: &mut String, list: &TodoList, todo_name: &str) {
    let _ = writeln!(out, "{}", list.name);
    if list.todos.is_empty() {
        let _ = writeln!(out, "  (no todos)");
    }
    for (todo, _index) in sort_todos(&list.todos) {
        let check = if todo.completed { 'x' } else { ' ' };
        let _ = writeln!(out, "  [{check}] {:>3}  {}", todo.id, todo.name);
    }
    if !todo_name.is_empty() {
        let _ = writeln!(out, "New todo: {todo_name}");
    }
}

fn render_form(out: &mut String, heading: &str, value: &str) {
    let _ = writeln!(out, "{heading}");
    let _ = writeln!(out, "> {value}");
}
