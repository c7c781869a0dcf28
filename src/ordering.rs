//! Display ordering: unfinished entries first, finished entries last.
//!
//! Both helpers keep the relative order inside each group and pair every
//! entry with its position in the stored collection, which is what links and
//! edit forms refer to.

use crate::models::{TodoItem, TodoList};

pub fn is_list_completed(list: &TodoList) -> bool {
    !list.todos.is_empty() && list.todos.iter().all(|t| t.completed)
}

pub fn count_completed(list: &TodoList) -> usize {
    list.todos.iter().filter(|t| t.completed).count()
}

pub fn todos_remaining_count(list: &TodoList) -> usize {
    list.todos.len() - count_completed(list)
}

/// CSS-style class name for a list row.
pub fn list_class(list: &TodoList) -> &'static str {
    if is_list_completed(list) {
        "complete"
    } else {
        ""
    }
}

fn partition_by<T, F>(items: &[T], is_done: F) -> Vec<(&T, usize)>
where
    F: Fn(&T) -> bool,
{
    let (done, pending): (Vec<_>, Vec<_>) = items
        .iter()
        .enumerate()
        .map(|(index, item)| (item, index))
        .partition(|(item, _)| is_done(*item));

    pending.into_iter().chain(done).collect()
}

pub fn sort_lists(lists: &[TodoList]) -> Vec<(&TodoList, usize)> {
    partition_by(lists, is_list_completed)
}

pub fn sort_todos(todos: &[TodoItem]) -> Vec<(&TodoItem, usize)> {
    partition_by(todos, |todo| todo.completed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: u64, completed: bool) -> TodoItem {
        TodoItem {
            id,
            name: format!("todo {id}"),
            completed,
        }
    }

    fn ids<T: crate::models::HasId>(sorted: &[(&T, usize)]) -> Vec<(u64, usize)> {
        sorted.iter().map(|(item, index)| (item.id(), *index)).collect()
    }

    #[test]
    fn test_sort_todos_moves_completed_last() {
        let todos = vec![todo(1, true), todo(2, false)];
        assert_eq!(ids(&sort_todos(&todos)), vec![(2, 1), (1, 0)]);
    }

    #[test]
    fn test_sort_todos_is_stable() {
        let todos = vec![
            todo(1, true),
            todo(2, false),
            todo(3, true),
            todo(4, false),
        ];
        assert_eq!(
            ids(&sort_todos(&todos)),
            vec![(2, 1), (4, 3), (1, 0), (3, 2)]
        );
    }

    #[test]
    fn test_sort_lists_treats_empty_as_incomplete() {
        let mut done = TodoList::new(1, "Done");
        done.todos.push(todo(1, true));
        let empty = TodoList::new(2, "Empty");
        let mut open = TodoList::new(3, "Open");
        open.todos.push(todo(1, false));

        let lists = vec![done, empty, open];
        assert_eq!(ids(&sort_lists(&lists)), vec![(2, 1), (3, 2), (1, 0)]);
    }

    #[test]
    fn test_completion_helpers() {
        let mut list = TodoList::new(1, "Today");
        assert!(!is_list_completed(&list));
        assert_eq!(list_class(&list), "");

        list.todos.push(todo(1, true));
        list.todos.push(todo(2, false));
        assert_eq!(count_completed(&list), 1);
        assert_eq!(todos_remaining_count(&list), 1);
        assert!(!is_list_completed(&list));

        list.toggle_all();
        assert!(is_list_completed(&list));
        assert_eq!(list_class(&list), "complete");
        assert_eq!(todos_remaining_count(&list), 0);
    }
}
