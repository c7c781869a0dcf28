use crate::models::{next_id, Notice, TodoError, TodoList};
use crate::validation::list_name_error;
use tracing::debug;

/// Finds a list by id.
pub fn load_list(lists: &[TodoList], id: u64) -> Result<&TodoList, TodoError> {
    lists
        .iter()
        .find(|l| l.id == id)
        .ok_or(TodoError::ListNotFound(id))
}

pub fn load_list_mut(lists: &mut [TodoList], id: u64) -> Result<&mut TodoList, TodoError> {
    lists
        .iter_mut()
        .find(|l| l.id == id)
        .ok_or(TodoError::ListNotFound(id))
}

/// Mutation operations over one session's list collection.
///
/// Every operation either applies completely and returns the success notice,
/// or returns an error and leaves the collection as it was.
pub struct TodoStore<'a> {
    lists: &'a mut Vec<TodoList>,
}

impl<'a> TodoStore<'a> {
    pub fn new(lists: &'a mut Vec<TodoList>) -> Self {
        Self { lists }
    }

    pub fn lists(&self) -> &[TodoList] {
        self.lists.as_slice()
    }

    pub fn load_list(&self, id: u64) -> Result<&TodoList, TodoError> {
        load_list(self.lists.as_slice(), id)
    }

    pub fn create_list(&mut self, name: &str) -> Result<Notice, TodoError> {
        if let Some(message) = list_name_error(name, self.lists.iter()) {
            return Err(TodoError::Validation(message));
        }

        let id = next_id(self.lists.as_slice())?;
        self.lists.push(TodoList::new(id, name));
        debug!(list_id = id, "list created");

        Ok(Notice::success("The list has been created."))
    }

    /// Renames a list. Keeping the current name is not a uniqueness violation.
    pub fn rename_list(&mut self, id: u64, new_name: &str) -> Result<Notice, TodoError> {
        load_list(self.lists.as_slice(), id)?;

        let others = self.lists.iter().filter(|l| l.id != id);
        if let Some(message) = list_name_error(new_name, others) {
            return Err(TodoError::Validation(message));
        }

        let list = load_list_mut(self.lists.as_mut_slice(), id)?;
        list.name = new_name.to_string();
        debug!(list_id = id, "list renamed");

        Ok(Notice::success("The list name has been changed."))
    }

    pub fn delete_list(&mut self, id: u64) -> Result<Notice, TodoError> {
        let position = self
            .lists
            .iter()
            .position(|l| l.id == id)
            .ok_or(TodoError::ListNotFound(id))?;
        let removed = self.lists.remove(position);
        debug!(list_id = id, "list deleted");

        Ok(Notice::success(format!(
            "The list \"{}\" has been removed.",
            removed.name
        )))
    }

    pub fn add_todo(&mut self, list_id: u64, name: &str) -> Result<Notice, TodoError> {
        let list = load_list_mut(self.lists.as_mut_slice(), list_id)?;
        let todo_id = list.add_todo(name)?;
        debug!(list_id, todo_id, "todo added");

        Ok(Notice::success("The todo was added."))
    }

    pub fn toggle_todo(
        &mut self,
        list_id: u64,
        todo_id: u64,
        completed: bool,
    ) -> Result<Notice, TodoError> {
        let list = load_list_mut(self.lists.as_mut_slice(), list_id)?;
        list.toggle_todo(todo_id, completed)?;
        debug!(list_id, todo_id, completed, "todo toggled");

        Ok(Notice::success("The todo has been updated."))
    }

    pub fn toggle_all(&mut self, list_id: u64) -> Result<Notice, TodoError> {
        let list = load_list_mut(self.lists.as_mut_slice(), list_id)?;
        list.toggle_all();
        debug!(list_id, "all todos completed");

        Ok(Notice::success("All todos have been completed."))
    }

    pub fn delete_todo(&mut self, list_id: u64, todo_id: u64) -> Result<Notice, TodoError> {
        let list = load_list_mut(self.lists.as_mut_slice(), list_id)?;
        list.delete_todo(todo_id)?;
        debug!(list_id, todo_id, "todo deleted");

        Ok(Notice::success("The todo has been deleted."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionData;
    use crate::validation::{LIST_NAME_LENGTH_ERROR, LIST_NAME_UNIQUE_ERROR};

    fn sample_lists() -> Vec<TodoList> {
        SessionData::seeded().lists
    }

    #[test]
    fn test_create_list_assigns_next_id() {
        let mut lists = Vec::new();
        let mut store = TodoStore::new(&mut lists);

        let notice = store.create_list("Groceries").unwrap();
        assert_eq!(notice, Notice::success("The list has been created."));
        store.create_list("Work").unwrap();

        assert_eq!(store.lists().len(), 2);
        assert_eq!(lists[0].id, 1);
        assert_eq!(lists[1].id, 2);
        assert!(lists[1].todos.is_empty());
    }

    #[test]
    fn test_create_list_after_gap() {
        let mut lists = vec![TodoList::new(5, "Old")];
        TodoStore::new(&mut lists).create_list("New").unwrap();
        assert_eq!(lists[1].id, 6);
    }

    #[test]
    fn test_create_list_when_ids_are_exhausted() {
        let mut lists = vec![TodoList::new(u64::MAX, "Last")];
        let before = lists.clone();
        assert_eq!(
            TodoStore::new(&mut lists).create_list("New"),
            Err(TodoError::IdsExhausted)
        );
        assert_eq!(lists, before);
    }

    #[test]
    fn test_create_list_validation_leaves_lists_untouched() {
        let mut lists = sample_lists();
        let before = lists.clone();
        let mut store = TodoStore::new(&mut lists);

        assert_eq!(
            store.create_list(""),
            Err(TodoError::Validation(LIST_NAME_LENGTH_ERROR.to_string()))
        );
        assert_eq!(
            store.create_list("Today"),
            Err(TodoError::Validation(LIST_NAME_UNIQUE_ERROR.to_string()))
        );
        assert_eq!(lists, before);
    }

    #[test]
    fn test_rename_list() {
        let mut lists = sample_lists();
        let mut store = TodoStore::new(&mut lists);
        store.create_list("Work").unwrap();

        assert_eq!(
            store.rename_list(1, "Work"),
            Err(TodoError::Validation(LIST_NAME_UNIQUE_ERROR.to_string()))
        );
        assert_eq!(
            store.rename_list(1, "Today").unwrap(),
            Notice::success("The list name has been changed.")
        );
        store.rename_list(1, "Tomorrow").unwrap();
        assert_eq!(store.load_list(1).unwrap().name, "Tomorrow");
        assert_eq!(store.rename_list(42, "Anything"), Err(TodoError::ListNotFound(42)));
    }

    #[test]
    fn test_delete_then_load_is_not_found() {
        let mut lists = sample_lists();
        let mut store = TodoStore::new(&mut lists);

        let notice = store.delete_list(1).unwrap();
        assert_eq!(notice.message, "The list \"Today\" has been removed.");
        assert_eq!(store.load_list(1), Err(TodoError::ListNotFound(1)));
        assert_eq!(store.delete_list(1), Err(TodoError::ListNotFound(1)));
    }

    #[test]
    fn test_todo_operations() {
        let mut lists = vec![TodoList::new(1, "Today")];
        let mut store = TodoStore::new(&mut lists);

        store.add_todo(1, "Buy milk").unwrap();
        store.add_todo(1, "Walk dog").unwrap();
        store.toggle_todo(1, 2, true).unwrap();
        assert_eq!(
            store.toggle_todo(1, 3, true),
            Err(TodoError::TodoNotFound { list_id: 1, todo_id: 3 })
        );
        assert_eq!(store.add_todo(2, "Nope"), Err(TodoError::ListNotFound(2)));

        store.toggle_all(1).unwrap();
        assert!(store.load_list(1).unwrap().todos.iter().all(|t| t.completed));

        store.delete_todo(1, 1).unwrap();
        let list = store.load_list(1).unwrap();
        assert_eq!(list.todos.len(), 1);
        assert_eq!(list.todos[0].name, "Walk dog");
    }
}
