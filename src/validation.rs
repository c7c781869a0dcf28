use crate::models::TodoList;

pub const MIN_NAME_LENGTH: usize = 1;
pub const MAX_NAME_LENGTH: usize = 100;

pub const LIST_NAME_LENGTH_ERROR: &str = "List name must be between 1 and 100 characters.";
pub const LIST_NAME_UNIQUE_ERROR: &str = "List name must be unique.";
pub const TODO_NAME_LENGTH_ERROR: &str = "Todo name must be between 1 and 100 characters.";

/// Length in characters, not bytes.
pub fn validate_length(text: &str) -> bool {
    (MIN_NAME_LENGTH..=MAX_NAME_LENGTH).contains(&text.chars().count())
}

/// Returns the message to show for an unusable list name, or `None`.
///
/// The length check wins over the uniqueness check.
pub fn list_name_error<'a, I>(name: &str, existing: I) -> Option<String>
where
    I: IntoIterator<Item = &'a TodoList>,
{
    if !validate_length(name) {
        Some(LIST_NAME_LENGTH_ERROR.to_string())
    } else if existing.into_iter().any(|list| list.name == name) {
        Some(LIST_NAME_UNIQUE_ERROR.to_string())
    } else {
        None
    }
}

pub fn todo_name_error(name: &str) -> Option<String> {
    if validate_length(name) {
        None
    } else {
        Some(TODO_NAME_LENGTH_ERROR.to_string())
    }
}
