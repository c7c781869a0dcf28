use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "todo_sessions", version, about = "Session-backed todo lists")]
pub struct Cli {
    /// Session to act in; a new one is started when omitted or unknown
    #[arg(long, short, global = true, env = "TODO_SESSIONS_SESSION")]
    pub session: Option<Uuid>,

    /// Alternative configuration file
    #[arg(long, global = true, env = "TODO_SESSIONS_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show every list, unfinished ones first
    Lists,
    /// Work with a single list
    #[command(subcommand)]
    List(ListCommand),
    /// Work with the todos of a list
    #[command(subcommand)]
    Todo(TodoCommand),
    /// Start, inspect or end sessions
    #[command(subcommand)]
    Session(SessionCommand),
    /// Read and change configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ListCommand {
    /// Show the new-list form
    New,
    /// Create a list
    Create { name: String },
    /// Show a list and its todos
    Show { id: u64 },
    /// Show the edit form of a list
    Edit { id: u64 },
    /// Rename a list
    Rename { id: u64, name: String },
    /// Delete a list and its todos
    Delete { id: u64 },
    /// Mark every todo of a list as done
    CompleteAll { id: u64 },
}

#[derive(Args, Debug)]
pub struct TodoRef {
    pub list_id: u64,
    pub todo_id: u64,
}

#[derive(Subcommand, Debug)]
pub enum TodoCommand {
    /// Add a todo to a list
    Add { list_id: u64, name: String },
    /// Mark a todo as done
    Check(TodoRef),
    /// Mark a todo as not done
    Uncheck(TodoRef),
    /// Delete a todo
    Delete(TodoRef),
}

#[derive(Subcommand, Debug)]
pub enum SessionCommand {
    /// Start a session and print its id
    Start,
    /// Print the current session's id and timestamps
    Show,
    /// End the current session, discarding its lists
    End,
    /// Remove sessions that outlived the configured lifespan
    Prune,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Get { key: String },
    Set { key: String, value: String },
    Unset { key: String },
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_todo_check() {
        let cli = Cli::try_parse_from(["todo_sessions", "todo", "check", "1", "3"]).unwrap();
        match cli.command {
            Command::Todo(TodoCommand::Check(todo)) => {
                assert_eq!((todo.list_id, todo.todo_id), (1, 3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_session() {
        let id = Uuid::new_v4();
        let cli = Cli::try_parse_from([
            "todo_sessions",
            "list",
            "create",
            "Groceries",
            "--session",
            &id.to_string(),
        ])
        .unwrap();
        assert_eq!(cli.session, Some(id));
        assert!(matches!(
            cli.command,
            Command::List(ListCommand::Create { ref name }) if name == "Groceries"
        ));
    }
}
