use anyhow::{bail, Context, Result};
use clap::Parser;
use todo_sessions::cli::{Cli, Command, ConfigCommand, ListCommand, SessionCommand, TodoCommand};
use todo_sessions::config::ConfigManager;
use todo_sessions::handlers::{handle, Request};
use todo_sessions::session::SessionManager;
use todo_sessions::views::render;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_sessions=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = ConfigManager::new(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Command::Config(command) => run_config(&mut config, command),
        Command::Session(command) => {
            let sessions = SessionManager::from_config(&config)?;
            run_session(&sessions, cli.session, command)
        }
        Command::Lists => run_request(&config, cli.session, Request::Lists),
        Command::List(command) => run_request(&config, cli.session, list_request(command)),
        Command::Todo(command) => run_request(&config, cli.session, todo_request(command)),
    }
}

fn list_request(command: ListCommand) -> Request {
    match command {
        ListCommand::New => Request::NewList,
        ListCommand::Create { name } => Request::CreateList { name },
        ListCommand::Show { id } => Request::ShowList { id },
        ListCommand::Edit { id } => Request::EditList { id },
        ListCommand::Rename { id, name } => Request::RenameList { id, name },
        ListCommand::Delete { id } => Request::DeleteList { id },
        ListCommand::CompleteAll { id } => Request::CompleteAll { list_id: id },
    }
}

fn todo_request(command: TodoCommand) -> Request {
    match command {
        TodoCommand::Add { list_id, name } => Request::AddTodo { list_id, name },
        TodoCommand::Check(todo) => Request::ToggleTodo {
            list_id: todo.list_id,
            todo_id: todo.todo_id,
            completed: true,
        },
        TodoCommand::Uncheck(todo) => Request::ToggleTodo {
            list_id: todo.list_id,
            todo_id: todo.todo_id,
            completed: false,
        },
        TodoCommand::Delete(todo) => Request::DeleteTodo {
            list_id: todo.list_id,
            todo_id: todo.todo_id,
        },
    }
}

/// One CLI invocation is one request: open the session, handle, render, save.
fn run_request(config: &ConfigManager, session_id: Option<Uuid>, request: Request) -> Result<()> {
    let sessions = SessionManager::from_config(config)?;
    let mut session = sessions.open(session_id)?;
    if session.is_new {
        println!("Session: {}", session.id);
    }

    let page = handle(request, &mut session.data);
    let output = render(&page, &mut session.data);
    sessions.commit(&mut session)?;

    print!("{output}");
    Ok(())
}

fn run_session(
    sessions: &SessionManager,
    session_id: Option<Uuid>,
    command: SessionCommand,
) -> Result<()> {
    match command {
        SessionCommand::Start => {
            let mut session = sessions.open(None)?;
            sessions.commit(&mut session)?;
            println!("Session: {}", session.id);
        }
        SessionCommand::Show => {
            let Some(id) = session_id else {
                bail!("No session given; pass --session or set TODO_SESSIONS_SESSION");
            };
            let session = sessions.existing(id)?;
            println!("Session: {}", session.id);
            println!("Created: {}", session.data.created_at.to_rfc3339());
            println!("Last access: {}", session.data.last_access.to_rfc3339());
            println!("Lists: {}", session.data.lists.len());
        }
        SessionCommand::End => {
            let Some(id) = session_id else {
                bail!("No session given; pass --session or set TODO_SESSIONS_SESSION");
            };
            sessions.end(id)?;
            println!("Session {id} has ended.");
        }
        SessionCommand::Prune => {
            let removed = sessions.prune()?;
            println!("Removed {removed} expired session(s).");
        }
    }
    Ok(())
}

fn run_config(config: &mut ConfigManager, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Get { key } => match config.get(&key)? {
            Some(value) => println!("{value}"),
            None => println!("{key} is not set"),
        },
        ConfigCommand::Set { key, value } => {
            config.set(&key, &value)?;
            println!("{key} = {value}");
        }
        ConfigCommand::Unset { key } => {
            config.unset(&key)?;
            println!("{key} has been unset");
        }
        ConfigCommand::List => {
            for (key, value, is_default) in config.list() {
                let suffix = if is_default { " (default)" } else { "" };
                println!("{key} = {value}{suffix}");
            }
        }
    }
    Ok(())
}
