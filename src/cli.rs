use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::client::{ClientError, TaskClient};
use crate::config::Config;
use crate::database::{Database, DatabaseError};
use crate::models::{NewTask, Task};
use crate::service::TaskService;
use crate::status::{validate_due, StatusError};

#[derive(Parser)]
#[command(name = "ontrack")]
#[command(about = "Task tracking with on-time/late completion status")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the HTTP task service
    Serve {
        /// Address to bind, overrides `listen` from the config file
        #[arg(long)]
        listen: Option<String>,
    },
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Add a task through the service
    Add {
        /// What needs doing
        description: String,
        #[arg(long)]
        category: String,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Due time (HH:MM, UTC)
        #[arg(long)]
        time: String,
    },
    /// List tasks in insertion order
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Mark a task completed now
    Complete { id: String },
    /// Delete a task
    Delete { id: String },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DatabaseError),
    #[error("Request failed: {0}")]
    ClientError(#[from] ClientError),
    #[error("{0}")]
    InvalidInput(#[from] StatusError),
    #[error("Invalid listen address '{0}'")]
    InvalidAddress(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Open the store and serve the task API until the process is stopped
pub async fn handle_serve(config: &Config, listen: Option<String>) -> Result<(), CliError> {
    let listen = listen.unwrap_or_else(|| config.listen.clone());
    let addr: SocketAddr = listen
        .parse()
        .map_err(|_| CliError::InvalidAddress(listen.clone()))?;

    let db_path = config.get_database_path();
    tracing::info!(path = %db_path.display(), "opening task store");
    let db = Database::new(&db_path.to_string_lossy())?;

    crate::server::serve(Arc::new(TaskService::new(db)), addr).await?;
    Ok(())
}

/// Handle the add command
pub async fn handle_add(client: &TaskClient, input: NewTask, out: &mut impl Write) -> Result<(), CliError> {
    // Fail fast on obviously bad input instead of a round-trip
    validate_due(&input.date, &input.time)?;

    let task = client.create(&input).await?;
    writeln!(out, "Task created successfully (ID: {})", task.id)?;
    Ok(())
}

/// Handle the list command
pub async fn handle_list(client: &TaskClient, category: Option<&str>, out: &mut impl Write) -> Result<(), CliError> {
    let tasks = client.list(category).await?;
    if tasks.is_empty() {
        writeln!(out, "No tasks")?;
    }
    for task in &tasks {
        writeln!(out, "{}", format_task_line(task))?;
    }
    Ok(())
}

/// Handle the complete command
pub async fn handle_complete(client: &TaskClient, id: &str, out: &mut impl Write) -> Result<(), CliError> {
    let task = client.complete(id).await?;
    writeln!(out, "Task {} completed: {}", task.id, task.status)?;
    Ok(())
}

/// Handle the delete command
pub async fn handle_delete(client: &TaskClient, id: &str, out: &mut impl Write) -> Result<(), CliError> {
    let task = client.delete(id).await?;
    writeln!(out, "Task deleted: {}", task.description)?;
    Ok(())
}

/// One tab-separated line per task: id, due, category, status, description
pub fn format_task_line(task: &Task) -> String {
    format!(
        "{}\t{} {}\t{}\t{}\t{}",
        task.id, task.date, task.time, task.category, task.status, task.description
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn task_json(id: &str) -> serde_json::Value {
        json!({
            "_id": id,
            "description": "Write report",
            "category": "work",
            "date": "2024-01-01",
            "time": "09:00",
            "completed": false,
            "completedAt": null,
            "status": "Incomplete"
        })
    }

    fn input(time: &str) -> NewTask {
        NewTask {
            description: "Write report".to_string(),
            category: "work".to_string(),
            date: "2024-01-01".to_string(),
            time: time.to_string(),
        }
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from([
            "ontrack", "--dev", "add", "Write report", "--category", "work", "--date", "2024-01-01", "--time", "09:00",
        ])
        .unwrap();
        assert!(cli.dev);
        assert_eq!(
            cli.command,
            Some(Commands::Add {
                description: "Write report".to_string(),
                category: "work".to_string(),
                date: "2024-01-01".to_string(),
                time: "09:00".to_string(),
            })
        );

        let cli = Cli::try_parse_from(["ontrack"]).unwrap();
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["ontrack", "serve", "--listen", "0.0.0.0:8080"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Serve { listen: Some("0.0.0.0:8080".to_string()) }));
    }

    #[test]
    fn add_requires_all_fields() {
        assert!(Cli::try_parse_from(["ontrack", "add", "x", "--category", "c"]).is_err());
    }

    #[tokio::test]
    async fn add_posts_and_prints_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/tasks"))
            .and(body_partial_json(json!({"category": "work"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(task_json("abc")))
            .expect(1)
            .mount(&server)
            .await;

        let mut out = Vec::new();
        handle_add(&TaskClient::new(server.uri()), input("09:00"), &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Task created successfully (ID: abc)\n");
    }

    #[tokio::test]
    async fn add_rejects_bad_time_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(201)).expect(0).mount(&server).await;

        let mut out = Vec::new();
        let result = handle_add(&TaskClient::new(server.uri()), input("9am"), &mut out).await;
        assert!(matches!(result, Err(CliError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn list_filters_by_category() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks"))
            .and(query_param("category", "work"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([task_json("abc")])))
            .mount(&server)
            .await;

        let mut out = Vec::new();
        handle_list(&TaskClient::new(server.uri()), Some("work"), &mut out).await.unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "abc\t2024-01-01 09:00\twork\tIncomplete\tWrite report\n"
        );
    }

    #[tokio::test]
    async fn delete_unknown_task_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/tasks/nope"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"code": "NOT_FOUND", "message": "task 'nope' not found"})),
            )
            .mount(&server)
            .await;

        let mut out = Vec::new();
        let result = handle_delete(&TaskClient::new(server.uri()), "nope", &mut out).await;
        match result {
            Err(CliError::ClientError(e)) => assert!(e.is_not_found()),
            other => panic!("expected not found, got {:?}", other.map(|_| ())),
        }
    }
}
