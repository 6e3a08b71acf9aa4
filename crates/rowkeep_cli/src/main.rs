//! Command-line probe for the task store.
//!
//! # Responsibility
//! - Exercise `rowkeep_core` wiring against a real SQLite file or memory db.
//! - Print results as JSON so output stays scriptable.

use clap::{Parser, Subcommand};
use log::error;
use rowkeep_core::{
    init_logging, CoreConfig, CrudOptions, SqliteStore, StorageError, TaskService, TaskStatus,
    Ttl,
};
use serde_json::Value;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "rowkeep", version, about = "Append and read validated rows")]
struct Cli {
    /// Treat tasks older than this many milliseconds as expired.
    #[arg(long, global = true)]
    ttl_ms: Option<i64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the core version.
    Ping,
    /// Append a task from a JSON object.
    AppendTask { json: String },
    /// Read one task by id.
    ReadTask { id: i64 },
    /// List live tasks, optionally filtered by status.
    ListTasks {
        #[arg(long, value_parser = parse_status)]
        status: Option<TaskStatus>,
    },
}

fn parse_status(raw: &str) -> Result<TaskStatus, String> {
    serde_json::from_value(Value::String(raw.to_string())).map_err(|err| err.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<String, String> {
    let config = CoreConfig::from_env().map_err(|err| err.to_string())?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level, log_dir)?;
    }

    let output = match cli.command {
        Command::Ping => format!("rowkeep_core version={}", rowkeep_core::core_version()),
        Command::AppendTask { json } => {
            let payload: Value =
                serde_json::from_str(&json).map_err(|err| format!("invalid JSON payload: {err}"))?;
            let tasks = open_tasks(&config, cli.ttl_ms)?;
            to_json(tasks.append_task(&payload).await)?
        }
        Command::ReadTask { id } => {
            let tasks = open_tasks(&config, cli.ttl_ms)?;
            to_json(tasks.read_task(id).await)?
        }
        Command::ListTasks { status } => {
            let tasks = open_tasks(&config, cli.ttl_ms)?;
            match status {
                Some(status) => to_json(tasks.read_tasks_by_status(status).await)?,
                None => to_json(tasks.read_all_tasks().await)?,
            }
        }
    };
    Ok(output)
}

fn open_tasks(config: &CoreConfig, ttl_ms: Option<i64>) -> Result<TaskService<SqliteStore>, String> {
    let store = match &config.db_path {
        Some(path) => SqliteStore::open(path),
        None => SqliteStore::open_in_memory(),
    }
    .map_err(|err| {
        error!("event=cli_open module=cli status=error error={err}");
        err.to_string()
    })?;

    let mut options = CrudOptions::new();
    if let Some(ttl_ms) = ttl_ms {
        options = options.with_ttl(Ttl::fixed(ttl_ms));
    }
    Ok(TaskService::with_options(store, options))
}

fn to_json<T: serde::Serialize>(outcome: Result<T, StorageError>) -> Result<String, String> {
    let value = outcome.map_err(|err| format!("{}: {err}", err.kind().as_str()))?;
    serde_json::to_string_pretty(&value).map_err(|err| err.to_string())
}
