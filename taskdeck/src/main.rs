//! `taskdeck` -- command-line task list backed by a task-storage service.
//!
//! Every invocation fetches the current list, runs one command, and prints
//! the result. Configuration via CLI flags, environment variables, or
//! config file (`~/.config/taskdeck/config.toml`).
//!
//! ```bash
//! taskdeck --api-url http://127.0.0.1:8080 add "Buy milk" -d "two litres"
//! TASKDECK_API_URL=http://127.0.0.1:8080 taskdeck done 1
//! ```

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use taskdeck::cli::{self, Command};
use taskdeck::config::{CliArgs, ClientConfig};
use taskdeck::remote::HttpRemote;
use taskdeck::render;
use taskdeck::tasks::TaskStore;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Logs go to a file so stdout carries only command output.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(base_url = %config.base_url, "taskdeck starting");

    let remote = match HttpRemote::new(&config.to_remote_settings()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let store = TaskStore::open(remote).await;
    let command = cli.command.unwrap_or(Command::List);
    let outcome = cli::execute(&store, &command).await;
    tracing::debug!(?command, ?outcome, "command finished");

    let snapshot = store.snapshot();
    if command.shows_stats() {
        println!("{}", render::statistics_line(&snapshot.statistics()));
    } else {
        println!("{}", render::task_list(&snapshot));
    }

    match render::error_banner(&snapshot) {
        Some(banner) => {
            eprintln!("{banner}");
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown so buffered
/// log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskdeck.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}
