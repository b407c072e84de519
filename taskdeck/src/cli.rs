//! Command-line intents.
//!
//! Each [`Command`] maps onto exactly one [`TaskStore`] operation. The store
//! is expected to be opened (initial list done) before a command runs.

use taskdeck_proto::{TaskId, TaskStatus};

use crate::remote::TaskRemote;
use crate::tasks::{Outcome, TaskStore};

/// A single user intent.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show all tasks.
    List,
    /// Create a task.
    Add {
        /// Task title; blank titles are ignored.
        title: String,
        /// Optional description.
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Mark a task completed.
    Done {
        /// Task id as shown by `list`.
        id: TaskId,
    },
    /// Mark a task pending again.
    Reopen {
        /// Task id as shown by `list`.
        id: TaskId,
    },
    /// Flip a task between pending and completed.
    Toggle {
        /// Task id as shown by `list`.
        id: TaskId,
    },
    /// Delete a task.
    Rm {
        /// Task id as shown by `list`.
        id: TaskId,
    },
    /// Show task counts.
    Stats,
}

impl Command {
    /// Whether output should be the statistics line instead of the task list.
    #[must_use]
    pub const fn shows_stats(&self) -> bool {
        matches!(self, Self::Stats)
    }
}

/// Runs `command` against an opened store.
///
/// `List` and `Stats` only read what the initial fetch loaded and report
/// [`Outcome::Skipped`] when nothing new was sent.
pub async fn execute<R: TaskRemote>(store: &TaskStore<R>, command: &Command) -> Outcome {
    match command {
        Command::List | Command::Stats => Outcome::Skipped,
        Command::Add { title, description } => {
            store.set_draft_title(title.as_str());
            store.set_draft_description(description.as_str());
            store.submit_draft().await
        }
        Command::Done { id } => store.set_status(id, TaskStatus::Completed).await,
        Command::Reopen { id } => store.set_status(id, TaskStatus::Pending).await,
        Command::Toggle { id } => store.toggle(id).await,
        Command::Rm { id } => store.remove(id).await,
    }
}
