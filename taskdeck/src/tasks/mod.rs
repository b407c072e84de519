//! Client-side task synchronization.
//!
//! The [`TaskStore`] mirrors the task collection held by the remote
//! service. Local state only ever changes to reflect a confirmed service
//! response; failures are folded into a single user-facing [`SyncError`].

pub mod stats;
pub mod store;

pub use stats::Statistics;
pub use store::{Outcome, SyncSnapshot, TaskDraft, TaskStore};

use std::fmt;

use crate::remote::RemoteError;

/// The store operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Fetching the full task list.
    Fetch,
    /// Creating a task.
    Create,
    /// Changing a task's status.
    Update,
    /// Deleting a task.
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// How an operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The service answered `success: false`.
    Rejected,
    /// The request never produced a logical answer.
    Transport,
}

/// The single user-visible error held by the store.
///
/// Carries no structured code; its `Display` is the banner text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub struct SyncError {
    /// Operation that failed.
    pub operation: Operation,
    /// Failure category.
    pub kind: FailureKind,
}

impl SyncError {
    /// Classifies a remote failure for `operation`.
    #[must_use]
    pub const fn classify(operation: Operation, error: &RemoteError) -> Self {
        let kind = if error.is_transport() {
            FailureKind::Transport
        } else {
            FailureKind::Rejected
        };
        Self { operation, kind }
    }

    /// User-facing message.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match (self.operation, self.kind) {
            (Operation::Fetch, FailureKind::Rejected) => "Failed to fetch tasks",
            (Operation::Fetch, FailureKind::Transport) => "Error connecting to API",
            (Operation::Create, FailureKind::Rejected) => "Failed to create task",
            (Operation::Create, FailureKind::Transport) => "Error creating task",
            (Operation::Update, FailureKind::Rejected) => "Failed to update task",
            (Operation::Update, FailureKind::Transport) => "Error updating task",
            (Operation::Delete, FailureKind::Rejected) => "Failed to delete task",
            (Operation::Delete, FailureKind::Transport) => "Error deleting task",
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}
