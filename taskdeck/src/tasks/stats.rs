//! Derived task counts.

use taskdeck_proto::{Task, TaskStatus};

/// Counts derived from a task collection. Computed on demand, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Number of tasks.
    pub total: usize,
    /// Tasks with status `pending`.
    pub pending: usize,
    /// Tasks with status `completed`.
    pub completed: usize,
}

impl Statistics {
    /// Counts `tasks` by status.
    #[must_use]
    pub fn from_tasks(tasks: &[Task]) -> Self {
        tasks.iter().fold(Self::default(), |mut acc, task| {
            acc.total += 1;
            match task.status {
                TaskStatus::Pending => acc.pending += 1,
                TaskStatus::Completed => acc.completed += 1,
            }
            acc
        })
    }
}
