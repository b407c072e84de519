//! In-memory task book.
//!
//! The [`TaskBook`] holds every task in creation order and hands out
//! sequential numeric ids starting at 1. It is the only place the service
//! mutates task data.

use chrono::Utc;
use taskdeck_proto::{NewTask, Task, TaskId, TaskStatus};
use tokio::sync::RwLock;

/// Default maximum title length in characters.
const DEFAULT_MAX_TITLE_LEN: usize = 256;

/// Reasons the book refuses a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookError {
    /// Title was empty after trimming.
    #[error("title is required")]
    TitleEmpty,

    /// Title exceeded the configured length.
    #[error("title exceeds {max} characters")]
    TitleTooLong {
        /// Configured limit.
        max: usize,
    },

    /// No task with the requested id.
    #[error("task {0} not found")]
    NotFound(TaskId),
}

#[derive(Debug)]
struct Entries {
    tasks: Vec<Task>,
    next_id: i64,
}

/// Ordered, thread-safe task storage.
pub struct TaskBook {
    entries: RwLock<Entries>,
    max_title_len: usize,
}

impl Default for TaskBook {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskBook {
    /// Creates an empty book with the default title limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_title_len(DEFAULT_MAX_TITLE_LEN)
    }

    /// Creates an empty book with a custom title limit.
    #[must_use]
    pub fn with_max_title_len(max_title_len: usize) -> Self {
        Self {
            entries: RwLock::new(Entries {
                tasks: Vec::new(),
                next_id: 1,
            }),
            max_title_len,
        }
    }

    /// All tasks in creation order.
    pub async fn list(&self) -> Vec<Task> {
        self.entries.read().await.tasks.clone()
    }

    /// Stores a new pending task and returns it.
    ///
    /// An empty description is stored as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::TitleEmpty`] or [`BookError::TitleTooLong`].
    pub async fn create(&self, new_task: NewTask) -> Result<Task, BookError> {
        if new_task.has_blank_title() {
            return Err(BookError::TitleEmpty);
        }
        if new_task.title.chars().count() > self.max_title_len {
            return Err(BookError::TitleTooLong {
                max: self.max_title_len,
            });
        }

        let mut entries = self.entries.write().await;
        let id = entries.next_id;
        entries.next_id += 1;
        let task = Task {
            id: TaskId::from(id),
            title: new_task.title,
            description: Some(new_task.description).filter(|d| !d.is_empty()),
            status: TaskStatus::Pending,
            created_at: Utc::now().into(),
        };
        entries.tasks.push(task.clone());
        drop(entries);
        Ok(task)
    }

    /// Sets the status of task `id` and returns the updated task.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::NotFound`] if no such task exists.
    pub async fn set_status(&self, id: &TaskId, status: TaskStatus) -> Result<Task, BookError> {
        let mut entries = self.entries.write().await;
        let task = entries
            .tasks
            .iter_mut()
            .find(|t| t.id == *id)
            .ok_or_else(|| BookError::NotFound(id.clone()))?;
        task.status = status;
        Ok(task.clone())
    }

    /// Deletes task `id`.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::NotFound`] if no such task exists.
    pub async fn remove(&self, id: &TaskId) -> Result<(), BookError> {
        let mut entries = self.entries.write().await;
        let index = entries
            .tasks
            .iter()
            .position(|t| t.id == *id)
            .ok_or_else(|| BookError::NotFound(id.clone()))?;
        entries.tasks.remove(index);
        Ok(())
    }

    /// Number of stored tasks.
    pub async fn len(&self) -> usize {
        self.entries.read().await.tasks.len()
    }

    /// Returns `true` if no tasks are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
