//! Task synchronization store.
//!
//! [`TaskStore`] owns the local copy of the task collection, a busy flag
//! for collection-level requests (list and create), the single current
//! [`SyncError`], and the create-form draft. Each operation is one round
//! trip: optional local validation, a remote call, then reconciliation of
//! local state against the answer.
//!
//! Local state never runs ahead of the service. Nothing is inserted,
//! changed, or removed until the service confirms it.
//!
//! # Concurrency
//!
//! Operations take `&self` and may overlap freely on a shared store. State
//! is touched only in short synchronous sections before and after each
//! remote call, never across an `.await`. Overlapping operations are not
//! ordered: each completion reconciles against whatever the collection
//! holds at that moment, and the last completion to touch a task wins.

use taskdeck_proto::{NewTask, Task, TaskId, TaskStatus};
use tokio::sync::watch;

use super::{Operation, Statistics, SyncError};
use crate::remote::{RemoteError, TaskRemote};

/// Title and description typed into the create form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    /// Draft title, untrimmed.
    pub title: String,
    /// Draft description; empty when left blank.
    pub description: String,
}

impl TaskDraft {
    /// Returns `true` if submitting this draft would be a no-op.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
    }

    fn clear(&mut self) {
        self.title.clear();
        self.description.clear();
    }
}

/// Everything a presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncSnapshot {
    /// Tasks in service order.
    pub tasks: Vec<Task>,
    /// Current error banner, if any.
    pub last_error: Option<SyncError>,
    /// Create-form draft.
    pub draft: TaskDraft,
    /// Outstanding list/create requests.
    in_flight: usize,
}

impl SyncSnapshot {
    /// `true` while at least one list or create request is outstanding.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Counts derived from `tasks`.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        Statistics::from_tasks(&self.tasks)
    }
}

/// Result of a store operation, mirrored in the store's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The service confirmed the change and local state was reconciled.
    Applied,
    /// Nothing was sent (blank title, unknown task for a toggle).
    Skipped,
    /// The operation failed; the error is also in `last_error`.
    Failed(SyncError),
}

impl Outcome {
    /// Returns `true` for [`Outcome::Applied`].
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Marks a list/create request as outstanding for as long as it lives.
///
/// Dropping the guard clears the mark on every exit path, including when
/// the request future itself is dropped mid-flight.
struct BusyGuard<'a> {
    state: &'a watch::Sender<SyncSnapshot>,
}

impl<'a> BusyGuard<'a> {
    fn enter(state: &'a watch::Sender<SyncSnapshot>) -> Self {
        state.send_modify(|s| s.in_flight += 1);
        Self { state }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.state
            .send_modify(|s| s.in_flight = s.in_flight.saturating_sub(1));
    }
}

/// Single source of truth for the local task collection.
pub struct TaskStore<R> {
    remote: R,
    state: watch::Sender<SyncSnapshot>,
}

impl<R: TaskRemote> TaskStore<R> {
    /// Creates a store with an empty collection without contacting the
    /// service. Most callers want [`open`](Self::open).
    #[must_use]
    pub fn new(remote: R) -> Self {
        Self {
            remote,
            state: watch::Sender::new(SyncSnapshot::default()),
        }
    }

    /// Creates a store and performs the initial [`list`](Self::list).
    ///
    /// A failed initial fetch leaves the store usable with an empty
    /// collection and the error in `last_error`.
    pub async fn open(remote: R) -> Self {
        let store = Self::new(remote);
        let outcome = store.list().await;
        tracing::info!(?outcome, "task store opened");
        store
    }

    /// The remote this store talks to.
    pub const fn remote(&self) -> &R {
        &self.remote
    }

    // -- Reads --------------------------------------------------------------

    /// Copy of the full observable state.
    #[must_use]
    pub fn snapshot(&self) -> SyncSnapshot {
        self.state.borrow().clone()
    }

    /// Receiver notified on every observable state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.state.subscribe()
    }

    /// Tasks in service order.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.state.borrow().tasks.clone()
    }

    /// The task with `id`, if held locally.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.state.borrow().tasks.iter().find(|t| t.id == *id).cloned()
    }

    /// `true` while a list or create request is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_busy()
    }

    /// The current error banner.
    #[must_use]
    pub fn last_error(&self) -> Option<SyncError> {
        self.state.borrow().last_error
    }

    /// Counts recomputed from the current collection.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        Statistics::from_tasks(&self.state.borrow().tasks)
    }

    /// The create-form draft.
    #[must_use]
    pub fn draft(&self) -> TaskDraft {
        self.state.borrow().draft.clone()
    }

    // -- Local edits ----------------------------------------------------------

    /// Replaces the draft title.
    pub fn set_draft_title(&self, title: impl Into<String>) {
        let title = title.into();
        self.state.send_if_modified(|s| {
            if s.draft.title == title {
                return false;
            }
            s.draft.title = title;
            true
        });
    }

    /// Replaces the draft description.
    pub fn set_draft_description(&self, description: impl Into<String>) {
        let description = description.into();
        self.state.send_if_modified(|s| {
            if s.draft.description == description {
                return false;
            }
            s.draft.description = description;
            true
        });
    }

    /// Clears the error banner. Never retries the failed operation.
    pub fn dismiss_error(&self) {
        self.state.send_if_modified(|s| s.last_error.take().is_some());
    }

    // -- Remote operations ----------------------------------------------------

    /// Replaces the local collection with the service's.
    pub async fn list(&self) -> Outcome {
        let _busy = BusyGuard::enter(&self.state);
        tracing::debug!("fetching tasks");

        match self.remote.list().await {
            Ok(tasks) => {
                tracing::info!(count = tasks.len(), "task list refreshed");
                self.state.send_modify(|s| {
                    s.tasks = tasks;
                    s.last_error = None;
                });
                Outcome::Applied
            }
            Err(e) => self.fail(Operation::Fetch, None, &e),
        }
    }

    /// Creates a task and appends the service's copy.
    ///
    /// A title that is blank after trimming is ignored: no request is sent
    /// and no state changes. On success the draft is cleared.
    pub async fn create(&self, title: &str, description: &str) -> Outcome {
        let new_task = NewTask::new(title, description);
        if new_task.has_blank_title() {
            tracing::debug!("ignoring create with blank title");
            return Outcome::Skipped;
        }

        let _busy = BusyGuard::enter(&self.state);
        tracing::debug!(title = %new_task.title, "creating task");

        match self.remote.create(&new_task).await {
            Ok(task) => {
                tracing::info!(task_id = %task.id, "task created");
                self.state.send_modify(|s| {
                    s.tasks.push(task);
                    s.draft.clear();
                    s.last_error = None;
                });
                Outcome::Applied
            }
            Err(e) => self.fail(Operation::Create, None, &e),
        }
    }

    /// Submits the current draft through [`create`](Self::create).
    pub async fn submit_draft(&self) -> Outcome {
        let draft = self.draft();
        self.create(&draft.title, &draft.description).await
    }

    /// Changes a task's status and swaps in the service's copy in place.
    ///
    /// The request is sent even if `id` is not held locally. A confirmed
    /// update for a task that has since disappeared does not bring it back.
    pub async fn set_status(&self, id: &TaskId, status: TaskStatus) -> Outcome {
        tracing::debug!(task_id = %id, %status, "updating task status");

        match self.remote.update_status(id, status).await {
            Ok(task) => {
                self.state.send_modify(|s| {
                    if let Some(slot) = s.tasks.iter_mut().find(|t| t.id == *id) {
                        *slot = task;
                    } else {
                        tracing::debug!(task_id = %id, "updated task no longer held locally");
                    }
                    s.last_error = None;
                });
                tracing::info!(task_id = %id, %status, "task status updated");
                Outcome::Applied
            }
            Err(e) => self.fail(Operation::Update, Some(id), &e),
        }
    }

    /// Flips a locally held task between pending and completed.
    ///
    /// Returns [`Outcome::Skipped`] if `id` is not held locally.
    pub async fn toggle(&self, id: &TaskId) -> Outcome {
        let Some(current) = self.get(id).map(|t| t.status) else {
            tracing::debug!(task_id = %id, "toggle for unknown task ignored");
            return Outcome::Skipped;
        };
        self.set_status(id, current.toggled()).await
    }

    /// Deletes a task and drops it from the local collection.
    pub async fn remove(&self, id: &TaskId) -> Outcome {
        tracing::debug!(task_id = %id, "deleting task");

        match self.remote.delete(id).await {
            Ok(()) => {
                self.state.send_modify(|s| {
                    s.tasks.retain(|t| t.id != *id);
                    s.last_error = None;
                });
                tracing::info!(task_id = %id, "task deleted");
                Outcome::Applied
            }
            Err(e) => self.fail(Operation::Delete, Some(id), &e),
        }
    }

    /// Records a failure in `last_error`, leaving the collection untouched.
    fn fail(&self, operation: Operation, id: Option<&TaskId>, error: &RemoteError) -> Outcome {
        let sync_error = SyncError::classify(operation, error);
        match id {
            Some(id) => tracing::warn!(%operation, task_id = %id, %error, "task operation failed"),
            None => tracing::warn!(%operation, %error, "task operation failed"),
        }
        self.state.send_modify(|s| s.last_error = Some(sync_error));
        Outcome::Failed(sync_error)
    }
}
