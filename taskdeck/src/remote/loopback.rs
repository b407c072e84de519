//! Loopback remote for testing.
//!
//! [`LoopbackRemote`] keeps an in-process task book and answers calls the
//! way the task-storage service does: sequential numeric ids, server-side
//! timestamps, `success: false` for blank titles and unknown ids. Tests
//! can script failures with [`LoopbackRemote::inject`] and hold requests in
//! flight with [`LoopbackRemote::hold`].

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use parking_lot::Mutex;
use taskdeck_proto::{NewTask, Task, TaskId, TaskStatus};
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

use super::{RemoteError, TaskRemote};

/// A scripted failure for the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Answer with `success: false`.
    Reject,
    /// Fail as if the connection dropped.
    Disconnect,
}

impl Fault {
    fn into_error(self) -> RemoteError {
        match self {
            Self::Reject => RemoteError::Rejected {
                message: Some("injected rejection".to_string()),
            },
            Self::Disconnect => RemoteError::Unavailable("injected disconnect".to_string()),
        }
    }
}

#[derive(Debug, Default)]
struct Book {
    tasks: Vec<Task>,
    next_id: i64,
}

/// In-process stand-in for the task-storage service.
#[derive(Debug)]
pub struct LoopbackRemote {
    book: Mutex<Book>,
    faults: Mutex<VecDeque<Fault>>,
    /// Requests take a read lock; [`hold`](Self::hold) takes the write lock.
    gate: Arc<RwLock<()>>,
    requests: AtomicUsize,
}

impl Default for LoopbackRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopbackRemote {
    /// Creates an empty service.
    #[must_use]
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    /// Creates a service that already stores `tasks`.
    ///
    /// New ids continue after the highest numeric id present.
    #[must_use]
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let next_id = tasks
            .iter()
            .filter_map(|t| t.id.as_number())
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            book: Mutex::new(Book { tasks, next_id }),
            faults: Mutex::new(VecDeque::new()),
            gate: Arc::new(RwLock::new(())),
            requests: AtomicUsize::new(0),
        }
    }

    /// Makes the next not-yet-answered request fail with `fault`.
    ///
    /// Faults queue up: injecting twice fails the next two requests.
    pub fn inject(&self, fault: Fault) {
        self.faults.lock().push_back(fault);
    }

    /// Blocks every request until the returned guard is dropped.
    ///
    /// Requests already past the gate are not affected.
    pub async fn hold(&self) -> OwnedRwLockWriteGuard<()> {
        Arc::clone(&self.gate).write_owned().await
    }

    /// Number of requests received so far, including failed ones.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Service-side view of the stored tasks.
    #[must_use]
    pub fn stored(&self) -> Vec<Task> {
        self.book.lock().tasks.clone()
    }

    /// Counts the request, waits at the gate, then consumes a scripted
    /// fault if one is queued.
    async fn admit(&self) -> Result<(), RemoteError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let _pass = self.gate.read().await;
        self.faults
            .lock()
            .pop_front()
            .map_or(Ok(()), |fault| Err(fault.into_error()))
    }

    fn not_found(id: &TaskId) -> RemoteError {
        RemoteError::Rejected {
            message: Some(format!("task {id} not found")),
        }
    }

    fn insert(&self, new_task: &NewTask) -> Result<Task, RemoteError> {
        if new_task.has_blank_title() {
            return Err(RemoteError::Rejected {
                message: Some("title is required".to_string()),
            });
        }
        let mut book = self.book.lock();
        let id = book.next_id;
        book.next_id += 1;
        let description = Some(new_task.description.clone()).filter(|d| !d.is_empty());
        let task = Task {
            id: TaskId::from(id),
            title: new_task.title.clone(),
            description,
            status: TaskStatus::Pending,
            created_at: Utc::now().into(),
        };
        book.tasks.push(task.clone());
        drop(book);
        Ok(task)
    }

    fn set_status(&self, id: &TaskId, status: TaskStatus) -> Result<Task, RemoteError> {
        let mut book = self.book.lock();
        let task = book
            .tasks
            .iter_mut()
            .find(|t| t.id == *id)
            .ok_or_else(|| Self::not_found(id))?;
        task.status = status;
        Ok(task.clone())
    }

    fn remove(&self, id: &TaskId) -> Result<(), RemoteError> {
        let mut book = self.book.lock();
        let before = book.tasks.len();
        book.tasks.retain(|t| t.id != *id);
        if book.tasks.len() == before {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}

impl TaskRemote for LoopbackRemote {
    async fn list(&self) -> Result<Vec<Task>, RemoteError> {
        self.admit().await?;
        Ok(self.stored())
    }

    async fn create(&self, new_task: &NewTask) -> Result<Task, RemoteError> {
        self.admit().await?;
        self.insert(new_task)
    }

    async fn update_status(&self, id: &TaskId, status: TaskStatus) -> Result<Task, RemoteError> {
        self.admit().await?;
        self.set_status(id, status)
    }

    async fn delete(&self, id: &TaskId) -> Result<(), RemoteError> {
        self.admit().await?;
        self.remove(id)
    }
}
