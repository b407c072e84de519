//! Remote task-storage access for `taskdeck`.
//!
//! Defines the [`TaskRemote`] trait the synchronization store talks to.
//! Implementations:
//! - [`http::HttpRemote`]: JSON over HTTP against a real service
//! - [`loopback::LoopbackRemote`]: in-process service for tests and demos

pub mod http;
pub mod loopback;

use std::future::Future;

use taskdeck_proto::{EnvelopeError, NewTask, Task, TaskId, TaskStatus};

pub use http::{HttpRemote, RemoteSettings};
pub use loopback::{Fault, LoopbackRemote};

/// Errors returned by a remote call.
///
/// Exactly one variant, [`RemoteError::Rejected`], means the service
/// answered and reported a logical failure. Every other variant means the
/// exchange itself did not complete.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The service answered with `success: false`.
    #[error("service rejected the request: {}", message.as_deref().unwrap_or("no details"))]
    Rejected {
        /// Diagnostic text from the failure envelope.
        message: Option<String>,
    },

    /// The request did not finish within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The service could not be reached or the HTTP exchange failed.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The response body was not a valid envelope.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The remote is not accepting requests.
    #[error("remote unavailable: {0}")]
    Unavailable(String),
}

impl RemoteError {
    /// Returns `true` for failures where no logical answer was received.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        !matches!(self, Self::Rejected { .. })
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::Malformed(e.to_string())
        } else {
            Self::Http(e)
        }
    }
}

impl From<EnvelopeError> for RemoteError {
    fn from(e: EnvelopeError) -> Self {
        match e {
            EnvelopeError::Rejected { message } => Self::Rejected { message },
            missing @ EnvelopeError::MissingPayload(_) => Self::Malformed(missing.to_string()),
        }
    }
}

/// Async access to the task-storage service.
///
/// Each call is an independent request/response exchange. Implementations
/// keep no per-call state between requests and never retry on their own.
pub trait TaskRemote: Send + Sync {
    /// Fetch the full task collection in service order.
    fn list(&self) -> impl Future<Output = Result<Vec<Task>, RemoteError>> + Send;

    /// Create a task and return it as stored by the service.
    fn create(&self, new_task: &NewTask)
    -> impl Future<Output = Result<Task, RemoteError>> + Send;

    /// Change the status of a task and return it as stored by the service.
    fn update_status(
        &self,
        id: &TaskId,
        status: TaskStatus,
    ) -> impl Future<Output = Result<Task, RemoteError>> + Send;

    /// Delete a task.
    fn delete(&self, id: &TaskId) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
