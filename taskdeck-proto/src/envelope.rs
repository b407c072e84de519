//! Response envelopes.
//!
//! Every service response is wrapped in `{ "success": bool, ... }`. The
//! `success` flag is the logical outcome and is independent of the HTTP
//! status code. Failure envelopes may carry a diagnostic `message` (some
//! services call it `error`); it is meant for logs, not for end users.

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Errors produced when unwrapping an envelope into its payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeError {
    /// The service answered `success: false`.
    #[error("service reported failure: {}", message.as_deref().unwrap_or("no details"))]
    Rejected {
        /// Diagnostic text supplied by the service, if any.
        message: Option<String>,
    },

    /// The service answered `success: true` without the expected payload.
    #[error("success envelope is missing `{0}`")]
    MissingPayload(&'static str),
}

/// Envelope of `GET /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    /// Logical outcome.
    pub success: bool,
    /// Full task collection, in service order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    /// Diagnostic text on failure.
    #[serde(default, alias = "error", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ListResponse {
    /// Success envelope carrying `tasks`.
    #[must_use]
    pub const fn ok(tasks: Vec<Task>) -> Self {
        Self {
            success: true,
            tasks: Some(tasks),
            message: None,
        }
    }

    /// Failure envelope with a diagnostic message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            tasks: None,
            message: Some(message.into()),
        }
    }

    /// Unwraps the task collection.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Rejected`] for `success: false` and
    /// [`EnvelopeError::MissingPayload`] if `tasks` is absent.
    pub fn into_result(self) -> Result<Vec<Task>, EnvelopeError> {
        if !self.success {
            return Err(EnvelopeError::Rejected {
                message: self.message,
            });
        }
        self.tasks.ok_or(EnvelopeError::MissingPayload("tasks"))
    }
}

/// Envelope of `POST /tasks` and `PUT /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    /// Logical outcome.
    pub success: bool,
    /// The task as stored after the mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
    /// Diagnostic text on failure.
    #[serde(default, alias = "error", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TaskResponse {
    /// Success envelope carrying `task`.
    #[must_use]
    pub const fn ok(task: Task) -> Self {
        Self {
            success: true,
            task: Some(task),
            message: None,
        }
    }

    /// Failure envelope with a diagnostic message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            task: None,
            message: Some(message.into()),
        }
    }

    /// Unwraps the task.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Rejected`] for `success: false` and
    /// [`EnvelopeError::MissingPayload`] if `task` is absent.
    pub fn into_result(self) -> Result<Task, EnvelopeError> {
        if !self.success {
            return Err(EnvelopeError::Rejected {
                message: self.message,
            });
        }
        self.task.ok_or(EnvelopeError::MissingPayload("task"))
    }
}

/// Envelope of `DELETE /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckResponse {
    /// Logical outcome.
    pub success: bool,
    /// Diagnostic text on failure.
    #[serde(default, alias = "error", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AckResponse {
    /// Success envelope.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Failure envelope with a diagnostic message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    /// Checks the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::Rejected`] for `success: false`.
    pub fn into_result(self) -> Result<(), EnvelopeError> {
        if self.success {
            Ok(())
        } else {
            Err(EnvelopeError::Rejected {
                message: self.message,
            })
        }
    }
}
