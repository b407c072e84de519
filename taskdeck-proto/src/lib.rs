//! Shared protocol definitions for the taskdeck JSON wire format.

pub mod envelope;
pub mod task;

pub use envelope::{AckResponse, EnvelopeError, ListResponse, TaskResponse};
pub use task::{NewTask, StatusUpdate, Task, TaskId, TaskStatus, Timestamp};
