//! Task model and request bodies exchanged with the task-storage service.
//!
//! Every [`Task`] is owned by the service: identifiers and creation
//! timestamps are assigned remotely and the client only ever holds copies
//! of what the service returned.

use std::borrow::Cow;
use std::convert::Infallible;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw JSON form of an identifier. Services use either numbers or strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

/// Opaque task identifier assigned by the task-storage service.
///
/// The identifier re-serializes in the JSON form it arrived in (number or
/// string). Equality and hashing use the textual form, so `7` and `"7"`
/// name the same task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(RawId);

impl TaskId {
    /// Textual form used for comparisons and request paths.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match &self.0 {
            RawId::Number(n) => Cow::Owned(n.to_string()),
            RawId::Text(s) => Cow::Borrowed(s),
        }
    }

    /// Returns the numeric value if the service issued a numeric id.
    #[must_use]
    pub const fn as_number(&self) -> Option<i64> {
        match self.0 {
            RawId::Number(n) => Some(n),
            RawId::Text(_) => None,
        }
    }
}

impl From<i64> for TaskId {
    fn from(n: i64) -> Self {
        Self(RawId::Number(n))
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(RawId::Text(s.to_string()))
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(RawId::Text(s))
    }
}

/// Parses user input: integer literals become numeric ids, anything else
/// is kept as text.
impl FromStr for TaskId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>().map_or_else(|_| Self::from(s), Self::from))
    }
}

impl PartialEq for TaskId {
    fn eq(&self, other: &Self) -> bool {
        self.as_text() == other.as_text()
    }
}

impl Eq for TaskId {}

impl Hash for TaskId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_text().hash(state);
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.as_text())
    }
}

/// Completion state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not done yet. New tasks start here.
    Pending,
    /// Marked done.
    Completed,
}

impl TaskStatus {
    /// The status a toggle action moves to.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Creation time as sent by the service.
///
/// RFC 3339 strings are parsed; anything else (epoch numbers, other date
/// layouts, `null`) is kept verbatim so one odd task never spoils a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// An RFC 3339 timestamp.
    Parsed(DateTime<Utc>),
    /// Any other JSON value, including `null` when the field is absent.
    Raw(serde_json::Value),
}

impl Timestamp {
    /// The parsed time, if the service sent RFC 3339.
    #[must_use]
    pub const fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            Self::Parsed(dt) => Some(dt),
            Self::Raw(_) => None,
        }
    }

    /// Returns `true` if the service sent nothing usable.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Raw(serde_json::Value::Null))
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::Raw(serde_json::Value::Null)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::Parsed(dt)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parsed(dt) => write!(f, "{}", dt.to_rfc3339()),
            Self::Raw(serde_json::Value::Null) => Ok(()),
            Self::Raw(serde_json::Value::String(s)) => f.write_str(s),
            Self::Raw(other) => write!(f, "{other}"),
        }
    }
}

/// A task as stored by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Service-assigned identifier.
    pub id: TaskId,
    /// Non-empty title.
    pub title: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Completion state.
    pub status: TaskStatus,
    /// Service-assigned creation time.
    #[serde(default)]
    pub created_at: Timestamp,
}

impl Task {
    /// Returns `true` if the task is completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Title as typed by the user (not trimmed).
    pub title: String,
    /// Description as typed; empty when the user left it blank.
    #[serde(default)]
    pub description: String,
}

impl NewTask {
    /// Builds a create request body.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Returns `true` if the title is empty after trimming whitespace.
    #[must_use]
    pub fn has_blank_title(&self) -> bool {
        self.title.trim().is_empty()
    }
}

/// Body of `PUT /tasks/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Requested status.
    pub status: TaskStatus,
}
