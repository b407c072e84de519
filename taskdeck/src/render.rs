//! Plain-text rendering of store state for the CLI.

use taskdeck_proto::{Task, Timestamp};

use crate::tasks::{Statistics, SyncSnapshot};

/// Timestamp format used in task listings.
const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One line per task: checkbox, id, title, creation time, then an indented
/// description line if present.
#[must_use]
pub fn task_line(task: &Task) -> String {
    let checkbox = if task.is_completed() { "[✓]" } else { "[ ]" };
    let mut line = format!("{checkbox} {:>4}  {}", task.id, task.title);
    if let Some(created) = created_text(&task.created_at) {
        line.push_str(&format!("  ({created})"));
    }
    if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(&format!("\n           {description}"));
    }
    line
}

/// Formatted creation time, or the service's value as sent when it is not
/// RFC 3339. `None` when the service sent nothing.
fn created_text(created_at: &Timestamp) -> Option<String> {
    if created_at.is_missing() {
        return None;
    }
    Some(created_at.as_datetime().map_or_else(
        || created_at.to_string(),
        |dt| dt.format(CREATED_FORMAT).to_string(),
    ))
}

/// `total: N  pending: N  completed: N`
#[must_use]
pub fn statistics_line(stats: &Statistics) -> String {
    format!(
        "total: {}  pending: {}  completed: {}",
        stats.total, stats.pending, stats.completed
    )
}

/// The task list followed by a statistics footer.
#[must_use]
pub fn task_list(snapshot: &SyncSnapshot) -> String {
    if snapshot.tasks.is_empty() {
        return format!("No tasks.\n{}", statistics_line(&snapshot.statistics()));
    }
    let mut out = String::new();
    for task in &snapshot.tasks {
        out.push_str(&task_line(task));
        out.push('\n');
    }
    out.push_str(&statistics_line(&snapshot.statistics()));
    out
}

/// Error banner for `last_error`, if set.
#[must_use]
pub fn error_banner(snapshot: &SyncSnapshot) -> Option<String> {
    snapshot.last_error.map(|e| format!("error: {e}"))
}
