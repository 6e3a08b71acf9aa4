//! Task rows.

use crate::schema::{non_empty, SerdeSchema};
use crate::store::TableDescriptor;
use crate::ttl::{TableRow, Timestamp};
use serde::{Deserialize, Serialize};

pub type TaskId = i64;

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Debating,
    Completed,
    Archived,
}

impl TaskStatus {
    /// Stored column value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Debating => "debating",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

/// Stored task row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    /// Unix epoch milliseconds, assigned by the store when not supplied.
    pub created_at: i64,
}

impl TableRow for Task {
    fn timestamp(&self, column: &str) -> Option<Timestamp> {
        match column {
            "created_at" => Some(Timestamp::Millis(self.created_at)),
            _ => None,
        }
    }
}

/// Insert payload for a task.
///
/// Unknown keys in the untyped input are dropped during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    /// Defaults to `pending` in storage when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

pub fn tasks_table() -> TableDescriptor {
    TableDescriptor::new("tasks", "id")
}

/// Insert-side schema: `title` and `description` must be non-empty.
pub fn new_task_schema() -> SerdeSchema<NewTask> {
    SerdeSchema::new()
        .field_with("title", |title: &String| non_empty("title", title))
        .field_with("description", |text: &String| non_empty("description", text))
        .optional::<TaskStatus>("status")
        .optional::<i64>("created_at")
}

pub fn task_schema() -> SerdeSchema<Task> {
    SerdeSchema::new()
        .field::<TaskId>("id")
        .field::<String>("title")
        .field::<String>("description")
        .field::<TaskStatus>("status")
        .field::<i64>("created_at")
}
