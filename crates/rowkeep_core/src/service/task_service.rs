//! Task use-case service.

use crate::crud::{Crud, CrudOptions};
use crate::error::StorageResult;
use crate::model::task::{new_task_schema, task_schema, tasks_table, NewTask, Task, TaskId, TaskStatus};
use crate::schema::SerdeSchema;
use crate::store::Store;
use serde_json::Value;

pub type TaskCrud<S> = Crud<S, SerdeSchema<NewTask>, SerdeSchema<Task>>;

/// Append/read entry points for the `tasks` table.
#[derive(Debug)]
pub struct TaskService<S> {
    crud: TaskCrud<S>,
}

impl<S: Store> TaskService<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, CrudOptions::new())
    }

    /// Creates a service whose reads honor `options` (TTL, clock).
    pub fn with_options(store: S, options: CrudOptions<Task>) -> Self {
        Self {
            crud: Crud::new(store, tasks_table(), new_task_schema(), task_schema(), options),
        }
    }

    /// Validates and stores a task payload.
    pub async fn append_task(&self, data: &Value) -> StorageResult<Task> {
        self.crud.append(data).await
    }

    pub async fn read_task(&self, id: TaskId) -> StorageResult<Task> {
        self.crud.read_one(id).await
    }

    pub async fn read_all_tasks(&self) -> StorageResult<Vec<Task>> {
        self.crud.read_many().await
    }

    pub async fn read_tasks_by_status(&self, status: TaskStatus) -> StorageResult<Vec<Task>> {
        self.crud.read_many_by("status", status.as_str()).await
    }
}
