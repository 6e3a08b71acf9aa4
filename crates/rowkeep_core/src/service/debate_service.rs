//! Debate round use-case service.

use crate::crud::{Crud, CrudOptions};
use crate::error::StorageResult;
use crate::model::debate_round::{
    debate_round_schema, debate_rounds_table, new_debate_round_schema, DebateRound,
    NewDebateRound,
};
use crate::model::task::TaskId;
use crate::schema::SerdeSchema;
use crate::store::Store;
use serde_json::Value;

pub type DebateRoundCrud<S> = Crud<S, SerdeSchema<NewDebateRound>, SerdeSchema<DebateRound>>;

/// Append/read entry points for the `debate_rounds` table.
#[derive(Debug)]
pub struct DebateService<S> {
    crud: DebateRoundCrud<S>,
}

impl<S: Store> DebateService<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, CrudOptions::new())
    }

    pub fn with_options(store: S, options: CrudOptions<DebateRound>) -> Self {
        Self {
            crud: Crud::new(
                store,
                debate_rounds_table(),
                new_debate_round_schema(),
                debate_round_schema(),
                options,
            ),
        }
    }

    /// Validates and stores a round.
    ///
    /// A `task_id` with no matching task is rejected by the store's foreign
    /// key and surfaces as `Db("Insert failed")`.
    pub async fn append_round(&self, data: &Value) -> StorageResult<DebateRound> {
        self.crud.append(data).await
    }

    pub async fn read_round(&self, id: i64) -> StorageResult<DebateRound> {
        self.crud.read_one(id).await
    }

    /// Lists live rounds, optionally only those of one task.
    pub async fn read_all_rounds(&self, task_id: Option<TaskId>) -> StorageResult<Vec<DebateRound>> {
        match task_id {
            Some(task_id) => self.crud.read_many_by("task_id", task_id).await,
            None => self.crud.read_many().await,
        }
    }
}
