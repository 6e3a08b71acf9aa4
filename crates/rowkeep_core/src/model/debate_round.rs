//! Debate round rows, each attached to a task.

use crate::model::task::TaskId;
use crate::schema::{non_empty, SerdeSchema};
use crate::store::TableDescriptor;
use crate::ttl::{TableRow, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Claw,
    CounterAgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundType {
    Draft,
    Critique,
    Synthesis,
}

/// Stored debate round row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateRound {
    pub id: i64,
    pub task_id: TaskId,
    pub agent_type: AgentType,
    /// Serialized as `type` to match the column name.
    #[serde(rename = "type")]
    pub kind: RoundType,
    pub content: String,
    pub created_at: i64,
}

impl TableRow for DebateRound {
    fn timestamp(&self, column: &str) -> Option<Timestamp> {
        (column == "created_at").then_some(Timestamp::Millis(self.created_at))
    }
}

/// Insert payload for a debate round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDebateRound {
    pub task_id: TaskId,
    pub agent_type: AgentType,
    #[serde(rename = "type")]
    pub kind: RoundType,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

pub fn debate_rounds_table() -> TableDescriptor {
    TableDescriptor::new("debate_rounds", "id")
}

pub fn new_debate_round_schema() -> SerdeSchema<NewDebateRound> {
    SerdeSchema::new()
        .field::<TaskId>("task_id")
        .field::<AgentType>("agent_type")
        .field::<RoundType>("type")
        .field_with("content", |content: &String| non_empty("content", content))
        .optional::<i64>("created_at")
}

pub fn debate_round_schema() -> SerdeSchema<DebateRound> {
    SerdeSchema::new()
        .field::<i64>("id")
        .field::<TaskId>("task_id")
        .field::<AgentType>("agent_type")
        .field::<RoundType>("type")
        .field::<String>("content")
        .field::<i64>("created_at")
}
