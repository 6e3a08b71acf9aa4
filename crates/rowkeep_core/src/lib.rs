//! Validated, TTL-aware append-and-read access to row stores.
//!
//! A [`Crud`] facade binds one table to an insert schema, a select schema and
//! an optional TTL policy, and exposes `append`, `read_one`, `read_many` and
//! `read_many_by`. Every failure is returned as a [`StorageError`] value.

pub mod config;
pub mod crud;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod result;
pub mod schema;
pub mod service;
pub mod store;
pub mod ttl;

pub use config::{ConfigError, CoreConfig};
pub use crud::{Crud, CrudOptions};
pub use error::{is_storage_error, ErrorKind, StorageError, StorageResult, StoreFault};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::debate_round::{AgentType, DebateRound, NewDebateRound, RoundType};
pub use model::task::{NewTask, Task, TaskId, TaskStatus};
pub use schema::{parse_batch, FnSchema, Issues, Schema, SerdeSchema};
pub use service::debate_service::DebateService;
pub use service::task_service::TaskService;
pub use store::{Record, SqliteStore, Store, TableDescriptor};
pub use ttl::{Clock, FixedClock, SystemClock, TableRow, Timestamp, Ttl};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
