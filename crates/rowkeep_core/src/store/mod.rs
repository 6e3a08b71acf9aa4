//! Store contract consumed by the CRUD facade.
//!
//! # Responsibility
//! - Define the four row operations a backing store must provide.
//! - Carry table identity (`TableDescriptor`) without interpreting it.
//!
//! # Invariants
//! - Store faults are opaque `StoreFault` values; the facade maps them.
//! - Identity assignment and locking belong to the store, not the facade.

use crate::error::StoreFault;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

pub mod sqlite;

pub use sqlite::SqliteStore;

/// Untyped row as exchanged with a store.
pub type Record = Map<String, Value>;

/// Identifies one table and its identity (primary-key) column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    name: String,
    id_column: String,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>, id_column: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_column: id_column.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }
}

/// Row-oriented persistence consumed by [`crate::crud::Crud`].
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts one record and returns the stored row, including generated fields.
    async fn insert_returning(
        &self,
        table: &TableDescriptor,
        record: Record,
    ) -> Result<Record, StoreFault>;

    /// Returns the row whose identity column equals `id`, if any.
    async fn select_by_id(
        &self,
        table: &TableDescriptor,
        id: i64,
    ) -> Result<Option<Record>, StoreFault>;

    /// Returns every row of the table in store order.
    async fn select_all(&self, table: &TableDescriptor) -> Result<Vec<Record>, StoreFault>;

    /// Returns rows where `column == value`, in store order.
    async fn select_where(
        &self,
        table: &TableDescriptor,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StoreFault>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn insert_returning(
        &self,
        table: &TableDescriptor,
        record: Record,
    ) -> Result<Record, StoreFault> {
        (**self).insert_returning(table, record).await
    }

    async fn select_by_id(
        &self,
        table: &TableDescriptor,
        id: i64,
    ) -> Result<Option<Record>, StoreFault> {
        (**self).select_by_id(table, id).await
    }

    async fn select_all(&self, table: &TableDescriptor) -> Result<Vec<Record>, StoreFault> {
        (**self).select_all(table).await
    }

    async fn select_where(
        &self,
        table: &TableDescriptor,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StoreFault> {
        (**self).select_where(table, column, value).await
    }
}
