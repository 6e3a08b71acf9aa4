//! Generic append-and-read facade over one table.
//!
//! # Responsibility
//! - Validate inbound payloads before any store call.
//! - Validate every row read back from the store.
//! - Apply read-time TTL (reject in `read_one`, filter in list reads).
//!
//! # Invariants
//! - No caller observes a schema-invalid or expired row through a read.
//! - Every failure is a `StorageError` value; store faults are wrapped once.
//! - The facade holds no mutable state between calls and never retries.

use crate::error::{StorageError, StorageResult, StoreFault};
use crate::result::{and_then_async, try_async};
use crate::schema::{parse_batch, Schema};
use crate::store::{Record, Store, TableDescriptor};
use crate::ttl::{
    expires_at, is_expired, Clock, SystemClock, TableRow, Ttl, DEFAULT_TIMESTAMP_COLUMN,
};
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

const INSERT_FAILED: &str = "Insert failed";
const READ_FAILED: &str = "Read failed";
const READ_BY_COLUMN_FAILED: &str = "Read by column failed";

/// Per-facade configuration, fixed at construction.
pub struct CrudOptions<R> {
    ttl: Option<Ttl<R>>,
    timestamp_column: String,
    clock: Arc<dyn Clock>,
}

impl<R> CrudOptions<R> {
    /// No TTL, `created_at` timestamp column, wall clock.
    pub fn new() -> Self {
        Self {
            ttl: None,
            timestamp_column: DEFAULT_TIMESTAMP_COLUMN.to_string(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_ttl(mut self, ttl: Ttl<R>) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_timestamp_column(mut self, column: impl Into<String>) -> Self {
        self.timestamp_column = column.into();
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ttl(&self) -> Option<&Ttl<R>> {
        self.ttl.as_ref()
    }

    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }
}

impl<R> Default for CrudOptions<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for CrudOptions<R> {
    fn clone(&self) -> Self {
        Self {
            ttl: self.ttl.clone(),
            timestamp_column: self.timestamp_column.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R> fmt::Debug for CrudOptions<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrudOptions")
            .field("ttl", &self.ttl)
            .field("timestamp_column", &self.timestamp_column)
            .finish_non_exhaustive()
    }
}

/// Append/read facade bound to one table.
///
/// `I` validates payloads passed to [`Crud::append`]; `Q` validates rows read
/// from the store and defines the row type `Q::Output`.
pub struct Crud<S, I, Q: Schema> {
    store: S,
    table: TableDescriptor,
    insert_schema: I,
    select_schema: Q,
    options: CrudOptions<Q::Output>,
}

impl<S, I, Q> Crud<S, I, Q>
where
    S: Store,
    I: Schema,
    I::Output: Serialize,
    Q: Schema,
    Q::Output: TableRow,
{
    pub fn new(
        store: S,
        table: TableDescriptor,
        insert_schema: I,
        select_schema: Q,
        options: CrudOptions<Q::Output>,
    ) -> Self {
        Self {
            store,
            table,
            insert_schema,
            select_schema,
            options,
        }
    }

    pub fn table(&self) -> &TableDescriptor {
        &self.table
    }

    pub fn options(&self) -> &CrudOptions<Q::Output> {
        &self.options
    }

    /// Validates `data`, inserts it, and returns the stored row.
    ///
    /// The stored row (with generated identity and timestamp) is parsed by
    /// the select schema; a rejection there is a `DbValidation` failure. TTL
    /// is not applied to the freshly inserted row.
    ///
    /// # Errors
    /// - `Validation` when `data` fails the insert schema; the store is not called.
    /// - `Db("Insert failed")` when the store rejects the insert.
    /// - `DbValidation` when the returned row fails the select schema.
    pub async fn append(&self, data: &Value) -> StorageResult<Q::Output> {
        let started_at = Instant::now();
        let outcome = match self.insert_schema.parse(data) {
            Err(issues) => Err(StorageError::validation(issues)),
            Ok(validated) => match to_record(&validated) {
                Err(err) => Err(err),
                Ok(record) => {
                    and_then_async(
                        try_async(self.store.insert_returning(&self.table, record), |fault| {
                            StorageError::from_fault(INSERT_FAILED, fault)
                        }),
                        |row| async move { self.parse_row(row) },
                    )
                    .await
                }
            },
        };

        self.log_outcome("append", started_at, &outcome, |_| 1);
        outcome
    }

    /// Reads one row by identity.
    ///
    /// # Errors
    /// - `NotFound { id }` when no row has this identity.
    /// - `DbValidation` when the stored row fails the select schema.
    /// - `TtlExpired { expired_at }` when the row's TTL has elapsed.
    /// - `Db("Read failed")` for store faults outside the taxonomy.
    pub async fn read_one(&self, id: i64) -> StorageResult<Q::Output> {
        let started_at = Instant::now();
        let outcome = try_async(self.store.select_by_id(&self.table, id), |fault| {
            StorageError::from_fault(READ_FAILED, fault)
        })
        .await
        .and_then(|found| found.ok_or_else(|| StorageError::not_found(id)))
        .and_then(|record| self.parse_row(record))
        .and_then(|row| self.reject_expired(row));

        self.log_outcome("read_one", started_at, &outcome, |_| 1);
        outcome
    }

    /// Reads every live row of the table, preserving store order.
    ///
    /// The batch is validated all-or-nothing before expired rows are dropped.
    pub async fn read_many(&self) -> StorageResult<Vec<Q::Output>> {
        let started_at = Instant::now();
        let outcome = try_async(self.store.select_all(&self.table), |fault| {
            StorageError::from_fault(READ_FAILED, fault)
        })
        .await
        .and_then(|records| self.parse_live_rows(records));

        self.log_outcome("read_many", started_at, &outcome, Vec::len);
        outcome
    }

    /// Reads live rows where `column == value`, preserving store order.
    ///
    /// Single-predicate equality only. Shares the validation and TTL policy
    /// of [`Crud::read_many`].
    pub async fn read_many_by(
        &self,
        column: &str,
        value: impl Into<Value>,
    ) -> StorageResult<Vec<Q::Output>> {
        let started_at = Instant::now();
        let value = value.into();
        let outcome = try_async(self.store.select_where(&self.table, column, &value), |fault| {
            StorageError::from_fault(READ_BY_COLUMN_FAILED, fault)
        })
        .await
        .and_then(|records| self.parse_live_rows(records));

        self.log_outcome("read_many_by", started_at, &outcome, Vec::len);
        outcome
    }

    fn parse_row(&self, record: Record) -> StorageResult<Q::Output> {
        self.select_schema
            .parse(&Value::Object(record))
            .map_err(StorageError::db_validation)
    }

    fn parse_live_rows(&self, records: Vec<Record>) -> StorageResult<Vec<Q::Output>> {
        let values: Vec<Value> = records.into_iter().map(Value::Object).collect();
        let rows = parse_batch(&self.select_schema, &values).map_err(StorageError::db_validation)?;

        let Some(ttl) = &self.options.ttl else {
            return Ok(rows);
        };
        let now_ms = self.options.clock.now_millis();
        let column = self.options.timestamp_column.as_str();
        Ok(rows
            .into_iter()
            .filter(|row| !is_expired(row, ttl, column, now_ms))
            .collect())
    }

    fn reject_expired(&self, row: Q::Output) -> StorageResult<Q::Output> {
        let Some(ttl) = &self.options.ttl else {
            return Ok(row);
        };
        match expires_at(&row, ttl, &self.options.timestamp_column) {
            Some(at) if self.options.clock.now_millis() > at.timestamp_millis() => {
                Err(StorageError::ttl_expired(at))
            }
            _ => Ok(row),
        }
    }

    fn log_outcome<T>(
        &self,
        op: &str,
        started_at: Instant,
        outcome: &StorageResult<T>,
        count: impl FnOnce(&T) -> usize,
    ) {
        let duration_ms = started_at.elapsed().as_millis();
        match outcome {
            Ok(value) => debug!(
                "event=crud_{} module=crud status=ok table={} rows={} duration_ms={}",
                op,
                self.table.name(),
                count(value),
                duration_ms
            ),
            Err(err @ (StorageError::Db { .. } | StorageError::DbValidation { .. })) => warn!(
                "event=crud_{} module=crud status=error table={} error_kind={} duration_ms={}",
                op,
                self.table.name(),
                err.kind().as_str(),
                duration_ms
            ),
            Err(err) => debug!(
                "event=crud_{} module=crud status=rejected table={} error_kind={} duration_ms={}",
                op,
                self.table.name(),
                err.kind().as_str(),
                duration_ms
            ),
        }
    }
}

impl<S, I, Q: Schema> fmt::Debug for Crud<S, I, Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crud")
            .field("table", &self.table)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn to_record<T: Serialize>(value: &T) -> StorageResult<Record> {
    match serde_json::to_value(value) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(_) => Err(StorageError::db(
            INSERT_FAILED,
            Some(StoreFault::from("validated insert value is not an object")),
        )),
        Err(err) => Err(StorageError::db(INSERT_FAILED, Some(Box::new(err)))),
    }
}

#[cfg(test)]
mod tests {
    use super::{to_record, CrudOptions};
    use crate::error::ErrorKind;
    use crate::ttl::{Ttl, DEFAULT_TIMESTAMP_COLUMN};
    use serde::Serialize;
    use serde_json::{json, Map, Value};

    #[derive(Serialize)]
    struct Draft {
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        created_at: Option<i64>,
    }

    #[test]
    fn to_record_skips_absent_optionals() {
        let record = to_record(&Draft {
            title: "t".into(),
            created_at: None,
        })
        .unwrap();
        assert_eq!(Value::Object(record), json!({"title": "t"}));
    }

    #[test]
    fn to_record_rejects_non_objects() {
        let err = to_record(&42).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Db);
        assert_eq!(err.to_string(), "Insert failed");
    }

    #[test]
    fn options_default_to_created_at_without_ttl() {
        let options: CrudOptions<Map<String, Value>> = CrudOptions::default();
        assert_eq!(options.timestamp_column(), DEFAULT_TIMESTAMP_COLUMN);
        assert!(options.ttl().is_none());

        let options = options
            .with_ttl(Ttl::fixed(10))
            .with_timestamp_column("inserted_at");
        assert_eq!(options.timestamp_column(), "inserted_at");
        assert!(matches!(options.ttl(), Some(Ttl::Fixed(10))));
    }
}
