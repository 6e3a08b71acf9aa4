//! SQLite-backed [`Store`] implementation.
//!
//! # Responsibility
//! - Translate the four store operations into parameterized SQL.
//! - Map SQLite values to and from untyped JSON records.
//!
//! # Invariants
//! - Table and column names are validated as plain identifiers and quoted
//!   before they reach SQL text; values are always bound as parameters.
//! - Blocking SQLite work runs on tokio's blocking pool, never on the
//!   async executor thread.

use super::{Record, Store, TableDescriptor};
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::error::StoreFault;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use regex::Regex;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::{Number, Value};
use std::path::Path;
use std::sync::Arc;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Faults raised by [`SqliteStore`].
#[derive(Debug, thiserror::Error)]
pub enum SqliteStoreError {
    #[error("invalid sql identifier `{0}`")]
    InvalidIdentifier(String),
    #[error("insert into `{0}` returned no row")]
    MissingReturnedRow(String),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("blocking store task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Store over a single shared SQLite connection.
///
/// Cloning is cheap; clones share the connection.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Wraps an already bootstrapped connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        open_db(path).map(Self::new)
    }

    /// Opens (and migrates) a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        open_db_in_memory().map(Self::new)
    }

    async fn run<T, F>(&self, op: F) -> Result<T, StoreFault>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, SqliteStoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        let outcome = tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            op(&guard)
        })
        .await
        .map_err(SqliteStoreError::from)
        .and_then(|inner| inner);

        outcome.map_err(|err| Box::new(err) as StoreFault)
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert_returning(
        &self,
        table: &TableDescriptor,
        record: Record,
    ) -> Result<Record, StoreFault> {
        let table_name = quote_identifier(table.name()).map_err(box_fault)?;
        let mut columns = Vec::with_capacity(record.len());
        let mut values = Vec::with_capacity(record.len());
        for (column, value) in &record {
            columns.push(quote_identifier(column).map_err(box_fault)?);
            values.push(json_to_sql(value));
        }

        let sql = if columns.is_empty() {
            format!("INSERT INTO {table_name} DEFAULT VALUES RETURNING *;")
        } else {
            let placeholders = (1..=columns.len())
                .map(|index| format!("?{index}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO {table_name} ({}) VALUES ({placeholders}) RETURNING *;",
                columns.join(", ")
            )
        };

        let name = table.name().to_string();
        self.run(move |conn| {
            query_records(conn, &sql, values)?
                .into_iter()
                .next()
                .ok_or(SqliteStoreError::MissingReturnedRow(name))
        })
        .await
    }

    async fn select_by_id(
        &self,
        table: &TableDescriptor,
        id: i64,
    ) -> Result<Option<Record>, StoreFault> {
        let table_name = quote_identifier(table.name()).map_err(box_fault)?;
        let id_column = quote_identifier(table.id_column()).map_err(box_fault)?;
        let sql = format!("SELECT * FROM {table_name} WHERE {id_column} = ?1 LIMIT 1;");

        self.run(move |conn| {
            Ok(query_records(conn, &sql, vec![SqlValue::Integer(id)])?
                .into_iter()
                .next())
        })
        .await
    }

    async fn select_all(&self, table: &TableDescriptor) -> Result<Vec<Record>, StoreFault> {
        let table_name = quote_identifier(table.name()).map_err(box_fault)?;
        let id_column = quote_identifier(table.id_column()).map_err(box_fault)?;
        let sql = format!("SELECT * FROM {table_name} ORDER BY {id_column} ASC;");

        self.run(move |conn| query_records(conn, &sql, Vec::new()))
            .await
    }

    async fn select_where(
        &self,
        table: &TableDescriptor,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StoreFault> {
        let table_name = quote_identifier(table.name()).map_err(box_fault)?;
        let id_column = quote_identifier(table.id_column()).map_err(box_fault)?;
        let filter_column = quote_identifier(column).map_err(box_fault)?;
        let sql = format!(
            "SELECT * FROM {table_name} WHERE {filter_column} = ?1 ORDER BY {id_column} ASC;"
        );
        let bound = json_to_sql(value);

        self.run(move |conn| query_records(conn, &sql, vec![bound]))
            .await
    }
}

fn box_fault(err: SqliteStoreError) -> StoreFault {
    Box::new(err)
}

/// Validates a plain identifier and returns it double-quoted.
pub fn quote_identifier(name: &str) -> Result<String, SqliteStoreError> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(format!("\"{name}\""))
    } else {
        Err(SqliteStoreError::InvalidIdentifier(name.to_string()))
    }
}

fn query_records(
    conn: &Connection,
    sql: &str,
    values: Vec<SqlValue>,
) -> Result<Vec<Record>, SqliteStoreError> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    let mut rows = stmt.query(params_from_iter(values))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let mut record = Record::new();
        for (index, column) in columns.iter().enumerate() {
            record.insert(column.clone(), sql_to_json(row.get_ref(index)?));
        }
        records.push(record);
    }

    Ok(records)
}

/// Maps a JSON value to a bindable SQLite value.
///
/// Arrays and objects are stored as their JSON text.
pub fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(flag) => SqlValue::Integer(i64::from(*flag)),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => SqlValue::Integer(integer),
            None => SqlValue::Real(number.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(text) => SqlValue::Text(text.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

/// Maps a stored SQLite value back to JSON.
///
/// Non-finite reals become `null`; blobs become byte arrays.
pub fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(integer) => Value::from(integer),
        ValueRef::Real(real) => Number::from_f64(real).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|byte| Value::from(*byte)).collect()),
    }
}
