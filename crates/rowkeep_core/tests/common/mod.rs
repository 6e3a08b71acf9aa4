#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use rowkeep_core::schema::non_empty;
use rowkeep_core::{
    Clock, Crud, CrudOptions, FixedClock, Record, SerdeSchema, Store, StoreFault, TableDescriptor,
    TableRow, Timestamp,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub created_at: i64,
    #[serde(default)]
    pub keep_ms: Option<i64>,
}

impl TableRow for Event {
    fn timestamp(&self, column: &str) -> Option<Timestamp> {
        match column {
            "created_at" => Some(Timestamp::Millis(self.created_at)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_ms: Option<i64>,
}

pub fn new_event_schema() -> SerdeSchema<NewEvent> {
    SerdeSchema::new()
        .field_with("title", |title: &String| non_empty("title", title))
        .optional::<i64>("created_at")
        .optional_with("keep_ms", |ms: &i64| {
            if *ms < 0 {
                vec!["keep_ms must be non-negative".to_string()]
            } else {
                Vec::new()
            }
        })
}

pub fn event_schema() -> SerdeSchema<Event> {
    SerdeSchema::new()
        .field::<i64>("id")
        .field::<String>("title")
        .field::<i64>("created_at")
        .optional::<i64>("keep_ms")
}

pub fn events_table() -> TableDescriptor {
    TableDescriptor::new("events", "id")
}

pub type EventCrud<S> = Crud<S, SerdeSchema<NewEvent>, SerdeSchema<Event>>;

pub fn event_crud<S: Store>(store: S, options: CrudOptions<Event>) -> EventCrud<S> {
    Crud::new(store, events_table(), new_event_schema(), event_schema(), options)
}

pub fn record(value: Value) -> Record {
    value.as_object().cloned().expect("record literal must be an object")
}

/// In-memory store assigning sequential ids and stamping `created_at`.
pub struct MemoryStore {
    rows: Mutex<Vec<Record>>,
    clock: Arc<FixedClock>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new(clock: Arc<FixedClock>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            clock,
            calls: AtomicUsize::new(0),
        }
    }

    /// Inserts a raw record, bypassing any schema.
    pub fn seed(&self, row: Record) {
        self.rows.lock().push(row);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_returning(
        &self,
        _table: &TableDescriptor,
        mut record: Record,
    ) -> Result<Record, StoreFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock();
        let id = rows.len() as i64 + 1;
        record.insert("id".to_string(), Value::from(id));
        record
            .entry("created_at")
            .or_insert_with(|| Value::from(self.clock.now_millis()));
        rows.push(record.clone());
        Ok(record)
    }

    async fn select_by_id(
        &self,
        table: &TableDescriptor,
        id: i64,
    ) -> Result<Option<Record>, StoreFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .iter()
            .find(|row| row.get(table.id_column()) == Some(&Value::from(id)))
            .cloned())
    }

    async fn select_all(&self, _table: &TableDescriptor) -> Result<Vec<Record>, StoreFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.lock().clone())
    }

    async fn select_where(
        &self,
        _table: &TableDescriptor,
        column: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StoreFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|row| row.get(column) == Some(value))
            .cloned()
            .collect())
    }
}

/// Store that fails the test if any operation reaches it.
pub struct UnreachableStore;

#[async_trait]
impl Store for UnreachableStore {
    async fn insert_returning(
        &self,
        _table: &TableDescriptor,
        _record: Record,
    ) -> Result<Record, StoreFault> {
        panic!("store must not be called");
    }

    async fn select_by_id(
        &self,
        _table: &TableDescriptor,
        _id: i64,
    ) -> Result<Option<Record>, StoreFault> {
        panic!("store must not be called");
    }

    async fn select_all(&self, _table: &TableDescriptor) -> Result<Vec<Record>, StoreFault> {
        panic!("store must not be called");
    }

    async fn select_where(
        &self,
        _table: &TableDescriptor,
        _column: &str,
        _value: &Value,
    ) -> Result<Vec<Record>, StoreFault> {
        panic!("store must not be called");
    }
}

/// Store whose every operation raises the fault built by `make_fault`.
pub struct FaultyStore {
    make_fault: fn() -> StoreFault,
}

impl FaultyStore {
    pub fn new(make_fault: fn() -> StoreFault) -> Self {
        Self { make_fault }
    }
}

#[async_trait]
impl Store for FaultyStore {
    async fn insert_returning(
        &self,
        _table: &TableDescriptor,
        _record: Record,
    ) -> Result<Record, StoreFault> {
        Err((self.make_fault)())
    }

    async fn select_by_id(
        &self,
        _table: &TableDescriptor,
        _id: i64,
    ) -> Result<Option<Record>, StoreFault> {
        Err((self.make_fault)())
    }

    async fn select_all(&self, _table: &TableDescriptor) -> Result<Vec<Record>, StoreFault> {
        Err((self.make_fault)())
    }

    async fn select_where(
        &self,
        _table: &TableDescriptor,
        _column: &str,
        _value: &Value,
    ) -> Result<Vec<Record>, StoreFault> {
        Err((self.make_fault)())
    }
}
