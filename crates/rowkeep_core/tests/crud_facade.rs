mod common;

use common::{event_crud, record, Event, FaultyStore, MemoryStore, UnreachableStore};
use rowkeep_core::{CrudOptions, ErrorKind, FixedClock, StorageError, StoreFault};
use serde_json::json;
use std::error::Error;
use std::sync::Arc;

fn memory_store(now_ms: i64) -> (Arc<MemoryStore>, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(now_ms));
    (Arc::new(MemoryStore::new(Arc::clone(&clock))), clock)
}

#[tokio::test]
async fn append_rejects_invalid_input_before_reaching_store() {
    let crud = event_crud(UnreachableStore, CrudOptions::new());

    let err = crud
        .append(&json!({"title": "", "description": "x"}))
        .await
        .unwrap_err();

    assert!(
        matches!(&err, StorageError::Validation { issues } if issues == &vec!["title must not be empty".to_string()])
    );
}

#[tokio::test]
async fn append_reports_every_issue() {
    let crud = event_crud(UnreachableStore, CrudOptions::new());

    let err = crud
        .append(&json!({"title": "", "keep_ms": -5}))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(
        err.issues(),
        ["title must not be empty", "keep_ms must be non-negative"]
    );
}

#[tokio::test]
async fn append_reports_shape_and_rule_issues_together() {
    let crud = event_crud(UnreachableStore, CrudOptions::new());

    let err = crud
        .append(&json!({"title": "", "created_at": "noon", "keep_ms": -1}))
        .await
        .unwrap_err();
    let issues = err.issues();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(issues.len(), 3);
    assert_eq!(issues[0], "title must not be empty");
    assert!(issues[1].starts_with("created_at: invalid type"));
    assert_eq!(issues[2], "keep_ms must be non-negative");

    let err = crud.append(&json!({"keep_ms": "long"})).await.unwrap_err();
    assert_eq!(err.issues().len(), 2);
    assert_eq!(err.issues()[0], "missing field `title`");
}

#[tokio::test]
async fn append_then_read_one_roundtrip() {
    let (store, _clock) = memory_store(5_000);
    let crud = event_crud(Arc::clone(&store), CrudOptions::new());

    let created = crud
        .append(&json!({"title": "kickoff", "ignored": true}))
        .await
        .unwrap();
    assert_eq!(
        created,
        Event {
            id: 1,
            title: "kickoff".into(),
            created_at: 5_000,
            keep_ms: None,
        }
    );

    let loaded = crud.read_one(created.id).await.unwrap();
    assert_eq!(loaded, created);
    assert_eq!(store.calls(), 2);
}

#[tokio::test]
async fn read_one_missing_row_is_not_found_with_exact_id() {
    let (store, _clock) = memory_store(0);
    let crud = event_crud(store, CrudOptions::new());

    let err = crud.read_one(41).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { id: 41 }));
    assert_eq!(err.to_string(), "Record with id 41 not found");
}

#[tokio::test]
async fn read_one_rejects_schema_drift() {
    let (store, _clock) = memory_store(0);
    store.seed(record(json!({"id": 1, "title": 7})));
    let crud = event_crud(store, CrudOptions::new());

    let err = crud.read_one(1).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DbValidation);
    let issues = err.issues();
    assert_eq!(issues.len(), 2);
    assert!(issues[0].starts_with("title: invalid type"));
    assert_eq!(issues[1], "missing field `created_at`");
}

#[tokio::test]
async fn read_many_is_all_or_nothing() {
    let (store, _clock) = memory_store(0);
    store.seed(record(json!({"id": 1, "title": "ok", "created_at": 0})));
    store.seed(record(json!({"id": 2, "created_at": 0})));
    store.seed(record(json!({"id": 3, "title": "ok", "created_at": "soon"})));
    let crud = event_crud(store, CrudOptions::new());

    let err = crud.read_many().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DbValidation);
    let issues = err.issues();
    assert_eq!(issues.len(), 2);
    assert!(issues[0].starts_with("[1] "));
    assert!(issues[1].starts_with("[2] "));
}

#[tokio::test]
async fn read_many_by_filters_on_equality() {
    let (store, _clock) = memory_store(0);
    let crud = event_crud(Arc::clone(&store), CrudOptions::new());
    for title in ["a", "b", "a", "c", "a"] {
        crud.append(&json!({ "title": title })).await.unwrap();
    }

    let matched = crud.read_many_by("title", "a").await.unwrap();
    let ids: Vec<i64> = matched.iter().map(|event| event.id).collect();
    assert_eq!(ids, vec![1, 3, 5]);

    let none = crud.read_many_by("title", "zzz").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn foreign_store_faults_are_wrapped_once_per_operation() {
    fn io_fault() -> StoreFault {
        Box::new(std::io::Error::other("connection reset"))
    }
    let crud = event_crud(FaultyStore::new(io_fault), CrudOptions::new());

    let append = crud.append(&json!({"title": "x"})).await.unwrap_err();
    let read_one = crud.read_one(1).await.unwrap_err();
    let read_many = crud.read_many().await.unwrap_err();
    let read_by = crud.read_many_by("title", "x").await.unwrap_err();

    for (err, message) in [
        (&append, "Insert failed"),
        (&read_one, "Read failed"),
        (&read_many, "Read failed"),
        (&read_by, "Read by column failed"),
    ] {
        assert_eq!(err.kind(), ErrorKind::Db);
        assert_eq!(err.to_string(), message);
        let cause = err.source().expect("cause should be preserved");
        assert_eq!(cause.to_string(), "connection reset");
        assert!(!rowkeep_core::is_storage_error(cause));
    }
}

#[tokio::test]
async fn taxonomy_faults_from_store_pass_through_unchanged() {
    fn known_fault() -> StoreFault {
        Box::new(StorageError::not_found(99))
    }
    let crud = event_crud(FaultyStore::new(known_fault), CrudOptions::new());

    assert!(matches!(
        crud.read_many().await,
        Err(StorageError::NotFound { id: 99 })
    ));
    assert!(matches!(
        crud.append(&json!({"title": "x"})).await,
        Err(StorageError::NotFound { id: 99 })
    ));
}

#[tokio::test]
async fn concurrent_appends_are_independent() {
    let (store, _clock) = memory_store(0);
    let crud = event_crud(Arc::clone(&store), CrudOptions::new());

    let (va, vb, vc) = (
        json!({"title": "a"}),
        json!({"title": "b"}),
        json!({"title": "c"}),
    );
    let (a, b, c) = tokio::join!(crud.append(&va), crud.append(&vb), crud.append(&vc));
    let mut ids = vec![a.unwrap().id, b.unwrap().id, c.unwrap().id];
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(crud.read_many().await.unwrap().len(), 3);
}
