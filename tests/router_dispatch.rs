//! Integration tests for CRUD dispatch through the storage router.
//!
//! Built entirely on `SimStore`, so every run is deterministic. Operation
//! counters on the backends prove that exactly one backend sees traffic.

use std::sync::Arc;

use mindmap_storage::dst::SimConfig;
use mindmap_storage::router::{BackendChoice, BackendSelection, RouterError, StorageRouter};
use mindmap_storage::storage::{DocumentStore, Record, RecordStore, SimStore};

struct Fixture {
    router: StorageRouter,
    relational: Arc<SimStore>,
    document: Arc<SimStore>,
}

fn fixture(choice: BackendChoice) -> Fixture {
    let relational = Arc::new(SimStore::new(SimConfig::with_seed(42)));
    let document = Arc::new(SimStore::new(SimConfig::with_seed(43)));
    let router = StorageRouter::new(
        Arc::clone(&relational) as Arc<dyn RecordStore>,
        Some(Arc::clone(&document) as Arc<dyn DocumentStore>),
        choice,
    );
    Fixture {
        router,
        relational,
        document,
    }
}

#[tokio::test]
async fn create_then_read_round_trips_caller_fields() {
    let f = fixture(BackendSelection::Relational.into());

    let supplied = Record::new().with_field("name", "Ana").with_field("age", 29);
    let stored = f.router.create("users", &supplied).await.unwrap();

    let id = stored.id().expect("create assigns an id");
    assert!(stored.is_superset_of(&supplied));

    let fetched = f.router.read("users", id).await.unwrap().unwrap();
    assert_eq!(fetched, stored);
    assert_eq!(fetched.get_str("name"), Some("Ana"));
}

#[tokio::test]
async fn read_is_idempotent() {
    let f = fixture(BackendSelection::Relational.into());

    let stored = f
        .router
        .create("users", &Record::new().with_field("name", "Ana"))
        .await
        .unwrap();
    let id = stored.id().unwrap();

    let first = f.router.read("users", id).await.unwrap();
    let second = f.router.read("users", id).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn update_merges_and_delete_removes() {
    let f = fixture(BackendSelection::Document.into());

    let stored = f
        .router
        .create(
            "moods",
            &Record::new().with_field("mood", "low").with_field("note", "x"),
        )
        .await
        .unwrap();
    let id = stored.id().unwrap().to_string();

    let updated = f
        .router
        .update("moods", &id, &Record::new().with_field("mood", "calm"))
        .await
        .unwrap();
    assert_eq!(updated.get_str("mood"), Some("calm"));
    assert_eq!(updated.get_str("note"), Some("x"));

    assert!(f.router.delete("moods", &id).await.unwrap());
    assert!(f.router.read("moods", &id).await.unwrap().is_none());
    assert!(!f.router.delete("moods", &id).await.unwrap());
}

#[tokio::test]
async fn relational_selection_never_touches_document_backend() {
    let f = fixture(BackendSelection::Relational.into());

    let stored = f.router.create("users", &Record::new()).await.unwrap();
    let id = stored.id().unwrap().to_string();
    f.router.read("users", &id).await.unwrap();
    f.router
        .update("users", &id, &Record::new().with_field("n", 1))
        .await
        .unwrap();
    f.router.delete("users", &id).await.unwrap();

    assert_eq!(f.relational.operation_count(), 4);
    assert_eq!(f.document.operation_count(), 0);
}

#[tokio::test]
async fn document_selection_never_touches_relational_backend() {
    let f = fixture(BackendSelection::Document.into());

    f.router.create("users", &Record::new()).await.unwrap();
    f.router.read("users", "whatever").await.unwrap();

    assert_eq!(f.relational.operation_count(), 0);
    assert_eq!(f.document.operation_count(), 2);
}

#[tokio::test]
async fn unset_selection_falls_back_to_document_backend() {
    let f = fixture(BackendChoice::Unset);

    f.router.create("users", &Record::new()).await.unwrap();

    assert_eq!(f.relational.operation_count(), 0);
    assert_eq!(f.document.operation_count(), 1);
}

#[tokio::test]
async fn unrecognized_selection_disables_routing_entirely() {
    // "mongodb" is not a known backend; with both stores attached the
    // router must refuse to route rather than fall back to a default.
    let f = fixture(BackendChoice::parse("mongodb"));

    let err = f.router.create("users", &Record::new()).await.unwrap_err();
    assert!(matches!(err, RouterError::NoDatabaseAvailable));

    assert_eq!(f.relational.operation_count(), 0);
    assert_eq!(f.document.operation_count(), 0);
}

#[tokio::test]
async fn misconfigured_router_fails_every_operation_without_io() {
    let relational = Arc::new(SimStore::new(SimConfig::with_seed(42)));
    let router = StorageRouter::new(
        Arc::clone(&relational) as Arc<dyn RecordStore>,
        None,
        BackendSelection::Document.into(),
    );

    for result in [
        router.create("users", &Record::new()).await.err(),
        router.read("users", "x").await.err(),
        router
            .update("users", "x", &Record::new())
            .await
            .err(),
        router.delete("users", "x").await.err(),
    ] {
        assert!(matches!(result, Some(RouterError::NoDatabaseAvailable)));
    }

    assert_eq!(relational.operation_count(), 0);
}

#[tokio::test]
async fn duplicate_id_surfaces_backend_error() {
    let f = fixture(BackendSelection::Relational.into());

    let data = Record::new().with_field("id", "user-7").with_field("name", "Ana");
    f.router.create("users", &data).await.unwrap();

    let err = f.router.create("users", &data).await.unwrap_err();
    assert_eq!(err.to_string(), "duplicate key: user-7");
}
