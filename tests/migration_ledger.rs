//! Integration tests for `copy_all` migration ledgers.
//!
//! The migration contract in one line: every source document gets exactly
//! one ledger entry, in enumeration order, and a failed document never
//! stops the run.

use std::sync::Arc;

use mindmap_storage::dst::SimConfig;
use mindmap_storage::router::{BackendSelection, RouterError, StorageRouter};
use mindmap_storage::storage::{DocumentStore, Record, RecordStore, SimStore};

struct Fixture {
    router: StorageRouter,
    relational: Arc<SimStore>,
    document: Arc<SimStore>,
}

fn fixture() -> Fixture {
    let relational = Arc::new(SimStore::new(SimConfig::with_seed(1)));
    let document = Arc::new(SimStore::new(SimConfig::with_seed(2)));
    let router = StorageRouter::new(
        Arc::clone(&relational) as Arc<dyn RecordStore>,
        Some(Arc::clone(&document) as Arc<dyn DocumentStore>),
        BackendSelection::Relational.into(),
    );
    Fixture {
        router,
        relational,
        document,
    }
}

async fn seed_legacy(document: &SimStore, count: usize) {
    for i in 0..count {
        let data = Record::new()
            .with_field("id", format!("legacy-{i:03}"))
            .with_field("title", format!("note {i}"))
            .with_field("tags", serde_json::json!(["research", i]));
        document.create("legacy_notes", &data).await.unwrap();
    }
}

#[tokio::test]
async fn ledger_has_one_entry_per_document_in_source_order() {
    let f = fixture();
    seed_legacy(&f.document, 20).await;

    let report = f.router.copy_all("legacy_notes", "notes").await.unwrap();

    assert_eq!(report.len(), 20);
    assert!(report.is_complete_success());
    let source_ids: Vec<&str> = report.iter().map(|e| e.source_id.as_str()).collect();
    let expected: Vec<String> = (0..20).map(|i| format!("legacy-{i:03}")).collect();
    assert_eq!(source_ids, expected);
}

#[tokio::test]
async fn migrated_rows_preserve_data_and_gain_provenance() {
    let f = fixture();
    seed_legacy(&f.document, 3).await;

    let report = f.router.copy_all("legacy_notes", "notes").await.unwrap();

    for (i, entry) in report.iter().enumerate() {
        assert!(entry.success);
        assert!(entry.error.is_none());
        let target_id = entry.target_id.as_deref().expect("success carries target id");

        let row = f.relational.read("notes", target_id).await.unwrap().unwrap();
        assert_eq!(row.get_str("title"), Some(format!("note {i}").as_str()));
        assert_eq!(row.get_str("firebase_id"), Some(entry.source_id.as_str()));
        let migrated_at = row.get_str("migrated_at").expect("row carries timestamp");
        assert!(chrono::DateTime::parse_from_rfc3339(migrated_at).is_ok());
    }
}

#[tokio::test]
async fn failed_document_is_recorded_and_the_run_continues() {
    let f = fixture();
    seed_legacy(&f.document, 3).await;

    // Ids in the target come from its seeded rng; a twin store with the
    // same seed reveals the id the second migrated row will get. Occupying
    // it forces a duplicate-key failure for exactly that document.
    let twin = SimStore::new(SimConfig::with_seed(1));
    twin.create("t", &Record::new()).await.unwrap();
    let second_id = twin
        .create("t", &Record::new())
        .await
        .unwrap()
        .id()
        .unwrap()
        .to_string();
    f.relational
        .create("notes", &Record::new().with_field("id", second_id.as_str()))
        .await
        .unwrap();

    let report = f.router.copy_all("legacy_notes", "notes").await.unwrap();

    assert_eq!(report.len(), 3);
    assert_eq!(report.succeeded_count(), 2);
    assert_eq!(report.failed_count(), 1);
    assert!(!report.is_complete_success());

    let outcomes: Vec<bool> = report.iter().map(|e| e.success).collect();
    assert_eq!(outcomes, vec![true, false, true]);

    let failed = &report.entries[1];
    assert_eq!(failed.source_id, "legacy-001");
    assert_eq!(failed.target_id, None);
    assert_eq!(
        failed.error.as_deref(),
        Some(format!("duplicate key: {second_id}").as_str())
    );
}

#[tokio::test]
async fn document_without_id_gets_a_failed_entry() {
    let f = fixture();

    // An empty string is a valid map key for the sim store, but migration
    // refuses to mint provenance from it.
    f.document
        .create(
            "legacy_notes",
            &Record::new().with_field("id", "").with_field("title", "orphan"),
        )
        .await
        .unwrap();
    f.document
        .create(
            "legacy_notes",
            &Record::new().with_field("id", "legacy-ok"),
        )
        .await
        .unwrap();

    let report = f.router.copy_all("legacy_notes", "notes").await.unwrap();

    assert_eq!(report.len(), 2);
    assert!(!report.entries[0].success);
    assert_eq!(report.entries[0].source_id, "");
    assert_eq!(
        report.entries[0].error.as_deref(),
        Some("source document has no id")
    );
    assert!(report.entries[1].success);
    assert_eq!(f.relational.record_count("notes"), 1);
}

#[tokio::test]
async fn migration_without_document_backend_fails_before_io() {
    let relational = Arc::new(SimStore::new(SimConfig::with_seed(1)));
    let router = StorageRouter::new(
        Arc::clone(&relational) as Arc<dyn RecordStore>,
        None,
        BackendSelection::Relational.into(),
    );

    let err = router.copy_all("legacy_notes", "notes").await.unwrap_err();
    assert!(matches!(err, RouterError::DocumentBackendUnavailable));
    assert_eq!(relational.operation_count(), 0);
}

#[tokio::test]
async fn migration_runs_document_to_relational_even_under_document_selection() {
    let relational = Arc::new(SimStore::new(SimConfig::with_seed(1)));
    let document = Arc::new(SimStore::new(SimConfig::with_seed(2)));
    let router = StorageRouter::new(
        Arc::clone(&relational) as Arc<dyn RecordStore>,
        Some(Arc::clone(&document) as Arc<dyn DocumentStore>),
        BackendSelection::Document.into(),
    );
    seed_legacy(&document, 2).await;

    let report = router.copy_all("legacy_notes", "notes").await.unwrap();

    assert!(report.is_complete_success());
    // Rows landed in the relational backend, not back in the document store
    assert_eq!(relational.record_count("notes"), 2);
    assert_eq!(document.record_count("notes"), 0);
}

#[tokio::test]
async fn empty_source_collection_is_a_complete_success() {
    let f = fixture();

    let report = f.router.copy_all("legacy_notes", "notes").await.unwrap();

    assert!(report.is_empty());
    assert!(report.is_complete_success());
    assert_eq!(report.succeeded_count(), 0);
    assert_eq!(report.failed_count(), 0);
}

#[tokio::test]
async fn rerunning_a_migration_reports_fresh_target_ids() {
    let f = fixture();
    seed_legacy(&f.document, 2).await;

    let first = f.router.copy_all("legacy_notes", "notes").await.unwrap();
    let second = f.router.copy_all("legacy_notes", "notes").await.unwrap();

    // No dedup by design: the second run inserts new rows under new ids
    assert!(first.is_complete_success());
    assert!(second.is_complete_success());
    assert_eq!(f.relational.record_count("notes"), 4);

    let first_ids: Vec<_> = first.iter().map(|e| e.target_id.clone()).collect();
    let second_ids: Vec<_> = second.iter().map(|e| e.target_id.clone()).collect();
    assert_ne!(first_ids, second_ids);
}
