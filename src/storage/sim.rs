//! `SimStore` - In-Memory Storage for Testing
//!
//! `TigerStyle`: Deterministic testing with fault injection.
//!
//! # Simulation-First
//!
//! `SimStore` implements both backend roles ([`RecordStore`] and
//! [`DocumentStore`]), so one type can stand in for the relational target,
//! the document source, or both sides of a migration. Ids come from a seeded
//! RNG and enumeration preserves insertion order, so whole migration ledgers
//! replay byte-identical from a seed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::constants::RECORD_ID_BYTES_MAX;
use crate::dst::{DeterministicRng, FaultConfig, FaultInjector, SimConfig};

use super::backend::{DocumentStore, RecordStore};
use super::error::{StorageError, StorageResult};
use super::record::{Document, Record, RECORD_ID_FIELD};

// =============================================================================
// SimCollection
// =============================================================================

/// One in-memory collection with stable insertion order.
#[derive(Debug, Default)]
struct SimCollection {
    /// Ids in insertion order, for deterministic enumeration
    order: Vec<String>,
    records: HashMap<String, Record>,
}

impl SimCollection {
    fn insert(&mut self, id: String, record: Record) {
        self.order.push(id.clone());
        self.records.insert(id, record);
    }

    fn remove(&mut self, id: &str) -> Option<Record> {
        let removed = self.records.remove(id);
        if removed.is_some() {
            self.order.retain(|existing| existing != id);
        }
        removed
    }
}

// =============================================================================
// SimStore
// =============================================================================

/// In-memory storage backend for testing.
///
/// `TigerStyle`:
/// - Deterministic via `DeterministicRng`-assigned ids
/// - Fault injection via `FaultInjector`
/// - Thread-safe with `RwLock`; clones share state
#[derive(Debug, Clone)]
pub struct SimStore {
    /// Collections indexed by name
    collections: Arc<RwLock<HashMap<String, SimCollection>>>,
    /// Fault injector for simulating failures
    fault_injector: Arc<FaultInjector>,
    /// Deterministic RNG for id assignment
    rng: Arc<RwLock<DeterministicRng>>,
    /// Total CRUD/list calls received, counted before fault checks
    operation_count: Arc<AtomicU64>,
}

impl SimStore {
    /// Create a new `SimStore` with the given config.
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        let mut rng = DeterministicRng::new(config.seed());
        let fault_rng = rng.fork();

        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            fault_injector: Arc::new(FaultInjector::new(fault_rng)),
            rng: Arc::new(RwLock::new(rng)),
            operation_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a `SimStore` sharing an external `FaultInjector`.
    ///
    /// Lets one injector drive faults across several stores in a test.
    #[must_use]
    pub fn with_fault_injector(config: SimConfig, fault_injector: Arc<FaultInjector>) -> Self {
        let rng = DeterministicRng::new(config.seed());

        Self {
            collections: Arc::new(RwLock::new(HashMap::new())),
            fault_injector,
            rng: Arc::new(RwLock::new(rng)),
            operation_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Add a fault configuration.
    ///
    /// Must be called before the store is cloned or shared; `FaultInjector`
    /// registration needs exclusive access to the Arc.
    #[must_use]
    pub fn with_faults(mut self, config: FaultConfig) -> Self {
        Arc::get_mut(&mut self.fault_injector)
            .expect("cannot add faults after store is shared")
            .register(config);
        self
    }

    /// Get the fault injector for inspection.
    #[must_use]
    pub fn fault_injector(&self) -> &Arc<FaultInjector> {
        &self.fault_injector
    }

    /// Total operations received (including ones that faulted).
    #[must_use]
    pub fn operation_count(&self) -> u64 {
        self.operation_count.load(Ordering::SeqCst)
    }

    /// Number of records in a collection (for testing).
    #[must_use]
    pub fn record_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .unwrap()
            .get(collection)
            .map_or(0, |c| c.records.len())
    }

    fn track_operation(&self) {
        self.operation_count.fetch_add(1, Ordering::SeqCst);
    }

    /// Check if a fault should be injected for an operation.
    fn maybe_inject_fault(&self, operation: &str) -> StorageResult<()> {
        if let Some(fault_type) = self.fault_injector.should_inject(operation) {
            Err(StorageError::simulated_fault(format!(
                "{} during {operation}",
                fault_type.as_str()
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecordStore for SimStore {
    #[tracing::instrument(skip(self, data))]
    async fn create(&self, collection: &str, data: &Record) -> StorageResult<Record> {
        self.track_operation();
        self.maybe_inject_fault("create")?;

        // Preconditions
        assert!(!collection.is_empty(), "collection must be named");

        let id = match data.id() {
            Some(supplied) => supplied.to_string(),
            None => self.rng.write().unwrap().next_record_id(),
        };
        assert!(id.len() <= RECORD_ID_BYTES_MAX, "record id too long");

        let mut collections = self.collections.write().unwrap();
        let entry = collections.entry(collection.to_string()).or_default();

        if entry.records.contains_key(&id) {
            return Err(StorageError::already_exists(id));
        }

        let mut stored = data.clone();
        stored.set(RECORD_ID_FIELD, id.clone());
        entry.insert(id, stored.clone());

        Ok(stored)
    }

    #[tracing::instrument(skip(self))]
    async fn read(&self, collection: &str, id: &str) -> StorageResult<Option<Record>> {
        self.track_operation();
        self.maybe_inject_fault("read")?;

        let collections = self.collections.read().unwrap();
        Ok(collections
            .get(collection)
            .and_then(|c| c.records.get(id))
            .cloned())
    }

    #[tracing::instrument(skip(self, data))]
    async fn update(&self, collection: &str, id: &str, data: &Record) -> StorageResult<Record> {
        self.track_operation();
        self.maybe_inject_fault("update")?;

        let mut collections = self.collections.write().unwrap();
        let record = collections
            .get_mut(collection)
            .and_then(|c| c.records.get_mut(id))
            .ok_or_else(|| StorageError::not_found(id))?;

        record.merge(data);
        // The stored id wins over any id field in the patch
        record.set(RECORD_ID_FIELD, id);

        Ok(record.clone())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, collection: &str, id: &str) -> StorageResult<bool> {
        self.track_operation();
        self.maybe_inject_fault("delete")?;

        let mut collections = self.collections.write().unwrap();
        Ok(collections
            .get_mut(collection)
            .and_then(|c| c.remove(id))
            .is_some())
    }
}

#[async_trait]
impl DocumentStore for SimStore {
    #[tracing::instrument(skip(self))]
    async fn list_documents(&self, collection: &str) -> StorageResult<Vec<Document>> {
        self.track_operation();
        self.maybe_inject_fault("list")?;

        let collections = self.collections.read().unwrap();
        let Some(coll) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let documents: Vec<Document> = coll
            .order
            .iter()
            .map(|id| {
                let record = coll.records.get(id).cloned().unwrap_or_default();
                Document::new(id.clone(), record)
            })
            .collect();

        // Postcondition
        assert_eq!(
            documents.len(),
            coll.records.len(),
            "enumeration must cover every document"
        );

        Ok(documents)
    }
}

// =============================================================================
// TESTS - Written FIRST (Simulation-First)
// =============================================================================


// =============================================================================
// DST Tests - Fault Injection
// =============================================================================
