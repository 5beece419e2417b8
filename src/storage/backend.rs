//! Storage Backend Traits
//!
//! `TigerStyle`: One abstract contract per backend role.
//!
//! # Simulation-First
//!
//! Router tests are written against [`super::SimStore`] before the
//! production backends. All implementations must satisfy the same contract.

use async_trait::async_trait;

use super::error::StorageResult;
use super::record::{Document, Record};

/// Abstract record storage over named collections.
///
/// A collection name maps to a table (relational backends) or a document
/// collection (document backends); no name translation is performed. The
/// contract does no validation, retries, or failover; errors surface to the
/// caller exactly as the backend raised them.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new record, returning it with its assigned `id` field.
    ///
    /// A caller-supplied `id` field is honored; otherwise the backend
    /// assigns one. Inserting an id that already exists is an error.
    async fn create(&self, collection: &str, data: &Record) -> StorageResult<Record>;

    /// Fetch a record by id.
    ///
    /// Returns None if the record does not exist.
    async fn read(&self, collection: &str, id: &str) -> StorageResult<Option<Record>>;

    /// Merge-write fields into an existing record, returning the result.
    ///
    /// Fails with `NotFound` if the id does not exist.
    async fn update(&self, collection: &str, id: &str, data: &Record) -> StorageResult<Record>;

    /// Delete a record by id.
    ///
    /// Returns true if the record existed and was deleted.
    async fn delete(&self, collection: &str, id: &str) -> StorageResult<bool>;
}

/// A record store that can additionally enumerate a whole collection.
///
/// This is the migration source contract. Enumeration materializes every
/// document in memory in one pass, so it suits bounded collections only
/// (see [`crate::constants::MIGRATION_DOCUMENTS_COUNT_MAX`]).
#[async_trait]
pub trait DocumentStore: RecordStore {
    /// Enumerate every document in a collection, in store iteration order.
    async fn list_documents(&self, collection: &str) -> StorageResult<Vec<Document>>;
}
