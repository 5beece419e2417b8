//! Bulk Migration - Document Backend to Relational Backend
//!
//! `TigerStyle`: Sequential, continue-on-error, full per-document ledger.
//!
//! `copy_all` reads every document from a source collection and writes each
//! as a row in a target table, recording one [`MigrationEntry`] per source
//! document in source order. A failed document never aborts the run.
//!
//! The entire source collection is materialized in memory before the first
//! write. This keeps the ledger ordering trivially correct and makes a run
//! restartable from a clean read, at the cost of holding every document at
//! once. Collections beyond [`MIGRATION_DOCUMENTS_COUNT_MAX`] log a warning;
//! a streaming migration is the escape hatch if that bound ever binds.

use serde::{Deserialize, Serialize};

use crate::constants::{
    MIGRATION_DOCUMENTS_COUNT_MAX, MIGRATION_SOURCE_ID_FIELD, MIGRATION_TIMESTAMP_FIELD,
};
use crate::router::{RouterResult, StorageRouter};
use crate::storage::RECORD_ID_FIELD;

// =============================================================================
// MigrationEntry
// =============================================================================

/// Outcome of migrating one source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MigrationEntry {
    /// Whether the document landed in the target table
    pub success: bool,
    /// Id of the source document
    pub source_id: String,
    /// Id of the created target row; None on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    /// Error message; None on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MigrationEntry {
    /// Entry for a document that reached the target.
    #[must_use]
    pub fn succeeded(source_id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            success: true,
            source_id: source_id.into(),
            target_id: Some(target_id.into()),
            error: None,
        }
    }

    /// Entry for a document that failed to migrate.
    #[must_use]
    pub fn failed(source_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            source_id: source_id.into(),
            target_id: None,
            error: Some(error.into()),
        }
    }
}

// =============================================================================
// MigrationReport
// =============================================================================

/// Full ledger of one `copy_all` run, in source order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationReport {
    /// One entry per source document, ordered as enumerated
    pub entries: Vec<MigrationEntry>,
}

impl MigrationReport {
    /// Number of documents that migrated.
    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.entries.iter().filter(|e| e.success).count()
    }

    /// Number of documents that failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| !e.success).count()
    }

    /// Whether every document migrated.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.entries.iter().all(|e| e.success)
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the source collection was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, MigrationEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a MigrationReport {
    type Item = &'a MigrationEntry;
    type IntoIter = std::slice::Iter<'a, MigrationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// =============================================================================
// copy_all
// =============================================================================

impl StorageRouter {
    /// Copy every document in `source_collection` to `target_table`.
    ///
    /// Always runs document backend → relational backend, independent of
    /// which backend serves CRUD traffic. Documents are processed
    /// sequentially in enumeration order; a per-document failure is
    /// recorded in the ledger and processing continues.
    ///
    /// Each target row carries the source data verbatim plus:
    /// - `firebase_id`: the source document id (overwrites any such field)
    /// - `migrated_at`: RFC 3339 timestamp captured at that row's insertion
    ///   attempt
    ///
    /// # Errors
    ///
    /// - [`RouterError::DocumentBackendUnavailable`] if no document backend
    ///   is attached; raised before any I/O
    /// - [`RouterError::Storage`] if enumerating the source fails; per-document
    ///   write failures go in the ledger, never here
    ///
    /// [`RouterError::DocumentBackendUnavailable`]: crate::router::RouterError::DocumentBackendUnavailable
    /// [`RouterError::Storage`]: crate::router::RouterError::Storage
    #[tracing::instrument(skip(self))]
    pub async fn copy_all(
        &self,
        source_collection: &str,
        target_table: &str,
    ) -> RouterResult<MigrationReport> {
        // Precondition: fail before touching either backend
        let source = self.document()?;

        // Full materialization: ledger order == enumeration order
        let documents = source.list_documents(source_collection).await?;

        if documents.len() > MIGRATION_DOCUMENTS_COUNT_MAX {
            tracing::warn!(
                source_collection,
                documents_count = documents.len(),
                documents_count_max = MIGRATION_DOCUMENTS_COUNT_MAX,
                "source collection exceeds in-memory migration bound"
            );
        }

        tracing::info!(
            source_collection,
            target_table,
            documents_count = documents.len(),
            "starting migration"
        );

        let mut report = MigrationReport::default();

        for document in documents {
            if document.id.is_empty() {
                report
                    .entries
                    .push(MigrationEntry::failed("", "source document has no id"));
                continue;
            }

            // Timestamp per insertion attempt, not per run
            let migrated_at = self.now().to_rfc3339();

            let mut row = document.data.clone();
            row.set(MIGRATION_SOURCE_ID_FIELD, document.id.as_str());
            row.set(MIGRATION_TIMESTAMP_FIELD, migrated_at.as_str());
            // Any source `id` field is dropped; the document id survives as
            // `firebase_id` and the target mints a fresh row id
            row.remove(RECORD_ID_FIELD);

            match self.relational().create(target_table, &row).await {
                Ok(stored) => {
                    let target_id = stored.id().unwrap_or_default().to_string();
                    report
                        .entries
                        .push(MigrationEntry::succeeded(document.id, target_id));
                }
                Err(e) => {
                    tracing::warn!(
                        source_id = %document.id,
                        error = %e,
                        "document failed to migrate; continuing"
                    );
                    report
                        .entries
                        .push(MigrationEntry::failed(document.id, e.to_string()));
                }
            }
        }

        tracing::info!(
            source_collection,
            target_table,
            succeeded_count = report.succeeded_count(),
            failed_count = report.failed_count(),
            "migration finished"
        );

        // Postcondition: one ledger entry per source document
        Ok(report)
    }
}

// =============================================================================
// Tests
// =============================================================================
