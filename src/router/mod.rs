//! Storage Router - Dual-Backend CRUD Dispatch
//!
//! `TigerStyle`: One backend resolved at construction, no per-call branching.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       StorageRouter                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  primary: resolved once from BackendChoice                  │
//! │  relational: Arc<dyn RecordStore>   (migration target)      │
//! │  document:   Arc<dyn DocumentStore> (migration source)      │
//! └─────────────────────────────────────────────────────────────┘
//!            │ create/read/update/delete │ copy_all
//!            ▼                           ▼
//!     exactly one backend        document → relational
//! ```
//!
//! The router is an explicitly constructed component: build it once per
//! process and inject it into consumers. It holds no state beyond its
//! backend handles, performs no validation, retries, or failover, and
//! propagates backend errors unmodified. Callers needing deadlines wrap
//! calls externally.

mod migration;

pub use migration::{MigrationEntry, MigrationReport};

use std::sync::Arc;

use thiserror::Error;

use crate::dst::SimClock;
use crate::storage::{DocumentStore, Record, RecordStore, StorageError};

// =============================================================================
// BackendSelection
// =============================================================================

/// Which backend serves CRUD traffic for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendSelection {
    /// Route CRUD calls to the relational backend
    Relational,
    /// Route CRUD calls to the document backend
    Document,
}

impl BackendSelection {
    /// Parse a configuration value.
    ///
    /// Returns None for unrecognized values.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "relational" | "postgres" => Some(Self::Relational),
            "document" | "firestore" => Some(Self::Document),
            _ => None,
        }
    }

    /// Get string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relational => "relational",
            Self::Document => "document",
        }
    }
}

// =============================================================================
// BackendChoice
// =============================================================================

/// How the CRUD backend was configured.
///
/// Unset and invalid are different states with different outcomes: an unset
/// choice falls back to the document backend, an invalid one resolves to no
/// primary and every CRUD call fails.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackendChoice {
    /// No value configured; the document backend serves CRUD if attached
    #[default]
    Unset,
    /// A recognized backend
    Selected(BackendSelection),
    /// An unrecognized configured value; no backend serves CRUD
    Invalid(String),
}

impl BackendChoice {
    /// Classify a raw configuration value.
    ///
    /// Unrecognized values are carried as [`BackendChoice::Invalid`] so the
    /// router can refuse them instead of silently falling back.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match BackendSelection::parse(value) {
            Some(selection) => Self::Selected(selection),
            None => Self::Invalid(value.to_string()),
        }
    }

    /// The recognized selection, if any.
    #[must_use]
    pub fn selection(&self) -> Option<BackendSelection> {
        match self {
            Self::Selected(selection) => Some(*selection),
            Self::Unset | Self::Invalid(_) => None,
        }
    }
}

impl From<BackendSelection> for BackendChoice {
    fn from(selection: BackendSelection) -> Self {
        Self::Selected(selection)
    }
}

// =============================================================================
// RouterError
// =============================================================================

/// Errors surfaced by the router itself.
///
/// Backend failures pass through [`RouterError::Storage`] unmodified.
#[derive(Debug, Clone, Error)]
pub enum RouterError {
    /// No backend resolvable for CRUD calls.
    ///
    /// Fatal configuration error: the selection named a backend that was
    /// not supplied (or was unrecognized). Not retryable.
    #[error("no database available")]
    NoDatabaseAvailable,

    /// Migration requested without a document backend.
    ///
    /// Raised before any I/O; a precondition violation, not a partial result.
    #[error("document backend unavailable: migration has no source")]
    DocumentBackendUnavailable,

    /// A backend operation failed; propagated verbatim.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

// =============================================================================
// StorageRouter
// =============================================================================

/// Routes CRUD calls to exactly one backend, chosen at construction.
///
/// `TigerStyle`:
/// - Selection happens once; calls dispatch through one resolved handle
/// - No hidden global state: construct and inject
/// - Migration (`copy_all`) always runs document → relational, regardless
///   of which backend serves CRUD traffic
#[derive(Clone)]
pub struct StorageRouter {
    /// Backend serving CRUD traffic; None means misconfigured
    primary: Option<Arc<dyn RecordStore>>,
    /// Migration target
    relational: Arc<dyn RecordStore>,
    /// Migration source; absent if document backend init failed
    document: Option<Arc<dyn DocumentStore>>,
    /// Choice the router resolved with
    choice: BackendChoice,
    /// Simulated time source; tests pin `migrated_at` with this
    clock: Option<SimClock>,
}

impl StorageRouter {
    /// Create a router.
    ///
    /// Resolution:
    /// - `Selected(Relational)` → the relational handle
    /// - `Selected(Document)` or `Unset` → the document handle, if present
    /// - `Invalid` or a missing handle → no primary; every CRUD call fails
    ///   with [`RouterError::NoDatabaseAvailable`]
    #[must_use]
    pub fn new(
        relational: Arc<dyn RecordStore>,
        document: Option<Arc<dyn DocumentStore>>,
        choice: BackendChoice,
    ) -> Self {
        let primary: Option<Arc<dyn RecordStore>> = match &choice {
            BackendChoice::Selected(BackendSelection::Relational) => Some(Arc::clone(&relational)),
            BackendChoice::Selected(BackendSelection::Document) | BackendChoice::Unset => document
                .as_ref()
                .map(|store| Arc::clone(store) as Arc<dyn RecordStore>),
            BackendChoice::Invalid(_) => None,
        };

        if primary.is_none() {
            tracing::warn!(
                choice = ?choice,
                "no primary backend resolved; CRUD calls will fail"
            );
        }

        Self {
            primary,
            relational,
            document,
            choice,
            clock: None,
        }
    }

    /// Build a router from configuration, connecting the configured backends.
    ///
    /// The relational backend anchors the router (it is the migration
    /// target), so a missing postgres config is a hard error. A missing
    /// firestore config leaves the document side unattached; CRUD then
    /// works only under a relational selection, and `copy_all` fails.
    ///
    /// # Errors
    ///
    /// - [`RouterError::NoDatabaseAvailable`] if no postgres config is present
    /// - [`RouterError::Storage`] if a backend connection fails
    #[cfg(all(feature = "postgres", feature = "firestore"))]
    pub async fn from_config(config: &crate::config::StorageConfig) -> RouterResult<Self> {
        use crate::storage::{FirestoreStore, PostgresStore};

        let postgres_config = config
            .postgres
            .as_ref()
            .ok_or(RouterError::NoDatabaseAvailable)?;
        let relational = Arc::new(
            PostgresStore::with_pool_size(&postgres_config.database_url, postgres_config.pool_size)
                .await?,
        ) as Arc<dyn RecordStore>;

        let document = config.firestore.as_ref().map(|firestore_config| {
            let mut store = FirestoreStore::new(&firestore_config.project_id)
                .with_database_id(&firestore_config.database_id);
            if let Some(token) = &firestore_config.auth_token {
                store = store.with_auth_token(token);
            }
            Arc::new(store) as Arc<dyn DocumentStore>
        });

        Ok(Self::new(relational, document, config.selection.clone()))
    }

    /// Drive `migrated_at` timestamps from a simulated clock.
    #[must_use]
    pub fn with_sim_clock(mut self, clock: SimClock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// The choice this router resolved with.
    #[must_use]
    pub fn choice(&self) -> &BackendChoice {
        &self.choice
    }

    /// The recognized selection this router resolved with, if any.
    #[must_use]
    pub fn selection(&self) -> Option<BackendSelection> {
        self.choice.selection()
    }

    /// Whether a document backend is attached.
    #[must_use]
    pub fn has_document_backend(&self) -> bool {
        self.document.is_some()
    }

    fn primary(&self) -> RouterResult<&Arc<dyn RecordStore>> {
        self.primary
            .as_ref()
            .ok_or(RouterError::NoDatabaseAvailable)
    }

    pub(crate) fn document(&self) -> RouterResult<&Arc<dyn DocumentStore>> {
        self.document
            .as_ref()
            .ok_or(RouterError::DocumentBackendUnavailable)
    }

    pub(crate) fn relational(&self) -> &Arc<dyn RecordStore> {
        &self.relational
    }

    /// Wall-clock time, or simulated time when pinned for tests.
    pub(crate) fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.clock
            .as_ref()
            .map_or_else(chrono::Utc::now, SimClock::now)
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    /// Persist a new record in the selected backend.
    #[tracing::instrument(skip(self, data))]
    pub async fn create(&self, collection: &str, data: &Record) -> RouterResult<Record> {
        Ok(self.primary()?.create(collection, data).await?)
    }

    /// Fetch a record by id from the selected backend.
    #[tracing::instrument(skip(self))]
    pub async fn read(&self, collection: &str, id: &str) -> RouterResult<Option<Record>> {
        Ok(self.primary()?.read(collection, id).await?)
    }

    /// Merge-write a record in the selected backend.
    #[tracing::instrument(skip(self, data))]
    pub async fn update(&self, collection: &str, id: &str, data: &Record) -> RouterResult<Record> {
        Ok(self.primary()?.update(collection, id, data).await?)
    }

    /// Delete a record from the selected backend.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, collection: &str, id: &str) -> RouterResult<bool> {
        Ok(self.primary()?.delete(collection, id).await?)
    }
}

impl std::fmt::Debug for StorageRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageRouter")
            .field("choice", &self.choice)
            .field("has_primary", &self.primary.is_some())
            .field("has_document_backend", &self.document.is_some())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
