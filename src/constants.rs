//! `TigerStyle` Constants
//!
//! All limits use big-endian naming: `CATEGORY_SPECIFICS_UNIT_LIMIT`
//! Example: `RECORD_ID_BYTES_MAX` (not `MAX_RECORD_ID`)
//!
//! Every constant includes units in the name:
//! - `_BYTES_MAX` for size limits
//! - `_COUNT_MAX` for quantity limits
//! - `_MS` for milliseconds

// =============================================================================
// Collection / Record Limits
// =============================================================================

/// Maximum length of a collection or table name
pub const COLLECTION_NAME_BYTES_MAX: usize = 128;

/// Maximum length of a record identifier
pub const RECORD_ID_BYTES_MAX: usize = 128;

// =============================================================================
// Migration Limits
// =============================================================================

/// Upper bound on documents handled in one migration run.
///
/// `copy_all` materializes the entire source collection in memory before
/// processing, so it is only suitable for bounded collections. This
/// constant documents that bound; crossing it logs a warning.
pub const MIGRATION_DOCUMENTS_COUNT_MAX: usize = 100_000;

/// Field added to each migrated row holding the source document id
pub const MIGRATION_SOURCE_ID_FIELD: &str = "firebase_id";

/// Field added to each migrated row holding the migration timestamp
pub const MIGRATION_TIMESTAMP_FIELD: &str = "migrated_at";

// =============================================================================
// Postgres Backend Limits
// =============================================================================

/// Maximum connections in the Postgres pool
pub const POSTGRES_POOL_CONNECTIONS_COUNT_MAX: u32 = 10;

// =============================================================================
// Firestore Backend Limits
// =============================================================================

/// Page size for full-collection enumeration
pub const FIRESTORE_LIST_PAGE_SIZE_COUNT: usize = 300;

/// Request timeout for Firestore REST calls
pub const FIRESTORE_REQUEST_TIMEOUT_MS: u64 = 30_000;

// =============================================================================
// DST (Deterministic Simulation Testing) Limits
// =============================================================================

/// Maximum fault injection probability
pub const DST_FAULT_PROBABILITY_MAX: f64 = 1.0;

/// Maximum number of simulation steps
pub const DST_SIMULATION_STEPS_MAX: u64 = 1_000_000;

/// Maximum single time advance in simulated milliseconds
pub const DST_TIME_ADVANCE_MS_MAX: u64 = 86_400_000; // 24 hours

/// Milliseconds per second
pub const TIME_MS_PER_SEC: u64 = 1000;
