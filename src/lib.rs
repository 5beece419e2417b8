//! # MindMap Storage
//!
//! A dual-backend storage router with deterministic simulation testing.
//!
//! ## Features
//!
//! - **🗄️ Dual Backends**: PostgreSQL for relational rows, Firestore for documents
//! - **🧭 One-Time Routing**: The CRUD backend is chosen once at construction; calls never branch
//! - **📦 Bulk Migration**: `copy_all` moves a document collection into a relational table with a full per-document ledger
//! - **💉 Injectable**: The router is an explicitly constructed component, built from config and passed to consumers
//! - **🎯 Deterministic Testing**: Full DST (Deterministic Simulation Testing) for reproducible fault injection
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use mindmap_storage::dst::SimConfig;
//! use mindmap_storage::router::{BackendSelection, StorageRouter};
//! use mindmap_storage::storage::{DocumentStore, Record, RecordStore, SimStore};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Deterministic in-memory backends (seeded, reproducible)
//! let relational = Arc::new(SimStore::new(SimConfig::with_seed(42)));
//! let document = Arc::new(SimStore::new(SimConfig::with_seed(43)));
//!
//! let router = StorageRouter::new(
//!     relational as Arc<dyn RecordStore>,
//!     Some(document as Arc<dyn DocumentStore>),
//!     BackendSelection::Relational.into(),
//! );
//!
//! let stored = router
//!     .create("users", &Record::new().with_field("name", "Ana"))
//!     .await?;
//! let fetched = router.read("users", stored.id().unwrap()).await?;
//! assert!(fetched.is_some());
//!
//! // Migrate a legacy document collection into a relational table
//! let report = router.copy_all("legacy_users", "users").await?;
//! println!("migrated {}/{}", report.succeeded_count(), report.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     StorageRouter                        │
//! ├─────────────────────────────────────────────────────────┤
//! │  create / read / update / delete  │  copy_all           │
//! │  (one backend, fixed at build)    │  (document → rows)  │
//! ├─────────────────────────────────────────────────────────┤
//! │  RecordStore                │ DocumentStore             │
//! │  PostgresStore, SimStore    │ FirestoreStore, SimStore  │
//! ├─────────────────────────────────────────────────────────┤
//! │  DST Framework              │ Fault injection + clock   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Core Components
//!
//! - [`StorageRouter`](router::StorageRouter) - CRUD dispatch plus bulk migration
//! - [`RecordStore`](storage::RecordStore) / [`DocumentStore`](storage::DocumentStore) - Backend traits
//! - [`StorageConfig`](config::StorageConfig) - Environment-driven configuration
//! - [`MigrationReport`](router::MigrationReport) - Per-document migration ledger
//!
//! ## Simulation-First Philosophy
//!
//! > "If you're not testing with fault injection, you're not testing."
//!
//! Every backend role has a deterministic simulation implementation:
//!
//! ```rust
//! use mindmap_storage::dst::{FaultConfig, FaultType, SimConfig};
//! use mindmap_storage::storage::SimStore;
//!
//! // 10% of writes fail; same seed, same failures
//! let store = SimStore::new(SimConfig::with_seed(42))
//!     .with_faults(FaultConfig::new(FaultType::StorageWriteFail, 0.1).with_filter("create"));
//! ```
//!
//! Set `DST_SEED` to replay a failing run.
//!
//! ## Feature Flags
//!
//! - `postgres` - PostgreSQL relational backend
//! - `firestore` - Firestore document backend
//! - `backends` - Both production backends

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod constants;
pub mod dst;
pub mod router;
pub mod storage;
pub mod telemetry;

// Re-export common types
pub use config::{FirestoreConfig, PostgresConfig, StorageConfig};
pub use constants::*;
pub use dst::{DeterministicRng, FaultConfig, FaultInjector, FaultType, SimClock, SimConfig};
pub use router::{
    BackendChoice, BackendSelection, MigrationEntry, MigrationReport, RouterError, RouterResult, StorageRouter,
};
pub use storage::{
    Document, DocumentStore, Record, RecordStore, SimStore, StorageError, StorageResult,
    RECORD_ID_FIELD,
};

#[cfg(feature = "firestore")]
pub use storage::FirestoreStore;
#[cfg(feature = "postgres")]
pub use storage::PostgresStore;
