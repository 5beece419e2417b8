//! Storage - Backend Traits and Implementations
//!
//! `TigerStyle`: Abstract storage with simulation-first testing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │            RecordStore / DocumentStore Traits                │
//! └─────────────────────────────────────────────────────────────┘
//!          ↑                    ↑                    ↑
//!          │                    │                    │
//! ┌────────┴────────┐  ┌────────┴────────┐  ┌───────┴────────┐
//! │    SimStore     │  │  PostgresStore  │  │ FirestoreStore │
//! │   (testing)     │  │  (relational)   │  │  (document)    │
//! └─────────────────┘  └─────────────────┘  └────────────────┘
//! ```
//!
//! # Simulation-First
//!
//! Router behavior is tested against `SimStore` with deterministic fault
//! injection before the production backends. All implementations satisfy the
//! same trait contracts.

mod backend;
mod error;
mod record;
mod sim;

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "firestore")]
mod firestore;

pub use backend::{DocumentStore, RecordStore};
pub use error::{StorageError, StorageResult};
pub use record::{Document, Record, RECORD_ID_FIELD};
pub use sim::SimStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

#[cfg(feature = "firestore")]
pub use firestore::FirestoreStore;
