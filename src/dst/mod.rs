//! DST - Deterministic Simulation Testing
//!
//! `TigerStyle`: All randomness is seeded, all time is controllable, all
//! faults are explicit. Same seed = same run = reproducible bugs.
//!
//! The simulation backend ([`crate::storage::SimStore`]) draws its ids from
//! [`DeterministicRng`], its timestamps from [`SimClock`], and its failures
//! from [`FaultInjector`]. Router tests sweep fault probabilities over many
//! seeds to exercise the migration ledger under partial failure.

mod clock;
mod config;
mod fault;
mod rng;

pub use clock::SimClock;
pub use config::SimConfig;
pub use fault::{FaultConfig, FaultInjector, FaultInjectorBuilder, FaultType};
pub use rng::DeterministicRng;
