//! `FaultInjector` - Probabilistic Fault Injection
//!
//! `TigerStyle`: Explicit fault injection for chaos testing.

use std::collections::HashMap;
use std::sync::Mutex;

use super::rng::DeterministicRng;
use crate::constants::DST_FAULT_PROBABILITY_MAX;

/// Types of faults that can be injected.
///
/// `TigerStyle`: Every fault type is explicit and documented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultType {
    // =========================================================================
    // Storage Faults
    // =========================================================================
    /// Write operation fails
    StorageWriteFail,
    /// Read operation fails
    StorageReadFail,
    /// Delete operation fails
    StorageDeleteFail,

    // =========================================================================
    // Database Faults
    // =========================================================================
    /// Connection fails
    DbConnectionFail,
    /// Query timeout
    DbQueryTimeout,

    // =========================================================================
    // Document Store Faults
    // =========================================================================
    /// Full-collection enumeration fails
    DocListFail,
}

impl FaultType {
    /// Get the fault type name as a string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StorageWriteFail => "storage_write_fail",
            Self::StorageReadFail => "storage_read_fail",
            Self::StorageDeleteFail => "storage_delete_fail",
            Self::DbConnectionFail => "db_connection_fail",
            Self::DbQueryTimeout => "db_query_timeout",
            Self::DocListFail => "doc_list_fail",
        }
    }
}

/// Configuration for a specific fault.
#[derive(Debug, Clone)]
pub struct FaultConfig {
    /// The type of fault
    pub fault_type: FaultType,
    /// Probability of injection (0.0 to 1.0)
    pub probability: f64,
    /// Optional operation filter (substring match)
    pub operation_filter: Option<String>,
    /// Maximum number of injections (None = unlimited)
    pub max_injections: Option<u64>,
}

impl FaultConfig {
    /// Create a new fault configuration.
    ///
    /// # Panics
    /// Panics if probability is not in [0, 1].
    #[must_use]
    pub fn new(fault_type: FaultType, probability: f64) -> Self {
        // Precondition
        assert!(
            (0.0..=DST_FAULT_PROBABILITY_MAX).contains(&probability),
            "probability must be in [0, {DST_FAULT_PROBABILITY_MAX}], got {probability}"
        );

        Self {
            fault_type,
            probability,
            operation_filter: None,
            max_injections: None,
        }
    }

    /// Set operation filter (fault only applies to matching operations).
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.operation_filter = Some(filter.into());
        self
    }

    /// Set maximum number of injections.
    #[must_use]
    pub fn with_max_injections(mut self, max: u64) -> Self {
        // Precondition
        assert!(max > 0, "max_injections must be positive");
        self.max_injections = Some(max);
        self
    }
}

/// Fault injector for simulation testing.
///
/// `TigerStyle`:
/// - Explicit fault registration
/// - Deterministic through RNG
/// - Interior mutability for sharing via Arc
#[derive(Debug)]
pub struct FaultInjector {
    /// RNG wrapped in Mutex so `should_inject` can take `&self`
    rng: Mutex<DeterministicRng>,
    configs: Vec<FaultConfig>,
    /// Injection counts per fault type
    injection_counts: Mutex<HashMap<FaultType, u64>>,
}

impl FaultInjector {
    /// Create a new fault injector with the given RNG.
    #[must_use]
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            configs: Vec::new(),
            injection_counts: Mutex::new(HashMap::new()),
        }
    }

    /// Register a fault configuration.
    ///
    /// Registration must happen before sharing via Arc.
    pub fn register(&mut self, config: FaultConfig) {
        self.injection_counts
            .lock()
            .unwrap()
            .entry(config.fault_type)
            .or_insert(0);
        self.configs.push(config);
    }

    /// Check if a fault should be injected for the given operation.
    ///
    /// Returns the fault type if one should be injected, None otherwise.
    pub fn should_inject(&self, operation: &str) -> Option<FaultType> {
        for config in &self.configs {
            if let Some(ref filter) = config.operation_filter {
                if !operation.contains(filter.as_str()) {
                    continue;
                }
            }

            if let Some(max) = config.max_injections {
                let counts = self.injection_counts.lock().unwrap();
                let count = counts.get(&config.fault_type).copied().unwrap_or(0);
                if count >= max {
                    continue;
                }
            }

            let should_inject = {
                let mut rng = self.rng.lock().unwrap();
                rng.next_bool(config.probability)
            };

            if should_inject {
                let mut counts = self.injection_counts.lock().unwrap();
                *counts.entry(config.fault_type).or_insert(0) += 1;
                return Some(config.fault_type);
            }
        }

        None
    }

    /// Get injection counts per fault type name.
    #[must_use]
    pub fn injection_stats(&self) -> HashMap<String, u64> {
        self.injection_counts
            .lock()
            .unwrap()
            .iter()
            .map(|(fault_type, count)| (fault_type.as_str().to_string(), *count))
            .collect()
    }

    /// Get total number of injections.
    #[must_use]
    pub fn total_injections(&self) -> u64 {
        self.injection_counts.lock().unwrap().values().sum()
    }

    /// Reset all statistics.
    pub fn reset_stats(&self) {
        let mut counts = self.injection_counts.lock().unwrap();
        for count in counts.values_mut() {
            *count = 0;
        }
    }
}

/// Builder for `FaultInjector`.
///
/// `TigerStyle`: Builder pattern for clean configuration before sharing via Arc.
pub struct FaultInjectorBuilder {
    rng: DeterministicRng,
    configs: Vec<FaultConfig>,
}

impl FaultInjectorBuilder {
    /// Create a new builder with the given RNG.
    #[must_use]
    pub fn new(rng: DeterministicRng) -> Self {
        Self {
            rng,
            configs: Vec::new(),
        }
    }

    /// Add a fault configuration.
    #[must_use]
    pub fn with_fault(mut self, config: FaultConfig) -> Self {
        self.configs.push(config);
        self
    }

    /// Add common storage faults (read + write).
    #[must_use]
    pub fn with_storage_faults(self, probability: f64) -> Self {
        self.with_fault(FaultConfig::new(FaultType::StorageWriteFail, probability))
            .with_fault(FaultConfig::new(FaultType::StorageReadFail, probability))
    }

    /// Build the `FaultInjector`.
    #[must_use]
    pub fn build(self) -> FaultInjector {
        let mut injector = FaultInjector::new(self.rng);
        for config in self.configs {
            injector.register(config);
        }
        injector
    }
}
