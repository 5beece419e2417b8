//! `SimConfig` - Simulation Configuration
//!
//! `TigerStyle`: Seed management for deterministic testing.

use std::env;

use rand::Rng;

use crate::constants::DST_SIMULATION_STEPS_MAX;

/// Configuration for a simulation run.
///
/// Immutable after creation; the seed is logged for reproducibility.
#[derive(Debug, Clone, Copy)]
pub struct SimConfig {
    /// Random seed for deterministic execution
    seed: u64,
    /// Maximum number of simulation steps
    steps_max: u64,
}

impl SimConfig {
    /// Create config with explicit seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            steps_max: DST_SIMULATION_STEPS_MAX,
        }
    }

    /// Create config from the `DST_SEED` env var, or a random seed.
    ///
    /// When the seed is random it is printed so failing runs can be replayed
    /// with `DST_SEED=<seed>`.
    ///
    /// # Panics
    /// Panics if `DST_SEED` is set but not a valid u64.
    #[must_use]
    pub fn from_env_or_random() -> Self {
        let seed = match env::var("DST_SEED") {
            Ok(seed_str) => seed_str
                .parse::<u64>()
                .unwrap_or_else(|_| panic!("DST_SEED must be a valid u64, got: {seed_str}")),
            Err(_) => {
                let seed = rand::thread_rng().gen::<u64>();
                eprintln!("DST: Generated random seed (replay with DST_SEED={seed})");
                seed
            }
        };

        Self::with_seed(seed)
    }

    /// Get the seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Get the maximum number of steps.
    #[must_use]
    pub fn steps_max(&self) -> u64 {
        self.steps_max
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self::from_env_or_random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_seed() {
        let config = SimConfig::with_seed(12345);
        assert_eq!(config.seed(), 12345);
        assert_eq!(config.steps_max(), DST_SIMULATION_STEPS_MAX);
    }

    #[test]
    fn test_seed_extremes() {
        assert_eq!(SimConfig::with_seed(0).seed(), 0);
        assert_eq!(SimConfig::with_seed(u64::MAX).seed(), u64::MAX);
    }
}
