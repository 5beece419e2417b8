//! Tracing Setup
//!
//! `TigerStyle`: Optional telemetry with graceful fallback. Initialization
//! never panics; a host application that already installed a subscriber
//! keeps it.
//!
//! ## Usage
//!
//! ```rust
//! use mindmap_storage::telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::default());
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG` - Filter directives (default: "info")

use tracing_subscriber::EnvFilter;

/// Configuration for tracing output.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Filter directives used when `RUST_LOG` is unset
    pub default_filter: String,
    /// Emit ANSI color codes
    pub ansi: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_filter: "info".to_string(),
            ansi: true,
        }
    }
}

impl TelemetryConfig {
    /// Set the filter used when `RUST_LOG` is unset.
    #[must_use]
    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    /// Disable ANSI color codes (log files, CI).
    #[must_use]
    pub fn without_ansi(mut self) -> Self {
        self.ansi = false;
        self
    }
}

/// Install a formatting subscriber for `tracing` output.
///
/// Returns false if a global subscriber was already installed; the existing
/// one stays in place and a debug event records the collision.
pub fn init_telemetry(config: &TelemetryConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_filter.clone()));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_target(true)
        .try_init()
        .is_ok();

    if !installed {
        tracing::debug!("global tracing subscriber already installed");
    }

    installed
}
