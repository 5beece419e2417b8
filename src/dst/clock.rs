//! `SimClock` - Simulated Time
//!
//! `TigerStyle`: Deterministic, controllable time for simulation. Time only
//! moves forward, and never reads the system clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::constants::{DST_TIME_ADVANCE_MS_MAX, TIME_MS_PER_SEC};

/// A simulated clock for deterministic testing.
///
/// Thread-safe via `Arc<AtomicU64>`; clones share the same time source.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    /// Current time in milliseconds since epoch
    current_ms: Arc<AtomicU64>,
}

impl SimClock {
    /// Create a new clock starting at the Unix epoch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock starting at the given millisecond timestamp.
    #[must_use]
    pub fn at_ms(start_ms: u64) -> Self {
        Self {
            current_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Get current time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }

    /// Get current time in seconds (truncated).
    #[must_use]
    pub fn now_secs(&self) -> u64 {
        self.now_ms() / TIME_MS_PER_SEC
    }

    /// Get current time as `DateTime<Utc>`.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.now_ms() as i64)
            .unwrap_or_else(|| DateTime::from_timestamp(0, 0).unwrap())
    }

    /// Advance time by the given milliseconds, returning the new time.
    ///
    /// # Panics
    /// Panics if ms exceeds [`DST_TIME_ADVANCE_MS_MAX`].
    pub fn advance_ms(&self, ms: u64) -> u64 {
        // Precondition
        assert!(
            ms <= DST_TIME_ADVANCE_MS_MAX,
            "advance_ms({ms}) exceeds max ({DST_TIME_ADVANCE_MS_MAX})"
        );

        let old_time = self.current_ms.fetch_add(ms, Ordering::SeqCst);
        let new_time = old_time.saturating_add(ms);

        // Postcondition
        assert!(new_time >= old_time, "time must not go backwards");

        new_time
    }

    /// Advance time by the given seconds, returning the new time in ms.
    pub fn advance_secs(&self, secs: u64) -> u64 {
        self.advance_ms(secs * TIME_MS_PER_SEC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_zero() {
        let clock = SimClock::new();
        assert_eq!(clock.now_ms(), 0);
    }

    #[test]
    fn test_advance() {
        let clock = SimClock::new();

        assert_eq!(clock.advance_ms(500), 500);
        assert_eq!(clock.advance_secs(2), 2500);
        assert_eq!(clock.now_ms(), 2500);
        assert_eq!(clock.now_secs(), 2);
    }

    #[test]
    fn test_clones_share_time() {
        let clock = SimClock::at_ms(1000);
        let clone = clock.clone();

        clock.advance_ms(500);
        assert_eq!(clone.now_ms(), 1500);
    }

    #[test]
    fn test_now_datetime() {
        let clock = SimClock::at_ms(86_400_000); // 1970-01-02
        assert_eq!(clock.now().to_rfc3339(), "1970-01-02T00:00:00+00:00");
    }

    #[test]
    #[should_panic(expected = "exceeds max")]
    fn test_advance_too_far_panics() {
        let clock = SimClock::new();
        clock.advance_ms(DST_TIME_ADVANCE_MS_MAX + 1);
    }
}
