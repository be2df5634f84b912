//! Time utilities and constants for the exchange flow.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::sync::Arc;

/// Flow timing constants.
pub mod constants {
    use super::Duration;

    /// How long a catalog snapshot is served before refreshing (8 hours).
    pub fn catalog_ttl() -> Duration {
        Duration::hours(8)
    }

    /// Inbound messages older than this are dropped (5 minutes).
    pub fn message_max_age() -> Duration {
        Duration::minutes(5)
    }

    /// Pause before re-entering the amount step after a below-minimum input.
    pub fn below_minimum_reentry_delay() -> Duration {
        Duration::milliseconds(500)
    }
}

/// A timestamp with timezone (always UTC).
pub type Timestamp = DateTime<Utc>;

/// The Unix epoch, used as "never refreshed".
pub fn epoch() -> Timestamp {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Get the current timestamp.
    fn now(&self) -> Timestamp;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock()
    }
}

/// Shared clock handle.
pub type SharedClock = Arc<dyn Clock>;

/// Check whether `since` is at least `window` old relative to `now`.
pub fn is_older_than(since: Timestamp, now: Timestamp, window: Duration) -> bool {
    now.signed_duration_since(since) >= window
}

/// Duration extensions for convenient construction.
pub trait DurationExt {
    fn as_std(&self) -> std::time::Duration;
}

impl DurationExt for Duration {
    fn as_std(&self) -> std::time::Duration {
        self.to_std().unwrap_or(std::time::Duration::ZERO)
    }
}
