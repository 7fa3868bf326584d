//! Clock implementations.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::Duration;
use glowminder_domain::time::{Timestamp, now};

use crate::ports::Clock;

/// Reads the wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> Timestamp {
        now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and give
/// another to the code under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    instant: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    /// Start the clock at `instant`.
    #[must_use]
    pub fn new(instant: Timestamp) -> Self {
        Self {
            instant: Arc::new(Mutex::new(instant)),
        }
    }

    /// Jump to `instant`.
    pub fn set(&self, instant: Timestamp) {
        *self.instant.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }

    /// Move forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut instant = self.instant.lock().unwrap_or_else(PoisonError::into_inner);
        *instant += delta;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(now())
    }
}

impl Clock for ManualClock {
    fn now_utc(&self) -> Timestamp {
        *self.instant.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
