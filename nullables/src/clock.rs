//! Nullable clock — deterministic time for testing.

use std::sync::atomic::{AtomicU64, Ordering};
use x1c_types::{Clock, Timestamp};

/// A deterministic clock for testing.
///
/// Time only advances when you tell it to. Shareable across threads, so a
/// test can hold an `Arc<NullClock>` while the ledger holds another.
#[derive(Debug, Default)]
pub struct NullClock {
    current: AtomicU64,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: AtomicU64::new(initial_secs),
        }
    }

    /// Advance time by a number of seconds, saturating at `u64::MAX`.
    ///
    /// Time never moves backwards.
    pub fn advance(&self, secs: u64) {
        let _ = self
            .current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(secs))
            });
    }

    /// Advance time by `secs` unless that would pass `u64::MAX`.
    ///
    /// Returns the new time, or `None` with the clock left where it was.
    pub fn try_advance(&self, secs: u64) -> Option<Timestamp> {
        self.current
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| t.checked_add(secs))
            .ok()
            .map(|prev| Timestamp::new(prev + secs))
    }

    /// Set the time to a specific value.
    pub fn set(&self, secs: u64) {
        self.current.store(secs, Ordering::SeqCst);
    }
}

impl Clock for NullClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.current.load(Ordering::SeqCst))
    }
}
