//! Monotonic time source.
//!
//! All duration math in the timer and routine engines goes through a
//! [`MonotonicClock`]. Wall-clock time (`chrono::Utc`) is only used to stamp
//! events for display and logging.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// A reading from a [`MonotonicClock`], expressed as the offset from the
/// clock's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(Duration);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(Duration::ZERO);

    pub fn from_offset(offset: Duration) -> Self {
        Self(offset)
    }

    pub fn offset(&self) -> Duration {
        self.0
    }

    /// Time elapsed from `earlier` to `self`, or zero if `earlier` is later.
    pub fn saturating_duration_since(&self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

/// Source of non-decreasing timestamps, immune to wall-clock adjustments.
pub trait MonotonicClock {
    fn now(&self) -> Timestamp;
}

/// Clock backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.origin.elapsed())
    }
}

/// Manually driven clock for tests and simulations.
///
/// Shared through an `Rc` so the test can move time forward while an engine
/// holds the same clock.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }

    /// Move to `offset` from the origin. Earlier offsets are ignored so the
    /// clock never runs backwards.
    pub fn set(&self, offset: Duration) {
        if offset > self.now.get() {
            self.now.set(offset);
        }
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.get())
    }
}
