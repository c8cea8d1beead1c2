//! Pause-aware elapsed time accounting for a single countdown run.
//!
//! ```text
//! remaining = total - floor((now - started_at - accumulated_pause) / 1s)
//! ```
//!
//! Remaining time is always recomputed from absolute monotonic readings, so
//! late, missed or extra ticks never make the countdown drift.

use std::time::Duration;

use crate::clock::Timestamp;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunClock {
    started_at: Option<Timestamp>,
    paused_at: Option<Timestamp>,
    accumulated_pause: Duration,
}

impl RunClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a fresh run at `now`, discarding any previous pause history.
    pub fn start(&mut self, now: Timestamp) {
        self.started_at = Some(now);
        self.paused_at = None;
        self.accumulated_pause = Duration::ZERO;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn accumulated_pause(&self) -> Duration {
        self.accumulated_pause
    }

    /// Returns false if not started or already paused.
    pub fn pause(&mut self, now: Timestamp) -> bool {
        if self.started_at.is_none() || self.paused_at.is_some() {
            return false;
        }
        self.paused_at = Some(now);
        true
    }

    /// Returns false if not paused.
    pub fn resume(&mut self, now: Timestamp) -> bool {
        match self.paused_at.take() {
            Some(paused_at) => {
                let paused_for = now.saturating_duration_since(paused_at);
                self.accumulated_pause = self.accumulated_pause.saturating_add(paused_for);
                true
            }
            None => false,
        }
    }

    /// Running time since start, excluding every pause interval. While paused
    /// the reading is frozen at the moment of the pause.
    pub fn active_elapsed(&self, now: Timestamp) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::ZERO;
        };
        let until = self.paused_at.unwrap_or(now);
        until
            .saturating_duration_since(started_at)
            .saturating_sub(self.accumulated_pause)
    }

    /// Whole seconds left of a `total_secs` countdown, clamped to `[0, total_secs]`.
    pub fn remaining_secs(&self, total_secs: u32, now: Timestamp) -> u32 {
        let elapsed = self.active_elapsed(now).as_secs();
        let elapsed = u32::try_from(elapsed).unwrap_or(u32::MAX);
        total_secs.saturating_sub(elapsed)
    }
}
