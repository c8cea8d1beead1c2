//! Single countdown timer.
//!
//! A monotonic-clock state machine. It does not use internal threads; the
//! caller is responsible for calling `tick()` periodically (every 250 ms is
//! typical). Remaining time is recomputed from absolute elapsed time on every
//! tick, so the tick rate only affects display latency, never accuracy.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!         Finished            (any) -> reset -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = SingleTimer::new(clock, cues);
//! timer.start_preset(10);
//! // In a loop:
//! timer.tick(); // Returns Some(Event) when the displayed second changes
//! ```

use std::fmt;
use std::rc::Rc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::run_clock::RunClock;
use crate::clock::MonotonicClock;
use crate::cue::{Cue, CuePlayer};
use crate::events::Event;
use crate::storage::TimerSettings;

pub const MIN_CUSTOM_MINUTES: u32 = 1;
pub const MAX_CUSTOM_MINUTES: u32 = 180;

/// Seconds-left threshold for the `LAST_TEN` cue.
const LAST_TEN_SECS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    /// Reached zero. Terminal until reset or a new start.
    Finished,
}

/// Display mode for the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStyle {
    #[default]
    Numbers,
    Pie,
    Bar,
}

impl TimerStyle {
    pub const ALL: [TimerStyle; 3] = [TimerStyle::Numbers, TimerStyle::Pie, TimerStyle::Bar];

    pub fn next(self) -> Self {
        match self {
            TimerStyle::Numbers => TimerStyle::Pie,
            TimerStyle::Pie => TimerStyle::Bar,
            TimerStyle::Bar => TimerStyle::Numbers,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerStyle::Numbers => "numbers",
            TimerStyle::Pie => "pie",
            TimerStyle::Bar => "bar",
        }
    }

    pub fn from_ordinal(n: u64) -> Option<Self> {
        usize::try_from(n)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

/// Clamp a requested custom duration into the accepted range.
pub fn clamp_custom_minutes(minutes: i64) -> u32 {
    minutes.clamp(MIN_CUSTOM_MINUTES as i64, MAX_CUSTOM_MINUTES as i64) as u32
}

/// One countdown run plus the user's timer preferences.
pub struct SingleTimer {
    clock: Rc<dyn MonotonicClock>,
    cues: Rc<dyn CuePlayer>,
    phase: TimerPhase,
    total_secs: u32,
    remaining_secs: u32,
    run: RunClock,
    halfway_fired: bool,
    last_ten_fired: bool,
    settings: TimerSettings,
}

impl fmt::Debug for SingleTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleTimer")
            .field("phase", &self.phase)
            .field("total_secs", &self.total_secs)
            .field("remaining_secs", &self.remaining_secs)
            .field("run", &self.run)
            .field("halfway_fired", &self.halfway_fired)
            .field("last_ten_fired", &self.last_ten_fired)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SingleTimer {
    /// Create an idle timer with default preferences.
    pub fn new(clock: Rc<dyn MonotonicClock>, cues: Rc<dyn CuePlayer>) -> Self {
        Self {
            clock,
            cues,
            phase: TimerPhase::Idle,
            total_secs: 0,
            remaining_secs: 0,
            run: RunClock::new(),
            halfway_fired: false,
            last_ten_fired: false,
            settings: TimerSettings::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn style(&self) -> TimerStyle {
        self.settings.style
    }

    pub fn focus_lock_enabled(&self) -> bool {
        self.settings.focus_lock_enabled
    }

    pub fn last_custom_minutes(&self) -> u32 {
        self.settings.last_custom_minutes
    }

    /// Whether a plain (unconfirmed) reset is allowed right now. With focus
    /// lock on, an active run needs a deliberate confirmation first.
    pub fn can_plain_reset(&self) -> bool {
        !self.settings.focus_lock_enabled
            || !matches!(self.phase, TimerPhase::Running | TimerPhase::Paused)
    }

    /// 0.0 .. 1.0 elapsed fraction of the current run.
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return match self.phase {
                TimerPhase::Finished => 1.0,
                _ => 0.0,
            };
        }
        1.0 - (self.remaining_secs as f64 / self.total_secs as f64)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::TimerSnapshot {
            phase: self.phase,
            total_secs: self.total_secs,
            remaining_secs: self.remaining_secs,
            progress: self.progress(),
            settings: self.settings.clone(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start a new run of `minutes`, replacing whatever run was in progress.
    ///
    /// Negative minutes count as zero; a zero-length run is `Finished`
    /// immediately and plays no cue.
    pub fn start_preset(&mut self, minutes: i64) -> Option<Event> {
        let total = minutes.max(0).saturating_mul(60);
        let total = u32::try_from(total).unwrap_or(u32::MAX);

        self.total_secs = total;
        self.remaining_secs = total;
        self.settings.last_custom_minutes = clamp_custom_minutes(minutes);
        self.run.start(self.clock.now());
        self.halfway_fired = false;
        self.last_ten_fired = false;

        if total == 0 {
            self.phase = TimerPhase::Finished;
            tracing::debug!("zero-length preset finished immediately");
            return Some(Event::TimerFinished {
                total_secs: 0,
                at: Utc::now(),
            });
        }

        self.phase = TimerPhase::Running;
        if self.settings.sound_enabled {
            self.cues.play(Cue::Start);
        }
        tracing::info!(total_secs = total, "timer started");
        Some(Event::TimerStarted {
            total_secs: total,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        self.run.pause(self.clock.now());
        self.phase = TimerPhase::Paused;
        tracing::debug!(remaining_secs = self.remaining_secs, "timer paused");
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.phase != TimerPhase::Paused {
            return None;
        }
        self.run.resume(self.clock.now());
        self.phase = TimerPhase::Running;
        tracing::debug!(
            remaining_secs = self.remaining_secs,
            paused_total_ms = self.run.accumulated_pause().as_millis() as u64,
            "timer resumed"
        );
        Some(Event::TimerResumed {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Call periodically while running.
    ///
    /// Returns `None` when the whole-second reading has not changed, so
    /// calling faster than once per second is harmless.
    pub fn tick(&mut self) -> Option<Event> {
        if self.phase != TimerPhase::Running || !self.run.is_started() {
            return None;
        }
        let remaining = self.run.remaining_secs(self.total_secs, self.clock.now());
        if remaining == self.remaining_secs && remaining > 0 {
            return None;
        }
        self.remaining_secs = remaining;

        if remaining == 0 {
            self.phase = TimerPhase::Finished;
            if self.settings.sound_enabled {
                self.cues.play(Cue::Finish);
            }
            tracing::info!(total_secs = self.total_secs, "timer finished");
            return Some(Event::TimerFinished {
                total_secs: self.total_secs,
                at: Utc::now(),
            });
        }

        self.fire_threshold_cues();
        Some(Event::TimerTicked {
            remaining_secs: remaining,
            at: Utc::now(),
        })
    }

    /// Return to `Idle`. Preferences survive; run state does not.
    pub fn reset(&mut self) -> Option<Event> {
        self.phase = TimerPhase::Idle;
        self.total_secs = 0;
        self.remaining_secs = 0;
        self.run.clear();
        self.halfway_fired = false;
        self.last_ten_fired = false;
        tracing::debug!("timer reset");
        Some(Event::TimerReset { at: Utc::now() })
    }

    // ── Preferences ──────────────────────────────────────────────────

    pub fn toggle_focus_lock(&mut self) -> Option<Event> {
        self.settings.focus_lock_enabled = !self.settings.focus_lock_enabled;
        self.settings_changed()
    }

    pub fn cycle_style(&mut self) -> Option<Event> {
        self.settings.style = self.settings.style.next();
        self.settings_changed()
    }

    pub fn toggle_sound(&mut self) -> Option<Event> {
        self.settings.sound_enabled = !self.settings.sound_enabled;
        self.settings_changed()
    }

    pub fn toggle_halfway(&mut self) -> Option<Event> {
        self.settings.sound_halfway = !self.settings.sound_halfway;
        self.settings_changed()
    }

    pub fn toggle_last_ten(&mut self) -> Option<Event> {
        self.settings.sound_last_ten = !self.settings.sound_last_ten;
        self.settings_changed()
    }

    pub fn set_last_custom_minutes(&mut self, minutes: i64) -> Option<Event> {
        self.settings.last_custom_minutes = clamp_custom_minutes(minutes);
        self.settings_changed()
    }

    /// Load preferences from the settings store. An in-progress run is left
    /// untouched. Returns `None` if nothing changed.
    pub fn apply_persisted_settings(&mut self, settings: TimerSettings) -> Option<Event> {
        let settings = settings.upgrade();
        if settings == self.settings {
            return None;
        }
        self.settings = settings;
        self.settings_changed()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn settings_changed(&self) -> Option<Event> {
        Some(Event::SettingsChanged {
            settings: self.settings.clone(),
            at: Utc::now(),
        })
    }

    fn fire_threshold_cues(&mut self) {
        if !self.settings.sound_enabled || self.remaining_secs == 0 {
            return;
        }
        if self.settings.sound_halfway
            && !self.halfway_fired
            && self.remaining_secs <= self.total_secs / 2
        {
            self.halfway_fired = true;
            self.cues.play(Cue::Halfway);
        }
        if self.settings.sound_last_ten
            && !self.last_ten_fired
            && self.remaining_secs <= LAST_TEN_SECS
        {
            self.last_ten_fired = true;
            self.cues.play(Cue::LastTen);
        }
    }
}
