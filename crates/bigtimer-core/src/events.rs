use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::routine::RoutinePhase;
use crate::storage::TimerSettings;
use crate::timer::TimerPhase;

/// Every committed state change produces an Event.
///
/// Commands return `Option<Event>`: `None` means the call was a no-op and
/// observers have nothing to redraw. `at` is wall-clock time for display and
/// logs only; durations are never derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        total_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// The whole-second reading changed.
    TimerTicked {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerFinished {
        total_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// A preference changed; carries the snapshot to persist.
    SettingsChanged {
        settings: TimerSettings,
        at: DateTime<Utc>,
    },
    TimerSnapshot {
        phase: TimerPhase,
        total_secs: u32,
        remaining_secs: u32,
        progress: f64,
        settings: TimerSettings,
        at: DateTime<Utc>,
    },
    RoutineStarted {
        routine_id: String,
        routine_name: String,
        step_count: usize,
        total_minutes: u32,
        at: DateTime<Utc>,
    },
    RoutineTicked {
        step_index: usize,
        step_remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// A step reached zero and another step follows.
    StepFinished {
        step_index: usize,
        step_name: String,
        at: DateTime<Utc>,
    },
    StepAdvanced {
        step_index: usize,
        step_name: String,
        duration_secs: u32,
        at: DateTime<Utc>,
    },
    StepSkipped {
        from_step: usize,
        to_step: usize,
        at: DateTime<Utc>,
    },
    StepJumped {
        from_step: usize,
        to_step: usize,
        at: DateTime<Utc>,
    },
    RoutinePaused {
        step_index: usize,
        step_remaining_secs: u32,
        at: DateTime<Utc>,
    },
    RoutineResumed {
        step_index: usize,
        step_remaining_secs: u32,
        at: DateTime<Utc>,
    },
    RoutineFinished {
        routine_id: String,
        total_minutes: u32,
        at: DateTime<Utc>,
    },
    RoutineReset {
        at: DateTime<Utc>,
    },
    RoutineSnapshot {
        phase: RoutinePhase,
        routine_id: Option<String>,
        routine_name: Option<String>,
        step_index: usize,
        step_name: String,
        step_total_secs: u32,
        step_remaining_secs: u32,
        elapsed_minutes: f64,
        total_minutes: u32,
        progress_pct: f64,
        at: DateTime<Utc>,
    },
}
