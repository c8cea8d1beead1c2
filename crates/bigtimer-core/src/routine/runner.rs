//! Routine runner.
//!
//! Runs the steps of a [`Routine`] back-to-back. Like the single timer it has
//! no threads of its own: the caller ticks it and, after a step finishes,
//! calls `advance_to_next_step()` once its own hand-off delay has elapsed.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!       StepFinished -> advance -> Running
//!            |
//!            v (last step)
//!      RoutineFinished           (any) -> reset -> Idle
//! ```

use std::fmt;
use std::rc::Rc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::types::{Routine, RoutineStep};
use crate::clock::MonotonicClock;
use crate::cue::{Cue, CuePlayer};
use crate::events::Event;
use crate::timer::RunClock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutinePhase {
    Idle,
    Running,
    Paused,
    /// Current step reached zero; waiting for `advance_to_next_step()`.
    StepFinished,
    RoutineFinished,
}

/// How a step's remaining time is derived on each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepCountdown {
    /// Each tick takes one second off the step. The scheduler must tick at
    /// 1 Hz; dropped ticks slow the routine down.
    #[default]
    Ticks,
    /// Remaining time is recomputed from monotonic elapsed time, as the
    /// single timer does. Any tick rate works.
    Elapsed,
}

pub struct RoutineRunner {
    clock: Rc<dyn MonotonicClock>,
    cues: Rc<dyn CuePlayer>,
    countdown: StepCountdown,
    sound_enabled: bool,
    phase: RoutinePhase,
    active: Option<Rc<Routine>>,
    step_index: usize,
    step_total_secs: u32,
    step_remaining_secs: u32,
    run: RunClock,
}

impl fmt::Debug for RoutineRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutineRunner")
            .field("countdown", &self.countdown)
            .field("sound_enabled", &self.sound_enabled)
            .field("phase", &self.phase)
            .field("active", &self.active.as_ref().map(|r| &r.id))
            .field("step_index", &self.step_index)
            .field("step_total_secs", &self.step_total_secs)
            .field("step_remaining_secs", &self.step_remaining_secs)
            .finish_non_exhaustive()
    }
}

impl RoutineRunner {
    pub fn new(clock: Rc<dyn MonotonicClock>, cues: Rc<dyn CuePlayer>) -> Self {
        Self {
            clock,
            cues,
            countdown: StepCountdown::default(),
            sound_enabled: true,
            phase: RoutinePhase::Idle,
            active: None,
            step_index: 0,
            step_total_secs: 0,
            step_remaining_secs: 0,
            run: RunClock::new(),
        }
    }

    pub fn with_countdown(mut self, countdown: StepCountdown) -> Self {
        self.countdown = countdown;
        self
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> RoutinePhase {
        self.phase
    }

    pub fn countdown(&self) -> StepCountdown {
        self.countdown
    }

    pub fn active_routine(&self) -> Option<&Routine> {
        self.active.as_deref()
    }

    pub fn current_step_index(&self) -> usize {
        self.step_index
    }

    pub fn step_total_secs(&self) -> u32 {
        self.step_total_secs
    }

    pub fn step_remaining_secs(&self) -> u32 {
        self.step_remaining_secs
    }

    pub fn current_step(&self) -> Option<&RoutineStep> {
        if self.phase == RoutinePhase::Idle {
            return None;
        }
        self.active.as_ref()?.steps.get(self.step_index)
    }

    pub fn next_step(&self) -> Option<&RoutineStep> {
        self.active.as_ref()?.steps.get(self.step_index + 1)
    }

    pub fn total_routine_minutes(&self) -> u32 {
        self.active.as_ref().map(|r| r.total_minutes()).unwrap_or(0)
    }

    /// Completed steps' minutes plus the fractional progress of the current
    /// step.
    pub fn elapsed_routine_minutes(&self) -> f64 {
        let Some(routine) = self.active.as_ref() else {
            return 0.0;
        };
        let completed = routine.cumulative_minutes(self.step_index) as f64;
        let current = self.step_total_secs.saturating_sub(self.step_remaining_secs) as f64 / 60.0;
        completed + current
    }

    /// 0.0 .. 100.0 progress across the whole routine.
    pub fn progress_pct(&self) -> f64 {
        let total = self.total_routine_minutes() as f64;
        if total == 0.0 {
            return 0.0;
        }
        (self.elapsed_routine_minutes() / total * 100.0).min(100.0)
    }

    pub fn snapshot(&self) -> Event {
        let step = self.current_step();
        Event::RoutineSnapshot {
            phase: self.phase,
            routine_id: self.active.as_ref().map(|r| r.id.clone()),
            routine_name: self.active.as_ref().map(|r| r.name.clone()),
            step_index: self.step_index,
            step_name: step.map(|s| s.name.clone()).unwrap_or_default(),
            step_total_secs: self.step_total_secs,
            step_remaining_secs: self.step_remaining_secs,
            elapsed_minutes: self.elapsed_routine_minutes(),
            total_minutes: self.total_routine_minutes(),
            progress_pct: self.progress_pct(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Start `routine` from its first step, replacing any current run.
    /// A routine without steps is ignored.
    pub fn start_routine(&mut self, routine: Rc<Routine>) -> Option<Event> {
        if !routine.is_runnable() {
            tracing::debug!(routine = %routine.name, "ignoring routine without steps");
            return None;
        }
        let step_count = routine.steps.len();
        self.active = Some(routine);
        self.load_step(0);
        self.phase = RoutinePhase::Running;

        let routine = self.active.as_ref()?;
        tracing::info!(routine = %routine.name, steps = step_count, "routine started");
        Some(Event::RoutineStarted {
            routine_id: routine.id.clone(),
            routine_name: routine.name.clone(),
            step_count,
            total_minutes: routine.total_minutes(),
            at: Utc::now(),
        })
    }

    /// Call periodically while running. In [`StepCountdown::Ticks`] mode each
    /// call is one second.
    pub fn tick(&mut self) -> Option<Event> {
        if self.phase != RoutinePhase::Running || self.active.is_none() {
            return None;
        }
        let remaining = match self.countdown {
            StepCountdown::Ticks => self.step_remaining_secs.saturating_sub(1),
            StepCountdown::Elapsed => {
                if !self.run.is_started() {
                    return None;
                }
                let remaining = self
                    .run
                    .remaining_secs(self.step_total_secs, self.clock.now());
                if remaining == self.step_remaining_secs && remaining > 0 {
                    return None;
                }
                remaining
            }
        };
        self.step_remaining_secs = remaining;

        if remaining > 0 {
            return Some(Event::RoutineTicked {
                step_index: self.step_index,
                step_remaining_secs: remaining,
                at: Utc::now(),
            });
        }

        if self.step_index + 1 < self.step_count() {
            self.phase = RoutinePhase::StepFinished;
            self.run.clear();
            self.play(Cue::StepComplete);
            let step_name = self.current_step().map(|s| s.name.clone()).unwrap_or_default();
            tracing::debug!(step = self.step_index, %step_name, "step finished");
            Some(Event::StepFinished {
                step_index: self.step_index,
                step_name,
                at: Utc::now(),
            })
        } else {
            self.finish_routine()
        }
    }

    /// Move from `StepFinished` to the next step.
    pub fn advance_to_next_step(&mut self) -> Option<Event> {
        if self.phase != RoutinePhase::StepFinished {
            return None;
        }
        let next = self.step_index + 1;
        if next >= self.step_count() {
            return self.finish_routine();
        }
        self.load_step(next);
        self.phase = RoutinePhase::Running;
        let step = self.current_step()?;
        Some(Event::StepAdvanced {
            step_index: next,
            step_name: step.name.clone(),
            duration_secs: step.duration_secs(),
            at: Utc::now(),
        })
    }

    /// Abandon the current step and start the next one immediately.
    pub fn skip_step(&mut self) -> Option<Event> {
        if !matches!(
            self.phase,
            RoutinePhase::Running | RoutinePhase::Paused | RoutinePhase::StepFinished
        ) {
            return None;
        }
        let from = self.step_index;
        let next = from + 1;
        if next >= self.step_count() {
            self.step_remaining_secs = 0;
            return self.finish_routine();
        }
        self.load_step(next);
        self.phase = RoutinePhase::Running;
        tracing::debug!(from_step = from, to_step = next, "step skipped");
        Some(Event::StepSkipped {
            from_step: from,
            to_step: next,
            at: Utc::now(),
        })
    }

    /// Jump to `step_index` and run it from the start. Out-of-range indices
    /// are ignored.
    pub fn go_to_step(&mut self, step_index: usize) -> Option<Event> {
        if self.phase == RoutinePhase::Idle || step_index >= self.step_count() {
            return None;
        }
        let from = self.step_index;
        self.load_step(step_index);
        self.phase = RoutinePhase::Running;
        tracing::debug!(from_step = from, to_step = step_index, "jumped to step");
        Some(Event::StepJumped {
            from_step: from,
            to_step: step_index,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if self.phase != RoutinePhase::Running {
            return None;
        }
        self.run.pause(self.clock.now());
        self.phase = RoutinePhase::Paused;
        Some(Event::RoutinePaused {
            step_index: self.step_index,
            step_remaining_secs: self.step_remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.phase != RoutinePhase::Paused {
            return None;
        }
        self.run.resume(self.clock.now());
        self.phase = RoutinePhase::Running;
        Some(Event::RoutineResumed {
            step_index: self.step_index,
            step_remaining_secs: self.step_remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.phase = RoutinePhase::Idle;
        self.active = None;
        self.step_index = 0;
        self.step_total_secs = 0;
        self.step_remaining_secs = 0;
        self.run.clear();
        tracing::debug!("routine reset");
        Some(Event::RoutineReset { at: Utc::now() })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn step_count(&self) -> usize {
        self.active.as_ref().map(|r| r.steps.len()).unwrap_or(0)
    }

    fn load_step(&mut self, index: usize) {
        let secs = self
            .active
            .as_ref()
            .and_then(|r| r.steps.get(index))
            .map(|s| s.duration_secs())
            .unwrap_or(0);
        self.step_index = index;
        self.step_total_secs = secs;
        self.step_remaining_secs = secs;
        self.run.start(self.clock.now());
    }

    fn finish_routine(&mut self) -> Option<Event> {
        self.phase = RoutinePhase::RoutineFinished;
        self.run.clear();
        self.play(Cue::RoutineComplete);
        let routine = self.active.as_ref()?;
        tracing::info!(routine = %routine.name, "routine finished");
        Some(Event::RoutineFinished {
            routine_id: routine.id.clone(),
            total_minutes: routine.total_minutes(),
            at: Utc::now(),
        })
    }

    fn play(&self, cue: Cue) {
        if self.sound_enabled {
            self.cues.play(cue);
        }
    }
}
