//! Audio cue seam.
//!
//! The engines decide *when* a cue plays; a [`CuePlayer`] decides *how*.
//! One player is created per process and shared by both engines.

use std::cell::RefCell;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cue {
    Start,
    Finish,
    Halfway,
    LastTen,
    StepComplete,
    RoutineComplete,
}

impl Cue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Start => "START",
            Cue::Finish => "FINISH",
            Cue::Halfway => "HALFWAY",
            Cue::LastTen => "LAST_TEN",
            Cue::StepComplete => "STEP_COMPLETE",
            Cue::RoutineComplete => "ROUTINE_COMPLETE",
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plays a named cue. Fire-and-forget: nothing is returned to the engine.
pub trait CuePlayer {
    fn play(&self, cue: Cue);
}

/// Drops every cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCuePlayer;

impl CuePlayer for SilentCuePlayer {
    fn play(&self, _cue: Cue) {}
}

/// Emits a `tracing` event per cue.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCuePlayer;

impl CuePlayer for LogCuePlayer {
    fn play(&self, cue: Cue) {
        tracing::info!(cue = %cue, "cue");
    }
}

/// Remembers every cue it was asked to play, in order.
#[derive(Debug, Default)]
pub struct RecordingCuePlayer {
    played: RefCell<Vec<Cue>>,
}

impl RecordingCuePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn played(&self) -> Vec<Cue> {
        self.played.borrow().clone()
    }

    pub fn count(&self, cue: Cue) -> usize {
        self.played.borrow().iter().filter(|c| **c == cue).count()
    }

    pub fn clear(&self) {
        self.played.borrow_mut().clear();
    }
}

impl CuePlayer for RecordingCuePlayer {
    fn play(&self, cue: Cue) {
        self.played.borrow_mut().push(cue);
    }
}
