//! # BigTimer Core Library
//!
//! This library provides the core logic for BigTimer, a focus-friendly
//! countdown timer that can also chain timed steps into routines. Front ends
//! (the `bigtimer` CLI, or a GUI) are thin drivers over the same core.
//!
//! ## Architecture
//!
//! - **Clock**: a monotonic time source; the only input to duration math
//! - **Single timer**: one countdown with pause/resume, preferences and
//!   threshold sound cues
//! - **Routine runner**: a countdown per step with hand-off, skip and jump
//! - **Storage**: TOML configuration holding preferences, presets and routines
//!
//! Neither state machine owns a thread. The caller ticks them, plays the cues
//! through a [`CuePlayer`] it owns, and schedules the hand-off between
//! routine steps.
//!
//! ## Key Components
//!
//! - [`SingleTimer`]: single countdown state machine
//! - [`RoutineRunner`]: routine state machine
//! - [`Config`]: application configuration management
//! - [`SettingsStore`]: seam for persisting [`TimerSettings`]

pub mod clock;
pub mod cue;
pub mod error;
pub mod events;
pub mod format;
pub mod routine;
pub mod storage;
pub mod timer;

pub use clock::{ManualClock, MonotonicClock, SystemClock, Timestamp};
pub use cue::{Cue, CuePlayer, LogCuePlayer, RecordingCuePlayer, SilentCuePlayer};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use format::{format_clock, format_step_name};
pub use routine::{Routine, RoutinePhase, RoutineRunner, RoutineStep, StepCountdown};
pub use storage::{Config, ConfigSettingsStore, MemorySettingsStore, SettingsStore, TimerSettings};
pub use timer::{SingleTimer, TimerPhase, TimerStyle};
