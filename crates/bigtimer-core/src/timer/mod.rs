mod engine;
mod run_clock;

pub use engine::{
    clamp_custom_minutes, SingleTimer, TimerPhase, TimerStyle, MAX_CUSTOM_MINUTES,
    MIN_CUSTOM_MINUTES,
};
pub use run_clock::RunClock;
