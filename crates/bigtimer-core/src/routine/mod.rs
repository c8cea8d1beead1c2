mod runner;
mod types;

pub use runner::{RoutinePhase, RoutineRunner, StepCountdown};
pub use types::{Routine, RoutineStep};
