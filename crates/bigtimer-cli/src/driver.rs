//! Terminal driver for the core state machines.
//!
//! Supplies what the core leaves to its host: the cue player, keyboard
//! commands read from stdin, and event rendering. The tick loops themselves
//! live next to the commands that run them.

use std::io::Write;

use bigtimer_core::{format_clock, Cue, CuePlayer, Event};

/// Rings the terminal bell and logs each cue.
///
/// One instance is created per run and shared by every engine in it.
pub struct TerminalCuePlayer {
    bell: bool,
}

impl TerminalCuePlayer {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }
}

impl CuePlayer for TerminalCuePlayer {
    fn play(&self, cue: Cue) {
        tracing::info!(cue = %cue, "cue");
        if !self.bell {
            return;
        }
        let rings = match cue {
            Cue::Finish | Cue::RoutineComplete => 3,
            Cue::Start | Cue::Halfway | Cue::LastTen | Cue::StepComplete => 1,
        };
        let mut stderr = std::io::stderr();
        for _ in 0..rings {
            let _ = stderr.write_all(b"\x07");
        }
        let _ = stderr.flush();
    }
}

/// A keyboard command typed while a countdown is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// `p` / space: pause, or resume if paused.
    TogglePause,
    /// `s`: skip to the next routine step.
    Skip,
    /// `g <n>`: jump to routine step `n` (1-based on the keyboard).
    GoTo(usize),
    /// `r`: reset, subject to focus lock.
    Reset,
    /// `r!`: reset even with focus lock on.
    ForceReset,
    Help,
    Unknown(String),
}

pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (None, _) | (Some("p"), None) => Input::TogglePause,
        (Some("s"), None) => Input::Skip,
        (Some("r"), None) => Input::Reset,
        (Some("r!"), None) => Input::ForceReset,
        (Some("?") | Some("h"), None) => Input::Help,
        (Some("g"), Some(n)) => match n.parse::<usize>() {
            Ok(n) if n >= 1 => Input::GoTo(n - 1),
            _ => Input::Unknown(line.to_string()),
        },
        _ => Input::Unknown(line.to_string()),
    }
}

pub const HELP: &str = "keys: <enter>/p pause-resume, s skip step, g <n> go to step, r reset, r! force reset";

/// Renders events either as JSON lines or as short human-readable lines.
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    pub fn event(&self, event: &Event) -> Result<(), serde_json::Error> {
        if self.json {
            println!("{}", serde_json::to_string(event)?);
        } else if let Some(text) = describe(event) {
            println!("{text}");
        }
        Ok(())
    }

    /// Informational text; suppressed in JSON mode so stdout stays parseable.
    pub fn note(&self, text: &str) {
        if self.json {
            tracing::info!("{text}");
        } else {
            println!("{text}");
        }
    }
}

/// Render `event` if a command produced one.
pub fn emit(out: &Output, event: Option<Event>) -> Result<(), serde_json::Error> {
    match event {
        Some(event) => out.event(&event),
        None => Ok(()),
    }
}

pub fn describe(event: &Event) -> Option<String> {
    let text = match event {
        Event::TimerStarted { total_secs, .. } => format!("started {}", format_clock(*total_secs)),
        Event::TimerPaused { remaining_secs, .. } => {
            format!("paused at {}", format_clock(*remaining_secs))
        }
        Event::TimerResumed { remaining_secs, .. } => {
            format!("resumed at {}", format_clock(*remaining_secs))
        }
        Event::TimerTicked { remaining_secs, .. } => format_clock(*remaining_secs),
        Event::TimerFinished { .. } => "time's up".to_string(),
        Event::TimerReset { .. } => "timer reset".to_string(),
        Event::RoutineStarted {
            routine_name,
            step_count,
            total_minutes,
            ..
        } => format!("{routine_name}: {step_count} steps, {total_minutes} min"),
        Event::RoutineTicked {
            step_remaining_secs,
            ..
        } => format_clock(*step_remaining_secs),
        Event::StepFinished { step_name, .. } => format!("done: {step_name}"),
        Event::StepAdvanced {
            step_index,
            step_name,
            duration_secs,
            ..
        } => format!(
            "step {}: {step_name} ({})",
            step_index + 1,
            format_clock(*duration_secs)
        ),
        Event::StepSkipped { to_step, .. } => format!("skipped to step {}", to_step + 1),
        Event::StepJumped { to_step, .. } => format!("jumped to step {}", to_step + 1),
        Event::RoutinePaused {
            step_remaining_secs,
            ..
        } => format!("paused at {}", format_clock(*step_remaining_secs)),
        Event::RoutineResumed {
            step_remaining_secs,
            ..
        } => format!("resumed at {}", format_clock(*step_remaining_secs)),
        Event::RoutineFinished { total_minutes, .. } => {
            format!("routine complete ({total_minutes} min)")
        }
        Event::RoutineReset { .. } => "routine reset".to_string(),
        Event::SettingsChanged { .. } | Event::TimerSnapshot { .. } | Event::RoutineSnapshot { .. } => {
            return None
        }
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn parses_keyboard_commands() {
        assert_eq!(parse_input(""), Input::TogglePause);
        assert_eq!(parse_input(" p "), Input::TogglePause);
        assert_eq!(parse_input("s"), Input::Skip);
        assert_eq!(parse_input("g 3"), Input::GoTo(2));
        assert_eq!(parse_input("r"), Input::Reset);
        assert_eq!(parse_input("r!"), Input::ForceReset);
        assert_eq!(parse_input("?"), Input::Help);
        assert_eq!(parse_input("g 0"), Input::Unknown("g 0".into()));
        assert_eq!(parse_input("jump"), Input::Unknown("jump".into()));
    }

    #[test]
    fn ticks_render_as_clock() {
        let event = Event::TimerTicked {
            remaining_secs: 125,
            at: Utc::now(),
        };
        assert_eq!(describe(&event).as_deref(), Some("2:05"));
    }

    #[test]
    fn steps_render_one_based() {
        let event = Event::StepSkipped {
            from_step: 0,
            to_step: 1,
            at: Utc::now(),
        };
        assert_eq!(describe(&event).as_deref(), Some("skipped to step 2"));
    }
}
