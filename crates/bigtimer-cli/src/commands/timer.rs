use std::rc::Rc;
use std::time::Duration;

use bigtimer_core::{
    Config, ConfigSettingsStore, SettingsStore, SingleTimer, SystemClock, TimerPhase,
};
use clap::Subcommand;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::driver::{emit, parse_input, Input, Output, TerminalCuePlayer, HELP};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a countdown in the foreground
    Start {
        /// Duration in minutes (defaults to the last custom duration)
        minutes: Option<i64>,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// List preset durations
    Presets {
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Start { minutes, json } => start(minutes, json),
        TimerAction::Presets { json } => {
            let config = Config::load()?;
            if json {
                println!("{}", serde_json::to_string(&config.presets)?);
            } else {
                for minutes in &config.presets {
                    println!("{minutes} min");
                }
            }
            Ok(())
        }
    }
}

fn start(minutes: Option<i64>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = ConfigSettingsStore::open_default()?;
    let out = Output::new(json);

    let cues = Rc::new(TerminalCuePlayer::new(!json));
    let mut timer = SingleTimer::new(Rc::new(SystemClock::new()), cues);
    timer.apply_persisted_settings(store.load()?);

    let minutes = minutes.unwrap_or_else(|| i64::from(timer.last_custom_minutes()));
    if let Some(event) = timer.start_preset(minutes) {
        out.event(&event)?;
    }
    store.save(timer.settings())?;

    if timer.phase() == TimerPhase::Finished {
        return Ok(());
    }
    if !out.is_json() {
        out.note(HELP);
    }

    let period = Duration::from_millis(config.tick_interval_ms.max(10));
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(drive(&mut timer, period, &out))
}

async fn drive(
    timer: &mut SingleTimer,
    period: Duration,
    out: &Output,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick(), if timer.phase() == TimerPhase::Running => {
                emit(out, timer.tick())?;
                if timer.phase() == TimerPhase::Finished {
                    return Ok(());
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                match parse_input(&line) {
                    Input::TogglePause => {
                        if timer.phase() == TimerPhase::Paused {
                            if let Some(event) = timer.resume() {
                                out.event(&event)?;
                                ticker.reset();
                            }
                        } else {
                            emit(out, timer.pause())?;
                        }
                    }
                    Input::Reset if !timer.can_plain_reset() => {
                        out.note("focus lock is on: type r! to reset");
                    }
                    Input::Reset | Input::ForceReset => {
                        emit(out, timer.reset())?;
                        return Ok(());
                    }
                    Input::Help => out.note(HELP),
                    Input::Skip | Input::GoTo(_) => out.note("a single timer has no steps"),
                    Input::Unknown(text) => out.note(&format!("unknown command: {text}")),
                }
            }
            _ = &mut ctrl_c => {
                tracing::debug!("interrupted");
                return Ok(());
            }
        }
    }
}
