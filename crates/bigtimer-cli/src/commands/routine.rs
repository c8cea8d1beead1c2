use std::rc::Rc;
use std::time::Duration;

use bigtimer_core::{
    format_step_name, Config, Routine, RoutinePhase, RoutineRunner, RoutineStep, StepCountdown,
    SystemClock, ValidationError,
};
use clap::Subcommand;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::driver::{emit, parse_input, Input, Output, TerminalCuePlayer, HELP};

#[derive(Subcommand)]
pub enum RoutineAction {
    /// List saved routines
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show the steps of a routine
    Show {
        /// Routine name or id
        name: String,
        #[arg(long)]
        json: bool,
    },
    /// Run a routine in the foreground
    Run {
        /// Routine name or id
        name: String,
        /// Print events as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Save a new routine
    Add {
        /// Routine name
        name: String,
        /// Step as MINUTES or MINUTES:LABEL, repeatable and in order
        #[arg(long = "step", required = true)]
        steps: Vec<String>,
        #[arg(long)]
        emoji: Option<String>,
    },
    /// Delete a saved routine
    Remove {
        /// Routine name or id
        name: String,
    },
}

pub fn run(action: RoutineAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RoutineAction::List { json } => list(json),
        RoutineAction::Show { name, json } => show(&name, json),
        RoutineAction::Run { name, json } => run_routine(&name, json),
        RoutineAction::Add { name, steps, emoji } => add(name, &steps, emoji.as_deref()),
        RoutineAction::Remove { name } => {
            let mut config = Config::load()?;
            let removed = config.remove_routine(&name)?;
            config.save()?;
            println!("removed {}", removed.name);
            Ok(())
        }
    }
}

fn find(config: &Config, name: &str) -> Result<Routine, ValidationError> {
    config
        .find_routine(name)
        .cloned()
        .ok_or_else(|| ValidationError::UnknownRoutine(name.to_string()))
}

fn list(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&config.routines)?);
        return Ok(());
    }
    if config.routines.is_empty() {
        println!("no routines saved");
    }
    for routine in &config.routines {
        println!(
            "{} {}  ({} steps, {})",
            routine.emoji,
            routine.name,
            routine.steps.len(),
            format_step_name(routine.total_minutes())
        );
    }
    Ok(())
}

fn show(name: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let routine = find(&config, name)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&routine)?);
        return Ok(());
    }
    println!("{} {}", routine.emoji, routine.name);
    for (i, step) in routine.steps.iter().enumerate() {
        println!("  {}. {:>6}  {}", i + 1, format!("{}m", step.minutes), step.name);
    }
    println!("total: {}", format_step_name(routine.total_minutes()));
    Ok(())
}

fn add(name: String, specs: &[String], emoji: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let steps = specs
        .iter()
        .map(|spec| RoutineStep::parse(spec))
        .collect::<Result<Vec<_>, _>>()?;
    let mut config = Config::load()?;
    if config.find_routine(&name).is_some() {
        return Err(format!("a routine named '{name}' already exists").into());
    }
    let routine = Routine::new(name, emoji, steps);
    println!("created {} ({})", routine.name, routine.id);
    config.upsert_routine(routine)?;
    config.save()?;
    Ok(())
}

fn run_routine(name: &str, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let routine = Rc::new(find(&config, name)?);
    let out = Output::new(json);

    let cues = Rc::new(TerminalCuePlayer::new(!json));
    let mut runner = RoutineRunner::new(Rc::new(SystemClock::new()), cues)
        .with_countdown(config.routine_countdown);
    runner.set_sound_enabled(config.timer.sound_enabled);

    emit(&out, runner.start_routine(routine))?;
    if runner.phase() != RoutinePhase::Running {
        return Err(ValidationError::EmptyRoutine(name.to_string()).into());
    }
    if !out.is_json() {
        out.note(HELP);
    }

    // tick-count mode takes exactly one second per tick
    let period = match config.routine_countdown {
        StepCountdown::Ticks => Duration::from_secs(1),
        StepCountdown::Elapsed => Duration::from_millis(config.tick_interval_ms.max(10)),
    };
    let delay = Duration::from_secs(config.routine_advance_delay_secs);
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let stdin = BufReader::new(tokio::io::stdin());
    rt.block_on(drive(&mut runner, period, delay, &out, stdin))
}

async fn drive<R: AsyncBufRead + Unpin>(
    runner: &mut RoutineRunner,
    period: Duration,
    advance_delay: Duration,
    out: &Output,
    input: R,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let advance = tokio::time::sleep(advance_delay);
    tokio::pin!(advance);
    let mut advance_pending = false;
    let mut lines = input.lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick(), if runner.phase() == RoutinePhase::Running => {
                emit(out, runner.tick())?;
                if runner.phase() == RoutinePhase::StepFinished {
                    advance.as_mut().reset(Instant::now() + advance_delay);
                    advance_pending = true;
                }
            }
            () = &mut advance, if advance_pending => {
                advance_pending = false;
                emit(out, runner.advance_to_next_step())?;
                ticker.reset();
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                match parse_input(&line) {
                    Input::TogglePause => {
                        if runner.phase() == RoutinePhase::Paused {
                            if let Some(event) = runner.resume() {
                                out.event(&event)?;
                                ticker.reset();
                            }
                        } else {
                            emit(out, runner.pause())?;
                        }
                    }
                    Input::Skip => {
                        advance_pending = false;
                        emit(out, runner.skip_step())?;
                        ticker.reset();
                    }
                    Input::GoTo(index) => {
                        match runner.go_to_step(index) {
                            Some(event) => {
                                advance_pending = false;
                                out.event(&event)?;
                                ticker.reset();
                            }
                            None => out.note(&format!("no step {}", index + 1)),
                        }
                    }
                    Input::Reset | Input::ForceReset => {
                        emit(out, runner.reset())?;
                        return Ok(());
                    }
                    Input::Help => out.note(HELP),
                    Input::Unknown(text) => out.note(&format!("unknown command: {text}")),
                }
            }
            _ = &mut ctrl_c => {
                tracing::debug!("interrupted");
                return Ok(());
            }
        }

        if runner.phase() == RoutinePhase::RoutineFinished {
            return Ok(());
        }
    }
}
