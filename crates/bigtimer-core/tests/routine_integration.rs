//! Integration tests for running routines end to end.

use std::rc::Rc;

use bigtimer_core::{
    Cue, Event, ManualClock, RecordingCuePlayer, Routine, RoutinePhase, RoutineRunner,
    RoutineStep, StepCountdown,
};

fn routine(steps: &[(u32, &str)]) -> Rc<Routine> {
    Rc::new(Routine::new(
        "Morning",
        Some("☀️"),
        steps
            .iter()
            .map(|(m, n)| RoutineStep::new(*m, Some(n)))
            .collect(),
    ))
}

fn runner() -> (RoutineRunner, Rc<ManualClock>, Rc<RecordingCuePlayer>) {
    let clock = Rc::new(ManualClock::new());
    let cues = Rc::new(RecordingCuePlayer::new());
    let runner = RoutineRunner::new(clock.clone(), cues.clone());
    (runner, clock, cues)
}

#[test]
fn test_routine_sequencing() {
    let (mut r, _clock, _cues) = runner();
    r.start_routine(routine(&[(2, "Brush teeth"), (3, "Get dressed")]));

    for _ in 0..120 {
        r.tick();
    }
    assert_eq!(r.phase(), RoutinePhase::StepFinished);
    assert_eq!(r.current_step_index(), 0);
    assert_eq!(r.step_remaining_secs(), 0);

    r.advance_to_next_step();
    assert_eq!(r.phase(), RoutinePhase::Running);
    assert_eq!(r.current_step_index(), 1);
    assert_eq!(r.step_total_secs(), 180);
    assert_eq!(
        r.current_step().map(|s| s.name.as_str()),
        Some("Get dressed")
    );
}

#[test]
fn test_skip_past_end_finishes_routine() {
    let (mut r, _clock, cues) = runner();
    r.start_routine(routine(&[(5, "Only step")]));
    assert!(matches!(r.skip_step(), Some(Event::RoutineFinished { .. })));
    assert_eq!(r.phase(), RoutinePhase::RoutineFinished);
    assert_eq!(r.step_remaining_secs(), 0);
    assert_eq!(cues.played(), vec![Cue::RoutineComplete]);
}

#[test]
fn test_full_routine_with_auto_advance() {
    let (mut r, _clock, cues) = runner();
    let shared = routine(&[(1, "A"), (1, "B"), (1, "C")]);
    r.start_routine(shared.clone());

    let mut events = Vec::new();
    let mut guard = 0;
    while r.phase() != RoutinePhase::RoutineFinished {
        guard += 1;
        assert!(guard < 1_000, "routine never finished");
        match r.phase() {
            RoutinePhase::Running => {
                if let Some(event) = r.tick() {
                    events.push(event);
                }
            }
            RoutinePhase::StepFinished => {
                if let Some(event) = r.advance_to_next_step() {
                    events.push(event);
                }
            }
            other => panic!("unexpected phase {other:?}"),
        }
    }

    let finished_steps = events
        .iter()
        .filter(|e| matches!(e, Event::StepFinished { .. }))
        .count();
    assert_eq!(finished_steps, 2);
    assert!(matches!(events.last(), Some(Event::RoutineFinished { .. })));
    assert_eq!(
        cues.played(),
        vec![Cue::StepComplete, Cue::StepComplete, Cue::RoutineComplete]
    );
    assert!((r.elapsed_routine_minutes() - 3.0).abs() < 1e-9);

    // the shared routine is untouched
    assert_eq!(shared.steps.len(), 3);
    assert_eq!(Rc::strong_count(&shared), 2);
}

#[test]
fn test_step_index_never_out_of_bounds() {
    let (mut r, _clock, _cues) = runner();
    r.start_routine(routine(&[(1, "A"), (1, "B")]));
    for _ in 0..10 {
        r.skip_step();
        r.advance_to_next_step();
        r.go_to_step(7);
        assert!(r.current_step_index() < 2);
    }
    assert_eq!(r.phase(), RoutinePhase::RoutineFinished);
    assert!(r.current_step().is_some());
}

#[test]
fn test_go_to_step_restarts_finished_routine() {
    let (mut r, _clock, _cues) = runner();
    r.start_routine(routine(&[(1, "A"), (2, "B")]));
    r.skip_step();
    r.skip_step();
    assert_eq!(r.phase(), RoutinePhase::RoutineFinished);
    r.go_to_step(0);
    assert_eq!(r.phase(), RoutinePhase::Running);
    assert_eq!(r.step_remaining_secs(), 60);
}

#[test]
fn test_elapsed_mode_survives_dropped_ticks() {
    let clock = Rc::new(ManualClock::new());
    let cues = Rc::new(RecordingCuePlayer::new());
    let mut ticks = RoutineRunner::new(clock.clone(), cues.clone());
    let mut elapsed =
        RoutineRunner::new(clock.clone(), cues.clone()).with_countdown(StepCountdown::Elapsed);
    let shared = routine(&[(2, "A")]);
    ticks.start_routine(shared.clone());
    elapsed.start_routine(shared);

    // the scheduler stalls and only manages one tick in 30 seconds
    clock.advance_secs(30);
    ticks.tick();
    elapsed.tick();

    assert_eq!(ticks.step_remaining_secs(), 119);
    assert_eq!(elapsed.step_remaining_secs(), 90);
}

#[test]
fn test_restart_with_different_routine() {
    let (mut r, _clock, _cues) = runner();
    r.start_routine(routine(&[(1, "A"), (1, "B")]));
    r.skip_step();
    let other = Rc::new(Routine::new(
        "Evening",
        None,
        vec![RoutineStep::new(4, None)],
    ));
    r.start_routine(other);
    assert_eq!(r.current_step_index(), 0);
    assert_eq!(r.step_total_secs(), 240);
    assert_eq!(r.active_routine().map(|a| a.name.as_str()), Some("Evening"));
    assert_eq!(r.total_routine_minutes(), 4);
}
