//! # Sequencer Scenarios
//!
//! Timing, cancellation and fallback scenarios driven by a simulated clock.

use stagehand_core::{
    FallbackTimer, Millis, PageController, RevealSource, SequenceEvent, SequencePhase, Stage,
    StageSequencer, StagehandError,
};
use std::cell::RefCell;
use std::rc::Rc;

// =============================================================================
// HELPERS
// =============================================================================

/// Each hook appends `(stage index, time passed to advance)` to the context.
fn sequencer(delays: &[u64]) -> StageSequencer<Vec<(usize, Millis)>> {
    let stages: Vec<Stage<Vec<(usize, Millis)>>> = delays
        .iter()
        .enumerate()
        .map(|(i, &delay)| {
            Stage::new(format!("stage-{i}"), Millis(delay), |log: &mut Vec<(usize, Millis)>, entry| {
                log.push((entry.index, entry.fired_at));
                Ok(())
            })
        })
        .collect();
    StageSequencer::new(stages).expect("valid stages")
}

/// Collect every event a sequencer emits.
fn record(seq: &mut StageSequencer<Vec<(usize, Millis)>>) -> Rc<RefCell<Vec<SequenceEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    seq.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    events
}

// =============================================================================
// ORDERING & TIMING
// =============================================================================

#[test]
fn every_stage_fires_once_in_order() {
    let mut seq = sequencer(&[100, 0, 250, 50, 0]);
    let mut log = Vec::new();
    seq.start(Millis(0)).expect("start");

    for t in (0..=1000).step_by(10) {
        seq.advance(Millis(t), &mut log).expect("advance");
    }

    let order: Vec<usize> = log.iter().map(|(i, _)| *i).collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4]);
}

#[test]
fn activations_land_on_exact_ticks() {
    let mut seq = sequencer(&[500, 600, 400, 800]);
    let mut log = Vec::new();
    seq.start(Millis(0)).expect("start");

    for t in [500, 1100, 1500, 2300] {
        assert_eq!(seq.next_deadline(), Some(Millis(t)));
        assert_eq!(seq.advance(Millis(t), &mut log).expect("advance"), 1);
    }

    assert_eq!(
        log,
        vec![
            (0, Millis(500)),
            (1, Millis(1100)),
            (2, Millis(1500)),
            (3, Millis(2300))
        ]
    );
}

#[test]
fn late_processing_does_not_shift_later_stages() {
    let mut seq = sequencer(&[500, 600, 400, 800]);
    let events = record(&mut seq);
    let mut log = Vec::new();
    seq.start(Millis(0)).expect("start");

    seq.advance(Millis(500), &mut log).expect("advance");
    // Stage 1 is due at 1100 but only processed at 1400.
    seq.advance(Millis(1400), &mut log).expect("advance");
    assert_eq!(seq.next_deadline(), Some(Millis(1500)));
    seq.advance(Millis(1500), &mut log).expect("advance");
    seq.advance(Millis(2300), &mut log).expect("advance");

    let scheduled: Vec<u64> = events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            SequenceEvent::StageEntered(entry) => Some(entry.scheduled_at.as_u64()),
            _ => None,
        })
        .collect();
    assert_eq!(scheduled, vec![500, 1100, 1500, 2300]);
    assert_eq!(log[2], (2, Millis(1500)));
    assert_eq!(log[3], (3, Millis(2300)));
}

#[test]
fn start_time_offsets_every_deadline() {
    let mut seq = sequencer(&[500, 600]);
    seq.start(Millis(10_000)).expect("start");
    assert_eq!(seq.next_deadline(), Some(Millis(10_500)));
    assert_eq!(seq.state().started_at, Some(Millis(10_000)));
}

// =============================================================================
// COMPLETION
// =============================================================================

#[test]
fn complete_fires_once_after_last_stage() {
    let mut seq = sequencer(&[10, 10, 10]);
    let events = record(&mut seq);
    let mut log = Vec::new();
    seq.start(Millis(0)).expect("start");

    seq.advance(Millis(20), &mut log).expect("advance");
    assert!(!events
        .borrow()
        .iter()
        .any(|e| matches!(e, SequenceEvent::Complete { .. })));

    seq.advance(Millis(30), &mut log).expect("advance");
    seq.advance(Millis(1000), &mut log).expect("advance");

    let events = events.borrow();
    let completes = events
        .iter()
        .filter(|e| matches!(e, SequenceEvent::Complete { .. }))
        .count();
    assert_eq!(completes, 1);
    assert!(matches!(events.last(), Some(SequenceEvent::Complete { at: Millis(30) })));
    assert!(matches!(
        events.get(events.len() - 2),
        Some(SequenceEvent::StageEntered(entry)) if entry.index == 2
    ));
}

// =============================================================================
// CANCELLATION
// =============================================================================

#[test]
fn cancel_before_first_stage_fires_nothing() {
    let mut seq = sequencer(&[500, 600, 400, 800]);
    let mut log = Vec::new();
    seq.start(Millis(0)).expect("start");

    assert!(seq.cancel(Millis(499)));
    assert_eq!(seq.pending(), 0);
    assert_eq!(seq.next_deadline(), None);
    seq.advance(Millis(100_000), &mut log).expect("advance");

    assert!(log.is_empty());
    assert_eq!(seq.phase(), SequencePhase::Cancelled);
}

#[test]
fn cancel_between_stages_stops_the_rest() {
    let mut seq = sequencer(&[500, 600, 400, 800]);
    let events = record(&mut seq);
    let mut log = Vec::new();
    seq.start(Millis(0)).expect("start");

    seq.advance(Millis(1100), &mut log).expect("advance");
    assert_eq!(log.len(), 2);

    assert!(seq.cancel(Millis(1200)));
    for t in [1500, 2300, 5000, 1_000_000] {
        assert_eq!(seq.advance(Millis(t), &mut log).expect("advance"), 0);
    }

    assert_eq!(log.len(), 2);
    assert_eq!(seq.state().current_index, Some(1));
    assert!(seq.state().cancelled);
    assert!(matches!(
        events.borrow().last(),
        Some(SequenceEvent::Cancelled { at: Millis(1200), pending: 2 })
    ));
}

#[test]
fn cancel_is_idempotent() {
    let mut seq = sequencer(&[100]);
    seq.start(Millis(0)).expect("start");
    assert!(seq.cancel(Millis(1)));
    assert!(!seq.cancel(Millis(2)));
    assert!(!seq.cancel(Millis(3)));
    assert_eq!(seq.phase(), SequencePhase::Cancelled);
}

#[test]
fn cancel_after_completion_is_noop() {
    let mut seq = sequencer(&[100, 100]);
    let events = record(&mut seq);
    let mut log = Vec::new();
    seq.start(Millis(0)).expect("start");
    seq.advance(Millis(200), &mut log).expect("advance");

    assert!(!seq.cancel(Millis(300)));
    assert_eq!(seq.phase(), SequencePhase::Complete);
    assert!(!events
        .borrow()
        .iter()
        .any(|e| matches!(e, SequenceEvent::Cancelled { .. })));
}

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

#[test]
fn empty_sequence_fails_at_construction() {
    let result = StageSequencer::<()>::new(Vec::new());
    assert!(matches!(result, Err(StagehandError::EmptySequence)));
}

#[test]
fn negative_delay_fails_at_construction() {
    let result = Stage::<()>::try_new("explosion", -800, |_, _| Ok(()));
    assert!(matches!(
        result,
        Err(StagehandError::NegativeDelay { ref stage, delay_ms: -800 }) if stage == "explosion"
    ));
}

// =============================================================================
// FALLBACK RESILIENCE
// =============================================================================

/// The completion notice is lost (no listener wired); the fallback alone
/// still reveals the navigation at t=4000.
#[test]
fn fallback_reveals_navigation_when_notification_is_lost() {
    let stages: Vec<Stage<PageController>> = vec![
        Stage::new("logo_drop", Millis(500), |page: &mut PageController, _| {
            page.drop_logo();
            Ok(())
        }),
        Stage::new("explosion", Millis(1500), |page: &mut PageController, _| {
            page.explode();
            Ok(())
        }),
        Stage::new("overlay_dismissed", Millis(800), |page: &mut PageController, _| {
            page.dismiss_overlay();
            Ok(())
        }),
    ];
    let mut seq = StageSequencer::new(stages).expect("valid");
    let mut page = PageController::new();
    let mut fallback = FallbackTimer::new();

    seq.start(Millis(0)).expect("start");
    fallback.arm(Millis(0), Millis(4000));

    for t in (0..=5000).step_by(100) {
        let now = Millis(t);
        seq.advance(now, &mut page).expect("advance");
        if fallback.poll(now) {
            page.reveal_navigation(RevealSource::Fallback, now);
        }
        if t < 4000 {
            assert!(!page.navigation_visible(), "visible too early at {t}");
        }
    }

    assert!(page.navigation_visible());
    assert_eq!(
        page.state().navigation.opened_by(),
        Some((RevealSource::Fallback, Millis(4000)))
    );
}

/// A hook that fails (a dropped animation event) blocks the completion
/// notice; the fallback is the safety net.
#[test]
fn fallback_covers_failing_final_hook() {
    let stages: Vec<Stage<PageController>> = vec![
        Stage::new("logo_drop", Millis(500), |page: &mut PageController, _| {
            page.drop_logo();
            Ok(())
        }),
        Stage::new("overlay_dismissed", Millis(2300), |_: &mut PageController, _| {
            Err("animation completion event dropped".into())
        }),
    ];
    let mut seq = StageSequencer::new(stages).expect("valid");
    let completed = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&completed);
    seq.subscribe(move |event| {
        if matches!(event, SequenceEvent::Complete { .. }) {
            *flag.borrow_mut() = true;
        }
    });

    let mut page = PageController::new();
    let mut fallback = FallbackTimer::new();
    seq.start(Millis(0)).expect("start");
    fallback.arm(Millis(0), Millis(4000));

    let mut hook_failures = 0;
    for t in (0..=4000).step_by(100) {
        let now = Millis(t);
        if seq.advance(now, &mut page).is_err() {
            hook_failures += 1;
        }
        if fallback.poll(now) {
            page.reveal_navigation(RevealSource::Fallback, now);
        }
    }

    assert_eq!(hook_failures, 1);
    assert!(!*completed.borrow());
    assert!(page.state().intro.logo_dropped);
    assert!(page.navigation_visible());
}
