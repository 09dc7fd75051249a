use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use mathdrill::answer_pad::{self, AnswerPad, PadKey};
use mathdrill::runtime::{
    DrillEvent, FixedTicker, ManualClock, ManualCountdown, Runner, TestEventSource,
};
use mathdrill::{PhaseKind, Question, SessionController, TestConfig};

fn question(expression: &str, correct_answer: u64) -> Question {
    Question {
        expression: expression.to_string(),
        correct_answer,
        time_spent_secs: 0,
    }
}

fn key(c: char) -> DrillEvent {
    DrillEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

fn handle(controller: &mut SessionController, pad: &mut AnswerPad, event: DrillEvent) {
    match event {
        DrillEvent::Countdown(generation) => controller.on_countdown(generation),
        DrillEvent::Key(key) => match key.code {
            KeyCode::Char(c) => {
                if let Some(k) = PadKey::from_char(c) {
                    answer_pad::apply_key(controller, pad, k);
                }
            }
            KeyCode::Enter => answer_pad::submit(controller, pad),
            KeyCode::Left => {
                let target = controller.current_index().saturating_sub(1);
                answer_pad::navigate(controller, pad, target);
            }
            _ => {}
        },
        DrillEvent::Tick | DrillEvent::Resize => {}
    }
}

// Drives a controller through the real Runner loop with injected time so a
// three second attempt expires without waiting on wall-clock seconds.
#[test]
fn headless_timeout_counts_pending_answer() {
    let clock = ManualClock::new();
    let countdown = ManualCountdown::new();
    let config = TestConfig::new(mathdrill::Operation::Addition, 1, 2, 3).unwrap();
    let mut controller =
        SessionController::new(config, Box::new(clock.clone()), Box::new(countdown.clone()));
    let mut pad = AnswerPad::new();

    controller.start_with(vec![question("2 + 3", 5), question("4 + 4", 8)]);
    let generation = countdown.snapshot().generation;

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    tx.send(key('5')).unwrap();
    tx.send(DrillEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)))
        .unwrap();
    tx.send(key('8')).unwrap();
    // a stale generation must not move the timer
    tx.send(DrillEvent::Countdown(generation + 10)).unwrap();
    for _ in 0..3 {
        tx.send(DrillEvent::Countdown(generation)).unwrap();
    }

    for _ in 0..50u32 {
        clock.advance(Duration::from_millis(700));
        let event = runner.step();
        handle(&mut controller, &mut pad, event);
        if controller.phase() == PhaseKind::Finished {
            break;
        }
    }

    assert_eq!(controller.phase(), PhaseKind::Finished);
    let result = controller.result().unwrap();
    assert!(result.timed_out);
    assert_eq!(result.score, 2);
    assert_eq!(result.time_taken_secs, 3);
    assert_eq!(controller.answers(), ["5".to_string(), "8".to_string()]);
    assert!(!countdown.snapshot().armed);
}

#[test]
fn headless_navigation_preloads_answer_and_tracks_time() {
    let clock = ManualClock::new();
    let countdown = ManualCountdown::new();
    let mut controller = SessionController::new(
        TestConfig::default(),
        Box::new(clock.clone()),
        Box::new(countdown.clone()),
    );
    let mut pad = AnswerPad::new();
    controller.start_with(vec![
        question("12 + 30", 42),
        question("20 + 11", 31),
        question("15 + 15", 30),
    ]);

    clock.advance(Duration::from_secs(4));
    for c in ['4', '2'] {
        handle(&mut controller, &mut pad, key(c));
    }
    handle(
        &mut controller,
        &mut pad,
        DrillEvent::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)),
    );
    assert_eq!(controller.current_index(), 1);
    assert_eq!(controller.input_buffer(), "");

    clock.advance(Duration::from_secs(2));
    handle(
        &mut controller,
        &mut pad,
        DrillEvent::Key(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE)),
    );
    assert_eq!(controller.current_index(), 0);
    assert_eq!(controller.input_buffer(), "42");
    assert!(pad.replaces_next());

    // first digit after navigating replaces the preloaded answer
    handle(&mut controller, &mut pad, key('9'));
    assert_eq!(controller.input_buffer(), "9");

    clock.advance(Duration::from_secs(3));
    controller.finish_manually();

    assert_eq!(controller.elapsed_secs(), vec![7, 2, 0]);
    assert_eq!(controller.questions()[0].time_spent_secs, 7);
    assert_eq!(controller.answers()[0], "9");
    assert_eq!(controller.score(), Some(0));
}
