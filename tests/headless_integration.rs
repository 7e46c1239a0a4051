use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use calmie::app::{App, Control};
use calmie::audio::SilentPlayer;
use calmie::clock::ManualClock;
use calmie::haptics::{Feedback, Haptics};
use calmie::runtime::{CalmEvent, FixedTicker, ManualDeadline, Runner, TestEventSource};
use calmie::session::{Phase, SessionLength, SessionTimer};
use calmie::words::{WordList, DEFAULT_WORD_LIST};

#[derive(Clone, Default)]
struct Recorder {
    pulses: Rc<RefCell<Vec<Feedback>>>,
}

impl Haptics for Recorder {
    fn notify(&mut self, feedback: Feedback) {
        self.pulses.borrow_mut().push(feedback);
    }
}

fn build_app(minutes: u8) -> (App<ManualClock>, ManualClock, Recorder, ManualDeadline) {
    let clock = ManualClock::new();
    let recorder = Recorder::default();
    let deadline = ManualDeadline::new();
    let app = App::new(
        SessionTimer::with_clock(clock.clone()),
        WordList::bundled(DEFAULT_WORD_LIST).unwrap(),
        SessionLength::new(minutes),
        Box::new(SilentPlayer::new()),
        Box::new(recorder.clone()),
        Box::new(deadline.clone()),
    );
    (app, clock, recorder, deadline)
}

fn key(code: KeyCode) -> CalmEvent {
    CalmEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

// Drives a full one minute session through Runner/TestEventSource without a TTY.
// Each Tick advances the manual clock by the real tick interval.
#[test]
fn headless_one_minute_session_completes() {
    let (mut app, clock, recorder, deadline) = build_app(1);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(1)),
    );

    tx.send(key(KeyCode::Char(' '))).unwrap();

    let mut words_seen = Vec::new();
    for _ in 0..1000u32 {
        let event = runner.step();
        if event == CalmEvent::Tick {
            clock.advance(Duration::from_millis(100));
        }
        assert_eq!(app.handle_event(event), Control::Continue);

        if let Some(word) = app.current_word() {
            if words_seen.last().map(String::as_str) != Some(word) {
                words_seen.push(word.to_string());
            }
        }
        if app.session.generation() == 1 && !app.session.is_running() {
            break;
        }
    }

    assert_eq!(app.session.phase(), Phase::Idle);
    assert_eq!(app.session.progress(), 0.0);
    assert_eq!(app.session.word_index(), 0);

    let pulses = recorder.pulses.borrow().clone();
    let warnings = pulses.iter().filter(|f| **f == Feedback::Warning).count();
    let successes = pulses.iter().filter(|f| **f == Feedback::Success).count();
    assert_eq!(warnings, 11);
    assert_eq!(successes, 1);

    // first twelve words, in order
    assert_eq!(words_seen.len(), 12);
    assert_eq!(words_seen[0], "Calm down");
    assert_eq!(words_seen[11], "Meditate");

    // the backstop deadline arrives late and changes nothing
    let (scheduled_after, generation) = deadline.scheduled()[0];
    assert_eq!(scheduled_after, Duration::from_secs(60));
    app.handle_event(CalmEvent::Deadline(generation));
    assert_eq!(recorder.pulses.borrow().len(), 12);
}

#[test]
fn headless_deadline_finishes_starved_session() {
    let (mut app, _clock, recorder, deadline) = build_app(3);

    app.handle_event(key(KeyCode::Enter));
    assert!(app.session.is_running());

    // no ticks ever arrive; only the deadline fires
    let (_, generation) = deadline.scheduled()[0];
    app.handle_event(CalmEvent::Deadline(generation));

    assert!(!app.session.is_running());
    assert_eq!(*recorder.pulses.borrow(), vec![Feedback::Success]);
}

#[test]
fn headless_mute_during_session() {
    let (mut app, clock, _recorder, _deadline) = build_app(1);

    app.handle_event(key(KeyCode::Char(' ')));
    clock.advance(Duration::from_secs(7));
    app.handle_event(CalmEvent::Tick);
    let progress = app.session.progress();

    app.handle_event(key(KeyCode::Char('m')));
    assert!(!app.is_audio_playing());
    assert_eq!(app.session.progress(), progress);
    assert_eq!(app.session.word_index(), 1);

    app.handle_event(key(KeyCode::Char('m')));
    assert!(app.is_audio_playing());
    assert!(app.session.is_running());
}

#[test]
fn headless_back_to_back_sessions_ignore_stale_deadline() {
    let (mut app, clock, recorder, deadline) = build_app(1);

    app.handle_event(key(KeyCode::Char(' ')));
    clock.advance(Duration::from_secs(60));
    app.handle_event(CalmEvent::Tick);
    assert!(!app.session.is_running());

    app.handle_event(key(KeyCode::Char(' ')));
    assert!(app.session.is_running());

    // first session's deadline fires during the second session
    app.handle_event(CalmEvent::Deadline(deadline.scheduled()[0].1));
    assert!(app.session.is_running());

    app.handle_event(CalmEvent::Deadline(deadline.scheduled()[1].1));
    assert!(!app.session.is_running());

    let successes = recorder
        .pulses
        .borrow()
        .iter()
        .filter(|f| **f == Feedback::Success)
        .count();
    assert_eq!(successes, 2);
}
