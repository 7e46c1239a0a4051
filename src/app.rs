use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, info, trace};

use crate::audio::AmbientPlayer;
use crate::clock::{Clock, SystemClock};
use crate::error::SessionError;
use crate::haptics::{Feedback, Haptics};
use crate::ripple::Ripple;
use crate::runtime::{CalmEvent, DeadlineScheduler};
use crate::session::{SessionEvent, SessionLength, SessionTimer};
use crate::words::WordList;

/// How long the UI highlights a feedback pulse
pub const PULSE_DISPLAY: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Last feedback pulse, kept so the UI can flash the ring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub feedback: Feedback,
    pub at: Instant,
}

/// The single screen: session timer plus the services it drives
pub struct App<C: Clock = SystemClock> {
    pub session: SessionTimer<C>,
    pub words: WordList,
    pub length: SessionLength,
    pub ripple: Ripple,
    pub last_pulse: Option<Pulse>,
    audio: Box<dyn AmbientPlayer>,
    haptics: Box<dyn Haptics>,
    deadline: Box<dyn DeadlineScheduler>,
}

impl<C: Clock> App<C> {
    pub fn new(
        session: SessionTimer<C>,
        words: WordList,
        length: SessionLength,
        audio: Box<dyn AmbientPlayer>,
        haptics: Box<dyn Haptics>,
        deadline: Box<dyn DeadlineScheduler>,
    ) -> Self {
        Self {
            session,
            words,
            length,
            ripple: Ripple::new(),
            last_pulse: None,
            audio,
            haptics,
            deadline,
        }
    }

    pub fn now(&self) -> Instant {
        self.session.clock().now()
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        let events = self.session.start(self.length.as_secs(), self.words.len())?;
        self.dispatch(events);
        Ok(())
    }

    pub fn on_tick(&mut self) {
        let events = self.session.tick();
        self.dispatch(events);
    }

    pub fn on_deadline(&mut self, generation: u64) {
        let events = self.session.on_deadline(generation);
        self.dispatch(events);
    }

    /// Mute/unmute the ambient track. Never touches the session.
    pub fn toggle_audio(&mut self) -> bool {
        let playing = self.audio.toggle();
        debug!(playing, "ambient audio toggled");
        playing
    }

    pub fn is_audio_playing(&self) -> bool {
        self.audio.is_playing()
    }

    pub fn increase_length(&mut self) {
        if !self.session.is_running() {
            self.length.increment();
        }
    }

    pub fn decrease_length(&mut self) {
        if !self.session.is_running() {
            self.length.decrement();
        }
    }

    /// Word to display right now, or None when idle
    pub fn current_word(&self) -> Option<&str> {
        if self.session.is_running() {
            Some(self.words.get(self.session.word_index()))
        } else {
            None
        }
    }

    /// Pulse still within its display window
    pub fn active_pulse(&self) -> Option<Feedback> {
        let pulse = self.last_pulse?;
        if self.now().saturating_duration_since(pulse.at) < PULSE_DISPLAY {
            Some(pulse.feedback)
        } else {
            None
        }
    }

    pub fn handle_event(&mut self, event: CalmEvent) -> Control {
        match event {
            CalmEvent::Tick => {
                self.on_tick();
                Control::Continue
            }
            CalmEvent::Deadline(generation) => {
                self.on_deadline(generation);
                Control::Continue
            }
            CalmEvent::Resize => Control::Continue,
            CalmEvent::Key(key) => self.handle_key(key),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        // some platforms also report releases and repeats
        if key.kind != KeyEventKind::Press {
            return Control::Continue;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Control::Quit,
            KeyCode::Esc | KeyCode::Char('q') => Control::Quit,
            KeyCode::Enter | KeyCode::Char(' ') => {
                // the start button is inert while a session runs
                if let Err(err) = self.start() {
                    debug!(error = %err, "start ignored");
                }
                Control::Continue
            }
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char('=') => {
                self.increase_length();
                Control::Continue
            }
            KeyCode::Left | KeyCode::Char('-') => {
                self.decrease_length();
                Control::Continue
            }
            KeyCode::Char('m') => {
                self.toggle_audio();
                Control::Continue
            }
            _ => Control::Continue,
        }
    }

    /// Stop anything still playing before the terminal is restored
    pub fn shutdown(&mut self) {
        if self.session.is_running() {
            info!("quitting with a session in progress");
        }
        self.audio.stop();
        self.ripple.stop();
    }

    fn pulse(&mut self, feedback: Feedback) {
        self.haptics.notify(feedback);
        self.last_pulse = Some(Pulse {
            feedback,
            at: self.now(),
        });
    }

    fn dispatch(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            match event {
                SessionEvent::Started {
                    generation,
                    duration,
                } => {
                    self.audio.play();
                    let now = self.now();
                    self.ripple.start(now);
                    self.deadline.schedule(duration, generation);
                }
                SessionEvent::ProgressChanged(progress) => {
                    trace!(progress, "progress");
                }
                SessionEvent::WordChanged(index) => {
                    trace!(index, word = self.words.get(index), "word changed");
                }
                SessionEvent::BoundaryCrossed(_) => {
                    self.pulse(Feedback::Warning);
                }
                SessionEvent::Completed { .. } => {
                    self.audio.stop();
                    self.ripple.stop();
                    self.pulse(Feedback::Success);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SilentPlayer;
    use crate::clock::ManualClock;
    use crate::runtime::ManualDeadline;
    use crate::session::Phase;
    use crate::words::DEFAULT_WORD_LIST;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingHaptics {
        pulses: Rc<RefCell<Vec<Feedback>>>,
    }

    impl Haptics for RecordingHaptics {
        fn notify(&mut self, feedback: Feedback) {
            self.pulses.borrow_mut().push(feedback);
        }
    }

    struct Harness {
        app: App<ManualClock>,
        clock: ManualClock,
        pulses: Rc<RefCell<Vec<Feedback>>>,
        deadline: ManualDeadline,
    }

    fn harness(minutes: u8) -> Harness {
        let clock = ManualClock::new();
        let haptics = RecordingHaptics::default();
        let pulses = haptics.pulses.clone();
        let deadline = ManualDeadline::new();

        let app = App::new(
            SessionTimer::with_clock(clock.clone()),
            WordList::bundled(DEFAULT_WORD_LIST).unwrap(),
            SessionLength::new(minutes),
            Box::new(SilentPlayer::new()),
            Box::new(haptics),
            Box::new(deadline.clone()),
        );

        Harness {
            app,
            clock,
            pulses,
            deadline,
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_start_plays_audio_and_schedules_deadline() {
        let mut h = harness(1);
        h.app.start().unwrap();

        assert!(h.app.session.is_running());
        assert!(h.app.is_audio_playing());
        assert!(h.app.ripple.is_active());
        assert_eq!(h.deadline.scheduled(), vec![(Duration::from_secs(60), 1)]);
        assert_eq!(h.app.current_word(), Some("Calm down"));
    }

    #[test]
    fn test_boundary_pulses_warning() {
        let mut h = harness(1);
        h.app.start().unwrap();

        h.clock.advance_secs(5.0);
        h.app.on_tick();

        assert_eq!(*h.pulses.borrow(), vec![Feedback::Warning]);
        assert_eq!(h.app.current_word(), Some("Relax"));
        assert_eq!(h.app.active_pulse(), Some(Feedback::Warning));

        h.clock.advance(PULSE_DISPLAY);
        assert_eq!(h.app.active_pulse(), None);
    }

    #[test]
    fn test_completion_stops_everything_once() {
        let mut h = harness(1);
        h.app.start().unwrap();

        h.clock.advance_secs(60.0);
        h.app.on_tick();
        h.app.on_deadline(1);

        assert_eq!(h.app.session.phase(), Phase::Idle);
        assert!(!h.app.is_audio_playing());
        assert!(!h.app.ripple.is_active());
        let successes = h
            .pulses
            .borrow()
            .iter()
            .filter(|f| **f == Feedback::Success)
            .count();
        assert_eq!(successes, 1);
        assert_eq!(h.app.current_word(), None);
    }

    #[test]
    fn test_deadline_alone_completes() {
        let mut h = harness(2);
        h.app.start().unwrap();
        h.app.handle_event(CalmEvent::Deadline(1));

        assert!(!h.app.session.is_running());
        assert_eq!(*h.pulses.borrow(), vec![Feedback::Success]);
    }

    #[test]
    fn test_toggle_audio_leaves_session_untouched() {
        let mut h = harness(1);
        h.app.start().unwrap();
        h.clock.advance_secs(12.0);
        h.app.on_tick();

        let before = (
            h.app.session.phase(),
            h.app.session.progress(),
            h.app.session.word_index(),
        );

        assert!(!h.app.toggle_audio());
        assert!(!h.app.is_audio_playing());
        assert!(h.app.toggle_audio());

        let after = (
            h.app.session.phase(),
            h.app.session.progress(),
            h.app.session.word_index(),
        );
        assert_eq!(before, after);
    }

    #[test]
    fn test_second_start_is_rejected() {
        let mut h = harness(1);
        h.app.start().unwrap();
        h.clock.advance_secs(10.0);

        assert_eq!(h.app.start(), Err(SessionError::AlreadyRunning));
        // key path swallows the error without restarting
        h.app.handle_key(key(KeyCode::Enter));
        h.app.on_tick();

        assert!((h.app.session.elapsed_secs() - 10.0).abs() < 1e-9);
        assert_eq!(h.deadline.scheduled().len(), 1);
    }

    #[test]
    fn test_length_keys_only_when_idle() {
        let mut h = harness(3);

        h.app.handle_key(key(KeyCode::Char('+')));
        h.app.handle_key(key(KeyCode::Right));
        assert_eq!(h.app.length.minutes(), 5);
        h.app.handle_key(key(KeyCode::Left));
        assert_eq!(h.app.length.minutes(), 4);

        h.app.handle_key(key(KeyCode::Char(' ')));
        h.app.handle_key(key(KeyCode::Char('-')));
        assert_eq!(h.app.length.minutes(), 4);
        assert_eq!(h.app.session.duration(), Duration::from_secs(240));
    }

    #[test]
    fn test_quit_keys() {
        let mut h = harness(1);
        assert_eq!(h.app.handle_key(key(KeyCode::Char('q'))), Control::Quit);
        assert_eq!(h.app.handle_key(key(KeyCode::Esc)), Control::Quit);
        assert_eq!(
            h.app
                .handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Control::Quit
        );
        assert_eq!(h.app.handle_key(key(KeyCode::Char('x'))), Control::Continue);
    }

    #[test]
    fn test_shutdown_stops_audio() {
        let mut h = harness(1);
        h.app.start().unwrap();
        h.app.shutdown();
        assert!(!h.app.is_audio_playing());
        assert!(!h.app.ripple.is_active());
    }
}
