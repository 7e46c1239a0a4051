use std::cell::Cell;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use tracing::{debug, warn};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug, PartialEq)]
pub enum CalmEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    /// One-shot session deadline, tagged with the session generation
    Deadline(u64),
}

/// Source of terminal events (keyboard, resize, deadlines)
pub trait CalmEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<CalmEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<CalmEvent>,
    rx: Receiver<CalmEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let input_tx = tx.clone();

        std::thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if input_tx.send(CalmEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if input_tx.send(CalmEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(error = %err, "terminal input reader stopped");
                    break;
                }
            }
        });

        Self { tx, rx }
    }

    /// Sender for producers other than the terminal, e.g. deadlines
    pub fn sender(&self) -> Sender<CalmEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CalmEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<CalmEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<CalmEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<CalmEvent>) -> Self {
        Self { rx }
    }
}

impl CalmEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<CalmEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time.
/// Ticks are due on a fixed schedule, so a steady stream of input cannot
/// starve them.
pub struct Runner<E: CalmEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    next_tick: Cell<Instant>,
}

impl<E: CalmEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        let next_tick = Cell::new(Instant::now() + ticker.interval());
        Self {
            event_source,
            ticker,
            next_tick,
        }
    }

    /// Returns Tick when one is due, otherwise blocks until the next event or
    /// the tick deadline, whichever comes first
    pub fn step(&self) -> CalmEvent {
        let now = Instant::now();
        let due = self.next_tick.get();
        if now >= due {
            return self.tick();
        }

        match self.event_source.recv_timeout(due - now) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) => self.tick(),
            Err(RecvTimeoutError::Disconnected) => {
                // nothing left to wait on, keep the cadence anyway
                std::thread::sleep(due.saturating_duration_since(Instant::now()));
                self.tick()
            }
        }
    }

    fn tick(&self) -> CalmEvent {
        self.next_tick.set(Instant::now() + self.ticker.interval());
        CalmEvent::Tick
    }
}

/// Schedules the one-shot completion backstop for a session
pub trait DeadlineScheduler {
    fn schedule(&self, after: Duration, generation: u64);
}

/// Sleeps on a dedicated thread, then posts `Deadline` into the event channel.
/// Deadlines are never cancelled; the session ignores stale generations.
pub struct ThreadDeadline {
    tx: Sender<CalmEvent>,
}

impl ThreadDeadline {
    pub fn new(tx: Sender<CalmEvent>) -> Self {
        Self { tx }
    }
}

impl DeadlineScheduler for ThreadDeadline {
    fn schedule(&self, after: Duration, generation: u64) {
        let tx = self.tx.clone();
        debug!(generation, after_secs = after.as_secs_f64(), "deadline scheduled");
        std::thread::spawn(move || {
            std::thread::sleep(after);
            // receiver gone means the app already quit
            let _ = tx.send(CalmEvent::Deadline(generation));
        });
    }
}

/// Records scheduled deadlines instead of sleeping; the caller decides when
/// they fire.
#[derive(Clone, Debug, Default)]
pub struct ManualDeadline {
    scheduled: Arc<Mutex<Vec<(Duration, u64)>>>,
}

impl ManualDeadline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduled(&self) -> Vec<(Duration, u64)> {
        self.scheduled
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl DeadlineScheduler for ManualDeadline {
    fn schedule(&self, after: Duration, generation: u64) {
        if let Ok(mut scheduled) = self.scheduled.lock() {
            scheduled.push((after, generation));
        }
    }
}
