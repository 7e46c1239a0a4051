//! Countdown session state machine.
//!
//! All derived values (elapsed, progress, word index) are recomputed from the
//! start instant and the injected [`Clock`] on every tick, never accumulated,
//! so a late or throttled tick cannot introduce drift. Completion can be
//! reached from two independent paths (a tick that sees the duration elapsed,
//! or the one-shot deadline) and is guarded by the phase so it happens once.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::SessionError;

/// Cadence of the periodic re-evaluation while a session runs
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// A new word is shown every this many seconds
pub const WORD_INTERVAL_SECS: f64 = 5.0;

pub const MIN_MINUTES: u8 = 1;
pub const MAX_MINUTES: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Running,
    /// Only ever reported by a snapshot taken after the duration elapsed but
    /// before the next tick resets the session.
    Completed,
}

/// User-selected session length in whole minutes, kept within 1..=10
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLength {
    minutes: u8,
}

impl SessionLength {
    pub fn new(minutes: u8) -> Self {
        Self {
            minutes: minutes.clamp(MIN_MINUTES, MAX_MINUTES),
        }
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn as_secs(&self) -> u64 {
        self.minutes as u64 * 60
    }

    pub fn increment(&mut self) {
        if self.minutes < MAX_MINUTES {
            self.minutes += 1;
        }
    }

    pub fn decrement(&mut self) {
        if self.minutes > MIN_MINUTES {
            self.minutes -= 1;
        }
    }
}

impl Default for SessionLength {
    fn default() -> Self {
        Self::new(MIN_MINUTES)
    }
}

/// Lifecycle and derived-state notifications for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Begin audio and ripple, schedule the deadline for `generation`
    Started { generation: u64, duration: Duration },
    ProgressChanged(f64),
    WordChanged(usize),
    /// Emitted once per 5 second boundary, carrying the new word index
    BoundaryCrossed(usize),
    /// Stop audio and ripple, fire success feedback
    Completed { generation: u64 },
}

/// Fraction of the session still remaining, 1.0 at start and 0.0 at the end
pub fn progress_fraction(elapsed_secs: f64, duration_secs: f64) -> f64 {
    if duration_secs <= 0.0 {
        return 0.0;
    }
    ((duration_secs - elapsed_secs) / duration_secs).clamp(0.0, 1.0)
}

/// Number of whole word intervals that have passed
pub fn boundary(elapsed_secs: f64) -> u64 {
    (elapsed_secs.max(0.0) / WORD_INTERVAL_SECS).floor() as u64
}

pub fn word_index(elapsed_secs: f64, word_count: usize) -> usize {
    if word_count == 0 {
        return 0;
    }
    (boundary(elapsed_secs) % word_count as u64) as usize
}

/// Point-in-time view of a session derived purely from its inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub elapsed_secs: f64,
    pub progress: f64,
    pub word_index: usize,
    pub remaining_secs: f64,
}

impl SessionSnapshot {
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            elapsed_secs: 0.0,
            progress: 0.0,
            word_index: 0,
            remaining_secs: 0.0,
        }
    }

    pub fn derive(started_at: Instant, now: Instant, duration: Duration, word_count: usize) -> Self {
        let elapsed_secs = now.saturating_duration_since(started_at).as_secs_f64();
        let total = duration.as_secs_f64();

        if elapsed_secs >= total {
            return Self {
                phase: Phase::Completed,
                elapsed_secs,
                progress: 0.0,
                word_index: 0,
                remaining_secs: 0.0,
            };
        }

        Self {
            phase: Phase::Running,
            elapsed_secs,
            progress: progress_fraction(elapsed_secs, total),
            word_index: word_index(elapsed_secs, word_count),
            remaining_secs: total - elapsed_secs,
        }
    }
}

/// A single countdown session; reused across starts, one running at a time
#[derive(Debug)]
pub struct SessionTimer<C: Clock = SystemClock> {
    clock: C,
    duration: Duration,
    word_count: usize,
    started_at: Option<Instant>,
    elapsed_secs: f64,
    progress: f64,
    word_index: usize,
    last_boundary: u64,
    phase: Phase,
    generation: u64,
}

impl SessionTimer<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for SessionTimer<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> SessionTimer<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            duration: Duration::ZERO,
            word_count: 0,
            started_at: None,
            elapsed_secs: 0.0,
            progress: 0.0,
            word_index: 0,
            last_boundary: 0,
            phase: Phase::Idle,
            generation: 0,
        }
    }

    pub fn start(
        &mut self,
        duration_secs: u64,
        word_count: usize,
    ) -> Result<Vec<SessionEvent>, SessionError> {
        if self.phase == Phase::Running {
            return Err(SessionError::AlreadyRunning);
        }
        if duration_secs == 0 {
            return Err(SessionError::InvalidDuration);
        }
        if word_count == 0 {
            return Err(SessionError::EmptyWordList);
        }

        self.duration = Duration::from_secs(duration_secs);
        self.word_count = word_count;
        self.started_at = Some(self.clock.now());
        self.elapsed_secs = 0.0;
        self.progress = 1.0;
        self.word_index = 0;
        self.last_boundary = 0;
        self.phase = Phase::Running;
        self.generation += 1;

        info!(
            generation = self.generation,
            duration_secs, word_count, "session started"
        );

        Ok(vec![SessionEvent::Started {
            generation: self.generation,
            duration: self.duration,
        }])
    }

    /// Re-derive state from the clock. No-op unless running.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        let Some(started_at) = self.started_at else {
            return Vec::new();
        };
        if self.phase != Phase::Running {
            return Vec::new();
        }

        let since_start = self
            .clock
            .now()
            .saturating_duration_since(started_at)
            .as_secs_f64();
        self.elapsed_secs = self.elapsed_secs.max(since_start);

        let total = self.duration.as_secs_f64();
        if self.elapsed_secs >= total {
            return self.complete();
        }

        let mut events = Vec::new();

        let progress = progress_fraction(self.elapsed_secs, total);
        if progress != self.progress {
            self.progress = progress;
            events.push(SessionEvent::ProgressChanged(progress));
        }

        let current = boundary(self.elapsed_secs);
        if current != self.last_boundary {
            self.last_boundary = current;
            let index = (current % self.word_count as u64) as usize;
            if index != self.word_index {
                self.word_index = index;
                events.push(SessionEvent::WordChanged(index));
            }
            debug!(boundary = current, index, "word boundary crossed");
            events.push(SessionEvent::BoundaryCrossed(index));
        }

        events
    }

    /// Finish the session. Calling this when not running does nothing.
    pub fn complete(&mut self) -> Vec<SessionEvent> {
        if self.phase != Phase::Running {
            return Vec::new();
        }

        self.started_at = None;
        self.progress = 0.0;
        self.word_index = 0;
        self.last_boundary = 0;
        self.phase = Phase::Idle;

        info!(
            generation = self.generation,
            elapsed_secs = self.elapsed_secs,
            "session completed"
        );

        vec![SessionEvent::Completed {
            generation: self.generation,
        }]
    }

    /// Backstop deadline scheduled at start. Ignored unless it belongs to the
    /// session that is currently running.
    pub fn on_deadline(&mut self, generation: u64) -> Vec<SessionEvent> {
        if generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                "ignoring deadline from an earlier session"
            );
            return Vec::new();
        }
        self.complete()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        match (self.phase, self.started_at) {
            (Phase::Running, Some(started_at)) => SessionSnapshot::derive(
                started_at,
                self.clock.now(),
                self.duration,
                self.word_count,
            ),
            _ => SessionSnapshot::idle(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn word_index(&self) -> usize {
        self.word_index
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    pub fn remaining_secs(&self) -> f64 {
        if self.is_running() {
            (self.duration.as_secs_f64() - self.elapsed_secs).max(0.0)
        } else {
            0.0
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
