use std::io::{self, Write};

use tracing::trace;

/// Feedback pulse kinds, mirroring notification-style haptics
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Feedback {
    /// Word boundary crossed
    Warning,
    /// Session finished
    Success,
}

pub trait Haptics {
    fn notify(&mut self, feedback: Feedback);
}

/// Rings the terminal bell. The visual pulse is drawn by the UI.
#[derive(Debug, Clone, Copy)]
pub struct TerminalBell {
    enabled: bool,
}

impl TerminalBell {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Haptics for TerminalBell {
    fn notify(&mut self, feedback: Feedback) {
        trace!(%feedback, "feedback pulse");
        if !self.enabled {
            return;
        }
        if let Err(err) = ring_bell(&mut io::stdout()) {
            trace!(error = %err, "terminal bell failed");
        }
    }
}

fn ring_bell<W: Write>(out: &mut W) -> io::Result<()> {
    out.write_all(b"\x07")?;
    out.flush()
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn notify(&mut self, _feedback: Feedback) {}
}
