use std::time::Instant;

pub const RING_COUNT: usize = 5;
/// Seconds for one ring to grow from nothing to full size
pub const RING_PERIOD_SECS: f64 = 7.0;
/// Each ring starts this many seconds after the previous one
pub const RING_STAGGER_SECS: f64 = 0.4;
pub const MAX_SCALE: f64 = 2.0;
pub const MAX_OPACITY: f64 = 0.1;

/// One expanding ring at a given moment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RippleRing {
    /// Radius multiplier relative to the progress ring, 0.0..=2.0
    pub scale: f64,
    /// Fades from 0.1 to 0.0 as the ring grows
    pub opacity: f64,
}

fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Looping pulse shown behind the progress ring while a session runs
#[derive(Debug, Clone, Default)]
pub struct Ripple {
    pub started_at: Option<Instant>,
}

impl Ripple {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
    }

    pub fn stop(&mut self) {
        self.started_at = None;
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    /// Rings currently visible, outermost last. Rings still waiting out their
    /// stagger delay are omitted.
    pub fn rings(&self, now: Instant) -> Vec<RippleRing> {
        let Some(started_at) = self.started_at else {
            return Vec::new();
        };
        let elapsed = now.saturating_duration_since(started_at).as_secs_f64();

        (1..=RING_COUNT)
            .filter_map(|i| {
                let local = elapsed - i as f64 * RING_STAGGER_SECS;
                if local < 0.0 {
                    return None;
                }
                let phase = (local % RING_PERIOD_SECS) / RING_PERIOD_SECS;
                let eased = ease_in_out(phase);
                Some(RippleRing {
                    scale: MAX_SCALE * eased,
                    opacity: MAX_OPACITY * (1.0 - eased),
                })
            })
            .collect()
    }
}
