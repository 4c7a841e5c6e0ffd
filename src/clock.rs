//! Frame timing
//!
//! Games advance by wall-clock time rather than tick counts. Each update
//! consumes the milliseconds since the previous one; the result is clamped
//! so a scheduling stall cannot trigger a runaway catch-up.

use std::time::Instant;

use crate::consts::{MAX_FRAME_SCALAR, MIN_FRAME_SCALAR};

#[derive(Debug, Clone)]
enum Source {
    Wall { last: Option<Instant> },
    /// Every update sees the same elapsed time (deterministic runs)
    Fixed { step_ms: f64 },
}

/// Elapsed-time source owned by a game session
#[derive(Debug, Clone)]
pub struct FrameClock {
    source: Source,
}

/// Elapsed time for one update, already clamped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    pub elapsed_ms: f64,
    /// `elapsed_ms / base_ms`, in [0.1, 5.0]
    pub scalar: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::wall()
    }
}

impl FrameClock {
    pub fn wall() -> Self {
        Self {
            source: Source::Wall { last: None },
        }
    }

    pub fn fixed(step_ms: f64) -> Self {
        Self {
            source: Source::Fixed { step_ms },
        }
    }

    /// Raw milliseconds since the previous call (`base_ms` on the first call)
    pub fn consume_elapsed_ms(&mut self, base_ms: f64) -> f64 {
        match &mut self.source {
            Source::Wall { last } => {
                let now = Instant::now();
                let elapsed = last
                    .map(|prev| now.duration_since(prev).as_secs_f64() * 1000.0)
                    .unwrap_or(base_ms);
                *last = Some(now);
                elapsed
            }
            Source::Fixed { step_ms } => *step_ms,
        }
    }

    /// Consume and clamp elapsed time against the nominal frame length
    pub fn frame(&mut self, base_ms: f64) -> FrameTime {
        let mut elapsed = self.consume_elapsed_ms(base_ms);
        if elapsed <= 0.0 {
            elapsed = base_ms;
        }
        let scalar = (elapsed / base_ms).clamp(MIN_FRAME_SCALAR, MAX_FRAME_SCALAR);
        FrameTime {
            elapsed_ms: scalar * base_ms,
            scalar,
        }
    }

    /// Restart measurement from now (after pauses and level loads)
    pub fn reset(&mut self) {
        if let Source::Wall { last } = &mut self.source {
            *last = Some(Instant::now());
        }
    }
}
