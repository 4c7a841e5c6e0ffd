//! Brick-breaking game
//!
//! Paddle at the bottom, a grid of bricks at the top, any number of balls,
//! falling power-ups and lasers. The session owns every entity; the host
//! only calls `update` and forwards button tokens.

pub mod bricks;
pub mod entities;
pub mod layout;
pub mod levels;
pub mod powerup;
pub mod render;
pub mod state;
pub mod tick;

pub use bricks::{BrickContact, BrickField};
pub use entities::{Ball, Brick, Laser, Paddle};
pub use layout::BrickLayout;
pub use powerup::{EffectTimers, PowerUp, PowerUpKind, TimedEffect};
pub use state::{BreakoutState, Phase};

use crate::clock::FrameClock;
use crate::game::{ArcadeGame, GameKind, NextTick};
use crate::input::ButtonEvent;
use crate::settings::ArcadeOptions;
use crate::surface::Surface;

/// A running breakout session
#[derive(Debug, Clone)]
pub struct Breakout {
    state: BreakoutState,
    clock: FrameClock,
}

impl Breakout {
    pub fn new(options: &ArcadeOptions, width: i32, height: i32) -> Self {
        let options = options.sanitized();
        let seed = options.session_seed();
        log::info!(
            "Breakout session {width}x{height}, {} lives, seed {seed}",
            options.lives
        );
        Self {
            state: BreakoutState::new(width, height, options.lives, seed),
            clock: FrameClock::wall(),
        }
    }

    /// Replace the wall clock (fixed steps make runs reproducible)
    pub fn with_clock(mut self, clock: FrameClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &BreakoutState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut BreakoutState {
        &mut self.state
    }
}

impl ArcadeGame for Breakout {
    fn kind(&self) -> GameKind {
        GameKind::Breakout
    }

    fn update(&mut self, surface: &mut dyn Surface) -> NextTick {
        tick::update(&mut self.state, &mut self.clock, surface)
    }

    fn on_button(&mut self, token: &str) {
        if let Some(event) = ButtonEvent::parse(token) {
            self.state.handle_button(event);
        }
    }
}
