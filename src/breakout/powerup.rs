//! Power-up drops and timed effects

use rand::Rng;

use super::entities::{Brick, Paddle};
use crate::geom::Rect;
use crate::surface::Rgb;

/// Percent chance a destroyed brick drops a power-up
pub const DROP_PERCENT: u32 = 12;
/// Lifetime of every timed effect
pub const EFFECT_DURATION_MS: f64 = 8000.0;
/// How long the portal stays open before the level advances
pub const PORTAL_OPEN_MS: f64 = 1500.0;
/// Ball speed multiplier while slowed
pub const SLOW_MULTIPLIER: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    Expand,
    Slow,
    /// Balls pass through and destroy destructible bricks
    Break,
    Sticky,
    Laser,
    Triple,
    ExtraLife,
    Portal,
}

/// Drop table; the first cumulative bucket containing the roll wins
const DROP_WEIGHTS: [(PowerUpKind, u32); 8] = [
    (PowerUpKind::Break, 12),
    (PowerUpKind::Expand, 12),
    (PowerUpKind::Slow, 5),
    (PowerUpKind::Sticky, 5),
    (PowerUpKind::Laser, 5),
    (PowerUpKind::Triple, 4),
    (PowerUpKind::ExtraLife, 2),
    (PowerUpKind::Portal, 2),
];

impl PowerUpKind {
    pub fn color(&self) -> Rgb {
        match self {
            PowerUpKind::Expand => Rgb::new(0, 200, 255),
            PowerUpKind::Slow => Rgb::new(255, 165, 0),
            PowerUpKind::Break => Rgb::new(255, 0, 255),
            PowerUpKind::Sticky => Rgb::new(0, 255, 120),
            PowerUpKind::Laser => Rgb::new(220, 0, 0),
            PowerUpKind::Triple => Rgb::new(173, 216, 230),
            PowerUpKind::ExtraLife => Rgb::WHITE,
            PowerUpKind::Portal => Rgb::new(255, 20, 147),
        }
    }

    /// Timer this kind starts, if any
    pub fn timed_effect(&self) -> Option<TimedEffect> {
        match self {
            PowerUpKind::Expand => Some(TimedEffect::Expand),
            PowerUpKind::Slow => Some(TimedEffect::Slow),
            PowerUpKind::Break => Some(TimedEffect::Break),
            PowerUpKind::Sticky => Some(TimedEffect::Sticky),
            PowerUpKind::Laser => Some(TimedEffect::Laser),
            PowerUpKind::Triple | PowerUpKind::ExtraLife | PowerUpKind::Portal => None,
        }
    }

    /// Map a roll in `[0, total_weight)` onto the drop table
    pub fn from_weighted_roll(roll: u32) -> Option<Self> {
        let mut accum = 0;
        for (kind, weight) in DROP_WEIGHTS {
            accum += weight;
            if roll < accum {
                return Some(kind);
            }
        }
        None
    }

    pub fn total_weight() -> u32 {
        DROP_WEIGHTS.iter().map(|(_, w)| w).sum()
    }

    /// Roll for a drop: `drop_percent`% chance, then a weighted pick
    pub fn roll(rng: &mut impl Rng, drop_percent: u32) -> Option<Self> {
        if rng.random_range(0..100) >= drop_percent {
            return None;
        }
        Self::from_weighted_roll(rng.random_range(0..Self::total_weight()))
    }
}

/// A falling capsule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub rect: Rect,
    /// Pixels per nominal frame
    pub fall_speed: f32,
}

impl PowerUp {
    /// Centered just below the brick that released it
    pub fn from_brick(kind: PowerUpKind, brick: &Brick, paddle: &Paddle, panel_h: i32) -> Self {
        let size = (paddle.rect.height * 1.5).max(2.0);
        let x = brick.rect.x + brick.rect.width / 2.0 - size / 2.0;
        let y = brick.rect.y + brick.rect.height;
        Self {
            kind,
            rect: Rect::new(x, y, size, size),
            fall_speed: (panel_h as f32 / 160.0).max(0.25),
        }
    }

    pub fn fall(&mut self, scalar: f32) {
        self.rect.y += self.fall_speed * scalar;
    }

    pub fn caught_by(&self, paddle: &Paddle) -> bool {
        self.rect.y + self.rect.height >= paddle.rect.y
            && self.rect.x + self.rect.width >= paddle.rect.x
            && self.rect.x <= paddle.rect.x + paddle.rect.width
    }
}

/// Effects that run on a countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimedEffect {
    Slow,
    Expand,
    Break,
    Sticky,
    Laser,
}

impl TimedEffect {
    pub const ALL: [TimedEffect; 5] = [
        TimedEffect::Slow,
        TimedEffect::Expand,
        TimedEffect::Break,
        TimedEffect::Sticky,
        TimedEffect::Laser,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// One countdown per timed effect
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectTimers {
    remaining_ms: [f64; 5],
}

impl EffectTimers {
    /// Start (or restart) an effect's countdown
    pub fn start(&mut self, effect: TimedEffect, duration_ms: f64) {
        self.remaining_ms[effect.index()] = duration_ms;
    }

    pub fn is_active(&self, effect: TimedEffect) -> bool {
        self.remaining_ms[effect.index()] > 0.0
    }

    pub fn remaining_ms(&self, effect: TimedEffect) -> f64 {
        self.remaining_ms[effect.index()]
    }

    /// Stop an effect without reporting expiry
    pub fn cancel(&mut self, effect: TimedEffect) {
        self.remaining_ms[effect.index()] = 0.0;
    }

    pub fn clear(&mut self) {
        self.remaining_ms = [0.0; 5];
    }

    /// Count every running timer down; returns the effects that just expired
    pub fn advance(&mut self, elapsed_ms: f64) -> Vec<TimedEffect> {
        let mut expired = Vec::new();
        for effect in TimedEffect::ALL {
            let slot = &mut self.remaining_ms[effect.index()];
            if *slot > 0.0 {
                *slot -= elapsed_ms;
                if *slot <= 0.0 {
                    *slot = 0.0;
                    expired.push(effect);
                }
            }
        }
        expired
    }
}
