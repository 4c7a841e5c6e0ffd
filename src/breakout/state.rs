//! Breakout session state
//!
//! Everything a running game owns: entities, effect timers, lives and the
//! level state machine phase.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::bricks::BrickField;
use super::entities::{Ball, Brick, Laser, Paddle};
use super::levels::LEVELS;
use super::powerup::{
    DROP_PERCENT, EFFECT_DURATION_MS, EffectTimers, PORTAL_OPEN_MS, PowerUp, PowerUpKind,
    SLOW_MULTIPLIER, TimedEffect,
};
use crate::input::{Button, ButtonEvent};
use crate::settings::MAX_LIVES;

/// Intro banner duration before play starts
pub const LEVEL_INTRO_MS: f64 = 1500.0;

/// Current phase of the level state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Dimmed scene with the level banner
    LevelIntro { remaining_ms: f64 },
    Playing,
    /// Win or game over shown; output is torn down on the following updates
    Ended { waiting_to_disable: bool },
}

/// Complete breakout session
#[derive(Debug, Clone)]
pub struct BreakoutState {
    pub panel_w: i32,
    pub panel_h: i32,
    pub paddle: Paddle,
    pub balls: Vec<Ball>,
    pub field: BrickField,
    pub power_ups: Vec<PowerUp>,
    pub lasers: Vec<Laser>,
    pub effects: EffectTimers,
    /// Zero-based level index
    pub level: usize,
    pub lives: i32,
    /// Held paddle direction: -1, 0 or +1
    pub direction: i32,
    pub phase: Phase,
    /// Remaining time before an open portal advances the level
    pub portal_ms: f64,
    pub portal_phase: f64,
    /// Chance (percent) a destroyed brick drops a power-up
    pub drop_percent: u32,
    base_ball_speed: f32,
    /// Speed multiplier earned by the current level
    level_speed: f32,
    speed_multiplier: f32,
    rng: Pcg32,
}

impl BreakoutState {
    /// Fresh game on level 1
    pub fn new(panel_w: i32, panel_h: i32, lives: i32, seed: u64) -> Self {
        let paddle = Paddle::new(panel_w, panel_h);
        let mut state = Self {
            panel_w,
            panel_h,
            paddle,
            balls: Vec::new(),
            field: BrickField::default(),
            power_ups: Vec::new(),
            lasers: Vec::new(),
            effects: EffectTimers::default(),
            level: 0,
            lives: lives.clamp(1, MAX_LIVES),
            direction: 0,
            phase: Phase::Playing,
            portal_ms: 0.0,
            portal_phase: 0.0,
            drop_percent: DROP_PERCENT,
            base_ball_speed: paddle.rect.height.max(1.0),
            level_speed: 1.0,
            speed_multiplier: 1.0,
            rng: Pcg32::seed_from_u64(seed),
        };
        state.load_level(0);
        state
    }

    pub fn level_count() -> usize {
        LEVELS.len()
    }

    /// Load a catalog level
    pub fn load_level(&mut self, index: usize) {
        let rows = LEVELS[index % LEVELS.len()];
        self.load_rows(index, rows);
    }

    /// Load an arbitrary character layout as level `index`
    pub fn load_rows(&mut self, index: usize, rows: &[&str]) {
        self.level = index;
        self.power_ups.clear();
        self.lasers.clear();
        self.effects.clear();
        self.portal_ms = 0.0;
        self.direction = 0;

        self.paddle.restore_width(self.panel_w);
        self.paddle.recenter(self.panel_w);

        self.level_speed = 1.0 + 0.1 * index as f32;
        self.speed_multiplier = self.level_speed;

        self.field = BrickField::load(rows, self.panel_w, self.panel_h, self.paddle.rect.y);
        self.spawn_ball_on_paddle();
        self.phase = Phase::LevelIntro {
            remaining_ms: LEVEL_INTRO_MS,
        };

        log::info!(
            "Breakout level {} loaded: {} destructible of {} bricks",
            index + 1,
            self.field.remaining_destructible(),
            self.field.bricks.len()
        );
    }

    /// Replace all balls with one parked on the paddle
    pub fn spawn_ball_on_paddle(&mut self) {
        self.balls.clear();
        self.balls.push(Ball::on_paddle(&self.paddle, self.ball_speed()));
    }

    /// Current speed for every ball
    pub fn ball_speed(&self) -> f32 {
        self.base_ball_speed * self.speed_multiplier
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    fn set_speed_multiplier(&mut self, multiplier: f32) {
        self.speed_multiplier = multiplier;
        let speed = self.ball_speed();
        for ball in &mut self.balls {
            ball.speed = speed;
        }
    }

    pub fn piercing(&self) -> bool {
        self.effects.is_active(TimedEffect::Break)
    }

    pub fn sticky(&self) -> bool {
        self.effects.is_active(TimedEffect::Sticky)
    }

    pub fn laser_armed(&self) -> bool {
        self.effects.is_active(TimedEffect::Laser)
    }

    pub fn any_ball_stuck(&self) -> bool {
        self.balls.iter().any(|b| b.stuck)
    }

    /// Roll for a drop under a destroyed brick
    pub fn maybe_spawn_power_up(&mut self, brick: &Brick) {
        if let Some(kind) = PowerUpKind::roll(&mut self.rng, self.drop_percent) {
            log::debug!("Power-up {kind:?} dropped at ({}, {})", brick.row, brick.col);
            self.power_ups
                .push(PowerUp::from_brick(kind, brick, &self.paddle, self.panel_h));
        }
    }

    /// Apply a caught power-up
    pub fn apply_power_up(&mut self, kind: PowerUpKind) {
        log::debug!("Power-up {kind:?} caught");
        if let Some(effect) = kind.timed_effect() {
            self.effects.start(effect, EFFECT_DURATION_MS);
        }
        match kind {
            PowerUpKind::Expand => self.paddle.expand(self.panel_w),
            PowerUpKind::Slow => self.set_speed_multiplier(SLOW_MULTIPLIER),
            PowerUpKind::Break | PowerUpKind::Sticky | PowerUpKind::Laser => {}
            PowerUpKind::Triple => self.spawn_triple_balls(),
            PowerUpKind::ExtraLife => {
                if self.lives < MAX_LIVES {
                    self.lives += 1;
                }
            }
            PowerUpKind::Portal => self.portal_ms = PORTAL_OPEN_MS,
        }
    }

    /// Undo a timed effect whose countdown ran out
    pub fn expire_effect(&mut self, effect: TimedEffect) {
        match effect {
            TimedEffect::Slow => self.set_speed_multiplier(self.level_speed),
            TimedEffect::Expand => self.paddle.restore_width(self.panel_w),
            TimedEffect::Sticky => self.release_stuck_balls(false),
            TimedEffect::Break | TimedEffect::Laser => {}
        }
    }

    /// Count effect timers down and revert the ones that expired
    pub fn update_effect_timers(&mut self, elapsed_ms: f64) {
        for effect in self.effects.advance(elapsed_ms) {
            self.expire_effect(effect);
        }
    }

    /// Launch every stuck ball; `keep_effect` leaves the sticky countdown running
    pub fn release_stuck_balls(&mut self, keep_effect: bool) {
        let paddle = self.paddle;
        for ball in self.balls.iter_mut().filter(|b| b.stuck) {
            ball.release(&paddle);
        }
        if !keep_effect {
            self.effects.cancel(TimedEffect::Sticky);
        }
    }

    /// Every ball gains two clones veering left and right
    pub fn spawn_triple_balls(&mut self) {
        let speed = self.ball_speed();
        let additions: Vec<Ball> = self
            .balls
            .iter()
            .flat_map(|b| [b.split(-0.3, speed), b.split(0.3, speed)])
            .collect();
        self.balls.extend(additions);
    }

    pub fn fire_laser(&mut self) {
        if self.laser_armed() {
            self.lasers.push(Laser::from_paddle(&self.paddle));
        }
    }

    /// All balls gone: spend a life. Returns false when none remain.
    pub fn lose_life(&mut self) -> bool {
        if self.lives <= 1 {
            self.lives = 0;
            return false;
        }
        self.lives -= 1;
        log::info!(
            "Breakout life lost, {} remaining (level {})",
            self.lives,
            self.level + 1
        );

        self.power_ups.clear();
        self.lasers.clear();
        self.effects.clear();
        self.speed_multiplier = self.level_speed;
        self.paddle.restore_width(self.panel_w);
        self.paddle.recenter(self.panel_w);
        self.spawn_ball_on_paddle();
        true
    }

    /// Apply a parsed button event; never draws
    pub fn handle_button(&mut self, event: ButtonEvent) {
        match (event.button, event.pressed) {
            (Button::Left, true) => self.direction = -1,
            (Button::Left, false) => {
                if self.direction < 0 {
                    self.direction = 0;
                }
            }
            (Button::Right, true) => self.direction = 1,
            (Button::Right, false) => {
                if self.direction > 0 {
                    self.direction = 0;
                }
            }
            _ if event.is_fire_press() => {
                if self.any_ball_stuck() {
                    self.release_stuck_balls(true);
                } else {
                    self.fire_laser();
                }
            }
            _ => {}
        }
    }
}
