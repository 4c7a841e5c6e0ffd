//! Paddle, ball, brick and laser entities

use glam::Vec2;

use crate::geom::Rect;
use crate::normalize_dir;
use crate::surface::Rgb;

/// Launch direction of a freshly spawned ball (before normalization)
pub const SPAWN_DIRECTION: Vec2 = Vec2::new(0.3, -0.7);

/// The player's paddle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paddle {
    pub rect: Rect,
    /// Width without the expand effect
    pub base_width: f32,
}

impl Paddle {
    /// Centered paddle one row above the bottom edge
    pub fn new(panel_w: i32, panel_h: i32) -> Self {
        let width = (panel_w / 8).max(1) as f32;
        let height = (panel_h / 64).max(1) as f32;
        Self {
            rect: Rect::new(
                (panel_w as f32 - width) / 2.0,
                panel_h as f32 - 1.0 - height,
                width,
                height,
            ),
            base_width: width,
        }
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.rect.center_x()
    }

    /// Keep the paddle fully on the panel
    pub fn clamp_to(&mut self, panel_w: i32) {
        let w = panel_w as f32;
        if self.rect.x < 0.0 {
            self.rect.x = 0.0;
        }
        if self.rect.x + self.rect.width > w {
            self.rect.x = w - self.rect.width;
        }
    }

    pub fn recenter(&mut self, panel_w: i32) {
        self.rect.x = (panel_w as f32 - self.rect.width) / 2.0;
        self.clamp_to(panel_w);
    }

    /// Slide by `direction` (-1, 0, +1) paddle-heights per nominal frame
    pub fn slide(&mut self, direction: i32, scalar: f32, panel_w: i32) {
        self.rect.x += direction as f32 * self.rect.height * scalar;
        let w = panel_w as f32;
        if self.rect.x < 0.0 {
            self.rect.x = 0.0;
        } else if self.rect.x + self.rect.width >= w {
            self.rect.x = w - self.rect.width;
        }
    }

    /// Grow by half the base width, capped at 80% of the panel
    pub fn expand(&mut self, panel_w: i32) {
        let cap = panel_w as f32 * 0.8;
        self.rect.width = (self.rect.width + self.base_width * 0.5).min(cap);
        self.clamp_to(panel_w);
    }

    pub fn restore_width(&mut self, panel_w: i32) {
        self.rect.width = self.base_width;
        self.clamp_to(panel_w);
    }
}

/// A ball entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub rect: Rect,
    /// Unit direction (zero while stuck to a sticky paddle)
    pub dir: Vec2,
    pub speed: f32,
    pub stuck: bool,
    /// Ball center minus paddle center while stuck
    pub stick_offset: f32,
}

impl Ball {
    /// A ball parked on the paddle center, waiting for launch
    pub fn on_paddle(paddle: &Paddle, speed: f32) -> Self {
        let size = paddle.rect.height;
        let mut ball = Self {
            rect: Rect::new(paddle.center_x() - size / 2.0, 0.0, size, size),
            dir: normalize_dir(SPAWN_DIRECTION),
            speed,
            stuck: false,
            stick_offset: 0.0,
        };
        ball.stick_to(paddle);
        ball.dir = normalize_dir(SPAWN_DIRECTION);
        ball
    }

    /// Move along the current direction
    pub fn advance(&mut self, scalar: f32) {
        if self.stuck {
            return;
        }
        self.rect.x += self.dir.x * self.speed * scalar;
        self.rect.y += self.dir.y * self.speed * scalar;
    }

    /// Ride along on the paddle top at the recorded offset
    pub fn follow(&mut self, paddle: &Paddle) {
        self.rect.x = paddle.center_x() + self.stick_offset - self.rect.width / 2.0;
        self.rect.y = paddle.rect.y - self.rect.height;
    }

    /// Attach where the ball currently touches the paddle
    pub fn stick_to(&mut self, paddle: &Paddle) {
        self.stuck = true;
        self.dir = Vec2::ZERO;
        self.stick_offset = self.rect.center_x() - paddle.center_x();
        self.rect.y = paddle.rect.y - self.rect.height;
    }

    /// Detach, aiming by how far off-center the ball was held
    pub fn release(&mut self, paddle: &Paddle) {
        if !self.stuck {
            return;
        }
        self.stuck = false;
        let half = paddle.rect.width * 0.5;
        let mut n = if half > 0.0 {
            (self.stick_offset / half).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        if n.abs() < 0.1 {
            n = if self.stick_offset > 0.0 {
                0.2
            } else if self.stick_offset < 0.0 {
                -0.2
            } else {
                0.0
            };
        }
        let dir_y = if self.dir.y.abs() < 0.1 { -0.75 } else { -self.dir.y.abs() };
        self.dir = normalize_dir(Vec2::new(n, dir_y));
        self.follow(paddle);
    }

    /// Angle off the paddle by where along its width the ball landed
    pub fn bounce_off(&mut self, paddle: &Paddle) {
        let t = (self.rect.x - paddle.rect.x) / paddle.rect.width - 0.5;
        self.dir = normalize_dir(Vec2::new(t, -self.dir.y.abs()));
    }

    /// Moving down and touching the paddle top
    pub fn touches(&self, paddle: &Paddle) -> bool {
        self.dir.y > 0.0
            && self.rect.bottom() >= paddle.rect.y
            && self.rect.left() <= paddle.rect.x + paddle.rect.width
            && self.rect.right() >= paddle.rect.x
    }

    /// Copy veering `dx` sideways, always heading up
    pub fn split(&self, dx: f32, speed: f32) -> Self {
        let dir_y = if self.dir.y == 0.0 { 0.75 } else { self.dir.y };
        Self {
            dir: normalize_dir(Vec2::new(self.dir.x + dx, -dir_y.abs())),
            speed,
            stuck: false,
            ..*self
        }
    }
}

/// A brick in the level grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Brick {
    pub rect: Rect,
    pub color: Rgb,
    pub hit_points: u8,
    pub max_hit_points: u8,
    pub indestructible: bool,
    pub row: usize,
    pub col: usize,
}

impl Brick {
    /// Apply one hit; returns true if the brick is destroyed
    pub fn take_hit(&mut self, piercing: bool) -> bool {
        if self.indestructible {
            false
        } else if piercing || self.hit_points <= 1 {
            true
        } else {
            self.hit_points -= 1;
            false
        }
    }

    /// Brightness factor reflecting remaining hit points
    pub fn health_brightness(&self) -> f32 {
        if self.max_hit_points == 0 {
            1.0
        } else {
            0.6 + 0.4 * (self.hit_points as f32 / self.max_hit_points as f32)
        }
    }
}

/// Upward laser shot; `y` is the tip
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Laser {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
}

/// Laser travel per nominal frame
pub const LASER_SPEED: f32 = 4.0;

impl Laser {
    /// Fired from the paddle center, one pixel above it
    pub fn from_paddle(paddle: &Paddle) -> Self {
        Self {
            x: paddle.center_x(),
            y: paddle.rect.y - 1.0,
            speed: LASER_SPEED,
        }
    }
}
