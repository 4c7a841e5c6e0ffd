//! Two-player paddle-ball
//!
//! Played on a logical grid (panel size divided by pixel scaling). Rackets
//! sit in the first and last columns; the ball moves one cell per nominal
//! frame. First player to five points wins.

use glam::Vec2;

use crate::clock::FrameClock;
use crate::consts::BASE_FRAME_MS;
use crate::game::{ArcadeGame, GameKind, NextTick};
use crate::input::{Button, ButtonEvent};
use crate::normalize_dir;
use crate::settings::ArcadeOptions;
use crate::surface::{CellCanvas, OverlayMode, Rgb, Surface};

pub const WINNING_SCORE: u32 = 5;
const FRAME_MS: u32 = 50;
const END_BANNER_MS: u32 = 2000;
/// Score text shrinks until the panel is at least this many glyph rows tall
const MIN_TEXT_ROWS: f32 = 40.0;

/// Which buttons move which racket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlScheme {
    /// Up/Down: left racket; Left/Right: right racket
    Arrows,
    /// Diagonal pads per player
    Diagonals,
    /// Up/Left: left racket; Right/Down: right racket
    Split,
}

impl ControlScheme {
    pub fn from_option(value: i32) -> Self {
        match value {
            2 => ControlScheme::Diagonals,
            3 => ControlScheme::Split,
            _ => ControlScheme::Arrows,
        }
    }

    /// Racket and direction a button drives
    fn binding(&self, button: Button) -> Option<(Side, i32)> {
        use Button::*;
        let bound = match (self, button) {
            (ControlScheme::Arrows, Up) => (Side::Left, -1),
            (ControlScheme::Arrows, Down) => (Side::Left, 1),
            (ControlScheme::Arrows, Left) => (Side::Right, -1),
            (ControlScheme::Arrows, Right) => (Side::Right, 1),
            (ControlScheme::Diagonals, UpLeft) => (Side::Left, -1),
            (ControlScheme::Diagonals, DownLeft) => (Side::Left, 1),
            (ControlScheme::Diagonals, UpRight) => (Side::Right, -1),
            (ControlScheme::Diagonals, DownRight) => (Side::Right, 1),
            (ControlScheme::Split, Up) => (Side::Left, -1),
            (ControlScheme::Split, Left) => (Side::Left, 1),
            (ControlScheme::Split, Right) => (Side::Right, -1),
            (ControlScheme::Split, Down) => (Side::Right, 1),
            _ => return None,
        };
        Some(bound)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Racket {
    /// Top cell, fractional while moving
    pub pos: f32,
    /// -1 up, 0 still, +1 down
    pub speed: i32,
}

impl Racket {
    pub fn row(&self) -> i32 {
        self.pos.round() as i32
    }

    /// Ball at row `y` lies within the racket span
    fn covers(&self, y: f32, len: i32) -> bool {
        let top = self.row() as f32;
        y >= top && y <= top + len as f32
    }

    /// Deflection from -0.5 (top) to 0.5 (bottom)
    fn deflection(&self, y: f32, len: i32) -> f32 {
        (y - self.row() as f32) / len as f32 - 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Playing,
    Ended { waiting_to_disable: bool },
}

#[derive(Debug, Clone)]
pub struct Pong {
    canvas: CellCanvas,
    pub cols: i32,
    pub rows: i32,
    pub racket_len: i32,
    pub left: Racket,
    pub right: Racket,
    pub ball: Vec2,
    pub dir: Vec2,
    pub speed: f32,
    /// Left player, right player
    pub scores: [u32; 2],
    controls: ControlScheme,
    phase: Phase,
    clock: FrameClock,
}

impl Pong {
    pub fn new(options: &ArcadeOptions, width: i32, height: i32) -> Self {
        let options = options.sanitized();
        let scale = options.pixel_scaling;
        let cols = (width / scale).max(3);
        let rows = (height / scale).max(3);
        let racket_len = (rows / 5).max(3);
        let start = ((rows - racket_len) / 2) as f32;
        log::info!("Pong session {cols}x{rows} cells, controls {}", options.controls);
        Self {
            canvas: CellCanvas::new(scale),
            cols,
            rows,
            racket_len,
            left: Racket { pos: start, speed: 0 },
            right: Racket { pos: start, speed: 0 },
            ball: Self::center(cols, rows),
            dir: Vec2::new(1.0, 0.0),
            speed: 1.0,
            scores: [0, 0],
            controls: ControlScheme::from_option(options.controls),
            phase: Phase::Playing,
            clock: FrameClock::wall(),
        }
    }

    pub fn with_clock(mut self, clock: FrameClock) -> Self {
        self.clock = clock;
        self
    }

    fn center(cols: i32, rows: i32) -> Vec2 {
        Vec2::new((cols / 2) as f32, (rows / 2) as f32)
    }

    pub fn is_over(&self) -> bool {
        self.scores.iter().any(|&s| s >= WINNING_SCORE)
    }

    fn move_rackets(&mut self, scalar: f32) {
        let max = (self.rows - self.racket_len) as f32;
        for racket in [&mut self.left, &mut self.right] {
            racket.pos = (racket.pos + racket.speed as f32 * scalar).clamp(0.0, max);
        }
    }

    fn move_ball(&mut self, scalar: f32) {
        self.ball += self.dir * self.speed * scalar;
        let (cols, rows) = (self.cols as f32, self.rows as f32);

        if self.ball.x <= 1.0 && self.left.covers(self.ball.y, self.racket_len) {
            self.dir.x = self.dir.x.abs();
            self.dir.y = self.left.deflection(self.ball.y, self.racket_len);
        }
        if self.ball.x >= cols - 2.0 && self.right.covers(self.ball.y, self.racket_len) {
            self.dir.x = -self.dir.x.abs();
            self.dir.y = self.right.deflection(self.ball.y, self.racket_len);
        }

        if self.ball.x < 0.0 {
            self.score(Side::Right);
        }
        if self.ball.x >= cols {
            self.score(Side::Left);
        }

        if self.ball.y >= rows {
            self.dir.y = -self.dir.y.abs();
            self.ball.y = rows - 1.0;
        }
        if self.ball.y < 0.0 {
            self.dir.y = self.dir.y.abs();
            self.ball.y = 0.0;
        }

        self.dir = normalize_dir(self.dir);
    }

    /// Point to `scorer`; serve from center toward their side
    fn score(&mut self, scorer: Side) {
        let idx = match scorer {
            Side::Left => 0,
            Side::Right => 1,
        };
        self.scores[idx] += 1;
        log::debug!("Pong score {}:{}", self.scores[0], self.scores[1]);
        self.ball = Self::center(self.cols, self.rows);
        self.dir.x = match scorer {
            Side::Left => -self.dir.x.abs(),
            Side::Right => self.dir.x.abs(),
        };
        self.dir.y = 0.0;
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear();

        let text = format!("{}:{}", self.scores[0], self.scores[1]);
        let mut scl = self.canvas.scale as f32;
        while (surface.height() as f32 / scl) < MIN_TEXT_ROWS && scl > 1.0 {
            scl *= 0.8;
        }
        let scl = scl.max(1.0);
        let x = ((surface.width() / 2 - text.len() as i32 * 2) as f32 / scl) as i32;
        surface.draw_text(&text, x, 0, Rgb::GREY, scl);

        for y in 0..self.racket_len {
            self.canvas.cell(surface, 0, self.left.row() + y, Rgb::WHITE);
            self.canvas.cell(surface, self.cols - 1, self.right.row() + y, Rgb::WHITE);
        }
        self.canvas
            .cell(surface, self.ball.x as i32, self.ball.y as i32, Rgb::WHITE);
    }

    fn handle_button(&mut self, event: ButtonEvent) {
        let Some((side, dir)) = self.controls.binding(event.button) else {
            return;
        };
        let racket = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        racket.speed = if event.pressed { dir } else { 0 };
    }
}

impl ArcadeGame for Pong {
    fn kind(&self) -> GameKind {
        GameKind::Pong
    }

    fn update(&mut self, surface: &mut dyn Surface) -> NextTick {
        if let Phase::Ended { waiting_to_disable } = self.phase {
            self.clock.reset();
            surface.clear();
            surface.flush();
            if waiting_to_disable {
                surface.set_mode(OverlayMode::Disabled);
                return NextTick::Done;
            }
            self.phase = Phase::Ended {
                waiting_to_disable: true,
            };
            return NextTick::Linger;
        }

        let frame = self.clock.frame(BASE_FRAME_MS);
        let scalar = frame.scalar as f32;
        self.move_rackets(scalar);
        self.move_ball(scalar);
        self.draw(surface);

        if self.is_over() {
            log::info!("Pong over {}:{}", self.scores[0], self.scores[1]);
            self.phase = Phase::Ended {
                waiting_to_disable: false,
            };
            let x = (self.cols - 8) / 2;
            surface.draw_text("GAME", x, self.rows / 2 - 6, Rgb::WHITE, 1.0);
            surface.draw_text("OVER", x, self.rows / 2, Rgb::WHITE, 1.0);
            surface.flush();
            return NextTick::After(END_BANNER_MS);
        }
        surface.flush();
        NextTick::After(FRAME_MS)
    }

    fn on_button(&mut self, token: &str) {
        if let Some(event) = ButtonEvent::parse(token) {
            self.handle_button(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::PixelGrid;

    fn pong(controls: i32) -> Pong {
        let options = ArcadeOptions {
            controls,
            ..Default::default()
        };
        Pong::new(&options, 64, 32).with_clock(FrameClock::fixed(50.0))
    }

    #[test]
    fn test_initial_layout() {
        let p = pong(1);
        assert_eq!((p.cols, p.rows), (64, 32));
        assert_eq!(p.racket_len, 6);
        assert_eq!(p.left.row(), 13);
        assert_eq!(p.right.row(), 13);
        assert_eq!(p.ball, Vec2::new(32.0, 16.0));
    }

    #[test]
    fn test_pixel_scaling_shrinks_grid() {
        let options = ArcadeOptions {
            pixel_scaling: 2,
            ..Default::default()
        };
        let p = Pong::new(&options, 64, 32);
        assert_eq!((p.cols, p.rows), (32, 16));
        assert_eq!(p.racket_len, 3);
    }

    #[test]
    fn test_racket_returns_ball() {
        let mut p = pong(1);
        let mut grid = PixelGrid::new(64, 32);
        for _ in 0..30 {
            p.update(&mut grid);
        }
        // Reached x = 62 in front of the right racket, centered: straight back
        assert!(p.dir.x < 0.0);
        assert_eq!(p.scores, [0, 0]);
        assert!((p.dir.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_racket_edge_deflects() {
        let mut p = pong(1);
        p.ball = Vec2::new(61.5, 13.0);
        p.update(&mut PixelGrid::new(64, 32));
        // Top of the racket: t = -0.5
        assert!(p.dir.x < 0.0 && p.dir.y < 0.0);
        assert!((p.dir - normalize_dir(Vec2::new(-1.0, -0.5))).length() < 1e-5);
    }

    #[test]
    fn test_miss_scores_and_reserves_toward_scorer() {
        let mut p = pong(1);
        p.right.pos = 0.0;
        let mut grid = PixelGrid::new(64, 32);
        for _ in 0..32 {
            p.update(&mut grid);
        }
        assert_eq!(p.scores, [1, 0]);
        assert_eq!(p.ball, Vec2::new(32.0, 16.0));
        assert!(p.dir.x < 0.0);
        assert_eq!(p.dir.y, 0.0);
        assert!(grid.has_text("1:0"));
    }

    #[test]
    fn test_top_and_bottom_reflect() {
        let mut p = pong(1);
        p.ball = Vec2::new(20.0, 0.2);
        p.dir = normalize_dir(Vec2::new(1.0, -1.0));
        p.update(&mut PixelGrid::new(64, 32));
        assert_eq!(p.ball.y, 0.0);
        assert!(p.dir.y > 0.0);

        p.ball = Vec2::new(20.0, 31.8);
        p.dir = normalize_dir(Vec2::new(1.0, 1.0));
        p.update(&mut PixelGrid::new(64, 32));
        assert_eq!(p.ball.y, 31.0);
        assert!(p.dir.y < 0.0);
    }

    #[test]
    fn test_fifth_point_ends_game() {
        let mut p = pong(1);
        let mut grid = PixelGrid::new(64, 32);
        p.scores = [4, 2];
        p.right.pos = 0.0;
        p.ball = Vec2::new(63.5, 16.0);
        assert_eq!(p.update(&mut grid), NextTick::After(END_BANNER_MS));
        assert!(grid.has_text("GAME"));
        assert!(grid.has_text("OVER"));
        assert_eq!(p.update(&mut grid), NextTick::Linger);
        assert_eq!(grid.lit_count(), 0);
        assert_eq!(p.update(&mut grid), NextTick::Done);
        assert_eq!(grid.mode(), OverlayMode::Disabled);
    }

    #[test]
    fn test_control_schemes() {
        let mut p = pong(1);
        p.on_button("Up - Pressed");
        p.on_button("Right - Pressed");
        assert_eq!((p.left.speed, p.right.speed), (-1, 1));
        p.on_button("Up - Released");
        assert_eq!(p.left.speed, 0);

        let mut p = pong(2);
        p.on_button("Down/Left - Pressed");
        p.on_button("Up/Right - Pressed");
        p.on_button("Up - Pressed");
        assert_eq!((p.left.speed, p.right.speed), (1, -1));

        let mut p = pong(3);
        p.on_button("Left - Pressed");
        p.on_button("Down - Pressed");
        assert_eq!((p.left.speed, p.right.speed), (1, 1));
        p.on_button("Right - Pressed");
        assert_eq!(p.right.speed, -1);
    }

    #[test]
    fn test_rackets_stay_on_grid() {
        let mut p = pong(1);
        let mut grid = PixelGrid::new(64, 32);
        p.on_button("Up - Pressed");
        p.on_button("Right - Pressed");
        for _ in 0..40 {
            p.update(&mut grid);
        }
        assert_eq!(p.left.row(), 0);
        assert_eq!(p.right.row(), 32 - 6);
        assert_eq!(grid.pixel(0, 0), Some(Rgb::WHITE));
        assert_eq!(grid.pixel(63, 31), Some(Rgb::WHITE));
    }

    #[test]
    fn test_score_drawn_grey_at_top() {
        let mut p = pong(1);
        let mut grid = PixelGrid::new(64, 32);
        p.update(&mut grid);
        let span = &grid.text()[0];
        assert_eq!(span.text, "0:0");
        assert_eq!(span.color, Rgb::GREY);
        assert_eq!((span.grid_x, span.grid_y), (26, 0));
    }
}
