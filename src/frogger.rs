//! Lane-crossing game
//!
//! The frog hops from the start row across a road of cars and a river of
//! logs and turtles into one of five home slots. Rows, from the top:
//! a spare row, the home row, `L` river lanes, a safe median, `L` road
//! lanes and the start row. Every mover in a lane shares one speed, so
//! movers never collide with each other.

use std::ops::RangeInclusive;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::clock::FrameClock;
use crate::consts::{BASE_FRAME_MS, GLYPH_WIDTH};
use crate::game::{ArcadeGame, GameKind, NextTick};
use crate::input::{Button, ButtonEvent};
use crate::settings::{ArcadeOptions, speed_multiplier};
use crate::surface::{CellCanvas, OverlayMode, Rgb, Surface};

const FRAME_MS: u32 = 50;
pub const STARTING_LIVES: i32 = 3;
pub const HOME_SLOTS: usize = 5;
pub const INVULNERABLE_MS: f64 = 800.0;
const MIN_COLS: i32 = 30;
const MIN_ROWS: i32 = 20;

const HOP_POINTS: u32 = 1;
const HOME_POINTS: u32 = 50;
const LEVEL_POINTS: u32 = 100;
const DEATH_PENALTY: u32 = 25;

const RIVER_BASE_SPEED: f32 = 0.45;
const ROAD_BASE_SPEED: f32 = 0.60;
const LEVEL_SPEED_STEP: f32 = 0.06;
const MIN_LOG_SPEED: f32 = 0.15;
const MIN_CAR_SPEED: f32 = 0.20;

const PAUSED_BRIGHTNESS: f32 = 0.25;
const GAME_OVER_BRIGHTNESS: f32 = 0.2;
const BLINK_BRIGHTNESS: f32 = 0.35;

const CAR_COLORS: [Rgb; 5] = [
    Rgb::new(220, 60, 60),
    Rgb::new(60, 160, 240),
    Rgb::new(220, 220, 60),
    Rgb::new(180, 80, 220),
    Rgb::new(120, 220, 90),
];
const LOG_COLOR: Rgb = Rgb::new(100, 200, 100);
const TURTLE_COLOR: Rgb = Rgb::new(60, 200, 200);
const HOME_OPEN: Rgb = Rgb::new(80, 80, 80);
const HOME_FILLED: Rgb = Rgb::new(0, 200, 0);
const HUD_SCORE: Rgb = Rgb::new(200, 200, 200);

/// Row assignment for a logical grid
#[derive(Debug, Clone, PartialEq)]
pub struct LaneLayout {
    pub cols: i32,
    pub rows: i32,
    pub home_row: i32,
    pub river: RangeInclusive<i32>,
    pub median_row: i32,
    pub road: RangeInclusive<i32>,
    pub start_row: i32,
    /// Column of each home slot
    pub home_x: Vec<i32>,
}

impl LaneLayout {
    pub fn new(cols: i32, rows: i32, lanes: i32) -> Self {
        let cols = cols.max(MIN_COLS);
        let rows = rows.max(MIN_ROWS);
        // home + river + median + road + start must fit
        let lanes = lanes.clamp(1, ((rows - 3) / 2).max(1));

        let home_row = 1;
        let river_top = 2;
        let river_bottom = river_top + lanes - 1;
        let median_row = river_bottom + 1;
        let road_top = median_row + 1;
        let road_bottom = (road_top + lanes - 1).min(rows - 3);
        let start_row = (road_bottom + 1).min(rows - 2);

        let slots = HOME_SLOTS as i32;
        let home_x = (0..slots).map(|i| (i + 1) * cols / (slots + 1)).collect();

        Self {
            cols,
            rows,
            home_row,
            river: river_top..=river_bottom,
            median_row,
            road: road_top..=road_bottom,
            start_row,
            home_x,
        }
    }

    pub fn is_river(&self, row: i32) -> bool {
        self.river.contains(&row)
    }

    pub fn is_road(&self, row: i32) -> bool {
        self.road.contains(&row)
    }

    /// +1 (rightward) on even rows, -1 on odd rows
    pub fn lane_dir(row: i32) -> i32 {
        if row % 2 == 0 { 1 } else { -1 }
    }

    /// Home slot within one column of `x`, closest first
    pub fn home_slot_near(&self, x: i32) -> Option<usize> {
        self.home_x
            .iter()
            .enumerate()
            .map(|(i, &hx)| (i, (x - hx).abs()))
            .filter(|&(_, d)| d <= 1)
            .min_by_key(|&(_, d)| d)
            .map(|(i, _)| i)
    }

    fn band_color(&self, row: i32) -> Rgb {
        if row == self.home_row {
            Rgb::new(30, 30, 30)
        } else if self.is_river(row) {
            Rgb::new(10, 10, 40)
        } else if row == self.median_row {
            Rgb::new(20, 20, 20)
        } else if self.is_road(row) {
            Rgb::new(30, 30, 30)
        } else {
            Rgb::BLACK
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoverKind {
    Log,
    Turtle,
    Car,
}

impl MoverKind {
    /// Logs and turtles float; the frog can ride them
    pub fn floats(&self) -> bool {
        !matches!(self, MoverKind::Car)
    }
}

/// Something travelling along a lane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mover {
    /// Leading column, fractional
    pub x: f32,
    pub row: i32,
    pub width: i32,
    pub dir: i32,
    /// Cells per second
    pub speed: f32,
    pub kind: MoverKind,
    pub color: Rgb,
}

impl Mover {
    pub fn cell_x(&self) -> i32 {
        (self.x + 0.5).floor() as i32
    }

    pub fn covers(&self, x: i32, row: i32) -> bool {
        let left = self.cell_x();
        row == self.row && x >= left && x < left + self.width
    }

    /// Signed displacement over `dt_s` seconds
    pub fn displacement(&self, dt_s: f32) -> f32 {
        self.dir as f32 * self.speed * dt_s
    }

    /// Move and wrap around the lane
    pub fn advance(&mut self, dt_s: f32, cols: i32) {
        self.x += self.displacement(dt_s);
        let width = self.width as f32;
        let wrap = cols as f32 + width;
        if self.x < -width {
            self.x += wrap;
        }
        if self.x > wrap {
            self.x -= wrap;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frog {
    /// Fractional while riding, whole after a hop
    pub x: f32,
    pub row: i32,
}

impl Frog {
    pub fn cell_x(&self) -> i32 {
        self.x.round() as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Ended { waiting_to_disable: bool },
}

#[derive(Debug, Clone)]
pub struct Frogger {
    canvas: CellCanvas,
    pub layout: LaneLayout,
    pub movers: Vec<Mover>,
    pub frog: Frog,
    pub homes_filled: [bool; HOME_SLOTS],
    pub level: u32,
    pub lives: i32,
    pub score: u32,
    pub paused: bool,
    pub phase: Phase,
    pub invulnerable_ms: f64,
    river_mult: f32,
    road_mult: f32,
    variability: f32,
    /// Per-row speed jitter, reseeded each level
    lane_jitter: Vec<f32>,
    rng: Pcg32,
    clock: FrameClock,
}

impl Frogger {
    pub fn new(options: &ArcadeOptions, width: i32, height: i32) -> Self {
        let options = options.sanitized();
        let scale = options.pixel_scaling;
        let layout = LaneLayout::new(width / scale, height / scale, options.lanes);
        let seed = options.session_seed();
        log::info!(
            "Frogger session {}x{} cells, {} lanes, seed {seed}",
            layout.cols,
            layout.rows,
            layout.river.clone().count()
        );
        let mut game = Self {
            canvas: CellCanvas::new(scale),
            lane_jitter: vec![1.0; layout.rows as usize],
            frog: Frog {
                x: (layout.cols / 2) as f32,
                row: layout.start_row,
            },
            layout,
            movers: Vec::new(),
            homes_filled: [false; HOME_SLOTS],
            level: 1,
            lives: STARTING_LIVES,
            score: 0,
            paused: false,
            phase: Phase::Playing,
            invulnerable_ms: 0.0,
            river_mult: speed_multiplier(options.river_speed),
            road_mult: speed_multiplier(options.road_speed),
            variability: options.speed_variability as f32 / 100.0,
            rng: Pcg32::seed_from_u64(seed),
            clock: FrameClock::wall(),
        };
        game.init_level();
        game
    }

    pub fn with_clock(mut self, clock: FrameClock) -> Self {
        self.clock = clock;
        self
    }

    fn reset_game(&mut self) {
        log::info!("Frogger restart");
        self.level = 1;
        self.score = 0;
        self.lives = STARTING_LIVES;
        self.paused = false;
        self.phase = Phase::Playing;
        self.invulnerable_ms = 0.0;
        self.init_level();
    }

    fn init_level(&mut self) {
        self.homes_filled = [false; HOME_SLOTS];
        self.reseed_lane_jitter();
        self.movers.clear();
        self.build_river();
        self.build_road();
        self.reset_frog();
        self.clock.reset();
    }

    fn reset_frog(&mut self) {
        self.frog = Frog {
            x: (self.layout.cols / 2).clamp(0, self.layout.cols - 1) as f32,
            row: self.layout.start_row.clamp(0, self.layout.rows - 1),
        };
    }

    fn reseed_lane_jitter(&mut self) {
        let v = self.variability.clamp(0.0, 1.0);
        let lanes: Vec<i32> = self
            .layout
            .river
            .clone()
            .chain(self.layout.road.clone())
            .collect();
        for row in lanes {
            let jitter = if v > 0.0 {
                self.rng.random_range(1.0 - v..=1.0 + v)
            } else {
                1.0
            };
            if let Some(slot) = self.lane_jitter.get_mut(row as usize) {
                *slot = jitter.clamp(0.2, 3.0);
            }
        }
    }

    /// Cells per second for every mover in `row`
    pub fn lane_speed(&self, row: i32) -> f32 {
        let river = self.layout.is_river(row);
        let base = if river { RIVER_BASE_SPEED } else { ROAD_BASE_SPEED };
        let level = LEVEL_SPEED_STEP * (self.level as f32 - 1.0);
        let band = if river { self.river_mult } else { self.road_mult };
        let jitter = self.lane_jitter.get(row as usize).copied().unwrap_or(1.0);
        (base + level) * band * jitter
    }

    /// Leading column for the `i`-th mover of a lane spaced `advance` apart
    fn stagger(&self, advance: i32, dir: i32) -> f32 {
        let start = advance % self.layout.cols;
        if dir > 0 {
            start as f32
        } else {
            (self.layout.cols - start) as f32
        }
    }

    fn build_river(&mut self) {
        for row in self.layout.river.clone() {
            let dir = LaneLayout::lane_dir(row);
            let speed = self.lane_speed(row).max(MIN_LOG_SPEED);
            let span = self.rng.random_range(8..=14);
            let count = (self.layout.cols / span).max(2);
            let prefer_turtles = self.rng.random_bool(0.45);

            for i in 0..count {
                let turtle = prefer_turtles || self.rng.random_bool(0.40);
                let (kind, width, color) = if turtle {
                    (MoverKind::Turtle, 2, TURTLE_COLOR)
                } else {
                    (MoverKind::Log, self.rng.random_range(4..=8), LOG_COLOR)
                };
                self.movers.push(Mover {
                    x: self.stagger(i * span, dir),
                    row,
                    width,
                    dir,
                    speed,
                    kind,
                    color,
                });
            }
        }
    }

    fn build_road(&mut self) {
        for row in self.layout.road.clone() {
            let dir = LaneLayout::lane_dir(row);
            let speed = self.lane_speed(row).max(MIN_CAR_SPEED);
            let span = self.rng.random_range(10..=16);
            let count = (self.layout.cols / span).max(2);

            for i in 0..count {
                let width = self.rng.random_range(2..=5);
                let color = CAR_COLORS[self.rng.random_range(0..CAR_COLORS.len())];
                self.movers.push(Mover {
                    x: self.stagger(i * span, dir),
                    row,
                    width,
                    dir,
                    speed,
                    kind: MoverKind::Car,
                    color,
                });
            }
        }
    }

    fn advance_movers(&mut self, elapsed_ms: f64) {
        if self.invulnerable_ms > 0.0 {
            self.invulnerable_ms = (self.invulnerable_ms - elapsed_ms).max(0.0);
        }
        let dt = (elapsed_ms / 1000.0) as f32;
        let cols = self.layout.cols;
        for mover in &mut self.movers {
            mover.advance(dt, cols);
        }
    }

    /// Floating mover under the frog, if any
    pub fn ride(&self) -> Option<&Mover> {
        let x = self.frog.cell_x();
        self.movers
            .iter()
            .find(|m| m.kind.floats() && m.covers(x, self.frog.row))
    }

    pub fn hit_by_car(&self) -> bool {
        let x = self.frog.cell_x();
        self.movers
            .iter()
            .any(|m| !m.kind.floats() && m.covers(x, self.frog.row))
    }

    /// Drift with the ride; the panel edge is fatal
    fn carry_frog(&mut self, dx: f32) {
        let max = (self.layout.cols - 1) as f32;
        self.frog.x = (self.frog.x + dx).clamp(0.0, max);
        let x = self.frog.cell_x();
        if x <= 0 || x >= self.layout.cols - 1 {
            self.lose_life();
        }
    }

    pub fn hop(&mut self, dx: i32, dy: i32) {
        let x = (self.frog.cell_x() + dx).clamp(0, self.layout.cols - 1);
        self.frog.x = x as f32;
        self.frog.row = (self.frog.row + dy).clamp(self.layout.home_row, self.layout.rows - 1);
        if dy < 0 {
            self.score += HOP_POINTS;
        }
    }

    pub fn lose_life(&mut self) {
        if self.invulnerable_ms > 0.0 {
            return;
        }
        self.lives -= 1;
        log::info!("Frogger life lost, {} left", self.lives);
        if self.lives < 0 {
            self.phase = Phase::Ended {
                waiting_to_disable: false,
            };
            return;
        }
        self.score = self.score.saturating_sub(DEATH_PENALTY);
        self.reset_frog();
        self.invulnerable_ms = INVULNERABLE_MS;
    }

    fn reach_home(&mut self) {
        match self.layout.home_slot_near(self.frog.cell_x()) {
            Some(slot) if !self.homes_filled[slot] => {
                self.homes_filled[slot] = true;
                self.score += HOME_POINTS;
                self.reset_frog();
                if self.homes_filled.iter().all(|&f| f) {
                    self.level += 1;
                    self.score += LEVEL_POINTS;
                    log::info!("Frogger level {}", self.level);
                    self.init_level();
                }
            }
            _ => self.lose_life(),
        }
    }

    fn step(&mut self, elapsed_ms: f64) {
        self.advance_movers(elapsed_ms);
        let dt = (elapsed_ms / 1000.0) as f32;

        if self.layout.is_river(self.frog.row) {
            match self.ride().map(|m| m.displacement(dt)) {
                Some(dx) => self.carry_frog(dx),
                None => self.lose_life(),
            }
        }
        if self.phase != Phase::Playing {
            return;
        }
        if self.layout.is_road(self.frog.row) && self.hit_by_car() {
            self.lose_life();
        }
        if self.phase == Phase::Playing && self.frog.row == self.layout.home_row {
            self.reach_home();
        }
    }

    /// Dimmed on alternating 100 ms slices while invulnerable
    pub fn frog_brightness(&self) -> f32 {
        if self.invulnerable_ms > 0.0 && (self.invulnerable_ms / 100.0) as i64 % 2 == 0 {
            BLINK_BRIGHTNESS
        } else {
            1.0
        }
    }

    fn centered_x(&self, text: &str) -> i32 {
        ((self.layout.cols - GLYPH_WIDTH * text.len() as i32) / 2).max(0)
    }

    fn draw(&self, surface: &mut dyn Surface, brightness: f32) {
        surface.clear();
        let layout = &self.layout;

        for row in 0..layout.rows {
            let band = layout.band_color(row).scaled(brightness);
            self.canvas.block(surface, 0, row, layout.cols, 1, band);
        }
        for (i, &hx) in layout.home_x.iter().enumerate() {
            let color = if self.homes_filled[i] { HOME_FILLED } else { HOME_OPEN };
            self.canvas
                .cell(surface, hx, layout.home_row, color.scaled(brightness));
        }
        for m in &self.movers {
            self.canvas
                .block(surface, m.cell_x(), m.row, m.width, 1, m.color.scaled(brightness));
        }
        let frog = Rgb::WHITE.scaled(brightness * self.frog_brightness());
        self.canvas
            .cell(surface, self.frog.cell_x(), self.frog.row, frog);

        // HUD in raw pixels
        let (w, h) = (surface.width(), surface.height());
        if w > 0 {
            let dots = ((self.score as i32 / 10) % w).min(w - 1);
            for x in 0..dots {
                surface.set_pixel(x, 0, HUD_SCORE);
            }
        }
        for i in 0..self.lives.max(0) {
            let x = i * 2;
            if x >= w {
                break;
            }
            surface.set_pixel(x, h - 1, Rgb::WHITE);
        }
    }

    fn handle_button(&mut self, event: ButtonEvent) {
        if !event.pressed {
            return;
        }
        if event.button == Button::Start {
            match self.phase {
                Phase::Ended { .. } => self.reset_game(),
                Phase::Playing => {
                    self.paused = !self.paused;
                    log::debug!("Frogger paused: {}", self.paused);
                }
            }
            return;
        }
        if self.paused || self.phase != Phase::Playing {
            return;
        }
        match event.button {
            Button::Up => self.hop(0, -1),
            b if b.is_fire() => self.hop(0, -1),
            Button::Down => self.hop(0, 1),
            Button::Left => self.hop(-1, 0),
            Button::Right => self.hop(1, 0),
            _ => {}
        }
    }
}

impl ArcadeGame for Frogger {
    fn kind(&self) -> GameKind {
        GameKind::Frogger
    }

    fn update(&mut self, surface: &mut dyn Surface) -> NextTick {
        let frame = self.clock.frame(BASE_FRAME_MS);

        if let Phase::Ended { waiting_to_disable } = self.phase {
            self.draw(surface, GAME_OVER_BRIGHTNESS);
            let rows = self.layout.rows;
            surface.draw_text("GAME", self.centered_x("GAME"), (rows / 2 - 6).max(0), Rgb::WHITE, 1.0);
            surface.draw_text("OVER", self.centered_x("OVER"), (rows / 2).max(0), Rgb::WHITE, 1.0);
            surface.flush();
            if !waiting_to_disable {
                self.phase = Phase::Ended {
                    waiting_to_disable: true,
                };
                return NextTick::Linger;
            }
            surface.set_mode(OverlayMode::Disabled);
            return NextTick::Done;
        }

        if self.paused {
            self.draw(surface, PAUSED_BRIGHTNESS);
            let y = (self.layout.rows / 2 - 3).max(0);
            surface.draw_text("PAUSED", self.centered_x("PAUSED"), y, Rgb::WHITE, 1.0);
            surface.flush();
            return NextTick::After(FRAME_MS);
        }

        self.step(frame.elapsed_ms);
        self.draw(surface, 1.0);
        surface.flush();
        NextTick::After(FRAME_MS)
    }

    fn on_button(&mut self, token: &str) {
        if let Some(event) = ButtonEvent::parse(token) {
            self.handle_button(event);
        }
    }
}
