//! Falling-block game
//!
//! Time advances by the scheduled frame interval rather than the wall
//! clock: gravity, soft drop and auto-repeat all accumulate the interval
//! the previous update asked for.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::centered_text_x;
use crate::game::{ArcadeGame, GameKind, NextTick};
use crate::input::{Button, ButtonEvent};
use crate::settings::ArcadeOptions;
use crate::surface::{CellCanvas, OverlayMode, Rgb, Surface};

pub const INITIAL_GRAVITY_MS: u32 = 500;
const PER_LINE_DROP_MS: u32 = 25;
const MAX_SPEED_DROP_MS: u32 = 360;
const MIN_GRAVITY_MS: u32 = 150;
const MIN_FRAME_MS: u32 = 80;
const HOLD_INITIAL_MS: u32 = 200;
const HOLD_REPEAT_MS: u32 = 90;
const SOFT_DROP_MS: u32 = 60;
const GAME_OVER_MS: u32 = 3000;

const BORDER: Rgb = Rgb::GREY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PieceKind {
    S,
    Z,
    L,
    J,
    O,
    T,
    I,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::S,
        PieceKind::Z,
        PieceKind::L,
        PieceKind::J,
        PieceKind::O,
        PieceKind::T,
        PieceKind::I,
    ];

    pub fn color(&self) -> Rgb {
        let hex = match self {
            PieceKind::S => 0xFF0000,
            PieceKind::Z => 0x00FF00,
            PieceKind::L => 0x0000FF,
            PieceKind::J => 0xFF00FF,
            PieceKind::O => 0xFFFF00,
            PieceKind::T => 0x00FFFF,
            PieceKind::I => 0xFFFFFF,
        };
        Rgb::from_hex(hex)
    }

    /// Bounding box size and occupied (row, col) cells in spawn orientation
    fn shape(&self) -> (usize, &'static [(usize, usize)]) {
        match self {
            PieceKind::S => (3, &[(1, 0), (2, 0), (0, 1), (1, 1)]),
            PieceKind::Z => (3, &[(0, 0), (1, 0), (1, 1), (2, 1)]),
            PieceKind::L => (3, &[(0, 0), (1, 0), (1, 1), (1, 2)]),
            PieceKind::J => (3, &[(1, 0), (0, 0), (0, 1), (0, 2)]),
            PieceKind::O => (2, &[(0, 0), (0, 1), (1, 0), (1, 1)]),
            PieceKind::T => (3, &[(1, 0), (0, 1), (1, 1), (2, 1)]),
            PieceKind::I => (4, &[(1, 0), (1, 1), (1, 2), (1, 3)]),
        }
    }
}

/// The falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    size: usize,
    cells: [[bool; 4]; 4],
    pub row: i32,
    pub col: i32,
}

impl Piece {
    pub fn new(kind: PieceKind, row: i32, col: i32) -> Self {
        let (size, occupied) = kind.shape();
        let mut cells = [[false; 4]; 4];
        for &(r, c) in occupied {
            cells[r][c] = true;
        }
        Self {
            kind,
            size,
            cells,
            row,
            col,
        }
    }

    /// Absolute (row, col) of every occupied cell
    pub fn blocks(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        (0..self.size).flat_map(move |r| {
            (0..self.size)
                .filter(move |&c| self.cells[r][c])
                .map(move |c| (self.row + r as i32, self.col + c as i32))
        })
    }

    pub fn rotated_cw(&self) -> Self {
        let mut next = *self;
        let n = self.size;
        for r in 0..n {
            for c in 0..n {
                next.cells[r][c] = self.cells[n - 1 - c][r];
            }
        }
        next
    }

    pub fn rotated_ccw(&self) -> Self {
        self.rotated_cw().rotated_cw().rotated_cw()
    }

    pub fn shifted(&self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
            ..*self
        }
    }
}

/// Locked cells, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    pub rows: i32,
    pub cols: i32,
    cells: Vec<Option<Rgb>>,
}

impl Board {
    pub fn new(rows: i32, cols: i32) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; (rows.max(0) * cols.max(0)) as usize],
        }
    }

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        if row < 0 || col < 0 || row >= self.rows || col >= self.cols {
            None
        } else {
            Some((row * self.cols + col) as usize)
        }
    }

    pub fn get(&self, row: i32, col: i32) -> Option<Rgb> {
        self.index(row, col).and_then(|i| self.cells[i])
    }

    pub fn set(&mut self, row: i32, col: i32, color: Option<Rgb>) {
        if let Some(i) = self.index(row, col) {
            self.cells[i] = color;
        }
    }

    /// Inside the side walls and floor, overlapping nothing locked
    pub fn fits(&self, piece: &Piece) -> bool {
        piece.blocks().all(|(r, c)| {
            c >= 0 && c < self.cols && r < self.rows && self.get(r, c).is_none()
        })
    }

    pub fn lock(&mut self, piece: &Piece) {
        let color = piece.kind.color();
        for (r, c) in piece.blocks() {
            self.set(r, c, Some(color));
        }
    }

    /// Remove full rows, shifting everything above down; returns the count
    pub fn clear_full_rows(&mut self) -> u32 {
        let cols = self.cols as usize;
        let mut cleared = 0;
        for row in 0..self.rows as usize {
            let start = row * cols;
            if self.cells[start..start + cols].iter().all(Option::is_some) {
                cleared += 1;
                self.cells.copy_within(0..start, cols);
                self.cells[..cols].fill(None);
            }
        }
        cleared
    }

    pub fn occupied(&self) -> impl Iterator<Item = (i32, i32, Rgb)> + '_ {
        let cols = self.cols.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, c)| c.map(|color| (i as i32 / cols, i as i32 % cols, color)))
    }
}

/// Auto-repeat state for one held direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeldMove {
    held: bool,
    accumulated: u32,
    initial_delay: bool,
}

impl Default for HeldMove {
    fn default() -> Self {
        Self {
            held: false,
            accumulated: 0,
            initial_delay: true,
        }
    }
}

impl HeldMove {
    fn press(&mut self) {
        *self = Self {
            held: true,
            ..Self::default()
        };
    }

    fn release(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// Spawn failed; the banner shows next update
    Over,
    Ended { waiting_to_disable: bool },
}

#[derive(Debug, Clone)]
pub struct Tetris {
    canvas: CellCanvas,
    pub board: Board,
    pub piece: Option<Piece>,
    pub score: u32,
    pub phase: Phase,
    /// Gravity interval
    pub gravity_ms: u32,
    speed_drop_ms: u32,
    fall_ms: u32,
    soft_drop_held: bool,
    soft_drop_ms: u32,
    left: HeldMove,
    right: HeldMove,
    rng: Pcg32,
}

impl Tetris {
    pub fn new(options: &ArcadeOptions, width: i32, height: i32) -> Self {
        let options = options.sanitized();
        let scale = options.pixel_scaling;
        let (rows, cols) = (options.rows, options.columns);
        let offset_x = ((width - cols * scale) / 2).max(0);
        let offset_y = ((height - rows * scale) / 2).max(0);
        let seed = options.session_seed();
        log::info!("Tetris session {rows}x{cols} board at ({offset_x}, {offset_y}), seed {seed}");

        let mut game = Self {
            canvas: CellCanvas::new(scale).with_offset(offset_x, offset_y),
            board: Board::new(rows, cols),
            piece: None,
            score: 0,
            phase: Phase::Playing,
            gravity_ms: INITIAL_GRAVITY_MS,
            speed_drop_ms: 0,
            fall_ms: 0,
            soft_drop_held: false,
            soft_drop_ms: 0,
            left: HeldMove::default(),
            right: HeldMove::default(),
            rng: Pcg32::seed_from_u64(seed),
        };
        let kind = game.random_kind();
        game.spawn(kind);
        game
    }

    fn random_kind(&mut self) -> PieceKind {
        PieceKind::ALL[self.rng.random_range(0..PieceKind::ALL.len())]
    }

    /// Place a new piece at the top; a blocked spawn ends the game
    pub fn spawn(&mut self, kind: PieceKind) -> bool {
        let piece = Piece::new(kind, 0, self.board.cols / 2 - 1);
        let fits = self.board.fits(&piece);
        self.piece = Some(piece);
        if !fits {
            log::info!("Tetris over, score {}", self.score);
            self.phase = Phase::Over;
        }
        fits
    }

    /// Frame interval for the current gravity
    pub fn frame_interval(&self) -> u32 {
        (self.gravity_ms / 2).max(MIN_FRAME_MS)
    }

    fn speed_up(&mut self, lines: u32) {
        self.speed_drop_ms = (self.speed_drop_ms + lines * PER_LINE_DROP_MS).min(MAX_SPEED_DROP_MS);
        self.gravity_ms = INITIAL_GRAVITY_MS
            .saturating_sub(self.speed_drop_ms)
            .max(MIN_GRAVITY_MS);
        log::debug!("Tetris gravity {} ms", self.gravity_ms);
    }

    /// Replace the piece with `candidate` if it fits
    fn try_move(&mut self, candidate: Piece) -> bool {
        if self.board.fits(&candidate) {
            self.piece = Some(candidate);
            true
        } else {
            false
        }
    }

    pub fn shift(&mut self, d_col: i32) -> bool {
        match self.piece {
            Some(p) if self.phase == Phase::Playing => self.try_move(p.shifted(0, d_col)),
            _ => false,
        }
    }

    /// One row down, locking the piece when it rests
    pub fn drop_one_row(&mut self) {
        let Some(piece) = self.piece else {
            return;
        };
        if self.phase != Phase::Playing || self.try_move(piece.shifted(1, 0)) {
            return;
        }
        self.board.lock(&piece);
        let cleared = self.board.clear_full_rows();
        if cleared > 0 {
            self.score += cleared;
            self.speed_up(cleared);
        }
        let kind = self.random_kind();
        self.spawn(kind);
    }

    fn step(&mut self, elapsed: u32) {
        self.fall_ms += elapsed;
        while self.phase == Phase::Playing && self.fall_ms >= self.gravity_ms {
            self.fall_ms -= self.gravity_ms;
            self.drop_one_row();
        }

        if self.soft_drop_held {
            self.soft_drop_ms += elapsed;
            while self.phase == Phase::Playing && self.soft_drop_ms >= SOFT_DROP_MS {
                self.soft_drop_ms -= SOFT_DROP_MS;
                self.drop_one_row();
            }
        } else {
            self.soft_drop_ms = 0;
        }

        self.auto_repeat(elapsed);
    }

    fn auto_repeat(&mut self, elapsed: u32) {
        for dir in [-1, 1] {
            let (this, other) = if dir < 0 {
                (self.left, self.right)
            } else {
                (self.right, self.left)
            };
            let mut state = this;
            if state.held && !other.held {
                state.accumulated += elapsed;
                let mut threshold = if state.initial_delay { HOLD_INITIAL_MS } else { HOLD_REPEAT_MS };
                while state.accumulated >= threshold {
                    if !self.shift(dir) {
                        state.accumulated = threshold;
                        break;
                    }
                    state.accumulated -= threshold;
                    state.initial_delay = false;
                    threshold = HOLD_REPEAT_MS;
                }
            } else {
                state.accumulated = 0;
                state.initial_delay = true;
            }
            if dir < 0 {
                self.left = state;
            } else {
                self.right = state;
            }
        }
    }

    fn draw(&self, surface: &mut dyn Surface) {
        surface.clear();
        let (rows, cols) = (self.board.rows, self.board.cols);
        let scale = self.canvas.scale;
        let (ox, oy) = (self.canvas.offset_x, self.canvas.offset_y);

        if ox != 0 {
            for y in 0..rows * scale {
                surface.set_pixel(ox - 1, oy + y, BORDER);
                surface.set_pixel(ox + cols * scale, oy + y, BORDER);
            }
            for x in -1..=cols * scale {
                surface.set_pixel(ox + x, oy + rows * scale, BORDER);
                if oy != 0 {
                    surface.set_pixel(ox + x, oy - 1, BORDER);
                }
            }
        }

        for (r, c, color) in self.board.occupied() {
            self.canvas.cell(surface, c, r, color);
        }
        if let Some(piece) = &self.piece {
            let color = piece.kind.color();
            for (r, c) in piece.blocks() {
                self.canvas.cell(surface, c, r, color);
            }
        }
    }

    /// GAME / OVER / score, unscaled and centered on the panel
    fn draw_game_over(&self, surface: &mut dyn Surface) {
        surface.clear();
        let w = surface.width();
        let total_height = 5 + 2 + 5 + 6;
        let y_game = ((surface.height() - total_height) / 2).max(0);
        let score = self.score.to_string();
        for (i, text) in ["GAME", "OVER", score.as_str()].into_iter().enumerate() {
            let y = y_game + 7 * i as i32;
            surface.draw_text(text, centered_text_x(w, text, 1.0), y, Rgb::WHITE, 1.0);
        }
    }

    fn handle_button(&mut self, event: ButtonEvent) {
        if self.phase != Phase::Playing || self.piece.is_none() {
            return;
        }
        match (event.button, event.pressed) {
            (Button::Left, true) => {
                self.shift(-1);
                self.left.press();
            }
            (Button::Left, false) => self.left.release(),
            (Button::Right, true) => {
                self.shift(1);
                self.right.press();
            }
            (Button::Right, false) => self.right.release(),
            (Button::Up | Button::A | Button::Fire, true) => {
                if let Some(p) = self.piece {
                    self.try_move(p.rotated_cw());
                }
            }
            (Button::B, true) => {
                if let Some(p) = self.piece {
                    self.try_move(p.rotated_ccw());
                }
            }
            (Button::Down, true) => {
                self.soft_drop_held = true;
                self.drop_one_row();
            }
            (Button::Down, false) => self.soft_drop_held = false,
            _ => {}
        }
    }
}

impl ArcadeGame for Tetris {
    fn kind(&self) -> GameKind {
        GameKind::Tetris
    }

    fn update(&mut self, surface: &mut dyn Surface) -> NextTick {
        match self.phase {
            Phase::Over => {
                self.piece = None;
                self.draw_game_over(surface);
                surface.flush();
                self.phase = Phase::Ended {
                    waiting_to_disable: false,
                };
                NextTick::After(GAME_OVER_MS)
            }
            Phase::Ended { waiting_to_disable } => {
                surface.clear();
                surface.flush();
                if waiting_to_disable {
                    surface.set_mode(OverlayMode::Disabled);
                    return NextTick::Done;
                }
                self.phase = Phase::Ended {
                    waiting_to_disable: true,
                };
                NextTick::Linger
            }
            Phase::Playing => {
                let interval = self.frame_interval();
                self.step(interval);
                self.draw(surface);
                surface.flush();
                NextTick::After(interval)
            }
        }
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

    fn tetris() -> Tetris {
        let options = ArcadeOptions {
            seed: Some(5),
            ..Default::default()
        };
        Tetris::new(&options, 64, 32)
    }

    /// Fresh board with a known piece
    fn with_piece(kind: PieceKind) -> Tetris {
        let mut t = tetris();
        assert!(t.spawn(kind));
        t
    }

    fn fill_row(board: &mut Board, row: i32, except: &[i32]) {
        for c in 0..board.cols {
            if !except.contains(&c) {
                board.set(row, c, Some(Rgb::GREY));
            }
        }
    }

    #[test]
    fn test_spawn_position() {
        let t = tetris();
        let p = t.piece.unwrap();
        assert_eq!((p.row, p.col), (0, 4));
        assert_eq!(t.phase, Phase::Playing);
        assert_eq!(t.frame_interval(), 250);
    }

    #[test]
    fn test_rotation_cycles() {
        for kind in PieceKind::ALL {
            let p = Piece::new(kind, 3, 3);
            let r = p.rotated_cw();
            assert_eq!(r.blocks().count(), 4);
            assert_eq!(r.rotated_ccw(), p);
            assert_eq!(r.rotated_cw().rotated_cw().rotated_cw(), p);
        }
        // Flat bar stands up after a turn
        let i = Piece::new(PieceKind::I, 0, 0).rotated_cw();
        let cells: Vec<_> = i.blocks().collect();
        assert_eq!(cells, vec![(0, 2), (1, 2), (2, 2), (3, 2)]);
    }

    #[test]
    fn test_gravity_every_two_frames() {
        let mut t = with_piece(PieceKind::O);
        let mut grid = PixelGrid::new(64, 32);
        assert_eq!(t.update(&mut grid), NextTick::After(250));
        assert_eq!(t.piece.unwrap().row, 0);
        t.update(&mut grid);
        assert_eq!(t.piece.unwrap().row, 1);
    }

    #[test]
    fn test_walls_block_moves_and_rotation() {
        let mut t = with_piece(PieceKind::O);
        for _ in 0..10 {
            t.shift(-1);
        }
        assert_eq!(t.piece.unwrap().col, 0);
        assert!(!t.shift(-1));

        // Upright bar against the right wall: either turn would poke through
        let mut t = with_piece(PieceKind::I);
        let upright = Piece::new(PieceKind::I, 0, 8).rotated_cw();
        assert!(t.board.fits(&upright));
        t.piece = Some(upright);
        t.on_button("Up - Pressed");
        assert_eq!(t.piece, Some(upright));
        t.on_button("B Button - Pressed");
        assert_eq!(t.piece, Some(upright));
    }

    #[test]
    fn test_rotation_only_when_it_fits() {
        let mut t = with_piece(PieceKind::I);
        // Spawned flat at row 1; turning needs rows 0..=3 in column 6
        t.board.set(3, 6, Some(Rgb::GREY));
        let before = t.piece;
        t.on_button("Up - Pressed");
        assert_eq!(t.piece, before);
        t.board.set(3, 6, None);
        t.on_button("A Button - Pressed");
        assert_ne!(t.piece, before);
    }

    #[test]
    fn test_lock_clears_lines_and_speeds_up() {
        let mut t = with_piece(PieceKind::O);
        fill_row(&mut t.board, 19, &[4, 5]);
        fill_row(&mut t.board, 18, &[4, 5]);
        t.board.set(17, 0, Some(Rgb::RED));
        t.piece = Some(Piece::new(PieceKind::O, 18, 4));
        t.drop_one_row();
        assert_eq!(t.score, 2);
        assert_eq!(t.gravity_ms, 450);
        assert_eq!(t.frame_interval(), 225);
        // Survivor shifted down two rows
        assert_eq!(t.board.get(19, 0), Some(Rgb::RED));
        assert_eq!(t.board.occupied().count(), 1);
        assert_eq!(t.piece.unwrap().row, 0);
    }

    #[test]
    fn test_gravity_floor() {
        let mut t = tetris();
        t.speed_up(100);
        assert_eq!(t.gravity_ms, 150);
        assert_eq!(t.frame_interval(), MIN_FRAME_MS);
    }

    #[test]
    fn test_soft_drop() {
        let mut t = with_piece(PieceKind::O);
        let mut grid = PixelGrid::new(64, 32);
        t.on_button("Down - Pressed");
        assert_eq!(t.piece.unwrap().row, 1);
        t.update(&mut grid);
        assert_eq!(t.piece.unwrap().row, 5);
        t.on_button("Down - Released");
        t.update(&mut grid);
        // Only gravity now
        assert_eq!(t.piece.unwrap().row, 6);
    }

    #[test]
    fn test_auto_repeat() {
        let mut t = with_piece(PieceKind::O);
        let mut grid = PixelGrid::new(64, 32);
        t.on_button("Left - Pressed");
        assert_eq!(t.piece.unwrap().col, 3);
        t.update(&mut grid);
        assert_eq!(t.piece.unwrap().col, 2);
        t.update(&mut grid);
        assert_eq!(t.piece.unwrap().col, 0);
        t.on_button("Left - Released");
        t.on_button("Right - Pressed");
        assert_eq!(t.piece.unwrap().col, 1);
    }

    #[test]
    fn test_blocked_spawn_ends_game() {
        let mut t = tetris();
        let mut grid = PixelGrid::new(64, 32);
        t.score = 7;
        fill_row(&mut t.board, 1, &[0]);
        fill_row(&mut t.board, 0, &[0]);
        assert!(!t.spawn(PieceKind::O));
        assert_eq!(t.phase, Phase::Over);
        t.on_button("Left - Pressed");
        assert_eq!(t.piece.unwrap().col, 4);

        assert_eq!(t.update(&mut grid), NextTick::After(GAME_OVER_MS));
        assert!(grid.has_text("GAME"));
        assert!(grid.has_text("OVER"));
        assert!(grid.has_text("7"));
        let over = grid.text().iter().find(|s| s.text == "OVER").unwrap();
        assert_eq!(over.grid_y, 7 + 7);
        assert_eq!(t.update(&mut grid), NextTick::Linger);
        assert_eq!(grid.lit_count(), 0);
        assert_eq!(t.update(&mut grid), NextTick::Done);
        assert_eq!(grid.mode(), OverlayMode::Disabled);
    }

    #[test]
    fn test_border_and_cells_drawn() {
        let mut t = with_piece(PieceKind::O);
        let mut grid = PixelGrid::new(64, 32);
        t.board.set(19, 0, Some(Rgb::RED));
        t.update(&mut grid);
        // Board 11x20 centered: origin (26, 6)
        assert_eq!(grid.pixel(25, 6), Some(BORDER));
        assert_eq!(grid.pixel(37, 6), Some(BORDER));
        assert_eq!(grid.pixel(25, 26), Some(BORDER));
        assert_eq!(grid.pixel(37, 5), Some(BORDER));
        assert_eq!(grid.pixel(26, 25), Some(Rgb::RED));
        assert_eq!(grid.pixel(30, 6), Some(PieceKind::O.color()));
    }

    #[test]
    fn test_no_border_when_board_fills_panel() {
        let options = ArcadeOptions {
            rows: 32,
            columns: 64,
            seed: Some(1),
            ..Default::default()
        };
        let mut t = Tetris::new(&options, 64, 32);
        let mut grid = PixelGrid::new(64, 32);
        t.piece = None;
        t.update(&mut grid);
        assert_eq!(grid.lit_count(), 0);
    }
}
