//! Pixel Arcade - arcade game cores for addressable pixel panels
//!
//! Core modules:
//! - `breakout`: Brick-breaking simulation (physics, power-ups, levels)
//! - `pong`, `frogger`, `tetris`: The other cabinet games
//! - `surface`: Pixel grid abstraction the host renders through
//! - `host`: Per-panel session registry and button routing
//! - `settings`: Panel options read once at session construction

pub mod breakout;
pub mod clock;
pub mod frogger;
pub mod game;
pub mod geom;
pub mod host;
pub mod input;
pub mod pong;
pub mod settings;
pub mod surface;
pub mod tetris;

pub use game::{ArcadeGame, GameKind, NextTick};
pub use host::Arcade;
pub use settings::{ArcadeOptions, OverlayStyle};
pub use surface::{OverlayMode, PixelGrid, Rgb, Surface};

use glam::Vec2;

/// Shared timing constants
pub mod consts {
    /// Nominal frame duration the motion constants are tuned for
    pub const BASE_FRAME_MS: f64 = 50.0;
    /// Frame scalar clamp (bounds catch-up after scheduling stalls)
    pub const MIN_FRAME_SCALAR: f64 = 0.1;
    pub const MAX_FRAME_SCALAR: f64 = 5.0;
    /// Fixed glyph width (in grid cells) used for centering text
    pub const GLYPH_WIDTH: i32 = 4;
}

/// Normalize a direction to unit length, leaving a zero vector untouched
#[inline]
pub fn normalize_dir(dir: Vec2) -> Vec2 {
    let len = dir.length();
    if len != 0.0 { dir / len } else { dir }
}

/// Horizontal grid position that centers `text` on a surface `width` pixels wide
#[inline]
pub fn centered_text_x(width: i32, text: &str, scale: f32) -> i32 {
    if scale <= 0.0 {
        return 0;
    }
    let grid_width = (width as f32 / scale) as i32;
    let text_width = consts::GLYPH_WIDTH * text.chars().count() as i32;
    ((grid_width - text_width) / 2).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_dir_unit_and_zero() {
        let d = normalize_dir(Vec2::new(3.0, -4.0));
        assert!((d.length() - 1.0).abs() < 1e-6);
        assert!((d.x - 0.6).abs() < 1e-6);
        assert_eq!(normalize_dir(Vec2::ZERO), Vec2::ZERO);
    }

    #[test]
    fn test_centered_text_x() {
        // 64 px wide, scale 1: "GAME" is 16 cells -> (64 - 16) / 2
        assert_eq!(centered_text_x(64, "GAME", 1.0), 24);
        // Scale 2 halves the grid
        assert_eq!(centered_text_x(64, "GAME", 2.0), 8);
        // Never negative
        assert_eq!(centered_text_x(8, "LEVEL 12", 1.0), 0);
        assert_eq!(centered_text_x(64, "X", 0.0), 0);
    }
}
