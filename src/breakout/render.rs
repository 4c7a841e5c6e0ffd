//! Scene drawing
//!
//! Everything is drawn into the surface's back buffer; callers decide when
//! to flush (so banners can be layered on top of a dimmed scene).

use super::state::BreakoutState;
use crate::centered_text_x;
use crate::surface::{Rgb, Surface, fill_rect};

/// Brightness used behind banners and pauses
pub const DIM_BRIGHTNESS: f32 = 0.2;

/// Clear and draw the full scene at `brightness`
pub fn draw_scene(state: &BreakoutState, surface: &mut dyn Surface, brightness: f32) {
    let k = brightness.clamp(0.0, 1.0);
    surface.clear();

    for brick in &state.field.bricks {
        let color = brick
            .color
            .scaled((k * brick.health_brightness()).clamp(0.0, 1.0));
        let r = brick.rect;
        fill_rect(surface, r.x as i32, r.y as i32, r.width as i32, r.height as i32, color);
    }

    let white = Rgb::WHITE.scaled(k);
    let p = state.paddle.rect;
    fill_rect(surface, p.x as i32, p.y as i32, p.width as i32, p.height as i32, white);

    for ball in &state.balls {
        let r = ball.rect;
        let w = (r.width.round() as i32).max(1);
        let h = (r.height.round() as i32).max(1);
        fill_rect(surface, r.x.round() as i32, r.y.round() as i32, w, h, white);
    }

    for power_up in &state.power_ups {
        let r = power_up.rect;
        let color = power_up.kind.color().scaled(k);
        fill_rect(surface, r.x.round() as i32, r.y.round() as i32, r.width as i32, r.height as i32, color);
    }

    let laser_color = Rgb::RED.scaled(k);
    let max_y = (state.panel_h - 1).max(0);
    for laser in &state.lasers {
        let x = laser.x.round() as i32;
        let tip = laser.y.round() as i32;
        let start = (tip - 3).clamp(0, max_y);
        let end = (tip + 1).clamp(0, max_y);
        for y in start..=end {
            surface.set_pixel(x, y, laser_color);
        }
    }

    // One pixel per life along the top-left
    for i in 0..state.lives {
        surface.set_pixel(i, 0, Rgb::WHITE);
    }

    if state.portal_ms > 0.0 {
        let pulse = (0.5 + 0.5 * state.portal_phase.sin()) as f32;
        let color = Rgb::new(
            (255.0 * pulse) as u8,
            (20.0 * pulse) as u8,
            (147.0 * pulse) as u8,
        );
        let x = (state.panel_w - 1).max(0);
        for i in 0..3 {
            surface.set_pixel(x, (state.panel_h - 1 - i).max(0), color);
        }
    }
}

/// Glyph scale for banners
pub fn text_scale(state: &BreakoutState) -> f32 {
    state.paddle.rect.height.max(1.0)
}

/// Centered banner: `top` above the middle, `bottom` just below it
pub fn draw_banner(surface: &mut dyn Surface, scale: f32, top: &str, bottom: Option<&str>) {
    let w = surface.width();
    let half = (surface.height() / 2) as f32;
    let top_y = ((half - 6.0 * scale) / scale) as i32;
    surface.draw_text(top, centered_text_x(w, top, scale), top_y.max(0), Rgb::WHITE, scale);
    if let Some(bottom) = bottom {
        let bottom_y = (half / scale) as i32;
        surface.draw_text(bottom, centered_text_x(w, bottom, scale), bottom_y, Rgb::WHITE, scale);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakout::entities::Laser;
    use crate::breakout::powerup::PowerUpKind;
    use crate::surface::PixelGrid;

    fn render(state: &BreakoutState, brightness: f32) -> PixelGrid {
        let mut grid = PixelGrid::new(state.panel_w, state.panel_h);
        draw_scene(state, &mut grid, brightness);
        grid.flush();
        grid
    }

    #[test]
    fn test_bricks_paddle_and_lives() {
        let state = BreakoutState::new(64, 32, 3, 1);
        let grid = render(&state, 1.0);
        // First brick of level 1 (red) starts at (1, 3)
        assert_eq!(grid.pixel(1, 3), Some(Rgb::new(0xFF, 0x4C, 0x4C)));
        // Paddle row
        assert_eq!(grid.pixel(28, 30), Some(Rgb::WHITE));
        assert_eq!(grid.pixel(27, 30), Some(Rgb::BLACK));
        // Lives
        for i in 0..3 {
            assert_eq!(grid.pixel(i, 0), Some(Rgb::WHITE));
        }
        assert_eq!(grid.pixel(3, 0), Some(Rgb::BLACK));
    }

    #[test]
    fn test_dimmed_scene() {
        let state = BreakoutState::new(64, 32, 3, 1);
        let grid = render(&state, DIM_BRIGHTNESS);
        assert_eq!(grid.pixel(1, 3), Some(Rgb::new(51, 15, 15)));
        // Life pixels stay at full brightness
        assert_eq!(grid.pixel(0, 0), Some(Rgb::WHITE));
    }

    #[test]
    fn test_damaged_brick_is_darker() {
        let mut state = BreakoutState::new(64, 32, 3, 1);
        state.load_rows(0, &["H"]);
        state.field.bricks[0].hit_points = 1;
        let grid = render(&state, 1.0);
        let r = state.field.bricks[0].rect;
        let brightness = state.field.bricks[0].health_brightness();
        assert!((brightness - (0.6 + 0.4 / 3.0)).abs() < 1e-6);
        let expected = Rgb::from_hex(0x4C4CFF).scaled(brightness);
        assert_ne!(expected, Rgb::from_hex(0x4C4CFF));
        assert_eq!(grid.pixel(r.x as i32, r.y as i32), Some(expected));
    }

    #[test]
    fn test_laser_column_and_power_up() {
        let mut state = BreakoutState::new(64, 32, 3, 1);
        state.load_rows(0, &[]);
        state.lasers.push(Laser {
            x: 40.0,
            y: 20.0,
            speed: 4.0,
        });
        state.apply_power_up(PowerUpKind::Portal);
        let grid = render(&state, 1.0);
        for y in 17..=21 {
            assert_eq!(grid.pixel(40, y), Some(Rgb::RED));
        }
        assert_eq!(grid.pixel(40, 16), Some(Rgb::BLACK));
        assert_eq!(grid.pixel(40, 22), Some(Rgb::BLACK));
        // Portal pixels at phase 0: half brightness
        assert_eq!(grid.pixel(63, 31), Some(Rgb::new(127, 10, 73)));
        assert_eq!(grid.pixel(63, 29), Some(Rgb::new(127, 10, 73)));
    }

    #[test]
    fn test_banner_rows() {
        let mut grid = PixelGrid::new(64, 32);
        draw_banner(&mut grid, 1.0, "GAME", Some("OVER"));
        grid.flush();
        let spans = grid.text();
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].grid_x, spans[0].grid_y), (24, 10));
        assert_eq!((spans[1].grid_x, spans[1].grid_y), (24, 16));
    }
}
