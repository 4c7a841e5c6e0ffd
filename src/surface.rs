//! Pixel grid surface the games render through
//!
//! The host owns the real panel; games only see the `Surface` trait. A
//! double-buffered in-memory `PixelGrid` is provided for headless runs and
//! tests.

use serde::{Deserialize, Serialize};

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const GREY: Rgb = Rgb::new(128, 128, 128);
    pub const RED: Rgb = Rgb::new(255, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed 0xRRGGBB value
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }

    /// Scale every channel by `brightness` (clamped to [0, 1])
    pub fn scaled(self, brightness: f32) -> Self {
        let k = brightness.clamp(0.0, 1.0);
        let ch = |c: u8| ((c as f32 * k) as i32).clamp(0, 255) as u8;
        Self::new(ch(self.r), ch(self.g), ch(self.b))
    }

    pub fn is_black(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }
}

/// How the panel composites game output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverlayMode {
    /// Game owns the panel
    #[default]
    Enabled,
    /// Black pixels let underlying content through
    TransparentRgb,
    /// Game output hidden
    Disabled,
}

/// Rendering primitives supplied by the host
pub trait Surface {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    /// Out-of-range coordinates must be ignored
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb);
    fn clear(&mut self);
    fn flush(&mut self);
    /// Draw text on a glyph grid of `scale`-sized cells
    fn draw_text(&mut self, text: &str, grid_x: i32, grid_y: i32, color: Rgb, scale: f32);
    fn set_mode(&mut self, mode: OverlayMode);
}

/// Maps logical cells onto pixels (pixel scaling plus an origin offset)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellCanvas {
    pub scale: i32,
    pub offset_x: i32,
    pub offset_y: i32,
}

impl CellCanvas {
    pub fn new(scale: i32) -> Self {
        Self {
            scale: scale.max(1),
            offset_x: 0,
            offset_y: 0,
        }
    }

    pub fn with_offset(mut self, offset_x: i32, offset_y: i32) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    /// Fill one logical cell
    pub fn cell(&self, surface: &mut dyn Surface, gx: i32, gy: i32, color: Rgb) {
        let x0 = self.offset_x + gx * self.scale;
        let y0 = self.offset_y + gy * self.scale;
        for dy in 0..self.scale {
            for dx in 0..self.scale {
                surface.set_pixel(x0 + dx, y0 + dy, color);
            }
        }
    }

    /// Fill a `w` x `h` block of logical cells
    pub fn block(&self, surface: &mut dyn Surface, gx: i32, gy: i32, w: i32, h: i32, color: Rgb) {
        for yy in 0..h {
            for xx in 0..w {
                self.cell(surface, gx + xx, gy + yy, color);
            }
        }
    }
}

/// Fill an axis-aligned block of raw pixels
pub fn fill_rect(surface: &mut dyn Surface, x: i32, y: i32, w: i32, h: i32, color: Rgb) {
    for xp in 0..w {
        for yp in 0..h {
            surface.set_pixel(x + xp, y + yp, color);
        }
    }
}

/// A text draw call recorded by `PixelGrid`
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub grid_x: i32,
    pub grid_y: i32,
    pub color: Rgb,
    pub scale: f32,
}

/// In-memory double-buffered surface
///
/// Drawing goes to a back buffer; `flush` publishes it. Text is recorded as
/// spans rather than rasterized.
#[derive(Debug, Clone)]
pub struct PixelGrid {
    width: i32,
    height: i32,
    back: Vec<Rgb>,
    front: Vec<Rgb>,
    back_text: Vec<TextSpan>,
    front_text: Vec<TextSpan>,
    mode: OverlayMode,
    flushes: u64,
}

impl PixelGrid {
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let len = (width * height) as usize;
        Self {
            width,
            height,
            back: vec![Rgb::BLACK; len],
            front: vec![Rgb::BLACK; len],
            back_text: Vec::new(),
            front_text: Vec::new(),
            mode: OverlayMode::Enabled,
            flushes: 0,
        }
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            None
        } else {
            Some((y * self.width + x) as usize)
        }
    }

    /// Published pixel at (x, y)
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgb> {
        self.index(x, y).map(|i| self.front[i])
    }

    /// Number of lit pixels in the published frame
    pub fn lit_count(&self) -> usize {
        self.front.iter().filter(|c| !c.is_black()).count()
    }

    /// Text spans in the published frame
    pub fn text(&self) -> &[TextSpan] {
        &self.front_text
    }

    /// True if any published text span equals `needle`
    pub fn has_text(&self, needle: &str) -> bool {
        self.front_text.iter().any(|t| t.text == needle)
    }

    pub fn mode(&self) -> OverlayMode {
        self.mode
    }

    pub fn flush_count(&self) -> u64 {
        self.flushes
    }

    /// Render the published frame as ASCII (`#` lit, `.` dark)
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let lit = self.pixel(x, y).is_some_and(|c| !c.is_black());
                out.push(if lit { '#' } else { '.' });
            }
            out.push('\n');
        }
        out
    }
}

impl Surface for PixelGrid {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        if let Some(i) = self.index(x, y) {
            self.back[i] = color;
        }
    }

    fn clear(&mut self) {
        self.back.fill(Rgb::BLACK);
        self.back_text.clear();
    }

    fn flush(&mut self) {
        self.front.copy_from_slice(&self.back);
        self.front_text = self.back_text.clone();
        self.flushes += 1;
    }

    fn draw_text(&mut self, text: &str, grid_x: i32, grid_y: i32, color: Rgb, scale: f32) {
        self.back_text.push(TextSpan {
            text: text.to_string(),
            grid_x,
            grid_y,
            color,
            scale,
        });
    }

    fn set_mode(&mut self, mode: OverlayMode) {
        self.mode = mode;
    }
}
