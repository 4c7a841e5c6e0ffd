//! Axis-aligned rectangle geometry
//!
//! Every entity that collides embeds a `Rect`. Right/bottom edges are pulled
//! in by `EDGE_EPSILON` so two rectangles that merely share a pixel boundary
//! do not count as overlapping.

use serde::{Deserialize, Serialize};

/// Inset applied to the far edges of a rectangle
pub const EDGE_EPSILON: f32 = 0.1;

/// Resolved edges of a rectangle (possibly padded)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edges {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Edges {
    /// Inclusive overlap on both axes
    #[inline]
    pub fn overlaps(&self, other: &Edges) -> bool {
        self.right >= other.left
            && self.left <= other.right
            && self.bottom >= other.top
            && self.top <= other.bottom
    }
}

/// Rectangle with top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width - EDGE_EPSILON
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height - EDGE_EPSILON
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn edges(&self) -> Edges {
        self.padded(0.0)
    }

    /// Edges grown outward by `pad` on every side
    pub fn padded(&self, pad: f32) -> Edges {
        Edges {
            left: self.left() - pad,
            top: self.top() - pad,
            right: self.right() + pad,
            bottom: self.bottom() + pad,
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.edges().overlaps(&other.edges())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_edges_inset_far_side() {
        let r = Rect::new(2.0, 3.0, 4.0, 5.0);
        assert_eq!(r.left(), 2.0);
        assert_eq!(r.top(), 3.0);
        assert!((r.right() - 5.9).abs() < 1e-5);
        assert!((r.bottom() - 7.9).abs() < 1e-5);
        assert_eq!(r.center_x(), 4.0);
    }

    #[test]
    fn test_adjacent_rects_do_not_intersect() {
        // Share the x = 4 boundary exactly
        let a = Rect::new(0.0, 0.0, 4.0, 4.0);
        let b = Rect::new(4.0, 0.0, 4.0, 4.0);
        assert!(!a.intersects(&b));

        let c = Rect::new(3.5, 1.0, 4.0, 4.0);
        assert!(a.intersects(&c));
    }

    #[test]
    fn test_padding_closes_gap() {
        let a = Rect::new(0.0, 0.0, 4.0, 4.0);
        let b = Rect::new(5.0, 0.0, 4.0, 4.0);
        assert!(!a.intersects(&b));
        // One-pixel gap: a.right = 4.9, b.left = 5.0
        assert!(!a.padded(1.0).overlaps(&b.edges()));
        assert!(a.padded(1.2).overlaps(&b.edges()));
        assert!(a.padded(1.0).overlaps(&b.padded(1.0)));
    }

    proptest! {
        #[test]
        fn prop_intersects_is_symmetric(
            ax in -50.0f32..50.0, ay in -50.0f32..50.0, aw in 0.5f32..20.0, ah in 0.5f32..20.0,
            bx in -50.0f32..50.0, by in -50.0f32..50.0, bw in 0.5f32..20.0, bh in 0.5f32..20.0,
        ) {
            let a = Rect::new(ax, ay, aw, ah);
            let b = Rect::new(bx, by, bw, bh);
            prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        }

        #[test]
        fn prop_rect_intersects_itself(x in -50.0f32..50.0, y in -50.0f32..50.0, w in 0.5f32..20.0, h in 0.5f32..20.0) {
            let r = Rect::new(x, y, w, h);
            prop_assert!(r.intersects(&r));
        }
    }
}
