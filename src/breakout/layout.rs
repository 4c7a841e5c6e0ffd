//! Brick grid placement
//!
//! Bricks fill roughly 80% of the panel width and 35% of its height, with
//! integer gaps distributed between and around them. Recomputed on every
//! level load.

/// Pixel origins of every brick column and row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BrickLayout {
    pub brick_width: f32,
    pub brick_height: f32,
    pub column_starts: Vec<f32>,
    pub row_starts: Vec<f32>,
}

impl BrickLayout {
    /// Lay out `rows` x `cols` bricks above a paddle sitting at `paddle_y`
    pub fn compute(panel_w: i32, panel_h: i32, paddle_y: f32, rows: usize, cols: usize) -> Self {
        if rows == 0 || cols == 0 {
            return Self::default();
        }
        let w = panel_w as f32;
        let h = panel_h as f32;
        let (rows_f, cols_f) = (rows as f32, cols as f32);

        let brick_width = ((w * 0.8) / cols_f).floor().max(2.0);
        let h_gap = ((w - brick_width * cols_f) / (cols_f + 1.0)).floor().max(1.0);
        let column_starts = (0..cols)
            .map(|c| h_gap + c as f32 * (brick_width + h_gap))
            .collect();

        let brick_height = ((h * 0.35) / rows_f).floor().max(1.0);
        let playable = paddle_y - brick_height;
        let spare = (playable - rows_f * brick_height).max(0.0);
        let v_gap = (spare / (rows_f + 1.0)).floor().max(1.0);
        let row_starts = (0..rows)
            .map(|r| v_gap + r as f32 * (brick_height + v_gap))
            .collect();

        Self {
            brick_width,
            brick_height,
            column_starts,
            row_starts,
        }
    }

    pub fn rows(&self) -> usize {
        self.row_starts.len()
    }

    pub fn cols(&self) -> usize {
        self.column_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_layout_64x32_fifteen_columns() {
        // 64 px / 15 cols: floor(51.2 / 15) = 3; gap floor((64 - 45) / 16) = 1
        let layout = BrickLayout::compute(64, 32, 30.0, 5, 15);
        assert_eq!(layout.brick_width, 3.0);
        assert_eq!(layout.column_starts[0], 1.0);
        assert_eq!(layout.column_starts[1], 5.0);
        assert_eq!(layout.cols(), 15);

        // floor(11.2 / 5) = 2; playable 28, spare 18, gap floor(18 / 6) = 3
        assert_eq!(layout.brick_height, 2.0);
        assert_eq!(layout.row_starts, vec![3.0, 8.0, 13.0, 18.0, 23.0]);
    }

    #[test]
    fn test_empty_layout() {
        let layout = BrickLayout::compute(64, 32, 30.0, 0, 15);
        assert_eq!(layout.rows(), 0);
        assert_eq!(layout.cols(), 0);
    }

    #[test]
    fn test_minimum_sizes_on_tiny_panel() {
        let layout = BrickLayout::compute(8, 4, 2.0, 9, 15);
        assert_eq!(layout.brick_width, 2.0);
        assert_eq!(layout.brick_height, 1.0);
        assert_eq!(layout.column_starts[0], 1.0);
        assert_eq!(layout.row_starts[0], 1.0);
    }

    proptest! {
        #[test]
        fn prop_bricks_never_overlap(
            w in 8i32..400, h in 8i32..300, rows in 1usize..12, cols in 1usize..20,
        ) {
            let paddle_y = (h - 2) as f32;
            let layout = BrickLayout::compute(w, h, paddle_y, rows, cols);
            prop_assert_eq!(layout.cols(), cols);
            prop_assert_eq!(layout.rows(), rows);
            prop_assert!(layout.column_starts[0] >= 1.0);
            prop_assert!(layout.row_starts[0] >= 1.0);
            for pair in layout.column_starts.windows(2) {
                prop_assert!(pair[1] >= pair[0] + layout.brick_width + 1.0);
            }
            for pair in layout.row_starts.windows(2) {
                prop_assert!(pair[1] >= pair[0] + layout.brick_height + 1.0);
            }
        }
    }
}
