//! Brick field: the live bricks of a level plus its grid bookkeeping
//!
//! Bricks are kept in storage (row-major load) order. Collisions test them
//! in that order and the first overlap wins.

use super::entities::{Ball, Brick};
use super::layout::BrickLayout;
use super::levels::{dimensions, template};
use crate::geom::Rect;

/// Padding added around bricks when testing ball overlap
pub const BRICK_PADDING: f32 = 1.0;
/// Half-width of a closed seam beyond the gap it covers
const SEAM_THICKNESS: f32 = 0.5;

/// Outcome of testing one ball against the field
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrickContact {
    Miss,
    /// Hit a brick that survived
    Damaged,
    /// Hit and removed a brick
    Destroyed(Brick),
}

#[derive(Debug, Clone, Default)]
pub struct BrickField {
    pub bricks: Vec<Brick>,
    pub layout: BrickLayout,
    /// `alive[row][col]` for the seam rule
    alive: Vec<Vec<bool>>,
    remaining_destructible: u32,
}

impl BrickField {
    /// Build the bricks for a character layout
    pub fn load(rows: &[&str], panel_w: i32, panel_h: i32, paddle_y: f32) -> Self {
        let (row_count, col_count) = dimensions(rows);
        let layout = BrickLayout::compute(panel_w, panel_h, paddle_y, row_count, col_count);
        let mut field = Self {
            bricks: Vec::new(),
            alive: vec![vec![false; col_count]; row_count],
            layout,
            remaining_destructible: 0,
        };
        if row_count == 0 || col_count == 0 {
            return field;
        }

        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().take(col_count).enumerate() {
                let Some(t) = template(ch) else {
                    continue;
                };
                field.bricks.push(Brick {
                    rect: Rect::new(
                        field.layout.column_starts[col],
                        field.layout.row_starts[row],
                        field.layout.brick_width,
                        field.layout.brick_height,
                    ),
                    color: t.color,
                    hit_points: t.hit_points,
                    max_hit_points: t.hit_points,
                    indestructible: t.indestructible,
                    row,
                    col,
                });
                field.alive[row][col] = true;
                if !t.indestructible {
                    field.remaining_destructible += 1;
                }
            }
        }
        field
    }

    pub fn remaining_destructible(&self) -> u32 {
        self.remaining_destructible
    }

    /// Live recount of destructible bricks
    pub fn live_destructible(&self) -> usize {
        self.bricks.iter().filter(|b| !b.indestructible).count()
    }

    /// Counter, recount or emptiness says the level is done
    pub fn is_cleared(&self) -> bool {
        self.remaining_destructible == 0 || self.live_destructible() == 0 || self.bricks.is_empty()
    }

    pub fn is_alive(&self, row: usize, col: usize) -> bool {
        self.alive
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// Remove a brick by index, updating the counter and grid
    pub fn remove(&mut self, index: usize) -> Brick {
        let brick = self.bricks.remove(index);
        if let Some(cell) = self.alive.get_mut(brick.row).and_then(|r| r.get_mut(brick.col)) {
            *cell = false;
        }
        if !brick.indestructible {
            self.remaining_destructible = self.remaining_destructible.saturating_sub(1);
        }
        log::debug!(
            "Brick ({}, {}) destroyed, {} destructible remaining",
            brick.row,
            brick.col,
            self.remaining_destructible
        );
        brick
    }

    /// Resolve the first brick the ball overlaps
    ///
    /// Bounces along the axis of least penetration unless `piercing` lets
    /// the ball pass through a destructible brick.
    pub fn collide_ball(&mut self, ball: &mut Ball, piercing: bool) -> BrickContact {
        let ball_edges = ball.rect.edges();
        let Some(index) = self
            .bricks
            .iter()
            .position(|b| ball_edges.overlaps(&b.rect.padded(BRICK_PADDING)))
        else {
            return BrickContact::Miss;
        };

        let brick = &mut self.bricks[index];
        if !piercing || brick.indestructible {
            let b = brick.rect.padded(BRICK_PADDING);
            let overlap_left = ball_edges.right - b.left;
            let overlap_right = b.right - ball_edges.left;
            let overlap_top = ball_edges.bottom - b.top;
            let overlap_bottom = b.bottom - ball_edges.top;

            if overlap_left.min(overlap_right) < overlap_top.min(overlap_bottom) {
                if overlap_left < overlap_right {
                    ball.dir.x = -ball.dir.x.abs();
                    ball.rect.x = b.left - ball.rect.width;
                } else {
                    ball.dir.x = ball.dir.x.abs();
                    ball.rect.x = b.right;
                }
            } else if overlap_top < overlap_bottom {
                ball.dir.y = -ball.dir.y.abs();
                ball.rect.y = b.top - ball.rect.height;
            } else {
                ball.dir.y = ball.dir.y.abs();
                ball.rect.y = b.bottom;
            }
        }

        if brick.take_hit(piercing) {
            BrickContact::Destroyed(self.remove(index))
        } else {
            BrickContact::Damaged
        }
    }

    /// Treat the gap between two live neighbours as solid
    ///
    /// Returns true if the ball was reflected.
    pub fn seam_bounce(&self, ball: &mut Ball) -> bool {
        let cols = self.layout.cols();
        if self.layout.rows() == 0 || cols <= 1 {
            return false;
        }
        let center_x = ball.rect.center_x();
        let brick_w = self.layout.brick_width;

        for (row, &top) in self.layout.row_starts.iter().enumerate() {
            let bottom = top + self.layout.brick_height;
            if ball.rect.bottom() < top || ball.rect.top() > bottom {
                continue;
            }
            for col in 0..cols - 1 {
                if !(self.is_alive(row, col) && self.is_alive(row, col + 1)) {
                    continue;
                }
                let closed_start = self.layout.column_starts[col] + brick_w - SEAM_THICKNESS;
                let closed_end = self.layout.column_starts[col + 1] + SEAM_THICKNESS;
                if center_x >= closed_start && center_x <= closed_end {
                    if ball.dir.y > 0.0 {
                        ball.dir.y = -ball.dir.y.abs();
                        ball.rect.y = top - ball.rect.height;
                    } else {
                        ball.dir.y = ball.dir.y.abs();
                        ball.rect.y = bottom;
                    }
                    return true;
                }
            }
        }
        false
    }

    /// Brick a laser tip crosses moving from `prev_y` up to `new_y`
    ///
    /// Picks the lowest brick whose bottom edge lies in the swept span.
    pub fn laser_target(&self, x: f32, prev_y: f32, new_y: f32) -> Option<usize> {
        self.bricks
            .iter()
            .enumerate()
            .filter(|(_, b)| x >= b.rect.left() && x <= b.rect.right())
            .filter(|(_, b)| b.rect.bottom() < prev_y && b.rect.bottom() >= new_y)
            .fold(None, |best: Option<(usize, f32)>, (i, b)| match best {
                Some((_, bottom)) if bottom >= b.rect.bottom() => best,
                _ => Some((i, b.rect.bottom())),
            })
            .map(|(i, _)| i)
    }
}
