//! Axis-aligned rectangles and the push-out collision used by every moving
//! entity.
//!
//! Resolution is done one axis at a time: move along X, snap against every
//! overlapping obstacle, then do the same along Y using the already-displaced
//! box.  This gives wall sliding instead of diagonal tunneling and is the
//! behaviour the rest of the simulation is tuned against.

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        Self {
            x: center.x - size.x / 2.0,
            y: center.y - size.y / 2.0,
            w: size.x,
            h: size.y,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    /// Grow (positive) or shrink (negative) around the same centre.
    /// Dimensions never go below zero.
    pub fn inflate(&self, dw: f32, dh: f32) -> Rect {
        let w = (self.w + dw).max(0.0);
        let h = (self.h + dh).max(0.0);
        Rect::from_center(self.center(), Vec2::new(w, h))
    }

    /// Strict overlap: rectangles that only share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x < self.right() && p.y >= self.top() && p.y < self.bottom()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Snap `hitbox` out of every obstacle it overlaps along `axis`.  `delta` is
/// the displacement just applied on that axis; its sign picks the leading
/// edge.  A zero delta leaves the box untouched.
pub fn resolve_axis(hitbox: &mut Rect, axis: Axis, delta: f32, obstacles: &[Rect]) {
    for obstacle in obstacles {
        if !obstacle.overlaps(hitbox) {
            continue;
        }
        match axis {
            Axis::Horizontal => {
                if delta > 0.0 {
                    hitbox.x = obstacle.left() - hitbox.w;
                }
                if delta < 0.0 {
                    hitbox.x = obstacle.right();
                }
            }
            Axis::Vertical => {
                if delta > 0.0 {
                    hitbox.y = obstacle.top() - hitbox.h;
                }
                if delta < 0.0 {
                    hitbox.y = obstacle.bottom();
                }
            }
        }
    }
}

/// Move `hitbox` by `displacement`, X first then Y, resolving against
/// `obstacles` after each axis.
pub fn move_and_collide(hitbox: &mut Rect, displacement: Vec2, obstacles: &[Rect]) {
    hitbox.x += displacement.x;
    resolve_axis(hitbox, Axis::Horizontal, displacement.x, obstacles);
    hitbox.y += displacement.y;
    resolve_axis(hitbox, Axis::Vertical, displacement.y, obstacles);
}
