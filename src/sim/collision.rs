//! Axis-aligned bounding boxes with signed padding
//!
//! World space has `y` growing upward from the bottom of the playfield, so a
//! box is anchored at its bottom-left corner. Padding is applied to both boxes:
//! positive padding shrinks the overlap test (forgiving near-misses), negative
//! padding grows it (generous pickups).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box from its bottom-left corner and size
    pub fn from_bottom_left(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Overlap test with `padding` applied to every edge of both boxes
    pub fn overlaps_padded(&self, other: &Aabb, padding: f32) -> bool {
        self.min.x + padding < other.max.x - padding
            && self.max.x - padding > other.min.x + padding
            && self.min.y + padding < other.max.y - padding
            && self.max.y - padding > other.min.y + padding
    }

    /// Horizontal-only overlap with `inset` trimmed from this box's sides
    pub fn overlaps_x_inset(&self, other: &Aabb, inset: f32) -> bool {
        self.min.x + inset < other.max.x && self.max.x - inset > other.min.x
    }
}
