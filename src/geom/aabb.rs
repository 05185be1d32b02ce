//! Axis-aligned bounding box

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::circle::Circle2D;

/// 2D axis-aligned bounding box
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AABB2D {
    pub min: Vec2,
    pub max: Vec2,
}

impl AABB2D {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Smallest box holding every point (empty box at the origin for no points)
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };
        let mut aabb = Self::new(first, first);
        for p in iter {
            aabb.add_point(p);
        }
        aabb
    }

    /// A degenerate box (min == max) counts as empty
    pub fn is_empty(&self) -> bool {
        self.min == self.max
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// min, max, then the two mixed corners
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            self.max,
            Vec2::new(self.min.x, self.max.y),
            Vec2::new(self.max.x, self.min.y),
        ]
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Grow to include a point
    pub fn add_point(&mut self, p: Vec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn add_aabb(&mut self, other: &AABB2D) {
        self.add_point(other.max);
        self.add_point(other.min);
    }

    pub fn add_circle(&mut self, circle: &Circle2D) {
        let r = Vec2::splat(circle.radius);
        self.min = self.min.min(circle.center - r);
        self.max = self.max.max(circle.center + r);
    }
}
