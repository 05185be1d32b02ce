//! Rays for line-of-sight and targeting queries

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A ray from `origin` along a unit `direction`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray2D {
    pub origin: Vec2,
    direction: Vec2,
}

impl Ray2D {
    /// `direction` must already be unit length
    pub fn new(origin: Vec2, direction: Vec2) -> Self {
        debug_assert!(
            (direction.length() - 1.0).abs() <= 1e-3,
            "ray direction must be a unit vector, got {direction:?}"
        );
        Self { origin, direction }
    }

    /// Build a ray through `target`, normalizing the direction
    pub fn towards(origin: Vec2, target: Vec2) -> Option<Self> {
        let dir = (target - origin).try_normalize()?;
        Some(Self::new(origin, dir))
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Vec2) {
        debug_assert!((direction.length() - 1.0).abs() <= 1e-3);
        self.direction = direction;
    }

    /// Point `dist` units from the origin
    #[inline]
    pub fn point_at(&self, dist: f32) -> Vec2 {
        self.origin + dist * self.direction
    }
}
