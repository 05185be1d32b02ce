//! Blammo Collision - 2D collision core for a breakout-style game
//!
//! Core modules:
//! - `geom`: Primitives, collision math, swept circles and bounding lines
//! - `boss`: Boss body-part tree (transforms, animations, hit resolution)
//! - `config`: Tunable numeric tolerances
//! - `error`: Error type for structural operations

pub mod boss;
pub mod config;
pub mod error;
pub mod geom;

pub use config::CollisionConfig;
pub use error::{BlammoError, BlammoResult};

use glam::Vec2;

/// Collision engine constants
pub mod consts {
    /// General float tolerance for degenerate geometry
    pub const EPSILON: f32 = 1e-5;

    /// Binary search stops once |dist² - r²| is within this value
    pub const BINARY_SEARCH_TOLERANCE: f32 = 0.001;
    /// Hard cap on binary search refinement steps
    pub const BINARY_SEARCH_MAX_ITERATIONS: u32 = 100;

    /// Hits closer together in time than this (seconds) are treated as
    /// simultaneous and have their normals blended
    pub const SIMULTANEOUS_HIT_EPSILON: f32 = 1e-3;

    /// Weakpoints can't be hurt again for this long after a hit (seconds)
    pub const WEAKPOINT_INVULNERABLE_SECS: f32 = 1.5;
}

/// Rotate a vector counter-clockwise by `angle` radians
#[inline]
pub fn rotate_vec2(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Rotate a point counter-clockwise by `angle` radians around `center`
#[inline]
pub fn rotate_point2(p: Vec2, angle: f32, center: Vec2) -> Vec2 {
    center + rotate_vec2(p - center, angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_rotate_vec2_quarter_turn() {
        let v = rotate_vec2(Vec2::X, FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_point2_about_center() {
        let p = rotate_point2(Vec2::new(2.0, 1.0), FRAC_PI_2, Vec2::new(1.0, 1.0));
        assert!((p - Vec2::new(1.0, 2.0)).length() < 1e-6);
    }
}
