//! Line segment geometry
//!
//! A segment has no inherent facing. Outward normals are paired with segments
//! externally (see [`super::BoundingLines`]).

use glam::{Mat4, Vec2};
use serde::{Deserialize, Serialize};

use crate::rotate_point2;

/// A 2D line segment from `p1` to `p2`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LineSeg2D {
    pub p1: Vec2,
    pub p2: Vec2,
}

impl LineSeg2D {
    pub fn new(p1: Vec2, p2: Vec2) -> Self {
        Self { p1, p2 }
    }

    /// Vector from p1 to p2 (not normalized)
    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.p2 - self.p1
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.direction().length()
    }

    #[inline]
    pub fn midpoint(&self) -> Vec2 {
        (self.p1 + self.p2) * 0.5
    }

    /// Unit normal: (p1 - p2) rotated a quarter turn counter-clockwise
    pub fn normal_to_line(&self) -> Vec2 {
        (self.p1 - self.p2).perp().normalize_or_zero()
    }

    /// Rotate both endpoints by `angle` radians around `center`
    pub fn rotate(&mut self, angle: f32, center: Vec2) {
        self.p1 = rotate_point2(self.p1, angle, center);
        self.p2 = rotate_point2(self.p2, angle, center);
    }

    pub fn translate(&mut self, translation: Vec2) {
        self.p1 += translation;
        self.p2 += translation;
    }

    /// Translated copy
    pub fn translated(&self, translation: Vec2) -> Self {
        Self::new(self.p1 + translation, self.p2 + translation)
    }

    /// Mirror across the y-axis
    pub fn reflect_x(&mut self) {
        self.p1.x = -self.p1.x;
        self.p2.x = -self.p2.x;
    }

    /// Push both endpoints through a 3D transform, dropping z
    pub fn transform(&mut self, transform: &Mat4) {
        self.p1 = transform.transform_point3(self.p1.extend(0.0)).truncate();
        self.p2 = transform.transform_point3(self.p2.extend(0.0)).truncate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_normal_to_line() {
        // Segment running right-to-left has its normal pointing up
        let seg = LineSeg2D::new(Vec2::new(1.0, 0.0), Vec2::new(-1.0, 0.0));
        let n = seg.normal_to_line();
        assert!((n - Vec2::Y).length() < 1e-6);
    }

    #[test]
    fn test_rotate_about_center() {
        let mut seg = LineSeg2D::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0));
        seg.rotate(FRAC_PI_2, Vec2::ZERO);
        assert!((seg.p1 - Vec2::new(0.0, 1.0)).length() < 1e-5);
        assert!((seg.p2 - Vec2::new(0.0, 2.0)).length() < 1e-5);

        seg.rotate(PI, Vec2::new(0.0, 1.0));
        assert!((seg.p1 - Vec2::new(0.0, 1.0)).length() < 1e-5);
        assert!((seg.p2 - Vec2::new(0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_reflect_and_translate() {
        let mut seg = LineSeg2D::new(Vec2::new(1.0, 2.0), Vec2::new(3.0, -1.0));
        seg.reflect_x();
        assert_eq!(seg, LineSeg2D::new(Vec2::new(-1.0, 2.0), Vec2::new(-3.0, -1.0)));

        let moved = seg.translated(Vec2::new(1.0, 1.0));
        assert_eq!(moved, LineSeg2D::new(Vec2::new(0.0, 3.0), Vec2::new(-2.0, 0.0)));
    }

    #[test]
    fn test_transform_with_matrix() {
        let mut seg = LineSeg2D::new(Vec2::ZERO, Vec2::X);
        let m = Mat4::from_translation(Vec3::new(5.0, 1.0, 0.0)) * Mat4::from_rotation_z(FRAC_PI_2);
        seg.transform(&m);
        assert!((seg.p1 - Vec2::new(5.0, 1.0)).length() < 1e-5);
        assert!((seg.p2 - Vec2::new(5.0, 2.0)).length() < 1e-5);
    }
}
