//! Circles and swept circle-circle collision
//!
//! The circle the method is called on is always the *target*; the circle
//! passed in is the *mover* (usually the ball).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::segment::LineSeg2D;
use crate::consts::EPSILON;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Circle2D {
    pub center: Vec2,
    pub radius: f32,
}

/// Result of a swept circle-circle test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleHit {
    /// Unit normal from the target centre towards the mover at contact
    pub normal: Vec2,
    /// Short tangent segment at the contact point, for reflecting the mover
    pub collision_line: LineSeg2D,
    /// Seconds from the start of the step until first contact. Negative when
    /// the mover already overlaps the target and is moving further in.
    pub time_until_collision: f32,
    /// Mover centre at contact
    pub mover_center: Vec2,
    /// Target centre at contact
    pub target_center: Vec2,
}

impl Circle2D {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Swept test of `mover` travelling at `velocity` for `dt` seconds
    /// against this stationary circle.
    pub fn collide(&self, dt: f32, mover: &Circle2D, velocity: Vec2) -> Option<CircleHit> {
        let (collision_dist, mover_at) = self.collision_point(dt, mover, velocity)?;
        let time = collision_dist / velocity.length();
        Some(Self::contact(mover, mover_at, self.center, time))
    }

    /// Swept test where both circles move during the step.
    ///
    /// Solved in the target's frame with the relative velocity, then both
    /// centres are advanced by the same fraction of their own displacement.
    pub fn collide_moving(
        &self,
        dt: f32,
        mover: &Circle2D,
        mover_velocity: Vec2,
        target_velocity: Vec2,
    ) -> Option<CircleHit> {
        if target_velocity.length_squared() <= EPSILON * EPSILON {
            return self.collide(dt, mover, mover_velocity);
        }

        let relative_velocity = mover_velocity - target_velocity;
        let (collision_dist, _) = self.collision_point(dt, mover, relative_velocity)?;
        let move_dist = relative_velocity.length() * dt;
        let time = (collision_dist / move_dist) * dt;

        let mover_at = mover.center + time * mover_velocity;
        let target_at = self.center + time * target_velocity;
        Some(Self::contact(mover, mover_at, target_at, time))
    }

    /// Distance the mover travels before touching this circle and the mover
    /// centre at that moment.
    fn collision_point(&self, dt: f32, mover: &Circle2D, velocity: Vec2) -> Option<(f32, Vec2)> {
        debug_assert!(mover.radius > 0.0, "mover radius must be positive");

        let move_vec = velocity * dt;
        let move_dist = move_vec.length();
        if move_dist <= EPSILON {
            return None;
        }

        let to_target = self.center - mover.center;
        let dist = to_target.length();
        let sum_radii = self.radius + mover.radius;

        // Cannot close the gap this step
        if move_dist < dist - sum_radii {
            return None;
        }

        let move_dir = move_vec / move_dist;
        let d = move_dir.dot(to_target);
        if d <= 0.0 {
            return None;
        }

        // Squared distance between the target centre and the mover's path
        let f = dist * dist - d * d;
        let sum_radii_sq = sum_radii * sum_radii;
        if f >= sum_radii_sq {
            return None;
        }

        let t = sum_radii_sq - f;
        if t < 0.0 {
            return None;
        }

        let collision_dist = d - t.sqrt();
        if collision_dist > move_dist {
            return None;
        }

        Some((collision_dist, mover.center + collision_dist * move_dir))
    }

    fn contact(mover: &Circle2D, mover_at: Vec2, target_at: Vec2, time: f32) -> CircleHit {
        let normal = (mover_at - target_at).normalize_or_zero();
        let line_pos = mover_at - mover.radius * normal;
        let tangent = normal.perp();
        CircleHit {
            normal,
            collision_line: LineSeg2D::new(line_pos - tangent, line_pos + tangent),
            time_until_collision: time,
            mover_center: mover_at,
            target_center: target_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_head_on_collision_time_and_normal() {
        let target = Circle2D::new(Vec2::new(5.0, 0.0), 1.0);
        let ball = Circle2D::new(Vec2::ZERO, 1.0);

        let hit = target.collide(0.5, &ball, Vec2::new(10.0, 0.0)).expect("should hit");
        assert!((hit.time_until_collision - 0.3).abs() < 1e-5);
        assert!((hit.normal - Vec2::NEG_X).length() < 1e-5);
        assert!((hit.mover_center - Vec2::new(3.0, 0.0)).length() < 1e-5);

        // Tangent segment is centred on the contact surface and perpendicular to the normal
        let mid = hit.collision_line.midpoint();
        assert!((mid - Vec2::new(4.0, 0.0)).length() < 1e-5);
        assert!(hit.collision_line.direction().dot(hit.normal).abs() < 1e-5);
    }

    #[test]
    fn test_short_step_misses() {
        let target = Circle2D::new(Vec2::new(5.0, 0.0), 1.0);
        let ball = Circle2D::new(Vec2::ZERO, 1.0);
        assert!(target.collide(0.1, &ball, Vec2::new(10.0, 0.0)).is_none());
    }

    #[test]
    fn test_moving_away_misses() {
        let target = Circle2D::new(Vec2::new(5.0, 0.0), 1.0);
        let ball = Circle2D::new(Vec2::ZERO, 1.0);
        assert!(target.collide(1.0, &ball, Vec2::new(-10.0, 0.0)).is_none());
    }

    #[test]
    fn test_passing_wide_misses() {
        let target = Circle2D::new(Vec2::new(5.0, 3.0), 1.0);
        let ball = Circle2D::new(Vec2::ZERO, 1.0);
        assert!(target.collide(1.0, &ball, Vec2::new(10.0, 0.0)).is_none());
    }

    #[test]
    fn test_two_movers_meet() {
        let target = Circle2D::new(Vec2::new(6.0, 0.0), 1.0);
        let ball = Circle2D::new(Vec2::ZERO, 1.0);

        // Closing speed 4, gap 4 → contact after 1 s
        let hit = target
            .collide_moving(2.0, &ball, Vec2::new(2.0, 0.0), Vec2::new(-2.0, 0.0))
            .expect("should hit");
        assert!((hit.time_until_collision - 1.0).abs() < 1e-5);
        assert!((hit.mover_center - Vec2::new(2.0, 0.0)).length() < 1e-5);
        assert!((hit.target_center - Vec2::new(4.0, 0.0)).length() < 1e-5);
        assert!((hit.normal - Vec2::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_stationary_target_matches_single_mover() {
        let target = Circle2D::new(Vec2::new(5.0, 0.0), 1.0);
        let ball = Circle2D::new(Vec2::ZERO, 1.0);
        let v = Vec2::new(10.0, 0.0);
        assert_eq!(target.collide_moving(0.5, &ball, v, Vec2::ZERO), target.collide(0.5, &ball, v));
    }

    #[test]
    fn test_stationary_mover_hit_by_moving_target() {
        let target = Circle2D::new(Vec2::new(5.0, 0.0), 1.0);
        let ball = Circle2D::new(Vec2::ZERO, 1.0);

        let hit = target
            .collide_moving(1.0, &ball, Vec2::ZERO, Vec2::new(-6.0, 0.0))
            .expect("target runs into the ball");
        assert!((hit.time_until_collision - 0.5).abs() < 1e-5);
        assert_eq!(hit.mover_center, Vec2::ZERO);
        assert!((hit.target_center - Vec2::new(2.0, 0.0)).length() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_zero_velocity_never_collides(
            tx in -20.0f32..20.0, ty in -20.0f32..20.0, tr in 0.1f32..5.0,
            mx in -20.0f32..20.0, my in -20.0f32..20.0, mr in 0.1f32..5.0,
            dt in 0.0f32..2.0,
        ) {
            let target = Circle2D::new(Vec2::new(tx, ty), tr);
            let mover = Circle2D::new(Vec2::new(mx, my), mr);
            prop_assert!(target.collide(dt, &mover, Vec2::ZERO).is_none());
        }

        #[test]
        fn prop_gap_beyond_travel_never_collides(
            tr in 0.1f32..5.0, mr in 0.1f32..5.0,
            angle in 0.0f32..std::f32::consts::TAU,
            speed in 0.1f32..20.0, dt in 0.01f32..1.0,
            extra in 0.01f32..10.0,
        ) {
            let travel = speed * dt;
            let dist = tr + mr + travel + extra;
            let dir = Vec2::from_angle(angle);
            let target = Circle2D::new(dir * dist, tr);
            let mover = Circle2D::new(Vec2::ZERO, mr);
            prop_assert!(target.collide(dt, &mover, dir * speed).is_none());
        }
    }
}
