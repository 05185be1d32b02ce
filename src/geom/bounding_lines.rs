//! Polyline collision surfaces
//!
//! A [`BoundingLines`] is an ordered list of segments, each paired with an
//! outward normal and an `on_inside` flag. Insertion order is identity:
//! indices returned by the queries refer to it, and removal is by geometric
//! equality of the segment.
//!
//! The swept test treats the moving circle's path over one step as a capsule
//! and probes it against each segment with rays along the centre path and
//! both side edges. Hits are refined to the first touching distance either
//! analytically or by binary search.

use glam::{Mat4, Vec2};
use serde::{Deserialize, Serialize};

use super::aabb::AABB2D;
use super::circle::Circle2D;
use super::collision::{
    aabb_segment_point, circle_segment_point, closest_point_on_segment, ray_segment,
    segment_aabb_collide, segment_intersection_point, segments_collide, sq_dist_point_to_segment,
};
use super::ray::Ray2D;
use super::segment::LineSeg2D;
use crate::config::CollisionConfig;
use crate::consts::EPSILON;
use crate::rotate_vec2;

/// One boundary segment with its outward normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub line: LineSeg2D,
    pub normal: Vec2,
    /// Hidden behind another part; ignored by the swept ball test
    pub on_inside: bool,
}

/// Result of a swept circle test against a [`BoundingLines`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweptHit {
    /// Unit normal, blended across simultaneous hits
    pub normal: Vec2,
    /// Short tangent segment through the contact on the surface
    pub collision_line: LineSeg2D,
    /// Seconds from the start of the step until contact
    pub time: f32,
    /// Length of the step that was tested
    pub dt: f32,
    /// Circle centre at contact
    pub point: Vec2,
    /// Index of the earliest line hit
    pub line_index: usize,
}

impl SweptHit {
    /// Seconds between contact and the end of the step
    #[inline]
    pub fn time_since_collision(&self) -> f32 {
        self.dt - self.time
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingLines {
    bounds: Vec<Bound>,
}

impl BoundingLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from parallel slices of lines and normals (all outside)
    pub fn from_lines(lines: &[LineSeg2D], normals: &[Vec2]) -> Self {
        Self::from_lines_with_inside(lines, normals, &vec![false; lines.len()])
    }

    pub fn from_lines_with_inside(lines: &[LineSeg2D], normals: &[Vec2], on_inside: &[bool]) -> Self {
        assert_eq!(lines.len(), normals.len(), "every line needs a normal");
        assert_eq!(lines.len(), on_inside.len(), "every line needs an inside flag");
        let bounds = lines
            .iter()
            .zip(normals)
            .zip(on_inside)
            .map(|((&line, &normal), &on_inside)| Bound { line, normal, on_inside })
            .collect();
        Self { bounds }
    }

    pub fn from_bounds(bounds: Vec<Bound>) -> Self {
        Self { bounds }
    }

    /// Closed polygon through `points` (counter-clockwise for outward normals)
    pub fn polygon(points: &[Vec2]) -> Self {
        let mut lines = Self::new();
        for (i, &p1) in points.iter().enumerate() {
            let p2 = points[(i + 1) % points.len()];
            let line = LineSeg2D::new(p1, p2);
            lines.add_bound(line, line.normal_to_line(), false);
        }
        lines
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bound> {
        self.bounds.iter()
    }

    pub fn lines(&self) -> impl Iterator<Item = &LineSeg2D> {
        self.bounds.iter().map(|b| &b.line)
    }

    /// Panics if `i` is out of range
    pub fn line(&self, i: usize) -> &LineSeg2D {
        &self.bounds[i].line
    }

    /// Panics if `i` is out of range
    pub fn normal(&self, i: usize) -> Vec2 {
        self.bounds[i].normal
    }

    /// Panics if `i` is out of range
    pub fn is_on_inside(&self, i: usize) -> bool {
        self.bounds[i].on_inside
    }

    // --- Mutation ---

    pub fn add_bound(&mut self, line: LineSeg2D, normal: Vec2, on_inside: bool) {
        self.bounds.push(Bound { line, normal, on_inside });
    }

    /// Append every bound of `other`
    pub fn add_bounds(&mut self, other: &BoundingLines) {
        self.bounds.extend_from_slice(&other.bounds);
    }

    /// Remove the first bound whose segment equals `line`
    pub fn remove_bound(&mut self, line: &LineSeg2D) -> bool {
        match self.bounds.iter().position(|b| b.line == *line) {
            Some(i) => {
                self.bounds.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.bounds.clear();
    }

    /// Panics if `i` is out of range
    pub fn set_bound_inside(&mut self, i: usize, on_inside: bool) {
        self.bounds[i].on_inside = on_inside;
    }

    pub fn set_all_bounds_inside(&mut self, on_inside: bool) {
        for bound in &mut self.bounds {
            bound.on_inside = on_inside;
        }
    }

    // --- Rigid transforms ---

    /// Rotate lines around `center` and normals about the origin
    pub fn rotate_lines_and_normals(&mut self, angle: f32, center: Vec2) {
        for bound in &mut self.bounds {
            bound.line.rotate(angle, center);
            bound.normal = rotate_vec2(bound.normal, angle);
        }
    }

    pub fn translate_bounds(&mut self, translation: Vec2) {
        for bound in &mut self.bounds {
            bound.line.translate(translation);
        }
    }

    /// Mirror across the y-axis
    pub fn reflect_x(&mut self) {
        for bound in &mut self.bounds {
            bound.line.reflect_x();
            bound.normal.x = -bound.normal.x;
        }
    }

    /// Copy pushed through a rigid 3D transform (z is dropped)
    pub fn transformed(&self, transform: &Mat4) -> Self {
        let bounds = self
            .bounds
            .iter()
            .map(|b| {
                let mut line = b.line;
                line.transform(transform);
                let normal = transform
                    .transform_vector3(b.normal.extend(0.0))
                    .truncate()
                    .normalize_or_zero();
                Bound { line, normal, on_inside: b.on_inside }
            })
            .collect();
        Self { bounds }
    }

    // --- Derived volumes ---

    /// Box around every endpoint (default box when empty)
    pub fn generate_aabb_from_lines(&self) -> AABB2D {
        AABB2D::from_points(self.lines().flat_map(|l| [l.p1, l.p2]))
    }

    /// Circle through the two extreme endpoints along whichever axis spans
    /// further. Cheap, not minimal.
    pub fn generate_circle_from_lines(&self) -> Circle2D {
        let Some(first) = self.bounds.first() else {
            return Circle2D::new(Vec2::ZERO, 0.0);
        };

        let start = first.line.p1;
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (start, start, start, start);
        for p in self.lines().flat_map(|l| [l.p1, l.p2]) {
            if p.x < min_x.x {
                min_x = p;
            }
            if p.x > max_x.x {
                max_x = p;
            }
            if p.y < min_y.y {
                min_y = p;
            }
            if p.y > max_y.y {
                max_y = p;
            }
        }

        let (min, max) = if max_y.distance_squared(min_y) > max_x.distance_squared(min_x) {
            (min_y, max_y)
        } else {
            (min_x, max_x)
        };
        let center = 0.5 * (min + max);
        Circle2D::new(center, max.distance(center))
    }

    // --- Static queries ---

    /// Closest point on any line to `pt` (`pt` itself when empty)
    pub fn closest_point(&self, pt: Vec2) -> Vec2 {
        self.lines()
            .map(|line| closest_point_on_segment(pt, line))
            .min_by(|a, b| a.distance_squared(pt).total_cmp(&b.distance_squared(pt)))
            .unwrap_or(pt)
    }

    /// Half-plane test against every line: inside means strictly behind all
    /// of the outward normals. Only meaningful for convex outlines.
    pub fn is_inside(&self, pt: Vec2) -> bool {
        self.bounds.iter().all(|b| {
            let mut from_line = pt - b.line.p1;
            if from_line == Vec2::ZERO {
                from_line = pt - b.line.p2;
            }
            from_line.dot(b.normal) < 0.0
        })
    }

    /// Static overlap with a circle (touching counts)
    pub fn collision_check_circle(&self, circle: &Circle2D) -> bool {
        let r_sq = circle.radius * circle.radius;
        self.lines()
            .any(|line| closest_point_on_segment(circle.center, line).distance_squared(circle.center) <= r_sq)
    }

    pub fn collision_check_aabb(&self, aabb: &AABB2D) -> bool {
        self.lines().any(|line| segment_aabb_collide(line, aabb))
    }

    pub fn collision_check_lines(&self, other: &BoundingLines) -> bool {
        self.collision_check_index(other).is_some()
    }

    pub fn collision_check_segment(&self, seg: &LineSeg2D) -> bool {
        self.lines().any(|line| segments_collide(line, seg))
    }

    /// Index of the first line in `self` crossing any line of `other`
    pub fn collision_check_index(&self, other: &BoundingLines) -> Option<usize> {
        self.lines()
            .position(|mine| other.lines().any(|theirs| segments_collide(mine, theirs)))
    }

    /// Every line index in `self` crossing some line of `other`, ascending
    pub fn collision_check_indices(&self, other: &BoundingLines) -> Vec<usize> {
        self.lines()
            .enumerate()
            .filter(|(_, mine)| other.lines().any(|theirs| segments_collide(mine, theirs)))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn collision_check_segment_indices(&self, seg: &LineSeg2D) -> Vec<usize> {
        self.lines()
            .enumerate()
            .filter(|(_, line)| segments_collide(line, seg))
            .map(|(i, _)| i)
            .collect()
    }

    /// Indices of the line(s) nearest `pt`. Lines whose squared distance is
    /// within `tolerance` of the best so far are kept alongside it.
    pub fn closest_collision_indices(&self, pt: Vec2, tolerance: f32) -> Vec<usize> {
        let mut closest_sq_dist = f32::MAX;
        let mut indices = Vec::new();
        for (i, line) in self.lines().enumerate() {
            let sq_dist = sq_dist_point_to_segment(line, pt);
            if sq_dist < closest_sq_dist {
                indices.clear();
                indices.push(i);
                closest_sq_dist = sq_dist;
            } else if (sq_dist - closest_sq_dist).abs() < tolerance {
                indices.push(i);
            }
        }
        indices
    }

    pub fn collision_points_lines(&self, other: &BoundingLines) -> Vec<Vec2> {
        self.lines()
            .flat_map(|mine| other.lines().filter_map(move |theirs| segment_intersection_point(mine, theirs)))
            .collect()
    }

    pub fn collision_points_circle(&self, circle: &Circle2D) -> Vec<Vec2> {
        self.lines().filter_map(|line| circle_segment_point(circle, line)).collect()
    }

    pub fn collision_points_aabb(&self, aabb: &AABB2D) -> Vec<Vec2> {
        self.lines().filter_map(|line| aabb_segment_point(aabb, line)).collect()
    }

    /// Smallest ray parameter over every line hit
    pub fn collision_check_ray(&self, ray: &Ray2D) -> Option<f32> {
        self.lines()
            .filter_map(|line| ray_segment(ray, line))
            .map(|hit| hit.ray_t)
            .min_by(f32::total_cmp)
    }

    // --- Swept circle ---

    /// Swept test of `circle` (its position at the start of the step) moving
    /// at `velocity` for `dt` seconds against these stationary lines.
    pub fn collide(
        &self,
        dt: f32,
        circle: &Circle2D,
        velocity: Vec2,
        config: &CollisionConfig,
    ) -> Option<SweptHit> {
        self.collide_moving(dt, circle, velocity, Vec2::ZERO, config)
    }

    /// Swept test where the lines themselves move at `line_velocity`.
    pub fn collide_moving(
        &self,
        dt: f32,
        circle: &Circle2D,
        velocity: Vec2,
        line_velocity: Vec2,
        config: &CollisionConfig,
    ) -> Option<SweptHit> {
        debug_assert!(circle.radius > 0.0, "swept circle radius must be positive");

        let relative = velocity - line_velocity;
        let move_dist = relative.length() * dt;
        if move_dist <= EPSILON {
            return None;
        }
        let dir = relative * dt / move_dist;

        let hits: Vec<(usize, f32)> = self
            .bounds
            .iter()
            .enumerate()
            .filter(|(_, b)| !b.on_inside)
            .filter_map(|(i, b)| {
                first_contact(&b.line, circle.center, dir, move_dist, circle.radius, config)
                    .map(|dist| (i, dt * dist / move_dist))
            })
            .collect();

        let (first_index, time) = hits.iter().copied().min_by(|a, b| a.1.total_cmp(&b.1))?;

        // Corner smoothing
        let summed: Vec2 = hits
            .iter()
            .filter(|(_, t)| *t - time <= config.simultaneous_hit_epsilon)
            .map(|(i, _)| self.bounds[*i].normal)
            .sum();
        let normal = summed
            .try_normalize()
            .unwrap_or_else(|| self.bounds[first_index].normal.normalize_or_zero());

        let line = &self.bounds[first_index].line;
        let surface = closest_point_on_segment(circle.center + relative * time, line) + line_velocity * time;
        let tangent = normal.perp();

        log::debug!(
            "swept hit on line {} of {} at t={:.4} ({} candidate lines)",
            first_index,
            self.bounds.len(),
            time,
            hits.len()
        );

        Some(SweptHit {
            normal,
            collision_line: LineSeg2D::new(surface + tangent, surface - tangent),
            time,
            dt,
            point: circle.center + velocity * time,
            line_index: first_index,
        })
    }
}

/// Distance along `dir` at which a circle starting at `start` first touches
/// `seg`, if that happens within `move_dist`.
fn first_contact(
    seg: &LineSeg2D,
    start: Vec2,
    dir: Vec2,
    move_dist: f32,
    radius: f32,
    config: &CollisionConfig,
) -> Option<f32> {
    let r_sq = radius * radius;
    let sq_dist_at = |dist: f32| sq_dist_point_to_segment(seg, start + dist * dir);

    // Already embedded, whichever way it is heading
    if sq_dist_at(0.0) <= r_sq {
        return Some(0.0);
    }

    // Smallest distance known to be touching
    let mut hi = f32::INFINITY;

    let centre_ray = Ray2D::new(start, dir);
    if let Some(hit) = ray_segment(&centre_ray, seg) {
        let cos = dir.dot(seg.normal_to_line()).abs();
        if cos > EPSILON {
            let dist = hit.ray_t - radius / cos;
            if (0.0..=move_dist).contains(&dist)
                && sq_dist_at(dist) <= r_sq + config.binary_search_tolerance
            {
                return Some(dist);
            }
        }
        if hit.ray_t <= move_dist {
            hi = hi.min(hit.ray_t);
        }
    }

    // Capsule side edges
    let side = dir.perp() * radius;
    for offset in [side, -side] {
        let ray = Ray2D::new(start + offset, dir);
        if let Some(hit) = ray_segment(&ray, seg) {
            if hit.ray_t <= move_dist {
                hi = hi.min(hit.ray_t);
            }
        }
    }

    // Endpoints inside the capsule body
    for p in [seg.p1, seg.p2] {
        let to_p = p - start;
        let along = to_p.dot(dir);
        if to_p.dot(dir.perp()).abs() <= radius && (0.0..=move_dist).contains(&along) {
            hi = hi.min(along);
        }
    }

    // End cap
    if sq_dist_at(move_dist) <= r_sq {
        hi = hi.min(move_dist);
    }

    if !hi.is_finite() {
        return None;
    }

    let mut lo = 0.0f32;
    let mut iterations = 0;
    loop {
        let mid = 0.5 * (lo + hi);
        let diff = sq_dist_at(mid) - r_sq;
        if diff.abs() <= config.binary_search_tolerance
            || iterations >= config.binary_search_max_iterations
        {
            return Some(mid);
        }
        if diff < 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
        iterations += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

    fn floor() -> BoundingLines {
        BoundingLines::from_lines(
            &[LineSeg2D::new(Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0))],
            &[Vec2::Y],
        )
    }

    /// Square [0, 2] x [0, 2] with outward normals
    fn square() -> BoundingLines {
        BoundingLines::polygon(&[
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(2.0, 2.0),
            Vec2::new(0.0, 2.0),
        ])
    }

    #[test]
    fn test_polygon_normals_point_outward() {
        let sq = square();
        assert_eq!(sq.len(), 4);
        assert!((sq.normal(0) - Vec2::NEG_Y).length() < 1e-6);
        assert!((sq.normal(1) - Vec2::X).length() < 1e-6);
        assert!((sq.normal(2) - Vec2::Y).length() < 1e-6);
        assert!((sq.normal(3) - Vec2::NEG_X).length() < 1e-6);
    }

    #[test]
    fn test_ball_falls_onto_floor() {
        let ball = Circle2D::new(Vec2::new(0.0, 5.0), 0.5);
        let hit = floor()
            .collide(1.0, &ball, Vec2::new(0.0, -10.0), &CollisionConfig::default())
            .expect("should hit the floor");

        assert!((hit.time - 0.45).abs() < 1e-3);
        assert!((hit.time_since_collision() - 0.55).abs() < 1e-3);
        assert!((hit.normal - Vec2::Y).length() < 1e-5);
        assert!((hit.point - Vec2::new(0.0, 0.5)).length() < 1e-2);
        assert_eq!(hit.line_index, 0);
        assert!(hit.collision_line.midpoint().y.abs() < 1e-4);
    }

    #[test]
    fn test_step_too_short_misses() {
        let ball = Circle2D::new(Vec2::new(0.0, 5.0), 0.5);
        let config = CollisionConfig::default();
        assert!(floor().collide(0.4, &ball, Vec2::new(0.0, -10.0), &config).is_none());
        assert!(floor().collide(1.0, &ball, Vec2::ZERO, &config).is_none());
    }

    #[test]
    fn test_moving_lines_use_relative_velocity() {
        let ball = Circle2D::new(Vec2::new(0.0, 5.0), 0.5);
        let hit = floor()
            .collide_moving(1.0, &ball, Vec2::new(0.0, -10.0), Vec2::new(0.0, 10.0), &CollisionConfig::default())
            .expect("closing at 20");
        assert!((hit.time - 0.225).abs() < 1e-3);
        assert!((hit.point - Vec2::new(0.0, 2.75)).length() < 1e-2);
        assert!((hit.collision_line.midpoint().y - 2.25).abs() < 1e-2);

        // Lines keeping pace with the ball never get hit
        assert!(floor()
            .collide_moving(1.0, &ball, Vec2::new(0.0, -10.0), Vec2::new(0.0, -10.0), &CollisionConfig::default())
            .is_none());
    }

    #[test]
    fn test_glancing_hit_near_segment_end() {
        // Centre path misses the segment; only the capsule edge clips its end
        let ball = Circle2D::new(Vec2::new(5.3, 5.0), 0.5);
        let hit = floor()
            .collide(1.0, &ball, Vec2::new(0.0, -10.0), &CollisionConfig::default())
            .expect("edge of the ball clips the endpoint");

        // Touches (5, 0) when the centre is at y = sqrt(0.25 - 0.09) = 0.4
        assert!((hit.time - 0.46).abs() < 2e-3);
    }

    #[test]
    fn test_inside_lines_skipped_by_sweep() {
        let mut lines = floor();
        lines.set_bound_inside(0, true);
        let ball = Circle2D::new(Vec2::new(0.0, 5.0), 0.5);
        assert!(lines.collide(1.0, &ball, Vec2::new(0.0, -10.0), &CollisionConfig::default()).is_none());
        // Static queries still see it
        assert!(lines.collision_check_circle(&Circle2D::new(Vec2::new(0.0, 0.2), 0.5)));
    }

    #[test]
    fn test_start_overlap_collides_immediately() {
        let ball = Circle2D::new(Vec2::new(0.0, 0.3), 0.5);
        let config = CollisionConfig::default();

        let hit = floor().collide(0.1, &ball, Vec2::new(0.0, -1.0), &config).expect("embedded");
        assert_eq!(hit.time, 0.0);
        assert!((hit.time_since_collision() - 0.1).abs() < 1e-6);

        // Still embedded while pulling away; the stepper decides what to do
        let hit = floor().collide(0.1, &ball, Vec2::new(0.0, 1.0), &config).expect("embedded");
        assert_eq!(hit.time, 0.0);
        assert!((hit.normal - Vec2::Y).length() < 1e-6);
    }

    #[test]
    fn test_embedded_ball_sliding_along_line_collides() {
        let ball = Circle2D::new(Vec2::new(0.0, 0.3), 0.5);
        let hit = floor()
            .collide(1.0, &ball, Vec2::new(1.0, 0.0), &CollisionConfig::default())
            .expect("overlapping the floor");
        assert_eq!(hit.time, 0.0);
        assert_eq!(hit.line_index, 0);
        assert!((hit.point - ball.center).length() < 1e-6);
    }

    #[test]
    fn test_embedded_from_back_side_collides() {
        let ball = Circle2D::new(Vec2::new(0.0, -0.3), 0.5);
        let hit = floor()
            .collide(1.0, &ball, Vec2::new(0.0, 1.0), &CollisionConfig::default())
            .expect("overlapping the back of the floor");
        assert_eq!(hit.time, 0.0);
        assert!((hit.normal - Vec2::Y).length() < 1e-6);
    }

    #[test]
    fn test_binary_search_follows_config() {
        // Same glancing setup: contact at t = 0.46, bracket closes at t = 0.5
        let ball = Circle2D::new(Vec2::new(5.3, 5.0), 0.5);
        let velocity = Vec2::new(0.0, -10.0);
        let time_with = |config: CollisionConfig| {
            floor().collide(1.0, &ball, velocity, &config).expect("clips the endpoint").time
        };

        let capped = time_with(CollisionConfig {
            binary_search_max_iterations: 1,
            ..CollisionConfig::default()
        });
        let coarse = time_with(CollisionConfig {
            binary_search_tolerance: 1.0,
            ..CollisionConfig::default()
        });
        let fine = time_with(CollisionConfig::default());

        for t in [capped, coarse, fine] {
            assert!((0.0..=0.5).contains(&t), "time {t} outside the bracket");
        }
        assert!((capped - 0.375).abs() < 1e-4);
        assert!((coarse - 0.4375).abs() < 1e-4);
        assert!((fine - 0.46).abs() < 2e-3);
        assert!((fine - 0.46).abs() < (coarse - 0.46).abs());
        assert!((coarse - 0.46).abs() < (capped - 0.46).abs());
    }

    #[test]
    fn test_corner_hit_blends_normals() {
        let ball = Circle2D::new(Vec2::new(3.0, 3.0), 0.5);
        let velocity = Vec2::new(-10.0, -10.0) * FRAC_1_SQRT_2;
        let hit = square()
            .collide(0.5, &ball, velocity, &CollisionConfig::default())
            .expect("hits the corner");

        let expected = Vec2::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2);
        assert!((hit.normal - expected).length() < 1e-3);
        // Centre is 0.5 from (2, 2) after travelling sqrt(2) - 0.5
        assert!((hit.time - (2.0f32.sqrt() - 0.5) / 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_earliest_line_wins() {
        let lines = BoundingLines::from_lines(
            &[
                LineSeg2D::new(Vec2::new(-5.0, -3.0), Vec2::new(5.0, -3.0)),
                LineSeg2D::new(Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0)),
            ],
            &[Vec2::Y, Vec2::Y],
        );
        let ball = Circle2D::new(Vec2::new(0.0, 5.0), 0.5);
        let hit = lines
            .collide(2.0, &ball, Vec2::new(0.0, -10.0), &CollisionConfig::default())
            .expect("hit");
        assert_eq!(hit.line_index, 1);
    }

    #[test]
    fn test_is_inside_box() {
        let sq = square();
        assert!(sq.is_inside(Vec2::new(1.0, 1.0)));
        assert!(!sq.is_inside(Vec2::new(10.0, 1.0)));
        assert!(!sq.is_inside(Vec2::new(1.0, -0.5)));
        // Vertices sit on two half-planes and are not strictly inside
        assert!(!sq.is_inside(Vec2::ZERO));
    }

    #[test]
    fn test_add_remove_round_trip() {
        let mut lines = square();
        let before = lines.clone();
        let extra = LineSeg2D::new(Vec2::new(5.0, 5.0), Vec2::new(6.0, 5.0));
        lines.add_bound(extra, Vec2::Y, false);
        assert_eq!(lines.len(), 5);
        assert!(lines.remove_bound(&extra));
        assert_eq!(lines, before);
        assert!(!lines.remove_bound(&extra));
    }

    #[test]
    fn test_inside_flags() {
        let mut lines = square();
        lines.set_all_bounds_inside(true);
        assert!(lines.iter().all(|b| b.on_inside));
        lines.set_bound_inside(2, false);
        assert!(!lines.is_on_inside(2));
        assert!(lines.is_on_inside(1));
    }

    #[test]
    fn test_ray_returns_nearest_line() {
        let ray = Ray2D::new(Vec2::new(1.0, -5.0), Vec2::Y);
        let t = square().collision_check_ray(&ray).expect("crosses the square");
        assert!((t - 5.0).abs() < 1e-5);
        assert!(square().collision_check_ray(&Ray2D::new(Vec2::new(5.0, -5.0), Vec2::Y)).is_none());
    }

    #[test]
    fn test_static_checks() {
        let sq = square();
        assert!(sq.collision_check_circle(&Circle2D::new(Vec2::new(2.4, 1.0), 0.5)));
        assert!(!sq.collision_check_circle(&Circle2D::new(Vec2::new(3.0, 1.0), 0.5)));
        // A circle wholly inside touches no line
        assert!(!sq.collision_check_circle(&Circle2D::new(Vec2::new(1.0, 1.0), 0.5)));

        assert!(sq.collision_check_aabb(&AABB2D::new(Vec2::new(1.5, 1.5), Vec2::new(3.0, 3.0))));
        assert!(!sq.collision_check_aabb(&AABB2D::new(Vec2::new(3.0, 3.0), Vec2::new(4.0, 4.0))));

        let diagonal = LineSeg2D::new(Vec2::new(1.0, -1.0), Vec2::new(1.0, 1.0));
        assert!(sq.collision_check_segment(&diagonal));
        assert_eq!(sq.collision_check_segment_indices(&diagonal), vec![0]);
    }

    #[test]
    fn test_lines_vs_lines() {
        let sq = square();
        let mut other = square();
        other.translate_bounds(Vec2::new(1.0, 1.0));

        assert!(sq.collision_check_lines(&other));
        assert_eq!(sq.collision_check_index(&other), Some(1));
        assert_eq!(sq.collision_check_indices(&other), vec![1, 2]);

        let points = sq.collision_points_lines(&other);
        assert_eq!(points.len(), 2);
        assert!(points.iter().any(|p| (*p - Vec2::new(2.0, 1.0)).length() < 1e-5));
        assert!(points.iter().any(|p| (*p - Vec2::new(1.0, 2.0)).length() < 1e-5));

        let mut far = square();
        far.translate_bounds(Vec2::new(10.0, 0.0));
        assert!(!sq.collision_check_lines(&far));
        assert_eq!(sq.collision_check_index(&far), None);
    }

    #[test]
    fn test_collision_points_circle_and_aabb() {
        let sq = square();
        let pts = sq.collision_points_circle(&Circle2D::new(Vec2::new(2.0, 1.0), 0.5));
        assert_eq!(pts.len(), 1);
        assert!((pts[0] - Vec2::new(2.0, 0.5)).length() < 1e-5);

        let pts = sq.collision_points_aabb(&AABB2D::new(Vec2::new(-1.0, 0.5), Vec2::new(0.5, 1.5)));
        assert_eq!(pts.len(), 1);
        assert!((pts[0] - Vec2::new(0.0, 1.5)).length() < 1e-5);
    }

    #[test]
    fn test_closest_point_and_indices() {
        let sq = square();
        let pt = sq.closest_point(Vec2::new(1.0, 5.0));
        assert!((pt - Vec2::new(1.0, 2.0)).length() < 1e-6);
        assert_eq!(BoundingLines::new().closest_point(Vec2::ONE), Vec2::ONE);

        assert_eq!(sq.closest_collision_indices(Vec2::new(1.0, 5.0), 1e-3), vec![2]);
        // Equidistant from the top and right edges
        assert_eq!(sq.closest_collision_indices(Vec2::new(3.0, 3.0), 1e-3), vec![1, 2]);
    }

    #[test]
    fn test_generated_volumes() {
        let sq = square();
        let aabb = sq.generate_aabb_from_lines();
        assert_eq!(aabb, AABB2D::new(Vec2::ZERO, Vec2::new(2.0, 2.0)));

        let circle = sq.generate_circle_from_lines();
        // The y extremes (0, 0) and (2, 2) span further than the x extremes
        assert!((circle.center - Vec2::ONE).length() < 1e-6);
        assert!((circle.radius - 2.0f32.sqrt()).abs() < 1e-6);

        assert_eq!(BoundingLines::new().generate_circle_from_lines().radius, 0.0);
        assert!(BoundingLines::new().generate_aabb_from_lines().is_empty());
    }

    #[test]
    fn test_rotate_lines_and_normals() {
        let mut lines = floor();
        lines.rotate_lines_and_normals(FRAC_PI_2, Vec2::ZERO);
        assert!((lines.normal(0) - Vec2::NEG_X).length() < 1e-5);
        assert!((lines.line(0).p1 - Vec2::new(0.0, -5.0)).length() < 1e-5);
    }

    #[test]
    fn test_reflect_x() {
        let mut lines = square();
        lines.reflect_x();
        assert!((lines.normal(1) - Vec2::NEG_X).length() < 1e-6);
        assert!(lines.is_inside(Vec2::new(-1.0, 1.0)));
    }

    #[test]
    fn test_transformed_moves_lines_and_normals() {
        let m = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)) * Mat4::from_rotation_z(FRAC_PI_2);
        let world = floor().transformed(&m);
        assert!((world.line(0).p1 - Vec2::new(10.0, -5.0)).length() < 1e-4);
        assert!((world.normal(0) - Vec2::NEG_X).length() < 1e-5);
        assert!(!world.is_on_inside(0));
    }

    #[test]
    #[should_panic]
    fn test_mismatched_slices_panic() {
        let _ = BoundingLines::from_lines(&[LineSeg2D::default()], &[]);
    }

    proptest! {
        #[test]
        fn prop_add_then_remove_restores(
            x1 in -10.0f32..10.0, y1 in -10.0f32..10.0,
            x2 in -10.0f32..10.0, y2 in -10.0f32..10.0,
            nx in -1.0f32..1.0, ny in -1.0f32..1.0,
        ) {
            let mut lines = square();
            let before = lines.clone();
            let extra = LineSeg2D::new(Vec2::new(x1, y1), Vec2::new(x2, y2));
            lines.add_bound(extra, Vec2::new(nx, ny), false);
            prop_assert_eq!(lines.len(), before.len() + 1);
            prop_assert!(lines.remove_bound(&extra));
            prop_assert_eq!(lines.len(), before.len());
            // Square edges are untouched unless `extra` equals one of them
            if !before.lines().any(|l| *l == extra) {
                prop_assert_eq!(lines, before);
            }
        }

        #[test]
        fn prop_sweep_zero_velocity_misses(
            x in -10.0f32..10.0, y in -10.0f32..10.0,
            r in 0.1f32..2.0, dt in 0.0f32..2.0,
        ) {
            let ball = Circle2D::new(Vec2::new(x, y), r);
            prop_assert!(square().collide(dt, &ball, Vec2::ZERO, &CollisionConfig::default()).is_none());
        }
    }
}
