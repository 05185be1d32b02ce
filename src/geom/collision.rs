//! Collision math library
//!
//! Stateless tests and distance queries between the primitives. Distances are
//! squared wherever the caller only compares against a squared radius.
//!
//! Boundary conventions worth knowing:
//! - AABBs that merely touch along an edge DO collide.
//! - [`segments_collide`] is the classic proper-intersection test. Collinear
//!   overlapping segments (all signed areas zero) are reported as a miss.

use glam::Vec2;

use super::aabb::AABB2D;
use super::circle::Circle2D;
use super::ray::Ray2D;
use super::segment::LineSeg2D;
use crate::consts::EPSILON;

/// Twice the signed area of triangle abc: positive if abc winds
/// counter-clockwise, negative if clockwise, zero if degenerate.
#[inline]
pub fn signed_2d_tri_area(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (a.x - c.x) * (b.y - c.y) - (a.y - c.y) * (b.x - c.x)
}

/// Squared distance from a point to a segment
pub fn sq_dist_point_to_segment(seg: &LineSeg2D, pt: Vec2) -> f32 {
    let ab = seg.p2 - seg.p1;
    let ac = pt - seg.p1;
    let bc = pt - seg.p2;

    // pt projects before p1
    let e = ac.dot(ab);
    if e <= EPSILON {
        return ac.dot(ac);
    }

    // pt projects past p2
    let f = ab.dot(ab);
    if e >= f {
        return bc.dot(bc);
    }

    (ac.dot(ac) - e * e / f).abs()
}

/// Squared distance from a point to an AABB (zero when inside)
pub fn sq_dist_point_to_aabb(aabb: &AABB2D, pt: Vec2) -> f32 {
    let below = (aabb.min - pt).max(Vec2::ZERO);
    let above = (pt - aabb.max).max(Vec2::ZERO);
    below.length_squared() + above.length_squared()
}

/// AABB overlap on both axes; touching edges count as a collision
#[inline]
pub fn aabbs_collide(a: &AABB2D, b: &AABB2D) -> bool {
    if a.max.x < b.min.x || a.min.x > b.max.x {
        return false;
    }
    if a.max.y < b.min.y || a.min.y > b.max.y {
        return false;
    }
    true
}

/// Static circle overlap (touching counts)
#[inline]
pub fn circles_collide(c1: &Circle2D, c2: &Circle2D) -> bool {
    let radius_sum = c1.radius + c2.radius;
    c1.center.distance_squared(c2.center) <= radius_sum * radius_sum
}

#[inline]
pub fn aabb_circle_collide(aabb: &AABB2D, circle: &Circle2D) -> bool {
    sq_dist_point_to_aabb(aabb, circle.center) <= circle.radius * circle.radius
}

/// Signed areas for the straddle test, `None` when l2 does not straddle l1
/// or l1 does not straddle l2
fn straddle_areas(l1: &LineSeg2D, l2: &LineSeg2D) -> Option<(f32, f32)> {
    let a1 = signed_2d_tri_area(l1.p1, l1.p2, l2.p2);
    let a2 = signed_2d_tri_area(l1.p1, l1.p2, l2.p1);
    if a1 == 0.0 || a2 == 0.0 || a1 * a2 >= 0.0 {
        return None;
    }

    // a4 = a3 + a2 - a1 saves a fourth area computation
    let a3 = signed_2d_tri_area(l2.p1, l2.p2, l1.p1);
    let a4 = a3 + a2 - a1;
    if a3 == 0.0 || a4 == 0.0 || a3 * a4 >= 0.0 {
        return None;
    }
    Some((a3, a4))
}

/// Whether two segments properly intersect (each straddles the other)
#[inline]
pub fn segments_collide(l1: &LineSeg2D, l2: &LineSeg2D) -> bool {
    straddle_areas(l1, l2).is_some()
}

/// Intersection point of two properly intersecting segments
pub fn segment_intersection_point(l1: &LineSeg2D, l2: &LineSeg2D) -> Option<Vec2> {
    let (a3, a4) = straddle_areas(l1, l2)?;
    let t = a3 / (a3 - a4);
    Some(l1.p1 + t * (l1.p2 - l1.p1))
}

/// First point along `seg` (from p1) that lies on or inside `circle`
pub fn circle_segment_point(circle: &Circle2D, seg: &LineSeg2D) -> Option<Vec2> {
    let length = seg.length();
    if length <= EPSILON {
        return None;
    }
    let d = seg.direction() / length;

    let m = seg.p1 - circle.center;
    let b = m.dot(d);
    let c = m.dot(m) - circle.radius * circle.radius;

    // p1 outside the circle and pointing away
    if c > 0.0 && b > 0.0 {
        return None;
    }

    let discr = b * b - c;
    if discr < 0.0 {
        return None;
    }

    let t = (-b - discr.sqrt()).max(0.0);
    if t > length {
        return None;
    }
    Some(seg.p1 + t * d)
}

/// Slab test. Returns the entry distance along the ray (0 if the origin is
/// inside the box).
pub fn ray_aabb(ray: &Ray2D, aabb: &AABB2D) -> Option<f32> {
    let origin = ray.origin.to_array();
    let dir = ray.direction().to_array();
    let min = aabb.min.to_array();
    let max = aabb.max.to_array();

    let mut t_min = 0.0f32;
    let mut t_max = f32::MAX;

    for i in 0..2 {
        if dir[i].abs() < EPSILON {
            // Parallel to this slab: must already be inside it
            if origin[i] < min[i] || origin[i] > max[i] {
                return None;
            }
        } else {
            let ood = 1.0 / dir[i];
            let mut t1 = (min[i] - origin[i]) * ood;
            let mut t2 = (max[i] - origin[i]) * ood;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
    }

    Some(t_min)
}

/// First point of `seg` (from p1) inside the box
pub fn aabb_segment_point(aabb: &AABB2D, seg: &LineSeg2D) -> Option<Vec2> {
    let length = seg.length();
    if length <= EPSILON {
        return aabb.contains(seg.p1).then_some(seg.p1);
    }
    let ray = Ray2D::new(seg.p1, seg.direction() / length);
    let t = ray_aabb(&ray, aabb)?;
    (t >= 0.0 && t <= length).then(|| ray.point_at(t))
}

#[inline]
pub fn segment_aabb_collide(seg: &LineSeg2D, aabb: &AABB2D) -> bool {
    aabb_segment_point(aabb, seg).is_some()
}

/// Where a ray crosses a segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySegmentHit {
    /// Distance along the ray
    pub ray_t: f32,
    /// Parameter along the segment (0 at p1, 1 at p2)
    pub line_t: f32,
}

/// Ray against segment. Parallel rays never hit; the segment parameter is
/// allowed a hair of slack at either end so shared corners are not missed.
pub fn ray_segment(ray: &Ray2D, seg: &LineSeg2D) -> Option<RaySegmentHit> {
    let d1 = seg.p2 - seg.p1;
    let d0 = ray.direction();

    let perp_d1 = Vec2::new(d1.y, -d1.x);
    let denom = perp_d1.dot(d0);
    if denom.abs() < EPSILON {
        return None;
    }

    let perp_d0 = Vec2::new(d0.y, -d0.x);
    let offset = seg.p1 - ray.origin;
    let ray_t = perp_d1.dot(offset) / denom;
    let line_t = perp_d0.dot(offset) / denom;

    (ray_t >= 0.0 && (-EPSILON..=1.0 + EPSILON).contains(&line_t))
        .then_some(RaySegmentHit { ray_t, line_t })
}

/// Ray against circle. Returns the entry distance, clamped to 0 when the
/// origin starts inside.
pub fn ray_circle(ray: &Ray2D, circle: &Circle2D) -> Option<f32> {
    let m = ray.origin - circle.center;
    let b = m.dot(ray.direction());
    let c = m.dot(m) - circle.radius * circle.radius;

    if c > 0.0 && b > 0.0 {
        return None;
    }

    let discr = b * b - c;
    if discr < 0.0 {
        return None;
    }

    Some((-b - discr.sqrt()).max(0.0))
}

/// Projection parameter of `pt` onto `seg`, unclamped
#[inline]
fn projection_t(pt: Vec2, seg: &LineSeg2D) -> f32 {
    let dir = seg.direction();
    let len_sq = dir.length_squared();
    if len_sq <= 0.0 {
        return 0.0;
    }
    (pt - seg.p1).dot(dir) / len_sq
}

/// Closest point on a segment to `pt`
pub fn closest_point_on_segment(pt: Vec2, seg: &LineSeg2D) -> Vec2 {
    let t = projection_t(pt, seg).clamp(0.0, 1.0);
    seg.p1 + t * seg.direction()
}

/// Like [`closest_point_on_segment`], also reporting whether the projection
/// landed on the segment without clamping
pub fn closest_point_on_segment_strict(pt: Vec2, seg: &LineSeg2D) -> (Vec2, bool) {
    let t = projection_t(pt, seg);
    let on_segment = (0.0..=1.0).contains(&t);
    (seg.p1 + t.clamp(0.0, 1.0) * seg.direction(), on_segment)
}

/// Closest points between two segments.
/// Returns (squared distance, point on `seg1`, point on `seg2`).
pub fn closest_points_between_segments(seg1: &LineSeg2D, seg2: &LineSeg2D) -> (f32, Vec2, Vec2) {
    let d1 = seg1.direction();
    let d2 = seg2.direction();
    let r = seg1.p1 - seg2.p1;

    let a = d1.dot(d1);
    let e = d2.dot(d2);
    let f = d2.dot(r);

    let (s, t);
    if a <= EPSILON && e <= EPSILON {
        // Both segments are points
        return (seg1.p1.distance_squared(seg2.p1), seg1.p1, seg2.p1);
    }

    if a <= EPSILON {
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = d1.dot(r);
        if e <= EPSILON {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;

            // Parallel segments: pick any s, here 0
            let s0 = if denom != 0.0 {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };

            let t0 = (b * s0 + f) / e;
            if t0 < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t0 > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            } else {
                t = t0;
                s = s0;
            }
        }
    }

    let pt1 = seg1.p1 + s * d1;
    let pt2 = seg2.p1 + t * d2;
    (pt1.distance_squared(pt2), pt1, pt2)
}
