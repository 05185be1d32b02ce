//! 2D geometry and collision
//!
//! Everything here is pure: no rendering, no game state, no globals.
//! Points and vectors are both `glam::Vec2`; the role is in the name.

pub mod aabb;
pub mod bounding_lines;
pub mod circle;
pub mod collision;
pub mod ray;
pub mod segment;

pub use aabb::AABB2D;
pub use bounding_lines::{Bound, BoundingLines, SweptHit};
pub use circle::{Circle2D, CircleHit};
pub use collision::{
    RaySegmentHit, aabb_circle_collide, aabb_segment_point, aabbs_collide, circle_segment_point,
    circles_collide, closest_point_on_segment, closest_point_on_segment_strict,
    closest_points_between_segments, ray_aabb, ray_circle, ray_segment, segment_aabb_collide,
    segment_intersection_point, segments_collide, signed_2d_tri_area, sq_dist_point_to_aabb,
    sq_dist_point_to_segment,
};
pub use ray::Ray2D;
pub use segment::LineSeg2D;
