//! Body-part node data
//!
//! Every node carries a [`Placement`]: its world transform plus the local
//! translation and rotations that were composed into it. The local frame is
//! `T(translation) * Ry(y) * Rz(z)` applied on the right of the parent frame,
//! so replacing a local property is `world * old_local⁻¹ * new_local`.

use std::fmt;

use glam::{Mat4, Vec2, Vec3, Vec4};

use super::anim::MultiLerp;
use crate::geom::BoundingLines;

/// Generational handle to a node in a [`super::BodyPartTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "part#{}v{}", self.index, self.generation)
    }
}

/// Opaque white
pub const WHITE: Vec4 = Vec4::ONE;
pub const RED: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);

/// World transform and the local properties composed into it
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub world: Mat4,
    pub local_translation: Vec3,
    /// Radians
    pub local_z_rotation: f32,
    /// Radians
    pub local_y_rotation: f32,
    pub translation_anim: MultiLerp<Vec3>,
    pub z_rotation_anim: MultiLerp<f32>,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            world: Mat4::IDENTITY,
            local_translation: Vec3::ZERO,
            local_z_rotation: 0.0,
            local_y_rotation: 0.0,
            translation_anim: MultiLerp::new(Vec3::ZERO),
            z_rotation_anim: MultiLerp::new(0.0),
        }
    }
}

fn local_matrix(translation: Vec3, y_rotation: f32, z_rotation: f32) -> Mat4 {
    Mat4::from_translation(translation) * Mat4::from_rotation_y(y_rotation) * Mat4::from_rotation_z(z_rotation)
}

fn local_inverse(translation: Vec3, y_rotation: f32, z_rotation: f32) -> Mat4 {
    Mat4::from_rotation_z(-z_rotation) * Mat4::from_rotation_y(-y_rotation) * Mat4::from_translation(-translation)
}

impl Placement {
    /// Replace the local properties, recomposing the world transform.
    /// Returns the change transform (`new_world * old_world⁻¹`) for children.
    pub fn set_local(&mut self, translation: Vec3, y_rotation: f32, z_rotation: f32) -> Mat4 {
        let old_world = self.world;
        self.world = old_world
            * local_inverse(self.local_translation, self.local_y_rotation, self.local_z_rotation)
            * local_matrix(translation, y_rotation, z_rotation);
        self.local_translation = translation;
        self.local_y_rotation = y_rotation;
        self.local_z_rotation = z_rotation;
        self.world * old_world.inverse()
    }

    /// World-space pre-multiplication
    #[inline]
    pub fn premultiply(&mut self, m: &Mat4) {
        self.world = *m * self.world;
    }

    pub fn translation(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }
}

/// Collidable leaf state
#[derive(Debug, Clone, PartialEq)]
pub struct LeafPart {
    pub local_bounds: BoundingLines,
    /// `local_bounds` pushed through the world transform
    pub world_bounds: BoundingLines,
    pub destroyed: bool,
    pub colour_anim: MultiLerp<Vec4>,
    pub collision_velocity: Vec2,
    pub external_animation_velocity: Vec2,
}

impl LeafPart {
    pub fn new(local_bounds: BoundingLines, world: &Mat4) -> Self {
        let world_bounds = local_bounds.transformed(world);
        Self {
            local_bounds,
            world_bounds,
            destroyed: false,
            colour_anim: MultiLerp::new(WHITE),
            collision_velocity: Vec2::ZERO,
            external_animation_velocity: Vec2::ZERO,
        }
    }

    pub fn refresh_world_bounds(&mut self, world: &Mat4) {
        self.world_bounds = self.local_bounds.transformed(world);
    }

    pub fn colour(&self) -> Vec4 {
        self.colour_anim.value()
    }
}

/// Life and damage bookkeeping for a weakpoint
#[derive(Debug, Clone, PartialEq)]
pub struct WeakpointState {
    pub total_life: f32,
    pub life: f32,
    pub damage_on_ball_hit: f32,
    /// Seconds of invulnerability left
    pub invulnerable_timer: f32,
    pub invulnerable_secs: f32,
}

impl WeakpointState {
    pub fn new(life: f32, damage_on_ball_hit: f32, invulnerable_secs: f32) -> Self {
        Self {
            total_life: life,
            life,
            damage_on_ball_hit,
            invulnerable_timer: 0.0,
            invulnerable_secs,
        }
    }

    #[inline]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_timer > 0.0
    }

    /// Fraction of life left in [0, 1]
    pub fn life_fraction(&self) -> f32 {
        if self.total_life <= 0.0 {
            return 0.0;
        }
        (self.life / self.total_life).clamp(0.0, 1.0)
    }
}

/// Red to white and back, looping
pub fn flashing_colour_anim() -> MultiLerp<Vec4> {
    let mut anim = MultiLerp::with_keys(vec![0.0, 0.65, 0.67, 1.32], vec![RED, WHITE, WHITE, RED]);
    anim.set_repeat(true);
    anim
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartKind {
    Leaf(LeafPart),
    Weakpoint { leaf: LeafPart, state: WeakpointState },
    Composite(Vec<PartId>),
}

impl PartKind {
    pub fn leaf(&self) -> Option<&LeafPart> {
        match self {
            PartKind::Leaf(leaf) | PartKind::Weakpoint { leaf, .. } => Some(leaf),
            PartKind::Composite(_) => None,
        }
    }

    pub fn leaf_mut(&mut self) -> Option<&mut LeafPart> {
        match self {
            PartKind::Leaf(leaf) | PartKind::Weakpoint { leaf, .. } => Some(leaf),
            PartKind::Composite(_) => None,
        }
    }

    pub fn children(&self) -> &[PartId] {
        match self {
            PartKind::Composite(children) => children,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: PartKind,
    pub placement: Placement,
    pub parent: Option<PartId>,
}
