//! Body-part arena
//!
//! [`BodyPartTree`] owns every node of one or more boss body-part trees and
//! hands out generational [`PartId`]s. Every operation takes the id of the
//! node to act on; composites forward it to their children.
//!
//! Collision resolution in a composite:
//! - ball and ray checks keep the child hit with the smallest time
//! - paddle, bounds and circle checks return the first child hit in child order

use glam::{Mat4, Vec2, Vec3, Vec4};

use super::anim::MultiLerp;
use super::events::{BodyPartEvent, EventSink};
use super::part::{
    LeafPart, Node, PartId, PartKind, Placement, WHITE, WeakpointState, flashing_colour_anim,
};
use crate::config::CollisionConfig;
use crate::consts::EPSILON;
use crate::error::{BlammoError, BlammoResult};
use crate::geom::{AABB2D, BoundingLines, Circle2D, Ray2D, SweptHit};

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug, Clone, Default)]
pub struct BodyPartTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    config: CollisionConfig,
}

impl BodyPartTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CollisionConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    // --- Arena plumbing ---

    fn get(&self, id: PartId) -> BlammoResult<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(BlammoError::UnknownPart(id))
    }

    fn get_mut(&mut self, id: PartId) -> BlammoResult<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(BlammoError::UnknownPart(id))
    }

    fn insert(&mut self, node: Node) -> PartId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return PartId { index, generation: slot.generation };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot { generation: 0, node: Some(node) });
        PartId { index, generation: 0 }
    }

    /// Free a whole subtree; its ids go stale
    fn drop_subtree(&mut self, id: PartId) {
        let children = match self.get(id) {
            Ok(node) => node.kind.children().to_vec(),
            Err(_) => return,
        };
        for child in children {
            self.drop_subtree(child);
        }
        let slot = &mut self.slots[id.index as usize];
        slot.node = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
    }

    fn leaf(&self, id: PartId) -> BlammoResult<&LeafPart> {
        self.get(id)?.kind.leaf().ok_or(BlammoError::NotALeaf(id))
    }

    // --- Structure ---

    pub fn add_leaf(&mut self, local_bounds: BoundingLines) -> PartId {
        let placement = Placement::default();
        let leaf = LeafPart::new(local_bounds, &placement.world);
        self.insert(Node { kind: PartKind::Leaf(leaf), placement, parent: None })
    }

    /// A leaf with life points that flashes until destroyed
    pub fn add_weakpoint(&mut self, local_bounds: BoundingLines, life: f32, damage_on_ball_hit: f32) -> PartId {
        let placement = Placement::default();
        let mut leaf = LeafPart::new(local_bounds, &placement.world);
        leaf.colour_anim = flashing_colour_anim();
        let state = WeakpointState::new(life, damage_on_ball_hit, self.config.weakpoint_invulnerable_secs);
        self.insert(Node { kind: PartKind::Weakpoint { leaf, state }, placement, parent: None })
    }

    /// A composite owning `children`, which must all be unattached
    pub fn add_composite(&mut self, children: Vec<PartId>) -> BlammoResult<PartId> {
        let id = self.insert(Node {
            kind: PartKind::Composite(Vec::new()),
            placement: Placement::default(),
            parent: None,
        });
        if let Err(err) = self.set_children(id, children) {
            self.drop_subtree(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Replace a composite's children. Previous children left out of the new
    /// list are dropped together with their subtrees.
    pub fn set_children(&mut self, composite: PartId, children: Vec<PartId>) -> BlammoResult<()> {
        let previous = match &self.get(composite)?.kind {
            PartKind::Composite(previous) => previous.clone(),
            _ => return Err(BlammoError::NotAComposite(composite)),
        };

        for (i, &child) in children.iter().enumerate() {
            let node = self.get(child)?;
            if let Some(parent) = node.parent {
                if parent != composite {
                    return Err(BlammoError::AlreadyAttached { part: child, parent });
                }
            }
            if children[..i].contains(&child) {
                return Err(BlammoError::AlreadyAttached { part: child, parent: composite });
            }
            if child == composite || self.is_ancestor(child, composite) {
                return Err(BlammoError::WouldCreateCycle { parent: composite, child });
            }
        }

        for old in previous.into_iter().filter(|old| !children.contains(old)) {
            self.drop_subtree(old);
        }
        for &child in &children {
            self.get_mut(child)?.parent = Some(composite);
        }
        log::debug!("{} now has {} children", composite, children.len());
        self.get_mut(composite)?.kind = PartKind::Composite(children);
        Ok(())
    }

    /// Remove a part and its whole subtree, detaching it from its parent
    pub fn remove(&mut self, id: PartId) -> BlammoResult<()> {
        if let Some(parent) = self.get(id)?.parent {
            if let PartKind::Composite(children) = &mut self.get_mut(parent)?.kind {
                children.retain(|&c| c != id);
            }
        }
        self.drop_subtree(id);
        log::debug!("removed {}", id);
        Ok(())
    }

    pub fn contains(&self, id: PartId) -> bool {
        self.get(id).is_ok()
    }

    pub fn parent_of(&self, id: PartId) -> BlammoResult<Option<PartId>> {
        Ok(self.get(id)?.parent)
    }

    pub fn children(&self, id: PartId) -> BlammoResult<&[PartId]> {
        Ok(self.get(id)?.kind.children())
    }

    pub fn kind(&self, id: PartId) -> BlammoResult<&PartKind> {
        Ok(&self.get(id)?.kind)
    }

    /// Whether `ancestor` sits above `id` in its tree
    fn is_ancestor(&self, ancestor: PartId, id: PartId) -> bool {
        let mut current = self.get(id).ok().and_then(|n| n.parent);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.get(parent).ok().and_then(|n| n.parent);
        }
        false
    }

    /// `id` is `part`, or holds it as a direct child (or any descendant when
    /// `recursive`)
    pub fn is_or_contains_part(&self, id: PartId, part: PartId, recursive: bool) -> BlammoResult<bool> {
        let node = self.get(id)?;
        if id == part {
            return Ok(true);
        }
        let children = node.kind.children();
        if children.contains(&part) {
            return Ok(true);
        }
        if recursive {
            for &child in children {
                if self.is_or_contains_part(child, part, true)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// The composite within `root`'s subtree that directly holds `part`
    pub fn search_for_parent(&self, root: PartId, part: PartId) -> BlammoResult<Option<PartId>> {
        self.get(root)?;
        let Some(parent) = self.get(part)?.parent else {
            return Ok(None);
        };
        if self.is_or_contains_part(root, parent, true)? {
            Ok(Some(parent))
        } else {
            Ok(None)
        }
    }

    // --- Collision ---

    /// Swept ball test. Returns the hit leaf and the earliest hit.
    pub fn collide_with_ball(
        &self,
        id: PartId,
        dt: f32,
        ball: &Circle2D,
        velocity: Vec2,
    ) -> BlammoResult<Option<(PartId, SweptHit)>> {
        let node = self.get(id)?;
        let hit = match &node.kind {
            PartKind::Composite(children) => {
                let mut best: Option<(PartId, SweptHit)> = None;
                for &child in children {
                    if let Some((part, hit)) = self.collide_with_ball(child, dt, ball, velocity)? {
                        if best.as_ref().is_none_or(|(_, b)| hit.time < b.time) {
                            best = Some((part, hit));
                        }
                    }
                }
                best
            }
            kind => kind.leaf().and_then(|leaf| {
                let line_velocity = Self::leaf_collision_velocity(leaf, &node.placement);
                leaf.world_bounds
                    .collide_moving(dt, ball, velocity, line_velocity, &self.config)
                    .map(|hit| (id, hit))
            }),
        };
        if let Some((part, hit)) = &hit {
            log::debug!("ball hit {} under {} at t={:.4}", part, id, hit.time);
        }
        Ok(hit)
    }

    /// Static overlap with the paddle's bounding box
    pub fn collide_with_paddle(&self, id: PartId, paddle: &BoundingLines) -> BlammoResult<Option<PartId>> {
        let aabb = paddle.generate_aabb_from_lines();
        self.first_leaf_hit(id, &|leaf: &LeafPart| leaf.world_bounds.collision_check_aabb(&aabb))
    }

    /// Nearest leaf along the ray and the ray distance to it
    pub fn collide_with_ray(&self, id: PartId, ray: &Ray2D) -> BlammoResult<Option<(PartId, f32)>> {
        let node = self.get(id)?;
        match &node.kind {
            PartKind::Composite(children) => {
                let mut best: Option<(PartId, f32)> = None;
                for &child in children {
                    if let Some((part, t)) = self.collide_with_ray(child, ray)? {
                        if best.is_none_or(|(_, b)| t < b) {
                            best = Some((part, t));
                        }
                    }
                }
                Ok(best)
            }
            kind => Ok(kind
                .leaf()
                .and_then(|leaf| leaf.world_bounds.collision_check_ray(ray))
                .map(|t| (id, t))),
        }
    }

    pub fn collide_with_bounds(&self, id: PartId, lines: &BoundingLines) -> BlammoResult<Option<PartId>> {
        self.first_leaf_hit(id, &|leaf: &LeafPart| leaf.world_bounds.collision_check_lines(lines))
    }

    pub fn collide_with_circle(&self, id: PartId, circle: &Circle2D) -> BlammoResult<Option<PartId>> {
        self.first_leaf_hit(id, &|leaf: &LeafPart| leaf.world_bounds.collision_check_circle(circle))
    }

    fn first_leaf_hit(&self, id: PartId, test: &dyn Fn(&LeafPart) -> bool) -> BlammoResult<Option<PartId>> {
        match &self.get(id)?.kind {
            PartKind::Composite(children) => {
                for &child in children {
                    if let Some(hit) = self.first_leaf_hit(child, test)? {
                        return Ok(Some(hit));
                    }
                }
                Ok(None)
            }
            kind => Ok(kind.leaf().filter(|leaf| test(leaf)).map(|_| id)),
        }
    }

    fn leaf_collision_velocity(leaf: &LeafPart, placement: &Placement) -> Vec2 {
        leaf.collision_velocity + placement.translation_anim.dxdt().truncate() + leaf.external_animation_velocity
    }

    /// Velocity the part's lines move with during ball tests
    pub fn collision_velocity(&self, id: PartId) -> BlammoResult<Vec2> {
        let node = self.get(id)?;
        let leaf = node.kind.leaf().ok_or(BlammoError::NotALeaf(id))?;
        Ok(Self::leaf_collision_velocity(leaf, &node.placement))
    }

    /// Rate the node's own translation animation is moving it at. Children
    /// only feel it once it is handed down as external velocity.
    pub fn local_translation_velocity(&self, id: PartId) -> BlammoResult<Vec2> {
        Ok(self.get(id)?.placement.translation_anim.dxdt().truncate())
    }

    // --- World-space transforms ---

    pub fn translate(&mut self, id: PartId, t: Vec3) -> BlammoResult<()> {
        self.transform(id, &Mat4::from_translation(t))
    }

    /// Radians
    pub fn rotate_y(&mut self, id: PartId, angle: f32) -> BlammoResult<()> {
        if angle.abs() < EPSILON {
            return self.get(id).map(|_| ());
        }
        self.transform(id, &Mat4::from_rotation_y(angle))
    }

    /// Radians
    pub fn rotate_z(&mut self, id: PartId, angle: f32) -> BlammoResult<()> {
        if angle.abs() < EPSILON {
            return self.get(id).map(|_| ());
        }
        self.transform(id, &Mat4::from_rotation_z(angle))
    }

    /// Pre-multiply the world transform of the whole subtree by `m`
    pub fn transform(&mut self, id: PartId, m: &Mat4) -> BlammoResult<()> {
        self.get_mut(id)?.placement.premultiply(m);
        self.after_world_change(id, m)
    }

    /// Bring a node's dependants in line after its world transform changed
    /// by `change`
    fn after_world_change(&mut self, id: PartId, change: &Mat4) -> BlammoResult<()> {
        let node = self.get_mut(id)?;
        let world = node.placement.world;
        let children = match &mut node.kind {
            PartKind::Composite(children) => children.clone(),
            kind => {
                if let Some(leaf) = kind.leaf_mut() {
                    leaf.refresh_world_bounds(&world);
                }
                return Ok(());
            }
        };
        for child in children {
            self.transform(child, change)?;
        }
        Ok(())
    }

    // --- Local transforms ---

    fn set_local(
        &mut self,
        id: PartId,
        f: impl FnOnce(&Placement) -> (Vec3, f32, f32),
    ) -> BlammoResult<()> {
        let placement = &mut self.get_mut(id)?.placement;
        let (translation, y_rotation, z_rotation) = f(placement);
        let change = placement.set_local(translation, y_rotation, z_rotation);
        self.after_world_change(id, &change)
    }

    pub fn set_local_translation(&mut self, id: PartId, t: Vec3) -> BlammoResult<()> {
        self.set_local(id, |p| (t, p.local_y_rotation, p.local_z_rotation))
    }

    /// Radians
    pub fn set_local_z_rotation(&mut self, id: PartId, z: f32) -> BlammoResult<()> {
        self.set_local(id, |p| (p.local_translation, p.local_y_rotation, z))
    }

    /// Radians
    pub fn set_local_y_rotation(&mut self, id: PartId, y: f32) -> BlammoResult<()> {
        self.set_local(id, |p| (p.local_translation, y, p.local_z_rotation))
    }

    /// Translation and Z rotation (radians) in one step
    pub fn set_local_transform(&mut self, id: PartId, t: Vec3, z: f32) -> BlammoResult<()> {
        self.set_local(id, |p| (t, p.local_y_rotation, z))
    }

    pub fn animate_local_translation(&mut self, id: PartId, anim: MultiLerp<Vec3>) -> BlammoResult<()> {
        self.get_mut(id)?.placement.translation_anim = anim;
        Ok(())
    }

    pub fn clear_local_translation_animation(&mut self, id: PartId) -> BlammoResult<()> {
        let anim = &mut self.get_mut(id)?.placement.translation_anim;
        anim.clear();
        anim.set_value(Vec3::ZERO);
        anim.set_repeat(false);
        Ok(())
    }

    /// Radians
    pub fn animate_local_z_rotation(&mut self, id: PartId, anim: MultiLerp<f32>) -> BlammoResult<()> {
        self.get_mut(id)?.placement.z_rotation_anim = anim;
        Ok(())
    }

    pub fn clear_local_z_rotation_animation(&mut self, id: PartId) -> BlammoResult<()> {
        let anim = &mut self.get_mut(id)?.placement.z_rotation_anim;
        anim.clear();
        anim.set_value(0.0);
        anim.set_repeat(false);
        Ok(())
    }

    pub fn world_transform(&self, id: PartId) -> BlammoResult<Mat4> {
        Ok(self.get(id)?.placement.world)
    }

    // --- Bounds ---

    pub fn local_bounds(&self, id: PartId) -> BlammoResult<&BoundingLines> {
        Ok(&self.leaf(id)?.local_bounds)
    }

    /// Replace a leaf's bounds by value
    pub fn set_local_bounds(&mut self, id: PartId, bounds: BoundingLines) -> BlammoResult<()> {
        let node = self.get_mut(id)?;
        let world = node.placement.world;
        let leaf = node.kind.leaf_mut().ok_or(BlammoError::NotALeaf(id))?;
        leaf.local_bounds = bounds;
        leaf.refresh_world_bounds(&world);
        Ok(())
    }

    pub fn world_bounds(&self, id: PartId) -> BlammoResult<&BoundingLines> {
        Ok(&self.leaf(id)?.world_bounds)
    }

    /// Box around the world bounds; composites union their non-empty children
    pub fn generate_world_aabb(&self, id: PartId) -> BlammoResult<AABB2D> {
        match &self.get(id)?.kind {
            PartKind::Composite(children) => {
                let mut aabb: Option<AABB2D> = None;
                for &child in children {
                    let child_aabb = self.generate_world_aabb(child)?;
                    if child_aabb.is_empty() {
                        continue;
                    }
                    aabb = Some(match aabb {
                        Some(mut total) => {
                            total.add_aabb(&child_aabb);
                            total
                        }
                        None => child_aabb,
                    });
                }
                Ok(aabb.unwrap_or_default())
            }
            kind => Ok(kind
                .leaf()
                .map(|leaf| leaf.world_bounds.generate_aabb_from_lines())
                .unwrap_or_default()),
        }
    }

    // --- Destruction ---

    /// Leaves report their flag; composites need every child destroyed
    pub fn is_destroyed(&self, id: PartId) -> BlammoResult<bool> {
        match &self.get(id)?.kind {
            PartKind::Composite(children) => {
                for &child in children {
                    if !self.is_destroyed(child)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            kind => Ok(kind.leaf().is_some_and(|leaf| leaf.destroyed)),
        }
    }

    pub fn set_destroyed(&mut self, id: PartId) -> BlammoResult<()> {
        let children = match &mut self.get_mut(id)?.kind {
            PartKind::Composite(children) => children.clone(),
            kind => {
                if let Some(leaf) = kind.leaf_mut() {
                    leaf.destroyed = true;
                }
                return Ok(());
            }
        };
        for child in children {
            self.set_destroyed(child)?;
        }
        Ok(())
    }

    // --- Colour and velocity, forwarded to every leaf ---

    fn for_each_leaf(&mut self, id: PartId, f: &mut dyn FnMut(PartId, &mut PartKind)) -> BlammoResult<()> {
        let children = match &mut self.get_mut(id)?.kind {
            PartKind::Composite(children) => children.clone(),
            kind => {
                f(id, kind);
                return Ok(());
            }
        };
        for child in children {
            self.for_each_leaf(child, f)?;
        }
        Ok(())
    }

    pub fn animate_colour(&mut self, id: PartId, anim: MultiLerp<Vec4>) -> BlammoResult<()> {
        self.for_each_leaf(id, &mut |_: PartId, kind: &mut PartKind| {
            if let Some(leaf) = kind.leaf_mut() {
                leaf.colour_anim = anim.clone();
            }
        })
    }

    /// Back to plain white. Counts as the colour animation finishing.
    pub fn reset_colour_animation(&mut self, id: PartId, sink: &mut dyn EventSink) -> BlammoResult<()> {
        self.for_each_leaf(id, &mut |part: PartId, kind: &mut PartKind| {
            if let Some(leaf) = kind.leaf_mut() {
                leaf.colour_anim.clear();
                leaf.colour_anim.set_value(WHITE);
                leaf.colour_anim.set_repeat(false);
            }
            Self::colour_animation_finished(part, kind, sink);
        })
    }

    fn colour_animation_finished(part: PartId, kind: &mut PartKind, sink: &mut dyn EventSink) {
        sink.emit(BodyPartEvent::ColourAnimationFinished(part));
        if let PartKind::Weakpoint { leaf, .. } = kind {
            if !leaf.destroyed {
                leaf.colour_anim = flashing_colour_anim();
            }
        }
    }

    pub fn colour(&self, id: PartId) -> BlammoResult<Vec4> {
        Ok(self.leaf(id)?.colour())
    }

    pub fn set_collision_velocity(&mut self, id: PartId, v: Vec2) -> BlammoResult<()> {
        self.for_each_leaf(id, &mut |_: PartId, kind: &mut PartKind| {
            if let Some(leaf) = kind.leaf_mut() {
                leaf.collision_velocity = v;
            }
        })
    }

    pub fn set_external_animation_velocity(&mut self, id: PartId, v: Vec2) -> BlammoResult<()> {
        self.for_each_leaf(id, &mut |_: PartId, kind: &mut PartKind| {
            if let Some(leaf) = kind.leaf_mut() {
                leaf.external_animation_velocity = v;
            }
        })
    }

    // --- Weakpoints ---

    pub fn weakpoint(&self, id: PartId) -> BlammoResult<&WeakpointState> {
        match &self.get(id)?.kind {
            PartKind::Weakpoint { state, .. } => Ok(state),
            _ => Err(BlammoError::NotAWeakpoint(id)),
        }
    }

    /// Damage from a ball strike
    pub fn apply_ball_hit(&mut self, id: PartId, sink: &mut dyn EventSink) -> BlammoResult<()> {
        let amount = self.weakpoint(id)?.damage_on_ball_hit;
        self.damage(id, amount, sink)
    }

    /// Take `amount` life. Ignored while invulnerable or destroyed, or for
    /// non-positive amounts.
    pub fn damage(&mut self, id: PartId, amount: f32, sink: &mut dyn EventSink) -> BlammoResult<()> {
        let PartKind::Weakpoint { leaf, state } = &mut self.get_mut(id)?.kind else {
            return Err(BlammoError::NotAWeakpoint(id));
        };
        if leaf.destroyed || state.is_invulnerable() || amount <= 0.0 {
            return Ok(());
        }

        state.life = (state.life - amount).max(0.0);
        sink.emit(BodyPartEvent::Hurt { part: id, life_remaining: state.life });

        if state.life <= 0.0 {
            leaf.destroyed = true;
            state.invulnerable_timer = 0.0;
            log::debug!("weakpoint {} destroyed", id);
            sink.emit(BodyPartEvent::Destroyed(id));
        } else {
            state.invulnerable_timer = state.invulnerable_secs;
        }
        Ok(())
    }

    // --- Time ---

    /// Advance animations and timers for the whole subtree
    pub fn tick(&mut self, id: PartId, dt: f32, sink: &mut dyn EventSink) -> BlammoResult<()> {
        self.tick_placement(id, dt)?;

        let node = self.get_mut(id)?;
        let children = match &mut node.kind {
            PartKind::Composite(children) => children.clone(),
            kind => {
                let finished = match &mut *kind {
                    PartKind::Weakpoint { leaf, state } => {
                        state.invulnerable_timer = (state.invulnerable_timer - dt).max(0.0);
                        Self::tick_colour(leaf, dt)
                    }
                    PartKind::Leaf(leaf) => Self::tick_colour(leaf, dt),
                    PartKind::Composite(_) => false,
                };
                if finished {
                    Self::colour_animation_finished(id, kind, sink);
                }
                return Ok(());
            }
        };
        for child in children {
            self.tick(child, dt, sink)?;
        }
        Ok(())
    }

    /// True on the tick the colour animation reaches its end
    fn tick_colour(leaf: &mut LeafPart, dt: f32) -> bool {
        let running = !leaf.colour_anim.is_finished();
        leaf.colour_anim.tick(dt) && running
    }

    /// Drive the local transform from the translation and Z rotation animations
    fn tick_placement(&mut self, id: PartId, dt: f32) -> BlammoResult<()> {
        let p = &mut self.get_mut(id)?.placement;
        let rotating = !p.z_rotation_anim.is_finished();
        let translating = !p.translation_anim.is_finished();
        if !rotating && !translating {
            return Ok(());
        }

        p.z_rotation_anim.tick(dt);
        p.translation_anim.tick(dt);
        let t = if translating { p.translation_anim.value() } else { p.local_translation };
        let z = if rotating { p.z_rotation_anim.value() } else { p.local_z_rotation };
        self.set_local(id, |p| (t, p.local_y_rotation, z))
    }
}
