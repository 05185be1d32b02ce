//! Shielded core
//!
//! A [`ShieldRing`] is a core leaf surrounded by four shield faces. The core
//! starts with no bounds since the faces hide it completely. Each destroyed
//! face exposes one sector of the core, and the core's bounds are rebuilt
//! from the set of faces still present.

use std::collections::BTreeSet;
use std::f32::consts::{FRAC_PI_2, PI};

use glam::Vec2;

use super::part::PartId;
use super::tree::BodyPartTree;
use crate::error::BlammoResult;
use crate::geom::{BoundingLines, LineSeg2D};

/// Height where the cap faces meet the side faces
const CORNER_HEIGHT: f32 = 1.167;

/// Top cap face, left to right
const CAP_FACE: [Vec2; 6] = [
    Vec2::new(-2.159, CORNER_HEIGHT),
    Vec2::new(-0.818, 4.517),
    Vec2::new(-0.258, 5.0),
    Vec2::new(0.258, 5.0),
    Vec2::new(0.818, 4.517),
    Vec2::new(2.159, CORNER_HEIGHT),
];

/// Right side face, top to bottom
const SIDE_FACE: [Vec2; 6] = [
    Vec2::new(2.159, CORNER_HEIGHT),
    Vec2::new(2.909, 1.417),
    Vec2::new(4.4, 1.417),
    Vec2::new(4.4, -1.417),
    Vec2::new(2.909, -1.417),
    Vec2::new(2.159, -CORNER_HEIGHT),
];

/// Core sector exposed when the top face goes
const CORE_SECTOR: [Vec2; 4] = [
    Vec2::new(-CORNER_HEIGHT, CORNER_HEIGHT),
    Vec2::new(-0.435, 2.529),
    Vec2::new(0.435, 2.529),
    Vec2::new(CORNER_HEIGHT, CORNER_HEIGHT),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    /// Turn taking the top sector of the core onto this side (radians)
    fn sector_angle(self) -> f32 {
        match self {
            Side::Top => 0.0,
            Side::Bottom => PI,
            Side::Left => FRAC_PI_2,
            Side::Right => -FRAC_PI_2,
        }
    }

    /// Face template and the turn placing it on this side
    fn face_template(self) -> (&'static [Vec2], f32) {
        match self {
            Side::Top => (&CAP_FACE, 0.0),
            Side::Bottom => (&CAP_FACE, PI),
            Side::Right => (&SIDE_FACE, 0.0),
            Side::Left => (&SIDE_FACE, PI),
        }
    }
}

/// Open chain of bounds through `points`, each normal on the left of travel
fn chain(points: &[Vec2]) -> BoundingLines {
    let mut bounds = BoundingLines::new();
    for pair in points.windows(2) {
        let normal = (pair[1] - pair[0]).perp().normalize_or_zero();
        bounds.add_bound(LineSeg2D::new(pair[0], pair[1]), normal, false);
    }
    bounds
}

/// Core bounds for a given set of faces still standing
pub fn core_bounds(present: &BTreeSet<Side>) -> BoundingLines {
    let mut bounds = BoundingLines::new();
    for side in Side::ALL.into_iter().filter(|side| !present.contains(side)) {
        let mut sector = chain(&CORE_SECTOR);
        sector.rotate_lines_and_normals(side.sector_angle(), Vec2::ZERO);
        bounds.add_bounds(&sector);
    }
    bounds
}

#[derive(Debug, Clone)]
pub struct ShieldRing {
    root: PartId,
    core: PartId,
    /// Indexed by `Side as usize`
    faces: [PartId; 4],
    present: BTreeSet<Side>,
}

impl ShieldRing {
    /// Build the core and its four faces as one composite in `tree`
    pub fn build(tree: &mut BodyPartTree) -> BlammoResult<Self> {
        let present: BTreeSet<Side> = Side::ALL.into_iter().collect();
        let core = tree.add_leaf(core_bounds(&present));

        let mut faces = [core; 4];
        for side in Side::ALL {
            let (template, angle) = side.face_template();
            let face = tree.add_leaf(chain(template));
            tree.rotate_z(face, angle)?;
            faces[side as usize] = face;
        }

        let mut children = vec![core];
        children.extend(faces);
        let root = tree.add_composite(children)?;

        Ok(Self { root, core, faces, present })
    }

    /// Composite holding the core and the faces
    pub fn root(&self) -> PartId {
        self.root
    }

    pub fn core(&self) -> PartId {
        self.core
    }

    pub fn face(&self, side: Side) -> PartId {
        self.faces[side as usize]
    }

    /// Which face `part` is, if any
    pub fn side_of(&self, part: PartId) -> Option<Side> {
        Side::ALL.into_iter().find(|&side| self.faces[side as usize] == part)
    }

    pub fn is_present(&self, side: Side) -> bool {
        self.present.contains(&side)
    }

    pub fn present_faces(&self) -> impl Iterator<Item = Side> + '_ {
        self.present.iter().copied()
    }

    /// Every face is gone
    pub fn is_exposed(&self) -> bool {
        self.present.is_empty()
    }

    /// Knock out one face. The face stops colliding and the core sector
    /// behind it gains bounds. Returns false if the face was already gone.
    pub fn destroy_face(&mut self, tree: &mut BodyPartTree, side: Side) -> BlammoResult<bool> {
        if !self.present.remove(&side) {
            return Ok(false);
        }
        let face = self.face(side);
        tree.set_destroyed(face)?;
        tree.set_local_bounds(face, BoundingLines::new())?;
        tree.set_local_bounds(self.core, core_bounds(&self.present))?;
        log::debug!("shield face {:?} ({}) destroyed, {} left", side, face, self.present.len());
        Ok(true)
    }

    /// Knock out whichever face `part` is. False for parts that aren't faces.
    pub fn destroy_part(&mut self, tree: &mut BodyPartTree, part: PartId) -> BlammoResult<bool> {
        match self.side_of(part) {
            Some(side) => self.destroy_face(tree, side),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Circle2D;

    fn ring() -> (BodyPartTree, ShieldRing) {
        let mut tree = BodyPartTree::new();
        let ring = ShieldRing::build(&mut tree).unwrap();
        (tree, ring)
    }

    fn has_bound(bounds: &BoundingLines, normal: Vec2, midpoint: Vec2) -> bool {
        bounds.iter().any(|b| {
            (b.normal - normal).length() < 1e-4 && (b.line.midpoint() - midpoint).length() < 1e-3
        })
    }

    #[test]
    fn test_build_hides_core() {
        let (tree, ring) = ring();
        assert!(tree.local_bounds(ring.core()).unwrap().is_empty());
        assert_eq!(ring.present_faces().count(), 4);
        assert!(!ring.is_exposed());
        assert_eq!(tree.children(ring.root()).unwrap().len(), 5);
        for side in Side::ALL {
            let face = ring.face(side);
            assert_eq!(ring.side_of(face), Some(side));
            assert!(!tree.is_destroyed(face).unwrap());
            assert_eq!(tree.world_bounds(face).unwrap().len(), 5);
        }
        assert_eq!(ring.side_of(ring.core()), None);
    }

    #[test]
    fn test_faces_placed_on_their_sides() {
        let (tree, ring) = ring();
        let bottom = tree.world_bounds(ring.face(Side::Bottom)).unwrap();
        assert!(has_bound(bottom, -Vec2::Y, Vec2::new(0.0, -5.0)));
        let left = tree.world_bounds(ring.face(Side::Left)).unwrap();
        assert!(has_bound(left, -Vec2::X, Vec2::new(-4.4, 0.0)));
        let right = tree.world_bounds(ring.face(Side::Right)).unwrap();
        assert!(has_bound(right, Vec2::X, Vec2::new(4.4, 0.0)));
    }

    #[test]
    fn test_destroy_face_exposes_sector() {
        let (mut tree, mut ring) = ring();
        assert!(ring.destroy_face(&mut tree, Side::Top).unwrap());

        assert!(!ring.is_present(Side::Top));
        assert!(tree.is_destroyed(ring.face(Side::Top)).unwrap());
        assert!(tree.world_bounds(ring.face(Side::Top)).unwrap().is_empty());

        let core = tree.local_bounds(ring.core()).unwrap();
        assert_eq!(core.len(), 3);
        assert!(has_bound(core, Vec2::Y, Vec2::new(0.0, 2.529)));

        // Already gone
        assert!(!ring.destroy_face(&mut tree, Side::Top).unwrap());
        assert_eq!(tree.local_bounds(ring.core()).unwrap().len(), 3);
    }

    #[test]
    fn test_side_sectors_rotate() {
        let (mut tree, mut ring) = ring();
        ring.destroy_face(&mut tree, Side::Left).unwrap();
        let core = tree.local_bounds(ring.core()).unwrap();
        assert!(has_bound(core, -Vec2::X, Vec2::new(-2.529, 0.0)));

        ring.destroy_face(&mut tree, Side::Right).unwrap();
        let core = tree.local_bounds(ring.core()).unwrap();
        assert_eq!(core.len(), 6);
        assert!(has_bound(core, Vec2::X, Vec2::new(2.529, 0.0)));
    }

    #[test]
    fn test_all_faces_destroyed() {
        let (mut tree, mut ring) = ring();
        for side in Side::ALL {
            ring.destroy_face(&mut tree, side).unwrap();
        }
        assert!(ring.is_exposed());
        assert_eq!(tree.local_bounds(ring.core()).unwrap().len(), 12);
        assert!(!tree.is_destroyed(ring.root()).unwrap());
    }

    #[test]
    fn test_ball_hits_face_then_core() {
        let (mut tree, mut ring) = ring();
        let ball = Circle2D::new(Vec2::new(0.0, 10.0), 0.5);
        let velocity = Vec2::new(0.0, -10.0);

        let (part, hit) = tree.collide_with_ball(ring.root(), 1.0, &ball, velocity).unwrap().unwrap();
        assert_eq!(part, ring.face(Side::Top));
        assert!((hit.time - 0.45).abs() < 1e-3);

        ring.destroy_part(&mut tree, part).unwrap();
        let (part, hit) = tree.collide_with_ball(ring.root(), 1.0, &ball, velocity).unwrap().unwrap();
        assert_eq!(part, ring.core());
        assert!((hit.time - (10.0 - 3.029) / 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_destroy_part_ignores_non_faces() {
        let (mut tree, mut ring) = ring();
        let core = ring.core();
        assert!(!ring.destroy_part(&mut tree, core).unwrap());
        assert_eq!(ring.present_faces().count(), 4);
        assert!(!tree.is_destroyed(core).unwrap());
        assert!(tree.local_bounds(core).unwrap().is_empty());

        let right = ring.face(Side::Right);
        assert!(ring.destroy_part(&mut tree, right).unwrap());
        assert!(!ring.is_present(Side::Right));
    }

    #[test]
    fn test_core_bounds_for_set() {
        let present: BTreeSet<Side> = [Side::Top, Side::Left].into_iter().collect();
        let bounds = core_bounds(&present);
        assert_eq!(bounds.len(), 6);
        assert!(has_bound(&bounds, -Vec2::Y, Vec2::new(0.0, -2.529)));
    }
}
