//! Blammo collision demo
//!
//! Bounces a ball around a walled arena with a swaying, shielded boss in the
//! middle and logs what it hits. An optional first argument names a JSON
//! config file overriding the collision tolerances.

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use blammo_collision::boss::{BodyPartEvent, BodyPartTree, MultiLerp, PartId, ShieldRing};
use blammo_collision::geom::{BoundingLines, Circle2D, SweptHit};
use blammo_collision::{BlammoResult, CollisionConfig};

/// Fixed simulation timestep (seconds)
const SIM_DT: f32 = 1.0 / 120.0;
/// Give up after this many simulated seconds
const MAX_SECONDS: f32 = 300.0;
/// Bounces resolved within one step before the rest of it is dropped
const MAX_HITS_PER_STEP: u32 = 4;

const SEED: u64 = 0xB1A4;
const ARENA_HALF_SIZE: f32 = 12.0;
const BALL_RADIUS: f32 = 0.3;
const BALL_SPEED: f32 = 9.0;

const EYE_LIFE: f32 = 3.0;
const EYE_DAMAGE: f32 = 1.0;
/// Ball hits a shield face takes before it breaks
const FACE_HITS: u32 = 3;

struct Boss {
    root: PartId,
    ring: ShieldRing,
    eyes: [PartId; 2],
    face_hits: [u32; 4],
}

impl Boss {
    fn build(tree: &mut BodyPartTree) -> BlammoResult<Self> {
        let ring = ShieldRing::build(tree)?;

        let mut eyes = [ring.core(); 2];
        for (eye, x) in eyes.iter_mut().zip([-2.5, 2.5]) {
            *eye = tree.add_weakpoint(square(0.5), EYE_LIFE, EYE_DAMAGE);
            tree.set_local_translation(*eye, Vec3::new(x, 6.5, 0.0))?;
        }

        let root = tree.add_composite(vec![ring.root(), eyes[0], eyes[1]])?;

        let mut sway = MultiLerp::with_keys(
            vec![0.0, 2.0, 6.0, 8.0],
            vec![Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), Vec3::new(-3.0, 0.0, 0.0), Vec3::ZERO],
        );
        sway.set_repeat(true);
        tree.animate_local_translation(root, sway)?;

        Ok(Self { root, ring, eyes, face_hits: [0; 4] })
    }

    fn is_defeated(&self, tree: &BodyPartTree) -> BlammoResult<bool> {
        for &eye in &self.eyes {
            if !tree.is_destroyed(eye)? {
                return Ok(false);
            }
        }
        Ok(self.ring.is_exposed())
    }

    /// React to the ball striking `part`
    fn on_ball_hit(&mut self, tree: &mut BodyPartTree, part: PartId, events: &mut Vec<BodyPartEvent>) -> BlammoResult<()> {
        if self.eyes.contains(&part) {
            return tree.apply_ball_hit(part, events);
        }
        if let Some(side) = self.ring.side_of(part) {
            let hits = &mut self.face_hits[side as usize];
            *hits += 1;
            if *hits >= FACE_HITS && self.ring.destroy_face(tree, side)? {
                log::info!("Shield face {:?} broken, {} left", side, self.ring.present_faces().count());
            }
        }
        Ok(())
    }
}

/// Axis-aligned square centred on the origin with outward normals
fn square(half: f32) -> BoundingLines {
    BoundingLines::polygon(&[
        Vec2::new(-half, -half),
        Vec2::new(half, -half),
        Vec2::new(half, half),
        Vec2::new(-half, half),
    ])
}

/// Arena walls, normals facing in
fn arena() -> BoundingLines {
    let h = ARENA_HALF_SIZE;
    BoundingLines::polygon(&[Vec2::new(-h, -h), Vec2::new(-h, h), Vec2::new(h, h), Vec2::new(h, -h)])
}

fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    let n = normal.normalize_or_zero();
    let approach = velocity.dot(n);
    if approach < 0.0 { velocity - 2.0 * approach * n } else { velocity }
}

fn run(config: CollisionConfig) -> BlammoResult<()> {
    let walls = arena();
    let mut tree = BodyPartTree::with_config(config.clone());
    let mut boss = Boss::build(&mut tree)?;

    let mut rng = Pcg32::seed_from_u64(SEED);
    let angle = rng.random_range(0.25f32..0.75) * std::f32::consts::PI;
    let mut velocity = Vec2::from_angle(angle) * BALL_SPEED;
    let mut ball = Circle2D::new(Vec2::new(0.0, -9.0), BALL_RADIUS);
    log::info!("Launching ball at {:.1} degrees (seed {:#x})", angle.to_degrees(), SEED);

    let mut events: Vec<BodyPartEvent> = Vec::new();
    let mut elapsed = 0.0;
    let mut bounces = 0u32;

    while elapsed < MAX_SECONDS {
        let mut remaining = SIM_DT;
        for _ in 0..MAX_HITS_PER_STEP {
            let wall_hit = walls.collide(remaining, &ball, velocity, &config);
            let boss_hit = tree.collide_with_ball(boss.root, remaining, &ball, velocity)?;

            let (hit, part): (SweptHit, Option<PartId>) = match (wall_hit, boss_hit) {
                (None, None) => {
                    ball.center += velocity * remaining;
                    break;
                }
                (Some(w), Some((p, b))) if b.time < w.time => (b, Some(p)),
                (Some(w), _) => (w, None),
                (None, Some((p, b))) => (b, Some(p)),
            };

            // Still overlapping a surface it is already leaving
            if velocity.dot(hit.normal) >= 0.0 {
                ball.center += velocity * remaining;
                break;
            }

            ball.center = hit.point;
            velocity = reflect(velocity, hit.normal);
            remaining = (remaining - hit.time).max(0.0);
            bounces += 1;

            if let Some(part) = part {
                log::debug!("Ball hit {} at ({:.2}, {:.2})", part, hit.point.x, hit.point.y);
                boss.on_ball_hit(&mut tree, part, &mut events)?;
            }
        }

        tree.tick(boss.root, SIM_DT, &mut events)?;
        let sway = tree.local_translation_velocity(boss.root)?;
        tree.set_external_animation_velocity(boss.root, sway)?;
        for event in events.drain(..) {
            match event {
                BodyPartEvent::Hurt { part, life_remaining } => {
                    log::info!("{} hurt, {:.1} life left", part, life_remaining)
                }
                BodyPartEvent::Destroyed(part) => log::info!("{} destroyed", part),
                BodyPartEvent::ColourAnimationFinished(part) => {
                    log::debug!("{} colour animation finished", part)
                }
            }
        }

        elapsed += SIM_DT;
        if boss.is_defeated(&tree)? {
            log::info!("Boss defeated after {:.1}s and {} bounces", elapsed, bounces);
            return Ok(());
        }
    }

    log::info!(
        "Stopped after {:.0}s: {} bounces, {} shield faces left",
        MAX_SECONDS,
        bounces,
        boss.ring.present_faces().count()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Blammo collision demo starting...");

    let config = match std::env::args().nth(1) {
        Some(path) => match CollisionConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{}; using default tolerances", e);
                CollisionConfig::default()
            }
        },
        None => CollisionConfig::default(),
    };

    if let Err(e) = run(config) {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}
