//! Ballistics for fixed-timestep projectiles
//!
//! One tick of motion is a constant-gravity step with exact displacement:
//!
//! ```text
//! next = position + velocity + (0, -gravity / 2, 0)
//! velocity.y -= gravity
//! ```
//!
//! Projectiles are point masses with no drag and no rotation. Everything is in
//! blocks and ticks.
//!
//! # Example
//!
//! ```ignore
//! use voxel_ballistics::physics::ballistics::{BallisticProfile, ProjectileRecord};
//! use voxel_ballistics::physics::types::{EntityId, WorldId};
//! use glam::Vec3;
//!
//! let profile = BallisticProfile { speed: 5.0, gravity: 0.0, ..Default::default() };
//! let mut p = ProjectileRecord::new(WorldId(0), EntityId(1), Vec3::new(0.0, 64.0, 0.0), Vec3::X, &profile);
//! p.integrate_tick();
//! assert_eq!(p.next_position, Vec3::new(5.0, 64.0, 0.0));
//! ```

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::types::{ChunkCoord, EntityId, WeaponId, WorldId, block_to_chunk};

/// Displacements shorter than this keep the previous direction.
const MIN_STEP_LENGTH: f32 = 1e-6;

/// Per-weapon ballistic parameters.
///
/// Produced by the host's weapon configuration and copied into each
/// projectile when it is fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallisticProfile {
    /// Initial speed (blocks/tick)
    pub speed: f32,
    /// Vertical velocity lost per tick (blocks/tick²)
    pub gravity: f32,
    /// Ticks before the projectile expires
    pub max_lifetime: u32,
    /// Path length before the projectile expires (blocks)
    pub max_distance: f32,
    /// Proximity-fuse radius; `<= 0` means direct hits only
    pub proximity: f32,
    /// Doors and trapdoors do not stop the projectile
    pub passthrough_doors: bool,
}

impl Default for BallisticProfile {
    fn default() -> Self {
        Self {
            speed: 20.0,
            gravity: 0.0125,
            max_lifetime: 200,
            max_distance: 200.0,
            proximity: 0.0,
            passthrough_doors: false,
        }
    }
}

/// A live projectile.
///
/// `next_position` and `dist_to_next` are scratch values written by
/// [`integrate_tick`](Self::integrate_tick) and consumed by the raytracer in
/// the same tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileRecord {
    pub world: WorldId,
    pub weapon: WeaponId,
    /// Object that launched the projectile (excluded from its hits)
    pub source: EntityId,
    /// Object credited with hits, usually the source
    pub shooter: EntityId,
    pub position: Vec3,
    /// Unit direction of the last displacement
    pub direction: Vec3,
    pub velocity: Vec3,
    pub speed: f32,
    pub gravity: f32,
    pub max_lifetime: u32,
    pub max_distance: f32,
    pub proximity: f32,
    pub passthrough_doors: bool,
    /// Ticks survived so far
    pub lifetime: u32,
    /// Path length travelled so far
    pub distance: f32,
    pub next_position: Vec3,
    pub dist_to_next: f32,
}

impl ProjectileRecord {
    /// Fire a projectile from `position` along `direction`.
    ///
    /// The direction is normalized; a zero direction falls back to +X.
    pub fn new(
        world: WorldId,
        source: EntityId,
        position: Vec3,
        direction: Vec3,
        profile: &BallisticProfile,
    ) -> Self {
        let direction = direction.try_normalize().unwrap_or(Vec3::X);
        Self {
            world,
            weapon: WeaponId::default(),
            source,
            shooter: source,
            position,
            direction,
            velocity: direction * profile.speed,
            speed: profile.speed,
            gravity: profile.gravity,
            max_lifetime: profile.max_lifetime,
            max_distance: profile.max_distance,
            proximity: profile.proximity,
            passthrough_doors: profile.passthrough_doors,
            lifetime: 0,
            distance: 0.0,
            next_position: position,
            dist_to_next: 0.0,
        }
    }

    /// Credit hits to someone other than the source.
    pub fn with_shooter(mut self, shooter: EntityId) -> Self {
        self.shooter = shooter;
        self
    }

    pub fn with_weapon(mut self, weapon: WeaponId) -> Self {
        self.weapon = weapon;
        self
    }

    /// Advance the velocity by one tick and compute the tentative next
    /// position, path length and direction. `position` is not moved; that
    /// happens after collision resolution.
    pub fn integrate_tick(&mut self) {
        let half_gravity = 0.5 * self.gravity;
        self.next_position = Vec3::new(
            self.position.x + self.velocity.x,
            self.position.y + self.velocity.y - half_gravity,
            self.position.z + self.velocity.z,
        );
        self.velocity.y -= self.gravity;

        let displacement = self.next_position - self.position;
        let length = displacement.length();
        self.dist_to_next = length;
        if length > MIN_STEP_LENGTH {
            self.direction = displacement / length;
        }
    }

    /// Every 2D chunk overlapped by this tick's segment, padded by `margin`
    /// blocks on x and z.
    pub fn swept_chunks(&self, margin: f32) -> impl Iterator<Item = ChunkCoord> + use<> {
        let min = self.position.min(self.next_position);
        let max = self.position.max(self.next_position);
        let cx0 = block_to_chunk((min.x - margin).floor() as i32);
        let cx1 = block_to_chunk((max.x + margin).ceil() as i32);
        let cz0 = block_to_chunk((min.z - margin).floor() as i32);
        let cz1 = block_to_chunk((max.z + margin).ceil() as i32);
        (cx0..=cx1).flat_map(move |x| (cz0..=cz1).map(move |z| ChunkCoord::new(x, z)))
    }

    /// Classify the projectile after collision resolution and bookkeeping.
    pub fn outcome(&self, hit: Option<ProjectileOutcome>, out_of_bounds: bool) -> ProjectileOutcome {
        if let Some(hit) = hit {
            hit
        } else if out_of_bounds {
            ProjectileOutcome::OutOfBounds
        } else if self.lifetime >= self.max_lifetime {
            ProjectileOutcome::LifetimeExpired
        } else if self.distance >= self.max_distance {
            ProjectileOutcome::DistanceExceeded
        } else {
            ProjectileOutcome::Alive
        }
    }
}

/// Where a projectile stands at the end of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProjectileOutcome {
    /// Still flying
    #[default]
    Alive,
    HitBlock,
    HitEntity,
    /// Path entered an unloaded region
    OutOfBounds,
    LifetimeExpired,
    DistanceExceeded,
}

impl ProjectileOutcome {
    pub fn is_alive(self) -> bool {
        matches!(self, Self::Alive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(speed: f32, gravity: f32) -> BallisticProfile {
        BallisticProfile {
            speed,
            gravity,
            ..Default::default()
        }
    }

    fn record(dir: Vec3, speed: f32, gravity: f32) -> ProjectileRecord {
        ProjectileRecord::new(
            WorldId(0),
            EntityId(1),
            Vec3::new(0.0, 64.0, 0.0),
            dir,
            &profile(speed, gravity),
        )
    }

    #[test]
    fn test_profile_default() {
        let p = BallisticProfile::default();
        assert_eq!(p.speed, 20.0);
        assert_eq!(p.max_lifetime, 200);
        assert_eq!(p.max_distance, 200.0);
        assert_eq!(p.proximity, 0.0);
        assert!(!p.passthrough_doors);
    }

    #[test]
    fn test_new_normalizes_direction() {
        let p = record(Vec3::new(3.0, 4.0, 0.0), 10.0, 0.0);
        assert!((p.direction.length() - 1.0).abs() < 1e-6);
        assert!((p.velocity.length() - 10.0).abs() < 1e-4);
        assert_eq!(p.shooter, p.source);
        assert_eq!(p.lifetime, 0);
        assert_eq!(p.distance, 0.0);
    }

    #[test]
    fn test_zero_direction_falls_back() {
        let p = record(Vec3::ZERO, 10.0, 0.0);
        assert_eq!(p.direction, Vec3::X);
    }

    #[test]
    fn test_integrate_without_gravity() {
        let mut p = record(Vec3::X, 5.0, 0.0);
        p.integrate_tick();
        assert_eq!(p.next_position, Vec3::new(5.0, 64.0, 0.0));
        assert!((p.dist_to_next - 5.0).abs() < 1e-6);
        assert_eq!(p.direction, Vec3::X);
        // Position only moves after resolution.
        assert_eq!(p.position, Vec3::new(0.0, 64.0, 0.0));
    }

    #[test]
    fn test_integrate_with_gravity() {
        let mut p = record(Vec3::X, 1.0, 0.5);
        p.integrate_tick();
        assert!((p.next_position.y - 63.75).abs() < 1e-6);
        assert!((p.velocity.y + 0.5).abs() < 1e-6);
        assert!(p.direction.y < 0.0);
        assert!((p.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_swept_chunks_margin() {
        let mut p = record(Vec3::X, 5.0, 0.0);
        p.integrate_tick();
        let chunks: Vec<_> = p.swept_chunks(8.0).collect();
        // x: floor(-8) = -8 -> -1, ceil(13) = 13 -> 0; z: -8 -> -1, 8 -> 0
        assert_eq!(chunks.len(), 4);
        assert!(chunks.contains(&ChunkCoord::new(-1, -1)));
        assert!(chunks.contains(&ChunkCoord::new(0, 0)));
    }

    #[test]
    fn test_outcome_precedence() {
        let mut p = record(Vec3::X, 1.0, 0.0);
        p.lifetime = p.max_lifetime;
        assert_eq!(
            p.outcome(Some(ProjectileOutcome::HitBlock), true),
            ProjectileOutcome::HitBlock
        );
        assert_eq!(p.outcome(None, true), ProjectileOutcome::OutOfBounds);
        assert_eq!(p.outcome(None, false), ProjectileOutcome::LifetimeExpired);
        p.lifetime = 0;
        p.distance = p.max_distance;
        assert_eq!(p.outcome(None, false), ProjectileOutcome::DistanceExceeded);
        p.distance = 0.0;
        assert!(p.outcome(None, false).is_alive());
    }
}
