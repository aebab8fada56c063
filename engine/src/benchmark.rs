//! Synthetic load for profiling a [`ProjectileSystem`].
//!
//! Keeps a fixed number of projectiles in flight from one origin, replacing
//! whatever was removed on the previous tick.

use glam::Vec3;
use rand::Rng;

use crate::physics::ballistics::{BallisticProfile, ProjectileRecord};
use crate::physics::types::EntityId;
use crate::systems::ProjectileSystem;

pub struct BenchmarkSpawner {
    /// Projectiles to keep alive
    pub target: usize,
    pub origin: Vec3,
    pub source: EntityId,
    pub profile: BallisticProfile,
}

impl BenchmarkSpawner {
    pub fn new(target: usize, origin: Vec3) -> Self {
        Self {
            target,
            origin,
            source: EntityId(0),
            profile: BallisticProfile::default(),
        }
    }

    pub fn with_profile(mut self, profile: BallisticProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Fire enough projectiles to bring `system` back up to `target`.
    /// Returns how many were added.
    pub fn top_up(&self, system: &mut ProjectileSystem, rng: &mut impl Rng) -> usize {
        let missing = self.target.saturating_sub(system.len());
        let world = system.world();
        system.add_projectiles((0..missing).map(|_| {
            ProjectileRecord::new(world, self.source, self.origin, random_direction(rng), &self.profile)
        }));
        missing
    }
}

/// Mostly horizontal, slightly upward.
fn random_direction(rng: &mut impl Rng) -> Vec3 {
    Vec3::new(
        rng.gen_range(-1.0..=1.0),
        rng.gen_range(-0.1..=0.5),
        rng.gen_range(-1.0..=1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::physics::types::WorldId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_top_up_fills_to_target() {
        let mut system = ProjectileSystem::new(WorldId(2), EngineConfig::inline()).unwrap();
        let spawner = BenchmarkSpawner::new(25, Vec3::new(0.0, 80.0, 0.0));
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(spawner.top_up(&mut system, &mut rng), 25);
        assert_eq!(system.len(), 25);
        assert_eq!(spawner.top_up(&mut system, &mut rng), 0);
        assert!(system.iter().all(|p| p.world == WorldId(2)));
        assert!(system.iter().all(|p| (p.direction.length() - 1.0).abs() < 1e-5));
    }
}
