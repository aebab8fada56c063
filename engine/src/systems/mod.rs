//! Projectile systems: the per-world orchestrator and its dynamics worker pool.

pub mod dynamics;
pub mod projectile_system;
pub mod worker;

pub use dynamics::{DEFAULT_HITBOX_SEARCH_MARGIN, VisitedChunks, integrate_slice};
pub use projectile_system::{
    ProjectileHitBlock, ProjectileHitEntity, ProjectileSpawner, ProjectileSystem,
    ProjectileSystemUpdate, RemovedProjectile, TrailSegment,
};
pub use worker::{DynamicsJob, DynamicsPool, WorkerEvent};
