//! Voxel Ballistics Library
//!
//! Per-world simulation of fast ballistic projectiles against a voxel world
//! and the hitboxes of dynamic objects. The host world is reached only
//! through the [`world::WorldQuery`] trait; one [`ProjectileSystem`] is
//! created per world and ticked with [`ProjectileSystem::update`].
//!
//! # Modules
//!
//! - [`physics`] - Coordinates, collision primitives and projectile ballistics
//! - [`world`] - World query surface, block shapes and an in-memory world
//! - [`hitbox`] - Per-kind hitbox templates and the per-tick spatial index
//! - [`raytrace`] - Voxel grid march with per-material collision handlers
//! - [`systems`] - The projectile system and its dynamics worker pool
//! - [`config`] - JSON-loadable engine configuration
//! - [`diagnostics`] - Per-phase tick timings
//! - [`benchmark`] - Synthetic projectile load
//!
//! # Example
//!
//! ```ignore
//! use std::collections::HashSet;
//! use voxel_ballistics::{EngineConfig, ProjectileSystem};
//! use voxel_ballistics::physics::{BallisticProfile, EntityId, ProjectileRecord, Vec3, WorldId};
//! use voxel_ballistics::world::MemoryWorld;
//!
//! let world = MemoryWorld::new();
//! let mut system = ProjectileSystem::new(WorldId(0), EngineConfig::default())?;
//!
//! // Queue from any thread
//! let spawner = system.spawner();
//! let profile = BallisticProfile::default();
//! spawner.add_projectile(ProjectileRecord::new(WorldId(0), EntityId(1), Vec3::new(0.0, 70.0, 0.0), Vec3::X, &profile));
//!
//! // Tick on the owning thread
//! let update = system.update(&world, &HashSet::new());
//! for hit in &update.hit_entities {
//!     println!("{:?} hit {:?} at {}", hit.source, hit.entity, hit.location);
//! }
//! ```

pub mod benchmark;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod hitbox;
pub mod physics;
pub mod raytrace;
pub mod systems;
pub mod world;

pub use config::EngineConfig;
pub use error::{DynamicsFailure, EngineError};
pub use raytrace::{RaytraceHit, RaytraceResult, VoxelRaytracer};
pub use systems::{ProjectileSpawner, ProjectileSystem, ProjectileSystemUpdate};
pub use world::WorldQuery;
