//! Physics module
//!
//! Projectile motion and the geometric tests the collision passes are built
//! from. No external physics library; everything here is plain glam math.
//!
//! # Unit System
//!
//! **1 unit = 1 block**, one step = one tick.
//!
//! - Distances in blocks
//! - Velocities in blocks/tick
//! - Gravity in blocks/tick²
//!
//! # Submodules
//!
//! - [`types`] - glam re-exports, ids and chunk coordinates
//! - [`ballistics`] - Projectile records and per-tick integration
//! - [`collision`] - Slab ray/AABB tests and point/line distance

pub mod ballistics;
pub mod collision;
pub mod types;

pub use ballistics::{BallisticProfile, ProjectileOutcome, ProjectileRecord};
pub use collision::{inverse_direction, point_line_distance, ray_aabb_intersect};
pub use types::{ChunkCoord, ChunkCoord3D, EntityId, IVec3, Vec3, WeaponId, WorldId};
