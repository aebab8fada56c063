//! World Module
//!
//! The read-only surface the engine needs from the host voxel world, plus the
//! snapshot types it returns. The host implements [`WorldQuery`]; the engine
//! only calls it from the thread driving
//! [`ProjectileSystem::update`](crate::systems::ProjectileSystem::update), so
//! implementations need not be `Sync`.
//!
//! ## Submodules
//! - [`block`] - Block, material and block-state snapshots
//! - [`entity`] - Dynamic object snapshots
//! - [`block_collision`] - Per-material fine collision handlers
//! - [`memory`] - In-memory world for tests and benchmarks

pub mod block;
pub mod block_collision;
pub mod entity;
pub mod memory;

pub use block::{Block, BlockState, Facing, Half, Hinge, Material, SlabKind, StairShape};
pub use block_collision::{BlockCollisionFn, BlockCollisionTable, BlockCollisionTables};
pub use entity::{DynamicObject, EntityKind, Pose};
pub use memory::MemoryWorld;

use glam::IVec3;

use crate::physics::types::{ChunkCoord, EntityId};

/// Queries the engine makes against the host world during a tick.
pub trait WorldQuery {
    /// Block at an integer position. Unknown positions are air.
    fn block_at(&self, pos: IVec3) -> Block;

    /// Whether the 2D chunk is resident. Projectiles entering unloaded chunks
    /// are treated as out of bounds.
    fn is_chunk_loaded(&self, chunk: ChunkCoord) -> bool;

    /// Visit every dynamic object anchored in the chunk.
    fn for_each_entity_in_chunk(&self, chunk: ChunkCoord, visit: &mut dyn FnMut(&DynamicObject));

    /// Object `entity` is riding, if any.
    fn vehicle_of(&self, entity: EntityId) -> Option<EntityId>;

    /// Objects riding `entity`.
    fn passengers_of(&self, entity: EntityId) -> Vec<EntityId>;
}
