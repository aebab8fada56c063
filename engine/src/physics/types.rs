//! Physics type re-exports from glam, plus the identifier and spatial cell
//! types shared by every other module.
//!
//! World units are blocks: voxels are unit cubes, chunks are 16 blocks wide.

use serde::{Deserialize, Serialize};

pub use glam::{IVec3, Vec3};

/// Edge length of a chunk in blocks.
pub const CHUNK_EDGE: i32 = 16;
/// Shift converting a block coordinate to a chunk coordinate (floor division by 16).
pub const CHUNK_SHIFT: i32 = 4;

/// Opaque identifier of a dynamic object owned by the host world.
///
/// The engine only ever holds ids, never the objects themselves, so an id may
/// outlive the object it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Opaque tag of the world a projectile system belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WorldId(pub u32);

/// Opaque weapon tag carried by projectiles and forwarded in hit events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct WeaponId(pub u32);

/// Block coordinate to chunk coordinate.
#[inline]
pub fn block_to_chunk(v: i32) -> i32 {
    v >> CHUNK_SHIFT
}

/// 2D column of the world (16x16 blocks, unbounded in y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing the block at `(block_x, block_z)`.
    pub fn from_block(block_x: i32, block_z: i32) -> Self {
        Self::new(block_to_chunk(block_x), block_to_chunk(block_z))
    }

    /// Chunk containing a world-space point.
    pub fn from_position(pos: Vec3) -> Self {
        Self::from_block(pos.x.floor() as i32, pos.z.floor() as i32)
    }
}

impl From<ChunkCoord3D> for ChunkCoord {
    fn from(c: ChunkCoord3D) -> Self {
        Self::new(c.x, c.z)
    }
}

/// 16x16x16 spatial cell used to bucket hitboxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoord3D {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn from_block(block: IVec3) -> Self {
        Self::new(
            block_to_chunk(block.x),
            block_to_chunk(block.y),
            block_to_chunk(block.z),
        )
    }

    pub fn from_position(pos: Vec3) -> Self {
        Self::from_block(pos.floor().as_ivec3())
    }

    pub fn column(self) -> ChunkCoord {
        ChunkCoord::from(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_to_chunk_floors_negative() {
        assert_eq!(block_to_chunk(0), 0);
        assert_eq!(block_to_chunk(15), 0);
        assert_eq!(block_to_chunk(16), 1);
        assert_eq!(block_to_chunk(-1), -1);
        assert_eq!(block_to_chunk(-16), -1);
        assert_eq!(block_to_chunk(-17), -2);
    }

    #[test]
    fn test_chunk_from_position() {
        let c = ChunkCoord3D::from_position(Vec3::new(-0.5, 64.0, 31.9));
        assert_eq!(c, ChunkCoord3D::new(-1, 4, 1));
        assert_eq!(c.column(), ChunkCoord::new(-1, 1));
        assert_eq!(
            ChunkCoord::from_position(Vec3::new(16.0, -3.0, -16.01)),
            ChunkCoord::new(1, -2)
        );
    }
}
