//! Projectile raytracing against voxels and hitboxes.
//!
//! Each tick a projectile's segment `position -> next_position` is traced in
//! two phases:
//!
//! 1. **Voxels.** An Amanatides-Woo grid march from the current position.
//!    Every non-empty voxel is handed to its material's fine collision
//!    handler. The march records each loaded 16³ chunk it passes through and
//!    stops at the first hit, on entering an unloaded chunk, or once it is
//!    [`continuity_margin`](VoxelRaytracer::continuity_margin) past the end of
//!    the segment.
//! 2. **Hitboxes.** Boxes in the recorded chunks are tested, either with a
//!    slab ray test or, for proximity-fused projectiles, by distance to the
//!    ray line. The projectile's source, the source's vehicle and its
//!    passengers are never hit.
//!
//! The nearer of the two hits wins; on a tie the block wins.

use glam::{IVec3, Vec3};

use crate::hitbox::HitboxIndex;
use crate::physics::ballistics::ProjectileRecord;
use crate::physics::collision::inverse_direction;
use crate::physics::types::{ChunkCoord3D, EntityId};
use crate::world::block::Block;
use crate::world::block_collision::BlockCollisionTables;
use crate::world::WorldQuery;

/// Default distance the voxel march continues past the segment end, so fast
/// projectiles do not skip thin geometry between ticks.
pub const DEFAULT_CONTINUITY_MARGIN: f32 = 2.0;
/// Default slack on a projectile's `max_distance` during the voxel march.
pub const DEFAULT_MAX_DISTANCE_MARGIN: f32 = 1.0;

/// What a raytrace hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RaytraceHit {
    Block(Block),
    Entity(EntityId),
}

/// Outcome of tracing one projectile for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaytraceResult {
    /// Distance to the hit, or how far the voxel march got when nothing was hit
    pub distance: f32,
    /// World-space hit point
    pub location: Option<Vec3>,
    pub hit: Option<RaytraceHit>,
    /// The march entered an unloaded chunk
    pub out_of_bounds: bool,
}

impl RaytraceResult {
    pub fn hit_block(&self) -> Option<&Block> {
        match &self.hit {
            Some(RaytraceHit::Block(block)) => Some(block),
            _ => None,
        }
    }

    pub fn hit_entity(&self) -> Option<EntityId> {
        match self.hit {
            Some(RaytraceHit::Entity(id)) => Some(id),
            _ => None,
        }
    }
}

/// Result of the voxel phase.
struct VoxelMarch {
    hit: Option<(Block, f32, Vec3)>,
    traveled: f32,
    out_of_bounds: bool,
}

pub struct VoxelRaytracer<'a, W: WorldQuery + ?Sized> {
    world: &'a W,
    hitboxes: &'a HitboxIndex,
    blocks: &'a BlockCollisionTables,
    pub continuity_margin: f32,
    pub max_distance_margin: f32,
}

impl<'a, W: WorldQuery + ?Sized> VoxelRaytracer<'a, W> {
    pub fn new(world: &'a W, hitboxes: &'a HitboxIndex, blocks: &'a BlockCollisionTables) -> Self {
        Self {
            world,
            hitboxes,
            blocks,
            continuity_margin: DEFAULT_CONTINUITY_MARGIN,
            max_distance_margin: DEFAULT_MAX_DISTANCE_MARGIN,
        }
    }

    pub fn with_margins(mut self, continuity_margin: f32, max_distance_margin: f32) -> Self {
        self.continuity_margin = continuity_margin;
        self.max_distance_margin = max_distance_margin;
        self
    }

    /// Trace `projectile` from `position` along `direction`, using the
    /// `dist_to_next` written by the dynamics step.
    pub fn trace(&self, projectile: &ProjectileRecord) -> RaytraceResult {
        let mut chunks = Vec::with_capacity(4);
        let march = self.march_voxels(projectile, &mut chunks);
        let entity = self.nearest_hitbox(projectile, &chunks);

        match (march.hit, entity) {
            (Some((block, block_dist, location)), entity)
                if entity.is_none_or(|(_, entity_dist)| block_dist <= entity_dist) =>
            {
                RaytraceResult {
                    distance: block_dist,
                    location: Some(location),
                    hit: Some(RaytraceHit::Block(block)),
                    out_of_bounds: march.out_of_bounds,
                }
            }
            (_, Some((id, entity_dist))) => RaytraceResult {
                distance: entity_dist,
                location: Some(projectile.position + projectile.direction * entity_dist),
                hit: Some(RaytraceHit::Entity(id)),
                out_of_bounds: march.out_of_bounds,
            },
            _ => RaytraceResult {
                distance: march.traveled,
                location: None,
                hit: None,
                out_of_bounds: march.out_of_bounds,
            },
        }
    }

    fn march_voxels(&self, p: &ProjectileRecord, chunks: &mut Vec<ChunkCoord3D>) -> VoxelMarch {
        let start = p.position;
        let dir = p.direction;

        let mut cell = start.floor().as_ivec3();
        let mut chunk = ChunkCoord3D::from_block(cell);
        if !self.world.is_chunk_loaded(chunk.column()) {
            return VoxelMarch {
                hit: None,
                traveled: 0.0,
                out_of_bounds: true,
            };
        }
        chunks.push(chunk);

        let step = IVec3::new(dda_step(dir.x), dda_step(dir.y), dda_step(dir.z));
        let inv_dir = inverse_direction(dir);
        let mut t_max = Vec3::new(
            dda_t_max(start.x, inv_dir.x, cell.x, step.x),
            dda_t_max(start.y, inv_dir.y, cell.y, step.y),
            dda_t_max(start.z, inv_dir.z, cell.z, step.z),
        );
        let t_delta = step.as_vec3() * inv_dir;

        let table = self.blocks.for_projectile(p.passthrough_doors);
        let t_limit = p.dist_to_next + self.continuity_margin;
        let distance_limit = p.max_distance + self.max_distance_margin;
        let mut t = 0.0f32;

        loop {
            // Boundary ties step z, then y.
            let axis = if t_max.x < t_max.y {
                if t_max.x < t_max.z { 0 } else { 2 }
            } else if t_max.y < t_max.z {
                1
            } else {
                2
            };
            let t_next = t_max[axis];

            let block = self.world.block_at(cell);
            if !block.material.is_empty() {
                let entry = start + dir * t;
                if let Some(d) = table.test(&block, entry, dir, t_next - t) {
                    return VoxelMarch {
                        hit: Some((block, t, entry + dir * d)),
                        traveled: t,
                        out_of_bounds: false,
                    };
                }
            }

            t = t_next;
            cell[axis] += step[axis];
            t_max[axis] += t_delta[axis];

            let next_chunk = ChunkCoord3D::from_block(cell);
            if next_chunk != chunk {
                chunk = next_chunk;
                if !self.world.is_chunk_loaded(chunk.column()) {
                    return VoxelMarch {
                        hit: None,
                        traveled: t,
                        out_of_bounds: true,
                    };
                }
                chunks.push(chunk);
            }

            if t >= t_limit || p.distance + t >= distance_limit {
                return VoxelMarch {
                    hit: None,
                    traveled: t,
                    out_of_bounds: false,
                };
            }
        }
    }

    /// Nearest hitbox within this tick's segment, searching every chunk the
    /// voxel march recorded.
    fn nearest_hitbox(&self, p: &ProjectileRecord, chunks: &[ChunkCoord3D]) -> Option<(EntityId, f32)> {
        if chunks.is_empty() || self.hitboxes.is_empty() {
            return None;
        }

        let mut excluded = self.world.passengers_of(p.source);
        excluded.push(p.source);
        excluded.extend(self.world.vehicle_of(p.source));

        let inv_dir = inverse_direction(p.direction);
        let max_dist = p.dist_to_next;
        let mut nearest: Option<(EntityId, f32)> = None;

        for &chunk in chunks {
            for (_, hitbox) in self.hitboxes.hitboxes_in(chunk) {
                if excluded.contains(&hitbox.entity) {
                    continue;
                }
                let dist = if p.proximity > 0.0 {
                    let (line_dist, along) = hitbox.distance_to_line(p.position, p.direction);
                    (line_dist - hitbox.radius_min < p.proximity && along >= 0.0).then_some(along)
                } else {
                    hitbox.ray_entry_distance(p.position, inv_dir)
                };
                if let Some(dist) = dist
                    && dist < max_dist
                    && nearest.is_none_or(|(_, best)| dist < best)
                {
                    nearest = Some((hitbox.entity, dist));
                }
            }
        }
        nearest
    }
}

/// Grid step on one axis; zero components step forward and never advance.
fn dda_step(dir_component: f32) -> i32 {
    if dir_component >= 0.0 { 1 } else { -1 }
}

/// Ray distance to the first voxel boundary on one axis.
fn dda_t_max(origin_component: f32, inv_dir_component: f32, cell: i32, step: i32) -> f32 {
    let boundary = (if step > 0 { cell + 1 } else { cell }) as f32;
    (boundary - origin_component) * inv_dir_component
}
