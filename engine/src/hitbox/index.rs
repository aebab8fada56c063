//! Spatial index of hitboxes for one tick.
//!
//! Hitboxes are stored once in an arena and referenced by [`HitboxId`] from
//! every 16³ cell they overlap, so a box straddling a cell boundary is shared
//! rather than copied. The index is rebuilt from scratch each tick and handed
//! to the caller afterwards (explosions reuse it, deduplicating through
//! [`HitboxIndex::mark_explosion`]).

use std::collections::{HashMap, HashSet};

use glam::Vec3;

use super::{Hitbox, HitboxRegistry};
use crate::physics::types::{ChunkCoord, ChunkCoord3D, EntityId};
use crate::world::WorldQuery;
use crate::world::entity::DynamicObject;

/// Index of a hitbox in its [`HitboxIndex`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitboxId(pub u32);

#[derive(Debug, Default, Clone)]
pub struct HitboxIndex {
    hitboxes: Vec<Hitbox>,
    cells: HashMap<ChunkCoord3D, Vec<HitboxId>>,
}

impl HitboxIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gather hitboxes of every hittable object anchored in `chunks`.
    ///
    /// Unloaded chunks are skipped. Each object contributes at most one
    /// hitbox even if it is reported from several chunks.
    pub fn build<W>(
        world: &W,
        chunks: impl IntoIterator<Item = ChunkCoord>,
        registry: &HitboxRegistry,
    ) -> Self
    where
        W: WorldQuery + ?Sized,
    {
        let mut index = Self::new();
        let mut seen: HashSet<EntityId> = HashSet::new();
        for chunk in chunks {
            if !world.is_chunk_loaded(chunk) {
                continue;
            }
            world.for_each_entity_in_chunk(chunk, &mut |object: &DynamicObject| {
                if !seen.insert(object.id) {
                    return;
                }
                if let Some(size) = registry.size_for(object) {
                    index.insert(Hitbox::from_object(object, &size));
                }
            });
        }
        index
    }

    /// Add a hitbox to every cell it overlaps.
    pub fn insert(&mut self, hitbox: Hitbox) -> HitboxId {
        let id = HitboxId(self.hitboxes.len() as u32);
        let (lo, hi) = cell_range(hitbox.min, hitbox.max);
        for x in lo.x..=hi.x {
            for y in lo.y..=hi.y {
                for z in lo.z..=hi.z {
                    self.cells
                        .entry(ChunkCoord3D::new(x, y, z))
                        .or_default()
                        .push(id);
                }
            }
        }
        self.hitboxes.push(hitbox);
        id
    }

    pub fn get(&self, id: HitboxId) -> Option<&Hitbox> {
        self.hitboxes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: HitboxId) -> Option<&mut Hitbox> {
        self.hitboxes.get_mut(id.0 as usize)
    }

    /// Ids of the hitboxes overlapping `cell`.
    pub fn cell(&self, cell: ChunkCoord3D) -> &[HitboxId] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn hitboxes_in(&self, cell: ChunkCoord3D) -> impl Iterator<Item = (HitboxId, &Hitbox)> {
        self.cell(cell)
            .iter()
            .map(|&id| (id, &self.hitboxes[id.0 as usize]))
    }

    /// Every hitbox, each once.
    pub fn iter(&self) -> impl Iterator<Item = &Hitbox> {
        self.hitboxes.iter()
    }

    pub fn find_entity(&self, entity: EntityId) -> Option<HitboxId> {
        self.hitboxes
            .iter()
            .position(|hb| hb.entity == entity)
            .map(|i| HitboxId(i as u32))
    }

    /// Record that `explosion_id` reached this hitbox. Returns `false` if it
    /// already had, so one explosion damages each object once even when the
    /// box is found through several cells.
    pub fn mark_explosion(&mut self, id: HitboxId, explosion_id: i64) -> bool {
        match self.get_mut(id) {
            Some(hb) if hb.last_explosion_id != explosion_id => {
                hb.last_explosion_id = explosion_id;
                true
            }
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.hitboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hitboxes.is_empty()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

/// Inclusive cell range covered by `floor(min) ..= ceil(max)`.
fn cell_range(min: Vec3, max: Vec3) -> (ChunkCoord3D, ChunkCoord3D) {
    (
        ChunkCoord3D::from_block(min.floor().as_ivec3()),
        ChunkCoord3D::from_block(max.ceil().as_ivec3()),
    )
}
