//! In-memory [`WorldQuery`] implementation.
//!
//! Blocks live in a sparse map (absent = air), objects are bucketed by the 2D
//! chunk of their anchor. Every chunk is loaded unless explicitly unloaded.

use std::collections::{HashMap, HashSet};

use glam::{IVec3, Vec3};

use super::block::{Block, Material};
use super::entity::DynamicObject;
use super::WorldQuery;
use crate::physics::types::{ChunkCoord, EntityId};

#[derive(Debug, Default, Clone)]
pub struct MemoryWorld {
    blocks: HashMap<IVec3, Block>,
    objects: HashMap<ChunkCoord, Vec<DynamicObject>>,
    unloaded: HashSet<ChunkCoord>,
    vehicles: HashMap<EntityId, EntityId>,
}

impl MemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_block(&mut self, block: Block) {
        if block.material.is_empty() {
            self.blocks.remove(&block.pos);
        } else {
            self.blocks.insert(block.pos, block);
        }
    }

    pub fn set_material(&mut self, pos: IVec3, material: Material) {
        self.set_block(Block::new(pos, material));
    }

    /// Fill the inclusive box `min..=max` with `material`.
    pub fn fill(&mut self, min: IVec3, max: IVec3, material: Material) {
        for x in min.x..=max.x {
            for y in min.y..=max.y {
                for z in min.z..=max.z {
                    self.set_material(IVec3::new(x, y, z), material);
                }
            }
        }
    }

    pub fn add_object(&mut self, object: DynamicObject) {
        self.objects
            .entry(ChunkCoord::from_position(object.position))
            .or_default()
            .push(object);
    }

    /// Remove an object and any mount relation it takes part in.
    pub fn remove_object(&mut self, id: EntityId) -> Option<DynamicObject> {
        self.vehicles.retain(|rider, vehicle| *rider != id && *vehicle != id);
        self.remove_object_keep_mounts(id)
    }

    /// Move an object, rebucketing it if it changed chunk.
    pub fn move_object(&mut self, id: EntityId, position: Vec3) -> bool {
        let Some(mut object) = self.remove_object_keep_mounts(id) else {
            return false;
        };
        object.position = position;
        self.add_object(object);
        true
    }

    fn remove_object_keep_mounts(&mut self, id: EntityId) -> Option<DynamicObject> {
        for bucket in self.objects.values_mut() {
            if let Some(i) = bucket.iter().position(|o| o.id == id) {
                return Some(bucket.swap_remove(i));
            }
        }
        None
    }

    /// Seat `rider` on `vehicle`.
    pub fn mount(&mut self, rider: EntityId, vehicle: EntityId) {
        self.vehicles.insert(rider, vehicle);
    }

    pub fn unload_chunk(&mut self, chunk: ChunkCoord) {
        self.unloaded.insert(chunk);
    }

    pub fn load_chunk(&mut self, chunk: ChunkCoord) {
        self.unloaded.remove(&chunk);
    }

    pub fn object_count(&self) -> usize {
        self.objects.values().map(Vec::len).sum()
    }
}

impl WorldQuery for MemoryWorld {
    fn block_at(&self, pos: IVec3) -> Block {
        self.blocks.get(&pos).copied().unwrap_or_else(|| Block::air(pos))
    }

    fn is_chunk_loaded(&self, chunk: ChunkCoord) -> bool {
        !self.unloaded.contains(&chunk)
    }

    fn for_each_entity_in_chunk(&self, chunk: ChunkCoord, visit: &mut dyn FnMut(&DynamicObject)) {
        if let Some(bucket) = self.objects.get(&chunk) {
            bucket.iter().for_each(visit);
        }
    }

    fn vehicle_of(&self, entity: EntityId) -> Option<EntityId> {
        self.vehicles.get(&entity).copied()
    }

    fn passengers_of(&self, entity: EntityId) -> Vec<EntityId> {
        self.vehicles
            .iter()
            .filter(|(_, vehicle)| **vehicle == entity)
            .map(|(rider, _)| *rider)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::entity::EntityKind;

    #[test]
    fn test_blocks_default_to_air() {
        let mut world = MemoryWorld::new();
        world.set_material(IVec3::new(1, 2, 3), Material::Stone);
        assert_eq!(world.block_at(IVec3::new(1, 2, 3)).material, Material::Stone);
        assert_eq!(world.block_at(IVec3::new(0, 0, 0)).material, Material::Air);
        world.set_material(IVec3::new(1, 2, 3), Material::Air);
        assert_eq!(world.block_at(IVec3::new(1, 2, 3)).material, Material::Air);
    }

    #[test]
    fn test_objects_bucketed_by_chunk() {
        let mut world = MemoryWorld::new();
        world.add_object(DynamicObject::new(EntityId(1), EntityKind::Zombie, Vec3::new(-1.0, 64.0, 20.0)));
        let mut seen = Vec::new();
        world.for_each_entity_in_chunk(ChunkCoord::new(-1, 1), &mut |o| seen.push(o.id));
        assert_eq!(seen, vec![EntityId(1)]);

        assert!(world.move_object(EntityId(1), Vec3::new(5.0, 64.0, 5.0)));
        seen.clear();
        world.for_each_entity_in_chunk(ChunkCoord::new(0, 0), &mut |o| seen.push(o.id));
        assert_eq!(seen, vec![EntityId(1)]);
        assert_eq!(world.object_count(), 1);
    }

    #[test]
    fn test_mounts() {
        let mut world = MemoryWorld::new();
        world.mount(EntityId(2), EntityId(1));
        world.mount(EntityId(3), EntityId(1));
        assert_eq!(world.vehicle_of(EntityId(2)), Some(EntityId(1)));
        let mut passengers = world.passengers_of(EntityId(1));
        passengers.sort();
        assert_eq!(passengers, vec![EntityId(2), EntityId(3)]);
        world.remove_object(EntityId(1));
        assert!(world.passengers_of(EntityId(1)).is_empty());
    }

    #[test]
    fn test_unloaded_chunks() {
        let mut world = MemoryWorld::new();
        assert!(world.is_chunk_loaded(ChunkCoord::new(4, 4)));
        world.unload_chunk(ChunkCoord::new(4, 4));
        assert!(!world.is_chunk_loaded(ChunkCoord::new(4, 4)));
        world.load_chunk(ChunkCoord::new(4, 4));
        assert!(world.is_chunk_loaded(ChunkCoord::new(4, 4)));
    }
}
