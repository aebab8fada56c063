//! Fine collision tests for voxels the raytracer steps through.
//!
//! A handler receives the block, the world-space point where the ray entered
//! the voxel, the unit ray direction and the length of the ray segment inside
//! the voxel. It returns the distance from the entry point to the hit, or
//! `None` when the ray passes through. Shaped blocks use cheap approximations
//! (endpoint and midpoint tests) rather than exact geometry.

use std::collections::HashMap;

use glam::{Vec2, Vec3};
use tracing::debug;

use super::block::{Block, BlockState, Facing, Half, Hinge, Material, SlabKind, StairShape};
use crate::physics::collision::ray_aabb_intersect_2d;

/// `(block, entry point, unit direction, segment length) -> hit distance`
pub type BlockCollisionFn = fn(&Block, Vec3, Vec3, f32) -> Option<f32>;

pub fn no_collision(_block: &Block, _start: Vec3, _dir: Vec3, _step: f32) -> Option<f32> {
    None
}

/// Full cube: hit on entry.
pub fn solid(_block: &Block, _start: Vec3, _dir: Vec3, _step: f32) -> Option<f32> {
    Some(0.0)
}

/// Block state did not match the material; treat as solid.
fn mismatched(block: &Block) -> Option<f32> {
    debug!(
        material = ?block.material,
        state = ?block.state,
        pos = ?block.pos,
        "block state does not match material, treating as solid"
    );
    Some(0.0)
}

/// Lower or upper half of the voxel, tested at the segment endpoints.
fn half_hit(lower: bool, y0: f32, y1: f32, step: f32) -> Option<f32> {
    let inside = |y: f32| if lower { y < 0.5 } else { y > 0.5 };
    if inside(y0) {
        Some(0.0)
    } else if inside(y1) {
        Some(0.5 * step)
    } else {
        None
    }
}

fn slab(block: &Block, start: Vec3, dir: Vec3, step: f32) -> Option<f32> {
    let BlockState::Slab(kind) = block.state else {
        return mismatched(block);
    };
    let y0 = block.local(start).y;
    let y1 = block.local(start + dir * step).y;
    match kind {
        SlabKind::Double => Some(0.0),
        SlabKind::Bottom => half_hit(true, y0, y1, step),
        SlabKind::Top => half_hit(false, y0, y1, step),
    }
}

/// Beds and daylight detectors: bottom half only.
fn bottom_half(block: &Block, start: Vec3, dir: Vec3, step: f32) -> Option<f32> {
    let y0 = block.local(start).y;
    let y1 = block.local(start + dir * step).y;
    half_hit(true, y0, y1, step)
}

/// Map a local point into the stairs' own frame: `u > 0.5` is the raised back
/// half, `v < 0.5` is the left side when looking along the facing.
fn stair_frame(facing: Facing, p: Vec3) -> (f32, f32) {
    match facing {
        Facing::East => (p.x, p.z),
        Facing::West => (1.0 - p.x, 1.0 - p.z),
        Facing::North => (1.0 - p.z, p.x),
        Facing::South => (p.z, 1.0 - p.x),
    }
}

fn stair_step_filled(facing: Facing, shape: StairShape, p: Vec3) -> bool {
    let (u, v) = stair_frame(facing, p);
    match shape {
        StairShape::Straight => u > 0.5,
        StairShape::InnerLeft => u > 0.5 || v < 0.5,
        StairShape::InnerRight => u > 0.5 || v > 0.5,
        StairShape::OuterLeft => u > 0.5 && v < 0.5,
        StairShape::OuterRight => u > 0.5 && v > 0.5,
    }
}

fn stairs(block: &Block, start: Vec3, dir: Vec3, step: f32) -> Option<f32> {
    let BlockState::Stairs { facing, half, shape } = block.state else {
        return mismatched(block);
    };
    let p0 = block.local(start);
    let p1 = block.local(start + dir * step);
    if let Some(t) = half_hit(half == Half::Bottom, p0.y, p1.y, step) {
        return Some(t);
    }

    if stair_step_filled(facing, shape, p0) {
        Some(0.0)
    } else if stair_step_filled(facing, shape, p1) {
        Some(0.5 * step)
    } else if shape.is_outer() && stair_step_filled(facing, shape, 0.5 * (p0 + p1)) {
        // Outer corners are the only step with a non-convex empty region.
        Some(0.5 * step)
    } else {
        None
    }
}

/// Quarter-thick vertical panel against the side named by `side`.
fn in_panel(side: Facing, p: Vec3) -> bool {
    match side {
        Facing::North => p.z > 0.75,
        Facing::South => p.z < 0.25,
        Facing::West => p.x > 0.75,
        Facing::East => p.x < 0.25,
    }
}

fn door(block: &Block, start: Vec3, dir: Vec3, step: f32) -> Option<f32> {
    let BlockState::Door {
        facing,
        open,
        hinge,
    } = block.state
    else {
        return mismatched(block);
    };
    let side = match (open, hinge) {
        (false, _) => facing,
        (true, Hinge::Right) => facing.counter_clockwise(),
        (true, Hinge::Left) => facing.clockwise(),
    };
    let p0 = block.local(start);
    let p1 = block.local(start + dir * step);
    if in_panel(side, p0) {
        Some(0.0)
    } else if in_panel(side, p1) {
        Some(0.75 * step)
    } else {
        None
    }
}

fn trapdoor(block: &Block, start: Vec3, dir: Vec3, step: f32) -> Option<f32> {
    let BlockState::Trapdoor { facing, open, half } = block.state else {
        return mismatched(block);
    };
    let p0 = block.local(start);
    let p1 = block.local(start + dir * step);
    let inside = |p: Vec3| {
        if open {
            in_panel(facing, p)
        } else if half == Half::Bottom {
            p.y < 0.25
        } else {
            p.y > 0.75
        }
    };
    if inside(p0) {
        Some(0.0)
    } else if inside(p1) {
        Some(0.75 * step)
    } else {
        None
    }
}

fn wall(block: &Block, start: Vec3, dir: Vec3, step: f32) -> Option<f32> {
    let BlockState::Wall {
        north,
        south,
        east,
        west,
    } = block.state
    else {
        return mismatched(block);
    };
    let p0 = block.local(start);
    let p1 = block.local(start + dir * step);
    let mid = 0.5 * (p0 + p1);
    if mid.x > 0.25 && mid.x < 0.75 && mid.z > 0.25 && mid.z < 0.75 {
        return Some(0.25 * step);
    }

    // Arms form a plus shape, each reaching one face.
    let origin = Vec2::new(p0.x, p0.z);
    let inv_dir = Vec2::new(
        if dir.x != 0.0 { 1.0 / dir.x } else { f32::MAX },
        if dir.z != 0.0 { 1.0 / dir.z } else { f32::MAX },
    );
    let arms = [
        (north, Vec2::new(0.25, 0.0), Vec2::new(0.75, 0.75)),
        (south, Vec2::new(0.25, 0.25), Vec2::new(0.75, 1.0)),
        (west, Vec2::new(0.0, 0.25), Vec2::new(0.75, 0.75)),
        (east, Vec2::new(0.25, 0.25), Vec2::new(1.0, 0.75)),
    ];
    arms.into_iter()
        .filter(|(connected, _, _)| *connected)
        .find_map(|(_, min, max)| {
            ray_aabb_intersect_2d(origin, inv_dir, min, max).filter(|&t| t <= step)
        })
}

fn fence(block: &Block, start: Vec3, dir: Vec3, step: f32) -> Option<f32> {
    let mid = block.local(start + dir * (0.5 * step));
    if mid.x > 0.375 && mid.x < 0.625 && mid.z > 0.375 && mid.z < 0.625 {
        Some(0.3 * step)
    } else {
        None
    }
}

/// Built-in handler for a material.
pub fn default_handler(material: Material) -> BlockCollisionFn {
    use Material::*;
    match material {
        Air | CaveAir | VoidAir | Water | Lava | Glass | GlassPane | Leaves | Snow | Carpet
        | Sign | Scaffolding | TallGrass | Torch | Ladder => no_collision,
        Anvil => solid,
        Slab => slab,
        Stairs => stairs,
        Door => door,
        Trapdoor => trapdoor,
        Fence => fence,
        Wall => wall,
        Bed | DaylightDetector => bottom_half,
        m if m.is_occluding() => solid,
        _ => no_collision,
    }
}

/// Material to handler map. Materials without an explicit entry use
/// [`default_handler`].
#[derive(Debug, Clone, Default)]
pub struct BlockCollisionTable {
    handlers: HashMap<Material, BlockCollisionFn>,
}

impl BlockCollisionTable {
    pub fn defaults() -> Self {
        Self::default()
    }

    /// Copy of this table where doors and trapdoors never stop projectiles.
    pub fn passthrough_doors(&self) -> Self {
        let mut table = self.clone();
        table.set(Material::Door, no_collision);
        table.set(Material::Trapdoor, no_collision);
        table
    }

    pub fn set(&mut self, material: Material, handler: BlockCollisionFn) {
        self.handlers.insert(material, handler);
    }

    pub fn handler(&self, material: Material) -> BlockCollisionFn {
        self.handlers
            .get(&material)
            .copied()
            .unwrap_or_else(|| default_handler(material))
    }

    /// Run the handler for `block`.
    pub fn test(&self, block: &Block, start: Vec3, dir: Vec3, step: f32) -> Option<f32> {
        (self.handler(block.material))(block, start, dir, step)
    }
}

/// The two tables a projectile system consults, chosen per projectile.
#[derive(Debug, Clone)]
pub struct BlockCollisionTables {
    pub standard: BlockCollisionTable,
    pub passthrough_doors: BlockCollisionTable,
}

impl Default for BlockCollisionTables {
    fn default() -> Self {
        Self::with_overrides(&HashMap::new())
    }
}

impl BlockCollisionTables {
    /// Build both tables, forcing the given materials solid (`true`) or
    /// non-colliding (`false`). Overrides apply to both tables.
    pub fn with_overrides(overrides: &HashMap<Material, bool>) -> Self {
        let mut standard = BlockCollisionTable::defaults();
        for (&material, &collides) in overrides {
            standard.set(material, if collides { solid } else { no_collision });
        }
        let mut passthrough_doors = standard.passthrough_doors();
        for (&material, &collides) in overrides {
            passthrough_doors.set(material, if collides { solid } else { no_collision });
        }
        Self {
            standard,
            passthrough_doors,
        }
    }

    pub fn for_projectile(&self, passthrough_doors: bool) -> &BlockCollisionTable {
        if passthrough_doors {
            &self.passthrough_doors
        } else {
            &self.standard
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    fn at_origin(material: Material, state: BlockState) -> Block {
        Block::new(IVec3::ZERO, material).with_state(state)
    }

    #[test]
    fn test_default_materials() {
        let table = BlockCollisionTable::defaults();
        let start = Vec3::new(0.0, 0.5, 0.5);
        let stone = Block::new(IVec3::ZERO, Material::Stone);
        let glass = Block::new(IVec3::ZERO, Material::Glass);
        let anvil = Block::new(IVec3::ZERO, Material::Anvil);
        assert_eq!(table.test(&stone, start, Vec3::X, 1.0), Some(0.0));
        assert_eq!(table.test(&anvil, start, Vec3::X, 1.0), Some(0.0));
        assert_eq!(table.test(&glass, start, Vec3::X, 1.0), None);
    }

    #[test]
    fn test_bottom_slab() {
        let table = BlockCollisionTable::defaults();
        let slab = at_origin(Material::Slab, BlockState::Slab(SlabKind::Bottom));
        // Passing over the top half misses.
        assert_eq!(table.test(&slab, Vec3::new(0.0, 0.75, 0.5), Vec3::X, 1.0), None);
        // Entering in the lower half hits immediately.
        assert_eq!(table.test(&slab, Vec3::new(0.0, 0.25, 0.5), Vec3::X, 1.0), Some(0.0));
        // Dropping into the lower half hits halfway.
        let dir = Vec3::new(1.0, -1.0, 0.0).normalize();
        let hit = table.test(&slab, Vec3::new(0.0, 0.9, 0.5), dir, 0.8);
        assert!((hit.unwrap() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_top_and_double_slab() {
        let table = BlockCollisionTable::defaults();
        let top = at_origin(Material::Slab, BlockState::Slab(SlabKind::Top));
        let double = at_origin(Material::Slab, BlockState::Slab(SlabKind::Double));
        assert_eq!(table.test(&top, Vec3::new(0.0, 0.25, 0.5), Vec3::X, 1.0), None);
        assert_eq!(table.test(&top, Vec3::new(0.0, 0.75, 0.5), Vec3::X, 1.0), Some(0.0));
        assert_eq!(table.test(&double, Vec3::new(0.0, 0.75, 0.5), Vec3::X, 1.0), Some(0.0));
    }

    #[test]
    fn test_mismatched_state_is_solid() {
        let table = BlockCollisionTable::defaults();
        let slab = at_origin(Material::Slab, BlockState::Plain);
        assert_eq!(table.test(&slab, Vec3::new(0.0, 0.75, 0.5), Vec3::X, 1.0), Some(0.0));
    }

    #[test]
    fn test_closed_door_panel() {
        let table = BlockCollisionTable::defaults();
        let door = at_origin(
            Material::Door,
            BlockState::Door {
                facing: Facing::North,
                open: false,
                hinge: Hinge::Left,
            },
        );
        // Moving +Z from the middle ends inside the z > 0.75 panel.
        let hit = table.test(&door, Vec3::new(0.5, 0.5, 0.0), Vec3::Z, 1.0);
        assert_eq!(hit, Some(0.75));
        // Moving +X along z = 0.5 misses the panel.
        assert_eq!(table.test(&door, Vec3::new(0.0, 0.5, 0.5), Vec3::X, 1.0), None);
    }

    #[test]
    fn test_open_door_swings_with_hinge() {
        let table = BlockCollisionTable::defaults();
        let door = at_origin(
            Material::Door,
            BlockState::Door {
                facing: Facing::North,
                open: true,
                hinge: Hinge::Right,
            },
        );
        // Right-hinged open north door sits on the x > 0.75 side.
        assert_eq!(table.test(&door, Vec3::new(0.9, 0.5, 0.0), Vec3::Z, 1.0), Some(0.0));
        assert_eq!(table.test(&door, Vec3::new(0.5, 0.5, 0.0), Vec3::Z, 1.0), None);
    }

    #[test]
    fn test_passthrough_doors() {
        let table = BlockCollisionTable::defaults().passthrough_doors();
        let door = at_origin(
            Material::Door,
            BlockState::Door {
                facing: Facing::North,
                open: false,
                hinge: Hinge::Left,
            },
        );
        let trapdoor = at_origin(
            Material::Trapdoor,
            BlockState::Trapdoor {
                facing: Facing::North,
                open: false,
                half: Half::Bottom,
            },
        );
        assert_eq!(table.test(&door, Vec3::new(0.5, 0.5, 0.0), Vec3::Z, 1.0), None);
        assert_eq!(table.test(&trapdoor, Vec3::new(0.5, 0.1, 0.0), Vec3::Z, 1.0), None);
        let stone = Block::new(IVec3::ZERO, Material::Stone);
        assert_eq!(table.test(&stone, Vec3::ZERO, Vec3::Z, 1.0), Some(0.0));
    }

    #[test]
    fn test_closed_trapdoor() {
        let table = BlockCollisionTable::defaults();
        let trapdoor = at_origin(
            Material::Trapdoor,
            BlockState::Trapdoor {
                facing: Facing::East,
                open: false,
                half: Half::Top,
            },
        );
        assert_eq!(table.test(&trapdoor, Vec3::new(0.0, 0.9, 0.5), Vec3::X, 1.0), Some(0.0));
        assert_eq!(table.test(&trapdoor, Vec3::new(0.0, 0.5, 0.5), Vec3::X, 1.0), None);
    }

    #[test]
    fn test_straight_stairs_upper_step() {
        let table = BlockCollisionTable::defaults();
        let stairs = at_origin(
            Material::Stairs,
            BlockState::Stairs {
                facing: Facing::East,
                half: Half::Bottom,
                shape: StairShape::Straight,
            },
        );
        // Upper half, moving +X: reaches the raised back half.
        assert_eq!(table.test(&stairs, Vec3::new(0.0, 0.75, 0.5), Vec3::X, 1.0), Some(0.5));
        // Upper half, moving -X away from the step from x = 0.4.
        assert_eq!(table.test(&stairs, Vec3::new(0.4, 0.75, 0.5), -Vec3::X, 0.4), None);
        // Lower half always hits.
        assert_eq!(table.test(&stairs, Vec3::new(0.0, 0.25, 0.5), Vec3::X, 1.0), Some(0.0));
    }

    #[test]
    fn test_outer_stairs_corner_crossing() {
        let table = BlockCollisionTable::defaults();
        let outer = at_origin(
            Material::Stairs,
            BlockState::Stairs {
                facing: Facing::East,
                half: Half::Bottom,
                shape: StairShape::OuterRight,
            },
        );
        // Both ends lie outside the raised corner; the midpoint cuts through it.
        let start = Vec3::new(0.3, 0.75, 0.9);
        let across = Vec3::new(0.9, 0.75, 0.3) - start;
        assert_eq!(
            table.test(&outer, start, across.normalize(), across.length()),
            Some(0.5 * across.length())
        );

        // The same chord across inner stairs lands inside the step at its far end.
        let inner = at_origin(
            Material::Stairs,
            BlockState::Stairs {
                facing: Facing::East,
                half: Half::Bottom,
                shape: StairShape::InnerRight,
            },
        );
        assert_eq!(table.test(&inner, Vec3::new(0.1, 0.75, 0.1), Vec3::Z, 0.3), None);
        assert_eq!(
            table.test(&inner, start, across.normalize(), across.length()),
            Some(0.0)
        );
    }

    #[test]
    fn test_stairs_frame_rotation() {
        // North-facing stairs are raised on the low-z half.
        let stairs = at_origin(
            Material::Stairs,
            BlockState::Stairs {
                facing: Facing::North,
                half: Half::Bottom,
                shape: StairShape::Straight,
            },
        );
        let table = BlockCollisionTable::defaults();
        assert_eq!(table.test(&stairs, Vec3::new(0.5, 0.75, 0.2), Vec3::X, 0.4), Some(0.0));
        assert_eq!(table.test(&stairs, Vec3::new(0.0, 0.75, 0.8), Vec3::X, 1.0), None);
    }

    #[test]
    fn test_fence_post() {
        let table = BlockCollisionTable::defaults();
        let fence = Block::new(IVec3::ZERO, Material::Fence);
        assert_eq!(table.test(&fence, Vec3::new(0.0, 0.5, 0.5), Vec3::X, 1.0), Some(0.3));
        assert_eq!(table.test(&fence, Vec3::new(0.0, 0.5, 0.1), Vec3::X, 1.0), None);
    }

    #[test]
    fn test_wall_arm() {
        let table = BlockCollisionTable::defaults();
        let wall = at_origin(
            Material::Wall,
            BlockState::Wall {
                north: true,
                south: false,
                east: false,
                west: false,
            },
        );
        // Crossing the north arm (x 0.25..0.75, z 0..0.75) along x at z = 0.1.
        let hit = table.test(&wall, Vec3::new(0.0, 0.5, 0.1), Vec3::X, 1.0);
        assert!((hit.unwrap() - 0.25).abs() < 1e-6);
        // Same path on the disconnected south side misses.
        assert_eq!(table.test(&wall, Vec3::new(0.0, 0.5, 0.9), Vec3::X, 1.0), None);
    }

    #[test]
    fn test_overrides() {
        let mut overrides = HashMap::new();
        overrides.insert(Material::Glass, true);
        overrides.insert(Material::Stone, false);
        let tables = BlockCollisionTables::with_overrides(&overrides);
        let glass = Block::new(IVec3::ZERO, Material::Glass);
        let stone = Block::new(IVec3::ZERO, Material::Stone);
        for table in [&tables.standard, &tables.passthrough_doors] {
            assert_eq!(table.test(&glass, Vec3::ZERO, Vec3::X, 1.0), Some(0.0));
            assert_eq!(table.test(&stone, Vec3::ZERO, Vec3::X, 1.0), None);
        }
    }
}
