//! Hitboxes for dynamic objects
//!
//! Each targetable object gets an axis-aligned box built from a per-kind
//! [`HitboxSize`] template anchored at its feet. Boxes are rebuilt every tick
//! by [`HitboxIndex::build`] and bucketed into 16³ spatial cells.
//!
//! # Submodules
//!
//! - [`index`] - Per-tick spatial index of hitboxes

pub mod index;

pub use index::{HitboxId, HitboxIndex};

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::physics::collision::{point_line_distance, ray_aabb_intersect};
use crate::physics::types::EntityId;
use crate::world::entity::{DynamicObject, EntityKind, Pose};

/// Box dimensions relative to an object's anchor (feet) position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HitboxSize {
    /// Half-width on x
    pub x_half: f32,
    /// Half-width on z
    pub z_half: f32,
    /// Full height
    pub y_height: f32,
    /// Offset of the box bottom from the anchor
    pub y_offset: f32,
}

impl HitboxSize {
    pub const fn new(x_half: f32, z_half: f32, y_height: f32, y_offset: f32) -> Self {
        Self {
            x_half,
            z_half,
            y_height,
            y_offset,
        }
    }

    /// Radius of the largest sphere centred in the box.
    pub fn radius_min(&self) -> f32 {
        self.x_half.min(self.z_half).min(0.5 * self.y_height)
    }
}

/// Axis-aligned box of one object for the current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hitbox {
    pub entity: EntityId,
    pub kind: EntityKind,
    pub min: Vec3,
    pub max: Vec3,
    pub center: Vec3,
    pub radius_min: f32,
    /// Last explosion that damaged this object, -1 when none
    pub last_explosion_id: i64,
}

impl Hitbox {
    pub fn new(entity: EntityId, kind: EntityKind, min: Vec3, max: Vec3) -> Self {
        let extent = max - min;
        Self {
            entity,
            kind,
            min,
            max,
            center: 0.5 * (min + max),
            radius_min: (0.5 * extent.x).min(0.5 * extent.z).min(0.5 * extent.y),
            last_explosion_id: -1,
        }
    }

    /// Box of `object` using `size`, with player pose adjustments.
    pub fn from_object(object: &DynamicObject, size: &HitboxSize) -> Self {
        let min = object.position + Vec3::new(-size.x_half, size.y_offset, -size.z_half);
        let mut max = min + Vec3::new(2.0 * size.x_half, size.y_height, 2.0 * size.z_half);
        if object.kind == EntityKind::Player {
            match object.pose {
                Pose::Standing => {}
                Pose::Sneaking => max.y -= 0.2,
                Pose::Swimming => max.y = min.y + 0.9,
            }
        }
        let mut hitbox = Self::new(object.id, object.kind, min, max);
        hitbox.radius_min = size.radius_min().min(hitbox.radius_min);
        hitbox
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    pub fn intersects_ray(&self, origin: Vec3, inv_dir: Vec3) -> bool {
        self.ray_entry_distance(origin, inv_dir).is_some()
    }

    /// Distance along the ray to the box, 0 when `origin` is inside.
    pub fn ray_entry_distance(&self, origin: Vec3, inv_dir: Vec3) -> Option<f32> {
        ray_aabb_intersect(origin, inv_dir, self.min, self.max)
    }

    /// Distance from `point` to the box centre.
    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.center.distance(point)
    }

    /// Perpendicular distance from the centre to the line through `a` along
    /// unit `n`, and the signed distance of the centre's projection along it.
    pub fn distance_to_line(&self, a: Vec3, n: Vec3) -> (f32, f32) {
        point_line_distance(self.center, a, n)
    }
}

/// Per-kind hitbox templates, targetable flags and per-object overrides.
#[derive(Debug, Clone)]
pub struct HitboxRegistry {
    sizes: HashMap<EntityKind, HitboxSize>,
    targetable: HashMap<EntityKind, bool>,
    custom: HashMap<EntityId, HitboxSize>,
}

impl Default for HitboxRegistry {
    fn default() -> Self {
        Self {
            sizes: default_hitbox_sizes(),
            targetable: default_targetable(),
            custom: HashMap::new(),
        }
    }
}

impl HitboxRegistry {
    /// Defaults with the given kind overrides applied on top.
    pub fn with_overrides(
        sizes: &HashMap<EntityKind, HitboxSize>,
        targetable: &HashMap<EntityKind, bool>,
    ) -> Self {
        let mut registry = Self::default();
        registry.sizes.extend(sizes.iter().map(|(k, v)| (*k, *v)));
        registry.targetable.extend(targetable.iter().map(|(k, v)| (*k, *v)));
        registry
    }

    /// Hitbox template for `object`, or `None` if it cannot be hit.
    ///
    /// Decorative objects only get a box through a custom override. Targetable
    /// kinds without a template get a zero-size box.
    pub fn size_for(&self, object: &DynamicObject) -> Option<HitboxSize> {
        if object.kind.is_decorative()
            && let Some(size) = self.custom.get(&object.id)
        {
            return Some(*size);
        }
        if self.is_targetable(object.kind) {
            Some(self.sizes.get(&object.kind).copied().unwrap_or_default())
        } else {
            None
        }
    }

    pub fn is_targetable(&self, kind: EntityKind) -> bool {
        self.targetable.get(&kind).copied().unwrap_or(false)
    }

    pub fn size(&self, kind: EntityKind) -> Option<HitboxSize> {
        self.sizes.get(&kind).copied()
    }

    pub fn set_size(&mut self, kind: EntityKind, size: HitboxSize) {
        self.sizes.insert(kind, size);
    }

    pub fn set_targetable(&mut self, kind: EntityKind, targetable: bool) {
        self.targetable.insert(kind, targetable);
    }

    /// Give a decorative object (e.g. an armor stand used as a vehicle model)
    /// its own hitbox.
    pub fn set_custom(&mut self, entity: EntityId, size: HitboxSize) {
        self.custom.insert(entity, size);
    }

    pub fn remove_custom(&mut self, entity: EntityId) -> Option<HitboxSize> {
        self.custom.remove(&entity)
    }
}

pub fn default_hitbox_sizes() -> HashMap<EntityKind, HitboxSize> {
    use EntityKind::*;
    HashMap::from([
        (Player, HitboxSize::new(0.4, 0.4, 1.8, -0.1)),
        (Zombie, HitboxSize::new(0.4, 0.4, 2.05, -0.1)),
        (Husk, HitboxSize::new(0.4, 0.4, 2.05, -0.1)),
        (Drowned, HitboxSize::new(0.4, 0.4, 2.05, -0.1)),
        (Witch, HitboxSize::new(0.4, 0.4, 2.05, -0.1)),
        (Villager, HitboxSize::new(0.4, 0.4, 2.05, -0.1)),
        (Skeleton, HitboxSize::new(0.4, 0.4, 2.1, -0.1)),
        (Creeper, HitboxSize::new(0.4, 0.4, 1.8, -0.1)),
        (Spider, HitboxSize::new(0.8, 0.8, 1.0, -0.1)),
        (CaveSpider, HitboxSize::new(0.45, 0.45, 0.6, -0.1)),
        (Enderman, HitboxSize::new(0.4, 0.4, 3.0, -0.1)),
        (IronGolem, HitboxSize::new(0.8, 0.8, 2.8, -0.1)),
        (Pig, HitboxSize::new(0.55, 0.55, 1.0, -0.1)),
        (Cow, HitboxSize::new(0.55, 0.55, 1.5, -0.1)),
        (Sheep, HitboxSize::new(0.55, 0.55, 1.4, -0.1)),
        (Chicken, HitboxSize::new(0.3, 0.3, 0.8, -0.1)),
        (Horse, HitboxSize::new(0.8, 0.8, 1.7, -0.1)),
        (Wolf, HitboxSize::new(0.35, 0.35, 0.95, -0.1)),
        (Slime, HitboxSize::new(0.4, 0.4, 1.2, -0.1)),
        (Ghast, HitboxSize::new(2.1, 2.1, 4.1, -0.1)),
        (ArmorStand, HitboxSize::new(0.35, 0.35, 2.1, -0.1)),
        (Boat, HitboxSize::new(0.65, 0.65, 0.6, -0.1)),
        (Minecart, HitboxSize::new(0.5, 0.5, 0.8, -0.1)),
    ])
}

/// Living kinds plus vehicles. Armor stands and item frames are excluded.
pub fn default_targetable() -> HashMap<EntityKind, bool> {
    use EntityKind::*;
    [
        Player, Zombie, Husk, Drowned, Skeleton, Creeper, Spider, CaveSpider, Enderman, Witch,
        Villager, IronGolem, Pig, Cow, Sheep, Chicken, Horse, Wolf, Slime, Ghast, Boat, Minecart,
        ArmorStand, ItemFrame,
    ]
    .into_iter()
    .map(|kind| (kind, kind.is_living() || matches!(kind, Boat | Minecart)))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::inverse_direction;

    fn player_at(pos: Vec3) -> DynamicObject {
        DynamicObject::new(EntityId(7), EntityKind::Player, pos)
    }

    #[test]
    fn test_radius_min() {
        assert_eq!(HitboxSize::new(0.4, 0.4, 1.8, -0.1).radius_min(), 0.4);
        assert_eq!(HitboxSize::new(0.65, 0.65, 0.6, -0.1).radius_min(), 0.3);
    }

    #[test]
    fn test_from_object_bounds() {
        let size = HitboxSize::new(0.4, 0.4, 1.8, -0.1);
        let hb = Hitbox::from_object(&player_at(Vec3::new(20.0, 64.0, 0.0)), &size);
        assert!((hb.min - Vec3::new(19.6, 63.9, -0.4)).length() < 1e-5);
        assert!((hb.max - Vec3::new(20.4, 65.7, 0.4)).length() < 1e-5);
        assert!((hb.center - Vec3::new(20.0, 64.8, 0.0)).length() < 1e-5);
        assert_eq!(hb.last_explosion_id, -1);
        assert!((hb.radius_min - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_player_pose_adjustments() {
        let size = HitboxSize::new(0.4, 0.4, 1.8, -0.1);
        let sneaking = player_at(Vec3::ZERO).with_pose(Pose::Sneaking);
        let swimming = player_at(Vec3::ZERO).with_pose(Pose::Swimming);
        let hb = Hitbox::from_object(&sneaking, &size);
        assert!((hb.max.y - 1.5).abs() < 1e-5);
        let hb = Hitbox::from_object(&swimming, &size);
        assert!((hb.max.y - (hb.min.y + 0.9)).abs() < 1e-5);

        // Poses only affect players.
        let zombie = DynamicObject::new(EntityId(1), EntityKind::Zombie, Vec3::ZERO)
            .with_pose(Pose::Swimming);
        let hb = Hitbox::from_object(&zombie, &size);
        assert!((hb.max.y - 1.7).abs() < 1e-5);
    }

    #[test]
    fn test_contains_and_ray() {
        let hb = Hitbox::new(EntityId(1), EntityKind::Zombie, Vec3::splat(-1.0), Vec3::splat(1.0));
        assert!(hb.contains(Vec3::ZERO));
        assert!(!hb.contains(Vec3::new(0.0, 2.0, 0.0)));

        let inv = inverse_direction(Vec3::X);
        let t = hb.ray_entry_distance(Vec3::new(-5.0, 0.0, 0.0), inv);
        assert!((t.unwrap() - 4.0).abs() < 1e-5);
        assert!(!hb.intersects_ray(Vec3::new(-5.0, 3.0, 0.0), inv));
    }

    #[test]
    fn test_distance_to_line() {
        let hb = Hitbox::new(
            EntityId(1),
            EntityKind::Zombie,
            Vec3::new(4.0, 2.0, -1.0),
            Vec3::new(6.0, 4.0, 1.0),
        );
        let (perp, along) = hb.distance_to_line(Vec3::ZERO, Vec3::X);
        assert!((perp - 3.0).abs() < 1e-5);
        assert!((along - 5.0).abs() < 1e-5);
        assert!((hb.distance_to(Vec3::new(5.0, 3.0, 3.0)) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_registry_targetable_defaults() {
        let registry = HitboxRegistry::default();
        assert!(registry.is_targetable(EntityKind::Player));
        assert!(registry.is_targetable(EntityKind::Boat));
        assert!(!registry.is_targetable(EntityKind::ArmorStand));
        assert!(!registry.is_targetable(EntityKind::ItemFrame));
        assert!(!registry.is_targetable(EntityKind::Item));
    }

    #[test]
    fn test_registry_custom_decorative() {
        let mut registry = HitboxRegistry::default();
        let stand = DynamicObject::new(EntityId(9), EntityKind::ArmorStand, Vec3::ZERO);
        assert!(registry.size_for(&stand).is_none());

        let custom = HitboxSize::new(1.5, 1.5, 2.0, 0.0);
        registry.set_custom(EntityId(9), custom);
        assert_eq!(registry.size_for(&stand), Some(custom));

        // Custom overrides only apply to decorative kinds.
        registry.set_custom(EntityId(10), custom);
        let zombie = DynamicObject::new(EntityId(10), EntityKind::Zombie, Vec3::ZERO);
        assert_eq!(registry.size_for(&zombie), registry.size(EntityKind::Zombie));
    }

    #[test]
    fn test_registry_overrides() {
        let sizes = HashMap::from([(EntityKind::Zombie, HitboxSize::new(1.0, 1.0, 1.0, 0.0))]);
        let targetable = HashMap::from([(EntityKind::Creeper, false)]);
        let registry = HitboxRegistry::with_overrides(&sizes, &targetable);
        assert_eq!(
            registry.size(EntityKind::Zombie),
            Some(HitboxSize::new(1.0, 1.0, 1.0, 0.0))
        );
        assert!(!registry.is_targetable(EntityKind::Creeper));
        assert!(registry.is_targetable(EntityKind::Player));
    }
}
