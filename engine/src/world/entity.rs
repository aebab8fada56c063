//! Dynamic object snapshots.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::physics::types::EntityId;

/// Kinds of dynamic objects the hitbox tables know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Zombie,
    Husk,
    Drowned,
    Skeleton,
    Creeper,
    Spider,
    CaveSpider,
    Enderman,
    Witch,
    Villager,
    IronGolem,
    Pig,
    Cow,
    Sheep,
    Chicken,
    Horse,
    Wolf,
    Slime,
    Ghast,
    Boat,
    Minecart,
    ArmorStand,
    ItemFrame,
    Item,
    Arrow,
    ExperienceOrb,
    Other,
}

impl EntityKind {
    /// Living creatures (players and mobs).
    pub fn is_living(self) -> bool {
        !matches!(
            self,
            Self::Boat
                | Self::Minecart
                | Self::ArmorStand
                | Self::ItemFrame
                | Self::Item
                | Self::Arrow
                | Self::ExperienceOrb
                | Self::Other
        )
    }

    /// Decorative kind whose hitbox may be overridden per object id.
    pub fn is_decorative(self) -> bool {
        matches!(self, Self::ArmorStand)
    }
}

/// Body pose, affects player hitbox height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pose {
    #[default]
    Standing,
    Sneaking,
    Swimming,
}

/// Snapshot of a dynamic object at its anchor (feet) position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DynamicObject {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec3,
    #[serde(default)]
    pub pose: Pose,
}

impl DynamicObject {
    pub fn new(id: EntityId, kind: EntityKind, position: Vec3) -> Self {
        Self {
            id,
            kind,
            position,
            pose: Pose::Standing,
        }
    }

    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }
}
