//! Block snapshots returned by the world query surface.

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Block material. Only the distinctions the collision handlers care about
/// are modelled; host worlds map their own palettes onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Material {
    #[default]
    Air,
    CaveAir,
    VoidAir,
    Water,
    Lava,
    // Full cubes
    Stone,
    Dirt,
    Grass,
    Sand,
    Gravel,
    Cobblestone,
    Planks,
    Log,
    Bricks,
    Concrete,
    Wool,
    IronBlock,
    Obsidian,
    Bedrock,
    // Thin or see-through blocks
    Glass,
    GlassPane,
    Leaves,
    Snow,
    Carpet,
    Sign,
    Scaffolding,
    TallGrass,
    Torch,
    Ladder,
    // Shaped blocks
    Anvil,
    Slab,
    Stairs,
    Door,
    Trapdoor,
    Fence,
    Wall,
    Bed,
    DaylightDetector,
}

impl Material {
    /// Air kinds are skipped by the raytracer without consulting a handler.
    pub fn is_empty(self) -> bool {
        matches!(self, Self::Air | Self::CaveAir | Self::VoidAir)
    }

    /// Full opaque cubes.
    pub fn is_occluding(self) -> bool {
        matches!(
            self,
            Self::Stone
                | Self::Dirt
                | Self::Grass
                | Self::Sand
                | Self::Gravel
                | Self::Cobblestone
                | Self::Planks
                | Self::Log
                | Self::Bricks
                | Self::Concrete
                | Self::Wool
                | Self::IronBlock
                | Self::Obsidian
                | Self::Bedrock
        )
    }
}

/// Horizontal facing of directional blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    #[default]
    North,
    South,
    East,
    West,
}

impl Facing {
    /// Rotate 90 degrees clockwise seen from above.
    pub fn clockwise(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    pub fn counter_clockwise(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }
}

/// Vertical half of stairs and trapdoors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Half {
    #[default]
    Bottom,
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlabKind {
    #[default]
    Bottom,
    Top,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StairShape {
    #[default]
    Straight,
    InnerLeft,
    InnerRight,
    OuterLeft,
    OuterRight,
}

impl StairShape {
    pub fn is_outer(self) -> bool {
        matches!(self, StairShape::OuterLeft | StairShape::OuterRight)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hinge {
    #[default]
    Left,
    Right,
}

/// Shape data attached to a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockState {
    #[default]
    Plain,
    Slab(SlabKind),
    Stairs {
        facing: Facing,
        half: Half,
        shape: StairShape,
    },
    Door {
        facing: Facing,
        open: bool,
        hinge: Hinge,
    },
    Trapdoor {
        facing: Facing,
        open: bool,
        half: Half,
    },
    Wall {
        north: bool,
        south: bool,
        east: bool,
        west: bool,
    },
}

/// A block at an integer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub pos: IVec3,
    pub material: Material,
    pub state: BlockState,
}

impl Block {
    pub fn new(pos: IVec3, material: Material) -> Self {
        Self {
            pos,
            material,
            state: BlockState::Plain,
        }
    }

    pub fn air(pos: IVec3) -> Self {
        Self::new(pos, Material::Air)
    }

    pub fn with_state(mut self, state: BlockState) -> Self {
        self.state = state;
        self
    }

    /// `point` in block-local coordinates (0..1 inside the block).
    pub fn local(&self, point: Vec3) -> Vec3 {
        point - self.pos.as_vec3()
    }
}
