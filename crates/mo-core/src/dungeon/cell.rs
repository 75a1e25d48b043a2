//! Map cells
//!
//! A cell is one grid square: terrain, lighting memory and back-references to
//! whatever creature or floor item occupies it.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::item::ItemId;
use crate::monster::MonsterId;

/// Terrain kind
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Feature {
    /// Not yet decided during generation
    #[default]
    Null,
    RoomFloor,
    Corridor,
    OpenDoor,
    BrokenDoor,
    UpStairs,
    DownStairs,
    /// Entrance to a town store, numbered from 0
    StoreEntrance(u8),
    ClosedDoor,
    SecretDoor,
    Rubble,
    /// Inner room wall, becomes granite when the level is filled
    InnerWall,
    /// Granite bordering a pierced wall, becomes granite or a door
    TunnelEdge,
    Granite,
    Magma,
    Quartz,
    Boundary,
}

impl Feature {
    /// Creatures and the player can stand here
    pub const fn is_open(&self) -> bool {
        matches!(
            self,
            Feature::RoomFloor
                | Feature::Corridor
                | Feature::OpenDoor
                | Feature::BrokenDoor
                | Feature::UpStairs
                | Feature::DownStairs
                | Feature::StoreEntrance(_)
        )
    }

    /// Plain floor with nothing built on it
    pub const fn is_floor(&self) -> bool {
        matches!(self, Feature::RoomFloor | Feature::Corridor)
    }

    /// Solid rock of any kind, generation markers included
    pub const fn is_wall(&self) -> bool {
        matches!(
            self,
            Feature::InnerWall
                | Feature::TunnelEdge
                | Feature::Granite
                | Feature::Magma
                | Feature::Quartz
                | Feature::Boundary
        )
    }

    /// Walls a creature can be embedded in and that stop sight
    pub const fn is_cave_wall(&self) -> bool {
        matches!(
            self,
            Feature::Granite | Feature::Magma | Feature::Quartz | Feature::Boundary
        )
    }

    pub const fn is_door(&self) -> bool {
        matches!(
            self,
            Feature::OpenDoor | Feature::BrokenDoor | Feature::ClosedDoor | Feature::SecretDoor
        )
    }

    pub const fn is_stairs(&self) -> bool {
        matches!(self, Feature::UpStairs | Feature::DownStairs)
    }

    /// Blocks line of sight
    pub const fn blocks_sight(&self) -> bool {
        self.is_wall() || matches!(self, Feature::ClosedDoor | Feature::SecretDoor | Feature::Rubble)
    }

    /// Walkable once doors are opened and rubble cleared; used for reachability
    pub const fn is_traversable(&self) -> bool {
        self.is_open() || matches!(self, Feature::ClosedDoor | Feature::SecretDoor | Feature::Rubble)
    }

    /// Can be tunnelled or shattered by wall-breaking creatures
    pub const fn is_breakable(&self) -> bool {
        matches!(
            self,
            Feature::Granite | Feature::Magma | Feature::Quartz | Feature::Rubble
        )
    }

    /// Map glyph
    pub const fn symbol(&self) -> char {
        match self {
            Feature::Null => ' ',
            Feature::RoomFloor | Feature::Corridor => '.',
            Feature::OpenDoor | Feature::BrokenDoor => '\'',
            Feature::ClosedDoor => '+',
            Feature::UpStairs => '<',
            Feature::DownStairs => '>',
            Feature::StoreEntrance(n) => (b'1' + *n) as char,
            Feature::Rubble => ':',
            Feature::Magma | Feature::Quartz => '%',
            Feature::SecretDoor
            | Feature::InnerWall
            | Feature::TunnelEdge
            | Feature::Granite
            | Feature::Boundary => '#',
        }
    }
}

/// What stands on a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Occupant {
    #[default]
    Empty,
    Player,
    Monster(MonsterId),
}

impl Occupant {
    pub const fn monster(&self) -> Option<MonsterId> {
        match self {
            Occupant::Monster(id) => Some(*id),
            _ => None,
        }
    }
}

/// A single map location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub feature: Feature,
    /// Lit permanently (lit room, town by day)
    pub perma_lit: bool,
    /// Lit by the player's light this turn
    pub temp_lit: bool,
    /// Remembered by the player
    pub seen: bool,
    /// Belongs to a room (lit as a whole when entered)
    pub in_room: bool,
    /// Lock strength of a closed door: positive locked, negative stuck
    pub door_strength: i16,
    pub occupant: Occupant,
    pub item: Option<ItemId>,
}

impl Cell {
    pub const fn new(feature: Feature) -> Self {
        Self {
            feature,
            perma_lit: false,
            temp_lit: false,
            seen: false,
            in_room: false,
            door_strength: 0,
            occupant: Occupant::Empty,
            item: None,
        }
    }

    /// Lit from any source
    pub const fn is_lit(&self) -> bool {
        self.perma_lit || self.temp_lit
    }

    /// Open floor with no creature, player or item
    pub const fn is_vacant_floor(&self) -> bool {
        self.feature.is_floor() && matches!(self.occupant, Occupant::Empty) && self.item.is_none()
    }
}
