//! Items as seen by the simulation core
//!
//! Floor items are owned by the level. The player's pack belongs to the item
//! system and is reached only through the [`ItemQuery`] port.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::monster::DefenseFlags;
use crate::rng::GameRng;

/// Stable handle of a floor item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

/// Item type tag, ordered so related kinds form contiguous ranges
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
)]
#[repr(u8)]
pub enum ItemKind {
    #[default]
    Misc = 1,
    Chest = 2,
    Weapon = 10,
    Bow = 11,
    Digger = 12,
    Shield = 20,
    Helm = 21,
    Gloves = 22,
    Boots = 23,
    Cloak = 24,
    SoftArmor = 25,
    HardArmor = 26,
    Amulet = 40,
    Ring = 41,
    Wand = 50,
    Staff = 51,
    Scroll = 60,
    Book = 61,
    Food = 70,
    Flask = 75,
    Potion = 80,
    Light = 90,
    Gold = 100,
}

impl ItemKind {
    /// Kinds burnt by fire
    pub const FLAMMABLE: RangeInclusive<ItemKind> = ItemKind::Scroll..=ItemKind::Food;
    /// Kinds shattered by cold
    pub const FRAGILE: RangeInclusive<ItemKind> = ItemKind::Flask..=ItemKind::Potion;
    /// Kinds corroded by acid
    pub const CORRODIBLE: RangeInclusive<ItemKind> = ItemKind::Weapon..=ItemKind::HardArmor;
    /// Kinds shorted by lightning
    pub const CONDUCTIVE: RangeInclusive<ItemKind> = ItemKind::Ring..=ItemKind::Wand;
    /// Wearable kinds
    pub const EQUIPMENT: RangeInclusive<ItemKind> = ItemKind::Weapon..=ItemKind::Ring;
    /// Kinds a creature may carry off
    pub const PORTABLE: RangeInclusive<ItemKind> = ItemKind::Misc..=ItemKind::Light;

    pub const fn symbol(&self) -> char {
        match self {
            ItemKind::Misc => '~',
            ItemKind::Chest => '~',
            ItemKind::Weapon | ItemKind::Digger => '|',
            ItemKind::Bow => '}',
            ItemKind::Shield
            | ItemKind::Helm
            | ItemKind::Gloves
            | ItemKind::Boots
            | ItemKind::Cloak
            | ItemKind::SoftArmor
            | ItemKind::HardArmor => '[',
            ItemKind::Amulet => '"',
            ItemKind::Ring => '=',
            ItemKind::Wand => '-',
            ItemKind::Staff => '_',
            ItemKind::Scroll => '?',
            ItemKind::Book => '?',
            ItemKind::Food => ',',
            ItemKind::Flask => '!',
            ItemKind::Potion => '!',
            ItemKind::Light => '~',
            ItemKind::Gold => '$',
        }
    }
}

/// An item lying on the level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloorItem {
    pub kind: ItemKind,
    pub name: String,
    pub artifact: bool,
    /// Creature kinds this item is deadly to; such creatures will not touch it
    pub slays: DefenseFlags,
    /// Gold value for treasure
    pub value: i32,
}

impl FloorItem {
    pub fn new(kind: ItemKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            artifact: false,
            slays: DefenseFlags::empty(),
            value: 0,
        }
    }

    pub fn gold(value: i32) -> Self {
        Self {
            value,
            ..Self::new(ItemKind::Gold, "gold")
        }
    }

    /// Roll a random floor object for the given depth
    pub fn random(rng: &mut GameRng, depth: i32) -> Self {
        const BASES: [(ItemKind, &str); 12] = [
            (ItemKind::Weapon, "dagger"),
            (ItemKind::Weapon, "long sword"),
            (ItemKind::SoftArmor, "soft leather armour"),
            (ItemKind::HardArmor, "chain mail"),
            (ItemKind::Shield, "small shield"),
            (ItemKind::Potion, "potion"),
            (ItemKind::Scroll, "scroll"),
            (ItemKind::Food, "ration of food"),
            (ItemKind::Flask, "flask of oil"),
            (ItemKind::Wand, "wand"),
            (ItemKind::Ring, "ring"),
            (ItemKind::Light, "wooden torch"),
        ];
        let (kind, name) = BASES[(rng.randint(BASES.len() as i32) - 1) as usize];
        let mut item = Self::new(kind, name);
        if kind == ItemKind::Weapon && rng.randint(100) <= depth {
            if rng.one_in(4) {
                item.name = format!("{name} of Westernesse");
                item.artifact = true;
            } else {
                item.name = format!("{name} (holy)");
                item.slays = DefenseFlags::UNDEAD | DefenseFlags::EVIL;
            }
        }
        item
    }
}

/// An item carried by the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackItem {
    pub kind: ItemKind,
    pub name: String,
    pub artifact: bool,
    pub worn: bool,
    pub charges: i32,
    pub to_hit: i32,
    pub to_dam: i32,
    pub to_ac: i32,
    pub sensed: bool,
    /// Turns until an artifact can be activated again
    pub activation_timeout: i32,
}

impl PackItem {
    pub fn new(kind: ItemKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            artifact: false,
            worn: false,
            charges: 0,
            to_hit: 0,
            to_dam: 0,
            to_ac: 0,
            sensed: false,
            activation_timeout: 0,
        }
    }

    /// Pseudo-identification feeling
    pub fn feeling(&self) -> &'static str {
        if self.artifact {
            "special"
        } else if self.to_hit + self.to_dam + self.to_ac < 0 {
            "cursed"
        } else if self.to_hit + self.to_dam + self.to_ac > 0 {
            "magical"
        } else {
            "average"
        }
    }
}

/// The item-query port: what the core may ask of the player's possessions
pub trait ItemQuery {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indices of pack items whose kind lies in `kinds`
    fn find_items_of_type(&self, kinds: RangeInclusive<ItemKind>) -> Vec<usize>;

    fn destroy_item(&mut self, index: usize);

    fn describe_item(&self, index: usize) -> String;

    fn is_artifact(&self, index: usize) -> bool;

    /// Empty a wand or staff, returning the charges removed
    fn drain_charges(&mut self, index: usize) -> i32;

    /// Reduce a worn item's enchantment; false when nothing could be lost
    fn disenchant(&mut self, index: usize) -> bool;

    /// Count down activation timeouts, returning the items that became ready
    fn tick_timeouts(&mut self) -> Vec<usize>;

    /// Items the player has no feeling about yet
    fn unsensed_items(&self) -> Vec<usize>;

    /// Record a feeling for an item and return it
    fn sense_item(&mut self, index: usize) -> &'static str;
}

/// Plain in-memory pack
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pack {
    pub items: Vec<PackItem>,
}

impl Pack {
    pub fn new(items: Vec<PackItem>) -> Self {
        Self { items }
    }

    /// A modest starting kit
    pub fn starting_kit() -> Self {
        let mut sword = PackItem::new(ItemKind::Weapon, "dagger");
        sword.worn = true;
        let mut armour = PackItem::new(ItemKind::SoftArmor, "soft leather armour");
        armour.worn = true;
        let mut wand = PackItem::new(ItemKind::Wand, "wand of magic missile");
        wand.charges = 8;
        Self::new(vec![
            sword,
            armour,
            PackItem::new(ItemKind::Food, "ration of food"),
            PackItem::new(ItemKind::Food, "ration of food"),
            PackItem::new(ItemKind::Flask, "flask of oil"),
            PackItem::new(ItemKind::Scroll, "scroll of phase door"),
            wand,
        ])
    }
}

impl ItemQuery for Pack {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn find_items_of_type(&self, kinds: RangeInclusive<ItemKind>) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| kinds.contains(&item.kind))
            .map(|(i, _)| i)
            .collect()
    }

    fn destroy_item(&mut self, index: usize) {
        if index < self.items.len() {
            self.items.remove(index);
        }
    }

    fn describe_item(&self, index: usize) -> String {
        self.items
            .get(index)
            .map(|item| item.name.clone())
            .unwrap_or_else(|| "nothing".to_string())
    }

    fn is_artifact(&self, index: usize) -> bool {
        self.items.get(index).is_some_and(|item| item.artifact)
    }

    fn drain_charges(&mut self, index: usize) -> i32 {
        match self.items.get_mut(index) {
            Some(item) if matches!(item.kind, ItemKind::Wand | ItemKind::Staff) => {
                core::mem::take(&mut item.charges)
            }
            _ => 0,
        }
    }

    fn disenchant(&mut self, index: usize) -> bool {
        let Some(item) = self.items.get_mut(index) else {
            return false;
        };
        if !item.worn || item.artifact {
            return false;
        }
        let mut changed = false;
        for value in [&mut item.to_hit, &mut item.to_dam, &mut item.to_ac] {
            if *value > 0 {
                *value -= 1;
                changed = true;
            }
        }
        changed
    }

    fn tick_timeouts(&mut self) -> Vec<usize> {
        let mut ready = Vec::new();
        for (i, item) in self.items.iter_mut().enumerate() {
            if item.activation_timeout > 0 {
                item.activation_timeout -= 1;
                if item.activation_timeout == 0 {
                    ready.push(i);
                }
            }
        }
        ready
    }

    fn unsensed_items(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.sensed && ItemKind::EQUIPMENT.contains(&item.kind))
            .map(|(i, _)| i)
            .collect()
    }

    fn sense_item(&mut self, index: usize) -> &'static str {
        match self.items.get_mut(index) {
            Some(item) => {
                item.sensed = true;
                item.feeling()
            }
            None => "average",
        }
    }
}
