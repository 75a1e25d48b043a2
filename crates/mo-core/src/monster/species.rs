//! Creature species templates
//!
//! A species is the immutable description shared by every creature of a kind.
//! Capabilities are named flag sets rather than raw masks.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::combat::Attack;

bitflags! {
    /// Movement capabilities
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct MoveFlags: u32 {
        /// Walks towards the player
        const MOVE_NORMAL = 0x0000_0001;
        const RANDOM_20 = 0x0000_0002;
        const RANDOM_40 = 0x0000_0004;
        const RANDOM_75 = 0x0000_0008;
        /// Never moves, only strikes adjacent targets
        const ATTACK_ONLY = 0x0000_0010;
        const OPEN_DOOR = 0x0000_0020;
        const BASH_DOOR = 0x0000_0040;
        /// Passes through rock
        const PHASE = 0x0000_0080;
        /// Tunnels through rock
        const BREAK_WALL = 0x0000_0100;
        /// Tunnelling sets off an earthquake
        const SHATTER = 0x0000_0200;
        const EATS_OTHER = 0x0000_0400;
        const PICKS_UP = 0x0000_0800;
        const MULTIPLY = 0x0000_1000;
        /// Has no melee, only spells
        const ONLY_MAGIC = 0x0000_2000;
        const INVISIBLE = 0x0000_4000;
        /// Killing it wins the game
        const WIN = 0x0000_8000;
    }
}

bitflags! {
    /// Spells a species can cast
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct SpellFlags: u32 {
        const BLINK = 0x0000_0001;
        const TELEPORT = 0x0000_0002;
        const TELEPORT_TO = 0x0000_0004;
        const CAUSE_LIGHT = 0x0000_0008;
        const CAUSE_SERIOUS = 0x0000_0010;
        const HOLD_PERSON = 0x0000_0020;
        const BLIND = 0x0000_0040;
        const CONFUSE = 0x0000_0080;
        const SCARE = 0x0000_0100;
        const SUMMON_MONSTER = 0x0000_0200;
        const SUMMON_UNDEAD = 0x0000_0400;
        const SLOW = 0x0000_0800;
        const DRAIN_MANA = 0x0000_1000;
        const BREATHE_LIGHTNING = 0x0000_2000;
        const BREATHE_GAS = 0x0000_4000;
        const BREATHE_ACID = 0x0000_8000;
        const BREATHE_FROST = 0x0001_0000;
        const BREATHE_FIRE = 0x0002_0000;
    }
}

bitflags! {
    /// Nature and defenses
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct DefenseFlags: u32 {
        const UNDEAD = 0x0000_0001;
        const EVIL = 0x0000_0002;
        const DEMON = 0x0000_0004;
        const DRAGON = 0x0000_0008;
        const ANIMAL = 0x0000_0010;
        const UNIQUE = 0x0000_0020;
        const NO_SLEEP = 0x0000_0040;
        /// Invisible to infravision
        const NO_INFRA = 0x0000_0080;
        const HURT_LIGHT = 0x0000_0100;
        const IM_FIRE = 0x0000_0200;
        const IM_COLD = 0x0000_0400;
        const IM_ACID = 0x0000_0800;
        const IM_ELEC = 0x0000_1000;
        const IM_POISON = 0x0000_2000;
        /// Always created with maximal hit points
        const MAX_HP = 0x0000_4000;
    }
}

// Manual serde for the flag sets

impl Serialize for MoveFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for MoveFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(MoveFlags::from_bits_truncate(bits))
    }
}

impl Serialize for SpellFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SpellFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(SpellFlags::from_bits_truncate(bits))
    }
}

impl Serialize for DefenseFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DefenseFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(DefenseFlags::from_bits_truncate(bits))
    }
}

/// Creature family used to theme pits
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Family {
    #[default]
    None = 0,
    Jelly = 1,
    Orc = 2,
    Troll = 3,
    Undead = 4,
    Dragon = 5,
    Demon = 6,
}

/// Species template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Species {
    pub name: &'static str,
    pub symbol: char,
    pub level: i32,
    /// Experience value at character level 1
    pub exp: i32,
    /// Moves per turn, 10 being the normal player speed
    pub speed: i32,
    /// Area awareness radius
    pub aaf: i32,
    /// Base sleep value
    pub sleep: i32,
    pub ac: i32,
    /// Hit dice as (count, sides)
    pub hit_dice: (i32, i32),
    pub moves: MoveFlags,
    pub spells: SpellFlags,
    /// Casts one turn in `spell_freq`
    pub spell_freq: i32,
    pub defense: DefenseFlags,
    pub family: Family,
    pub attacks: &'static [Attack],
}

impl Species {
    /// Start a template; capabilities are added with the builder methods
    pub const fn new(
        name: &'static str,
        symbol: char,
        level: i32,
        exp: i32,
        speed: i32,
        aaf: i32,
        sleep: i32,
        ac: i32,
        hit_dice: (i32, i32),
    ) -> Self {
        Self {
            name,
            symbol,
            level,
            exp,
            speed,
            aaf,
            sleep,
            ac,
            hit_dice,
            moves: MoveFlags::empty(),
            spells: SpellFlags::empty(),
            spell_freq: 0,
            defense: DefenseFlags::empty(),
            family: Family::None,
            attacks: &[],
        }
    }

    pub const fn moves(mut self, moves: MoveFlags) -> Self {
        self.moves = moves;
        self
    }

    pub const fn spells(mut self, spells: SpellFlags, freq: i32) -> Self {
        self.spells = spells;
        self.spell_freq = freq;
        self
    }

    pub const fn defense(mut self, defense: DefenseFlags) -> Self {
        self.defense = defense;
        self
    }

    pub const fn family(mut self, family: Family) -> Self {
        self.family = family;
        self
    }

    pub const fn attacks(mut self, attacks: &'static [Attack]) -> Self {
        self.attacks = attacks;
        self
    }

    pub const fn is_unique(&self) -> bool {
        self.defense.contains(DefenseFlags::UNIQUE)
    }

    pub const fn is_undead(&self) -> bool {
        self.defense.contains(DefenseFlags::UNDEAD)
    }

    pub const fn is_evil(&self) -> bool {
        self.defense.contains(DefenseFlags::EVIL)
    }

    pub const fn is_win_monster(&self) -> bool {
        self.moves.contains(MoveFlags::WIN)
    }

    pub const fn can_phase(&self) -> bool {
        self.moves.contains(MoveFlags::PHASE)
    }

    pub const fn casts_spells(&self) -> bool {
        !self.spells.is_empty() && self.spell_freq > 0
    }

    /// Dragons are always generated asleep
    pub const fn always_sleeps(&self) -> bool {
        matches!(self.symbol, 'd' | 'D')
    }

    /// "the jackal", "an orc" style name for messages
    pub fn the_name(&self) -> String {
        if self.is_unique() {
            self.name.to_string()
        } else {
            format!("the {}", self.name)
        }
    }

    /// Name used for the cause of death
    pub fn death_name(&self) -> String {
        if self.is_unique() {
            self.name.to_string()
        } else if self
            .name
            .starts_with(|c: char| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'))
        {
            format!("an {}", self.name)
        } else {
            format!("a {}", self.name)
        }
    }
}

/// Capitalise the first letter of a message fragment
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORC: Species = Species::new("cave orc", 'o', 5, 30, 10, 20, 30, 36, (11, 10))
        .moves(MoveFlags::MOVE_NORMAL.union(MoveFlags::OPEN_DOOR))
        .defense(DefenseFlags::EVIL)
        .family(Family::Orc);

    #[test]
    fn test_builder() {
        assert!(ORC.moves.contains(MoveFlags::OPEN_DOOR));
        assert!(ORC.is_evil());
        assert!(!ORC.is_unique());
        assert!(!ORC.casts_spells());
        assert_eq!(ORC.family, Family::Orc);
    }

    #[test]
    fn test_names() {
        assert_eq!(ORC.the_name(), "the cave orc");
        assert_eq!(ORC.death_name(), "a cave orc");
        let imp = Species::new("imp", 'u', 17, 55, 20, 20, 20, 30, (6, 8));
        assert_eq!(imp.death_name(), "an imp");
        assert_eq!(capitalize("the imp"), "The imp");
    }

    #[test]
    fn test_flag_serde_round_trip() {
        let flags = MoveFlags::PHASE | MoveFlags::INVISIBLE;
        let json = serde_json::to_string(&flags).unwrap();
        let back: MoveFlags = serde_json::from_str(&json).unwrap();
        assert_eq!(back, flags);
    }
}
