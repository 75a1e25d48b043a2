//! Player state
//!
//! The core's view of the character: position, hit points, stats, intrinsics
//! and status timers. Character creation and levelling menus live elsewhere;
//! this is the player-state port the creature engine and turn loop write to.

mod status;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

pub use status::{StatusApplied, StatusTimers};

use crate::consts::NORMAL_SPEED;
use crate::geometry::Coord;
use crate::ports::{DisplayPort, Disturb};
use crate::rng::GameRng;

/// Experience needed for each level, from level 2 upwards
const PLAYER_EXP: [i32; 39] = [
    10, 25, 45, 70, 100, 140, 200, 280, 380, 500, 650, 850, 1100, 1400, 1800, 2300, 2900, 3600,
    4400, 5400, 6800, 8400, 10200, 12500, 17500, 25000, 35000, 50000, 75000, 100000, 150000,
    200000, 300000, 400000, 500000, 750000, 1500000, 2500000, 5000000,
];

/// Highest character level
pub const MAX_PLAYER_LEVEL: i32 = PLAYER_EXP.len() as i32 + 1;

/// Character stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[repr(u8)]
pub enum Stat {
    Strength = 0,
    Intelligence = 1,
    Wisdom = 2,
    Dexterity = 3,
    Constitution = 4,
    Charisma = 5,
}

impl Stat {
    pub const ALL: [Stat; 6] = [
        Stat::Strength,
        Stat::Intelligence,
        Stat::Wisdom,
        Stat::Dexterity,
        Stat::Constitution,
        Stat::Charisma,
    ];

    pub const fn index(&self) -> usize {
        *self as usize
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Stat::Strength => "strength",
            Stat::Intelligence => "intelligence",
            Stat::Wisdom => "wisdom",
            Stat::Dexterity => "dexterity",
            Stat::Constitution => "constitution",
            Stat::Charisma => "charisma",
        }
    }

    /// Message printed when the stat is drained
    pub const fn drain_message(&self) -> &'static str {
        match self {
            Stat::Strength => "You feel very weak.",
            Stat::Intelligence => "You have trouble thinking clearly.",
            Stat::Wisdom => "Your wisdom is drained.",
            Stat::Dexterity => "You feel clumsy.",
            Stat::Constitution => "Your health is damaged!",
            Stat::Charisma => "Your features are twisted.",
        }
    }

    /// Message printed when a sustain saves the stat
    pub const fn sustain_message(&self) -> &'static str {
        match self {
            Stat::Strength => "You feel weak for a moment, but it passes.",
            Stat::Intelligence => "You feel your memories fade for a moment.",
            Stat::Wisdom => "Your wisdom is sustained.",
            Stat::Dexterity => "You feel clumsy for a moment, but it passes.",
            Stat::Constitution => "Your body resists the effects of the disease.",
            Stat::Charisma => "Your features twist for a moment.",
        }
    }
}

/// Character class, as far as the core cares
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Class {
    #[default]
    Warrior = 0,
    Mage = 1,
    Priest = 2,
    Rogue = 3,
    Ranger = 4,
    Paladin = 5,
}

impl Class {
    /// 1 in n chance per turn to get a feeling about an item
    pub const fn innate_sense(&self) -> Option<i32> {
        match self {
            Class::Warrior | Class::Rogue => Some(9000),
            Class::Priest => Some(10000),
            _ => None,
        }
    }

    /// Hit points gained per level, on average
    pub const fn hit_die(&self) -> i32 {
        match self {
            Class::Warrior => 9,
            Class::Paladin => 6,
            Class::Rogue | Class::Ranger => 6,
            Class::Priest => 2,
            Class::Mage => 0,
        }
    }

    /// Saving throw improvement per three levels
    pub const fn save_per_level(&self) -> i32 {
        match self {
            Class::Warrior => 10,
            Class::Mage => 30,
            Class::Priest => 25,
            Class::Rogue => 20,
            Class::Ranger => 25,
            Class::Paladin => 15,
        }
    }
}

bitflags! {
    /// Permanent abilities from race, class or equipment
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Intrinsics: u32 {
        const SEE_INVISIBLE = 0x0001;
        const FREE_ACTION = 0x0002;
        const REGENERATE = 0x0004;
        const AGGRAVATE = 0x0008;
        /// Random teleportation
        const TELEPORT = 0x0010;
        const SLOW_DIGEST = 0x0020;
        const RES_FIRE = 0x0040;
        const RES_COLD = 0x0080;
        const RES_ACID = 0x0100;
        const RES_ELEC = 0x0200;
        const RES_POISON = 0x0400;
        /// Cannot lose experience
        const HOLD_LIFE = 0x0800;
    }
}

impl Serialize for Intrinsics {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Intrinsics {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(Intrinsics::from_bits_truncate(bits))
    }
}

/// The player character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub class: Class,
    pub pos: Coord,
    pub level: i32,
    pub exp: i32,
    pub max_exp: i32,

    pub chp: i32,
    pub mhp: i32,
    /// Fraction of a hit point in 1/65536ths
    pub chp_frac: i32,
    pub cmana: i32,
    pub mmana: i32,
    pub mana_frac: i32,

    /// Stats on the 3..=118 scale, 18/xx stored as 18 + xx
    pub stat_max: [i32; 6],
    pub stat_cur: [i32; 6],
    pub sustain: [bool; 6],

    pub base_ac: i32,
    /// Temporary armor bonus from status effects
    pub to_ac: i32,
    pub base_to_hit: i32,
    /// Temporary to-hit bonus from status effects
    pub to_hit: i32,
    /// Wielded weapon damage dice
    pub weapon_dice: (i32, i32),
    pub to_dam: i32,

    pub gold: i32,
    pub food: i32,
    pub food_digested: i32,
    /// Turns of fuel left in the light source, 0 for none
    pub light: i32,

    pub stealth: i32,
    pub search_skill: i32,
    pub saving_throw: i32,
    /// Infravision range in cells
    pub infravision: i32,
    pub intrinsics: Intrinsics,
    pub status: StatusTimers,

    /// Turns left to rest; negative rests until hit points and mana are full
    pub rest: i32,
    pub searching: bool,

    pub dead: bool,
    pub died_from: Option<String>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new("Adventurer", Class::Warrior)
    }
}

impl Player {
    pub fn new(name: impl Into<String>, class: Class) -> Self {
        Self {
            name: name.into(),
            class,
            pos: Coord::default(),
            level: 1,
            exp: 0,
            max_exp: 0,
            chp: 20,
            mhp: 20,
            chp_frac: 0,
            cmana: 0,
            mmana: 0,
            mana_frac: 0,
            stat_max: [16; 6],
            stat_cur: [16; 6],
            sustain: [false; 6],
            base_ac: 10,
            to_ac: 0,
            base_to_hit: 40,
            to_hit: 0,
            weapon_dice: (1, 4),
            to_dam: 0,
            gold: 100,
            food: 7500,
            food_digested: 2,
            light: 7500,
            stealth: 3,
            search_skill: 20,
            saving_throw: 30,
            infravision: 0,
            intrinsics: Intrinsics::empty(),
            status: StatusTimers::default(),
            rest: 0,
            searching: false,
            dead: false,
            died_from: None,
        }
    }

    pub fn stat(&self, stat: Stat) -> i32 {
        self.stat_cur[stat.index()]
    }

    /// Hit point adjustment from constitution
    pub fn con_adj(&self) -> i32 {
        match self.stat(Stat::Constitution) {
            c if c < 7 => c - 7,
            c if c < 17 => 0,
            17 => 1,
            c if c < 94 => 2,
            c if c < 117 => 3,
            _ => 4,
        }
    }

    /// Saving throw adjustment from wisdom
    pub fn wis_adj(&self) -> i32 {
        match self.stat(Stat::Wisdom) {
            w if w < 8 => -2,
            w if w < 14 => 0,
            w if w < 18 => 1,
            w if w < 68 => 2,
            _ => 3,
        }
    }

    pub fn total_ac(&self) -> i32 {
        self.base_ac + self.to_ac
    }

    pub fn total_to_hit(&self) -> i32 {
        self.base_to_hit + self.to_hit
    }

    /// Effective speed on the creature speed scale
    pub fn speed(&self) -> i32 {
        match self.status.speed {
            s if s < 0 => NORMAL_SPEED * (1 - s),
            s if s > 0 => (NORMAL_SPEED / (1 + s)).max(1),
            _ => NORMAL_SPEED,
        }
    }

    pub fn has(&self, flags: Intrinsics) -> bool {
        self.intrinsics.contains(flags)
    }

    pub fn sees_invisible(&self) -> bool {
        self.has(Intrinsics::SEE_INVISIBLE) || self.status.detect_inv > 0
    }

    pub fn is_resting(&self) -> bool {
        self.rest != 0
    }

    pub fn is_paralysed(&self) -> bool {
        self.status.paralysis > 0
    }

    /// Apply damage; returns true if this blow killed the player
    pub fn take_hit(&mut self, damage: i32, cause: &str) -> bool {
        let damage = if self.status.invuln > 0 { 0 } else { damage };
        self.chp -= damage;
        if self.chp < 0 && !self.dead {
            self.dead = true;
            self.died_from = Some(cause.to_string());
            return true;
        }
        false
    }

    /// Heal, capped at the maximum
    pub fn heal(&mut self, amount: i32) {
        self.chp = (self.chp + amount).min(self.mhp);
    }

    /// Lower a stat unless sustained; returns whether it dropped
    pub fn lose_stat(&mut self, stat: Stat) -> bool {
        let i = stat.index();
        if self.sustain[i] {
            return false;
        }
        let cur = self.stat_cur[i];
        if cur <= 3 {
            return false;
        }
        self.stat_cur[i] = if cur > 18 { (cur - 10).max(18) } else { cur - 1 };
        true
    }

    /// Bring a drained stat back to its maximum; returns whether it changed
    pub fn restore_stat(&mut self, stat: Stat) -> bool {
        let i = stat.index();
        if self.stat_cur[i] < self.stat_max[i] {
            self.stat_cur[i] = self.stat_max[i];
            true
        } else {
            false
        }
    }

    /// Add experience; returns the number of levels gained
    pub fn gain_experience(&mut self, amount: i32) -> i32 {
        self.exp = self.exp.saturating_add(amount.max(0));
        self.max_exp = self.max_exp.max(self.exp);
        let mut gained = 0;
        while self.level < MAX_PLAYER_LEVEL && self.exp >= Self::exp_for_level(self.level + 1) {
            self.level += 1;
            let hp = (self.class.hit_die() / 2 + 1 + self.con_adj()).max(1);
            self.mhp += hp;
            self.chp += hp;
            gained += 1;
        }
        gained
    }

    /// Drain experience; returns the number of levels lost
    pub fn lose_experience(&mut self, amount: i32) -> i32 {
        self.exp = (self.exp - amount.max(0)).max(0);
        let mut lost = 0;
        while self.level > 1 && self.exp < Self::exp_for_level(self.level) {
            self.level -= 1;
            let hp = (self.class.hit_die() / 2 + 1 + self.con_adj()).max(1);
            self.mhp = (self.mhp - hp).max(1);
            self.chp = self.chp.min(self.mhp);
            lost += 1;
        }
        lost
    }

    /// Experience needed to reach `level`
    pub fn exp_for_level(level: i32) -> i32 {
        if level <= 1 {
            0
        } else {
            PLAYER_EXP[((level - 2) as usize).min(PLAYER_EXP.len() - 1)]
        }
    }

    /// Saving throw against a magical effect
    pub fn saves(&self, rng: &mut GameRng) -> bool {
        let skill = self.saving_throw + self.wis_adj() + self.class.save_per_level() * self.level / 30;
        rng.randint(100) <= skill
    }

    /// Interrupt resting or searching and tell the display
    pub fn disturb(&mut self, display: &mut dyn DisplayPort, flags: Disturb) {
        self.rest = 0;
        if flags.contains(Disturb::SEARCH) {
            self.searching = false;
        }
        display.disturb(flags);
    }

    /// Regenerate hit points at a rate in 1/65536ths of the maximum per turn
    pub fn regen_hp(&mut self, percent: i32) {
        let gain = self.mhp * percent + crate::consts::PLAYER_REGEN_HPBASE;
        self.chp += gain >> 16;
        let frac = (gain & 0xFFFF) + self.chp_frac;
        if frac >= 0x10000 {
            self.chp_frac = frac - 0x10000;
            self.chp += 1;
        } else {
            self.chp_frac = frac;
        }
        if self.chp >= self.mhp {
            self.chp = self.mhp;
            self.chp_frac = 0;
        }
    }

    /// Regenerate mana at a rate in 1/65536ths of the maximum per turn
    pub fn regen_mana(&mut self, percent: i32) {
        let gain = self.mmana * percent + crate::consts::PLAYER_REGEN_MNBASE;
        self.cmana += gain >> 16;
        let frac = (gain & 0xFFFF) + self.mana_frac;
        if frac >= 0x10000 {
            self.mana_frac = frac - 0x10000;
            self.cmana += 1;
        } else {
            self.mana_frac = frac;
        }
        if self.cmana >= self.mmana {
            self.cmana = self.mmana;
            self.mana_frac = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::RecordingDisplay;

    #[test]
    fn test_take_hit_records_cause_once() {
        let mut p = Player::default();
        assert!(!p.take_hit(10, "a jackal"));
        assert!(p.take_hit(15, "a cave orc"));
        assert!(!p.take_hit(5, "a kobold"));
        assert_eq!(p.died_from.as_deref(), Some("a cave orc"));
    }

    #[test]
    fn test_invulnerable_takes_no_damage() {
        let mut p = Player::default();
        p.status.invuln = 5;
        p.take_hit(100, "a dragon");
        assert_eq!(p.chp, p.mhp);
    }

    #[test]
    fn test_lose_and_restore_stat() {
        let mut p = Player::default();
        assert!(p.lose_stat(Stat::Strength));
        assert_eq!(p.stat(Stat::Strength), 15);
        p.sustain[Stat::Dexterity.index()] = true;
        assert!(!p.lose_stat(Stat::Dexterity));
        assert!(p.restore_stat(Stat::Strength));
        assert!(!p.restore_stat(Stat::Strength));
    }

    #[test]
    fn test_exceptional_stat_loses_ten_points() {
        let mut p = Player::default();
        p.stat_cur[0] = 68;
        p.lose_stat(Stat::Strength);
        assert_eq!(p.stat_cur[0], 58);
        p.stat_cur[0] = 22;
        p.lose_stat(Stat::Strength);
        assert_eq!(p.stat_cur[0], 18);
    }

    #[test]
    fn test_gain_and_lose_levels() {
        let mut p = Player::default();
        assert_eq!(p.gain_experience(30), 2);
        assert_eq!(p.level, 3);
        assert_eq!(p.lose_experience(25), 2);
        assert_eq!(p.level, 1);
        assert_eq!(p.max_exp, 30);
    }

    #[test]
    fn test_speed_scale() {
        let mut p = Player::default();
        assert_eq!(p.speed(), NORMAL_SPEED);
        p.status.speed = -1;
        assert_eq!(p.speed(), 2 * NORMAL_SPEED);
        p.status.speed = 1;
        assert_eq!(p.speed(), NORMAL_SPEED / 2);
    }

    #[test]
    fn test_regen_fixed_point_reaches_max() {
        let mut p = Player::default();
        p.chp = 1;
        for _ in 0..10_000 {
            p.regen_hp(crate::consts::PLAYER_REGEN_NORMAL);
        }
        assert_eq!(p.chp, p.mhp);
        assert_eq!(p.chp_frac, 0);
    }

    #[test]
    fn test_disturb_stops_rest() {
        let mut p = Player::default();
        let mut display = RecordingDisplay::default();
        p.rest = 10;
        p.searching = true;
        p.disturb(&mut display, Disturb::SEARCH);
        assert_eq!(p.rest, 0);
        assert!(!p.searching);
        assert_eq!(display.disturbs.len(), 1);
    }
}
