//! Combat system
//!
//! Blow definitions, to-hit and damage formulas, creature-versus-player
//! attack resolution and player melee.

mod effect;
mod method;
mod mhitu;
mod uhitm;

use serde::{Deserialize, Serialize};

use crate::consts::MON_LEVEL_ADJ;
use crate::rng::GameRng;

pub use effect::AttackEffect;
pub use method::AttackMethod;
pub use mhitu::{AttackOutcome, BlowContext, apply_effect, make_attack};
pub(crate) use mhitu::{Element, elemental_damage};
pub use uhitm::{monster_take_hit, player_attack};

/// A single blow in a species' attack list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    /// How the blow is delivered
    pub method: AttackMethod,
    /// What it does on a hit
    pub effect: AttackEffect,
    /// Number of damage dice
    pub dice: i32,
    /// Sides per damage die
    pub sides: i32,
}

impl Attack {
    pub const fn new(method: AttackMethod, effect: AttackEffect, dice: i32, sides: i32) -> Self {
        Self {
            method,
            effect,
            dice,
            sides,
        }
    }

    /// Largest damage the dice can roll
    pub const fn max_damage(&self) -> i32 {
        self.dice * self.sides
    }
}

/// Roll to hit
///
/// One in twenty always misses and one in twenty always hits; otherwise the
/// blow lands when a roll under the attack power beats the armor class.
pub fn test_hit(rng: &mut GameRng, bonus: i32, level: i32, ac: i32) -> bool {
    let power = bonus + level * MON_LEVEL_ADJ;
    let die = rng.randint(20);
    die != 1 && (die == 20 || (power > 0 && rng.randint(power) > ac))
}

/// Reduce physical damage by armor, capped at 150 armor
///
/// Integer arithmetic throughout, so the half-way case rounds down.
pub fn mitigate_armor(damage: i32, ac: i32) -> i32 {
    let ac = ac.clamp(0, 150);
    damage - ((ac * 3 / 4) * damage) / 200
}

/// Critical level of a creature blow, 0 for an ordinary hit
pub fn monster_critical(rng: &mut GameRng, dice: i32, sides: i32, damage: i32) -> i32 {
    let total = dice * sides;
    if damage < total * 19 / 20 {
        return 0;
    }
    // weak blows rarely work
    if damage < 20 && rng.randint(100) > damage {
        return 0;
    }
    let mut bonus = 0;
    if damage == total {
        bonus += 1;
    }
    if damage >= 20 {
        while rng.randint(100) <= 2 {
            bonus += 1;
        }
    }
    let base = match damage {
        d if d > 45 => 6,
        d if d > 33 => 5,
        d if d > 25 => 4,
        d if d > 18 => 3,
        d if d > 11 => 2,
        _ => 1,
    };
    base + bonus
}

/// Stun added by a critical blunt blow
pub fn critical_stun(rng: &mut GameRng, level: i32) -> i32 {
    match level {
        0 => 0,
        1 => rng.randint(5),
        2 => rng.randint(5) + 10,
        3 => rng.randint(10) + 20,
        4 => rng.randint(15) + 30,
        5 => rng.randint(20) + 40,
        6 => 80,
        _ => 150,
    }
}

/// Cut added by a critical edged blow
pub fn critical_cut(rng: &mut GameRng, level: i32) -> i32 {
    match level {
        0 => 0,
        1 => rng.randint(5),
        2 => rng.randint(5) + 5,
        3 => rng.randint(20) + 20,
        4 => rng.randint(50) + 50,
        5 => rng.randint(100) + 100,
        6 => 300,
        _ => 500,
    }
}
