//! Attack effects
//!
//! These define WHAT a landed blow does to the player.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Effect of a creature blow
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum AttackEffect {
    /// Plain physical damage, reduced by armor
    #[default]
    Hurt = 1,
    LoseStr = 2,
    Confuse = 3,
    Terrify = 4,
    Fire = 5,
    Acid = 6,
    Cold = 7,
    Lightning = 8,
    Corrode = 9,
    Blind = 10,
    Paralyze = 11,
    StealGold = 12,
    StealItem = 13,
    Poison = 14,
    LoseDex = 15,
    LoseCon = 16,
    LoseInt = 17,
    LoseWis = 18,
    LoseExp = 19,
    Aggravate = 20,
    Disenchant = 21,
    EatFood = 22,
    EatLight = 23,
    EatCharges = 24,
    LoseAll = 25,
    /// Stopped by protection from evil
    Repelled = 99,
}

impl AttackEffect {
    /// Base to-hit power of this effect; `None` means the blow always lands
    pub const fn hit_bonus(&self) -> Option<i32> {
        match self {
            AttackEffect::Hurt => Some(60),
            AttackEffect::LoseStr => Some(-3),
            AttackEffect::Confuse
            | AttackEffect::Terrify
            | AttackEffect::Fire
            | AttackEffect::Cold
            | AttackEffect::Lightning => Some(10),
            AttackEffect::Acid
            | AttackEffect::Corrode
            | AttackEffect::LoseDex
            | AttackEffect::LoseCon => Some(0),
            AttackEffect::Blind
            | AttackEffect::Paralyze
            | AttackEffect::StealItem
            | AttackEffect::LoseInt
            | AttackEffect::LoseWis
            | AttackEffect::LoseAll => Some(2),
            AttackEffect::StealGold
            | AttackEffect::Poison
            | AttackEffect::LoseExp
            | AttackEffect::EatFood
            | AttackEffect::EatLight => Some(5),
            AttackEffect::Disenchant => Some(20),
            AttackEffect::EatCharges => Some(15),
            AttackEffect::Aggravate | AttackEffect::Repelled => None,
        }
    }

    /// Effects that only make sense when the player has something to lose
    pub const fn needs_pack(&self) -> bool {
        matches!(self, AttackEffect::StealItem | AttackEffect::EatCharges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_effect_count() {
        assert_eq!(AttackEffect::iter().count(), 26);
    }

    #[test]
    fn test_auto_hit_effects() {
        assert_eq!(AttackEffect::Aggravate.hit_bonus(), None);
        assert_eq!(AttackEffect::Repelled.hit_bonus(), None);
        assert_eq!(AttackEffect::Hurt.hit_bonus(), Some(60));
    }
}
