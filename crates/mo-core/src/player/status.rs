//! Status timers
//!
//! Independent countdowns, each with its own on-apply and on-expire effect.
//! A timer only acts while positive, so ticking an expired timer is a no-op.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::{Intrinsics, Player};
use crate::consts::{HEAVY_STUN, HEAVY_STUN_AC, HEAVY_STUN_TO_HIT};
use crate::ports::{DisplayPort, Disturb};

bitflags! {
    /// Timed effects whose side effects are currently applied
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct StatusApplied: u32 {
        const BLIND = 0x0001;
        const CONFUSED = 0x0002;
        const AFRAID = 0x0004;
        const POISONED = 0x0008;
        const FAST = 0x0010;
        const SLOW = 0x0020;
        const INVULN = 0x0040;
        const HERO = 0x0080;
        const SHERO = 0x0100;
        const BLESSED = 0x0200;
        const SHIELD = 0x0400;
        const DET_INV = 0x0800;
        const TIM_INFRA = 0x1000;
        const HEAVY_STUN = 0x2000;
        const HUNGRY = 0x4000;
        const WEAK = 0x8000;
    }
}

impl Serialize for StatusApplied {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StatusApplied {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u32::deserialize(deserializer)?;
        Ok(StatusApplied::from_bits_truncate(bits))
    }
}

/// Every timed player effect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTimers {
    pub blind: i32,
    pub confused: i32,
    pub afraid: i32,
    pub cut: i32,
    pub stun: i32,
    pub poisoned: i32,
    pub fast: i32,
    pub slow: i32,
    /// Hallucination
    pub image: i32,
    pub paralysis: i32,
    /// Protection from evil
    pub protevil: i32,
    pub invuln: i32,
    pub hero: i32,
    pub shero: i32,
    pub blessed: i32,
    /// Mystic shield
    pub shield: i32,
    pub resist_heat: i32,
    pub resist_cold: i32,
    pub detect_inv: i32,
    /// Timed infravision
    pub tim_infra: i32,
    pub word_recall: i32,
    /// Net speed change: negative is faster
    pub speed: i32,
    /// The next melee hit confuses its target
    pub confuse_monster: bool,
    pub applied: StatusApplied,
}

impl Player {
    pub fn tick_blindness(&mut self, display: &mut dyn DisplayPort) {
        let s = &mut self.status;
        if s.blind <= 0 {
            return;
        }
        s.applied.insert(StatusApplied::BLIND);
        s.blind -= 1;
        if s.blind == 0 {
            s.applied.remove(StatusApplied::BLIND);
            display.message("The veil lifts from your eyes.");
            self.disturb(display, Disturb::empty());
        }
    }

    pub fn tick_confusion(&mut self, display: &mut dyn DisplayPort) {
        let s = &mut self.status;
        if s.confused <= 0 {
            return;
        }
        s.applied.insert(StatusApplied::CONFUSED);
        s.confused -= 1;
        if s.confused == 0 {
            s.applied.remove(StatusApplied::CONFUSED);
            display.message("You feel less confused now.");
            self.rest = 0;
        }
    }

    pub fn tick_fear(&mut self, display: &mut dyn DisplayPort) {
        let s = &mut self.status;
        if s.afraid <= 0 {
            return;
        }
        let heroic = s.hero + s.shero > 0;
        if !s.applied.contains(StatusApplied::AFRAID) {
            if heroic {
                s.afraid = 0;
                return;
            }
            s.applied.insert(StatusApplied::AFRAID);
        } else if heroic {
            s.afraid = 1;
        }
        s.afraid -= 1;
        if s.afraid == 0 {
            s.applied.remove(StatusApplied::AFRAID);
            display.message("You feel bolder now.");
            self.disturb(display, Disturb::empty());
        }
    }

    pub fn tick_cut(&mut self, display: &mut dyn DisplayPort) {
        if self.status.cut <= 0 {
            return;
        }
        let damage = match self.status.cut {
            c if c > 200 => 3,
            c if c > 100 => 2,
            _ => 1,
        };
        self.take_hit(damage, "a fatal wound");
        let heal = if self.status.cut > 1000 {
            0
        } else {
            (self.con_adj() + 1).max(1)
        };
        self.status.cut = (self.status.cut - heal).max(0);
        if self.status.cut == 0 {
            display.message("Your wound heals.");
        }
    }

    pub fn tick_stun(&mut self, display: &mut dyn DisplayPort) {
        if self.status.stun <= 0 {
            return;
        }
        if self.status.stun > HEAVY_STUN && !self.status.applied.contains(StatusApplied::HEAVY_STUN)
        {
            self.status.applied.insert(StatusApplied::HEAVY_STUN);
            self.to_hit -= HEAVY_STUN_TO_HIT;
            self.to_ac -= HEAVY_STUN_AC;
        }
        let heal = (self.con_adj() + 1).max(1);
        self.status.stun = (self.status.stun - heal).max(0);
        if self.status.stun <= HEAVY_STUN && self.status.applied.contains(StatusApplied::HEAVY_STUN)
        {
            self.status.applied.remove(StatusApplied::HEAVY_STUN);
            self.to_hit += HEAVY_STUN_TO_HIT;
            self.to_ac += HEAVY_STUN_AC;
        }
        if self.status.stun == 0 {
            display.message("You are no longer stunned.");
            self.disturb(display, Disturb::empty());
        }
    }

    /// Poison ticks damage at a constitution-dependent interval
    pub fn tick_poison(&mut self, display: &mut dyn DisplayPort, turn: u64) {
        if self.status.poisoned <= 0 {
            return;
        }
        self.status.applied.insert(StatusApplied::POISONED);
        self.status.poisoned -= 1;
        if self.status.poisoned == 0 {
            self.status.applied.remove(StatusApplied::POISONED);
            display.message("You feel better.");
            self.disturb(display, Disturb::empty());
            return;
        }
        let damage = match self.con_adj() {
            i32::MIN..=-4 => 4,
            -3 | -2 => 3,
            -1 => 2,
            0 => 1,
            1..=3 => i32::from(turn % 2 == 0),
            4 | 5 => i32::from(turn % 3 == 0),
            _ => 0,
        };
        self.take_hit(damage, "poison");
        self.disturb(display, Disturb::SEARCH);
    }

    pub fn tick_haste(&mut self, display: &mut dyn DisplayPort) {
        let s = &mut self.status;
        if s.fast <= 0 {
            return;
        }
        if !s.applied.contains(StatusApplied::FAST) {
            s.applied.insert(StatusApplied::FAST);
            s.speed -= 1;
            display.message("You feel yourself moving faster.");
            self.disturb(display, Disturb::empty());
        }
        let s = &mut self.status;
        s.fast -= 1;
        if s.fast == 0 {
            s.applied.remove(StatusApplied::FAST);
            s.speed += 1;
            display.message("You feel yourself slow down.");
            self.disturb(display, Disturb::empty());
        }
    }

    pub fn tick_slow(&mut self, display: &mut dyn DisplayPort) {
        let s = &mut self.status;
        if s.slow <= 0 {
            return;
        }
        if !s.applied.contains(StatusApplied::SLOW) {
            s.applied.insert(StatusApplied::SLOW);
            s.speed += 1;
            display.message("You feel yourself moving slower.");
            self.disturb(display, Disturb::empty());
        }
        let s = &mut self.status;
        s.slow -= 1;
        if s.slow == 0 {
            s.applied.remove(StatusApplied::SLOW);
            s.speed -= 1;
            display.message("You feel yourself speed up.");
            self.disturb(display, Disturb::empty());
        }
    }

    pub fn tick_hallucination(&mut self, display: &mut dyn DisplayPort) {
        if self.status.image <= 0 {
            return;
        }
        self.status.image -= 1;
        if self.status.image == 0 {
            display.message("You can see clearly again.");
        }
    }

    pub fn tick_paralysis(&mut self, display: &mut dyn DisplayPort) {
        if self.status.paralysis <= 0 {
            return;
        }
        self.status.paralysis -= 1;
        self.disturb(display, Disturb::SEARCH);
    }

    pub fn tick_protevil(&mut self, display: &mut dyn DisplayPort) {
        if self.status.protevil <= 0 {
            return;
        }
        self.status.protevil -= 1;
        if self.status.protevil == 0 {
            display.message("You no longer feel safe from evil.");
        }
    }

    pub fn tick_invulnerability(&mut self, display: &mut dyn DisplayPort) {
        if self.status.invuln <= 0 {
            return;
        }
        if !self.status.applied.contains(StatusApplied::INVULN) {
            self.status.applied.insert(StatusApplied::INVULN);
            self.to_ac += 100;
            display.message("Your skin turns into steel!");
            self.disturb(display, Disturb::empty());
        }
        self.status.invuln -= 1;
        if self.status.invuln == 0 {
            self.status.applied.remove(StatusApplied::INVULN);
            self.to_ac -= 100;
            display.message("Your skin returns to normal.");
            self.disturb(display, Disturb::empty());
        }
    }

    pub fn tick_heroism(&mut self, display: &mut dyn DisplayPort) {
        if self.status.hero <= 0 {
            return;
        }
        if !self.status.applied.contains(StatusApplied::HERO) {
            self.status.applied.insert(StatusApplied::HERO);
            self.mhp += 10;
            self.chp += 10;
            self.to_hit += 12;
            display.message("You feel like a HERO!");
            self.disturb(display, Disturb::empty());
        }
        self.status.hero -= 1;
        if self.status.hero == 0 {
            self.status.applied.remove(StatusApplied::HERO);
            self.mhp -= 10;
            self.chp = self.chp.min(self.mhp);
            self.to_hit -= 12;
            display.message("The heroism wears off.");
            self.disturb(display, Disturb::empty());
        }
    }

    pub fn tick_berserk(&mut self, display: &mut dyn DisplayPort) {
        if self.status.shero <= 0 {
            return;
        }
        if !self.status.applied.contains(StatusApplied::SHERO) {
            self.status.applied.insert(StatusApplied::SHERO);
            self.mhp += 20;
            self.chp += 20;
            self.to_hit += 24;
            self.to_ac -= 10;
            display.message("You feel like a killing machine!");
            self.disturb(display, Disturb::empty());
        }
        self.status.shero -= 1;
        if self.status.shero == 0 {
            self.status.applied.remove(StatusApplied::SHERO);
            self.mhp -= 20;
            self.chp = self.chp.min(self.mhp);
            self.to_hit -= 24;
            self.to_ac += 10;
            display.message("You feel less Berserk.");
            self.disturb(display, Disturb::empty());
        }
    }

    pub fn tick_blessing(&mut self, display: &mut dyn DisplayPort) {
        if self.status.blessed <= 0 {
            return;
        }
        if !self.status.applied.contains(StatusApplied::BLESSED) {
            self.status.applied.insert(StatusApplied::BLESSED);
            self.to_hit += 10;
            self.to_ac += 5;
            display.message("You feel righteous!");
            self.disturb(display, Disturb::empty());
        }
        self.status.blessed -= 1;
        if self.status.blessed == 0 {
            self.status.applied.remove(StatusApplied::BLESSED);
            self.to_hit -= 10;
            self.to_ac -= 5;
            display.message("The prayer has expired.");
            self.disturb(display, Disturb::empty());
        }
    }

    pub fn tick_shield(&mut self, display: &mut dyn DisplayPort) {
        if self.status.shield <= 0 {
            return;
        }
        if !self.status.applied.contains(StatusApplied::SHIELD) {
            self.status.applied.insert(StatusApplied::SHIELD);
            self.to_ac += 50;
            display.message("A mystic shield forms around your body!");
        }
        self.status.shield -= 1;
        if self.status.shield == 0 {
            self.status.applied.remove(StatusApplied::SHIELD);
            self.to_ac -= 50;
            display.message("Your mystic shield crumbles away.");
            self.disturb(display, Disturb::empty());
        }
    }

    pub fn tick_resist_heat(&mut self, display: &mut dyn DisplayPort) {
        if self.status.resist_heat <= 0 {
            return;
        }
        self.status.resist_heat -= 1;
        if self.status.resist_heat == 0 {
            display.message("You no longer feel safe from flame.");
        }
    }

    pub fn tick_resist_cold(&mut self, display: &mut dyn DisplayPort) {
        if self.status.resist_cold <= 0 {
            return;
        }
        self.status.resist_cold -= 1;
        if self.status.resist_cold == 0 {
            display.message("You no longer feel safe from cold.");
        }
    }

    pub fn tick_detect_invisible(&mut self, display: &mut dyn DisplayPort) {
        if self.status.detect_inv <= 0 {
            return;
        }
        self.status.applied.insert(StatusApplied::DET_INV);
        self.status.detect_inv -= 1;
        if self.status.detect_inv == 0 {
            self.status.applied.remove(StatusApplied::DET_INV);
            if !self.has(Intrinsics::SEE_INVISIBLE) {
                display.message("Your eyes stop tingling.");
            }
        }
    }

    pub fn tick_infravision(&mut self, _display: &mut dyn DisplayPort) {
        if self.status.tim_infra <= 0 {
            return;
        }
        if !self.status.applied.contains(StatusApplied::TIM_INFRA) {
            self.status.applied.insert(StatusApplied::TIM_INFRA);
            self.infravision += 1;
        }
        self.status.tim_infra -= 1;
        if self.status.tim_infra == 0 {
            self.status.applied.remove(StatusApplied::TIM_INFRA);
            self.infravision -= 1;
        }
    }

    /// Every timer in turn order
    pub fn tick_status(&mut self, display: &mut dyn DisplayPort, turn: u64) {
        self.tick_blindness(display);
        self.tick_confusion(display);
        self.tick_fear(display);
        self.tick_cut(display);
        self.tick_stun(display);
        self.tick_poison(display, turn);
        self.tick_haste(display);
        self.tick_slow(display);
        self.tick_hallucination(display);
        self.tick_paralysis(display);
        self.tick_protevil(display);
        self.tick_invulnerability(display);
        self.tick_heroism(display);
        self.tick_berserk(display);
        self.tick_blessing(display);
        self.tick_shield(display);
        self.tick_resist_heat(display);
        self.tick_resist_cold(display);
        self.tick_detect_invisible(display);
        self.tick_infravision(display);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::RecordingDisplay;

    #[test]
    fn test_confusion_expiry_once() {
        let mut p = Player::default();
        let mut d = RecordingDisplay::default();
        p.status.confused = 1;
        p.tick_confusion(&mut d);
        assert_eq!(p.status.confused, 0);
        p.tick_confusion(&mut d);
        assert_eq!(d.count("You feel less confused now."), 1);
    }

    #[test]
    fn test_heroism_applies_and_reverts() {
        let mut p = Player::default();
        let mut d = RecordingDisplay::default();
        let (mhp, to_hit) = (p.mhp, p.to_hit);
        p.status.hero = 2;
        p.tick_heroism(&mut d);
        assert_eq!(p.mhp, mhp + 10);
        assert_eq!(p.to_hit, to_hit + 12);
        p.tick_heroism(&mut d);
        assert_eq!(p.mhp, mhp);
        assert_eq!(p.to_hit, to_hit);
        assert!(d.contains("The heroism wears off."));
    }

    #[test]
    fn test_heroism_cancels_fresh_fear_silently() {
        let mut p = Player::default();
        let mut d = RecordingDisplay::default();
        p.status.afraid = 10;
        p.status.hero = 5;
        p.tick_fear(&mut d);
        assert_eq!(p.status.afraid, 0);
        assert!(d.messages.is_empty());
    }

    #[test]
    fn test_heavy_stun_penalty_restored() {
        let mut p = Player::default();
        let mut d = RecordingDisplay::default();
        p.status.stun = HEAVY_STUN + 1;
        p.tick_stun(&mut d);
        // one tick brings it to the threshold, undoing the penalty
        assert_eq!(p.status.stun, HEAVY_STUN);
        assert_eq!(p.to_hit, 0);
        assert_eq!(p.to_ac, 0);
        assert!(!p.status.applied.contains(StatusApplied::HEAVY_STUN));
    }

    #[test]
    fn test_heavy_stun_penalty_held_above_threshold() {
        let mut p = Player::default();
        let mut d = RecordingDisplay::default();
        p.status.stun = HEAVY_STUN + 10;
        p.tick_stun(&mut d);
        assert_eq!(p.to_hit, -HEAVY_STUN_TO_HIT);
        assert_eq!(p.to_ac, -HEAVY_STUN_AC);
    }

    #[test]
    fn test_haste_changes_speed() {
        let mut p = Player::default();
        let mut d = RecordingDisplay::default();
        p.status.fast = 2;
        p.tick_haste(&mut d);
        assert_eq!(p.status.speed, -1);
        p.tick_haste(&mut d);
        assert_eq!(p.status.speed, 0);
        assert!(d.contains("You feel yourself slow down."));
    }

    #[test]
    fn test_cut_damage_bands() {
        let mut p = Player::default();
        let mut d = RecordingDisplay::default();
        p.status.cut = 250;
        let hp = p.chp;
        p.tick_cut(&mut d);
        assert_eq!(p.chp, hp - 3);
        assert_eq!(p.status.cut, 249);
        p.status.cut = 1500;
        p.tick_cut(&mut d);
        assert_eq!(p.status.cut, 1500);
    }

    #[test]
    fn test_poison_expiry_message() {
        let mut p = Player::default();
        let mut d = RecordingDisplay::default();
        p.status.poisoned = 2;
        p.tick_poison(&mut d, 1);
        assert_eq!(p.chp, p.mhp - 1);
        p.tick_poison(&mut d, 2);
        assert_eq!(d.count("You feel better."), 1);
    }
}
