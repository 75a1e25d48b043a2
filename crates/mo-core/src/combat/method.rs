//! Attack methods
//!
//! These define HOW a creature's blow is delivered, and so what the player is
//! told when it lands or misses.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::rng::GameRng;

/// How an attack is delivered
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum AttackMethod {
    #[default]
    Hit = 1,
    Bite = 2,
    Claw = 3,
    Sting = 4,
    Touch = 5,
    Kick = 6,
    Gaze = 7,
    Breathe = 8,
    Spit = 9,
    Wail = 10,
    Embrace = 11,
    Crawl = 12,
    Spores = 13,
    Beg = 14,
    Slime = 15,
    Crush = 16,
    Trample = 17,
    Drool = 18,
    Insult = 19,
    /// Stopped by protection from evil
    Repelled = 99,
}

impl AttackMethod {
    /// Whether a miss with this method is announced
    pub const fn announces_miss(&self) -> bool {
        matches!(
            self,
            AttackMethod::Hit | AttackMethod::Bite | AttackMethod::Claw | AttackMethod::Kick
        )
    }

    /// Blunt blows stun on a critical hit
    pub const fn stuns(&self) -> bool {
        matches!(
            self,
            AttackMethod::Hit | AttackMethod::Kick | AttackMethod::Crush | AttackMethod::Trample
        )
    }

    /// Edged blows cut on a critical hit
    pub const fn cuts(&self) -> bool {
        matches!(self, AttackMethod::Bite | AttackMethod::Claw | AttackMethod::Sting)
    }

    /// Message for a landed blow; `who` is the capitalised attacker name
    pub fn hit_message(&self, who: &str, rng: &mut GameRng) -> String {
        let verb = match self {
            AttackMethod::Hit => "hits you.",
            AttackMethod::Bite => "bites you.",
            AttackMethod::Claw => "claws you.",
            AttackMethod::Sting => "stings you.",
            AttackMethod::Touch => "touches you.",
            AttackMethod::Kick => "kicks you.",
            AttackMethod::Gaze => "gazes at you.",
            AttackMethod::Breathe => "breathes on you.",
            AttackMethod::Spit => "spits on you.",
            AttackMethod::Wail => "makes a horrible wail.",
            AttackMethod::Embrace => "embraces you.",
            AttackMethod::Crawl => "crawls on you.",
            AttackMethod::Spores => "releases a cloud of spores.",
            AttackMethod::Beg => "begs you for money.",
            AttackMethod::Slime => return "You've been slimed!".to_string(),
            AttackMethod::Crush => "crushes you.",
            AttackMethod::Trample => "tramples you.",
            AttackMethod::Drool => "drools on you.",
            AttackMethod::Insult => match rng.randint(9) {
                1 => "insults you!",
                2 => "insults your mother!",
                3 => "gives you the finger!",
                4 => "humiliates you!",
                5 => "wets on your leg!",
                6 => "defiles you!",
                7 => "dances around you!",
                8 => "makes obscene gestures!",
                _ => "moons you!!!",
            },
            AttackMethod::Repelled => "is repelled.",
        };
        format!("{who} {verb}")
    }

    pub fn miss_message(&self, who: &str) -> String {
        format!("{who} misses you.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_only_four_methods_announce_misses() {
        let announcing: Vec<_> = AttackMethod::iter().filter(|m| m.announces_miss()).collect();
        assert_eq!(
            announcing,
            vec![
                AttackMethod::Hit,
                AttackMethod::Bite,
                AttackMethod::Claw,
                AttackMethod::Kick
            ]
        );
    }

    #[test]
    fn test_hit_messages() {
        let mut rng = GameRng::new(1);
        assert_eq!(
            AttackMethod::Bite.hit_message("The jackal", &mut rng),
            "The jackal bites you."
        );
        assert_eq!(
            AttackMethod::Slime.hit_message("The blob", &mut rng),
            "You've been slimed!"
        );
        assert_eq!(
            AttackMethod::Repelled.hit_message("It", &mut rng),
            "It is repelled."
        );
    }
}
