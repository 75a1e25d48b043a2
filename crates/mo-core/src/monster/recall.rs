//! Player memory of creature species
//!
//! One record per species, surviving the instances that taught it. Combat and
//! the creature engine update it; the generator never does.

use serde::{Deserialize, Serialize};

use super::species::{DefenseFlags, MoveFlags, SpellFlags};
use crate::consts::MAX_MON_NATTACK;

/// What the player has learned about one species
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recall {
    /// Times each attack slot has been noticed
    pub attacks: [u8; MAX_MON_NATTACK],
    pub sightings: u16,
    /// Times this species killed the player
    pub deaths: u16,
    pub kills: u16,
    /// Times one was seen waking up
    pub wake: u8,
    /// Times one was seen ignoring the player
    pub ignore: u8,
    pub moves: MoveFlags,
    pub spells: SpellFlags,
    pub defense: DefenseFlags,
}

impl Recall {
    pub fn notice_attack(&mut self, slot: usize) {
        if let Some(count) = self.attacks.get_mut(slot) {
            *count = count.saturating_add(1);
        }
    }

    pub fn notice_wake(&mut self) {
        self.wake = self.wake.saturating_add(1);
    }

    pub fn notice_ignore(&mut self) {
        self.ignore = self.ignore.saturating_add(1);
    }
}

/// Memory for every species, indexed like the species table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecallBook {
    entries: Vec<Recall>,
}

impl RecallBook {
    pub fn new(species_count: usize) -> Self {
        Self {
            entries: vec![Recall::default(); species_count],
        }
    }

    pub fn get(&self, species: usize) -> &Recall {
        &self.entries[species]
    }

    pub fn get_mut(&mut self, species: usize) -> &mut Recall {
        &mut self.entries[species]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_counter_saturates() {
        let mut r = Recall::default();
        for _ in 0..300 {
            r.notice_attack(1);
        }
        assert_eq!(r.attacks[1], u8::MAX);
        assert_eq!(r.attacks[0], 0);
        // out of range slots are ignored
        r.notice_attack(MAX_MON_NATTACK);
    }
}
