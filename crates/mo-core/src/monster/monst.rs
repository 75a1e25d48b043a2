//! Monster instances

use serde::{Deserialize, Serialize};

use super::species::Species;
use crate::geometry::Coord;

/// Stable identifier of a live monster on the current level
///
/// Ids are never reused within a level, so a stale id simply fails to look
/// anything up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(pub u32);

impl MonsterId {
    pub const NONE: MonsterId = MonsterId(0);

    pub fn next(self) -> Self {
        MonsterId(self.0 + 1)
    }
}

/// A live creature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub id: MonsterId,
    /// Index into the species table
    pub species: usize,
    pub pos: Coord,
    pub hp: i32,
    pub max_hp: i32,
    /// Asleep while positive
    pub sleep: i32,
    /// Added to the species speed; aggravation and slow spells change it
    pub speed_mod: i32,
    pub confused: i32,
    pub stunned: i32,
    pub afraid: i32,
    /// Cached distance to the player
    pub distance: i32,
    /// Currently seen by the player
    pub visible: bool,
}

impl Monster {
    pub fn new(species: usize, pos: Coord, hp: i32) -> Self {
        Self {
            id: MonsterId::NONE,
            species,
            pos,
            hp,
            max_hp: hp,
            sleep: 0,
            speed_mod: 0,
            confused: 0,
            stunned: 0,
            afraid: 0,
            distance: i32::MAX,
            visible: false,
        }
    }

    /// Current speed, never below one
    pub fn speed(&self, species: &Species) -> i32 {
        (species.speed + self.speed_mod).max(1)
    }

    pub const fn is_asleep(&self) -> bool {
        self.sleep > 0
    }

    pub const fn is_dead(&self) -> bool {
        self.hp < 0
    }

    /// Wake the creature up
    pub fn wake(&mut self) {
        self.sleep = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monster::table::SPECIES;

    #[test]
    fn test_speed_floor() {
        let mut m = Monster::new(0, Coord::new(1, 1), 5);
        m.speed_mod = -50;
        assert_eq!(m.speed(&SPECIES[0]), 1);
    }

    #[test]
    fn test_dead_only_below_zero() {
        let mut m = Monster::new(0, Coord::new(1, 1), 0);
        assert!(!m.is_dead());
        m.hp = -1;
        assert!(m.is_dead());
    }
}
