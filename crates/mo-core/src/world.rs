//! The world aggregate
//!
//! Everything the generator, the creature engine and the turn loop share,
//! owned in one place and passed by reference. Several worlds can coexist.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use tracing::debug;

use crate::config::GameConfig;
use crate::consts::NORMAL_SPEED;
use crate::dungeon::{Level, Occupant};
use crate::geometry::{Coord, distance};
use crate::item::{ItemQuery, Pack};
use crate::monster::{RecallBook, SpeciesTable};
use crate::player::Player;
use crate::rng::GameRng;

/// Random picks before a teleport gives up
const SPOT_TRIES: u32 = 2_000;

/// Flags that end the current level or the game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldFlags {
    /// Leave the current level at the end of this turn
    pub new_level: bool,
    /// Input ended; stop cleanly
    pub eof: bool,
    /// The player killed the win creature
    pub total_winner: bool,
    /// The player asked to quit
    pub quit: bool,
}

/// Unique creatures placed or killed so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueLedger {
    pub alive: HashSet<usize>,
    pub killed: HashSet<usize>,
}

impl UniqueLedger {
    /// Whether the unique may be placed now
    pub fn available(&self, species: usize) -> bool {
        !self.alive.contains(&species) && !self.killed.contains(&species)
    }
}

/// Shared game state
pub struct World {
    pub config: GameConfig,
    pub rng: GameRng,
    pub species: SpeciesTable,
    pub recall: RecallBook,
    pub level: Level,
    pub player: Player,
    pub pack: Box<dyn ItemQuery>,
    pub turn: u64,
    pub depth: i32,
    pub max_depth: i32,
    pub flags: WorldFlags,
    pub uniques: UniqueLedger,
}

impl World {
    /// A fresh world standing above the dungeon; call
    /// [`crate::dungeon::generate_level`] to build the first level
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let species = SpeciesTable::default();
        let recall = RecallBook::new(species.len());
        let level = Level::new(0, config.dungeon.height, config.dungeon.width);
        Self {
            config,
            rng: GameRng::new(seed),
            species,
            recall,
            level,
            player: Player::default(),
            pack: Box::new(Pack::starting_kit()),
            turn: 0,
            depth: 0,
            max_depth: 0,
            flags: WorldFlags::default(),
            uniques: UniqueLedger::default(),
        }
    }

    /// Same as [`World::new`] starting at `depth`
    pub fn at_depth(config: GameConfig, seed: u64, depth: i32) -> Self {
        let mut world = Self::new(config, seed);
        world.depth = depth;
        world.max_depth = depth;
        world
    }

    pub fn with_pack(mut self, pack: Box<dyn ItemQuery>) -> Self {
        self.pack = pack;
        self
    }

    pub fn is_town(&self) -> bool {
        self.depth == 0
    }

    /// Daytime in town
    pub fn is_day(&self) -> bool {
        (self.turn / self.config.town.day_length.max(1)) % 2 == 0
    }

    /// Game over for any reason
    pub fn is_over(&self) -> bool {
        self.player.dead || self.flags.eof || self.flags.quit
    }

    /// Cached distance of every monster and the player's mark on the grid
    pub fn refresh_distances(&mut self) {
        let p = self.player.pos;
        for m in &mut self.level.monsters {
            m.distance = distance(m.pos, p);
        }
    }

    /// Move the player, keeping the grid marker in step
    pub fn move_player(&mut self, to: Coord) {
        let from = self.player.pos;
        self.level.move_player(Some(from), to);
        self.player.pos = to;
        self.refresh_distances();
    }

    /// A vacant floor cell within `dis` of `around`, widening the search
    /// every ten misses
    fn spot_near(&mut self, around: Coord, dis: i32) -> Option<Coord> {
        let mut dis = dis.max(1);
        for attempt in 1..=SPOT_TRIES {
            let c = around.offset(
                self.rng.randint(2 * dis + 1) - (dis + 1),
                self.rng.randint(2 * dis + 1) - (dis + 1),
            );
            if attempt % 10 == 0 {
                dis += 1;
            }
            if c == around || !self.level.in_bounds(c) {
                continue;
            }
            let cell = self.level.cell(c);
            if cell.feature.is_floor() && cell.occupant == Occupant::Empty {
                return Some(c);
            }
        }
        None
    }

    /// Teleport the player to a random spot about `dis` away
    pub fn teleport_player(&mut self, dis: i32) -> bool {
        match self.spot_near(self.player.pos, dis) {
            Some(c) => {
                debug!(target: "mo_core.player", from = ?self.player.pos, to = ?c, "teleported");
                self.move_player(c);
                true
            }
            None => false,
        }
    }

    /// Pull the player next to `target`
    pub fn teleport_player_to(&mut self, target: Coord) -> bool {
        match self.spot_near(target, 1) {
            Some(c) => {
                self.move_player(c);
                true
            }
            None => false,
        }
    }

    /// Wake every monster and speed up those within `dis`
    ///
    /// Returns whether any monster was hastened.
    pub fn aggravate_monsters(&mut self, dis: i32) -> bool {
        let mut hastened = false;
        for m in &mut self.level.monsters {
            m.wake();
            let species = self.species.get(m.species);
            if m.distance <= dis && m.speed(species) < 3 * NORMAL_SPEED {
                m.speed_mod += NORMAL_SPEED;
                hastened = true;
            }
        }
        hastened
    }

    /// Uniques left on a level being discarded may be placed again
    pub fn release_uniques(&mut self) {
        for m in &self.level.monsters {
            self.uniques.alive.remove(&m.species);
        }
    }

    /// Record the death of a monster's species for unique bookkeeping
    pub fn note_kill(&mut self, species: usize) {
        if self.species.get(species).is_unique() {
            self.uniques.alive.remove(&species);
            self.uniques.killed.insert(species);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_night_cycle() {
        let mut world = World::new(GameConfig::default(), 1);
        assert!(world.is_day());
        world.turn = world.config.town.day_length;
        assert!(!world.is_day());
        world.turn *= 2;
        assert!(world.is_day());
    }

    #[test]
    fn test_unique_ledger() {
        let mut ledger = UniqueLedger::default();
        assert!(ledger.available(3));
        ledger.alive.insert(3);
        assert!(!ledger.available(3));
        ledger.alive.remove(&3);
        ledger.killed.insert(3);
        assert!(!ledger.available(3));
    }
}
