//! Creating and relocating monsters
//!
//! Initial population, summons, breeding and teleportation. Summons receive
//! an explicit [`SummonContext`] naming who called them.

use tracing::{debug, trace, warn};

use super::{Monster, MonsterId, MoveFlags};
use crate::dungeon::Occupant;
use crate::geometry::{Coord, distance};
use crate::world::World;

/// Depth bonus for summoned creatures
const SUMMON_LEVEL_ADJ: i32 = 2;
/// Attempts to find an empty spot before giving up
const SPOT_TRIES: u32 = 10_000;

/// Create a monster of `species` at `pos`
///
/// Returns `None` when the monster table is full. Sleeping creatures start
/// with a randomised sleep counter derived from the species' base value.
pub fn place_monster(world: &mut World, species: usize, pos: Coord, sleep: bool) -> Option<MonsterId> {
    if world.level.live_monsters() >= world.config.monsters.max_monsters {
        trace!(target: "mo_core.monster", species, "monster table full");
        return None;
    }
    let sp = world.species.get(species);
    let hp = if sp.defense.contains(super::DefenseFlags::MAX_HP) {
        sp.hit_dice.0 * sp.hit_dice.1
    } else {
        world.rng.damroll(sp.hit_dice.0, sp.hit_dice.1)
    };
    let mut monster = Monster::new(species, pos, hp);
    monster.distance = distance(pos, world.player.pos);
    if sleep && sp.sleep > 0 {
        monster.sleep = sp.sleep * 2 + world.rng.randint(sp.sleep * 10);
    }
    if sp.is_unique() {
        world.uniques.alive.insert(species);
    }
    Some(world.level.add_monster(monster))
}

/// Whether a monster could be dropped on `c`
fn open_spot(world: &World, c: Coord) -> bool {
    let cell = world.level.cell(c);
    cell.feature.is_floor() && cell.occupant == Occupant::Empty
}

/// A random floor spot more than `dis` away from the player
pub fn random_spot(world: &mut World, dis: i32) -> Option<Coord> {
    let (h, w) = (world.level.height, world.level.width);
    for _ in 0..SPOT_TRIES {
        let c = Coord::new(world.rng.randint(h - 2), world.rng.randint(w - 2));
        if open_spot(world, c) && distance(c, world.player.pos) > dis {
            return Some(c);
        }
    }
    None
}

/// Scatter `num` level-appropriate monsters more than `dis` from the player
///
/// Returns how many were placed.
pub fn alloc_monster(world: &mut World, num: i32, dis: i32, sleep: bool) -> i32 {
    let mut placed = 0;
    for _ in 0..num {
        let Some(pos) = random_spot(world, dis) else {
            warn!(target: "mo_core.monster", placed, num, "no room left for monsters");
            break;
        };
        let species = world.species.get_mons_num(
            &mut world.rng,
            world.level.depth,
            world.config.monsters.nasty_chance,
        );
        let sleep = sleep || world.species.get(species).always_sleeps();
        if place_monster(world, species, pos, sleep).is_none() {
            break;
        }
        placed += 1;
    }
    placed
}

/// Which creatures a summon may produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummonFilter {
    #[default]
    Any,
    Undead,
}

/// Who is summoning, and what
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummonContext {
    /// The creature casting the summon, if any
    pub summoner: Option<MonsterId>,
    /// Depth used to pick the summoned species
    pub depth: i32,
    pub filter: SummonFilter,
}

impl SummonContext {
    pub fn new(summoner: Option<MonsterId>, depth: i32, filter: SummonFilter) -> Self {
        Self {
            summoner,
            depth,
            filter,
        }
    }
}

/// Summon one creature next to `around`; returns where it appeared
pub fn summon_monster(world: &mut World, ctx: SummonContext, around: Coord) -> Option<Coord> {
    let species = match ctx.filter {
        SummonFilter::Any => world.species.get_mons_num(
            &mut world.rng,
            ctx.depth + SUMMON_LEVEL_ADJ,
            world.config.monsters.nasty_chance,
        ),
        SummonFilter::Undead => {
            let undead = (0..world.species.ordinary())
                .filter(|&i| world.species.get(i).is_undead())
                .collect::<Vec<_>>();
            *world.rng.choose(&undead)?
        }
    };
    for _ in 0..10 {
        let c = around.offset(world.rng.randint(3) - 2, world.rng.randint(3) - 2);
        if !world.level.in_bounds(c) {
            continue;
        }
        let cell = world.level.cell(c);
        if cell.feature.is_open() && cell.occupant == Occupant::Empty {
            place_monster(world, species, c, false)?;
            debug!(
                target: "mo_core.monster",
                summoner = ?ctx.summoner,
                species = world.species.get(species).name,
                "summoned"
            );
            return Some(c);
        }
    }
    None
}

/// A breeder tries to produce a copy of itself next to its position
pub fn multiply_monster(world: &mut World, parent: MonsterId) -> Option<MonsterId> {
    let (species, pos) = {
        let m = world.level.monster(parent)?;
        (m.species, m.pos)
    };
    let sp = world.species.get(species);
    for _ in 0..=18 {
        let c = pos.offset(world.rng.randint(3) - 2, world.rng.randint(3) - 2);
        if !world.level.in_bounds(c) || c == pos {
            continue;
        }
        let cell = world.level.cell(c);
        if !cell.feature.is_open() || cell.item.is_some() {
            continue;
        }
        let occupant = cell.occupant;
        match occupant {
            Occupant::Player => continue,
            Occupant::Monster(victim) => {
                let victim_exp = world
                    .level
                    .monster(victim)
                    .map(|v| world.species.get(v.species).exp)
                    .unwrap_or(i32::MAX);
                if sp.moves.contains(MoveFlags::EATS_OTHER) && sp.exp >= victim_exp {
                    world.level.remove_monster(victim);
                    debug!(target: "mo_core.monster", ?victim, "breeder ate a neighbour");
                } else {
                    continue;
                }
            }
            Occupant::Empty => {}
        }
        let child = place_monster(world, species, c, false)?;
        world.level.multiplied += 1;
        trace!(target: "mo_core.monster", ?parent, ?child, "multiplied");
        return Some(child);
    }
    None
}

/// Move a monster to a random open spot roughly `dis` away
///
/// The search radius grows every ten failed picks; after a hard cap the
/// monster stays where it is.
pub fn teleport_away(world: &mut World, id: MonsterId, dis: i32) -> bool {
    let Some(from) = world.level.monster(id).map(|m| m.pos) else {
        return false;
    };
    let mut dis = dis.max(1);
    let mut tries = 0;
    for attempt in 0..SPOT_TRIES {
        let c = from.offset(
            world.rng.randint(2 * dis + 1) - (dis + 1),
            world.rng.randint(2 * dis + 1) - (dis + 1),
        );
        tries += 1;
        if tries > 9 {
            tries = 0;
            dis += 5;
        }
        if !world.level.in_bounds(c) || !open_spot(world, c) {
            continue;
        }
        world.level.move_monster(id, c);
        let player = world.player.pos;
        if let Some(m) = world.level.monster_mut(id) {
            m.visible = false;
            m.distance = distance(c, player);
        }
        trace!(target: "mo_core.monster", ?id, attempt, "teleported away");
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::dungeon::{Feature, Level};
    use crate::monster::table::SPECIES;

    fn open_world() -> World {
        let mut world = World::new(GameConfig::default(), 9);
        let mut level = Level::new(5, 20, 40);
        for y in 1..19 {
            for x in 1..39 {
                level.set_feature(Coord::new(y, x), Feature::RoomFloor);
            }
        }
        world.level = level;
        world.move_player(Coord::new(10, 20));
        world
    }

    fn find(name: &str) -> usize {
        SPECIES.iter().position(|s| s.name == name).unwrap()
    }

    #[test]
    fn test_place_monster_max_hp() {
        let mut world = open_world();
        let cube = find("gelatinous cube");
        let id = place_monster(&mut world, cube, Coord::new(2, 2), false).unwrap();
        assert_eq!(world.level.monster(id).unwrap().hp, 300);
    }

    #[test]
    fn test_place_monster_sleep_range() {
        let mut world = open_world();
        let jackal = find("jackal");
        for i in 0..20 {
            let id = place_monster(&mut world, jackal, Coord::new(2, 2 + i), true).unwrap();
            let sleep = world.level.monster(id).unwrap().sleep;
            assert!((21..=120).contains(&sleep), "sleep = {sleep}");
        }
    }

    #[test]
    fn test_table_cap() {
        let mut world = open_world();
        world.config.monsters.max_monsters = 3;
        assert_eq!(alloc_monster(&mut world, 10, 0, false), 3);
    }

    #[test]
    fn test_alloc_respects_distance() {
        let mut world = open_world();
        alloc_monster(&mut world, 20, 5, false);
        for m in &world.level.monsters {
            assert!(distance(m.pos, world.player.pos) > 5);
        }
    }

    #[test]
    fn test_multiply_adjacent() {
        let mut world = open_world();
        let worm = find("white worm mass");
        let parent = place_monster(&mut world, worm, Coord::new(5, 5), false).unwrap();
        let child = multiply_monster(&mut world, parent).unwrap();
        let c = world.level.monster(child).unwrap().pos;
        assert!(distance(c, Coord::new(5, 5)) == 1);
        assert_eq!(world.level.multiplied, 1);
    }

    #[test]
    fn test_teleport_away_moves() {
        let mut world = open_world();
        let id = place_monster(&mut world, find("jackal"), Coord::new(5, 5), false).unwrap();
        assert!(teleport_away(&mut world, id, 10));
        let pos = world.level.monster(id).unwrap().pos;
        assert_eq!(world.level.monster_at(pos), Some(id));
        assert!(!world.level.monster(id).unwrap().visible);
    }

    #[test]
    fn test_summon_undead_filter() {
        let mut world = open_world();
        let ctx = SummonContext::new(None, 5, SummonFilter::Undead);
        let c = summon_monster(&mut world, ctx, Coord::new(5, 5)).unwrap();
        let id = world.level.monster_at(c).unwrap();
        let m = world.level.monster(id).unwrap();
        assert!(world.species.get(m.species).is_undead());
    }
}
