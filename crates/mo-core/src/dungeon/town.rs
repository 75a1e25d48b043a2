//! Town level
//!
//! Six stores on a fixed layout; only the lighting and the townspeople
//! depend on the time of day.

use tracing::info;

use super::cell::Feature;
use super::generation::{GenerationReport, new_spot, place_stairs};
use super::level::Level;
use super::tunnel::place_boundary;
use crate::consts::{MAX_STORES, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::geometry::Coord;
use crate::monster::spawn::alloc_monster;
use crate::rng::GameRng;
use crate::world::World;

/// Town dwellers never appear this close to the player
const TOWN_MONSTER_DISTANCE: i32 = 3;

/// Build the town into the world
pub fn town_gen(world: &mut World) -> GenerationReport {
    let mut level = Level::new(0, SCREEN_HEIGHT, SCREEN_WIDTH);
    // the layout is the same every visit
    let mut layout_rng = GameRng::new(world.config.town.seed);
    let mut stores: Vec<u8> = (0..MAX_STORES).collect();
    for y in 0..2 {
        for x in 0..3 {
            let k = (layout_rng.randint(stores.len() as i32) - 1) as usize;
            let store = stores.remove(k);
            build_store(&mut level, &mut layout_rng, store, y, x);
        }
    }
    for row in &mut level.cells {
        for cell in row {
            if cell.feature == Feature::Null {
                cell.feature = Feature::RoomFloor;
            }
        }
    }
    place_boundary(&mut level);
    place_stairs(&mut level, &mut layout_rng, Feature::DownStairs, 1, 0, false);

    let day = world.is_day();
    for row in &mut level.cells {
        for cell in row {
            cell.perma_lit = day || cell.feature != Feature::RoomFloor;
        }
    }
    world.level = level;

    let mut report = GenerationReport::default();
    if let Some(start) = new_spot(&world.level, &mut world.rng) {
        world.move_player(start);
        report.start = start;
    }
    let wanted = if day {
        world.config.town.day_monsters
    } else {
        world.config.town.night_monsters
    };
    report.attempts = 1;
    report.monsters = alloc_monster(world, wanted, TOWN_MONSTER_DISTANCE, true);
    info!(target: "mo_core.dungeon", day, monsters = report.monsters, "generated town");
    report
}

/// A solid store block with one entrance on a random side
fn build_store(level: &mut Level, rng: &mut GameRng, store: u8, row: i32, col: i32) {
    let yc = row * 10 + 5;
    let xc = col * 16 + 16;
    let top = yc - rng.randint(3);
    let bottom = yc + rng.randint(4);
    let left = xc - rng.randint(6);
    let right = xc + rng.randint(6);
    for y in top..=bottom {
        for x in left..=right {
            level.set_feature(Coord::new(y, x), Feature::Boundary);
        }
    }
    let side = rng.randint(4);
    let door = if side < 3 {
        let y = rng.randint(bottom - top) + top - 1;
        Coord::new(y, if side == 1 { left } else { right })
    } else {
        let x = rng.randint(right - left) + left - 1;
        Coord::new(if side == 3 { bottom } else { top }, x)
    };
    level.set_feature(door, Feature::StoreEntrance(store));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    #[test]
    fn test_town_has_every_store_once() {
        let mut world = World::new(GameConfig::default(), 4);
        town_gen(&mut world);
        for store in 0..MAX_STORES {
            assert_eq!(world.level.find_features(Feature::StoreEntrance(store)).len(), 1);
        }
        assert_eq!(world.level.find_features(Feature::DownStairs).len(), 1);
    }

    #[test]
    fn test_town_layout_is_fixed() {
        let mut a = World::new(GameConfig::default(), 1);
        let mut b = World::new(GameConfig::default(), 2);
        town_gen(&mut a);
        town_gen(&mut b);
        for c in a.level.coords() {
            assert_eq!(a.level.feature(c), b.level.feature(c));
        }
    }

    #[test]
    fn test_night_lights_only_buildings() {
        let mut world = World::new(GameConfig::default(), 5);
        world.turn = world.config.town.day_length;
        town_gen(&mut world);
        for c in world.level.coords() {
            let cell = world.level.cell(c);
            assert_eq!(cell.perma_lit, cell.feature != Feature::RoomFloor);
        }
        for m in &world.level.monsters {
            assert!(crate::geometry::distance(m.pos, world.player.pos) > 3);
        }
    }
}
