//! Level generation
//!
//! Builds a cave level into the world: rooms on a coarse slot grid, tunnels
//! between them, ore streamers, stairs, then the initial population. Every
//! level is checked for reachability before it is handed back.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::cell::Feature;
use super::level::Level;
use super::rooms;
use super::town::town_gen;
use super::tunnel::{
    build_tunnel, fill_cave, gold_value, junction_doors, place_boundary, place_streamer,
};
use crate::config::DungeonConfig;
use crate::consts::{
    MIN_MALLOC_LEVEL, QUART_HEIGHT, QUART_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH, TREAS_ANY_ALLOC,
    TREAS_GOLD_ALLOC, TREAS_ROOM_ALLOC,
};
use crate::geometry::Coord;
use crate::item::FloorItem;
use crate::monster::spawn::{alloc_monster, place_monster, random_spot};
use crate::monster::table::{GHOST_UNIQUE, WIN_UNIQUE};
use crate::rng::GameRng;
use crate::world::World;

/// Summary of one generated level
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub depth: i32,
    /// Layouts built before one passed the reachability check
    pub attempts: u32,
    pub rooms: usize,
    pub unusual_rooms: usize,
    pub vaults: usize,
    pub pit: bool,
    /// Creatures placed by the initial allocation pass
    pub monsters: i32,
    pub start: Coord,
}

/// Build the level for `world.depth` and put the player on it
///
/// # Panics
///
/// Panics when no connected layout is found within
/// `generation_attempts` tries; that means the configuration is unusable.
pub fn generate_level(world: &mut World) -> GenerationReport {
    world.release_uniques();
    world.flags.new_level = false;
    if world.is_town() {
        return town_gen(world);
    }

    let cfg = world.config.dungeon.clone();
    let attempts = cfg.generation_attempts.max(1);
    for attempt in 1..=attempts {
        world.level = Level::new(world.depth, cfg.height, cfg.width);
        let mut report = cave_layout(world, &cfg);
        let Some(start) = new_spot(&world.level, &mut world.rng) else {
            warn!(target: "mo_core.dungeon", attempt, "no free floor for the player");
            world.release_uniques();
            continue;
        };
        let missing = unreachable_cells(&world.level, start);
        if !missing.is_empty() {
            warn!(
                target: "mo_core.dungeon",
                attempt,
                unreachable = missing.len(),
                "level not connected, regenerating"
            );
            world.release_uniques();
            continue;
        }
        report.attempts = attempt;
        report.start = start;
        world.move_player(start);
        populate(world, &cfg, &mut report);
        info!(
            target: "mo_core.dungeon",
            depth = report.depth,
            attempts = attempt,
            rooms = report.rooms,
            monsters = world.level.live_monsters(),
            "generated level"
        );
        return report;
    }
    panic!("no connected level at depth {} after {attempts} attempts", world.depth);
}

/// Terrain, rooms, tunnels and stairs
fn cave_layout(world: &mut World, cfg: &DungeonConfig) -> GenerationReport {
    let depth = world.depth;
    let mut report = GenerationReport {
        depth,
        ..Default::default()
    };
    let row_rooms = (2 * (cfg.height / SCREEN_HEIGHT)).max(1);
    let col_rooms = (2 * (cfg.width / SCREEN_WIDTH)).max(1);
    let mut slots = vec![vec![false; col_rooms as usize]; row_rooms as usize];
    let wanted = world.rng.randnor(cfg.room_mean, 2).max(1);
    for _ in 0..wanted {
        let i = world.rng.randint(row_rooms) - 1;
        let j = world.rng.randint(col_rooms) - 1;
        slots[i as usize][j as usize] = true;
    }

    let mut pit_built = false;
    let mut centres = Vec::new();
    for i in 0..row_rooms {
        for j in 0..col_rooms {
            if !slots[i as usize][j as usize] {
                continue;
            }
            let center = Coord::new(
                i * (SCREEN_HEIGHT / 2) + QUART_HEIGHT,
                j * (SCREEN_WIDTH / 2) + QUART_WIDTH,
            );
            let lit = depth <= world.rng.randint(25);
            if depth > world.rng.randint(cfg.unusual_rooms) {
                report.unusual_rooms += 1;
                match world.rng.randint(4) {
                    1 => rooms::build_type1(world, center, lit),
                    2 => rooms::build_type2(world, center, lit),
                    3 => rooms::build_type3(world, center, lit),
                    _ => {
                        if depth >= cfg.vault_min_depth && rooms::build_type5(world, center, lit) {
                            report.vaults += 1;
                            for (di, dj) in [(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)] {
                                let (si, sj) = (i + di, j + dj);
                                if (0..row_rooms).contains(&si) && (0..col_rooms).contains(&sj) {
                                    slots[si as usize][sj as usize] = false;
                                }
                            }
                        } else {
                            rooms::build_type2(world, center, lit);
                        }
                    }
                }
            } else if !pit_built && depth >= cfg.pit_min_depth && world.rng.randint(cfg.pit_chance) == 1 {
                if rooms::build_pit(world, center, lit) {
                    pit_built = true;
                } else {
                    rooms::build_type2(world, center, lit);
                }
            } else {
                rooms::build_room(world, center, lit);
            }
            centres.push(center);
        }
    }
    report.rooms = centres.len();
    report.pit = pit_built;
    debug!(target: "mo_core.dungeon", rooms = centres.len(), pit = pit_built, "rooms built");

    let k = centres.len();
    for _ in 0..k {
        let a = (world.rng.randint(k as i32) - 1) as usize;
        let b = (world.rng.randint(k as i32) - 1) as usize;
        centres.swap(a, b);
    }
    if let Some(&first) = centres.first() {
        centres.push(first);
    }
    let mut junctions = Vec::new();
    for pair in centres.windows(2) {
        build_tunnel(&mut world.level, &mut world.rng, cfg, pair[1], pair[0], &mut junctions);
    }

    fill_cave(&mut world.level);
    for _ in 0..cfg.magma_streamers {
        place_streamer(&mut world.level, &mut world.rng, cfg, Feature::Magma, cfg.magma_treasure);
    }
    for _ in 0..cfg.quartz_streamers {
        place_streamer(&mut world.level, &mut world.rng, cfg, Feature::Quartz, cfg.quartz_treasure);
    }
    place_boundary(&mut world.level);
    junction_doors(&mut world.level, &mut world.rng, cfg, &junctions);

    let quest = cfg.is_quest_level(depth);
    let down = world.rng.randint(2) + 2;
    place_stairs(&mut world.level, &mut world.rng, Feature::DownStairs, down, 3, quest);
    let up = world.rng.randint(2);
    place_stairs(&mut world.level, &mut world.rng, Feature::UpStairs, up, 3, quest);
    report
}

/// Creature count scaling with depth
pub fn alloc_level(depth: i32) -> i32 {
    (depth / 3).clamp(2, 10)
}

/// Monsters, objects and uniques for a freshly laid out level
fn populate(world: &mut World, cfg: &DungeonConfig, report: &mut GenerationReport) {
    let depth = world.depth;
    let alloc = alloc_level(depth);
    let wanted = world.rng.randint(8) + MIN_MALLOC_LEVEL + alloc;
    report.monsters = alloc_monster(world, wanted, 0, true);

    let n = world.rng.randint(alloc);
    alloc_object(world, |f| f == Feature::Corridor, Stock::Rubble, n);
    let n = world.rng.randnor(TREAS_ROOM_ALLOC, 3);
    alloc_object(world, |f| f == Feature::RoomFloor, Stock::Object, n);
    let n = world.rng.randnor(TREAS_ANY_ALLOC, 3);
    alloc_object(world, |f| f.is_floor(), Stock::Object, n);
    let n = world.rng.randnor(TREAS_GOLD_ALLOC, 3);
    alloc_object(world, |f| f.is_floor(), Stock::Gold, n);

    let sight = world.config.monsters.max_sight;
    if depth >= cfg.ghost_min_depth
        && world.rng.randint(cfg.ghost_chance) == 1
        && world.uniques.available(GHOST_UNIQUE)
        && let Some(pos) = random_spot(world, sight)
    {
        place_monster(world, GHOST_UNIQUE, pos, false);
        debug!(target: "mo_core.dungeon", ?pos, "ghost placed");
    }
    if depth >= cfg.win_monster_depth
        && world.uniques.available(WIN_UNIQUE)
        && let Some(pos) = random_spot(world, sight)
    {
        place_monster(world, WIN_UNIQUE, pos, false);
        debug!(target: "mo_core.dungeon", ?pos, "win creature placed");
    }
}

/// What an allocation pass drops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stock {
    Rubble,
    Gold,
    Object,
}

/// Drop `num` things on random cells whose terrain passes `accept`
///
/// The player's cell and cells already holding an item are skipped.
fn alloc_object(world: &mut World, accept: impl Fn(Feature) -> bool, stock: Stock, num: i32) {
    let (h, w) = (world.level.height, world.level.width);
    for _ in 0..num {
        let mut spot = None;
        for _ in 0..1000 {
            let c = Coord::new(world.rng.randint(h - 2), world.rng.randint(w - 2));
            let cell = world.level.cell(c);
            if accept(cell.feature) && cell.item.is_none() && c != world.player.pos {
                spot = Some(c);
                break;
            }
        }
        let Some(c) = spot else {
            return;
        };
        match stock {
            Stock::Rubble => {
                if world.level.cell(c).occupant.monster().is_none() {
                    world.level.set_feature(c, Feature::Rubble);
                }
            }
            Stock::Gold => {
                let value = gold_value(&mut world.rng, world.depth);
                world.level.place_item(c, FloorItem::gold(value));
            }
            Stock::Object => rooms::place_object(world, c),
        }
    }
}

/// Put `num` staircases of `kind` on floor cells with at least `walls`
/// orthogonal wall neighbours
///
/// Random 12x12 windows are scanned; after 30 failed windows the wall
/// requirement drops by one. On a quest level down stairs become up stairs.
pub(super) fn place_stairs(
    level: &mut Level,
    rng: &mut GameRng,
    kind: Feature,
    num: i32,
    walls: usize,
    quest: bool,
) {
    let kind = if quest && kind == Feature::DownStairs {
        Feature::UpStairs
    } else {
        kind
    };
    let span_y = (level.height - 14).max(1);
    let span_x = (level.width - 14).max(1);
    for _ in 0..num {
        let mut need = walls as i32;
        let mut placed = false;
        while !placed && need >= 0 {
            for _ in 0..=30 {
                let y0 = rng.randint(span_y);
                let x0 = rng.randint(span_x);
                let window = (y0..y0 + 12)
                    .flat_map(|y| (x0..x0 + 12).map(move |x| Coord::new(y, x)))
                    .find(|&c| {
                        level.in_bounds(c)
                            && level.cell(c).is_vacant_floor()
                            && level.next_to_walls(c) as i32 >= need
                    });
                if let Some(c) = window {
                    level.set_feature(c, kind);
                    placed = true;
                    break;
                }
            }
            need -= 1;
        }
        if !placed {
            warn!(target: "mo_core.dungeon", %kind, "no room for stairs");
        }
    }
}

/// A random vacant floor cell for the player
pub(super) fn new_spot(level: &Level, rng: &mut GameRng) -> Option<Coord> {
    let free: Vec<Coord> = level
        .coords()
        .filter(|&c| level.in_bounds(c) && level.cell(c).is_vacant_floor())
        .collect();
    rng.choose(&free).copied()
}

/// Open cells that cannot be reached from `start`
///
/// The walk is 8-connected and passes through doors, secret doors and
/// rubble. Stairs, floor and corridor cells must all be reached.
pub fn unreachable_cells(level: &Level, start: Coord) -> Vec<Coord> {
    let mut reached = vec![vec![false; level.width as usize]; level.height as usize];
    let mut stack = vec![start];
    reached[start.y as usize][start.x as usize] = true;
    while let Some(c) = stack.pop() {
        for n in c.neighbors() {
            if !level.on_grid(n) || reached[n.y as usize][n.x as usize] {
                continue;
            }
            if level.feature(n).is_traversable() {
                reached[n.y as usize][n.x as usize] = true;
                stack.push(n);
            }
        }
    }
    level
        .coords()
        .filter(|&c| level.feature(c).is_open() && !reached[c.y as usize][c.x as usize])
        .collect()
}

/// Every open cell is reachable from `start`
pub fn is_connected(level: &Level, start: Coord) -> bool {
    unreachable_cells(level, start).is_empty()
}
