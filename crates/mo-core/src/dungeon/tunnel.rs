//! Tunnels, doors, streamers and the level fill
//!
//! The tunnel walker carves from one room centre to another. Walls it pierces
//! become doors or plain openings; the corridors it crosses are remembered as
//! junctions so doors can be added there once the level is filled.

use tracing::trace;

use super::cell::Feature;
use super::level::Level;
use crate::config::DungeonConfig;
use crate::geometry::{Coord, Direction};
use crate::item::FloorItem;
use crate::rng::GameRng;

/// A random orthogonal direction
pub fn rand_dir(rng: &mut GameRng) -> (i32, i32) {
    match rng.randint(4) {
        1 => (-1, 0),
        2 => (1, 0),
        3 => (0, -1),
        _ => (0, 1),
    }
}

/// Orthogonal direction towards `to`
///
/// When the target is off both axes one component is dropped at random, so
/// tunnels never move diagonally.
pub fn correct_dir(rng: &mut GameRng, from: Coord, to: Coord) -> (i32, i32) {
    let mut dy = (to.y - from.y).signum();
    let mut dx = (to.x - from.x).signum();
    if dy != 0 && dx != 0 {
        if rng.randint(2) == 1 {
            dy = 0;
        } else {
            dx = 0;
        }
    }
    (dy, dx)
}

/// Put a random kind of door on `c`
pub fn place_door(level: &mut Level, rng: &mut GameRng, c: Coord) {
    let cell = level.cell_mut(c);
    cell.door_strength = 0;
    match rng.randint(3) {
        1 => {
            cell.feature = if rng.randint(4) == 1 {
                Feature::BrokenDoor
            } else {
                Feature::OpenDoor
            };
        }
        2 => {
            cell.feature = Feature::ClosedDoor;
            if rng.randint(15) == 1 {
                cell.door_strength = (rng.randint(10) + 10) as i16;
            } else if rng.randint(5) == 1 {
                cell.door_strength = (-rng.randint(10) - 10) as i16;
            }
        }
        _ => cell.feature = Feature::SecretDoor,
    }
}

/// Carve a tunnel from `start` towards `end`
///
/// Corridor cells it runs into are pushed onto `junctions`, once per run.
pub fn build_tunnel(
    level: &mut Level,
    rng: &mut GameRng,
    cfg: &DungeonConfig,
    start: Coord,
    end: Coord,
    junctions: &mut Vec<Coord>,
) {
    let mut tunnel = Vec::new();
    let mut pierced = Vec::new();
    let mut cur = start;
    let mut dir = correct_dir(rng, cur, end);
    let mut in_corridor = false;
    let mut steps = 0;

    while cur != end {
        steps += 1;
        if steps > cfg.tunnel_step_cap {
            trace!(target: "mo_core.dungeon", ?start, ?end, "tunnel hit step cap");
            break;
        }
        if rng.randint(100) > cfg.dir_change {
            dir = if rng.randint(cfg.random_dir) == 1 {
                rand_dir(rng)
            } else {
                correct_dir(rng, cur, end)
            };
        }
        let mut next = cur.offset(dir.0, dir.1);
        while !level.in_bounds(next) {
            dir = if rng.randint(cfg.random_dir) == 1 {
                rand_dir(rng)
            } else {
                correct_dir(rng, cur, end)
            };
            next = cur.offset(dir.0, dir.1);
        }

        match level.feature(next) {
            Feature::Null => {
                cur = next;
                tunnel.push(cur);
                in_corridor = false;
            }
            Feature::TunnelEdge => {}
            Feature::Granite => {
                cur = next;
                pierced.push(cur);
                for y in cur.y - 1..=cur.y + 1 {
                    for x in cur.x - 1..=cur.x + 1 {
                        let n = Coord::new(y, x);
                        if level.in_bounds(n) && level.feature(n) == Feature::Granite {
                            level.set_feature(n, Feature::TunnelEdge);
                        }
                    }
                }
            }
            Feature::Corridor => {
                cur = next;
                if !in_corridor {
                    junctions.push(cur);
                    in_corridor = true;
                }
                if rng.randint(100) > cfg.tunnel_continue
                    && ((cur.y - start.y).abs() > 10 || (cur.x - start.x).abs() > 10)
                {
                    break;
                }
            }
            _ => cur = next,
        }
    }

    for c in tunnel {
        level.set_feature(c, Feature::Corridor);
    }
    for c in pierced {
        if level.feature(c) == Feature::TunnelEdge {
            if rng.randint(100) < cfg.tunnel_door_chance {
                place_door(level, rng, c);
            } else {
                level.set_feature(c, Feature::Corridor);
            }
        }
    }
}

/// Door at a corridor junction, only where walls frame it
pub fn try_door(level: &mut Level, rng: &mut GameRng, cfg: &DungeonConfig, c: Coord) {
    if level.feature(c) == Feature::Corridor
        && rng.randint(100) > cfg.junction_door_threshold
        && level.next_to_walls(c) >= 2
    {
        place_door(level, rng, c);
    }
}

/// Try a door on each side of every recorded junction
pub fn junction_doors(level: &mut Level, rng: &mut GameRng, cfg: &DungeonConfig, junctions: &[Coord]) {
    for &j in junctions {
        for n in [j.offset(0, -1), j.offset(0, 1), j.offset(-1, 0), j.offset(1, 0)] {
            if level.in_bounds(n) {
                try_door(level, rng, cfg, n);
            }
        }
    }
}

/// Turn everything undecided, and the generation markers, into granite
pub fn fill_cave(level: &mut Level) {
    for row in &mut level.cells {
        for cell in row {
            if matches!(
                cell.feature,
                Feature::Null | Feature::InnerWall | Feature::TunnelEdge
            ) {
                cell.feature = Feature::Granite;
            }
        }
    }
}

/// Stamp the indestructible outer ring
pub fn place_boundary(level: &mut Level) {
    let (h, w) = (level.height, level.width);
    for y in 0..h {
        level.set_feature(Coord::new(y, 0), Feature::Boundary);
        level.set_feature(Coord::new(y, w - 1), Feature::Boundary);
    }
    for x in 0..w {
        level.set_feature(Coord::new(0, x), Feature::Boundary);
        level.set_feature(Coord::new(h - 1, x), Feature::Boundary);
    }
}

/// Thread a band of `kind` through the granite
///
/// Each step converts up to `streamer_density` granite cells near the walk;
/// one in `treasure` of them also holds gold.
pub fn place_streamer(
    level: &mut Level,
    rng: &mut GameRng,
    cfg: &DungeonConfig,
    kind: Feature,
    treasure: i32,
) -> i32 {
    let mut cur = Coord::new(
        level.height / 2 + 11 - rng.randint(23),
        level.width / 2 + 16 - rng.randint(33),
    );
    let mut n = rng.randint(8);
    if n > 4 {
        n += 1;
    }
    let dir = Direction::from_keypad(n);
    let t1 = 2 * cfg.streamer_range + 1;
    let t2 = cfg.streamer_range + 1;
    let mut gold = 0;

    while level.on_grid(cur) {
        for _ in 0..cfg.streamer_density {
            let c = cur.offset(rng.randint(t1) - t2, rng.randint(t1) - t2);
            if level.in_bounds(c) && level.feature(c) == Feature::Granite {
                level.set_feature(c, kind);
                if rng.randint(treasure) == 1 {
                    let value = gold_value(rng, level.depth);
                    if level.place_item(c, FloorItem::gold(value)).is_some() {
                        gold += 1;
                    }
                }
            }
        }
        cur = cur.step(dir);
    }
    gold
}

/// Value of a gold pile found at `depth`
pub fn gold_value(rng: &mut GameRng, depth: i32) -> i32 {
    let tier = (rng.randint(depth + 2) + 2) / 2;
    tier * (10 + rng.randint(20))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank(h: i32, w: i32) -> Level {
        Level::new(1, h, w)
    }

    #[test]
    fn test_correct_dir_never_diagonal() {
        let mut rng = GameRng::new(1);
        for _ in 0..100 {
            let (dy, dx) = correct_dir(&mut rng, Coord::new(5, 5), Coord::new(20, 1));
            assert!(dy == 0 || dx == 0);
            assert!(dy == 1 || dx == -1);
        }
        assert_eq!(
            correct_dir(&mut rng, Coord::new(5, 5), Coord::new(5, 9)),
            (0, 1)
        );
    }

    #[test]
    fn test_tunnel_reaches_target_on_blank_level() {
        let mut rng = GameRng::new(7);
        let cfg = DungeonConfig::default();
        let mut level = blank(40, 80);
        let mut junctions = Vec::new();
        let (a, b) = (Coord::new(5, 5), Coord::new(30, 70));
        build_tunnel(&mut level, &mut rng, &cfg, a, b, &mut junctions);
        assert_eq!(level.feature(b), Feature::Corridor);
        assert!(junctions.is_empty());
    }

    #[test]
    fn test_pierced_walls_are_not_left_as_markers() {
        let mut rng = GameRng::new(3);
        let cfg = DungeonConfig::default();
        let mut level = blank(30, 60);
        // a vertical wall between the endpoints
        for y in 1..29 {
            level.set_feature(Coord::new(y, 30), Feature::Granite);
        }
        let mut junctions = Vec::new();
        build_tunnel(
            &mut level,
            &mut rng,
            &cfg,
            Coord::new(15, 5),
            Coord::new(15, 55),
            &mut junctions,
        );
        let openings = (1..29)
            .map(|y| level.feature(Coord::new(y, 30)))
            .filter(|f| f.is_traversable())
            .count();
        assert!(openings >= 1);
    }

    #[test]
    fn test_fill_and_boundary() {
        let mut level = blank(10, 12);
        level.set_feature(Coord::new(3, 3), Feature::RoomFloor);
        level.set_feature(Coord::new(4, 4), Feature::InnerWall);
        fill_cave(&mut level);
        place_boundary(&mut level);
        assert_eq!(level.feature(Coord::new(3, 3)), Feature::RoomFloor);
        assert_eq!(level.feature(Coord::new(4, 4)), Feature::Granite);
        for c in level.coords() {
            if c.y == 0 || c.x == 0 || c.y == 9 || c.x == 11 {
                assert_eq!(level.feature(c), Feature::Boundary);
            }
        }
    }

    #[test]
    fn test_streamer_only_converts_granite() {
        let mut rng = GameRng::new(5);
        let cfg = DungeonConfig::default();
        let mut level = blank(66, 198);
        fill_cave(&mut level);
        level.set_feature(Coord::new(33, 99), Feature::RoomFloor);
        place_streamer(&mut level, &mut rng, &cfg, Feature::Magma, 1);
        assert_eq!(level.feature(Coord::new(33, 99)), Feature::RoomFloor);
        assert!(level.coords().any(|c| level.feature(c) == Feature::Magma));
        // every converted cell carries gold when the odds are 1 in 1
        for c in level.coords() {
            if level.feature(c) == Feature::Magma {
                assert!(level.item_at(c).is_some());
            }
        }
    }

    #[test]
    fn test_door_kinds() {
        let mut rng = GameRng::new(11);
        let mut level = blank(5, 5);
        let c = Coord::new(2, 2);
        for _ in 0..200 {
            place_door(&mut level, &mut rng, c);
            let cell = level.cell(c);
            assert!(cell.feature.is_door());
            if cell.door_strength != 0 {
                assert_eq!(cell.feature, Feature::ClosedDoor);
                assert!((10..=20).contains(&cell.door_strength.abs()));
            }
        }
    }
}
