//! Room builders
//!
//! Every builder is handed the centre of a coarse room slot. Outer walls are
//! granite so tunnels can pierce them; walls inside a room are `InnerWall`
//! and turn into granite when the level is filled.

use tracing::trace;

use super::cell::Feature;
use crate::geometry::Coord;
use crate::item::FloorItem;
use crate::monster::spawn::place_monster;
use crate::monster::Family;
use crate::world::World;

/// Depth bonus for creatures guarding vaults
const VAULT_MONSTER_ADJ: i32 = 2;

/// Mark a rectangle as room floor
fn fill_floor(world: &mut World, top: i32, bottom: i32, left: i32, right: i32, lit: bool) {
    for y in top..=bottom {
        for x in left..=right {
            let cell = world.level.cell_mut(Coord::new(y, x));
            cell.feature = Feature::RoomFloor;
            cell.in_room = true;
            cell.perma_lit = lit;
        }
    }
}

/// Granite ring just outside a rectangle
///
/// With `keep_floor` set, cells that are already floor stay open, which is how
/// overlapping rectangles merge.
fn outer_wall(world: &mut World, top: i32, bottom: i32, left: i32, right: i32, lit: bool, keep_floor: bool) {
    let ring = (top - 1..=bottom + 1)
        .flat_map(|y| [Coord::new(y, left - 1), Coord::new(y, right + 1)])
        .chain((left..=right).flat_map(|x| [Coord::new(top - 1, x), Coord::new(bottom + 1, x)]));
    for c in ring.collect::<Vec<_>>() {
        let cell = world.level.cell_mut(c);
        if keep_floor && cell.feature == Feature::RoomFloor {
            continue;
        }
        cell.feature = Feature::Granite;
        cell.in_room = true;
        cell.perma_lit = lit;
    }
}

/// Inner wall ring just outside a rectangle
fn inner_wall(world: &mut World, top: i32, bottom: i32, left: i32, right: i32) {
    for y in top - 1..=bottom + 1 {
        world.level.set_feature(Coord::new(y, left - 1), Feature::InnerWall);
        world.level.set_feature(Coord::new(y, right + 1), Feature::InnerWall);
    }
    for x in left..=right {
        world.level.set_feature(Coord::new(top - 1, x), Feature::InnerWall);
        world.level.set_feature(Coord::new(bottom + 1, x), Feature::InnerWall);
    }
}

fn secret_door(world: &mut World, c: Coord) {
    let cell = world.level.cell_mut(c);
    cell.feature = Feature::SecretDoor;
    cell.door_strength = 0;
}

fn locked_door(world: &mut World, c: Coord) {
    let strength = world.rng.randint(10) + 10;
    let cell = world.level.cell_mut(c);
    cell.feature = Feature::ClosedDoor;
    cell.door_strength = strength as i16;
}

/// Secret door in the middle of one side of an inner ring
fn inner_room_door(world: &mut World, center: Coord, top: i32, bottom: i32, left: i32, right: i32) {
    let c = match world.rng.randint(4) {
        1 => Coord::new(top - 1, center.x),
        2 => Coord::new(bottom + 1, center.x),
        3 => Coord::new(center.y, left - 1),
        _ => Coord::new(center.y, right + 1),
    };
    secret_door(world, c);
}

/// Treasure or gold on `c`
pub(super) fn place_object(world: &mut World, c: Coord) {
    let item = FloorItem::random(&mut world.rng, world.level.depth);
    world.level.place_item(c, item);
}

/// Scatter `num` objects on free floor near `center`
fn random_object(world: &mut World, center: Coord, num: i32) {
    for _ in 0..num {
        for _ in 0..20 {
            let c = center.offset(world.rng.randint(5) - 3, world.rng.randint(7) - 4);
            if world.level.in_bounds(c) && world.level.cell(c).is_vacant_floor() {
                if world.rng.randint(100) < 75 {
                    place_object(world, c);
                } else {
                    let value = super::tunnel::gold_value(&mut world.rng, world.level.depth);
                    world.level.place_item(c, FloorItem::gold(value));
                }
                break;
            }
        }
    }
}

/// Sleeping guards around `center`
fn vault_monster(world: &mut World, center: Coord, num: i32) {
    for _ in 0..num {
        for _ in 0..9 {
            let c = center.offset(world.rng.randint(3) - 2, world.rng.randint(3) - 2);
            if !world.level.in_bounds(c) || !world.level.cell(c).is_vacant_floor() {
                continue;
            }
            let species = world.species.get_mons_num(
                &mut world.rng,
                world.level.depth + VAULT_MONSTER_ADJ,
                world.config.monsters.nasty_chance,
            );
            place_monster(world, species, c, true);
            break;
        }
    }
}

/// Plain rectangular room
pub fn build_room(world: &mut World, center: Coord, lit: bool) {
    let top = center.y - world.rng.randint(4);
    let bottom = center.y + world.rng.randint(3);
    let left = center.x - world.rng.randint(11);
    let right = center.x + world.rng.randint(11);
    fill_floor(world, top, bottom, left, right, lit);
    outer_wall(world, top, bottom, left, right, lit, false);
}

/// Type 1: two or three overlapping rectangles
pub fn build_type1(world: &mut World, center: Coord, lit: bool) {
    let limit = 1 + world.rng.randint(2);
    for _ in 0..limit {
        let top = center.y - world.rng.randint(4);
        let bottom = center.y + world.rng.randint(3);
        let left = center.x - world.rng.randint(11);
        let right = center.x + world.rng.randint(11);
        fill_floor(world, top, bottom, left, right, lit);
        outer_wall(world, top, bottom, left, right, lit, true);
    }
}

/// Type 2: a room holding an inner room
pub fn build_type2(world: &mut World, center: Coord, lit: bool) {
    let Coord { y: yc, x: xc } = center;
    let (top, bottom, left, right) = (yc - 4, yc + 4, xc - 11, xc + 11);
    fill_floor(world, top, bottom, left, right, lit);
    outer_wall(world, top, bottom, left, right, lit, false);

    let (top, bottom, left, right) = (top + 2, bottom - 2, left + 2, right - 2);
    inner_wall(world, top, bottom, left, right);

    match world.rng.randint(5) {
        1 => {
            inner_room_door(world, center, top, bottom, left, right);
            vault_monster(world, center, 1);
        }
        2 => {
            // treasure vault
            inner_room_door(world, center, top, bottom, left, right);
            inner_wall(world, yc, yc, xc, xc);
            let n = world.rng.randint(4);
            let door = if n < 3 {
                Coord::new(yc - 3 + (n << 1), xc)
            } else {
                Coord::new(yc, xc - 7 + (n << 1))
            };
            locked_door(world, door);
            match world.rng.randint(10) {
                1 => world.level.set_feature(center, Feature::UpStairs),
                2 => world.level.set_feature(center, Feature::DownStairs),
                _ => place_object(world, center),
            }
            let guards = 2 + world.rng.randint(3);
            vault_monster(world, center, guards);
        }
        3 => {
            // pillars
            inner_room_door(world, center, top, bottom, left, right);
            for y in yc - 1..=yc + 1 {
                for x in xc - 1..=xc + 1 {
                    world.level.set_feature(Coord::new(y, x), Feature::InnerWall);
                }
            }
            if world.rng.randint(2) == 1 {
                let shift = world.rng.randint(2);
                for y in yc - 1..=yc + 1 {
                    for x in xc - 5 - shift..=xc - 3 - shift {
                        world.level.set_feature(Coord::new(y, x), Feature::InnerWall);
                    }
                    for x in xc + 3 + shift..=xc + 5 + shift {
                        world.level.set_feature(Coord::new(y, x), Feature::InnerWall);
                    }
                }
            }
            if world.rng.randint(3) == 1 {
                // twin inner cells
                for x in xc - 5..=xc + 5 {
                    world.level.set_feature(Coord::new(yc - 1, x), Feature::InnerWall);
                    world.level.set_feature(Coord::new(yc + 1, x), Feature::InnerWall);
                }
                world.level.set_feature(Coord::new(yc, xc - 5), Feature::InnerWall);
                world.level.set_feature(Coord::new(yc, xc + 5), Feature::InnerWall);
                let y = yc - 3 + (world.rng.randint(2) << 1);
                secret_door(world, Coord::new(y, xc - 3));
                let y = yc - 3 + (world.rng.randint(2) << 1);
                secret_door(world, Coord::new(y, xc + 3));
                if world.rng.randint(3) == 1 {
                    place_object(world, Coord::new(yc, xc - 2));
                }
                if world.rng.randint(3) == 1 {
                    place_object(world, Coord::new(yc, xc + 2));
                }
                let n = world.rng.randint(2);
                vault_monster(world, Coord::new(yc, xc - 2), n);
                let n = world.rng.randint(2);
                vault_monster(world, Coord::new(yc, xc + 2), n);
            }
        }
        4 => {
            // checkerboard maze
            inner_room_door(world, center, top, bottom, left, right);
            for y in top..=bottom {
                for x in left..=right {
                    if (x + y) & 1 == 1 {
                        world.level.set_feature(Coord::new(y, x), Feature::InnerWall);
                    }
                }
            }
            let n = world.rng.randint(3);
            vault_monster(world, Coord::new(yc, xc - 5), n);
            let n = world.rng.randint(3);
            vault_monster(world, Coord::new(yc, xc + 5), n);
            random_object(world, center, 3);
        }
        _ => {
            // four small rooms
            for y in top..=bottom {
                world.level.set_feature(Coord::new(y, xc), Feature::InnerWall);
            }
            for x in left..=right {
                world.level.set_feature(Coord::new(yc, x), Feature::InnerWall);
            }
            if world.rng.randint(2) == 1 {
                let i = world.rng.randint(10);
                for c in [
                    Coord::new(top - 1, xc - i),
                    Coord::new(top - 1, xc + i),
                    Coord::new(bottom + 1, xc - i),
                    Coord::new(bottom + 1, xc + i),
                ] {
                    secret_door(world, c);
                }
            } else {
                let i = world.rng.randint(3);
                for c in [
                    Coord::new(yc + i, left - 1),
                    Coord::new(yc - i, left - 1),
                    Coord::new(yc + i, right + 1),
                    Coord::new(yc - i, right + 1),
                ] {
                    secret_door(world, c);
                }
            }
            let n = 2 + world.rng.randint(2);
            random_object(world, center, n);
            for (dy, dx) in [(2, -4), (2, 4), (-2, -4), (-2, 4)] {
                let n = world.rng.randint(2);
                vault_monster(world, center.offset(dy, dx), n);
            }
        }
    }
}

/// Type 3: a cross of two bars
pub fn build_type3(world: &mut World, center: Coord, lit: bool) {
    let Coord { y: yc, x: xc } = center;
    let tall = 2 + world.rng.randint(2);
    fill_floor(world, yc - tall, yc + tall, xc - 1, xc + 1, lit);
    outer_wall(world, yc - tall, yc + tall, xc - 1, xc + 1, lit, false);
    let wide = 2 + world.rng.randint(9);
    fill_floor(world, yc - 1, yc + 1, xc - wide, xc + wide, lit);
    outer_wall(world, yc - 1, yc + 1, xc - wide, xc + wide, lit, true);

    match world.rng.randint(4) {
        1 => {
            for y in yc - 1..=yc + 1 {
                for x in xc - 1..=xc + 1 {
                    world.level.set_feature(Coord::new(y, x), Feature::InnerWall);
                }
            }
        }
        2 => {
            inner_wall(world, yc, yc, xc, xc);
            let n = world.rng.randint(4);
            let door = if n < 3 {
                Coord::new(yc - 3 + (n << 1), xc)
            } else {
                Coord::new(yc, xc - 7 + (n << 1))
            };
            secret_door(world, door);
            place_object(world, center);
            vault_monster(world, center, 1);
        }
        3 => {
            if world.rng.randint(3) == 1 {
                for (dy, dx) in [(-1, -2), (1, -2), (-1, 2), (1, 2), (-2, -1), (-2, 1), (2, -1), (2, 1)] {
                    world.level.set_feature(center.offset(dy, dx), Feature::InnerWall);
                }
                if world.rng.randint(3) == 1 {
                    for (dy, dx) in [(0, -2), (0, 2), (-2, 0), (2, 0)] {
                        secret_door(world, center.offset(dy, dx));
                    }
                }
            } else if world.rng.randint(3) == 1 {
                for (dy, dx) in [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)] {
                    world.level.set_feature(center.offset(dy, dx), Feature::InnerWall);
                }
            } else if world.rng.randint(3) == 1 {
                world.level.set_feature(center, Feature::InnerWall);
            }
        }
        _ => {}
    }
}

/// Prefabricated vault maps
///
/// `%` outer wall, `#` inner wall, `.` floor, `+` secret door, `*` object,
/// `&` guard from five levels deeper, `@` guard from eleven levels deeper.
/// Each map keeps a floor ring inside its outer wall and floor at its centre.
const VAULTS: &[&[&str]] = &[
    &[
        "%%%%%%%%%%%%%%%%%%%%%%%%%",
        "%.......................%",
        "%.#########+###########.%",
        "%.#.......&.&.........#.%",
        "%.#.#####+#####.#####.#.%",
        "%.#.#*&.........&*#.#.#.%",
        "%.#.#####.###.#####.#.#.%",
        "%.#.....&.....&.....#.#.%",
        "%.#####################.%",
        "%.......................%",
        "%%%%%%%%%%%%%%%%%%%%%%%%%",
    ],
    &[
        "%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%",
        "%.............................%",
        "%.#############+#############.%",
        "%.#*.&.#...&...+...&...#.&.*#.%",
        "%.#.##.#.##+##.#.##+##.#.##.#.%",
        "%.#..&.+.#*@*#...#*@*#.+.&..#.%",
        "%.#.##.#.#####.#.#####.#.##.#.%",
        "%.#*.&.#...&...+...&...#.&.*#.%",
        "%.###########################.%",
        "%.............................%",
        "%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%",
    ],
    &[
        "%%%%%%%%%%%%%%%%%%%",
        "%.................%",
        "%.######+########.%",
        "%.#&....&......&#.%",
        "%.#.####.#####..#.%",
        "%.#.#*&.@..&*#..#.%",
        "%.#.####.#####..#.%",
        "%.#&....&......&#.%",
        "%.########+######.%",
        "%.................%",
        "%%%%%%%%%%%%%%%%%%%",
    ],
];

/// Type 5: a template vault; returns false when it does not fit
pub fn build_type5(world: &mut World, center: Coord, lit: bool) -> bool {
    let template = VAULTS[(world.rng.randint(VAULTS.len() as i32) - 1) as usize];
    let height = template.len() as i32;
    let width = template[0].len() as i32;
    let top = center.y - height / 2;
    let left = center.x - width / 2;
    let fits = top >= 1
        && left >= 1
        && top + height < world.level.height - 1
        && left + width < world.level.width - 1;
    if !fits {
        trace!(target: "mo_core.dungeon", ?center, "vault template does not fit");
        return false;
    }

    let mut guards = Vec::new();
    let mut objects = Vec::new();
    for (dy, row) in template.iter().enumerate() {
        for (dx, ch) in row.bytes().enumerate() {
            let c = Coord::new(top + dy as i32, left + dx as i32);
            let feature = match ch {
                b'%' => Feature::Granite,
                b'#' => Feature::InnerWall,
                b'+' => Feature::SecretDoor,
                _ => Feature::RoomFloor,
            };
            let cell = world.level.cell_mut(c);
            cell.feature = feature;
            cell.door_strength = 0;
            cell.in_room = true;
            cell.perma_lit = lit;
            match ch {
                b'*' => objects.push(c),
                b'&' => guards.push((c, 5)),
                b'@' => guards.push((c, 11)),
                _ => {}
            }
        }
    }
    for c in objects {
        place_object(world, c);
    }
    for (c, adj) in guards {
        let species = world.species.get_mons_num(
            &mut world.rng,
            world.level.depth + adj,
            world.config.monsters.nasty_chance,
        );
        place_monster(world, species, c, true);
    }
    true
}

/// Family of a pit, banded by depth
fn pit_family(roll: i32) -> Family {
    match roll {
        ..=11 => Family::Jelly,
        12..20 => Family::Orc,
        20..28 => Family::Troll,
        28..36 => Family::Undead,
        36..44 => Family::Dragon,
        _ => Family::Demon,
    }
}

/// A room whose inner chamber is packed with one family of creatures
///
/// Returns false when the family has no suitable species.
pub fn build_pit(world: &mut World, center: Coord, lit: bool) -> bool {
    let depth = world.level.depth;
    let family = pit_family(world.rng.randint(depth));
    let mut candidates = world.species.family_members(family, depth + 10);
    if candidates.is_empty() {
        return false;
    }
    // keep the sixteen deepest, then order weakest first
    candidates.sort_by_key(|&i| std::cmp::Reverse(world.species.get(i).level));
    candidates.truncate(16);
    candidates.sort_by_key(|&i| world.species.get(i).level);
    let what: Vec<usize> = (0..8).map(|i| candidates[i * candidates.len() / 8]).collect();

    let Coord { y: yc, x: xc } = center;
    let (top, bottom, left, right) = (yc - 4, yc + 4, xc - 11, xc + 11);
    fill_floor(world, top, bottom, left, right, lit);
    outer_wall(world, top, bottom, left, right, lit, false);
    let (top, bottom, left, right) = (top + 2, bottom - 2, left + 2, right - 2);
    inner_wall(world, top, bottom, left, right);
    inner_room_door(world, center, top, bottom, left, right);

    let place = |world: &mut World, dy: i32, dx: i32, band: usize| {
        place_monster(world, what[band], center.offset(dy, dx), true);
    };
    for dx in -9..=9 {
        place(world, -2, dx, 0);
        place(world, 2, dx, 0);
    }
    for dy in -1..=1 {
        for (dx, band) in [(9, 0), (8, 1), (7, 1), (6, 2), (5, 2), (4, 3), (3, 3), (2, 4)] {
            place(world, dy, -dx, band);
            place(world, dy, dx, band);
        }
    }
    for dx in -1..=1 {
        place(world, -1, dx, 5);
        place(world, 1, dx, 5);
    }
    place(world, 0, -1, 6);
    place(world, 0, 1, 6);
    place(world, 0, 0, 7);
    trace!(target: "mo_core.dungeon", ?center, %family, "built pit");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::dungeon::Level;

    fn world_at(depth: i32) -> World {
        let mut world = World::at_depth(GameConfig::default(), 21, depth);
        world.level = Level::new(depth, 66, 198);
        world
    }

    #[test]
    fn test_plain_room_is_walled() {
        let mut world = world_at(1);
        let center = Coord::new(16, 49);
        build_room(&mut world, center, true);
        assert_eq!(world.level.feature(center), Feature::RoomFloor);
        assert!(world.level.cell(center).perma_lit);
        for c in world.level.coords() {
            if world.level.feature(c) == Feature::RoomFloor {
                for n in c.neighbors() {
                    let f = world.level.feature(n);
                    assert!(f == Feature::RoomFloor || f == Feature::Granite, "{n:?} is {f}");
                }
            }
        }
    }

    #[test]
    fn test_type2_variants_keep_centre_region() {
        for seed in 0..20 {
            let mut world = World::at_depth(GameConfig::default(), seed, 5);
            world.level = Level::new(5, 66, 198);
            let center = Coord::new(27, 82);
            build_type2(&mut world, center, false);
            // the outer ring of floor always survives
            assert_eq!(world.level.feature(center.offset(-4, -11)), Feature::RoomFloor);
            assert_eq!(world.level.feature(center.offset(-5, 0)), Feature::Granite);
        }
    }

    #[test]
    fn test_vault_templates_are_rectangular() {
        for t in VAULTS {
            let w = t[0].len();
            assert!(t.iter().all(|row| row.len() == w));
            assert_eq!(t[t.len() / 2].as_bytes()[w / 2], b'.');
        }
    }

    #[test]
    fn test_type5_rejects_edge() {
        let mut world = world_at(20);
        assert!(!build_type5(&mut world, Coord::new(3, 5), false));
        assert!(build_type5(&mut world, Coord::new(33, 99), false));
        assert_eq!(world.level.feature(Coord::new(33, 99)), Feature::RoomFloor);
    }

    #[test]
    fn test_pit_fills_chamber() {
        let mut world = world_at(12);
        let center = Coord::new(27, 82);
        assert!(build_pit(&mut world, center, false));
        assert_eq!(world.level.live_monsters(), 95);
        let family = world.species.get(world.level.monsters[0].species).family;
        for m in &world.level.monsters {
            assert_eq!(world.species.get(m.species).family, family);
            assert!(m.pos.y >= center.y - 2 && m.pos.y <= center.y + 2);
        }
    }
}
