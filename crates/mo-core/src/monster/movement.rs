//! Monster movement resolution
//!
//! [`make_move`] walks a ranked list of directions and stops at the first one
//! that uses up the creature's turn: a step, an attack, a door worked on or a
//! wall broken. Directions that lead nowhere fall through to the next.

use tracing::{debug, trace};

use super::ai::{MonsterAction, update_visibility};
use super::{MonsterId, MoveFlags};
use crate::combat::make_attack;
use crate::dungeon::{Feature, Occupant};
use crate::geometry::{Coord, Direction, distance};
use crate::ports::{DisplayPort, Disturb};
use crate::world::World;

/// Result of trying one direction
enum Attempt {
    /// Nothing happened; try the next direction
    Next,
    /// The turn is used up
    Done(MonsterAction),
}

/// Try `dirs` in order until one consumes the monster's turn
///
/// Behaviour the player could observe is added to `observed` for the recall.
pub fn make_move(
    world: &mut World,
    display: &mut dyn DisplayPort,
    id: MonsterId,
    dirs: &[Direction],
    observed: &mut MoveFlags,
) -> MonsterAction {
    for &dir in dirs {
        if let Attempt::Done(action) = try_direction(world, display, id, dir, observed) {
            return action;
        }
    }
    MonsterAction::Blocked
}

fn try_direction(
    world: &mut World,
    display: &mut dyn DisplayPort,
    id: MonsterId,
    dir: Direction,
    observed: &mut MoveFlags,
) -> Attempt {
    let Some(m) = world.level.monster(id) else {
        return Attempt::Done(MonsterAction::Idle);
    };
    let species = world.species.get(m.species);
    let flags = species.moves;
    let from = m.pos;
    if dir == Direction::Here {
        return Attempt::Done(MonsterAction::Idle);
    }
    let to = from.step(dir);
    if !world.level.on_grid(to) {
        return Attempt::Next;
    }
    let feature = world.level.feature(to);
    if feature == Feature::Boundary {
        return Attempt::Next;
    }

    let can_enter = if feature.is_open() {
        true
    } else if flags.contains(MoveFlags::PHASE) {
        observed.insert(MoveFlags::PHASE);
        true
    } else if feature.is_breakable() && flags.intersects(MoveFlags::BREAK_WALL | MoveFlags::SHATTER) {
        break_wall(world, display, id, to, observed);
        return Attempt::Done(MonsterAction::Blocked);
    } else if matches!(feature, Feature::ClosedDoor | Feature::SecretDoor) {
        return work_door(world, display, id, to, observed);
    } else {
        false
    };
    if !can_enter {
        return Attempt::Next;
    }

    match world.level.cell(to).occupant {
        Occupant::Player => {
            if !world.level.monster(id).is_some_and(|m| m.visible) {
                update_visibility(world, display, id);
            }
            make_attack(world, display, id);
            Attempt::Done(MonsterAction::Attack)
        }
        Occupant::Monster(victim) if victim != id => {
            let Some(v) = world.level.monster(victim) else {
                return Attempt::Next;
            };
            let victim_exp = world.species.get(v.species).exp;
            if !flags.contains(MoveFlags::EATS_OTHER) || species.exp < victim_exp {
                return Attempt::Next;
            }
            if v.visible {
                observed.insert(MoveFlags::EATS_OTHER);
            }
            // removal is deferred to the end of the sweep, the cell is free now
            world.level.remove_monster(victim);
            debug!(target: "mo_core.monster", eater = ?id, ?victim, "ate a monster");
            step(world, display, id, to, observed);
            Attempt::Done(MonsterAction::Move(to))
        }
        _ => {
            step(world, display, id, to, observed);
            Attempt::Done(MonsterAction::Move(to))
        }
    }
}

/// Open, unlock, force or bash a door; always uses the turn
fn work_door(
    world: &mut World,
    display: &mut dyn DisplayPort,
    id: MonsterId,
    at: Coord,
    observed: &mut MoveFlags,
) -> Attempt {
    let Some(m) = world.level.monster(id) else {
        return Attempt::Next;
    };
    let flags = world.species.get(m.species).moves;
    let hp = m.hp;
    let feature = world.level.feature(at);
    let lock = i32::from(world.level.cell(at).door_strength);

    if flags.contains(MoveFlags::OPEN_DOOR) {
        let mut open = false;
        let mut burst = false;
        if feature == Feature::SecretDoor || lock == 0 {
            open = true;
        } else if lock > 0 {
            if world.rng.randint((hp + 1) * (50 + lock)) < 40 * (hp - 10 - lock) {
                world.level.cell_mut(at).door_strength = 0;
            }
        } else if world.rng.randint((hp + 1) * (50 - lock)) < 40 * (hp - 10 + lock) {
            display.message("You hear a door burst open!");
            world.player.disturb(display, Disturb::SEARCH);
            open = true;
            burst = true;
        }
        if open {
            let broken = burst && world.rng.randint(2) == 1;
            open_door(world, display, at, broken);
            observed.insert(MoveFlags::OPEN_DOOR);
        }
        Attempt::Done(MonsterAction::Blocked)
    } else if flags.contains(MoveFlags::BASH_DOOR) && feature == Feature::ClosedDoor {
        let lock = lock.abs();
        if world.rng.randint((hp + 1) * (80 + lock)) < 40 * (hp - 20 - lock) {
            let broken = world.rng.randint(2) == 1;
            open_door(world, display, at, broken);
            display.message("You hear a door burst open!");
            world.player.disturb(display, Disturb::SEARCH);
            observed.insert(MoveFlags::BASH_DOOR);
        }
        Attempt::Done(MonsterAction::Blocked)
    } else {
        Attempt::Next
    }
}

fn open_door(world: &mut World, display: &mut dyn DisplayPort, at: Coord, broken: bool) {
    let cell = world.level.cell_mut(at);
    cell.feature = if broken {
        Feature::BrokenDoor
    } else {
        Feature::OpenDoor
    };
    cell.door_strength = 0;
    display.redraw_cell(at);
}

/// Tunnel through rock; shattering creatures bring the ceiling down as well
fn break_wall(
    world: &mut World,
    display: &mut dyn DisplayPort,
    id: MonsterId,
    at: Coord,
    observed: &mut MoveFlags,
) {
    let Some(m) = world.level.monster(id) else {
        return;
    };
    let flags = world.species.get(m.species).moves;
    let (center, visible) = (m.pos, m.visible);
    world.level.set_feature(at, Feature::Corridor);
    display.redraw_cell(at);
    if visible {
        observed.insert(flags & (MoveFlags::BREAK_WALL | MoveFlags::SHATTER));
    }
    if flags.contains(MoveFlags::SHATTER) {
        let radius = world.config.monsters.quake_radius;
        earthquake(world, display, center, radius);
    }
}

/// Shake the square of `radius` around `center`
///
/// Each eligible cell changes with 1 in 8 odds: rock becomes corridor and
/// empty floor becomes rubble. Items on changed cells are destroyed. The
/// centre, the player and the boundary are never touched.
pub fn earthquake(world: &mut World, display: &mut dyn DisplayPort, center: Coord, radius: i32) -> usize {
    let mut changed = 0;
    for y in center.y - radius..=center.y + radius {
        for x in center.x - radius..=center.x + radius {
            let c = Coord::new(y, x);
            if c == center || !world.level.in_bounds(c) || c == world.player.pos {
                continue;
            }
            if world.rng.randint(8) != 1 {
                continue;
            }
            let cell = world.level.cell(c);
            let new = if cell.feature.is_breakable() && cell.feature != Feature::Rubble {
                Feature::Corridor
            } else if cell.feature.is_floor() && cell.occupant == Occupant::Empty {
                Feature::Rubble
            } else {
                continue;
            };
            world.level.take_item(c);
            world.level.set_feature(c, new);
            display.redraw_cell(c);
            changed += 1;
        }
    }
    trace!(target: "mo_core.monster", ?center, changed, "earthquake");
    changed
}

/// Move onto `to`, picking up whatever lies there if the species does that
fn step(
    world: &mut World,
    display: &mut dyn DisplayPort,
    id: MonsterId,
    to: Coord,
    observed: &mut MoveFlags,
) {
    let Some(m) = world.level.monster(id) else {
        return;
    };
    let species = world.species.get(m.species);
    let (from, visible) = (m.pos, m.visible);

    if species.moves.contains(MoveFlags::PICKS_UP)
        && let Some(item) = world.level.item_at(to)
    {
        if item.artifact || item.slays.intersects(species.defense) {
            if visible {
                display.message(&format!(
                    "The {} looks at {} and refuses to touch it.",
                    species.name, item.name
                ));
            }
        } else {
            world.level.take_item(to);
            observed.insert(MoveFlags::PICKS_UP);
        }
    }

    world.level.move_monster(id, to);
    let player = world.player.pos;
    if let Some(m) = world.level.monster_mut(id) {
        m.distance = distance(to, player);
    }
    display.redraw_cell(from);
    display.redraw_cell(to);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::dungeon::Level;
    use crate::item::FloorItem;
    use crate::monster::DefenseFlags;
    use crate::monster::spawn::place_monster;
    use crate::monster::table::SPECIES;
    use crate::ports::RecordingDisplay;

    fn room() -> World {
        let mut world = World::new(GameConfig::default(), 31);
        let mut level = Level::new(4, 12, 20);
        for y in 1..11 {
            for x in 1..19 {
                level.set_feature(Coord::new(y, x), Feature::RoomFloor);
            }
        }
        world.level = level;
        world.move_player(Coord::new(9, 17));
        world
    }

    fn find(name: &str) -> usize {
        SPECIES.iter().position(|s| s.name == name).unwrap()
    }

    fn east() -> [Direction; 5] {
        [Direction::East; 5]
    }

    #[test]
    fn test_plain_step() {
        let mut world = room();
        let id = place_monster(&mut world, find("jackal"), Coord::new(3, 3), false).unwrap();
        let mut display = RecordingDisplay::default();
        let mut seen = MoveFlags::empty();
        let action = make_move(&mut world, &mut display, id, &east(), &mut seen);
        assert_eq!(action, MonsterAction::Move(Coord::new(3, 4)));
        assert_eq!(world.level.monster_at(Coord::new(3, 4)), Some(id));
        assert_eq!(world.level.monster_at(Coord::new(3, 3)), None);
        assert_eq!(
            world.level.monster(id).unwrap().distance,
            distance(Coord::new(3, 4), world.player.pos)
        );
    }

    #[test]
    fn test_wall_blocks_walker() {
        let mut world = room();
        world.level.set_feature(Coord::new(3, 4), Feature::Granite);
        let id = place_monster(&mut world, find("jackal"), Coord::new(3, 3), false).unwrap();
        let mut display = RecordingDisplay::default();
        let mut seen = MoveFlags::empty();
        let action = make_move(&mut world, &mut display, id, &east(), &mut seen);
        assert_eq!(action, MonsterAction::Blocked);
        assert_eq!(world.level.monster_at(Coord::new(3, 3)), Some(id));
    }

    #[test]
    fn test_eater_frees_victim_cell() {
        let mut world = room();
        let cube = place_monster(&mut world, find("gelatinous cube"), Coord::new(3, 3), false).unwrap();
        let snack = place_monster(&mut world, find("jackal"), Coord::new(3, 4), false).unwrap();
        let mut display = RecordingDisplay::default();
        let mut seen = MoveFlags::empty();
        let action = make_move(&mut world, &mut display, cube, &east(), &mut seen);
        assert_eq!(action, MonsterAction::Move(Coord::new(3, 4)));
        assert!(world.level.is_pending_removal(snack));
        assert_eq!(world.level.monster_at(Coord::new(3, 4)), Some(cube));
    }

    #[test]
    fn test_walker_will_not_trample_neighbour() {
        let mut world = room();
        let a = place_monster(&mut world, find("jackal"), Coord::new(3, 3), false).unwrap();
        place_monster(&mut world, find("jackal"), Coord::new(3, 4), false).unwrap();
        let mut display = RecordingDisplay::default();
        let mut seen = MoveFlags::empty();
        assert_eq!(
            make_move(&mut world, &mut display, a, &east(), &mut seen),
            MonsterAction::Blocked
        );
    }

    #[test]
    fn test_picker_refuses_slaying_item() {
        let mut world = room();
        let cube = place_monster(&mut world, find("gelatinous cube"), Coord::new(3, 3), false).unwrap();
        world.level.monster_mut(cube).unwrap().visible = true;
        let mut blade = FloorItem::new(crate::item::ItemKind::Weapon, "dagger (holy)");
        blade.slays = DefenseFlags::ANIMAL
            | DefenseFlags::EVIL
            | DefenseFlags::UNDEAD
            | world.species.get(find("gelatinous cube")).defense;
        world.level.place_item(Coord::new(3, 4), blade);
        let mut display = RecordingDisplay::default();
        let mut seen = MoveFlags::empty();
        make_move(&mut world, &mut display, cube, &east(), &mut seen);
        let item = world.level.item_at(Coord::new(3, 4)).expect("the dagger stays on the floor");
        assert_eq!(item.name, "dagger (holy)");
        assert!(!seen.contains(MoveFlags::PICKS_UP));
        assert_eq!(world.level.monster(cube).unwrap().pos, Coord::new(3, 4));
        assert!(display.contains("The gelatinous cube looks at dagger (holy) and refuses to touch it."));
    }

    #[test]
    fn test_plain_closed_door_opens_without_step() {
        let mut world = room();
        world.level.set_feature(Coord::new(3, 4), Feature::ClosedDoor);
        let orc = place_monster(&mut world, find("cave orc"), Coord::new(3, 3), false).unwrap();
        let mut display = RecordingDisplay::default();
        let mut seen = MoveFlags::empty();
        let action = make_move(&mut world, &mut display, orc, &east(), &mut seen);
        assert_eq!(action, MonsterAction::Blocked);
        assert_eq!(world.level.feature(Coord::new(3, 4)), Feature::OpenDoor);
        assert_eq!(world.level.monster_at(Coord::new(3, 3)), Some(orc));
    }

    #[test]
    fn test_earthquake_spares_player_and_centre() {
        let mut world = room();
        world.move_player(Coord::new(5, 6));
        let mut display = RecordingDisplay::default();
        for _ in 0..50 {
            earthquake(&mut world, &mut display, Coord::new(5, 5), 3);
        }
        assert!(world.level.feature(Coord::new(5, 5)).is_floor());
        assert!(world.level.feature(Coord::new(5, 6)).is_floor());
        assert_eq!(world.level.feature(Coord::new(0, 5)), Feature::Null);
        assert!(world.level.coords().any(|c| world.level.feature(c) == Feature::Rubble));
    }
}
