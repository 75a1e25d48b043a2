//! Monster AI
//!
//! The per-turn creature sweep: how many moves each monster gets, whether it
//! notices the player, and what it does with each move.

use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{debug, trace};

use super::movement::make_move;
use super::spawn::multiply_monster;
use super::spells::cast_spell;
use super::{DefenseFlags, MonsterId, MoveFlags, capitalize};
use crate::combat::{make_attack, monster_take_hit};
use crate::dungeon::{Feature, Occupant};
use crate::geometry::{Coord, Direction};
use crate::player::Intrinsics;
use crate::ports::{DisplayPort, Disturb};
use crate::world::World;

/// What a monster did with one of its moves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum MonsterAction {
    /// Struck at the player
    Attack,
    Move(Coord),
    /// Spent the move without changing cells: a door, a wall, a dead end
    Blocked,
    Cast,
    Breed,
    /// Tried to get out of solid rock
    Escape,
    /// Stumbled about confused
    Confused,
    Idle,
    Asleep,
}

/// Everything the creature engine did in one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub actions: Vec<(MonsterId, MonsterAction)>,
}

impl SweepReport {
    pub fn count(&self, action: MonsterAction) -> usize {
        self.actions.iter().filter(|(_, a)| *a == action).count()
    }

    /// Actions taken by one monster, in order
    pub fn of(&self, id: MonsterId) -> impl Iterator<Item = MonsterAction> + '_ {
        self.actions
            .iter()
            .filter(move |(who, _)| *who == id)
            .map(|(_, a)| *a)
    }
}

/// Moves a monster gets this turn
///
/// Spreads `monster_speed / player_speed` moves evenly over consecutive
/// turns; `index` staggers monsters of equal speed. A resting player lets
/// fast monsters take at most one move.
pub fn movement_rate(
    monster_speed: i32,
    player_speed: i32,
    turn: u64,
    index: usize,
    resting: bool,
) -> i32 {
    let m = monster_speed.max(1) as u64;
    let p = player_speed.max(1) as u64;
    let t = turn + index as u64;
    let moves = ((t + 1) * m / p - t * m / p) as i32;
    if resting { moves.min(1) } else { moves }
}

/// Five directions towards the player, best first
pub fn get_moves(monster: Coord, player: Coord) -> [Direction; 5] {
    let y = monster.y - player.y;
    let x = monster.x - player.x;
    let (mut octant, ay) = if y < 0 { (8, -y) } else { (0, y) };
    let ax = if x > 0 {
        octant += 4;
        x
    } else {
        -x
    };
    // a much longer axis counts as a straight line
    if ay > ax * 2 {
        octant += 2;
    } else if ax > ay * 2 {
        octant += 1;
    }
    let keys = match octant {
        0 => {
            if ay > ax {
                [9, 8, 6, 7, 3]
            } else {
                [9, 6, 8, 3, 7]
            }
        }
        1 | 9 => {
            if y < 0 {
                [6, 3, 9, 2, 8]
            } else {
                [6, 9, 3, 8, 2]
            }
        }
        2 | 6 => {
            if x < 0 {
                [8, 9, 7, 6, 4]
            } else {
                [8, 7, 9, 4, 6]
            }
        }
        4 => {
            if ay > ax {
                [7, 8, 4, 9, 1]
            } else {
                [7, 4, 8, 1, 9]
            }
        }
        5 | 13 => {
            if y < 0 {
                [4, 1, 7, 2, 8]
            } else {
                [4, 7, 1, 8, 2]
            }
        }
        8 => {
            if ay > ax {
                [3, 2, 6, 1, 9]
            } else {
                [3, 6, 2, 9, 1]
            }
        }
        10 | 14 => {
            if x < 0 {
                [2, 3, 1, 6, 4]
            } else {
                [2, 1, 3, 4, 6]
            }
        }
        _ => {
            if ay > ax {
                [1, 2, 4, 3, 7]
            } else {
                [1, 4, 2, 7, 3]
            }
        }
    };
    keys.map(Direction::from_keypad)
}

fn random_moves(world: &mut World) -> [Direction; 5] {
    std::array::from_fn(|_| Direction::from_keypad(world.rng.randint(9)))
}

/// Recompute whether the player can see monster `id`
///
/// Returns the new visibility. Newly seen monsters interrupt the player.
pub fn update_visibility(world: &mut World, display: &mut dyn DisplayPort, id: MonsterId) -> bool {
    let Some(m) = world.level.monster(id) else {
        return false;
    };
    let species_index = m.species;
    let species = world.species.get(species_index);
    let player = &world.player;
    let (pos, dist, was_visible) = (m.pos, m.distance, m.visible);

    let mut seen = false;
    if player.status.blind < 1
        && dist <= world.config.monsters.max_sight
        && world.level.los(player.pos, pos)
    {
        let by_light = world.level.cell(pos).is_lit();
        let by_heat = dist <= player.infravision && !species.defense.contains(DefenseFlags::NO_INFRA);
        let hidden = species.moves.contains(MoveFlags::INVISIBLE) && !player.sees_invisible();
        seen = (by_light || by_heat) && !hidden;
    }

    if seen != was_visible {
        if let Some(m) = world.level.monster_mut(id) {
            m.visible = seen;
        }
        display.redraw_cell(pos);
        if seen {
            let recall = world.recall.get_mut(species_index);
            recall.sightings = recall.sightings.saturating_add(1);
            world.player.disturb(display, Disturb::SEARCH);
        }
    }
    seen
}

/// Let every monster act
///
/// Monsters are visited from the end of the table to the front, over the
/// entries present when the sweep starts. Monsters killed or eaten during the
/// sweep stay in the table until it ends and are skipped; the table is
/// compacted once afterwards. With `attack` false monsters only have their
/// visibility refreshed.
pub fn process_monsters(world: &mut World, display: &mut dyn DisplayPort, attack: bool) -> SweepReport {
    let mut report = SweepReport::default();
    let ids: Vec<MonsterId> = world.level.monsters.iter().map(|m| m.id).collect();

    for (index, &id) in ids.iter().enumerate().rev() {
        if world.player.dead {
            break;
        }
        if world.level.is_pending_removal(id) {
            continue;
        }
        let player_pos = world.player.pos;
        let Some(m) = world.level.monster_mut(id) else {
            continue;
        };
        m.distance = crate::geometry::distance(m.pos, player_pos);
        if !attack {
            update_visibility(world, display, id);
            continue;
        }
        let species = world.species.get(m.species);
        let moves = movement_rate(
            m.speed(species),
            world.player.speed(),
            world.turn,
            index,
            world.player.is_resting(),
        );
        if moves <= 0 {
            update_visibility(world, display, id);
            continue;
        }
        for _ in 0..moves {
            if world.player.dead || world.level.is_pending_removal(id) {
                break;
            }
            take_move(world, display, id, &mut report);
        }
    }

    world.level.compact();
    trace!(target: "mo_core.monster", actions = report.actions.len(), "sweep done");
    report
}

/// One allotted move: wake check, stun recovery, then an action
fn take_move(world: &mut World, display: &mut dyn DisplayPort, id: MonsterId, report: &mut SweepReport) {
    let Some(m) = world.level.monster(id) else {
        return;
    };
    let species_index = m.species;
    let species = world.species.get(species_index);
    let in_rock = !species.can_phase() && world.level.feature(m.pos).is_cave_wall();
    let eligible = m.visible || m.distance <= species.aaf || in_rock;

    let mut woke = false;
    let mut ignored = false;
    let mut observed = MoveFlags::empty();
    if eligible {
        if m.is_asleep() {
            if world.player.has(Intrinsics::AGGRAVATE) {
                if let Some(m) = world.level.monster_mut(id) {
                    m.wake();
                }
            } else if (!world.player.is_resting() && !world.player.is_paralysed())
                || world.rng.randint(50) == 1
            {
                let notice = i64::from(world.rng.randint(1024));
                let stealth = world.player.stealth.clamp(0, 29);
                if notice * notice * notice <= 1_i64 << (29 - stealth) {
                    if let Some(m) = world.level.monster_mut(id) {
                        m.sleep -= 100 / m.distance.max(1);
                        if m.sleep > 0 {
                            ignored = true;
                        } else {
                            m.sleep = 0;
                            woke = true;
                        }
                    }
                }
            }
        }
        recover_from_stun(world, display, id);

        let ready = world
            .level
            .monster(id)
            .is_some_and(|m| !m.is_asleep() && m.stunned == 0);
        let action = if ready {
            act(world, display, id, &mut observed, report)
        } else {
            MonsterAction::Asleep
        };
        report.actions.push((id, action));
    } else {
        report.actions.push((id, MonsterAction::Idle));
    }

    if update_visibility(world, display, id) {
        let recall = world.recall.get_mut(species_index);
        if woke {
            recall.notice_wake();
        } else if ignored {
            recall.notice_ignore();
        }
        recall.moves |= observed;
    }
}

fn recover_from_stun(world: &mut World, display: &mut dyn DisplayPort, id: MonsterId) {
    let Some(m) = world.level.monster(id) else {
        return;
    };
    if m.stunned == 0 {
        return;
    }
    let species = world.species.get(m.species);
    let recovers = world.rng.randint(5000) < species.level * species.level;
    let Some(m) = world.level.monster_mut(id) else {
        return;
    };
    if recovers {
        m.stunned = 0;
    } else {
        m.stunned -= 1;
    }
    if m.stunned == 0 && m.visible {
        display.message(&format!(
            "{} recovers and glares at you.",
            capitalize(&species.the_name())
        ));
    }
}

/// Choose and perform the monster's action for this move
fn act(
    world: &mut World,
    display: &mut dyn DisplayPort,
    id: MonsterId,
    observed: &mut MoveFlags,
    report: &mut SweepReport,
) -> MonsterAction {
    let Some(m) = world.level.monster(id) else {
        return MonsterAction::Idle;
    };
    let species_index = m.species;
    let species = world.species.get(species_index);
    let flags = species.moves;
    let pos = m.pos;

    if flags.contains(MoveFlags::MULTIPLY)
        && world.level.multiplied <= world.config.monsters.max_multiply
        && world.player.rest.abs() % world.config.monsters.multiply_adjust.max(1) == 0
    {
        let k = world.level.monsters_around(pos).max(1);
        if k < 4
            && world.rng.randint(k * world.config.monsters.multiply_adjust) == 1
            && multiply_monster(world, id).is_some()
        {
            report.actions.push((id, MonsterAction::Breed));
        }
    }

    if !species.can_phase() && world.level.feature(pos).is_cave_wall() {
        escape_rock(world, display, id);
        return MonsterAction::Escape;
    }

    let Some(m) = world.level.monster(id) else {
        return MonsterAction::Idle;
    };
    let (confused, afraid, distance) = (m.confused, m.afraid, m.distance);

    if confused > 0 {
        let dirs = if species.is_undead() {
            get_moves(pos, world.player.pos).map(Direction::reverse)
        } else {
            random_moves(world)
        };
        if !flags.contains(MoveFlags::ATTACK_ONLY) {
            make_move(world, display, id, &dirs, observed);
        }
        let shake = world.rng.randint(species.level / 10 + 1);
        if let Some(m) = world.level.monster_mut(id) {
            m.confused = (m.confused - shake).max(0);
        }
        return MonsterAction::Confused;
    }

    if species.casts_spells() && cast_spell(world, display, id) {
        return MonsterAction::Cast;
    }

    let random = [
        (MoveFlags::RANDOM_75, 75),
        (MoveFlags::RANDOM_40, 40),
        (MoveFlags::RANDOM_20, 20),
    ];
    for (flag, percent) in random {
        if flags.contains(flag) && world.rng.randint(100) < percent {
            observed.insert(flag);
            let dirs = random_moves(world);
            return make_move(world, display, id, &dirs, observed);
        }
    }

    if flags.contains(MoveFlags::MOVE_NORMAL) {
        let dirs = if world.rng.randint(200) == 1 {
            random_moves(world)
        } else if afraid > 0 {
            if let Some(m) = world.level.monster_mut(id) {
                m.afraid -= 1;
            }
            get_moves(pos, world.player.pos).map(Direction::reverse)
        } else {
            get_moves(pos, world.player.pos)
        };
        observed.insert(MoveFlags::MOVE_NORMAL);
        make_move(world, display, id, &dirs, observed)
    } else if flags.contains(MoveFlags::ATTACK_ONLY) {
        if distance < 2 {
            make_attack(world, display, id);
            MonsterAction::Attack
        } else {
            observed.insert(MoveFlags::ATTACK_ONLY);
            MonsterAction::Idle
        }
    } else if flags.contains(MoveFlags::ONLY_MAGIC) && distance < 2 {
        let recall = world.recall.get_mut(species_index);
        recall.notice_attack(0);
        if recall.attacks[0] > 20 {
            observed.insert(MoveFlags::ONLY_MAGIC);
        }
        MonsterAction::Idle
    } else {
        MonsterAction::Idle
    }
}

/// A monster inside solid rock tries to step out, then is crushed or digs free
fn escape_rock(world: &mut World, display: &mut dyn DisplayPort, id: MonsterId) {
    let Some(m) = world.level.monster(id) else {
        return;
    };
    if m.is_dead() {
        return;
    }
    let pos = m.pos;
    let mut exits: Vec<Direction> = Direction::COMPASS
        .into_iter()
        .filter(|&d| {
            let c = pos.step(d);
            world.level.on_grid(c)
                && world.level.feature(c).is_open()
                && world.level.cell(c).occupant != Occupant::Player
        })
        .collect();
    if !exits.is_empty() {
        let first = (world.rng.randint(exits.len() as i32) - 1) as usize;
        exits.swap(0, first);
        let mut observed = MoveFlags::empty();
        make_move(world, display, id, &exits, &mut observed);
    }

    let Some(m) = world.level.monster(id) else {
        return;
    };
    let pos = m.pos;
    if world.level.feature(pos).is_cave_wall() {
        let damage = world.rng.damroll(8, 8);
        if monster_take_hit(world, display, id, damage).is_some() {
            display.message("You hear a scream muffled by rock!");
        } else {
            display.message("A creature digs itself out from the rock!");
            world.level.set_feature(pos, Feature::Corridor);
            display.redraw_cell(pos);
        }
        debug!(target: "mo_core.monster", ?id, ?pos, damage, "crushed by rock");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::dungeon::Level;
    use crate::monster::spawn::place_monster;
    use crate::monster::table::SPECIES;
    use crate::ports::RecordingDisplay;

    fn lit_room() -> World {
        let mut world = World::new(GameConfig::default(), 51);
        let mut level = Level::new(3, 20, 40);
        for y in 1..19 {
            for x in 1..39 {
                let c = Coord::new(y, x);
                level.set_feature(c, Feature::RoomFloor);
                level.cell_mut(c).perma_lit = true;
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
    fn test_movement_rate_two_thirds() {
        let counts: Vec<i32> = (0..3).map(|t| movement_rate(2, 3, t, 0, false)).collect();
        assert_eq!(counts, vec![0, 1, 1]);
    }

    #[test]
    fn test_movement_rate_totals() {
        let total: i32 = (0..1000).map(|t| movement_rate(20, 10, t, 3, false)).sum();
        assert_eq!(total, 2000);
        assert_eq!(movement_rate(30, 10, 5, 0, true), 1);
    }

    #[test]
    fn test_get_moves_points_at_player() {
        let player = Coord::new(10, 10);
        for (dy, dx) in [(-5, 0), (5, 0), (0, 5), (0, -5), (3, 3), (-3, -3), (4, -1), (-1, 6)] {
            let monster = player.offset(dy, dx);
            let first = get_moves(monster, player)[0];
            let next = monster.step(first);
            assert!(
                crate::geometry::distance(next, player) < crate::geometry::distance(monster, player),
                "{dy},{dx} -> {first:?}"
            );
        }
    }

    #[test]
    fn test_get_moves_octants() {
        let p = Coord::new(10, 10);
        assert_eq!(get_moves(Coord::new(12, 12), p)[0], Direction::NorthWest);
        assert_eq!(get_moves(Coord::new(10, 15), p)[0], Direction::West);
        assert_eq!(get_moves(Coord::new(5, 10), p)[0], Direction::South);
        assert_eq!(get_moves(Coord::new(8, 8), p)[0], Direction::SouthEast);
    }

    #[test]
    fn test_asleep_monster_reports_asleep() {
        let mut world = lit_room();
        world.player.stealth = 29;
        let id = place_monster(&mut world, find("jackal"), Coord::new(10, 25), false).unwrap();
        world.level.monster_mut(id).unwrap().sleep = 10_000;
        let mut display = RecordingDisplay::default();
        let report = process_monsters(&mut world, &mut display, true);
        assert!(report.of(id).all(|a| a == MonsterAction::Asleep));
    }

    #[test]
    fn test_walker_closes_in() {
        let mut world = lit_room();
        let orc = find("cave orc");
        let id = place_monster(&mut world, orc, Coord::new(10, 30), false).unwrap();
        let mut display = RecordingDisplay::default();
        let before = world.level.monster(id).unwrap().distance;
        for _ in 0..3 {
            world.turn += 1;
            process_monsters(&mut world, &mut display, true);
        }
        assert!(world.level.monster(id).unwrap().distance < before);
        assert!(world.recall.get(orc).moves.contains(MoveFlags::MOVE_NORMAL));
    }

    #[test]
    fn test_refresh_only_sweep_does_not_act() {
        let mut world = lit_room();
        let id = place_monster(&mut world, find("cave orc"), Coord::new(10, 30), false).unwrap();
        let mut display = RecordingDisplay::default();
        let report = process_monsters(&mut world, &mut display, false);
        assert!(report.actions.is_empty());
        assert_eq!(world.level.monster(id).unwrap().pos, Coord::new(10, 30));
        assert!(world.level.monster(id).unwrap().visible);
    }

    #[test]
    fn test_breeding_allowed_at_cap() {
        let mut world = lit_room();
        world.config.monsters.multiply_adjust = 1;
        let cap = world.config.monsters.max_multiply;
        world.level.multiplied = cap;
        let id = place_monster(&mut world, find("white worm mass"), Coord::new(5, 5), false).unwrap();
        let mut display = RecordingDisplay::default();
        let mut observed = MoveFlags::empty();
        let mut report = SweepReport::default();

        act(&mut world, &mut display, id, &mut observed, &mut report);
        assert_eq!(report.count(MonsterAction::Breed), 1);
        assert_eq!(world.level.multiplied, cap + 1);

        act(&mut world, &mut display, id, &mut observed, &mut report);
        assert_eq!(report.count(MonsterAction::Breed), 1);
        assert_eq!(world.level.multiplied, cap + 1);
    }

    #[test]
    fn test_buried_monster_escapes_or_digs() {
        let mut world = lit_room();
        let c = Coord::new(5, 5);
        let id = place_monster(&mut world, find("cave orc"), c, false).unwrap();
        world.level.set_feature(c, Feature::Granite);
        let mut display = RecordingDisplay::default();
        escape_rock(&mut world, &mut display, id);
        let m = world.level.monster(id).unwrap();
        assert!(!world.level.feature(m.pos).is_cave_wall() || world.level.is_pending_removal(id));
    }

    #[test]
    fn test_boxed_in_rock_takes_damage() {
        let mut world = lit_room();
        let c = Coord::new(5, 5);
        let id = place_monster(&mut world, find("cave orc"), c, false).unwrap();
        for n in c.neighbors() {
            world.level.set_feature(n, Feature::Granite);
        }
        world.level.set_feature(c, Feature::Granite);
        world.level.monster_mut(id).unwrap().hp = 1000;
        let mut display = RecordingDisplay::default();
        escape_rock(&mut world, &mut display, id);
        assert!(display.contains("A creature digs itself out from the rock!"));
        assert_eq!(world.level.feature(c), Feature::Corridor);
        assert!(world.level.monster(id).unwrap().hp < 1000);
    }

    #[test]
    fn test_stun_recovery_message() {
        let mut world = lit_room();
        let id = place_monster(&mut world, find("jackal"), Coord::new(10, 25), false).unwrap();
        {
            let m = world.level.monster_mut(id).unwrap();
            m.stunned = 1;
            m.visible = true;
        }
        let mut display = RecordingDisplay::default();
        recover_from_stun(&mut world, &mut display, id);
        assert_eq!(world.level.monster(id).unwrap().stunned, 0);
        assert!(display.contains("The jackal recovers and glares at you."));
    }
}
