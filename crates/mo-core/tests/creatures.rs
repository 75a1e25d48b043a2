use proptest::prelude::*;

use mo_core::combat::mitigate_armor;
use mo_core::dungeon::{Feature, Level};
use mo_core::geometry::Coord;
use mo_core::monster::spawn::place_monster;
use mo_core::monster::table::SPECIES;
use mo_core::monster::{MonsterAction, MonsterId, movement_rate, process_monsters};
use mo_core::ports::RecordingDisplay;
use mo_core::{GameConfig, World};

fn species(name: &str) -> usize {
    SPECIES
        .iter()
        .position(|s| s.name == name)
        .unwrap_or_else(|| panic!("no species {name}"))
}

/// A lit open hall with the player in the middle
fn hall() -> World {
    let mut world = World::new(GameConfig::default(), 2024);
    world.depth = 3;
    let mut level = Level::new(3, 30, 60);
    for y in 1..29 {
        for x in 1..59 {
            let c = Coord::new(y, x);
            level.set_feature(c, Feature::RoomFloor);
            level.cell_mut(c).perma_lit = true;
        }
    }
    world.level = level;
    world.move_player(Coord::new(15, 30));
    world.player.mhp = 10_000;
    world.player.chp = 10_000;
    world
}

#[test]
fn test_two_thirds_speed_sequence() {
    let moves: Vec<i32> = (0..3).map(|turn| movement_rate(2, 3, turn, 0, false)).collect();
    assert_eq!(moves, vec![0, 1, 1]);
}

proptest! {
    #[test]
    fn prop_window_sums_match_speed_ratio(
        monster in 1i32..=40,
        player in 1i32..=40,
        turn in 0u64..100_000,
        index in 0usize..200,
    ) {
        let total: i32 = (0..player as u64)
            .map(|t| movement_rate(monster, player, turn + t, index, false))
            .sum();
        prop_assert_eq!(total, monster);
    }

    #[test]
    fn prop_two_thirds_never_clumps(turn in 0u64..100_000, index in 0usize..200) {
        let window: Vec<i32> = (0..3)
            .map(|t| movement_rate(2, 3, turn + t, index, false))
            .collect();
        prop_assert_eq!(window.iter().sum::<i32>(), 2);
        prop_assert!(window.iter().all(|&m| m <= 1));
    }
}

/// Fill the monster table with idle molds until it holds `count` entries
fn pad(world: &mut World, count: usize) {
    let mold = species("grey mold");
    let mut x = 2;
    while world.level.monsters.len() < count {
        place_monster(world, mold, Coord::new(2, x), false);
        x += 2;
    }
}

/// Place an eater and its prey so the eater's first step lands on the prey
fn eat_scenario(eater_first: bool) -> (World, MonsterId, MonsterId) {
    let mut world = hall();
    let cube = species("gelatinous cube");
    let prey = species("grey mold");
    let eater_at = Coord::new(15, 34);
    let prey_at = Coord::new(15, 33);

    pad(&mut world, 5);
    let first = if eater_first { (cube, eater_at) } else { (prey, prey_at) };
    let second = if eater_first { (prey, prey_at) } else { (cube, eater_at) };
    let a = place_monster(&mut world, first.0, first.1, false).unwrap();
    pad(&mut world, 9);
    let b = place_monster(&mut world, second.0, second.1, false).unwrap();
    assert_eq!(world.level.index_of(a), Some(5));
    assert_eq!(world.level.index_of(b), Some(9));

    if eater_first { (world, a, b) } else { (world, b, a) }
}

fn check_one_survivor(eater_first: bool) {
    let (mut world, eater, prey) = eat_scenario(eater_first);
    let mut display = RecordingDisplay::default();
    for _ in 0..10 {
        world.turn += 1;
        process_monsters(&mut world, &mut display, true);
        if world.level.monster(prey).is_none() {
            break;
        }
    }
    assert!(world.level.monster(prey).is_none());
    let survivor = world.level.monster(eater).expect("the eater survives");
    assert_eq!(world.level.monster_at(survivor.pos), Some(eater));
    assert_eq!(world.level.monsters.len(), 9);
    assert_eq!(world.level.live_monsters(), 9);
    for (index, m) in world.level.monsters.iter().enumerate() {
        assert_eq!(world.level.index_of(m.id), Some(index));
    }
}

#[test]
fn test_lower_index_eats_higher() {
    check_one_survivor(true);
}

#[test]
fn test_higher_index_eats_lower() {
    check_one_survivor(false);
}

#[test]
fn test_armor_mitigation_table() {
    for (armor, expected) in [(0, 100), (75, 72), (150, 44), (300, 44)] {
        let clamped = armor.min(150);
        assert_eq!(expected, 100 - ((clamped * 3 / 4) * 100) / 200);
        assert_eq!(mitigate_armor(100, armor), expected, "armor {armor}");
    }
}

#[test]
fn test_confusion_expiry_is_idempotent() {
    let mut world = hall();
    let mut display = RecordingDisplay::default();
    world.player.tick_confusion(&mut display);
    assert!(display.messages.is_empty());

    world.player.status.confused = 1;
    world.player.tick_confusion(&mut display);
    world.player.tick_confusion(&mut display);
    assert_eq!(world.player.status.confused, 0);
    assert_eq!(display.count("You feel less confused now."), 1);
}

#[test]
fn test_attack_only_creature_never_moves() {
    let mut world = hall();
    let mold = species("grey mold");
    let at = Coord::new(15, 31);
    let id = place_monster(&mut world, mold, at, false).unwrap();
    let mut display = RecordingDisplay::default();

    let mut allotted = 0;
    let mut attacks = 0;
    for _ in 0..20 {
        world.turn += 1;
        let speed = SPECIES[mold].speed;
        allotted += movement_rate(speed, world.player.speed(), world.turn, 0, false);
        let report = process_monsters(&mut world, &mut display, true);
        for action in report.of(id) {
            assert_eq!(action, MonsterAction::Attack);
            attacks += 1;
        }
    }
    assert_eq!(attacks, allotted);
    assert_eq!(world.level.monster(id).unwrap().pos, at);
}
