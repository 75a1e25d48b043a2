use proptest::prelude::*;

use mo_core::dungeon::{Feature, generate_level, is_connected};
use mo_core::{GameConfig, MIN_MALLOC_LEVEL, World};

fn generated(seed: u64, depth: i32) -> (World, mo_core::dungeon::GenerationReport) {
    let mut world = World::at_depth(GameConfig::default(), seed, depth);
    let report = generate_level(&mut world);
    (world, report)
}

fn edges_are_boundary(world: &World) -> bool {
    let level = &world.level;
    level.coords().all(|c| {
        let edge = c.y == 0 || c.x == 0 || c.y == level.height - 1 || c.x == level.width - 1;
        !edge || level.feature(c) == Feature::Boundary
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_levels_are_connected(seed in any::<u64>(), depth in 1i32..=40) {
        let (world, report) = generated(seed, depth);
        prop_assert!(is_connected(&world.level, report.start), "seed={seed} depth={depth}");
        for stairs in [Feature::UpStairs, Feature::DownStairs] {
            for c in world.level.find_features(stairs) {
                prop_assert!(is_connected(&world.level, c));
            }
        }
    }

    #[test]
    fn prop_levels_are_walled_in(seed in any::<u64>(), depth in 0i32..=40) {
        let (world, _) = generated(seed, depth);
        prop_assert!(edges_are_boundary(&world), "seed={seed} depth={depth}");
    }
}

#[test]
fn test_depth_five_scenario() {
    let mut world = World::at_depth(GameConfig::default(), 20_251, 5);
    let report = generate_level(&mut world);

    let start = world.level.cell(world.player.pos);
    assert!(start.feature.is_floor());
    assert!(start.item.is_none());
    assert_eq!(world.level.monster_at(world.player.pos), None);

    assert!(!world.level.find_features(Feature::UpStairs).is_empty());
    assert!(world.level.find_features(Feature::DownStairs).len() >= 2);

    // alloc_level(5) is 2; rooms, pits and the ghost may add more on top
    let low = MIN_MALLOC_LEVEL + 2;
    assert!((low..=low + 8).contains(&report.monsters), "{} allocated", report.monsters);
    assert!(world.level.live_monsters() as i32 >= report.monsters);
}

#[test]
fn test_unusual_rooms_disabled_by_config() {
    let mut config = GameConfig::default();
    config.dungeon.unusual_rooms = i32::MAX;
    let mut world = World::at_depth(config, 77, 5);
    let report = generate_level(&mut world);
    assert_eq!(report.unusual_rooms, 0);
    assert!(!report.pit);
}

#[test]
fn test_same_seed_same_level() {
    let (a, _) = generated(99, 7);
    let (b, _) = generated(99, 7);
    for c in a.level.coords() {
        assert_eq!(a.level.feature(c), b.level.feature(c));
    }
    assert_eq!(a.player.pos, b.player.pos);
}

#[test]
fn test_town_level() {
    let (world, report) = generated(3, 0);
    assert_eq!(world.level.height, mo_core::SCREEN_HEIGHT);
    assert_eq!(world.level.width, mo_core::SCREEN_WIDTH);
    assert_eq!(world.level.find_features(Feature::DownStairs).len(), 1);
    assert!(world.level.find_features(Feature::UpStairs).is_empty());
    for store in 0..mo_core::MAX_STORES {
        assert_eq!(world.level.find_features(Feature::StoreEntrance(store)).len(), 1);
    }
    assert!(edges_are_boundary(&world));
    assert_eq!(report.monsters, world.config.town.day_monsters);
    assert!(world.level.cell(world.player.pos).feature.is_floor());
}
