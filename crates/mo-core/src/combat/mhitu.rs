//! Monster attacks the player
//!
//! [`make_attack`] runs a creature's whole blow list. Each blow rolls to hit,
//! prints its method message, then hands off to the handler for its
//! [`AttackEffect`]. Handlers report whether the player could tell what the
//! blow did; that decides what the recall learns.

use tracing::debug;

use super::{
    AttackEffect, AttackMethod, critical_cut, critical_stun, mitigate_armor, monster_critical,
    test_hit,
};
use crate::consts::{MAX_MON_NATTACK, MAX_MONS_LEVEL, MON_DRAIN_LIFE};
use crate::geometry::distance;
use crate::item::ItemKind;
use crate::monster::spawn::teleport_away;
use crate::monster::{DefenseFlags, MonsterId, Species, capitalize};
use crate::player::{Intrinsics, Stat};
use crate::ports::{DisplayPort, Disturb};
use crate::world::World;

/// What one blow did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackOutcome {
    Hit { effect: AttackEffect, noticed: bool },
    Missed,
    /// Stopped by protection from evil
    Repelled,
}

/// Who is landing a blow, as the effect handlers need it
#[derive(Debug, Clone)]
pub struct BlowContext {
    pub attacker: MonsterId,
    pub species: &'static Species,
    /// "The jackal", or "It" when the attacker is unseen
    pub who: String,
    /// Cause of death should the blow kill
    pub cause: String,
    pub visible: bool,
}

impl BlowContext {
    pub fn new(world: &World, attacker: MonsterId) -> Option<Self> {
        let m = world.level.monster(attacker)?;
        let species = world.species.get(m.species);
        let who = if m.visible {
            capitalize(&species.the_name())
        } else {
            "It".to_string()
        };
        let cause = if species.is_win_monster() {
            capitalize(&species.the_name())
        } else {
            species.death_name()
        };
        Some(Self {
            attacker,
            species,
            who,
            cause,
            visible: m.visible,
        })
    }
}

/// Run every blow of `attacker` against the player
///
/// Stops early when the player dies or the attacker is carried away.
pub fn make_attack(
    world: &mut World,
    display: &mut dyn DisplayPort,
    attacker: MonsterId,
) -> Vec<AttackOutcome> {
    let mut outcomes = Vec::new();
    if world.player.dead {
        return outcomes;
    }
    let Some(ctx) = BlowContext::new(world, attacker) else {
        return outcomes;
    };
    let species = ctx.species;
    let species_index = match world.level.monster(attacker) {
        Some(m) => m.species,
        None => return outcomes,
    };

    for (slot, blow) in species.attacks.iter().take(MAX_MON_NATTACK).enumerate() {
        if world.player.dead {
            break;
        }
        let still_here = world
            .level
            .monster(attacker)
            .is_some_and(|m| distance(m.pos, world.player.pos) <= 1);
        if !still_here {
            break;
        }

        let mut effect = blow.effect;
        let mut method = blow.method;
        if world.player.status.protevil > 0
            && species.is_evil()
            && world.player.level + 1 > species.level
        {
            if ctx.visible {
                world.recall.get_mut(species_index).defense |= DefenseFlags::EVIL;
            }
            effect = AttackEffect::Repelled;
            method = AttackMethod::Repelled;
        }

        let hit = match effect.hit_bonus() {
            None => true,
            Some(bonus) => test_hit(&mut world.rng, bonus, species.level, world.player.total_ac()),
        };
        if !hit {
            if method.announces_miss() {
                world.player.disturb(display, Disturb::SEARCH);
                display.message(&method.miss_message(&ctx.who));
            }
            outcomes.push(AttackOutcome::Missed);
            continue;
        }

        world.player.disturb(display, Disturb::SEARCH);
        let text = method.hit_message(&ctx.who, &mut world.rng);
        display.message(&text);

        let mut damage = world.rng.damroll(blow.dice, blow.sides);
        if effect == AttackEffect::Hurt {
            damage = mitigate_armor(damage, world.player.total_ac());
            let crit = monster_critical(&mut world.rng, blow.dice, blow.sides, damage);
            if method.stuns() {
                stun_player(world, display, crit);
            } else if method.cuts() {
                cut_player(world, display, crit);
            }
        }
        let noticed = apply_effect(world, display, &ctx, effect, damage) && ctx.visible;

        if world.player.status.confuse_monster && effect != AttackEffect::Repelled {
            confuse_attacker(world, display, &ctx);
        }

        let recall = world.recall.get_mut(species_index);
        if noticed
            || (ctx.visible && recall.attacks[slot] != 0 && effect != AttackEffect::Repelled)
        {
            recall.notice_attack(slot);
        }
        if world.player.dead {
            recall.deaths = recall.deaths.saturating_add(1);
        }

        outcomes.push(if effect == AttackEffect::Repelled {
            AttackOutcome::Repelled
        } else {
            AttackOutcome::Hit { effect, noticed }
        });
    }
    debug!(
        target: "mo_core.combat",
        attacker = species.name,
        blows = outcomes.len(),
        dead = world.player.dead,
        "monster attacked"
    );
    outcomes
}

/// Apply the effect of a landed blow; returns whether it was noticed
pub fn apply_effect(
    world: &mut World,
    display: &mut dyn DisplayPort,
    ctx: &BlowContext,
    effect: AttackEffect,
    damage: i32,
) -> bool {
    match effect {
        AttackEffect::Hurt => {
            world.player.take_hit(damage, &ctx.cause);
            true
        }
        AttackEffect::LoseStr => lose_strength(world, display, ctx, damage),
        AttackEffect::Confuse => confuse(world, display, ctx, damage),
        AttackEffect::Terrify => terrify(world, display, ctx, damage),
        AttackEffect::Fire => {
            display.message("You are enveloped in flames!");
            elemental_damage(world, display, Element::Fire, damage, &ctx.cause);
            true
        }
        AttackEffect::Acid => {
            display.message("You are covered in acid!");
            elemental_damage(world, display, Element::Acid, damage, &ctx.cause);
            true
        }
        AttackEffect::Cold => {
            display.message("You are covered with frost!");
            elemental_damage(world, display, Element::Cold, damage, &ctx.cause);
            true
        }
        AttackEffect::Lightning => {
            display.message("Lightning strikes you!");
            elemental_damage(world, display, Element::Lightning, damage, &ctx.cause);
            true
        }
        AttackEffect::Corrode => corrode(world, display, ctx, damage),
        AttackEffect::Blind => blind(world, display, ctx, damage),
        AttackEffect::Paralyze => paralyze(world, display, ctx, damage),
        AttackEffect::StealGold => steal_gold(world, display, ctx),
        AttackEffect::StealItem => steal_item(world, display, ctx),
        AttackEffect::Poison => {
            world.player.take_hit(damage, &ctx.cause);
            display.message("You feel very sick.");
            world.player.status.poisoned += world.rng.randint(ctx.species.level.max(1)) + 5;
            true
        }
        AttackEffect::LoseDex => drain_stat(world, display, ctx, damage, Stat::Dexterity),
        AttackEffect::LoseCon => drain_stat(world, display, ctx, damage, Stat::Constitution),
        AttackEffect::LoseInt => drain_stat(world, display, ctx, damage, Stat::Intelligence),
        AttackEffect::LoseWis => drain_stat(world, display, ctx, damage, Stat::Wisdom),
        AttackEffect::LoseExp => lose_exp(world, display, damage),
        AttackEffect::Aggravate => {
            if world.aggravate_monsters(20) {
                display.message("You hear a sudden stirring in the distance!");
            }
            true
        }
        AttackEffect::Disenchant => disenchant(world, display),
        AttackEffect::EatFood => eat_food(world, display),
        AttackEffect::EatLight => eat_light(world, display),
        AttackEffect::EatCharges => eat_charges(world, display, ctx),
        AttackEffect::LoseAll => {
            world.player.take_hit(damage, &ctx.cause);
            for stat in Stat::ALL {
                drain_silently(world, display, stat);
            }
            true
        }
        AttackEffect::Repelled => false,
    }
}

fn stun_player(world: &mut World, display: &mut dyn DisplayPort, crit: i32) {
    let stun = critical_stun(&mut world.rng, crit);
    if stun == 0 {
        return;
    }
    if world.player.status.stun == 0 {
        display.message("You have been stunned.");
    }
    world.player.status.stun += stun;
}

fn cut_player(world: &mut World, display: &mut dyn DisplayPort, crit: i32) {
    let cut = critical_cut(&mut world.rng, crit);
    if cut == 0 {
        return;
    }
    if world.player.status.cut == 0 {
        display.message("You have been given a cut.");
    }
    world.player.status.cut += cut;
}

fn lose_strength(
    world: &mut World,
    display: &mut dyn DisplayPort,
    ctx: &BlowContext,
    damage: i32,
) -> bool {
    world.player.take_hit(damage, &ctx.cause);
    if world.player.sustain[Stat::Strength.index()] {
        display.message(Stat::Strength.sustain_message());
        true
    } else if world.rng.randint(2) == 1 {
        display.message("You feel weaker.");
        world.player.lose_stat(Stat::Strength);
        true
    } else {
        false
    }
}

fn confuse(world: &mut World, display: &mut dyn DisplayPort, ctx: &BlowContext, damage: i32) -> bool {
    world.player.take_hit(damage, &ctx.cause);
    if world.rng.randint(2) != 1 {
        return false;
    }
    let noticed = world.player.status.confused < 1;
    if noticed {
        display.message("You feel confused.");
        world.player.status.confused += world.rng.randint(ctx.species.level.max(1));
    }
    world.player.status.confused += 3;
    noticed
}

fn terrify(world: &mut World, display: &mut dyn DisplayPort, ctx: &BlowContext, damage: i32) -> bool {
    world.player.take_hit(damage, &ctx.cause);
    if world.player.saves(&mut world.rng) {
        display.message("You resist the effects!");
        true
    } else if world.player.status.afraid < 1 {
        display.message("You are suddenly afraid!");
        world.player.status.afraid += 3 + world.rng.randint(ctx.species.level.max(1));
        true
    } else {
        world.player.status.afraid += 3;
        false
    }
}

fn corrode(world: &mut World, display: &mut dyn DisplayPort, ctx: &BlowContext, damage: i32) -> bool {
    display.message("A stinging red gas swirls about you.");
    if !world.player.has(Intrinsics::RES_ACID) {
        let sting = world.rng.randint(8);
        world.player.take_hit(sting, "corrosive gas");
    }
    if damage_pack(world, ItemKind::CORRODIBLE, 5) > 0 {
        display.message("There is an acrid smell coming from your pack.");
    }
    world.player.take_hit(damage, &ctx.cause);
    true
}

fn blind(world: &mut World, display: &mut dyn DisplayPort, ctx: &BlowContext, damage: i32) -> bool {
    world.player.take_hit(damage, &ctx.cause);
    if world.player.status.blind < 1 {
        world.player.status.blind += 10 + world.rng.randint(ctx.species.level.max(1));
        display.message("Your eyes begin to sting.");
        true
    } else {
        world.player.status.blind += 5;
        false
    }
}

fn paralyze(world: &mut World, display: &mut dyn DisplayPort, ctx: &BlowContext, damage: i32) -> bool {
    world.player.take_hit(damage, &ctx.cause);
    if world.player.saves(&mut world.rng) {
        display.message("You resist the effects!");
        true
    } else if world.player.status.paralysis < 1 {
        if world.player.has(Intrinsics::FREE_ACTION) {
            display.message("You are unaffected.");
        } else {
            world.player.status.paralysis = world.rng.randint(ctx.species.level.max(1)) + 3;
            display.message("You are paralyzed.");
        }
        true
    } else {
        false
    }
}

/// A quick enough player keeps hold of their things
fn protects_belongings(world: &mut World) -> bool {
    world.player.status.paralysis < 1
        && world.rng.randint(124) < world.player.stat(Stat::Dexterity)
}

/// Thieves vanish half the time after a grab
fn thief_escapes(world: &mut World, display: &mut dyn DisplayPort, ctx: &BlowContext) {
    if world.rng.randint(2) == 1 {
        display.message("There is a puff of smoke!");
        let dis = world.config.monsters.max_sight;
        teleport_away(world, ctx.attacker, dis);
    }
}

fn steal_gold(world: &mut World, display: &mut dyn DisplayPort, ctx: &BlowContext) -> bool {
    if protects_belongings(world) {
        display.message("You quickly protect your money pouch!");
    } else {
        let taken = world.player.gold / 10 + world.rng.randint(25);
        world.player.gold = (world.player.gold - taken).max(0);
        display.message("Your purse feels lighter.");
    }
    thief_escapes(world, display, ctx);
    true
}

fn steal_item(world: &mut World, display: &mut dyn DisplayPort, ctx: &BlowContext) -> bool {
    if world.pack.is_empty() {
        return false;
    }
    if protects_belongings(world) {
        display.message("You grab hold of your backpack!");
    } else {
        let index = (world.rng.randint(world.pack.len() as i32) - 1) as usize;
        if world.pack.is_artifact(index) {
            display.message("You grab hold of your backpack!");
        } else {
            world.pack.destroy_item(index);
            display.message("Your backpack feels lighter.");
        }
    }
    thief_escapes(world, display, ctx);
    true
}

fn drain_stat(
    world: &mut World,
    display: &mut dyn DisplayPort,
    ctx: &BlowContext,
    damage: i32,
    stat: Stat,
) -> bool {
    world.player.take_hit(damage, &ctx.cause);
    if world.player.sustain[stat.index()] {
        display.message(stat.sustain_message());
        true
    } else if world.player.lose_stat(stat) {
        display.message(stat.drain_message());
        true
    } else {
        false
    }
}

fn drain_silently(world: &mut World, display: &mut dyn DisplayPort, stat: Stat) {
    if world.player.lose_stat(stat) {
        display.message(stat.drain_message());
    }
}

fn lose_exp(world: &mut World, display: &mut dyn DisplayPort, damage: i32) -> bool {
    if world.player.has(Intrinsics::HOLD_LIFE) && world.rng.randint(5) > 1 {
        display.message("You keep hold of your life force!");
        return true;
    }
    display.message("You feel your life draining away!");
    let amount = damage + (world.player.exp / 100) * MON_DRAIN_LIFE;
    world.player.lose_experience(amount);
    true
}

fn disenchant(world: &mut World, display: &mut dyn DisplayPort) -> bool {
    let worn = world.pack.find_items_of_type(ItemKind::EQUIPMENT);
    let Some(&index) = world.rng.choose(&worn) else {
        return false;
    };
    if world.pack.disenchant(index) {
        display.message("There is a static feeling in the air.");
        true
    } else {
        false
    }
}

fn eat_food(world: &mut World, display: &mut dyn DisplayPort) -> bool {
    let food = world.pack.find_items_of_type(ItemKind::Food..=ItemKind::Food);
    match food.first() {
        Some(&index) => {
            world.pack.destroy_item(index);
            display.message("It got at your rations!");
            true
        }
        None => false,
    }
}

fn eat_light(world: &mut World, display: &mut dyn DisplayPort) -> bool {
    if world.player.light <= 0 {
        return false;
    }
    world.player.light = (world.player.light - (250 + world.rng.randint(250))).max(1);
    if world.player.status.blind < 1 {
        display.message("Your light dims.");
        true
    } else {
        false
    }
}

fn eat_charges(world: &mut World, display: &mut dyn DisplayPort, ctx: &BlowContext) -> bool {
    if world.pack.is_empty() {
        return false;
    }
    let index = (world.rng.randint(world.pack.len() as i32) - 1) as usize;
    let charges = world.pack.drain_charges(index);
    if charges <= 0 {
        return false;
    }
    if let Some(m) = world.level.monster_mut(ctx.attacker) {
        m.hp += ctx.species.level * charges;
    }
    display.message("Energy drains from your pack!");
    true
}

/// The glowing hands of a confuse-monster spell discharge into the attacker
fn confuse_attacker(world: &mut World, display: &mut dyn DisplayPort, ctx: &BlowContext) {
    display.message("Your hands stop glowing.");
    world.player.status.confuse_monster = false;
    let resists = world.rng.randint(MAX_MONS_LEVEL) < ctx.species.level
        || ctx.species.defense.contains(DefenseFlags::NO_SLEEP);
    if resists {
        display.message(&format!("{} is unaffected.", ctx.who));
    } else {
        display.message(&format!("{} appears confused.", ctx.who));
        if let Some(m) = world.level.monster_mut(ctx.attacker) {
            if m.confused > 0 {
                m.confused += 3;
            } else {
                m.confused = 2 + world.rng.randint(16);
            }
        }
    }
    if ctx.visible && !world.player.dead && world.rng.randint(4) == 1 {
        if let Some(m) = world.level.monster(ctx.attacker) {
            let learned = ctx.species.defense & DefenseFlags::NO_SLEEP;
            world.recall.get_mut(m.species).defense |= learned;
        }
    }
}

/// Elemental damage shared by blows and breath
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Element {
    Fire,
    Cold,
    Acid,
    Lightning,
    Poison,
}

/// Damage the player with an element, after resistances, and scorch the pack
pub(crate) fn elemental_damage(
    world: &mut World,
    display: &mut dyn DisplayPort,
    element: Element,
    damage: i32,
    cause: &str,
) {
    let status = &world.player.status;
    let (resist, timer) = match element {
        Element::Fire => (Intrinsics::RES_FIRE, status.resist_heat),
        Element::Cold => (Intrinsics::RES_COLD, status.resist_cold),
        Element::Acid => (Intrinsics::RES_ACID, 0),
        Element::Lightning => (Intrinsics::RES_ELEC, 0),
        Element::Poison => (Intrinsics::RES_POISON, 0),
    };
    let mut damage = damage;
    if world.player.has(resist) {
        damage /= 3;
    }
    if timer > 0 {
        damage /= 3;
    }
    world.player.take_hit(damage, cause);

    let (kinds, smell) = match element {
        Element::Fire => (ItemKind::FLAMMABLE, "There is smoke coming from your pack!"),
        Element::Cold => (ItemKind::FRAGILE, "Something shatters inside your pack!"),
        Element::Acid => (ItemKind::CORRODIBLE, "There is an acrid smell coming from your pack!"),
        Element::Lightning => (ItemKind::CONDUCTIVE, "There are sparks coming from your pack!"),
        Element::Poison => {
            world.player.status.poisoned += 12 + world.rng.randint(damage.max(1));
            return;
        }
    };
    if damage_pack(world, kinds, 3) > 0 {
        display.message(smell);
    }
}

/// Destroy each non-artifact pack item of `kinds` with `percent` odds
fn damage_pack(
    world: &mut World,
    kinds: std::ops::RangeInclusive<ItemKind>,
    percent: i32,
) -> usize {
    let mut destroyed = 0;
    // highest index first so removals do not shift the rest
    for index in world.pack.find_items_of_type(kinds).into_iter().rev() {
        if !world.pack.is_artifact(index) && world.rng.randint(100) < percent {
            world.pack.destroy_item(index);
            destroyed += 1;
        }
    }
    destroyed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::dungeon::{Feature, Level};
    use crate::geometry::Coord;
    use crate::item::{Pack, PackItem};
    use crate::monster::spawn::place_monster;
    use crate::monster::table::SPECIES;
    use crate::ports::RecordingDisplay;

    fn arena(seed: u64) -> World {
        let mut world = World::new(GameConfig::default(), seed);
        let mut level = Level::new(3, 12, 20);
        for y in 1..11 {
            for x in 1..19 {
                level.set_feature(Coord::new(y, x), Feature::RoomFloor);
            }
        }
        world.level = level;
        world.move_player(Coord::new(5, 5));
        world
    }

    fn find(name: &str) -> usize {
        SPECIES.iter().position(|s| s.name == name).unwrap()
    }

    fn adjacent(world: &mut World, name: &str) -> MonsterId {
        let id = place_monster(world, find(name), Coord::new(5, 6), false).unwrap();
        world.level.monster_mut(id).unwrap().visible = true;
        id
    }

    #[test]
    fn test_attack_list_runs_to_completion() {
        let mut world = arena(1);
        world.player.chp = 10_000;
        world.player.mhp = 10_000;
        let id = adjacent(&mut world, "cave orc");
        let mut display = RecordingDisplay::default();
        let outcomes = make_attack(&mut world, &mut display, id);
        assert_eq!(outcomes.len(), world.species.get(find("cave orc")).attacks.len());
    }

    #[test]
    fn test_protection_from_evil_repels() {
        let mut world = arena(2);
        world.player.level = 30;
        world.player.status.protevil = 50;
        let id = adjacent(&mut world, "cave orc");
        let mut display = RecordingDisplay::default();
        let hp = world.player.chp;
        let outcomes = make_attack(&mut world, &mut display, id);
        assert!(outcomes.iter().all(|o| *o == AttackOutcome::Repelled));
        assert_eq!(world.player.chp, hp);
        assert!(!outcomes.is_empty());
        assert_eq!(display.count("The cave orc is repelled."), outcomes.len());
        assert_eq!(display.messages.len(), outcomes.len());
        assert!(world.recall.get(find("cave orc")).defense.contains(DefenseFlags::EVIL));
        assert_eq!(world.recall.get(find("cave orc")).attacks, [0; MAX_MON_NATTACK]);
    }

    #[test]
    fn test_unseen_attacker_is_it() {
        let mut world = arena(3);
        world.player.chp = 10_000;
        let id = adjacent(&mut world, "cave orc");
        world.level.monster_mut(id).unwrap().visible = false;
        let mut display = RecordingDisplay::default();
        make_attack(&mut world, &mut display, id);
        assert!(display.messages.iter().all(|m| !m.starts_with("The cave orc")));
        assert_eq!(world.recall.get(find("cave orc")).attacks, [0; MAX_MON_NATTACK]);
    }

    #[test]
    fn test_eat_food_handler() {
        let mut world = arena(4);
        world.pack = Box::new(Pack::new(vec![
            PackItem::new(ItemKind::Weapon, "dagger"),
            PackItem::new(ItemKind::Food, "ration of food"),
        ]));
        let id = adjacent(&mut world, "jackal");
        let ctx = BlowContext::new(&world, id).unwrap();
        let mut display = RecordingDisplay::default();
        assert!(apply_effect(&mut world, &mut display, &ctx, AttackEffect::EatFood, 0));
        assert_eq!(world.pack.len(), 1);
        assert!(!apply_effect(&mut world, &mut display, &ctx, AttackEffect::EatFood, 0));
        assert!(display.contains("It got at your rations!"));
    }

    #[test]
    fn test_confusion_noticed_only_when_fresh() {
        let mut world = arena(5);
        world.player.chp = 10_000;
        let id = adjacent(&mut world, "jackal");
        let ctx = BlowContext::new(&world, id).unwrap();
        let mut display = RecordingDisplay::default();
        let mut fresh = 0;
        for _ in 0..40 {
            let before = world.player.status.confused;
            if apply_effect(&mut world, &mut display, &ctx, AttackEffect::Confuse, 0) {
                assert_eq!(before, 0);
                fresh += 1;
            }
        }
        assert_eq!(fresh, 1);
        assert_eq!(display.count("You feel confused."), 1);
    }

    #[test]
    fn test_fire_resistance_divides() {
        let mut world = arena(6);
        world.pack = Box::new(Pack::default());
        world.player.chp = 100;
        world.player.intrinsics = Intrinsics::RES_FIRE;
        world.player.status.resist_heat = 10;
        let mut display = RecordingDisplay::default();
        elemental_damage(&mut world, &mut display, Element::Fire, 90, "a fire");
        assert_eq!(world.player.chp, 90);
    }

    #[test]
    fn test_steal_gold_never_negative() {
        let mut world = arena(7);
        world.player.stat_cur[Stat::Dexterity.index()] = 3;
        world.player.gold = 5;
        let id = adjacent(&mut world, "jackal");
        let ctx = BlowContext::new(&world, id).unwrap();
        let mut display = RecordingDisplay::default();
        apply_effect(&mut world, &mut display, &ctx, AttackEffect::StealGold, 0);
        assert!(world.player.gold >= 0);
    }

    #[test]
    fn test_confuse_touch_is_spent_on_hit() {
        let mut world = arena(8);
        world.player.chp = 10_000;
        world.player.status.confuse_monster = true;
        let id = adjacent(&mut world, "jackal");
        let mut display = RecordingDisplay::default();
        for _ in 0..20 {
            make_attack(&mut world, &mut display, id);
            if !world.player.status.confuse_monster {
                break;
            }
        }
        assert!(!world.player.status.confuse_monster);
        assert!(display.contains("Your hands stop glowing."));
    }
}
