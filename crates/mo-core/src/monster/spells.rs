//! Monster spellcasting
//!
//! A caster rolls against its spell frequency, needs the player in range and
//! in sight, then casts one of its known spells at random.

use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::debug;

use super::ai::update_visibility;
use super::spawn::{SummonContext, SummonFilter, summon_monster, teleport_away};
use super::{MonsterId, SpellFlags, capitalize};
use crate::combat::{Element, elemental_damage};
use crate::player::Intrinsics;
use crate::ports::{DisplayPort, Disturb};
use crate::world::World;

/// Blink distance
const BLINK_DISTANCE: i32 = 5;

/// A single monster spell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum Spell {
    Blink,
    Teleport,
    TeleportTo,
    CauseLight,
    CauseSerious,
    HoldPerson,
    Blind,
    Confuse,
    Scare,
    SummonMonster,
    SummonUndead,
    Slow,
    DrainMana,
    BreatheLightning,
    BreatheGas,
    BreatheAcid,
    BreatheFrost,
    BreatheFire,
}

impl Spell {
    pub const fn flag(self) -> SpellFlags {
        match self {
            Spell::Blink => SpellFlags::BLINK,
            Spell::Teleport => SpellFlags::TELEPORT,
            Spell::TeleportTo => SpellFlags::TELEPORT_TO,
            Spell::CauseLight => SpellFlags::CAUSE_LIGHT,
            Spell::CauseSerious => SpellFlags::CAUSE_SERIOUS,
            Spell::HoldPerson => SpellFlags::HOLD_PERSON,
            Spell::Blind => SpellFlags::BLIND,
            Spell::Confuse => SpellFlags::CONFUSE,
            Spell::Scare => SpellFlags::SCARE,
            Spell::SummonMonster => SpellFlags::SUMMON_MONSTER,
            Spell::SummonUndead => SpellFlags::SUMMON_UNDEAD,
            Spell::Slow => SpellFlags::SLOW,
            Spell::DrainMana => SpellFlags::DRAIN_MANA,
            Spell::BreatheLightning => SpellFlags::BREATHE_LIGHTNING,
            Spell::BreatheGas => SpellFlags::BREATHE_GAS,
            Spell::BreatheAcid => SpellFlags::BREATHE_ACID,
            Spell::BreatheFrost => SpellFlags::BREATHE_FROST,
            Spell::BreatheFire => SpellFlags::BREATHE_FIRE,
        }
    }

    /// Spells in a flag set, in table order
    pub fn known(flags: SpellFlags) -> Vec<Spell> {
        Spell::iter().filter(|s| flags.contains(s.flag())).collect()
    }

    /// Teleports and mana drain happen without interrupting the player
    const fn is_quiet(self) -> bool {
        matches!(self, Spell::Blink | Spell::Teleport | Spell::DrainMana)
    }

    /// What the player sees the caster do, for spells that announce themselves
    const fn incantation(self) -> Option<&'static str> {
        match self {
            Spell::TeleportTo => Some("makes a gesture."),
            Spell::CauseLight => Some("points at you and curses."),
            Spell::CauseSerious => Some("points at you, incanting terribly."),
            Spell::HoldPerson | Spell::Confuse => Some("gestures at you."),
            Spell::Blind => Some("casts a spell, burning your eyes!"),
            Spell::Scare => Some("casts a fearful illusion."),
            Spell::SummonMonster => Some("magically summons a monster!"),
            Spell::SummonUndead => Some("magically summons an undead!"),
            Spell::Slow => Some("drains power from your muscles."),
            Spell::BreatheLightning => Some("breathes lightning."),
            Spell::BreatheGas => Some("breathes gas."),
            Spell::BreatheAcid => Some("breathes acid."),
            Spell::BreatheFrost => Some("breathes frost."),
            Spell::BreatheFire => Some("breathes fire."),
            Spell::Blink | Spell::Teleport | Spell::DrainMana => None,
        }
    }
}

/// Roll for a spell; returns whether the monster used its turn casting
pub fn cast_spell(world: &mut World, display: &mut dyn DisplayPort, id: MonsterId) -> bool {
    let Some(m) = world.level.monster(id) else {
        return false;
    };
    let species = world.species.get(m.species);
    let (pos, dist) = (m.pos, m.distance);
    if species.spell_freq <= 0 || world.rng.randint(species.spell_freq) != 1 {
        return false;
    }
    if dist > world.config.monsters.max_spell_distance || !world.level.los(world.player.pos, pos) {
        return false;
    }
    let known = Spell::known(species.spells);
    let Some(&spell) = world.rng.choose(&known) else {
        return false;
    };
    cast(world, display, id, spell);
    true
}

/// Cast `spell` at the player
pub fn cast(world: &mut World, display: &mut dyn DisplayPort, id: MonsterId, spell: Spell) {
    update_visibility(world, display, id);
    let Some(m) = world.level.monster(id) else {
        return;
    };
    let species_index = m.species;
    let species = world.species.get(species_index);
    let (pos, hp, visible) = (m.pos, m.hp, m.visible);
    let who = if visible {
        capitalize(&species.the_name())
    } else {
        "It".to_string()
    };
    let cause = species.death_name();

    if !spell.is_quiet() {
        world.player.disturb(display, Disturb::SEARCH);
    }
    if let Some(text) = spell.incantation() {
        display.message(&format!("{who} {text}"));
    }
    debug!(target: "mo_core.monster", caster = species.name, %spell, "cast");

    match spell {
        Spell::Blink => {
            teleport_away(world, id, BLINK_DISTANCE);
        }
        Spell::Teleport => {
            let dis = world.config.monsters.max_sight;
            teleport_away(world, id, dis);
        }
        Spell::TeleportTo => {
            world.teleport_player_to(pos);
        }
        Spell::CauseLight => wound(world, display, 3, 8, &cause),
        Spell::CauseSerious => wound(world, display, 8, 8, &cause),
        Spell::HoldPerson => {
            if world.player.has(Intrinsics::FREE_ACTION) {
                display.message("You are unaffected.");
            } else if world.player.saves(&mut world.rng) {
                display.message("You resist the effects of the spell.");
            } else if world.player.status.paralysis > 0 {
                world.player.status.paralysis += 2;
            } else {
                world.player.status.paralysis = world.rng.randint(5) + 4;
            }
        }
        Spell::Blind => {
            if world.player.saves(&mut world.rng) {
                display.message("You resist the effects of the spell.");
            } else if world.player.status.blind > 0 {
                world.player.status.blind += 6;
            } else {
                world.player.status.blind += 12 + world.rng.randint(3);
            }
        }
        Spell::Confuse => {
            if world.player.saves(&mut world.rng) {
                display.message("You resist the effects of the spell.");
            } else if world.player.status.confused > 0 {
                world.player.status.confused += 2;
            } else {
                world.player.status.confused = world.rng.randint(5) + 3;
            }
        }
        Spell::Scare => {
            if world.player.saves(&mut world.rng) {
                display.message("You resist the effects of the spell.");
            } else if world.player.status.afraid > 0 {
                world.player.status.afraid += 2;
            } else {
                world.player.status.afraid = world.rng.randint(5) + 3;
            }
        }
        Spell::SummonMonster | Spell::SummonUndead => {
            let filter = if spell == Spell::SummonUndead {
                SummonFilter::Undead
            } else {
                SummonFilter::Any
            };
            let ctx = SummonContext::new(Some(id), world.level.depth, filter);
            let around = world.player.pos;
            if let Some(c) = summon_monster(world, ctx, around)
                && let Some(summoned) = world.level.monster_at(c)
            {
                update_visibility(world, display, summoned);
            }
        }
        Spell::Slow => {
            if world.player.has(Intrinsics::FREE_ACTION) {
                display.message("You are unaffected.");
            } else if world.player.saves(&mut world.rng) {
                display.message("You resist the effects of the spell.");
            } else if world.player.status.slow > 0 {
                world.player.status.slow += 2;
            } else {
                world.player.status.slow = world.rng.randint(5) + 3;
            }
        }
        Spell::DrainMana => {
            if world.player.cmana > 0 {
                world.player.disturb(display, Disturb::SEARCH);
                display.message(&format!("{who} draws psychic energy from you."));
                if visible {
                    display.message(&format!("{who} appears healthier."));
                }
                let mut drained = (world.rng.randint(species.level.max(1)) >> 1) + 1;
                if drained >= world.player.cmana {
                    drained = world.player.cmana;
                    world.player.cmana = 0;
                    world.player.mana_frac = 0;
                } else {
                    world.player.cmana -= drained;
                }
                if let Some(m) = world.level.monster_mut(id) {
                    m.hp += 6 * drained;
                }
            }
        }
        Spell::BreatheLightning => {
            elemental_damage(world, display, Element::Lightning, hp / 4, &cause);
        }
        Spell::BreatheGas => elemental_damage(world, display, Element::Poison, hp / 3, &cause),
        Spell::BreatheAcid => elemental_damage(world, display, Element::Acid, hp / 3, &cause),
        Spell::BreatheFrost => elemental_damage(world, display, Element::Cold, hp / 3, &cause),
        Spell::BreatheFire => elemental_damage(world, display, Element::Fire, hp / 3, &cause),
    }

    if visible {
        let recall = world.recall.get_mut(species_index);
        recall.spells |= spell.flag();
        if world.player.dead {
            recall.deaths = recall.deaths.saturating_add(1);
        }
    }
}

fn wound(world: &mut World, display: &mut dyn DisplayPort, dice: i32, sides: i32, cause: &str) {
    if world.player.saves(&mut world.rng) {
        display.message("You resist the effects of the spell.");
    } else {
        let damage = world.rng.damroll(dice, sides);
        world.player.take_hit(damage, cause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::dungeon::{Feature, Level, Occupant};
    use crate::geometry::{Coord, distance};
    use crate::item::Pack;
    use crate::monster::spawn::place_monster;
    use crate::monster::table::SPECIES;
    use crate::ports::RecordingDisplay;

    fn hall() -> World {
        let mut world = World::new(GameConfig::default(), 41).with_pack(Box::new(Pack::default()));
        let mut level = Level::new(8, 20, 40);
        for y in 1..19 {
            for x in 1..39 {
                level.set_feature(Coord::new(y, x), Feature::RoomFloor);
                level.cell_mut(Coord::new(y, x)).perma_lit = true;
            }
        }
        world.level = level;
        world.move_player(Coord::new(10, 5));
        world
    }

    fn caster(world: &mut World, name: &str, at: Coord) -> MonsterId {
        let species = SPECIES.iter().position(|s| s.name == name).unwrap();
        let id = place_monster(world, species, at, false).unwrap();
        world.level.monster_mut(id).unwrap().visible = true;
        world.refresh_distances();
        id
    }

    #[test]
    fn test_known_spells_follow_flags() {
        let known = Spell::known(SpellFlags::BLINK | SpellFlags::BREATHE_FIRE);
        assert_eq!(known, vec![Spell::Blink, Spell::BreatheFire]);
    }

    #[test]
    fn test_teleport_to_lands_next_to_caster() {
        let mut world = hall();
        let at = Coord::new(10, 20);
        let start = world.player.pos;
        let id = caster(&mut world, "novice mage", at);
        let mut display = RecordingDisplay::default();
        cast(&mut world, &mut display, id, Spell::TeleportTo);
        assert_eq!(distance(world.player.pos, at), 1);
        assert_eq!(world.level.cell(world.player.pos).occupant, Occupant::Player);
        assert_eq!(world.level.cell(start).occupant, Occupant::Empty);
        assert_eq!(world.level.monster(id).unwrap().pos, at);
        assert!(display.contains("The novice mage makes a gesture."));
    }

    #[test]
    fn test_hold_person_respects_free_action() {
        let mut world = hall();
        world.player.intrinsics = Intrinsics::FREE_ACTION;
        let id = caster(&mut world, "ghoul", Coord::new(10, 8));
        let mut display = RecordingDisplay::default();
        cast(&mut world, &mut display, id, Spell::HoldPerson);
        assert_eq!(world.player.status.paralysis, 0);
        assert!(display.contains("You are unaffected."));
    }

    #[test]
    fn test_breath_scales_with_caster_health() {
        let mut world = hall();
        world.player.chp = 1000;
        world.player.mhp = 1000;
        let id = caster(&mut world, "baby blue dragon", Coord::new(10, 8));
        world.level.monster_mut(id).unwrap().hp = 40;
        let mut display = RecordingDisplay::default();
        cast(&mut world, &mut display, id, Spell::BreatheLightning);
        assert_eq!(world.player.chp, 990);
        assert!(display.contains("The baby blue dragon breathes lightning."));
        let recall = world.recall.get(world.level.monster(id).unwrap().species);
        assert!(recall.spells.contains(SpellFlags::BREATHE_LIGHTNING));
    }

    #[test]
    fn test_drain_mana_heals_caster() {
        let mut world = hall();
        world.player.cmana = 1;
        world.player.mmana = 10;
        let id = caster(&mut world, "yellow jelly", Coord::new(10, 8));
        let hp = world.level.monster(id).unwrap().hp;
        let mut display = RecordingDisplay::default();
        cast(&mut world, &mut display, id, Spell::DrainMana);
        assert_eq!(world.player.cmana, 0);
        assert_eq!(world.level.monster(id).unwrap().hp, hp + 6);
    }

    #[test]
    fn test_no_cast_out_of_sight() {
        let mut world = hall();
        for y in 1..19 {
            world.level.set_feature(Coord::new(y, 20), Feature::Granite);
        }
        let id = caster(&mut world, "novice mage", Coord::new(10, 30));
        let mut display = RecordingDisplay::default();
        for _ in 0..100 {
            assert!(!cast_spell(&mut world, &mut display, id));
        }
    }
}
