//! Player attacks monster
//!
//! Melee from the player and the shared damage path every source of monster
//! damage goes through, so kills are credited in one place.

use tracing::{debug, info};

use super::test_hit;
use crate::consts::MAX_MONS_LEVEL;
use crate::monster::{DefenseFlags, MonsterId, capitalize};
use crate::ports::DisplayPort;
use crate::world::World;

/// Damage a monster; on a kill credit the player and schedule removal
///
/// Returns the species index of the victim when it died.
pub fn monster_take_hit(
    world: &mut World,
    display: &mut dyn DisplayPort,
    id: MonsterId,
    damage: i32,
) -> Option<usize> {
    let m = world.level.monster_mut(id)?;
    m.hp -= damage;
    m.wake();
    if !m.is_dead() {
        return None;
    }
    let (species_index, visible) = (m.species, m.visible);
    let species = world.species.get(species_index);

    if species.is_win_monster() {
        world.flags.total_winner = true;
        display.message("*** CONGRATULATIONS *** You have won the game.");
        display.message("You cannot save this game, but you may retire when ready.");
        info!(target: "mo_core.combat", "win creature slain");
    }
    if (visible && world.player.status.blind < 1) || species.is_win_monster() {
        let recall = world.recall.get_mut(species_index);
        recall.kills = recall.kills.saturating_add(1);
    }
    let exp = species.exp * species.level / world.player.level.max(1);
    for _ in 0..world.player.gain_experience(exp) {
        display.message(&format!("Welcome to level {}.", world.player.level));
    }
    world.note_kill(species_index);
    world.level.remove_monster(id);
    debug!(target: "mo_core.combat", victim = species.name, exp, "monster killed");
    Some(species_index)
}

/// One round of player melee against the monster `target`
///
/// Returns whether the target died.
pub fn player_attack(world: &mut World, display: &mut dyn DisplayPort, target: MonsterId) -> bool {
    let Some(m) = world.level.monster_mut(target) else {
        return false;
    };
    m.wake();
    let species = world.species.get(m.species);
    let name = if m.visible {
        species.the_name()
    } else {
        "it".to_string()
    };

    if world.player.status.afraid > 0 {
        display.message("You are too afraid to attack!");
        return false;
    }
    let hit = test_hit(
        &mut world.rng,
        world.player.total_to_hit(),
        world.player.level,
        species.ac,
    );
    if !hit {
        display.message(&format!("You miss {name}."));
        return false;
    }
    display.message(&format!("You hit {name}."));
    let (dice, sides) = world.player.weapon_dice;
    let damage = (world.rng.damroll(dice, sides) + world.player.to_dam).max(0);

    if world.player.status.confuse_monster {
        world.player.status.confuse_monster = false;
        display.message("Your hands stop glowing.");
        let resists = species.defense.contains(DefenseFlags::NO_SLEEP)
            || world.rng.randint(MAX_MONS_LEVEL) < species.level;
        if resists {
            display.message(&format!("{} is unaffected.", capitalize(&name)));
        } else {
            display.message(&format!("{} appears confused.", capitalize(&name)));
            let turns = 2 + world.rng.randint(16);
            if let Some(m) = world.level.monster_mut(target) {
                m.confused = if m.confused > 0 { m.confused + 3 } else { turns };
            }
        }
    }

    if monster_take_hit(world, display, target, damage).is_some() {
        display.message(&format!("You have slain {name}."));
        true
    } else {
        false
    }
}
