//! The species table
//!
//! Ordinary species come first, sorted by level; uniques follow and are only
//! placed deliberately. Index lookups go through [`SpeciesTable`].

use crate::combat::{Attack, AttackEffect as E, AttackMethod as M};
use crate::consts::MAX_MONS_LEVEL;
use crate::rng::GameRng;

use super::species::{DefenseFlags as D, Family, MoveFlags as F, SpellFlags as S, Species};

const fn a(method: M, effect: E, dice: i32, sides: i32) -> Attack {
    Attack::new(method, effect, dice, sides)
}

const WANDER: F = F::MOVE_NORMAL.union(F::RANDOM_20);
const WALKER: F = F::MOVE_NORMAL.union(F::OPEN_DOOR).union(F::PICKS_UP);
const BREEDER: F = F::MULTIPLY.union(F::RANDOM_75);

/// Index of the ghost unique
pub const GHOST_UNIQUE: usize = SPECIES.len() - 2;
/// Index of the creature whose death wins the game
pub const WIN_UNIQUE: usize = SPECIES.len() - 1;

pub const SPECIES: &[Species] = &[
    // Town
    Species::new("filthy street urchin", 'p', 0, 0, 10, 4, 40, 1, (1, 4))
        .moves(WALKER.union(F::RANDOM_20))
        .attacks(&[a(M::Beg, E::Hurt, 0, 0), a(M::Touch, E::StealGold, 0, 0)]),
    Species::new("scrawny cat", 'f', 0, 0, 10, 10, 10, 1, (1, 2))
        .moves(WANDER)
        .defense(D::ANIMAL)
        .attacks(&[a(M::Claw, E::Hurt, 1, 1)]),
    Species::new("scruffy little dog", 'C', 0, 0, 10, 5, 5, 1, (1, 3))
        .moves(WANDER)
        .defense(D::ANIMAL)
        .attacks(&[a(M::Bite, E::Hurt, 1, 1)]),
    Species::new("blubbering idiot", 'p', 0, 0, 10, 6, 0, 1, (1, 2))
        .moves(WANDER.union(F::PICKS_UP))
        .attacks(&[a(M::Drool, E::Hurt, 0, 0)]),
    Species::new("pitiful looking wretch", 'p', 0, 0, 10, 10, 0, 1, (1, 4))
        .moves(WANDER)
        .attacks(&[a(M::Beg, E::Hurt, 0, 0)]),
    Species::new("aimless looking merchant", 'p', 0, 0, 10, 10, 255, 1, (3, 3))
        .moves(WALKER.union(F::RANDOM_20))
        .attacks(&[a(M::Hit, E::Hurt, 1, 3)]),
    Species::new("singing, happy drunk", 'p', 0, 0, 10, 10, 0, 1, (2, 3))
        .moves(WALKER.union(F::RANDOM_40))
        .attacks(&[a(M::Beg, E::Hurt, 0, 0), a(M::Insult, E::Hurt, 0, 0)]),
    // Level 1
    Species::new("grey mold", 'm', 1, 3, 10, 2, 0, 1, (28, 8))
        .moves(F::ATTACK_ONLY)
        .defense(D::NO_SLEEP.union(D::IM_POISON))
        .family(Family::Jelly)
        .attacks(&[a(M::Hit, E::Hurt, 1, 4), a(M::Hit, E::Hurt, 1, 4)]),
    Species::new("grey mushroom patch", ',', 1, 1, 10, 2, 0, 1, (1, 2))
        .moves(F::ATTACK_ONLY)
        .defense(D::NO_SLEEP.union(D::IM_POISON))
        .family(Family::Jelly)
        .attacks(&[
            a(M::Spores, E::Confuse, 1, 4),
            a(M::Spores, E::Confuse, 1, 4),
            a(M::Spores, E::Confuse, 1, 4),
        ]),
    Species::new("white worm mass", 'w', 1, 1, 5, 7, 10, 1, (5, 8))
        .moves(BREEDER)
        .defense(D::ANIMAL.union(D::HURT_LIGHT).union(D::IM_POISON))
        .attacks(&[a(M::Bite, E::Poison, 1, 2)]),
    Species::new("floating eye", 'e', 1, 1, 10, 2, 10, 6, (11, 8))
        .moves(F::ATTACK_ONLY)
        .defense(D::ANIMAL.union(D::HURT_LIGHT))
        .attacks(&[a(M::Gaze, E::Paralyze, 0, 0)]),
    Species::new("rock lizard", 'R', 1, 1, 10, 20, 15, 4, (3, 4))
        .moves(WANDER)
        .defense(D::ANIMAL)
        .attacks(&[a(M::Bite, E::Hurt, 1, 1)]),
    Species::new("jackal", 'C', 1, 1, 10, 10, 10, 3, (3, 4))
        .moves(WANDER)
        .defense(D::ANIMAL)
        .attacks(&[a(M::Bite, E::Hurt, 1, 3)]),
    Species::new("soldier ant", 'a', 1, 3, 10, 10, 10, 3, (2, 5))
        .moves(WANDER)
        .defense(D::ANIMAL)
        .attacks(&[a(M::Bite, E::Hurt, 1, 2)]),
    Species::new("fruit fly", 'I', 1, 1, 20, 12, 10, 14, (2, 2))
        .moves(F::MULTIPLY.union(WANDER))
        .defense(D::ANIMAL)
        .attacks(&[a(M::Bite, E::Hurt, 1, 2)]),
    // Level 2
    Species::new("giant yellow centipede", 'c', 2, 2, 10, 8, 30, 12, (3, 4))
        .moves(WANDER)
        .defense(D::ANIMAL)
        .attacks(&[a(M::Bite, E::Hurt, 1, 3), a(M::Sting, E::Hurt, 1, 3)]),
    Species::new("kobold", 'k', 2, 5, 10, 20, 10, 16, (3, 7))
        .moves(WALKER)
        .defense(D::EVIL)
        .family(Family::Orc)
        .attacks(&[a(M::Hit, E::Hurt, 1, 8)]),
    Species::new("novice warrior", 'p', 2, 6, 10, 20, 5, 16, (9, 8))
        .moves(WALKER)
        .attacks(&[a(M::Hit, E::Hurt, 1, 7), a(M::Hit, E::Hurt, 1, 5)]),
    Species::new("novice rogue", 'p', 2, 6, 10, 20, 5, 12, (8, 8))
        .moves(WALKER)
        .defense(D::EVIL)
        .attacks(&[a(M::Hit, E::Hurt, 1, 6), a(M::Touch, E::StealGold, 0, 0)]),
    Species::new("novice priest", 'p', 2, 7, 10, 20, 10, 10, (7, 4))
        .moves(WALKER)
        .spells(S::CAUSE_LIGHT.union(S::SCARE).union(S::CONFUSE), 12)
        .attacks(&[a(M::Hit, E::Hurt, 1, 5)]),
    Species::new("novice mage", 'p', 2, 6, 10, 20, 5, 6, (6, 4))
        .moves(WALKER)
        .spells(S::BLINK.union(S::BLIND).union(S::CONFUSE), 12)
        .attacks(&[a(M::Hit, E::Hurt, 1, 4)]),
    Species::new("yellow mushroom patch", ',', 2, 2, 10, 2, 0, 1, (1, 1))
        .moves(F::ATTACK_ONLY)
        .defense(D::NO_SLEEP.union(D::IM_POISON))
        .family(Family::Jelly)
        .attacks(&[a(M::Spores, E::Terrify, 1, 6)]),
    Species::new("cave spider", 'S', 2, 1, 20, 8, 80, 16, (1, 4))
        .moves(F::MOVE_NORMAL)
        .defense(D::ANIMAL)
        .attacks(&[a(M::Bite, E::Hurt, 1, 4)]),
    Species::new("green worm mass", 'w', 2, 3, 5, 7, 10, 3, (6, 4))
        .moves(BREEDER)
        .defense(D::ANIMAL.union(D::HURT_LIGHT).union(D::IM_ACID))
        .attacks(&[a(M::Bite, E::Acid, 1, 3)]),
    Species::new("shrieker mushroom patch", ',', 2, 1, 10, 2, 0, 1, (1, 1))
        .moves(F::ATTACK_ONLY)
        .defense(D::NO_SLEEP)
        .family(Family::Jelly)
        .attacks(&[a(M::Spores, E::Aggravate, 0, 0)]),
    // Level 3
    Species::new("white jelly", 'J', 3, 10, 10, 2, 99, 1, (8, 8))
        .moves(F::ATTACK_ONLY)
        .defense(D::NO_SLEEP.union(D::HURT_LIGHT).union(D::IM_POISON))
        .family(Family::Jelly)
        .attacks(&[a(M::Touch, E::Poison, 1, 6)]),
    Species::new("poltergeist", 'G', 3, 8, 30, 8, 10, 15, (2, 5))
        .moves(
            F::MOVE_NORMAL
                .union(F::RANDOM_75)
                .union(F::PHASE)
                .union(F::INVISIBLE),
        )
        .spells(S::BLINK, 15)
        .defense(D::UNDEAD.union(D::EVIL).union(D::NO_SLEEP).union(D::IM_POISON))
        .family(Family::Undead)
        .attacks(&[a(M::Touch, E::Terrify, 0, 0)]),
    Species::new("snaga", 'o', 3, 10, 10, 20, 30, 32, (8, 8))
        .moves(WALKER)
        .defense(D::EVIL.union(D::HURT_LIGHT))
        .family(Family::Orc)
        .attacks(&[a(M::Hit, E::Hurt, 1, 8)]),
    Species::new("metallic green centipede", 'c', 3, 3, 20, 5, 10, 4, (4, 4))
        .moves(F::MOVE_NORMAL.union(F::RANDOM_40))
        .defense(D::ANIMAL)
        .attacks(&[a(M::Crawl, E::Hurt, 1, 1)]),
    Species::new("giant white louse", 'l', 3, 1, 20, 6, 10, 5, (1, 1))
        .moves(BREEDER.union(F::MOVE_NORMAL))
        .defense(D::ANIMAL)
        .attacks(&[a(M::Bite, E::Hurt, 1, 1)]),
    Species::new("hobbit", 'h', 3, 5, 10, 10, 10, 8, (3, 5))
        .moves(WALKER)
        .defense(D::EVIL)
        .attacks(&[a(M::Touch, E::StealItem, 0, 0)]),
    // Level 4
    Species::new("yellow jelly", 'J', 4, 12, 10, 2, 99, 1, (10, 8))
        .moves(F::ATTACK_ONLY)
        .spells(S::DRAIN_MANA, 15)
        .defense(D::NO_SLEEP.union(D::HURT_LIGHT).union(D::IM_POISON))
        .family(Family::Jelly)
        .attacks(&[a(M::Touch, E::Poison, 1, 6)]),
    Species::new("pack rat", 'r', 4, 3, 10, 12, 20, 10, (3, 6))
        .moves(WANDER.union(F::PICKS_UP))
        .defense(D::ANIMAL)
        .attacks(&[a(M::Bite, E::EatFood, 1, 3)]),
    // Level 5
    Species::new("cave orc", 'o', 5, 30, 10, 20, 30, 36, (11, 10))
        .moves(WALKER)
        .defense(D::EVIL.union(D::HURT_LIGHT))
        .family(Family::Orc)
        .attacks(&[a(M::Hit, E::Hurt, 1, 8)]),
    Species::new("rotting corpse", 'z', 5, 15, 5, 20, 0, 20, (6, 8))
        .moves(F::MOVE_NORMAL.union(F::BASH_DOOR))
        .defense(
            D::UNDEAD
                .union(D::EVIL)
                .union(D::NO_SLEEP)
                .union(D::NO_INFRA)
                .union(D::IM_POISON),
        )
        .family(Family::Undead)
        .attacks(&[a(M::Hit, E::Hurt, 1, 6), a(M::Bite, E::Poison, 1, 4)]),
    Species::new("green naga", 'n', 5, 30, 10, 18, 120, 40, (6, 8))
        .moves(F::MOVE_NORMAL.union(F::RANDOM_20).union(F::PICKS_UP))
        .defense(D::EVIL.union(D::IM_ACID))
        .attacks(&[a(M::Crush, E::Hurt, 1, 6), a(M::Spit, E::Acid, 2, 6)]),
    // Level 6
    Species::new("black orc", 'o', 6, 30, 10, 20, 20, 36, (12, 10))
        .moves(WALKER)
        .defense(D::EVIL.union(D::HURT_LIGHT))
        .family(Family::Orc)
        .attacks(&[a(M::Hit, E::Hurt, 1, 10), a(M::Hit, E::Hurt, 1, 6)]),
    Species::new("gelatinous cube", 'j', 6, 36, 10, 12, 1, 18, (30, 10))
        .moves(
            F::MOVE_NORMAL
                .union(F::EATS_OTHER)
                .union(F::PICKS_UP)
                .union(F::BASH_DOOR),
        )
        .defense(D::NO_SLEEP.union(D::IM_ACID).union(D::IM_POISON).union(D::MAX_HP))
        .family(Family::Jelly)
        .attacks(&[
            a(M::Touch, E::Acid, 1, 10),
            a(M::Touch, E::Acid, 1, 10),
            a(M::Touch, E::Acid, 1, 10),
        ]),
    Species::new("blue jelly", 'J', 6, 14, 10, 2, 99, 1, (12, 8))
        .moves(F::ATTACK_ONLY)
        .defense(D::NO_SLEEP.union(D::HURT_LIGHT).union(D::IM_COLD))
        .family(Family::Jelly)
        .attacks(&[a(M::Touch, E::Cold, 1, 6)]),
    Species::new("giant red frog", 'R', 6, 16, 10, 12, 50, 16, (9, 8))
        .moves(WANDER)
        .defense(D::ANIMAL)
        .attacks(&[a(M::Bite, E::LoseStr, 2, 8)]),
    // Level 7
    Species::new("dark elf", 'h', 7, 25, 10, 20, 20, 16, (7, 10))
        .moves(WALKER)
        .spells(S::CONFUSE.union(S::BLIND), 10)
        .defense(D::EVIL.union(D::HURT_LIGHT))
        .attacks(&[a(M::Hit, E::Hurt, 1, 6), a(M::Touch, E::EatLight, 0, 0)]),
    Species::new("moaning spirit", 'G', 7, 44, 20, 14, 10, 20, (7, 8))
        .moves(
            F::MOVE_NORMAL
                .union(F::RANDOM_20)
                .union(F::PHASE)
                .union(F::INVISIBLE),
        )
        .spells(S::SCARE.union(S::TELEPORT), 15)
        .defense(D::UNDEAD.union(D::EVIL).union(D::NO_SLEEP).union(D::IM_COLD))
        .family(Family::Undead)
        .attacks(&[a(M::Wail, E::Terrify, 0, 0), a(M::Touch, E::LoseWis, 1, 8)]),
    // Level 8
    Species::new("hill orc", 'o', 8, 25, 10, 20, 20, 40, (12, 10))
        .moves(WALKER)
        .defense(D::EVIL)
        .family(Family::Orc)
        .attacks(&[a(M::Hit, E::Hurt, 1, 10)]),
    Species::new("bandit", 'p', 8, 26, 10, 20, 10, 24, (8, 8))
        .moves(WALKER)
        .defense(D::EVIL)
        .attacks(&[a(M::Hit, E::Hurt, 2, 4), a(M::Touch, E::StealItem, 0, 0)]),
    Species::new("grey ooze", 'j', 8, 10, 10, 15, 1, 1, (6, 8))
        .moves(F::MOVE_NORMAL.union(F::RANDOM_40))
        .defense(D::NO_SLEEP.union(D::IM_ACID))
        .family(Family::Jelly)
        .attacks(&[a(M::Touch, E::Corrode, 1, 8)]),
    // Level 9
    Species::new("baby blue dragon", 'd', 9, 88, 10, 20, 70, 30, (10, 10))
        .moves(F::MOVE_NORMAL.union(F::BASH_DOOR))
        .spells(S::BREATHE_LIGHTNING, 12)
        .defense(D::EVIL.union(D::DRAGON).union(D::IM_ELEC).union(D::MAX_HP))
        .family(Family::Dragon)
        .attacks(&[
            a(M::Claw, E::Hurt, 1, 3),
            a(M::Claw, E::Hurt, 1, 3),
            a(M::Bite, E::Hurt, 1, 5),
        ]),
    Species::new("baby white dragon", 'd', 9, 88, 10, 20, 70, 30, (10, 10))
        .moves(F::MOVE_NORMAL.union(F::BASH_DOOR))
        .spells(S::BREATHE_FROST, 12)
        .defense(D::EVIL.union(D::DRAGON).union(D::IM_COLD).union(D::MAX_HP))
        .family(Family::Dragon)
        .attacks(&[
            a(M::Claw, E::Hurt, 1, 3),
            a(M::Claw, E::Hurt, 1, 3),
            a(M::Bite, E::Hurt, 1, 5),
        ]),
    Species::new("crebain", 'B', 9, 20, 20, 20, 10, 12, (3, 5))
        .moves(F::MOVE_NORMAL.union(F::RANDOM_40))
        .defense(D::ANIMAL.union(D::EVIL))
        .attacks(&[a(M::Bite, E::Blind, 1, 4)]),
    // Level 10
    Species::new("disenchanter eye", 'e', 10, 30, 10, 2, 10, 10, (7, 8))
        .moves(F::ATTACK_ONLY)
        .defense(D::ANIMAL.union(D::HURT_LIGHT))
        .attacks(&[a(M::Gaze, E::Disenchant, 0, 0)]),
    Species::new("dark elven mage", 'h', 10, 50, 10, 20, 20, 16, (7, 10))
        .moves(WALKER)
        .spells(
            S::BLINK.union(S::BLIND).union(S::CONFUSE).union(S::SLOW),
            5,
        )
        .defense(D::EVIL.union(D::HURT_LIGHT))
        .attacks(&[a(M::Hit, E::Hurt, 1, 6)]),
    // Level 11
    Species::new("zombified orc", 'z', 11, 30, 10, 20, 0, 24, (11, 8))
        .moves(F::MOVE_NORMAL.union(F::BASH_DOOR))
        .defense(
            D::UNDEAD
                .union(D::EVIL)
                .union(D::NO_SLEEP)
                .union(D::NO_INFRA)
                .union(D::IM_POISON),
        )
        .family(Family::Undead)
        .attacks(&[
            a(M::Hit, E::Hurt, 1, 4),
            a(M::Hit, E::Hurt, 1, 4),
            a(M::Hit, E::Hurt, 1, 4),
        ]),
    // Level 12
    Species::new("forest troll", 'T', 12, 70, 10, 20, 40, 50, (20, 10))
        .moves(WALKER.union(F::BASH_DOOR))
        .defense(D::EVIL.union(D::HURT_LIGHT))
        .family(Family::Troll)
        .attacks(&[
            a(M::Hit, E::Hurt, 1, 4),
            a(M::Hit, E::Hurt, 1, 4),
            a(M::Bite, E::Hurt, 1, 6),
        ]),
    Species::new("homunculus", 'u', 12, 40, 10, 20, 40, 32, (8, 8))
        .moves(F::MOVE_NORMAL.union(F::OPEN_DOOR))
        .defense(D::DEMON.union(D::EVIL).union(D::IM_FIRE))
        .family(Family::Demon)
        .attacks(&[a(M::Hit, E::Paralyze, 1, 2), a(M::Hit, E::Hurt, 1, 10)]),
    // Level 13
    Species::new("xorn", 'X', 13, 78, 10, 20, 10, 80, (16, 10))
        .moves(F::MOVE_NORMAL.union(F::PHASE))
        .defense(
            D::NO_INFRA
                .union(D::IM_FIRE)
                .union(D::IM_COLD)
                .union(D::IM_ELEC)
                .union(D::IM_POISON),
        )
        .attacks(&[
            a(M::Bite, E::Hurt, 1, 6),
            a(M::Bite, E::Hurt, 1, 6),
            a(M::Bite, E::Hurt, 1, 6),
            a(M::Bite, E::Hurt, 1, 6),
        ]),
    // Level 14
    Species::new("umber hulk", 'X', 14, 75, 10, 20, 10, 50, (20, 10))
        .moves(F::MOVE_NORMAL.union(F::BREAK_WALL).union(F::BASH_DOOR))
        .defense(D::EVIL.union(D::ANIMAL).union(D::NO_INFRA))
        .attacks(&[
            a(M::Gaze, E::Confuse, 0, 0),
            a(M::Hit, E::Hurt, 1, 6),
            a(M::Hit, E::Hurt, 1, 6),
            a(M::Bite, E::Hurt, 2, 6),
        ]),
    Species::new("stone troll", 'T', 14, 85, 10, 20, 40, 40, (23, 10))
        .moves(WALKER.union(F::BASH_DOOR))
        .defense(D::EVIL.union(D::HURT_LIGHT).union(D::MAX_HP))
        .family(Family::Troll)
        .attacks(&[
            a(M::Hit, E::Hurt, 1, 6),
            a(M::Hit, E::Hurt, 1, 6),
            a(M::Bite, E::Hurt, 3, 4),
        ]),
    // Level 16
    Species::new("uruk", 'o', 16, 68, 10, 20, 20, 50, (8, 10))
        .moves(WALKER)
        .defense(D::EVIL.union(D::MAX_HP))
        .family(Family::Orc)
        .attacks(&[a(M::Hit, E::Hurt, 1, 12), a(M::Hit, E::Hurt, 1, 12)]),
    Species::new("ghoul", 'z', 16, 95, 10, 30, 20, 30, (15, 9))
        .moves(WALKER)
        .spells(S::SCARE.union(S::HOLD_PERSON), 9)
        .defense(D::UNDEAD.union(D::EVIL).union(D::NO_SLEEP).union(D::IM_POISON))
        .family(Family::Undead)
        .attacks(&[
            a(M::Claw, E::Paralyze, 1, 5),
            a(M::Claw, E::Paralyze, 1, 5),
            a(M::Bite, E::LoseCon, 1, 6),
        ]),
    Species::new("quasit", 'u', 16, 50, 20, 20, 20, 30, (6, 8))
        .moves(
            F::MOVE_NORMAL
                .union(F::RANDOM_20)
                .union(F::OPEN_DOOR)
                .union(F::INVISIBLE),
        )
        .spells(
            S::BLINK
                .union(S::TELEPORT)
                .union(S::TELEPORT_TO)
                .union(S::BLIND)
                .union(S::CONFUSE)
                .union(S::SCARE),
            10,
        )
        .defense(D::DEMON.union(D::EVIL).union(D::IM_FIRE))
        .family(Family::Demon)
        .attacks(&[
            a(M::Bite, E::LoseDex, 1, 6),
            a(M::Claw, E::Hurt, 1, 3),
            a(M::Claw, E::Hurt, 1, 3),
        ]),
    Species::new("disenchanter mold", 'm', 16, 40, 10, 2, 0, 20, (16, 8))
        .moves(F::ATTACK_ONLY)
        .defense(D::NO_SLEEP.union(D::IM_POISON))
        .family(Family::Jelly)
        .attacks(&[a(M::Touch, E::EatCharges, 1, 6)]),
    // Level 17
    Species::new("imp", 'u', 17, 55, 20, 20, 20, 30, (6, 8))
        .moves(F::MOVE_NORMAL.union(F::INVISIBLE).union(F::OPEN_DOOR))
        .spells(S::BLINK.union(S::TELEPORT).union(S::SCARE), 10)
        .defense(D::DEMON.union(D::EVIL).union(D::IM_FIRE))
        .family(Family::Demon)
        .attacks(&[a(M::Hit, E::Poison, 3, 4), a(M::Hit, E::Poison, 3, 4)]),
    // Level 18
    Species::new("dark elven priest", 'h', 18, 50, 10, 20, 30, 30, (7, 10))
        .moves(WALKER)
        .spells(
            S::SUMMON_MONSTER
                .union(S::CAUSE_SERIOUS)
                .union(S::BLIND)
                .union(S::CONFUSE)
                .union(S::SCARE),
            5,
        )
        .defense(D::EVIL.union(D::HURT_LIGHT))
        .attacks(&[a(M::Hit, E::Hurt, 1, 10), a(M::Hit, E::Hurt, 1, 9)]),
    Species::new("energy hound", 'Z', 18, 45, 10, 30, 0, 30, (25, 10))
        .moves(F::MOVE_NORMAL.union(F::RANDOM_20))
        .spells(S::BREATHE_LIGHTNING, 10)
        .defense(D::ANIMAL.union(D::IM_ELEC))
        .attacks(&[
            a(M::Bite, E::Lightning, 1, 8),
            a(M::Bite, E::Lightning, 1, 8),
            a(M::Claw, E::Hurt, 1, 3),
        ]),
    // Level 21
    Species::new("fire vortex", 'v', 21, 100, 20, 100, 0, 30, (9, 9))
        .moves(F::MOVE_NORMAL.union(F::RANDOM_75))
        .spells(S::BREATHE_FIRE, 6)
        .defense(D::NO_SLEEP.union(D::IM_FIRE).union(D::IM_POISON).union(D::NO_INFRA))
        .attacks(&[a(M::Embrace, E::Fire, 3, 8)]),
    // Level 24
    Species::new("olog", 'T', 24, 400, 10, 20, 50, 50, (42, 10))
        .moves(WALKER.union(F::BASH_DOOR))
        .defense(D::EVIL.union(D::MAX_HP))
        .family(Family::Troll)
        .attacks(&[
            a(M::Hit, E::Hurt, 1, 12),
            a(M::Hit, E::Hurt, 1, 12),
            a(M::Bite, E::Hurt, 2, 6),
            a(M::Bite, E::Hurt, 2, 6),
        ]),
    // Level 27
    Species::new("vampire", 'V', 27, 175, 10, 20, 10, 45, (25, 12))
        .moves(WALKER)
        .spells(
            S::TELEPORT_TO
                .union(S::HOLD_PERSON)
                .union(S::SCARE)
                .union(S::CAUSE_SERIOUS),
            9,
        )
        .defense(
            D::UNDEAD
                .union(D::EVIL)
                .union(D::NO_SLEEP)
                .union(D::HURT_LIGHT)
                .union(D::IM_POISON),
        )
        .family(Family::Undead)
        .attacks(&[
            a(M::Hit, E::Hurt, 1, 6),
            a(M::Hit, E::Hurt, 1, 6),
            a(M::Bite, E::LoseExp, 2, 6),
        ]),
    // Level 29
    Species::new("young blue dragon", 'd', 29, 300, 10, 20, 70, 50, (27, 10))
        .moves(F::MOVE_NORMAL.union(F::BASH_DOOR).union(F::PICKS_UP))
        .spells(S::BREATHE_LIGHTNING.union(S::SCARE), 11)
        .defense(D::EVIL.union(D::DRAGON).union(D::IM_ELEC).union(D::MAX_HP))
        .family(Family::Dragon)
        .attacks(&[
            a(M::Claw, E::Hurt, 1, 8),
            a(M::Claw, E::Hurt, 1, 8),
            a(M::Bite, E::Hurt, 2, 8),
        ]),
    Species::new("young green dragon", 'd', 29, 290, 10, 20, 70, 60, (27, 10))
        .moves(F::MOVE_NORMAL.union(F::BASH_DOOR).union(F::PICKS_UP))
        .spells(S::BREATHE_GAS.union(S::SCARE), 11)
        .defense(D::EVIL.union(D::DRAGON).union(D::IM_POISON).union(D::MAX_HP))
        .family(Family::Dragon)
        .attacks(&[
            a(M::Claw, E::Hurt, 1, 8),
            a(M::Claw, E::Hurt, 1, 8),
            a(M::Bite, E::Hurt, 2, 8),
        ]),
    // Level 30
    Species::new("grave wight", 'W', 30, 325, 10, 20, 10, 50, (12, 10))
        .moves(WALKER)
        .spells(S::CAUSE_SERIOUS.union(S::SCARE), 8)
        .defense(
            D::UNDEAD
                .union(D::EVIL)
                .union(D::NO_SLEEP)
                .union(D::HURT_LIGHT)
                .union(D::IM_COLD),
        )
        .family(Family::Undead)
        .attacks(&[
            a(M::Hit, E::Hurt, 1, 7),
            a(M::Hit, E::Hurt, 1, 7),
            a(M::Touch, E::LoseExp, 0, 0),
        ]),
    // Level 34
    Species::new("lich", 'L', 34, 750, 10, 20, 60, 50, (25, 12))
        .moves(WALKER)
        .spells(
            S::BLINK
                .union(S::TELEPORT_TO)
                .union(S::HOLD_PERSON)
                .union(S::SLOW)
                .union(S::DRAIN_MANA)
                .union(S::CAUSE_SERIOUS)
                .union(S::SUMMON_UNDEAD),
            4,
        )
        .defense(
            D::UNDEAD
                .union(D::EVIL)
                .union(D::NO_SLEEP)
                .union(D::IM_COLD)
                .union(D::IM_POISON)
                .union(D::MAX_HP),
        )
        .family(Family::Undead)
        .attacks(&[
            a(M::Touch, E::LoseExp, 0, 0),
            a(M::Touch, E::LoseInt, 1, 8),
            a(M::Touch, E::LoseAll, 1, 8),
        ]),
    // Level 37
    Species::new("mature red dragon", 'd', 37, 1500, 10, 20, 30, 80, (60, 10))
        .moves(F::MOVE_NORMAL.union(F::BASH_DOOR).union(F::PICKS_UP))
        .spells(S::BREATHE_FIRE.union(S::SCARE).union(S::CONFUSE), 8)
        .defense(D::EVIL.union(D::DRAGON).union(D::IM_FIRE).union(D::MAX_HP))
        .family(Family::Dragon)
        .attacks(&[
            a(M::Claw, E::Hurt, 1, 10),
            a(M::Claw, E::Hurt, 1, 10),
            a(M::Bite, E::Hurt, 2, 12),
        ]),
    // Uniques
    Species::new("Forlorn Spectre", 'G', 25, 350, 20, 30, 10, 40, (30, 10))
        .moves(
            F::MOVE_NORMAL
                .union(F::RANDOM_20)
                .union(F::PHASE)
                .union(F::INVISIBLE),
        )
        .spells(
            S::BLINK
                .union(S::HOLD_PERSON)
                .union(S::SCARE)
                .union(S::CAUSE_SERIOUS),
            8,
        )
        .defense(
            D::UNIQUE
                .union(D::UNDEAD)
                .union(D::EVIL)
                .union(D::NO_SLEEP)
                .union(D::IM_COLD)
                .union(D::IM_POISON)
                .union(D::MAX_HP),
        )
        .family(Family::Undead)
        .attacks(&[
            a(M::Wail, E::Terrify, 0, 0),
            a(M::Touch, E::LoseWis, 1, 8),
            a(M::Touch, E::LoseInt, 1, 8),
        ]),
    Species::new("Balrog", 'B', 40, 55000, 20, 20, 80, 125, (75, 40))
        .moves(
            F::MOVE_NORMAL
                .union(F::OPEN_DOOR)
                .union(F::BASH_DOOR)
                .union(F::BREAK_WALL)
                .union(F::SHATTER)
                .union(F::WIN),
        )
        .spells(
            S::BREATHE_FIRE
                .union(S::SLOW)
                .union(S::TELEPORT_TO)
                .union(S::SUMMON_UNDEAD),
            4,
        )
        .defense(
            D::UNIQUE
                .union(D::EVIL)
                .union(D::DEMON)
                .union(D::NO_SLEEP)
                .union(D::IM_FIRE)
                .union(D::MAX_HP),
        )
        .family(Family::Demon)
        .attacks(&[
            a(M::Hit, E::Hurt, 8, 12),
            a(M::Hit, E::Fire, 6, 12),
            a(M::Hit, E::Fire, 6, 12),
            a(M::Touch, E::LoseExp, 3, 12),
        ]),
];

/// Species table with a cumulative level index
#[derive(Debug, Clone)]
pub struct SpeciesTable {
    species: &'static [Species],
    /// `level_index[l]` = number of ordinary species with level <= l
    level_index: Vec<usize>,
}

impl Default for SpeciesTable {
    fn default() -> Self {
        Self::new(SPECIES)
    }
}

impl SpeciesTable {
    /// Build the index; ordinary species must be sorted by level and precede uniques
    pub fn new(species: &'static [Species]) -> Self {
        let ordinary = species.iter().take_while(|s| !s.is_unique()).count();
        assert!(
            species[..ordinary]
                .windows(2)
                .all(|w| w[0].level <= w[1].level),
            "species table must be sorted by level"
        );
        assert!(
            species[ordinary..].iter().all(Species::is_unique),
            "uniques must follow every ordinary species"
        );
        let level_index = (0..=MAX_MONS_LEVEL)
            .map(|l| species[..ordinary].iter().filter(|s| s.level <= l).count())
            .collect::<Vec<_>>();
        assert!(level_index[0] > 0, "the table needs town species");
        Self {
            species,
            level_index,
        }
    }

    pub fn get(&self, index: usize) -> &'static Species {
        &self.species[index]
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &'static Species)> {
        self.species.iter().enumerate()
    }

    /// Number of ordinary (non-unique) species
    pub fn ordinary(&self) -> usize {
        self.level_index[MAX_MONS_LEVEL as usize]
    }

    /// Pick an ordinary species appropriate for `level`
    ///
    /// Level 0 draws only town dwellers. Deeper, one draw in `nasty_chance` is
    /// pulled from a few levels further down; otherwise the better of two
    /// uniform draws picks the level band, then a species within it.
    pub fn get_mons_num(&self, rng: &mut GameRng, level: i32, nasty_chance: i32) -> usize {
        if level <= 0 {
            return (rng.randint(self.level_index[0] as i32) - 1) as usize;
        }
        let mut level = level.min(MAX_MONS_LEVEL);
        if rng.randint(nasty_chance) == 1 {
            level = (level + rng.randnor(0, 4).abs() + 1).min(MAX_MONS_LEVEL);
        } else {
            let town = self.level_index[0];
            let num = (self.level_index[level as usize] - town) as i32;
            let i = rng.randint(num) - 1;
            let j = rng.randint(num) - 1;
            level = self.species[town + i.max(j).max(0) as usize].level;
        }
        // skip to a level that actually has species
        let mut lo = self.level_index[(level - 1).max(0) as usize];
        let mut hi = self.level_index[level as usize];
        while lo == hi && level > 1 {
            level -= 1;
            lo = self.level_index[(level - 1) as usize];
            hi = self.level_index[level as usize];
        }
        lo + (rng.randint((hi - lo) as i32) - 1).max(0) as usize
    }

    /// Indices of ordinary species in `family` no deeper than `max_level`
    pub fn family_members(&self, family: Family, max_level: i32) -> Vec<usize> {
        (0..self.ordinary())
            .filter(|&i| self.species[i].family == family && self.species[i].level <= max_level)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_builds() {
        let table = SpeciesTable::default();
        assert_eq!(table.ordinary(), SPECIES.len() - 2);
        assert!(table.get(GHOST_UNIQUE).is_unique());
        assert!(table.get(WIN_UNIQUE).is_win_monster());
    }

    #[test]
    fn test_attack_counts_bounded() {
        for s in SPECIES.iter() {
            assert!(s.attacks.len() <= crate::consts::MAX_MON_NATTACK, "{}", s.name);
        }
    }

    #[test]
    fn test_town_draws_are_level_zero() {
        let table = SpeciesTable::default();
        let mut rng = GameRng::new(11);
        for _ in 0..200 {
            let i = table.get_mons_num(&mut rng, 0, 50);
            assert_eq!(table.get(i).level, 0);
        }
    }

    #[test]
    fn test_draws_are_ordinary_and_bounded() {
        let table = SpeciesTable::default();
        let mut rng = GameRng::new(12);
        for depth in 1..=45 {
            for _ in 0..50 {
                let i = table.get_mons_num(&mut rng, depth, 50);
                assert!(i < table.ordinary());
                assert!(table.get(i).level >= 1);
            }
        }
    }

    #[test]
    fn test_shallow_draws_without_nasties() {
        let table = SpeciesTable::default();
        let mut rng = GameRng::new(13);
        for _ in 0..500 {
            let i = table.get_mons_num(&mut rng, 5, i32::MAX);
            assert!(table.get(i).level <= 5);
        }
    }

    #[test]
    fn test_family_members() {
        let table = SpeciesTable::default();
        let jellies = table.family_members(Family::Jelly, 20);
        assert!(jellies.len() >= 8);
        assert!(
            jellies
                .iter()
                .all(|&i| table.get(i).family == Family::Jelly)
        );
        assert!(table.family_members(Family::Troll, 5).is_empty());
    }
}
