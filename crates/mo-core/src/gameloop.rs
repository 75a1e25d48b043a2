//! Main game loop
//!
//! One iteration of [`GameLoop::dungeon`] is one game turn: the player's
//! upkeep, one player command, then the creature sweep. [`GameLoop::play`]
//! strings levels together until the game ends.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::combat::player_attack;
use crate::consts::{
    KNOCKED_OUT, LIGHT_WARNING, PLAYER_FOOD_ALERT, PLAYER_FOOD_FAINT, PLAYER_FOOD_WEAK,
    PLAYER_REGEN_FAINT, PLAYER_REGEN_NORMAL, PLAYER_REGEN_WEAK,
};
use crate::dungeon::{Feature, GenerationReport, Occupant, generate_level};
use crate::geometry::Direction;
use crate::item::ItemKind;
use crate::monster::process_monsters;
use crate::player::{Intrinsics, StatusApplied};
use crate::ports::{Command, CommandSource, DisplayPort, Disturb};
use crate::world::World;

/// Distance of the random teleport intrinsic
const RANDOM_TELEPORT_RANGE: i32 = 40;

/// 1 in n chance per turn for each unsensed pack item
const SENSE_CHANCE: i32 = 400;

/// How the game ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameLoopResult {
    /// Player died with the cause of death
    PlayerDied(String),
    PlayerQuit,
    /// Input ran out or the turn limit was reached
    EndOfInput,
}

/// Outcome of one player command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionResult {
    /// The command used up the turn
    Success,
    /// Nothing happened; read another command
    NoTime,
}

/// Turn controller
///
/// Owns the world together with the two ports it talks through.
pub struct GameLoop<D: DisplayPort, C: CommandSource> {
    world: World,
    display: D,
    input: C,
    /// Stop after this many game turns
    turn_limit: Option<u64>,
    /// Levels generated by [`GameLoop::play`]
    levels: Vec<GenerationReport>,
}

impl<D: DisplayPort, C: CommandSource> GameLoop<D, C> {
    pub fn new(world: World, display: D, input: C) -> Self {
        Self {
            world,
            display,
            input,
            turn_limit: None,
            levels: Vec::new(),
        }
    }

    /// End the game cleanly once the turn counter reaches `turns`
    pub fn with_turn_limit(mut self, turns: u64) -> Self {
        self.turn_limit = Some(turns);
        self
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Generation summaries for every level entered so far
    pub fn levels(&self) -> &[GenerationReport] {
        &self.levels
    }

    /// Consume the loop and return the world and display
    pub fn into_parts(self) -> (World, D) {
        (self.world, self.display)
    }

    /// Generate levels and play them until the game ends
    pub fn play(&mut self) -> GameLoopResult {
        loop {
            let report = generate_level(&mut self.world);
            info!(
                target: "mo_core.game",
                depth = report.depth,
                attempts = report.attempts,
                monsters = report.monsters,
                "entered level"
            );
            self.levels.push(report);
            self.dungeon();

            if self.world.player.dead {
                let cause = self
                    .world
                    .player
                    .died_from
                    .clone()
                    .unwrap_or_else(|| "misadventure".to_string());
                info!(target: "mo_core.game", turn = self.world.turn, %cause, "player died");
                return GameLoopResult::PlayerDied(cause);
            }
            if self.world.flags.quit {
                info!(target: "mo_core.game", turn = self.world.turn, "player quit");
                return GameLoopResult::PlayerQuit;
            }
            if self.world.flags.eof {
                info!(target: "mo_core.game", turn = self.world.turn, "input ended");
                return GameLoopResult::EndOfInput;
            }
        }
    }

    /// Play the current level until it is left or the game ends
    pub fn dungeon(&mut self) {
        self.world.flags.new_level = false;
        self.world.refresh_distances();
        process_monsters(&mut self.world, &mut self.display, false);

        loop {
            if self.turn_limit.is_some_and(|limit| self.world.turn >= limit) {
                self.world.flags.eof = true;
                break;
            }
            self.world.turn += 1;

            self.burn_light();
            self.digest();
            self.regenerate();
            self.world.player.tick_status(&mut self.display, self.world.turn);
            for index in self.world.pack.tick_timeouts() {
                trace!(target: "mo_core.player", index, "activation ready");
            }
            self.word_of_recall();
            self.random_teleport();
            self.sense_items();

            if self.world.player.dead {
                break;
            }
            if self.can_act() {
                if self.world.player.is_resting() {
                    self.rest_step();
                } else {
                    self.read_command();
                }
            }

            if self.world.flags.new_level || self.world.is_over() {
                break;
            }
            process_monsters(&mut self.world, &mut self.display, true);
            if self.world.is_over() {
                break;
            }
        }
    }

    fn can_act(&self) -> bool {
        let p = &self.world.player;
        !p.is_paralysed() && p.status.stun <= KNOCKED_OUT && !p.dead
    }

    fn burn_light(&mut self) {
        let player = &mut self.world.player;
        if player.light <= 0 {
            return;
        }
        player.light -= 1;
        if player.light == 0 {
            self.display.message("Your light has gone out!");
            player.disturb(&mut self.display, Disturb::LIGHT);
        } else if player.light < LIGHT_WARNING
            && self.world.rng.randint(5) == 1
            && player.status.blind < 1
        {
            self.display.message("Your light is growing faint.");
            player.disturb(&mut self.display, Disturb::empty());
        }
    }

    /// Hunger messages, fainting, digestion and starvation
    fn digest(&mut self) {
        let player = &mut self.world.player;
        if player.food < PLAYER_FOOD_ALERT {
            if player.food < PLAYER_FOOD_WEAK {
                if !player.status.applied.contains(StatusApplied::WEAK) {
                    player.status.applied.insert(StatusApplied::WEAK);
                    self.display.message("You are getting weak from hunger.");
                    player.disturb(&mut self.display, Disturb::empty());
                }
                if player.food < PLAYER_FOOD_FAINT && self.world.rng.randint(8) == 1 {
                    player.status.paralysis += self.world.rng.randint(5);
                    self.display.message("You faint from the lack of food.");
                    player.disturb(&mut self.display, Disturb::SEARCH);
                }
            } else if !player.status.applied.contains(StatusApplied::HUNGRY) {
                player.status.applied.insert(StatusApplied::HUNGRY);
                self.display.message("You are hungry.");
                player.disturb(&mut self.display, Disturb::empty());
            }
        } else {
            player
                .status
                .applied
                .remove(StatusApplied::HUNGRY | StatusApplied::WEAK);
        }

        // hasted characters burn food faster
        if player.status.speed < 0 {
            player.food -= player.status.speed * player.status.speed;
        }
        player.food -= player.food_digested;
        if player.food < 0 {
            let damage = -player.food / 16;
            player.take_hit(damage, "starvation");
            player.disturb(&mut self.display, Disturb::SEARCH);
        }
    }

    fn regenerate(&mut self) {
        let player = &mut self.world.player;
        let mut rate = match player.food {
            f if f < 0 => 0,
            f if f < PLAYER_FOOD_FAINT => PLAYER_REGEN_FAINT,
            f if f < PLAYER_FOOD_WEAK => PLAYER_REGEN_WEAK,
            _ => PLAYER_REGEN_NORMAL,
        };
        if player.has(Intrinsics::REGENERATE) {
            rate = rate * 3 / 2;
        }
        if player.searching || player.is_resting() {
            rate *= 2;
        }
        if player.status.poisoned < 1 && player.chp < player.mhp {
            player.regen_hp(rate);
        }
        if player.cmana < player.mmana {
            player.regen_mana(rate);
        }
    }

    fn word_of_recall(&mut self) {
        let world = &mut self.world;
        if world.player.status.word_recall <= 0 {
            return;
        }
        if world.player.status.word_recall > 1 {
            world.player.status.word_recall -= 1;
            return;
        }
        world.player.status.word_recall = 0;
        world.player.status.paralysis += 1;
        if world.depth > 0 {
            world.depth = 0;
            world.flags.new_level = true;
            self.display.message("You feel yourself yanked upwards!");
        } else if world.max_depth > 0 {
            world.depth = world.max_depth;
            world.flags.new_level = true;
            self.display.message("You feel yourself yanked downwards!");
        }
        debug!(target: "mo_core.player", depth = world.depth, "word of recall");
    }

    fn random_teleport(&mut self) {
        if self.world.player.has(Intrinsics::TELEPORT) && self.world.rng.randint(100) == 1 {
            self.world.player.disturb(&mut self.display, Disturb::empty());
            self.world.teleport_player(RANDOM_TELEPORT_RANGE);
        }
    }

    /// Pseudo-identification of pack items
    fn sense_items(&mut self) {
        let world = &mut self.world;
        if world.player.status.confused > 0 {
            return;
        }
        let unsensed = world.pack.unsensed_items();
        if unsensed.is_empty() {
            return;
        }
        let mut sensed = Vec::new();
        for &index in &unsensed {
            if world.rng.randint(SENSE_CHANCE) == 1 {
                sensed.push(index);
            }
        }
        if sensed.is_empty()
            && let Some(chance) = world.player.class.innate_sense()
            && world.rng.randint(chance) == 1
            && let Some(&index) = world.rng.choose(&unsensed)
        {
            sensed.push(index);
        }
        for index in sensed {
            let name = world.pack.describe_item(index);
            let feeling = world.pack.sense_item(index);
            self.display
                .message(&format!("You feel that your {name} is {feeling}."));
        }
    }

    /// One turn of a rest command
    fn rest_step(&mut self) {
        let player = &mut self.world.player;
        if player.rest > 0 {
            player.rest -= 1;
        } else if player.chp >= player.mhp && player.cmana >= player.mmana {
            player.rest = 0;
        }
    }

    /// Read commands until one uses up the turn
    fn read_command(&mut self) {
        loop {
            let Some(command) = self.input.next_command() else {
                self.world.flags.eof = true;
                return;
            };
            trace!(target: "mo_core.game", turn = self.world.turn, ?command, "command");
            if self.execute(command) == ActionResult::Success {
                return;
            }
        }
    }

    fn execute(&mut self, command: Command) -> ActionResult {
        match command {
            Command::Move(dir) => self.walk(dir),
            Command::Rest(turns) => {
                if turns == 0 {
                    return ActionResult::NoTime;
                }
                self.world.player.rest = turns;
                self.world.player.searching = false;
                ActionResult::Success
            }
            Command::Search => {
                self.search();
                ActionResult::Success
            }
            Command::Hold => ActionResult::Success,
            Command::GoUp => self.take_stairs(Feature::UpStairs, -1),
            Command::GoDown => self.take_stairs(Feature::DownStairs, 1),
            Command::Quit => {
                self.world.flags.quit = true;
                ActionResult::Success
            }
        }
    }

    fn walk(&mut self, dir: Direction) -> ActionResult {
        let world = &mut self.world;
        let to = world.player.pos.step(dir);
        if dir == Direction::Here || !world.level.in_bounds(to) {
            self.display.message("There is a wall in the way.");
            return ActionResult::NoTime;
        }
        if let Occupant::Monster(target) = world.level.cell(to).occupant {
            player_attack(world, &mut self.display, target);
            return ActionResult::Success;
        }
        match world.level.feature(to) {
            Feature::ClosedDoor => {
                world.level.set_feature(to, Feature::OpenDoor);
                self.display.redraw_cell(to);
                ActionResult::Success
            }
            Feature::Rubble => {
                self.display.message("There is rubble blocking your way.");
                ActionResult::NoTime
            }
            f if f.is_open() => {
                world.move_player(to);
                if world.level.item_at(to).is_some_and(|i| i.kind == ItemKind::Gold)
                    && let Some(gold) = world.level.take_item(to)
                {
                    world.player.gold += gold.value;
                    self.display.message(&format!(
                        "You have found {} gold pieces worth of gold.",
                        gold.value
                    ));
                    self.display.redraw_cell(to);
                }
                ActionResult::Success
            }
            _ => {
                self.display.message("There is a wall in the way.");
                ActionResult::NoTime
            }
        }
    }

    /// Reveal adjacent secret doors
    fn search(&mut self) {
        let world = &mut self.world;
        let skill = world.player.search_skill;
        let around: Vec<_> = world.player.pos.neighbors().collect();
        for c in around {
            if world.level.on_grid(c)
                && world.level.feature(c) == Feature::SecretDoor
                && world.rng.randint(100) <= skill
            {
                world.level.set_feature(c, Feature::ClosedDoor);
                self.display.message("You have found a secret door.");
                self.display.redraw_cell(c);
            }
        }
    }

    fn take_stairs(&mut self, stairs: Feature, step: i32) -> ActionResult {
        let world = &mut self.world;
        if world.level.feature(world.player.pos) != stairs {
            let which = if step < 0 { "up" } else { "down" };
            self.display
                .message(&format!("I see no {which} staircase here."));
            return ActionResult::NoTime;
        }
        world.depth = (world.depth + step).max(0);
        world.max_depth = world.max_depth.max(world.depth);
        world.flags.new_level = true;
        let verb = if step < 0 { "enter a maze of up" } else { "enter a maze of down" };
        self.display.message(&format!("You {verb} staircases."));
        info!(target: "mo_core.game", depth = world.depth, "took the stairs");
        ActionResult::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::dungeon::Level;
    use crate::geometry::Coord;
    use crate::item::{Pack, PackItem};
    use crate::ports::{RecordingDisplay, ScriptedCommands};

    fn room_world() -> World {
        let mut world = World::new(GameConfig::default(), 77);
        world.depth = 1;
        world.max_depth = 1;
        let mut level = Level::new(1, 12, 20);
        for y in 1..11 {
            for x in 1..19 {
                level.set_feature(Coord::new(y, x), Feature::RoomFloor);
            }
        }
        world.level = level;
        world.move_player(Coord::new(5, 5));
        world
    }

    fn run(world: World, script: &str) -> GameLoop<RecordingDisplay, ScriptedCommands> {
        let input = ScriptedCommands::parse(script).unwrap();
        let mut game = GameLoop::new(world, RecordingDisplay::default(), input);
        game.dungeon();
        game
    }

    #[test]
    fn test_move_and_end_of_input() {
        let game = run(room_world(), "move 6\nmove 6\n");
        assert_eq!(game.world().player.pos, Coord::new(5, 7));
        assert!(game.world().flags.eof);
        assert_eq!(game.world().turn, 3);
    }

    #[test]
    fn test_wall_bump_takes_no_turn() {
        let mut world = room_world();
        world.level.set_feature(Coord::new(5, 6), Feature::Granite);
        let game = run(world, "move 6\nhold\n");
        assert!(game.display().contains("There is a wall in the way."));
        assert_eq!(game.world().player.pos, Coord::new(5, 5));
        // the bump and the hold share the first turn
        assert_eq!(game.world().turn, 2);
    }

    #[test]
    fn test_closed_door_opens() {
        let mut world = room_world();
        world.level.set_feature(Coord::new(5, 6), Feature::ClosedDoor);
        let game = run(world, "move 6\n");
        assert_eq!(game.world().level.feature(Coord::new(5, 6)), Feature::OpenDoor);
        assert_eq!(game.world().player.pos, Coord::new(5, 5));
    }

    #[test]
    fn test_search_finds_secret_door() {
        let mut world = room_world();
        world.level.set_feature(Coord::new(4, 5), Feature::SecretDoor);
        world.player.search_skill = 100;
        let game = run(world, "search\n");
        assert_eq!(game.world().level.feature(Coord::new(4, 5)), Feature::ClosedDoor);
        assert!(game.display().contains("You have found a secret door."));
    }

    #[test]
    fn test_stairs_set_new_level() {
        let mut world = room_world();
        world.level.set_feature(Coord::new(5, 5), Feature::DownStairs);
        let game = run(world, "up\ndown\n");
        assert!(game.display().contains("I see no up staircase here."));
        assert!(game.world().flags.new_level);
        assert_eq!(game.world().depth, 2);
        assert_eq!(game.world().max_depth, 2);
    }

    #[test]
    fn test_rest_counts_down() {
        let game = run(room_world(), "rest 5\n");
        // one turn to start resting, five to rest, then input runs out
        assert_eq!(game.world().turn, 7);
        assert_eq!(game.world().player.rest, 0);
    }

    #[test]
    fn test_light_goes_out() {
        let mut world = room_world();
        world.player.light = 2;
        let game = run(world, "hold\nhold\n");
        assert!(game.display().contains("Your light has gone out!"));
        assert_eq!(game.world().player.light, 0);
    }

    #[test]
    fn test_hunger_message_once() {
        let mut world = room_world();
        world.player.food = PLAYER_FOOD_ALERT - 1;
        let game = run(world, "hold\nhold\nhold\n");
        assert_eq!(game.display().count("You are hungry."), 1);
    }

    #[test]
    fn test_starvation_kills() {
        let mut world = room_world();
        world.player.food = -10_000;
        world.player.chp = 5;
        let game = run(world, "hold\n");
        assert!(game.world().player.dead);
        assert_eq!(game.world().player.died_from.as_deref(), Some("starvation"));
        assert_eq!(game.world().turn, 1);
    }

    #[test]
    fn test_word_of_recall_returns_to_town() {
        let mut world = room_world();
        world.player.status.word_recall = 2;
        let game = run(world, "hold\nhold\nhold\n");
        assert!(game.display().contains("You feel yourself yanked upwards!"));
        assert!(game.world().flags.new_level);
        assert_eq!(game.world().depth, 0);
    }

    #[test]
    fn test_turn_limit_stops() {
        let input = ScriptedCommands::new(std::iter::repeat_n(Command::Hold, 50));
        let mut game =
            GameLoop::new(room_world(), RecordingDisplay::default(), input).with_turn_limit(10);
        game.dungeon();
        assert_eq!(game.world().turn, 10);
        assert!(game.world().flags.eof);
    }

    #[test]
    fn test_sense_reports_feeling() {
        let mut world = room_world();
        let mut blade = PackItem::new(ItemKind::Weapon, "broad sword");
        blade.to_hit = 3;
        world = world.with_pack(Box::new(Pack::new(vec![blade])));
        let input = ScriptedCommands::new(std::iter::repeat_n(Command::Hold, 4000));
        let mut game = GameLoop::new(world, RecordingDisplay::default(), input);
        game.dungeon();
        assert!(game.display().contains("You feel that your broad sword is magical."));
    }

    #[test]
    fn test_play_generates_and_quits() {
        let world = World::at_depth(GameConfig::default(), 9, 1);
        let input = ScriptedCommands::parse("hold\nquit\n").unwrap();
        let mut game = GameLoop::new(world, RecordingDisplay::default(), input);
        let result = game.play();
        assert!(matches!(
            result,
            GameLoopResult::PlayerQuit | GameLoopResult::PlayerDied(_)
        ));
        assert_eq!(game.levels().len(), 1);
    }
}
