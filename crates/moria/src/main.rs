//! Headless driver for the mo-core simulation
//!
//! Generates levels and runs the turn loop against a scripted command list,
//! printing messages to the console or a JSON summary at the end.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mo_core::dungeon::GenerationReport;
use mo_core::geometry::Coord;
use mo_core::ports::{Command, DisplayPort, Disturb, ScriptedCommands};
use mo_core::{GameConfig, GameLoop, GameLoopResult, GameRng, World};

/// Run the roguelike simulation without a terminal
#[derive(Parser, Debug)]
#[command(name = "moria")]
#[command(author, version, about = "Headless Moria-style dungeon simulation", long_about = None)]
struct Args {
    /// Seed for the game RNG; random when omitted
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Starting dungeon level, 0 being the town
    #[arg(short = 'd', long = "depth", default_value_t = 1)]
    depth: i32,

    /// Stop after this many game turns
    #[arg(short = 't', long = "turns", default_value_t = 1000)]
    turns: u64,

    /// TOML configuration file
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Command script, one command per line; the player holds still when omitted
    #[arg(long = "commands")]
    commands: Option<PathBuf>,

    /// Print a JSON summary instead of the message log
    #[arg(long = "json")]
    json: bool,

    /// Debug logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

/// Display that prints messages as they arrive, or keeps them for the summary
struct ConsoleDisplay {
    quiet: bool,
    messages: Vec<String>,
}

impl DisplayPort for ConsoleDisplay {
    fn message(&mut self, text: &str) {
        if !self.quiet {
            println!("{text}");
        }
        self.messages.push(text.to_string());
    }

    fn redraw_cell(&mut self, _pos: Coord) {}

    fn disturb(&mut self, _flags: Disturb) {}
}

#[derive(Serialize)]
struct Summary<'a> {
    seed: u64,
    result: &'a GameLoopResult,
    turns: u64,
    depth: i32,
    max_depth: i32,
    player_hp: i32,
    player_level: i32,
    gold: i32,
    winner: bool,
    levels: &'a [GenerationReport],
    messages: &'a [String],
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    let config = match path {
        Some(path) => GameConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => GameConfig::default(),
    };
    config.validate().context("validating config")?;
    Ok(config)
}

fn load_commands(path: Option<&PathBuf>, turns: u64) -> Result<ScriptedCommands> {
    match path {
        Some(path) => {
            let script = fs::read_to_string(path)
                .with_context(|| format!("reading command script {}", path.display()))?;
            ScriptedCommands::parse(&script)
                .with_context(|| format!("parsing command script {}", path.display()))
        }
        None => Ok(ScriptedCommands::new(std::iter::repeat_n(
            Command::Hold,
            turns as usize,
        ))),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config.as_ref())?;
    let commands = load_commands(args.commands.as_ref(), args.turns)?;
    let seed = args.seed.unwrap_or_else(|| GameRng::from_entropy().seed());
    info!(seed, depth = args.depth, turns = args.turns, "starting simulation");

    let world = World::at_depth(config, seed, args.depth.max(0));
    let display = ConsoleDisplay {
        quiet: args.json,
        messages: Vec::new(),
    };
    let mut game = GameLoop::new(world, display, commands).with_turn_limit(args.turns);
    let result = game.play();

    let levels = game.levels().to_vec();
    let (world, display) = game.into_parts();
    if args.json {
        let summary = Summary {
            seed,
            result: &result,
            turns: world.turn,
            depth: world.depth,
            max_depth: world.max_depth,
            player_hp: world.player.chp,
            player_level: world.player.level,
            gold: world.player.gold,
            winner: world.flags.total_winner,
            levels: &levels,
            messages: &display.messages,
        };
        let text = serde_json::to_string_pretty(&summary).context("serializing summary")?;
        println!("{text}");
    } else {
        match &result {
            GameLoopResult::PlayerDied(cause) => {
                println!("Killed by {cause} on level {} after {} turns.", world.depth, world.turn)
            }
            GameLoopResult::PlayerQuit => println!("Quit after {} turns.", world.turn),
            GameLoopResult::EndOfInput => {
                println!("Stopped on level {} after {} turns.", world.depth, world.turn)
            }
        }
    }
    Ok(())
}
