//! mo-core: simulation core for a Moria-style roguelike
//!
//! Dungeon generation, the creature engine and the turn loop. The crate does
//! no terminal I/O; it talks to the outside world through the ports in
//! [`ports`] and keeps all mutable state in a [`World`] passed by reference.

pub mod combat;
pub mod config;
pub mod dungeon;
pub mod geometry;
pub mod item;
pub mod monster;
pub mod player;
pub mod ports;
pub mod world;

mod consts;
mod error;
mod gameloop;
mod rng;

pub use config::GameConfig;
pub use consts::*;
pub use error::ConfigError;
pub use gameloop::{GameLoop, GameLoopResult};
pub use rng::GameRng;
pub use world::World;
