//! Dungeon system
//!
//! Contains the level grid, cells, and the cave and town generators.

mod cell;
mod generation;
mod level;
mod rooms;
mod town;
mod tunnel;

pub use cell::{Cell, Feature, Occupant};
pub use generation::{GenerationReport, generate_level, is_connected, unreachable_cells};
pub use level::Level;
