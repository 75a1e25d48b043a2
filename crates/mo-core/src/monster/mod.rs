//! Monster system
//!
//! Species templates, live instances, the player's memory of each species and
//! the per-turn creature engine.

pub mod ai;
mod monst;
pub mod movement;
mod recall;
pub mod spawn;
mod species;
pub mod spells;
pub mod table;

pub use ai::{MonsterAction, SweepReport, get_moves, movement_rate, process_monsters};
pub use monst::{Monster, MonsterId};
pub use recall::{Recall, RecallBook};
pub use spawn::{SummonContext, SummonFilter};
pub use species::{DefenseFlags, Family, MoveFlags, SpellFlags, Species, capitalize};
pub use table::SpeciesTable;
