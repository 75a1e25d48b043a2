//! Core game constants
//!
//! Grid geometry, generation tuning, creature and player constants shared by
//! the generator, the creature engine and the turn loop.

/// Full dungeon level dimensions
pub const MAX_HEIGHT: i32 = 66;
pub const MAX_WIDTH: i32 = 198;

/// One screen of map, also the size of the town level
pub const SCREEN_HEIGHT: i32 = 22;
pub const SCREEN_WIDTH: i32 = 66;
pub const QUART_HEIGHT: i32 = SCREEN_HEIGHT / 4;
pub const QUART_WIDTH: i32 = SCREEN_WIDTH / 4;

/// Upper bound on coarse room slots along either axis
pub const MAX_ROOM_SLOTS: usize = 20;

/// Number of stores in town
pub const MAX_STORES: u8 = 6;

/// Base monster allocation on a fresh level
pub const MIN_MALLOC_LEVEL: i32 = 14;

/// Treasure allocation means
pub const TREAS_ROOM_ALLOC: i32 = 7;
pub const TREAS_ANY_ALLOC: i32 = 2;
pub const TREAS_GOLD_ALLOC: i32 = 2;

/// Highest level in the species table
pub const MAX_MONS_LEVEL: i32 = 40;

/// Attacks per species
pub const MAX_MON_NATTACK: usize = 4;

/// Monster to-hit gain per species level
pub const MON_LEVEL_ADJ: i32 = 3;

/// Experience drained per hundred points by life-draining attacks
pub const MON_DRAIN_LIFE: i32 = 2;

/// Speed of an unhasted, unslowed player
pub const NORMAL_SPEED: i32 = 10;

/// Recall counters saturate here
pub const MAX_RECALL: u8 = u8::MAX;

/// Food thresholds
pub const PLAYER_FOOD_FULL: i32 = 10000;
pub const PLAYER_FOOD_MAX: i32 = 15000;
pub const PLAYER_FOOD_FAINT: i32 = 300;
pub const PLAYER_FOOD_WEAK: i32 = 1000;
pub const PLAYER_FOOD_ALERT: i32 = 2000;

/// Regeneration rates (16.16 fixed point scale factors)
pub const PLAYER_REGEN_FAINT: i32 = 33;
pub const PLAYER_REGEN_WEAK: i32 = 98;
pub const PLAYER_REGEN_NORMAL: i32 = 197;
pub const PLAYER_REGEN_HPBASE: i32 = 1442;
pub const PLAYER_REGEN_MNBASE: i32 = 524;

/// Stun thresholds
pub const HEAVY_STUN: i32 = 50;
pub const KNOCKED_OUT: i32 = 100;

/// Heavy stun penalties
pub const HEAVY_STUN_TO_HIT: i32 = 20;
pub const HEAVY_STUN_AC: i32 = 20;

/// Light fuel warning threshold
pub const LIGHT_WARNING: i32 = 40;
