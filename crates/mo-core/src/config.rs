//! Tunable game configuration
//!
//! Loaded from TOML. Every section and field has a default, so an empty file
//! (or no file at all) yields the stock game.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::{MAX_HEIGHT, MAX_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::error::ConfigError;

/// Dungeon generation parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    pub height: i32,
    pub width: i32,
    /// Mean number of room slots
    pub room_mean: i32,
    /// Unusual rooms appear when depth exceeds randint(unusual_rooms)
    pub unusual_rooms: i32,
    /// 1 in n chance a tunnel turns randomly instead of correcting
    pub random_dir: i32,
    /// Percent chance a tunnel keeps its direction
    pub dir_change: i32,
    /// Percent chance a tunnel carries on through an existing corridor
    pub tunnel_continue: i32,
    /// Percent chance a pierced room wall becomes a door
    pub tunnel_door_chance: i32,
    /// Junction doors appear when randint(100) exceeds this
    pub junction_door_threshold: i32,
    pub streamer_range: i32,
    pub streamer_density: i32,
    pub magma_streamers: i32,
    /// 1 in n magma cells hold gold
    pub magma_treasure: i32,
    pub quartz_streamers: i32,
    /// 1 in n quartz cells hold gold
    pub quartz_treasure: i32,
    pub tunnel_step_cap: i32,
    pub pit_min_depth: i32,
    pub pit_chance: i32,
    pub vault_min_depth: i32,
    pub ghost_chance: i32,
    pub ghost_min_depth: i32,
    pub win_monster_depth: i32,
    /// Depths where down staircases become up staircases
    pub quest_depths: Vec<i32>,
    pub generation_attempts: u32,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            height: MAX_HEIGHT,
            width: MAX_WIDTH,
            room_mean: 32,
            unusual_rooms: 300,
            random_dir: 9,
            dir_change: 70,
            tunnel_continue: 15,
            tunnel_door_chance: 25,
            junction_door_threshold: 15,
            streamer_range: 2,
            streamer_density: 5,
            magma_streamers: 3,
            magma_treasure: 90,
            quartz_streamers: 2,
            quartz_treasure: 40,
            tunnel_step_cap: 2000,
            pit_min_depth: 10,
            pit_chance: 4,
            vault_min_depth: 8,
            ghost_chance: 20,
            ghost_min_depth: 10,
            win_monster_depth: 50,
            quest_depths: vec![50],
            generation_attempts: 32,
        }
    }
}

impl DungeonConfig {
    pub fn is_quest_level(&self, depth: i32) -> bool {
        self.quest_depths.contains(&depth)
    }
}

/// Creature engine limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterConfig {
    pub max_monsters: usize,
    pub max_multiply: i32,
    pub multiply_adjust: i32,
    pub max_sight: i32,
    pub max_spell_distance: i32,
    /// 1 in n monster draws come from deeper levels
    pub nasty_chance: i32,
    pub quake_radius: i32,
}

impl Default for MonsterConfig {
    fn default() -> Self {
        Self {
            max_monsters: 200,
            max_multiply: 75,
            multiply_adjust: 7,
            max_sight: 20,
            max_spell_distance: 20,
            nasty_chance: 50,
            quake_radius: 3,
        }
    }
}

/// Town level parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TownConfig {
    /// Seed for the fixed store layout
    pub seed: u64,
    pub day_monsters: i32,
    pub night_monsters: i32,
    /// Turns per half day
    pub day_length: u64,
}

impl Default for TownConfig {
    fn default() -> Self {
        Self {
            seed: 0x6d6f_7269_6121,
            day_monsters: 4,
            night_monsters: 8,
            day_length: 5000,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub dungeon: DungeonConfig,
    pub monsters: MonsterConfig,
    pub town: TownConfig,
}

impl GameConfig {
    /// Read and validate a TOML config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(target: "mo_core.config", path = %path.display(), "loading config");
        Self::from_toml_str(&contents)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the generator cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.dungeon;
        if d.height < SCREEN_HEIGHT || d.width < SCREEN_WIDTH {
            return Err(ConfigError::Invalid {
                field: "dungeon.height/width",
                reason: format!(
                    "{}x{} is smaller than one screen ({}x{})",
                    d.height, d.width, SCREEN_HEIGHT, SCREEN_WIDTH
                ),
            });
        }
        if d.height > MAX_HEIGHT || d.width > MAX_WIDTH {
            return Err(ConfigError::Invalid {
                field: "dungeon.height/width",
                reason: format!("{}x{} exceeds {}x{}", d.height, d.width, MAX_HEIGHT, MAX_WIDTH),
            });
        }
        if d.room_mean < 1 {
            return Err(ConfigError::Invalid {
                field: "dungeon.room_mean",
                reason: "at least one room is required".to_string(),
            });
        }
        let percents = [
            ("dungeon.dir_change", d.dir_change),
            ("dungeon.tunnel_continue", d.tunnel_continue),
            ("dungeon.tunnel_door_chance", d.tunnel_door_chance),
            ("dungeon.junction_door_threshold", d.junction_door_threshold),
        ];
        for (field, value) in percents {
            if !(0..=100).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is not a percentage"),
                });
            }
        }
        if d.tunnel_step_cap < 1 || d.generation_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "dungeon.tunnel_step_cap",
                reason: "iteration caps must be positive".to_string(),
            });
        }
        if self.monsters.max_monsters == 0 || self.monsters.multiply_adjust < 1 {
            return Err(ConfigError::Invalid {
                field: "monsters",
                reason: "monster table and multiply adjustment must be positive".to_string(),
            });
        }
        Ok(())
    }
}
