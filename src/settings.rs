//! Match configuration
//!
//! Everything a host may tune per match. Balancing constants that are not
//! per-match (speeds, cooldowns, falloff) live in `crate::consts`.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Per-match settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Arena width (px)
    pub arena_width: f32,
    /// Arena height (px)
    pub arena_height: f32,
    /// Time limit for duel and FFA (seconds)
    pub max_game_time: f32,
    /// FFA ends when a player reaches this many kills
    pub ffa_kill_target: u32,
    /// Starting lives in FFA
    pub default_lives: u32,
    /// Starting lives in a duel
    pub duel_lives: u32,
    /// Starting lives in survival
    pub survival_lives: u32,
    /// Seconds between death and respawn
    pub respawn_delay: f32,
    /// RNG seed (AI personalities, AI rolls, spawn points)
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            max_game_time: MAX_GAME_TIME,
            ffa_kill_target: FFA_KILL_TARGET,
            default_lives: DEFAULT_LIVES,
            duel_lives: DUEL_LIVES,
            survival_lives: 1,
            respawn_delay: RESPAWN_DELAY,
            seed: 0,
        }
    }
}

impl SimConfig {
    /// Default settings with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse and validate JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::info!("Loaded match config (seed {})", config.seed);
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let arena_ok = self.arena_width.is_finite()
            && self.arena_height.is_finite()
            && self.arena_width > 0.0
            && self.arena_height > 0.0;
        if !arena_ok {
            return Err(ConfigError::InvalidArena {
                width: self.arena_width,
                height: self.arena_height,
            });
        }
        if !(self.max_game_time.is_finite() && self.max_game_time > 0.0) {
            return Err(ConfigError::InvalidTimeLimit(self.max_game_time));
        }
        for (mode, lives) in [
            ("ffa", self.default_lives),
            ("duel", self.duel_lives),
            ("survival", self.survival_lives),
        ] {
            if lives == 0 {
                return Err(ConfigError::ZeroLives { mode });
            }
        }
        Ok(())
    }
}
