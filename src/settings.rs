//! Game configuration
//!
//! Every tunable of the simulation lives in [`GameConfig`]. Configs are
//! plain JSON; missing fields fall back to the defaults in [`crate::consts`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::bombs::FireRange;
use crate::sim::grid::ClassicLayout;
use crate::sim::numbers::ValuePolicyKind;
use crate::sim::progression::ProgressionRules;

/// Errors raised while loading or validating a config
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Layout presets matching the two shipped variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Preset {
    /// Walls and pillars only
    #[default]
    Open,
    /// Destructible blocks fill most free cells
    Classic,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Open => "open",
            Preset::Classic => "classic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "open" | "arena" => Some(Preset::Open),
            "classic" | "blocks" => Some(Preset::Classic),
            _ => None,
        }
    }

    /// Destructible probability used by this preset
    pub fn destructible_chance(&self) -> f64 {
        match self {
            Preset::Open => 0.0,
            Preset::Classic => CLASSIC_DESTRUCTIBLE_CHANCE,
        }
    }
}

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Grid ===
    pub grid_rows: u32,
    pub grid_cols: u32,
    /// Chance that a free interior cell starts as a destructible block
    pub destructible_chance: f64,

    // === Bombs ===
    /// Fuse of a range-1 bomb
    pub bomb_base_delay_ms: u64,
    /// Extra fuse per additional cell of range
    pub bomb_delay_per_range_ms: u64,

    // === Movement ===
    /// Cell-to-cell transit time for player and monster
    pub move_duration_ms: u64,

    // === Monster ===
    pub monster_respawn_delay_ms: u64,
    pub value_policy: ValuePolicyKind,

    // === Difficulty ===
    pub progression: ProgressionRules,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_rows: GRID_ROWS,
            grid_cols: GRID_COLS,
            destructible_chance: Preset::Open.destructible_chance(),

            bomb_base_delay_ms: BOMB_BASE_DELAY_MS,
            bomb_delay_per_range_ms: BOMB_DELAY_PER_RANGE_MS,

            move_duration_ms: MOVE_DURATION_MS,

            monster_respawn_delay_ms: MONSTER_RESPAWN_DELAY_MS,
            value_policy: ValuePolicyKind::default(),

            progression: ProgressionRules::default(),
        }
    }
}

impl GameConfig {
    /// Default config with a preset's layout
    pub fn from_preset(preset: Preset) -> Self {
        let mut config = Self::default();
        config.apply_preset(preset);
        config
    }

    pub fn apply_preset(&mut self, preset: Preset) {
        self.destructible_chance = preset.destructible_chance();
    }

    /// Fuse length for a bomb of the given range
    pub fn fuse_delay(&self, range: FireRange) -> u64 {
        let extra = u64::from(range.get() - 1);
        self.bomb_base_delay_ms
            .saturating_add(extra.saturating_mul(self.bomb_delay_per_range_ms))
    }

    /// Layout policy described by this config
    pub fn layout(&self) -> ClassicLayout {
        ClassicLayout::with_spawn_zones(self.destructible_chance, self.grid_rows, self.grid_cols)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_rows < 5 || self.grid_cols < 5 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 5x5, got {}x{}",
                self.grid_rows, self.grid_cols
            )));
        }
        if self.grid_rows % 2 == 0 || self.grid_cols % 2 == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid dimensions must be odd, got {}x{}",
                self.grid_rows, self.grid_cols
            )));
        }
        if !(0.0..=1.0).contains(&self.destructible_chance) {
            return Err(ConfigError::Invalid(format!(
                "destructible_chance must be within [0, 1], got {}",
                self.destructible_chance
            )));
        }
        if self.move_duration_ms == 0 {
            return Err(ConfigError::Invalid("move_duration_ms must be positive".into()));
        }
        let rules = &self.progression;
        if rules.min_interval_ms == 0 {
            return Err(ConfigError::Invalid("min_interval_ms must be positive".into()));
        }
        if rules.base_interval_ms < rules.min_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "base_interval_ms ({}) is below min_interval_ms ({})",
                rules.base_interval_ms, rules.min_interval_ms
            )));
        }
        if rules.kills_per_level == 0 {
            return Err(ConfigError::Invalid("kills_per_level must be positive".into()));
        }
        if rules.initial_lives == 0 {
            return Err(ConfigError::Invalid("initial_lives must be positive".into()));
        }
        Ok(())
    }

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
