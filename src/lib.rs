//! Number Bomber - A grid bomb-placement arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, bombs, monster, progression)
//! - `settings`: Data-driven game configuration

pub mod settings;
pub mod sim;

pub use settings::{ConfigError, GameConfig, Preset};

/// Game configuration constants (defaults for [`GameConfig`])
pub mod consts {
    /// Grid dimensions (must be odd so the checkerboard meets the border)
    pub const GRID_COLS: u32 = 15;
    pub const GRID_ROWS: u32 = 13;

    /// Time a single cell-to-cell move takes (player and monster)
    pub const MOVE_DURATION_MS: u64 = 150;

    /// Bomb fuse: base delay plus a per-range increment
    pub const BOMB_BASE_DELAY_MS: u64 = 3000;
    pub const BOMB_DELAY_PER_RANGE_MS: u64 = 100;
    /// Largest fire range a bomb key can request
    pub const MAX_FIRE_RANGE: u32 = 9;

    /// Delay before a destroyed monster is replaced
    pub const MONSTER_RESPAWN_DELAY_MS: u64 = 1000;
    /// Monster cadence at the start of every tier
    pub const MONSTER_BASE_INTERVAL_MS: u64 = 1000;
    /// Cadence speed-up per level within a tier
    pub const MONSTER_INTERVAL_STEP_MS: u64 = 80;
    /// Cadence never drops below this
    pub const MONSTER_MIN_INTERVAL_MS: u64 = 200;

    /// Lives granted at the start of a fresh run
    pub const INITIAL_LIVES: u32 = 3;

    /// Probability of a destructible block in the classic layout
    pub const CLASSIC_DESTRUCTIBLE_CHANCE: f64 = 0.7;
}
