//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Game time only advances through `tick`
//! - Seeded RNG only
//! - Timers fire in (deadline, scheduling order)
//! - No rendering or platform dependencies

pub mod bombs;
pub mod grid;
pub mod monster;
pub mod numbers;
pub mod progression;
pub mod schedule;
pub mod state;
pub mod tick;

/// The simulation's random source (seeded, reproducible across platforms)
pub type SimRng = rand_pcg::Pcg32;

pub use bombs::{Blast, Bomb, BombId, BombManager, BombRejection, Detonation, FireRange};
pub use grid::{CellPos, CellState, ClassicLayout, Direction, FixedLayout, Grid, LayoutPolicy, Tile};
pub use monster::{Monster, MonsterController, MonsterId};
pub use numbers::{ChainContext, MonsterValuePolicy, NonPrimeDraw, ProductOfDraws, ValuePolicyKind};
pub use progression::{DeathOutcome, EpisodeState, LevelUp, ProgressionRules};
pub use schedule::{Scheduler, Timer, TimerId};
pub use state::{DeathCause, GameEvent, GamePhase, GameState, Player};
pub use tick::{MoveRejection, TickInput, TickReport, detonate, tick};
