//! Game state and core simulation types
//!
//! One `GameState` is one episode. The only thing that survives a restart
//! is the `EpisodeState`, which seeds the next instance.

use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::SimRng;
use super::bombs::{BombId, BombManager, FireRange};
use super::grid::{CellPos, Grid, LayoutPolicy, Tile};
use super::monster::{Monster, MonsterController};
use super::numbers::MonsterValuePolicy;
use super::progression::{DeathOutcome, EpisodeState};
use super::schedule::{Scheduler, Timer, TimerId};
use crate::settings::GameConfig;

/// Why an episode ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// The monster reached the player's cell
    Caught,
    /// An explosion touched the player's cell
    Blast,
}

/// Current phase of the episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Player died; waiting for the host to restart
    Over(DeathCause),
}

/// The player's avatar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Committed cell (the destination while in transit)
    pub cell: CellPos,
    pub moving: bool,
}

/// Notifications for the presentation layer, in the order they happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    GridChanged { cell: CellPos, tile: Tile },
    Explosion { cell: CellPos, chain_value: u64 },
    BombPlaced { bomb: BombId, cell: CellPos, fire_range: FireRange },
    MonsterSpawned { value: u64, cell: CellPos },
    MonsterMoved { cell: CellPos },
    MonsterDestroyed { value: u64, cell: CellPos },
    PlayerMoved { cell: CellPos },
    LevelChanged { level: u32, score: u32 },
    PlayerCaught,
    PlayerHitByBlast,
    LivesChanged { remaining: u32 },
}

/// Complete state of one episode (deterministic for a given seed and input stream)
#[derive(Debug)]
pub struct GameState {
    /// Seed this episode was built from
    pub seed: u64,
    pub config: GameConfig,
    pub episode: EpisodeState,
    pub grid: Grid,
    pub player: Player,
    pub bombs: BombManager,
    pub monsters: MonsterController,
    pub scheduler: Scheduler,
    pub rng: SimRng,
    /// Game clock (ms since the episode started)
    pub now_ms: u64,
    pub phase: GamePhase,
    /// Pending notifications, drained by the host
    pub events: Vec<GameEvent>,
    layout: Box<dyn LayoutPolicy>,
    monster_timer: Option<TimerId>,
}

impl GameState {
    /// Fresh run using the layout and value policy named in `config`
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let episode = EpisodeState::initial(&config.progression);
        Self::with_episode(config, episode, seed)
    }

    /// Episode continuing from a carried-over `EpisodeState`
    pub fn with_episode(config: GameConfig, episode: EpisodeState, seed: u64) -> Self {
        let layout = Box::new(config.layout());
        let values = config.value_policy.build();
        Self::with_policies(config, episode, seed, layout, values)
    }

    /// Episode with custom layout and value policies
    pub fn with_policies(
        config: GameConfig,
        episode: EpisodeState,
        seed: u64,
        layout: Box<dyn LayoutPolicy>,
        values: Box<dyn MonsterValuePolicy>,
    ) -> Self {
        let mut rng = SimRng::seed_from_u64(seed);
        let grid = layout.generate(config.grid_rows, config.grid_cols, &mut rng);
        let player = Player {
            cell: grid.player_spawn(),
            moving: false,
        };

        let mut state = Self {
            seed,
            config,
            episode,
            grid,
            player,
            bombs: BombManager::new(),
            monsters: MonsterController::new(values),
            scheduler: Scheduler::new(),
            rng,
            now_ms: 0,
            phase: GamePhase::Playing,
            events: Vec::new(),
            layout,
            monster_timer: None,
        };

        state.emit(GameEvent::LivesChanged {
            remaining: state.episode.player_lives,
        });
        state.emit(GameEvent::LevelChanged {
            level: state.episode.game_level,
            score: state.episode.success_count,
        });
        state.emit(GameEvent::PlayerMoved {
            cell: state.player.cell,
        });
        state.spawn_monster();
        state.arm_monster_timer();

        log::info!(
            "Episode started: seed {}, level {}, score {}, lives {}",
            seed,
            state.episode.game_level,
            state.episode.success_count,
            state.episode.player_lives
        );
        state
    }

    /// Build the next episode.
    ///
    /// After a death the carried state follows the life-loss rules; calling
    /// this mid-episode restarts with the current progress untouched.
    pub fn restart(mut self) -> GameState {
        let episode = match self.phase {
            GamePhase::Over(_) => {
                if self.episode.death_outcome() == DeathOutcome::RunReset {
                    log::info!("Out of lives, run reset");
                }
                self.episode.after_death(&self.config.progression)
            }
            GamePhase::Playing => self.episode,
        };
        let seed = self.rng.random();
        let values = self.monsters.into_policy();
        Self::with_policies(self.config, episode, seed, self.layout, values)
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, GamePhase::Over(_))
    }

    pub fn monster(&self) -> Option<&Monster> {
        self.monsters.monster()
    }

    /// When the monster will next try to move
    pub fn next_monster_step(&self) -> Option<u64> {
        self.monster_timer
            .and_then(|timer| self.scheduler.deadline(timer))
    }

    /// Take all notifications produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Spawn a monster at its corner with a value for the current monster level
    pub(crate) fn spawn_monster(&mut self) {
        let cell = self.grid.monster_spawn();
        let level = self.episode.monster_level;
        let value = self.monsters.spawn(cell, level, &mut self.rng).value;
        self.emit(GameEvent::MonsterSpawned { value, cell });
    }

    /// (Re)start the recurring monster step with the current cadence.
    /// The previous timer is cancelled first so only one mover exists.
    pub(crate) fn arm_monster_timer(&mut self) {
        if let Some(timer) = self.monster_timer.take() {
            let _ = self.scheduler.cancel(timer);
        }
        let at = self.now_ms + self.monster_interval();
        self.monster_timer = Some(self.scheduler.schedule(at, Timer::MonsterStep));
    }

    /// Queue the next recurring monster step after one fired at `fired_at`
    pub(crate) fn rearm_monster_timer_after(&mut self, fired_at: u64) {
        let at = fired_at + self.monster_interval();
        self.monster_timer = Some(self.scheduler.schedule(at, Timer::MonsterStep));
    }

    /// Monster cadence, never below the configured floor or 1ms
    fn monster_interval(&self) -> u64 {
        self.episode
            .monster_move_interval_ms
            .max(self.config.progression.min_interval_ms)
            .max(1)
    }

    /// End the episode and cancel everything still pending
    pub(crate) fn end_episode(&mut self, cause: DeathCause) {
        if self.is_over() {
            return;
        }
        self.phase = GamePhase::Over(cause);
        self.scheduler.clear();
        self.monster_timer = None;
        let remaining = self.episode.player_lives.saturating_sub(1);
        log::info!(
            "Player died ({cause:?}) at level {} with score {}",
            self.episode.game_level,
            self.episode.success_count
        );
        self.emit(GameEvent::LivesChanged { remaining });
    }
}
