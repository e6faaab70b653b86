//! Simulation tick
//!
//! Applies one batch of player intents, then advances game time and fires
//! every timer that falls due, in deadline order.

use super::bombs::{BombId, BombRejection, Detonation, FireRange};
use super::grid::{CellPos, Direction, Tile};
use super::monster::Monster;
use super::schedule::Timer;
use super::state::{DeathCause, GameEvent, GameState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Arrow key held this tick
    pub direction: Option<Direction>,
    /// Numbered bomb key (1-9 selects the fire range)
    pub bomb_key: Option<u32>,
    /// Default bomb key (fire range 1)
    pub drop_bomb: bool,
}

/// Why a move request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    /// Previous move has not finished
    InTransit,
    OutOfBounds,
    /// Solid or Destructible tile
    Blocked,
    BombInTheWay,
    MonsterInTheWay,
    EpisodeOver,
}

/// What happened to the intents of one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub movement: Option<Result<CellPos, MoveRejection>>,
    /// One entry per bomb key, numbered key first
    pub bombs: Vec<Result<BombId, BombRejection>>,
    /// Timers fired while the clock advanced
    pub timers_fired: usize,
}

/// Advance the game by `dt_ms` milliseconds of game time
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: u64) -> TickReport {
    let mut report = TickReport::default();

    // Bombs go down before the player leaves the cell
    if let Some(key) = input.bomb_key {
        let placed = FireRange::new(key)
            .ok_or(BombRejection::InvalidRange)
            .and_then(|range| place_bomb(state, range));
        report.bombs.push(placed);
    }
    if input.drop_bomb {
        report.bombs.push(place_bomb(state, FireRange::DEFAULT));
    }

    if let Some(dir) = input.direction {
        report.movement = Some(move_player(state, dir));
    }

    report.timers_fired = advance(state, dt_ms);
    report
}

/// Place a bomb on the player's committed cell
pub fn place_bomb(state: &mut GameState, range: FireRange) -> Result<BombId, BombRejection> {
    if state.is_over() {
        return Err(BombRejection::EpisodeOver);
    }
    let cell = state.player.cell;
    let delay = state.config.fuse_delay(range);
    let bomb = state
        .bombs
        .place(cell, range, state.now_ms, delay, &mut state.scheduler)?;
    state.emit(GameEvent::BombPlaced {
        bomb,
        cell,
        fire_range: range,
    });
    Ok(bomb)
}

/// Start a one-cell move. The destination is committed immediately.
pub fn move_player(state: &mut GameState, dir: Direction) -> Result<CellPos, MoveRejection> {
    if state.is_over() {
        return Err(MoveRejection::EpisodeOver);
    }
    if state.player.moving {
        return Err(MoveRejection::InTransit);
    }
    let dest = state
        .grid
        .step(state.player.cell, dir, 1)
        .ok_or(MoveRejection::OutOfBounds)?;
    if !state.grid.is_empty(dest) {
        return Err(MoveRejection::Blocked);
    }
    if state.bombs.is_bomb_at(dest) {
        return Err(MoveRejection::BombInTheWay);
    }
    if state.monsters.is_at(dest) {
        return Err(MoveRejection::MonsterInTheWay);
    }

    state.player.cell = dest;
    state.player.moving = true;
    let at = state.now_ms + state.config.move_duration_ms;
    let _ = state.scheduler.schedule(at, Timer::PlayerArrive);
    state.emit(GameEvent::PlayerMoved { cell: dest });
    Ok(dest)
}

/// Run the clock forward, firing due timers. Returns how many fired.
pub fn advance(state: &mut GameState, dt_ms: u64) -> usize {
    let target = state.now_ms.saturating_add(dt_ms);
    let mut fired = 0;
    while !state.is_over() {
        let Some((at, timer)) = state.scheduler.pop_due(target) else {
            break;
        };
        state.now_ms = at;
        fired += 1;
        fire(state, at, timer);
    }
    state.now_ms = target;
    fired
}

fn fire(state: &mut GameState, at: u64, timer: Timer) {
    match timer {
        Timer::BombFuse(bomb) => {
            let _ = detonate(state, bomb);
        }
        Timer::MonsterStep => {
            state.rearm_monster_timer_after(at);
            step_monster(state);
        }
        Timer::MonsterArrive(id) => {
            if let Some(cell) = state.monsters.arrive(id) {
                check_caught(state, cell);
            }
        }
        Timer::PlayerArrive => state.player.moving = false,
        Timer::MonsterSpawn => {
            state.spawn_monster();
            if let Some(cell) = state.monsters.cell() {
                check_caught(state, cell);
            }
        }
    }
}

fn step_monster(state: &mut GameState) {
    let target = state.player.cell;
    let Some(cell) = state.monsters.step(&state.grid, &state.bombs, target) else {
        return;
    };
    if let Some(id) = state.monster().map(|m| m.id) {
        let at = state.now_ms + state.config.move_duration_ms;
        let _ = state.scheduler.schedule(at, Timer::MonsterArrive(id));
    }
    state.emit(GameEvent::MonsterMoved { cell });
}

fn check_caught(state: &mut GameState, monster_cell: CellPos) {
    if monster_cell == state.player.cell {
        state.emit(GameEvent::PlayerCaught);
        state.end_episode(DeathCause::Caught);
    }
}

/// Detonate a bomb and everything it chains into, then apply the effects.
///
/// Returns `None` if the bomb is no longer live or the episode is over.
/// A player caught in the cascade dies only after the whole cascade has
/// been applied, so kills made by the same cascade still count.
pub fn detonate(state: &mut GameState, bomb: BombId) -> Option<Detonation> {
    if state.is_over() {
        return None;
    }
    let detonation = state
        .bombs
        .detonate(bomb, &mut state.grid, &mut state.scheduler)?;

    let mut player_hit = false;
    for blast in &detonation.blasts {
        state.emit(GameEvent::Explosion {
            cell: blast.cell,
            chain_value: blast.chain_value,
        });
        if blast.cell == state.player.cell && !player_hit {
            player_hit = true;
            state.emit(GameEvent::PlayerHitByBlast);
        }
        if let Some(monster) = state.monsters.resolve_blast(blast) {
            monster_destroyed(state, monster);
        }
    }
    for &cell in &detonation.cleared {
        state.emit(GameEvent::GridChanged {
            cell,
            tile: Tile::Empty,
        });
    }

    if player_hit {
        state.end_episode(DeathCause::Blast);
    }
    Some(detonation)
}

fn monster_destroyed(state: &mut GameState, monster: Monster) {
    state.emit(GameEvent::MonsterDestroyed {
        value: monster.value,
        cell: monster.cell,
    });
    let level_up = state.episode.record_kill(&state.config.progression);
    state.emit(GameEvent::LevelChanged {
        level: state.episode.game_level,
        score: state.episode.success_count,
    });
    if let Some(level_up) = level_up {
        state.arm_monster_timer();
        if level_up.new_tier {
            log::info!(
                "Level {} opens a new tier: monster level {}, cadence {}ms",
                level_up.game_level,
                level_up.monster_level,
                level_up.interval_ms
            );
        }
    }
    let at = state.now_ms + state.config.monster_respawn_delay_ms;
    let _ = state.scheduler.schedule(at, Timer::MonsterSpawn);
    log::info!(
        "Monster {} destroyed at {}, score {}",
        monster.value,
        monster.cell,
        state.episode.success_count
    );
}
