//! Level progression and episode state
//!
//! `EpisodeState` is the only state that survives a restart. Every rule
//! here is a plain function of the previous state and the configured
//! [`ProgressionRules`].

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable difficulty rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionRules {
    /// Kills needed to leave level L are `L * kills_per_level` (cumulative)
    pub kills_per_level: u32,
    /// Monster cadence at the start of a run and of every tier
    pub base_interval_ms: u64,
    /// Cadence reduction per level-up
    pub interval_step_ms: u64,
    /// Cadence floor
    pub min_interval_ms: u64,
    /// Reaching one of these levels starts a new tier
    pub tier_levels: Vec<u32>,
    /// Lives at the start of a run
    pub initial_lives: u32,
}

impl Default for ProgressionRules {
    fn default() -> Self {
        Self {
            kills_per_level: 2,
            base_interval_ms: MONSTER_BASE_INTERVAL_MS,
            interval_step_ms: MONSTER_INTERVAL_STEP_MS,
            min_interval_ms: MONSTER_MIN_INTERVAL_MS,
            tier_levels: vec![2, 11, 21],
            initial_lives: INITIAL_LIVES,
        }
    }
}

/// Score, level and difficulty carried across episodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeState {
    pub game_level: u32,
    /// Monsters destroyed
    pub success_count: u32,
    /// Depth of monster value generation
    pub monster_level: u32,
    pub monster_move_interval_ms: u64,
    pub player_lives: u32,
}

/// What changed when a level was gained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub game_level: u32,
    pub monster_level: u32,
    /// True when this level started a new tier
    pub new_tier: bool,
    pub interval_ms: u64,
}

/// Outcome of losing a life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathOutcome {
    /// One life spent, progress kept
    LifeLost { remaining: u32 },
    /// Out of lives, everything back to the start
    RunReset,
}

impl EpisodeState {
    /// Start of a fresh run
    pub fn initial(rules: &ProgressionRules) -> Self {
        Self {
            game_level: 1,
            success_count: 0,
            monster_level: 1,
            monster_move_interval_ms: rules.base_interval_ms,
            player_lives: rules.initial_lives,
        }
    }

    /// Kill count that triggers the next level-up
    pub fn success_target(&self, rules: &ProgressionRules) -> u32 {
        self.game_level.saturating_mul(rules.kills_per_level)
    }

    /// Count a destroyed monster and advance at most one level
    pub fn record_kill(&mut self, rules: &ProgressionRules) -> Option<LevelUp> {
        self.success_count += 1;
        if self.success_count < self.success_target(rules) {
            return None;
        }

        self.game_level += 1;
        self.monster_move_interval_ms = self
            .monster_move_interval_ms
            .saturating_sub(rules.interval_step_ms)
            .max(rules.min_interval_ms);

        let new_tier = rules.tier_levels.contains(&self.game_level);
        if new_tier {
            self.monster_level += 1;
            self.monster_move_interval_ms = rules.base_interval_ms;
        }

        log::info!(
            "Level {} reached (score {}, monster level {}, cadence {}ms)",
            self.game_level,
            self.success_count,
            self.monster_level,
            self.monster_move_interval_ms
        );

        Some(LevelUp {
            game_level: self.game_level,
            monster_level: self.monster_level,
            new_tier,
            interval_ms: self.monster_move_interval_ms,
        })
    }

    pub fn death_outcome(&self) -> DeathOutcome {
        if self.player_lives <= 1 {
            DeathOutcome::RunReset
        } else {
            DeathOutcome::LifeLost {
                remaining: self.player_lives - 1,
            }
        }
    }

    /// State the next episode starts from after the player dies
    pub fn after_death(&self, rules: &ProgressionRules) -> Self {
        match self.death_outcome() {
            DeathOutcome::RunReset => Self::initial(rules),
            DeathOutcome::LifeLost { remaining } => Self {
                player_lives: remaining,
                ..*self
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kill_until_level(state: &mut EpisodeState, rules: &ProgressionRules, level: u32) {
        while state.game_level < level {
            let _ = state.record_kill(rules);
        }
    }

    #[test]
    fn test_initial_state() {
        let rules = ProgressionRules::default();
        let state = EpisodeState::initial(&rules);
        assert_eq!(state.game_level, 1);
        assert_eq!(state.success_count, 0);
        assert_eq!(state.monster_level, 1);
        assert_eq!(state.monster_move_interval_ms, 1000);
        assert_eq!(state.player_lives, 3);
    }

    #[test]
    fn test_first_level_up_starts_tier_two() {
        let rules = ProgressionRules::default();
        let mut state = EpisodeState::initial(&rules);

        assert_eq!(state.record_kill(&rules), None);
        assert_eq!(state.success_count, 1);
        assert_eq!(state.game_level, 1);

        let level_up = state.record_kill(&rules).unwrap();
        assert_eq!(level_up.game_level, 2);
        assert!(level_up.new_tier);
        assert_eq!(state.monster_level, 2);
        assert_eq!(state.monster_move_interval_ms, 1000);
    }

    #[test]
    fn test_cadence_speeds_up_within_tier() {
        let rules = ProgressionRules::default();
        let mut state = EpisodeState::initial(&rules);
        kill_until_level(&mut state, &rules, 3);

        assert_eq!(state.success_count, 4);
        assert_eq!(state.monster_level, 2);
        assert_eq!(state.monster_move_interval_ms, 920);

        kill_until_level(&mut state, &rules, 10);
        assert_eq!(state.success_count, 18);
        assert_eq!(state.monster_move_interval_ms, 360);
    }

    #[test]
    fn test_tiers_at_eleven_and_twenty_one() {
        let rules = ProgressionRules::default();
        let mut state = EpisodeState::initial(&rules);

        kill_until_level(&mut state, &rules, 11);
        assert_eq!(state.monster_level, 3);
        assert_eq!(state.monster_move_interval_ms, 1000);

        kill_until_level(&mut state, &rules, 21);
        assert_eq!(state.monster_level, 4);
        assert_eq!(state.monster_move_interval_ms, 1000);
    }

    #[test]
    fn test_cadence_clamped_after_last_tier() {
        let rules = ProgressionRules::default();
        let mut state = EpisodeState::initial(&rules);
        kill_until_level(&mut state, &rules, 31);
        assert_eq!(state.monster_move_interval_ms, 200);

        kill_until_level(&mut state, &rules, 40);
        assert_eq!(state.monster_level, 4);
        assert_eq!(state.monster_move_interval_ms, 200);
    }

    #[test]
    fn test_death_keeps_progress_while_lives_remain() {
        let rules = ProgressionRules::default();
        let mut state = EpisodeState::initial(&rules);
        kill_until_level(&mut state, &rules, 3);

        assert_eq!(
            state.death_outcome(),
            DeathOutcome::LifeLost { remaining: 2 }
        );
        let next = state.after_death(&rules);
        assert_eq!(next.player_lives, 2);
        assert_eq!(next.game_level, 3);
        assert_eq!(next.success_count, 4);
        assert_eq!(next.monster_level, 2);
        assert_eq!(next.monster_move_interval_ms, 920);
    }

    #[test]
    fn test_last_life_resets_run() {
        let rules = ProgressionRules::default();
        let mut state = EpisodeState::initial(&rules);
        kill_until_level(&mut state, &rules, 5);
        state.player_lives = 1;

        assert_eq!(state.death_outcome(), DeathOutcome::RunReset);
        assert_eq!(state.after_death(&rules), EpisodeState::initial(&rules));
    }

    #[test]
    fn test_three_deaths_then_reset() {
        let rules = ProgressionRules::default();
        let mut state = EpisodeState::initial(&rules);
        state = state.after_death(&rules);
        assert_eq!(state.player_lives, 2);
        state = state.after_death(&rules);
        assert_eq!(state.player_lives, 1);
        state = state.after_death(&rules);
        assert_eq!(state, EpisodeState::initial(&rules));
    }
}
