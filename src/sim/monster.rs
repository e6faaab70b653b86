//! Monster pursuit and value matching

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::SimRng;
use super::bombs::{Blast, BombManager};
use super::grid::{CellPos, Direction, Grid};
use super::numbers::MonsterValuePolicy;

/// Identifier of one monster incarnation (a respawn gets a new id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(u32);

impl MonsterId {
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// The pursuing enemy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monster {
    pub id: MonsterId,
    /// Committed cell (the destination while in transit)
    pub cell: CellPos,
    /// Chain product required to destroy it
    pub value: u64,
    pub moving: bool,
}

/// Owns the (at most one) live monster and the value policy
#[derive(Debug)]
pub struct MonsterController {
    monster: Option<Monster>,
    next_id: u32,
    policy: Box<dyn MonsterValuePolicy>,
}

impl MonsterController {
    pub fn new(policy: Box<dyn MonsterValuePolicy>) -> Self {
        Self {
            monster: None,
            next_id: 0,
            policy,
        }
    }

    pub fn monster(&self) -> Option<&Monster> {
        self.monster.as_ref()
    }

    pub fn cell(&self) -> Option<CellPos> {
        self.monster.as_ref().map(|m| m.cell)
    }

    pub fn is_at(&self, cell: CellPos) -> bool {
        self.cell() == Some(cell)
    }

    /// Spawn a monster with a freshly generated value, replacing any current one
    pub fn spawn(&mut self, cell: CellPos, monster_level: u32, rng: &mut SimRng) -> &Monster {
        let value = self.policy.generate(monster_level, rng);
        self.spawn_with_value(cell, value)
    }

    /// Spawn a monster with a chosen value
    pub fn spawn_with_value(&mut self, cell: CellPos, value: u64) -> &Monster {
        let id = MonsterId(self.next_id);
        self.next_id += 1;
        log::debug!("Monster {} spawned at {cell} with value {value}", id.0);
        self.monster.insert(Monster {
            id,
            cell,
            value,
            moving: false,
        })
    }

    /// Start one pursuit step toward `target`.
    ///
    /// Returns the committed destination, or `None` when there is no monster,
    /// it is still in transit, or every candidate cell is blocked.
    pub fn step(&mut self, grid: &Grid, bombs: &BombManager, target: CellPos) -> Option<CellPos> {
        let monster = self.monster.as_mut()?;
        if monster.moving {
            return None;
        }
        let destination = plan_step(monster.cell, target, grid, bombs)?;
        monster.cell = destination;
        monster.moving = true;
        log::trace!("Monster {} moving to {destination}", monster.id.0);
        Some(destination)
    }

    /// Finish the transit of monster `id`. Stale ids (a monster destroyed
    /// mid-move) are ignored.
    pub fn arrive(&mut self, id: MonsterId) -> Option<CellPos> {
        let monster = self.monster.as_mut().filter(|m| m.id == id)?;
        monster.moving = false;
        Some(monster.cell)
    }

    /// Apply an explosion effect. Returns the monster if it was destroyed.
    ///
    /// Only an exact match between the blast's chain value and the monster's
    /// value kills; any other value passing through leaves it untouched.
    pub fn resolve_blast(&mut self, blast: &Blast) -> Option<Monster> {
        let hit = self
            .monster
            .as_ref()
            .is_some_and(|m| m.cell == blast.cell && m.value == blast.chain_value);
        if hit { self.monster.take() } else { None }
    }

    /// Hand the value policy over to the next episode
    pub fn into_policy(self) -> Box<dyn MonsterValuePolicy> {
        self.policy
    }
}

/// Axis-aligned unit moves toward `target`, larger delta first (columns on a tie)
pub fn candidate_moves(from: CellPos, target: CellPos) -> Vec<Direction> {
    let delta = target.as_ivec2() - from.as_ivec2();
    let horizontal = Direction::from_delta(IVec2::new(delta.x.signum(), 0));
    let vertical = Direction::from_delta(IVec2::new(0, delta.y.signum()));

    let ordered = if delta.x.abs() >= delta.y.abs() {
        [horizontal, vertical]
    } else {
        [vertical, horizontal]
    };
    ordered.into_iter().flatten().collect()
}

/// First candidate that is in bounds, Empty and free of bombs
pub fn plan_step(
    from: CellPos,
    target: CellPos,
    grid: &Grid,
    bombs: &BombManager,
) -> Option<CellPos> {
    candidate_moves(from, target)
        .into_iter()
        .filter_map(|dir| grid.step(from, dir, 1))
        .find(|cell| grid.is_empty(*cell) && !bombs.is_bomb_at(*cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bombs::FireRange;
    use crate::sim::numbers::ProductOfDraws;
    use crate::sim::schedule::Scheduler;
    use rand::SeedableRng;

    fn controller() -> MonsterController {
        MonsterController::new(Box::new(ProductOfDraws))
    }

    #[test]
    fn test_candidates_prefer_larger_delta() {
        let from = CellPos::new(5, 5);
        assert_eq!(
            candidate_moves(from, CellPos::new(4, 1)),
            vec![Direction::Left, Direction::Up]
        );
        assert_eq!(
            candidate_moves(from, CellPos::new(9, 6)),
            vec![Direction::Down, Direction::Right]
        );
    }

    #[test]
    fn test_candidates_tie_prefers_columns() {
        assert_eq!(
            candidate_moves(CellPos::new(3, 3), CellPos::new(1, 1)),
            vec![Direction::Left, Direction::Up]
        );
    }

    #[test]
    fn test_candidates_single_axis_and_same_cell() {
        assert_eq!(
            candidate_moves(CellPos::new(3, 3), CellPos::new(3, 7)),
            vec![Direction::Right]
        );
        assert!(candidate_moves(CellPos::new(3, 3), CellPos::new(3, 3)).is_empty());
    }

    #[test]
    fn test_plan_falls_back_to_other_axis() {
        // Pillar at (2, 2) blocks the preferred vertical move from (3, 2)
        let grid = Grid::walled(7, 7);
        let from = CellPos::new(3, 2);
        let target = CellPos::new(1, 3);
        assert_eq!(
            plan_step(from, target, &grid, &BombManager::new()),
            Some(CellPos::new(3, 3))
        );
    }

    #[test]
    fn test_plan_avoids_bombs_and_may_stay() {
        let grid = Grid::walled(7, 7);
        let mut bombs = BombManager::new();
        let mut scheduler = Scheduler::new();
        let from = CellPos::new(1, 3);
        let _ = bombs.place(CellPos::new(1, 2), FireRange::DEFAULT, 0, 3000, &mut scheduler);

        // Only candidate is Left, which holds a bomb
        assert_eq!(plan_step(from, CellPos::new(1, 1), &grid, &bombs), None);
    }

    #[test]
    fn test_step_blocked_while_moving() {
        let grid = Grid::walled(7, 7);
        let bombs = BombManager::new();
        let mut monsters = controller();
        let id = monsters.spawn_with_value(CellPos::new(5, 5), 4).id;

        assert_eq!(
            monsters.step(&grid, &bombs, CellPos::new(1, 5)),
            Some(CellPos::new(4, 5))
        );
        assert_eq!(monsters.step(&grid, &bombs, CellPos::new(1, 5)), None);
        assert_eq!(monsters.arrive(id), Some(CellPos::new(4, 5)));
        assert_eq!(
            monsters.step(&grid, &bombs, CellPos::new(1, 5)),
            Some(CellPos::new(3, 5))
        );
    }

    #[test]
    fn test_stale_arrival_ignored() {
        let mut monsters = controller();
        let old = monsters.spawn_with_value(CellPos::new(1, 1), 1).id;
        let _ = monsters.spawn_with_value(CellPos::new(5, 5), 1);
        assert_eq!(monsters.arrive(old), None);
    }

    #[test]
    fn test_only_exact_value_destroys() {
        let mut monsters = controller();
        let cell = CellPos::new(3, 3);
        let _ = monsters.spawn_with_value(cell, 6);

        for chain_value in [5, 7, 3, 2] {
            assert!(monsters.resolve_blast(&Blast { cell, chain_value }).is_none());
        }
        let elsewhere = Blast {
            cell: CellPos::new(3, 4),
            chain_value: 6,
        };
        assert!(monsters.resolve_blast(&elsewhere).is_none());
        assert!(monsters.monster().is_some());

        let killed = monsters.resolve_blast(&Blast {
            cell,
            chain_value: 6,
        });
        assert_eq!(killed.map(|m| m.value), Some(6));
        assert!(monsters.monster().is_none());
    }

    #[test]
    fn test_spawn_uses_policy_level() {
        let mut monsters = controller();
        let mut rng = SimRng::seed_from_u64(9);
        for _ in 0..100 {
            let value = monsters.spawn(CellPos::new(1, 1), 1, &mut rng).value;
            assert!((1..=9).contains(&value));
        }
    }
}
