//! Bomb lifecycle: placement, fuses, detonation and chain reactions

use serde::{Deserialize, Serialize};

use super::grid::{CellPos, Direction, Grid, Tile};
use super::numbers::ChainContext;
use super::schedule::{Scheduler, Timer, TimerId};
use crate::consts::MAX_FIRE_RANGE;

/// Unique identifier assigned to a bomb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BombId(u32);

impl BombId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Blast radius in cells per direction, 1..=9
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FireRange(u32);

impl FireRange {
    /// Range of the default bomb key
    pub const DEFAULT: FireRange = FireRange(1);

    pub fn new(cells: u32) -> Option<Self> {
        (1..=MAX_FIRE_RANGE).contains(&cells).then_some(Self(cells))
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl Default for FireRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A live bomb waiting for its fuse
#[derive(Debug, Clone)]
pub struct Bomb {
    pub id: BombId,
    pub cell: CellPos,
    pub range: FireRange,
    /// Absolute game time (ms) the fuse runs out
    pub deadline: u64,
    fuse: TimerId,
}

/// Why a placement was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BombRejection {
    /// A live bomb already sits in the cell
    CellOccupied,
    /// Bomb key outside 1..=9
    InvalidRange,
    /// The episode has ended
    EpisodeOver,
}

/// One explosion effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blast {
    pub cell: CellPos,
    pub chain_value: u64,
}

/// Everything one cascade did, in emission order
#[derive(Debug, Clone)]
pub struct Detonation {
    /// Cell of the bomb that started the cascade
    pub origin: CellPos,
    pub chain: ChainContext,
    pub blasts: Vec<Blast>,
    /// Destructible blocks turned Empty
    pub cleared: Vec<CellPos>,
    /// Bombs consumed, starting with the trigger
    pub consumed: Vec<BombId>,
}

impl Detonation {
    /// Effects that landed on `cell`
    pub fn blasts_at(&self, cell: CellPos) -> impl Iterator<Item = &Blast> + '_ {
        self.blasts.iter().filter(move |blast| blast.cell == cell)
    }
}

/// Where a single bomb's rays have got to
#[derive(Debug)]
struct RayCursor {
    origin: CellPos,
    range: u32,
    dir: usize,
    step: u32,
}

impl RayCursor {
    fn new(bomb: &Bomb) -> Self {
        Self {
            origin: bomb.cell,
            range: bomb.range.get(),
            dir: 0,
            step: 0,
        }
    }

    fn next_direction(&mut self) {
        self.dir += 1;
        self.step = 0;
    }
}

/// Owns the live bomb set
#[derive(Debug, Default)]
pub struct BombManager {
    /// Sorted by id (placement order)
    live: Vec<Bomb>,
    next_id: u32,
}

impl BombManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a bomb and arm its fuse for `now + delay_ms`
    pub fn place(
        &mut self,
        cell: CellPos,
        range: FireRange,
        now: u64,
        delay_ms: u64,
        scheduler: &mut Scheduler,
    ) -> Result<BombId, BombRejection> {
        if self.is_bomb_at(cell) {
            return Err(BombRejection::CellOccupied);
        }

        let id = BombId(self.next_id);
        self.next_id += 1;
        let deadline = now.saturating_add(delay_ms);
        let fuse = scheduler.schedule(deadline, Timer::BombFuse(id));
        self.live.push(Bomb {
            id,
            cell,
            range,
            deadline,
            fuse,
        });
        log::debug!("Bomb {} (range {}) placed at {cell}, fuse {deadline}ms", id.0, range.0);
        Ok(id)
    }

    pub fn get(&self, id: BombId) -> Option<&Bomb> {
        self.live.iter().find(|bomb| bomb.id == id)
    }

    pub fn bomb_at(&self, cell: CellPos) -> Option<&Bomb> {
        self.live.iter().find(|bomb| bomb.cell == cell)
    }

    pub fn is_bomb_at(&self, cell: CellPos) -> bool {
        self.bomb_at(cell).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bomb> {
        self.live.iter()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Explode a bomb and everything it chains into.
    ///
    /// Returns `None` if the bomb is no longer live, which makes repeated
    /// calls (own fuse after a chain, two chain paths) harmless. Each bomb
    /// leaves the live set before its rays are walked, so it can be consumed
    /// at most once. Rays are walked depth-first: a chained bomb finishes all
    /// four directions before the bomb that triggered it resumes, and the
    /// shared product applies to everything emitted from then on.
    pub fn detonate(
        &mut self,
        id: BombId,
        grid: &mut Grid,
        scheduler: &mut Scheduler,
    ) -> Option<Detonation> {
        let first = self.take(id, scheduler)?;
        let mut chain = ChainContext::start(first.range.get());
        let mut detonation = Detonation {
            origin: first.cell,
            chain,
            blasts: vec![Blast {
                cell: first.cell,
                chain_value: chain.product(),
            }],
            cleared: Vec::new(),
            consumed: vec![first.id],
        };
        let mut stack = vec![RayCursor::new(&first)];

        while let Some(cursor) = stack.last_mut() {
            let Some(dir) = Direction::ALL.get(cursor.dir).copied() else {
                let _ = stack.pop();
                continue;
            };
            cursor.step += 1;
            if cursor.step > cursor.range {
                cursor.next_direction();
                continue;
            }
            let Some(cell) = grid.step(cursor.origin, dir, cursor.step) else {
                cursor.next_direction();
                continue;
            };

            match grid.tile(cell) {
                Some(Tile::Solid) | None => cursor.next_direction(),
                Some(Tile::Destructible) => {
                    detonation.blasts.push(Blast {
                        cell,
                        chain_value: chain.product(),
                    });
                    if grid.set_empty(cell) {
                        detonation.cleared.push(cell);
                    }
                    cursor.next_direction();
                }
                Some(Tile::Empty) => {
                    detonation.blasts.push(Blast {
                        cell,
                        chain_value: chain.product(),
                    });
                    if let Some(chained) = self.take_at(cell, scheduler) {
                        cursor.next_direction();
                        chain.extend(chained.range.get());
                        detonation.consumed.push(chained.id);
                        detonation.blasts.push(Blast {
                            cell: chained.cell,
                            chain_value: chain.product(),
                        });
                        stack.push(RayCursor::new(&chained));
                    }
                }
            }
        }

        detonation.chain = chain;
        log::debug!(
            "Detonation at {}: {} bomb(s), chain product {}, {} block(s) cleared",
            detonation.origin,
            chain.bombs(),
            chain.product(),
            detonation.cleared.len()
        );
        Some(detonation)
    }

    /// Remove a bomb from the live set and cancel its fuse
    fn take(&mut self, id: BombId, scheduler: &mut Scheduler) -> Option<Bomb> {
        let index = self.live.iter().position(|bomb| bomb.id == id)?;
        let bomb = self.live.remove(index);
        let _ = scheduler.cancel(bomb.fuse);
        Some(bomb)
    }

    fn take_at(&mut self, cell: CellPos, scheduler: &mut Scheduler) -> Option<Bomb> {
        let id = self.bomb_at(cell)?.id;
        self.take(id, scheduler)
    }
}
