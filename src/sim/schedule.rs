//! Discrete-event scheduler
//!
//! Timers are ordered by fire time, then by the order they were scheduled.
//! Cancelling removes the entry from the queue, so a cancelled timer can
//! never fire.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::bombs::BombId;
use super::monster::MonsterId;

/// Handle returned by [`Scheduler::schedule`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Things that happen later in game time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// A bomb's fuse ran out
    BombFuse(BombId),
    /// Recurring monster movement
    MonsterStep,
    /// Replacement monster after a kill
    MonsterSpawn,
    /// Player finished a cell-to-cell move
    PlayerArrive,
    /// Monster finished a cell-to-cell move
    MonsterArrive(MonsterId),
}

#[derive(Debug, Clone)]
struct Entry {
    at: u64,
    id: TimerId,
    timer: Timer,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.id == other.id
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: BinaryHeap is a max-heap and we want the earliest entry on top
    fn cmp(&self, other: &Self) -> Ordering {
        other.at.cmp(&self.at).then_with(|| other.id.cmp(&self.id))
    }
}

/// Priority queue of pending timers keyed by absolute game time (ms)
#[derive(Debug, Default)]
pub struct Scheduler {
    heap: BinaryHeap<Entry>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `timer` to fire at absolute time `at`
    pub fn schedule(&mut self, at: u64, timer: Timer) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.heap.push(Entry { at, id, timer });
        id
    }

    /// Remove a pending timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.heap.len();
        self.heap.retain(|entry| entry.id != id);
        self.heap.len() != before
    }

    /// Pop the earliest timer if it is due at or before `now`
    pub fn pop_due(&mut self, now: u64) -> Option<(u64, Timer)> {
        if self.heap.peek()?.at > now {
            return None;
        }
        self.heap.pop().map(|entry| (entry.at, entry.timer))
    }

    /// Fire time of the earliest pending timer
    pub fn next_due(&self) -> Option<u64> {
        self.heap.peek().map(|entry| entry.at)
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.heap.iter().any(|entry| entry.id == id)
    }

    /// Fire time of a pending timer
    pub fn deadline(&self, id: TimerId) -> Option<u64> {
        self.heap.iter().find(|entry| entry.id == id).map(|entry| entry.at)
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_time_order() {
        let mut scheduler = Scheduler::new();
        let _ = scheduler.schedule(300, Timer::MonsterStep);
        let _ = scheduler.schedule(100, Timer::PlayerArrive);
        let _ = scheduler.schedule(200, Timer::MonsterSpawn);

        assert_eq!(scheduler.next_due(), Some(100));
        assert_eq!(scheduler.pop_due(1000), Some((100, Timer::PlayerArrive)));
        assert_eq!(scheduler.pop_due(1000), Some((200, Timer::MonsterSpawn)));
        assert_eq!(scheduler.pop_due(1000), Some((300, Timer::MonsterStep)));
        assert_eq!(scheduler.pop_due(1000), None);
    }

    #[test]
    fn test_same_time_is_fifo() {
        let mut scheduler = Scheduler::new();
        let _ = scheduler.schedule(50, Timer::BombFuse(BombId::new(2)));
        let _ = scheduler.schedule(50, Timer::BombFuse(BombId::new(1)));

        assert_eq!(
            scheduler.pop_due(50),
            Some((50, Timer::BombFuse(BombId::new(2))))
        );
        assert_eq!(
            scheduler.pop_due(50),
            Some((50, Timer::BombFuse(BombId::new(1))))
        );
    }

    #[test]
    fn test_not_due_yet() {
        let mut scheduler = Scheduler::new();
        let _ = scheduler.schedule(500, Timer::MonsterStep);
        assert_eq!(scheduler.pop_due(499), None);
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.pop_due(500), Some((500, Timer::MonsterStep)));
    }

    #[test]
    fn test_cancel_removes_entry() {
        let mut scheduler = Scheduler::new();
        let fuse = scheduler.schedule(100, Timer::BombFuse(BombId::new(1)));
        let step = scheduler.schedule(200, Timer::MonsterStep);

        assert!(scheduler.contains(fuse));
        assert_eq!(scheduler.deadline(fuse), Some(100));
        assert!(scheduler.cancel(fuse));
        assert!(!scheduler.cancel(fuse));
        assert!(!scheduler.contains(fuse));
        assert!(scheduler.contains(step));
        assert_eq!(scheduler.pop_due(1000), Some((200, Timer::MonsterStep)));
        assert!(scheduler.is_empty());
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut scheduler = Scheduler::new();
        for at in 0..10 {
            let _ = scheduler.schedule(at, Timer::MonsterStep);
        }
        scheduler.clear();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.pop_due(u64::MAX), None);
    }
}
