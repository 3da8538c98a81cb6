use crate::level::EntityKind;

use super::collision::Side;
use super::entity::EntityId;
use super::response::CollisionCategory;

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub entity_a: EntityId,
    pub entity_b: EntityId,
    pub kind_a: EntityKind,
    pub kind_b: EntityKind,
    pub category: CollisionCategory,
    /// Side of `entity_a` touched by `entity_b`.
    pub side: Side,
    /// Session clock in seconds when the pair was dispatched.
    pub timestamp: f64,
    pub tick: u64,
}

/// Fixed-capacity ring of the most recent dispatches. Owned by one session.
#[derive(Debug, Clone)]
pub struct CollisionHistory {
    events: Vec<CollisionEvent>,
    capacity: usize,
    head: usize,
}

impl CollisionHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
            head: 0,
        }
    }

    pub fn push(&mut self, event: CollisionEvent) {
        if self.events.len() < self.capacity {
            self.events.push(event);
            return;
        }
        self.events[self.head] = event;
        self.head = (self.head + 1) % self.capacity;
    }

    /// Last `n` events, oldest first.
    pub fn recent_events(&self, n: usize) -> Vec<&CollisionEvent> {
        let skip = self.events.len().saturating_sub(n);
        self.iter().skip(skip).collect()
    }

    /// Every retained event, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &CollisionEvent> + '_ {
        let (newer, older) = self.events.split_at(self.head);
        older.iter().chain(newer.iter())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.head = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(tick: u64) -> CollisionEvent {
        CollisionEvent {
            entity_a: EntityId(1),
            entity_b: EntityId(2),
            kind_a: EntityKind::Player,
            kind_b: EntityKind::Coin,
            category: CollisionCategory::Collect,
            side: Side::Right,
            timestamp: tick as f64 * 0.1,
            tick,
        }
    }

    fn ticks(events: &[&CollisionEvent]) -> Vec<u64> {
        events.iter().map(|event| event.tick).collect()
    }

    #[test]
    fn empty_history_returns_nothing() {
        let history = CollisionHistory::new(4);
        assert!(history.is_empty());
        assert!(history.recent_events(10).is_empty());
    }

    #[test]
    fn overflow_drops_oldest_entries() {
        let mut history = CollisionHistory::new(3);
        for tick in 0..5 {
            history.push(event(tick));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(ticks(&history.recent_events(3)), vec![2, 3, 4]);
        assert_eq!(ticks(&history.recent_events(2)), vec![3, 4]);
        assert_eq!(ticks(&history.recent_events(99)), vec![2, 3, 4]);
    }

    #[test]
    fn never_grows_past_capacity() {
        let mut history = CollisionHistory::new(8);
        for tick in 0..1000 {
            history.push(event(tick));
            assert!(history.len() <= history.capacity());
        }
        assert_eq!(history.iter().last().map(|event| event.tick), Some(999));
        assert_eq!(history.iter().next().map(|event| event.tick), Some(992));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let mut history = CollisionHistory::new(0);
        history.push(event(1));
        history.push(event(2));
        assert_eq!(history.capacity(), 1);
        assert_eq!(ticks(&history.recent_events(5)), vec![2]);
    }

    #[test]
    fn clear_resets_order() {
        let mut history = CollisionHistory::new(2);
        for tick in 0..3 {
            history.push(event(tick));
        }
        history.clear();
        history.push(event(10));
        history.push(event(11));
        assert_eq!(ticks(&history.recent_events(2)), vec![10, 11]);
    }
}
