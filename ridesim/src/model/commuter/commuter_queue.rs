use super::{Commuter, CommuterId};
use std::collections::VecDeque;

/// FIFO commuter container used by depot reservoirs
#[derive(Debug, Default)]
pub struct CommuterQueue {
    queue: VecDeque<Commuter>,
}

impl CommuterQueue {
    pub fn new() -> CommuterQueue {
        CommuterQueue {
            queue: VecDeque::new(),
        }
    }

    pub fn add(&mut self, commuter: Commuter) {
        self.queue.push_back(commuter);
    }

    /// pops the oldest waiting commuter
    pub fn get_next(&mut self) -> Option<Commuter> {
        self.queue.pop_front()
    }

    /// removes by id wherever it sits in the queue. O(n). returns the
    /// removed commuter, or None when the id is already absent, which makes
    /// removal idempotent under boarding/expiration races.
    pub fn take_by_id(&mut self, id: CommuterId) -> Option<Commuter> {
        let index = self.queue.iter().position(|c| c.id == id)?;
        self.queue.remove(index)
    }

    pub fn remove_by_id(&mut self, id: CommuterId) -> bool {
        self.take_by_id(id).is_some()
    }

    /// snapshot in insertion order
    pub fn get_all(&self) -> Vec<Commuter> {
        self.queue.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::CommuterQueue;
    use crate::model::commuter::{Commuter, Direction};
    use ridesim_geo::location::Coordinate;

    fn commuter(id: u64) -> Commuter {
        Commuter::new(
            id,
            Coordinate::new(39.7, -105.0),
            Coordinate::new(39.8, -105.1),
            Direction::Outbound,
            "central",
        )
    }

    #[test]
    fn test_fifo_order_preserved() {
        let mut queue = CommuterQueue::new();
        for id in 0..10 {
            queue.add(commuter(id));
        }
        for expected in 0..10 {
            let next = queue.get_next().expect("queue drained early");
            assert_eq!(next.id, expected);
        }
        assert!(queue.get_next().is_none());
    }

    #[test]
    fn test_remove_by_id_is_idempotent() {
        let mut queue = CommuterQueue::new();
        queue.add(commuter(1));
        queue.add(commuter(2));
        assert!(queue.remove_by_id(1));
        assert!(!queue.remove_by_id(1));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_get_all_is_a_snapshot() {
        let mut queue = CommuterQueue::new();
        queue.add(commuter(1));
        let snapshot = queue.get_all();
        queue.add(commuter(2));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(queue.len(), 2);
    }
}
