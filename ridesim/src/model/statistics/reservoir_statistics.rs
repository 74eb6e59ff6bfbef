use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatCounter {
    TotalCommutersAdded,
    TotalCommutersRemoved,
    TotalCommutersExpired,
    TotalSpawnsRequested,
    TotalSpawnsSuccessful,
    TotalSpawnsFailed,
    CurrentActiveCommuters,
}

/// named integer counters for one reservoir. `CurrentActiveCommuters` must
/// always equal the live count in the owning queue/index; the reservoir is
/// responsible for keeping the two in step.
#[derive(Debug, Default)]
pub struct ReservoirStatistics {
    counters: HashMap<StatCounter, i64>,
}

impl ReservoirStatistics {
    pub fn new() -> ReservoirStatistics {
        ReservoirStatistics {
            counters: HashMap::new(),
        }
    }

    pub fn get(&self, counter: StatCounter) -> i64 {
        self.counters.get(&counter).copied().unwrap_or(0)
    }

    pub fn set(&mut self, counter: StatCounter, value: i64) {
        self.counters.insert(counter, value);
    }

    pub fn increment(&mut self, counter: StatCounter) {
        *self.counters.entry(counter).or_insert(0) += 1;
    }

    pub fn decrement(&mut self, counter: StatCounter) {
        *self.counters.entry(counter).or_insert(0) -= 1;
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        let requested = self.get(StatCounter::TotalSpawnsRequested);
        let successful = self.get(StatCounter::TotalSpawnsSuccessful);
        let spawn_success_rate = if requested == 0 {
            0.0
        } else {
            successful as f64 / requested as f64
        };
        StatisticsSnapshot {
            total_commuters_added: self.get(StatCounter::TotalCommutersAdded),
            total_commuters_removed: self.get(StatCounter::TotalCommutersRemoved),
            total_commuters_expired: self.get(StatCounter::TotalCommutersExpired),
            total_spawns_requested: requested,
            total_spawns_successful: successful,
            total_spawns_failed: self.get(StatCounter::TotalSpawnsFailed),
            current_active_commuters: self.get(StatCounter::CurrentActiveCommuters),
            spawn_success_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    pub total_commuters_added: i64,
    pub total_commuters_removed: i64,
    pub total_commuters_expired: i64,
    pub total_spawns_requested: i64,
    pub total_spawns_successful: i64,
    pub total_spawns_failed: i64,
    pub current_active_commuters: i64,
    pub spawn_success_rate: f64,
}

#[cfg(test)]
mod test {
    use super::{ReservoirStatistics, StatCounter};

    #[test]
    fn test_counters_start_at_zero() {
        let stats = ReservoirStatistics::new();
        assert_eq!(stats.get(StatCounter::TotalCommutersAdded), 0);
        assert_eq!(stats.snapshot().spawn_success_rate, 0.0);
    }

    #[test]
    fn test_increment_decrement_set() {
        let mut stats = ReservoirStatistics::new();
        stats.increment(StatCounter::CurrentActiveCommuters);
        stats.increment(StatCounter::CurrentActiveCommuters);
        stats.decrement(StatCounter::CurrentActiveCommuters);
        assert_eq!(stats.get(StatCounter::CurrentActiveCommuters), 1);
        stats.set(StatCounter::TotalSpawnsFailed, 7);
        assert_eq!(stats.get(StatCounter::TotalSpawnsFailed), 7);
    }

    #[test]
    fn test_spawn_success_rate_derivation() {
        let mut stats = ReservoirStatistics::new();
        stats.set(StatCounter::TotalSpawnsRequested, 8);
        stats.set(StatCounter::TotalSpawnsSuccessful, 6);
        let snapshot = stats.snapshot();
        assert!((snapshot.spawn_success_rate - 0.75).abs() < f64::EPSILON);
    }
}
