mod reservoir_statistics;

pub use reservoir_statistics::{ReservoirStatistics, StatCounter, StatisticsSnapshot};
