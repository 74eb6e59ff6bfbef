use chrono::{DateTime, Utc};
use ridesim_geo::location::Coordinate;
use serde::{Deserialize, Serialize};

/// unique within the owning reservoir's lifetime
pub type CommuterId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inbound,
    Outbound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommuterStatus {
    Waiting,
    Boarded,
    Expired,
}

/// a simulated transient rider. created only by the spawn/add path, touched
/// by boarding activity, destroyed by expiration or explicit removal. the
/// reservoir id is a lookup key, not ownership.
#[derive(Debug, Clone, Serialize)]
pub struct Commuter {
    pub id: CommuterId,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub spawned_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub direction: Direction,
    pub status: CommuterStatus,
    pub reservoir_id: String,
}

impl Commuter {
    pub fn new(
        id: CommuterId,
        origin: Coordinate,
        destination: Coordinate,
        direction: Direction,
        reservoir_id: &str,
    ) -> Commuter {
        let now = Utc::now();
        Commuter {
            id,
            origin,
            destination,
            spawned_at: now,
            last_activity: now,
            direction,
            status: CommuterStatus::Waiting,
            reservoir_id: reservoir_id.to_string(),
        }
    }

    /// refreshes the inactivity clock
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}
