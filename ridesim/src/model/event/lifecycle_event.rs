use crate::model::commuter::CommuterId;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEventKind {
    CommuterAdded,
    CommuterRemoved,
    CommuterExpired,
}

/// published on the real-time broadcast channel for any subscriber; also
/// the record printed by the streaming feed as line-delimited JSON.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleEvent {
    pub kind: LifecycleEventKind,
    pub commuter_id: CommuterId,
    pub reservoir_id: String,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

impl LifecycleEvent {
    pub fn new(
        kind: LifecycleEventKind,
        commuter_id: CommuterId,
        reservoir_id: &str,
        reason: &str,
    ) -> LifecycleEvent {
        LifecycleEvent {
            kind,
            commuter_id,
            reservoir_id: reservoir_id.to_string(),
            timestamp: Utc::now(),
            reason: reason.to_string(),
        }
    }
}
