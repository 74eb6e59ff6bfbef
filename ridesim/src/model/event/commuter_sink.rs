use crate::model::commuter::{Commuter, CommuterId, CommuterStatus, Direction};
use chrono::{DateTime, Utc};
use ridesim_geo::location::Coordinate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Mutex;

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("failure writing to commuter sink: {0}")]
    WriteError(String),
    #[error("failure reading from commuter sink: {0}")]
    ReadError(String),
}

/// persisted commuter state, one row per commuter per reservoir. rows stay
/// queryable after boarding or expiration so the console tool can look at
/// historical windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommuterRow {
    pub commuter_id: CommuterId,
    pub reservoir_id: String,
    #[serde(default)]
    pub route_id: Option<String>,
    #[serde(default)]
    pub depot_id: Option<String>,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub direction: Direction,
    pub status: CommuterStatus,
    pub spawned_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl CommuterRow {
    pub fn from_commuter(
        commuter: &Commuter,
        route_id: Option<&str>,
        depot_id: Option<&str>,
    ) -> CommuterRow {
        CommuterRow {
            commuter_id: commuter.id,
            reservoir_id: commuter.reservoir_id.clone(),
            route_id: route_id.map(str::to_string),
            depot_id: depot_id.map(str::to_string),
            origin: commuter.origin,
            destination: commuter.destination,
            direction: commuter.direction,
            status: commuter.status,
            spawned_at: commuter.spawned_at,
            last_activity: commuter.last_activity,
        }
    }
}

/// query filters used by the external console tool
#[derive(Debug, Clone, Default)]
pub struct CommuterFilter {
    pub route_id: Option<String>,
    pub depot_id: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl CommuterFilter {
    pub fn matches(&self, row: &CommuterRow) -> bool {
        if let Some(route_id) = &self.route_id {
            if row.route_id.as_deref() != Some(route_id.as_str()) {
                return false;
            }
        }
        if let Some(depot_id) = &self.depot_id {
            if row.depot_id.as_deref() != Some(depot_id.as_str()) {
                return false;
            }
        }
        if let Some(since) = &self.since {
            if row.spawned_at < *since {
                return false;
            }
        }
        if let Some(until) = &self.until {
            if row.spawned_at > *until {
                return false;
            }
        }
        true
    }
}

/// write side of commuter persistence. the core upserts on every lifecycle
/// transition; queries serve the external console tool.
pub trait CommuterSink: Send + Sync {
    fn upsert(&self, row: CommuterRow) -> Result<(), SinkError>;

    fn query(&self, filter: &CommuterFilter) -> Result<Vec<CommuterRow>, SinkError>;
}

/// sink backed by an in-memory map, dumpable to a JSON file for offline
/// inspection. ids are unique per reservoir, so rows key on both.
#[derive(Default)]
pub struct InMemoryCommuterSink {
    rows: Mutex<HashMap<(String, CommuterId), CommuterRow>>,
}

impl InMemoryCommuterSink {
    pub fn new() -> InMemoryCommuterSink {
        InMemoryCommuterSink::default()
    }

    pub fn dump_json<P: AsRef<Path>>(&self, path: P) -> Result<usize, SinkError> {
        let path = path.as_ref();
        let rows: Vec<CommuterRow> = {
            let guard = self.rows.lock().expect("commuter sink lock poisoned");
            guard.values().cloned().collect()
        };
        let file = File::create(path)
            .map_err(|e| SinkError::WriteError(format!("failed to create {path:?}: {e}")))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &rows)
            .map_err(|e| SinkError::WriteError(format!("failed to serialize rows: {e}")))?;
        Ok(rows.len())
    }
}

impl CommuterSink for InMemoryCommuterSink {
    fn upsert(&self, row: CommuterRow) -> Result<(), SinkError> {
        let mut rows = self.rows.lock().expect("commuter sink lock poisoned");
        rows.insert((row.reservoir_id.clone(), row.commuter_id), row);
        Ok(())
    }

    fn query(&self, filter: &CommuterFilter) -> Result<Vec<CommuterRow>, SinkError> {
        let rows = self.rows.lock().expect("commuter sink lock poisoned");
        let mut matching: Vec<CommuterRow> = rows
            .values()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            a.spawned_at
                .cmp(&b.spawned_at)
                .then(a.commuter_id.cmp(&b.commuter_id))
        });
        Ok(matching)
    }
}

/// reads rows dumped by [InMemoryCommuterSink::dump_json]
pub fn load_rows_json<P: AsRef<Path>>(path: P) -> Result<Vec<CommuterRow>, SinkError> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| SinkError::ReadError(format!("failed to open {path:?}: {e}")))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| SinkError::ReadError(format!("failed to parse {path:?}: {e}")))
}
