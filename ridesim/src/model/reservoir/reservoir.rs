use super::{CommuterStore, ReservoirError};
use crate::model::commuter::{
    Commuter, CommuterId, CommuterQueue, CommuterStatus, Direction, RouteSegmentIndex,
};
use crate::model::event::{CommuterRow, CommuterSink, LifecycleEvent, LifecycleEventKind};
use crate::model::runtime::{
    ExpirationHooks, ExpirationManager, HookError, SpawnHooks, SpawningCoordinator,
};
use crate::model::simulation_config::SimulationConfig;
use crate::model::spawn::{SpawnPlanner, SpawnRequest};
use crate::model::statistics::{ReservoirStatistics, StatCounter, StatisticsSnapshot};
use crate::model::zone::ZoneCatalog;
use chrono::{DateTime, Utc};
use geo::{Distance, Haversine};
use ridesim_geo::assembly::RouteGeometry;
use ridesim_geo::location::{normalize, Coordinate};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// the geography a reservoir serves: a point depot or an assembled route
#[derive(Clone)]
pub enum GeographyKind {
    Depot { location: Coordinate },
    Route { geometry: Arc<RouteGeometry> },
}

impl GeographyKind {
    /// great-circle distance from a coordinate to this geography, meters
    pub fn distance_m(&self, coordinate: &Coordinate) -> f64 {
        match self {
            GeographyKind::Depot { location } => {
                Haversine.distance(location.to_point(), coordinate.to_point())
            }
            GeographyKind::Route { geometry } => geometry.nearest_distance_m(coordinate),
        }
    }
}

/// an externally submitted add request. origin and destination arrive as
/// loose values so callers may use any supported location shape.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AddCommuterRequest {
    pub origin: serde_json::Value,
    pub destination: serde_json::Value,
    pub direction: Direction,
}

struct ReservoirState {
    store: CommuterStore,
    statistics: ReservoirStatistics,
    next_id: CommuterId,
}

/// shared interior of a reservoir: the state lock, the event channel, the
/// sink, and the spawn planner. implements both periodic-manager hook
/// traits by delegating to its own container and statistics. the lock is
/// never held across an await point.
struct ReservoirCore {
    id: String,
    kind: GeographyKind,
    state: Mutex<ReservoirState>,
    events: broadcast::Sender<LifecycleEvent>,
    sink: Arc<dyn CommuterSink>,
    planner: SpawnPlanner,
}

impl ReservoirCore {
    fn add_commuter(&self, request: &AddCommuterRequest) -> Result<CommuterId, ReservoirError> {
        let origin = normalize(&request.origin)?;
        let destination = normalize(&request.destination)?;
        self.insert_commuter(origin, destination, request.direction, "added")
    }

    fn insert_commuter(
        &self,
        origin: Coordinate,
        destination: Coordinate,
        direction: Direction,
        reason: &str,
    ) -> Result<CommuterId, ReservoirError> {
        let commuter = {
            let mut state = self.state.lock().expect("reservoir state lock poisoned");
            let id = state.next_id;
            let commuter = Commuter::new(id, origin, destination, direction, &self.id);
            state.store.insert(commuter.clone())?;
            state.next_id += 1;
            state.statistics.increment(StatCounter::TotalCommutersAdded);
            state
                .statistics
                .increment(StatCounter::CurrentActiveCommuters);
            commuter
        };
        // a failed add must leave no live commuter behind: unwind the
        // insert and its counters before surfacing the sink error
        if let Err(e) = self.persist(&commuter) {
            let mut state = self.state.lock().expect("reservoir state lock poisoned");
            state.store.take_by_id(commuter.id);
            state.statistics.decrement(StatCounter::TotalCommutersAdded);
            state
                .statistics
                .decrement(StatCounter::CurrentActiveCommuters);
            return Err(e);
        }
        self.emit(LifecycleEventKind::CommuterAdded, commuter.id, reason);
        Ok(commuter.id)
    }

    /// idempotent: Ok(false) when the id is already gone, so boarding and
    /// expiration racing on the same commuter cannot double-count
    fn remove_commuter(&self, id: CommuterId) -> Result<bool, ReservoirError> {
        let removed = {
            let mut state = self.state.lock().expect("reservoir state lock poisoned");
            let removed = state.store.take_by_id(id);
            if removed.is_some() {
                state
                    .statistics
                    .increment(StatCounter::TotalCommutersRemoved);
                state
                    .statistics
                    .decrement(StatCounter::CurrentActiveCommuters);
            }
            removed
        };
        match removed {
            Some(mut commuter) => {
                commuter.touch();
                self.persist_best_effort(&commuter);
                self.emit(LifecycleEventKind::CommuterRemoved, id, "removed");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// matches the oldest waiting commuter near a boarding location and
    /// marks it boarded. depots pop their single queue; routes match the
    /// nearest grid cell in the requested direction.
    fn board_commuter(
        &self,
        location: &serde_json::Value,
        direction: Direction,
    ) -> Result<Option<Commuter>, ReservoirError> {
        let at = normalize(location)?;
        let boarded = {
            let mut state = self.state.lock().expect("reservoir state lock poisoned");
            let boarded = state.store.next(Some(&at), direction);
            if boarded.is_some() {
                state
                    .statistics
                    .increment(StatCounter::TotalCommutersRemoved);
                state
                    .statistics
                    .decrement(StatCounter::CurrentActiveCommuters);
            }
            boarded
        };
        match boarded {
            Some(mut commuter) => {
                commuter.status = CommuterStatus::Boarded;
                commuter.touch();
                self.persist_best_effort(&commuter);
                self.emit(LifecycleEventKind::CommuterRemoved, commuter.id, "boarded");
                Ok(Some(commuter))
            }
            None => Ok(None),
        }
    }

    fn expire_commuter(&self, id: CommuterId) -> Result<bool, ReservoirError> {
        let expired = {
            let mut state = self.state.lock().expect("reservoir state lock poisoned");
            let expired = state.store.take_by_id(id);
            if expired.is_some() {
                state
                    .statistics
                    .increment(StatCounter::TotalCommutersExpired);
                state
                    .statistics
                    .decrement(StatCounter::CurrentActiveCommuters);
            }
            expired
        };
        match expired {
            Some(mut commuter) => {
                commuter.status = CommuterStatus::Expired;
                self.persist_best_effort(&commuter);
                self.emit(LifecycleEventKind::CommuterExpired, id, "inactivity");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn get_stats(&self) -> StatisticsSnapshot {
        self.state
            .lock()
            .expect("reservoir state lock poisoned")
            .statistics
            .snapshot()
    }

    fn active_count(&self) -> usize {
        self.state
            .lock()
            .expect("reservoir state lock poisoned")
            .store
            .len()
    }

    fn persist(&self, commuter: &Commuter) -> Result<(), ReservoirError> {
        let (route_id, depot_id) = match &self.kind {
            GeographyKind::Depot { .. } => (None, Some(self.id.as_str())),
            GeographyKind::Route { .. } => (Some(self.id.as_str()), None),
        };
        let row = CommuterRow::from_commuter(commuter, route_id, depot_id);
        self.sink.upsert(row)?;
        Ok(())
    }

    /// departure-side transitions already took effect in the container, so
    /// the row write cannot contradict them; a sink failure here only
    /// leaves the persisted row one status behind
    fn persist_best_effort(&self, commuter: &Commuter) {
        if let Err(e) = self.persist(commuter) {
            log::warn!(
                "failed to persist commuter {} in reservoir {}: {e}",
                commuter.id,
                self.id
            );
        }
    }

    fn emit(&self, kind: LifecycleEventKind, commuter_id: CommuterId, reason: &str) {
        // send only fails with no live subscribers, which is fine
        let _ = self
            .events
            .send(LifecycleEvent::new(kind, commuter_id, &self.id, reason));
    }
}

impl ExpirationHooks for ReservoirCore {
    fn active_commuters(&self) -> Vec<(CommuterId, DateTime<Utc>)> {
        let state = self.state.lock().expect("reservoir state lock poisoned");
        state
            .store
            .get_all()
            .into_iter()
            .filter(|c| c.status == CommuterStatus::Waiting)
            .map(|c| (c.id, c.last_activity))
            .collect()
    }

    fn expire(&self, id: CommuterId) -> Result<(), HookError> {
        self.expire_commuter(id)?;
        Ok(())
    }
}

impl SpawnHooks for ReservoirCore {
    fn generate_requests(&self) -> Result<Vec<SpawnRequest>, HookError> {
        let requests = match self.planner.generate(Utc::now()) {
            Ok(requests) => requests,
            Err(e) => {
                // a broken zone catalog must show up in get_stats(), not
                // just the log
                let mut state = self.state.lock().expect("reservoir state lock poisoned");
                state.statistics.increment(StatCounter::TotalSpawnsFailed);
                return Err(e.into());
            }
        };
        let mut state = self.state.lock().expect("reservoir state lock poisoned");
        for _ in requests.iter() {
            state.statistics.increment(StatCounter::TotalSpawnsRequested);
        }
        Ok(requests)
    }

    fn process_request(&self, request: SpawnRequest) -> Result<(), HookError> {
        let result = self.insert_commuter(
            request.origin,
            request.destination,
            request.direction,
            "spawned",
        );
        let mut state = self.state.lock().expect("reservoir state lock poisoned");
        match result {
            Ok(_) => {
                state
                    .statistics
                    .increment(StatCounter::TotalSpawnsSuccessful);
                Ok(())
            }
            Err(e) => {
                state.statistics.increment(StatCounter::TotalSpawnsFailed);
                Err(e.into())
            }
        }
    }
}

/// one depot's or one route's commuter population: the ownership container,
/// its statistics, and the two periodic loops. instances are fully isolated
/// from each other; a [super::FleetCoordinator] owns the id-to-instance map.
pub struct Reservoir {
    core: Arc<ReservoirCore>,
    expiration: ExpirationManager,
    spawning: SpawningCoordinator,
}

impl Reservoir {
    pub fn depot(
        id: &str,
        location: Coordinate,
        zones: Arc<dyn ZoneCatalog>,
        config: &SimulationConfig,
        sink: Arc<dyn CommuterSink>,
        events: broadcast::Sender<LifecycleEvent>,
    ) -> Reservoir {
        let store = CommuterStore::Depot(CommuterQueue::new());
        let kind = GeographyKind::Depot { location };
        Reservoir::build(id, kind, store, zones, config, sink, events)
    }

    pub fn route(
        id: &str,
        geometry: Arc<RouteGeometry>,
        zones: Arc<dyn ZoneCatalog>,
        config: &SimulationConfig,
        sink: Arc<dyn CommuterSink>,
        events: broadcast::Sender<LifecycleEvent>,
    ) -> Reservoir {
        let index = RouteSegmentIndex::from_geometry(&geometry, config.proximity_threshold_m);
        let store = CommuterStore::Route(Box::new(index));
        let kind = GeographyKind::Route { geometry };
        Reservoir::build(id, kind, store, zones, config, sink, events)
    }

    fn build(
        id: &str,
        kind: GeographyKind,
        store: CommuterStore,
        catalog: Arc<dyn ZoneCatalog>,
        config: &SimulationConfig,
        sink: Arc<dyn CommuterSink>,
        events: broadcast::Sender<LifecycleEvent>,
    ) -> Reservoir {
        let planner = match config.rng_seed {
            Some(seed) => SpawnPlanner::with_seed(
                catalog,
                config.base_coefficient,
                config.spawn_window_minutes,
                // decorrelate reservoirs sharing one configured seed
                seed ^ hash_id(id),
            ),
            None => SpawnPlanner::new(
                catalog,
                config.base_coefficient,
                config.spawn_window_minutes,
            ),
        };
        let core = Arc::new(ReservoirCore {
            id: id.to_string(),
            kind,
            state: Mutex::new(ReservoirState {
                store,
                statistics: ReservoirStatistics::new(),
                next_id: 1,
            }),
            events,
            sink,
            planner,
        });
        let expiration = ExpirationManager::new(
            config.check_interval(),
            config.inactivity_threshold(),
            core.clone(),
        );
        let spawning = SpawningCoordinator::new(config.spawn_interval(), core.clone());
        Reservoir {
            core,
            expiration,
            spawning,
        }
    }

    pub fn id(&self) -> &str {
        &self.core.id
    }

    pub fn kind(&self) -> &GeographyKind {
        &self.core.kind
    }

    pub fn add_commuter(&self, request: &AddCommuterRequest) -> Result<CommuterId, ReservoirError> {
        self.core.add_commuter(request)
    }

    pub fn remove_commuter(&self, id: CommuterId) -> Result<bool, ReservoirError> {
        self.core.remove_commuter(id)
    }

    pub fn board_commuter(
        &self,
        location: &serde_json::Value,
        direction: Direction,
    ) -> Result<Option<Commuter>, ReservoirError> {
        self.core.board_commuter(location, direction)
    }

    pub fn get_stats(&self) -> StatisticsSnapshot {
        self.core.get_stats()
    }

    pub fn active_count(&self) -> usize {
        self.core.active_count()
    }

    /// starts both periodic loops
    pub fn start(&self) {
        self.expiration.start();
        self.spawning.start();
    }

    /// stops both loops; safe to call repeatedly
    pub async fn stop(&self) {
        self.expiration.stop().await;
        self.spawning.stop().await;
    }

    pub fn is_running(&self) -> bool {
        self.expiration.is_running() || self.spawning.is_running()
    }
}

fn hash_id(id: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    hasher.finish()
}
