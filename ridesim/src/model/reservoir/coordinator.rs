use super::{AddCommuterRequest, GeographyKind, Reservoir, ReservoirError};
use crate::model::commuter::{Commuter, CommuterId, Direction};
use crate::model::event::{CommuterSink, LifecycleEvent};
use crate::model::simulation_config::SimulationConfig;
use crate::model::statistics::StatisticsSnapshot;
use crate::model::zone::{InMemoryZoneCatalog, Zone};
use itertools::Itertools;
use ridesim_geo::assembly::RouteGeometry;
use ridesim_geo::location::Coordinate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// assigns each zone to the nearest geography by centroid distance. every
/// geography gets an entry, empty when nothing lands nearby. ties go to the
/// earlier entry in the slice.
///
/// the mapping is fixed when a reservoir is activated: spawn origins are
/// jittered around the zone centroid, so an individual origin may land
/// closer to another geography and still spawn in the reservoir its zone
/// was assigned to.
pub fn partition_zones(
    zones: &[Zone],
    geographies: &[(String, GeographyKind)],
) -> HashMap<String, Vec<Zone>> {
    let mut assignments: HashMap<String, Vec<Zone>> = geographies
        .iter()
        .map(|(id, _)| (id.clone(), vec![]))
        .collect();
    for zone in zones.iter() {
        let nearest = geographies
            .iter()
            .map(|(id, kind)| (id, kind.distance_m(&zone.centroid)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((id, _)) = nearest {
            assignments
                .entry(id.clone())
                .or_default()
                .push(zone.clone());
        }
    }
    assignments
}

/// owns the id-to-reservoir map for a whole fleet. reservoirs never talk to
/// each other; the coordinator is the only place that knows more than one
/// exists. all reservoirs share one sink and one lifecycle event channel.
pub struct FleetCoordinator {
    config: SimulationConfig,
    sink: Arc<dyn CommuterSink>,
    events: broadcast::Sender<LifecycleEvent>,
    reservoirs: Mutex<HashMap<String, Arc<Reservoir>>>,
}

impl FleetCoordinator {
    pub fn new(config: SimulationConfig, sink: Arc<dyn CommuterSink>) -> FleetCoordinator {
        let (events, _) = broadcast::channel(config.event_channel_capacity);
        FleetCoordinator {
            config,
            sink,
            events,
            reservoirs: Mutex::new(HashMap::new()),
        }
    }

    /// subscribers see lifecycle events from every active reservoir
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.events.subscribe()
    }

    /// builds, registers, and starts a depot reservoir. re-activating an
    /// id returns the already-running instance untouched.
    pub fn activate_depot(
        &self,
        id: &str,
        location: Coordinate,
        zones: Vec<Zone>,
    ) -> Arc<Reservoir> {
        let reservoir = Reservoir::depot(
            id,
            location,
            Arc::new(InMemoryZoneCatalog::new(zones)),
            &self.config,
            self.sink.clone(),
            self.events.clone(),
        );
        self.register(id, reservoir)
    }

    /// builds, registers, and starts a route reservoir over an assembled
    /// geometry
    pub fn activate_route(
        &self,
        id: &str,
        geometry: Arc<RouteGeometry>,
        zones: Vec<Zone>,
    ) -> Arc<Reservoir> {
        let reservoir = Reservoir::route(
            id,
            geometry,
            Arc::new(InMemoryZoneCatalog::new(zones)),
            &self.config,
            self.sink.clone(),
            self.events.clone(),
        );
        self.register(id, reservoir)
    }

    fn register(&self, id: &str, reservoir: Reservoir) -> Arc<Reservoir> {
        let mut reservoirs = self.reservoirs.lock().expect("fleet map lock poisoned");
        if let Some(existing) = reservoirs.get(id) {
            log::warn!("reservoir {id} is already active, keeping the running instance");
            return existing.clone();
        }
        let reservoir = Arc::new(reservoir);
        reservoir.start();
        log::info!("activated reservoir {id}");
        reservoirs.insert(id.to_string(), reservoir.clone());
        reservoir
    }

    /// stops and drops a reservoir. false when the id was never active.
    pub async fn deactivate(&self, id: &str) -> bool {
        let reservoir = {
            let mut reservoirs = self.reservoirs.lock().expect("fleet map lock poisoned");
            reservoirs.remove(id)
        };
        match reservoir {
            Some(reservoir) => {
                reservoir.stop().await;
                log::info!("deactivated reservoir {id}");
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Reservoir>> {
        self.reservoirs
            .lock()
            .expect("fleet map lock poisoned")
            .get(id)
            .cloned()
    }

    pub fn active_ids(&self) -> Vec<String> {
        self.reservoirs
            .lock()
            .expect("fleet map lock poisoned")
            .keys()
            .cloned()
            .sorted()
            .collect()
    }

    pub fn add_commuter(
        &self,
        reservoir_id: &str,
        request: &AddCommuterRequest,
    ) -> Result<CommuterId, ReservoirError> {
        self.require(reservoir_id)?.add_commuter(request)
    }

    pub fn remove_commuter(
        &self,
        reservoir_id: &str,
        id: CommuterId,
    ) -> Result<bool, ReservoirError> {
        self.require(reservoir_id)?.remove_commuter(id)
    }

    pub fn board_commuter(
        &self,
        reservoir_id: &str,
        location: &serde_json::Value,
        direction: Direction,
    ) -> Result<Option<Commuter>, ReservoirError> {
        self.require(reservoir_id)?.board_commuter(location, direction)
    }

    pub fn get_stats(&self, reservoir_id: &str) -> Result<StatisticsSnapshot, ReservoirError> {
        Ok(self.require(reservoir_id)?.get_stats())
    }

    /// per-reservoir snapshots in id order
    pub fn all_stats(&self) -> Vec<(String, StatisticsSnapshot)> {
        let reservoirs = self.reservoirs.lock().expect("fleet map lock poisoned");
        reservoirs
            .iter()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .map(|(id, reservoir)| (id.clone(), reservoir.get_stats()))
            .collect()
    }

    /// stops every reservoir and clears the map
    pub async fn shutdown(&self) {
        let drained: Vec<Arc<Reservoir>> = {
            let mut reservoirs = self.reservoirs.lock().expect("fleet map lock poisoned");
            reservoirs.drain().map(|(_, r)| r).collect()
        };
        for reservoir in drained {
            reservoir.stop().await;
        }
    }

    fn require(&self, reservoir_id: &str) -> Result<Arc<Reservoir>, ReservoirError> {
        self.get(reservoir_id)
            .ok_or_else(|| ReservoirError::UnknownReservoir(reservoir_id.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::{partition_zones, FleetCoordinator, GeographyKind};
    use crate::model::commuter::Direction;
    use crate::model::event::InMemoryCommuterSink;
    use crate::model::reservoir::{AddCommuterRequest, ReservoirError};
    use crate::model::simulation_config::SimulationConfig;
    use crate::model::zone::{Zone, ZoneType};
    use ridesim_geo::location::Coordinate;
    use serde_json::json;
    use std::sync::Arc;

    fn coordinator() -> FleetCoordinator {
        FleetCoordinator::new(
            SimulationConfig::default(),
            Arc::new(InMemoryCommuterSink::new()),
        )
    }

    fn zone(id: &str, lat: f64, lon: f64) -> Zone {
        Zone {
            id: id.to_string(),
            centroid: Coordinate::new(lat, lon),
            radius_m: 400.0,
            density_per_km2: 1000.0,
            zone_type: ZoneType::Residential,
            weights: Default::default(),
        }
    }

    #[test]
    fn test_partition_assigns_zone_to_nearest_geography() {
        let geographies = vec![
            (
                "north".to_string(),
                GeographyKind::Depot {
                    location: Coordinate::new(39.80, -105.00),
                },
            ),
            (
                "south".to_string(),
                GeographyKind::Depot {
                    location: Coordinate::new(39.60, -105.00),
                },
            ),
        ];
        let zones = vec![
            zone("uptown", 39.79, -105.01),
            zone("downtown", 39.61, -104.99),
            zone("midtown", 39.62, -105.00),
        ];
        let assignments = partition_zones(&zones, &geographies);
        let north: Vec<&str> = assignments["north"].iter().map(|z| z.id.as_str()).collect();
        let south: Vec<&str> = assignments["south"].iter().map(|z| z.id.as_str()).collect();
        assert_eq!(north, vec!["uptown"]);
        assert_eq!(south, vec!["downtown", "midtown"]);
    }

    #[test]
    fn test_partition_with_no_zones_still_covers_every_geography() {
        let geographies = vec![(
            "lone".to_string(),
            GeographyKind::Depot {
                location: Coordinate::new(39.75, -105.00),
            },
        )];
        let assignments = partition_zones(&[], &geographies);
        assert_eq!(assignments.len(), 1);
        assert!(assignments["lone"].is_empty());
    }

    #[tokio::test]
    async fn test_activate_deactivate_lifecycle() {
        let coordinator = coordinator();
        let depot = coordinator.activate_depot(
            "union-station",
            Coordinate::new(39.7525, -105.0003),
            vec![],
        );
        assert!(depot.is_running());
        assert_eq!(coordinator.active_ids(), vec!["union-station".to_string()]);

        assert!(coordinator.deactivate("union-station").await);
        assert!(!depot.is_running());
        assert!(coordinator.active_ids().is_empty());
        // a second deactivate finds nothing
        assert!(!coordinator.deactivate("union-station").await);
        coordinator.shutdown().await;
    }

    #[tokio::test]
    async fn test_reactivation_keeps_the_running_instance() {
        let coordinator = coordinator();
        let location = Coordinate::new(39.7525, -105.0003);
        let first = coordinator.activate_depot("union-station", location, vec![]);
        first
            .add_commuter(&AddCommuterRequest {
                origin: json!([39.7530, -105.0010]),
                destination: json!([39.7392, -104.9903]),
                direction: Direction::Outbound,
            })
            .expect("add failed");
        let second = coordinator.activate_depot("union-station", location, vec![]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.active_count(), 1);
        coordinator.shutdown().await;
    }

    #[tokio::test]
    async fn test_routing_to_unknown_reservoir_is_an_error() {
        let coordinator = coordinator();
        let request = AddCommuterRequest {
            origin: json!([39.75, -105.00]),
            destination: json!([39.74, -104.99]),
            direction: Direction::Inbound,
        };
        let result = coordinator.add_commuter("ghost", &request);
        assert!(matches!(result, Err(ReservoirError::UnknownReservoir(_))));
    }

    #[tokio::test]
    async fn test_events_fan_in_across_reservoirs() {
        let coordinator = coordinator();
        let mut receiver = coordinator.subscribe();
        coordinator.activate_depot("a", Coordinate::new(39.75, -105.00), vec![]);
        coordinator.activate_depot("b", Coordinate::new(39.60, -105.00), vec![]);
        let request = AddCommuterRequest {
            origin: json!([39.75, -105.00]),
            destination: json!([39.74, -104.99]),
            direction: Direction::Outbound,
        };
        coordinator.add_commuter("a", &request).expect("add failed");
        coordinator.add_commuter("b", &request).expect("add failed");

        let first = receiver.try_recv().expect("no event from a");
        let second = receiver.try_recv().expect("no event from b");
        let mut sources = vec![first.reservoir_id, second.reservoir_id];
        sources.sort();
        assert_eq!(sources, vec!["a".to_string(), "b".to_string()]);
        coordinator.shutdown().await;
    }
}
