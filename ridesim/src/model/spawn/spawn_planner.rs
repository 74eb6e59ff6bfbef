use super::{sample_poisson, spawn_lambda, SpawnError, SpawnRequest};
use crate::model::commuter::Direction;
use crate::model::zone::{TimeBucket, Zone, ZoneCatalog, ZoneType};
use chrono::{DateTime, Utc};
use geo::{Distance, Haversine};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ridesim_geo::location::Coordinate;
use std::f64::consts::TAU;
use std::sync::{Arc, Mutex};

const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// synthesizes Poisson-distributed spawn requests from a reservoir's
/// assigned zones. origins are jittered within the zone radius; destination
/// and travel direction follow a time-of-day/land-use heuristic (morning
/// rush in a residential zone sends riders outbound toward commercial
/// destinations, evening rush reverses it).
pub struct SpawnPlanner {
    zones: Arc<dyn ZoneCatalog>,
    base_coefficient: f64,
    window_minutes: f64,
    rng: Mutex<StdRng>,
}

impl SpawnPlanner {
    pub fn new(
        zones: Arc<dyn ZoneCatalog>,
        base_coefficient: f64,
        window_minutes: f64,
    ) -> SpawnPlanner {
        SpawnPlanner {
            zones,
            base_coefficient,
            window_minutes,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// fixed seed for reproducible simulation runs
    pub fn with_seed(
        zones: Arc<dyn ZoneCatalog>,
        base_coefficient: f64,
        window_minutes: f64,
        seed: u64,
    ) -> SpawnPlanner {
        SpawnPlanner {
            zones,
            base_coefficient,
            window_minutes,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn generate(&self, now: DateTime<Utc>) -> Result<Vec<SpawnRequest>, SpawnError> {
        let zones = self.zones.zones()?;
        let bucket = TimeBucket::from_datetime(&now);
        let morning = TimeBucket::is_morning(&now);
        let mut rng = self.rng.lock().expect("spawn planner rng lock poisoned");

        let mut requests = vec![];
        for zone in zones.iter() {
            let lambda = spawn_lambda(zone, bucket, self.base_coefficient, self.window_minutes);
            let count = sample_poisson(&mut *rng, lambda);
            for _ in 0..count {
                let origin = jitter_within_radius(&mut rng, zone.centroid, zone.radius_m);
                let (destination, direction) =
                    destination_for(&mut rng, zone, &zones, bucket, morning);
                requests.push(SpawnRequest {
                    zone_id: zone.id.clone(),
                    origin,
                    destination,
                    direction,
                });
            }
        }
        Ok(requests)
    }
}

/// uniform draw inside the zone disc: radius scaled by sqrt(u) so density
/// is uniform by area rather than clustered at the centroid
fn jitter_within_radius<R: Rng>(rng: &mut R, center: Coordinate, radius_m: f64) -> Coordinate {
    let r = radius_m * rng.random::<f64>().sqrt();
    let theta = rng.random::<f64>() * TAU;
    offset_meters(center, r * theta.cos(), r * theta.sin())
}

/// small-offset planar approximation, fine at zone scale
pub fn offset_meters(origin: Coordinate, east_m: f64, north_m: f64) -> Coordinate {
    let lat = origin.lat + north_m / METERS_PER_DEGREE_LAT;
    let lon_scale = origin.lat.to_radians().cos().abs().max(0.01);
    let lon = origin.lon + east_m / (METERS_PER_DEGREE_LAT * lon_scale);
    Coordinate::new(lat, lon)
}

fn destination_for<R: Rng>(
    rng: &mut R,
    zone: &Zone,
    zones: &[Zone],
    bucket: TimeBucket,
    morning: bool,
) -> (Coordinate, Direction) {
    match (bucket, &zone.zone_type) {
        (TimeBucket::RushHour, ZoneType::Residential) if morning => (
            nearest_of_type(zone, zones, ZoneType::Commercial)
                .unwrap_or_else(|| fallback_destination(zone)),
            Direction::Outbound,
        ),
        (TimeBucket::RushHour, ZoneType::Commercial) if !morning => (
            nearest_of_type(zone, zones, ZoneType::Residential)
                .unwrap_or_else(|| fallback_destination(zone)),
            Direction::Inbound,
        ),
        (TimeBucket::Weekend, _) => (
            nearest_of_type(zone, zones, ZoneType::Amenity)
                .unwrap_or_else(|| fallback_destination(zone)),
            random_direction(rng),
        ),
        _ => {
            let destination = random_other_zone(rng, zone, zones)
                .unwrap_or_else(|| fallback_destination(zone));
            (destination, random_direction(rng))
        }
    }
}

fn nearest_of_type(zone: &Zone, zones: &[Zone], wanted: ZoneType) -> Option<Coordinate> {
    zones
        .iter()
        .filter(|candidate| candidate.id != zone.id && candidate.zone_type == wanted)
        .map(|candidate| {
            let distance = Haversine.distance(
                zone.centroid.to_point(),
                candidate.centroid.to_point(),
            );
            (distance, candidate.centroid)
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, centroid)| centroid)
}

fn random_other_zone<R: Rng>(rng: &mut R, zone: &Zone, zones: &[Zone]) -> Option<Coordinate> {
    let others: Vec<&Zone> = zones.iter().filter(|z| z.id != zone.id).collect();
    if others.is_empty() {
        return None;
    }
    let pick = rng.random_range(0..others.len());
    Some(others[pick].centroid)
}

fn random_direction<R: Rng>(rng: &mut R) -> Direction {
    if rng.random_bool(0.5) {
        Direction::Outbound
    } else {
        Direction::Inbound
    }
}

/// with no candidate zone to aim at, head two radii east of home
fn fallback_destination(zone: &Zone) -> Coordinate {
    offset_meters(zone.centroid, 2.0 * zone.radius_m, 0.0)
}

#[cfg(test)]
mod test {
    use super::SpawnPlanner;
    use crate::model::commuter::Direction;
    use crate::model::zone::{InMemoryZoneCatalog, WeightTable, Zone, ZoneType};
    use chrono::{TimeZone, Utc};
    use geo::{Distance, Haversine};
    use ridesim_geo::location::Coordinate;
    use std::sync::Arc;

    fn zone(id: &str, zone_type: ZoneType, lat: f64, lon: f64, density: f64) -> Zone {
        Zone {
            id: id.to_string(),
            centroid: Coordinate::new(lat, lon),
            radius_m: 400.0,
            density_per_km2: density,
            zone_type,
            weights: WeightTable {
                rush_hour: 2.5,
                off_peak: 0.5,
                weekend: 0.9,
                regular: 1.0,
            },
        }
    }

    fn planner(zones: Vec<Zone>, seed: u64) -> SpawnPlanner {
        SpawnPlanner::with_seed(Arc::new(InMemoryZoneCatalog::new(zones)), 0.1, 5.0, seed)
    }

    #[test]
    fn test_morning_rush_residential_goes_outbound_to_commercial() {
        let home = zone("home", ZoneType::Residential, 39.70, -105.00, 800.0);
        let work = zone("work", ZoneType::Commercial, 39.75, -104.99, 0.0);
        let planner = planner(vec![home.clone(), work.clone()], 42);

        // monday 08:00
        let now = Utc.with_ymd_and_hms(2026, 8, 17, 8, 0, 0).unwrap();
        let requests = planner.generate(now).expect("generate failed");
        assert!(!requests.is_empty());
        for request in requests.iter() {
            assert_eq!(request.direction, Direction::Outbound);
            assert_eq!(request.destination, work.centroid);
            let origin_offset =
                Haversine.distance(request.origin.to_point(), home.centroid.to_point());
            assert!(
                origin_offset <= home.radius_m * 1.01,
                "origin jittered {origin_offset}m outside the zone radius"
            );
        }
    }

    #[test]
    fn test_evening_rush_commercial_goes_inbound() {
        let home = zone("home", ZoneType::Residential, 39.70, -105.00, 0.0);
        let work = zone("work", ZoneType::Commercial, 39.75, -104.99, 800.0);
        let planner = planner(vec![home.clone(), work], 42);

        // monday 17:30
        let now = Utc.with_ymd_and_hms(2026, 8, 17, 17, 30, 0).unwrap();
        let requests = planner.generate(now).expect("generate failed");
        assert!(!requests.is_empty());
        for request in requests.iter() {
            assert_eq!(request.direction, Direction::Inbound);
            assert_eq!(request.destination, home.centroid);
        }
    }

    #[test]
    fn test_off_peak_spawns_are_rare() {
        let home = zone("home", ZoneType::Residential, 39.70, -105.00, 800.0);
        let planner = planner(vec![home], 42);

        // tuesday 03:00, rate suppressed by both weight table and land use
        let off_peak = Utc.with_ymd_and_hms(2026, 8, 18, 3, 0, 0).unwrap();
        let rush = Utc.with_ymd_and_hms(2026, 8, 18, 8, 0, 0).unwrap();
        let quiet = planner.generate(off_peak).expect("generate failed").len();
        let busy = planner.generate(rush).expect("generate failed").len();
        assert!(quiet < busy, "off-peak {quiet} >= rush {busy}");
    }
}
