use crate::model::commuter::Direction;
use ridesim_geo::location::Coordinate;
use serde::Serialize;

/// one unit of synthesized demand, ready to become a commuter
#[derive(Debug, Clone, Serialize)]
pub struct SpawnRequest {
    pub zone_id: String,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub direction: Direction,
}
