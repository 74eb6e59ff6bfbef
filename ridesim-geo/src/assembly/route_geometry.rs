use crate::location::Coordinate;
use geo::{Distance, Haversine, LineString};
use serde::Serialize;

/// a stitched segment junction wider than this flags the route geometry as
/// fragmented (mismatched or incomplete source data). not fatal, but
/// surfaced to callers and the log.
pub const SEAM_GAP_WARN_METERS: f64 = 500.0;

/// one continuous polyline reconstructed for a route, with the quality
/// metrics gathered during assembly.
#[derive(Debug, Clone, Serialize)]
pub struct RouteGeometry {
    pub route_code: String,
    pub points: Vec<Coordinate>,
    pub point_count: usize,
    pub total_length_m: f64,
    pub max_seam_gap_m: f64,
    pub fragmented: bool,
}

impl RouteGeometry {
    pub fn line_string(&self) -> LineString<f64> {
        LineString::from(
            self.points
                .iter()
                .map(|c| (c.lon, c.lat))
                .collect::<Vec<_>>(),
        )
    }

    /// great-circle distance from a coordinate to the nearest polyline
    /// vertex, in meters. used to match spawned commuters and zones to
    /// their closest route.
    pub fn nearest_distance_m(&self, coordinate: &Coordinate) -> f64 {
        self.points
            .iter()
            .map(|p| Haversine.distance(p.to_point(), coordinate.to_point()))
            .fold(f64::INFINITY, f64::min)
    }

    pub fn endpoints(&self) -> Option<(Coordinate, Coordinate)> {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => Some((*first, *last)),
            _ => None,
        }
    }
}
