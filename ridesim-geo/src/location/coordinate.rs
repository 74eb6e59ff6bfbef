use geo::Point;
use serde::{Deserialize, Serialize};

/// canonical latitude/longitude pair in decimal degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Coordinate {
        Coordinate { lat, lon }
    }

    /// as a geo point, which stores (x=lon, y=lat)
    pub fn to_point(self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lon): (f64, f64)) -> Coordinate {
        Coordinate { lat, lon }
    }
}

impl From<Point<f64>> for Coordinate {
    fn from(point: Point<f64>) -> Coordinate {
        Coordinate {
            lat: point.y(),
            lon: point.x(),
        }
    }
}

/// types carrying their own latitude/longitude accessors normalize
/// without a round trip through a loose JSON value.
pub trait LocationLike {
    fn lat(&self) -> f64;
    fn lon(&self) -> f64;
}

impl<T: LocationLike> From<&T> for Coordinate {
    fn from(value: &T) -> Coordinate {
        Coordinate {
            lat: value.lat(),
            lon: value.lon(),
        }
    }
}
