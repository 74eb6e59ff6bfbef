use crate::location::Coordinate;
use serde::{Deserialize, Serialize};

/// one coordinate sampled along a stored shape, ordered upstream by `sequence`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapePoint {
    pub shape_id: String,
    pub sequence: u32,
    pub lat: f64,
    pub lon: f64,
}

impl ShapePoint {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// associates a route code with one of its stored shape variants. a route
/// may carry several named variants (branches, short turns) that together
/// make up its full geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteShapeLink {
    pub route_code: String,
    pub shape_id: String,
    #[serde(default)]
    pub variant: Option<String>,
}

/// an unordered fragment of a route's geometry: one stored shape's points
/// in their upstream sequence order.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeSegment {
    pub shape_id: String,
    pub points: Vec<Coordinate>,
}

impl ShapeSegment {
    pub fn new(shape_id: &str, points: Vec<Coordinate>) -> ShapeSegment {
        ShapeSegment {
            shape_id: shape_id.to_string(),
            points,
        }
    }

    pub fn first(&self) -> Option<Coordinate> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Coordinate> {
        self.points.last().copied()
    }
}
