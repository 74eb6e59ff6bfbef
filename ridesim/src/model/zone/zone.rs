use super::TimeBucket;
use ridesim_geo::location::Coordinate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneType {
    Residential,
    Commercial,
    Amenity,
    Mixed,
}

/// time-of-day spawn-rate multipliers for one zone
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeightTable {
    pub rush_hour: f64,
    pub off_peak: f64,
    pub weekend: f64,
    pub regular: f64,
}

impl Default for WeightTable {
    fn default() -> WeightTable {
        WeightTable {
            rush_hour: 1.0,
            off_peak: 1.0,
            weekend: 1.0,
            regular: 1.0,
        }
    }
}

impl WeightTable {
    pub fn modifier(&self, bucket: TimeBucket) -> f64 {
        match bucket {
            TimeBucket::RushHour => self.rush_hour,
            TimeBucket::OffPeak => self.off_peak,
            TimeBucket::Weekend => self.weekend,
            TimeBucket::Regular => self.regular,
        }
    }
}

/// a geographic area driving spawn rates. read-only input to the core; the
/// engine never mutates zone records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub centroid: Coordinate,
    pub radius_m: f64,
    pub density_per_km2: f64,
    pub zone_type: ZoneType,
    #[serde(default)]
    pub weights: WeightTable,
}
