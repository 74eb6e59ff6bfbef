use crate::model::zone::{TimeBucket, Zone, ZoneType};

/// activity weighting by land use, itself peak-adjusted: residential demand
/// peaks with the commute, commercial lags slightly behind it, amenity
/// demand inverts toward weekends.
pub fn zone_type_modifier(zone_type: &ZoneType, bucket: TimeBucket) -> f64 {
    match (zone_type, bucket) {
        (ZoneType::Residential, TimeBucket::RushHour) => 1.0,
        (ZoneType::Residential, TimeBucket::Regular) => 0.7,
        (ZoneType::Residential, TimeBucket::OffPeak) => 0.4,
        (ZoneType::Residential, TimeBucket::Weekend) => 0.8,
        (ZoneType::Commercial, TimeBucket::RushHour) => 1.2,
        (ZoneType::Commercial, TimeBucket::Regular) => 1.0,
        (ZoneType::Commercial, TimeBucket::OffPeak) => 0.3,
        (ZoneType::Commercial, TimeBucket::Weekend) => 0.6,
        (ZoneType::Amenity, TimeBucket::RushHour) => 0.6,
        (ZoneType::Amenity, TimeBucket::Regular) => 1.0,
        (ZoneType::Amenity, TimeBucket::OffPeak) => 0.5,
        (ZoneType::Amenity, TimeBucket::Weekend) => 1.5,
        (ZoneType::Mixed, _) => 1.0,
    }
}

/// commuters per hour a zone produces in the given time bucket:
/// `density * base_coefficient * time_modifier * zone_type_modifier`
pub fn hourly_rate(zone: &Zone, bucket: TimeBucket, base_coefficient: f64) -> f64 {
    let base_rate = zone.density_per_km2 * base_coefficient;
    base_rate * zone.weights.modifier(bucket) * zone_type_modifier(&zone.zone_type, bucket)
}

/// the Poisson rate parameter for one spawn window
pub fn spawn_lambda(
    zone: &Zone,
    bucket: TimeBucket,
    base_coefficient: f64,
    window_minutes: f64,
) -> f64 {
    hourly_rate(zone, bucket, base_coefficient) * (window_minutes / 60.0)
}

#[cfg(test)]
mod test {
    use super::{spawn_lambda, zone_type_modifier};
    use crate::model::zone::{TimeBucket, WeightTable, Zone, ZoneType};
    use ridesim_geo::location::Coordinate;

    fn residential_zone() -> Zone {
        Zone {
            id: "capitol-hill".to_string(),
            centroid: Coordinate::new(39.73, -104.98),
            radius_m: 400.0,
            density_per_km2: 4000.0,
            zone_type: ZoneType::Residential,
            weights: WeightTable {
                rush_hour: 2.5,
                off_peak: 0.5,
                weekend: 0.9,
                regular: 1.0,
            },
        }
    }

    #[test]
    fn test_rush_hour_residential_lambda() {
        // density 4000, coefficient 0.1, rush modifier 2.5, residential 1.0,
        // 5 minute window: lambda = 4000 * 0.1 * 2.5 * 1.0 * (5/60)
        let zone = residential_zone();
        let lambda = spawn_lambda(&zone, TimeBucket::RushHour, 0.1, 5.0);
        assert!((lambda - 83.333).abs() < 0.01, "lambda was {lambda}");
    }

    #[test]
    fn test_off_peak_suppresses_rate() {
        let zone = residential_zone();
        let rush = spawn_lambda(&zone, TimeBucket::RushHour, 0.1, 5.0);
        let off_peak = spawn_lambda(&zone, TimeBucket::OffPeak, 0.1, 5.0);
        assert!(off_peak < rush / 10.0);
    }

    #[test]
    fn test_zone_type_modifier_table() {
        assert_eq!(
            zone_type_modifier(&ZoneType::Residential, TimeBucket::RushHour),
            1.0
        );
        assert!(
            zone_type_modifier(&ZoneType::Amenity, TimeBucket::Weekend)
                > zone_type_modifier(&ZoneType::Amenity, TimeBucket::RushHour)
        );
        assert_eq!(zone_type_modifier(&ZoneType::Mixed, TimeBucket::OffPeak), 1.0);
    }
}
