use super::{Coordinate, LocationError};
use serde_json::Value;

/// converts a heterogeneous location representation into a canonical
/// [Coordinate]. accepts a two-element `[lat, lon]` array, an object with
/// `lat`/`lon` keys, or an object with `latitude`/`longitude` keys. typed
/// values with their own accessors go through [super::LocationLike] instead.
pub fn normalize(value: &Value) -> Result<Coordinate, LocationError> {
    match value {
        Value::Array(pair) if pair.len() == 2 => {
            let lat = as_f64(&pair[0])?;
            let lon = as_f64(&pair[1])?;
            Ok(Coordinate::new(lat, lon))
        }
        Value::Object(map) => {
            let keyed = map
                .get("lat")
                .zip(map.get("lon"))
                .or_else(|| map.get("latitude").zip(map.get("longitude")));
            match keyed {
                Some((lat, lon)) => Ok(Coordinate::new(as_f64(lat)?, as_f64(lon)?)),
                None => Err(LocationError::InvalidLocationFormat(value.to_string())),
            }
        }
        _ => Err(LocationError::InvalidLocationFormat(value.to_string())),
    }
}

fn as_f64(value: &Value) -> Result<f64, LocationError> {
    value
        .as_f64()
        .ok_or_else(|| LocationError::InvalidLocationFormat(value.to_string()))
}
