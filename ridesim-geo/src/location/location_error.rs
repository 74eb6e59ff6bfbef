#[derive(thiserror::Error, Debug)]
pub enum LocationError {
    #[error("unsupported location format, expected [lat, lon], {{lat, lon}}, or {{latitude, longitude}}: {0}")]
    InvalidLocationFormat(String),
}
