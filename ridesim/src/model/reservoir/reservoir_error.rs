use crate::model::event::SinkError;
use crate::model::simulation_config::ConfigError;
use crate::model::spawn::SpawnError;
use crate::model::zone::ZoneError;
use ridesim_geo::assembly::GeometryError;
use ridesim_geo::location::LocationError;

#[derive(thiserror::Error, Debug)]
pub enum ReservoirError {
    #[error(transparent)]
    InvalidLocation(#[from] LocationError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    ZoneCatalog(#[from] ZoneError),
    #[error(transparent)]
    Spawn(#[from] SpawnError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no grid cell available near ({lat}, {lon})")]
    NoCellAvailable { lat: f64, lon: f64 },
    #[error("unknown reservoir: {0}")]
    UnknownReservoir(String),
}
