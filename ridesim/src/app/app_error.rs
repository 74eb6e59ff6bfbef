use crate::model::event::SinkError;
use crate::model::reservoir::ReservoirError;
use crate::model::simulation_config::ConfigError;
use crate::model::zone::ZoneError;
use ridesim_geo::assembly::GeometryError;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Reservoir(#[from] ReservoirError),
    #[error(transparent)]
    Zone(#[from] ZoneError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("failure writing output: {0}")]
    OutputError(String),
    #[error("failure building async rust tokio runtime: {0}")]
    RuntimeError(String),
}
