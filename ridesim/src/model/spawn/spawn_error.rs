use crate::model::zone::ZoneError;

#[derive(thiserror::Error, Debug)]
pub enum SpawnError {
    #[error(transparent)]
    ZoneCatalog(#[from] ZoneError),
}
