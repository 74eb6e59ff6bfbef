#[derive(thiserror::Error, Debug)]
pub enum ZoneError {
    #[error("failure reading zone catalog: {0}")]
    CatalogReadError(String),
}
