#[derive(thiserror::Error, Debug)]
pub enum GeometryError {
    #[error("no shape segments linked to route: {0}")]
    NoSegmentsFound(String),
    #[error("no coordinate points found for shape: {0}")]
    NoPointsFound(String),
    #[error("failure reading shape catalog: {0}")]
    CatalogReadError(String),
}
