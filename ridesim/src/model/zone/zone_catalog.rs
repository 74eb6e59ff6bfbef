use super::{Zone, ZoneError};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// read side of the zone/population-weight store
pub trait ZoneCatalog: Send + Sync {
    fn zones(&self) -> Result<Vec<Zone>, ZoneError>;
}

/// zone catalog backed by an in-memory vector, loadable from a JSON array
/// file. production deployments put a database behind [ZoneCatalog].
pub struct InMemoryZoneCatalog {
    zones: Vec<Zone>,
}

impl InMemoryZoneCatalog {
    pub fn new(zones: Vec<Zone>) -> InMemoryZoneCatalog {
        InMemoryZoneCatalog { zones }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<InMemoryZoneCatalog, ZoneError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| ZoneError::CatalogReadError(format!("failed to open {path:?}: {e}")))?;
        let zones: Vec<Zone> = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ZoneError::CatalogReadError(format!("failed to parse {path:?}: {e}")))?;
        Ok(InMemoryZoneCatalog::new(zones))
    }
}

impl ZoneCatalog for InMemoryZoneCatalog {
    fn zones(&self) -> Result<Vec<Zone>, ZoneError> {
        Ok(self.zones.clone())
    }
}
