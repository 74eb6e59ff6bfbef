mod time_bucket;
mod zone;
mod zone_catalog;
mod zone_error;

pub use time_bucket::TimeBucket;
pub use zone::{WeightTable, Zone, ZoneType};
pub use zone_catalog::{InMemoryZoneCatalog, ZoneCatalog};
pub use zone_error::ZoneError;
