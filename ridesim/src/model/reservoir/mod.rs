mod commuter_store;
mod coordinator;
mod reservoir;
mod reservoir_error;

pub use commuter_store::CommuterStore;
pub use coordinator::{partition_zones, FleetCoordinator};
pub use reservoir::{AddCommuterRequest, GeographyKind, Reservoir};
pub use reservoir_error::ReservoirError;
