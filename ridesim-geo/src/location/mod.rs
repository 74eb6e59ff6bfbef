mod coordinate;
mod location_error;
mod normalize;

pub use coordinate::{Coordinate, LocationLike};
pub use location_error::LocationError;
pub use normalize::normalize;
