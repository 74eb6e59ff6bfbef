mod poisson;
mod spawn_error;
mod spawn_planner;
mod spawn_rate;
mod spawn_request;

pub use poisson::sample_poisson;
pub use spawn_error::SpawnError;
pub use spawn_planner::{offset_meters, SpawnPlanner};
pub use spawn_rate::{hourly_rate, spawn_lambda, zone_type_modifier};
pub use spawn_request::SpawnRequest;
