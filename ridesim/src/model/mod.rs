pub mod commuter;
pub mod event;
pub mod reservoir;
pub mod runtime;
pub mod simulation_config;
pub mod spawn;
pub mod statistics;
pub mod zone;
