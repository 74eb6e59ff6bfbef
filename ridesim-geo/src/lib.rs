pub mod assembly;
pub mod location;
