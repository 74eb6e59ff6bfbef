pub mod app_error;
pub mod assemble_ops;
pub mod commuters_ops;
pub mod operation;
pub mod ridesim_app;
pub mod simulate_ops;

pub use app_error::AppError;
pub use operation::Operation;
pub use ridesim_app::RidesimApp;
