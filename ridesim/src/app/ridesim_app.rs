use super::{AppError, Operation};
use clap::Parser;

#[derive(Parser)]
#[command(author, version, about = "route geometry and commuter simulation console", long_about = None)]
#[command(propagate_version = true)]
pub struct RidesimApp {
    #[command(subcommand)]
    pub operation: Operation,
}

impl RidesimApp {
    pub fn run(&self) -> Result<(), AppError> {
        self.operation.run()
    }
}
