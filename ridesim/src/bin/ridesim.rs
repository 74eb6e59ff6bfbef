use clap::Parser;
use ridesim::app::RidesimApp;

fn main() {
    env_logger::init();
    let app = RidesimApp::parse();
    if let Err(e) = app.run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
