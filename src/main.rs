mod app;
mod data;
mod export;
mod io;
mod tree;
mod ui;

use app::{AppConfig, LineageApp};
use clap::Parser;

fn main() {
    let _ = env_logger::builder()
        .format_timestamp(None)
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();

    let config = AppConfig::parse();
    if let Err(err) = LineageApp::run(&config) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
