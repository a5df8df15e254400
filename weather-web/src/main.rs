//! Binary crate for the `weather-web` lookup app.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Serving the search pages over HTTP
//! - Human-friendly output formatting

use clap::Parser;
use weather_core::Config;

mod cli;
mod logging;
mod page;
mod render;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();

    let _log_guard = logging::init(&Config::log_dir_path()?)?;
    tracing::info!("Starting application");

    cmd.run().await
}
