//! Binary crate for the `tempo` weather dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive city / forecast-length selection
//! - Printing the dashboard regions to the terminal

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod output;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; WEATHER_API_KEY may come from the real environment.
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
