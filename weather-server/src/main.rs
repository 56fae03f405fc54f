//! Binary crate for the `weather-server` HTTP service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and environment overrides
//! - Logging setup
//! - HTTP routing and error-to-status mapping

use clap::Parser;

mod cli;
mod error;
mod logging;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}
