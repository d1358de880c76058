//! Binary crate for the city info gateway.
//!
//! This crate focuses on:
//! - Parsing command-line flags
//! - Loading `.env` and assembling configuration
//! - Initialising logging before handing off to the core server

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    cli.run().await
}
