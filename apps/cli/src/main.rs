//! unifind CLI: nearest-university lookup for rental listings.
//!
//! Geocodes a property address and ranks the higher-education institutions
//! around it by popularity, with driving distance and time.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
