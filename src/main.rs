mod audit;
mod cli;
mod config;
mod error;
mod output;
mod save;
mod server;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting ci-audit - Jenkins job inventory audit");
    cli.execute().await?;

    Ok(())
}
