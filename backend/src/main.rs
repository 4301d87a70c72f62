use anyhow::Result;
use clap::Parser;
use tf2_stats::chart;
use tf2_stats::cli::{self, Cli};
use tf2_stats::prices;
use tf2_stats::server;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let (command, serve) = Cli::parse().into_parts();
    match command {
        cli::Command::Serve => server::run_with_config(serve.into()).await,
        cli::Command::Prices(args) => prices::run(args).await,
        cli::Command::Chart(args) => chart::run(args).await,
    }
}
