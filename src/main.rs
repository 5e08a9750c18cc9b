mod cli;
mod config;
mod error;
mod models;
mod services;
mod store;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};

use config::FetchConfig;

#[derive(Parser)]
#[command(name = "icestats-fetcher")]
#[command(about = "Fetches league schedules and standings into per-league JSON datasets")]
struct Cli {
    #[command(flatten)]
    config: FetchConfig,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every configured league and write its dataset
    Fetch,
    /// Write a synthetic dataset for one league (never touches the real file)
    Fixture {
        #[arg(short, long)]
        league: String,
    },
    /// Show the date window, season candidates and leagues a fetch would use
    Window,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables before clap reads them
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    cli.config.validate()?;

    match cli.command {
        Some(Commands::Fixture { league }) => {
            tracing::info!("Writing synthetic fixture for {}", league);
            cli::write_fixture(&cli.config, &league).await?;
        }
        Some(Commands::Window) => {
            cli::show_window(&cli.config)?;
        }
        Some(Commands::Fetch) | None => {
            tracing::info!("Starting league sync");
            let reports = cli::fetch_leagues(&cli.config).await?;
            let degraded = reports.iter().filter(|r| r.is_degraded()).count();
            tracing::info!("{} league(s) written, {} degraded", reports.len(), degraded);
        }
    }

    Ok(())
}
