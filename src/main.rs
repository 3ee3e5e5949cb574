use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod cli;
mod config;
mod core;
mod http_client;
mod tui;

use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // Load or create config
    let mut config = Config::load_or_create()?;

    match cli.command {
        Some(Commands::Portrait(args)) => {
            cli::commands::portrait::run(args, &config).await?;
        }
        Some(Commands::Templates(args)) => {
            cli::commands::templates::run(args, &mut config).await?;
        }
        Some(Commands::Config(args)) => {
            cli::commands::config::run(args, &mut config)?;
        }
        None => {
            // Launch TUI
            tui::run(&mut config).await?;
        }
    }

    Ok(())
}
