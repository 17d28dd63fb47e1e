//! Signal bot CLI application.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;
use tradebot_config::{load_config, LoggingConfig};
use tradebot_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Flags win over the config file's logging section
    let logging = load_config(&cli.config)
        .map(|config| config.logging)
        .unwrap_or_else(|_| LoggingConfig::default());
    let log_level = cli
        .log_level
        .map(|level| level.as_str().to_string())
        .unwrap_or(logging.level);
    let json = cli.json_logs || logging.format == "json";
    let _guard = setup_logging(&log_level, json, logging.file.as_deref().map(Path::new));

    match cli.command {
        Commands::Run(args) => cli::commands::run::run(args, &cli.config).await,
        Commands::Fetch(args) => cli::commands::fetch::run(args, &cli.config).await,
        Commands::Signal(args) => cli::commands::signal::run(args, &cli.config).await,
        Commands::Compare(args) => cli::commands::compare::run(args, &cli.config).await,
        Commands::Portfolio(args) => cli::commands::portfolio::run(args, &cli.config).await,
        Commands::Tickers(args) => cli::commands::tickers::run(args, &cli.config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
