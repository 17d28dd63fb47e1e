//! Bot command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use tradebot_config::load_config;
use tradebot_core::types::Span;
use tradebot_data::BarExporter;
use tradebot_engine::ControlLoop;
use tradebot_portfolio::PortfolioState;
use tradebot_signals::SignalEngine;

use crate::cli::setup::{build_executor, build_source, retry_policy};
use crate::cli::RunArgs;

pub async fn run(args: RunArgs, config_path: &Path) -> Result<()> {
    let mut config = load_config(config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if !args.symbols.is_empty() {
        config.bot.symbols = args.symbols.iter().map(|s| s.trim().to_uppercase()).collect();
    }
    config.validate()?;

    let source = build_source(&config.data)?;
    let executor = build_executor(&config.execution, args.dry_run)?;
    let engine = SignalEngine::new(config.bot.window_size)?;

    let mut bot = ControlLoop::new(
        source,
        executor,
        engine,
        config.bot.trade_gate(),
        config.bot.symbols.clone(),
    )
    .with_span(Span::Range(config.data.range))
    .with_interval(config.data.interval)
    .with_retry_policy(retry_policy(&config.bot))
    .with_force_initial_buy(config.bot.force_initial_buy);

    if let Some(path) = &config.data.export_path {
        bot = bot.with_exporter(BarExporter::new(path));
    }

    tokio::select! {
        _ = bot.run(PortfolioState::new()) => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for shutdown signal")?;
            info!("Shutdown requested");
        }
    }

    info!(stats = %bot.stats(), "Session finished");
    Ok(())
}
