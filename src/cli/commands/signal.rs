//! One-shot signal evaluation command.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use tradebot_core::types::FetchRequest;
use tradebot_signals::SignalEngine;

use crate::cli::setup::{build_source, load_or_default, supported};
use crate::cli::SignalArgs;

pub async fn run(args: SignalArgs, config_path: &Path) -> Result<()> {
    let config = load_or_default(config_path)?;
    let window = args.window.unwrap_or(config.bot.window_size);
    let engine = SignalEngine::new(window).context("Invalid moving average window")?;

    let symbol = args.symbol.trim().to_uppercase();
    let request = supported(FetchRequest::range(
        symbol.as_str(),
        config.data.range,
        config.data.interval,
    ))?;

    let source = build_source(&config.data)?;
    let bars = source
        .fetch(&request)
        .await
        .with_context(|| format!("Failed to fetch bars for {}", symbol))?;
    let evaluation = engine.evaluate(&bars);

    println!("Symbol:        {}", symbol);
    println!("Bars:          {} ({} {})", evaluation.bars, request.interval, request.span);
    println!("Recent close:  {}", price(evaluation.close));
    println!("Recent SMA{:<3} {}", format!("({})", window), price(evaluation.moving_average));
    println!("Signal:        {}", evaluation.signal);
    Ok(())
}

fn price(value: Option<Decimal>) -> String {
    value
        .map(|v| v.round_dp(4).to_string())
        .unwrap_or_else(|| "n/a".to_string())
}
