//! Two-symbol return comparison command.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use tradebot_core::traits::MarketDataSource;
use tradebot_core::types::{total_return_pct, Bar, FetchRequest, Interval, Range};

use crate::cli::setup::{build_source, load_or_default, supported};
use crate::cli::CompareArgs;

/// Price change of one symbol over the compared span.
#[derive(Debug, Clone, PartialEq)]
struct ReturnSummary {
    symbol: String,
    bars: usize,
    first_close: Decimal,
    last_close: Decimal,
    return_pct: Decimal,
}

impl ReturnSummary {
    fn from_bars(symbol: &str, bars: &[Bar]) -> Option<Self> {
        Some(Self {
            symbol: symbol.to_string(),
            bars: bars.len(),
            first_close: bars.first()?.close,
            last_close: bars.last()?.close,
            return_pct: total_return_pct(bars)?,
        })
    }
}

pub async fn run(args: CompareArgs, config_path: &Path) -> Result<()> {
    let config = load_or_default(config_path)?;
    let source = build_source(&config.data)?;

    let first = fetch_summary(source.as_ref(), &args.first, args.range, args.interval).await?;
    let second = fetch_summary(source.as_ref(), &args.second, args.range, args.interval).await?;

    println!("Total return over {} ({} bars)", args.range, args.interval);
    println!("{:<8} {:>6} {:>12} {:>12} {:>10}", "Symbol", "Bars", "First", "Last", "Return");
    for summary in [&first, &second] {
        println!(
            "{:<8} {:>6} {:>12} {:>12} {:>9}%",
            summary.symbol,
            summary.bars,
            summary.first_close.round_dp(2).to_string(),
            summary.last_close.round_dp(2).to_string(),
            summary.return_pct.round_dp(2).to_string()
        );
    }
    println!();
    println!("{}", verdict(&first, &second));
    Ok(())
}

async fn fetch_summary(
    source: &dyn MarketDataSource,
    symbol: &str,
    range: Range,
    interval: Interval,
) -> Result<ReturnSummary> {
    let symbol = symbol.trim().to_uppercase();
    let request = supported(FetchRequest::range(symbol.as_str(), range, interval))?;
    let bars = source
        .fetch(&request)
        .await
        .with_context(|| format!("Failed to fetch bars for {}", symbol))?;
    ReturnSummary::from_bars(&symbol, &bars)
        .with_context(|| format!("Cannot compute a return for {}", symbol))
}

fn verdict(first: &ReturnSummary, second: &ReturnSummary) -> String {
    let spread = (first.return_pct - second.return_pct).abs().round_dp(2).normalize();
    if first.return_pct > second.return_pct {
        format!("{} outperformed {} by {} points", first.symbol, second.symbol, spread)
    } else if second.return_pct > first.return_pct {
        format!("{} outperformed {} by {} points", second.symbol, first.symbol, spread)
    } else {
        format!("{} and {} returned the same", first.symbol, second.symbol)
    }
}
