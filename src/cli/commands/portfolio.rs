//! Holdings analysis command.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use tradebot_portfolio::{value_holdings, Holding, HoldingValuation, PortfolioSummary};

use crate::cli::setup::{build_source, load_or_default};
use crate::cli::PortfolioArgs;

pub async fn run(args: PortfolioArgs, config_path: &Path) -> Result<()> {
    let holdings = args
        .positions
        .iter()
        .map(|p| parse_position(p))
        .collect::<Result<Vec<_>>>()?;

    let config = load_or_default(config_path)?;
    let source = build_source(&config.data)?;

    let mut prices = HashMap::new();
    for holding in &holdings {
        if prices.contains_key(&holding.symbol) {
            continue;
        }
        let price = source
            .latest_close(&holding.symbol)
            .await
            .with_context(|| format!("Failed to fetch current price for {}", holding.symbol))?;
        prices.insert(holding.symbol.clone(), price);
    }

    let summary = value_holdings(&holdings, &prices)?;
    print_summary(&summary, args.by_return);
    Ok(())
}

/// Parse `SYMBOL:SHARES:ENTRY_PRICE[:YYYY-MM-DD]`.
fn parse_position(entry: &str) -> Result<Holding> {
    let parts: Vec<&str> = entry.split(':').map(str::trim).collect();
    let (symbol, shares, price, date) = match parts.as_slice() {
        [symbol, shares, price] => (*symbol, *shares, *price, None),
        [symbol, shares, price, date] => (*symbol, *shares, *price, Some(*date)),
        _ => bail!("Position {:?} must look like SYMBOL:SHARES:PRICE[:YYYY-MM-DD]", entry),
    };
    if symbol.is_empty() {
        bail!("Position {:?} has no symbol", entry);
    }

    let shares: Decimal = shares
        .parse()
        .with_context(|| format!("Invalid share count in {:?}", entry))?;
    let price: Decimal = price
        .parse()
        .with_context(|| format!("Invalid entry price in {:?}", entry))?;

    let mut holding = Holding::new(symbol.to_uppercase(), shares, price);
    if let Some(date) = date {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .with_context(|| format!("Invalid entry date in {:?}", entry))?;
        holding = holding.with_entry_date(date);
    }
    Ok(holding)
}

fn money(value: Decimal) -> String {
    format!("${}", value.round_dp(2))
}

fn pct(value: Decimal) -> String {
    format!("{}%", value.round_dp(2))
}

fn print_summary(summary: &PortfolioSummary, by_return: bool) {
    println!("Portfolio Summary");
    println!("  Total value:     {}", money(summary.total_value));
    println!("  Total cost:      {}", money(summary.total_cost));
    println!("  Total gain/loss: {}", money(summary.total_gain));
    println!("  Total return:    {}", pct(summary.total_return_pct));
    println!();

    let positions: Vec<&HoldingValuation> = if by_return {
        summary.by_return()
    } else {
        summary.positions.iter().collect()
    };

    println!(
        "{:<8} {:>10} {:>12} {:>12} {:>14} {:>14} {:>12} {:>9} {:>9} {:>11}",
        "Symbol",
        "Shares",
        "Entry",
        "Current",
        "Value",
        "Cost",
        "Gain/Loss",
        "Return",
        "Weight",
        "Entered"
    );
    for p in positions {
        println!(
            "{:<8} {:>10} {:>12} {:>12} {:>14} {:>14} {:>12} {:>9} {:>9} {:>11}",
            p.holding.symbol,
            p.holding.shares.round_dp(2).to_string(),
            money(p.holding.entry_price),
            money(p.current_price),
            money(p.position_value),
            money(p.cost_basis),
            money(p.gain_loss),
            pct(p.return_pct),
            pct(p.weight_pct),
            p.holding
                .entry_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }

    println!();
    println!("Portfolio Statistics");
    if let Some(best) = summary.best_performer() {
        println!("  Best performer:    {} ({})", best.holding.symbol, pct(best.return_pct));
    }
    if let Some(worst) = summary.worst_performer() {
        println!("  Worst performer:   {} ({})", worst.holding.symbol, pct(worst.return_pct));
    }
    if let Some(largest) = summary.largest_position() {
        println!("  Largest position:  {} ({})", largest.holding.symbol, pct(largest.weight_pct));
    }
    if let Some(smallest) = summary.smallest_position() {
        println!("  Smallest position: {} ({})", smallest.holding.symbol, pct(smallest.weight_pct));
    }
    if let Some(avg) = summary.average_return_pct() {
        println!("  Average return:    {}", pct(avg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_position() {
        let holding = parse_position("aapl:10:150.25").unwrap();
        assert_eq!(holding.symbol, "AAPL");
        assert_eq!(holding.shares, dec!(10));
        assert_eq!(holding.entry_price, dec!(150.25));
        assert_eq!(holding.entry_date, None);
    }

    #[test]
    fn test_parse_position_with_date() {
        let holding = parse_position("MSFT:2.5:300:2024-01-15").unwrap();
        assert_eq!(holding.entry_date, NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn test_parse_position_errors() {
        assert!(parse_position("AAPL").is_err());
        assert!(parse_position("AAPL:ten:150").is_err());
        assert!(parse_position("AAPL:10:150:yesterday").is_err());
        assert!(parse_position(":10:150").is_err());
    }
}
