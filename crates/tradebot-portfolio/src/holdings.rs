//! Valuation of manually entered holdings.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use tradebot_core::error::{TradingError, TradingResult};

/// A position entered by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub shares: Decimal,
    pub entry_price: Decimal,
    pub entry_date: Option<NaiveDate>,
}

impl Holding {
    pub fn new(symbol: impl Into<String>, shares: Decimal, entry_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            shares,
            entry_price,
            entry_date: None,
        }
    }

    pub fn with_entry_date(mut self, date: NaiveDate) -> Self {
        self.entry_date = Some(date);
        self
    }

    pub fn cost_basis(&self) -> Decimal {
        self.shares * self.entry_price
    }
}

/// A holding marked to the current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingValuation {
    pub holding: Holding,
    pub current_price: Decimal,
    pub position_value: Decimal,
    pub cost_basis: Decimal,
    pub gain_loss: Decimal,
    pub return_pct: Decimal,
    /// Share of total portfolio value
    pub weight_pct: Decimal,
}

/// Aggregate view over all valued holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub positions: Vec<HoldingValuation>,
    pub total_value: Decimal,
    pub total_cost: Decimal,
    pub total_gain: Decimal,
    pub total_return_pct: Decimal,
}

impl PortfolioSummary {
    fn max_by_key<F>(&self, key: F) -> Option<&HoldingValuation>
    where
        F: Fn(&HoldingValuation) -> Decimal,
    {
        self.positions.iter().max_by_key(|p| key(p))
    }

    fn min_by_key<F>(&self, key: F) -> Option<&HoldingValuation>
    where
        F: Fn(&HoldingValuation) -> Decimal,
    {
        self.positions.iter().min_by_key(|p| key(p))
    }

    pub fn best_performer(&self) -> Option<&HoldingValuation> {
        self.max_by_key(|p| p.return_pct)
    }

    pub fn worst_performer(&self) -> Option<&HoldingValuation> {
        self.min_by_key(|p| p.return_pct)
    }

    pub fn largest_position(&self) -> Option<&HoldingValuation> {
        self.max_by_key(|p| p.weight_pct)
    }

    pub fn smallest_position(&self) -> Option<&HoldingValuation> {
        self.min_by_key(|p| p.weight_pct)
    }

    /// Unweighted mean of per-position returns.
    pub fn average_return_pct(&self) -> Option<Decimal> {
        if self.positions.is_empty() {
            return None;
        }
        let sum: Decimal = self.positions.iter().map(|p| p.return_pct).sum();
        Some(sum / Decimal::from(self.positions.len()))
    }

    /// Positions ordered by descending return.
    pub fn by_return(&self) -> Vec<&HoldingValuation> {
        let mut sorted: Vec<&HoldingValuation> = self.positions.iter().collect();
        sorted.sort_by(|a, b| b.return_pct.cmp(&a.return_pct));
        sorted
    }
}

fn percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * Decimal::ONE_HUNDRED
    }
}

/// Mark `holdings` to `prices` (symbol -> current price).
pub fn value_holdings(
    holdings: &[Holding],
    prices: &HashMap<String, Decimal>,
) -> TradingResult<PortfolioSummary> {
    let mut positions = Vec::with_capacity(holdings.len());

    for holding in holdings {
        if holding.shares <= Decimal::ZERO {
            return Err(TradingError::Validation(format!(
                "{}: shares must be positive",
                holding.symbol
            )));
        }
        if holding.entry_price <= Decimal::ZERO {
            return Err(TradingError::Validation(format!(
                "{}: entry price must be positive",
                holding.symbol
            )));
        }
        let current_price = *prices.get(&holding.symbol).ok_or_else(|| {
            TradingError::Validation(format!("no current price for {}", holding.symbol))
        })?;

        let position_value = holding.shares * current_price;
        let cost_basis = holding.cost_basis();
        let gain_loss = position_value - cost_basis;

        positions.push(HoldingValuation {
            holding: holding.clone(),
            current_price,
            position_value,
            cost_basis,
            gain_loss,
            return_pct: percent(gain_loss, cost_basis),
            weight_pct: Decimal::ZERO,
        });
    }

    let total_value: Decimal = positions.iter().map(|p| p.position_value).sum();
    let total_cost: Decimal = positions.iter().map(|p| p.cost_basis).sum();
    let total_gain = total_value - total_cost;

    for position in &mut positions {
        position.weight_pct = percent(position.position_value, total_value);
    }

    debug!(positions = positions.len(), %total_value, "Valued holdings");

    Ok(PortfolioSummary {
        positions,
        total_value,
        total_cost,
        total_gain,
        total_return_pct: percent(total_gain, total_cost),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn prices(entries: &[(&str, Decimal)]) -> HashMap<String, Decimal> {
        entries.iter().map(|(s, p)| (s.to_string(), *p)).collect()
    }

    #[test]
    fn test_valuation() {
        let holdings = vec![
            Holding::new("AAPL", dec!(10), dec!(100)),
            Holding::new("MSFT", dec!(5), dec!(200)),
        ];
        let current = prices(&[("AAPL", dec!(150)), ("MSFT", dec!(180))]);
        let summary = value_holdings(&holdings, &current).unwrap();

        let aapl = &summary.positions[0];
        assert_eq!(aapl.position_value, dec!(1500));
        assert_eq!(aapl.cost_basis, dec!(1000));
        assert_eq!(aapl.gain_loss, dec!(500));
        assert_eq!(aapl.return_pct, dec!(50));

        let msft = &summary.positions[1];
        assert_eq!(msft.gain_loss, dec!(-100));
        assert_eq!(msft.return_pct, dec!(-10));

        assert_eq!(summary.total_value, dec!(2400));
        assert_eq!(summary.total_cost, dec!(2000));
        assert_eq!(summary.total_gain, dec!(400));
        assert_eq!(summary.total_return_pct, dec!(20));
    }

    #[test]
    fn test_weights_sum_to_hundred() {
        let holdings = vec![
            Holding::new("AAPL", dec!(1), dec!(10)),
            Holding::new("MSFT", dec!(1), dec!(10)),
            Holding::new("AMZN", dec!(2), dec!(10)),
        ];
        let summary = value_holdings(
            &holdings,
            &prices(&[("AAPL", dec!(10)), ("MSFT", dec!(10)), ("AMZN", dec!(10))]),
        )
        .unwrap();

        let total: Decimal = summary.positions.iter().map(|p| p.weight_pct).sum();
        assert_eq!(total, dec!(100));
        assert_eq!(summary.largest_position().unwrap().holding.symbol, "AMZN");
        assert_eq!(summary.positions[2].weight_pct, dec!(50));
    }

    #[test]
    fn test_rankings() {
        let holdings = vec![
            Holding::new("AAPL", dec!(1), dec!(100)),
            Holding::new("MSFT", dec!(1), dec!(100)),
            Holding::new("META", dec!(1), dec!(100)),
        ];
        let summary = value_holdings(
            &holdings,
            &prices(&[("AAPL", dec!(130)), ("MSFT", dec!(90)), ("META", dec!(110))]),
        )
        .unwrap();

        assert_eq!(summary.best_performer().unwrap().holding.symbol, "AAPL");
        assert_eq!(summary.worst_performer().unwrap().holding.symbol, "MSFT");
        assert_eq!(summary.smallest_position().unwrap().holding.symbol, "MSFT");
        assert_eq!(summary.average_return_pct(), Some(dec!(10)));

        let ordered: Vec<&str> = summary
            .by_return()
            .iter()
            .map(|p| p.holding.symbol.as_str())
            .collect();
        assert_eq!(ordered, vec!["AAPL", "META", "MSFT"]);
    }

    #[test]
    fn test_missing_price_is_an_error() {
        let holdings = vec![Holding::new("AAPL", dec!(1), dec!(100))];
        assert!(value_holdings(&holdings, &HashMap::new()).is_err());
    }

    #[test]
    fn test_invalid_holding_rejected() {
        let holdings = vec![Holding::new("AAPL", dec!(0), dec!(100))];
        assert!(value_holdings(&holdings, &prices(&[("AAPL", dec!(1))])).is_err());
    }

    #[test]
    fn test_empty_portfolio() {
        let summary = value_holdings(&[], &HashMap::new()).unwrap();
        assert_eq!(summary.total_value, Decimal::ZERO);
        assert_eq!(summary.total_return_pct, Decimal::ZERO);
        assert!(summary.best_performer().is_none());
        assert!(summary.average_return_pct().is_none());
    }
}
