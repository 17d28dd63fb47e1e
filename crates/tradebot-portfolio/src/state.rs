//! Portfolio state and trade gating.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tradebot_core::types::{Side, Signal};

/// What the control loop should do with a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeAction {
    None,
    ExecuteBuy,
    ExecuteSell,
}

impl TradeAction {
    /// Side to hand to the execution adapter.
    pub fn side(&self) -> Option<Side> {
        match self {
            TradeAction::None => None,
            TradeAction::ExecuteBuy => Some(Side::Buy),
            TradeAction::ExecuteSell => Some(Side::Sell),
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeAction::None => "none",
            TradeAction::ExecuteBuy => "execute buy",
            TradeAction::ExecuteSell => "execute sell",
        };
        f.write_str(s)
    }
}

/// How a sell affects the trade counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SellPolicy {
    /// A sell frees the slot its buy used.
    #[default]
    ReleaseSlot,
    /// Trades count against the limit for the life of the process.
    ConsumeSlot,
}

/// Limits applied when turning signals into trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeGate {
    /// Maximum number of open buys
    pub trade_limit: usize,
    #[serde(default)]
    pub sell_policy: SellPolicy,
}

impl TradeGate {
    pub fn new(trade_limit: usize) -> Self {
        Self {
            trade_limit,
            sell_policy: SellPolicy::default(),
        }
    }

    pub fn with_sell_policy(mut self, sell_policy: SellPolicy) -> Self {
        self.sell_policy = sell_policy;
        self
    }
}

/// Symbols currently held and trades executed so far.
///
/// Values are never mutated in place: [`PortfolioState::apply_signal`]
/// returns the next state, which the caller commits only after the trade
/// went through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioState {
    held_symbols: BTreeSet<String>,
    trade_count: usize,
}

impl PortfolioState {
    /// Empty state for process start.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held_symbols(&self) -> &BTreeSet<String> {
        &self.held_symbols
    }

    pub fn trade_count(&self) -> usize {
        self.trade_count
    }

    pub fn holds(&self, symbol: &str) -> bool {
        self.held_symbols.contains(symbol)
    }

    /// Decide on `signal` for `symbol` and compute the state after the trade.
    ///
    /// With `TradeAction::None` the returned state equals `self`.
    pub fn apply_signal(
        &self,
        signal: Signal,
        symbol: &str,
        gate: &TradeGate,
    ) -> (PortfolioState, TradeAction) {
        match signal {
            Signal::Buy if self.trade_count < gate.trade_limit && !self.holds(symbol) => {
                let mut next = self.clone();
                next.held_symbols.insert(symbol.to_string());
                next.trade_count += 1;
                (next, TradeAction::ExecuteBuy)
            }
            Signal::Sell if self.holds(symbol) => {
                let mut next = self.clone();
                next.held_symbols.remove(symbol);
                if gate.sell_policy == SellPolicy::ReleaseSlot {
                    next.trade_count = next.trade_count.saturating_sub(1);
                }
                (next, TradeAction::ExecuteSell)
            }
            _ => (self.clone(), TradeAction::None),
        }
    }
}

impl fmt::Display for PortfolioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbols: Vec<&str> = self.held_symbols.iter().map(String::as_str).collect();
        write!(f, "trades={} holdings=[{}]", self.trade_count, symbols.join(", "))
    }
}
