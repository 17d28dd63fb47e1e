//! Portfolio bookkeeping for the signal bot.
//!
//! This crate provides:
//! - The in-memory portfolio state and its pure trade-gating transition
//! - Valuation of manually entered holdings

mod holdings;
mod state;

pub use holdings::{value_holdings, Holding, HoldingValuation, PortfolioSummary};
pub use state::{PortfolioState, SellPolicy, TradeAction, TradeGate};
