//! Running counters for a bot session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tradebot_core::types::{Side, Signal};

/// Counters kept across control loop iterations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub started_at: DateTime<Utc>,
    pub iterations: u64,
    pub buy_signals: u64,
    pub sell_signals: u64,
    pub hold_signals: u64,
    pub buys_executed: u64,
    pub sells_executed: u64,
    pub fetch_failures: u64,
    pub execution_failures: u64,
    pub export_failures: u64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            iterations: 0,
            buy_signals: 0,
            sell_signals: 0,
            hold_signals: 0,
            buys_executed: 0,
            sells_executed: 0,
            fetch_failures: 0,
            execution_failures: 0,
            export_failures: 0,
        }
    }

    pub fn record_iteration(&mut self) {
        self.iterations += 1;
    }

    pub fn record_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Buy => self.buy_signals += 1,
            Signal::Sell => self.sell_signals += 1,
            Signal::Hold => self.hold_signals += 1,
        }
    }

    pub fn record_execution(&mut self, side: Side) {
        match side {
            Side::Buy => self.buys_executed += 1,
            Side::Sell => self.sells_executed += 1,
        }
    }

    pub fn record_fetch_failure(&mut self) {
        self.fetch_failures += 1;
    }

    pub fn record_execution_failure(&mut self) {
        self.execution_failures += 1;
    }

    pub fn record_export_failure(&mut self) {
        self.export_failures += 1;
    }

    pub fn trades_executed(&self) -> u64 {
        self.buys_executed + self.sells_executed
    }

    pub fn failures(&self) -> u64 {
        self.fetch_failures + self.execution_failures + self.export_failures
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "iterations={} signals(buy/sell/hold)={}/{}/{} trades={} failures={}",
            self.iterations,
            self.buy_signals,
            self.sell_signals,
            self.hold_signals,
            self.trades_executed(),
            self.failures()
        )
    }
}
