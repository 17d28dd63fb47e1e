//! Close-versus-SMA signal engine.
//!
//! Generates BUY when the latest close is above its trailing simple moving
//! average, SELL when below, and HOLD otherwise. There is no smoothing or
//! confirmation: adjacent polls may flip direction freely.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tradebot_core::error::IndicatorError;
use tradebot_core::traits::Indicator;
use tradebot_core::types::{closes, Bar, Signal};
use tradebot_indicators::Sma;

/// Derive a signal from the newest bar.
///
/// Returns HOLD for a zero window or when fewer than `window_size` bars exist.
pub fn compute_signal(bars: &[Bar], window_size: usize) -> Signal {
    match SignalEngine::new(window_size) {
        Ok(engine) => engine.evaluate(bars).signal,
        Err(_) => Signal::Hold,
    }
}

/// Inputs and result of one evaluation, kept for logging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalEvaluation {
    pub signal: Signal,
    /// Newest close, if any bars were supplied
    pub close: Option<Decimal>,
    /// Trailing average, `None` with insufficient history
    pub moving_average: Option<Decimal>,
    pub bars: usize,
}

impl SignalEvaluation {
    /// Same inputs, different decision.
    pub fn overridden(mut self, signal: Signal) -> Self {
        self.signal = signal;
        self
    }
}

/// Signal engine with a fixed moving average window.
#[derive(Debug, Clone)]
pub struct SignalEngine {
    sma: Sma,
}

impl SignalEngine {
    /// Create an engine averaging over `window_size` closes.
    pub fn new(window_size: usize) -> Result<Self, IndicatorError> {
        Ok(Self {
            sma: Sma::new(window_size)?,
        })
    }

    pub fn window_size(&self) -> usize {
        self.sma.period()
    }

    /// Evaluate the newest bar of `bars` (oldest first).
    pub fn evaluate(&self, bars: &[Bar]) -> SignalEvaluation {
        let close = bars.last().map(|b| b.close);
        let moving_average = self.sma.latest(&closes(bars));

        let signal = match (close, moving_average) {
            (Some(close), Some(ma)) => match close.cmp(&ma) {
                Ordering::Greater => Signal::Buy,
                Ordering::Less => Signal::Sell,
                Ordering::Equal => Signal::Hold,
            },
            _ => Signal::Hold,
        };

        SignalEvaluation {
            signal,
            close,
            moving_average,
            bars: bars.len(),
        }
    }
}
