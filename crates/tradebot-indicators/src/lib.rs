//! Technical indicators.
//!
//! The signal engine only needs a simple moving average; it is computed
//! over `Decimal` closes so that equality with the latest close is exact.

pub mod moving_average;

pub use moving_average::{MovingAverageSeries, Sma};
