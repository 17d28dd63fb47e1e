//! Execution adapters.
//!
//! Each adapter turns a (symbol, side) decision into a real or simulated
//! trade:
//! - `PaperExecutor` keeps trades in memory
//! - `CommandExecutor` hands the trade to an external automation program
//! - `AlpacaExecutor` places market orders through the Alpaca REST API

mod alpaca;
mod command;
mod paper;

pub use alpaca::{AlpacaConfig, AlpacaExecutor};
pub use command::CommandExecutor;
pub use paper::PaperExecutor;
