//! Core types and traits for the signal bot.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, Interval, Range, FetchRequest)
//! - Trading signals and order sides
//! - Core traits for market data sources, execution adapters, and indicators

pub mod error;
pub mod traits;
pub mod types;

pub use error::{TradingError, TradingResult};
pub use traits::*;
pub use types::*;
