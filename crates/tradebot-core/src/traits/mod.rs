//! Core traits.

mod data_source;
mod executor;
mod indicator;

pub use data_source::MarketDataSource;
pub use executor::{ExecutionAdapter, ExecutionReport};
pub use indicator::Indicator;
