//! CLI command implementations.

pub mod compare;
pub mod fetch;
pub mod portfolio;
pub mod run;
pub mod signal;
pub mod tickers;
pub mod validate;
