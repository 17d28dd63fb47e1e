//! Error types for the signal bot.

use std::time::Duration;
use thiserror::Error;

/// Top-level error.
#[derive(Error, Debug)]
pub enum TradingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Market data errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Interval {interval} is not available for {span} (limit: {max_days} days)")]
    UnsupportedCombination {
        interval: String,
        span: String,
        max_days: i64,
    },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Export error: {0}")]
    ExportError(String),
}

/// Execution adapter errors.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Order rejected: {0}")]
    Rejected(String),

    #[error("Position not found: {0}")]
    PositionNotFound(String),

    #[error("Automation command failed ({status}): {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("Execution timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Indicator calculation errors.
#[derive(Error, Debug)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for bot operations.
pub type TradingResult<T> = Result<T, TradingError>;
