//! Market data sources for the signal bot.

mod csv_source;
mod export;
mod tickers;
mod yahoo;

pub use csv_source::CsvDataSource;
pub use export::BarExporter;
pub use tickers::{load_tickers, FALLBACK_TICKERS};
pub use yahoo::YahooChartSource;

use tradebot_core::error::DataError;
use tradebot_core::types::{Bar, FetchRequest};
use tradebot_core::traits::MarketDataSource;

/// Load bars from a CSV file.
pub async fn load_csv(path: &str, request: &FetchRequest) -> Result<Vec<Bar>, DataError> {
    let source = CsvDataSource::new(path)?;
    source.fetch(request).await
}
