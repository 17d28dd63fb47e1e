//! CSV data source.
//!
//! Replays bars from a file, either a plain OHLCV download or a file
//! written by [`crate::BarExporter`].

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use tradebot_core::error::DataError;
use tradebot_core::traits::MarketDataSource;
use tradebot_core::types::{Bar, FetchRequest, Span};

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Symbol", default)]
    symbol: Option<String>,
    #[serde(
        alias = "Date",
        alias = "Datetime",
        alias = "date",
        alias = "timestamp",
        alias = "Timestamp"
    )]
    date: String,
    #[serde(alias = "Open")]
    open: Decimal,
    #[serde(alias = "High")]
    high: Decimal,
    #[serde(alias = "Low")]
    low: Decimal,
    #[serde(alias = "Close")]
    close: Decimal,
    #[serde(alias = "Volume", default)]
    volume: Decimal,
}

/// CSV data source for historical data.
pub struct CsvDataSource {
    path: PathBuf,
    tail: Option<usize>,
}

impl CsvDataSource {
    /// Create a new CSV data source.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::NoDataAvailable);
        }
        Ok(Self {
            path: path.to_path_buf(),
            tail: None,
        })
    }

    /// Only return the most recent `n` bars of each fetch.
    pub fn with_tail(mut self, n: usize) -> Self {
        self.tail = Some(n);
        self
    }

    /// Load all bars from the file, optionally keeping one symbol.
    pub fn load_all(&self, symbol: Option<&str>) -> Result<Vec<Bar>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let mut bars = Vec::new();

        for result in reader.deserialize() {
            let record: CsvRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;

            if let (Some(wanted), Some(found)) = (symbol, record.symbol.as_deref()) {
                if !found.eq_ignore_ascii_case(wanted) {
                    continue;
                }
            }

            bars.push(Bar::new(
                parse_timestamp(&record.date)?,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            ));
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

#[async_trait]
impl MarketDataSource for CsvDataSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Bar>, DataError> {
        let mut bars = self.load_all(Some(&request.symbol))?;

        if let Span::Between { start, end } = request.span {
            bars.retain(|b| {
                let day = b.timestamp.date_naive();
                day >= start && day < end
            });
        }

        if let Some(n) = self.tail {
            let skip = bars.len().saturating_sub(n);
            bars.drain(..skip);
        }

        if bars.is_empty() {
            return Err(DataError::NoDataAvailable);
        }

        debug!(path = %self.path.display(), bars = bars.len(), "Loaded CSV bars");
        Ok(bars)
    }

    fn name(&self) -> &str {
        "CSV"
    }
}

/// Parse various timestamp formats.
fn parse_timestamp(date_str: &str) -> Result<DateTime<Utc>, DataError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(dt.with_timezone(&Utc));
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%z", "%Y-%m-%dT%H:%M:%S"];
    for format in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    for format in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc());
            }
        }
    }

    // Unix timestamp, milliseconds if > 10 digits
    if let Ok(ts) = date_str.parse::<i64>() {
        let parsed = if ts > 10_000_000_000 {
            DateTime::from_timestamp_millis(ts)
        } else {
            DateTime::from_timestamp(ts, 0)
        };
        if let Some(dt) = parsed {
            return Ok(dt);
        }
    }

    Err(DataError::ParseError(format!(
        "Could not parse date: {}",
        date_str
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;
    use tradebot_core::types::{Interval, Range};

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2024-01-15").is_ok());
        assert!(parse_timestamp("2024-01-15 10:30:00").is_ok());
        assert!(parse_timestamp("2024-01-15T10:30:00+00:00").is_ok());
        assert!(parse_timestamp("1705312800000").is_ok());
        assert!(parse_timestamp("1705312800").is_ok());
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[tokio::test]
    async fn test_loads_sorted_bars() {
        let file = write_csv(
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-03,11,12,10,11.5,11.4,100\n\
             2024-01-02,10,11,9,10.5,10.4,200\n",
        );
        let source = CsvDataSource::new(file.path()).unwrap();
        let request = FetchRequest::range("AAPL", Range::Max, Interval::Daily);
        let bars = source.fetch(&request).await.unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, dec!(10.5));
        assert_eq!(bars[1].close, dec!(11.5));
    }

    #[tokio::test]
    async fn test_filters_symbol_span_and_tail() {
        let file = write_csv(
            "Symbol,Timestamp,Open,High,Low,Close,Volume\n\
             AAPL,2024-01-02T00:00:00Z,1,1,1,1,0\n\
             MSFT,2024-01-02T00:00:00Z,9,9,9,9,0\n\
             AAPL,2024-01-03T00:00:00Z,2,2,2,2,0\n\
             AAPL,2024-01-04T00:00:00Z,3,3,3,3,0\n\
             AAPL,2024-01-05T00:00:00Z,4,4,4,4,0\n",
        );

        let source = CsvDataSource::new(file.path()).unwrap().with_tail(2);
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let request = FetchRequest::new("AAPL", Span::Between { start, end }, Interval::Daily);
        let bars = source.fetch(&request).await.unwrap();

        let closes: Vec<Decimal> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![dec!(2), dec!(3)]);
    }

    #[tokio::test]
    async fn test_unknown_symbol_has_no_data() {
        let file =
            write_csv("Symbol,Timestamp,Open,High,Low,Close,Volume\nAAPL,2024-01-02,1,1,1,1,0\n");
        let source = CsvDataSource::new(file.path()).unwrap();
        let request = FetchRequest::range("MSFT", Range::Max, Interval::Daily);
        assert!(matches!(
            source.fetch(&request).await,
            Err(DataError::NoDataAvailable)
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(CsvDataSource::new("/definitely/not/here.csv").is_err());
    }
}
