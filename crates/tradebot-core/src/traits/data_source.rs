//! Market data source trait.

use crate::error::DataError;
use crate::types::{Bar, FetchRequest, Interval, Range};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Supplies price bars for a symbol.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch bars for the request.
    ///
    /// # Returns
    /// A vector of bars ordered from oldest to newest
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Bar>, DataError>;

    /// Get the most recent close for a symbol.
    async fn latest_close(&self, symbol: &str) -> Result<Decimal, DataError> {
        let request = FetchRequest::range(symbol, Range::Day5, Interval::Daily);
        let bars = self.fetch(&request).await?;
        bars.last().map(|b| b.close).ok_or(DataError::NoDataAvailable)
    }

    /// Get the data source name.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: MarketDataSource + ?Sized> MarketDataSource for Arc<T> {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Bar>, DataError> {
        (**self).fetch(request).await
    }

    async fn latest_close(&self, symbol: &str) -> Result<Decimal, DataError> {
        (**self).latest_close(symbol).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    struct FixedSource {
        closes: Vec<Decimal>,
    }

    #[async_trait]
    impl MarketDataSource for FixedSource {
        async fn fetch(&self, _request: &FetchRequest) -> Result<Vec<Bar>, DataError> {
            Ok(self
                .closes
                .iter()
                .enumerate()
                .map(|(i, c)| {
                    Bar::flat(Utc.timestamp_opt(i as i64 * 86_400, 0).unwrap(), *c)
                })
                .collect())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_latest_close_uses_newest_bar() {
        let source = FixedSource {
            closes: vec![dec!(1), dec!(2), dec!(3)],
        };
        assert_eq!(source.latest_close("AAPL").await.unwrap(), dec!(3));

        let shared = Arc::new(source);
        assert_eq!(shared.latest_close("AAPL").await.unwrap(), dec!(3));
        assert_eq!(shared.name(), "fixed");
    }

    #[tokio::test]
    async fn test_latest_close_without_bars() {
        let source = FixedSource { closes: vec![] };
        assert!(matches!(
            source.latest_close("AAPL").await,
            Err(DataError::NoDataAvailable)
        ));
    }
}
