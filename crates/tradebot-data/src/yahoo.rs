//! Yahoo Finance chart API data source.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{header, Client};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};
use tradebot_core::error::DataError;
use tradebot_core::traits::MarketDataSource;
use tradebot_core::types::{Bar, FetchRequest, Span};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) tradebot/0.1";

/// Prices arrive as binary floats; keep four decimal places.
const PRICE_DP: u32 = 4;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn to_price(value: Option<f64>) -> Option<Decimal> {
    value
        .and_then(|v| Decimal::try_from(v).ok())
        .map(|d| d.round_dp(PRICE_DP))
}

fn column(values: &[Option<f64>], index: usize) -> Option<f64> {
    values.get(index).copied().flatten()
}

fn chart_error(symbol: &str, error: ChartError) -> DataError {
    if error.code.eq_ignore_ascii_case("not found") {
        DataError::SymbolNotFound(symbol.to_string())
    } else {
        DataError::ApiError(format!("{}: {}", error.code, error.description))
    }
}

/// Turn a chart response body into chronological bars.
///
/// Rows without a close (halts, pre-market gaps) are skipped; missing
/// open/high/low fall back to the close.
fn parse_chart(symbol: &str, body: &str) -> Result<Vec<Bar>, DataError> {
    let response: ChartResponse =
        serde_json::from_str(body).map_err(|e| DataError::ParseError(e.to_string()))?;

    if let Some(error) = response.chart.error {
        return Err(chart_error(symbol, error));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or(DataError::NoDataAvailable)?;
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(close) = to_price(column(&quote.close, i)) else {
            continue;
        };
        let Some(timestamp) = DateTime::<Utc>::from_timestamp(ts, 0) else {
            continue;
        };
        bars.push(Bar::new(
            timestamp,
            to_price(column(&quote.open, i)).unwrap_or(close),
            to_price(column(&quote.high, i)).unwrap_or(close),
            to_price(column(&quote.low, i)).unwrap_or(close),
            close,
            to_price(column(&quote.volume, i))
                .map(|v| v.round_dp(0))
                .unwrap_or_default(),
        ));
    }

    if bars.is_empty() {
        return Err(DataError::NoDataAvailable);
    }

    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Chart data from the public Yahoo Finance endpoint.
pub struct YahooChartSource {
    client: Client,
    base_url: String,
}

impl YahooChartSource {
    /// Create a source against the public endpoint.
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Create a source against another host serving the same API.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DataError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn query(request: &FetchRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![("interval", request.interval.to_string())];
        match request.span {
            Span::Range(range) => params.push(("range", range.to_string())),
            Span::Between { start, end } => {
                params.push(("period1", unix_midnight(start).to_string()));
                params.push(("period2", unix_midnight(end).to_string()));
            }
        }
        params
    }
}

#[async_trait]
impl MarketDataSource for YahooChartSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Bar>, DataError> {
        request.validate()?;

        let url = format!("{}/v8/finance/chart/{}", self.base_url, request.symbol);
        debug!(
            symbol = %request.symbol,
            span = %request.span,
            interval = %request.interval,
            "Fetching chart"
        );

        let resp = self
            .client
            .get(&url)
            .query(&Self::query(request))
            .send()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        if !status.is_success() {
            // Error bodies usually carry a chart.error object.
            if let Ok(ChartResponse {
                chart: ChartBody {
                    error: Some(error), ..
                },
            }) = serde_json::from_str::<ChartResponse>(&body)
            {
                return Err(chart_error(&request.symbol, error));
            }
            warn!(symbol = %request.symbol, %status, "Chart request failed");
            return Err(DataError::ApiError(format!("{}: {}", status, body)));
        }

        let bars = parse_chart(&request.symbol, &body)?;
        debug!(symbol = %request.symbol, bars = bars.len(), "Fetched chart");
        Ok(bars)
    }

    fn name(&self) -> &str {
        "Yahoo Finance"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tradebot_core::types::{Interval, Range};

    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"symbol": "AAPL", "currency": "USD"},
                "timestamp": [1704205800, 1704205860, 1704205920],
                "indicators": {
                    "quote": [{
                        "open":   [185.5, null, 185.75],
                        "high":   [185.9, null, 186.0],
                        "low":    [185.1, null, 185.6],
                        "close":  [185.6400146484375, null, 185.8],
                        "volume": [120000, null, 98000]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_chart_skips_null_rows() {
        let bars = parse_chart("AAPL", CHART).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, dec!(185.6400));
        assert_eq!(bars[0].volume, dec!(120000));
        assert_eq!(bars[1].close, dec!(185.8));
        assert!(bars[0].timestamp < bars[1].timestamp);
    }

    #[test]
    fn test_parse_chart_error_object() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(matches!(
            parse_chart("NOPE", body),
            Err(DataError::SymbolNotFound(s)) if s == "NOPE"
        ));
    }

    #[test]
    fn test_parse_chart_without_rows() {
        let body = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(matches!(parse_chart("AAPL", body), Err(DataError::NoDataAvailable)));
    }

    #[test]
    fn test_parse_chart_garbage() {
        assert!(matches!(
            parse_chart("AAPL", "<html>"),
            Err(DataError::ParseError(_))
        ));
    }

    #[test]
    fn test_query_params() {
        let request = FetchRequest::range("AAPL", Range::Day5, Interval::Minute1);
        let params = YahooChartSource::query(&request);
        assert!(params.contains(&("interval", "1m".to_string())));
        assert!(params.contains(&("range", "5d".to_string())));

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let request = FetchRequest::new("AAPL", Span::Between { start, end }, Interval::Daily);
        let params = YahooChartSource::query(&request);
        assert!(params.contains(&("period1", "1704067200".to_string())));
        assert!(params.contains(&("period2", "1704153600".to_string())));
    }

    #[tokio::test]
    async fn test_fetch_rejects_unsupported_combination() {
        let source = YahooChartSource::with_base_url("http://127.0.0.1:9").unwrap();
        let request = FetchRequest::range("AAPL", Range::Year10, Interval::Minute1);
        assert!(matches!(
            source.fetch(&request).await,
            Err(DataError::UnsupportedCombination { .. })
        ));
    }
}
