//! Bar intervals, lookback ranges, and fetch requests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DataError;

/// Bar interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Interval {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "2m")]
    Minute2,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "60m")]
    Minute60,
    #[serde(rename = "90m")]
    Minute90,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "1d")]
    #[default]
    Daily,
    #[serde(rename = "5d")]
    Day5,
    #[serde(rename = "1wk")]
    Weekly,
    #[serde(rename = "1mo")]
    Monthly,
    #[serde(rename = "3mo")]
    Quarterly,
}

impl Interval {
    /// Minute-resolution intervals are only served for short lookbacks.
    pub fn is_minute(&self) -> bool {
        matches!(
            self,
            Interval::Minute1
                | Interval::Minute2
                | Interval::Minute5
                | Interval::Minute15
                | Interval::Minute30
        )
    }

    /// Check if this is an intraday interval.
    pub fn is_intraday(&self) -> bool {
        self.is_minute()
            || matches!(self, Interval::Minute60 | Interval::Minute90 | Interval::Hour1)
    }

    /// Longest lookback, in days, for which this interval is served.
    pub fn max_lookback_days(&self) -> Option<i64> {
        if self.is_minute() {
            Some(7)
        } else if self.is_intraday() {
            Some(730)
        } else {
            None
        }
    }

    /// Get all available intervals.
    pub fn all() -> &'static [Interval] {
        &[
            Interval::Minute1,
            Interval::Minute2,
            Interval::Minute5,
            Interval::Minute15,
            Interval::Minute30,
            Interval::Minute60,
            Interval::Minute90,
            Interval::Hour1,
            Interval::Daily,
            Interval::Day5,
            Interval::Weekly,
            Interval::Monthly,
            Interval::Quarterly,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute2 => "2m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Minute30 => "30m",
            Interval::Minute60 => "60m",
            Interval::Minute90 => "90m",
            Interval::Hour1 => "1h",
            Interval::Daily => "1d",
            Interval::Day5 => "5d",
            Interval::Weekly => "1wk",
            Interval::Monthly => "1mo",
            Interval::Quarterly => "3mo",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::all()
            .iter()
            .copied()
            .find(|i| i.as_str() == s.trim())
            .ok_or_else(|| DataError::InvalidInterval(s.to_string()))
    }
}

/// Lookback range ending now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Range {
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "5d")]
    #[default]
    Day5,
    #[serde(rename = "1mo")]
    Month1,
    #[serde(rename = "3mo")]
    Month3,
    #[serde(rename = "6mo")]
    Month6,
    #[serde(rename = "1y")]
    Year1,
    #[serde(rename = "2y")]
    Year2,
    #[serde(rename = "5y")]
    Year5,
    #[serde(rename = "10y")]
    Year10,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Range {
    /// Upper bound of the lookback in days.
    pub fn approx_days(&self) -> i64 {
        match self {
            Range::Day1 => 1,
            Range::Day5 => 5,
            Range::Month1 => 31,
            Range::Month3 => 92,
            Range::Month6 => 183,
            Range::Year1 | Range::YearToDate => 366,
            Range::Year2 => 730,
            Range::Year5 => 1827,
            Range::Year10 => 3653,
            Range::Max => i64::MAX,
        }
    }

    pub fn all() -> &'static [Range] {
        &[
            Range::Day1,
            Range::Day5,
            Range::Month1,
            Range::Month3,
            Range::Month6,
            Range::Year1,
            Range::Year2,
            Range::Year5,
            Range::Year10,
            Range::YearToDate,
            Range::Max,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Range::Day1 => "1d",
            Range::Day5 => "5d",
            Range::Month1 => "1mo",
            Range::Month3 => "3mo",
            Range::Month6 => "6mo",
            Range::Year1 => "1y",
            Range::Year2 => "2y",
            Range::Year5 => "5y",
            Range::Year10 => "10y",
            Range::YearToDate => "ytd",
            Range::Max => "max",
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Range {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Range::all()
            .iter()
            .copied()
            .find(|r| r.as_str() == s.trim())
            .ok_or_else(|| DataError::InvalidRange(s.to_string()))
    }
}

/// Time span covered by a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Span {
    /// Lookback range ending now
    Range(Range),
    /// Explicit calendar dates, end exclusive
    Between { start: NaiveDate, end: NaiveDate },
}

impl Span {
    pub fn days(&self) -> i64 {
        match self {
            Span::Range(range) => range.approx_days(),
            Span::Between { start, end } => (*end - *start).num_days(),
        }
    }
}

impl Default for Span {
    fn default() -> Self {
        Span::Range(Range::default())
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Span::Range(range) => write!(f, "range {}", range),
            Span::Between { start, end } => write!(f, "{} to {}", start, end),
        }
    }
}

/// A request for bars of one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub symbol: String,
    pub span: Span,
    pub interval: Interval,
}

impl FetchRequest {
    pub fn new(symbol: impl Into<String>, span: Span, interval: Interval) -> Self {
        Self {
            symbol: symbol.into(),
            span,
            interval,
        }
    }

    /// Request a lookback range ending now.
    pub fn range(symbol: impl Into<String>, range: Range, interval: Interval) -> Self {
        Self::new(symbol, Span::Range(range), interval)
    }

    /// Check the span and the interval/span combination.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.symbol.trim().is_empty() {
            return Err(DataError::SymbolNotFound(self.symbol.clone()));
        }
        // The symbol becomes a URL path segment
        if !self.symbol.chars().all(is_symbol_char) {
            return Err(DataError::InvalidSymbol(self.symbol.clone()));
        }
        if let Span::Between { start, end } = self.span {
            if start >= end {
                return Err(DataError::InvalidRange(format!(
                    "start {} must be before end {}",
                    start, end
                )));
            }
        }
        if let Some(max_days) = self.interval.max_lookback_days() {
            if self.span.days() > max_days {
                return Err(DataError::UnsupportedCombination {
                    interval: self.interval.to_string(),
                    span: self.span.to_string(),
                    max_days,
                });
            }
        }
        Ok(())
    }

    /// Downgrade an intraday interval that the span does not support to daily bars.
    pub fn normalized(&self) -> FetchRequest {
        match self.interval.max_lookback_days() {
            Some(max_days) if self.span.days() > max_days => FetchRequest {
                interval: Interval::Daily,
                ..self.clone()
            },
            _ => self.clone(),
        }
    }
}

fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_parse_and_display() {
        assert_eq!(Interval::from_str("1m").unwrap(), Interval::Minute1);
        assert_eq!(Interval::from_str("1wk").unwrap(), Interval::Weekly);
        assert_eq!(Interval::Daily.to_string(), "1d");
        assert!(Interval::from_str("10").is_err());
    }

    #[test]
    fn test_range_parse() {
        assert_eq!(Range::from_str("ytd").unwrap(), Range::YearToDate);
        assert_eq!(Range::from_str("10y").unwrap(), Range::Year10);
        assert!(Range::from_str("7d").is_err());
    }

    #[test]
    fn test_minute_interval_needs_short_span() {
        let ok = FetchRequest::range("AAPL", Range::Day5, Interval::Minute1);
        assert!(ok.validate().is_ok());

        let too_long = FetchRequest::range("AAPL", Range::Year1, Interval::Minute5);
        assert!(matches!(
            too_long.validate(),
            Err(DataError::UnsupportedCombination { max_days: 7, .. })
        ));

        let normalized = too_long.normalized();
        assert_eq!(normalized.interval, Interval::Daily);
        assert!(normalized.validate().is_ok());
    }

    #[test]
    fn test_dates_span() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 6).unwrap();

        let minute = FetchRequest::new("AAPL", Span::Between { start, end }, Interval::Minute1);
        assert!(minute.validate().is_ok());

        let reversed = FetchRequest::new(
            "AAPL",
            Span::Between { start: end, end: start },
            Interval::Daily,
        );
        assert!(matches!(reversed.validate(), Err(DataError::InvalidRange(_))));
    }

    #[test]
    fn test_empty_symbol_rejected() {
        let request = FetchRequest::range("  ", Range::Day5, Interval::Daily);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_symbol_characters() {
        for symbol in ["AAPL", "BRK-B", "BRK.B", "^GSPC", "EURUSD=X"] {
            let request = FetchRequest::range(symbol, Range::Day5, Interval::Daily);
            assert!(request.validate().is_ok(), "{} should be accepted", symbol);
        }
        for symbol in ["AAPL/../x", "AAPL?range=max", "AA PL", "MSFT#1"] {
            let request = FetchRequest::range(symbol, Range::Day5, Interval::Daily);
            assert!(
                matches!(request.validate(), Err(DataError::InvalidSymbol(_))),
                "{} should be rejected",
                symbol
            );
        }
    }
}
