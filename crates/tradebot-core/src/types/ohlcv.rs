//! OHLCV (Open, High, Low, Close, Volume) data types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single price bar.
///
/// Prices are kept as `Decimal` so that comparisons against the moving
/// average are exact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Bar open time
    pub timestamp: DateTime<Utc>,
    /// Opening price
    pub open: Decimal,
    /// Highest price
    pub high: Decimal,
    /// Lowest price
    pub low: Decimal,
    /// Closing price
    pub close: Decimal,
    /// Trading volume
    pub volume: Decimal,
}

impl Bar {
    /// Create a new bar.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Create a bar where every price equals `close`.
    pub fn flat(timestamp: DateTime<Utc>, close: Decimal) -> Self {
        Self::new(timestamp, close, close, close, close, Decimal::ZERO)
    }

    /// Calculate the bar's range (high - low).
    #[inline]
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    /// Check if the bar is bullish (close > open).
    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}

/// Extract close prices, oldest first.
pub fn closes(bars: &[Bar]) -> Vec<Decimal> {
    bars.iter().map(|b| b.close).collect()
}

/// Percentage change from the first close to the last close.
///
/// Returns `None` for fewer than one bar or a zero starting price.
pub fn total_return_pct(bars: &[Bar]) -> Option<Decimal> {
    let first = bars.first()?.close;
    let last = bars.last()?.close;
    if first.is_zero() {
        return None;
    }
    Some((last - first) / first * Decimal::ONE_HUNDRED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn bar_at(day: u32, close: Decimal) -> Bar {
        Bar::flat(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(), close)
    }

    #[test]
    fn test_bar_calculations() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let bar = Bar::new(ts, dec!(100), dec!(110), dec!(95), dec!(105), dec!(1000000));

        assert_eq!(bar.range(), dec!(15));
        assert!(bar.is_bullish());
    }

    #[test]
    fn test_closes_keep_order() {
        let bars = vec![bar_at(1, dec!(10)), bar_at(2, dec!(11)), bar_at(3, dec!(9.5))];
        assert_eq!(closes(&bars), vec![dec!(10), dec!(11), dec!(9.5)]);
    }

    #[test]
    fn test_total_return() {
        let bars = vec![bar_at(1, dec!(100)), bar_at(2, dec!(90)), bar_at(3, dec!(125))];
        assert_eq!(total_return_pct(&bars), Some(dec!(25)));

        assert_eq!(total_return_pct(&[]), None);
        assert_eq!(total_return_pct(&[bar_at(1, Decimal::ZERO)]), None);
    }
}
