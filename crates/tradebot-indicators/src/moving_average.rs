//! Moving average indicators.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tradebot_core::error::IndicatorError;
use tradebot_core::traits::Indicator;

/// Simple Moving Average (SMA).
///
/// Calculates the arithmetic mean of the last N values.
#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
}

impl Sma {
    /// Create a new SMA with the specified period.
    pub fn new(period: usize) -> Result<Self, IndicatorError> {
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "Period must be greater than 0".into(),
            ));
        }
        Ok(Self { period })
    }

    /// Mean of the trailing `period` values, or `None` with too little history.
    pub fn latest(&self, data: &[Decimal]) -> Option<Decimal> {
        if data.len() < self.period {
            return None;
        }
        let window = &data[data.len() - self.period..];
        let sum: Decimal = window.iter().sum();
        Some(sum / Decimal::from(self.period))
    }

    /// Calculate an index-aligned series over `data`.
    pub fn series(&self, data: &[Decimal]) -> MovingAverageSeries {
        MovingAverageSeries {
            period: self.period,
            values: self.calculate(data),
        }
    }
}

impl Indicator for Sma {
    type Output = Option<Decimal>;

    fn calculate(&self, data: &[Decimal]) -> Vec<Option<Decimal>> {
        let mut result = Vec::with_capacity(data.len());
        let period = Decimal::from(self.period);
        let mut sum = Decimal::ZERO;

        for (i, value) in data.iter().enumerate() {
            sum += value;
            if i >= self.period {
                sum -= data[i - self.period];
            }
            if i + 1 >= self.period {
                result.push(Some(sum / period));
            } else {
                result.push(None);
            }
        }

        result
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "SMA"
    }
}

/// Moving average values aligned index-for-index with their input.
///
/// Entries before the first full window are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageSeries {
    period: usize,
    values: Vec<Option<Decimal>>,
}

impl MovingAverageSeries {
    pub fn period(&self) -> usize {
        self.period
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, `None` when undefined or out of bounds.
    pub fn get(&self, index: usize) -> Option<Decimal> {
        self.values.get(index).copied().flatten()
    }

    /// Value at the newest index.
    pub fn last(&self) -> Option<Decimal> {
        self.values.last().copied().flatten()
    }

    pub fn values(&self) -> &[Option<Decimal>] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sma_rejects_zero_period() {
        assert!(Sma::new(0).is_err());
    }

    #[test]
    fn test_sma_alignment() {
        let sma = Sma::new(3).unwrap();
        let data = vec![dec!(1), dec!(2), dec!(3), dec!(4), dec!(5)];
        let values = sma.calculate(&data);

        assert_eq!(values.len(), data.len());
        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        assert_eq!(values[2], Some(dec!(2)));
        assert_eq!(values[3], Some(dec!(3)));
        assert_eq!(values[4], Some(dec!(4)));
    }

    #[test]
    fn test_sma_latest_matches_series() {
        let sma = Sma::new(5).unwrap();
        let data = vec![dec!(10), dec!(10), dec!(10), dec!(10), dec!(10), dec!(12)];

        assert_eq!(sma.latest(&data), Some(dec!(10.4)));
        assert_eq!(sma.series(&data).last(), sma.latest(&data));
    }

    #[test]
    fn test_sma_insufficient_history_is_undefined() {
        let sma = Sma::new(4).unwrap();
        let data = vec![dec!(1), dec!(2), dec!(3)];

        assert_eq!(sma.latest(&data), None);
        let series = sma.series(&data);
        assert_eq!(series.len(), 3);
        assert!(series.values().iter().all(Option::is_none));
        assert!(sma.validate_data(&data).is_err());
    }
}
