//! Spreadsheet export of the most recent fetch.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tradebot_core::error::DataError;
use tradebot_core::types::Bar;

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Symbol")]
    symbol: &'a str,
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Open")]
    open: Decimal,
    #[serde(rename = "High")]
    high: Decimal,
    #[serde(rename = "Low")]
    low: Decimal,
    #[serde(rename = "Close")]
    close: Decimal,
    #[serde(rename = "Volume")]
    volume: Decimal,
}

/// Writes fetched bars to a CSV file, replacing its previous contents.
#[derive(Debug, Clone)]
pub struct BarExporter {
    path: PathBuf,
}

impl BarExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the export with `bars`.
    pub fn write(&self, symbol: &str, bars: &[Bar]) -> Result<(), DataError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DataError::ExportError(e.to_string()))?;
        }

        let mut writer =
            csv::Writer::from_path(&self.path).map_err(|e| DataError::ExportError(e.to_string()))?;

        for bar in bars {
            writer
                .serialize(ExportRow {
                    symbol,
                    timestamp: bar.timestamp.to_rfc3339(),
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                    volume: bar.volume,
                })
                .map_err(|e| DataError::ExportError(e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| DataError::ExportError(e.to_string()))?;

        debug!(path = %self.path.display(), %symbol, rows = bars.len(), "Exported bars");
        Ok(())
    }
}
