//! Ticker universe loaded from a constituents file.

use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};
use tradebot_core::error::DataError;

/// Used when no constituents file is present.
pub const FALLBACK_TICKERS: [&str; 5] = ["AAPL", "GOOGL", "MSFT", "AMZN", "META"];

/// Read the `Symbol` column of a constituents CSV.
///
/// A missing file yields [`FALLBACK_TICKERS`]; any other failure is an error.
pub fn load_tickers(path: impl AsRef<Path>) -> Result<Vec<String>, DataError> {
    let path = path.as_ref();
    let mut reader = match csv::ReaderBuilder::new().has_headers(true).from_path(path) {
        Ok(reader) => reader,
        Err(e) => {
            if let csv::ErrorKind::Io(io) = e.kind() {
                if io.kind() == ErrorKind::NotFound {
                    warn!(path = %path.display(), "No constituents file, using fallback tickers");
                    return Ok(FALLBACK_TICKERS.iter().map(|s| s.to_string()).collect());
                }
            }
            return Err(DataError::ParseError(e.to_string()));
        }
    };

    let headers = reader
        .headers()
        .map_err(|e| DataError::ParseError(e.to_string()))?;
    let column = headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case("symbol"))
        .ok_or_else(|| DataError::ParseError(format!("{} has no Symbol column", path.display())))?;

    let mut tickers = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DataError::ParseError(e.to_string()))?;
        if let Some(symbol) = record.get(column).map(str::trim).filter(|s| !s.is_empty()) {
            tickers.push(symbol.to_string());
        }
    }

    info!(path = %path.display(), count = tickers.len(), "Loaded tickers");
    Ok(tickers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_symbol_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Symbol,Security,Sector").unwrap();
        writeln!(file, "MMM,3M,Industrials").unwrap();
        writeln!(file, "AOS,A. O. Smith,Industrials").unwrap();

        let tickers = load_tickers(file.path()).unwrap();
        assert_eq!(tickers, vec!["MMM", "AOS"]);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let tickers = load_tickers("/no/such/constituents.csv").unwrap();
        assert_eq!(tickers.len(), FALLBACK_TICKERS.len());
        assert_eq!(tickers[0], "AAPL");
    }

    #[test]
    fn test_missing_column_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Ticker,Name").unwrap();
        writeln!(file, "MMM,3M").unwrap();
        assert!(load_tickers(file.path()).is_err());
    }
}
