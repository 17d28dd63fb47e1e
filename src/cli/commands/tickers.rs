//! Ticker universe command.

use anyhow::{Context, Result};
use std::path::Path;
use tradebot_data::load_tickers;

use crate::cli::setup::load_or_default;
use crate::cli::TickersArgs;

pub async fn run(args: TickersArgs, config_path: &Path) -> Result<()> {
    let path = match args.file {
        Some(file) => file,
        None => load_or_default(config_path)?.data.tickers_file.into(),
    };

    let tickers = load_tickers(&path)
        .with_context(|| format!("Failed to read tickers from {}", path.display()))?;

    println!("{} tickers", tickers.len());
    for chunk in tickers.chunks(10) {
        println!("  {}", chunk.join(" "));
    }
    Ok(())
}
