//! Manual data retrieval command.

use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tradebot_core::types::{FetchRequest, Interval, Span};
use tradebot_data::BarExporter;

use crate::cli::prompt::Prompter;
use crate::cli::setup::{build_source, load_or_default, supported};
use crate::cli::FetchArgs;

const DEFAULT_OUTPUT: &str = "bars.csv";

pub async fn run(args: FetchArgs, config_path: &Path) -> Result<()> {
    let config = load_or_default(config_path)?;

    let request = {
        let stdin = io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), io::stdout());
        resolve_request(&args, &mut prompter)?
    };
    let request = supported(request)?;

    let output = args
        .output
        .or_else(|| config.data.export_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let source = build_source(&config.data)?;
    let bars = source
        .fetch(&request)
        .await
        .with_context(|| format!("Failed to fetch bars for {}", request.symbol))?;

    BarExporter::new(&output)
        .write(&request.symbol, &bars)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(symbol = %request.symbol, bars = bars.len(), path = %output.display(), "Bars exported");
    println!(
        "Saved {} {} bars for {} ({}) to {}",
        bars.len(),
        request.interval,
        request.symbol,
        request.span,
        output.display()
    );
    Ok(())
}

/// Fill in whatever the command line left out by asking.
///
/// Explicit dates always use daily bars unless an interval was given.
fn resolve_request<R: BufRead, W: Write>(
    args: &FetchArgs,
    prompter: &mut Prompter<R, W>,
) -> Result<FetchRequest> {
    let symbol = match &args.symbol {
        Some(symbol) => symbol.clone(),
        None => prompter.ask("Ticker symbol: ")?,
    }
    .trim()
    .to_uppercase();

    let (span, interval) = match (args.start, args.end, args.range) {
        (Some(start), Some(end), _) => (
            Span::Between { start, end },
            args.interval.unwrap_or(Interval::Daily),
        ),
        (_, _, Some(range)) => (Span::Range(range), interval_or_ask(args, prompter)?),
        _ => {
            if prompter.confirm("Historical data? (y/n): ")? {
                let start = prompter.ask_parsed("Start date (YYYY-MM-DD): ")?;
                let end = prompter.ask_parsed("End date (YYYY-MM-DD): ")?;
                (
                    Span::Between { start, end },
                    args.interval.unwrap_or(Interval::Daily),
                )
            } else {
                prompter.say("Minute intervals cover at most 7 days, hourly at most 730")?;
                let range = prompter.ask_parsed("Period (1d, 5d, 1mo, 3mo, 6mo, 1y, ...): ")?;
                (Span::Range(range), interval_or_ask(args, prompter)?)
            }
        }
    };

    Ok(FetchRequest::new(symbol, span, interval))
}

fn interval_or_ask<R: BufRead, W: Write>(
    args: &FetchArgs,
    prompter: &mut Prompter<R, W>,
) -> Result<Interval> {
    match args.interval {
        Some(interval) => Ok(interval),
        None => prompter.ask_parsed("Interval (1m, 5m, 15m, 1h, 1d, 1wk, ...): "),
    }
}
