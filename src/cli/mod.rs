//! CLI definitions.

pub mod commands;
pub mod prompt;
pub mod setup;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tradebot_core::types::{Interval, Range};

#[derive(Parser)]
#[command(name = "tradebot")]
#[command(author, version, about = "Moving-average signal bot")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (defaults to logging.level from the config file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the polling bot
    Run(RunArgs),
    /// Download bars for one symbol to CSV, prompting for missing options
    Fetch(FetchArgs),
    /// Evaluate the current signal for one symbol
    Signal(SignalArgs),
    /// Compare the total return of two symbols
    Compare(CompareArgs),
    /// Value manually entered positions at current prices
    Portfolio(PortfolioArgs),
    /// List the ticker universe
    Tickers(TickersArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Symbols to trade (comma-separated), overrides bot.symbols
    #[arg(short = 'S', long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Record trades in memory instead of using the configured adapter
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::Args)]
pub struct FetchArgs {
    /// Ticker symbol
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Lookback range ending now (1d, 5d, 1mo, ... max)
    #[arg(short, long, conflicts_with_all = ["start", "end"])]
    pub range: Option<Range>,

    /// Start date (YYYY-MM-DD)
    #[arg(long, requires = "end")]
    pub start: Option<NaiveDate>,

    /// End date (YYYY-MM-DD, exclusive)
    #[arg(long, requires = "start")]
    pub end: Option<NaiveDate>,

    /// Bar interval (1m, 5m, 1h, 1d, ...)
    #[arg(short, long)]
    pub interval: Option<Interval>,

    /// Output CSV file, defaults to data.export_path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct SignalArgs {
    /// Ticker symbol
    #[arg(short, long)]
    pub symbol: String,

    /// Moving average window, overrides bot.window_size
    #[arg(short, long)]
    pub window: Option<usize>,
}

#[derive(clap::Args)]
pub struct CompareArgs {
    /// First symbol
    pub first: String,

    /// Second symbol
    pub second: String,

    /// Lookback range
    #[arg(short, long, default_value = "1y")]
    pub range: Range,

    /// Bar interval
    #[arg(short, long, default_value = "1d")]
    pub interval: Interval,
}

#[derive(clap::Args)]
pub struct PortfolioArgs {
    /// Position as SYMBOL:SHARES:ENTRY_PRICE[:YYYY-MM-DD], repeatable
    #[arg(short, long = "position", required = true)]
    pub positions: Vec<String>,

    /// Order positions by descending return
    #[arg(long)]
    pub by_return: bool,
}

#[derive(clap::Args)]
pub struct TickersArgs {
    /// Constituents CSV with a Symbol column, defaults to data.tickers_file
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}
