//! Construction of sources, adapters, and loop settings from configuration.

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tradebot_broker::{AlpacaConfig, AlpacaExecutor, CommandExecutor, PaperExecutor};
use tradebot_config::{
    load_config, AdapterKind, AppConfig, BotSettings, DataSettings, DataSourceKind,
    ExecutionSettings, RetryKind,
};
use tradebot_core::error::DataError;
use tradebot_core::traits::{ExecutionAdapter, MarketDataSource};
use tradebot_core::types::FetchRequest;
use tradebot_data::{CsvDataSource, YahooChartSource};
use tradebot_engine::RetryPolicy;

/// Load the config file, or fall back to defaults when it does not exist.
pub fn load_or_default(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(AppConfig::default());
    }
    load_config(path).with_context(|| format!("Failed to load config from {}", path.display()))
}

pub fn build_source(settings: &DataSettings) -> Result<Arc<dyn MarketDataSource>> {
    let source: Arc<dyn MarketDataSource> = match settings.source {
        DataSourceKind::Yahoo => {
            let source = match &settings.base_url {
                Some(url) => YahooChartSource::with_base_url(url.as_str()),
                None => YahooChartSource::new(),
            }
            .context("Failed to create chart API client")?;
            Arc::new(source)
        }
        DataSourceKind::Csv => {
            let path = settings
                .csv_path
                .as_deref()
                .context("data.csv_path is required for the csv source")?;
            let mut source = CsvDataSource::new(path)
                .with_context(|| format!("Failed to open {}", path))?;
            if let Some(tail) = settings.csv_tail {
                source = source.with_tail(tail);
            }
            Arc::new(source)
        }
    };
    info!(source = source.name(), "Market data source ready");
    Ok(source)
}

/// Build the configured adapter; `dry_run` always yields the paper adapter.
pub fn build_executor(
    settings: &ExecutionSettings,
    dry_run: bool,
) -> Result<Arc<dyn ExecutionAdapter>> {
    let adapter = if dry_run {
        AdapterKind::Paper
    } else {
        settings.adapter
    };

    let executor: Arc<dyn ExecutionAdapter> = match adapter {
        AdapterKind::Paper => Arc::new(PaperExecutor::new()),
        AdapterKind::Command => {
            let command = &settings.command;
            let mut executor = CommandExecutor::new(command.program.as_str(), command.args.clone())
                .context("Invalid execution.command settings")?;
            if let Some(secs) = command.timeout_secs {
                executor = executor.with_timeout(Duration::from_secs(secs));
            }
            Arc::new(executor)
        }
        AdapterKind::Alpaca => {
            let alpaca = &settings.alpaca;
            let config =
                AlpacaConfig::from_env(&alpaca.api_key_env, &alpaca.api_secret_env, alpaca.paper)
                    .context("Alpaca credentials missing")?
                    .with_quantity(alpaca.quantity);
            Arc::new(AlpacaExecutor::new(config).context("Failed to create Alpaca client")?)
        }
    };
    info!(executor = executor.name(), dry_run, "Execution adapter ready");
    Ok(executor)
}

/// Validate `request`, falling back to daily bars when the interval is not
/// served for its span.
pub fn supported(request: FetchRequest) -> Result<FetchRequest> {
    match request.validate() {
        Ok(()) => Ok(request),
        Err(err @ DataError::UnsupportedCombination { .. }) => {
            warn!(symbol = %request.symbol, "{}, switching to daily bars", err);
            Ok(request.normalized())
        }
        Err(err) => Err(err).context("Invalid fetch request"),
    }
}

pub fn retry_policy(bot: &BotSettings) -> RetryPolicy {
    let poll = Duration::from_secs(bot.poll_interval_secs);
    match bot.retry.kind {
        RetryKind::Fixed => RetryPolicy::fixed(poll),
        RetryKind::Backoff => {
            RetryPolicy::backoff(poll, Duration::from_secs(bot.retry.max_delay_secs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_forces_paper() {
        let mut settings = ExecutionSettings::default();
        settings.adapter = AdapterKind::Alpaca;
        let executor = build_executor(&settings, true).unwrap();
        assert_eq!(executor.name(), "paper");
    }

    #[test]
    fn test_command_executor_from_settings() {
        let mut settings = ExecutionSettings::default();
        settings.adapter = AdapterKind::Command;
        settings.command.program = "automate".to_string();
        let executor = build_executor(&settings, false).unwrap();
        assert_eq!(executor.name(), "command");
    }

    #[test]
    fn test_csv_source_requires_path() {
        let mut settings = DataSettings::default();
        settings.source = DataSourceKind::Csv;
        assert!(build_source(&settings).is_err());
    }

    #[test]
    fn test_retry_policy_from_settings() {
        let mut bot = BotSettings::default();
        assert_eq!(retry_policy(&bot).delay(3), Duration::from_secs(20));

        bot.retry.kind = RetryKind::Backoff;
        bot.retry.max_delay_secs = 60;
        assert_eq!(retry_policy(&bot).delay(1), Duration::from_secs(40));
        assert_eq!(retry_policy(&bot).delay(5), Duration::from_secs(60));
    }

    #[test]
    fn test_supported_downgrades_minute_bars() {
        use tradebot_core::types::{Interval, Range};

        let request = FetchRequest::range("AAPL", Range::Year1, Interval::Minute5);
        assert_eq!(supported(request).unwrap().interval, Interval::Daily);

        let request = FetchRequest::range("AAPL", Range::Day5, Interval::Minute1);
        assert_eq!(supported(request).unwrap().interval, Interval::Minute1);

        assert!(supported(FetchRequest::range("", Range::Day5, Interval::Daily)).is_err());
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let config = load_or_default(Path::new("/no/such/tradebot.toml")).unwrap();
        assert_eq!(config.bot.window_size, 5);
    }
}
