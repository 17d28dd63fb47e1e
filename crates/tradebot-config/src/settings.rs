//! Configuration structures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tradebot_core::types::{FetchRequest, Interval, Range};
use tradebot_core::{TradingError, TradingResult};
use tradebot_portfolio::{SellPolicy, TradeGate};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub bot: BotSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub execution: ExecutionSettings,
}

impl AppConfig {
    /// Check values that deserialize fine but cannot drive the bot.
    pub fn validate(&self) -> TradingResult<()> {
        if self.bot.symbols.is_empty() {
            return Err(invalid("bot.symbols must list at least one symbol"));
        }
        if let Some(blank) = self.bot.symbols.iter().find(|s| s.trim().is_empty()) {
            return Err(invalid(format!("bot.symbols contains a blank entry {:?}", blank)));
        }
        if self.bot.window_size == 0 {
            return Err(invalid("bot.window_size must be greater than zero"));
        }
        if self.bot.trade_limit == 0 {
            return Err(invalid("bot.trade_limit must be greater than zero"));
        }
        if self.bot.poll_interval_secs == 0 {
            return Err(invalid("bot.poll_interval_secs must be greater than zero"));
        }
        if let RetryKind::Backoff = self.bot.retry.kind {
            if self.bot.retry.max_delay_secs < self.bot.poll_interval_secs {
                return Err(invalid(
                    "bot.retry.max_delay_secs must not be below bot.poll_interval_secs",
                ));
            }
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(invalid(format!(
                "logging.format must be pretty or json, got {}",
                self.logging.format
            )));
        }

        FetchRequest::range(&self.bot.symbols[0], self.data.range, self.data.interval)
            .validate()
            .map_err(|e| invalid(format!("data.range/data.interval: {}", e)))?;

        if let DataSourceKind::Csv = self.data.source {
            if self.data.csv_path.is_none() {
                return Err(invalid("data.csv_path is required when data.source = \"csv\""));
            }
        }

        match self.execution.adapter {
            AdapterKind::Paper => {}
            AdapterKind::Command => {
                if self.execution.command.program.trim().is_empty() {
                    return Err(invalid(
                        "execution.command.program is required when execution.adapter = \"command\"",
                    ));
                }
            }
            AdapterKind::Alpaca => {
                if self.execution.alpaca.quantity <= Decimal::ZERO {
                    return Err(invalid("execution.alpaca.quantity must be positive"));
                }
            }
        }

        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn invalid(msg: impl Into<String>) -> TradingError {
    TradingError::Config(msg.into())
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "tradebot".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Control loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    pub symbols: Vec<String>,
    /// Moving average window, in bars
    pub window_size: usize,
    /// Maximum number of open buys
    pub trade_limit: usize,
    pub poll_interval_secs: u64,
    pub sell_policy: SellPolicy,
    /// Treat the first evaluation of the process as a BUY
    pub force_initial_buy: bool,
    pub retry: RetrySettings,
}

impl BotSettings {
    pub fn trade_gate(&self) -> TradeGate {
        TradeGate::new(self.trade_limit).with_sell_policy(self.sell_policy)
    }
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            symbols: vec!["AAPL".to_string()],
            window_size: 5,
            trade_limit: 3,
            poll_interval_secs: 20,
            sell_policy: SellPolicy::default(),
            force_initial_buy: false,
            retry: RetrySettings::default(),
        }
    }
}

/// Delay strategy between iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryKind {
    /// Always wait `poll_interval_secs`
    #[default]
    Fixed,
    /// Double the wait after each failed iteration, up to `max_delay_secs`
    Backoff,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub kind: RetryKind,
    pub max_delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            kind: RetryKind::Fixed,
            max_delay_secs: 300,
        }
    }
}

/// Market data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    #[default]
    Yahoo,
    Csv,
}

/// Market data settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub source: DataSourceKind,
    pub range: Range,
    pub interval: Interval,
    /// Chart API base URL override
    pub base_url: Option<String>,
    pub csv_path: Option<String>,
    /// Only replay the most recent N rows of the CSV file
    pub csv_tail: Option<usize>,
    /// Overwrite this CSV with the bars of every fetch
    pub export_path: Option<String>,
    /// Constituents CSV with a Symbol column
    pub tickers_file: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            source: DataSourceKind::Yahoo,
            range: Range::Day5,
            interval: Interval::Minute1,
            base_url: None,
            csv_path: None,
            csv_tail: None,
            export_path: Some("data/latest.csv".to_string()),
            tickers_file: "constituents.csv".to_string(),
        }
    }
}

/// Trade execution backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    #[default]
    Paper,
    Command,
    Alpaca,
}

/// Execution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionSettings {
    pub adapter: AdapterKind,
    pub command: CommandSettings,
    pub alpaca: AlpacaSettings,
}

/// External automation program.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandSettings {
    pub program: String,
    /// `{symbol}` and `{side}` are substituted per trade
    pub args: Vec<String>,
    pub timeout_secs: Option<u64>,
}

/// Alpaca API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlpacaSettings {
    pub api_key_env: String,
    pub api_secret_env: String,
    pub paper: bool,
    pub quantity: Decimal,
}

impl Default for AlpacaSettings {
    fn default() -> Self {
        use rust_decimal_macros::dec;
        Self {
            api_key_env: "ALPACA_API_KEY".to_string(),
            api_secret_env: "ALPACA_API_SECRET".to_string(),
            paper: true,
            quantity: dec!(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bot.window_size, 5);
        assert_eq!(config.bot.trade_limit, 3);
        assert_eq!(config.bot.poll_interval_secs, 20);
        assert_eq!(config.bot.sell_policy, SellPolicy::ReleaseSlot);
        assert_eq!(config.data.interval, Interval::Minute1);
        assert_eq!(config.data.export_path.as_deref(), Some("data/latest.csv"));
    }

    #[test]
    fn test_rejects_zero_window() {
        let mut config = AppConfig::default();
        config.bot.window_size = 0;
        assert!(matches!(config.validate(), Err(TradingError::Config(_))));
    }

    #[test]
    fn test_rejects_zero_trade_limit() {
        let mut config = AppConfig::default();
        config.bot.trade_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_symbols() {
        let mut config = AppConfig::default();
        config.bot.symbols.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_minute_bars_over_long_range() {
        let mut config = AppConfig::default();
        config.data.range = Range::Year1;
        config.data.interval = Interval::Minute5;
        assert!(config.validate().is_err());

        config.data.interval = Interval::Daily;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_command_adapter_needs_program() {
        let mut config = AppConfig::default();
        config.execution.adapter = AdapterKind::Command;
        assert!(config.validate().is_err());

        config.execution.command.program = "automate".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_csv_source_needs_path() {
        let mut config = AppConfig::default();
        config.data.source = DataSourceKind::Csv;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backoff_cap_below_poll_interval() {
        let mut config = AppConfig::default();
        config.bot.retry.kind = RetryKind::Backoff;
        config.bot.retry.max_delay_secs = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_trade_gate_from_settings() {
        let mut bot = BotSettings::default();
        bot.sell_policy = SellPolicy::ConsumeSlot;
        let gate = bot.trade_gate();
        assert_eq!(gate.trade_limit, 3);
        assert_eq!(gate.sell_policy, SellPolicy::ConsumeSlot);
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = AppConfig::default();
        let text = config.to_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.bot.symbols, config.bot.symbols);
        assert_eq!(parsed.data.range, Range::Day5);
    }
}
