//! Configuration management.

mod settings;

pub use settings::{
    AdapterKind, AlpacaSettings, AppConfig, AppSettings, BotSettings, CommandSettings,
    DataSettings, DataSourceKind, ExecutionSettings, LoggingConfig, RetryKind, RetrySettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
///
/// `TRADEBOT__BOT__TRADE_LIMIT=5` overrides `bot.trade_limit`;
/// `TRADEBOT__BOT__SYMBOLS` takes a comma-separated list.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("TRADEBOT")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("bot.symbols")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tradebot_core::types::{Interval, Range};
    use tradebot_portfolio::SellPolicy;

    #[test]
    fn test_load_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[bot]
symbols = ["MSFT", "NVDA"]
window_size = 10
sell_policy = "consume_slot"

[data]
range = "1mo"
interval = "1d"

[execution]
adapter = "command"

[execution.command]
program = "automate"
args = ["--ticker", "{{symbol}}", "{{side}}"]
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.bot.symbols, vec!["MSFT", "NVDA"]);
        assert_eq!(config.bot.window_size, 10);
        assert_eq!(config.bot.trade_limit, 3);
        assert_eq!(config.bot.sell_policy, SellPolicy::ConsumeSlot);
        assert_eq!(config.data.range, Range::Month1);
        assert_eq!(config.data.interval, Interval::Daily);
        assert_eq!(config.execution.adapter, AdapterKind::Command);
        assert_eq!(config.execution.command.args[1], "{symbol}");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(load_config(Path::new("/no/such/tradebot.toml")).is_err());
    }
}
