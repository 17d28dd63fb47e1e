//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use tradebot_config::{load_config, AdapterKind};

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };
    if let Err(e) = config.validate() {
        println!("{}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Symbols: {}", config.bot.symbols.join(", "));
    println!("SMA window: {} bars", config.bot.window_size);
    println!("Trade limit: {} ({:?})", config.bot.trade_limit, config.bot.sell_policy);
    println!("Poll interval: {}s ({:?})", config.bot.poll_interval_secs, config.bot.retry.kind);
    println!(
        "Data: {:?} range={} interval={}",
        config.data.source, config.data.range, config.data.interval
    );
    match config.execution.adapter {
        AdapterKind::Paper => println!("Execution: paper"),
        AdapterKind::Command => println!(
            "Execution: command `{} {}`",
            config.execution.command.program,
            config.execution.command.args.join(" ")
        ),
        AdapterKind::Alpaca => println!(
            "Execution: alpaca (paper mode: {}, quantity: {})",
            config.execution.alpaca.paper, config.execution.alpaca.quantity
        ),
    }

    Ok(())
}
