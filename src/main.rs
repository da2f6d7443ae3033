//! Multi-timeframe bar-replay backtester.

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use std::path::PathBuf;
use trading_config::load_config_or_default;
use trading_monitor::setup_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging. Flags win over the [logging] section; a broken config
    // file is reported by the command itself.
    let logging = load_config_or_default(&cli.config)
        .map(|config| config.logging)
        .unwrap_or_default();
    let log_level = match cli.log_level {
        Some(cli::LogLevel::Trace) => "trace",
        Some(cli::LogLevel::Debug) => "debug",
        Some(cli::LogLevel::Info) => "info",
        Some(cli::LogLevel::Warn) => "warn",
        Some(cli::LogLevel::Error) => "error",
        None => logging.level.as_str(),
    };
    let json = cli.json_logs || logging.format.eq_ignore_ascii_case("json");
    let log_file = cli.log_file.clone().or(logging.file.map(PathBuf::from));
    let _guard = setup_logging(log_level, json, log_file.as_deref());

    // Execute command
    match cli.command {
        Commands::Backtest(args) => cli::commands::backtest::run(args, &cli.config).await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
    }
}
