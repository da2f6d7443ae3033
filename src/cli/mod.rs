//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bar-replay")]
#[command(author, version, about = "Multi-timeframe bar-replay backtester")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "REPLAY_CONFIG")]
    pub config: PathBuf,

    /// Log level (defaults to `logging.level`)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    /// Also write JSON logs to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay historical bars through the strategy and simulator
    Backtest(BacktestArgs),
    /// Validate configuration
    ValidateConfig,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(clap::Args)]
pub struct BacktestArgs {
    /// Directory holding the CSV files (overrides `data.dir`)
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Evaluate every bar regardless of the session window
    #[arg(long)]
    pub no_session: bool,

    /// Close a position left open after the last bar
    #[arg(long)]
    pub close_at_end: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub output: OutputFormat,

    /// Save the JSON report to file
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Write closed trades as CSV
    #[arg(long)]
    pub trades_csv: Option<PathBuf>,
}
