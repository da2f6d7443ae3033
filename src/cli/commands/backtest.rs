//! Backtest command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use trading_backtest::{prepare_rows, BacktestEngine, MarketData};
use trading_config::{load_config, AppConfig, TimeframeFile};
use trading_core::traits::DataSource;
use trading_data::{write_trades_csv, CsvDataSource};
use trading_strategies::TrendEntryStrategy;
use tracing::info;

use crate::cli::{BacktestArgs, OutputFormat};

pub async fn run(args: BacktestArgs, config_path: &Path) -> Result<()> {
    let mut config = load_config(config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    info!(
        coarse = %config.data.coarse.timeframe,
        fine = config.data.fine.len(),
        dir = %config.data.dir.display(),
        "Starting backtest"
    );

    // Load data
    let source = build_source(&config)?;
    let coarse = load(&source, &config.data.coarse).await?;
    let mut fine = Vec::with_capacity(config.data.fine.len());
    for file in &config.data.fine {
        fine.push(load(&source, file).await?);
    }

    let rows = prepare_rows(&config.indicators, coarse, fine)?;

    // Run backtest
    let engine = BacktestEngine::new(config.backtest_config()?);
    let mut strategy = TrendEntryStrategy::new(config.strategy.clone());
    let report = engine.run(&mut strategy, &rows);

    // Output results
    match args.output {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => println!("{}", report.summary()),
    }

    // Save if requested
    if let Some(save_path) = &args.save {
        std::fs::write(save_path, report.to_json()?)
            .with_context(|| format!("Failed to write {}", save_path.display()))?;
        info!("Results saved to {:?}", save_path);
    }

    if let Some(csv_path) = &args.trades_csv {
        write_trades_csv(csv_path, &report.trades)?;
    }

    Ok(())
}

fn apply_overrides(config: &mut AppConfig, args: &BacktestArgs) {
    if let Some(dir) = &args.data_dir {
        config.data.dir = dir.clone();
    }
    if args.no_session {
        config.session.enabled = false;
    }
    if args.close_at_end {
        config.backtest.close_at_end = true;
    }
}

fn build_source(config: &AppConfig) -> Result<CsvDataSource> {
    let mut source = CsvDataSource::new();
    for file in std::iter::once(&config.data.coarse).chain(&config.data.fine) {
        let path = config.data.path_of(file);
        source = source
            .with_file(file.timeframe, &path)
            .with_context(|| format!("Data file '{}' does not exist", path.display()))?;
    }
    Ok(source)
}

async fn load(source: &CsvDataSource, file: &TimeframeFile) -> Result<MarketData> {
    let bars = source
        .load_bars(file.timeframe)
        .await
        .with_context(|| format!("Failed to load {} bars from {}", file.timeframe, file.file))?;
    info!(timeframe = %file.timeframe, bars = bars.len(), "Loaded bars");
    Ok(MarketData::new(file.timeframe, bars))
}
