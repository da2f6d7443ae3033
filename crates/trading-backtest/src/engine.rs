//! Replay driver.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use trading_core::error::{TradingError, TradingResult};
use trading_core::traits::Strategy;
use trading_core::types::{AlignedRow, Bar, ExitReason, Timeframe};
use trading_indicators::{IndicatorEngine, IndicatorParams, TimeframeAligner};

use crate::report::BacktestReport;
use crate::session::SessionWindow;
use crate::simulator::{ExecutionConfig, ExecutionSimulator};
use crate::statistics::PerformanceStats;

/// Bars of one timeframe, as handed over by the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketData {
    pub timeframe: Timeframe,
    pub bars: Vec<Bar>,
}

impl MarketData {
    pub fn new(timeframe: Timeframe, bars: Vec<Bar>) -> Self {
        Self { timeframe, bars }
    }
}

/// Compute indicators for every timeframe and align the fine ones onto the
/// coarse series.
pub fn prepare_rows(
    params: &IndicatorParams,
    coarse: MarketData,
    fine: Vec<MarketData>,
) -> TradingResult<Vec<AlignedRow>> {
    let engine = IndicatorEngine::new(params.clone())?;

    for data in &fine {
        if !data.timeframe.is_finer_than(coarse.timeframe) {
            return Err(TradingError::Validation(format!(
                "timeframe {} is not finer than the coarse timeframe {}",
                data.timeframe, coarse.timeframe
            )));
        }
    }

    let coarse = engine.compute_series(coarse.timeframe, coarse.bars);
    let fine: Vec<_> = fine
        .into_iter()
        .map(|data| engine.compute_series(data.timeframe, data.bars))
        .collect();

    let rows = TimeframeAligner::new().align(&coarse, &fine);
    debug!(
        rows = rows.len(),
        coarse = %coarse.timeframe,
        fine = fine.len(),
        "Prepared aligned rows"
    );
    Ok(rows)
}

/// Backtest configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Stop, target, trailing and quantity settings
    pub execution: ExecutionConfig,
    /// Entries are only evaluated inside this window; `None` trades all bars
    pub session: Option<SessionWindow>,
    /// Close an open position at the first out-of-session bar
    pub flatten_at_session_end: bool,
    /// Close a position still open after the last bar
    pub close_at_end: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            execution: ExecutionConfig::default(),
            session: Some(SessionWindow::regular()),
            flatten_at_session_end: false,
            close_at_end: false,
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> TradingResult<()> {
        self.execution.validate()
    }
}

/// Backtesting engine.
///
/// Replays aligned rows strictly in order. Per row: skip entries outside the
/// session, ask the strategy for an entry, hand it to the simulator, check
/// exits on the same bar, and mirror opens and closes back into the
/// strategy.
pub struct BacktestEngine {
    config: BacktestConfig,
}

impl BacktestEngine {
    /// Create a new backtest engine.
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run a backtest over pre-aligned rows.
    pub fn run(&self, strategy: &mut dyn Strategy, rows: &[AlignedRow]) -> BacktestReport {
        strategy.reset();
        let mut simulator = ExecutionSimulator::new(self.config.execution.clone());

        let mut bars_processed = 0;
        let mut out_of_session_bars = 0;

        info!(
            strategy = strategy.name(),
            rows = rows.len(),
            trailing = self.config.execution.enable_trailing_stop,
            "Starting replay"
        );

        for row in rows {
            let bar = &row.bar;
            bars_processed += 1;

            let in_session = self
                .config
                .session
                .map_or(true, |session| session.contains_bar(bar));

            if !in_session {
                out_of_session_bars += 1;

                if self.config.flatten_at_session_end && !simulator.is_flat() {
                    if simulator
                        .force_exit(bar, bar.close, ExitReason::SessionEnd)
                        .is_some()
                    {
                        strategy.on_position_closed();
                    }
                    continue;
                }

                // Open positions keep their protective exits outside the session
                if simulator.on_bar(bar, None).closed.is_some() {
                    strategy.on_position_closed();
                }
                continue;
            }

            let signal = strategy.on_row(row);
            let outcome = simulator.on_bar(bar, signal.as_ref());
            if let Some(side) = outcome.opened {
                strategy.on_position_opened(side);
            }
            if outcome.closed.is_some() {
                strategy.on_position_closed();
            }
        }

        if self.config.close_at_end {
            if let Some(last) = rows.last() {
                if simulator
                    .force_exit(&last.bar, last.bar.close, ExitReason::EndOfData)
                    .is_some()
                {
                    strategy.on_position_closed();
                }
            }
        }

        let entries_accepted = simulator.entries_accepted();
        let open_position = simulator.open_position().cloned();
        let trades = simulator.into_trades();
        let stats = PerformanceStats::from_trades(&trades);

        info!(
            bars = bars_processed,
            trades = trades.len(),
            open = open_position.is_some(),
            total_pnl = stats.total_pnl,
            "Replay finished"
        );

        BacktestReport {
            strategy: strategy.name().to_string(),
            config: self.config.clone(),
            bars_processed,
            entries_accepted,
            out_of_session_bars,
            stats,
            trades,
            open_position,
        }
    }
}
