//! Trend-following entry strategy.
//!
//! Goes long in an uptrend with momentum confirmation and short in a
//! downtrend. It only decides entries: exits are owned by the position
//! simulator and reported back through the position callbacks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;
use trading_core::{
    error::StrategyError,
    traits::{Strategy, StrategyConfig, StrategyState},
    types::{AlignedRow, Side, Signal},
};

/// Configuration for the trend entry strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendEntryConfig {
    /// Long entries require RSI strictly above this level
    pub long_rsi_min: f64,
    /// Short entries require RSI strictly below this level
    pub short_rsi_max: f64,
}

impl Default for TrendEntryConfig {
    fn default() -> Self {
        Self {
            long_rsi_min: 45.0,
            short_rsi_max: 55.0,
        }
    }
}

impl StrategyConfig for TrendEntryConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        for (name, value) in [
            ("long_rsi_min", self.long_rsi_min),
            ("short_rsi_max", self.short_rsi_max),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(StrategyError::InvalidConfig(format!(
                    "{name} must be between 0 and 100, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Mirrored position state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PositionState {
    Flat,
    InPosition(Side),
}

/// Trend entry state machine.
///
/// While flat, evaluates the coarse indicators of each row:
/// - LONG when `close > EMA_medium`, `EMA_short > EMA_medium` and
///   `RSI > long_rsi_min`
/// - SHORT when `close < EMA_medium`, `EMA_short < EMA_medium` and
///   `RSI < short_rsi_max`
///
/// A row missing any of the three indicators never fires.
pub struct TrendEntryStrategy {
    config: TrendEntryConfig,
    position: PositionState,
    rows_evaluated: usize,
    signals_generated: usize,
    last_indicators: BTreeMap<String, f64>,
    last_warmed_up: bool,
}

impl TrendEntryStrategy {
    /// Create a new trend entry strategy.
    pub fn new(config: TrendEntryConfig) -> Self {
        Self {
            config,
            position: PositionState::Flat,
            rows_evaluated: 0,
            signals_generated: 0,
            last_indicators: BTreeMap::new(),
            last_warmed_up: false,
        }
    }

    pub fn config(&self) -> &TrendEntryConfig {
        &self.config
    }

    pub fn is_flat(&self) -> bool {
        self.position == PositionState::Flat
    }

    fn evaluate(&self, row: &AlignedRow) -> Option<Signal> {
        let set = &row.indicators;
        let (ema_short, ema_medium, rsi) = (set.ema_short?, set.ema_medium?, set.rsi?);
        let close = row.bar.close;

        if close > ema_medium && ema_short > ema_medium && rsi > self.config.long_rsi_min {
            return Some(Signal::long(format!(
                "{} uptrend: close > EMA_medium and EMA_short > EMA_medium and RSI > {}",
                row.timeframe, self.config.long_rsi_min
            )));
        }

        if close < ema_medium && ema_short < ema_medium && rsi < self.config.short_rsi_max {
            return Some(Signal::short(format!(
                "{} downtrend: close < EMA_medium and EMA_short < EMA_medium and RSI < {}",
                row.timeframe, self.config.short_rsi_max
            )));
        }

        None
    }
}

impl Default for TrendEntryStrategy {
    fn default() -> Self {
        Self::new(TrendEntryConfig::default())
    }
}

impl Strategy for TrendEntryStrategy {
    fn name(&self) -> &str {
        "Trend Entry"
    }

    fn description(&self) -> &str {
        "Enters with the medium EMA trend when the short EMA and RSI confirm"
    }

    fn on_row(&mut self, row: &AlignedRow) -> Option<Signal> {
        self.rows_evaluated += 1;

        let set = &row.indicators;
        self.last_warmed_up =
            set.ema_short.is_some() && set.ema_medium.is_some() && set.rsi.is_some();
        self.last_indicators = set.iter().map(|(f, v)| (f.name().to_string(), v)).collect();

        if self.position != PositionState::Flat {
            return None;
        }

        let signal = self.evaluate(row)?;
        self.signals_generated += 1;
        debug!(
            timestamp = row.bar.timestamp,
            kind = ?signal.signal_type(),
            reason = signal.reason(),
            "Entry signal"
        );
        Some(signal)
    }

    fn on_position_opened(&mut self, side: Side) {
        self.position = PositionState::InPosition(side);
    }

    fn on_position_closed(&mut self) {
        self.position = PositionState::Flat;
    }

    fn reset(&mut self) {
        self.position = PositionState::Flat;
        self.rows_evaluated = 0;
        self.signals_generated = 0;
        self.last_indicators.clear();
        self.last_warmed_up = false;
    }

    fn state(&self) -> StrategyState {
        let position = match self.position {
            PositionState::Flat => "FLAT".to_string(),
            PositionState::InPosition(side) => format!("IN_POSITION ({side})"),
        };
        StrategyState {
            name: self.name().to_string(),
            in_position: !self.is_flat(),
            is_warmed_up: self.last_warmed_up,
            rows_evaluated: self.rows_evaluated,
            signals_generated: self.signals_generated,
            indicators: self.last_indicators.clone(),
            custom: serde_json::json!({
                "position": position,
                "long_rsi_min": self.config.long_rsi_min,
                "short_rsi_max": self.config.short_rsi_max,
            }),
        }
    }
}
