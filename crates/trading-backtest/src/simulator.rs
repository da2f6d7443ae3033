//! Position simulator: the single open position, stop/target/trailing exits
//! and the append-only trade log.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use trading_core::error::{TradingError, TradingResult};
use trading_core::types::{Bar, ExitReason, Position, Side, Signal, Trade};

/// Execution parameters. Offsets are in price points, not percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Distance from entry to the fixed stop
    pub stop_offset: f64,
    /// Distance from entry to the fixed target
    pub target_offset: f64,
    /// Quantity of every accepted entry
    pub default_quantity: u32,
    /// Replace the fixed stop by a trailing stop
    pub enable_trailing_stop: bool,
    /// Distance of the trailing stop behind the best price
    pub trailing_stop_offset: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            stop_offset: 2.0,
            target_offset: 5.0,
            default_quantity: 1,
            enable_trailing_stop: false,
            trailing_stop_offset: 2.0,
        }
    }
}

impl ExecutionConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> TradingResult<()> {
        for (name, value) in [
            ("stop_offset", self.stop_offset),
            ("target_offset", self.target_offset),
            ("trailing_stop_offset", self.trailing_stop_offset),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TradingError::Config(format!(
                    "execution.{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.default_quantity == 0 {
            return Err(TradingError::Config(
                "execution.default_quantity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Either nothing is held or exactly one position is open.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Open(Position),
}

/// A breached stop or target level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitTrigger {
    pub price: f64,
    pub reason: ExitReason,
}

/// Result of handing one signal to the simulator.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalOutcome {
    Opened(Side),
    Closed(Trade),
    /// Entry while a position is open, exit while flat, or exit for the
    /// other side. No state change.
    Ignored,
}

/// What happened during one bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BarOutcome {
    pub opened: Option<Side>,
    pub closed: Option<Trade>,
}

/// Owns the open position and the trade log.
#[derive(Debug, Clone)]
pub struct ExecutionSimulator {
    config: ExecutionConfig,
    state: PositionState,
    trades: Vec<Trade>,
    entries_accepted: usize,
}

impl ExecutionSimulator {
    pub fn new(config: ExecutionConfig) -> Self {
        Self {
            config,
            state: PositionState::Flat,
            trades: Vec::new(),
            entries_accepted: 0,
        }
    }

    pub fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    pub fn state(&self) -> &PositionState {
        &self.state
    }

    pub fn open_position(&self) -> Option<&Position> {
        match &self.state {
            PositionState::Open(position) => Some(position),
            PositionState::Flat => None,
        }
    }

    pub fn is_flat(&self) -> bool {
        matches!(self.state, PositionState::Flat)
    }

    /// Closed trades in the order they were closed.
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }

    pub fn entries_accepted(&self) -> usize {
        self.entries_accepted
    }

    /// Effective stop level: trailing when enabled, fixed otherwise.
    pub fn stop_price(&self, position: &Position) -> (f64, ExitReason) {
        match (position.side, self.config.enable_trailing_stop) {
            (Side::Long, true) => (
                position.best_price - self.config.trailing_stop_offset,
                ExitReason::TrailingStop,
            ),
            (Side::Short, true) => (
                position.best_price + self.config.trailing_stop_offset,
                ExitReason::TrailingStop,
            ),
            (Side::Long, false) => (
                position.entry_price - self.config.stop_offset,
                ExitReason::StopLoss,
            ),
            (Side::Short, false) => (
                position.entry_price + self.config.stop_offset,
                ExitReason::StopLoss,
            ),
        }
    }

    /// Fixed target level.
    pub fn target_price(&self, position: &Position) -> f64 {
        match position.side {
            Side::Long => position.entry_price + self.config.target_offset,
            Side::Short => position.entry_price - self.config.target_offset,
        }
    }

    /// Apply a signal on `bar`.
    ///
    /// Entries open at the bar close. Exits close at the signal's price and
    /// only if the signal's side matches the open position.
    pub fn process_signal(&mut self, signal: &Signal, bar: &Bar) -> SignalOutcome {
        match signal {
            Signal::Entry { side, reason } => {
                if !self.is_flat() {
                    debug!(timestamp = bar.timestamp, "Entry ignored: position already open");
                    return SignalOutcome::Ignored;
                }
                let position = Position::new(
                    *side,
                    bar.close,
                    bar.timestamp,
                    self.config.default_quantity,
                    reason.as_str(),
                );
                debug!(
                    side = %side,
                    price = bar.close,
                    timestamp = bar.timestamp,
                    quantity = self.config.default_quantity,
                    "Opened position"
                );
                self.state = PositionState::Open(position);
                self.entries_accepted += 1;
                SignalOutcome::Opened(*side)
            }
            Signal::Exit {
                side,
                price,
                reason,
            } => {
                let matches = match &self.state {
                    PositionState::Open(position) => position.side == *side,
                    PositionState::Flat => {
                        debug!(timestamp = bar.timestamp, "Exit ignored: no open position");
                        return SignalOutcome::Ignored;
                    }
                };
                if !matches {
                    warn!(
                        signal_side = %side,
                        timestamp = bar.timestamp,
                        "Exit ignored: side does not match the open position"
                    );
                    return SignalOutcome::Ignored;
                }

                let PositionState::Open(position) = std::mem::take(&mut self.state) else {
                    return SignalOutcome::Ignored;
                };
                let trade = position.close(*price, bar.timestamp, reason.as_str());
                debug!(
                    side = %trade.side,
                    price = trade.exit_price,
                    timestamp = trade.exit_time,
                    pnl = trade.pnl(),
                    reason = %trade.reason,
                    "Closed position"
                );
                self.trades.push(trade.clone());
                SignalOutcome::Closed(trade)
            }
        }
    }

    /// Ratchet the best price with `bar` and test stop and target against
    /// the bar extremes. Does not close the position.
    ///
    /// When both levels are inside the bar the stop wins.
    pub fn check_exit(&mut self, bar: &Bar) -> Option<ExitTrigger> {
        let position = match &mut self.state {
            PositionState::Open(position) => position,
            PositionState::Flat => return None,
        };
        position.update_best_price(bar);

        let position = self.open_position()?;
        let (stop, stop_reason) = self.stop_price(position);
        let target = self.target_price(position);

        let (stop_hit, target_hit) = match position.side {
            Side::Long => (bar.low <= stop, bar.high >= target),
            Side::Short => (bar.high >= stop, bar.low <= target),
        };

        if stop_hit {
            Some(ExitTrigger {
                price: stop,
                reason: stop_reason,
            })
        } else if target_hit {
            Some(ExitTrigger {
                price: target,
                reason: ExitReason::TakeProfit,
            })
        } else {
            None
        }
    }

    /// Close the open position at `price` regardless of stop and target.
    pub fn force_exit(&mut self, bar: &Bar, price: f64, reason: ExitReason) -> Option<Trade> {
        let side = self.open_position()?.side;
        match self.process_signal(&Signal::exit(side, price, reason.as_str()), bar) {
            SignalOutcome::Closed(trade) => Some(trade),
            _ => None,
        }
    }

    /// One bar in fixed order: apply the signal (an entry only if flat),
    /// then check the open position's exits on the same bar.
    pub fn on_bar(&mut self, bar: &Bar, entry: Option<&Signal>) -> BarOutcome {
        let mut outcome = BarOutcome::default();

        if let Some(signal) = entry {
            match self.process_signal(signal, bar) {
                SignalOutcome::Opened(side) => outcome.opened = Some(side),
                SignalOutcome::Closed(trade) => outcome.closed = Some(trade),
                SignalOutcome::Ignored => {}
            }
        }

        if let Some(trigger) = self.check_exit(bar) {
            outcome.closed = self.force_exit(bar, trigger.price, trigger.reason);
        }

        debug_assert_eq!(
            self.trades.len() + usize::from(!self.is_flat()),
            self.entries_accepted
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: i64, high: f64, low: f64, close: f64) -> Bar {
        Bar::new(ts, close, high, low, close, 0.0)
    }

    fn long_at_100(config: ExecutionConfig) -> ExecutionSimulator {
        let mut sim = ExecutionSimulator::new(config);
        let outcome = sim.process_signal(&Signal::long("test"), &bar(0, 100.0, 100.0, 100.0));
        assert_eq!(outcome, SignalOutcome::Opened(Side::Long));
        sim
    }

    #[test]
    fn test_config_validation() {
        assert!(ExecutionConfig::default().validate().is_ok());

        let config = ExecutionConfig {
            stop_offset: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ExecutionConfig {
            default_quantity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ExecutionConfig {
            trailing_stop_offset: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_entry_opens_at_close() {
        let mut sim = ExecutionSimulator::new(ExecutionConfig {
            default_quantity: 3,
            ..Default::default()
        });
        sim.process_signal(&Signal::short("s"), &bar(7, 101.0, 99.0, 100.5));

        let position = sim.open_position().unwrap();
        assert_eq!(position.side, Side::Short);
        assert_eq!(position.entry_price, 100.5);
        assert_eq!(position.best_price, 100.5);
        assert_eq!(position.entry_time, 7);
        assert_eq!(position.quantity, 3);
        assert_eq!(sim.entries_accepted(), 1);
    }

    #[test]
    fn test_second_entry_ignored() {
        let mut sim = long_at_100(ExecutionConfig::default());
        let outcome = sim.process_signal(&Signal::short("again"), &bar(1, 101.0, 99.0, 100.0));

        assert_eq!(outcome, SignalOutcome::Ignored);
        assert_eq!(sim.open_position().unwrap().side, Side::Long);
        assert_eq!(sim.entries_accepted(), 1);
    }

    #[test]
    fn test_stop_wins_same_bar_tie() {
        let mut sim = long_at_100(ExecutionConfig::default());
        let trigger = sim.check_exit(&bar(1, 106.0, 97.9, 100.0)).unwrap();

        assert_eq!(trigger.price, 98.0);
        assert_eq!(trigger.reason.as_str(), "StopLoss hit");

        let trade = sim
            .force_exit(&bar(1, 106.0, 97.9, 100.0), trigger.price, trigger.reason)
            .unwrap();
        assert_eq!(trade.exit_price, 98.0);
        assert_eq!(trade.reason, "StopLoss hit");
        assert!(sim.is_flat());
    }

    #[test]
    fn test_take_profit() {
        let mut sim = long_at_100(ExecutionConfig::default());
        let outcome = sim.on_bar(&bar(1, 105.5, 99.0, 104.0), None);

        let trade = outcome.closed.unwrap();
        assert_eq!(trade.exit_price, 105.0);
        assert_eq!(trade.reason, "TakeProfit hit");
        assert!((trade.pnl() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_trailing_stop() {
        let mut sim = long_at_100(ExecutionConfig {
            enable_trailing_stop: true,
            target_offset: 50.0,
            ..Default::default()
        });

        // Best price rises to 110
        assert!(sim.on_bar(&bar(1, 110.0, 108.5, 109.0), None).closed.is_none());
        assert_eq!(sim.open_position().unwrap().best_price, 110.0);

        let trade = sim
            .on_bar(&bar(2, 109.0, 107.9, 108.2), None)
            .closed
            .unwrap();
        assert_eq!(trade.exit_price, 108.0);
        assert_eq!(trade.reason, "StopLoss hit (trailing)");
    }

    #[test]
    fn test_best_price_never_regresses() {
        let mut sim = long_at_100(ExecutionConfig {
            stop_offset: 50.0,
            target_offset: 50.0,
            ..Default::default()
        });
        sim.on_bar(&bar(1, 104.0, 101.0, 103.0), None);
        sim.on_bar(&bar(2, 102.0, 100.5, 101.0), None);

        let position = sim.open_position().unwrap();
        assert_eq!(position.best_price, 104.0);
        assert_eq!(position.bars_held, 2);
    }

    #[test]
    fn test_short_exits_mirrored() {
        let mut sim = ExecutionSimulator::new(ExecutionConfig::default());
        sim.process_signal(&Signal::short("s"), &bar(0, 100.0, 100.0, 100.0));

        // Stop above at 102, target below at 95: both inside, stop wins
        let trigger = sim.check_exit(&bar(1, 102.1, 94.0, 99.0)).unwrap();
        assert_eq!(trigger.price, 102.0);
        assert_eq!(trigger.reason, ExitReason::StopLoss);

        let trigger = sim.check_exit(&bar(1, 101.0, 94.5, 96.0)).unwrap();
        assert_eq!(trigger.price, 95.0);
        assert_eq!(trigger.reason, ExitReason::TakeProfit);
    }

    #[test]
    fn test_short_trailing_stop() {
        let mut sim = ExecutionSimulator::new(ExecutionConfig {
            enable_trailing_stop: true,
            trailing_stop_offset: 1.5,
            target_offset: 20.0,
            ..Default::default()
        });
        sim.process_signal(&Signal::short("s"), &bar(0, 100.0, 100.0, 100.0));
        assert!(sim.on_bar(&bar(1, 97.4, 96.0, 97.0), None).closed.is_none());

        let trade = sim.on_bar(&bar(2, 97.6, 96.5, 97.4), None).closed.unwrap();
        assert_eq!(trade.exit_price, 97.5);
        assert_eq!(trade.reason, "StopLoss hit (trailing)");
        assert!((trade.pnl() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_mismatched_exit_ignored() {
        let mut sim = long_at_100(ExecutionConfig::default());
        let outcome = sim.process_signal(
            &Signal::exit(Side::Short, 90.0, "stale"),
            &bar(1, 101.0, 99.0, 100.0),
        );

        assert_eq!(outcome, SignalOutcome::Ignored);
        assert!(sim.open_position().is_some());
        assert!(sim.trades().is_empty());
    }

    #[test]
    fn test_exit_while_flat_ignored() {
        let mut sim = ExecutionSimulator::new(ExecutionConfig::default());
        let outcome = sim.process_signal(
            &Signal::exit(Side::Long, 90.0, "stale"),
            &bar(1, 101.0, 99.0, 100.0),
        );
        assert_eq!(outcome, SignalOutcome::Ignored);
    }

    #[test]
    fn test_explicit_exit_uses_signal_price() {
        let mut sim = long_at_100(ExecutionConfig::default());
        let outcome = sim.process_signal(
            &Signal::exit(Side::Long, 101.25, "Session end"),
            &bar(3, 101.5, 100.5, 101.0),
        );

        let SignalOutcome::Closed(trade) = outcome else {
            panic!("expected a closed trade");
        };
        assert_eq!(trade.exit_price, 101.25);
        assert_eq!(trade.exit_time, 3);
        assert_eq!(trade.reason, "Session end");
    }

    #[test]
    fn test_entry_and_exit_on_same_bar() {
        let mut sim = ExecutionSimulator::new(ExecutionConfig::default());
        // Close 100, low 97 breaches the stop at 98 on the entry bar itself
        let outcome = sim.on_bar(&bar(5, 100.5, 97.0, 100.0), Some(&Signal::long("l")));

        assert_eq!(outcome.opened, Some(Side::Long));
        let trade = outcome.closed.unwrap();
        assert_eq!(trade.entry_time, trade.exit_time);
        assert_eq!(trade.bars_held, 0);
        assert_eq!(sim.trades().len(), 1);
    }
}
