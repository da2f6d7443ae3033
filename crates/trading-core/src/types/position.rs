//! Open position and closed trade types.

use serde::{Deserialize, Serialize};

use super::{Bar, Side};

/// The single open position held by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub entry_price: f64,
    /// Entry bar timestamp (Unix milliseconds)
    pub entry_time: i64,
    pub quantity: u32,
    /// Most favorable price reached since entry: running max of highs for a
    /// long, running min of lows for a short.
    pub best_price: f64,
    /// Bars evaluated after the entry bar
    pub bars_held: usize,
    /// Reason carried by the entry signal
    pub entry_reason: String,
}

impl Position {
    /// Open a position. `best_price` starts at the entry price.
    pub fn new(
        side: Side,
        entry_price: f64,
        entry_time: i64,
        quantity: u32,
        entry_reason: impl Into<String>,
    ) -> Self {
        Self {
            side,
            entry_price,
            entry_time,
            quantity,
            best_price: entry_price,
            bars_held: 0,
            entry_reason: entry_reason.into(),
        }
    }

    /// Ratchet `best_price` with the bar's favorable extreme. Never regresses.
    pub fn update_best_price(&mut self, bar: &Bar) {
        match self.side {
            Side::Long => {
                if bar.high > self.best_price {
                    self.best_price = bar.high;
                }
            }
            Side::Short => {
                if bar.low < self.best_price {
                    self.best_price = bar.low;
                }
            }
        }
        if bar.timestamp > self.entry_time {
            self.bars_held += 1;
        }
    }

    /// Convert the position into a closed trade.
    pub fn close(self, exit_price: f64, exit_time: i64, reason: impl Into<String>) -> Trade {
        Trade {
            side: self.side,
            entry_price: self.entry_price,
            exit_price,
            entry_time: self.entry_time,
            exit_time,
            quantity: self.quantity,
            reason: reason.into(),
            bars_held: self.bars_held,
        }
    }
}

/// A completed round trip. Immutable once appended to the trade log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_time: i64,
    pub exit_time: i64,
    pub quantity: u32,
    /// Exit reason
    pub reason: String,
    pub bars_held: usize,
}

impl Trade {
    /// PnL per unit: `exit - entry` for a long, `entry - exit` for a short.
    #[inline]
    pub fn pnl(&self) -> f64 {
        self.side.pnl(self.entry_price, self.exit_price)
    }

    /// PnL scaled by quantity.
    pub fn pnl_value(&self) -> f64 {
        self.pnl() * self.quantity as f64
    }

    pub fn is_win(&self) -> bool {
        self.pnl() > 0.0
    }

    pub fn is_loss(&self) -> bool {
        self.pnl() < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(ts: i64, high: f64, low: f64) -> Bar {
        Bar::new(ts, low, high, low, low, 100.0)
    }

    #[test]
    fn test_best_price_long_ratchets() {
        let mut pos = Position::new(Side::Long, 100.0, 0, 1, "test");
        pos.update_best_price(&bar(1, 104.0, 99.0));
        assert!((pos.best_price - 104.0).abs() < 1e-10);
        pos.update_best_price(&bar(2, 102.0, 98.0));
        assert!((pos.best_price - 104.0).abs() < 1e-10);
        assert_eq!(pos.bars_held, 2);
    }

    #[test]
    fn test_best_price_short_ratchets() {
        let mut pos = Position::new(Side::Short, 100.0, 0, 1, "test");
        pos.update_best_price(&bar(1, 101.0, 95.0));
        pos.update_best_price(&bar(2, 103.0, 97.0));
        assert!((pos.best_price - 95.0).abs() < 1e-10);
    }

    #[test]
    fn test_entry_bar_not_counted_as_held() {
        let mut pos = Position::new(Side::Long, 100.0, 5, 1, "test");
        pos.update_best_price(&bar(5, 101.0, 99.0));
        assert_eq!(pos.bars_held, 0);
    }

    #[test]
    fn test_close_into_trade() {
        let pos = Position::new(Side::Short, 100.0, 10, 3, "downtrend");
        let trade = pos.close(96.0, 20, "TakeProfit hit");

        assert_eq!(trade.side, Side::Short);
        assert_eq!(trade.quantity, 3);
        assert_eq!(trade.reason, "TakeProfit hit");
        assert!((trade.pnl() - 4.0).abs() < 1e-10);
        assert!((trade.pnl_value() - 12.0).abs() < 1e-10);
        assert!(trade.is_win());
        assert!(trade.exit_time >= trade.entry_time);
    }
}
