//! Trade performance statistics.

use serde::{Deserialize, Serialize};
use trading_core::types::Trade;

/// Aggregate statistics over a closed-trade list.
///
/// PnL figures are per unit (`exit - entry` for a long, `entry - exit` for
/// a short). Ratios with a zero denominator report `f64::INFINITY`; on an
/// empty list every field is zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceStats {
    /// Total number of trades
    pub total_trades: usize,
    /// Trades with PnL > 0
    pub winning_trades: usize,
    /// Trades with PnL < 0
    pub losing_trades: usize,
    /// Trades with PnL == 0
    pub breakeven_trades: usize,
    /// Win rate percentage
    pub win_rate: f64,
    pub total_pnl: f64,
    /// Mean PnL per trade
    pub avg_pnl: f64,
    /// Maximum per-trade PnL
    pub largest_win: f64,
    /// Minimum per-trade PnL
    pub largest_loss: f64,
    /// Mean PnL of winners
    pub avg_win: f64,
    /// Mean PnL magnitude of losers
    pub avg_loss: f64,
    /// Gross profit / gross loss
    pub profit_factor: f64,
    /// Average win / average loss
    pub win_loss_ratio: f64,
    /// Largest peak-to-trough decline of cumulative PnL, as a magnitude
    pub max_drawdown: f64,
    /// Mean bars held after the entry bar
    pub avg_bars_held: f64,
}

impl PerformanceStats {
    /// Reduce a trade list. Pure: the same list always yields the same stats.
    pub fn from_trades(trades: &[Trade]) -> Self {
        if trades.is_empty() {
            return Self::default();
        }

        let total = trades.len();
        let pnls: Vec<f64> = trades.iter().map(Trade::pnl).collect();

        let mut gross_profit = 0.0;
        let mut gross_loss = 0.0;
        let mut winning_trades = 0;
        let mut losing_trades = 0;
        for &pnl in &pnls {
            if pnl > 0.0 {
                winning_trades += 1;
                gross_profit += pnl;
            } else if pnl < 0.0 {
                losing_trades += 1;
                gross_loss += pnl.abs();
            }
        }

        let total_pnl: f64 = pnls.iter().sum();
        let largest_win = pnls.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let largest_loss = pnls.iter().copied().fold(f64::INFINITY, f64::min);

        let avg_win = if winning_trades > 0 {
            gross_profit / winning_trades as f64
        } else {
            0.0
        };
        let avg_loss = if losing_trades > 0 {
            gross_loss / losing_trades as f64
        } else {
            0.0
        };

        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else {
            f64::INFINITY
        };
        let win_loss_ratio = if avg_loss > 0.0 {
            avg_win / avg_loss
        } else {
            f64::INFINITY
        };

        Self {
            total_trades: total,
            winning_trades,
            losing_trades,
            breakeven_trades: total - winning_trades - losing_trades,
            win_rate: winning_trades as f64 / total as f64 * 100.0,
            total_pnl,
            avg_pnl: total_pnl / total as f64,
            largest_win,
            largest_loss,
            avg_win,
            avg_loss,
            profit_factor,
            win_loss_ratio,
            max_drawdown: max_drawdown(trades),
            avg_bars_held: trades.iter().map(|t| t.bars_held as f64).sum::<f64>() / total as f64,
        }
    }
}

/// Largest decline of cumulative PnL from its running peak, equity starting
/// at zero, trades taken in exit order.
fn max_drawdown(trades: &[Trade]) -> f64 {
    let mut ordered: Vec<&Trade> = trades.iter().collect();
    ordered.sort_by_key(|t| t.exit_time);

    let mut equity = 0.0_f64;
    let mut peak = 0.0_f64;
    let mut drawdown = 0.0_f64;
    for trade in ordered {
        equity += trade.pnl();
        peak = peak.max(equity);
        drawdown = drawdown.max(peak - equity);
    }
    drawdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use trading_core::types::Side;

    fn trade(side: Side, entry: f64, exit: f64, exit_time: i64) -> Trade {
        Trade {
            side,
            entry_price: entry,
            exit_price: exit,
            entry_time: exit_time - 1,
            exit_time,
            quantity: 1,
            reason: "test".into(),
            bars_held: 2,
        }
    }

    #[test]
    fn test_empty_trade_list() {
        let stats = PerformanceStats::from_trades(&[]);

        assert_eq!(stats.total_trades, 0);
        assert_eq!(stats.winning_trades, 0);
        assert_eq!(stats.losing_trades, 0);
        assert_eq!(stats.win_rate, 0.0);
        assert_eq!(stats.profit_factor, 0.0);
        assert_eq!(stats.win_loss_ratio, 0.0);
        assert_eq!(stats.max_drawdown, 0.0);
    }

    #[test]
    fn test_single_winner_infinite_ratios() {
        let stats = PerformanceStats::from_trades(&[trade(Side::Long, 100.0, 110.0, 1)]);

        assert_eq!(stats.total_trades, 1);
        assert_eq!(stats.winning_trades, 1);
        assert!((stats.win_rate - 100.0).abs() < 1e-10);
        assert!(stats.profit_factor.is_infinite());
        assert!(stats.win_loss_ratio.is_infinite());
        assert!((stats.largest_win - 10.0).abs() < 1e-10);
        // With no loser, the smallest trade PnL is reported
        assert!((stats.largest_loss - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_mixed_trades() {
        let trades = vec![
            trade(Side::Long, 100.0, 105.0, 1),  // +5
            trade(Side::Short, 100.0, 102.0, 2), // -2
            trade(Side::Short, 100.0, 97.0, 3),  // +3
            trade(Side::Long, 100.0, 98.0, 4),   // -2
            trade(Side::Long, 100.0, 100.0, 5),  // 0
        ];
        let stats = PerformanceStats::from_trades(&trades);

        assert_eq!(stats.total_trades, 5);
        assert_eq!(stats.winning_trades, 2);
        assert_eq!(stats.losing_trades, 2);
        assert_eq!(stats.breakeven_trades, 1);
        assert!((stats.win_rate - 40.0).abs() < 1e-10);
        assert!((stats.total_pnl - 4.0).abs() < 1e-10);
        assert!((stats.avg_pnl - 0.8).abs() < 1e-10);
        assert!((stats.largest_win - 5.0).abs() < 1e-10);
        assert!((stats.largest_loss + 2.0).abs() < 1e-10);
        assert!((stats.avg_win - 4.0).abs() < 1e-10);
        assert!((stats.avg_loss - 2.0).abs() < 1e-10);
        assert!((stats.profit_factor - 2.0).abs() < 1e-10); // 8 / 4
        assert!((stats.win_loss_ratio - 2.0).abs() < 1e-10);
        assert!((stats.avg_bars_held - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_max_drawdown_in_exit_order() {
        // Listed out of exit order on purpose
        let trades = vec![
            trade(Side::Long, 100.0, 96.0, 3),  // -4
            trade(Side::Long, 100.0, 105.0, 1), // +5
            trade(Side::Long, 100.0, 99.0, 2),  // -1
            trade(Side::Long, 100.0, 103.0, 4), // +3
        ];
        let stats = PerformanceStats::from_trades(&trades);
        // Equity 5, 4, 0, 3: peak 5, trough 0
        assert!((stats.max_drawdown - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_drawdown_from_zero() {
        let stats = PerformanceStats::from_trades(&[trade(Side::Long, 100.0, 97.0, 1)]);
        assert!((stats.max_drawdown - 3.0).abs() < 1e-10);
        assert_eq!(stats.profit_factor, 0.0);
        assert_eq!(stats.win_loss_ratio, 0.0);
    }
}
