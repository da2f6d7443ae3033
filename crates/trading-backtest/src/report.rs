//! Backtest report generation.

use serde::Serialize;
use trading_core::types::{Position, Trade};

use crate::{BacktestConfig, PerformanceStats};

/// Complete backtest report.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    /// Strategy name
    pub strategy: String,
    /// Configuration used
    pub config: BacktestConfig,
    /// Rows replayed
    pub bars_processed: usize,
    /// Entry signals the simulator accepted
    pub entries_accepted: usize,
    /// Rows outside the session window
    pub out_of_session_bars: usize,
    /// Statistics
    pub stats: PerformanceStats,
    /// Closed trades in exit order
    pub trades: Vec<Trade>,
    /// Position still open after the last row
    pub open_position: Option<Position>,
}

impl BacktestReport {
    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                     BACKTEST REPORT                        \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str(&format!("  Strategy:            {}\n\n", self.strategy));

        s.push_str("TRADE STATISTICS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!(
            "  Total Trades:        {}\n",
            self.stats.total_trades
        ));
        s.push_str(&format!(
            "  Winners / Losers:    {} / {}\n",
            self.stats.winning_trades, self.stats.losing_trades
        ));
        s.push_str(&format!(
            "  Breakeven Trades:    {}\n",
            self.stats.breakeven_trades
        ));
        s.push_str(&format!("  Win Rate:            {:.2}%\n", self.stats.win_rate));
        s.push_str(&format!("  Total P/L:           {:.2}\n", self.stats.total_pnl));
        s.push_str(&format!("  Avg P/L:             {:.2}\n", self.stats.avg_pnl));
        s.push_str(&format!(
            "  Largest Win:         {:.2}\n",
            self.stats.largest_win
        ));
        s.push_str(&format!(
            "  Largest Loss:        {:.2}\n",
            self.stats.largest_loss
        ));
        s.push('\n');

        s.push_str("RATIOS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!(
            "  Profit Factor:       {:.3}\n",
            self.stats.profit_factor
        ));
        s.push_str(&format!(
            "  Avg Win / Avg Loss:  {:.3}\n",
            self.stats.win_loss_ratio
        ));
        s.push_str(&format!(
            "  Max Drawdown:        {:.2}\n",
            self.stats.max_drawdown
        ));
        s.push_str(&format!(
            "  Avg Bars Held:       {:.1}\n",
            self.stats.avg_bars_held
        ));
        s.push('\n');

        s.push_str("EXECUTION\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Bars Processed:      {}\n", self.bars_processed));
        s.push_str(&format!(
            "  Out of Session:      {}\n",
            self.out_of_session_bars
        ));
        s.push_str(&format!("  Entries Accepted:    {}\n", self.entries_accepted));
        match &self.open_position {
            Some(position) => s.push_str(&format!(
                "  Open Position:       {} @ {:.2}\n",
                position.side, position.entry_price
            )),
            None => s.push_str("  Open Position:       none\n"),
        }
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON. Infinite ratios are written as `null`.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
