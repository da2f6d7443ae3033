//! Trade log export.

use chrono::DateTime;
use csv::Writer;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;
use trading_core::error::DataError;
use trading_core::types::{Side, Trade};

#[derive(Debug, Serialize)]
struct TradeRow<'a> {
    side: Side,
    entry_time: String,
    exit_time: String,
    entry_price: f64,
    exit_price: f64,
    quantity: u32,
    pnl: f64,
    bars_held: usize,
    reason: &'a str,
}

impl<'a> From<&'a Trade> for TradeRow<'a> {
    fn from(trade: &'a Trade) -> Self {
        Self {
            side: trade.side,
            entry_time: format_time(trade.entry_time),
            exit_time: format_time(trade.exit_time),
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            quantity: trade.quantity,
            pnl: trade.pnl(),
            bars_held: trade.bars_held,
            reason: &trade.reason,
        }
    }
}

fn format_time(millis: i64) -> String {
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}

/// Write trades to any writer, header first, one row per trade.
pub fn write_trades<W: Write>(writer: W, trades: &[Trade]) -> Result<(), DataError> {
    let mut csv = Writer::from_writer(writer);
    for trade in trades {
        csv.serialize(TradeRow::from(trade))
            .map_err(|e| DataError::WriteError(e.to_string()))?;
    }
    if trades.is_empty() {
        csv.write_record([
            "side",
            "entry_time",
            "exit_time",
            "entry_price",
            "exit_price",
            "quantity",
            "pnl",
            "bars_held",
            "reason",
        ])
        .map_err(|e| DataError::WriteError(e.to_string()))?;
    }
    csv.flush().map_err(|e| DataError::WriteError(e.to_string()))
}

/// Write the trade log to a CSV file.
pub fn write_trades_csv(path: impl AsRef<Path>, trades: &[Trade]) -> Result<(), DataError> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .map_err(|e| DataError::WriteError(format!("{}: {e}", path.display())))?;
    write_trades(file, trades)?;
    info!(path = %path.display(), trades = trades.len(), "Trades saved");
    Ok(())
}
