//! Entry strategies for the bar-replay engine.
//!
//! Strategies evaluate one aligned multi-timeframe row at a time and emit
//! entry signals. Exits belong to the position simulator.
//!
//! - Trend entry: medium EMA trend with short EMA and RSI confirmation

mod trend_entry;

pub use trend_entry::{TrendEntryConfig, TrendEntryStrategy};
