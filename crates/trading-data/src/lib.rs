//! Data adapters: CSV bar loading and trade log export.

mod csv_source;
mod trade_log;

pub use csv_source::{parse_timestamp, CsvDataSource};
pub use trade_log::{write_trades, write_trades_csv};

