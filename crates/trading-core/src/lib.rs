//! Core types and traits for the bar-replay engine.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, Timeframe)
//! - Per-bar indicator snapshots and multi-timeframe aligned rows
//! - Signals, positions and closed trades
//! - Core traits for indicators, strategies and data sources

pub mod types;
pub mod traits;
pub mod error;

pub use error::{TradingError, TradingResult};
pub use types::*;
pub use traits::*;
