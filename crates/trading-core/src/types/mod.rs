//! Core data types for the replay engine.

mod indicators;
mod ohlcv;
mod position;
mod signal;
mod timeframe;

pub use indicators::{AlignedRow, FineSnapshot, IndicatorField, IndicatorSet};
pub use ohlcv::Bar;
pub use position::{Position, Trade};
pub use signal::{ExitReason, Side, Signal, SignalType};
pub use timeframe::Timeframe;
