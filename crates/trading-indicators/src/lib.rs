//! Causal technical indicators and multi-timeframe alignment.
//!
//! This crate provides:
//! - Exponential moving average and rolling mean
//! - Momentum indicators (RSI, MACD, Stochastic)
//! - Volatility indicators (ATR)
//! - [`IndicatorEngine`], producing one [`IndicatorSet`](trading_core::IndicatorSet) per bar
//! - [`TimeframeAligner`], the as-of join of finer timeframes onto a coarse one
//!
//! Every indicator returns exactly one value per input bar. Bars inside the
//! warm-up window yield `None` instead of a numeric placeholder.

pub mod align;
pub mod engine;
pub mod momentum;
pub mod moving_average;
pub mod volatility;

pub use align::TimeframeAligner;
pub use engine::{IndicatorEngine, IndicatorParams, IndicatorSeries};
pub use momentum::{Macd, MacdOutput, Rsi, Stochastic, StochasticOutput};
pub use moving_average::{rolling_mean, Ema};
pub use volatility::Atr;
