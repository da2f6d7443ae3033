//! Momentum indicators.

use serde::{Deserialize, Serialize};
use trading_core::traits::Indicator;
use trading_core::types::Bar;

use crate::moving_average::{rolling_mean, Ema};

/// Relative Strength Index (RSI).
///
/// Average gains and losses are exponentially smoothed with
/// `alpha = 1 / period` and seeded with the first close-to-close delta, so
/// the value is undefined only on the first bar.
///
/// Saturation: when the average loss is exactly zero the ratio is unbounded.
/// RSI is then 100 if there has been any gain and 50 if the price has not
/// moved at all. Every other value is clamped to `[0, 100]`.
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI indicator.
    ///
    /// Common periods are 14 (default) or 9.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// RSI from smoothed average gain and loss.
    pub fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            return if avg_gain == 0.0 { 50.0 } else { 100.0 };
        }
        (100.0 - 100.0 / (1.0 + avg_gain / avg_loss)).clamp(0.0, 100.0)
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let mut result = Vec::with_capacity(bars.len());
        let alpha = 1.0 / self.period as f64;
        let one_minus_alpha = 1.0 - alpha;

        let mut averages: Option<(f64, f64)> = None;
        for (i, bar) in bars.iter().enumerate() {
            if i == 0 {
                result.push(None);
                continue;
            }

            let change = bar.close - bars[i - 1].close;
            let gain = change.max(0.0);
            let loss = (-change).max(0.0);

            let (avg_gain, avg_loss) = match averages {
                None => (gain, loss),
                Some((g, l)) => (
                    gain * alpha + g * one_minus_alpha,
                    loss * alpha + l * one_minus_alpha,
                ),
            };
            averages = Some((avg_gain, avg_loss));
            result.push(Some(Self::from_averages(avg_gain, avg_loss)));
        }

        result
    }

    fn period(&self) -> usize {
        2 // One delta needs two closes
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

/// MACD (Moving Average Convergence Divergence) output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA)
    pub macd: f64,
    /// Signal line (EMA of MACD)
    pub signal: f64,
    /// Histogram (MACD - Signal)
    pub histogram: f64,
}

/// MACD indicator.
///
/// Both EMAs and the signal line use the first-value seed, so MACD is
/// defined from the first bar.
#[derive(Debug, Clone)]
pub struct Macd {
    fast: Ema,
    slow: Ema,
    signal: Ema,
}

impl Macd {
    /// Create a new MACD with default parameters (12, 26, 9).
    pub fn new() -> Self {
        Self::with_periods(12, 26, 9)
    }

    /// Create a MACD with custom periods.
    pub fn with_periods(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast > 0 && slow > 0 && signal > 0);
        assert!(fast < slow, "Fast period must be less than slow period");
        Self {
            fast: Ema::new(fast),
            slow: Ema::new(slow),
            signal: Ema::new(signal),
        }
    }

}

impl Default for Macd {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for Macd {
    type Output = MacdOutput;

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<MacdOutput>> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let fast = self.fast.apply(&closes);
        let slow = self.slow.apply(&closes);

        let macd_line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal_line = self.signal.apply(&macd_line);

        macd_line
            .into_iter()
            .zip(signal_line)
            .map(|(macd, signal)| {
                Some(MacdOutput {
                    macd,
                    signal,
                    histogram: macd - signal,
                })
            })
            .collect()
    }

    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "MACD"
    }
}

/// Stochastic oscillator output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticOutput {
    /// %K (fast stochastic)
    pub k: f64,
    /// %D (rolling mean of %K), undefined until `d_period` %K values exist
    pub d: Option<f64>,
}

/// Added to the denominator of %K so a flat window does not divide by zero.
pub const STOCH_EPSILON: f64 = 1e-9;

/// Stochastic oscillator.
///
/// `%K = 100 * (close - lowest_low) / (highest_high - lowest_low + eps)`
/// over `k_period` bars; `%D` is the rolling mean of `%K` over `d_period`.
#[derive(Debug, Clone)]
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Stochastic {
    /// Create a new stochastic oscillator with default parameters (14, 3).
    pub fn new() -> Self {
        Self::with_periods(14, 3)
    }

    /// Create with custom periods.
    pub fn with_periods(k_period: usize, d_period: usize) -> Self {
        assert!(k_period > 0 && d_period > 0);
        Self { k_period, d_period }
    }

    fn percent_k(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        (0..bars.len())
            .map(|i| {
                if i + 1 < self.k_period {
                    return None;
                }
                let window = &bars[i + 1 - self.k_period..=i];
                let highest = window
                    .iter()
                    .map(|b| b.high)
                    .fold(f64::NEG_INFINITY, f64::max);
                let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

                Some(100.0 * (bars[i].close - lowest) / (highest - lowest + STOCH_EPSILON))
            })
            .collect()
    }
}

impl Default for Stochastic {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for Stochastic {
    type Output = StochasticOutput;

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<StochasticOutput>> {
        let k_values = self.percent_k(bars);
        let d_values = rolling_mean(&k_values, self.d_period);

        k_values
            .into_iter()
            .zip(d_values)
            .map(|(k, d)| k.map(|k| StochasticOutput { k, d }))
            .collect()
    }

    fn period(&self) -> usize {
        self.k_period
    }

    fn name(&self) -> &str {
        "Stochastic"
    }
}
