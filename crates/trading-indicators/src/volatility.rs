//! Volatility indicators.

use trading_core::traits::Indicator;
use trading_core::types::Bar;

use crate::moving_average::rolling_mean;

/// Average True Range (ATR).
///
/// Rolling mean over `period` bars of the true range
/// `max(high - low, |high - prev_close|, |low - prev_close|)`. The first bar
/// has no previous close and its true range is `high - low`.
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Create a new ATR indicator.
    ///
    /// Common period is 14.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// True range of every bar.
    pub fn true_ranges(bars: &[Bar]) -> Vec<f64> {
        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                let prev_close = i.checked_sub(1).map(|p| bars[p].close);
                bar.true_range(prev_close)
            })
            .collect()
    }
}

impl Indicator for Atr {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let tr: Vec<Option<f64>> = Self::true_ranges(bars).into_iter().map(Some).collect();
        rolling_mean(&tr, self.period)
    }

    fn period(&self) -> usize {
        self.period
    }

    fn name(&self) -> &str {
        "ATR"
    }
}
