//! Moving average indicators.

use trading_core::traits::Indicator;
use trading_core::types::Bar;

/// Rolling arithmetic mean over `period` values.
///
/// A window containing a missing value yields `None`, as do the first
/// `period - 1` positions.
pub fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut result = Vec::with_capacity(values.len());
    if period == 0 {
        result.resize(values.len(), None);
        return result;
    }

    let period_f64 = period as f64;
    for i in 0..values.len() {
        if i + 1 < period {
            result.push(None);
            continue;
        }
        let window = &values[i + 1 - period..=i];
        let sum: Option<f64> = window.iter().copied().sum();
        result.push(sum.map(|s| s / period_f64));
    }

    result
}

/// Exponential Moving Average (EMA) of close prices.
///
/// Recursive form seeded with the first value:
/// `ema[0] = x[0]`, `ema[t] = x[t] * alpha + ema[t-1] * (1 - alpha)`,
/// with `alpha = 2 / (span + 1)`. Defined from the first bar.
#[derive(Debug, Clone)]
pub struct Ema {
    alpha: f64,
}

impl Ema {
    /// Create a new EMA with the specified span.
    pub fn new(span: usize) -> Self {
        assert!(span > 0, "Span must be greater than 0");
        Self {
            alpha: 2.0 / (span as f64 + 1.0),
        }
    }

    /// Apply the recurrence to an arbitrary series.
    pub fn apply(&self, values: &[f64]) -> Vec<f64> {
        let mut result = Vec::with_capacity(values.len());
        let one_minus_alpha = 1.0 - self.alpha;

        let mut prev: Option<f64> = None;
        for &value in values {
            let next = match prev {
                None => value,
                Some(ema) => value * self.alpha + ema * one_minus_alpha,
            };
            result.push(next);
            prev = Some(next);
        }

        result
    }
}

impl Indicator for Ema {
    type Output = f64;

    fn calculate(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        self.apply(&closes).into_iter().map(Some).collect()
    }

    /// The recursion is seeded on the first bar, so one bar suffices.
    fn period(&self) -> usize {
        1
    }

    fn name(&self) -> &str {
        "EMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closes(values: &[f64]) -> Vec<Bar> {
        values
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as i64 * 60_000, c, c, c, c, 0.0))
            .collect()
    }

    #[test]
    fn test_rolling_mean_skips_missing_windows() {
        let values = [None, Some(2.0), Some(4.0), Some(6.0)];
        let result = rolling_mean(&values, 2);

        assert_eq!(result[0], None);
        assert_eq!(result[1], None); // window holds a None
        assert!((result[2].unwrap() - 3.0).abs() < 1e-10);
        assert!((result[3].unwrap() - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_ema_seeded_with_first_close() {
        let ema = Ema::new(3);
        let result = ema.calculate(&closes(&[1.0, 2.0, 3.0, 4.0, 5.0]));

        assert_eq!(result.len(), 5);
        // alpha = 2/(3+1) = 0.5
        assert!((result[0].unwrap() - 1.0).abs() < 1e-10);
        assert!((result[1].unwrap() - 1.5).abs() < 1e-10);
        assert!((result[2].unwrap() - 2.25).abs() < 1e-10);
        assert!((result[3].unwrap() - 3.125).abs() < 1e-10);
    }

    #[test]
    fn test_ema_constant_series() {
        let ema = Ema::new(10);
        let result = ema.apply(&[7.0; 20]);
        assert!(result.iter().all(|v| (v - 7.0).abs() < 1e-10));
    }

    #[test]
    fn test_ema_empty() {
        assert!(Ema::new(5).apply(&[]).is_empty());
    }
}
