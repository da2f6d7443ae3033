//! Indicator engine: one [`IndicatorSet`] per bar for a single timeframe.

use serde::{Deserialize, Serialize};
use tracing::debug;
use trading_core::error::IndicatorError;
use trading_core::traits::Indicator;
use trading_core::types::{Bar, IndicatorSet, Timeframe};

use crate::momentum::{Macd, Rsi, Stochastic};
use crate::moving_average::Ema;
use crate::volatility::Atr;

/// Window parameters for the indicator engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub short_ema_period: usize,
    pub medium_ema_period: usize,
    pub rsi_period: usize,
    pub atr_period: usize,
    /// Fill `MACD` / `MACD_signal`
    pub compute_macd: bool,
    /// Fill `StochK` / `StochD`
    pub compute_stoch: bool,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub stoch_k_period: usize,
    pub stoch_d_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            short_ema_period: 5,
            medium_ema_period: 15,
            rsi_period: 14,
            atr_period: 14,
            compute_macd: false,
            compute_stoch: false,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            stoch_k_period: 14,
            stoch_d_period: 3,
        }
    }
}

impl IndicatorParams {
    /// Check every window before any indicator is constructed.
    pub fn validate(&self) -> Result<(), IndicatorError> {
        let windows = [
            ("short_ema_period", self.short_ema_period),
            ("medium_ema_period", self.medium_ema_period),
            ("rsi_period", self.rsi_period),
            ("atr_period", self.atr_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("stoch_k_period", self.stoch_k_period),
            ("stoch_d_period", self.stoch_d_period),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(IndicatorError::InvalidParameter(format!(
                    "{name} must be greater than 0"
                )));
            }
        }

        if self.macd_fast >= self.macd_slow {
            return Err(IndicatorError::InvalidParameter(format!(
                "macd_fast ({}) must be less than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }

        Ok(())
    }
}

/// Bars of one timeframe together with their per-bar indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub timeframe: Timeframe,
    pub bars: Vec<Bar>,
    /// Same length as `bars`
    pub indicators: Vec<IndicatorSet>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Computes the full indicator set for a bar sequence.
///
/// Every value at index `t` is a function of `bars[..=t]` only.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    params: IndicatorParams,
    ema_short: Ema,
    ema_medium: Ema,
    rsi: Rsi,
    atr: Atr,
    macd: Option<Macd>,
    stoch: Option<Stochastic>,
}

impl IndicatorEngine {
    /// Build the engine, rejecting invalid windows.
    pub fn new(params: IndicatorParams) -> Result<Self, IndicatorError> {
        params.validate()?;

        let macd = params
            .compute_macd
            .then(|| Macd::with_periods(params.macd_fast, params.macd_slow, params.macd_signal));
        let stoch = params
            .compute_stoch
            .then(|| Stochastic::with_periods(params.stoch_k_period, params.stoch_d_period));

        Ok(Self {
            ema_short: Ema::new(params.short_ema_period),
            ema_medium: Ema::new(params.medium_ema_period),
            rsi: Rsi::new(params.rsi_period),
            atr: Atr::new(params.atr_period),
            macd,
            stoch,
            params,
        })
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// One indicator set per bar. Short histories are not an error: the
    /// affected fields simply stay `None`.
    pub fn compute(&self, bars: &[Bar]) -> Vec<IndicatorSet> {
        let mut sets = vec![IndicatorSet::default(); bars.len()];
        if bars.is_empty() {
            return sets;
        }

        for (set, value) in sets.iter_mut().zip(self.run(&self.ema_short, bars)) {
            set.ema_short = value;
        }
        for (set, value) in sets.iter_mut().zip(self.run(&self.ema_medium, bars)) {
            set.ema_medium = value;
        }
        for (set, value) in sets.iter_mut().zip(self.run(&self.rsi, bars)) {
            set.rsi = value;
        }
        for (set, value) in sets.iter_mut().zip(self.run(&self.atr, bars)) {
            set.atr = value;
        }

        if let Some(macd) = &self.macd {
            for (set, value) in sets.iter_mut().zip(self.run(macd, bars)) {
                set.macd = value.map(|m| m.macd);
                set.macd_signal = value.map(|m| m.signal);
            }
        }

        if let Some(stoch) = &self.stoch {
            for (set, value) in sets.iter_mut().zip(self.run(stoch, bars)) {
                set.stoch_k = value.map(|s| s.k);
                set.stoch_d = value.and_then(|s| s.d);
            }
        }

        sets
    }

    /// Compute and pair the indicators with their bars.
    pub fn compute_series(&self, timeframe: Timeframe, bars: Vec<Bar>) -> IndicatorSeries {
        let indicators = self.compute(&bars);
        debug!(
            timeframe = %timeframe,
            bars = bars.len(),
            warmed_up = indicators.iter().filter(|s| s.available() > 0).count(),
            "Computed indicators"
        );
        IndicatorSeries {
            timeframe,
            bars,
            indicators,
        }
    }

    fn run<I: Indicator>(&self, indicator: &I, bars: &[Bar]) -> Vec<Option<I::Output>> {
        if let Err(e) = indicator.validate_data(bars) {
            debug!(indicator = indicator.name(), error = %e, "Indicator never warms up");
        }
        indicator.calculate(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trending_bars(n: usize) -> Vec<Bar> {
        (0..n)
            .map(|i| {
                let c = 100.0 + i as f64 + (i as f64 * 0.7).sin();
                Bar::new(i as i64 * 300_000, c - 0.2, c + 1.0, c - 1.0, c, 1000.0)
            })
            .collect()
    }

    #[test]
    fn test_default_params_valid() {
        assert!(IndicatorParams::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_params() {
        let params = IndicatorParams {
            rsi_period: 0,
            ..Default::default()
        };
        assert!(IndicatorEngine::new(params).is_err());

        let params = IndicatorParams {
            macd_fast: 26,
            macd_slow: 12,
            ..Default::default()
        };
        assert!(matches!(
            params.validate(),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_compute_one_set_per_bar() {
        let engine = IndicatorEngine::new(IndicatorParams::default()).unwrap();
        let bars = trending_bars(40);
        let sets = engine.compute(&bars);

        assert_eq!(sets.len(), 40);
        assert!(sets[0].ema_short.is_some());
        assert!(sets[0].rsi.is_none());
        assert!(sets[1].rsi.is_some());
        assert!(sets[12].atr.is_none());
        assert!(sets[13].atr.is_some());
        // Not requested
        assert!(sets.iter().all(|s| s.macd.is_none() && s.stoch_k.is_none()));
    }

    #[test]
    fn test_optional_indicators() {
        let params = IndicatorParams {
            compute_macd: true,
            compute_stoch: true,
            ..Default::default()
        };
        let engine = IndicatorEngine::new(params).unwrap();
        let sets = engine.compute(&trending_bars(30));

        assert!(sets[0].macd.is_some());
        assert!(sets[0].macd_signal.is_some());
        assert!(sets[12].stoch_k.is_none());
        assert!(sets[13].stoch_k.is_some());
        assert!(sets[14].stoch_d.is_none());
        assert!(sets[15].stoch_d.is_some());
    }

    #[test]
    fn test_causal() {
        // Appending bars never changes earlier values
        let engine = IndicatorEngine::new(IndicatorParams {
            compute_macd: true,
            compute_stoch: true,
            ..Default::default()
        })
        .unwrap();
        let bars = trending_bars(60);
        let full = engine.compute(&bars);
        let prefix = engine.compute(&bars[..35]);

        assert_eq!(&full[..35], &prefix[..]);
    }

    #[test]
    fn test_empty_input() {
        let engine = IndicatorEngine::new(IndicatorParams::default()).unwrap();
        assert!(engine.compute(&[]).is_empty());
    }

    #[test]
    fn test_compute_series() {
        let engine = IndicatorEngine::new(IndicatorParams::default()).unwrap();
        let series = engine.compute_series(Timeframe::Minute5, trending_bars(10));
        assert_eq!(series.len(), 10);
        assert_eq!(series.indicators.len(), 10);
        assert_eq!(series.timeframe, Timeframe::Minute5);
    }
}
