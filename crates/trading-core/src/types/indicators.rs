//! Per-bar indicator snapshots and multi-timeframe aligned rows.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Bar, Timeframe};

/// Named value inside an [`IndicatorSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IndicatorField {
    EmaShort,
    EmaMedium,
    Rsi,
    Atr,
    Macd,
    MacdSignal,
    StochK,
    StochD,
}

impl IndicatorField {
    pub const ALL: [IndicatorField; 8] = [
        IndicatorField::EmaShort,
        IndicatorField::EmaMedium,
        IndicatorField::Rsi,
        IndicatorField::Atr,
        IndicatorField::Macd,
        IndicatorField::MacdSignal,
        IndicatorField::StochK,
        IndicatorField::StochD,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IndicatorField::EmaShort => "EMA_short",
            IndicatorField::EmaMedium => "EMA_medium",
            IndicatorField::Rsi => "RSI",
            IndicatorField::Atr => "ATR",
            IndicatorField::Macd => "MACD",
            IndicatorField::MacdSignal => "MACD_signal",
            IndicatorField::StochK => "StochK",
            IndicatorField::StochD => "StochD",
        }
    }
}

impl fmt::Display for IndicatorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Indicator values attached to one bar of one timeframe.
///
/// `None` means "not yet available": the series has not seen enough bars
/// for that window, or the indicator was not requested. Comparisons against
/// a missing value must not be made; callers match on the option instead.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub ema_short: Option<f64>,
    pub ema_medium: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
}

impl IndicatorSet {
    pub fn get(&self, field: IndicatorField) -> Option<f64> {
        match field {
            IndicatorField::EmaShort => self.ema_short,
            IndicatorField::EmaMedium => self.ema_medium,
            IndicatorField::Rsi => self.rsi,
            IndicatorField::Atr => self.atr,
            IndicatorField::Macd => self.macd,
            IndicatorField::MacdSignal => self.macd_signal,
            IndicatorField::StochK => self.stoch_k,
            IndicatorField::StochD => self.stoch_d,
        }
    }

    fn slot(&mut self, field: IndicatorField) -> &mut Option<f64> {
        match field {
            IndicatorField::EmaShort => &mut self.ema_short,
            IndicatorField::EmaMedium => &mut self.ema_medium,
            IndicatorField::Rsi => &mut self.rsi,
            IndicatorField::Atr => &mut self.atr,
            IndicatorField::Macd => &mut self.macd,
            IndicatorField::MacdSignal => &mut self.macd_signal,
            IndicatorField::StochK => &mut self.stoch_k,
            IndicatorField::StochD => &mut self.stoch_d,
        }
    }

    /// Fill every missing field from `earlier`. Present values are kept.
    ///
    /// Only ever called with a snapshot that precedes `self` in time, so
    /// values flow forward and never backward.
    pub fn forward_fill(&mut self, earlier: &IndicatorSet) {
        for field in IndicatorField::ALL {
            let slot = self.slot(field);
            if slot.is_none() {
                *slot = earlier.get(field);
            }
        }
    }

    /// Number of fields holding a value.
    pub fn available(&self) -> usize {
        IndicatorField::ALL
            .iter()
            .filter(|f| self.get(**f).is_some())
            .count()
    }

    /// Iterate over `(field, value)` pairs that are available.
    pub fn iter(&self) -> impl Iterator<Item = (IndicatorField, f64)> + '_ {
        IndicatorField::ALL
            .into_iter()
            .filter_map(move |f| self.get(f).map(|v| (f, v)))
    }
}

/// As-of snapshot of a finer timeframe attached to a coarse bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FineSnapshot {
    pub timeframe: Timeframe,
    /// Timestamp of the most recent fine bar at or before the coarse bar;
    /// `None` while no fine bar precedes it.
    pub as_of: Option<i64>,
    pub indicators: IndicatorSet,
}

/// One coarse bar with its own indicators and the as-of indicators of every
/// finer timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    pub bar: Bar,
    pub timeframe: Timeframe,
    pub indicators: IndicatorSet,
    pub fine: Vec<FineSnapshot>,
}

impl AlignedRow {
    /// Row without any finer timeframe attached.
    pub fn new(bar: Bar, timeframe: Timeframe, indicators: IndicatorSet) -> Self {
        Self {
            bar,
            timeframe,
            indicators,
            fine: Vec::new(),
        }
    }

    /// Indicators of a finer timeframe, if that timeframe was aligned.
    pub fn fine(&self, timeframe: Timeframe) -> Option<&IndicatorSet> {
        self.fine
            .iter()
            .find(|s| s.timeframe == timeframe)
            .map(|s| &s.indicators)
    }
}
