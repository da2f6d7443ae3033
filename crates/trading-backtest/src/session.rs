//! Trading session window on bar time-of-day.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use trading_core::error::{TradingError, TradingResult};
use trading_core::types::Bar;

/// Half-open time-of-day window `[start, end)`.
///
/// A window whose start is after its end wraps midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl SessionWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> TradingResult<Self> {
        if start == end {
            return Err(TradingError::Config(format!(
                "session window is empty: start and end are both {start}"
            )));
        }
        Ok(Self { start, end })
    }

    /// 09:30 to 17:30.
    pub fn regular() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 30, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(17, 30, 0).unwrap_or_default(),
        }
    }

    /// Parse `HH:MM[:SS]` bounds.
    pub fn parse(start: &str, end: &str) -> TradingResult<Self> {
        Self::new(parse_time(start)?, parse_time(end)?)
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= time && time < self.end
        } else {
            time >= self.start || time < self.end
        }
    }

    pub fn contains_bar(&self, bar: &Bar) -> bool {
        self.contains(bar.time_of_day())
    }
}

impl Default for SessionWindow {
    fn default() -> Self {
        Self::regular()
    }
}

impl fmt::Display for SessionWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

fn parse_time(s: &str) -> TradingResult<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s.trim(), "%H:%M"))
        .map_err(|e| TradingError::Config(format!("invalid session time '{s}': {e}")))
}
