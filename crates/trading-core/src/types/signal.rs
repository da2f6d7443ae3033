//! Trading signals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// PnL per unit of moving from `entry` to `exit` on this side.
    #[inline]
    pub fn pnl(&self, entry: f64, exit: f64) -> f64 {
        match self {
            Side::Long => exit - entry,
            Side::Short => entry - exit,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

/// Kind of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Long,
    Short,
    Exit,
}

/// A signal handed to the position simulator.
///
/// Signals are ephemeral: produced by the strategy (entries) or by the
/// simulator / replay driver (exits) and consumed on the same bar.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    /// Open a position on `side` at the bar close.
    Entry { side: Side, reason: String },
    /// Close the open position on `side` at `price`.
    Exit {
        side: Side,
        price: f64,
        reason: String,
    },
}

impl Signal {
    /// Long entry.
    pub fn long(reason: impl Into<String>) -> Self {
        Signal::Entry {
            side: Side::Long,
            reason: reason.into(),
        }
    }

    /// Short entry.
    pub fn short(reason: impl Into<String>) -> Self {
        Signal::Entry {
            side: Side::Short,
            reason: reason.into(),
        }
    }

    /// Exit for a position on `side`.
    pub fn exit(side: Side, price: f64, reason: impl Into<String>) -> Self {
        Signal::Exit {
            side,
            price,
            reason: reason.into(),
        }
    }

    pub fn signal_type(&self) -> SignalType {
        match self {
            Signal::Entry {
                side: Side::Long, ..
            } => SignalType::Long,
            Signal::Entry {
                side: Side::Short, ..
            } => SignalType::Short,
            Signal::Exit { .. } => SignalType::Exit,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            Signal::Entry { reason, .. } | Signal::Exit { reason, .. } => reason,
        }
    }

    pub fn exit_price(&self) -> Option<f64> {
        match self {
            Signal::Exit { price, .. } => Some(*price),
            Signal::Entry { .. } => None,
        }
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    StopLoss,
    TrailingStop,
    TakeProfit,
    SessionEnd,
    EndOfData,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::StopLoss => "StopLoss hit",
            ExitReason::TrailingStop => "StopLoss hit (trailing)",
            ExitReason::TakeProfit => "TakeProfit hit",
            ExitReason::SessionEnd => "Session end",
            ExitReason::EndOfData => "End of data",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
