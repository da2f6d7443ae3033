//! Strategy trait definitions.

use crate::error::StrategyError;
use crate::types::{AlignedRow, Side, Signal};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration trait for strategies.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// State of a strategy for monitoring and serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyState {
    /// Strategy name
    pub name: String,
    /// Mirrored position flag
    pub in_position: bool,
    /// Whether the last evaluated row had every indicator the entry rule needs
    pub is_warmed_up: bool,
    /// Number of rows evaluated
    pub rows_evaluated: usize,
    /// Number of signals generated
    pub signals_generated: usize,
    /// Indicator values seen on the last evaluated row
    pub indicators: BTreeMap<String, f64>,
    /// Custom strategy-specific state
    pub custom: serde_json::Value,
}

impl Default for StrategyState {
    fn default() -> Self {
        Self {
            name: String::new(),
            in_position: false,
            is_warmed_up: false,
            rows_evaluated: 0,
            signals_generated: 0,
            indicators: BTreeMap::new(),
            custom: serde_json::Value::Null,
        }
    }
}

/// Core strategy trait.
///
/// A strategy sees one aligned row at a time and may emit an entry signal.
/// It never closes positions itself: the position flag it keeps is mirrored
/// from the simulator through [`Strategy::on_position_opened`] and
/// [`Strategy::on_position_closed`].
pub trait Strategy: Send + Sync {
    /// Get the unique name of this strategy.
    fn name(&self) -> &str;

    /// Evaluate a row and optionally emit an entry signal.
    ///
    /// Returns `None` while in a position, and whenever a required
    /// indicator is not yet available.
    fn on_row(&mut self, row: &AlignedRow) -> Option<Signal>;

    /// Called when the simulator accepted an entry.
    fn on_position_opened(&mut self, _side: Side) {}

    /// Called when the simulator closed the position.
    fn on_position_closed(&mut self) {}

    /// Reset the strategy state.
    ///
    /// This is called before a replay to ensure a clean state.
    fn reset(&mut self);

    /// Get the current strategy state for monitoring.
    fn state(&self) -> StrategyState;

    /// Get a description of the strategy.
    fn description(&self) -> &str {
        ""
    }
}
