//! Indicator trait definitions.

use crate::error::IndicatorError;
use crate::types::Bar;

/// Trait for technical indicators.
///
/// Indicators are causal: the value at index `t` depends only on
/// `bars[..=t]`. The output has exactly one entry per input bar, with `None`
/// marking bars where the window has not filled yet.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values for the given bars.
    fn calculate(&self, bars: &[Bar]) -> Vec<Option<Self::Output>>;

    /// Number of bars needed before the first value is available.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Validate that there's enough data for at least one value.
    fn validate_data(&self, bars: &[Bar]) -> Result<(), IndicatorError> {
        if bars.len() < self.period() {
            return Err(IndicatorError::InsufficientData {
                required: self.period(),
                available: bars.len(),
            });
        }
        Ok(())
    }
}
