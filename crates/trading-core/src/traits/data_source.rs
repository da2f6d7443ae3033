//! Data source trait definitions.

use crate::error::DataError;
use crate::types::{Bar, Timeframe};
use async_trait::async_trait;

/// Trait for historical bar sources.
///
/// Implementations are the loading boundary: bars they return are validated,
/// sorted oldest to newest and free of duplicate timestamps.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Load the full bar history for a timeframe.
    async fn load_bars(&self, timeframe: Timeframe) -> Result<Vec<Bar>, DataError>;

    /// Get the data source name.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<Bar>);

    #[async_trait]
    impl DataSource for Fixed {
        async fn load_bars(&self, _timeframe: Timeframe) -> Result<Vec<Bar>, DataError> {
            if self.0.is_empty() {
                return Err(DataError::NoDataAvailable);
            }
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_load_bars() {
        let source = Fixed(vec![Bar::new(1, 1.0, 1.0, 1.0, 1.0, 0.0)]);
        let bars = source.load_bars(Timeframe::Minute1).await.unwrap();
        assert_eq!(bars.len(), 1);

        let empty = Fixed(vec![]);
        assert!(empty.load_bars(Timeframe::Minute1).await.is_err());
    }
}
