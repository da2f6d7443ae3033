//! CSV data source.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use trading_core::error::DataError;
use trading_core::traits::DataSource;
use trading_core::types::{Bar, Timeframe};

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(
        alias = "Time",
        alias = "Date",
        alias = "date",
        alias = "timestamp",
        alias = "Timestamp",
        alias = "datetime",
        alias = "Datetime"
    )]
    time: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", default)]
    volume: f64,
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// CSV data source: one file per timeframe.
///
/// Rows are validated and sorted on load; a malformed bar or a duplicate
/// timestamp fails the whole file.
#[derive(Debug, Clone, Default)]
pub struct CsvDataSource {
    files: BTreeMap<Timeframe, PathBuf>,
}

impl CsvDataSource {
    /// Create an empty data source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the file holding the bars of `timeframe`.
    pub fn with_file(
        mut self,
        timeframe: Timeframe,
        path: impl Into<PathBuf>,
    ) -> Result<Self, DataError> {
        let path = path.into();
        if !path.exists() {
            return Err(DataError::NotFound(path.display().to_string()));
        }
        self.files.insert(timeframe, path);
        Ok(self)
    }

    /// Timeframes with a registered file.
    pub fn timeframes(&self) -> impl Iterator<Item = Timeframe> + '_ {
        self.files.keys().copied()
    }

    /// Load and validate bars from a file.
    pub fn load_file(path: &Path) -> Result<Vec<Bar>, DataError> {
        let file = std::fs::File::open(path)
            .map_err(|e| DataError::NotFound(format!("{}: {e}", path.display())))?;
        Self::parse(file)
    }

    /// Parse and validate bars from any CSV reader.
    pub fn parse<R: Read>(input: R) -> Result<Vec<Bar>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input);

        let mut bars = Vec::new();

        for (idx, result) in reader.deserialize().enumerate() {
            // Header is line 1
            let row = idx + 2;
            let record: CsvRecord =
                result.map_err(|e| DataError::ParseError(format!("row {row}: {e}")))?;

            let timestamp = parse_timestamp(&record.time)?;
            let bar = Bar::new(
                timestamp,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            );
            bar.validate()
                .map_err(|reason| DataError::MalformedBar { row, reason })?;

            bars.push((row, bar));
        }

        // Sort by timestamp
        bars.sort_by_key(|(_, b)| b.timestamp);

        for pair in bars.windows(2) {
            if pair[0].1.timestamp == pair[1].1.timestamp {
                return Err(DataError::DuplicateTimestamp {
                    row: pair[1].0.max(pair[0].0),
                    timestamp: pair[1].1.timestamp,
                });
            }
        }

        Ok(bars.into_iter().map(|(_, bar)| bar).collect())
    }
}

#[async_trait]
impl DataSource for CsvDataSource {
    async fn load_bars(&self, timeframe: Timeframe) -> Result<Vec<Bar>, DataError> {
        let path = self
            .files
            .get(&timeframe)
            .ok_or_else(|| DataError::InvalidTimeframe(format!("no file registered for {timeframe}")))?;

        let content = tokio::fs::read(path)
            .await
            .map_err(|e| DataError::NotFound(format!("{}: {e}", path.display())))?;
        let bars = Self::parse(content.as_slice())?;

        if bars.is_empty() {
            return Err(DataError::NoDataAvailable);
        }

        debug!(
            timeframe = %timeframe,
            path = %path.display(),
            bars = bars.len(),
            "Loaded bars"
        );
        Ok(bars)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Parse various timestamp formats into Unix milliseconds.
pub fn parse_timestamp(value: &str) -> Result<i64, DataError> {
    let value = value.trim();

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(value, format) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc().timestamp_millis());
            }
        }
    }

    // Try parsing as Unix timestamp
    if let Ok(ts) = value.parse::<i64>() {
        // Assume milliseconds if > 10 digits
        let millis = if ts > 10_000_000_000 {
            Some(ts)
        } else {
            ts.checked_mul(1000)
        };
        return millis
            .filter(|ms| DateTime::<Utc>::from_timestamp_millis(*ms).is_some())
            .ok_or_else(|| {
                DataError::ParseError(format!("Unix timestamp out of range: {}", value))
            });
    }

    Err(DataError::ParseError(format!(
        "Could not parse date: {}",
        value
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
time,open,high,low,close,volume
2024-01-15 09:35:00,100.0,101.0,99.5,100.5,1200
2024-01-15 09:30:00,99.0,100.2,98.8,100.0,1500
2024-01-15 09:40:00,100.5,100.9,100.1,100.8,900
";

    #[test]
    fn test_parse_timestamp() {
        // Test various formats
        assert_eq!(
            parse_timestamp("2024-01-15 09:30:00").unwrap(),
            1_705_311_000_000
        );
        assert_eq!(
            parse_timestamp("2024-01-15T09:30:00").unwrap(),
            1_705_311_000_000
        );
        assert_eq!(parse_timestamp("2024-01-15 09:30").unwrap(), 1_705_311_000_000);
        assert!(parse_timestamp("2024-01-15").is_ok());
        assert!(parse_timestamp("01/15/2024").is_ok());
        assert_eq!(parse_timestamp("1705312800000").unwrap(), 1_705_312_800_000); // Unix ms
        assert_eq!(parse_timestamp("1705312800").unwrap(), 1_705_312_800_000); // Unix sec
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_out_of_range_unix_timestamp_rejected() {
        assert!(matches!(
            parse_timestamp("-9223372036854775807"),
            Err(DataError::ParseError(_))
        ));
        assert!(matches!(
            parse_timestamp("9223372036854775807"),
            Err(DataError::ParseError(_))
        ));

        let csv = "time,open,high,low,close,volume\n-9223372036854775807,1,2,0.5,1.5,1\n";
        assert!(matches!(
            CsvDataSource::parse(csv.as_bytes()),
            Err(DataError::ParseError(_))
        ));
    }

    #[test]
    fn test_parse_sorts_rows() {
        let bars = CsvDataSource::parse(SAMPLE.as_bytes()).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].timestamp, 1_705_311_000_000);
        assert!(bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(bars[1].close, 100.5);
    }

    #[test]
    fn test_header_aliases_and_missing_volume() {
        let csv = "Date,Open,High,Low,Close\n2024-01-15,1,2,0.5,1.5\n";
        let bars = CsvDataSource::parse(csv.as_bytes()).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].volume, 0.0);
    }

    #[test]
    fn test_malformed_bar_rejected() {
        let csv = "time,open,high,low,close,volume\n2024-01-15 09:30:00,100,99,101,100,1\n";
        let err = CsvDataSource::parse(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DataError::MalformedBar { row: 2, .. }));

        let csv = "time,open,high,low,close,volume\n2024-01-15 09:30:00,100,101,99,102,1\n";
        assert!(matches!(
            CsvDataSource::parse(csv.as_bytes()),
            Err(DataError::MalformedBar { .. })
        ));
    }

    #[test]
    fn test_missing_field_rejected() {
        let csv = "time,open,high,low,close,volume\n2024-01-15 09:30:00,100,101,,100,1\n";
        assert!(matches!(
            CsvDataSource::parse(csv.as_bytes()),
            Err(DataError::ParseError(_))
        ));
    }

    #[test]
    fn test_duplicate_timestamp_rejected() {
        let csv = "\
time,open,high,low,close,volume
2024-01-15 09:30:00,1,2,0.5,1.5,1
2024-01-15 09:30:00,1,2,0.5,1.5,1
";
        assert!(matches!(
            CsvDataSource::parse(csv.as_bytes()),
            Err(DataError::DuplicateTimestamp { row: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_load_bars_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let source = CsvDataSource::new()
            .with_file(Timeframe::Minute5, file.path())
            .unwrap();

        let bars = source.load_bars(Timeframe::Minute5).await.unwrap();
        assert_eq!(bars.len(), 3);

        assert!(matches!(
            source.load_bars(Timeframe::Minute1).await,
            Err(DataError::InvalidTimeframe(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"time,open,high,low,close,volume\n").unwrap();

        let source = CsvDataSource::new()
            .with_file(Timeframe::Minute1, file.path())
            .unwrap();
        assert!(matches!(
            source.load_bars(Timeframe::Minute1).await,
            Err(DataError::NoDataAvailable)
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CsvDataSource::new().with_file(Timeframe::Minute1, "/nonexistent/bars.csv"),
            Err(DataError::NotFound(_))
        ));
    }
}
