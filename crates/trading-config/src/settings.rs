//! Configuration structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use trading_backtest::{BacktestConfig, ExecutionConfig, SessionWindow};
use trading_core::error::{TradingError, TradingResult};
use trading_core::traits::StrategyConfig;
use trading_core::types::Timeframe;
use trading_indicators::IndicatorParams;
use trading_strategies::TrendEntryConfig;

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub indicators: IndicatorParams,
    #[serde(default)]
    pub strategy: TrendEntryConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub backtest: BacktestSettings,
    #[serde(default)]
    pub data: DataSettings,
}

impl AppConfig {
    /// Check every section. The first failure is returned.
    pub fn validate(&self) -> TradingResult<()> {
        self.indicators.validate()?;
        self.strategy.validate()?;
        self.execution.validate()?;
        self.session.window()?;

        for fine in &self.data.fine {
            if !fine.timeframe.is_finer_than(self.data.coarse.timeframe) {
                return Err(TradingError::Config(format!(
                    "data.fine timeframe {} must be finer than the coarse timeframe {}",
                    fine.timeframe, self.data.coarse.timeframe
                )));
            }
        }

        Ok(())
    }

    /// Engine configuration: the one place the simulator settings are read.
    pub fn backtest_config(&self) -> TradingResult<BacktestConfig> {
        Ok(BacktestConfig {
            execution: self.execution.clone(),
            session: self.session.window()?,
            flatten_at_session_end: self.session.flatten_at_end,
            close_at_end: self.backtest.close_at_end,
        })
    }
}

/// General app settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub name: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "bar-replay".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// Trading session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub enabled: bool,
    /// `HH:MM[:SS]`
    pub start: String,
    /// `HH:MM[:SS]`, exclusive
    pub end: String,
    /// Close an open position on the first bar outside the session
    pub flatten_at_end: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            start: "09:30:00".to_string(),
            end: "17:30:00".to_string(),
            flatten_at_end: false,
        }
    }
}

impl SessionSettings {
    /// The parsed window, or `None` when session filtering is off.
    pub fn window(&self) -> TradingResult<Option<SessionWindow>> {
        if !self.enabled {
            return Ok(None);
        }
        SessionWindow::parse(&self.start, &self.end).map(Some)
    }
}

/// Backtest settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct BacktestSettings {
    /// Close a position still open after the last bar
    pub close_at_end: bool,
}

/// One timeframe's bar file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeFile {
    pub timeframe: Timeframe,
    pub file: String,
}

/// Data file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub dir: PathBuf,
    /// Series the strategy trades on
    pub coarse: TimeframeFile,
    /// Finer series aligned onto the coarse one
    pub fine: Vec<TimeframeFile>,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            coarse: TimeframeFile {
                timeframe: Timeframe::Minute5,
                file: "MES_5_mins.csv".to_string(),
            },
            fine: vec![TimeframeFile {
                timeframe: Timeframe::Minute1,
                file: "MES_1_min.csv".to_string(),
            }],
        }
    }
}

impl DataSettings {
    pub fn path_of(&self, file: &TimeframeFile) -> PathBuf {
        self.dir.join(&file.file)
    }
}
