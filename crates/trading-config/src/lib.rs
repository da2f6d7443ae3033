//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, BacktestSettings, DataSettings, LoggingConfig, SessionSettings,
    TimeframeFile,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Environment variable prefix, e.g. `REPLAY__EXECUTION__STOP_OFFSET=3`.
pub const ENV_PREFIX: &str = "REPLAY";

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    build(path, true)
}

/// Like [`load_config`], falling back to built-in defaults when the file
/// does not exist.
pub fn load_config_or_default(path: &Path) -> Result<AppConfig, ConfigError> {
    build(path, false)
}

fn build(path: &Path, required: bool) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}

/// Render a configuration as TOML.
pub fn to_toml(config: &AppConfig) -> Result<String, toml::ser::Error> {
    toml::to_string_pretty(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard};
    use trading_core::types::Timeframe;

    /// Serializes tests that read the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());

        assert_eq!(config.indicators.short_ema_period, 5);
        assert_eq!(config.indicators.medium_ema_period, 15);
        assert_eq!(config.strategy.long_rsi_min, 45.0);
        assert_eq!(config.execution.stop_offset, 2.0);
        assert_eq!(config.execution.target_offset, 5.0);
        assert_eq!(config.execution.default_quantity, 1);
        assert!(!config.execution.enable_trailing_stop);
        assert!(config.session.enabled);
    }

    #[test]
    fn test_load_partial_file() {
        let _env = env_lock();
        let file = write_config(
            r#"
[execution]
stop_offset = 3.0
enable_trailing_stop = true
trailing_stop_offset = 1.5

[session]
enabled = false

[data]
dir = "bars"
coarse = { timeframe = "15m", file = "es_15.csv" }
fine = [{ timeframe = "5m", file = "es_5.csv" }, { timeframe = "1m", file = "es_1.csv" }]
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.execution.stop_offset, 3.0);
        assert!(config.execution.enable_trailing_stop);
        // Unset keys keep their defaults
        assert_eq!(config.execution.target_offset, 5.0);
        assert_eq!(config.indicators.rsi_period, 14);
        assert_eq!(config.data.coarse.timeframe, Timeframe::Minute15);
        assert_eq!(config.data.fine.len(), 2);
        assert!(config.validate().is_ok());

        let backtest = config.backtest_config().unwrap();
        assert!(backtest.session.is_none());
        assert_eq!(backtest.execution.trailing_stop_offset, 1.5);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let _env = env_lock();
        let config = load_config_or_default(Path::new("/nonexistent/replay.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(load_config(Path::new("/nonexistent/replay.toml")).is_err());
    }

    #[test]
    fn test_validation_failures() {
        let mut config = AppConfig::default();
        config.execution.default_quantity = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.indicators.macd_fast = 30;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.strategy.short_rsi_max = 150.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.session.start = "25:00".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.data.fine[0].timeframe = Timeframe::Hour1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_shipped_default_file_matches_defaults() {
        let _env = env_lock();
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/default.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_toml_round_trip_of_defaults() {
        let _env = env_lock();
        let text = to_toml(&AppConfig::default()).unwrap();
        let file = write_config(&text);
        assert_eq!(load_config(file.path()).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_environment_overrides_file() {
        let _env = env_lock();
        let file = write_config("[execution]\nstop_offset = 2.0\n");

        std::env::set_var("REPLAY__EXECUTION__STOP_OFFSET", "3");
        std::env::set_var("REPLAY__SESSION__ENABLED", "false");
        let loaded = load_config(file.path());
        std::env::remove_var("REPLAY__EXECUTION__STOP_OFFSET");
        std::env::remove_var("REPLAY__SESSION__ENABLED");

        let config = loaded.unwrap();
        assert_eq!(config.execution.stop_offset, 3.0);
        assert!(!config.session.enabled);
        // Keys not named in the environment keep their file or default values
        assert_eq!(config.execution.target_offset, 5.0);

        // Removing the variables restores the file value
        assert_eq!(load_config(file.path()).unwrap().execution.stop_offset, 2.0);
    }
}
