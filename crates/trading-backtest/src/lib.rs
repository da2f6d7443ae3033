//! Bar-replay backtesting: position simulator, session window, replay
//! driver, performance statistics and report.

mod engine;
mod report;
mod session;
mod simulator;
mod statistics;

pub use engine::{prepare_rows, BacktestConfig, BacktestEngine, MarketData};
pub use report::BacktestReport;
pub use session::SessionWindow;
pub use simulator::{
    BarOutcome, ExecutionConfig, ExecutionSimulator, ExitTrigger, PositionState, SignalOutcome,
};
pub use statistics::PerformanceStats;
