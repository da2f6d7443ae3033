//! Core traits for the replay engine.

mod data_source;
mod indicator;
mod strategy;

pub use data_source::DataSource;
pub use indicator::Indicator;
pub use strategy::{Strategy, StrategyConfig, StrategyState};
