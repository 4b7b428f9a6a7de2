//! Breakout Runner: backtest orchestration, grid search and reporting.
//!
//! This crate builds on `breakout-core` to provide:
//! - CSV bar loading with date filtering and de-duplication
//! - Deterministic synthetic bars for demos and tests
//! - TOML configuration for single runs and grid searches
//! - Single-backtest runner with performance metrics
//! - Parallel grid search with composite-score ranking
//! - JSON / CSV export and the text summary

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;
pub mod synthetic;

pub use config::{BacktestConfig, BacktestSection, ConfigError, OptimizeSection};
pub use data_loader::{load_bars_csv, parse_datetime, prepare_bars, LoadError, LoadOptions};
pub use export::{
    export_equity_csv, export_json, export_ranked_csv, export_trades_csv, import_json,
    load_manifest, render_summary, save_artifacts, Summary, RANKED_METRIC_COLUMNS,
};
pub use metrics::PerformanceMetrics;
pub use runner::{run_backtest, run_from_config, BacktestResult, RunError, SCHEMA_VERSION};
pub use sweep::{
    composite_score, GridDimension, GridError, GridSearch, ParamGrid, ParamKey, ParamValue,
    RankedResult, SweepExecution, SweepReport, PROFIT_FACTOR_SENTINEL,
};
pub use synthetic::synthetic_bars;

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn performance_metrics_is_send_sync() {
        assert_send::<PerformanceMetrics>();
        assert_sync::<PerformanceMetrics>();
    }

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn sweep_types_are_send_sync() {
        assert_send::<ParamGrid>();
        assert_sync::<ParamGrid>();
        assert_send::<RankedResult>();
        assert_sync::<RankedResult>();
        assert_send::<SweepReport>();
        assert_sync::<SweepReport>();
        assert_send::<GridSearch<'static>>();
        assert_sync::<GridSearch<'static>>();
    }

    #[test]
    fn config_is_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
    }
}
