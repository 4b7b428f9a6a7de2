//! Backtest runner: wires together parameters, engine, and metrics.
//!
//! Two entry points:
//! - `run_backtest()`: takes pre-loaded bars. Used by tests, benches and the optimizer path.
//! - `run_from_config()`: loads bars as the config describes, then runs. Used by the CLI.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use breakout_core::domain::{Bar, Position, TradeRecord};
use breakout_core::engine::{simulate, DayStats, EngineError, RangeExtremes, SimulationState};
use breakout_core::params::{ParamError, ParameterSet};

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_bars_csv, LoadError};
use crate::metrics::PerformanceMetrics;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("invalid parameters: {0}")]
    Params(#[from] ParamError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("no data file configured (set [backtest].data or pass --data)")]
    NoDataSource,
    #[error("initial balance must be positive (got {0})")]
    InitialBalance(f64),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub params: ParameterSet,
    pub fingerprint: String,
    pub initial_balance: f64,
    pub metrics: PerformanceMetrics,
    pub trades: Vec<TradeRecord>,
    /// Initial balance followed by the balance after each close.
    pub balance_history: Vec<f64>,
    pub final_state: SimulationState,
    /// Position still open when the data ran out.
    pub open_position: Option<Position>,
    pub day_stats: DayStats,
    pub range_extremes: RangeExtremes,
    pub bar_count: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run one backtest over pre-loaded bars.
pub fn run_backtest(
    bars: &[Bar],
    params: &ParameterSet,
    initial_balance: f64,
) -> Result<BacktestResult, RunError> {
    params.validate()?;
    if !(initial_balance > 0.0) {
        return Err(RunError::InitialBalance(initial_balance));
    }

    let run = simulate(bars, params, initial_balance)?;
    let metrics = PerformanceMetrics::compute(&run.state, initial_balance);

    info!(
        bars = bars.len(),
        trades = metrics.total_trades,
        net_profit = metrics.net_profit,
        final_balance = run.state.balance,
        "backtest complete"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        params: params.clone(),
        fingerprint: params.fingerprint()?,
        initial_balance,
        metrics,
        trades: run.state.ledger.clone(),
        balance_history: run.state.balance_history.clone(),
        final_state: run.state,
        open_position: run.open_position,
        day_stats: run.day_stats,
        range_extremes: run.range_extremes,
        bar_count: bars.len(),
        first_date: bars.first().map(Bar::date),
        last_date: bars.last().map(Bar::date),
    })
}

/// Load the configured data file and run the configured parameters.
pub fn run_from_config(config: &BacktestConfig) -> Result<BacktestResult, RunError> {
    let path = config
        .backtest
        .data
        .as_deref()
        .ok_or(RunError::NoDataSource)?;
    let bars = load_bars_csv(path, &config.load_options())?;
    run_backtest(&bars, &config.params, config.backtest.initial_balance)
}
