//! Grid search over strategy parameters.
//!
//! A grid is an ordered list of dimensions, each naming one `ParameterSet`
//! field and the candidate values to try. Combinations are enumerated as a
//! Cartesian product with the last dimension varying fastest; combination `i`
//! is decoded from its index, so sequential and parallel sweeps evaluate
//! exactly the same combinations with the same per-combination function.
//!
//! Every combination gets a fresh `ParameterSet` (base + overrides) and a
//! fresh simulation. Results are collected in enumeration order, scored,
//! stably sorted by descending score and truncated to the top N.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use breakout_core::domain::Bar;
use breakout_core::engine::{simulate, EngineError};
use breakout_core::params::{close_time_from_minutes, ParameterSet};

use crate::metrics::PerformanceMetrics;

/// Progress is logged every this many combinations.
const PROGRESS_EVERY: usize = 50;

/// Stand-in for an infinite profit factor when scoring.
pub const PROFIT_FACTOR_SENTINEL: f64 = 1e9;

/// Errors from grid definition and sweep execution.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("unknown grid parameter '{0}'")]
    UnknownParameter(String),

    #[error("grid dimension '{0}' has no values")]
    EmptyDimension(String),

    #[error("grid parameter '{0}' is declared more than once")]
    DuplicateDimension(String),

    #[error("invalid value {value} for '{param}': expected {expected}")]
    InvalidValue {
        param: String,
        value: String,
        expected: &'static str,
    },

    #[error("grid has too many combinations")]
    TooLarge,

    #[error("combination index {index} out of range ({total} combinations)")]
    IndexOutOfRange { index: usize, total: usize },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("combination {index} failed: {source}")]
    Engine {
        index: usize,
        #[source]
        source: EngineError,
    },
}

// ─── Parameter keys and values ──────────────────────────────────────

/// A candidate value as written in the grid definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(i) => Some(*i as f64),
            ParamValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    fn as_u32(&self) -> Option<u32> {
        match self {
            ParamValue::Int(i) => u32::try_from(*i).ok(),
            _ => None,
        }
    }
}

impl std::fmt::Display for ParamValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

/// The `ParameterSet` field a grid dimension overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Autolot,
    BaseBalance,
    BaseLot,
    MinLot,
    MaxLot,
    StopLossPct,
    TakeProfitPct,
    RangeStartOffsetMinutes,
    RangeDurationMinutes,
    RangeCloseTimeMinutes,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    BreakoutMode,
    TrailingStopPoints,
    TrailingStartPoints,
    MaxRangePoints,
    MinRangePoints,
    PointSize,
    ContractMultiplier,
}

impl ParamKey {
    pub const ALL: [ParamKey; 22] = [
        ParamKey::Autolot,
        ParamKey::BaseBalance,
        ParamKey::BaseLot,
        ParamKey::MinLot,
        ParamKey::MaxLot,
        ParamKey::StopLossPct,
        ParamKey::TakeProfitPct,
        ParamKey::RangeStartOffsetMinutes,
        ParamKey::RangeDurationMinutes,
        ParamKey::RangeCloseTimeMinutes,
        ParamKey::Monday,
        ParamKey::Tuesday,
        ParamKey::Wednesday,
        ParamKey::Thursday,
        ParamKey::Friday,
        ParamKey::BreakoutMode,
        ParamKey::TrailingStopPoints,
        ParamKey::TrailingStartPoints,
        ParamKey::MaxRangePoints,
        ParamKey::MinRangePoints,
        ParamKey::PointSize,
        ParamKey::ContractMultiplier,
    ];

    /// Configuration-surface name.
    pub fn name(self) -> &'static str {
        match self {
            ParamKey::Autolot => "autolot",
            ParamKey::BaseBalance => "base_balance",
            ParamKey::BaseLot => "base_lot",
            ParamKey::MinLot => "min_lot",
            ParamKey::MaxLot => "max_lot",
            ParamKey::StopLossPct => "stop_loss_pct",
            ParamKey::TakeProfitPct => "take_profit_pct",
            ParamKey::RangeStartOffsetMinutes => "range_start_offset_minutes",
            ParamKey::RangeDurationMinutes => "range_duration_minutes",
            ParamKey::RangeCloseTimeMinutes => "range_close_time_minutes",
            ParamKey::Monday => "trading_days.monday",
            ParamKey::Tuesday => "trading_days.tuesday",
            ParamKey::Wednesday => "trading_days.wednesday",
            ParamKey::Thursday => "trading_days.thursday",
            ParamKey::Friday => "trading_days.friday",
            ParamKey::BreakoutMode => "breakout_mode",
            ParamKey::TrailingStopPoints => "trailing_stop_points",
            ParamKey::TrailingStartPoints => "trailing_start_points",
            ParamKey::MaxRangePoints => "max_range_points",
            ParamKey::MinRangePoints => "min_range_points",
            ParamKey::PointSize => "point_size",
            ParamKey::ContractMultiplier => "contract_multiplier",
        }
    }

    /// Older spellings accepted in grid definitions.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            ParamKey::Autolot => &[],
            ParamKey::BaseBalance => &[],
            ParamKey::BaseLot => &["lot"],
            ParamKey::MinLot => &[],
            ParamKey::MaxLot => &[],
            ParamKey::StopLossPct => &["stop_loss"],
            ParamKey::TakeProfitPct => &["take_profit"],
            ParamKey::RangeStartOffsetMinutes => &["range_start_time"],
            ParamKey::RangeDurationMinutes => &["range_duration"],
            ParamKey::RangeCloseTimeMinutes => &["range_close_time"],
            ParamKey::Monday => &["range_on_monday", "monday"],
            ParamKey::Tuesday => &["range_on_tuesday", "tuesday"],
            ParamKey::Wednesday => &["range_on_wednesday", "wednesday"],
            ParamKey::Thursday => &["range_on_thursday", "thursday"],
            ParamKey::Friday => &["range_on_friday", "friday"],
            ParamKey::BreakoutMode => &[],
            ParamKey::TrailingStopPoints => &["trailing_stop"],
            ParamKey::TrailingStartPoints => &["trailing_start"],
            ParamKey::MaxRangePoints => &["max_range_size"],
            ParamKey::MinRangePoints => &["min_range_size"],
            ParamKey::PointSize => &["symbol_point"],
            ParamKey::ContractMultiplier => &[],
        }
    }

    pub fn from_name(name: &str) -> Result<Self, GridError> {
        let name = name.trim();
        ParamKey::ALL
            .into_iter()
            .find(|k| k.name() == name || k.aliases().iter().any(|a| *a == name))
            .ok_or_else(|| GridError::UnknownParameter(name.to_string()))
    }

    fn expected(self) -> &'static str {
        match self {
            ParamKey::Autolot
            | ParamKey::Monday
            | ParamKey::Tuesday
            | ParamKey::Wednesday
            | ParamKey::Thursday
            | ParamKey::Friday => "a boolean",
            ParamKey::RangeStartOffsetMinutes | ParamKey::RangeDurationMinutes => {
                "a non-negative integer (minutes)"
            }
            ParamKey::RangeCloseTimeMinutes => "minutes, or \"off\"/\"disabled\"",
            ParamKey::BreakoutMode => "\"one_breakout_per_range\" or \"both_sides\"",
            _ => "a number",
        }
    }

    /// Write `value` into the matching field of `params`.
    pub fn apply(self, params: &mut ParameterSet, value: &ParamValue) -> Result<(), GridError> {
        let invalid = || GridError::InvalidValue {
            param: self.name().to_string(),
            value: value.to_string(),
            expected: self.expected(),
        };
        let number = || value.as_f64().ok_or_else(invalid);
        let flag = || value.as_bool().ok_or_else(invalid);
        let minutes = || value.as_u32().ok_or_else(invalid);

        match self {
            ParamKey::Autolot => params.autolot = flag()?,
            ParamKey::BaseBalance => params.base_balance = number()?,
            ParamKey::BaseLot => params.base_lot = number()?,
            ParamKey::MinLot => params.min_lot = number()?,
            ParamKey::MaxLot => params.max_lot = number()?,
            ParamKey::StopLossPct => params.stop_loss_pct = number()?,
            ParamKey::TakeProfitPct => params.take_profit_pct = number()?,
            ParamKey::RangeStartOffsetMinutes => params.range_start_offset_minutes = minutes()?,
            ParamKey::RangeDurationMinutes => params.range_duration_minutes = minutes()?,
            ParamKey::RangeCloseTimeMinutes => {
                params.range_close_time_minutes = match value {
                    ParamValue::Int(m) => close_time_from_minutes(*m).map_err(|_| invalid())?,
                    ParamValue::Text(t) if matches!(t.as_str(), "off" | "disabled") => None,
                    _ => return Err(invalid()),
                }
            }
            ParamKey::Monday => params.trading_days.monday = flag()?,
            ParamKey::Tuesday => params.trading_days.tuesday = flag()?,
            ParamKey::Wednesday => params.trading_days.wednesday = flag()?,
            ParamKey::Thursday => params.trading_days.thursday = flag()?,
            ParamKey::Friday => params.trading_days.friday = flag()?,
            ParamKey::BreakoutMode => {
                params.breakout_mode = match value {
                    ParamValue::Text(t) => t.parse().map_err(|_| invalid())?,
                    _ => return Err(invalid()),
                }
            }
            ParamKey::TrailingStopPoints => params.trailing_stop_points = number()?,
            ParamKey::TrailingStartPoints => params.trailing_start_points = number()?,
            ParamKey::MaxRangePoints => params.max_range_points = number()?,
            ParamKey::MinRangePoints => params.min_range_points = number()?,
            ParamKey::PointSize => params.point_size = number()?,
            ParamKey::ContractMultiplier => params.contract_multiplier = number()?,
        }
        Ok(())
    }
}

// ─── Grid ───────────────────────────────────────────────────────────

/// One dimension as written in configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDimension {
    pub param: String,
    pub values: Vec<ParamValue>,
}

impl GridDimension {
    pub fn new(param: &str, values: Vec<ParamValue>) -> Self {
        Self {
            param: param.to_string(),
            values,
        }
    }
}

#[derive(Debug, Clone)]
struct Axis {
    key: ParamKey,
    label: String,
    values: Vec<ParamValue>,
}

/// A validated parameter grid.
#[derive(Debug, Clone)]
pub struct ParamGrid {
    axes: Vec<Axis>,
    combinations: usize,
}

impl ParamGrid {
    /// Resolve names and type-check every value. Declared order is kept.
    pub fn new(dimensions: Vec<GridDimension>) -> Result<Self, GridError> {
        let mut axes: Vec<Axis> = Vec::with_capacity(dimensions.len());
        let mut combinations: usize = 1;

        for dim in dimensions {
            let key = ParamKey::from_name(&dim.param)?;
            if dim.values.is_empty() {
                return Err(GridError::EmptyDimension(dim.param));
            }
            if axes.iter().any(|a| a.key == key) {
                return Err(GridError::DuplicateDimension(dim.param));
            }
            let mut scratch = ParameterSet::default();
            for value in &dim.values {
                key.apply(&mut scratch, value)?;
            }
            combinations = combinations
                .checked_mul(dim.values.len())
                .ok_or(GridError::TooLarge)?;
            axes.push(Axis {
                key,
                label: dim.param.trim().to_string(),
                values: dim.values,
            });
        }

        Ok(Self { axes, combinations })
    }

    /// Number of dimensions.
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Size of the Cartesian product (1 for an empty grid).
    pub fn combinations(&self) -> usize {
        self.combinations
    }

    /// Dimension names in declared order.
    pub fn labels(&self) -> Vec<String> {
        self.axes.iter().map(|a| a.label.clone()).collect()
    }

    /// Values of combination `index`, last dimension varying fastest.
    pub fn combination(&self, index: usize) -> Result<Vec<ParamValue>, GridError> {
        if index >= self.combinations {
            return Err(GridError::IndexOutOfRange {
                index,
                total: self.combinations,
            });
        }
        let mut picks = vec![0usize; self.axes.len()];
        let mut rest = index;
        for (slot, axis) in picks.iter_mut().zip(&self.axes).rev() {
            *slot = rest % axis.values.len();
            rest /= axis.values.len();
        }
        Ok(picks
            .into_iter()
            .zip(&self.axes)
            .map(|(i, axis)| axis.values[i].clone())
            .collect())
    }

    /// `base` with combination `index` applied, plus the applied values.
    pub fn params_for(
        &self,
        base: &ParameterSet,
        index: usize,
    ) -> Result<(ParameterSet, Vec<ParamValue>), GridError> {
        let values = self.combination(index)?;
        let mut params = base.clone();
        for (axis, value) in self.axes.iter().zip(&values) {
            axis.key.apply(&mut params, value)?;
        }
        Ok((params, values))
    }
}

// ─── Execution ──────────────────────────────────────────────────────

/// How combinations are spread over threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepExecution {
    Sequential,
    /// rayon worker pool; `threads == 0` uses the global pool.
    Parallel { threads: usize },
}

impl Default for SweepExecution {
    fn default() -> Self {
        SweepExecution::Parallel { threads: 0 }
    }
}

/// One scored combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedResult {
    /// 1-based position in the ranked table.
    pub rank: usize,
    /// Position in enumeration order.
    pub combination_index: usize,
    pub params: ParameterSet,
    /// Grid values of this combination, in dimension order.
    pub values: Vec<ParamValue>,
    pub metrics: PerformanceMetrics,
    pub score: f64,
}

/// Output of a grid search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// Dimension names, in declared order.
    pub columns: Vec<String>,
    /// Top results, best first.
    pub ranked: Vec<RankedResult>,
    pub total: usize,
    /// Combinations that passed validation and were simulated.
    pub evaluated: usize,
    /// Combinations rejected by parameter validation.
    pub skipped: usize,
}

/// Composite ranking score.
///
/// `0.3*net_profit + 0.3*profit_factor + 0.2*win_rate + 0.2*sharpe_ratio`,
/// with an infinite profit factor replaced by [`PROFIT_FACTOR_SENTINEL`].
pub fn composite_score(metrics: &PerformanceMetrics) -> f64 {
    let profit_factor = if metrics.profit_factor.is_infinite() {
        PROFIT_FACTOR_SENTINEL
    } else {
        metrics.profit_factor
    };
    0.3 * metrics.net_profit + 0.3 * profit_factor + 0.2 * metrics.win_rate + 0.2 * metrics.sharpe_ratio
}

enum Outcome {
    Evaluated(RankedResult),
    Skipped,
}

/// Grid search over one bar series.
pub struct GridSearch<'a> {
    bars: &'a [Bar],
    base: ParameterSet,
    grid: ParamGrid,
    initial_balance: f64,
    top_n: usize,
    execution: SweepExecution,
}

impl<'a> GridSearch<'a> {
    pub fn new(bars: &'a [Bar], base: ParameterSet, grid: ParamGrid) -> Self {
        Self {
            bars,
            base,
            grid,
            initial_balance: 5000.0,
            top_n: 10,
            execution: SweepExecution::default(),
        }
    }

    pub fn with_initial_balance(mut self, initial_balance: f64) -> Self {
        self.initial_balance = initial_balance;
        self
    }

    /// Keep the best `top_n` results; 0 keeps all.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_execution(mut self, execution: SweepExecution) -> Self {
        self.execution = execution;
        self
    }

    pub fn grid(&self) -> &ParamGrid {
        &self.grid
    }

    pub fn run(&self) -> Result<SweepReport, GridError> {
        self.run_with_progress(|_, _| {})
    }

    /// Run the sweep. `progress(done, total)` is called after every combination.
    pub fn run_with_progress<F>(&self, progress: F) -> Result<SweepReport, GridError>
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        let total = self.grid.combinations();
        info!(
            combinations = total,
            dimensions = self.grid.len(),
            execution = ?self.execution,
            "starting grid search"
        );

        let done = AtomicUsize::new(0);
        let eval = |index: usize| -> Result<Outcome, GridError> {
            let outcome = self.evaluate(index);
            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            if n % PROGRESS_EVERY == 0 || n == total {
                info!(done = n, total, "grid search progress");
            }
            progress(n, total);
            outcome
        };

        let outcomes: Vec<Outcome> = match self.execution {
            SweepExecution::Sequential => (0..total).map(&eval).collect::<Result<_, _>>()?,
            SweepExecution::Parallel { threads: 0 } => {
                (0..total).into_par_iter().map(&eval).collect::<Result<_, _>>()?
            }
            SweepExecution::Parallel { threads } => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| GridError::ThreadPool(e.to_string()))?;
                pool.install(|| {
                    (0..total)
                        .into_par_iter()
                        .map(&eval)
                        .collect::<Result<Vec<_>, _>>()
                })?
            }
        };

        let mut ranked = Vec::with_capacity(outcomes.len());
        let mut skipped = 0;
        for outcome in outcomes {
            match outcome {
                Outcome::Evaluated(result) => ranked.push(result),
                Outcome::Skipped => skipped += 1,
            }
        }
        let evaluated = ranked.len();

        // Stable: equal scores keep enumeration order.
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        if self.top_n > 0 {
            ranked.truncate(self.top_n);
        }
        for (i, result) in ranked.iter_mut().enumerate() {
            result.rank = i + 1;
        }

        info!(
            total,
            evaluated,
            skipped,
            best_score = ?ranked.first().map(|r| r.score),
            "grid search complete"
        );

        Ok(SweepReport {
            columns: self.grid.labels(),
            ranked,
            total,
            evaluated,
            skipped,
        })
    }

    fn evaluate(&self, index: usize) -> Result<Outcome, GridError> {
        let (params, values) = self.grid.params_for(&self.base, index)?;
        if let Err(e) = params.validate() {
            warn!(index, error = %e, "skipping invalid combination");
            return Ok(Outcome::Skipped);
        }

        let run = simulate(self.bars, &params, self.initial_balance)
            .map_err(|source| GridError::Engine { index, source })?;
        let metrics = PerformanceMetrics::compute(&run.state, self.initial_balance);
        let score = composite_score(&metrics);

        Ok(Outcome::Evaluated(RankedResult {
            rank: 0,
            combination_index: index,
            params,
            values,
            metrics,
            score,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breakout_core::params::BreakoutMode;

    fn dims() -> Vec<GridDimension> {
        vec![
            GridDimension::new("stop_loss", vec![50i64.into(), 90i64.into()]),
            GridDimension::new("breakout_mode", vec!["both_sides".into()]),
            GridDimension::new("range_close_time", vec![1200i64.into(), (-1i64).into(), "off".into()]),
        ]
    }

    #[test]
    fn aliases_resolve_to_fields() {
        assert_eq!(ParamKey::from_name("stop_loss").unwrap(), ParamKey::StopLossPct);
        assert_eq!(ParamKey::from_name("range_on_monday").unwrap(), ParamKey::Monday);
        assert_eq!(
            ParamKey::from_name("trading_days.friday").unwrap(),
            ParamKey::Friday
        );
        assert!(matches!(
            ParamKey::from_name("lookback"),
            Err(GridError::UnknownParameter(_))
        ));
    }

    #[test]
    fn combination_count_is_product() {
        let grid = ParamGrid::new(dims()).unwrap();
        assert_eq!(grid.combinations(), 6);
        assert_eq!(grid.labels(), vec!["stop_loss", "breakout_mode", "range_close_time"]);
    }

    #[test]
    fn last_dimension_varies_fastest() {
        let grid = ParamGrid::new(dims()).unwrap();
        let first = grid.combination(0).unwrap();
        let second = grid.combination(1).unwrap();
        let fourth = grid.combination(3).unwrap();
        assert_eq!(first[0], ParamValue::Int(50));
        assert_eq!(second[0], ParamValue::Int(50));
        assert_eq!(second[2], ParamValue::Int(-1));
        assert_eq!(fourth[0], ParamValue::Int(90));
        assert_eq!(fourth[2], ParamValue::Int(1200));
        assert!(grid.combination(6).is_err());
    }

    #[test]
    fn params_for_applies_overrides() {
        let grid = ParamGrid::new(dims()).unwrap();
        let (params, _) = grid.params_for(&ParameterSet::default(), 5).unwrap();
        assert_eq!(params.stop_loss_pct, 90.0);
        assert_eq!(params.breakout_mode, BreakoutMode::BothSides);
        assert_eq!(params.range_close_time_minutes, None);
        let (params, _) = grid.params_for(&ParameterSet::default(), 0).unwrap();
        assert_eq!(params.range_close_time_minutes, Some(1200));
    }

    #[test]
    fn empty_grid_has_one_combination() {
        let grid = ParamGrid::new(vec![]).unwrap();
        assert_eq!(grid.combinations(), 1);
        assert!(grid.combination(0).unwrap().is_empty());
    }

    #[test]
    fn rejects_empty_and_duplicate_dimensions() {
        assert!(matches!(
            ParamGrid::new(vec![GridDimension::new("stop_loss_pct", vec![])]),
            Err(GridError::EmptyDimension(_))
        ));
        assert!(matches!(
            ParamGrid::new(vec![
                GridDimension::new("stop_loss_pct", vec![50i64.into()]),
                GridDimension::new("stop_loss", vec![90i64.into()]),
            ]),
            Err(GridError::DuplicateDimension(_))
        ));
    }

    #[test]
    fn rejects_mistyped_values() {
        assert!(matches!(
            ParamGrid::new(vec![GridDimension::new("autolot", vec![1i64.into()])]),
            Err(GridError::InvalidValue { .. })
        ));
        assert!(matches!(
            ParamGrid::new(vec![GridDimension::new("range_duration", vec![12.5f64.into()])]),
            Err(GridError::InvalidValue { .. })
        ));
        assert!(matches!(
            ParamGrid::new(vec![GridDimension::new("breakout_mode", vec!["sideways".into()])]),
            Err(GridError::InvalidValue { .. })
        ));
    }

    #[test]
    fn infinite_profit_factor_uses_sentinel() {
        let metrics = PerformanceMetrics {
            net_profit: 100.0,
            profit_factor: f64::INFINITY,
            win_rate: 1.0,
            ..PerformanceMetrics::default()
        };
        let score = composite_score(&metrics);
        assert_eq!(score, 0.3 * 100.0 + 0.3 * PROFIT_FACTOR_SENTINEL + 0.2 * 1.0);
    }
}
