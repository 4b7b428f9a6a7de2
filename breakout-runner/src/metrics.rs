//! Performance metrics: pure functions that compute strategy statistics.
//!
//! Every metric is a pure function of the trade ledger (and the initial
//! balance where a ratio needs one). No dependencies on the data pipeline
//! or the optimizer.

use breakout_core::domain::TradeRecord;
use breakout_core::engine::SimulationState;
use serde::{Deserialize, Deserializer, Serialize};

/// Aggregate performance metrics for a single run.
///
/// All fields are zero when the run closed no trades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub net_profit: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    /// `+inf` when there are winners but no losers.
    #[serde(deserialize_with = "profit_factor_or_inf")]
    pub profit_factor: f64,
    pub win_rate: f64,
    pub sharpe_ratio: f64,
    /// Net profit as a percentage of the initial balance.
    pub return_on_account: f64,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub max_drawdown: f64,
    pub max_equity: f64,
    pub min_equity: f64,
}

impl PerformanceMetrics {
    /// Compute all metrics from the final state of a run.
    pub fn compute(state: &SimulationState, initial_balance: f64) -> Self {
        let trades = &state.ledger;
        if trades.is_empty() {
            return Self::default();
        }
        let net_profit = state.balance - initial_balance;
        Self {
            net_profit,
            gross_profit: gross_profit(trades),
            gross_loss: gross_loss(trades),
            profit_factor: profit_factor(trades),
            win_rate: win_rate(trades),
            sharpe_ratio: sharpe_ratio(trades, initial_balance),
            return_on_account: return_on_account(net_profit, initial_balance),
            total_trades: trades.len(),
            winning_trades: state.winning_trades,
            losing_trades: state.losing_trades,
            max_drawdown: state.max_drawdown,
            max_equity: state.max_equity,
            min_equity: state.min_equity,
        }
    }
}

/// JSON has no infinity; serde_json writes a non-finite float as null.
fn profit_factor_or_inf<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
}

// ─── Individual metric functions ────────────────────────────────────

/// Sum of positive trade profits.
pub fn gross_profit(trades: &[TradeRecord]) -> f64 {
    trades.iter().map(|t| t.profit).filter(|&p| p > 0.0).sum()
}

/// Sum of absolute negative trade profits.
pub fn gross_loss(trades: &[TradeRecord]) -> f64 {
    trades
        .iter()
        .map(|t| t.profit)
        .filter(|&p| p < 0.0)
        .map(f64::abs)
        .sum()
}

/// Gross profit / gross loss.
///
/// Returns `f64::INFINITY` when there are no losses but some profit, and 0.0
/// when there is no profit at all.
pub fn profit_factor(trades: &[TradeRecord]) -> f64 {
    let gp = gross_profit(trades);
    let gl = gross_loss(trades);
    if gl > 0.0 {
        gp / gl
    } else if gp > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

/// Fraction of trades with strictly positive profit.
pub fn win_rate(trades: &[TradeRecord]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64
}

/// Per-trade Sharpe ratio with zero risk-free rate.
///
/// Returns are `profit / initial_balance`; dispersion is the population
/// standard deviation. Zero for fewer than two trades or zero dispersion.
pub fn sharpe_ratio(trades: &[TradeRecord], initial_balance: f64) -> f64 {
    if trades.len() < 2 || initial_balance == 0.0 {
        return 0.0;
    }
    let returns: Vec<f64> = trades.iter().map(|t| t.profit / initial_balance).collect();
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    if std > 0.0 {
        mean / std
    } else {
        0.0
    }
}

pub fn return_on_account(net_profit: f64, initial_balance: f64) -> f64 {
    if initial_balance == 0.0 {
        return 0.0;
    }
    net_profit / initial_balance * 100.0
}
