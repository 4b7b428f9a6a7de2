use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::order::Side;

/// The single open position of a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub lot: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl Position {
    /// Realized profit if closed at `exit_price`.
    pub fn profit_at(&self, exit_price: f64, contract_multiplier: f64) -> f64 {
        match self.side {
            Side::Buy => (exit_price - self.entry_price) * self.lot * contract_multiplier,
            Side::Sell => (self.entry_price - exit_price) * self.lot * contract_multiplier,
        }
    }

    /// Unrealized distance from entry to `price` in points (positive = in profit).
    pub fn profit_points(&self, price: f64, point_size: f64) -> f64 {
        match self.side {
            Side::Buy => (price - self.entry_price) / point_size,
            Side::Sell => (self.entry_price - price) / point_size,
        }
    }
}

/// Why a position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    /// Forced close at the configured range close time.
    RangeClose,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExitReason::StopLoss => f.write_str("stop_loss"),
            ExitReason::TakeProfit => f.write_str("take_profit"),
            ExitReason::RangeClose => f.write_str("range_close"),
        }
    }
}
