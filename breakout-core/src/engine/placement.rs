//! Order placement: lot sizing, protective levels and the stop-order pair.

use serde::{Deserialize, Serialize};

use super::range::OpeningRange;
use crate::domain::{PendingOrder, PendingOrders, Side};
use crate::params::ParameterSet;

/// Why no orders were placed for a range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithheldReason {
    RangeTooLarge { points: f64, max: f64 },
    RangeTooSmall { points: f64, min: f64 },
}

impl std::fmt::Display for WithheldReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithheldReason::RangeTooLarge { points, max } => {
                write!(f, "range {points:.0} points exceeds max {max:.0}")
            }
            WithheldReason::RangeTooSmall { points, min } => {
                write!(f, "range {points:.0} points below min {min:.0}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    Placed(PendingOrders),
    Withheld(WithheldReason),
}

/// Lot for the next placement.
///
/// Autolot scales `base_lot` by `balance / base_balance`, rounds to two
/// decimals (exact ties to even) and clamps into `[min_lot, max_lot]`.
pub fn calculate_lot_size(balance: f64, params: &ParameterSet) -> f64 {
    if !params.autolot {
        return params.base_lot;
    }
    let raw = balance / params.base_balance * params.base_lot;
    let rounded = round_half_even(raw * 100.0) / 100.0;
    rounded.clamp(params.min_lot, params.max_lot)
}

fn round_half_even(x: f64) -> f64 {
    let r = x.round();
    if (r - x).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        r
    }
}

/// Size filter. Zero bounds are unbounded.
pub fn check_range_size(range: &OpeningRange, params: &ParameterSet) -> Option<WithheldReason> {
    if params.max_range_points > 0.0 && range.points > params.max_range_points {
        return Some(WithheldReason::RangeTooLarge {
            points: range.points,
            max: params.max_range_points,
        });
    }
    if params.min_range_points > 0.0 && range.points < params.min_range_points {
        return Some(WithheldReason::RangeTooSmall {
            points: range.points,
            min: params.min_range_points,
        });
    }
    None
}

/// Buy stop at the range high, sell stop at the range low, each with its own
/// stop-loss/take-profit levels.
pub fn place_orders(range: &OpeningRange, balance: f64, params: &ParameterSet) -> Placement {
    if let Some(reason) = check_range_size(range, params) {
        return Placement::Withheld(reason);
    }

    let sl_dist = (params.stop_loss_pct > 0.0).then(|| range.size * params.stop_loss_pct / 100.0);
    let tp_dist =
        (params.take_profit_pct > 0.0).then(|| range.size * params.take_profit_pct / 100.0);

    let buy = PendingOrder {
        side: Side::Buy,
        trigger_price: range.high,
        stop_loss: sl_dist.map(|d| range.high - d),
        take_profit: tp_dist.map(|d| range.high + d),
    };
    let sell = PendingOrder {
        side: Side::Sell,
        trigger_price: range.low,
        stop_loss: sl_dist.map(|d| range.low + d),
        take_profit: tp_dist.map(|d| range.low - d),
    };

    Placement::Placed(PendingOrders {
        buy: Some(buy),
        sell: Some(sell),
        lot: calculate_lot_size(balance, params),
        mode: params.breakout_mode,
    })
}
