//! Per-bar position rules: stop-loss / take-profit exits and the trailing stop.

use crate::domain::{Bar, ExitReason, Position, Side};
use crate::params::ParameterSet;

/// Price compared against stop-loss and take-profit levels.
///
/// Both sides probe the bar low.
pub fn exit_probe(bar: &Bar) -> f64 {
    bar.low
}

/// Stop-loss or take-profit hit on `bar`, with the exit price.
///
/// The stop-loss is checked first; a bar that breaches both closes as a stop.
pub fn check_exit(position: &Position, bar: &Bar) -> Option<(ExitReason, f64)> {
    let price = exit_probe(bar);

    let stop_hit = position.stop_loss.is_some_and(|sl| match position.side {
        Side::Buy => price <= sl,
        Side::Sell => price >= sl,
    });
    if stop_hit {
        return Some((ExitReason::StopLoss, price));
    }

    let target_hit = position.take_profit.is_some_and(|tp| match position.side {
        Side::Buy => price >= tp,
        Side::Sell => price <= tp,
    });
    target_hit.then_some((ExitReason::TakeProfit, price))
}

/// New stop level for `position` given the bar close, if the trailing rule
/// moves it.
///
/// Candidate is `close ∓ trailing_stop_points * point_size`; it is adopted
/// only when it tightens the current stop (or none is set). Stops never loosen.
pub fn trail_stop(position: &Position, close: f64, params: &ParameterSet) -> Option<f64> {
    if !params.trailing_enabled() {
        return None;
    }
    if position.profit_points(close, params.point_size) < params.trailing_start_points {
        return None;
    }

    let distance = params.trailing_stop_points * params.point_size;
    match position.side {
        Side::Buy => {
            let candidate = close - distance;
            position
                .stop_loss
                .map_or(true, |sl| candidate > sl)
                .then_some(candidate)
        }
        Side::Sell => {
            let candidate = close + distance;
            position
                .stop_loss
                .map_or(true, |sl| candidate < sl)
                .then_some(candidate)
        }
    }
}
