//! Simulator: drives one full run over a bar series.
//!
//! Days are processed strictly in order. For each day:
//!
//! 1. Trading-day gate (weekday flags; weekends never trade)
//! 2. Opening range from the configured window (empty window → day skipped)
//! 3. Order placement, or withholding when the range size is out of bounds
//! 4. Post-range bars: entry trigger → SL/TP → trailing stop → forced close
//!
//! An open position survives the day boundary and is managed on the next day
//! that places orders. Whatever is still open at the end is reported, not closed.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::equity::SimulationState;
use super::execution::{check_exit, trail_stop};
use super::phase::{DayPhase, PhaseError, PhaseEvent};
use super::placement::{place_orders, Placement};
use super::range::{compute_range, RangeExtremes, RangeWindow};
use super::segment::{segment_days, DaySlice};
use crate::domain::{Bar, ExitReason, Position, TradeRecord};
use crate::params::{ParamError, ParameterSet};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid parameters: {0}")]
    Params(#[from] ParamError),

    #[error("state machine violation on {date}: {source}")]
    Phase {
        date: NaiveDate,
        #[source]
        source: PhaseError,
    },
}

/// How the days of a run were handled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayStats {
    pub days_seen: usize,
    pub skipped_weekday: usize,
    /// Days without any bar inside the range window.
    pub no_range: usize,
    pub no_range_dates: Vec<NaiveDate>,
    pub orders_withheld: usize,
    pub orders_placed: usize,
    /// Days on which at least one entry filled.
    pub days_with_entries: usize,
}

/// Everything a run produces before metrics are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub state: SimulationState,
    pub open_position: Option<Position>,
    pub day_stats: DayStats,
    pub range_extremes: RangeExtremes,
}

pub struct Simulator<'p> {
    params: &'p ParameterSet,
    state: SimulationState,
    carried: Option<Position>,
    day_stats: DayStats,
    range_extremes: RangeExtremes,
}

impl<'p> Simulator<'p> {
    pub fn new(params: &'p ParameterSet, initial_balance: f64) -> Self {
        Self {
            params,
            state: SimulationState::new(initial_balance),
            carried: None,
            day_stats: DayStats::default(),
            range_extremes: RangeExtremes::default(),
        }
    }

    /// Run over `bars` (ascending, deduplicated) and return the final state.
    pub fn run(mut self, bars: &[Bar]) -> Result<RunResult, EngineError> {
        self.params.validate()?;
        for day in segment_days(bars) {
            self.run_day(day).map_err(|source| EngineError::Phase {
                date: day.date,
                source,
            })?;
        }
        Ok(RunResult {
            state: self.state,
            open_position: self.carried,
            day_stats: self.day_stats,
            range_extremes: self.range_extremes,
        })
    }

    fn run_day(&mut self, day: DaySlice<'_>) -> Result<(), PhaseError> {
        let params = self.params;
        self.day_stats.days_seen += 1;

        if !params.trading_days.is_enabled(day.date.weekday()) {
            self.day_stats.skipped_weekday += 1;
            debug!(date = %day.date, weekday = ?day.date.weekday(), "trading disabled for weekday");
            return Ok(());
        }

        let window = RangeWindow::for_date(day.date, params);
        let Some(range) = compute_range(day.bars, &window, params.point_size) else {
            self.day_stats.no_range += 1;
            self.day_stats.no_range_dates.push(day.date);
            debug!(date = %day.date, "no bars in range window");
            return Ok(());
        };

        let (new_max, new_min) = self.range_extremes.observe(range.points, day.date);
        if new_max {
            debug!(date = %day.date, points = range.points, "new maximum range");
        }
        if new_min {
            debug!(date = %day.date, points = range.points, "new minimum range");
        }
        debug!(
            date = %day.date,
            high = range.high,
            low = range.low,
            points = range.points,
            "range computed"
        );

        let mut phase = DayPhase::Idle.apply(PhaseEvent::RangeComputed(range))?;

        match place_orders(&range, self.state.balance, params) {
            Placement::Withheld(reason) => {
                phase.apply(PhaseEvent::OrdersWithheld)?;
                self.day_stats.orders_withheld += 1;
                debug!(date = %day.date, %reason, "orders withheld");
                return Ok(());
            }
            Placement::Placed(orders) => {
                debug!(
                    date = %day.date,
                    buy_stop = range.high,
                    sell_stop = range.low,
                    lot = orders.lot,
                    "orders placed"
                );
                phase = phase.apply(PhaseEvent::OrdersPlaced {
                    orders,
                    carried: self.carried.take(),
                })?;
                self.day_stats.orders_placed += 1;
            }
        }

        let mut entered = false;
        for bar in day.bars.iter().filter(|b| window.is_post_range(b.timestamp)) {
            // Entry
            if let DayPhase::OrdersPending { orders } = &phase {
                if let Some(order) = orders.triggered_by(bar).copied() {
                    let position = Position {
                        side: order.side,
                        entry_time: bar.timestamp,
                        entry_price: order.side.trigger_probe(bar),
                        lot: orders.lot,
                        stop_loss: order.stop_loss,
                        take_profit: order.take_profit,
                    };
                    debug!(
                        time = %bar.timestamp,
                        side = %position.side,
                        price = position.entry_price,
                        lot = position.lot,
                        "order triggered"
                    );
                    phase = phase.apply(PhaseEvent::Filled(position))?;
                    entered = true;
                }
            }

            // Stop-loss / take-profit
            let mut closed = false;
            if let Some(position) = phase.open_position().copied() {
                if let Some((reason, price)) = check_exit(&position, bar) {
                    self.close(&position, bar.timestamp, price, reason);
                    phase = phase.apply(PhaseEvent::Closed)?;
                    closed = true;
                }
            }

            // Trailing stop
            if !closed {
                if let Some(position) = phase.open_position_mut() {
                    if let Some(stop) = trail_stop(position, bar.close, params) {
                        debug!(time = %bar.timestamp, side = %position.side, stop, "trailing stop moved");
                        position.stop_loss = Some(stop);
                    }
                }
            }

            // Forced close
            if window.forces_close_at(bar.timestamp) {
                if let Some(position) = phase.open_position().copied() {
                    self.close(&position, bar.timestamp, bar.close, ExitReason::RangeClose);
                    phase = phase.apply(PhaseEvent::Closed)?;
                }
            }
        }

        if entered {
            self.day_stats.days_with_entries += 1;
        }
        self.carried = phase.open_position().copied();
        phase.apply(PhaseEvent::DayEnded)?;
        Ok(())
    }

    fn close(&mut self, position: &Position, time: NaiveDateTime, price: f64, reason: ExitReason) {
        let profit = position.profit_at(price, self.params.contract_multiplier);
        self.state.record_close(TradeRecord {
            side: position.side,
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            exit_time: time,
            exit_price: price,
            reason,
            lot: position.lot,
            profit,
            balance_after: 0.0,
        });
        debug!(
            %time,
            side = %position.side,
            price,
            profit,
            %reason,
            balance = self.state.balance,
            "position closed"
        );
    }
}

/// Convenience wrapper: one run with a fresh simulator.
pub fn simulate(
    bars: &[Bar],
    params: &ParameterSet,
    initial_balance: f64,
) -> Result<RunResult, EngineError> {
    Simulator::new(params, initial_balance).run(bars)
}
