//! Per-day state machine.
//!
//! A day moves `Idle → RangeReady → OrdersPending → PositionOpen` and back.
//! [`DayPhase::apply`] is a pure transition function: it takes the current
//! phase by value and returns the next one, or a [`PhaseError`] for any
//! combination the engine must never produce. At most one position exists
//! because only `PositionOpen` can hold one.

use thiserror::Error;

use super::range::OpeningRange;
use crate::domain::{PendingOrders, Position};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DayPhase {
    Idle,
    RangeReady {
        range: OpeningRange,
    },
    OrdersPending {
        orders: PendingOrders,
    },
    PositionOpen {
        position: Position,
        orders: PendingOrders,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhaseEvent {
    RangeComputed(OpeningRange),
    /// Orders placed; `carried` is a position still open from an earlier day.
    OrdersPlaced {
        orders: PendingOrders,
        carried: Option<Position>,
    },
    OrdersWithheld,
    /// A pending leg filled and opened `Position`.
    Filled(Position),
    Closed,
    DayEnded,
}

impl PhaseEvent {
    fn name(&self) -> &'static str {
        match self {
            PhaseEvent::RangeComputed(_) => "RangeComputed",
            PhaseEvent::OrdersPlaced { .. } => "OrdersPlaced",
            PhaseEvent::OrdersWithheld => "OrdersWithheld",
            PhaseEvent::Filled(_) => "Filled",
            PhaseEvent::Closed => "Closed",
            PhaseEvent::DayEnded => "DayEnded",
        }
    }
}

/// Illegal transitions of the day state machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("invalid day transition: {event} in phase {phase}")]
    InvalidTransition {
        phase: &'static str,
        event: &'static str,
    },

    #[error("{0} leg filled but it is not live")]
    LegNotLive(crate::domain::Side),
}

impl DayPhase {
    pub fn name(&self) -> &'static str {
        match self {
            DayPhase::Idle => "Idle",
            DayPhase::RangeReady { .. } => "RangeReady",
            DayPhase::OrdersPending { .. } => "OrdersPending",
            DayPhase::PositionOpen { .. } => "PositionOpen",
        }
    }

    pub fn open_position(&self) -> Option<&Position> {
        match self {
            DayPhase::PositionOpen { position, .. } => Some(position),
            _ => None,
        }
    }

    pub fn open_position_mut(&mut self) -> Option<&mut Position> {
        match self {
            DayPhase::PositionOpen { position, .. } => Some(position),
            _ => None,
        }
    }

    pub fn pending_orders(&self) -> Option<&PendingOrders> {
        match self {
            DayPhase::OrdersPending { orders } | DayPhase::PositionOpen { orders, .. } => {
                Some(orders)
            }
            _ => None,
        }
    }

    /// Next phase after `event`.
    pub fn apply(self, event: PhaseEvent) -> Result<DayPhase, PhaseError> {
        match (self, event) {
            (DayPhase::Idle, PhaseEvent::RangeComputed(range)) => {
                Ok(DayPhase::RangeReady { range })
            }

            (DayPhase::RangeReady { .. }, PhaseEvent::OrdersPlaced { orders, carried }) => {
                Ok(match carried {
                    Some(position) => DayPhase::PositionOpen { position, orders },
                    None => DayPhase::OrdersPending { orders },
                })
            }
            (DayPhase::RangeReady { .. }, PhaseEvent::OrdersWithheld) => Ok(DayPhase::Idle),

            (DayPhase::OrdersPending { mut orders }, PhaseEvent::Filled(position)) => {
                orders
                    .fill(position.side)
                    .ok_or(PhaseError::LegNotLive(position.side))?;
                Ok(DayPhase::PositionOpen { position, orders })
            }

            (DayPhase::PositionOpen { orders, .. }, PhaseEvent::Closed) => {
                if orders.has_live() {
                    Ok(DayPhase::OrdersPending { orders })
                } else {
                    Ok(DayPhase::Idle)
                }
            }

            (_, PhaseEvent::DayEnded) => Ok(DayPhase::Idle),

            (phase, event) => Err(PhaseError::InvalidTransition {
                phase: phase.name(),
                event: event.name(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PendingOrder, Side};
    use crate::params::BreakoutMode;
    use chrono::NaiveDate;

    fn range() -> OpeningRange {
        OpeningRange {
            high: 1950.0,
            low: 1949.0,
            size: 1.0,
            points: 1000.0,
        }
    }

    fn orders(mode: BreakoutMode) -> PendingOrders {
        PendingOrders {
            buy: Some(PendingOrder {
                side: Side::Buy,
                trigger_price: 1950.0,
                stop_loss: Some(1949.1),
                take_profit: None,
            }),
            sell: Some(PendingOrder {
                side: Side::Sell,
                trigger_price: 1949.0,
                stop_loss: Some(1949.9),
                take_profit: None,
            }),
            lot: 0.5,
            mode,
        }
    }

    fn position(side: Side) -> Position {
        Position {
            side,
            entry_time: NaiveDate::from_ymd_opt(2020, 1, 6)
                .unwrap()
                .and_hms_opt(7, 0, 0)
                .unwrap(),
            entry_price: 1950.0,
            lot: 0.5,
            stop_loss: Some(1949.1),
            take_profit: None,
        }
    }

    #[test]
    fn full_day_cycle_one_breakout() {
        let phase = DayPhase::Idle
            .apply(PhaseEvent::RangeComputed(range()))
            .and_then(|p| {
                p.apply(PhaseEvent::OrdersPlaced {
                    orders: orders(BreakoutMode::OneBreakoutPerRange),
                    carried: None,
                })
            })
            .and_then(|p| p.apply(PhaseEvent::Filled(position(Side::Buy))))
            .unwrap();
        assert!(phase.open_position().is_some());
        assert!(!phase.pending_orders().unwrap().has_live());

        // Opposite leg was cancelled, so closing returns to Idle.
        assert_eq!(phase.apply(PhaseEvent::Closed).unwrap(), DayPhase::Idle);
    }

    #[test]
    fn both_sides_returns_to_pending_after_close() {
        let phase = DayPhase::OrdersPending {
            orders: orders(BreakoutMode::BothSides),
        }
        .apply(PhaseEvent::Filled(position(Side::Buy)))
        .and_then(|p| p.apply(PhaseEvent::Closed))
        .unwrap();
        let DayPhase::OrdersPending { orders } = phase else {
            panic!("expected OrdersPending, got {}", phase.name());
        };
        assert!(orders.buy.is_none());
        assert!(orders.sell.is_some());
    }

    #[test]
    fn withheld_goes_idle() {
        let phase = DayPhase::RangeReady { range: range() }
            .apply(PhaseEvent::OrdersWithheld)
            .unwrap();
        assert_eq!(phase, DayPhase::Idle);
    }

    #[test]
    fn carried_position_opens_day_in_position_open() {
        let phase = DayPhase::RangeReady { range: range() }
            .apply(PhaseEvent::OrdersPlaced {
                orders: orders(BreakoutMode::OneBreakoutPerRange),
                carried: Some(position(Side::Sell)),
            })
            .unwrap();
        assert_eq!(phase.open_position().unwrap().side, Side::Sell);
    }

    #[test]
    fn cannot_place_orders_before_range() {
        let err = DayPhase::Idle
            .apply(PhaseEvent::OrdersPlaced {
                orders: orders(BreakoutMode::OneBreakoutPerRange),
                carried: None,
            })
            .unwrap_err();
        assert_eq!(
            err,
            PhaseError::InvalidTransition {
                phase: "Idle",
                event: "OrdersPlaced"
            }
        );
    }

    #[test]
    fn second_fill_while_open_is_rejected() {
        let phase = DayPhase::PositionOpen {
            position: position(Side::Buy),
            orders: orders(BreakoutMode::BothSides),
        };
        assert!(phase.apply(PhaseEvent::Filled(position(Side::Sell))).is_err());
    }

    #[test]
    fn fill_of_dead_leg_is_rejected() {
        let mut book = orders(BreakoutMode::BothSides);
        book.buy = None;
        let err = DayPhase::OrdersPending { orders: book }
            .apply(PhaseEvent::Filled(position(Side::Buy)))
            .unwrap_err();
        assert_eq!(err, PhaseError::LegNotLive(Side::Buy));
    }

    #[test]
    fn day_end_resets_from_any_phase() {
        let phase = DayPhase::PositionOpen {
            position: position(Side::Buy),
            orders: orders(BreakoutMode::OneBreakoutPerRange),
        };
        assert_eq!(phase.apply(PhaseEvent::DayEnded).unwrap(), DayPhase::Idle);
    }
}
