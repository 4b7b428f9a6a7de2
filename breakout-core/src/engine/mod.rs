//! Backtesting engine: day segmentation, opening range, order placement and
//! the per-bar execution rules.
//!
//! A run walks the bar series one calendar day at a time:
//!
//! 1. Segment: consecutive bars with the same date form a day
//! 2. Range: high/low of the configured time-of-day window
//! 3. Placement: buy stop at the high, sell stop at the low (or withheld)
//! 4. Execution: entry trigger, SL/TP, trailing stop, forced close per bar

pub mod equity;
pub mod execution;
pub mod phase;
pub mod placement;
pub mod range;
pub mod segment;
pub mod simulator;

pub use equity::SimulationState;
pub use execution::{check_exit, exit_probe, trail_stop};
pub use phase::{DayPhase, PhaseError, PhaseEvent};
pub use placement::{calculate_lot_size, check_range_size, place_orders, Placement, WithheldReason};
pub use range::{compute_range, OpeningRange, RangeExtremes, RangeObservation, RangeWindow};
pub use segment::{segment_days, DaySegments, DaySlice};
pub use simulator::{simulate, DayStats, EngineError, RunResult, Simulator};
