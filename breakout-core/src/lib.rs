//! Breakout Core: domain types, strategy parameters and the daily
//! opening-range breakout engine.
//!
//! This crate contains the simulation itself:
//! - Domain types (bars, pending orders, positions, trade records)
//! - `ParameterSet`, the single source of configuration for a run
//! - Day segmentation and opening-range calculation
//! - The per-day state machine and per-bar execution rules
//! - Balance, equity and drawdown tracking

pub mod domain;
pub mod engine;
pub mod params;

pub use domain::{Bar, ExitReason, PendingOrder, PendingOrders, Position, Side, TradeRecord};
pub use engine::{simulate, EngineError, RunResult, SimulationState, Simulator};
pub use params::{BreakoutMode, ParamError, ParameterSet, TradingDays};
