//! TradeRecord: one closed position in the run ledger.

use super::order::Side;
use super::position::ExitReason;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A complete round-trip trade: entry → close.
///
/// The ledger is ordered by `exit_time`; each close event appends exactly one
/// record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub side: Side,

    // ── Entry ──
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,

    // ── Exit ──
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub reason: ExitReason,

    // ── Size ──
    pub lot: f64,

    // ── PnL ──
    pub profit: f64,
    /// Account balance right after this close.
    pub balance_after: f64,
}

impl TradeRecord {
    /// A zero-profit close counts as a loss.
    pub fn is_winner(&self) -> bool {
        self.profit > 0.0
    }
}
