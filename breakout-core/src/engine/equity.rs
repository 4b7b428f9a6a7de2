use serde::{Deserialize, Serialize};

use crate::domain::TradeRecord;

/// Account state of one run. Balance moves only through [`record_close`].
///
/// [`record_close`]: SimulationState::record_close
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub balance: f64,
    pub equity: f64,
    pub max_equity: f64,
    pub min_equity: f64,
    /// `max_equity - min_equity`, refreshed only when a new trough is set.
    pub max_drawdown: f64,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub ledger: Vec<TradeRecord>,
    /// Initial balance followed by the balance after each close.
    pub balance_history: Vec<f64>,
}

impl SimulationState {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            balance: initial_balance,
            equity: initial_balance,
            max_equity: initial_balance,
            min_equity: initial_balance,
            max_drawdown: 0.0,
            winning_trades: 0,
            losing_trades: 0,
            ledger: Vec::new(),
            balance_history: vec![initial_balance],
        }
    }

    pub fn total_trades(&self) -> usize {
        self.ledger.len()
    }

    /// Apply one close: balance, equity extremes, counts, ledger.
    ///
    /// `trade.balance_after` is overwritten with the new balance.
    pub fn record_close(&mut self, mut trade: TradeRecord) {
        self.balance += trade.profit;
        self.equity = self.balance;

        if self.equity > self.max_equity {
            self.max_equity = self.equity;
        }
        if self.equity < self.min_equity {
            self.min_equity = self.equity;
            self.max_drawdown = self.max_equity - self.min_equity;
        }

        if trade.is_winner() {
            self.winning_trades += 1;
        } else {
            self.losing_trades += 1;
        }

        trade.balance_after = self.balance;
        self.ledger.push(trade);
        self.balance_history.push(self.balance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ExitReason, Side};
    use chrono::NaiveDate;

    fn trade(profit: f64) -> TradeRecord {
        let t = NaiveDate::from_ymd_opt(2020, 1, 6)
            .unwrap()
            .and_hms_opt(7, 0, 0)
            .unwrap();
        TradeRecord {
            side: Side::Buy,
            entry_time: t,
            entry_price: 1950.0,
            exit_time: t,
            exit_price: 1950.0,
            reason: ExitReason::StopLoss,
            lot: 0.5,
            profit,
            balance_after: 0.0,
        }
    }

    #[test]
    fn new_state_is_flat() {
        let s = SimulationState::new(5000.0);
        assert_eq!(s.balance_history, vec![5000.0]);
        assert_eq!(s.max_drawdown, 0.0);
        assert_eq!(s.total_trades(), 0);
    }

    #[test]
    fn close_updates_balance_and_ledger() {
        let mut s = SimulationState::new(5000.0);
        s.record_close(trade(100.0));
        assert_eq!(s.balance, 5100.0);
        assert_eq!(s.max_equity, 5100.0);
        assert_eq!(s.ledger[0].balance_after, 5100.0);
        assert_eq!(s.balance_history, vec![5000.0, 5100.0]);
        assert_eq!(s.winning_trades, 1);
    }

    #[test]
    fn drawdown_refreshes_only_on_new_trough() {
        let mut s = SimulationState::new(5000.0);
        s.record_close(trade(-200.0)); // trough 4800, dd 200
        assert_eq!(s.max_drawdown, 200.0);
        s.record_close(trade(700.0)); // peak 5500
        s.record_close(trade(-500.0)); // 5000, not a new trough
        assert_eq!(s.max_drawdown, 200.0);
        s.record_close(trade(-300.0)); // 4700, new trough
        assert_eq!(s.min_equity, 4700.0);
        assert_eq!(s.max_drawdown, 800.0);
    }

    #[test]
    fn breakeven_counts_as_loss() {
        let mut s = SimulationState::new(5000.0);
        s.record_close(trade(0.0));
        assert_eq!(s.losing_trades, 1);
        assert_eq!(s.winning_trades, 0);
    }
}
