//! Pending stop orders placed at the opening-range boundaries.

use serde::{Deserialize, Serialize};

use super::bar::Bar;
use crate::params::BreakoutMode;

/// Direction of an order or position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// Price on `bar` that is compared against a stop trigger for this side.
    ///
    /// A buy stop sits above the market and is reached by the high; a sell
    /// stop sits below and is reached by the low. The position opens at this
    /// price.
    pub fn trigger_probe(self, bar: &Bar) -> f64 {
        match self {
            Side::Buy => bar.high,
            Side::Sell => bar.low,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => f.write_str("buy"),
            Side::Sell => f.write_str("sell"),
        }
    }
}

/// A stop order waiting for the market to reach `trigger_price`.
///
/// Each side carries its own protective levels so a sell entry can never
/// inherit the buy leg's stop-loss (or vice versa).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingOrder {
    pub side: Side,
    pub trigger_price: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl PendingOrder {
    /// True if `bar` reaches this order's trigger.
    pub fn is_triggered_by(&self, bar: &Bar) -> bool {
        let probe = self.side.trigger_probe(bar);
        match self.side {
            Side::Buy => probe >= self.trigger_price,
            Side::Sell => probe <= self.trigger_price,
        }
    }
}

/// The day's buy-stop / sell-stop pair. Either leg may be gone (filled,
/// cancelled, or never placed).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingOrders {
    pub buy: Option<PendingOrder>,
    pub sell: Option<PendingOrder>,
    /// Lot size fixed at placement time for both legs.
    pub lot: f64,
    pub mode: BreakoutMode,
}

impl PendingOrders {
    pub fn get(&self, side: Side) -> Option<&PendingOrder> {
        match side {
            Side::Buy => self.buy.as_ref(),
            Side::Sell => self.sell.as_ref(),
        }
    }

    fn slot_mut(&mut self, side: Side) -> &mut Option<PendingOrder> {
        match side {
            Side::Buy => &mut self.buy,
            Side::Sell => &mut self.sell,
        }
    }

    /// True if at least one leg can still trigger.
    pub fn has_live(&self) -> bool {
        self.buy.is_some() || self.sell.is_some()
    }

    /// First leg triggered by `bar`. The buy leg is evaluated before the sell
    /// leg, so a bar spanning both triggers opens a buy.
    pub fn triggered_by(&self, bar: &Bar) -> Option<&PendingOrder> {
        self.buy
            .as_ref()
            .filter(|o| o.is_triggered_by(bar))
            .or_else(|| self.sell.as_ref().filter(|o| o.is_triggered_by(bar)))
    }

    /// Consume the `side` leg as filled. In one-breakout mode the opposite leg
    /// is cancelled as well. Returns the filled order, or `None` if that leg
    /// was not live.
    pub fn fill(&mut self, side: Side) -> Option<PendingOrder> {
        let filled = self.slot_mut(side).take()?;
        if self.mode == BreakoutMode::OneBreakoutPerRange {
            *self.slot_mut(side.opposite()) = None;
        }
        Some(filled)
    }
}
