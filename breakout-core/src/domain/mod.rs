//! Domain types for the breakout engine

pub mod bar;
pub mod order;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use order::{PendingOrder, PendingOrders, Side};
pub use position::{ExitReason, Position};
pub use trade::TradeRecord;
