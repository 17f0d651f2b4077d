//! Types library for the trading venue simulator
//!
//! Value types shared by the matching engine and the discrete-event
//! scheduler: fixed-point money, ids, orders, trades, and the error taxonomy.
//!
//! # Modules
//! - `ids`: OrderId, TradeId, Timestamp, Volume
//! - `numeric`: Fixed-point `Money` (5 decimal digits)
//! - `order`: Orders and the order factory
//! - `trade`: Trades and the trade factory
//! - `errors`: Error taxonomy

pub mod errors;
pub mod ids;
pub mod numeric;
pub mod order;
pub mod trade;

pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::*;
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::trade::*;
}
