//! Order book infrastructure module
//!
//! Contains price levels, the per-side ladder, and the order arena.

pub mod ladder;
pub mod price_level;
pub mod store;

pub use ladder::Ladder;
pub use price_level::PriceLevel;
pub use store::OrderStore;
