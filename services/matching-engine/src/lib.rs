//! Matching Engine
//!
//! Limit order book with four interchangeable allocation policies:
//! price-time, pure pro-rata, priority pro-rata and time-weighted pro-rata.
//!
//! **Key Invariants:**
//! - A crossing placement is matched before any remainder rests
//! - Trades execute at the resting level's price
//! - Pro-rata policies conserve volume exactly: fills against a level sum to
//!   `min(incoming, level volume)`
//! - Deterministic matching (same inputs → same outputs)

pub mod book;
pub mod engine;
pub mod matching;
pub mod snapshot;

pub use engine::{OrderBook, Placement};
pub use matching::MatchingPolicy;
pub use snapshot::{LevelSnapshot, TopOfBook};
