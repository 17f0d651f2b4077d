//! Read-only views of the book
//!
//! Plain serde structs handed out by depth and L1 queries.

use serde::{Deserialize, Serialize};
use venue_types::ids::Volume;
use venue_types::numeric::Money;

use crate::book::{OrderStore, PriceLevel};

/// Aggregate state of a single price level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub price: Money,
    pub volume: Volume,
    pub order_count: usize,
}

impl LevelSnapshot {
    pub fn of(level: &PriceLevel, store: &OrderStore) -> Self {
        Self {
            price: level.price(),
            volume: level.volume(store),
            order_count: level.order_count(),
        }
    }
}

/// Best price and volume per side plus the side totals
///
/// An empty side reports zero for all three of its fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopOfBook {
    pub best_ask_price: Money,
    pub best_ask_volume: Volume,
    pub ask_total_volume: Volume,
    pub best_bid_price: Money,
    pub best_bid_volume: Volume,
    pub bid_total_volume: Volume,
}

impl TopOfBook {
    pub fn spread(&self) -> Option<Money> {
        if self.best_ask_volume == 0 || self.best_bid_volume == 0 {
            None
        } else {
            Some(self.best_ask_price - self.best_bid_price)
        }
    }
}
