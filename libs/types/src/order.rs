//! Order records and the factory that issues them
//!
//! An order is created once by an `OrderFactory`, after which only its
//! remaining volume changes (it never grows).

use crate::ids::{OrderId, Timestamp, Volume};
use crate::numeric::Money;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Bid side
    Buy,
    /// Ask side
    Sell,
}

impl Direction {
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Buy => Direction::Sell,
            Direction::Sell => Direction::Buy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Buy => "BUY",
            Direction::Sell => "SELL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(Direction::Buy),
            "SELL" => Ok(Direction::Sell),
            other => Err(format!("unknown direction '{}'", other)),
        }
    }
}

/// Market orders carry no price; limit orders carry an immutable limit price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum OrderKind {
    Market,
    Limit { price: Money },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub direction: Direction,
    /// Tick at which the order reached the book
    pub timestamp: Timestamp,
    /// Remaining volume
    pub volume: Volume,
    #[serde(flatten)]
    pub kind: OrderKind,
}

impl Order {
    pub fn price(&self) -> Option<Money> {
        match self.kind {
            OrderKind::Limit { price } => Some(price),
            OrderKind::Market => None,
        }
    }

    pub fn is_limit(&self) -> bool {
        matches!(self.kind, OrderKind::Limit { .. })
    }

    pub fn is_market(&self) -> bool {
        matches!(self.kind, OrderKind::Market)
    }

    pub fn is_filled(&self) -> bool {
        self.volume == 0
    }

    /// Take `fill` off the remaining volume, returning what is left
    pub fn apply_fill(&mut self, fill: Volume) -> Volume {
        debug_assert!(fill <= self.volume, "fill exceeds remaining volume");
        self.volume = self.volume.saturating_sub(fill);
        self.volume
    }
}

/// Issues orders with ids 1, 2, 3, ...
#[derive(Debug, Default)]
pub struct OrderFactory {
    last_id: u64,
}

impl OrderFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> OrderId {
        self.last_id += 1;
        OrderId::new(self.last_id)
    }

    pub fn make_limit_order(
        &mut self,
        direction: Direction,
        timestamp: Timestamp,
        volume: Volume,
        price: Money,
    ) -> Order {
        Order {
            id: self.next_id(),
            direction,
            timestamp,
            volume,
            kind: OrderKind::Limit { price },
        }
    }

    pub fn make_market_order(&mut self, direction: Direction, timestamp: Timestamp, volume: Volume) -> Order {
        Order {
            id: self.next_id(),
            direction,
            timestamp,
            volume,
            kind: OrderKind::Market,
        }
    }

    pub fn limit_buy(&mut self, timestamp: Timestamp, volume: Volume, price: Money) -> Order {
        self.make_limit_order(Direction::Buy, timestamp, volume, price)
    }

    pub fn limit_sell(&mut self, timestamp: Timestamp, volume: Volume, price: Money) -> Order {
        self.make_limit_order(Direction::Sell, timestamp, volume, price)
    }

    pub fn market_buy(&mut self, timestamp: Timestamp, volume: Volume) -> Order {
        self.make_market_order(Direction::Buy, timestamp, volume)
    }

    pub fn market_sell(&mut self, timestamp: Timestamp, volume: Volume) -> Order {
        self.make_market_order(Direction::Sell, timestamp, volume)
    }

    /// Id of the most recently issued order (`INVALID` before the first)
    pub fn last_id(&self) -> OrderId {
        OrderId::new(self.last_id)
    }
}
