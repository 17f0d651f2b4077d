//! Trade records and the factory that issues them

use crate::ids::{OrderId, Timestamp, TradeId, Volume};
use crate::numeric::Money;
use crate::order::Direction;
use serde::{Deserialize, Serialize};

/// A single fill between an aggressing and a resting order
///
/// `direction` is what the aggressor did; `price` is always the resting
/// level's price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub timestamp: Timestamp,
    pub direction: Direction,
    pub aggressing_order_id: OrderId,
    pub resting_order_id: OrderId,
    pub volume: Volume,
    pub price: Money,
}

impl Trade {
    /// price * volume
    pub fn notional(&self) -> Money {
        self.price * self.volume as i64
    }

    pub fn involves(&self, order_id: OrderId) -> bool {
        self.aggressing_order_id == order_id || self.resting_order_id == order_id
    }
}

/// Issues trades with ids 1, 2, 3, ...
#[derive(Debug, Default)]
pub struct TradeFactory {
    last_id: u64,
}

impl TradeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn make_trade(
        &mut self,
        timestamp: Timestamp,
        direction: Direction,
        aggressing_order_id: OrderId,
        resting_order_id: OrderId,
        volume: Volume,
        price: Money,
    ) -> Trade {
        self.last_id += 1;
        Trade {
            id: TradeId::new(self.last_id),
            timestamp,
            direction,
            aggressing_order_id,
            resting_order_id,
            volume,
            price,
        }
    }

    pub fn trade_count(&self) -> u64 {
        self.last_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_ids_are_sequential() {
        let mut factory = TradeFactory::new();
        let price = Money::from_whole(10);
        let t1 = factory.make_trade(5, Direction::Sell, OrderId::new(3), OrderId::new(1), 50, price);
        let t2 = factory.make_trade(5, Direction::Sell, OrderId::new(3), OrderId::new(2), 25, price);

        assert_eq!(t1.id, TradeId::new(1));
        assert_eq!(t2.id, TradeId::new(2));
        assert_eq!(factory.trade_count(), 2);
    }

    #[test]
    fn test_trade_notional() {
        let trade = TradeFactory::new().make_trade(
            0,
            Direction::Buy,
            OrderId::new(2),
            OrderId::new(1),
            3,
            Money::from_f64(10.5),
        );
        assert_eq!(trade.notional(), Money::from_f64(31.5));
        assert!(trade.involves(OrderId::new(1)));
        assert!(!trade.involves(OrderId::new(9)));
    }

    #[test]
    fn test_trade_serialization() {
        let trade = TradeFactory::new().make_trade(
            7,
            Direction::Buy,
            OrderId::new(2),
            OrderId::new(1),
            3,
            Money::from_whole(10),
        );
        let json = serde_json::to_string(&trade).unwrap();
        let deserialized: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deserialized);
    }
}
