//! One side of the book
//!
//! Price levels keyed by price in a BTreeMap for deterministic iteration.
//! The ask ladder is read ascending (lowest price first), the bid ladder
//! descending (highest price first).

use std::collections::BTreeMap;
use venue_types::ids::{OrderId, Volume};
use venue_types::numeric::Money;
use venue_types::order::Direction;

use super::price_level::PriceLevel;
use super::store::OrderStore;
use crate::snapshot::LevelSnapshot;

#[derive(Debug, Clone)]
pub struct Ladder {
    /// Direction of the orders resting here (`Sell` for asks)
    side: Direction,
    levels: BTreeMap<Money, PriceLevel>,
}

impl Ladder {
    pub fn new(side: Direction) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    pub fn asks() -> Self {
        Self::new(Direction::Sell)
    }

    pub fn bids() -> Self {
        Self::new(Direction::Buy)
    }

    pub fn side(&self) -> Direction {
        self.side
    }

    /// Append an order id to the level at `price`, creating the level if needed
    ///
    /// Returns true when a new level was created.
    pub fn insert_order(&mut self, price: Money, order_id: OrderId) -> bool {
        let mut created = false;
        let level = self.levels.entry(price).or_insert_with(|| {
            created = true;
            PriceLevel::new(price)
        });
        level.push_back(order_id);
        created
    }

    /// Remove an order id from its level, dropping the level if it empties
    pub fn remove_order(&mut self, price: Money, order_id: OrderId) -> bool {
        let Some(level) = self.levels.get_mut(&price) else {
            return false;
        };
        let removed = level.remove(order_id);
        if level.is_empty() {
            self.levels.remove(&price);
        }
        removed
    }

    pub fn remove_level(&mut self, price: Money) -> Option<PriceLevel> {
        self.levels.remove(&price)
    }

    pub fn best_price(&self) -> Option<Money> {
        match self.side {
            Direction::Sell => self.levels.keys().next().copied(),
            Direction::Buy => self.levels.keys().next_back().copied(),
        }
    }

    pub fn best_level(&self) -> Option<&PriceLevel> {
        match self.side {
            Direction::Sell => self.levels.values().next(),
            Direction::Buy => self.levels.values().next_back(),
        }
    }

    pub fn level(&self, price: Money) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    pub(crate) fn level_mut(&mut self, price: Money) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    /// Levels in priority order (best first)
    pub fn levels(&self) -> Box<dyn Iterator<Item = &PriceLevel> + '_> {
        match self.side {
            Direction::Sell => Box::new(self.levels.values()),
            Direction::Buy => Box::new(self.levels.values().rev()),
        }
    }

    /// Top `depth` levels, best first
    pub fn depth(&self, depth: usize, store: &OrderStore) -> Vec<LevelSnapshot> {
        self.levels()
            .take(depth)
            .map(|level| LevelSnapshot::of(level, store))
            .collect()
    }

    pub fn total_volume(&self, store: &OrderStore) -> Volume {
        self.levels.values().map(|level| level.volume(store)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use venue_types::order::OrderFactory;

    fn fill_ladder(ladder: &mut Ladder, store: &mut OrderStore, prices: &[i64]) {
        let mut factory = OrderFactory::new();
        for price in prices {
            let order = factory.make_limit_order(ladder.side(), 0, 10, Money::from_whole(*price));
            ladder.insert_order(Money::from_whole(*price), order.id);
            store.insert_live(order);
        }
    }

    #[test]
    fn test_ask_ladder_best_is_lowest() {
        let mut store = OrderStore::new();
        let mut asks = Ladder::asks();
        fill_ladder(&mut asks, &mut store, &[101, 99, 100]);

        assert_eq!(asks.best_price(), Some(Money::from_whole(99)));
        let prices: Vec<_> = asks.levels().map(|l| l.price()).collect();
        assert_eq!(prices, vec![Money::from_whole(99), Money::from_whole(100), Money::from_whole(101)]);
    }

    #[test]
    fn test_bid_ladder_best_is_highest() {
        let mut store = OrderStore::new();
        let mut bids = Ladder::bids();
        fill_ladder(&mut bids, &mut store, &[99, 101, 100]);

        assert_eq!(bids.best_price(), Some(Money::from_whole(101)));
        let depth = bids.depth(2, &store);
        assert_eq!(depth.len(), 2);
        assert_eq!(depth[0].price, Money::from_whole(101));
        assert_eq!(depth[1].price, Money::from_whole(100));
        assert_eq!(bids.total_volume(&store), 30);
    }

    #[test]
    fn test_insert_reports_new_level() {
        let mut asks = Ladder::asks();
        let price = Money::from_whole(50);
        assert!(asks.insert_order(price, OrderId::new(1)));
        assert!(!asks.insert_order(price, OrderId::new(2)));
        assert_eq!(asks.level_count(), 1);
        assert_eq!(asks.level(price).map(|l| l.order_count()), Some(2));
    }

    #[test]
    fn test_remove_drops_empty_level() {
        let mut asks = Ladder::asks();
        let price = Money::from_whole(50);
        asks.insert_order(price, OrderId::new(1));

        assert!(asks.remove_order(price, OrderId::new(1)));
        assert!(asks.is_empty());
        assert!(!asks.remove_order(price, OrderId::new(1)));
    }
}
