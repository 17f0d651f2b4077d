//! Order book core
//!
//! Main coordinator for the two ladders, the order arena and the configured
//! matching policy.

use venue_types::ids::{OrderId, Timestamp, Volume};
use venue_types::numeric::Money;
use venue_types::order::{Direction, Order, OrderFactory};
use venue_types::trade::Trade;

use crate::book::{Ladder, OrderStore};
use crate::matching::executor::{FillSink, MatchExecutor};
use crate::matching::MatchingPolicy;
use crate::snapshot::{LevelSnapshot, TopOfBook};

/// A limit order book for a single instrument
#[derive(Debug)]
pub struct OrderBook {
    policy: MatchingPolicy,
    asks: Ladder,
    bids: Ladder,
    store: OrderStore,
    orders: OrderFactory,
    executor: MatchExecutor,
    /// Last order that created a new best ask level
    last_bettering_ask: Option<OrderId>,
    /// Last order that created a new best bid level
    last_bettering_bid: Option<OrderId>,
}

/// Result of a placement: the order as it stood afterwards and every fill
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub order: Order,
    pub trades: Vec<Trade>,
}

impl Placement {
    pub fn filled_volume(&self) -> Volume {
        self.trades.iter().map(|trade| trade.volume).sum()
    }
}

impl OrderBook {
    pub fn new(policy: MatchingPolicy) -> Self {
        Self {
            policy,
            asks: Ladder::asks(),
            bids: Ladder::bids(),
            store: OrderStore::new(),
            orders: OrderFactory::new(),
            executor: MatchExecutor::new(),
            last_bettering_ask: None,
            last_bettering_bid: None,
        }
    }

    pub fn policy(&self) -> MatchingPolicy {
        self.policy
    }

    pub fn place_limit_order(
        &mut self,
        direction: Direction,
        timestamp: Timestamp,
        volume: Volume,
        price: Money,
    ) -> Placement {
        let mut trades = Vec::new();
        let order = self.place_limit_order_with(direction, timestamp, volume, price, &mut |trade: &Trade| {
            trades.push(trade.clone())
        });
        Placement { order, trades }
    }

    /// Match against the opposite ladder down to/through `price`, then rest the remainder
    ///
    /// `on_trade` is called once per non-zero fill, during matching.
    pub fn place_limit_order_with(
        &mut self,
        direction: Direction,
        timestamp: Timestamp,
        volume: Volume,
        price: Money,
        on_trade: &mut dyn FnMut(&Trade),
    ) -> Order {
        let mut order = self.orders.make_limit_order(direction, timestamp, volume, price);
        self.match_incoming(&mut order, Some(price), on_trade);

        if order.volume > 0 {
            self.rest(&order, price);
            self.store.insert_live(order.clone());
        } else {
            self.store.insert_record(order.clone());
        }
        order
    }

    pub fn place_market_order(&mut self, direction: Direction, timestamp: Timestamp, volume: Volume) -> Placement {
        let mut trades = Vec::new();
        let order = self.place_market_order_with(direction, timestamp, volume, &mut |trade: &Trade| {
            trades.push(trade.clone())
        });
        Placement { order, trades }
    }

    /// Match against the whole opposite ladder; unfilled volume never rests
    pub fn place_market_order_with(
        &mut self,
        direction: Direction,
        timestamp: Timestamp,
        volume: Volume,
        on_trade: &mut dyn FnMut(&Trade),
    ) -> Order {
        let mut order = self.orders.make_market_order(direction, timestamp, volume);
        self.match_incoming(&mut order, None, on_trade);
        self.store.insert_record(order.clone());
        order
    }

    fn match_incoming(&mut self, incoming: &mut Order, limit: Option<Money>, on_trade: &mut dyn FnMut(&Trade)) {
        // Split borrows: opposite ladder + arena/executor separately
        let (ladder, priority) = match incoming.direction {
            Direction::Buy => (&mut self.asks, self.last_bettering_ask),
            Direction::Sell => (&mut self.bids, self.last_bettering_bid),
        };
        let mut fills = FillSink {
            store: &mut self.store,
            executor: &mut self.executor,
            on_trade,
            timestamp: incoming.timestamp,
        };
        self.policy.match_order(ladder, &mut fills, incoming, limit, priority);
    }

    fn rest(&mut self, order: &Order, price: Money) {
        let (ladder, last_bettering) = match order.direction {
            Direction::Buy => (&mut self.bids, &mut self.last_bettering_bid),
            Direction::Sell => (&mut self.asks, &mut self.last_bettering_ask),
        };
        let created = ladder.insert_order(price, order.id);
        if created && ladder.best_price() == Some(price) {
            *last_bettering = Some(order.id);
        }
    }

    fn ladder_mut(&mut self, direction: Direction) -> &mut Ladder {
        match direction {
            Direction::Buy => &mut self.bids,
            Direction::Sell => &mut self.asks,
        }
    }

    /// Cancel a resting order entirely
    ///
    /// Unknown, filled or already cancelled ids are a no-op (returns false).
    pub fn cancel_order(&mut self, order_id: OrderId) -> bool {
        if !self.store.is_live(order_id) {
            return false;
        }
        let Some(order) = self.store.get_mut(order_id) else {
            return false;
        };
        order.volume = 0;
        let direction = order.direction;
        let price = order.price();
        if let Some(price) = price {
            self.ladder_mut(direction).remove_order(price, order_id);
        }
        self.store.unregister(order_id)
    }

    /// Reduce a resting order's volume, saturating at zero
    ///
    /// The order keeps its queue position while volume remains and is
    /// cancelled once it reaches zero. Returns the remaining volume; unknown
    /// ids return 0.
    pub fn cancel_order_volume(&mut self, order_id: OrderId, volume_to_cancel: Volume) -> Volume {
        if !self.store.is_live(order_id) {
            return 0;
        }
        let Some(order) = self.store.get_mut(order_id) else {
            return 0;
        };
        let remaining = order.volume.saturating_sub(volume_to_cancel);
        if remaining == 0 {
            self.cancel_order(order_id);
        } else {
            order.volume = remaining;
        }
        remaining
    }

    /// Live (resting) order lookup
    pub fn try_get_order(&self, order_id: OrderId) -> Option<&Order> {
        self.store.get_live(order_id)
    }

    /// Any order this book ever accepted, including filled and cancelled ones
    pub fn order_record(&self, order_id: OrderId) -> Option<&Order> {
        self.store.get(order_id)
    }

    pub fn asks(&self) -> &Ladder {
        &self.asks
    }

    pub fn bids(&self) -> &Ladder {
        &self.bids
    }

    pub fn best_ask(&self) -> Option<LevelSnapshot> {
        self.asks.best_level().map(|level| LevelSnapshot::of(level, &self.store))
    }

    pub fn best_bid(&self) -> Option<LevelSnapshot> {
        self.bids.best_level().map(|level| LevelSnapshot::of(level, &self.store))
    }

    pub fn ask_depth(&self, depth: usize) -> Vec<LevelSnapshot> {
        self.asks.depth(depth, &self.store)
    }

    pub fn bid_depth(&self, depth: usize) -> Vec<LevelSnapshot> {
        self.bids.depth(depth, &self.store)
    }

    pub fn top_of_book(&self) -> TopOfBook {
        let ask = self.best_ask();
        let bid = self.best_bid();
        TopOfBook {
            best_ask_price: ask.as_ref().map_or(Money::ZERO, |level| level.price),
            best_ask_volume: ask.map_or(0, |level| level.volume),
            ask_total_volume: self.asks.total_volume(&self.store),
            best_bid_price: bid.as_ref().map_or(Money::ZERO, |level| level.price),
            best_bid_volume: bid.map_or(0, |level| level.volume),
            bid_total_volume: self.bids.total_volume(&self.store),
        }
    }

    /// True if the best bid is at or above the best ask
    pub fn is_crossed(&self) -> bool {
        match (self.bids.best_price(), self.asks.best_price()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    /// Order that most recently opened a new best level on the given side
    pub fn last_bettering_order(&self, side: Direction) -> Option<OrderId> {
        match side {
            Direction::Buy => self.last_bettering_bid,
            Direction::Sell => self.last_bettering_ask,
        }
    }

    pub fn live_order_count(&self) -> usize {
        self.store.live_count()
    }

    pub fn trade_count(&self) -> u64 {
        self.executor.trade_count()
    }
}
