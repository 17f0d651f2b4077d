//! Trade execution logic
//!
//! `MatchExecutor` owns the trade id sequence. `FillSink` bundles what a
//! level allocator needs to apply a fill: the order arena, the executor and
//! the trade callback. It is built from disjoint borrows of the book so the
//! ladder being walked can be borrowed separately.

use venue_types::ids::{OrderId, Timestamp, Volume};
use venue_types::numeric::Money;
use venue_types::order::{Direction, Order};
use venue_types::trade::{Trade, TradeFactory};

use crate::book::OrderStore;

/// Match executor for handling trade generation
#[derive(Debug, Default)]
pub struct MatchExecutor {
    trades: TradeFactory,
}

impl MatchExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the trade record for one fill
    ///
    /// `price` is the resting level's price, `direction` what the aggressor did.
    pub fn execute_trade(
        &mut self,
        timestamp: Timestamp,
        direction: Direction,
        aggressing: OrderId,
        resting: OrderId,
        volume: Volume,
        price: Money,
    ) -> Trade {
        self.trades.make_trade(timestamp, direction, aggressing, resting, volume, price)
    }

    pub fn trade_count(&self) -> u64 {
        self.trades.trade_count()
    }
}

pub(crate) struct FillSink<'a> {
    pub store: &'a mut OrderStore,
    pub executor: &'a mut MatchExecutor,
    pub on_trade: &'a mut dyn FnMut(&Trade),
    pub timestamp: Timestamp,
}

impl FillSink<'_> {
    pub fn volume(&self, order_id: OrderId) -> Volume {
        self.store.volume(order_id)
    }

    pub fn is_live(&self, order_id: OrderId) -> bool {
        self.store.is_live(order_id)
    }

    /// Move `volume` out of both orders and log the trade
    ///
    /// A zero fill is not logged. Returns the resting order's remaining volume.
    pub fn fill(&mut self, incoming: &mut Order, resting: OrderId, volume: Volume, price: Money) -> Volume {
        let Some(resting_order) = self.store.get_mut(resting) else {
            return 0;
        };
        if volume == 0 {
            return resting_order.volume;
        }

        let remaining = resting_order.apply_fill(volume);
        incoming.apply_fill(volume);
        let trade = self.executor.execute_trade(
            self.timestamp,
            incoming.direction,
            incoming.id,
            resting,
            volume,
            price,
        );
        (self.on_trade)(&trade);
        remaining
    }

    /// Drop a fully consumed order from the live index
    pub fn retire(&mut self, order_id: OrderId) {
        self.store.unregister(order_id);
    }
}
