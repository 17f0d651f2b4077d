//! Price level implementation with FIFO queue
//!
//! A price level holds the ids of all resting orders at one exact price in
//! arrival order. Order records live in the `OrderStore`; the level's
//! aggregate volume is always computed from there so the two never disagree.

use std::collections::VecDeque;
use venue_types::ids::{OrderId, Volume};
use venue_types::numeric::Money;

use super::store::OrderStore;

#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: Money,
    /// Queue of resting order ids (FIFO order)
    orders: VecDeque<OrderId>,
}

impl PriceLevel {
    pub fn new(price: Money) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
        }
    }

    pub fn price(&self) -> Money {
        self.price
    }

    /// Append an order at the back of the queue (time priority)
    pub fn push_back(&mut self, order_id: OrderId) {
        self.orders.push_back(order_id);
    }

    /// Remove an order from the queue by id, keeping the others in order
    pub fn remove(&mut self, order_id: OrderId) -> bool {
        match self.orders.iter().position(|id| *id == order_id) {
            Some(position) => self.orders.remove(position).is_some(),
            None => false,
        }
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.orders.contains(&order_id)
    }

    pub fn front(&self) -> Option<OrderId> {
        self.orders.front().copied()
    }

    pub fn pop_front(&mut self) -> Option<OrderId> {
        self.orders.pop_front()
    }

    /// Keep only the orders for which `keep` returns true
    pub fn retain(&mut self, keep: impl FnMut(&OrderId) -> bool) {
        self.orders.retain(keep);
    }

    pub fn order_ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.orders.iter().copied()
    }

    /// Sum of the member orders' remaining volume
    pub fn volume(&self, store: &OrderStore) -> Volume {
        self.orders.iter().map(|id| store.volume(*id)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}
