//! Order arena keyed by id
//!
//! Every order the book accepts is kept here for historical lookup (trade
//! attribution needs filled and cancelled orders too). The `live` set is the
//! index of orders that currently rest on a ladder.

use std::collections::{HashMap, HashSet};
use venue_types::ids::{OrderId, Volume};
use venue_types::order::Order;

#[derive(Debug, Default)]
pub struct OrderStore {
    records: HashMap<OrderId, Order>,
    live: HashSet<OrderId>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the record without making it reachable for cancel/retrieve
    pub fn insert_record(&mut self, order: Order) {
        self.records.insert(order.id, order);
    }

    /// Keep the record and register it as resting
    pub fn insert_live(&mut self, order: Order) {
        self.live.insert(order.id);
        self.records.insert(order.id, order);
    }

    /// Drop the id from the live index; the record stays
    pub fn unregister(&mut self, order_id: OrderId) -> bool {
        self.live.remove(&order_id)
    }

    pub fn is_live(&self, order_id: OrderId) -> bool {
        self.live.contains(&order_id)
    }

    /// Live order lookup
    pub fn get_live(&self, order_id: OrderId) -> Option<&Order> {
        if self.is_live(order_id) {
            self.records.get(&order_id)
        } else {
            None
        }
    }

    /// Historical lookup, including filled and cancelled orders
    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.records.get(&order_id)
    }

    pub fn get_mut(&mut self, order_id: OrderId) -> Option<&mut Order> {
        self.records.get_mut(&order_id)
    }

    /// Remaining volume, 0 for unknown ids
    pub fn volume(&self, order_id: OrderId) -> Volume {
        self.records.get(&order_id).map_or(0, |order| order.volume)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}
