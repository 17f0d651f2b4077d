//! Identifier and scalar types for simulator entities
//!
//! Order and trade ids are issued by per-book factories as monotonically
//! increasing counters starting at 1. The value 0 is reserved for "no order".

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical simulation tick. Signed so that delays and deltas can be expressed
/// with the same type.
pub type Timestamp = i64;

/// Quantity of the traded unit
pub type Volume = u64;

/// Unique identifier for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// Reserved "no order" id
    pub const INVALID: OrderId = OrderId(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OrderId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Unique identifier for a trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(u64);

impl TradeId {
    pub const INVALID: TradeId = TradeId(0);

    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_order_id() {
        assert!(!OrderId::INVALID.is_valid());
        assert!(OrderId::new(1).is_valid());
        assert_eq!(OrderId::default(), OrderId::INVALID);
    }

    #[test]
    fn test_order_id_serialization() {
        let id = OrderId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");
        let deserialized: OrderId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_ids_order_by_value() {
        assert!(OrderId::new(1) < OrderId::new(2));
        assert!(TradeId::new(3) > TradeId::new(2));
        assert_eq!(TradeId::new(7).to_string(), "7");
    }
}
