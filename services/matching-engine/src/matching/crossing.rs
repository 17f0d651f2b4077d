//! Crossing detection logic
//!
//! Determines when an incoming order may trade against a resting level

use venue_types::numeric::Money;
use venue_types::order::Direction;

/// Buy price must be >= sell price
pub fn can_match(bid_price: Money, ask_price: Money) -> bool {
    bid_price >= ask_price
}

/// Check if an incoming order crosses a resting level
///
/// `limit` is `None` for market orders, which cross any level.
pub fn incoming_can_match(incoming: Direction, limit: Option<Money>, resting_price: Money) -> bool {
    match (incoming, limit) {
        (_, None) => true,
        (Direction::Buy, Some(limit)) => can_match(limit, resting_price),
        (Direction::Sell, Some(limit)) => can_match(resting_price, limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_match_crossing() {
        assert!(can_match(Money::from_whole(101), Money::from_whole(100)));
        assert!(can_match(Money::from_whole(100), Money::from_whole(100)), "Equal prices should match");
        assert!(!can_match(Money::from_whole(99), Money::from_whole(100)));
    }

    #[test]
    fn test_incoming_limit_orders() {
        let level = Money::from_whole(100);
        assert!(incoming_can_match(Direction::Buy, Some(Money::from_whole(100)), level));
        assert!(!incoming_can_match(Direction::Buy, Some(Money::from_f64(99.99)), level));
        assert!(incoming_can_match(Direction::Sell, Some(Money::from_whole(100)), level));
        assert!(!incoming_can_match(Direction::Sell, Some(Money::from_f64(100.01)), level));
    }

    #[test]
    fn test_market_orders_always_cross() {
        assert!(incoming_can_match(Direction::Buy, None, Money::from_whole(1_000_000)));
        assert!(incoming_can_match(Direction::Sell, None, Money::from_raw(1)));
    }
}
