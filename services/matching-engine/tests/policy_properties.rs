//! Property tests across all matching policies
//!
//! Volume conservation per level and the no-resting-cross invariant.

use matching_engine::{MatchingPolicy, OrderBook};
use proptest::prelude::*;
use venue_types::ids::{OrderId, Volume};
use venue_types::numeric::Money;
use venue_types::order::Direction;

fn direction(is_buy: bool) -> Direction {
    if is_buy {
        Direction::Buy
    } else {
        Direction::Sell
    }
}

proptest! {
    #[test]
    fn prop_level_fills_conserve_volume(
        resting in prop::collection::vec(1u64..500, 1..12),
        incoming in 1u64..3_000,
        policy_index in 0usize..4,
    ) {
        let policy = MatchingPolicy::ALL[policy_index];
        let mut book = OrderBook::new(policy);
        let price = Money::from_whole(10);
        for (t, volume) in resting.iter().enumerate() {
            book.place_limit_order(Direction::Buy, t as i64, *volume, price);
        }
        let total: Volume = resting.iter().sum();

        let placement = book.place_market_order(Direction::Sell, 100, incoming);

        prop_assert_eq!(placement.filled_volume(), incoming.min(total));
        prop_assert_eq!(placement.order.volume, incoming - incoming.min(total));
        prop_assert!(placement.trades.iter().all(|t| t.volume > 0 && t.price == price));

        // No resting order ever receives more than it had
        for (index, volume) in resting.iter().enumerate() {
            let id = OrderId::new(index as u64 + 1);
            let filled: Volume = placement
                .trades
                .iter()
                .filter(|t| t.resting_order_id == id)
                .map(|t| t.volume)
                .sum();
            prop_assert!(filled <= *volume);
            let left = book.try_get_order(id).map_or(0, |o| o.volume);
            prop_assert_eq!(left + filled, *volume);
        }

        let bid_volume = book.top_of_book().bid_total_volume;
        prop_assert_eq!(bid_volume, total - incoming.min(total));
    }

    #[test]
    fn prop_no_resting_cross(
        orders in prop::collection::vec((any::<bool>(), 90i64..110, 1u64..50), 1..80),
        policy_index in 0usize..4,
    ) {
        let mut book = OrderBook::new(MatchingPolicy::ALL[policy_index]);
        for (t, (is_buy, price, volume)) in orders.into_iter().enumerate() {
            book.place_limit_order(direction(is_buy), t as i64, volume, Money::from_whole(price));
            prop_assert!(!book.is_crossed());
        }
    }

    #[test]
    fn prop_cancels_keep_book_consistent(
        orders in prop::collection::vec((any::<bool>(), 95i64..105, 1u64..50), 1..40),
        cancels in prop::collection::vec((1u64..50, 0u64..60), 0..30),
    ) {
        let mut book = OrderBook::new(MatchingPolicy::PriceTime);
        for (t, (is_buy, price, volume)) in orders.into_iter().enumerate() {
            book.place_limit_order(direction(is_buy), t as i64, volume, Money::from_whole(price));
        }

        for (id, volume) in cancels {
            let id = OrderId::new(id);
            let before = book.try_get_order(id).map_or(0, |o| o.volume);
            let remaining = book.cancel_order_volume(id, volume);
            prop_assert_eq!(remaining, before.saturating_sub(volume));
            prop_assert_eq!(book.try_get_order(id).map_or(0, |o| o.volume), remaining);
        }

        let top = book.top_of_book();
        let ask_levels: Volume = book.ask_depth(usize::MAX).iter().map(|l| l.volume).sum();
        let bid_levels: Volume = book.bid_depth(usize::MAX).iter().map(|l| l.volume).sum();
        prop_assert_eq!(top.ask_total_volume, ask_levels);
        prop_assert_eq!(top.bid_total_volume, bid_levels);
        prop_assert!(book.ask_depth(usize::MAX).iter().all(|l| l.volume > 0 && l.order_count > 0));
        prop_assert!(book.bid_depth(usize::MAX).iter().all(|l| l.volume > 0 && l.order_count > 0));
    }
}

#[test]
fn test_ids_are_never_reused() {
    let mut book = OrderBook::new(MatchingPolicy::PureProRata);
    let a = book.place_limit_order(Direction::Sell, 0, 5, Money::from_whole(10)).order.id;
    book.cancel_order(a);
    let b = book.place_limit_order(Direction::Sell, 1, 5, Money::from_whole(10)).order.id;
    let c = book.place_market_order(Direction::Buy, 2, 5);

    assert_eq!(a, OrderId::new(1));
    assert_eq!(b, OrderId::new(2));
    assert_eq!(c.order.id, OrderId::new(3));
    assert_eq!(c.trades[0].resting_order_id, b);
}

#[test]
fn test_independent_books_number_independently() {
    let mut first = OrderBook::new(MatchingPolicy::PriceTime);
    let mut second = OrderBook::new(MatchingPolicy::TimeProRata);
    first.place_limit_order(Direction::Buy, 0, 1, Money::from_whole(1));
    let id = second.place_limit_order(Direction::Buy, 0, 1, Money::from_whole(1)).order.id;
    assert_eq!(id, OrderId::new(1));
}
