//! Stress test: ~100,000 orders
//!
//! Many random traders against one exchange per policy; asserts the run
//! completes and the book never ends crossed.

mod common;

use common::RandomTrader;
use matching_engine::MatchingPolicy;
use simulation::journal::Journal;
use simulation::{ExchangeAgent, ParameterStorage, Simulation};
use std::time::Instant;

#[test]
#[ignore] // Run with: cargo test --test stress_100k -- --ignored
fn test_100k_orders() {
    const TRADERS: usize = 50;

    for policy in MatchingPolicy::ALL {
        let mut sim = Simulation::with_parameters(0, 10_000, 42, ParameterStorage::new());
        sim.set_journal(Journal::digest_only());
        sim.add_agent(Box::new(ExchangeAgent::new("EXCHANGE", policy, 1))).unwrap();
        for i in 0..TRADERS {
            sim.add_agent(RandomTrader::boxed(&format!("TRADER_{:03}", i), "EXCHANGE")).unwrap();
        }

        let started = Instant::now();
        sim.simulate().unwrap();
        let elapsed = started.elapsed();

        let sent: usize = (0..TRADERS)
            .filter_map(|i| sim.agent_as::<RandomTrader>(&format!("TRADER_{:03}", i)))
            .map(|trader| trader.orders_sent)
            .sum();
        let exchange = sim.agent_as::<ExchangeAgent>("EXCHANGE").unwrap();

        println!(
            "{}: {} orders, {} trades, {} deliveries in {:?}",
            policy,
            sent,
            exchange.book().trade_count(),
            sim.delivered_count(),
            elapsed
        );
        assert!(sent > 90_000);
        assert!(!exchange.book().is_crossed());
        assert!(sim.journal().is_empty());
    }
}
