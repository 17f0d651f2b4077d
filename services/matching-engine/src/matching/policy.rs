//! Matching policy selection and the shared level sweep

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use venue_types::errors::SimulationError;
use venue_types::ids::OrderId;
use venue_types::numeric::Money;
use venue_types::order::Order;

use super::executor::FillSink;
use super::{crossing, price_time, pro_rata};
use crate::book::Ladder;

/// How an incoming order's volume is split among the orders of a level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchingPolicy {
    /// Strict FIFO within the level
    #[default]
    PriceTime,
    /// Proportional to resting volume, FIFO for the rounding leftover
    PureProRata,
    /// Last bettering order first, then pure pro-rata
    PriorityProRata,
    /// Pro-rata weighted toward the head of the queue
    TimeProRata,
}

impl MatchingPolicy {
    pub const ALL: [MatchingPolicy; 4] = [
        MatchingPolicy::PriceTime,
        MatchingPolicy::PureProRata,
        MatchingPolicy::PriorityProRata,
        MatchingPolicy::TimeProRata,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MatchingPolicy::PriceTime => "PriceTime",
            MatchingPolicy::PureProRata => "PureProRata",
            MatchingPolicy::PriorityProRata => "PriorityProRata",
            MatchingPolicy::TimeProRata => "TimeProRata",
        }
    }

    /// Sweep the opposite ladder best level first
    ///
    /// Stops when the incoming order is exhausted, the ladder is empty, or the
    /// best level no longer crosses `limit`. Emptied levels are removed.
    pub(crate) fn match_order(
        self,
        ladder: &mut Ladder,
        fills: &mut FillSink<'_>,
        incoming: &mut Order,
        limit: Option<Money>,
        priority: Option<OrderId>,
    ) {
        while incoming.volume > 0 {
            let Some(price) = ladder.best_price() else {
                break;
            };
            if !crossing::incoming_can_match(incoming.direction, limit, price) {
                break;
            }
            let Some(level) = ladder.level_mut(price) else {
                break;
            };

            match self {
                MatchingPolicy::PriceTime => price_time::allocate_level(level, fills, incoming),
                MatchingPolicy::PureProRata => {
                    pro_rata::allocate_level(level, fills, incoming, pro_rata::pure_share)
                }
                MatchingPolicy::PriorityProRata => {
                    if let Some(priority) = priority {
                        pro_rata::allocate_priority(level, fills, incoming, priority);
                    }
                    if incoming.volume > 0 && !level.is_empty() {
                        pro_rata::allocate_level(level, fills, incoming, pro_rata::pure_share);
                    }
                }
                MatchingPolicy::TimeProRata => {
                    pro_rata::allocate_level(level, fills, incoming, pro_rata::time_share)
                }
            }

            if level.is_empty() {
                ladder.remove_level(price);
            } else {
                break;
            }
        }
    }
}

impl fmt::Display for MatchingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MatchingPolicy {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchingPolicy::ALL
            .into_iter()
            .find(|policy| policy.name() == s)
            .ok_or_else(|| SimulationError::UnknownAlgorithm { name: s.to_string() })
    }
}
