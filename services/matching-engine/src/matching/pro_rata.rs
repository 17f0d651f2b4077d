//! Pro-rata allocation within a level
//!
//! All pro-rata policies share one two-pass shape:
//! 1. every resting order receives its share as computed by a weight function
//!    (never more than its own volume);
//! 2. whatever flooring left over is handed out FIFO, and orders that reached
//!    zero are removed from the level.
//!
//! The sum of fills against a level is therefore exactly
//! `min(incoming, level volume)`.

use venue_types::ids::{OrderId, Volume};
use venue_types::order::Order;

use super::executor::FillSink;
use crate::book::PriceLevel;

/// Inputs to a share computation for one resting order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelShare {
    /// Incoming volume when the level was reached
    pub incoming: Volume,
    /// This order's remaining volume
    pub volume: Volume,
    /// Volume of this order plus every order queued behind it
    pub trailing: Volume,
    /// Level volume
    pub total: Volume,
}

pub type ShareFn = fn(&LevelShare) -> Volume;

/// floor(incoming * volume / total)
pub fn pure_share(share: &LevelShare) -> Volume {
    if share.total == 0 {
        return 0;
    }
    let numerator = u128::from(share.incoming) * u128::from(share.volume);
    (numerator / u128::from(share.total)) as Volume
}

/// floor(incoming * (v1² - v2²) / total²) with v1 = trailing, v2 = v1 - volume
///
/// Weights over a level telescope to exactly one; earlier queue positions get
/// a larger share than later orders of the same size.
pub fn time_share(share: &LevelShare) -> Volume {
    if share.total == 0 {
        return 0;
    }
    let v1 = u128::from(share.trailing);
    let v2 = v1.saturating_sub(u128::from(share.volume));
    let total = u128::from(share.total);
    let weight = v1 * v1 - v2 * v2;
    let allotted = u128::from(share.incoming).saturating_mul(weight) / (total * total);
    allotted.min(u128::from(share.volume)) as Volume
}

pub(crate) fn allocate_level(
    level: &mut PriceLevel,
    fills: &mut FillSink<'_>,
    incoming: &mut Order,
    share: ShareFn,
) {
    let price = level.price();
    let queue: Vec<(OrderId, Volume)> = level.order_ids().map(|id| (id, fills.volume(id))).collect();
    let total: Volume = queue.iter().map(|(_, volume)| volume).sum();
    let incoming_volume = incoming.volume;

    let mut trailing = total;
    for (resting, volume) in &queue {
        let allotted = if incoming_volume >= total {
            *volume
        } else {
            share(&LevelShare {
                incoming: incoming_volume,
                volume: *volume,
                trailing,
                total,
            })
            .min(*volume)
        };
        trailing -= volume;
        fills.fill(incoming, *resting, allotted, price);
    }

    for (resting, _) in &queue {
        if incoming.volume == 0 {
            break;
        }
        let volume = incoming.volume.min(fills.volume(*resting));
        fills.fill(incoming, *resting, volume, price);
    }

    level.retain(|id| {
        if fills.volume(*id) == 0 {
            fills.retire(*id);
            false
        } else {
            true
        }
    });
}

/// Full priority for the side's last bettering order, if it rests in this level
pub(crate) fn allocate_priority(
    level: &mut PriceLevel,
    fills: &mut FillSink<'_>,
    incoming: &mut Order,
    priority: OrderId,
) {
    if !fills.is_live(priority) || !level.contains(priority) {
        return;
    }
    let volume = incoming.volume.min(fills.volume(priority));
    if fills.fill(incoming, priority, volume, level.price()) == 0 {
        level.remove(priority);
        fills.retire(priority);
    }
}
