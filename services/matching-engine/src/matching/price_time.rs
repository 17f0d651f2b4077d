//! Strict FIFO allocation within a level

use venue_types::order::Order;

use super::executor::FillSink;
use crate::book::PriceLevel;

/// The head of the level absorbs as much as it can, then the next one
pub(crate) fn allocate_level(level: &mut PriceLevel, fills: &mut FillSink<'_>, incoming: &mut Order) {
    let price = level.price();
    while incoming.volume > 0 {
        let Some(resting) = level.front() else {
            break;
        };
        let volume = incoming.volume.min(fills.volume(resting));
        if fills.fill(incoming, resting, volume, price) == 0 {
            level.pop_front();
            fills.retire(resting);
        }
    }
}
