//! Self-Trade Prevention (STP).
//!
//! Prevents two orders from the same user matching against each other.
//! Anonymous orders (`UserId::NONE`) always bypass the check. The policy
//! applied to a given pair is the bitwise OR of the taker's and maker's own
//! [`StpMask`](crate::order::StpMask): either side can ask for the taker to
//! be cancelled, the maker to be cancelled, or both.

use crate::order::StpMask;
use crate::plugin::Plugin;
use crate::tracker::Tracker;
use crate::types::CancelReason;

#[derive(Debug, Default)]
pub struct SelfTradePlugin;

impl SelfTradePlugin {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for SelfTradePlugin {
    fn should_trade(
        &mut self,
        taker: &mut Tracker,
        maker: &mut Tracker,
        taker_reason: &mut Option<CancelReason>,
        maker_reason: &mut Option<CancelReason>,
    ) {
        if !taker.user_id().is_some() || taker.user_id() != maker.user_id() {
            return;
        }
        let mask = taker.ptr().stp() | maker.ptr().stp();
        if mask.contains(StpMask::CANCEL_TAKER) {
            *taker_reason = Some(CancelReason::SelfTrade);
        }
        if mask.contains(StpMask::CANCEL_MAKER) {
            *maker_reason = Some(CancelReason::SelfTrade);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderBuilder;
    use crate::types::UserId;

    fn tracker(is_bid: bool, price: f64, qty: f64, user: u64, stp: StpMask) -> Tracker {
        let order = OrderBuilder::new(is_bid, price, qty)
            .user_id(UserId(user))
            .stp(stp)
            .build();
        Tracker::new(std::sync::Arc::new(order))
    }

    #[test]
    fn cancels_taker_when_taker_requests_it() {
        let mut plugin = SelfTradePlugin::new();
        let mut taker = tracker(true, 100.0, 1.0, 7, StpMask::CANCEL_TAKER);
        let mut maker = tracker(false, 100.0, 1.0, 7, StpMask::empty());
        let mut tr = None;
        let mut mr = None;
        plugin.should_trade(&mut taker, &mut maker, &mut tr, &mut mr);
        assert_eq!(tr, Some(CancelReason::SelfTrade));
        assert_eq!(mr, None);
    }

    #[test]
    fn ignores_different_users() {
        let mut plugin = SelfTradePlugin::new();
        let mut taker = tracker(true, 100.0, 1.0, 7, StpMask::CANCEL_BOTH);
        let mut maker = tracker(false, 100.0, 1.0, 8, StpMask::empty());
        let mut tr = None;
        let mut mr = None;
        plugin.should_trade(&mut taker, &mut maker, &mut tr, &mut mr);
        assert_eq!(tr, None);
        assert_eq!(mr, None);
    }

    #[test]
    fn ignores_anonymous_users() {
        let mut plugin = SelfTradePlugin::new();
        let mut taker = tracker(true, 100.0, 1.0, 0, StpMask::CANCEL_BOTH);
        let mut maker = tracker(false, 100.0, 1.0, 0, StpMask::CANCEL_BOTH);
        let mut tr = None;
        let mut mr = None;
        plugin.should_trade(&mut taker, &mut maker, &mut tr, &mut mr);
        assert_eq!(tr, None);
        assert_eq!(mr, None);
    }
}
