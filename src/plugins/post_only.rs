//! Post-only orders: cancelled rather than allowed to take any liquidity.
//!
//! The check runs in `should_trade`, ahead of every fill computation in the
//! cross loop, so a post-only taker is cancelled before it can ever be
//! partially filled.

use crate::plugin::Plugin;
use crate::tracker::Tracker;
use crate::types::CancelReason;

#[derive(Debug, Default)]
pub struct PostOnlyPlugin;

impl PostOnlyPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for PostOnlyPlugin {
    fn should_trade(
        &mut self,
        taker: &mut Tracker,
        _maker: &mut Tracker,
        taker_reason: &mut Option<CancelReason>,
        _maker_reason: &mut Option<CancelReason>,
    ) {
        if taker.ptr().post_only() {
            *taker_reason = Some(CancelReason::PostOnly);
        }
    }
}
