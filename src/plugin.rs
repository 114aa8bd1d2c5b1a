//! The admission/trade policy pipeline.
//!
//! Every [`Plugin`] hook has a default no-op implementation, so a concrete
//! plugin only overrides the hooks it actually cares about. The fan-out and
//! short-circuit rules for each hook are documented on the hook itself below
//! and enforced centrally by the engine that calls across the plugin vector.

use crate::book::core::BookCore;
use crate::tracker::Tracker;
use crate::types::{CancelReason, InsertRejectReason, OrderId};
use std::sync::Arc;

/// A single admission/trade policy.
///
/// Hooks that only ever need to mutate the trackers passed by reference, or
/// their own private off-book containers, do not take a `core` parameter —
/// none of the stock plugins need book-wide access there. Only
/// `should_add_tracker`, `after_add_tracker`, and `on_position_close` touch
/// the resting book or the resubmission queue, so only those take
/// `&mut BookCore`.
pub trait Plugin: std::fmt::Debug + Send {
    /// First pass over a new order, before a `Tracker` is even built.
    /// The first plugin to return anything other than the "no objection"
    /// sentinel wins; later plugins are not consulted.
    fn should_add(&mut self, _core: &BookCore, _taker: &Tracker) -> InsertRejectReason {
        InsertRejectReason::InsertRejectNoReason
    }

    /// Gives each plugin a chance to divert the taker off-book entirely
    /// (stop orders, trailing stops) before it ever reaches the cross loop.
    /// `Some` passes the tracker through to the next plugin (and eventually
    /// to matching); `None` means this plugin has taken ownership.
    fn should_add_tracker(&mut self, _core: &mut BookCore, taker: Tracker) -> Option<Tracker> {
        Some(taker)
    }

    /// Runs after a tracker has been admitted (whether it matched, rested,
    /// or was diverted). Plugins that diverted a tracker drain their own
    /// pending queue into `core`'s resubmission queue here.
    fn after_add_tracker(&mut self, _core: &mut BookCore) {}

    /// Consulted for every candidate (taker, maker) pair in the cross loop.
    /// Every plugin runs (no short-circuit); reasons accumulate and the
    /// engine cancels whichever side(s) ended up with a reason set.
    fn should_trade(
        &mut self,
        _taker: &mut Tracker,
        _maker: &mut Tracker,
        _taker_reason: &mut Option<CancelReason>,
        _maker_reason: &mut Option<CancelReason>,
    ) {
    }

    /// Fan-out notification after a trade has been applied to both trackers.
    fn after_trade(&mut self, _taker: &Tracker, _maker: &Tracker, _qty: f64, _price: f64) {}

    /// Fan-out notification whenever the last-trade price changes.
    fn on_market_price_change(&mut self, _prev: f64, _new: f64) {}

    /// Fan-out cleanup hook for an external cancel request. Every plugin is
    /// asked in turn (no short-circuit, so every off-book container gets a
    /// chance); a plugin that finds and removes the order in its own
    /// container returns it so the engine can emit the `Cancel` callback.
    fn cancel(&mut self, _order_id: OrderId, _reason: CancelReason) -> Option<Arc<crate::order::Order>> {
        None
    }

    /// Notification that a user's position has returned to flat, used by
    /// the reduce-only plugin to drop any per-user state it was tracking.
    fn on_position_close(&mut self, _core: &mut BookCore, _user_id: crate::types::UserId) {}
}
