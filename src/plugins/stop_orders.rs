//! Stop orders: held off-book until the market price crosses a trigger,
//! then admitted as a plain order.
//!
//! A stop that is already past its trigger at submission time is admitted
//! directly and silently — it never visits the off-book container, so no
//! spurious `StopTrigger` callback is emitted for it.

use crate::book::core::BookCore;
use crate::order::Order;
use crate::plugin::Plugin;
use crate::tracker::Tracker;
use crate::types::{CancelReason, OrderId};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Default)]
pub struct StopOrdersPlugin {
    bid_stops: Vec<Tracker>,
    ask_stops: Vec<Tracker>,
    pending: Vec<Tracker>,
}

impl StopOrdersPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Plugin for StopOrdersPlugin {
    fn should_add_tracker(&mut self, core: &mut BookCore, taker: Tracker) -> Option<Tracker> {
        if !taker.ptr().has_stop() || taker.ptr().has_trailing() {
            return Some(taker);
        }
        let market_price = core.market_price();
        let already_triggered = if taker.is_bid() {
            market_price >= taker.ptr().stop_price()
        } else {
            market_price <= taker.ptr().stop_price()
        };
        if already_triggered {
            return Some(taker);
        }
        trace!("Diverting order {} to stop container at {}", taker.id(), taker.ptr().stop_price());
        if taker.is_bid() {
            self.bid_stops.push(taker);
        } else {
            self.ask_stops.push(taker);
        }
        None
    }

    fn after_add_tracker(&mut self, core: &mut BookCore) {
        for tracker in self.pending.drain(..) {
            core.queue_resubmission(tracker);
        }
    }

    fn on_market_price_change(&mut self, _prev: f64, new_price: f64) {
        let bids = std::mem::take(&mut self.bid_stops);
        for tracker in bids {
            if new_price >= tracker.ptr().stop_price() {
                trace!("Buy stop {} triggered at market price {}", tracker.id(), new_price);
                self.pending.push(tracker);
            } else {
                self.bid_stops.push(tracker);
            }
        }
        let asks = std::mem::take(&mut self.ask_stops);
        for tracker in asks {
            if new_price <= tracker.ptr().stop_price() {
                trace!("Sell stop {} triggered at market price {}", tracker.id(), new_price);
                self.pending.push(tracker);
            } else {
                self.ask_stops.push(tracker);
            }
        }
    }

    fn cancel(&mut self, order_id: OrderId, _reason: CancelReason) -> Option<Arc<Order>> {
        if let Some(pos) = self.bid_stops.iter().position(|t| t.id() == order_id) {
            return Some(self.bid_stops.remove(pos).ptr().clone());
        }
        if let Some(pos) = self.ask_stops.iter().position(|t| t.id() == order_id) {
            return Some(self.ask_stops.remove(pos).ptr().clone());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderBuilder;

    #[test]
    fn holds_a_buy_stop_until_price_rises_to_trigger() {
        let mut plugin = StopOrdersPlugin::new();
        let mut core = BookCore::new("TEST", 100.0);
        let taker = Tracker::new(std::sync::Arc::new(
            OrderBuilder::bid(0.0, 1.0).stop_price(110.0).build(),
        ));
        let order_id = taker.id();
        assert!(plugin.should_add_tracker(&mut core, taker).is_none());

        plugin.on_market_price_change(100.0, 105.0);
        plugin.after_add_tracker(&mut core);
        assert!(core.all_trackers().next().is_none());

        plugin.on_market_price_change(105.0, 110.0);
        plugin.after_add_tracker(&mut core);
        assert_eq!(plugin.cancel(order_id, CancelReason::UserCancel), None);
    }

    #[test]
    fn admits_an_already_triggered_stop_directly() {
        let mut plugin = StopOrdersPlugin::new();
        let mut core = BookCore::new("TEST", 120.0);
        let taker = Tracker::new(std::sync::Arc::new(
            OrderBuilder::bid(0.0, 1.0).stop_price(110.0).build(),
        ));
        assert!(plugin.should_add_tracker(&mut core, taker).is_some());
    }
}
