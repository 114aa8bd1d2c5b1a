//! Trailing stops: a stop whose trigger price ratchets with favorable market
//! moves and fires on an adverse one.
//!
//! Each tracker carries its own trigger key (`Order::trailing_stop_key`),
//! computed independently per order rather than through a shared per-side
//! cursor: a sell's key only ever tightens upward as the market rises and
//! fires when the market falls back to it; a buy's key mirrors this on the
//! way down. See `DESIGN.md` for why this diverges from a cursor-based
//! scheme.
//!
//! Off-book trackers are bucketed by their current key (`f64::to_bits` as
//! the bucket id) rather than held in one flat list per side, and a
//! `keys` index maps each order id to its current `(side, bucket)`. A
//! cancel looks the id up in that index and only scans the one bucket it
//! names, instead of the whole side — the bucket is typically one or two
//! orders deep even when thousands of trailing stops are resting.

use crate::book::core::BookCore;
use crate::order::Order;
use crate::plugin::Plugin;
use crate::tracker::Tracker;
use crate::types::{CancelReason, OrderId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::trace;

#[derive(Debug, Default)]
pub struct TrailingStopPlugin {
    bid_trailing: HashMap<u64, VecDeque<Tracker>>,
    ask_trailing: HashMap<u64, VecDeque<Tracker>>,
    /// order id -> (is_bid, bucket key bits), kept in sync with the two maps above.
    keys: HashMap<OrderId, (bool, u64)>,
    pending: Vec<Tracker>,
    /// Ids just promoted out of `pending` via `after_add_tracker`, so the
    /// next `should_add_tracker` call for that id (its resubmission) passes
    /// through instead of being diverted off-book a second time.
    promoted: HashSet<OrderId>,
}

impl TrailingStopPlugin {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, is_bid: bool, key: f64, tracker: Tracker) {
        let bits = key.to_bits();
        self.keys.insert(tracker.id(), (is_bid, bits));
        let map = if is_bid { &mut self.bid_trailing } else { &mut self.ask_trailing };
        map.entry(bits).or_default().push_back(tracker);
    }

    /// Drains every bucket of one side into a flat list for ratchet/trigger
    /// processing; callers reinsert survivors via `insert`.
    fn drain_side(map: &mut HashMap<u64, VecDeque<Tracker>>) -> Vec<Tracker> {
        map.drain().flat_map(|(_, bucket)| bucket).collect()
    }
}

impl Plugin for TrailingStopPlugin {
    fn should_add_tracker(&mut self, core: &mut BookCore, taker: Tracker) -> Option<Tracker> {
        if !taker.ptr().has_trailing() {
            return Some(taker);
        }
        if self.promoted.remove(&taker.id()) {
            return Some(taker);
        }
        let market_price = core.market_price();
        let is_bid = taker.is_bid();
        let key = if is_bid {
            market_price + taker.ptr().trailing_amount()
        } else {
            market_price - taker.ptr().trailing_amount()
        };
        taker.ptr().set_trailing_stop_key(key);
        self.insert(is_bid, key, taker);
        None
    }

    fn after_add_tracker(&mut self, core: &mut BookCore) {
        for tracker in self.pending.drain(..) {
            core.queue_resubmission(tracker);
        }
    }

    fn on_market_price_change(&mut self, prev: f64, new_price: f64) {
        if new_price > prev {
            // Favorable for resting sells: tighten each key upward, never past the new price.
            let asks = Self::drain_side(&mut self.ask_trailing);
            for tracker in asks {
                let key = tracker.ptr().trailing_stop_key();
                let candidate = new_price - tracker.ptr().trailing_amount();
                let new_key = if candidate > key {
                    tracker.ptr().set_trailing_stop_key(candidate);
                    candidate
                } else {
                    key
                };
                self.insert(false, new_key, tracker);
            }
            // Adverse for resting buys: fire any whose key the price has now reached.
            let bids = Self::drain_side(&mut self.bid_trailing);
            for tracker in bids {
                if new_price >= tracker.ptr().trailing_stop_key() {
                    trace!("Trailing buy {} triggered, key {}", tracker.id(), tracker.ptr().trailing_stop_key());
                    self.keys.remove(&tracker.id());
                    self.promoted.insert(tracker.id());
                    self.pending.push(tracker);
                } else {
                    let key = tracker.ptr().trailing_stop_key();
                    self.insert(true, key, tracker);
                }
            }
        } else if new_price < prev {
            let bids = Self::drain_side(&mut self.bid_trailing);
            for tracker in bids {
                let key = tracker.ptr().trailing_stop_key();
                let candidate = new_price + tracker.ptr().trailing_amount();
                let new_key = if candidate < key {
                    tracker.ptr().set_trailing_stop_key(candidate);
                    candidate
                } else {
                    key
                };
                self.insert(true, new_key, tracker);
            }
            let asks = Self::drain_side(&mut self.ask_trailing);
            for tracker in asks {
                if new_price <= tracker.ptr().trailing_stop_key() {
                    trace!("Trailing sell {} triggered, key {}", tracker.id(), tracker.ptr().trailing_stop_key());
                    self.keys.remove(&tracker.id());
                    self.promoted.insert(tracker.id());
                    self.pending.push(tracker);
                } else {
                    let key = tracker.ptr().trailing_stop_key();
                    self.insert(false, key, tracker);
                }
            }
        }
    }

    fn cancel(&mut self, order_id: OrderId, _reason: CancelReason) -> Option<Arc<Order>> {
        let (is_bid, bits) = self.keys.remove(&order_id)?;
        let map = if is_bid { &mut self.bid_trailing } else { &mut self.ask_trailing };
        let bucket = map.get_mut(&bits)?;
        let pos = bucket.iter().position(|t| t.id() == order_id)?;
        let tracker = bucket.remove(pos)?;
        if bucket.is_empty() {
            map.remove(&bits);
        }
        Some(tracker.ptr().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderBuilder;

    fn ask_trailing_key(plugin: &TrailingStopPlugin) -> f64 {
        plugin
            .ask_trailing
            .values()
            .next()
            .and_then(|bucket| bucket.front())
            .map(|t| t.ptr().trailing_stop_key())
            .expect("one ask-trailing tracker")
    }

    #[test]
    fn ratchets_up_then_fires_on_pullback() {
        let mut plugin = TrailingStopPlugin::new();
        let mut core = BookCore::new("TEST", 100.0);
        let taker = Tracker::new(Arc::new(
            OrderBuilder::ask(85.0, 10.0).trailing_amount(10.0).build(),
        ));
        let order_id = taker.id();
        assert!(plugin.should_add_tracker(&mut core, taker).is_none());
        assert_eq!(ask_trailing_key(&plugin), 90.0);

        plugin.on_market_price_change(100.0, 110.0);
        assert_eq!(ask_trailing_key(&plugin), 100.0);

        plugin.on_market_price_change(110.0, 100.0);
        plugin.after_add_tracker(&mut core);
        assert!(plugin.ask_trailing.is_empty());
        assert!(plugin.pending.is_empty());
        assert_eq!(plugin.cancel(order_id, CancelReason::UserCancel), None);
    }

    #[test]
    fn a_promoted_tracker_is_not_diverted_again_on_resubmission() {
        let mut plugin = TrailingStopPlugin::new();
        let mut core = BookCore::new("TEST", 100.0);
        let taker = Tracker::new(Arc::new(
            OrderBuilder::ask(85.0, 10.0).trailing_amount(10.0).build(),
        ));
        let order_id = taker.id();
        plugin.should_add_tracker(&mut core, taker);
        plugin.on_market_price_change(100.0, 90.0);
        plugin.after_add_tracker(&mut core);
        assert!(plugin.promoted.contains(&order_id));

        let resubmitted = Tracker::new(Arc::new(
            OrderBuilder::ask(85.0, 10.0)
                .id(order_id)
                .trailing_amount(10.0)
                .build(),
        ));
        assert!(plugin.should_add_tracker(&mut core, resubmitted).is_some());
        assert!(plugin.ask_trailing.is_empty());
        assert!(!plugin.promoted.contains(&order_id));
    }

    #[test]
    fn does_not_fire_on_a_further_favorable_move() {
        let mut plugin = TrailingStopPlugin::new();
        let mut core = BookCore::new("TEST", 100.0);
        let taker = Tracker::new(Arc::new(
            OrderBuilder::ask(85.0, 10.0).trailing_amount(10.0).build(),
        ));
        assert!(plugin.should_add_tracker(&mut core, taker).is_none());
        plugin.on_market_price_change(100.0, 120.0);
        plugin.after_add_tracker(&mut core);
        assert_eq!(plugin.ask_trailing.values().map(VecDeque::len).sum::<usize>(), 1);
        assert!(plugin.pending.is_empty());
    }

    #[test]
    fn two_trackers_that_ratchet_to_the_same_key_share_a_bucket_and_cancel_independently() {
        let mut plugin = TrailingStopPlugin::new();
        let mut core = BookCore::new("TEST", 100.0);
        let first = Tracker::new(Arc::new(
            OrderBuilder::ask(80.0, 5.0).trailing_amount(10.0).build(),
        ));
        let first_id = first.id();
        let second = Tracker::new(Arc::new(
            OrderBuilder::ask(80.0, 5.0).trailing_amount(10.0).build(),
        ));
        let second_id = second.id();
        plugin.should_add_tracker(&mut core, first);
        plugin.should_add_tracker(&mut core, second);
        assert_eq!(plugin.ask_trailing.len(), 1, "both share the same 90.0 key bucket");

        let removed = plugin.cancel(first_id, CancelReason::UserCancel);
        assert_eq!(removed.unwrap().id(), first_id);
        assert_eq!(plugin.ask_trailing.values().map(VecDeque::len).sum::<usize>(), 1);
        assert!(plugin.keys.contains_key(&second_id));
        assert!(!plugin.keys.contains_key(&first_id));
    }
}
