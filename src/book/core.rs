//! The two price-ordered maps, the market price, and the plumbing plugins
//! need to reach into them. Kept separate from [`super::engine::OrderBook`]
//! so that plugin hooks can borrow this struct while the book's `plugins`
//! vector is borrowed disjointly for the fan-out loop.

use crate::callback::{Callback, CallbackQueue};
use crate::price::PriceKey;
use crate::tracker::Tracker;
use crate::types::{CancelReason, CancelRejectReason, OrderId, Side};
use std::collections::{BTreeMap, HashMap, VecDeque};

pub type Book = BTreeMap<PriceKey, VecDeque<Tracker>>;

#[derive(Debug)]
pub struct BookCore {
    symbol: String,
    bids: Book,
    asks: Book,
    order_index: HashMap<OrderId, (PriceKey, Side)>,
    market_price: f64,
    callbacks: CallbackQueue,
    resubmit_queue: VecDeque<Tracker>,
}

impl BookCore {
    #[must_use]
    pub fn new(symbol: impl Into<String>, initial_market_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            order_index: HashMap::new(),
            market_price: initial_market_price,
            callbacks: CallbackQueue::new(),
            resubmit_queue: VecDeque::new(),
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn market_price(&self) -> f64 {
        self.market_price
    }

    #[must_use]
    pub fn bids(&self) -> &Book {
        &self.bids
    }

    #[must_use]
    pub fn asks(&self) -> &Book {
        &self.asks
    }

    pub(crate) fn side_map(&self, side: Side) -> &Book {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    pub(crate) fn side_map_mut(&mut self, side: Side) -> &mut Book {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    pub(crate) fn opposite_mut(&mut self, side: Side) -> &mut Book {
        match side {
            Side::Bid => &mut self.asks,
            Side::Ask => &mut self.bids,
        }
    }

    pub(crate) fn set_market_price_raw(&mut self, price: f64) {
        self.market_price = price;
    }

    pub fn push_callback(&mut self, callback: Callback) {
        self.callbacks.push(callback);
    }

    pub fn drain_callbacks(&mut self) -> Vec<Callback> {
        self.callbacks.drain()
    }

    /// Feeds a triggered tracker into the shared resubmission queue. Drained
    /// iteratively by the top-level call, never recursively, so cascades
    /// stay reentrancy-safe.
    pub fn queue_resubmission(&mut self, tracker: Tracker) {
        self.resubmit_queue.push_back(tracker);
    }

    pub(crate) fn pop_resubmission(&mut self) -> Option<Tracker> {
        self.resubmit_queue.pop_front()
    }

    /// Inserts a tracker at `key` on `side`, recording it in the order index.
    pub(crate) fn insert_on_book(&mut self, side: Side, key: PriceKey, tracker: Tracker) {
        self.order_index.insert(tracker.id(), (key, side));
        self.side_map_mut(side).entry(key).or_default().push_back(tracker);
    }

    /// Removes a tracker from whichever on-book bucket the index says it's in.
    pub(crate) fn remove_on_book(&mut self, order_id: OrderId) -> Option<Tracker> {
        let (key, side) = self.order_index.remove(&order_id)?;
        let map = self.side_map_mut(side);
        let bucket = map.get_mut(&key)?;
        let pos = bucket.iter().position(|t| t.id() == order_id)?;
        let tracker = bucket.remove(pos);
        if bucket.is_empty() {
            map.remove(&key);
        }
        tracker
    }

    /// Looks up the order index entry for `order_id` without removing it.
    pub(crate) fn locate(&self, order_id: OrderId) -> Option<(PriceKey, Side)> {
        self.order_index.get(&order_id).copied()
    }

    /// Fetches a clone of the resting order handle for `order_id`, if any.
    pub(crate) fn find_order_ptr(&self, order_id: OrderId) -> Option<std::sync::Arc<crate::order::Order>> {
        let (key, side) = self.locate(order_id)?;
        self.side_map(side)
            .get(&key)?
            .iter()
            .find(|t| t.id() == order_id)
            .map(|t| t.ptr().clone())
    }

    /// Removes an on-book order and emits its cancel callback. Returns
    /// `true` if the order was found.
    pub fn cancel_on_book(&mut self, order_id: OrderId, reason: CancelReason) -> bool {
        match self.remove_on_book(order_id) {
            Some(tracker) => {
                self.push_callback(Callback::Cancel {
                    order: tracker.ptr().clone(),
                    reason,
                });
                true
            }
            None => false,
        }
    }

    /// Every resting tracker across both sides, in no particular order.
    /// Used by plugins that need to scan the whole book (e.g. cancelling a
    /// user's resting orders on position close); no latency guarantee is
    /// made here, so an O(n) scan is acceptable.
    pub fn all_trackers(&self) -> impl Iterator<Item = &Tracker> {
        self.bids
            .values()
            .chain(self.asks.values())
            .flat_map(|bucket| bucket.iter())
    }

    pub fn cancel_reject_not_found(&mut self, order_id: OrderId) {
        self.push_callback(Callback::CancelReject {
            order_id,
            reason: CancelRejectReason::CancelRejectNotFound,
        });
    }
}
