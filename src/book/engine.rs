//! The public order book: owns the resting price levels and the configured
//! plugin pipeline, and turns submissions into a batch of callbacks.

use crate::book::core::BookCore;
use crate::callback::Callback;
use crate::constants::{round_down, MIN_ORDER_QTY, TRADE_QTY_INCREMENT};
use crate::order::Order;
use crate::plugin::Plugin;
use crate::price::PriceKey;
use crate::tracker::Tracker;
use crate::types::{CancelReason, InsertRejectReason, OrderId, ReplaceRejectReason};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A single-symbol limit order book with a pluggable admission/trade policy
/// pipeline. `plugins` and `core` are separate fields so hooks that need
/// `&mut BookCore` can be fanned out over while a sibling field is iterated,
/// without the borrow checker needing to see through a method call.
#[derive(Debug)]
pub struct OrderBook {
    core: BookCore,
    plugins: Vec<Box<dyn Plugin>>,
}

impl OrderBook {
    #[must_use]
    pub fn new(symbol: impl Into<String>, initial_market_price: f64, plugins: Vec<Box<dyn Plugin>>) -> Self {
        Self {
            core: BookCore::new(symbol, initial_market_price),
            plugins,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        self.core.symbol()
    }

    #[must_use]
    pub fn market_price(&self) -> f64 {
        self.core.market_price()
    }

    #[must_use]
    pub fn bids(&self) -> &crate::book::core::Book {
        self.core.bids()
    }

    #[must_use]
    pub fn asks(&self) -> &crate::book::core::Book {
        self.core.asks()
    }

    /// Submits a new order. Returns every callback produced by this call,
    /// including any cascaded stop/trailing-stop triggers.
    pub fn add(&mut self, order: Order) -> Vec<Callback> {
        trace!(
            "Admitting order {} {} {} {} on {}",
            order.id(),
            order.is_bid(),
            order.price(),
            order.qty(),
            self.core.symbol()
        );
        let order = Arc::new(order);
        let tracker = Tracker::new(order.clone());
        let reject = self
            .plugins
            .iter_mut()
            .map(|p| p.should_add(&self.core, &tracker))
            .find(|r| *r != InsertRejectReason::InsertRejectNoReason);
        if let Some(reason) = reject {
            debug!("Order {} rejected at admission: {:?}", order.id(), reason);
            self.core.push_callback(Callback::Reject { order, reason });
            return self.core.drain_callbacks();
        }
        self.admit_and_match(tracker, true);
        self.drain_resubmissions();
        self.core.drain_callbacks()
    }

    /// Cancels a resting or plugin-held order.
    pub fn cancel(&mut self, order_id: OrderId, reason: CancelReason) -> Vec<Callback> {
        trace!("Cancelling order {} ({:?})", order_id, reason);
        if self.core.cancel_on_book(order_id, reason) {
            for p in self.plugins.iter_mut() {
                let _ = p.cancel(order_id, reason);
            }
            return self.core.drain_callbacks();
        }
        let mut claimed: Option<Arc<Order>> = None;
        for p in self.plugins.iter_mut() {
            if let Some(order) = p.cancel(order_id, reason) {
                if claimed.is_none() {
                    claimed = Some(order);
                }
            }
        }
        match claimed {
            Some(order) => self.core.push_callback(Callback::Cancel { order, reason }),
            None => {
                debug!("Cancel rejected, order {} not found", order_id);
                self.core.cancel_reject_not_found(order_id);
            }
        }
        self.core.drain_callbacks()
    }

    /// Adjusts a resting order's quantity (`delta_qty`, negative to shrink)
    /// and optionally its price. A price change always cancels the old
    /// order and re-admits a fresh one (so it can cross); a quantity-only
    /// change mutates the resting tracker in place, preserving its FIFO
    /// position.
    pub fn replace(&mut self, order_id: OrderId, new_price: Option<f64>, delta_qty: f64) -> Vec<Callback> {
        trace!("Replacing order {} delta_qty={} new_price={:?}", order_id, delta_qty, new_price);
        let Some((key, side)) = self.core.locate(order_id) else {
            debug!("Replace rejected, order {} not found", order_id);
            self.core.push_callback(Callback::ReplaceReject {
                order_id,
                reason: ReplaceRejectReason::ReplaceRejectNotFound,
            });
            return self.core.drain_callbacks();
        };

        let reprice = new_price.filter(|p| *p != key.price());

        if reprice.is_none() {
            let current_qty = self
                .core
                .side_map(side)
                .get(&key)
                .and_then(|bucket| bucket.iter().find(|t| t.id() == order_id))
                .map(Tracker::open_qty);
            let Some(current_qty) = current_qty else {
                self.core.push_callback(Callback::ReplaceReject {
                    order_id,
                    reason: ReplaceRejectReason::ReplaceRejectNotFound,
                });
                return self.core.drain_callbacks();
            };
            if current_qty + delta_qty <= MIN_ORDER_QTY {
                self.core.cancel_on_book(order_id, CancelReason::ReplacedAllQty);
            } else {
                if let Some(bucket) = self.core.side_map_mut(side).get_mut(&key) {
                    if let Some(tracker) = bucket.iter_mut().find(|t| t.id() == order_id) {
                        let _ = tracker.reduce_qty(delta_qty);
                    }
                }
                if let Some(order) = self.core.find_order_ptr(order_id) {
                    self.core.push_callback(Callback::Replace { order });
                }
            }
            return self.core.drain_callbacks();
        }

        let new_price = reprice.expect("checked above");
        let Some(old_tracker) = self.core.remove_on_book(order_id) else {
            self.core.push_callback(Callback::ReplaceReject {
                order_id,
                reason: ReplaceRejectReason::ReplaceRejectNotFound,
            });
            return self.core.drain_callbacks();
        };
        let new_qty = old_tracker.open_qty() + delta_qty;
        if new_qty <= MIN_ORDER_QTY {
            self.core.push_callback(Callback::Cancel {
                order: old_tracker.ptr().clone(),
                reason: CancelReason::ReplacedAllQty,
            });
        } else {
            let new_order = Arc::new(old_tracker.ptr().with_price_and_qty(new_price, new_qty));
            self.core.push_callback(Callback::Replace { order: new_order.clone() });
            let new_tracker = Tracker::new(new_order);
            self.admit_and_match(new_tracker, false);
            self.drain_resubmissions();
        }
        self.core.drain_callbacks()
    }

    /// Feeds an external market-price update (e.g. from an index or mark
    /// price oracle) through the plugin pipeline without any trade of its
    /// own. Used to drive stop/trailing-stop triggers off a feed instead of
    /// this book's own tape.
    pub fn set_market_price(&mut self, new_price: f64) -> Vec<Callback> {
        let prev = self.core.market_price();
        if prev != new_price {
            debug!("Market price moved {} -> {} on {}", prev, new_price, self.core.symbol());
            self.core.set_market_price_raw(new_price);
            for p in self.plugins.iter_mut() {
                p.on_market_price_change(prev, new_price);
            }
            for p in self.plugins.iter_mut() {
                p.after_add_tracker(&mut self.core);
            }
            self.drain_resubmissions();
        }
        self.core.drain_callbacks()
    }

    /// Notifies every plugin that `user_id`'s position has returned to flat.
    /// The positions provider backing the reduce-only plugin calls this
    /// (outside the book) whenever a fill elsewhere closes a position; the
    /// reduce-only plugin reacts by cancelling that user's resting
    /// reduce-only orders.
    pub fn notify_position_close(&mut self, user_id: crate::types::UserId) -> Vec<Callback> {
        debug!("Position close notification for user {}", user_id);
        for p in self.plugins.iter_mut() {
            p.on_position_close(&mut self.core, user_id);
        }
        self.core.drain_callbacks()
    }

    /// Admits a tracker: runs the divert fold, crosses it against the book,
    /// rests any residual, then fans out `after_add_tracker` so diverting
    /// plugins can feed the resubmission queue.
    ///
    /// `emit_accept` gates the `Callback::Accept` push: it only fires on the
    /// branch where no plugin diverted the tracker off-book (a stop or
    /// trailing-stop that's just been parked emits nothing until it later
    /// triggers). Callers that have their own accept-adjacent callback
    /// (`replace`'s `Callback::Replace`) pass `false`.
    fn admit_and_match(&mut self, taker: Tracker, emit_accept: bool) {
        let mut taker_opt = Some(taker);
        for p in self.plugins.iter_mut() {
            match taker_opt {
                Some(t) => taker_opt = p.should_add_tracker(&mut self.core, t),
                None => break,
            }
        }
        if let Some(mut taker) = taker_opt {
            if emit_accept {
                self.core.push_callback(Callback::Accept { order: taker.ptr().clone() });
            }
            self.cross(&mut taker);
            if !taker.is_filled() {
                if taker.is_market() {
                    warn!("Market order {} cancelled, no liquidity on {}", taker.id(), self.core.symbol());
                    let order = taker.ptr().clone();
                    self.core.push_callback(Callback::Cancel {
                        order,
                        reason: CancelReason::NoLiquidity,
                    });
                } else {
                    let key = PriceKey::new(taker.is_bid(), taker.price());
                    let side = taker.side();
                    self.core.insert_on_book(side, key, taker);
                }
            }
        }
        for p in self.plugins.iter_mut() {
            p.after_add_tracker(&mut self.core);
        }
    }

    /// Drains stop/trailing-stop triggers queued during the last admission,
    /// re-admitting each one and emitting its `StopTrigger` callback. Not
    /// recursive: triggers raised while draining are appended to the same
    /// queue and picked up by a later iteration of this loop.
    fn drain_resubmissions(&mut self) {
        while let Some(tracker) = self.core.pop_resubmission() {
            let order_ref = tracker.ptr().clone();
            debug!("Promoting triggered order {} back through admission", order_ref.id());
            self.admit_and_match(tracker, true);
            self.core.push_callback(Callback::StopTrigger { order: order_ref });
        }
    }

    /// The matching loop: repeatedly peeks the best resting order on the
    /// opposite side, consults `should_trade`, and either trades, cancels
    /// the maker, cancels the taker, or stops (taker's residual is too
    /// small to clear the current best price).
    fn cross(&mut self, taker: &mut Tracker) {
        let opposite_side = taker.side().opposite();
        loop {
            if taker.is_filled() {
                break;
            }
            let Some(key) = self.core.side_map(opposite_side).keys().next().copied() else {
                break;
            };
            if !taker.is_market() && !key.matches(taker.price()) {
                break;
            }

            let mut taker_reason: Option<CancelReason> = None;
            let mut maker_reason: Option<CancelReason> = None;
            let mut maker_id = OrderId::default();
            let mut traded: Option<(f64, f64, Arc<Order>, bool)> = None;

            {
                let Some(bucket) = self.core.side_map_mut(opposite_side).get_mut(&key) else {
                    break;
                };
                let Some(maker) = bucket.front_mut() else {
                    break;
                };
                maker_id = maker.id();
                for p in self.plugins.iter_mut() {
                    p.should_trade(taker, maker, &mut taker_reason, &mut maker_reason);
                }
                if taker_reason.is_none() && maker_reason.is_none() {
                    let trade_price = key.price();
                    let q = round_down(
                        taker.tradable_qty(trade_price).min(maker.open_qty()),
                        TRADE_QTY_INCREMENT,
                    );
                    if q > MIN_ORDER_QTY {
                        taker.fill(q, trade_price);
                        maker.fill(q, trade_price);
                        let maker_filled = maker.is_filled();
                        let maker_ptr = maker.ptr().clone();
                        for p in self.plugins.iter_mut() {
                            p.after_trade(taker, maker, q, trade_price);
                        }
                        traded = Some((q, trade_price, maker_ptr, maker_filled));
                    }
                }
            }

            if let Some(reason) = taker_reason {
                debug!("Taker {} cancelled mid-cross: {:?}", taker.id(), reason);
                let order = taker.ptr().clone();
                self.core.push_callback(Callback::Cancel { order, reason });
                return;
            }
            if let Some(reason) = maker_reason {
                debug!("Maker {} dropped mid-cross: {:?}", maker_id, reason);
                if let Some(maker) = self.core.remove_on_book(maker_id) {
                    self.core.push_callback(Callback::Cancel {
                        order: maker.ptr().clone(),
                        reason,
                    });
                }
                continue;
            }

            match traded {
                Some((q, price, maker_ptr, maker_filled)) => {
                    trace!("Trade {} @ {} (taker {} / maker {})", q, price, taker.id(), maker_id);
                    self.core.push_callback(Callback::Trade {
                        price,
                        qty: q,
                        maker_order_id: maker_id,
                        taker_order_id: taker.id(),
                    });
                    self.core.push_callback(Callback::Fill {
                        order: taker.ptr().clone(),
                        fill_qty: q,
                        fill_funds: q * price,
                    });
                    self.core.push_callback(Callback::Fill {
                        order: maker_ptr,
                        fill_qty: q,
                        fill_funds: q * price,
                    });
                    if maker_filled {
                        self.core.remove_on_book(maker_id);
                    }
                    let prev = self.core.market_price();
                    if prev != price {
                        self.core.set_market_price_raw(price);
                        for p in self.plugins.iter_mut() {
                            p.on_market_price_change(prev, price);
                        }
                    }
                }
                None => break,
            }
        }
    }
}
