//! The per-order stateful wrapper that lives on (or briefly off) the book.

use crate::constants::{round_down, MIN_ORDER_FUNDS, MIN_ORDER_QTY, TRADE_QTY_INCREMENT};
use crate::order::Order;
use crate::types::{OrderId, Side, UserId};
use std::sync::Arc;

/// Error raised by [`Tracker::reduce_qty`] when the requested reduction
/// would leave a non-zero residual below `MIN_ORDER_QTY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QtyTooSmall;

/// Owns one order handle plus the mutable residual state the book and
/// plugins mutate as the order is matched, shrunk, or replaced.
#[derive(Debug)]
pub struct Tracker {
    order: Arc<Order>,
    open_qty: f64,
    open_funds: f64,
    filled_qty: f64,
    filled_funds: f64,
}

impl Tracker {
    #[must_use]
    pub fn new(order: Arc<Order>) -> Self {
        let qty = order.qty();
        let funds = order.funds();
        Self {
            order,
            open_qty: qty,
            open_funds: funds,
            filled_qty: 0.0,
            filled_funds: 0.0,
        }
    }

    #[must_use]
    pub fn ptr(&self) -> &Arc<Order> {
        &self.order
    }

    #[must_use]
    pub fn id(&self) -> OrderId {
        self.order.id()
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.order.user_id()
    }

    #[must_use]
    pub fn is_bid(&self) -> bool {
        self.order.is_bid()
    }

    #[must_use]
    pub fn side(&self) -> Side {
        Side::from_is_bid(self.order.is_bid())
    }

    #[must_use]
    pub fn price(&self) -> f64 {
        self.order.price()
    }

    #[must_use]
    pub fn is_market(&self) -> bool {
        self.order.is_market()
    }

    #[must_use]
    pub fn open_qty(&self) -> f64 {
        self.open_qty
    }

    #[must_use]
    pub fn open_funds(&self) -> f64 {
        self.open_funds
    }

    #[must_use]
    pub fn filled_qty(&self) -> f64 {
        self.filled_qty
    }

    #[must_use]
    pub fn filled_funds(&self) -> f64 {
        self.filled_funds
    }

    /// Quantity "still on the book" for depth-reporting purposes.
    #[must_use]
    pub fn qty_on_book(&self) -> f64 {
        self.open_qty
    }

    /// Whether this tracker has nothing left to fill.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        if self.order.is_funds_sized() {
            self.open_funds <= MIN_ORDER_FUNDS
        } else {
            self.open_qty <= MIN_ORDER_QTY
        }
    }

    /// The quantity this tracker can still trade against a counterparty
    /// quoted at `counter_price`, rounded down to `TRADE_QTY_INCREMENT`.
    #[must_use]
    pub fn tradable_qty(&self, counter_price: f64) -> f64 {
        if self.order.is_funds_sized() {
            if counter_price <= 0.0 {
                return 0.0;
            }
            round_down(self.open_funds / counter_price, TRADE_QTY_INCREMENT)
        } else {
            round_down(self.open_qty, TRADE_QTY_INCREMENT)
        }
    }

    /// Applies an executed fill of `qty` at `price` to this tracker.
    pub fn fill(&mut self, qty: f64, price: f64) {
        let notional = qty * price;
        self.filled_qty += qty;
        self.filled_funds += notional;
        if self.order.is_funds_sized() {
            self.open_funds = (self.open_funds - notional).max(0.0);
        } else {
            self.open_qty = (self.open_qty - qty).max(0.0);
        }
    }

    /// Reduces `open_qty` by `delta` (negative shrinks, positive grows).
    /// Fails if the result would be negative, or positive-but-dust.
    pub fn reduce_qty(&mut self, delta: f64) -> Result<f64, QtyTooSmall> {
        let new_qty = self.open_qty + delta;
        if new_qty < -MIN_ORDER_QTY {
            return Err(QtyTooSmall);
        }
        if new_qty > MIN_ORDER_QTY * 0.5 && new_qty < MIN_ORDER_QTY {
            return Err(QtyTooSmall);
        }
        self.open_qty = new_qty.max(0.0);
        Ok(self.open_qty)
    }
}
