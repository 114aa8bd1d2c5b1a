//! The external, immutable order handle.

use crate::types::{OrderId, UserId};
use bitflags::bitflags;
use std::cell::Cell;

bitflags! {
    /// Self-trade-prevention policy a submitter attaches to an order.
    ///
    /// The combined policy for a potential match is `taker.stp | maker.stp`;
    /// see [`crate::plugins::self_trade`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
    pub struct StpMask: u8 {
        const CANCEL_TAKER = 0b01;
        const CANCEL_MAKER = 0b10;
        const CANCEL_BOTH = 0b11;
    }
}

/// A single order submission. Immutable for its whole life except for
/// `trailing_stop_key`, a scratch slot the trailing-stop plugin uses to
/// locate its own off-book entry for cancel.
#[derive(Debug)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    is_bid: bool,
    price: f64,
    qty: f64,
    funds: f64,
    stop_price: f64,
    trailing_amount: f64,
    post_only: bool,
    reduce_only: bool,
    stp: StpMask,
    trailing_stop_key: Cell<f64>,
}

impl Order {
    #[must_use]
    pub fn id(&self) -> OrderId {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn is_bid(&self) -> bool {
        self.is_bid
    }

    #[must_use]
    pub fn price(&self) -> f64 {
        self.price
    }

    #[must_use]
    pub fn is_market(&self) -> bool {
        self.price == 0.0
    }

    #[must_use]
    pub fn qty(&self) -> f64 {
        self.qty
    }

    #[must_use]
    pub fn funds(&self) -> f64 {
        self.funds
    }

    #[must_use]
    pub fn is_funds_sized(&self) -> bool {
        self.funds > 0.0
    }

    #[must_use]
    pub fn stop_price(&self) -> f64 {
        self.stop_price
    }

    #[must_use]
    pub fn has_stop(&self) -> bool {
        self.stop_price != 0.0
    }

    #[must_use]
    pub fn trailing_amount(&self) -> f64 {
        self.trailing_amount
    }

    #[must_use]
    pub fn has_trailing(&self) -> bool {
        self.trailing_amount > 0.0
    }

    #[must_use]
    pub fn post_only(&self) -> bool {
        self.post_only
    }

    #[must_use]
    pub fn reduce_only(&self) -> bool {
        self.reduce_only
    }

    #[must_use]
    pub fn stp(&self) -> StpMask {
        self.stp
    }

    #[must_use]
    pub fn trailing_stop_key(&self) -> f64 {
        self.trailing_stop_key.get()
    }

    pub fn set_trailing_stop_key(&self, key: f64) {
        self.trailing_stop_key.set(key);
    }

    /// Builds a fresh order carrying the same id, user, side and flags but a
    /// new price/qty. Used by `replace` when a price change forces
    /// cancel-then-add, since price and qty are otherwise immutable.
    #[must_use]
    pub fn with_price_and_qty(&self, price: f64, qty: f64) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            is_bid: self.is_bid,
            price,
            qty,
            funds: 0.0,
            stop_price: 0.0,
            trailing_amount: 0.0,
            post_only: self.post_only,
            reduce_only: self.reduce_only,
            stp: self.stp,
            trailing_stop_key: Cell::new(0.0),
        }
    }
}

/// Fluent constructor for [`Order`]. Every optional attribute defaults to
/// its "not used" value (`0.0` / `false` / empty mask).
#[derive(Debug, Clone)]
pub struct OrderBuilder {
    id: OrderId,
    user_id: UserId,
    is_bid: bool,
    price: f64,
    qty: f64,
    funds: f64,
    stop_price: f64,
    trailing_amount: f64,
    post_only: bool,
    reduce_only: bool,
    stp: StpMask,
}

impl OrderBuilder {
    #[must_use]
    pub fn new(is_bid: bool, price: f64, qty: f64) -> Self {
        Self {
            id: OrderId::new(),
            user_id: UserId::NONE,
            is_bid,
            price,
            qty,
            funds: 0.0,
            stop_price: 0.0,
            trailing_amount: 0.0,
            post_only: false,
            reduce_only: false,
            stp: StpMask::empty(),
        }
    }

    #[must_use]
    pub fn bid(price: f64, qty: f64) -> Self {
        Self::new(true, price, qty)
    }

    #[must_use]
    pub fn ask(price: f64, qty: f64) -> Self {
        Self::new(false, price, qty)
    }

    #[must_use]
    pub fn id(mut self, id: OrderId) -> Self {
        self.id = id;
        self
    }

    #[must_use]
    pub fn user_id(mut self, user_id: UserId) -> Self {
        self.user_id = user_id;
        self
    }

    #[must_use]
    pub fn funds(mut self, funds: f64) -> Self {
        self.funds = funds;
        self
    }

    #[must_use]
    pub fn stop_price(mut self, stop_price: f64) -> Self {
        self.stop_price = stop_price;
        self
    }

    #[must_use]
    pub fn trailing_amount(mut self, trailing_amount: f64) -> Self {
        self.trailing_amount = trailing_amount;
        self
    }

    #[must_use]
    pub fn post_only(mut self, post_only: bool) -> Self {
        self.post_only = post_only;
        self
    }

    #[must_use]
    pub fn reduce_only(mut self, reduce_only: bool) -> Self {
        self.reduce_only = reduce_only;
        self
    }

    #[must_use]
    pub fn stp(mut self, stp: StpMask) -> Self {
        self.stp = stp;
        self
    }

    #[must_use]
    pub fn build(self) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            is_bid: self.is_bid,
            price: self.price,
            qty: self.qty,
            funds: self.funds,
            stop_price: self.stop_price,
            trailing_amount: self.trailing_amount,
            post_only: self.post_only,
            reduce_only: self.reduce_only,
            stp: self.stp,
            trailing_stop_key: Cell::new(0.0),
        }
    }

    /// Builds the order, rejecting a non-default self-trade-policy mask
    /// paired with the reserved "no identity" user id — STP cannot key
    /// "the same user" off nothing.
    ///
    /// # Errors
    /// Returns [`crate::error::OrderBookError::MissingUserId`] in that case.
    pub fn try_build(self) -> Result<Order, crate::error::OrderBookError> {
        if !self.stp.is_empty() && self.user_id == UserId::NONE {
            return Err(crate::error::OrderBookError::MissingUserId { order_id: self.id });
        }
        Ok(self.build())
    }
}
