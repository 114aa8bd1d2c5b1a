//! The ordered batch of effect records produced by one top-level call.

use crate::order::Order;
use crate::types::{CancelReason, CancelRejectReason, InsertRejectReason, OrderId, ReplaceRejectReason};
use std::sync::Arc;

/// A single observable effect. Order of emission within one top-level call
/// always follows the order effects occurred: accept before trade, trade
/// before fill, fill before any stop-trigger cascade.
#[derive(Debug, Clone)]
pub enum Callback {
    Accept {
        order: Arc<Order>,
    },
    Reject {
        order: Arc<Order>,
        reason: InsertRejectReason,
    },
    Cancel {
        order: Arc<Order>,
        reason: CancelReason,
    },
    CancelReject {
        order_id: OrderId,
        reason: CancelRejectReason,
    },
    Replace {
        order: Arc<Order>,
    },
    ReplaceReject {
        order_id: OrderId,
        reason: ReplaceRejectReason,
    },
    Trade {
        price: f64,
        qty: f64,
        maker_order_id: OrderId,
        taker_order_id: OrderId,
    },
    Fill {
        order: Arc<Order>,
        fill_qty: f64,
        fill_funds: f64,
    },
    StopTrigger {
        order: Arc<Order>,
    },
}

/// Per-call accumulator, drained at the call boundary.
#[derive(Debug, Default)]
pub struct CallbackQueue {
    items: Vec<Callback>,
}

impl CallbackQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, callback: Callback) {
        self.items.push(callback);
    }

    /// Drains the queue into a `Vec`, leaving it empty for the next call.
    pub fn drain(&mut self) -> Vec<Callback> {
        std::mem::take(&mut self.items)
    }
}
