//! Reduce-only orders: restricted to shrinking an existing position, never
//! growing or flipping it.
//!
//! Position state itself is not owned by this plugin — it is supplied by
//! the host through [`PositionsProvider`], since the book has no notion of
//! a user's aggregate position across symbols or venues.

use crate::book::core::BookCore;
use crate::constants::MIN_ORDER_QTY;
use crate::plugin::Plugin;
use crate::tracker::Tracker;
use crate::types::{CancelReason, InsertRejectReason, UserId};
use tracing::debug;

/// A user's current net position on this symbol. Positive is long,
/// negative is short, zero is flat.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub qty: f64,
}

/// Supplies the reduce-only plugin with a user's current position.
pub trait PositionsProvider: std::fmt::Debug + Send {
    fn get_position(&self, user_id: UserId) -> Option<Position>;
}

#[derive(Debug)]
pub struct ReduceOnlyPlugin {
    positions: Box<dyn PositionsProvider>,
}

impl ReduceOnlyPlugin {
    #[must_use]
    pub fn new(positions: Box<dyn PositionsProvider>) -> Self {
        Self { positions }
    }

    fn remaining_reducible(&self, user_id: UserId) -> f64 {
        self.positions
            .get_position(user_id)
            .map(|p| p.qty.abs())
            .unwrap_or(0.0)
    }
}

impl Plugin for ReduceOnlyPlugin {
    fn should_add(&mut self, _core: &BookCore, taker: &Tracker) -> InsertRejectReason {
        let order = taker.ptr();
        if !order.reduce_only() {
            return InsertRejectReason::InsertRejectNoReason;
        }
        let position_qty = self
            .positions
            .get_position(taker.user_id())
            .map(|p| p.qty)
            .unwrap_or(0.0);
        let would_reduce = if taker.is_bid() { position_qty < 0.0 } else { position_qty > 0.0 };
        if !would_reduce {
            return InsertRejectReason::ReduceOnlyIncrease;
        }
        if taker.open_qty() > position_qty.abs() {
            return InsertRejectReason::ReduceOnlyReverse;
        }
        InsertRejectReason::InsertRejectNoReason
    }

    fn should_trade(
        &mut self,
        _taker: &mut Tracker,
        maker: &mut Tracker,
        _taker_reason: &mut Option<CancelReason>,
        _maker_reason: &mut Option<CancelReason>,
    ) {
        if !maker.ptr().reduce_only() {
            return;
        }
        let remaining = self.remaining_reducible(maker.user_id());
        // A remainder under the dust floor can't be represented exactly by
        // reduce_qty; treat it as fully consumed rather than leave it
        // unshrunk.
        let target = if remaining < MIN_ORDER_QTY { 0.0 } else { remaining };
        if target < maker.open_qty() {
            let _ = maker.reduce_qty(target - maker.open_qty());
        }
    }

    fn on_position_close(&mut self, core: &mut BookCore, user_id: UserId) {
        let ids: Vec<_> = core
            .all_trackers()
            .filter(|t| t.user_id() == user_id && t.ptr().reduce_only())
            .map(Tracker::id)
            .collect();
        debug!("Position closed for user {}, cancelling {} reduce-only order(s)", user_id, ids.len());
        for id in ids {
            core.cancel_on_book(id, CancelReason::ReduceOnlyClose);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderBuilder;
    use std::sync::Arc;

    #[derive(Debug)]
    struct FixedPosition(f64);

    impl PositionsProvider for FixedPosition {
        fn get_position(&self, _user_id: UserId) -> Option<Position> {
            Some(Position { qty: self.0 })
        }
    }

    #[test]
    fn rejects_a_buy_that_would_grow_a_long_position() {
        let mut plugin = ReduceOnlyPlugin::new(Box::new(FixedPosition(5.0)));
        let core = BookCore::new("TEST", 100.0);
        let taker = Tracker::new(Arc::new(
            OrderBuilder::bid(100.0, 1.0).user_id(UserId(1)).reduce_only(true).build(),
        ));
        assert_eq!(plugin.should_add(&core, &taker), InsertRejectReason::ReduceOnlyIncrease);
    }

    #[test]
    fn rejects_a_sell_larger_than_the_long_position() {
        let mut plugin = ReduceOnlyPlugin::new(Box::new(FixedPosition(5.0)));
        let core = BookCore::new("TEST", 100.0);
        let taker = Tracker::new(Arc::new(
            OrderBuilder::ask(100.0, 10.0).user_id(UserId(1)).reduce_only(true).build(),
        ));
        assert_eq!(plugin.should_add(&core, &taker), InsertRejectReason::ReduceOnlyReverse);
    }

    #[test]
    fn accepts_a_sell_that_shrinks_a_long_position() {
        let mut plugin = ReduceOnlyPlugin::new(Box::new(FixedPosition(5.0)));
        let core = BookCore::new("TEST", 100.0);
        let taker = Tracker::new(Arc::new(
            OrderBuilder::ask(100.0, 3.0).user_id(UserId(1)).reduce_only(true).build(),
        ));
        assert_eq!(plugin.should_add(&core, &taker), InsertRejectReason::InsertRejectNoReason);
    }

    #[test]
    fn shrinks_a_resting_maker_to_the_position_s_remaining_capacity() {
        let mut plugin = ReduceOnlyPlugin::new(Box::new(FixedPosition(2.0)));
        let mut taker = Tracker::new(Arc::new(OrderBuilder::bid(100.0, 5.0).build()));
        let mut maker = Tracker::new(Arc::new(
            OrderBuilder::ask(100.0, 5.0).user_id(UserId(1)).reduce_only(true).build(),
        ));
        let mut tr = None;
        let mut mr = None;
        plugin.should_trade(&mut taker, &mut maker, &mut tr, &mut mr);
        assert_eq!(mr, None);
        assert_eq!(maker.open_qty(), 2.0);
    }
}
