//! Construction-time errors.
//!
//! Business outcomes (rejects, cancels, replace failures) are never
//! `Result::Err` values — they travel through the callback stream (see
//! [`crate::callback`]) the way the rest of the engine's public API works.
//! `OrderBookError` exists only for failures that happen before an order
//! could possibly reach that stream: bad builder configuration, or a
//! submission that is malformed in a way no plugin veto can express.

use crate::types::{OrderId, UserId};
use std::fmt;

/// Errors that can occur while configuring or submitting to an [`crate::book::OrderBook`].
#[derive(Debug)]
#[non_exhaustive]
pub enum OrderBookError {
    /// An order was submitted with a non-default self-trade-policy mask but
    /// `user_id == UserId::NONE`. STP cannot identify "the same user" without one.
    MissingUserId {
        /// The order that was rejected.
        order_id: OrderId,
    },

    /// A reduce-only plugin was composed into the book without a positions
    /// provider to ask `get_position` of.
    MissingPositionsProvider,

    /// A plugin was asked to act on an order id it does not recognise, in a
    /// context where "not found" is a programmer error rather than a normal
    /// cancel-reject (e.g. `on_position_close` bookkeeping that has gone
    /// out of sync with the book's own index).
    OrderNotFound {
        /// The order id that could not be located.
        order_id: OrderId,
    },

    /// A positions provider reported a position for a user whose sign does
    /// not match either `Long` or `Short` (e.g. produced `qty == 0` but
    /// `found == true`, which the reduce-only contract treats as "no
    /// position").
    InvalidPosition {
        /// The user whose reported position was inconsistent.
        user_id: UserId,
    },
}

impl fmt::Display for OrderBookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderBookError::MissingUserId { order_id } => {
                write!(
                    f,
                    "order {order_id} rejected: self-trade prevention is active but user_id is zero"
                )
            }
            OrderBookError::MissingPositionsProvider => {
                write!(f, "reduce-only plugin requires a positions provider")
            }
            OrderBookError::OrderNotFound { order_id } => {
                write!(f, "order not found: {order_id}")
            }
            OrderBookError::InvalidPosition { user_id } => {
                write!(f, "inconsistent position reported for user {user_id}")
            }
        }
    }
}

impl std::error::Error for OrderBookError {}
