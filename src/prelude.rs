/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 2/10/25
******************************************************************************/

//! Prelude module that re-exports commonly used types and traits.
//!
//! ```
//! use matchcore::prelude::*;
//! ```

pub use crate::book::{OrderBook, OrderBookBuilder};
pub use crate::callback::{Callback, CallbackQueue};
pub use crate::error::OrderBookError;
pub use crate::order::{Order, OrderBuilder, StpMask};
pub use crate::plugin::Plugin;
pub use crate::plugins::{
    FeeSchedule, FeesPlugin, Position, PositionsProvider, PostOnlyPlugin, ReduceOnlyPlugin,
    SelfTradePlugin, StopOrdersPlugin, TrailingStopPlugin,
};
pub use crate::price::PriceKey;
pub use crate::tracker::Tracker;
pub use crate::types::{
    CancelReason, CancelRejectReason, InsertRejectReason, OrderId, ReplaceRejectReason, Side, UserId,
};
