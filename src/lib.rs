/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 2/10/25
******************************************************************************/

//! # A Pluggable Limit Order Book Matching Engine
//!
//! A single-symbol, single-threaded limit order book with price-time
//! priority matching and a composable admission/trade policy pipeline.
//!
//! ## Key Features
//!
//! - **Price-Time Priority Matching**: Resting orders at the same price
//!   trade in strict FIFO order; market orders always cross first.
//! - **Pluggable Policies**: Self-trade prevention, post-only, reduce-only,
//!   stop, and trailing-stop orders are all implemented as [`Plugin`]s rather
//!   than hard-wired into the matching loop, so a caller assembles exactly
//!   the policy set a venue needs.
//! - **Callback-Driven**: Every public operation returns the ordered batch of
//!   [`Callback`]s it produced — accepts, rejects, cancels, trades, fills,
//!   and stop triggers — rather than pushing to a listener.
//! - **No Internal Concurrency**: One [`OrderBook`] is meant to be owned and
//!   driven by a single sequencer thread; callers serialize submissions
//!   externally rather than relying on any locking inside the engine.
//!
//! ## Quick Start
//!
//! ```
//! use matchcore::prelude::*;
//!
//! let mut book = OrderBook::new("BTC-USD", 100.0, vec![Box::new(SelfTradePlugin::new())]);
//! let callbacks = book.add(OrderBuilder::bid(100.0, 1.0).build());
//! assert!(matches!(callbacks[0], Callback::Accept { .. }));
//! ```
//!
//! ## Status
//!
//! This project is in active development and not yet suitable for
//! production use.

pub mod book;
pub mod callback;
pub mod constants;
pub mod error;
pub mod order;
pub mod plugin;
pub mod plugins;
pub mod prelude;
pub mod price;
pub mod tracker;
pub mod types;

pub use book::{OrderBook, OrderBookBuilder};
pub use callback::{Callback, CallbackQueue};
pub use error::OrderBookError;
pub use order::{Order, OrderBuilder, StpMask};
pub use plugin::Plugin;
pub use price::PriceKey;
pub use tracker::Tracker;
pub use types::{
    CancelRejectReason, CancelReason, InsertRejectReason, OrderId, ReplaceRejectReason, Side, UserId,
};
