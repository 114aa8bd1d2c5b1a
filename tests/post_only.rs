//! Post-only admission: cancelled before any partial fill if it would cross.

use matchcore::prelude::*;

#[test]
fn a_crossing_post_only_bid_is_cancelled_not_partially_filled() {
    let mut book = OrderBook::new("TEST", 100.0, vec![Box::new(PostOnlyPlugin::new())]);
    book.add(OrderBuilder::ask(100.0, 5.0).build());

    let callbacks = book.add(OrderBuilder::bid(100.0, 3.0).post_only(true).build());

    assert!(!callbacks.iter().any(|c| matches!(c, Callback::Trade { .. })));
    assert!(callbacks
        .iter()
        .any(|c| matches!(c, Callback::Cancel { reason: CancelReason::PostOnly, .. })));
    let resting_ask_qty: f64 = book.asks().values().flat_map(|b| b.iter()).map(Tracker::open_qty).sum();
    assert_eq!(resting_ask_qty, 5.0, "the maker must be untouched");
}

#[test]
fn a_non_crossing_post_only_bid_rests_normally() {
    let mut book = OrderBook::new("TEST", 100.0, vec![Box::new(PostOnlyPlugin::new())]);
    book.add(OrderBuilder::ask(101.0, 5.0).build());

    let callbacks = book.add(OrderBuilder::bid(100.0, 3.0).post_only(true).build());

    assert!(!callbacks.iter().any(|c| matches!(c, Callback::Cancel { .. })));
    assert_eq!(book.bids().values().flat_map(|b| b.iter()).count(), 1);
}
