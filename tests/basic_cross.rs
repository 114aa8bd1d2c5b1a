//! Price-time priority matching across a bare book (no plugins).

use matchcore::prelude::*;

#[test]
fn a_marketable_bid_trades_against_the_best_resting_ask() {
    let _ = tracing_subscriber::fmt::try_init();
    let mut book = OrderBook::new("TEST", 100.0, Vec::new());

    let ask_callbacks = book.add(OrderBuilder::ask(100.0, 5.0).build());
    assert!(matches!(ask_callbacks[0], Callback::Accept { .. }));

    let bid_callbacks = book.add(OrderBuilder::bid(100.0, 3.0).build());
    let trade = bid_callbacks
        .iter()
        .find(|c| matches!(c, Callback::Trade { .. }))
        .expect("a trade must have occurred");
    match trade {
        Callback::Trade { price, qty, .. } => {
            assert_eq!(*price, 100.0);
            assert_eq!(*qty, 3.0);
        }
        _ => unreachable!(),
    }

    let fills = bid_callbacks.iter().filter(|c| matches!(c, Callback::Fill { .. })).count();
    assert_eq!(fills, 2);

    let resting_ask_qty: f64 = book.asks().values().flat_map(|b| b.iter()).map(Tracker::open_qty).sum();
    assert_eq!(resting_ask_qty, 2.0);
    assert_eq!(book.market_price(), 100.0);
}

#[test]
fn resting_orders_at_the_same_price_trade_in_fifo_order() {
    let mut book = OrderBook::new("TEST", 100.0, Vec::new());

    let first = OrderBuilder::ask(100.0, 2.0).build();
    let first_id = first.id();
    book.add(first);
    let second = OrderBuilder::ask(100.0, 2.0).build();
    let second_id = second.id();
    book.add(second);

    let callbacks = book.add(OrderBuilder::bid(100.0, 2.0).build());
    let maker = callbacks
        .iter()
        .find_map(|c| match c {
            Callback::Trade { maker_order_id, .. } => Some(*maker_order_id),
            _ => None,
        })
        .unwrap();
    assert_eq!(maker, first_id);
    assert_ne!(maker, second_id);
}

#[test]
fn an_unmarketable_limit_order_rests_without_trading() {
    let mut book = OrderBook::new("TEST", 100.0, Vec::new());
    let callbacks = book.add(OrderBuilder::bid(90.0, 1.0).build());
    assert!(!callbacks.iter().any(|c| matches!(c, Callback::Trade { .. })));
    assert_eq!(book.bids().len(), 1);
}

#[test]
fn a_market_order_with_no_liquidity_is_cancelled() {
    let mut book = OrderBook::new("TEST", 100.0, Vec::new());
    let callbacks = book.add(OrderBuilder::bid(0.0, 1.0).build());
    assert!(callbacks
        .iter()
        .any(|c| matches!(c, Callback::Cancel { reason: CancelReason::NoLiquidity, .. })));
}
