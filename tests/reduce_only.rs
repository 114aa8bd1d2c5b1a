//! Reduce-only admission checks and at-trade-time capacity shrinking.

use matchcore::prelude::*;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct TestPositions(Arc<Mutex<f64>>);

impl PositionsProvider for TestPositions {
    fn get_position(&self, _user_id: UserId) -> Option<Position> {
        Some(Position { qty: *self.0.lock().unwrap() })
    }
}

#[test]
fn rejects_a_reduce_only_order_that_would_grow_the_position() {
    let position = Arc::new(Mutex::new(5.0));
    let mut book = OrderBook::new(
        "TEST",
        100.0,
        vec![Box::new(ReduceOnlyPlugin::new(Box::new(TestPositions(position))))],
    );

    let callbacks = book.add(
        OrderBuilder::bid(100.0, 1.0)
            .user_id(UserId(1))
            .reduce_only(true)
            .build(),
    );
    assert!(callbacks
        .iter()
        .any(|c| matches!(c, Callback::Reject { reason: InsertRejectReason::ReduceOnlyIncrease, .. })));
}

#[test]
fn rejects_a_reduce_only_order_larger_than_the_position() {
    let position = Arc::new(Mutex::new(5.0));
    let mut book = OrderBook::new(
        "TEST",
        100.0,
        vec![Box::new(ReduceOnlyPlugin::new(Box::new(TestPositions(position))))],
    );

    let callbacks = book.add(
        OrderBuilder::ask(100.0, 10.0)
            .user_id(UserId(1))
            .reduce_only(true)
            .build(),
    );
    assert!(callbacks
        .iter()
        .any(|c| matches!(c, Callback::Reject { reason: InsertRejectReason::ReduceOnlyReverse, .. })));
}

#[test]
fn shrinks_a_resting_reduce_only_maker_to_the_remaining_capacity() {
    let position = Arc::new(Mutex::new(2.0));
    let mut book = OrderBook::new(
        "TEST",
        100.0,
        vec![Box::new(ReduceOnlyPlugin::new(Box::new(TestPositions(position.clone()))))],
    );

    book.add(
        OrderBuilder::ask(100.0, 5.0)
            .user_id(UserId(1))
            .reduce_only(true)
            .build(),
    );

    let callbacks = book.add(OrderBuilder::bid(100.0, 5.0).user_id(UserId(2)).build());
    let traded: f64 = callbacks
        .iter()
        .filter_map(|c| match c {
            Callback::Trade { qty, .. } => Some(*qty),
            _ => None,
        })
        .sum();
    assert_eq!(traded, 2.0, "the resting maker can only reduce what the position still has open");
}

#[test]
fn closing_a_position_cancels_all_of_that_user_s_reduce_only_orders() {
    let position = Arc::new(Mutex::new(5.0));
    let mut book = OrderBook::new(
        "TEST",
        100.0,
        vec![Box::new(ReduceOnlyPlugin::new(Box::new(TestPositions(position))))],
    );

    book.add(
        OrderBuilder::ask(101.0, 3.0)
            .user_id(UserId(1))
            .reduce_only(true)
            .build(),
    );
    book.add(
        OrderBuilder::ask(102.0, 2.0)
            .user_id(UserId(1))
            .reduce_only(true)
            .build(),
    );

    let callbacks = book.notify_position_close(UserId(1));
    let cancels = callbacks
        .iter()
        .filter(|c| matches!(c, Callback::Cancel { reason: CancelReason::ReduceOnlyClose, .. }))
        .count();
    assert_eq!(cancels, 2);
    assert!(book.asks().is_empty());
}
