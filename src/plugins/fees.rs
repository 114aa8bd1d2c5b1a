//! Optional maker/taker fee accrual.
//!
//! Fees are expressed in basis points (1 bps = 0.01%); a negative maker rate
//! is a liquidity rebate. This plugin only accrues totals per user — it does
//! not touch the callback queue, since fee accounting is a downstream
//! concern of whatever ledger consumes the book's trade callbacks.

use crate::constants::{TAKER_FEE_RATE, MAKER_FEE_RATE};
use crate::plugin::Plugin;
use crate::tracker::Tracker;
use crate::types::UserId;
use std::collections::HashMap;

/// Maker/taker fee rates for a symbol, in basis points.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FeeSchedule {
    /// Maker fee in basis points; negative is a rebate.
    pub maker_fee_bps: f64,
    /// Taker fee in basis points; always non-negative in practice.
    pub taker_fee_bps: f64,
}

impl FeeSchedule {
    #[must_use]
    pub fn new(maker_fee_bps: f64, taker_fee_bps: f64) -> Self {
        Self { maker_fee_bps, taker_fee_bps }
    }

    /// The crate's default schedule (see [`TAKER_FEE_RATE`]/[`MAKER_FEE_RATE`]).
    #[must_use]
    pub fn default_schedule() -> Self {
        Self::new(MAKER_FEE_RATE * 10_000.0, TAKER_FEE_RATE * 10_000.0)
    }

    #[must_use]
    pub fn zero_fee() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Fee charged (positive) or rebated (negative) on `notional`.
    #[must_use]
    pub fn calculate_fee(&self, notional: f64, is_maker: bool) -> f64 {
        let bps = if is_maker { self.maker_fee_bps } else { self.taker_fee_bps };
        notional * bps / 10_000.0
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self::default_schedule()
    }
}

/// Accrues maker/taker fees per user as trades happen.
#[derive(Debug)]
pub struct FeesPlugin {
    schedule: FeeSchedule,
    accrued: HashMap<UserId, f64>,
}

impl FeesPlugin {
    #[must_use]
    pub fn new(schedule: FeeSchedule) -> Self {
        Self { schedule, accrued: HashMap::new() }
    }

    /// Total fees accrued for `user_id` so far (positive = charged, negative = rebated).
    #[must_use]
    pub fn fees_for(&self, user_id: UserId) -> f64 {
        self.accrued.get(&user_id).copied().unwrap_or(0.0)
    }
}

impl Plugin for FeesPlugin {
    fn after_trade(&mut self, taker: &Tracker, maker: &Tracker, qty: f64, price: f64) {
        let notional = qty * price;
        if taker.user_id().is_some() {
            *self.accrued.entry(taker.user_id()).or_insert(0.0) += self.schedule.calculate_fee(notional, false);
        }
        if maker.user_id().is_some() {
            *self.accrued.entry(maker.user_id()).or_insert(0.0) += self.schedule.calculate_fee(notional, true);
        }
    }
}
