//! Fluent construction for [`OrderBook`]: a plugin vector assembled in the
//! order the caller registers them, plus optional tick/lot-size validation
//! and a fee schedule.

use crate::book::engine::OrderBook;
use crate::error::OrderBookError;
use crate::plugin::Plugin;
use crate::plugins::reduce_only::{PositionsProvider, ReduceOnlyPlugin};
use crate::plugins::{FeeSchedule, FeesPlugin};
use tracing::debug;

/// Rejects an order whose price or quantity does not fall on the book's
/// configured tick/lot grid. Runs first in the plugin vector, ahead of
/// every other admission check.
#[derive(Debug)]
struct TickLotPlugin {
    tick_size: Option<f64>,
    lot_size: Option<f64>,
}

fn is_multiple_of(value: f64, increment: f64) -> bool {
    if increment <= 0.0 {
        return true;
    }
    let ratio = value / increment;
    (ratio - ratio.round()).abs() < crate::constants::EPSILON.sqrt()
}

impl Plugin for TickLotPlugin {
    fn should_add(
        &mut self,
        _core: &crate::book::core::BookCore,
        taker: &crate::tracker::Tracker,
    ) -> crate::types::InsertRejectReason {
        use crate::types::InsertRejectReason;
        if !taker.is_market() {
            if let Some(tick) = self.tick_size {
                if !is_multiple_of(taker.price(), tick) {
                    debug!("Order {} rejected: price {} not a multiple of tick size {}", taker.id(), taker.price(), tick);
                    return InsertRejectReason::InvalidTickSize;
                }
            }
        }
        if let Some(lot) = self.lot_size {
            if !is_multiple_of(taker.open_qty(), lot) {
                debug!("Order {} rejected: qty {} not a multiple of lot size {}", taker.id(), taker.open_qty(), lot);
                return InsertRejectReason::InvalidLotSize;
            }
        }
        InsertRejectReason::InsertRejectNoReason
    }
}

/// Builds an [`OrderBook`] with a chosen plugin composition.
///
/// # Example
///
/// ```
/// use matchcore::book::OrderBookBuilder;
///
/// let book = OrderBookBuilder::new("BTC-USD")
///     .initial_market_price(100.0)
///     .self_trade_prevention()
///     .post_only()
///     .build()
///     .expect("valid configuration");
/// assert_eq!(book.symbol(), "BTC-USD");
/// ```
pub struct OrderBookBuilder {
    symbol: String,
    initial_market_price: f64,
    plugins: Vec<Box<dyn Plugin>>,
    tick_size: Option<f64>,
    lot_size: Option<f64>,
    reduce_only_positions: Option<Box<dyn PositionsProvider>>,
    reduce_only_requested: bool,
}

impl OrderBookBuilder {
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            initial_market_price: 0.0,
            plugins: Vec::new(),
            tick_size: None,
            lot_size: None,
            reduce_only_positions: None,
            reduce_only_requested: false,
        }
    }

    #[must_use]
    pub fn initial_market_price(mut self, price: f64) -> Self {
        self.initial_market_price = price;
        self
    }

    /// Rejects any non-market order whose price is not a multiple of `tick_size`.
    #[must_use]
    pub fn tick_size(mut self, tick_size: f64) -> Self {
        self.tick_size = Some(tick_size);
        self
    }

    /// Rejects any order whose quantity is not a multiple of `lot_size`.
    #[must_use]
    pub fn lot_size(mut self, lot_size: f64) -> Self {
        self.lot_size = Some(lot_size);
        self
    }

    /// Registers an arbitrary plugin, in the order it should run.
    #[must_use]
    pub fn plugin(mut self, plugin: Box<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    #[must_use]
    pub fn self_trade_prevention(self) -> Self {
        self.plugin(Box::new(crate::plugins::SelfTradePlugin::new()))
    }

    #[must_use]
    pub fn post_only(self) -> Self {
        self.plugin(Box::new(crate::plugins::PostOnlyPlugin::new()))
    }

    #[must_use]
    pub fn stop_orders(self) -> Self {
        self.plugin(Box::new(crate::plugins::StopOrdersPlugin::new()))
    }

    #[must_use]
    pub fn trailing_stop(self) -> Self {
        self.plugin(Box::new(crate::plugins::TrailingStopPlugin::new()))
    }

    #[must_use]
    pub fn fee_schedule(self, schedule: FeeSchedule) -> Self {
        self.plugin(Box::new(FeesPlugin::new(schedule)))
    }

    /// Requests the reduce-only plugin. [`Self::build`] fails unless
    /// [`Self::positions_provider`] is also called before it.
    #[must_use]
    pub fn enable_reduce_only(mut self) -> Self {
        self.reduce_only_requested = true;
        self
    }

    /// Supplies the position lookup the reduce-only plugin consumes.
    #[must_use]
    pub fn positions_provider(mut self, positions: Box<dyn PositionsProvider>) -> Self {
        self.reduce_only_positions = Some(positions);
        self
    }

    /// Assembles the configured plugin pipeline into an [`OrderBook`].
    ///
    /// # Errors
    /// Returns [`OrderBookError::MissingPositionsProvider`] if
    /// [`Self::enable_reduce_only`] was called without a matching
    /// [`Self::positions_provider`].
    pub fn build(mut self) -> Result<OrderBook, OrderBookError> {
        if self.tick_size.is_some() || self.lot_size.is_some() {
            self.plugins.insert(
                0,
                Box::new(TickLotPlugin { tick_size: self.tick_size, lot_size: self.lot_size }),
            );
        }
        if self.reduce_only_requested {
            let positions = self.reduce_only_positions.take().ok_or(OrderBookError::MissingPositionsProvider)?;
            self.plugins.push(Box::new(ReduceOnlyPlugin::new(positions)));
        }
        Ok(OrderBook::new(self.symbol, self.initial_market_price, self.plugins))
    }
}
