//! Stock admission/trade policies built on top of [`crate::plugin::Plugin`].
//!
//! Each plugin here is independent and composable: an [`crate::book::OrderBook`]
//! is handed a `Vec<Box<dyn Plugin>>` at construction and the caller decides
//! which ones to enable, and in what order (order matters for `should_add`'s
//! first-wins short-circuit).

pub mod fees;
pub mod post_only;
pub mod reduce_only;
pub mod self_trade;
pub mod stop_orders;
pub mod trailing_stop;

pub use fees::{FeeSchedule, FeesPlugin};
pub use post_only::PostOnlyPlugin;
pub use reduce_only::{Position, PositionsProvider, ReduceOnlyPlugin};
pub use self_trade::SelfTradePlugin;
pub use stop_orders::StopOrdersPlugin;
pub use trailing_stop::TrailingStopPlugin;
