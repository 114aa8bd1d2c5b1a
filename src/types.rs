//! Small shared identifier and reason types.

use std::fmt;
use uuid::Uuid;

/// Identifies a single order for its whole lifetime, on or off book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct OrderId(pub Uuid);

impl OrderId {
    /// Generates a fresh random order id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque host-assigned account identifier. `0` means "no self-trade-prevention identity".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, serde::Serialize, serde::Deserialize)]
pub struct UserId(pub u64);

impl UserId {
    /// The reserved "no identity" value.
    pub const NONE: UserId = UserId(0);

    /// True unless this is the reserved "no identity" value.
    #[must_use]
    pub fn is_some(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the book a tracker rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    #[must_use]
    pub fn from_is_bid(is_bid: bool) -> Self {
        if is_bid { Side::Bid } else { Side::Ask }
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "bid"),
            Side::Ask => write!(f, "ask"),
        }
    }
}

/// Reasons an `add` may be rejected before the order ever touches the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InsertRejectReason {
    ReduceOnlyIncrease,
    ReduceOnlyReverse,
    InsufficientFunds,
    QtyTooSmall,
    FundsTooSmall,
    DuplicateClientOrderId,
    /// Expansion: price is not a multiple of the book's configured tick size.
    InvalidTickSize,
    /// Expansion: quantity is not a multiple of the book's configured lot size.
    InvalidLotSize,
    InsertRejectNoReason,
}

impl fmt::Display for InsertRejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Reasons a resting or in-flight order can be cancelled after acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CancelReason {
    UserCancel,
    TemporaryCancel,
    NoLiquidity,
    SelfTrade,
    EngineShutdown,
    ReplacedAllQty,
    PostOnly,
    ReduceOnlyMatch,
    ReduceOnlyClose,
    MmRouted,
    RoutingFailure,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Reasons an explicit `cancel` call can fail to find its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum CancelRejectReason {
    CancelRejectNotFound,
}

impl fmt::Display for CancelRejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Reasons an explicit `replace` call can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ReplaceRejectReason {
    ReplaceRejectNotFound,
    ReplaceRejectNoQty,
    ReplaceInsufficientFunds,
}

impl fmt::Display for ReplaceRejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
