//! Error types for mediashelf.

use crate::order::OrderId;

/// Errors from [`OrderSet`](crate::order::OrderSet) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    /// The id does not name an order in the set.
    #[error("no order with id {0:?}")]
    UnknownOrder(OrderId),
}

/// Result type for order operations.
pub type OrderResult<T> = std::result::Result<T, OrderError>;
