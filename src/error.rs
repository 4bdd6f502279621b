use thiserror::Error;

use crate::domain::OrderId;
use crate::store::StoreError;

/// Errors surfaced by the sync core to its callers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SyncError {
    #[error("Order not found: {0}")]
    NotFound(OrderId),
    #[error("Store error: {0}")]
    Store(String),
    /// Reserved for a stricter policy; the default reconciliation never raises it.
    #[error("Order {order_id} is inconsistent with its queue entry: {detail}")]
    Inconsistent { order_id: OrderId, detail: String },
}

impl SyncError {
    /// Maps an order-store failure for `order_id` into the caller-facing kind.
    pub fn from_store(order_id: OrderId, err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => SyncError::NotFound(order_id),
            other => SyncError::Store(other.to_string()),
        }
    }
}
