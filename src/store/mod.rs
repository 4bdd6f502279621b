//! Data-access contracts consumed by the sync core.
//!
//! Implementations may sit on top of the in-process actors ([`crate::clients`])
//! or the canteen REST services ([`http`]).

pub mod http;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{Order, OrderId, OrderStatus, QueueEntry, UserId};

pub use http::{HttpOrderStore, HttpQueueStore};

/// Store-level failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Write rejected: {0}")]
    Rejected(String),
    #[error("Malformed store response: {0}")]
    Decode(String),
}

impl From<FrameworkError> for StoreError {
    fn from(err: FrameworkError) -> Self {
        match err {
            FrameworkError::NotFound(id) => StoreError::NotFound(id),
            FrameworkError::AlreadyExists(id) => StoreError::Rejected(format!("duplicate record {id}")),
            FrameworkError::Rejected(msg) => StoreError::Rejected(msg),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => {
                StoreError::Unavailable(err.to_string())
            }
        }
    }
}

/// System of record for orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get(&self, order_id: OrderId) -> Result<Order, StoreError>;

    async fn set_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, StoreError>;

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;

    /// Direct active-orders query. Callers must tolerate failure.
    async fn list_active_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;
}

/// Auxiliary queue signal.
#[async_trait]
pub trait QueueStore: Send + Sync {
    async fn get(&self, order_id: OrderId) -> Result<QueueEntry, StoreError>;

    async fn list_active(&self) -> Result<Vec<QueueEntry>, StoreError>;
}

/// Bounds a store call; an elapsed timer becomes [`StoreError::Timeout`].
pub async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(StoreError::Timeout(limit)))
}
