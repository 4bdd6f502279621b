use std::sync::Arc;
use std::time::Duration;

use futures::future::{join, join_all};
use tracing::{debug, info, instrument, warn};

use crate::domain::{Order, OrderId};
use crate::error::SyncError;
use crate::store::{with_timeout, OrderStore, QueueStore};

/// Drives an order's canonical status towards what its queue entry implies.
///
/// Correction is one-directional: the queue is a signal, the order store is
/// the record. Queue failures therefore degrade to "no entry", while order
/// failures are surfaced.
#[derive(Clone)]
pub struct StatusReconciler {
    orders: Arc<dyn OrderStore>,
    queue: Arc<dyn QueueStore>,
    store_timeout: Duration,
}

impl StatusReconciler {
    pub fn new(orders: Arc<dyn OrderStore>, queue: Arc<dyn QueueStore>, store_timeout: Duration) -> Self {
        Self { orders, queue, store_timeout }
    }

    #[instrument(skip(self))]
    pub async fn reconcile(&self, order_id: OrderId) -> Result<Order, SyncError> {
        let entry = match with_timeout(self.store_timeout, self.queue.get(order_id)).await {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "No queue entry, returning stored order");
                return self.fetch_order(order_id).await;
            }
        };

        let order = self.fetch_order(order_id).await?;
        let Some(expected) = entry.status.expected_order_status() else {
            return Ok(order);
        };
        if order.status == expected {
            return Ok(order);
        }
        if order.status.is_terminal() {
            debug!(status = %order.status, queue_status = %entry.status, "Order is final, ignoring leftover queue entry");
            return Ok(order);
        }

        info!(from = %order.status, to = %expected, queue_status = %entry.status, "Syncing order status from queue");
        with_timeout(self.store_timeout, self.orders.set_status(order_id, expected))
            .await
            .map_err(|e| SyncError::from_store(order_id, e))
    }

    /// Reconciles every id concurrently and keeps only the successes.
    #[instrument(skip(self, order_ids), fields(count = order_ids.len()))]
    pub async fn reconcile_many(&self, order_ids: &[OrderId]) -> Vec<Order> {
        join_all(order_ids.iter().map(|&order_id| async move {
            self.reconcile(order_id)
                .await
                .map_err(|e| warn!(order_id, error = %e, "Reconciliation failed"))
                .ok()
        }))
        .await
        .into_iter()
        .flatten()
        .collect()
    }

    /// Reconciled order, or the stored one if reconciliation fails.
    #[instrument(skip(self))]
    pub async fn order_with_latest_status(&self, order_id: OrderId) -> Option<Order> {
        match self.reconcile(order_id).await {
            Ok(order) => Some(order),
            Err(e) => {
                warn!(error = %e, "Falling back to stored order");
                self.fetch_order(order_id).await.ok()
            }
        }
    }

    /// True if either store still considers the order live.
    #[instrument(skip(self))]
    pub async fn is_order_active(&self, order_id: OrderId) -> bool {
        let (order, entry) = join(
            with_timeout(self.store_timeout, self.orders.get(order_id)),
            with_timeout(self.store_timeout, self.queue.get(order_id)),
        )
        .await;
        let order_active = order.map(|o| o.is_active()).unwrap_or(false);
        let queue_active = entry.map(|e| !e.status.is_terminal()).unwrap_or(false);
        order_active || queue_active
    }

    async fn fetch_order(&self, order_id: OrderId) -> Result<Order, SyncError> {
        with_timeout(self.store_timeout, self.orders.get(order_id))
            .await
            .map_err(|e| SyncError::from_store(order_id, e))
    }
}
