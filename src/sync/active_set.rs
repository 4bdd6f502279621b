use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{join, join_all};
use tracing::{debug, info, instrument, warn};

use super::reconciler::StatusReconciler;
use crate::domain::{Order, UserId};
use crate::store::{with_timeout, OrderStore, StoreError};

/// Resolves a user's active orders from two lagging sources plus the queue.
///
/// Neither the order store's active index nor its full history is trusted
/// alone: both are merged, every candidate is reconciled against the queue,
/// and only orders still active afterwards are returned.
#[derive(Clone)]
pub struct ActiveSetResolver {
    orders: Arc<dyn OrderStore>,
    reconciler: StatusReconciler,
    store_timeout: Duration,
}

impl ActiveSetResolver {
    pub fn new(orders: Arc<dyn OrderStore>, reconciler: StatusReconciler, store_timeout: Duration) -> Self {
        Self { orders, reconciler, store_timeout }
    }

    /// Best-effort read: never fails, degrades to a partial or empty list.
    #[instrument(skip(self))]
    pub async fn get_active_orders(&self, user_id: UserId) -> Vec<Order> {
        let (direct, history) = join(
            with_timeout(self.store_timeout, self.orders.list_active_by_user(user_id)),
            with_timeout(self.store_timeout, self.orders.list_by_user(user_id)),
        )
        .await;

        let direct = recover(direct, "direct active query");
        let from_history = recover(history, "order history")
            .into_iter()
            .filter(Order::is_active);
        let candidates = dedup_by_id(direct.into_iter().chain(from_history));
        debug!(candidates = candidates.len(), "Reconciling candidate orders");

        let reconciled = join_all(candidates.into_iter().map(|order| async move {
            match self.reconciler.reconcile(order.id).await {
                Ok(synced) => synced,
                Err(e) => {
                    warn!(order_id = order.id, error = %e, "Keeping unreconciled order");
                    order
                }
            }
        }))
        .await;

        let active: Vec<Order> = reconciled.into_iter().filter(Order::is_active).collect();
        info!(active = active.len(), "Resolved active orders");
        active
    }
}

fn recover(result: Result<Vec<Order>, StoreError>, source: &str) -> Vec<Order> {
    result.unwrap_or_else(|e| {
        warn!(source, error = %e, "Order source unavailable");
        Vec::new()
    })
}

/// First occurrence of each id wins; no field-level merge.
fn dedup_by_id(orders: impl IntoIterator<Item = Order>) -> Vec<Order> {
    let mut seen = HashSet::new();
    orders.into_iter().filter(|order| seen.insert(order.id)).collect()
}
