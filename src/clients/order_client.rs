use async_trait::async_trait;
use tracing::{debug, error, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::clients::QueueClient;
use crate::domain::{Order, OrderCreate, OrderId, OrderLine, OrderStatus, UserId};
use crate::order_actor::OrderAction;
use crate::store::{OrderStore, StoreError};

/// Client for interacting with the Order actor.
///
/// Besides the plain [`OrderStore`] contract, this client carries the staff
/// write path, which keeps the queue in step with confirmations and
/// finalisations the way the order service does.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    queue_client: QueueClient,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>, queue_client: QueueClient) -> Self {
        Self { inner, queue_client }
    }

    #[instrument(skip(self, lines, special_instructions), fields(line_count = lines.len()))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        lines: Vec<OrderLine>,
        special_instructions: Option<String>,
    ) -> Result<Order, StoreError> {
        debug!("Sending request");
        let params = OrderCreate { user_id, lines, special_instructions };
        let id = self.inner.create(params).await?;
        info!(order_id = id, "Order placed");
        self.get(id).await
    }

    /// Staff status change with queue side effects.
    ///
    /// `placed -> confirmed` enqueues the order; `completed` and `cancelled`
    /// pull it from the queue. Queue failures are logged, never returned:
    /// the order write has already happened.
    #[instrument(skip(self))]
    pub async fn update_order_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, StoreError> {
        let current = self.get(order_id).await?;
        if !current.status.can_transition_to(status) {
            warn!(from = %current.status, to = %status, "Illegal status transition");
            return Err(StoreError::Rejected(format!(
                "order {order_id} cannot move from {} to {status}",
                current.status
            )));
        }

        let updated = self.set_status(order_id, status).await?;
        info!(from = %current.status, to = %status, "Order status updated");

        match status {
            OrderStatus::Confirmed if current.status == OrderStatus::Placed => {
                if let Err(e) = self.queue_client.enqueue(order_id, updated.user_id).await {
                    error!(error = %e, "Failed to add order to queue");
                }
            }
            OrderStatus::Completed | OrderStatus::Cancelled => match self.queue_client.remove(order_id).await {
                Ok(()) | Err(StoreError::NotFound(_)) => {}
                Err(e) => error!(error = %e, "Failed to remove order from queue"),
            },
            _ => {}
        }
        Ok(updated)
    }

    async fn orders_of(&self, user_id: UserId, keep: impl Fn(&Order) -> bool) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .list_orders()
            .await?
            .into_iter()
            .filter(|order| order.user_id == user_id && keep(order))
            .collect();
        // Newest first, like the order service's listing.
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }
}

impl_client_methods!(OrderClient, Order, order, orders);

#[async_trait]
impl OrderStore for OrderClient {
    async fn get(&self, order_id: OrderId) -> Result<Order, StoreError> {
        self.find_order(order_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("order {order_id}")))
    }

    #[instrument(skip(self))]
    async fn set_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, StoreError> {
        debug!("Sending request");
        Ok(self.inner.perform_action(order_id, OrderAction::SetStatus(status)).await?)
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        self.orders_of(user_id, |_| true).await
    }

    async fn list_active_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        self.orders_of(user_id, Order::is_active).await
    }
}
