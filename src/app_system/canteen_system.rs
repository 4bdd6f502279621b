use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::actor_framework::ResourceActor;
use crate::clients::{OrderClient, QueueClient};
use crate::config::SyncConfig;
use crate::domain::Order;
use crate::queue_actor::entity::QueueRecord;
use crate::store::{HttpOrderStore, HttpQueueStore, OrderStore, QueueStore};
use crate::sync::{ActiveSetResolver, StatusReconciler};

/// The in-process canteen: order and queue actors plus the sync core on top.
///
/// Responsible for starting up actors, wiring them together, and handling shutdown.
pub struct CanteenSystem {
    pub order_client: OrderClient,
    pub queue_client: QueueClient,
    pub reconciler: StatusReconciler,
    pub resolver: ActiveSetResolver,
    handles: Vec<JoinHandle<()>>,
}

impl CanteenSystem {
    pub fn new(config: &SyncConfig) -> Self {
        // 1. Queue service. The sequence doubles as the queue number.
        let queue_number_counter = Arc::new(AtomicU64::new(1));
        let next_queue_number = move || queue_number_counter.fetch_add(1, Ordering::SeqCst);

        let (queue_actor, queue_resource_client) =
            ResourceActor::<QueueRecord>::new(config.actor_buffer_size, next_queue_number);
        let queue_client = QueueClient::new(queue_resource_client, config.wait_minutes_per_order);
        let queue_handle = tokio::spawn(queue_actor.run());

        // 2. Order service, which enqueues on confirmation.
        let order_id_counter = Arc::new(AtomicU64::new(1));
        let next_order_id = move || order_id_counter.fetch_add(1, Ordering::SeqCst);

        let (order_actor, order_resource_client) =
            ResourceActor::<Order>::new(config.actor_buffer_size, next_order_id);
        let order_client = OrderClient::new(order_resource_client, queue_client.clone());
        let order_handle = tokio::spawn(order_actor.run());

        // 3. Sync core, reading both services through the store traits.
        let (reconciler, resolver) = sync_core(
            Arc::new(order_client.clone()),
            Arc::new(queue_client.clone()),
            config,
        );

        Self {
            order_client,
            queue_client,
            reconciler,
            resolver,
            handles: vec![queue_handle, order_handle],
        }
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        // Actors stop once every sender is gone, including the clones held
        // by the sync core.
        let Self {
            order_client,
            queue_client,
            reconciler,
            resolver,
            handles,
        } = self;
        drop(resolver);
        drop(reconciler);
        drop(order_client);
        drop(queue_client);

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

/// Sync core over the canteen REST services instead of in-process actors.
pub fn http_sync_core(config: &SyncConfig) -> (StatusReconciler, ActiveSetResolver) {
    sync_core(
        Arc::new(HttpOrderStore::new(config.order_service_url.clone())),
        Arc::new(HttpQueueStore::new(config.queue_service_url.clone())),
        config,
    )
}

pub fn sync_core(
    orders: Arc<dyn OrderStore>,
    queue: Arc<dyn QueueStore>,
    config: &SyncConfig,
) -> (StatusReconciler, ActiveSetResolver) {
    let reconciler = StatusReconciler::new(orders.clone(), queue, config.store_timeout());
    let resolver = ActiveSetResolver::new(orders, reconciler.clone(), config.store_timeout());
    (reconciler, resolver)
}
