use tracing::{error, info, Instrument};

use canteen_sync::app_system::{refresh_ready, setup_tracing, CanteenSystem};
use canteen_sync::domain::{OrderLine, OrderStatus, QueueStatus};
use canteen_sync::sync::ReadyNotifier;
use canteen_sync::SyncConfig;

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = SyncConfig::from_env().map_err(|e| e.to_string())?;
    info!(?config, "Starting canteen sync demo");

    let system = CanteenSystem::new(&config);
    let user_id = 5;

    // Two orders, both confirmed by staff, which puts them in the queue.
    let span = tracing::info_span!("order_placement");
    let (first, second) = async {
        let lines = vec![OrderLine::new("m1", "Chicken Rice", 1, 5.5)];
        let first = system.order_client.place_order(user_id, lines.clone(), None).await?;
        let second = system
            .order_client
            .place_order(user_id, lines, Some("no chilli".to_string()))
            .await?;
        for id in [first.id, second.id] {
            system.order_client.update_order_status(id, OrderStatus::Confirmed).await?;
        }
        Ok::<_, canteen_sync::store::StoreError>((first, second))
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    // The kitchen works off the queue only; order records fall behind.
    system
        .queue_client
        .update_status(first.id, QueueStatus::Ready)
        .await
        .map_err(|e| e.to_string())?;
    system
        .queue_client
        .update_status(second.id, QueueStatus::Preparing)
        .await
        .map_err(|e| e.to_string())?;

    match system.reconciler.reconcile(first.id).await {
        Ok(order) => info!(order_id = order.id, status = %order.status, "Order reconciled"),
        Err(e) => error!(error = %e, "Reconciliation failed"),
    }

    let active = system.resolver.get_active_orders(user_id).await;
    for order in &active {
        info!(order_id = order.id, status = %order.status, "Active order");
    }

    let mut notifier = ReadyNotifier::new();
    let ready = refresh_ready(&system.queue_client, user_id, config.store_timeout(), &mut notifier).await;
    info!(?ready, "Ready for pickup");

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
