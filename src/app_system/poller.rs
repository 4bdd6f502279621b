use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, instrument, warn};

use crate::domain::{OrderId, UserId};
use crate::store::{with_timeout, QueueStore};
use crate::sync::{filter_for_user, ReadyNotifier};

/// One refresh: the user's live queue entries fed to the notifier.
///
/// A failing queue read yields nothing and leaves the notifier untouched.
#[instrument(skip(queue, notifier))]
pub async fn refresh_ready(
    queue: &dyn QueueStore,
    user_id: UserId,
    store_timeout: Duration,
    notifier: &mut ReadyNotifier,
) -> Vec<OrderId> {
    match with_timeout(store_timeout, queue.list_active()).await {
        Ok(entries) => notifier.emit_ready_transitions(&filter_for_user(&entries, user_id)),
        Err(e) => {
            warn!(error = %e, "Skipping ready refresh");
            Vec::new()
        }
    }
}

/// Refreshes every `interval` until `stop` flips to true or its sender is dropped.
///
/// Runs only when a caller spawns it; nothing in the crate starts it.
pub async fn poll_ready_orders(
    queue: Arc<dyn QueueStore>,
    user_id: UserId,
    interval: Duration,
    store_timeout: Duration,
    mut notifier: ReadyNotifier,
    mut stop: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let emitted = refresh_ready(queue.as_ref(), user_id, store_timeout, &mut notifier).await;
                debug!(user_id, emitted = emitted.len(), "Ready poll finished");
            }
            changed = stop.changed() => {
                if changed.is_err() || *stop.borrow() {
                    debug!(user_id, "Ready poller stopping");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QueueStatus;
    use crate::sync::fakes::{entry, set_fault, Fault, FakeQueueStore};

    const TIMEOUT: Duration = Duration::from_secs(3);

    #[tokio::test]
    async fn test_refresh_only_sees_own_entries() {
        let queue = FakeQueueStore::new([
            entry(7, 1, QueueStatus::Ready),
            entry(8, 2, QueueStatus::Ready),
        ]);
        let mut notifier = ReadyNotifier::new();

        assert_eq!(refresh_ready(&queue, 1, TIMEOUT, &mut notifier).await, vec![7]);
        assert!(refresh_ready(&queue, 1, TIMEOUT, &mut notifier).await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_held_set() {
        let queue = FakeQueueStore::new([entry(7, 1, QueueStatus::Ready)]);
        let mut notifier = ReadyNotifier::new();
        refresh_ready(&queue, 1, TIMEOUT, &mut notifier).await;

        set_fault(&queue.fault, Fault::Fail);
        assert!(refresh_ready(&queue, 1, TIMEOUT, &mut notifier).await.is_empty());
        assert!(notifier.notified().contains(&7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_emits_and_stops() {
        let queue = Arc::new(FakeQueueStore::new([entry(7, 1, QueueStatus::Waiting)]));
        let (notifier, mut events) = ReadyNotifier::with_channel(8);
        let (stop_tx, stop_rx) = watch::channel(false);

        let poller = tokio::spawn(poll_ready_orders(
            queue.clone(),
            1,
            Duration::from_secs(10),
            TIMEOUT,
            notifier,
            stop_rx,
        ));

        tokio::time::sleep(Duration::from_secs(1)).await;
        queue.set_status(7, QueueStatus::Ready);
        let event = events.recv().await.unwrap();
        assert_eq!(event.order_id, 7);

        stop_tx.send(true).unwrap();
        poller.await.unwrap();
    }
}
