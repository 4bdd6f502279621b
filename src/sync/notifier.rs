use std::collections::HashSet;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::{OrderId, QueueEntry, QueueNumber, QueueStatus, UserId};

/// Pushed to the consumer once per order that newly turned ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyEvent {
    pub order_id: OrderId,
    pub queue_number: QueueNumber,
}

/// Per-session tracker of orders already announced as ready.
///
/// The held set is only replaced when a refresh surfaces at least one new
/// ready order. A refresh that finds nothing new leaves it untouched, so an
/// order that leaves `ready` and comes back is not announced twice until some
/// other order turns ready first.
#[derive(Debug, Default)]
pub struct ReadyNotifier {
    notified: HashSet<OrderId>,
    sink: Option<mpsc::Sender<ReadyEvent>>,
}

impl ReadyNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier that also pushes every emitted id into a bounded channel.
    pub fn with_channel(capacity: usize) -> (Self, mpsc::Receiver<ReadyEvent>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let notifier = Self {
            notified: HashSet::new(),
            sink: Some(sender),
        };
        (notifier, receiver)
    }

    /// Ids that are ready now but were not announced yet, ascending.
    pub fn emit_ready_transitions(&mut self, entries: &[QueueEntry]) -> Vec<OrderId> {
        let ready: Vec<&QueueEntry> = entries
            .iter()
            .filter(|e| e.status == QueueStatus::Ready)
            .collect();

        let mut fresh: Vec<&QueueEntry> = ready
            .iter()
            .copied()
            .filter(|e| !self.notified.contains(&e.order_id))
            .collect();
        fresh.sort_by_key(|e| e.order_id);
        fresh.dedup_by_key(|e| e.order_id);

        if fresh.is_empty() {
            debug!(ready = ready.len(), "No new ready orders");
            return Vec::new();
        }

        self.notified = ready.iter().map(|e| e.order_id).collect();
        for entry in &fresh {
            info!(order_id = entry.order_id, queue_number = entry.queue_number, "Order ready");
            self.push(entry);
        }
        fresh.into_iter().map(|e| e.order_id).collect()
    }

    pub fn notified(&self) -> &HashSet<OrderId> {
        &self.notified
    }

    fn push(&self, entry: &QueueEntry) {
        let Some(sink) = &self.sink else { return };
        let event = ReadyEvent {
            order_id: entry.order_id,
            queue_number: entry.queue_number,
        };
        if let Err(e) = sink.try_send(event) {
            warn!(order_id = entry.order_id, error = %e, "Dropping ready event");
        }
    }
}

/// One user's entries out of a full active-queue listing.
pub fn filter_for_user(entries: &[QueueEntry], user_id: UserId) -> Vec<QueueEntry> {
    entries.iter().filter(|e| e.user_id == user_id).cloned().collect()
}
