use super::actions::QueueAction;
use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{OrderId, QueueEntry, QueueEntryCreate};

/// Queue entries are keyed by their order id; the actor sequence becomes the
/// queue number, so numbers stay monotonic even across removals.
#[derive(Debug, Clone)]
pub struct QueueRecord {
    pub entry: QueueEntry,
    wait_minutes_per_order: u32,
}

impl QueueRecord {
    pub fn into_entry(self) -> QueueEntry {
        self.entry
    }
}

impl Entity for QueueRecord {
    type Id = OrderId;
    type CreateParams = QueueEntryCreate;
    type Action = QueueAction;
    type ActionResult = QueueEntry;

    fn id(&self) -> &OrderId {
        &self.entry.order_id
    }

    fn from_create_params(seq: u64, params: QueueEntryCreate) -> Result<Self, FrameworkError> {
        Ok(Self {
            entry: QueueEntry::new(params.order_id, params.user_id, seq),
            wait_minutes_per_order: params.wait_minutes_per_order,
        })
    }

    /// Estimates the wait from the number of entries already queued.
    fn on_create(&mut self, existing: usize) -> Result<(), FrameworkError> {
        let ahead = u32::try_from(existing).unwrap_or(u32::MAX);
        self.entry.estimated_wait_time = ahead.saturating_mul(self.wait_minutes_per_order);
        Ok(())
    }

    fn handle_action(&mut self, action: QueueAction) -> Result<QueueEntry, FrameworkError> {
        match action {
            QueueAction::UpdateStatus(status) => {
                self.entry.status = status;
                Ok(self.entry.clone())
            }
        }
    }
}
