use crate::domain::QueueStatus;

/// Custom actions for QueueEntry records.
#[derive(Debug, Clone)]
pub enum QueueAction {
    UpdateStatus(QueueStatus),
}
