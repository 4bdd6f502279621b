use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OrderId, OrderStatus, QueueNumber, UserId};

/// Kitchen queue status. Narrower than [`OrderStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Waiting,
    Preparing,
    Ready,
    Completed,
}

/// Queue status to the order status it implies. Evaluated top to bottom.
const EXPECTED_ORDER_STATUS: [(QueueStatus, OrderStatus); 4] = [
    (QueueStatus::Waiting, OrderStatus::Confirmed),
    (QueueStatus::Preparing, OrderStatus::Preparing),
    (QueueStatus::Ready, OrderStatus::Ready),
    (QueueStatus::Completed, OrderStatus::Completed),
];

impl QueueStatus {
    pub fn expected_order_status(self) -> Option<OrderStatus> {
        EXPECTED_ORDER_STATUS
            .iter()
            .find(|(queue, _)| *queue == self)
            .map(|(_, order)| *order)
    }

    pub fn is_terminal(self) -> bool {
        self == QueueStatus::Completed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueueStatus::Waiting => "waiting",
            QueueStatus::Preparing => "preparing",
            QueueStatus::Ready => "ready",
            QueueStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serving-queue record for one order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub queue_number: QueueNumber,
    pub status: QueueStatus,
    /// Minutes.
    pub estimated_wait_time: u32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct QueueEntryCreate {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub wait_minutes_per_order: u32,
}

impl QueueEntry {
    pub fn new(order_id: OrderId, user_id: UserId, queue_number: QueueNumber) -> Self {
        Self {
            order_id,
            user_id,
            queue_number,
            status: QueueStatus::Waiting,
            estimated_wait_time: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: QueueStatus) -> Self {
        self.status = status;
        self
    }
}

/// Aggregate view of the serving queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueStats {
    pub active_orders_count: usize,
    pub average_wait_time: f64,
    pub waiting_orders: usize,
    pub preparing_orders: usize,
    /// Enqueues since midnight UTC, removed entries included.
    #[serde(default)]
    pub total_orders_today: usize,
}
