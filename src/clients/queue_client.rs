use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{OrderId, QueueEntry, QueueEntryCreate, QueueStats, QueueStatus, UserId};
use crate::queue_actor::entity::QueueRecord;
use crate::queue_actor::QueueAction;
use crate::store::{QueueStore, StoreError};

impl From<QueueRecord> for QueueEntry {
    fn from(record: QueueRecord) -> Self {
        record.into_entry()
    }
}

/// Enqueue counter that resets on the first bump of a new day.
#[derive(Debug, Default)]
struct DailyCount {
    day: Option<NaiveDate>,
    count: usize,
}

impl DailyCount {
    fn bump(&mut self, today: NaiveDate) {
        if self.day != Some(today) {
            self.day = Some(today);
            self.count = 0;
        }
        self.count += 1;
    }

    fn on(&self, today: NaiveDate) -> usize {
        if self.day == Some(today) {
            self.count
        } else {
            0
        }
    }
}

/// Client for interacting with the Queue actor.
#[derive(Clone)]
pub struct QueueClient {
    inner: ResourceClient<QueueRecord>,
    wait_minutes_per_order: u32,
    enqueued_today: Arc<Mutex<DailyCount>>,
}

impl_client_methods!(QueueClient, QueueEntry, queue_entry, queue_entries);

impl QueueClient {
    pub fn new(inner: ResourceClient<QueueRecord>, wait_minutes_per_order: u32) -> Self {
        Self {
            inner,
            wait_minutes_per_order,
            enqueued_today: Arc::default(),
        }
    }

    /// Adds an order to the back of the queue with status `waiting`.
    #[instrument(skip(self))]
    pub async fn enqueue(&self, order_id: OrderId, user_id: UserId) -> Result<QueueEntry, StoreError> {
        debug!("Sending request");
        let params = QueueEntryCreate {
            order_id,
            user_id,
            wait_minutes_per_order: self.wait_minutes_per_order,
        };
        self.inner.create(params).await?;
        self.daily_count().bump(Utc::now().date_naive());
        let entry = self.get(order_id).await?;
        info!(queue_number = entry.queue_number, "Order queued");
        Ok(entry)
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, order_id: OrderId, status: QueueStatus) -> Result<QueueEntry, StoreError> {
        debug!("Sending request");
        Ok(self.inner.perform_action(order_id, QueueAction::UpdateStatus(status)).await?)
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, order_id: OrderId) -> Result<(), StoreError> {
        debug!("Sending request");
        Ok(self.inner.delete(order_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<QueueStats, StoreError> {
        let entries = self.list_queue_entries().await?;
        let count_of = |status| entries.iter().filter(|e| e.status == status).count();
        Ok(QueueStats {
            active_orders_count: entries.len(),
            average_wait_time: (entries.len() as f64) * f64::from(self.wait_minutes_per_order),
            waiting_orders: count_of(QueueStatus::Waiting),
            preparing_orders: count_of(QueueStatus::Preparing),
            total_orders_today: self.daily_count().on(Utc::now().date_naive()),
        })
    }

    fn daily_count(&self) -> std::sync::MutexGuard<'_, DailyCount> {
        self.enqueued_today.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl QueueStore for QueueClient {
    async fn get(&self, order_id: OrderId) -> Result<QueueEntry, StoreError> {
        self.find_queue_entry(order_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("queue entry for order {order_id}")))
    }

    /// Entries in queue-number order, wait estimates recomputed from position.
    async fn list_active(&self) -> Result<Vec<QueueEntry>, StoreError> {
        let mut entries = self.list_queue_entries().await?;
        entries.sort_by_key(|entry| entry.queue_number);
        for (position, entry) in entries.iter_mut().enumerate() {
            let ahead = u32::try_from(position).unwrap_or(u32::MAX);
            entry.estimated_wait_time = ahead.saturating_mul(self.wait_minutes_per_order);
        }
        Ok(entries)
    }
}
