//! Trait-level fake stores with write counting and failure injection.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::{Order, OrderId, OrderLine, OrderStatus, QueueEntry, QueueStatus, UserId};
use crate::store::{OrderStore, QueueStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fault {
    None,
    Fail,
    Hang,
}

impl Fault {
    async fn apply(self) -> Result<(), StoreError> {
        match self {
            Fault::None => Ok(()),
            Fault::Fail => Err(StoreError::Unavailable("injected".into())),
            Fault::Hang => std::future::pending().await,
        }
    }
}

pub fn set_fault(slot: &Mutex<Fault>, fault: Fault) {
    *slot.lock().unwrap() = fault;
}

pub fn order(id: OrderId, user_id: UserId, status: OrderStatus) -> Order {
    Order::new(id, user_id, vec![OrderLine::new("m1", "Chicken Rice", 1, 5.0)]).with_status(status)
}

pub fn entry(order_id: OrderId, user_id: UserId, status: QueueStatus) -> QueueEntry {
    QueueEntry::new(order_id, user_id, order_id).with_status(status)
}

pub struct FakeOrderStore {
    orders: Mutex<HashMap<OrderId, Order>>,
    writes: Mutex<Vec<(OrderId, OrderStatus)>>,
    pub get_fault: Mutex<Fault>,
    pub write_fault: Mutex<Fault>,
    pub active_fault: Mutex<Fault>,
    pub history_fault: Mutex<Fault>,
    /// Overrides the direct active query with a fixed (possibly stale) answer.
    pub stale_active: Mutex<Option<Vec<Order>>>,
}

impl FakeOrderStore {
    pub fn new(orders: impl IntoIterator<Item = Order>) -> Self {
        Self {
            orders: Mutex::new(orders.into_iter().map(|o| (o.id, o)).collect()),
            writes: Mutex::new(Vec::new()),
            get_fault: Mutex::new(Fault::None),
            write_fault: Mutex::new(Fault::None),
            active_fault: Mutex::new(Fault::None),
            history_fault: Mutex::new(Fault::None),
            stale_active: Mutex::new(None),
        }
    }

    pub fn writes(&self) -> Vec<(OrderId, OrderStatus)> {
        self.writes.lock().unwrap().clone()
    }

    pub fn status_of(&self, order_id: OrderId) -> Option<OrderStatus> {
        self.orders.lock().unwrap().get(&order_id).map(|o| o.status)
    }

    fn fault(slot: &Mutex<Fault>) -> Fault {
        *slot.lock().unwrap()
    }

    fn by_user(&self, user_id: UserId) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| o.id);
        orders
    }
}

#[async_trait]
impl OrderStore for FakeOrderStore {
    async fn get(&self, order_id: OrderId) -> Result<Order, StoreError> {
        Self::fault(&self.get_fault).apply().await?;
        self.orders
            .lock()
            .unwrap()
            .get(&order_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))
    }

    async fn set_status(&self, order_id: OrderId, status: OrderStatus) -> Result<Order, StoreError> {
        Self::fault(&self.write_fault).apply().await?;
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .get_mut(&order_id)
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))?;
        order.status = status;
        self.writes.lock().unwrap().push((order_id, status));
        Ok(order.clone())
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        Self::fault(&self.history_fault).apply().await?;
        Ok(self.by_user(user_id))
    }

    async fn list_active_by_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        Self::fault(&self.active_fault).apply().await?;
        if let Some(stale) = self.stale_active.lock().unwrap().clone() {
            return Ok(stale);
        }
        Ok(self.by_user(user_id).into_iter().filter(Order::is_active).collect())
    }
}

pub struct FakeQueueStore {
    entries: Mutex<HashMap<OrderId, QueueEntry>>,
    pub fault: Mutex<Fault>,
}

impl FakeQueueStore {
    pub fn new(entries: impl IntoIterator<Item = QueueEntry>) -> Self {
        Self {
            entries: Mutex::new(entries.into_iter().map(|e| (e.order_id, e)).collect()),
            fault: Mutex::new(Fault::None),
        }
    }

    pub fn set_status(&self, order_id: OrderId, status: QueueStatus) {
        if let Some(entry) = self.entries.lock().unwrap().get_mut(&order_id) {
            entry.status = status;
        }
    }
}

#[async_trait]
impl QueueStore for FakeQueueStore {
    async fn get(&self, order_id: OrderId) -> Result<QueueEntry, StoreError> {
        let fault = *self.fault.lock().unwrap();
        fault.apply().await?;
        self.entries
            .lock()
            .unwrap()
            .get(&order_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))
    }

    async fn list_active(&self) -> Result<Vec<QueueEntry>, StoreError> {
        let fault = *self.fault.lock().unwrap();
        fault.apply().await?;
        let mut entries: Vec<_> = self.entries.lock().unwrap().values().cloned().collect();
        entries.sort_by_key(|e| e.queue_number);
        Ok(entries)
    }
}
