use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OrderId, UserId};

/// Canonical lifecycle status of an order, as held by the order store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Placed,
    Confirmed,
    Preparing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Statuses that make up a user's active set.
    pub const ACTIVE: [OrderStatus; 4] = [
        OrderStatus::Placed,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Ready,
    ];

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Forward lifecycle step, or cancellation from any non-terminal state.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match (self, next) {
            (from, _) if from.is_terminal() => false,
            (_, Cancelled) => true,
            (Placed, Confirmed)
            | (Confirmed, Preparing)
            | (Preparing, Ready)
            | (Ready, Completed) => true,
            _ => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Placed => "placed",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub menu_item_id: String,
    pub item_name: String,
    pub quantity: u32,
    #[serde(rename = "price")]
    pub unit_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
}

impl OrderLine {
    pub fn new(
        menu_item_id: impl Into<String>,
        item_name: impl Into<String>,
        quantity: u32,
        unit_price: f64,
    ) -> Self {
        Self {
            menu_item_id: menu_item_id.into(),
            item_name: item_name.into(),
            quantity,
            unit_price,
            special_instructions: None,
        }
    }

    pub fn line_total(&self) -> f64 {
        f64::from(self.quantity) * self.unit_price
    }
}

/// Represents a customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    #[serde(rename = "items", default)]
    pub lines: Vec<OrderLine>,
    #[serde(rename = "total_amount")]
    pub total: f64,
    pub status: OrderStatus,
    #[serde(default)]
    pub special_instructions: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for placing a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
    pub special_instructions: Option<String>,
}

impl Order {
    /// Builds a freshly placed order; the total is derived from its lines.
    pub fn new(id: OrderId, user_id: UserId, lines: Vec<OrderLine>) -> Self {
        let now = Utc::now();
        let total = lines.iter().map(OrderLine::line_total).sum();
        Self {
            id,
            user_id,
            lines,
            total,
            status: OrderStatus::Placed,
            special_instructions: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
