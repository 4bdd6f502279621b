use crate::domain::OrderStatus;

/// Custom actions for Order records.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Overwrites the canonical status.
    ///
    /// # Errors
    /// Fails if the order already sits in a terminal status and the new status differs.
    SetStatus(OrderStatus),
}
