use chrono::Utc;

use super::actions::OrderAction;
use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{Order, OrderCreate, OrderId};

impl Entity for Order {
    type Id = OrderId;
    type CreateParams = OrderCreate;
    type Action = OrderAction;
    type ActionResult = Order;

    fn id(&self) -> &OrderId {
        &self.id
    }

    /// Creates a new Order from creation parameters.
    ///
    /// # Arguments
    /// * `seq` - Next order id from the actor's sequence
    /// * `params` - Owner, lines and free-text instructions
    ///
    /// # Notes
    /// The order is initialized with status `placed`.
    fn from_create_params(seq: u64, params: OrderCreate) -> Result<Self, FrameworkError> {
        if params.lines.is_empty() {
            return Err(FrameworkError::Rejected("order has no lines".to_string()));
        }
        if let Some(line) = params.lines.iter().find(|line| line.quantity == 0) {
            return Err(FrameworkError::Rejected(format!(
                "line {} has zero quantity",
                line.menu_item_id
            )));
        }
        let mut order = Order::new(seq, params.user_id, params.lines);
        order.special_instructions = params.special_instructions;
        Ok(order)
    }

    /// Handles order-specific actions.
    ///
    /// Re-applying the current status is a no-op and leaves `updated_at` alone.
    fn handle_action(&mut self, action: OrderAction) -> Result<Order, FrameworkError> {
        match action {
            OrderAction::SetStatus(status) if status == self.status => Ok(self.clone()),
            OrderAction::SetStatus(status) if self.status.is_terminal() => {
                Err(FrameworkError::Rejected(format!(
                    "order {} is {} and cannot become {}",
                    self.id, self.status, status
                )))
            }
            OrderAction::SetStatus(status) => {
                self.status = status;
                self.updated_at = Utc::now();
                Ok(self.clone())
            }
        }
    }
}
