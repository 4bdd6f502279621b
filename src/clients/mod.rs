//! Cloneable handles onto the order and queue actors.

#[macro_use]
mod macros;

pub mod order_client;
pub mod queue_client;

pub use order_client::OrderClient;
pub use queue_client::QueueClient;
