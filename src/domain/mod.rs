pub mod order;
pub mod queue;

pub use order::*;
pub use queue::*;

pub type OrderId = u64;
pub type UserId = u64;
pub type QueueNumber = u64;
