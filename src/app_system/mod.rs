//! System orchestration, startup, and shutdown logic.

pub mod canteen_system;
pub mod poller;
pub mod tracing;

pub use canteen_system::*;
pub use poller::*;
pub use self::tracing::setup_tracing;
