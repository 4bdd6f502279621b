//! Order and queue consistency core.
//!
//! Everything here talks to the stores through [`crate::store`] traits only.

pub mod active_set;
pub mod notifier;
pub mod reconciler;

#[cfg(test)]
pub(crate) mod fakes;

pub use active_set::ActiveSetResolver;
pub use notifier::{filter_for_user, ReadyEvent, ReadyNotifier};
pub use reconciler::StatusReconciler;
