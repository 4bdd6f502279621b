//! Keeps a canteen's order records consistent with its kitchen queue.
//!
//! The order store holds each order's canonical status; the queue service is
//! where the kitchen actually moves orders along. [`sync`] reconciles the two,
//! resolves a user's active orders from lagging sources, and announces orders
//! that became ready.

pub mod actor_framework;
pub mod app_system;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod order_actor;
pub mod queue_actor;
pub mod store;
pub mod sync;

#[cfg(test)]
mod mock_framework;

pub use crate::config::SyncConfig;
pub use crate::error::SyncError;
