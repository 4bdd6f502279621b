//! Queue-specific record logic: numbering, wait estimates and status moves.

mod actions;
pub mod entity;

pub use actions::*;
