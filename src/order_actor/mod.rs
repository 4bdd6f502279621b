//! Order-specific record logic: creation and guarded status writes.

mod actions;
pub mod entity;

pub use actions::*;
