//! Query engines that evaluate merge plans.
//!
//! An [`Engine`] value is one session against the warehouse: it is opened before the run,
//! shared by every stream and closed exactly once at the end.

mod base;
pub mod memory;
pub mod postgres;

pub use base::Engine;
