//! Helpers for testing vault loads.
//!
//! - [`table`] builds table configurations and change rows.
//! - [`test_engine_wrapper`] wraps an engine to observe session handling and inject merge
//!   failures.
//! - [`database`] prepares an isolated schema on a live Postgres server.

pub mod database;
pub mod table;
pub mod test_engine_wrapper;
