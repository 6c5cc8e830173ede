mod core;
mod sql;

pub use core::PostgresEngine;
pub use sql::{render_merge, render_pending_changes_query};
