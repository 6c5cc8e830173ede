//! Per-kind merge handlers.
//!
//! Hubs and references are loaded with a single set-based merge each. Links and satellites
//! are placeholders that log their invocation and leave the target untouched.

pub mod hub;
pub mod link;
pub mod reference;
pub mod satellite;
