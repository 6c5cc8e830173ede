//! Configuration types and loading for the Data Vault loader.
//!
//! Configuration is layered: a base file, an environment specific file and finally
//! `APP_`-prefixed environment variables. Secrets such as the warehouse password have
//! no defaults and must be supplied through one of these layers.

mod environment;
mod load;
pub mod shared;

pub use environment::Environment;
pub use load::{Config, LoadConfigError, load_config, load_config_from};
