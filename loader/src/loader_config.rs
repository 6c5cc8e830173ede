use config::load_config;
use config::shared::LoaderConfig;

use crate::error::LoaderResult;

/// Loads and validates the loader configuration.
///
/// Uses the layered loading of [`config::load_config`] and validates the resulting
/// [`LoaderConfig`] before any session is opened.
pub fn load_loader_config() -> LoaderResult<LoaderConfig> {
    let config = load_config::<LoaderConfig>()?;
    config.validate()?;

    Ok(config)
}
