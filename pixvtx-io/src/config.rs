//! Filter configuration files.
//!
//! Configuration is a flat JSON object. Field names follow the Rust struct
//! (`min_z`, `cluster_pars`, ...) and the original analyzer parameter names
//! (`minZ`, `clusterPars`, ...) are accepted as well. Missing fields take
//! their default values; unknown fields are an error.

use crate::{Error, Result};
use log::debug;
use pixvtx_core::FilterConfig;
use std::path::Path;

/// Parses and validates a configuration document.
///
/// # Errors
/// Returns [`Error::Json`] for malformed input and [`Error::CoreError`] when
/// the values fail validation.
pub fn parse_config(text: &str) -> Result<FilterConfig> {
    let config: FilterConfig =
        serde_json::from_str(text).map_err(|source| Error::Json { line: 0, source })?;
    config.validate().map_err(pixvtx_core::Error::from)?;
    Ok(config)
}

/// Loads and validates a configuration file.
///
/// # Errors
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FilterConfig> {
    let text = std::fs::read_to_string(path.as_ref())?;
    let config = parse_config(&text)?;
    debug!("loaded configuration from {}", path.as_ref().display());
    Ok(config)
}

/// Renders a configuration as pretty-printed JSON.
///
/// # Errors
/// Returns an error if serialization fails.
pub fn config_to_json(config: &FilterConfig) -> Result<String> {
    serde_json::to_string_pretty(config).map_err(|source| Error::Json { line: 0, source })
}
