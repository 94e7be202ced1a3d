//! Shared command utilities

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::ClientConfig;

/// Load config from `path` (or the default location) and apply a CLI endpoint override
pub fn load_config(path: Option<&Path>, endpoint: Option<&str>) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ClientConfig::load().context("Failed to load config")?,
    };

    Ok(match endpoint {
        Some(endpoint) => config.with_endpoint(endpoint),
        None => config,
    })
}
