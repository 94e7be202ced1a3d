//! Client configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/tally/config/client.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Environment variables are applied on top by `ClientConfig::load`:
//! - `TALLY_API_URL`: analysis service base URL
//! - `TALLY_TIMEOUT_SECS`: request timeout in seconds

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../config/client.toml");

/// Analysis service connection settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceConfig {
    /// Base URL, e.g. `http://localhost:5000/api`
    pub endpoint: String,
    pub upload_path: String,
    pub health_path: String,
    /// Multipart field name for the image
    pub field_name: String,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/api".to_string(),
            upload_path: "/upload".to_string(),
            health_path: "/health".to_string(),
            field_name: "file".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl ServiceConfig {
    /// Full URL of the upload route
    pub fn upload_url(&self) -> String {
        join_url(&self.endpoint, &self.upload_path)
    }

    /// Full URL of the health route
    pub fn health_url(&self) -> String {
        join_url(&self.endpoint, &self.health_path)
    }
}

/// Rendering settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayConfig {
    pub currency_symbol: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_string(),
        }
    }
}

/// Complete client configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ClientConfig {
    pub service: ServiceConfig,
    pub display: DisplayConfig,
}

impl ClientConfig {
    /// Load from the default override location (or embedded defaults), then
    /// apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = load_config(None)?;
        config.apply_env();
        Ok(config)
    }

    /// Load from an explicit path, then apply environment overrides
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = load_config(Some(path))?;
        config.apply_env();
        Ok(config)
    }

    /// Override the service endpoint (e.g. from a CLI flag)
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.service.endpoint = endpoint.trim_end_matches('/').to_string();
        self
    }

    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("TALLY_API_URL") {
            if !url.trim().is_empty() {
                self.service.endpoint = url.trim().trim_end_matches('/').to_string();
            }
        }
        if let Ok(secs) = std::env::var("TALLY_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) => self.service.timeout = Duration::from_secs(secs),
                Err(_) => {
                    tracing::warn!(value = %secs, "Ignoring invalid TALLY_TIMEOUT_SECS");
                }
            }
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("tally").join("config").join("client.toml"))
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<ClientConfig> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path);

    let content = match path {
        Some(path) if path.exists() => {
            tracing::debug!(path = %path.display(), "Loading client config override");
            fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
        }
        _ => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    service: Option<RawService>,
    display: Option<RawDisplay>,
}

#[derive(Debug, Deserialize)]
struct RawService {
    endpoint: Option<String>,
    upload_path: Option<String>,
    health_path: Option<String>,
    field_name: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawDisplay {
    currency_symbol: Option<String>,
}

/// Parse config from TOML content
fn parse_config(content: &str) -> Result<ClientConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = ClientConfig::default();

    if let Some(service) = raw.service {
        if let Some(endpoint) = service.endpoint {
            config.service.endpoint = endpoint.trim_end_matches('/').to_string();
        }
        if let Some(path) = service.upload_path {
            config.service.upload_path = path;
        }
        if let Some(path) = service.health_path {
            config.service.health_path = path;
        }
        if let Some(field) = service.field_name {
            if field.is_empty() {
                return Err(Error::Config("field_name must not be empty".into()));
            }
            config.service.field_name = field;
        }
        if let Some(secs) = service.timeout_secs {
            config.service.timeout = Duration::from_secs(secs);
        }
    }

    if let Some(display) = raw.display {
        if let Some(symbol) = display.currency_symbol {
            config.display.currency_symbol = symbol;
        }
    }

    Ok(config)
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }
}
