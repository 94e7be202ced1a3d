//! Service health and configuration commands

use std::path::Path;

use anyhow::{anyhow, Result};
use tally_core::config::default_config_path;
use tally_core::{AnalysisTransport, ClientConfig, TransportClient};

/// Check the analysis service's health endpoint
pub async fn cmd_health(config: &ClientConfig) -> Result<()> {
    let transport = TransportClient::from_config(config)?;
    check_health(&transport).await?;
    Ok(())
}

/// Query health and print the outcome; errors when the service is not healthy
pub async fn check_health<T: AnalysisTransport>(transport: &T) -> Result<()> {
    match transport.health().await {
        Ok(status) if status.is_healthy() => {
            println!("✓ Analysis service is healthy ({})", transport.endpoint());
            if let Some(message) = &status.message {
                println!("  {}", message);
            }
            Ok(())
        }
        Ok(status) => Err(anyhow!(
            "Analysis service at {} reported status '{}'",
            transport.endpoint(),
            status.status
        )),
        Err(e) => Err(anyhow!(
            "Analysis service at {} is unreachable: {}",
            transport.endpoint(),
            e
        )),
    }
}

/// Print the effective configuration and where it came from
pub fn cmd_config(config: &ClientConfig, explicit_path: Option<&Path>) -> Result<()> {
    let source = explicit_path
        .map(Path::to_path_buf)
        .or_else(default_config_path);

    match source {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!(
            "Config file: {} (not found, using built-in defaults)",
            path.display()
        ),
        None => println!("Config file: none (using built-in defaults)"),
    }

    println!("Upload URL:  {}", config.service.upload_url());
    println!("Health URL:  {}", config.service.health_url());
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
