//! Transport to the external receipt analysis service
//!
//! The service does OCR and categorization; this module only carries a receipt
//! image there and brings the structured result back.
//!
//! # Architecture
//!
//! - `AnalysisTransport` trait: the contract (`send`, `health`)
//! - `TransportClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Implementations: `HttpTransport` (multipart over reqwest), `MockTransport`
//!
//! # Configuration
//!
//! Environment variables:
//! - `TALLY_TRANSPORT`: Transport to use (http, mock). Default: http
//! - `TALLY_API_URL`, `TALLY_TIMEOUT_SECS`: see `config`

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{sample_analysis, MockReply, MockTransport};

use async_trait::async_trait;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::{AnalysisResult, HealthStatus, ReceiptFile};

/// Contract with the analysis service
///
/// `send` makes at most one attempt. A decoded body is returned as-is, even
/// when it reports `success: false`; deciding what that means is the
/// controller's job. Network errors, non-2xx statuses and malformed bodies
/// are errors.
#[async_trait]
pub trait AnalysisTransport: Send + Sync {
    /// Upload one receipt image and return the service's analysis
    async fn send(&self, file: &ReceiptFile) -> Result<AnalysisResult>;

    /// Query the service's health endpoint
    async fn health(&self) -> Result<HealthStatus>;

    /// Check if the service is available
    async fn health_check(&self) -> bool {
        match self.health().await {
            Ok(status) => status.is_healthy(),
            Err(e) => {
                tracing::debug!(error = %e, "Health check failed");
                false
            }
        }
    }

    /// Get the endpoint (for logging)
    fn endpoint(&self) -> &str;
}

/// Concrete transport enum
#[derive(Clone)]
pub enum TransportClient {
    /// Multipart HTTP upload
    Http(HttpTransport),
    /// Scripted in-process replies
    Mock(MockTransport),
}

impl TransportClient {
    /// Create a transport from configuration
    ///
    /// Checks `TALLY_TRANSPORT` to determine which transport to use:
    /// - `http` (default): posts to the configured endpoint
    /// - `mock`: canned replies, no network
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let kind = std::env::var("TALLY_TRANSPORT").unwrap_or_else(|_| "http".to_string());

        match kind.to_lowercase().as_str() {
            "http" => Ok(Self::Http(HttpTransport::new(config.service.clone())?)),
            "mock" => Ok(Self::Mock(MockTransport::new())),
            _ => {
                tracing::warn!(transport = %kind, "Unknown TALLY_TRANSPORT, falling back to http");
                Ok(Self::Http(HttpTransport::new(config.service.clone())?))
            }
        }
    }

    /// Create a mock transport for testing
    pub fn mock() -> Self {
        Self::Mock(MockTransport::new())
    }
}

#[async_trait]
impl AnalysisTransport for TransportClient {
    async fn send(&self, file: &ReceiptFile) -> Result<AnalysisResult> {
        match self {
            Self::Http(t) => t.send(file).await,
            Self::Mock(t) => t.send(file).await,
        }
    }

    async fn health(&self) -> Result<HealthStatus> {
        match self {
            Self::Http(t) => t.health().await,
            Self::Mock(t) => t.health().await,
        }
    }

    fn endpoint(&self) -> &str {
        match self {
            Self::Http(t) => t.endpoint(),
            Self::Mock(t) => t.endpoint(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_client_mock() {
        let client = TransportClient::mock();
        assert_eq!(client.endpoint(), "mock://localhost/api");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        let client = TransportClient::mock();
        assert!(client.health_check().await);

        let client = TransportClient::Mock(MockTransport::unhealthy());
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn test_mock_send_returns_sample() {
        let client = TransportClient::mock();
        let file = ReceiptFile::new("r.jpg", "image/jpeg", vec![1, 2, 3]);
        let result = client.send(&file).await.unwrap();
        assert!(result.success);
        assert_eq!(result.items().len(), 3);
    }
}
