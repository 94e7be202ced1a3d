//! Multipart HTTP transport
//!
//! Posts the receipt image under the configured form field and decodes the
//! JSON reply. Error bodies of the form `{"error": "..."}` are passed through
//! so the user sees the service's own explanation (e.g. the busy message on
//! 429).

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::ServiceConfig;
use crate::error::{Error, Result};
use crate::models::{AnalysisResult, HealthStatus, ReceiptFile};

use super::AnalysisTransport;

/// HTTP transport to the analysis service
#[derive(Clone)]
pub struct HttpTransport {
    http_client: Client,
    config: ServiceConfig,
}

/// Error body returned with non-2xx statuses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpTransport {
    /// Create a transport with the configured timeout
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

#[async_trait]
impl AnalysisTransport for HttpTransport {
    async fn send(&self, file: &ReceiptFile) -> Result<AnalysisResult> {
        let part = Part::bytes(file.content.clone())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)?;
        let form = Form::new().part(self.config.field_name.clone(), part);

        let url = self.config.upload_url();
        debug!(url = %url, file = %file.name, size = file.size(), "Posting receipt");

        let response = self.http_client.post(&url).multipart(form).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .filter(|m| !m.trim().is_empty());
            warn!(status = status.as_u16(), message = ?message, "Analysis service returned error status");
            return Err(Error::TransportFailure {
                status: Some(status.as_u16()),
                message,
            });
        }

        serde_json::from_slice::<AnalysisResult>(&body).map_err(|e| {
            warn!(error = %e, "Malformed analysis response");
            Error::TransportFailure {
                status: Some(status.as_u16()),
                message: None,
            }
        })
    }

    async fn health(&self) -> Result<HealthStatus> {
        let response = self
            .http_client
            .get(self.config.health_url())
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MockAnalysisServer, ServerReply};

    fn transport_for(server: &MockAnalysisServer) -> HttpTransport {
        let config = ServiceConfig {
            endpoint: server.url(),
            ..ServiceConfig::default()
        };
        HttpTransport::new(config).unwrap()
    }

    fn receipt() -> ReceiptFile {
        ReceiptFile::new("receipt.jpg", "image/jpeg", b"fake jpeg".to_vec())
    }

    #[tokio::test]
    async fn test_send_success() {
        let server = MockAnalysisServer::start().await;
        let transport = transport_for(&server);

        let result = transport.send(&receipt()).await.unwrap();
        assert!(result.success);
        assert_eq!(result.items().len(), 3);

        let uploads = server.uploads();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].file_name, "receipt.jpg");
        assert_eq!(uploads[0].content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(uploads[0].size, 9);
    }

    #[tokio::test]
    async fn test_send_decodes_rejection_body() {
        let server =
            MockAnalysisServer::start_with(vec![ServerReply::Analysis(AnalysisResult::rejected(
                Some("unreadable image"),
            ))])
            .await;
        let transport = transport_for(&server);

        let result = transport.send(&receipt()).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.error_message.as_deref(), Some("unreadable image"));
    }

    #[tokio::test]
    async fn test_send_error_status_passes_message_through() {
        let server = MockAnalysisServer::start_with(vec![ServerReply::Error {
            status: 429,
            message: Some("Another receipt is being processed. Please wait.".into()),
        }])
        .await;
        let transport = transport_for(&server);

        let err = transport.send(&receipt()).await.unwrap_err();
        match err {
            Error::TransportFailure { status, message } => {
                assert_eq!(status, Some(429));
                assert_eq!(
                    message.as_deref(),
                    Some("Another receipt is being processed. Please wait.")
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_error_status_without_message() {
        let server = MockAnalysisServer::start_with(vec![ServerReply::Error {
            status: 500,
            message: None,
        }])
        .await;
        let transport = transport_for(&server);

        let err = transport.send(&receipt()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::TransportFailure {
                status: Some(500),
                message: None
            }
        ));
    }

    #[tokio::test]
    async fn test_send_malformed_body() {
        let server = MockAnalysisServer::start_with(vec![ServerReply::Malformed]).await;
        let transport = transport_for(&server);

        let err = transport.send(&receipt()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::TransportFailure {
                status: Some(200),
                message: None
            }
        ));
    }

    #[tokio::test]
    async fn test_send_uses_configured_field_name() {
        let server = MockAnalysisServer::start().await;
        let config = ServiceConfig {
            endpoint: server.url(),
            field_name: "image".into(),
            ..ServiceConfig::default()
        };
        let transport = HttpTransport::new(config).unwrap();

        // The mock service only accepts the "file" field
        let err = transport.send(&receipt()).await.unwrap_err();
        assert_eq!(err.user_message(), "No file uploaded");
    }

    #[tokio::test]
    async fn test_send_unreachable() {
        let config = ServiceConfig {
            endpoint: "http://127.0.0.1:1/api".into(),
            ..ServiceConfig::default()
        };
        let transport = HttpTransport::new(config).unwrap();

        let err = transport.send(&receipt()).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }

    #[tokio::test]
    async fn test_health() {
        let server = MockAnalysisServer::start().await;
        let transport = transport_for(&server);

        let health = transport.health().await.unwrap();
        assert!(health.is_healthy());
        assert!(transport.health_check().await);
    }
}
