//! Mock transport for testing
//!
//! Returns scripted replies in order, falling back to a canned grocery
//! receipt once the script runs out. A gated mock holds every reply until the
//! test releases it, which keeps a submission observably in flight.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::error::{Error, Result};
use crate::models::{Analysis, AnalysisResult, HealthStatus, LineItem, ReceiptFile};

use super::AnalysisTransport;

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A decoded response body (successful or `success: false`)
    Result(AnalysisResult),
    /// A transport-level failure
    Failure {
        status: Option<u16>,
        message: Option<String>,
    },
}

/// Canned analysis: milk, bus fare and bread
pub fn sample_analysis() -> AnalysisResult {
    AnalysisResult::succeeded(
        "MILK 2.50\nBUS FARE 1.20\nBREAD 1.50\nTOTAL 5.20",
        Analysis::new(
            Some(5.20),
            vec![
                LineItem::new("Milk", Some(2.50), Some("Groceries")),
                LineItem::new("Bus", Some(1.20), Some("Transport")),
                LineItem::new("Bread", Some(1.50), Some("Groceries")),
            ],
        ),
    )
}

/// Mock transport for testing
///
/// Clones share the reply script, call counter and gate, so a test can keep a
/// handle while the controller owns another.
#[derive(Clone)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    calls: Arc<AtomicUsize>,
    gate: Option<Arc<Semaphore>>,
    /// Whether health_check should return true
    pub healthy: bool,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    /// Create a new mock transport (healthy by default)
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(AtomicUsize::new(0)),
            gate: None,
            healthy: true,
        }
    }

    /// Create an unhealthy mock transport
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Queue a reply
    pub fn with_reply(self, reply: MockReply) -> Self {
        self.push_reply(reply);
        self
    }

    /// Hold every reply until `release` is called
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    pub fn push_reply(&self, reply: MockReply) {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(reply);
    }

    /// Let `n` held replies through
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    /// Number of `send` calls so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisTransport for MockTransport {
    async fn send(&self, _file: &ReceiptFile) -> Result<AnalysisResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|_| Error::TransportFailure {
                    status: None,
                    message: None,
                })?
                .forget();
        }

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match reply {
            Some(MockReply::Result(result)) => Ok(result),
            Some(MockReply::Failure { status, message }) => {
                Err(Error::TransportFailure { status, message })
            }
            None => Ok(sample_analysis()),
        }
    }

    async fn health(&self) -> Result<HealthStatus> {
        if self.healthy {
            Ok(HealthStatus {
                status: "healthy".to_string(),
                message: Some("mock analysis service".to_string()),
            })
        } else {
            Err(Error::TransportFailure {
                status: Some(503),
                message: None,
            })
        }
    }

    fn endpoint(&self) -> &str {
        "mock://localhost/api"
    }
}
