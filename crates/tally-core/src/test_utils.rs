//! Test utilities for tally-core
//!
//! This module provides testing infrastructure including a mock analysis
//! service that speaks the upload/health contract over real HTTP.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::sync::oneshot;

use crate::models::AnalysisResult;
use crate::transport::sample_analysis;

/// Scripted reply for the next upload
#[derive(Debug, Clone)]
pub enum ServerReply {
    /// 200 with this body
    Analysis(AnalysisResult),
    /// Error status, with `{"error": message}` when a message is given
    Error { status: u16, message: Option<String> },
    /// 200 with a body that is not JSON
    Malformed,
}

/// What the mock service received for one upload
#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub size: usize,
}

#[derive(Default)]
struct ServerState {
    replies: Mutex<VecDeque<ServerReply>>,
    uploads: Mutex<Vec<ReceivedUpload>>,
}

/// Mock analysis service for testing and development
pub struct MockAnalysisServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockAnalysisServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::start_with(Vec::new()).await
    }

    /// Start with scripted replies; once they run out the sample receipt is returned
    pub async fn start_with(replies: Vec<ServerReply>) -> Self {
        let state = Arc::new(ServerState {
            replies: Mutex::new(replies.into()),
            uploads: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/api/health", get(handle_health))
            .route("/api/upload", post(handle_upload))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Base URL for this mock server (use as the service endpoint)
    pub fn url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Uploads received so far
    pub fn uploads(&self) -> Vec<ReceivedUpload> {
        self.state
            .uploads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockAnalysisServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Health endpoint
async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "message": "Smart Expense Tracker API is running"
    }))
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Upload endpoint
async fn handle_upload(
    State(state): State<Arc<ServerState>>,
    mut multipart: Multipart,
) -> Response {
    let mut upload: Option<ReceivedUpload> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid form data"),
        };

        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(_) => return error_response(StatusCode::BAD_REQUEST, "Failed to read file data"),
        };

        upload = Some(ReceivedUpload {
            file_name,
            content_type,
            size: bytes.len(),
        });
    }

    let Some(upload) = upload else {
        return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
    };
    if upload.file_name.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No file selected");
    }

    state
        .uploads
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(upload);

    let reply = state
        .replies
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .pop_front()
        .unwrap_or_else(|| ServerReply::Analysis(sample_analysis()));

    match reply {
        ServerReply::Analysis(result) => (StatusCode::OK, Json(result)).into_response(),
        ServerReply::Error { status, message } => {
            let status =
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            match message {
                Some(message) => error_response(status, &message),
                None => (status, Json(serde_json::json!({}))).into_response(),
            }
        }
        ServerReply::Malformed => (StatusCode::OK, "<html>oops</html>").into_response(),
    }
}
