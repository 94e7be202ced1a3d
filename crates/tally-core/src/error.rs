//! Error types for Tally

use thiserror::Error;

/// Shown when a non-image file is picked or dropped
pub const INVALID_FILE_MESSAGE: &str = "Please select a valid image file (JPG, PNG, etc.)";

/// Shown when submit is pressed with nothing selected
pub const MISSING_FILE_MESSAGE: &str = "Please select a file first";

/// Fallback for transport failures without a server-provided message
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to upload and process receipt";

/// Fallback for `success: false` responses without an `error` field
pub const PROCESSING_FAILED_MESSAGE: &str = "Failed to process receipt";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("No receipt file selected")]
    MissingFile,

    #[error("A receipt upload is already in progress")]
    UploadInProgress,

    #[error("Transport failure (status {status:?}): {}", .message.as_deref().unwrap_or("no message"))]
    TransportFailure {
        status: Option<u16>,
        message: Option<String>,
    },

    #[error("Analysis service rejected receipt: {}", .0.as_deref().unwrap_or("no message"))]
    ServiceRejected(Option<String>),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// The single user-visible message stored in `UploadState::error_message`
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidFileType(_) => INVALID_FILE_MESSAGE.to_string(),
            Self::MissingFile => MISSING_FILE_MESSAGE.to_string(),
            Self::ServiceRejected(Some(message)) => message.clone(),
            Self::ServiceRejected(None) => PROCESSING_FAILED_MESSAGE.to_string(),
            Self::TransportFailure {
                message: Some(message),
                ..
            } => message.clone(),
            _ => UPLOAD_FAILED_MESSAGE.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
