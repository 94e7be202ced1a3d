//! Tally Core Library
//!
//! Shared functionality for the Tally receipt expense tracker:
//! - Upload lifecycle controller (select, submit, reset)
//! - Pluggable transport to the external receipt analysis service
//! - Category aggregation and chart color assignment
//! - View-model projection for tables, summary cards and charts
//! - Client configuration with embedded defaults

pub mod aggregate;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod projector;
pub mod transport;

/// Test utilities including mock analysis server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{aggregate, color_for_index, CategoryAggregate, PALETTE};
pub use config::{ClientConfig, DisplayConfig, ServiceConfig};
pub use controller::{DropZone, SubmitOutcome, UploadController};
pub use error::{Error, Result};
pub use models::{
    Analysis, AnalysisResult, HealthStatus, LineItem, ReceiptFile, UploadPhase, UploadState,
};
pub use projector::{project, ChartSeries, ItemRow, SummaryView, ViewModel};
pub use transport::{
    AnalysisTransport, HttpTransport, MockReply, MockTransport, TransportClient,
};
