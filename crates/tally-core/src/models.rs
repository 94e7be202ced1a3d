//! Data models for Tally
//!
//! The analysis service speaks loosely-typed JSON. Every field it may omit is
//! modeled as optional here, and the documented defaults live on the types
//! (`LineItem::effective_amount`, `LineItem::effective_category`) rather than
//! at use sites.

use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Category used for line items the service did not categorize
pub const DEFAULT_CATEGORY: &str = "Other";

/// Deserialize `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Receipt file
// ============================================================================

/// A user-selected receipt image (or a rejected candidate)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptFile {
    /// Display name (file name without directories)
    pub name: String,
    /// MIME type as declared by the picker, drop event or file extension
    pub mime_type: String,
    /// Raw file bytes
    pub content: Vec<u8>,
}

impl ReceiptFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content,
        }
    }

    /// Read a file from disk, guessing its declared MIME type from the extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read(path)?;
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            mime_type,
            content,
        })
    }

    /// Whether the declared MIME type is an image type
    pub fn is_image(&self) -> bool {
        self.mime_type.to_ascii_lowercase().starts_with("image/")
    }

    /// SHA-256 of the content, hex encoded
    pub fn content_hash(&self) -> String {
        hex::encode(Sha256::digest(&self.content))
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

// ============================================================================
// Analysis service schema
// ============================================================================

/// One purchase line extracted from a receipt
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
}

impl LineItem {
    pub fn new(name: &str, amount: Option<f64>, category: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            amount,
            category: category.map(str::to_string),
        }
    }

    /// Amount used for arithmetic and display; missing amounts count as zero
    pub fn effective_amount(&self) -> f64 {
        self.amount.unwrap_or(0.0)
    }

    /// Category used for grouping; missing or blank categories become "Other"
    pub fn effective_category(&self) -> &str {
        self.category
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(DEFAULT_CATEGORY)
    }
}

/// Structured extraction for one receipt
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub items: Vec<LineItem>,
}

impl Analysis {
    pub fn new(total_amount: Option<f64>, items: Vec<LineItem>) -> Self {
        Self {
            total_amount,
            items,
        }
    }

    /// Reported total, zero when the service did not provide one
    pub fn total_or_zero(&self) -> f64 {
        self.total_amount.unwrap_or(0.0)
    }
}

/// Response body of the upload endpoint
///
/// `analysis` is expected iff `success`, `error_message` iff not.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub extracted_text: String,
    #[serde(default, rename = "ai_analysis", skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    #[serde(default, rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl AnalysisResult {
    /// A successful analysis
    pub fn succeeded(extracted_text: &str, analysis: Analysis) -> Self {
        Self {
            success: true,
            extracted_text: extracted_text.to_string(),
            analysis: Some(analysis),
            error_message: None,
        }
    }

    /// A response with `success: false`
    pub fn rejected(error_message: Option<&str>) -> Self {
        Self {
            success: false,
            extracted_text: String::new(),
            analysis: None,
            error_message: error_message.map(str::to_string),
        }
    }

    /// Line items of the analysis, empty when there is none
    pub fn items(&self) -> &[LineItem] {
        self.analysis
            .as_ref()
            .map(|a| a.items.as_slice())
            .unwrap_or(&[])
    }
}

/// Response body of the health endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

// ============================================================================
// Upload state
// ============================================================================

/// Discrete state of the upload lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadPhase {
    /// Nothing selected
    #[default]
    Idle,
    /// A valid image is held and ready to submit
    FileSelected,
    /// A submission is in flight
    Uploading,
    /// The last submission produced an analysis
    Succeeded,
    /// The last submission failed
    Failed,
}

impl UploadPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FileSelected => "file_selected",
            Self::Uploading => "uploading",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for UploadPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-session upload state, owned by `UploadController`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadState {
    pub file: Option<ReceiptFile>,
    pub phase: UploadPhase,
    pub result: Option<AnalysisResult>,
    pub error_message: Option<String>,
}

impl UploadState {
    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    pub fn is_uploading(&self) -> bool {
        self.phase == UploadPhase::Uploading
    }

    /// The held analysis, if the last submission succeeded with one
    pub fn analysis(&self) -> Option<&Analysis> {
        self.result.as_ref().and_then(|r| r.analysis.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_success_response() {
        let json = r#"{
            "success": true,
            "extracted_text": "MILK 2.50\nBUS 1.20",
            "ai_analysis": {
                "total_amount": 3.7,
                "items": [
                    {"name": "Milk", "amount": 2.5, "category": "Groceries"},
                    {"name": "Bus", "amount": 1.2, "category": "Transport"}
                ]
            }
        }"#;

        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert!(result.success);
        assert_eq!(result.extracted_text, "MILK 2.50\nBUS 1.20");
        let analysis = result.analysis.as_ref().unwrap();
        assert_eq!(analysis.total_amount, Some(3.7));
        assert_eq!(analysis.items.len(), 2);
        assert_eq!(analysis.items[1].category.as_deref(), Some("Transport"));
        assert!(result.error_message.is_none());
    }

    #[test]
    fn test_deserialize_failure_response() {
        let result: AnalysisResult =
            serde_json::from_str(r#"{"success": false, "error": "unreadable image"}"#).unwrap();
        assert!(!result.success);
        assert_eq!(result.error_message.as_deref(), Some("unreadable image"));
        assert!(result.analysis.is_none());
        assert!(result.items().is_empty());
    }

    #[test]
    fn test_deserialize_nulls_and_missing_fields() {
        let json = r#"{
            "success": true,
            "extracted_text": null,
            "ai_analysis": {
                "total_amount": null,
                "items": [
                    {"name": null, "amount": null, "category": null},
                    {"amount": 4}
                ]
            }
        }"#;

        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.extracted_text, "");
        let analysis = result.analysis.unwrap();
        assert_eq!(analysis.total_or_zero(), 0.0);
        assert_eq!(analysis.items[0].name, "");
        assert_eq!(analysis.items[0].effective_amount(), 0.0);
        assert_eq!(analysis.items[0].effective_category(), "Other");
        assert_eq!(analysis.items[1].effective_amount(), 4.0);
    }

    #[test]
    fn test_missing_items_is_empty() {
        let analysis: Analysis = serde_json::from_str(r#"{"total_amount": 12.0}"#).unwrap();
        assert!(analysis.items.is_empty());
        assert_eq!(analysis.total_or_zero(), 12.0);
    }

    #[test]
    fn test_blank_category_is_other() {
        let item = LineItem::new("Gum", Some(1.0), Some("  "));
        assert_eq!(item.effective_category(), DEFAULT_CATEGORY);
        let item = LineItem::new("Gum", Some(1.0), Some("Food"));
        assert_eq!(item.effective_category(), "Food");
    }

    #[test]
    fn test_receipt_file_is_image() {
        assert!(ReceiptFile::new("a.jpg", "image/jpeg", vec![]).is_image());
        assert!(ReceiptFile::new("a.png", "IMAGE/PNG", vec![]).is_image());
        assert!(!ReceiptFile::new("a.pdf", "application/pdf", vec![]).is_image());
        assert!(!ReceiptFile::new("a", "", vec![]).is_image());
    }

    #[test]
    fn test_receipt_file_from_path_guesses_mime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let file = ReceiptFile::from_path(&path).unwrap();
        assert_eq!(file.name, "receipt.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.size(), 4);

        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();
        let file = ReceiptFile::from_path(&path).unwrap();
        assert_eq!(file.mime_type, "text/plain");
        assert!(!file.is_image());
    }

    #[test]
    fn test_receipt_file_from_missing_path() {
        let result = ReceiptFile::from_path(Path::new("/nonexistent/receipt.jpg"));
        assert!(matches!(result, Err(crate::Error::Io(_))));
    }

    #[test]
    fn test_content_hash() {
        let file = ReceiptFile::new("a.jpg", "image/jpeg", b"abc".to_vec());
        assert_eq!(
            file.content_hash(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_upload_phase_as_str() {
        assert_eq!(UploadPhase::Idle.as_str(), "idle");
        assert_eq!(UploadPhase::FileSelected.to_string(), "file_selected");
        assert_eq!(UploadPhase::default(), UploadPhase::Idle);
    }

    #[test]
    fn test_health_status() {
        let health: HealthStatus = serde_json::from_str(
            r#"{"status": "healthy", "message": "Smart Expense Tracker API is running"}"#,
        )
        .unwrap();
        assert!(health.is_healthy());
    }
}
