//! View-model projection
//!
//! Reshapes controller state and an already computed `CategoryAggregate` into
//! strings and series a renderer can use directly. Nothing here aggregates or
//! mutates state.

use serde::Serialize;

use crate::aggregate::CategoryAggregate;
use crate::config::DisplayConfig;
use crate::models::{LineItem, UploadPhase, UploadState};

const UPLOAD_PROMPT: &str = "Click to upload or drag & drop your receipt";
const SUBMIT_LABEL: &str = "Process Receipt";
const SUBMITTING_LABEL: &str = "Processing...";

/// Summary cards
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    /// Reported total, two decimals
    pub total_amount: String,
    pub item_count: usize,
    pub category_count: usize,
}

/// One row of the expense table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRow {
    pub name: String,
    /// Two decimals, "0.00" when the amount is missing
    pub amount: String,
    pub category: String,
    /// Lower-cased category with whitespace runs replaced by '-'
    pub category_token: String,
    pub badge_class: String,
}

/// Aligned chart series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub colors: Vec<String>,
}

/// Everything a renderer needs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub phase: UploadPhase,
    pub file_name: Option<String>,
    /// Upload area text
    pub upload_label: String,
    pub error_message: Option<String>,
    pub can_submit: bool,
    pub submit_label: String,
    /// Offer "Upload Another Receipt"
    pub can_reset: bool,
    pub currency_symbol: String,
    pub summary: Option<SummaryView>,
    pub rows: Vec<ItemRow>,
    pub chart: Option<ChartSeries>,
    pub extracted_text: Option<String>,
}

/// Format an amount with two decimals, treating a missing amount as zero
///
/// Halves round away from zero (1.125 → "1.13").
pub fn format_amount(amount: Option<f64>) -> String {
    let cents = (amount.unwrap_or(0.0) * 100.0).round();
    // Avoid rendering "-0.00"
    if cents == 0.0 {
        return "0.00".to_string();
    }
    format!("{:.2}", cents / 100.0)
}

/// Styling token for a category ("Fast Food" → "fast-food")
pub fn category_token(category: &str) -> String {
    category
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

fn item_row(item: &LineItem) -> ItemRow {
    let category = item.effective_category();
    let token = category_token(category);
    ItemRow {
        name: item.name.clone(),
        amount: format_amount(item.amount),
        category: category.to_string(),
        badge_class: format!("category-{}", token),
        category_token: token,
    }
}

fn chart_series(categories: &CategoryAggregate) -> ChartSeries {
    ChartSeries {
        labels: categories.categories().to_vec(),
        values: categories.amounts().to_vec(),
        colors: categories
            .colors()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

/// Project state (and the aggregate of its analysis, if any) into a view-model
pub fn project(
    state: &UploadState,
    categories: Option<&CategoryAggregate>,
    display: &DisplayConfig,
) -> ViewModel {
    let file_name = state.file.as_ref().map(|f| f.name.clone());
    let uploading = state.phase == UploadPhase::Uploading;
    let analysis = state.analysis();
    let items = analysis.map(|a| a.items.as_slice()).unwrap_or(&[]);

    let summary = state.result.as_ref().map(|_| SummaryView {
        total_amount: format_amount(analysis.and_then(|a| a.total_amount)),
        item_count: items.len(),
        category_count: categories.map(CategoryAggregate::category_count).unwrap_or(0),
    });

    ViewModel {
        phase: state.phase,
        upload_label: match &file_name {
            Some(name) => format!("Selected: {}", name),
            None => UPLOAD_PROMPT.to_string(),
        },
        file_name,
        error_message: state.error_message.clone(),
        can_submit: state.has_file() && !uploading,
        submit_label: (if uploading {
            SUBMITTING_LABEL
        } else {
            SUBMIT_LABEL
        })
        .to_string(),
        can_reset: state.result.is_some(),
        currency_symbol: display.currency_symbol.clone(),
        summary,
        rows: items.iter().map(item_row).collect(),
        chart: categories.map(chart_series),
        extracted_text: state.result.as_ref().map(|r| r.extracted_text.clone()),
    }
}
