//! Receipt analysis command

use std::path::Path;

use anyhow::{bail, Context, Result};
use tally_core::{
    AnalysisTransport, ClientConfig, ReceiptFile, TransportClient, UploadController, UploadPhase,
    ViewModel,
};
use tracing::info;

use super::truncate;

const BAR_WIDTH: usize = 24;

/// Upload a receipt and print its breakdown
pub async fn cmd_analyze(config: &ClientConfig, file: &Path, json: bool) -> Result<()> {
    let transport = TransportClient::from_config(config)?;
    let controller = UploadController::new(transport).with_display(config.display.clone());

    if !json {
        println!("Processing {}...", file.display());
    }

    let view = analyze_receipt(&controller, file).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        for line in render_report(&view) {
            println!("{}", line);
        }
    }

    if view.phase == UploadPhase::Failed {
        bail!(
            "{}",
            view.error_message
                .as_deref()
                .unwrap_or("Failed to process receipt")
        );
    }

    Ok(())
}

/// Select `file`, submit it and return the resulting view
///
/// Files that are not images are rejected before any upload.
pub async fn analyze_receipt<T: AnalysisTransport>(
    controller: &UploadController<T>,
    file: &Path,
) -> Result<ViewModel> {
    let receipt = ReceiptFile::from_path(file)
        .with_context(|| format!("Failed to read receipt file {}", file.display()))?;

    info!(file = %receipt.name, mime = %receipt.mime_type, "Selected receipt");

    if let Err(e) = controller.select_file(receipt) {
        bail!("{}", e.user_message());
    }

    if let Err(e) = controller.submit().await {
        bail!("{}", e.user_message());
    }

    Ok(controller.view())
}

/// Render a view as text report lines
///
/// A failure has no report body; its message is returned as the command error.
pub fn render_report(view: &ViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    let symbol = &view.currency_symbol;
    let rule = "─".repeat(50);

    let Some(summary) = &view.summary else {
        return lines;
    };

    lines.push(String::new());
    lines.push("📊 Expense Summary".to_string());
    lines.push(rule.clone());
    lines.push(format!("  Total Amount   {}{}", symbol, summary.total_amount));
    lines.push(format!("  Items Found    {}", summary.item_count));
    lines.push(format!("  Categories     {}", summary.category_count));

    lines.push(String::new());
    lines.push("📋 Expense Details".to_string());
    lines.push(rule.clone());
    if view.rows.is_empty() {
        lines.push("  No line items found".to_string());
    } else {
        lines.push(format!("  {:<28} {:>10}  Category", "Item", "Amount"));
        for row in &view.rows {
            let amount = format!("{}{}", symbol, row.amount);
            lines.push(format!(
                "  {:<28} {:>10}  {}",
                truncate(&row.name, 28),
                amount,
                row.category
            ));
        }
    }

    if let Some(chart) = &view.chart {
        lines.push(String::new());
        lines.push("📈 Category Breakdown".to_string());
        lines.push(rule.clone());

        let total: f64 = chart.values.iter().sum();
        let max = chart.values.iter().cloned().fold(0.0_f64, f64::max);

        for ((label, value), color) in chart.labels.iter().zip(&chart.values).zip(&chart.colors) {
            let share = if total > 0.0 {
                value / total * 100.0
            } else {
                0.0
            };
            let width = if max > 0.0 {
                ((value / max) * BAR_WIDTH as f64).round().max(0.0) as usize
            } else {
                0
            };
            lines.push(format!(
                "  {:<16} {:>10} {:>6.1}%  {}  {}",
                truncate(label, 16),
                format!("{}{:.2}", symbol, value),
                share,
                color,
                "█".repeat(width)
            ));
        }
    }

    if let Some(text) = &view.extracted_text {
        if !text.trim().is_empty() {
            lines.push(String::new());
            lines.push("🔍 Extracted Text".to_string());
            lines.push(rule);
            lines.extend(text.lines().map(|line| format!("  {}", line)));
        }
    }

    lines
}
