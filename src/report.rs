// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 toxicity-eval contributors

//! Report emission for the comparison results
//!
//! Everything here is presentation: the comparison table CSV, the
//! human-readable console summary, and JSON persistence. The core
//! comparator stays free of I/O and formatting.

use crate::compare::{ComparisonReport, Winner};
use crate::corpus::{Label, Message};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Comparison results with run metadata, as persisted to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResults {
    pub comparison: ComparisonReport,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl EvaluationResults {
    pub fn new(comparison: ComparisonReport) -> Self {
        Self {
            comparison,
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Save results as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write results to {}", path.display()))?;
        tracing::info!("Results saved to {}", path.display());
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ComparisonRow<'a> {
    message: &'a str,
    label: u8,
    prediction_a: u8,
    prediction_b: u8,
    a_correct: bool,
    b_correct: bool,
}

/// Write the full per-message comparison table as CSV.
///
/// One row per evaluated message: text, ground truth, both predictions,
/// both correctness flags.
pub fn write_comparison_csv(
    messages: &[Message],
    predictions_a: &[Label],
    predictions_b: &[Label],
    path: &Path,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create comparison table: {}", path.display()))?;

    for ((message, &pred_a), &pred_b) in
        messages.iter().zip(predictions_a.iter()).zip(predictions_b.iter())
    {
        writer.serialize(ComparisonRow {
            message: message.text_or_empty(),
            label: message.label.to_binary(),
            prediction_a: pred_a.to_binary(),
            prediction_b: pred_b.to_binary(),
            a_correct: pred_a == message.label,
            b_correct: pred_b == message.label,
        })?;
    }

    writer.flush()?;
    tracing::info!("Comparison table saved to {}", path.display());
    Ok(())
}

fn winner_name(winner: Winner, report: &ComparisonReport) -> &str {
    match winner {
        Winner::ApproachA => &report.config.name_a,
        Winner::ApproachB => &report.config.name_b,
        Winner::Tie => "Tie",
    }
}

/// Format the full comparison as a human-readable summary
pub fn render_summary(report: &ComparisonReport) -> String {
    let name_a = &report.config.name_a;
    let name_b = &report.config.name_b;
    let mut out = String::new();

    out.push_str(&format!("{}\n", "=".repeat(70)));
    out.push_str(&format!(
        "{} vs {} COMPARISON ({} messages)\n",
        name_a.to_uppercase(),
        name_b.to_uppercase(),
        report.evaluated
    ));
    out.push_str(&format!("{}\n\n", "=".repeat(70)));

    out.push_str(&format!(
        "{:<12} {:>12} {:>12}   {:<10}\n",
        "Metric", name_a, name_b, "Winner"
    ));
    out.push_str(&format!("{}\n", "-".repeat(50)));
    for row in &report.winners {
        out.push_str(&format!(
            "{:<12} {:>12.3} {:>12.3}   {:<10}\n",
            row.metric,
            row.value_a,
            row.value_b,
            winner_name(row.winner, report)
        ));
    }

    out.push_str(&format!("\n{}:\n{}\n", name_a, report.confusion_a.format()));
    out.push_str(&format!("{}:\n{}\n", name_b, report.confusion_b.format()));

    out.push_str(&format!(
        "Agreement over all {} messages:\n",
        report.evaluated
    ));
    out.push_str(&format!("  Both correct:       {}\n", report.summary.both_correct));
    out.push_str(&format!("  Both wrong:         {}\n", report.summary.both_wrong));
    out.push_str(&format!(
        "  Only {} correct: {}\n",
        name_a, report.summary.only_a_correct
    ));
    out.push_str(&format!(
        "  Only {} correct: {}\n",
        name_b, report.summary.only_b_correct
    ));

    out.push_str(&format!(
        "\nDisagreements: {} messages\n",
        report.disagreements.len()
    ));
    for record in &report.disagreements {
        let mark = |correct: bool| if correct { "correct" } else { "wrong" };
        out.push_str(&format!("\n  \"{}\"\n", record.text));
        out.push_str(&format!("    Actual: {}\n", record.label.as_str()));
        out.push_str(&format!(
            "    {}: {} ({})\n",
            name_a,
            record.prediction_a.as_str(),
            mark(record.a_correct)
        ));
        out.push_str(&format!(
            "    {}: {} ({})\n",
            name_b,
            record.prediction_b.as_str(),
            mark(record.b_correct)
        ));
    }

    out
}
