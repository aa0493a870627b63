// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 toxicity-eval contributors

//! Side-by-side comparison of two toxicity filtering approaches
//!
//! Scores both prediction streams against shared ground truth, declares
//! a per-metric winner with a tie tolerance, extracts every per-message
//! disagreement with correctness attribution, and tallies the four
//! agreement buckets over the full set.

use crate::corpus::{Label, Message};
use crate::metrics::{score, ConfusionMatrix, MetricSet};
use crate::EvalError;
use serde::{Deserialize, Serialize};

/// Absolute difference below which two metric values are declared a tie,
/// so floating-point noise cannot produce a spurious winner.
pub const DEFAULT_TIE_TOLERANCE: f64 = 0.001;

/// Comparator configuration: display names for the two approaches and
/// the tie tolerance for per-metric winner determination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    pub name_a: String,
    pub name_b: String,
    pub tie_tolerance: f64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            name_a: "Wordlist".to_string(),
            name_b: "LLM".to_string(),
            tie_tolerance: DEFAULT_TIE_TOLERANCE,
        }
    }
}

/// Which approach won a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    ApproachA,
    ApproachB,
    Tie,
}

/// One row of the per-metric winner table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricComparison {
    pub metric: String,
    pub value_a: f64,
    pub value_b: f64,
    pub winner: Winner,
}

/// A message the two approaches disagreed on.
///
/// Predictions differ and the label is binary, so exactly one of the two
/// correctness flags is set on every record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisagreementRecord {
    pub index: usize,
    pub text: String,
    pub label: Label,
    pub prediction_a: Label,
    pub prediction_b: Label,
    pub a_correct: bool,
    pub b_correct: bool,
}

/// Agreement buckets over the full evaluated set; the four counts sum
/// to the number of evaluated messages.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AgreementSummary {
    pub both_correct: usize,
    pub both_wrong: usize,
    pub only_a_correct: usize,
    pub only_b_correct: usize,
}

impl AgreementSummary {
    pub fn total(&self) -> usize {
        self.both_correct + self.both_wrong + self.only_a_correct + self.only_b_correct
    }
}

/// Complete comparison output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub config: CompareConfig,
    pub evaluated: usize,
    pub confusion_a: ConfusionMatrix,
    pub confusion_b: ConfusionMatrix,
    pub metrics_a: MetricSet,
    pub metrics_b: MetricSet,
    pub winners: Vec<MetricComparison>,
    pub disagreements: Vec<DisagreementRecord>,
    pub summary: AgreementSummary,
}

/// Pick the winner of a single metric under an absolute tie tolerance
pub fn winner(value_a: f64, value_b: f64, tolerance: f64) -> Winner {
    if (value_a - value_b).abs() < tolerance {
        Winner::Tie
    } else if value_a > value_b {
        Winner::ApproachA
    } else {
        Winner::ApproachB
    }
}

/// Compare two prediction streams over a shared message set.
///
/// All sequences must be the same non-zero length; violations are
/// rejected before any scoring happens, so the report is never partial.
pub fn compare(
    messages: &[Message],
    predictions_a: &[Label],
    predictions_b: &[Label],
    config: CompareConfig,
) -> Result<ComparisonReport, EvalError> {
    if messages.is_empty() {
        return Err(EvalError::EmptyInput);
    }
    if predictions_a.len() != messages.len() {
        return Err(EvalError::ShapeMismatch {
            expected: messages.len(),
            actual: predictions_a.len(),
        });
    }
    if predictions_b.len() != messages.len() {
        return Err(EvalError::ShapeMismatch {
            expected: messages.len(),
            actual: predictions_b.len(),
        });
    }

    let labels: Vec<Label> = messages.iter().map(|m| m.label).collect();

    let (confusion_a, metrics_a) = score(&labels, predictions_a)?;
    let (confusion_b, metrics_b) = score(&labels, predictions_b)?;

    let winners = metrics_a
        .named()
        .iter()
        .zip(metrics_b.named().iter())
        .map(|(&(name, value_a), &(_, value_b))| MetricComparison {
            metric: name.to_string(),
            value_a,
            value_b,
            winner: winner(value_a, value_b, config.tie_tolerance),
        })
        .collect();

    let mut summary = AgreementSummary::default();
    let mut disagreements = Vec::new();

    for (index, message) in messages.iter().enumerate() {
        let a_correct = predictions_a[index] == message.label;
        let b_correct = predictions_b[index] == message.label;

        match (a_correct, b_correct) {
            (true, true) => summary.both_correct += 1,
            (false, false) => summary.both_wrong += 1,
            (true, false) => summary.only_a_correct += 1,
            (false, true) => summary.only_b_correct += 1,
        }

        if predictions_a[index] != predictions_b[index] {
            disagreements.push(DisagreementRecord {
                index,
                text: message.text_or_empty().to_string(),
                label: message.label,
                prediction_a: predictions_a[index],
                prediction_b: predictions_b[index],
                a_correct,
                b_correct,
            });
        }
    }

    Ok(ComparisonReport {
        config,
        evaluated: messages.len(),
        confusion_a,
        confusion_b,
        metrics_a,
        metrics_b,
        winners,
        disagreements,
        summary,
    })
}
