// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 toxicity-eval contributors

//! Confusion-matrix scoring for binary toxicity classification
//!
//! Implements the four confusion counts and the derived metrics
//! (accuracy, precision, recall, F1). Every metric is defined as 0 when
//! its denominator is 0, so scoring an empty or degenerate input never
//! divides by zero and never yields NaN.

use crate::corpus::Label;
use crate::EvalError;
use serde::{Deserialize, Serialize};

/// Confusion matrix over a fixed set of (label, prediction) pairs.
///
/// Recomputed fresh per run; `tp + fp + tn + fn == N` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// Toxic messages correctly flagged
    pub tp: usize,
    /// Clean messages correctly passed
    pub tn: usize,
    /// Clean messages wrongly flagged
    pub fp: usize,
    /// Toxic messages missed
    pub fn_: usize,
}

impl ConfusionMatrix {
    /// Count confusion cells from parallel label and prediction streams.
    ///
    /// The streams must align one-to-one; a length mismatch is rejected
    /// before any counting starts.
    pub fn from_labels(labels: &[Label], predictions: &[Label]) -> Result<Self, EvalError> {
        if labels.len() != predictions.len() {
            return Err(EvalError::ShapeMismatch {
                expected: labels.len(),
                actual: predictions.len(),
            });
        }

        let mut matrix = Self::default();

        for (truth, pred) in labels.iter().zip(predictions.iter()) {
            match (truth, pred) {
                (Label::Toxic, Label::Toxic) => matrix.tp += 1,
                (Label::Clean, Label::Clean) => matrix.tn += 1,
                (Label::Clean, Label::Toxic) => matrix.fp += 1,
                (Label::Toxic, Label::Clean) => matrix.fn_ += 1,
            }
        }

        Ok(matrix)
    }

    /// Total number of scored messages
    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// Accuracy: (TP + TN) / N
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.tp + self.tn) as f64 / total as f64
    }

    /// Precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        let denom = self.tp + self.fp;
        if denom == 0 {
            return 0.0;
        }
        self.tp as f64 / denom as f64
    }

    /// Recall: TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        let denom = self.tp + self.fn_;
        if denom == 0 {
            return 0.0;
        }
        self.tp as f64 / denom as f64
    }

    /// F1 Score: 2 * (Precision * Recall) / (Precision + Recall)
    pub fn f1_score(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        let denom = precision + recall;
        if denom == 0.0 {
            return 0.0;
        }
        2.0 * precision * recall / denom
    }

    /// Format as a two-by-two table
    pub fn format(&self) -> String {
        format!(
            r#"                  Predicted
                  Toxic     Clean
Actual Toxic    {:>6}    {:>6}
       Clean    {:>6}    {:>6}
"#,
            self.tp, self.fn_, self.fp, self.tn,
        )
    }
}

/// Derived metrics for one approach
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MetricSet {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl MetricSet {
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        Self {
            accuracy: cm.accuracy(),
            precision: cm.precision(),
            recall: cm.recall(),
            f1: cm.f1_score(),
        }
    }

    /// Metrics with their display names, in reporting order
    pub fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("Accuracy", self.accuracy),
            ("Precision", self.precision),
            ("Recall", self.recall),
            ("F1", self.f1),
        ]
    }
}

/// Score one prediction stream against ground truth.
///
/// Either fully succeeds or fails before producing any output.
pub fn score(
    labels: &[Label],
    predictions: &[Label],
) -> Result<(ConfusionMatrix, MetricSet), EvalError> {
    let cm = ConfusionMatrix::from_labels(labels, predictions)?;
    let metrics = MetricSet::from_confusion(&cm);
    Ok((cm, metrics))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(bits: &[u8]) -> Vec<Label> {
        bits.iter().map(|&b| Label::from_binary(b)).collect()
    }

    #[test]
    fn test_example_scenario() {
        // labels=[1,1,0,0], predictions=[1,0,0,0]
        let truth = labels(&[1, 1, 0, 0]);
        let preds = labels(&[1, 0, 0, 0]);

        let (cm, metrics) = score(&truth, &preds).unwrap();

        assert_eq!(cm.tp, 1);
        assert_eq!(cm.fp, 0);
        assert_eq!(cm.tn, 2);
        assert_eq!(cm.fn_, 1);
        assert!((metrics.accuracy - 0.75).abs() < 1e-9);
        assert!((metrics.precision - 1.0).abs() < 1e-9);
        assert!((metrics.recall - 0.5).abs() < 1e-9);
        assert!((metrics.f1 - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_perfect_predictions() {
        let truth = labels(&[1, 1, 0, 0]);

        let (cm, metrics) = score(&truth, &truth).unwrap();

        assert_eq!(cm.fp, 0);
        assert_eq!(cm.fn_, 0);
        assert!((metrics.accuracy - 1.0).abs() < 1e-9);
        assert!((metrics.f1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_exhaustiveness_invariant() {
        let truth = labels(&[1, 0, 1, 0, 1, 1, 0]);
        let preds = labels(&[0, 0, 1, 1, 1, 0, 1]);

        let (cm, _) = score(&truth, &preds).unwrap();

        assert_eq!(cm.total(), truth.len());
    }

    #[test]
    fn test_empty_input_is_all_zeros() {
        let (cm, metrics) = score(&[], &[]).unwrap();

        assert_eq!(cm.total(), 0);
        assert_eq!(metrics.accuracy, 0.0);
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.f1, 0.0);
    }

    #[test]
    fn test_zero_denominators() {
        // All clean, all predicted clean: no positives anywhere
        let truth = labels(&[0, 0, 0]);

        let (_, metrics) = score(&truth, &truth).unwrap();

        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.f1, 0.0);
        assert!((metrics.accuracy - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let truth = labels(&[1, 0]);
        let preds = labels(&[1]);

        let err = score(&truth, &preds).unwrap_err();

        match err {
            crate::EvalError::ShapeMismatch { expected, actual } => {
                assert_eq!(expected, 2);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_metrics_in_unit_interval() {
        let truth = labels(&[1, 0, 1, 0, 1, 0, 0, 0, 1, 1]);
        let preds = labels(&[1, 1, 0, 0, 1, 0, 1, 0, 0, 1]);

        let (_, metrics) = score(&truth, &preds).unwrap();

        for (_, value) in metrics.named() {
            assert!((0.0..=1.0).contains(&value));
        }
    }
}
