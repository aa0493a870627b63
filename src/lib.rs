// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 toxicity-eval contributors

//! Evaluation harness for toxic chat filtering in gaming contexts
//!
//! This crate provides:
//! - Corpus, term list, and prediction stream loading
//! - A whole-word wordlist matcher (the static filtering approach)
//! - Confusion-matrix scoring (accuracy, precision, recall, F1)
//! - Side-by-side comparison of two prediction streams with
//!   per-metric winners and per-message disagreement analysis
//! - Report emission (console summary, comparison CSV, JSON results)
//! - A remote LLM classifier client used to produce the second stream

pub mod classifier;
pub mod compare;
pub mod corpus;
pub mod matcher;
pub mod metrics;
pub mod report;

pub use classifier::{ClassifierConfig, RemoteClassifier};
pub use compare::{compare, CompareConfig, ComparisonReport, DisagreementRecord, Winner};
pub use corpus::{Label, Message};
pub use matcher::WordMatcher;
pub use metrics::{score, ConfusionMatrix, MetricSet};
pub use report::EvaluationResults;

use thiserror::Error;

/// Errors from the evaluation core.
///
/// Malformed input is rejected before any computation starts; the core
/// never produces partial results.
#[derive(Debug, Error)]
pub enum EvalError {
    /// Label/prediction sequences do not line up one-to-one.
    #[error("sequence length mismatch: expected {expected} entries, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// The comparator was handed an empty message set.
    #[error("cannot compare approaches over an empty message set")]
    EmptyInput,
}
