// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 toxicity-eval contributors

//! Data model and input loading for the toxicity filter evaluation
//!
//! Three read-only inputs feed an evaluation run: the labeled chat
//! corpus (CSV), the banned-term list (newline-delimited text), and an
//! externally produced prediction stream (CSV, aligned row-for-row with
//! the corpus sample).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Binary toxicity label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    /// Profane, harassing, or otherwise inappropriate content
    Toxic,
    /// Acceptable content
    Clean,
}

impl Label {
    /// Convert to numeric value for tabular output (1 = toxic, 0 = clean)
    pub fn to_binary(self) -> u8 {
        match self {
            Label::Toxic => 1,
            Label::Clean => 0,
        }
    }

    /// Create from a binary prediction (1 = toxic, anything else = clean)
    pub fn from_binary(value: u8) -> Self {
        if value == 1 {
            Label::Toxic
        } else {
            Label::Clean
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Toxic => "TOXIC",
            Label::Clean => "CLEAN",
        }
    }
}

/// A single chat message with its ground-truth label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message text. `None` when the source row had an empty text cell;
    /// missing text is scored normally and never matches any term.
    pub text: Option<String>,
    /// Ground truth label
    pub label: Label,
}

impl Message {
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self {
            text: Some(text.into()),
            label,
        }
    }

    /// Message text, or the empty string when the text cell was missing
    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Deserialize)]
struct CorpusRow {
    message: Option<String>,
    label: f64,
}

/// Load the labeled chat corpus from a CSV file with `message` and
/// `label` columns.
///
/// Labels are stored as floats in the source data; rows whose label is
/// neither 0.0 nor 1.0 are out of scope for binary evaluation and are
/// skipped with a warning rather than treated as an error.
pub fn load_corpus(path: &Path) -> Result<Vec<Message>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open corpus file: {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut messages = Vec::new();

    for (idx, result) in reader.deserialize::<CorpusRow>().enumerate() {
        let row =
            result.with_context(|| format!("Failed to read row {} in {}", idx, path.display()))?;

        let label = if row.label == 1.0 {
            Label::Toxic
        } else if row.label == 0.0 {
            Label::Clean
        } else {
            tracing::warn!(
                "Skipping row {} in {}: label {} outside {{0.0, 1.0}}",
                idx,
                path.display(),
                row.label
            );
            continue;
        };

        messages.push(Message {
            text: row.message.filter(|t| !t.is_empty()),
            label,
        });
    }

    Ok(messages)
}

/// Load the banned-term list from a newline-delimited text file.
///
/// Blank lines are skipped and every term is folded to lowercase, so the
/// list is ready for case-insensitive matching. Duplicates are harmless
/// and kept as-is.
pub fn load_terms(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open term list: {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut terms = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line =
            line.with_context(|| format!("Failed to read line {} in {}", idx, path.display()))?;
        let term = line.trim();
        if term.is_empty() {
            continue;
        }
        terms.push(term.to_lowercase());
    }

    Ok(terms)
}

/// Load an externally produced prediction stream from a CSV file.
///
/// The file must carry one binary prediction per row in a column named
/// `prediction` (or any `*_prediction` column, matching the layout the
/// classifier runner writes). Row alignment against the corpus sample is
/// checked later by the comparator, not here.
pub fn load_predictions(path: &Path) -> Result<Vec<Label>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open prediction file: {}", path.display()))?;
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|h| h == "prediction" || h.ends_with("_prediction"))
        .with_context(|| {
            format!(
                "No prediction column found in {} (expected `prediction` or `*_prediction`)",
                path.display()
            )
        })?;

    let mut predictions = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record =
            result.with_context(|| format!("Failed to read row {} in {}", idx, path.display()))?;
        let raw = record.get(column).unwrap_or("");
        let value: f64 = raw.trim().parse().with_context(|| {
            format!("Row {} in {}: prediction {:?} is not numeric", idx, path.display(), raw)
        })?;

        if value == 1.0 {
            predictions.push(Label::Toxic);
        } else if value == 0.0 {
            predictions.push(Label::Clean);
        } else {
            anyhow::bail!(
                "Row {} in {}: prediction {} outside {{0, 1}}",
                idx,
                path.display(),
                value
            );
        }
    }

    Ok(predictions)
}

/// Count labels in a message set
pub fn label_distribution(messages: &[Message]) -> HashMap<Label, usize> {
    let mut dist = HashMap::new();
    for message in messages {
        *dist.entry(message.label).or_insert(0) += 1;
    }
    dist
}

/// Generate a synthetic labeled corpus for tests and dry runs
pub fn synthetic_corpus(size: usize, seed: u64) -> Vec<Message> {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let toxic_phrases = [
        "uninstall the game you worthless noob",
        "report this idiot feeding mid",
        "you are trash kys loser",
        "stupid team of bots throwing again",
        "shut up moron nobody wants you here",
    ];

    let clean_phrases = [
        "gg well played everyone",
        "push mid after this wave",
        "nice save on that last fight",
        "anyone want to queue again",
        "good rotation, keep the pressure up",
    ];

    (0..size)
        .map(|i| {
            let is_toxic = rng.gen_bool(0.5);
            let phrases = if is_toxic { &toxic_phrases } else { &clean_phrases };
            let phrase_idx = rng.gen_range(0..phrases.len());

            Message {
                text: Some(format!("{} [{}]", phrases[phrase_idx], i)),
                label: if is_toxic { Label::Toxic } else { Label::Clean },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_label_binary_round_trip() {
        assert_eq!(Label::Toxic.to_binary(), 1);
        assert_eq!(Label::Clean.to_binary(), 0);
        assert_eq!(Label::from_binary(1), Label::Toxic);
        assert_eq!(Label::from_binary(0), Label::Clean);
    }

    #[test]
    fn test_load_corpus_skips_out_of_range_labels() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "message,label").unwrap();
        writeln!(file, "gg wp,0.0").unwrap();
        writeln!(file, "you are trash,1.0").unwrap();
        writeln!(file, "ambiguous row,2.0").unwrap();
        writeln!(file, ",1.0").unwrap();

        let messages = load_corpus(file.path()).unwrap();

        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].label, Label::Clean);
        assert_eq!(messages[1].label, Label::Toxic);
        // Empty text cell loads as None, not as an error
        assert!(messages[2].text.is_none());
        assert_eq!(messages[2].text_or_empty(), "");
    }

    #[test]
    fn test_load_terms_folds_case_and_skips_blanks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Noob").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "  TRASH  ").unwrap();
        writeln!(file, "idiot").unwrap();

        let terms = load_terms(file.path()).unwrap();

        assert_eq!(terms, vec!["noob", "trash", "idiot"]);
    }

    #[test]
    fn test_load_predictions_accepts_suffixed_column() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "message,label,llm_prediction").unwrap();
        writeln!(file, "gg,0.0,0").unwrap();
        writeln!(file, "trash team,1.0,1").unwrap();

        let predictions = load_predictions(file.path()).unwrap();

        assert_eq!(predictions, vec![Label::Clean, Label::Toxic]);
    }

    #[test]
    fn test_load_predictions_rejects_non_binary() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "prediction").unwrap();
        writeln!(file, "0.5").unwrap();

        assert!(load_predictions(file.path()).is_err());
    }

    #[test]
    fn test_synthetic_corpus_deterministic() {
        let a = synthetic_corpus(50, 42);
        let b = synthetic_corpus(50, 42);

        assert_eq!(a.len(), 50);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.text, y.text);
            assert_eq!(x.label, y.label);
        }
    }

    #[test]
    fn test_label_distribution_counts() {
        let messages = synthetic_corpus(1000, 42);
        let dist = label_distribution(&messages);

        let toxic = *dist.get(&Label::Toxic).unwrap_or(&0);
        let clean = *dist.get(&Label::Clean).unwrap_or(&0);
        assert_eq!(toxic + clean, 1000);

        // 50/50 generation, allow 20% deviation
        let expected = 500usize;
        let tolerance = 100;
        assert!((toxic as i64 - expected as i64).unsigned_abs() < tolerance);
    }
}
