// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 toxicity-eval contributors

//! Whole-word wordlist matcher (the static filtering approach)
//!
//! A message is flagged toxic when any banned term occurs in it as a
//! standalone word, case-insensitively. Word-boundary matching keeps a
//! term embedded inside a longer benign word from triggering ("ace"
//! matches in "move your ace now" but not in "embrace this").

use crate::corpus::{Label, Message};
use anyhow::{Context, Result};
use regex::RegexSet;

/// Compiled banned-term matcher.
///
/// Terms are compiled once per evaluation run and immutable thereafter.
/// Matching is a pure function of the input text: no stemming, no fuzzy
/// matching, no Unicode normalization beyond simple lowercasing.
#[derive(Debug)]
pub struct WordMatcher {
    patterns: RegexSet,
    term_count: usize,
}

impl WordMatcher {
    /// Compile a matcher from a term list.
    ///
    /// Each term is escaped so regex metacharacters in the list match
    /// literally, then wrapped in word boundaries. An empty list yields
    /// a matcher that never matches anything.
    pub fn new(terms: &[String]) -> Result<Self> {
        let patterns = RegexSet::new(
            terms
                .iter()
                .map(|term| format!(r"\b{}\b", regex::escape(&term.to_lowercase()))),
        )
        .context("Failed to compile term patterns")?;

        Ok(Self {
            patterns,
            term_count: terms.len(),
        })
    }

    /// Number of terms the matcher was compiled from
    pub fn term_count(&self) -> usize {
        self.term_count
    }

    /// Whether the text contains any banned term as a whole word
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.is_match(&text.to_lowercase())
    }

    /// Classify a single message. Missing text never matches.
    pub fn classify(&self, message: &Message) -> Label {
        match &message.text {
            Some(text) if self.matches(text) => Label::Toxic,
            _ => Label::Clean,
        }
    }

    /// Produce one prediction per message, in corpus order
    pub fn predict(&self, messages: &[Message]) -> Vec<Label> {
        messages.iter().map(|m| self.classify(m)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(terms: &[&str]) -> WordMatcher {
        let terms: Vec<String> = terms.iter().map(|t| t.to_string()).collect();
        WordMatcher::new(&terms).unwrap()
    }

    #[test]
    fn test_whole_word_boundary() {
        let m = matcher(&["ace"]);

        assert!(m.matches("plebs move your ace now"));
        assert!(!m.matches("embrace this"));
        assert!(!m.matches("racecar"));
    }

    #[test]
    fn test_standalone_token_with_punctuation() {
        let m = matcher(&["noob"]);

        assert!(m.matches("what a noob!"));
        assert!(m.matches("noob, leave"));
        assert!(m.matches("(noob)"));
        assert!(!m.matches("noobs everywhere"));
    }

    #[test]
    fn test_case_insensitive() {
        let m = matcher(&["trash"]);

        assert!(m.matches("you are TRASH"));
        assert!(m.matches("Trash team"));
    }

    #[test]
    fn test_uppercase_terms_folded_on_compile() {
        let terms = vec!["NOOB".to_string()];
        let m = WordMatcher::new(&terms).unwrap();

        assert!(m.matches("such a noob"));
    }

    #[test]
    fn test_empty_term_list_never_matches() {
        let m = matcher(&[]);

        assert!(!m.matches(""));
        assert!(!m.matches("you absolute trash noob idiot"));
        assert_eq!(m.term_count(), 0);
    }

    #[test]
    fn test_metacharacters_are_literal() {
        let m = matcher(&["n.b"]);

        assert!(m.matches("total n.b move"));
        assert!(!m.matches("total nab move"));
    }

    #[test]
    fn test_missing_text_never_matches() {
        let m = matcher(&["noob"]);
        let message = Message {
            text: None,
            label: Label::Toxic,
        };

        assert_eq!(m.classify(&message), Label::Clean);
    }

    #[test]
    fn test_idempotent() {
        let m = matcher(&["noob", "trash"]);
        let text = "trash talk from a noob";

        let first = m.matches(text);
        for _ in 0..10 {
            assert_eq!(m.matches(text), first);
        }
    }

    #[test]
    fn test_predict_one_per_message() {
        let m = matcher(&["noob"]);
        let messages = vec![
            Message::new("gg wp", Label::Clean),
            Message::new("what a noob", Label::Toxic),
            Message {
                text: None,
                label: Label::Clean,
            },
        ];

        let predictions = m.predict(&messages);

        assert_eq!(predictions, vec![Label::Clean, Label::Toxic, Label::Clean]);
    }
}
